/*
    sim86
    Copyright 2022-2025 Daniel Balsom

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.
*/

use thiserror::Error;

use crate::{decoder::Disassembly, instruction_type::InstructionType};

fn opcode_bits(byte1: &u8, byte2: &Option<u8>) -> String {
    match byte2 {
        Some(byte2) => format!("{:08b} {:08b}", byte1, byte2),
        None => format!("{:08b}", byte1),
    }
}

/// A fatal failure while decoding an instruction stream.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// No opcode pattern matches. `byte2` is present when the secondary opcode field was
    /// inspected.
    #[error("opcode {} not implemented (offset {offset})", opcode_bits(.byte1, .byte2))]
    UnknownOpcode { offset: usize, byte1: u8, byte2: Option<u8> },
    #[error("unexpected end of stream in instruction at offset {offset}")]
    Truncated { offset: usize },
    #[error("decoding of '{}' is not implemented (offset {offset})", .kind.mnemonic())]
    Unsupported { offset: usize, kind: InstructionType },
}

impl DecodeError {
    /// Stream offset of the instruction that failed to decode.
    pub fn offset(&self) -> usize {
        match self {
            DecodeError::UnknownOpcode { offset, .. }
            | DecodeError::Truncated { offset }
            | DecodeError::Unsupported { offset, .. } => *offset,
        }
    }
}

/// A decode pass that stopped at an error. Everything decoded before the failure is kept so it
/// can still be rendered.
#[derive(Debug, Error)]
#[error("decoding stopped after {} instruction(s): {error}", .decoded.instructions.len())]
pub struct PartialDecode {
    pub decoded: Disassembly,
    #[source]
    pub error: DecodeError,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SimulationError {
    #[error("instruction simulation not implemented for {mnemonic} (type {tag})")]
    NotImplemented { mnemonic: &'static str, tag: u8 },
    #[error("memory operands are not supported by the simulator")]
    MemoryOperand,
    #[error("{0} has no destination operand")]
    MissingDestination(&'static str),
    #[error("{0} has no source operand")]
    MissingSource(&'static str),
    #[error("cannot write to a {0} operand")]
    InvalidDestination(&'static str),
    #[error("cannot read a value from a {0} operand")]
    InvalidSource(&'static str),
    #[error("unknown register name '{0}'")]
    UnknownRegister(String),
}

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

//! An 8086 machine code decoder, NASM-style disassembler and register-level simulator.
//!
//! Raw bytes are decoded by [Decoder] into a sequence of [Instruction]s plus the [LabelSet] of
//! relative branch targets. A [Disassembly] can be rendered back to assembly text with the
//! [formatter], or executed against an [ExecutionContext] by the [simulator].

pub mod byte_reader;
pub mod cpu_common;
pub mod decoder;
pub mod error;
pub mod formatter;
pub mod instruction;
pub mod instruction_type;
pub mod label;
pub mod modrm16;
pub mod opcode;
pub mod operand;
pub mod simulator;

pub use decoder::{disassemble, Decoder, Disassembly};
pub use error::{DecodeError, PartialDecode, SimulationError};
pub use instruction::Instruction;
pub use instruction_type::InstructionType;
pub use label::LabelSet;
pub use simulator::{context::ExecutionContext, Flag};

pub mod prelude {
    pub use crate::{
        cpu_common::Register,
        decoder::{disassemble, Decoder, Disassembly},
        error::{DecodeError, PartialDecode, SimulationError},
        formatter::{
            format_instruction,
            format_program,
            nasm_formatter::NasmFormatter,
            Format,
            FormatOptions,
            FormatterOutput,
            TokenStream,
        },
        instruction::Instruction,
        instruction_type::InstructionType,
        label::{LabelName, LabelSet},
        modrm16::{AddressCalculation, AddressMode, ModRmByte16},
        operand::DataLocation,
        simulator::{context::ExecutionContext, simulate, simulate_instruction, simulate_traced, Flag},
    };
}

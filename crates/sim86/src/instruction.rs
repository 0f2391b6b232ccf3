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

use crate::{instruction_type::InstructionType, operand::DataLocation};

/// A decoded instruction.
///
/// Operand-less instructions carry neither location; single operand instructions only carry a
/// destination.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Instruction {
    pub kind: InstructionType,
    /// Offset of the first byte of the instruction within the decoded stream.
    pub address: usize,
    /// Total encoded size in bytes.
    pub size: usize,
    /// Width of operand-less forms (`movsb` vs `movsw`).
    pub wide: bool,
    pub destination: Option<DataLocation>,
    pub source: Option<DataLocation>,
}

impl Instruction {
    pub fn mnemonic(&self) -> &'static str {
        self.kind.mnemonic()
    }

    pub fn operand_ct(&self) -> usize {
        self.destination.iter().count() + self.source.iter().count()
    }

    pub fn has_operands(&self) -> bool {
        self.destination.is_some() || self.source.is_some()
    }

    /// Offset of the instruction following this one.
    pub fn next_address(&self) -> usize {
        self.address + self.size
    }
}

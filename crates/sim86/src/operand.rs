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

use std::io;

use crate::{byte_reader::ByteReader, cpu_common::Register, modrm16::AddressCalculation};

/// Where an operand's value lives.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DataLocation {
    Register(Register),
    /// A memory operand. `hide_size` suppresses the `byte`/`word` prefix when rendering, for
    /// contexts that only use the address.
    Memory {
        address: AddressCalculation,
        wide: bool,
        hide_size: bool,
    },
    /// An immediate, sign-extended to 16 bits when it was encoded as one byte. `sign_extended`
    /// marks a word operand encoded as a single byte. `hide_size` suppresses the size prefix when
    /// rendering.
    Immediate {
        value: i16,
        wide: bool,
        sign_extended: bool,
        hide_size: bool,
    },
    /// A relative branch target, as an absolute offset into the decoded stream.
    Label(i32),
}

impl DataLocation {
    pub fn memory(address: AddressCalculation, wide: bool) -> Self {
        DataLocation::Memory {
            address,
            wide,
            hide_size: false,
        }
    }

    pub fn immediate(value: i16, wide: bool) -> Self {
        DataLocation::Immediate {
            value,
            wide,
            sign_extended: false,
            hide_size: false,
        }
    }

    /// A word immediate encoded as one sign-extended byte.
    pub fn sign_extended_immediate(value: i16) -> Self {
        DataLocation::Immediate {
            value,
            wide: true,
            sign_extended: true,
            hide_size: false,
        }
    }

    /// An immediate rendered without a size prefix, such as a port number or interrupt vector.
    pub fn unsized_immediate(value: i16) -> Self {
        DataLocation::Immediate {
            value,
            wide: false,
            sign_extended: false,
            hide_size: true,
        }
    }

    /// Return a copy with the size prefix suppressed. Has no effect on registers and labels.
    pub fn without_size(self) -> Self {
        match self {
            DataLocation::Memory { address, wide, .. } => DataLocation::Memory {
                address,
                wide,
                hide_size: true,
            },
            DataLocation::Immediate {
                value,
                wide,
                sign_extended,
                ..
            } => DataLocation::Immediate {
                value,
                wide,
                sign_extended,
                hide_size: true,
            },
            other => other,
        }
    }

    pub fn is_memory(&self) -> bool {
        matches!(self, DataLocation::Memory { .. })
    }

    /// Number of bytes the immediate occupied in the instruction stream.
    pub fn encoded_len(&self) -> Option<usize> {
        match *self {
            DataLocation::Immediate {
                wide, sign_extended, ..
            } => Some(if wide && !sign_extended { 2 } else { 1 }),
            _ => None,
        }
    }

    /// Short name of the location kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            DataLocation::Register(_) => "register",
            DataLocation::Memory { .. } => "memory",
            DataLocation::Immediate { .. } => "immediate",
            DataLocation::Label(_) => "label",
        }
    }
}

impl From<Register> for DataLocation {
    fn from(reg: Register) -> Self {
        DataLocation::Register(reg)
    }
}

/// Parse an immediate operand of the given width, returning the number of bytes consumed and
/// the value. A one byte immediate is sign-extended.
pub fn parse_data(bytes: &mut impl ByteReader, wide: bool) -> io::Result<(usize, i16)> {
    if wide {
        Ok((2, bytes.read_i16()?))
    }
    else {
        Ok((1, bytes.read_i8()? as i16))
    }
}

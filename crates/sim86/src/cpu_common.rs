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

use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use crate::error::SimulationError;

/// The general purpose and segment registers of the 8086. Byte registers alias the low and high
/// halves of AX, CX, DX and BX.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Register {
    AL,
    CL,
    DL,
    BL,
    AH,
    CH,
    DH,
    BH,
    AX,
    CX,
    DX,
    BX,
    SP,
    BP,
    SI,
    DI,
    ES,
    CS,
    SS,
    DS,
}

pub const REGISTER8_LUT: [Register; 8] = [
    Register::AL,
    Register::CL,
    Register::DL,
    Register::BL,
    Register::AH,
    Register::CH,
    Register::DH,
    Register::BH,
];

pub const REGISTER16_LUT: [Register; 8] = [
    Register::AX,
    Register::CX,
    Register::DX,
    Register::BX,
    Register::SP,
    Register::BP,
    Register::SI,
    Register::DI,
];

/// Segment registers as selected by a two-bit field (`sr` in push/pop, `reg` in 8C/8E).
pub const SREGISTER_LUT: [Register; 4] = [Register::ES, Register::CS, Register::SS, Register::DS];

pub const ALL_REGISTERS: [Register; 20] = [
    Register::AL,
    Register::CL,
    Register::DL,
    Register::BL,
    Register::AH,
    Register::CH,
    Register::DH,
    Register::BH,
    Register::AX,
    Register::CX,
    Register::DX,
    Register::BX,
    Register::SP,
    Register::BP,
    Register::SI,
    Register::DI,
    Register::ES,
    Register::CS,
    Register::SS,
    Register::DS,
];

impl Register {
    /// Select a general purpose register from a 3-bit `reg` or `r/m` field.
    #[inline]
    pub fn from_field(field: u8, wide: bool) -> Register {
        if wide {
            REGISTER16_LUT[(field & 0x07) as usize]
        }
        else {
            REGISTER8_LUT[(field & 0x07) as usize]
        }
    }

    /// Select a segment register from a 2-bit field.
    #[inline]
    pub fn segment_from_field(field: u8) -> Register {
        SREGISTER_LUT[(field & 0x03) as usize]
    }

    #[inline]
    pub fn is_wide(&self) -> bool {
        !matches!(
            self,
            Register::AL
                | Register::CL
                | Register::DL
                | Register::BL
                | Register::AH
                | Register::CH
                | Register::DH
                | Register::BH
        )
    }

    #[inline]
    pub fn is_segment(&self) -> bool {
        matches!(self, Register::ES | Register::CS | Register::SS | Register::DS)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Register::AL => "al",
            Register::CL => "cl",
            Register::DL => "dl",
            Register::BL => "bl",
            Register::AH => "ah",
            Register::CH => "ch",
            Register::DH => "dh",
            Register::BH => "bh",
            Register::AX => "ax",
            Register::CX => "cx",
            Register::DX => "dx",
            Register::BX => "bx",
            Register::SP => "sp",
            Register::BP => "bp",
            Register::SI => "si",
            Register::DI => "di",
            Register::ES => "es",
            Register::CS => "cs",
            Register::SS => "ss",
            Register::DS => "ds",
        }
    }
}

impl Display for Register {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Register {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        ALL_REGISTERS
            .iter()
            .copied()
            .find(|reg| reg.name() == lower)
            .ok_or_else(|| SimulationError::UnknownRegister(s.to_string()))
    }
}

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

//! First-match opcode classification.
//!
//! Several patterns overlap (`0x84..=0x87` covers both `test` and `xchg`, `0x80..=0x83` is split
//! by the secondary opcode), so [OPCODE_TABLE] is scanned strictly in order.

use crate::{error::DecodeError, instruction_type::InstructionType};

/// Extra condition on the byte following the opcode.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Discriminator {
    None,
    /// Bits 3-5 of the second byte must equal the value.
    Reg(u8),
    /// The second byte must equal the value.
    Byte(u8),
}

#[derive(Copy, Clone, Debug)]
pub struct OpcodeRule {
    pub mask: u8,
    pub pattern: u8,
    pub discriminator: Discriminator,
    pub kind: InstructionType,
}

impl OpcodeRule {
    #[inline]
    pub fn matches_opcode(&self, byte: u8) -> bool {
        byte & self.mask == self.pattern
    }
}

macro_rules! op {
    ($mask:literal, $pattern:literal => $kind:ident) => {
        OpcodeRule {
            mask: $mask,
            pattern: $pattern,
            discriminator: Discriminator::None,
            kind: InstructionType::$kind,
        }
    };
    ($mask:literal, $pattern:literal, reg = $reg:literal => $kind:ident) => {
        OpcodeRule {
            mask: $mask,
            pattern: $pattern,
            discriminator: Discriminator::Reg($reg),
            kind: InstructionType::$kind,
        }
    };
    ($mask:literal, $pattern:literal, next = $byte:literal => $kind:ident) => {
        OpcodeRule {
            mask: $mask,
            pattern: $pattern,
            discriminator: Discriminator::Byte($byte),
            kind: InstructionType::$kind,
        }
    };
}

#[rustfmt::skip]
pub const OPCODE_TABLE: &[OpcodeRule] = &[
    // mov
    op!(0xFC, 0x88 => MovRegMemToFromReg),
    op!(0xFE, 0xC6 => MovImToRegMem),
    op!(0xF0, 0xB0 => MovImToReg),
    op!(0xFE, 0xA0 => MovMemToAcc),
    op!(0xFE, 0xA2 => MovAccToMem),
    op!(0xFF, 0x8E => MovRegMemToSegReg),
    op!(0xFF, 0x8C => MovSegRegToRegMem),

    // add, and the 0x80-0x83 immediate group
    op!(0xFC, 0x00 => AddRegMemWithRegToEither),
    op!(0xFC, 0x80, reg = 0 => AddImToRegMem),
    op!(0xFC, 0x80, reg = 1 => OrImToRegMem),
    op!(0xFC, 0x80, reg = 2 => AdcImToRegMem),
    op!(0xFC, 0x80, reg = 3 => SbbImFromRegMem),
    op!(0xFC, 0x80, reg = 4 => AndImToRegMem),
    op!(0xFC, 0x80, reg = 5 => SubImFromRegMem),
    op!(0xFC, 0x80, reg = 6 => XorImToRegMem),
    op!(0xFC, 0x80, reg = 7 => CmpImWithRegMem),
    op!(0xFE, 0x04 => AddImToAcc),

    // sub, cmp
    op!(0xFC, 0x28 => SubRegMemWithRegToEither),
    op!(0xFE, 0x2C => SubImFromAcc),
    op!(0xFC, 0x38 => CmpRegMemAndReg),
    op!(0xFE, 0x3C => CmpImWithAcc),

    // conditional jumps
    op!(0xFF, 0x70 => Jo),
    op!(0xFF, 0x71 => Jno),
    op!(0xFF, 0x72 => Jb),
    op!(0xFF, 0x73 => Jnb),
    op!(0xFF, 0x74 => Je),
    op!(0xFF, 0x75 => Jne),
    op!(0xFF, 0x76 => Jbe),
    op!(0xFF, 0x77 => Jnbe),
    op!(0xFF, 0x78 => Js),
    op!(0xFF, 0x79 => Jns),
    op!(0xFF, 0x7A => Jp),
    op!(0xFF, 0x7B => Jnp),
    op!(0xFF, 0x7C => Jl),
    op!(0xFF, 0x7D => Jnl),
    op!(0xFF, 0x7E => Jle),
    op!(0xFF, 0x7F => Jnle),
    op!(0xFF, 0xE2 => Loop),
    op!(0xFF, 0xE1 => Loopz),
    op!(0xFF, 0xE0 => Loopnz),
    op!(0xFF, 0xE3 => Jcxz),

    // push, pop
    op!(0xFF, 0xFF, reg = 6 => PushRegMem),
    op!(0xF8, 0x50 => PushReg),
    op!(0xE7, 0x06 => PushSegReg),
    op!(0xFF, 0x8F, reg = 0 => PopRegMem),
    op!(0xF8, 0x58 => PopReg),
    op!(0xE7, 0x07 => PopSegReg),

    // xchg, in, out
    op!(0xFE, 0x86 => XchgRegMemWithReg),
    op!(0xF8, 0x90 => XchgRegWithAcc),
    op!(0xFE, 0xE4 => InFixedPort),
    op!(0xFE, 0xEC => InVariablePort),
    op!(0xFE, 0xE6 => OutFixedPort),
    op!(0xFE, 0xEE => OutVariablePort),

    op!(0xFF, 0xD7 => Xlat),
    op!(0xFF, 0x8D => Lea),
    op!(0xFF, 0xC5 => Lds),
    op!(0xFF, 0xC4 => Les),
    op!(0xFF, 0x9F => Lahf),
    op!(0xFF, 0x9E => Sahf),
    op!(0xFF, 0x9C => Pushf),
    op!(0xFF, 0x9D => Popf),

    // adc, inc
    op!(0xFC, 0x10 => AdcRegMemWithRegToEither),
    op!(0xFE, 0x14 => AdcImToAcc),
    op!(0xFE, 0xFE, reg = 0 => IncRegMem),
    op!(0xF8, 0x40 => IncReg),
    op!(0xFF, 0x37 => Aaa),
    op!(0xFF, 0x27 => Daa),

    // sbb, dec
    op!(0xFC, 0x18 => SbbRegMemWithRegToEither),
    op!(0xFE, 0x1C => SbbImFromAcc),
    op!(0xFE, 0xFE, reg = 1 => DecRegMem),
    op!(0xF8, 0x48 => DecReg),

    // the 0xF6/0xF7 group and ascii adjust
    op!(0xFE, 0xF6, reg = 3 => Neg),
    op!(0xFF, 0x3F => Aas),
    op!(0xFF, 0x2F => Das),
    op!(0xFE, 0xF6, reg = 4 => Mul),
    op!(0xFE, 0xF6, reg = 5 => Imul),
    op!(0xFF, 0xD4, next = 0x0A => Aam),
    op!(0xFE, 0xF6, reg = 6 => Div),
    op!(0xFE, 0xF6, reg = 7 => Idiv),
    op!(0xFF, 0xD5, next = 0x0A => Aad),
    op!(0xFF, 0x98 => Cbw),
    op!(0xFF, 0x99 => Cwd),
    op!(0xFE, 0xF6, reg = 2 => Not),

    // shifts and rotates
    op!(0xFC, 0xD0, reg = 4 => Shl),
    op!(0xFC, 0xD0, reg = 5 => Shr),
    op!(0xFC, 0xD0, reg = 7 => Sar),
    op!(0xFC, 0xD0, reg = 0 => Rol),
    op!(0xFC, 0xD0, reg = 1 => Ror),
    op!(0xFC, 0xD0, reg = 2 => Rcl),
    op!(0xFC, 0xD0, reg = 3 => Rcr),

    // logic
    op!(0xFC, 0x20 => AndRegMemWithRegToEither),
    op!(0xFE, 0x24 => AndImToAcc),
    op!(0xFC, 0x84 => TestRegMemAndReg),
    op!(0xFE, 0xF6, reg = 0 => TestImAndRegMem),
    op!(0xFE, 0xA8 => TestImAndAcc),
    op!(0xFC, 0x08 => OrRegMemWithRegToEither),
    op!(0xFE, 0x0C => OrImToAcc),
    op!(0xFC, 0x30 => XorRegMemWithRegToEither),
    op!(0xFE, 0x34 => XorImToAcc),

    // string manipulation
    op!(0xFF, 0xF3 => Rep),
    op!(0xFF, 0xF2 => Repne),
    op!(0xFE, 0xA4 => Movs),
    op!(0xFE, 0xA6 => Cmps),
    op!(0xFE, 0xAE => Scas),
    op!(0xFE, 0xAC => Lods),
    op!(0xFE, 0xAA => Stos),

    // control transfer
    op!(0xFF, 0xE8 => CallDirectWithinSegment),
    op!(0xFF, 0xFF, reg = 2 => CallIndirectWithinSegment),
    op!(0xFF, 0x9A => CallDirectIntersegment),
    op!(0xFF, 0xFF, reg = 3 => CallIndirectIntersegment),
    op!(0xFF, 0xE9 => JmpDirectWithinSegment),
    op!(0xFF, 0xEB => JmpDirectWithinSegmentShort),
    op!(0xFF, 0xFF, reg = 4 => JmpIndirectWithinSegment),
    op!(0xFF, 0xEA => JmpDirectIntersegment),
    op!(0xFF, 0xFF, reg = 5 => JmpIndirectIntersegment),
    op!(0xFF, 0xC3 => Ret),
    op!(0xFF, 0xC2 => RetImm),
    op!(0xFF, 0xCB => RetIntersegment),
    op!(0xFF, 0xCA => RetIntersegmentImm),
    op!(0xFF, 0xCD => Int),
    op!(0xFF, 0xCC => Int3),
    op!(0xFF, 0xCE => Into),
    op!(0xFF, 0xCF => Iret),

    // processor control
    op!(0xFF, 0xF8 => Clc),
    op!(0xFF, 0xF5 => Cmc),
    op!(0xFF, 0xF9 => Stc),
    op!(0xFF, 0xFC => Cld),
    op!(0xFF, 0xFD => Std),
    op!(0xFF, 0xFA => Cli),
    op!(0xFF, 0xFB => Sti),
    op!(0xFF, 0xF4 => Hlt),
    op!(0xFF, 0x9B => Wait),
    op!(0xF8, 0xD8 => Esc),
    op!(0xFF, 0xF0 => Lock),
];

/// Classify the instruction at the start of `bytes`, the remaining stream starting at `offset`.
/// Only the opcode and, for grouped opcodes, the following byte are inspected; nothing is
/// consumed.
pub fn classify(bytes: &[u8], offset: usize) -> Result<InstructionType, DecodeError> {
    let Some(&byte1) = bytes.first()
    else {
        return Err(DecodeError::Truncated { offset });
    };
    let byte2 = bytes.get(1).copied();
    let mut inspected_byte2 = false;

    for rule in OPCODE_TABLE.iter().filter(|rule| rule.matches_opcode(byte1)) {
        let secondary = match rule.discriminator {
            Discriminator::None => return Ok(rule.kind),
            Discriminator::Reg(reg) => byte2.map(|b| (b >> 3) & 0x07 == reg),
            Discriminator::Byte(value) => byte2.map(|b| b == value),
        };
        inspected_byte2 = true;
        match secondary {
            Some(true) => return Ok(rule.kind),
            Some(false) => continue,
            None => return Err(DecodeError::Truncated { offset }),
        }
    }

    Err(DecodeError::UnknownOpcode {
        offset,
        byte1,
        byte2: if inspected_byte2 { byte2 } else { None },
    })
}

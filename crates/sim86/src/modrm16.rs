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

use crate::{byte_reader::ByteReader, cpu_common::Register};

/// A displacement following a modrm byte, carrying its encoded width.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Displacement {
    #[default]
    NoDisp,
    Disp8(i8),
    Disp16(i16),
}

impl Displacement {
    /// Number of bytes the displacement occupies in the instruction stream.
    pub fn len(&self) -> usize {
        match self {
            Displacement::NoDisp => 0,
            Displacement::Disp8(_) => 1,
            Displacement::Disp16(_) => 2,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Displacement::NoDisp)
    }
}

impl From<Displacement> for i16 {
    fn from(disp: Displacement) -> Self {
        match disp {
            Displacement::NoDisp => 0,
            Displacement::Disp8(d) => d as i16,
            Displacement::Disp16(d) => d,
        }
    }
}

/// The 24 effective address forms of 16-bit addressing.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AddressMode {
    BxSi,
    BxDi,
    BpSi,
    BpDi,
    Si,
    Di,
    Direct,
    Bx,
    BxSiDisp8,
    BxDiDisp8,
    BpSiDisp8,
    BpDiDisp8,
    SiDisp8,
    DiDisp8,
    BpDisp8,
    BxDisp8,
    BxSiDisp16,
    BxDiDisp16,
    BpSiDisp16,
    BpDiDisp16,
    SiDisp16,
    DiDisp16,
    BpDisp16,
    BxDisp16,
}

/// Effective address forms indexed by `[mod][r/m]` for the three memory modes.
pub const ADDRESS_MODE_TABLE: [[AddressMode; 8]; 3] = [
    [
        AddressMode::BxSi,
        AddressMode::BxDi,
        AddressMode::BpSi,
        AddressMode::BpDi,
        AddressMode::Si,
        AddressMode::Di,
        AddressMode::Direct,
        AddressMode::Bx,
    ],
    [
        AddressMode::BxSiDisp8,
        AddressMode::BxDiDisp8,
        AddressMode::BpSiDisp8,
        AddressMode::BpDiDisp8,
        AddressMode::SiDisp8,
        AddressMode::DiDisp8,
        AddressMode::BpDisp8,
        AddressMode::BxDisp8,
    ],
    [
        AddressMode::BxSiDisp16,
        AddressMode::BxDiDisp16,
        AddressMode::BpSiDisp16,
        AddressMode::BpDiDisp16,
        AddressMode::SiDisp16,
        AddressMode::DiDisp16,
        AddressMode::BpDisp16,
        AddressMode::BxDisp16,
    ],
];

impl AddressMode {
    /// The base and index registers summed by this form, in rendering order.
    pub fn registers(&self) -> &'static [Register] {
        match self {
            AddressMode::BxSi | AddressMode::BxSiDisp8 | AddressMode::BxSiDisp16 => &[Register::BX, Register::SI],
            AddressMode::BxDi | AddressMode::BxDiDisp8 | AddressMode::BxDiDisp16 => &[Register::BX, Register::DI],
            AddressMode::BpSi | AddressMode::BpSiDisp8 | AddressMode::BpSiDisp16 => &[Register::BP, Register::SI],
            AddressMode::BpDi | AddressMode::BpDiDisp8 | AddressMode::BpDiDisp16 => &[Register::BP, Register::DI],
            AddressMode::Si | AddressMode::SiDisp8 | AddressMode::SiDisp16 => &[Register::SI],
            AddressMode::Di | AddressMode::DiDisp8 | AddressMode::DiDisp16 => &[Register::DI],
            AddressMode::BpDisp8 | AddressMode::BpDisp16 => &[Register::BP],
            AddressMode::Bx | AddressMode::BxDisp8 | AddressMode::BxDisp16 => &[Register::BX],
            AddressMode::Direct => &[],
        }
    }

    /// Width of the displacement that follows the modrm byte for this form.
    pub fn displacement_len(&self) -> usize {
        match self {
            AddressMode::BxSi
            | AddressMode::BxDi
            | AddressMode::BpSi
            | AddressMode::BpDi
            | AddressMode::Si
            | AddressMode::Di
            | AddressMode::Bx => 0,
            AddressMode::BxSiDisp8
            | AddressMode::BxDiDisp8
            | AddressMode::BpSiDisp8
            | AddressMode::BpDiDisp8
            | AddressMode::SiDisp8
            | AddressMode::DiDisp8
            | AddressMode::BpDisp8
            | AddressMode::BxDisp8 => 1,
            _ => 2,
        }
    }

    #[inline]
    pub fn is_direct(&self) -> bool {
        matches!(self, AddressMode::Direct)
    }
}

/// A decoded memory operand: an effective address form plus its displacement.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct AddressCalculation {
    pub mode: AddressMode,
    pub displacement: i16,
}

impl AddressCalculation {
    pub fn new(mode: AddressMode, displacement: i16) -> Self {
        Self { mode, displacement }
    }

    /// Whether the encoded displacement is wider than the shortest form able to express it. A
    /// zero displacement under `[bp]` is the exception: that form has no displacement-free
    /// encoding.
    pub fn has_oversized_displacement(&self) -> bool {
        match self.mode.displacement_len() {
            1 => self.displacement == 0 && self.mode != AddressMode::BpDisp8,
            2 => !self.mode.is_direct() && i8::try_from(self.displacement).is_ok(),
            _ => false,
        }
    }

    /// A direct `[addr]` operand, as used by the accumulator load/store forms.
    pub fn direct(address: u16) -> Self {
        Self {
            mode: AddressMode::Direct,
            displacement: address as i16,
        }
    }
}

/// Parse the displacement selected by `b_mod` and `b_rm` from `bytes`, returning the number of
/// bytes consumed and the resulting [AddressCalculation]. An 8-bit displacement is
/// sign-extended. `b_mod` must select a memory mode (0b00 to 0b10).
pub fn parse_address_calculation(
    bytes: &mut impl ByteReader,
    b_mod: u8,
    b_rm: u8,
) -> io::Result<(usize, AddressCalculation)> {
    if b_mod > 0b10 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "parse_address_calculation(): register mode has no effective address",
        ));
    }
    let mode = ADDRESS_MODE_TABLE[b_mod as usize][(b_rm & 0x07) as usize];
    let displacement = match mode.displacement_len() {
        0 => Displacement::NoDisp,
        1 => Displacement::Disp8(bytes.read_i8()?),
        _ => Displacement::Disp16(bytes.read_i16()?),
    };
    Ok((displacement.len(), AddressCalculation::new(mode, displacement.into())))
}

#[derive(Copy, Clone, Debug)]
pub struct ModRmByte16 {
    byte: u8,
    b_mod: u8,
    b_reg: u8,
    b_rm: u8,
    addressing_mode: Option<AddressMode>,
}

const MODRM16_TABLE: [ModRmByte16; 256] = {
    let mut table: [ModRmByte16; 256] = [ModRmByte16 {
        byte: 0,
        b_mod: 0,
        b_reg: 0,
        b_rm: 0,
        addressing_mode: None,
    }; 256];
    let mut byte: usize = 0;

    while byte < 256 {
        let b_mod = ((byte >> 6) & 0x03) as u8;
        // 'REG' field specifies either register operand or opcode extension. There's no way
        // to know without knowing the opcode, which we don't
        let b_reg = ((byte >> 3) & 0x07) as u8;
        let b_rm = (byte & 0x07) as u8;

        let addressing_mode = if b_mod == 0b11 {
            None
        }
        else {
            Some(ADDRESS_MODE_TABLE[b_mod as usize][b_rm as usize])
        };

        table[byte] = ModRmByte16 {
            byte: byte as u8,
            b_mod,
            b_reg,
            b_rm,
            addressing_mode,
        };
        byte += 1;
    }

    table
};

impl ModRmByte16 {
    #[inline(always)]
    pub fn from_byte(byte: u8) -> ModRmByte16 {
        MODRM16_TABLE[byte as usize]
    }

    /// Read the modrm byte and look up the appropriate value from the modrm table.
    pub fn read(bytes: &mut impl ByteReader) -> io::Result<ModRmByte16> {
        Ok(ModRmByte16::from_byte(bytes.read_u8()?))
    }

    /// Read the displacement that follows this modrm byte, if it selects a memory operand.
    pub fn read_address(&self, bytes: &mut impl ByteReader) -> io::Result<Option<AddressCalculation>> {
        if !self.is_addressing_mode() {
            return Ok(None);
        }
        let (_, address) = parse_address_calculation(bytes, self.b_mod, self.b_rm)?;
        Ok(Some(address))
    }

    /// Return the 'mod' field (top two bits) of the modrm byte.
    #[inline(always)]
    pub fn mod_value(&self) -> u8 {
        self.b_mod
    }

    #[inline(always)]
    pub fn reg_value(&self) -> u8 {
        self.b_reg
    }

    #[inline(always)]
    pub fn rm_value(&self) -> u8 {
        self.b_rm
    }

    /// Set the 'mod' field (top two bits) of the modrm byte.
    pub fn set_mod(&mut self, b_mod: u8) {
        *self = ModRmByte16::from_byte((self.byte & 0b0011_1111) | ((b_mod & 0x03) << 6));
    }

    /// Set the 'reg' field (middle three bits) of the modrm byte. The argument is assumed to be
    /// an un-shifted 3 bit value (0-7).
    pub fn set_reg(&mut self, reg: u8) {
        *self = ModRmByte16::from_byte((self.byte & 0b1100_0111) | ((reg & 0x07) << 3));
    }

    pub fn set_rm(&mut self, rm: u8) {
        *self = ModRmByte16::from_byte((self.byte & 0b1111_1000) | (rm & 0x07));
    }

    // Interpret the 'R/M' field as a register selector
    #[inline(always)]
    pub fn op1_reg(&self, wide: bool) -> Register {
        Register::from_field(self.b_rm, wide)
    }

    // Interpret the 'REG' field as a register selector
    #[inline(always)]
    pub fn op2_reg(&self, wide: bool) -> Register {
        Register::from_field(self.b_reg, wide)
    }

    // Interpret the 'REG' field as a segment register selector
    #[inline(always)]
    pub fn op2_segment_reg(&self) -> Register {
        Register::segment_from_field(self.b_reg)
    }

    // Interpret the 'REG' field as a 3 bit opcode extension
    #[inline(always)]
    pub fn op_extension(&self) -> u8 {
        self.b_reg
    }

    // Return whether the modrm byte specifies a memory addressing mode
    #[inline(always)]
    pub fn is_addressing_mode(&self) -> bool {
        self.b_mod != 0b11
    }

    #[inline(always)]
    pub fn addressing_mode(&self) -> Option<AddressMode> {
        self.addressing_mode
    }

    /// Number of displacement bytes that follow this modrm byte.
    #[inline(always)]
    pub fn displacement_len(&self) -> usize {
        self.addressing_mode.map_or(0, |mode| mode.displacement_len())
    }

    #[inline(always)]
    pub fn raw_byte(&self) -> u8 {
        self.byte
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn direct_address_forces_disp16() {
        let modrm = ModRmByte16::from_byte(0b00_011_110);
        assert_eq!(modrm.addressing_mode(), Some(AddressMode::Direct));
        assert_eq!(modrm.displacement_len(), 2);

        let mut cursor = Cursor::new(&[0x34u8, 0x12][..]);
        let (consumed, address) = parse_address_calculation(&mut cursor, 0b00, 0b110).unwrap();
        assert_eq!(consumed, 2);
        assert_eq!(address, AddressCalculation::direct(0x1234));
        assert!(!address.has_oversized_displacement());
    }

    #[test]
    fn disp8_is_sign_extended() {
        let mut cursor = Cursor::new(&[0xDBu8][..]);
        let (consumed, address) = parse_address_calculation(&mut cursor, 0b01, 0b011).unwrap();
        assert_eq!(consumed, 1);
        assert_eq!(address.mode, AddressMode::BpDiDisp8);
        assert_eq!(address.displacement, -37);
    }

    #[test]
    fn register_mode_has_no_address() {
        let modrm = ModRmByte16::from_byte(0b11_000_011);
        assert!(!modrm.is_addressing_mode());
        assert_eq!(modrm.op1_reg(true), Register::BX);
        assert_eq!(modrm.op1_reg(false), Register::BL);
        let mut cursor = Cursor::new(&[0u8; 0][..]);
        assert_eq!(modrm.read_address(&mut cursor).unwrap(), None);
    }

    #[test]
    fn every_memory_form_is_reachable() {
        let mut seen = std::collections::HashSet::new();
        for byte in 0..=0xBFu8 {
            let modrm = ModRmByte16::from_byte(byte);
            seen.insert(modrm.addressing_mode().unwrap());
        }
        assert_eq!(seen.len(), 24);
    }

    #[test]
    fn setters_update_fields() {
        let mut modrm = ModRmByte16::from_byte(0);
        modrm.set_mod(0b01);
        modrm.set_reg(0b101);
        modrm.set_rm(0b110);
        assert_eq!(modrm.raw_byte(), 0b01_101_110);
        assert_eq!(modrm.addressing_mode(), Some(AddressMode::BpDisp8));
        assert_eq!(modrm.op_extension(), 5);
    }

    #[test]
    fn oversized_displacements() {
        assert!(!AddressCalculation::new(AddressMode::BxSi, 0).has_oversized_displacement());
        assert!(!AddressCalculation::new(AddressMode::BpDisp8, 0).has_oversized_displacement());
        assert!(AddressCalculation::new(AddressMode::BxDiDisp8, 0).has_oversized_displacement());
        assert!(!AddressCalculation::new(AddressMode::BxDiDisp8, -37).has_oversized_displacement());
        assert!(AddressCalculation::new(AddressMode::BxDisp16, 4).has_oversized_displacement());
        assert!(AddressCalculation::new(AddressMode::BpDisp16, -128).has_oversized_displacement());
        assert!(!AddressCalculation::new(AddressMode::SiDisp16, 4999).has_oversized_displacement());
        assert!(!AddressCalculation::direct(4).has_oversized_displacement());
    }
}

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

use std::fmt::{Display, Formatter};

use crate::{cpu_common::Register, error::SimulationError};

pub const REGISTER_FILE_SIZE: usize = 24;
pub const MEMORY_SIZE: usize = 1024 * 1024;

/// The condition flags tracked by the simulator, in the order they are listed in traces.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Flag {
    Carry,
    Parity,
    AuxiliaryCarry,
    Zero,
    Sign,
    Overflow,
}

impl Flag {
    pub const ALL: [Flag; 6] = [
        Flag::Carry,
        Flag::Parity,
        Flag::AuxiliaryCarry,
        Flag::Zero,
        Flag::Sign,
        Flag::Overflow,
    ];

    #[inline]
    fn mask(&self) -> u8 {
        1 << (*self as u8)
    }

    pub fn letter(&self) -> char {
        match self {
            Flag::Carry => 'C',
            Flag::Parity => 'P',
            Flag::AuxiliaryCarry => 'A',
            Flag::Zero => 'Z',
            Flag::Sign => 'S',
            Flag::Overflow => 'O',
        }
    }
}

/// A set of flags, displayed as the letters of the flags that are set (`PZ`).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FlagSet(u8);

impl FlagSet {
    pub fn contains(&self, flag: Flag) -> bool {
        self.0 & flag.mask() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl Display for FlagSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for flag in Flag::ALL {
            if self.contains(flag) {
                write!(f, "{}", flag.letter())?;
            }
        }
        Ok(())
    }
}

/// Byte offset of a register within the register file. Word registers are stored little-endian,
/// so the low byte alias shares the word's offset and the high byte alias follows it.
fn register_slot(reg: Register) -> usize {
    match reg {
        Register::AX | Register::AL => 0,
        Register::AH => 1,
        Register::CX | Register::CL => 2,
        Register::CH => 3,
        Register::DX | Register::DL => 4,
        Register::DH => 5,
        Register::BX | Register::BL => 6,
        Register::BH => 7,
        Register::SP => 8,
        Register::BP => 10,
        Register::SI => 12,
        Register::DI => 14,
        Register::ES => 16,
        Register::CS => 18,
        Register::SS => 20,
        Register::DS => 22,
    }
}

/// Processor state for the simulator: register file, flags, instruction pointer and a flat
/// 1 MiB memory. Everything starts zeroed.
#[derive(Clone)]
pub struct ExecutionContext {
    registers: [u8; REGISTER_FILE_SIZE],
    flags: FlagSet,
    ip: u16,
    memory: Box<[u8]>,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("registers", &self.registers)
            .field("flags", &self.flags)
            .field("ip", &self.ip)
            .finish_non_exhaustive()
    }
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self {
            registers: [0; REGISTER_FILE_SIZE],
            flags: FlagSet::default(),
            ip: 0,
            memory: vec![0; MEMORY_SIZE].into_boxed_slice(),
        }
    }

    /// Write a register. Byte registers take the low 8 bits of `value` and leave the other half
    /// of their word untouched.
    pub fn set_register(&mut self, reg: Register, value: u16) {
        let slot = register_slot(reg);
        if reg.is_wide() {
            self.registers[slot..slot + 2].copy_from_slice(&value.to_le_bytes());
        }
        else {
            self.registers[slot] = value as u8;
        }
    }

    /// Read a register. Byte registers are zero-extended.
    pub fn get_register(&self, reg: Register) -> u16 {
        let slot = register_slot(reg);
        if reg.is_wide() {
            u16::from_le_bytes([self.registers[slot], self.registers[slot + 1]])
        }
        else {
            self.registers[slot] as u16
        }
    }

    pub fn set_register_by_name(&mut self, name: &str, value: u16) -> Result<(), SimulationError> {
        self.set_register(name.parse()?, value);
        Ok(())
    }

    pub fn get_register_by_name(&self, name: &str) -> Result<u16, SimulationError> {
        Ok(self.get_register(name.parse()?))
    }

    /// The raw register file.
    pub fn registers(&self) -> &[u8; REGISTER_FILE_SIZE] {
        &self.registers
    }

    pub fn flag(&self, flag: Flag) -> bool {
        self.flags.contains(flag)
    }

    pub fn set_flag(&mut self, flag: Flag, value: bool) {
        if value {
            self.flags.0 |= flag.mask();
        }
        else {
            self.flags.0 &= !flag.mask();
        }
    }

    pub fn clear_flags(&mut self) {
        self.flags = FlagSet::default();
    }

    pub fn flags(&self) -> FlagSet {
        self.flags
    }

    pub fn ip(&self) -> u16 {
        self.ip
    }

    pub fn set_ip(&mut self, ip: u16) {
        self.ip = ip;
    }

    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut [u8] {
        &mut self.memory
    }
}

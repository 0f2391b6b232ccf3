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

use std::fmt::{Display, Formatter, Write};

use crate::{
    cpu_common::Register,
    formatter::{format_instruction, FormatOptions},
    instruction::Instruction,
    simulator::context::{ExecutionContext, FlagSet},
};

/// Word registers in the order they are reported.
const REPORTED_REGISTERS: [Register; 12] = [
    Register::AX,
    Register::BX,
    Register::CX,
    Register::DX,
    Register::SP,
    Register::BP,
    Register::SI,
    Register::DI,
    Register::ES,
    Register::CS,
    Register::SS,
    Register::DS,
];

/// The observable processor state, minus memory.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StateSnapshot {
    pub registers: [u16; 12],
    pub flags: FlagSet,
    pub ip: u16,
}

impl StateSnapshot {
    pub fn capture(context: &ExecutionContext) -> Self {
        Self {
            registers: REPORTED_REGISTERS.map(|reg| context.get_register(reg)),
            flags: context.flags(),
            ip: context.ip(),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RegisterChange {
    pub register: Register,
    pub before: u16,
    pub after: u16,
}

impl Display for RegisterChange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{:#x}->{:#x}", self.register, self.before, self.after)
    }
}

/// What one instruction did to the processor state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceEntry {
    pub instruction: Instruction,
    pub changes: Vec<RegisterChange>,
    pub ip_before: u16,
    pub ip_after: u16,
    pub flags_before: FlagSet,
    pub flags_after: FlagSet,
}

impl TraceEntry {
    pub fn new(instruction: Instruction, before: &StateSnapshot, context: &ExecutionContext) -> Self {
        let after = StateSnapshot::capture(context);
        let changes = REPORTED_REGISTERS
            .iter()
            .zip(before.registers.iter().zip(after.registers.iter()))
            .filter(|(_, (b, a))| b != a)
            .map(|(reg, (b, a))| RegisterChange {
                register: *reg,
                before: *b,
                after: *a,
            })
            .collect();

        Self {
            instruction,
            changes,
            ip_before: before.ip,
            ip_after: after.ip,
            flags_before: before.flags,
            flags_after: after.flags,
        }
    }
}

impl Display for TraceEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let text = format_instruction(&self.instruction, &FormatOptions::default());
        write!(f, "{text} ;")?;
        for change in &self.changes {
            write!(f, " {change}")?;
        }
        write!(f, " ip:{:#x}->{:#x}", self.ip_before, self.ip_after)?;
        if self.flags_before != self.flags_after {
            write!(f, " flags:{}->{}", self.flags_before, self.flags_after)?;
        }
        Ok(())
    }
}

/// Summarize the final state: every non-zero register, the instruction pointer and the set
/// flags.
pub fn register_report(context: &ExecutionContext) -> String {
    let mut report = String::from("Final registers:\n");
    let snapshot = StateSnapshot::capture(context);

    for (reg, value) in REPORTED_REGISTERS.iter().zip(snapshot.registers) {
        if value != 0 {
            // Writing to a String cannot fail.
            let _ = writeln!(report, "      {reg}: {value:#06x} ({value})");
        }
    }
    let _ = writeln!(report, "      ip: {:#06x} ({})", snapshot.ip, snapshot.ip);
    if !snapshot.flags.is_empty() {
        let _ = writeln!(report, "   flags: {}", snapshot.flags);
    }
    report
}

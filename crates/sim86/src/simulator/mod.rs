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

//! Register-level execution of decoded instructions.
//!
//! Moves, additions, subtractions and comparisons between registers and immediates are
//! supported. Memory operands and every other instruction fail with a [SimulationError].

pub mod context;
pub mod trace;

use tracing::{debug, trace};

pub use context::{ExecutionContext, Flag, FlagSet};
pub use trace::{register_report, RegisterChange, StateSnapshot, TraceEntry};

use crate::{cpu_common::Register, error::SimulationError, instruction::Instruction, operand::DataLocation};

/// Resolve the value of a source operand.
fn read_location(context: &ExecutionContext, location: &DataLocation) -> Result<u16, SimulationError> {
    match *location {
        DataLocation::Register(reg) => Ok(context.get_register(reg)),
        DataLocation::Immediate { value, .. } => Ok(value as u16),
        DataLocation::Memory { .. } => Err(SimulationError::MemoryOperand),
        DataLocation::Label(_) => Err(SimulationError::InvalidSource(location.kind_name())),
    }
}

/// Resolve the register an instruction writes to.
fn destination_register(inst: &Instruction) -> Result<Register, SimulationError> {
    match inst.destination {
        Some(DataLocation::Register(reg)) => Ok(reg),
        Some(DataLocation::Memory { .. }) => Err(SimulationError::MemoryOperand),
        Some(other) => Err(SimulationError::InvalidDestination(other.kind_name())),
        None => Err(SimulationError::MissingDestination(inst.mnemonic())),
    }
}

fn source_value(context: &ExecutionContext, inst: &Instruction) -> Result<u16, SimulationError> {
    let source = inst
        .source
        .as_ref()
        .ok_or(SimulationError::MissingSource(inst.mnemonic()))?;
    read_location(context, source)
}

fn write_register(context: &mut ExecutionContext, reg: Register, value: u16) {
    context.set_register(reg, value);
    debug!("{reg} <- {:#x}", context.get_register(reg));
}

/// Set zero, sign and parity from a result of the destination's width. Parity counts the set
/// bits of the whole result.
fn update_result_flags(context: &mut ExecutionContext, result: u16, wide: bool) {
    let sign_bit = if wide { 0x8000 } else { 0x80 };
    context.set_flag(Flag::Zero, result == 0);
    context.set_flag(Flag::Sign, result & sign_bit != 0);
    context.set_flag(Flag::Parity, result.count_ones() % 2 == 0);
}

/// Apply a binary arithmetic operation to a register destination, storing the truncated result
/// and updating the result flags. With `clear_flags`, every flag is reset first.
fn arithmetic(
    context: &mut ExecutionContext,
    inst: &Instruction,
    op: fn(u16, u16) -> u16,
    clear_flags: bool,
) -> Result<(), SimulationError> {
    let reg = destination_register(inst)?;
    let lhs = context.get_register(reg);
    let rhs = source_value(context, inst)?;

    let wide = reg.is_wide();
    let mut result = op(lhs, rhs);
    if !wide {
        result &= 0x00FF;
    }

    // Flags are only touched once both operands resolved.
    if clear_flags {
        context.clear_flags();
    }
    write_register(context, reg, result);
    update_result_flags(context, result, wide);
    Ok(())
}

/// Execute a single instruction, advancing the instruction pointer past it on success.
pub fn simulate_instruction(context: &mut ExecutionContext, inst: &Instruction) -> Result<(), SimulationError> {
    trace!(address = inst.address, "simulating {:?}", inst.kind);

    let kind = inst.kind;
    if kind.is_move() {
        let reg = destination_register(inst)?;
        let value = source_value(context, inst)?;
        write_register(context, reg, value);
    }
    else if kind.is_add() {
        arithmetic(context, inst, u16::wrapping_add, false)?;
    }
    else if kind.is_sub() {
        arithmetic(context, inst, u16::wrapping_sub, true)?;
    }
    else if kind.is_cmp() {
        // Operands are checked, but the comparison result is not applied yet.
        destination_register(inst)?;
        source_value(context, inst)?;
        context.clear_flags();
    }
    else {
        return Err(SimulationError::NotImplemented {
            mnemonic: kind.mnemonic(),
            tag: kind as u8,
        });
    }

    context.set_ip(context.ip().wrapping_add(inst.size as u16));
    Ok(())
}

/// Execute instructions in order, stopping at the first one that cannot be simulated.
pub fn simulate<'a>(
    context: &mut ExecutionContext,
    instructions: impl IntoIterator<Item = &'a Instruction>,
) -> Result<(), SimulationError> {
    for inst in instructions {
        simulate_instruction(context, inst)?;
    }
    Ok(())
}

/// Like [simulate], recording the state changes made by each instruction.
pub fn simulate_traced<'a>(
    context: &mut ExecutionContext,
    instructions: impl IntoIterator<Item = &'a Instruction>,
) -> Result<Vec<TraceEntry>, SimulationError> {
    let mut entries = Vec::new();
    for inst in instructions {
        let before = StateSnapshot::capture(context);
        simulate_instruction(context, inst)?;
        entries.push(TraceEntry::new(*inst, &before, context));
    }
    Ok(entries)
}

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

use crate::{
    formatter::{Format, FormatOptions, FormatterOutput},
    instruction::Instruction,
    instruction_type::InstructionType,
    label::LabelName,
    modrm16::AddressCalculation,
    operand::DataLocation,
};

/// NASM-style formatter
#[derive(Copy, Clone, Debug, Default)]
pub struct NasmFormatter;

impl Format for NasmFormatter {
    fn format_mnemonic(&self, inst: &Instruction, opts: &FormatOptions, out: &mut dyn FormatterOutput) {
        let mut m = inst.mnemonic().to_string();

        // String ops carry their width in a suffix since they have no operands to size.
        if inst.kind.is_string_manipulation() {
            m.push(if inst.wide { 'w' } else { 'b' });
        }

        if opts.uppercase_mnemonic {
            out.write_mnemonic(&m.to_ascii_uppercase());
        }
        else {
            out.write_mnemonic(&m);
        }
    }

    fn format_operands(&self, inst: &Instruction, opts: &FormatOptions, out: &mut dyn FormatterOutput) {
        if let Some(destination) = &inst.destination {
            self.format_operand(inst, destination, opts, out);
        }
        if let Some(source) = &inst.source {
            if inst.destination.is_some() {
                out.write_separator(",");
                out.write_separator(" ");
            }
            self.format_operand(inst, source, opts, out);
        }
    }
}

impl NasmFormatter {
    /// Print disambiguator ('byte', 'word') if the location carries a visible size.
    fn format_disambiguation(&self, location: &DataLocation, out: &mut dyn FormatterOutput) {
        let wide = match *location {
            DataLocation::Memory {
                wide, hide_size: false, ..
            }
            | DataLocation::Immediate {
                wide, hide_size: false, ..
            } => wide,
            _ => return,
        };
        out.write_keyword(if wide { "word" } else { "byte" });
        out.write_separator(" ");
    }

    fn format_operand(
        &self,
        inst: &Instruction,
        location: &DataLocation,
        _opts: &FormatOptions,
        out: &mut dyn FormatterOutput,
    ) {
        match *location {
            DataLocation::Register(reg) => out.write_register(reg.name()),
            DataLocation::Memory { address, .. } => {
                if inst.kind.is_far_indirect() {
                    out.write_keyword("far");
                    out.write_separator(" ");
                }
                self.format_disambiguation(location, out);
                self.format_address(&address, out);
            }
            DataLocation::Immediate { value, hide_size, .. } => {
                // A word immediate in byte range would be reassembled in its sign-extended form.
                if inst.kind.has_short_immediate_form()
                    && location.encoded_len() == Some(2)
                    && i8::try_from(value).is_ok()
                {
                    out.write_keyword("strict");
                    out.write_separator(" ");
                }
                self.format_disambiguation(location, out);
                if hide_size {
                    out.write_immediate(&(value as u16).to_string());
                }
                else {
                    out.write_immediate(&value.to_string());
                }
            }
            DataLocation::Label(target) => {
                // A rel16 jump would otherwise be shortened by the assembler.
                if inst.kind == InstructionType::JmpDirectWithinSegment {
                    out.write_keyword("near");
                    out.write_separator(" ");
                }
                out.write_relative(&LabelName(target).to_string());
            }
        }
    }

    fn format_address(&self, address: &AddressCalculation, out: &mut dyn FormatterOutput) {
        out.write_separator("[");
        if address.mode.is_direct() {
            out.write_displacement(&(address.displacement as u16).to_string());
            out.write_separator("]");
            return;
        }

        if address.has_oversized_displacement() {
            out.write_keyword(if address.mode.displacement_len() == 2 { "word" } else { "byte" });
            out.write_separator(" ");
        }

        for (i, reg) in address.mode.registers().iter().enumerate() {
            if i > 0 {
                out.write_separator(" ");
                out.write_symbol("+");
                out.write_separator(" ");
            }
            out.write_register(reg.name());
        }

        if address.mode.displacement_len() > 0 {
            out.write_separator(" ");
            if address.displacement < 0 {
                out.write_symbol("-");
            }
            else {
                out.write_symbol("+");
            }
            out.write_separator(" ");
            out.write_displacement(&address.displacement.unsigned_abs().to_string());
        }
        out.write_separator("]");
    }
}

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

use iced_x86::Formatter;
use sim86::prelude::*;

/// Render each instruction of a fully decodable stream on its own, without labels.
pub fn render_lines(bytes: &[u8]) -> Vec<String> {
    let program = disassemble(bytes).expect("stream decodes");
    program
        .iter()
        .map(|inst| format_instruction(inst, &FormatOptions::default()))
        .collect()
}

/// Render a whole listing, labels included.
pub fn render_listing(bytes: &[u8]) -> String {
    let program = disassemble(bytes).expect("stream decodes");
    format_program(&program, &FormatOptions::default())
}

/// Format with iced's NASM formatter, configured to match our operand conventions: decimal
/// numbers, signed immediates and displacements, spaced separators and zero displacements kept.
pub fn format_iced_instruction(iced_i: &iced_x86::Instruction) -> String {
    let mut instr_text = String::new();
    let mut formatter = iced_x86::NasmFormatter::new();

    formatter.options_mut().set_number_base(iced_x86::NumberBase::Decimal);
    formatter.options_mut().set_memory_size_options(iced_x86::MemorySizeOptions::Never);
    formatter.options_mut().set_space_after_operand_separator(true);
    formatter.options_mut().set_space_between_memory_add_operators(true);
    formatter.options_mut().set_show_zero_displacements(true);
    formatter.options_mut().set_signed_immediate_operands(true);
    formatter.options_mut().set_always_show_segment_register(false);
    formatter.options_mut().set_use_pseudo_ops(false);

    formatter.format(iced_i, &mut instr_text);
    instr_text
}

/// Format with our formatter, dropping the size and encoding qualifiers iced leaves out.
pub fn format_sim86_instruction(inst: &Instruction) -> String {
    let mut output = String::new();
    NasmFormatter.format_instruction(inst, &FormatOptions::default(), &mut output);

    output.replace("strict ", "").replace("word ", "").replace("byte ", "")
}

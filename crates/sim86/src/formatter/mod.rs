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

pub mod nasm_formatter;
pub mod tokens;

use crate::formatter::nasm_formatter::NasmFormatter;
/// Re-export token types at the formatter module root for convenient access
pub use tokens::{DecoratorToken, SemanticToken, Token, TokenItem, TokenStream};

use crate::{decoder::Disassembly, instruction::Instruction, label::LabelName};

/// Options controlling disassembly formatting
#[derive(Copy, Clone, Debug)]
pub struct FormatOptions {
    /// If true, render mnemonic in uppercase; otherwise lowercase.
    pub uppercase_mnemonic: bool,
    /// If true, only output the mnemonic, no operands
    pub mnemonic_only: bool,
    /// If true, a program listing starts with the `bits 16` directive.
    pub bits_directive: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            uppercase_mnemonic: false,
            mnemonic_only: false,
            bits_directive: true,
        }
    }
}

/// Output sink for formatting tokens. Implement this to capture rich tokens
/// (e.g., for colorizing) or to accumulate plain text.
pub trait FormatterOutput {
    /// Fallback text writer for any token type
    fn write_text(&mut self, s: &str);

    /// Specific token helpers (default to write_text)
    fn write_keyword(&mut self, s: &str) {
        self.write_text(s)
    }

    fn write_register(&mut self, s: &str) {
        self.write_text(s)
    }
    fn write_mnemonic(&mut self, s: &str) {
        self.write_text(s)
    }

    fn write_immediate(&mut self, s: &str) {
        self.write_text(s)
    }

    /// A reference to a branch target label.
    fn write_relative(&mut self, s: &str) {
        self.write_text(s)
    }
    fn write_displacement(&mut self, s: &str) {
        self.write_text(s)
    }
    fn write_separator(&mut self, s: &str) {
        self.write_text(s)
    }

    fn write_symbol(&mut self, s: &str) {
        self.write_text(s)
    }

    /// A label declaration, without the trailing colon.
    fn write_label(&mut self, s: &str) {
        self.write_text(s)
    }
}

/// Provide a basic String sink implementation
impl FormatterOutput for String {
    fn write_text(&mut self, s: &str) {
        self.push_str(s);
    }
}

/// Trait for disassembly formatting styles
pub trait Format {
    /// Emit the mnemonic token without leading/trailing spaces.
    fn format_mnemonic(&self, inst: &Instruction, opts: &FormatOptions, out: &mut dyn FormatterOutput);
    /// Emit operands, separated by commas, without a leading separator.
    fn format_operands(&self, inst: &Instruction, opts: &FormatOptions, out: &mut dyn FormatterOutput);

    /// Compose the full instruction from parts (default behavior)
    fn format_instruction(&self, inst: &Instruction, opts: &FormatOptions, out: &mut dyn FormatterOutput) {
        self.format_mnemonic(inst, opts, out);

        if opts.mnemonic_only || !inst.has_operands() {
            return;
        }
        out.write_separator(" ");
        self.format_operands(inst, opts, out);
    }

    /// Emit a label declaration line body.
    fn format_label(&self, offset: i32, out: &mut dyn FormatterOutput) {
        out.write_label(&LabelName(offset).to_string());
        out.write_symbol(":");
    }

    /// Emit a label defined relative to the start of the program, for targets that do not fall
    /// on an instruction boundary.
    fn format_equate(&self, offset: i32, out: &mut dyn FormatterOutput) {
        out.write_label(&LabelName(offset).to_string());
        out.write_separator(" ");
        out.write_keyword("equ");
        out.write_separator(" ");
        out.write_symbol("$$");
        out.write_separator(" ");
        out.write_symbol(if offset < 0 { "-" } else { "+" });
        out.write_separator(" ");
        out.write_displacement(&offset.unsigned_abs().to_string());
    }

    /// Emit a whole program: the optional directive line, then one line per instruction with
    /// each label declared right before the instruction it names. Labels at the end of the
    /// stream follow the last instruction. Any other target is emitted as an equate at the end.
    fn format_program(&self, program: &Disassembly, opts: &FormatOptions, out: &mut dyn FormatterOutput) {
        if opts.bits_directive {
            out.write_keyword("bits");
            out.write_separator(" ");
            out.write_immediate("16");
            out.write_separator("\n");
        }

        let mut labels = program.labels.iter().peekable();
        let mut unaligned = Vec::new();
        let mut offset: i64 = 0;

        for inst in program.iter() {
            while let Some(label) = labels.next_if(|&label| label as i64 <= offset) {
                if label as i64 == offset {
                    self.format_label(label, out);
                    out.write_separator("\n");
                }
                else {
                    unaligned.push(label);
                }
            }
            self.format_instruction(inst, opts, out);
            out.write_separator("\n");
            offset += inst.size as i64;
        }

        for label in labels {
            if label as i64 == offset {
                self.format_label(label, out);
                out.write_separator("\n");
            }
            else {
                unaligned.push(label);
            }
        }

        for label in unaligned {
            self.format_equate(label, out);
            out.write_separator("\n");
        }
    }
}

/// Convenience helper using NASM-style by default; returns a flat String
pub fn format_instruction(inst: &Instruction, opts: &FormatOptions) -> String {
    let mut s = String::new();
    NasmFormatter.format_instruction(inst, opts, &mut s);
    s
}

/// Render a decoded program as NASM source.
pub fn format_program(program: &Disassembly, opts: &FormatOptions) -> String {
    let mut s = String::new();
    NasmFormatter.format_program(program, opts, &mut s);
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::disassemble;

    #[test]
    fn format_hlt_lowercase() {
        let program = disassemble(&[0xF4]).expect("decode ok");
        let s = format_instruction(&program.instructions[0], &FormatOptions::default());
        assert_eq!(s, "hlt");
    }

    #[test]
    fn format_uppercase() {
        let program = disassemble(&[0x89, 0xD9]).expect("decode ok");
        let mut s = String::new();
        NasmFormatter.format_instruction(
            &program.instructions[0],
            &FormatOptions {
                uppercase_mnemonic: true,
                ..Default::default()
            },
            &mut s,
        );
        assert_eq!(s, "MOV cx, bx");
    }

    #[test]
    fn mnemonic_only() {
        let program = disassemble(&[0x89, 0xD9]).expect("decode ok");
        let opts = FormatOptions {
            mnemonic_only: true,
            ..Default::default()
        };
        assert_eq!(format_instruction(&program.instructions[0], &opts), "mov");
    }

    #[test]
    fn program_declares_labels_before_their_target() {
        // 0: dec cx / 1: jne 0 / 3: je 7 / 5: nop / 6: nop / 7: hlt
        let program = disassemble(&[0x49, 0x75, 0xFD, 0x74, 0x02, 0x90, 0x90, 0xF4]).expect("decode ok");
        assert_eq!(program.labels.as_slice(), &[0, 7]);
        let text = format_program(&program, &FormatOptions::default());
        assert_eq!(
            text,
            "bits 16\n\
             label_0:\n\
             dec cx\n\
             jne label_0\n\
             je label_7\n\
             xchg ax, ax\n\
             xchg ax, ax\n\
             label_7:\n\
             hlt\n"
        );
    }

    fn listing(bytes: &[u8]) -> String {
        let program = disassemble(bytes).expect("decode ok");
        let opts = FormatOptions {
            bits_directive: false,
            ..Default::default()
        };
        format_program(&program, &opts)
    }

    #[test]
    fn label_at_end_of_stream_follows_last_instruction() {
        assert_eq!(listing(&[0xEB, 0x00]), "jmp label_2\nlabel_2:\n");
    }

    #[test]
    fn labels_off_instruction_boundaries_become_equates() {
        // Target inside the jump's own displacement byte.
        assert_eq!(listing(&[0xEB, 0xFF, 0x90]), "jmp label_1\nxchg ax, ax\nlabel_1 equ $$ + 1\n");
        assert_eq!(listing(&[0xEB, 0x10]), "jmp label_18\nlabel_18 equ $$ + 18\n");
        assert_eq!(listing(&[0xEB, 0xFC]), "jmp label_neg2\nlabel_neg2 equ $$ - 2\n");
        assert_eq!(
            listing(&[0x90, 0xEB, 0xFD, 0x74, 0xFD]),
            "label_0:\nxchg ax, ax\njmp label_0\nje label_2\nlabel_2 equ $$ + 2\n"
        );
    }
}

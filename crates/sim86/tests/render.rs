mod common;

use sim86::prelude::*;

use crate::common::{
    format::{render_lines, render_listing},
    init_tests,
};

#[test]
fn register_and_memory_moves() {
    init_tests();
    #[rustfmt::skip]
    let bytes = [
        0x89, 0xD9,
        0x88, 0xE5,
        0x8B, 0x5E, 0x00,
        0x8A, 0x00,
        0x89, 0x09,
        0xC6, 0x03, 0x07,
        0x8B, 0x0E, 0x82, 0x0D,
        0xA1, 0x10, 0x00,
        0xA3, 0xFA, 0x09,
    ];
    assert_eq!(render_lines(&bytes), [
        "mov cx, bx",
        "mov ch, ah",
        "mov bx, word [bp + 0]",
        "mov al, byte [bx + si]",
        "mov word [bx + di], cx",
        "mov byte [bp + di], byte 7",
        "mov cx, word [3458]",
        "mov ax, word [16]",
        "mov word [2554], ax",
    ]);
}

#[test]
fn arithmetic() {
    init_tests();
    #[rustfmt::skip]
    let bytes = [
        0x03, 0x18,
        0x83, 0xC6, 0x02,
        0x04, 0x09,
        0x2B, 0x5E, 0x00,
        0x80, 0x2F, 0x22,
        0x3D, 0xE8, 0x03,
        0x38, 0xC4,
    ];
    assert_eq!(render_lines(&bytes), [
        "add bx, word [bx + si]",
        "add si, word 2",
        "add al, byte 9",
        "sub bx, word [bp + 0]",
        "sub byte [bx], byte 34",
        "cmp ax, word 1000",
        "cmp ah, al",
    ]);
}

#[test]
fn jumps_declare_labels() {
    init_tests();
    #[rustfmt::skip]
    let bytes = [
        0x75, 0x02, // 0: jne 4
        0xFE, 0xC0, // 2: inc al
        0xE2, 0xFA, // 4: loop 0
        0x74, 0xFE, // 6: je 6
        0xE3, 0x00, // 8: jcxz 10
    ];
    assert_eq!(
        render_listing(&bytes),
        "bits 16\n\
         label_0:\n\
         jne label_4\n\
         inc al\n\
         label_4:\n\
         loop label_0\n\
         label_6:\n\
         je label_6\n\
         jcxz label_10\n\
         label_10:\n"
    );
}

#[test]
fn mid_instruction_target_is_an_equate() {
    init_tests();
    assert_eq!(
        render_listing(&[0xEB, 0xFF, 0x90]),
        "bits 16\njmp label_1\nxchg ax, ax\nlabel_1 equ $$ + 1\n"
    );
}

#[test]
fn encoded_widths_are_kept() {
    init_tests();
    #[rustfmt::skip]
    let bytes = [
        0x8B, 0x87, 0x04, 0x00,
        0x8B, 0x41, 0x00,
        0x81, 0xC1, 0x05, 0x00,
        0x3D, 0x7F, 0x00,
    ];
    assert_eq!(render_lines(&bytes), [
        "mov ax, word [word bx + 4]",
        "mov ax, word [byte bx + di + 0]",
        "add cx, strict word 5",
        "cmp ax, strict word 127",
    ]);
}

#[test]
fn stack_io_and_string_forms() {
    init_tests();
    #[rustfmt::skip]
    let bytes = [
        0x50,
        0x0E,
        0x1F,
        0xFF, 0x36, 0x10, 0x00,
        0x8F, 0x47, 0x02,
        0x87, 0xCA,
        0x91,
        0xE5, 0x60,
        0xEE,
        0xCD, 0x21,
        0xCC,
        0xF7, 0xD8,
        0xF6, 0x26, 0xF4, 0x01,
        0xD1, 0xE3,
        0xD2, 0x4F, 0x03,
        0xA4,
        0xF3,
        0xAB,
        0xC2, 0x04, 0x00,
        0xC3,
    ];
    assert_eq!(render_lines(&bytes), [
        "push ax",
        "push cs",
        "pop ds",
        "push word [16]",
        "pop word [bx + 2]",
        "xchg cx, dx",
        "xchg ax, cx",
        "in ax, 96",
        "out dx, al",
        "int 33",
        "int3",
        "neg ax",
        "mul byte [500]",
        "shl bx, 1",
        "ror byte [bx + 3], cl",
        "movsb",
        "rep",
        "stosw",
        "ret 4",
        "ret",
    ]);
}

#[test]
fn uppercase_only_touches_mnemonics() {
    init_tests();
    let program = disassemble(&[0x8B, 0x5E, 0x00, 0x75, 0xFB]).expect("decode ok");
    let opts = FormatOptions {
        uppercase_mnemonic: true,
        bits_directive: false,
        ..Default::default()
    };
    assert_eq!(
        format_program(&program, &opts),
        "label_0:\nMOV bx, word [bp + 0]\nJNE label_0\n"
    );
}

#[test]
fn partial_decode_can_still_be_rendered() {
    init_tests();
    let err = disassemble(&[0xB8, 0x01, 0x00, 0xD6, 0x01]).unwrap_err();
    assert_eq!(err.error.offset(), 3);
    assert_eq!(err.error.to_string(), "opcode 11010110 not implemented (offset 3)");
    assert_eq!(
        format_program(&err.decoded, &FormatOptions::default()),
        "bits 16\nmov ax, word 1\n"
    );
}

#[test]
fn token_stream_matches_plain_text() {
    init_tests();
    let program = disassemble(&[0x8B, 0x41, 0x04, 0xFF, 0x2F, 0xEB, 0xFE]).expect("decode ok");

    let mut tokens = TokenStream::new();
    NasmFormatter.format_program(&program, &FormatOptions::default(), &mut tokens);
    assert_eq!(tokens.to_string_flat(), format_program(&program, &FormatOptions::default()));
}

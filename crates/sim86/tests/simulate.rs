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

mod common;

use sim86::{
    prelude::*,
    simulator::{register_report, FlagSet},
};

use crate::common::init_tests;

#[test]
fn immediate_and_register_moves() {
    init_tests();
    #[rustfmt::skip]
    let bytes = [
        0xB8, 0x01, 0x00, // mov ax, 1
        0xBB, 0x02, 0x00, // mov bx, 2
        0xB9, 0x03, 0x00, // mov cx, 3
        0xBA, 0x04, 0x00, // mov dx, 4
        0x89, 0xC4,       // mov sp, ax
        0x89, 0xDD,       // mov bp, bx
        0x89, 0xCE,       // mov si, cx
        0x89, 0xD7,       // mov di, dx
        0x88, 0xC7,       // mov bh, al
    ];
    let program = disassemble(&bytes).expect("decode ok");
    let mut context = ExecutionContext::new();
    simulate(&mut context, &program.instructions).expect("simulate ok");

    assert_eq!(context.get_register(Register::SP), 1);
    assert_eq!(context.get_register(Register::BP), 2);
    assert_eq!(context.get_register(Register::SI), 3);
    assert_eq!(context.get_register(Register::DI), 4);
    assert_eq!(context.get_register(Register::BX), 0x0102);
    assert_eq!(context.ip() as usize, bytes.len());
    assert_eq!(
        register_report(&context),
        "Final registers:\n\
         \x20     ax: 0x0001 (1)\n\
         \x20     bx: 0x0102 (258)\n\
         \x20     cx: 0x0003 (3)\n\
         \x20     dx: 0x0004 (4)\n\
         \x20     sp: 0x0001 (1)\n\
         \x20     bp: 0x0002 (2)\n\
         \x20     si: 0x0003 (3)\n\
         \x20     di: 0x0004 (4)\n\
         \x20     ip: 0x0016 (22)\n"
    );
}

#[test]
fn arithmetic_trace() {
    init_tests();
    #[rustfmt::skip]
    let bytes = [
        0xBB, 0x03, 0xF0, // mov bx, 0xf003
        0xB9, 0x01, 0x0F, // mov cx, 0x0f01
        0x29, 0xCB,       // sub bx, cx
        0x83, 0xC3, 0xFE, // add bx, -2
        0x39, 0xCB,       // cmp bx, cx
    ];
    let program = disassemble(&bytes).expect("decode ok");
    let mut context = ExecutionContext::new();
    let trace = simulate_traced(&mut context, &program.instructions).expect("simulate ok");

    let lines: Vec<String> = trace.iter().map(ToString::to_string).collect();
    assert_eq!(lines, [
        "mov bx, word -4093 ; bx:0x0->0xf003 ip:0x0->0x3",
        "mov cx, word 3841 ; cx:0x0->0xf01 ip:0x3->0x6",
        "sub bx, cx ; bx:0xf003->0xe102 ip:0x6->0x8 flags:->S",
        "add bx, word -2 ; bx:0xe102->0xe100 ip:0x8->0xb flags:S->PS",
        "cmp bx, cx ; ip:0xb->0xd flags:PS->",
    ]);
    assert_eq!(context.flags(), FlagSet::default());
}

#[test]
fn run_stops_at_first_unsupported_instruction() {
    init_tests();
    // mov ax, 7 / inc ax / mov bx, 1
    let program = disassemble(&[0xB8, 0x07, 0x00, 0x40, 0xBB, 0x01, 0x00]).expect("decode ok");
    let mut context = ExecutionContext::new();

    let err = simulate(&mut context, &program.instructions).unwrap_err();
    assert_eq!(
        err.to_string(),
        format!(
            "instruction simulation not implemented for inc (type {})",
            InstructionType::IncReg as u8
        )
    );
    assert_eq!(context.get_register(Register::AX), 7);
    assert_eq!(context.get_register(Register::BX), 0);
}

#[test]
fn memory_operands_fail() {
    init_tests();
    // add word [bx], 1
    let program = disassemble(&[0x83, 0x07, 0x01]).expect("decode ok");
    let mut context = ExecutionContext::new();
    assert_eq!(
        simulate(&mut context, &program.instructions),
        Err(SimulationError::MemoryOperand)
    );
}

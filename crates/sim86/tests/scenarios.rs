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

use sim86::prelude::*;

use crate::common::init_tests;

#[test]
fn immediate_word_move() {
    init_tests();
    let program = disassemble(&[0xB8, 0x05, 0x00]).expect("decode ok");

    assert_eq!(program.len(), 1);
    let inst = program.instructions[0];
    assert_eq!(inst.kind, InstructionType::MovImToReg);
    assert_eq!(inst.destination, Some(DataLocation::Register(Register::AX)));
    assert_eq!(
        inst.source,
        Some(DataLocation::Immediate {
            value: 5,
            wide: true,
            sign_extended: false,
            hide_size: false
        })
    );
    assert_eq!(inst.size, 3);
    assert!(program.labels.is_empty());
}

#[test]
fn conditional_jump_target() {
    init_tests();
    let program = disassemble(&[0x74, 0x05]).expect("decode ok");

    assert_eq!(program.len(), 1);
    let inst = program.instructions[0];
    assert_eq!(inst.kind, InstructionType::Je);
    assert_eq!(inst.size, 2);
    assert_eq!(inst.destination, Some(DataLocation::Label(7)));
    assert_eq!(program.labels.as_slice(), &[7]);
}

#[test]
fn direct_address_load() {
    init_tests();
    let program = disassemble(&[0x8B, 0x1E, 0x00, 0x00]).expect("decode ok");

    assert_eq!(program.len(), 1);
    let inst = program.instructions[0];
    assert_eq!(inst.kind, InstructionType::MovRegMemToFromReg);
    assert_eq!(inst.destination, Some(DataLocation::Register(Register::BX)));
    match inst.source {
        Some(DataLocation::Memory {
            address,
            wide,
            hide_size,
        }) => {
            assert_eq!(address.mode, AddressMode::Direct);
            assert_eq!(address.displacement, 0);
            assert!(wide);
            assert!(!hide_size);
        }
        other => panic!("expected a memory source, got {other:?}"),
    }
    assert_eq!(inst.size, 4);
}

#[test]
fn register_moves_simulate() {
    init_tests();
    // mov ax, 5 / mov bx, ax
    let program = disassemble(&[0xB8, 0x05, 0x00, 0x89, 0xC3]).expect("decode ok");
    let mut context = ExecutionContext::new();
    simulate(&mut context, &program.instructions).expect("simulate ok");

    assert_eq!(context.get_register_by_name("ax").unwrap(), 5);
    assert_eq!(context.get_register_by_name("bx").unwrap(), 5);
    for flag in Flag::ALL {
        assert!(!context.flag(flag), "{flag:?} should be clear");
    }
}

#[test]
fn subtract_from_itself() {
    init_tests();
    // sub dx, dx with dx preset to 5
    let program = disassemble(&[0x29, 0xD2]).expect("decode ok");
    let mut context = ExecutionContext::new();
    context.set_register_by_name("dx", 5).unwrap();
    simulate(&mut context, &program.instructions).expect("simulate ok");

    assert_eq!(context.get_register(Register::DX), 0);
    assert!(context.flag(Flag::Zero));
    assert!(!context.flag(Flag::Sign));
    assert!(context.flag(Flag::Parity));
    assert!(!context.flag(Flag::Carry));
    assert!(!context.flag(Flag::Overflow));
    assert!(!context.flag(Flag::AuxiliaryCarry));
}

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

use rand::{Rng, SeedableRng};
use sim86::prelude::*;
use sim86_fuzzer::{FuzzerOptions, InstructionFuzzer};

use crate::common::{
    format::{format_iced_instruction, format_sim86_instruction},
    init_tests,
};

pub const TEST_SEED: u64 = 0x12345678;
pub const FUZZ_TEST_COUNT: usize = 100_000;

// iced decodes rep/repne/lock as prefixes of the following instruction, so those are left out.
#[test]
fn instruction_lengths_match_iced() -> Result<(), Box<dyn std::error::Error>> {
    init_tests();
    let mut rng = rand::rngs::StdRng::seed_from_u64(TEST_SEED);
    let mut error_ct = 0;
    let mut skipped_ct = 0;

    let fuzzer = InstructionFuzzer::new()?;
    let options = FuzzerOptions {
        seed: TEST_SEED,
        instruction_count: 1,
        allow_branches: true,
        allow_prefixes: false,
    };

    for run_no in 0..FUZZ_TEST_COUNT {
        let instruction = fuzzer.random_instruction(&mut rng, &options)?;

        let mut iced_decoder = iced_x86::Decoder::new(16, &instruction.bytes, iced_x86::DecoderOptions::NONE);
        let iced_i = iced_decoder.decode();
        if iced_i.code() == iced_x86::Code::INVALID {
            // Encodings such as `mov cs, r/m16` are rejected by later processors.
            skipped_ct += 1;
            continue;
        }

        let mut decoder = Decoder::new(&instruction.bytes);
        let inst = decoder.decode_next()?.ok_or("empty decode")?;

        if inst.size != iced_i.len() || inst.size != instruction.bytes.len() {
            eprintln!(
                "Length mismatch on run {:06}: {:<8} iced: {} sim86: {} bytes: {:02X?}",
                run_no,
                instruction.mnemonic,
                iced_i.len(),
                inst.size,
                &instruction.bytes
            );
            error_ct += 1;
        }
        else if inst.mnemonic() != instruction.mnemonic {
            eprintln!(
                "Mnemonic mismatch on run {:06}: expected {} got {} bytes: {:02X?}",
                run_no,
                instruction.mnemonic,
                inst.mnemonic(),
                &instruction.bytes
            );
            error_ct += 1;
        }
    }

    // Nearly every generated encoding is one iced accepts.
    assert!(skipped_ct < FUZZ_TEST_COUNT / 10, "{skipped_ct} encodings skipped");

    if error_ct == 0 {
        Ok(())
    }
    else {
        Err(format!("{}/{} discrepancies found", error_ct, FUZZ_TEST_COUNT).into())
    }
}

#[test]
fn branch_targets_match_iced() -> Result<(), Box<dyn std::error::Error>> {
    init_tests();
    let mut rng = rand::rngs::StdRng::seed_from_u64(TEST_SEED ^ 0xFFFF);
    let fuzzer = InstructionFuzzer::new()?;
    let options = FuzzerOptions {
        instruction_count: 1,
        ..Default::default()
    };

    let mut checked = 0;
    while checked < 1000 {
        let instruction = fuzzer.random_instruction(&mut rng, &options)?;
        if instruction.relative_range.is_none() {
            continue;
        }

        // Place the instruction somewhere other than offset 0.
        let origin: u16 = rng.random_range(0x100..0x8000);
        let mut bytes = vec![0x90; origin as usize];
        bytes.extend_from_slice(&instruction.bytes);

        let program = disassemble(&bytes)?;
        let Some(DataLocation::Label(target)) = program.instructions.last().and_then(|i| i.destination)
        else {
            return Err(format!("no label decoded from {:02X?}", instruction.bytes).into());
        };

        let mut iced_decoder = iced_x86::Decoder::with_ip(
            16,
            &instruction.bytes,
            origin as u64,
            iced_x86::DecoderOptions::NONE,
        );
        let iced_i = iced_decoder.decode();
        assert_eq!(
            target as u16,
            iced_i.near_branch16(),
            "target mismatch for {:02X?} at {origin:#x}",
            instruction.bytes
        );
        checked += 1;
    }
    Ok(())
}

/// Families whose operand syntax iced and sim86 share once size keywords are dropped.
const TEXT_COMPARED_MNEMONICS: [&str; 13] = [
    "mov", "add", "or", "adc", "sbb", "and", "sub", "xor", "cmp", "inc", "dec", "neg", "not",
];

#[test]
fn operand_text_matches_iced() -> Result<(), Box<dyn std::error::Error>> {
    init_tests();
    let mut rng = rand::rngs::StdRng::seed_from_u64(TEST_SEED ^ 0xA5A5);
    let mut error_ct = 0;
    let mut compared_ct = 0;

    let fuzzer = InstructionFuzzer::new()?;
    let options = FuzzerOptions {
        instruction_count: 1,
        allow_branches: false,
        allow_prefixes: false,
        ..Default::default()
    };

    for run_no in 0..FUZZ_TEST_COUNT {
        let instruction = fuzzer.random_instruction(&mut rng, &options)?;
        if !TEXT_COMPARED_MNEMONICS.contains(&instruction.mnemonic.as_str()) {
            continue;
        }

        let mut iced_decoder = iced_x86::Decoder::new(16, &instruction.bytes, iced_x86::DecoderOptions::NONE);
        let iced_i = iced_decoder.decode();
        if iced_i.code() == iced_x86::Code::INVALID {
            continue;
        }

        let mut decoder = Decoder::new(&instruction.bytes);
        let inst = decoder.decode_next()?.ok_or("empty decode")?;

        let iced_str = format_iced_instruction(&iced_i);
        let sim86_str = format_sim86_instruction(&inst);
        compared_ct += 1;

        if iced_str != sim86_str {
            eprintln!(
                "Discrepancy found on run {:06}: iced: {:<40} sim86: {:<40} bytes: {:02X?}",
                run_no,
                format!("'{}'", iced_str),
                format!("'{}'", sim86_str),
                &instruction.bytes
            );
            error_ct += 1;
        }
    }

    assert!(compared_ct > FUZZ_TEST_COUNT / 4, "only {compared_ct} instructions compared");

    if error_ct == 0 {
        Ok(())
    }
    else {
        Err(format!("{}/{} discrepancies found", error_ct, compared_ct).into())
    }
}

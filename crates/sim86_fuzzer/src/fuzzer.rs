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

use std::ops::Range;

use rand::{prelude::StdRng, Rng, SeedableRng};
use sim86_isadb::{IsaDB, IsaRecord, IterFilter};

use crate::{error::FuzzerError, modrm_fuzzer::ModRmFuzzer};

#[derive(Clone, Debug)]
pub struct FuzzerOptions {
    pub seed: u64,
    pub instruction_count: usize,
    /// Emit relative calls, jumps and loops.
    pub allow_branches: bool,
    /// Emit rep/repne/lock as standalone instructions.
    pub allow_prefixes: bool,
}

impl Default for FuzzerOptions {
    fn default() -> Self {
        Self {
            seed: 0,
            instruction_count: 256,
            allow_branches: true,
            allow_prefixes: false,
        }
    }
}

pub struct InstructionFuzzer {
    isa_db: IsaDB,
}

/// One generated instruction and where each of its parts lies within `bytes`.
#[derive(Clone, Debug, Default)]
pub struct FuzzerInstruction {
    pub mnemonic: String,
    pub bytes: Vec<u8>,
    pub opcode_range: Range<usize>,
    pub modrm_range: Option<Range<usize>>,
    pub displacement_range: Option<Range<usize>>,
    pub immediate_range: Option<Range<usize>>,
    pub relative_range: Option<Range<usize>>,
}

impl InstructionFuzzer {
    pub fn new() -> Result<Self, FuzzerError> {
        Ok(InstructionFuzzer { isa_db: IsaDB::new()? })
    }

    pub fn with_db(isa_db: IsaDB) -> Self {
        InstructionFuzzer { isa_db }
    }

    pub fn random_instruction(
        &self,
        rng: &mut StdRng,
        options: &FuzzerOptions,
    ) -> Result<FuzzerInstruction, FuzzerError> {
        let filter = IterFilter {
            accept_prefixes: options.allow_prefixes,
            accept_relative: options.allow_branches,
        };

        let isa_records: Vec<&IsaRecord> = self.isa_db.opcode_iter(filter).collect();
        if isa_records.is_empty() {
            return Err(FuzzerError::InvalidOptions(
                "No ISA records match the provided filter options".into(),
            ));
        }

        let record = isa_records[rng.random_range(0..isa_records.len())];
        Ok(Self::build_instruction(record, rng))
    }

    /// Generate `options.instruction_count` instructions from a generator seeded with
    /// `options.seed`.
    pub fn random_stream(&self, options: &FuzzerOptions) -> Result<Vec<FuzzerInstruction>, FuzzerError> {
        let mut rng = StdRng::seed_from_u64(options.seed);
        (0..options.instruction_count)
            .map(|_| self.random_instruction(&mut rng, options))
            .collect()
    }

    fn build_instruction(record: &IsaRecord, rng: &mut StdRng) -> FuzzerInstruction {
        let mut new_instruction = FuzzerInstruction {
            mnemonic: record.mnemonic.clone(),
            opcode_range: 0..1,
            ..FuzzerInstruction::default()
        };
        let mut inst_bytes = vec![record.opcode];

        if let Some(next) = record.next {
            inst_bytes.push(next);
            new_instruction.opcode_range.end += 1;
        }

        // Add modrm and its displacement if instruction has a modrm.
        if record.has_modrm {
            let mut modrm_fuzzer = ModRmFuzzer::new().with_reg_form(record.allow_reg_form);

            if let Some(extension) = record.extension {
                modrm_fuzzer = modrm_fuzzer.with_reg(extension);
            }
            else if record.segment_reg {
                modrm_fuzzer = modrm_fuzzer.with_extension_range(0..=3);
            }

            let modrm = modrm_fuzzer.build(rng);
            new_instruction.modrm_range = Some(inst_bytes.len()..inst_bytes.len() + 1);
            inst_bytes.push(modrm.raw_byte());

            let disp_len = modrm.displacement_len();
            if disp_len > 0 {
                new_instruction.displacement_range = Some(inst_bytes.len()..inst_bytes.len() + disp_len);
                inst_bytes.extend((0..disp_len).map(|_| rng.random::<u8>()));
            }
        }

        let imm_len = record.immediate_len as usize;
        if imm_len > 0 {
            let range = inst_bytes.len()..inst_bytes.len() + imm_len;
            if record.is_relative {
                new_instruction.relative_range = Some(range);
            }
            else {
                new_instruction.immediate_range = Some(range);
            }
            inst_bytes.extend((0..imm_len).map(|_| rng.random::<u8>()));
        }

        new_instruction.bytes = inst_bytes;
        new_instruction
    }
}

/// Concatenate generated instructions into one byte stream.
pub fn stream_bytes(instructions: &[FuzzerInstruction]) -> Vec<u8> {
    instructions.iter().flat_map(|inst| inst.bytes.iter().copied()).collect()
}

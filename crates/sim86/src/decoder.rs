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

use std::io::{self, BufRead, Cursor};

use tracing::{debug, trace, warn};

use crate::{
    byte_reader::ByteReader,
    cpu_common::Register,
    error::{DecodeError, PartialDecode},
    instruction::Instruction,
    instruction_type::InstructionType,
    label::LabelSet,
    modrm16::{AddressCalculation, ModRmByte16},
    opcode::classify,
    operand::{parse_data, DataLocation},
};

/// The result of decoding a byte stream: instructions in stream order plus the targets of
/// every relative branch among them.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Disassembly {
    pub instructions: Vec<Instruction>,
    pub labels: LabelSet,
}

impl Disassembly {
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instruction> {
        self.instructions.iter()
    }

    /// Total number of bytes covered by the decoded instructions.
    pub fn byte_len(&self) -> usize {
        self.instructions.iter().map(|inst| inst.size).sum()
    }
}

/// Decodes instructions one at a time from a byte slice, collecting branch targets as it goes.
pub struct Decoder<'a> {
    cursor: Cursor<&'a [u8]>,
    labels: LabelSet,
}

impl<'a> Decoder<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(bytes),
            labels: LabelSet::new(),
        }
    }

    /// Offset of the next instruction to decode.
    pub fn position(&self) -> usize {
        self.cursor.position() as usize
    }

    pub fn is_finished(&self) -> bool {
        self.position() >= self.cursor.get_ref().len()
    }

    /// Branch targets discovered so far.
    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    pub fn into_labels(self) -> LabelSet {
        self.labels
    }

    /// Decode the next instruction, or return `Ok(None)` at the end of the stream. On error the
    /// cursor is left at the start of the offending instruction.
    pub fn decode_next(&mut self) -> Result<Option<Instruction>, DecodeError> {
        if self.is_finished() {
            return Ok(None);
        }
        let start = self.position();
        match self.decode_instruction(start) {
            Ok(inst) => {
                trace!(offset = start, size = inst.size, "decoded {:?}", inst.kind);
                Ok(Some(inst))
            }
            Err(err) => {
                warn!("decode failed: {err}");
                self.cursor.set_position(start as u64);
                Err(err)
            }
        }
    }

    fn decode_instruction(&mut self, start: usize) -> Result<Instruction, DecodeError> {
        let truncated = move |_: io::Error| DecodeError::Truncated { offset: start };

        let kind = classify(self.cursor.fill_buf().map_err(truncated)?, start)?;
        let byte1 = self.cursor.read_u8().map_err(truncated)?;
        let w = byte1 & 0x01 != 0;
        // Bit 1 is the direction bit for reg/mem forms and the sign-extension bit for the
        // 0x80-0x83 group.
        let d = byte1 & 0x02 != 0;

        let accumulator = if w { Register::AX } else { Register::AL };
        let mut wide = false;

        let (destination, source) = if kind.is_single_register() {
            let reg = Register::from_field(byte1, true);
            if kind == InstructionType::XchgRegWithAcc {
                (Some(Register::AX.into()), Some(reg.into()))
            }
            else {
                (Some(reg.into()), None)
            }
        }
        else if kind.is_segment_push_pop() {
            (Some(Register::segment_from_field(byte1 >> 3).into()), None)
        }
        else if kind.is_single_byte() {
            wide = kind.is_string_manipulation() && w;
            (None, None)
        }
        else if kind.is_relative_branch() {
            let displacement = match kind.relative_displacement_len() {
                1 => self.cursor.read_i8().map_err(truncated)? as i32,
                _ => self.cursor.read_i16().map_err(truncated)? as i32,
            };
            let target = self.position() as i32 + displacement;
            if self.labels.insert(target) {
                debug!(target, "new label");
            }
            (Some(DataLocation::Label(target)), None)
        }
        else if kind.is_immediate_only() {
            let value = if kind == InstructionType::Int {
                self.cursor.read_u8().map_err(truncated)? as i16
            }
            else {
                self.cursor.read_i16().map_err(truncated)?
            };
            (Some(DataLocation::unsized_immediate(value)), None)
        }
        else if kind == InstructionType::MovImToReg {
            let w = byte1 & 0x08 != 0;
            let (_, data) = parse_data(&mut self.cursor, w).map_err(truncated)?;
            (
                Some(Register::from_field(byte1, w).into()),
                Some(DataLocation::immediate(data, w)),
            )
        }
        else if kind.is_in_out() {
            let port = match kind {
                InstructionType::InFixedPort | InstructionType::OutFixedPort => {
                    DataLocation::unsized_immediate(self.cursor.read_u8().map_err(truncated)? as i16)
                }
                _ => Register::DX.into(),
            };
            match kind {
                InstructionType::InFixedPort | InstructionType::InVariablePort => {
                    (Some(accumulator.into()), Some(port))
                }
                _ => (Some(port), Some(accumulator.into())),
            }
        }
        else if matches!(kind, InstructionType::MovMemToAcc | InstructionType::MovAccToMem) {
            let address = AddressCalculation::direct(self.cursor.read_u16().map_err(truncated)?);
            let memory = DataLocation::memory(address, w);
            if kind == InstructionType::MovMemToAcc {
                (Some(accumulator.into()), Some(memory))
            }
            else {
                (Some(memory), Some(accumulator.into()))
            }
        }
        else if kind.is_im_to_acc() {
            let (_, data) = parse_data(&mut self.cursor, w).map_err(truncated)?;
            (Some(accumulator.into()), Some(DataLocation::immediate(data, w)))
        }
        else if kind.is_ascii_adjust_with_base() {
            // Only the default base is accepted by the classifier, so the second byte is fixed.
            self.cursor.read_u8().map_err(truncated)?;
            (None, None)
        }
        else if kind.is_reg_mem_with_reg() || kind.is_im_to_reg_mem() {
            self.decode_modrm_operands(kind, byte1, w, d).map_err(truncated)?
        }
        else {
            return Err(DecodeError::Unsupported { offset: start, kind });
        };

        Ok(Instruction {
            kind,
            address: start,
            size: self.position() - start,
            wide,
            destination,
            source,
        })
    }

    /// Decode the operands of a mod/reg/rm encoded instruction.
    fn decode_modrm_operands(
        &mut self,
        kind: InstructionType,
        byte1: u8,
        w: bool,
        d: bool,
    ) -> io::Result<(Option<DataLocation>, Option<DataLocation>)> {
        let modrm = ModRmByte16::read(&mut self.cursor)?;
        let wide = w || kind.is_forced_wide();

        let rm_operand = match modrm.read_address(&mut self.cursor)? {
            Some(address) => DataLocation::memory(address, wide),
            None => modrm.op1_reg(wide).into(),
        };

        if kind.is_im_to_reg_mem() {
            let sign_extended = kind.has_sign_extension() && d;
            let (_, data) = parse_data(&mut self.cursor, w && !sign_extended)?;
            let immediate = if w && sign_extended {
                DataLocation::sign_extended_immediate(data)
            }
            else {
                DataLocation::immediate(data, w)
            };
            return Ok((Some(rm_operand), Some(immediate)));
        }

        if kind.is_shift_or_rotate() {
            // The count is structural: bit 1 selects CL, otherwise a literal 1.
            let count = if byte1 & 0x02 != 0 {
                Register::CL.into()
            }
            else {
                DataLocation::unsized_immediate(1)
            };
            return Ok((Some(rm_operand), Some(count)));
        }

        if kind.is_single_operand() {
            let operand = if kind.is_far_indirect() { rm_operand.without_size() } else { rm_operand };
            return Ok((Some(operand), None));
        }

        match kind {
            InstructionType::MovRegMemToSegReg => {
                return Ok((Some(modrm.op2_segment_reg().into()), Some(rm_operand)));
            }
            InstructionType::MovSegRegToRegMem => {
                return Ok((Some(rm_operand), Some(modrm.op2_segment_reg().into())));
            }
            _ => {}
        }

        let reg_operand: DataLocation = modrm.op2_reg(wide).into();
        let rm_operand = if kind.is_address_load() { rm_operand.without_size() } else { rm_operand };

        if d || kind.always_to_register() {
            Ok((Some(reg_operand), Some(rm_operand)))
        }
        else {
            Ok((Some(rm_operand), Some(reg_operand)))
        }
    }
}

/// Decode an entire byte stream. On failure the error carries everything decoded before the
/// offending instruction.
pub fn disassemble(bytes: &[u8]) -> Result<Disassembly, PartialDecode> {
    let mut decoder = Decoder::new(bytes);
    let mut instructions = Vec::new();

    loop {
        match decoder.decode_next() {
            Ok(Some(inst)) => instructions.push(inst),
            Ok(None) => break,
            Err(error) => {
                return Err(PartialDecode {
                    decoded: Disassembly {
                        instructions,
                        labels: decoder.into_labels(),
                    },
                    error,
                });
            }
        }
    }

    debug!(
        instructions = instructions.len(),
        labels = decoder.labels().len(),
        "decoded {} bytes",
        bytes.len()
    );
    Ok(Disassembly {
        instructions,
        labels: decoder.into_labels(),
    })
}

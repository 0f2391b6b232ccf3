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

use std::{collections::HashMap, path::Path};

use crate::{error::IsaDbError, record::IsaRecord};

pub const ISA8086: &[u8] = include_bytes!("../isa_db/8086.csv");

pub struct IsaDB {
    pub records: Vec<IsaRecord>,
    pub record_hash: HashMap<(u8, Option<u8>), usize>,
}

#[derive(Copy, Clone, Debug, Default)]
pub struct IterFilter {
    /// Include encodings that other decoders merge into the following instruction.
    pub accept_prefixes: bool,
    /// Include relative branches.
    pub accept_relative: bool,
}

impl IsaDB {
    /// Load the embedded 8086 table.
    pub fn new() -> Result<IsaDB, IsaDbError> {
        Self::from_reader(csv::Reader::from_reader(ISA8086))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<IsaDB, IsaDbError> {
        Self::from_reader(csv::Reader::from_path(path.as_ref())?)
    }

    fn from_reader<R: std::io::Read>(mut csv_reader: csv::Reader<R>) -> Result<IsaDB, IsaDbError> {
        let mut records: Vec<IsaRecord> = Vec::new();
        let mut record_hash: HashMap<(u8, Option<u8>), usize> = HashMap::new();

        for result in csv_reader.deserialize::<IsaRecord>() {
            let record = result?;
            record.validate().map_err(IsaDbError::InvalidRecord)?;

            let key = (record.opcode, record.extension);
            if record_hash.insert(key, records.len()).is_some() {
                return Err(IsaDbError::InvalidRecord(format!(
                    "duplicate record for opcode {:02X}",
                    record.opcode
                )));
            }
            records.push(record);
        }

        Ok(IsaDB { records, record_hash })
    }

    /// Look up an encoding by opcode and, for grouped opcodes, the secondary opcode.
    pub fn opcode(&self, opcode: u8, extension: Option<u8>) -> Option<&IsaRecord> {
        self.record_hash.get(&(opcode, extension)).map(|&index| &self.records[index])
    }

    pub fn opcode_iter(&self, filter: IterFilter) -> impl Iterator<Item = &IsaRecord> {
        self.records.iter().filter(move |record| {
            (filter.accept_prefixes || !record.is_prefix) && (filter.accept_relative || !record.is_relative)
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

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

use std::fmt::{Display, Formatter};

/// Ascending, duplicate-free set of branch target offsets.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct LabelSet {
    offsets: Vec<i32>,
}

impl LabelSet {
    pub fn new() -> Self {
        Self { offsets: Vec::new() }
    }

    /// Insert `offset`, keeping the set ordered. Returns false if it was already present.
    pub fn insert(&mut self, offset: i32) -> bool {
        let mut index = 0;
        while index < self.offsets.len() && self.offsets[index] < offset {
            index += 1;
        }
        if self.offsets.get(index) == Some(&offset) {
            return false;
        }
        self.offsets.insert(index, offset);
        true
    }

    pub fn contains(&self, offset: i32) -> bool {
        self.offsets.contains(&offset)
    }

    pub fn iter(&self) -> impl Iterator<Item = i32> + '_ {
        self.offsets.iter().copied()
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.offsets
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

/// The symbol naming the label at `offset`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LabelName(pub i32);

impl Display for LabelName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.0 < 0 {
            write!(f, "label_neg{}", self.0.unsigned_abs())
        }
        else {
            write!(f, "label_{}", self.0)
        }
    }
}

use std::ops::RangeInclusive;

use rand::{prelude::StdRng, Rng};
use sim86::modrm16::ModRmByte16;

/// Samples each field of a mod/reg/rm byte from its own range.
#[derive(Clone, Debug)]
pub struct ModRmFuzzer {
    mod_range: RangeInclusive<u8>,
    reg_range: RangeInclusive<u8>,
    rm_range: RangeInclusive<u8>,
}

impl Default for ModRmFuzzer {
    fn default() -> Self {
        Self {
            mod_range: 0..=3,
            reg_range: 0..=7,
            rm_range: 0..=7,
        }
    }
}

impl ModRmFuzzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclude mod 11 when register operands aren't encodable.
    pub fn with_reg_form(mut self, allow_reg_form: bool) -> Self {
        self.mod_range = if allow_reg_form { 0..=3 } else { 0..=2 };
        self
    }

    pub fn with_mod(mut self, r#mod: u8) -> Self {
        self.mod_range = r#mod..=r#mod;
        self
    }

    /// Fix the reg field, as for group opcodes.
    pub fn with_reg(mut self, reg: u8) -> Self {
        self.reg_range = reg..=reg;
        self
    }

    pub fn with_extension_range(mut self, range: RangeInclusive<u8>) -> Self {
        self.reg_range = range;
        self
    }

    pub fn build(&self, rng: &mut StdRng) -> ModRmByte16 {
        let mut modrm = ModRmByte16::from_byte(0);
        modrm.set_mod(rng.random_range(self.mod_range.clone()));
        modrm.set_reg(rng.random_range(self.reg_range.clone()));
        modrm.set_rm(rng.random_range(self.rm_range.clone()));
        modrm
    }
}

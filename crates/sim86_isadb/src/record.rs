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

use std::str::FromStr;

use serde::Deserialize;

fn de_hex_u8<'de, D>(de: D) -> Result<u8, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(de)?;
    let s = s.trim();
    // Accept "0x1A", "1a", "1A"
    let s = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    u8::from_str_radix(s, 16).map_err(serde::de::Error::custom)
}

fn de_opt_hex_u8<'de, D>(de: D) -> Result<Option<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(de)?;
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    let s = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    u8::from_str_radix(s, 16).map(Some).map_err(serde::de::Error::custom)
}

fn de_ext_u8<'de, D>(de: D) -> Result<Option<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(de)?;
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    u8::from_str(s).map(Some).map_err(serde::de::Error::custom)
}

fn de_bool<'de, D>(de: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(de)?;
    let s = s.trim().to_lowercase();
    // Assume empty is 'false'
    if s.is_empty() {
        return Ok(false);
    }
    match s.as_str() {
        "true" | "1" | "y" | "yes" => Ok(true),
        "false" | "0" | "n" | "no" => Ok(false),
        _ => Err(serde::de::Error::custom(format!("Invalid boolean value: {}", s))),
    }
}

/// One accepted encoding.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct IsaRecord {
    #[serde(rename = "op")]
    #[serde(deserialize_with = "de_hex_u8")]
    pub opcode: u8,
    /// Required value of the `reg` field of the mod/reg/rm byte, for grouped opcodes.
    #[serde(rename = "ex")]
    #[serde(deserialize_with = "de_ext_u8")]
    pub extension: Option<u8>,
    /// A fixed byte that must follow the opcode.
    #[serde(rename = "next")]
    #[serde(deserialize_with = "de_opt_hex_u8")]
    pub next: Option<u8>,
    #[serde(rename = "mn")]
    pub mnemonic: String,
    #[serde(rename = "m")]
    #[serde(deserialize_with = "de_bool")]
    pub has_modrm: bool,
    /// Whether the register-direct (`mod == 11`) form is legal.
    #[serde(rename = "reg")]
    #[serde(deserialize_with = "de_bool")]
    pub allow_reg_form: bool,
    /// The `reg` field selects a segment register, so only values 0-3 are meaningful.
    #[serde(rename = "seg")]
    #[serde(deserialize_with = "de_bool")]
    pub segment_reg: bool,
    /// Bytes of immediate data, address or displacement following the mod/reg/rm operand.
    #[serde(rename = "imm")]
    pub immediate_len: u8,
    #[serde(rename = "rel")]
    #[serde(deserialize_with = "de_bool")]
    pub is_relative: bool,
    /// Decoded on its own, though other decoders treat it as a prefix of what follows.
    #[serde(rename = "pf")]
    #[serde(deserialize_with = "de_bool")]
    pub is_prefix: bool,
}

impl IsaRecord {
    /// Length of the encoding, not counting any mod/reg/rm displacement.
    pub fn base_len(&self) -> usize {
        1 + self.has_modrm as usize + self.next.is_some() as usize + self.immediate_len as usize
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.extension.is_some() && !self.has_modrm {
            return Err(format!("opcode {:02X} has an extension but no mod/reg/rm byte", self.opcode));
        }
        if matches!(self.extension, Some(ext) if ext > 7) {
            return Err(format!("opcode {:02X} has an out of range extension", self.opcode));
        }
        if self.immediate_len > 2 {
            return Err(format!("opcode {:02X} has an immediate longer than a word", self.opcode));
        }
        Ok(())
    }
}

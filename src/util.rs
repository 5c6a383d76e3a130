// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common helpers

use alloc::{format, string::String, vec, vec::Vec};
use byteorder::{BigEndian, ByteOrder};

use crate::{Coil, Word, error::Error};

/// Format `value` as uppercase hex, zero-padded to `width` digits.
pub fn format_hex(value: impl Into<u32>, width: usize) -> String {
    let value: u32 = value.into();
    format!("{value:0width$X}")
}

/// Like [`format_hex`], but renders a missing value as `width` question marks.
pub fn format_hex_or_placeholder(value: Option<impl Into<u32>>, width: usize) -> String {
    match value {
        Some(v) => format_hex(v, width),
        None => "?".repeat(width),
    }
}

/// Render bytes as space separated two digit hex, e.g. `"01 03 00 0A"`.
pub fn format_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&format_hex(*b, 2));
    }
    out
}

/// Parse a single hex byte token.
///
/// Accepts an optional `0x`/`0X` prefix or, failing that, an `h`/`H` suffix,
/// followed by one or two hex digits.
pub fn parse_hex_token(token: &str) -> Result<u8, Error> {
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .or_else(|| token.strip_suffix(|c: char| c == 'h' || c == 'H'))
        .unwrap_or(token);
    if digits.is_empty() || digits.len() > 2 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::InvalidHex);
    }
    u8::from_str_radix(digits, 16).map_err(|_| Error::InvalidHex)
}

/// Parse hex bytes separated by whitespace and/or commas.
///
/// A single bad token rejects the whole input.
pub fn parse_hex_bytes(text: &str) -> Result<Vec<u8>, Error> {
    text.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .map(parse_hex_token)
        .collect()
}

/// Split a decimal `0..=65535` into `[high, low]`.
pub fn dec_to_high_low_bytes(text: &str) -> Result<[u8; 2], Error> {
    let value = text
        .trim()
        .parse::<u16>()
        .map_err(|_| Error::InvalidNumber)?;
    Ok(split_word(value))
}

/// Big-endian bytes of a word.
pub fn split_word(word: Word) -> [u8; 2] {
    let mut buf = [0; 2];
    BigEndian::write_u16(&mut buf, word);
    buf
}

/// Word from big-endian bytes.
pub fn join_word(bytes: [u8; 2]) -> Word {
    BigEndian::read_u16(&bytes)
}

/// Lenient decimal parsing for user input; `None` if not a number.
pub(crate) fn parse_decimal(text: &str) -> Option<i64> {
    text.trim().parse().ok()
}

/// Turn a bool into a u16 coil value
pub const fn bool_to_u16_coil(state: bool) -> u16 {
    if state { 0xFF00 } else { 0x0000 }
}

/// Turn a u16 coil value into a boolean value.
pub fn u16_coil_to_bool(coil: u16) -> Result<bool, Error> {
    match coil {
        0xFF00 => Ok(true),
        0x0000 => Ok(false),
        _ => Err(Error::CoilValue(coil)),
    }
}

/// Calculate the number of bytes required for a given number of coils.
pub const fn packed_coils_len(bitcount: usize) -> usize {
    bitcount.div_ceil(8)
}

/// Pack coils into bytes, least significant bit first.
///
/// The last byte is zero-padded when the count isn't a multiple of eight.
pub fn pack_coils(coils: &[Coil]) -> Vec<u8> {
    let mut bytes = vec![0; packed_coils_len(coils.len())];
    coils.iter().enumerate().for_each(|(i, b)| {
        let v = if *b { 0b1 } else { 0b0 };
        bytes[i / 8] |= v << (i % 8);
    });
    bytes
}

/// Unpack `count` coils from a byte array.
pub fn unpack_coils(bytes: &[u8], count: usize) -> Result<Vec<Coil>, Error> {
    if bytes.len() < packed_coils_len(count) {
        return Err(Error::BufferSize);
    }
    Ok((0..count)
        .map(|i| (bytes[i / 8] >> (i % 8)) & 0b1 > 0)
        .collect())
}

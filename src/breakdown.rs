// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Labeled field-by-field view of a raw ADU.
//!
//! The breakdown is made for display. It is lenient where the typed
//! decoders ([`rtu::decode_request`](crate::rtu::server::decode_request),
//! [`tcp::decode_request`](crate::tcp::server::decode_request)) are strict:
//! the CRC is shown but not enforced, and function codes without a request
//! layout show their payload as opaque data.

use alloc::{format, string::String, vec, vec::Vec};
use core::fmt;

use crate::{
    codec::tcp::HEADER_LEN,
    error::Error,
    frame::{FunctionCode, Mode},
    util::{format_bytes, format_hex, format_hex_or_placeholder, join_word},
};

type Result<T> = core::result::Result<T, Error>;

/// What a [`Segment`] holds.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    TransactionId,
    ProtocolId,
    Length,
    UnitId,
    SlaveId,
    FunctionCode,
    Address,
    Quantity,
    Value,
    ByteCount,
    Data,
    Crc,
    Error,
}

/// One labeled field of a frame, rendered as hex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub label: &'static str,
    pub value: String,
    pub category: Category,
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.value)
    }
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
    segments: Vec<Segment>,
}

impl<'a> Cursor<'a> {
    const fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            pos: 0,
            segments: Vec::new(),
        }
    }

    fn push(&mut self, label: &'static str, value: String, category: Category) {
        self.segments.push(Segment {
            label,
            value,
            category,
        });
    }

    /// Fail unless `len` bytes are left before `end`.
    fn require(&self, len: usize, end: usize, fields: &'static str) -> Result<()> {
        if self.pos + len > end {
            return Err(Error::IncompleteData(fields));
        }
        Ok(())
    }

    fn byte(&mut self, label: &'static str, category: Category) -> u8 {
        let byte = self.bytes[self.pos];
        self.pos += 1;
        self.push(label, format_hex(byte, 2), category);
        byte
    }

    fn word(&mut self, label: &'static str, category: Category) -> u16 {
        let word = join_word([self.bytes[self.pos], self.bytes[self.pos + 1]]);
        self.pos += 2;
        self.push(label, format_hex(word, 4), category);
        word
    }

    /// The next `count` bytes, if they end at or before `end`.
    fn take(&mut self, count: usize, end: usize) -> Option<&'a [u8]> {
        if self.pos + count > end {
            return None;
        }
        let data = self.bytes.get(self.pos..self.pos + count)?;
        self.pos += count;
        Some(data)
    }
}

/// Split a raw ADU into labeled segments, left to right.
///
/// Parsing stops at the first structural problem; no partial result is
/// returned.
pub fn decode(bytes: &[u8], mode: Mode) -> Result<Vec<Segment>> {
    let mut cur = Cursor::new(bytes);

    match mode {
        Mode::Tcp => {
            if bytes.len() < HEADER_LEN {
                return Err(Error::IncompleteHeader);
            }
            cur.word("TID", Category::TransactionId);
            cur.word("PID", Category::ProtocolId);
            cur.word("Length", Category::Length);
            cur.byte("Unit ID", Category::UnitId);
        }
        Mode::Rtu => {
            if bytes.is_empty() {
                return Err(Error::MissingSlaveId);
            }
            cur.byte("Slave ID", Category::SlaveId);
        }
    }

    if cur.pos >= bytes.len() {
        return Err(Error::MissingFunctionCode);
    }
    let fn_code = FunctionCode::new(cur.byte("Func", Category::FunctionCode));

    // RTU data stops in front of the CRC
    let data_end = match mode {
        Mode::Rtu => bytes.len().saturating_sub(2),
        Mode::Tcp => bytes.len(),
    };

    use FunctionCode as f;

    match fn_code {
        f::ReadCoils | f::ReadDiscreteInputs | f::ReadHoldingRegisters | f::ReadInputRegisters => {
            cur.require(4, data_end, "Addr/Qty")?;
            cur.word("Addr", Category::Address);
            cur.word("Qty", Category::Quantity);
        }
        f::WriteSingleCoil | f::WriteSingleRegister => {
            cur.require(4, data_end, "Addr/Value")?;
            cur.word("Addr", Category::Address);
            cur.word("Value", Category::Value);
        }
        f::WriteMultipleCoils | f::WriteMultipleRegisters => {
            cur.require(5, data_end, "Addr/Qty/BC")?;
            cur.word("Addr", Category::Address);
            cur.word("Qty", Category::Quantity);
            let byte_count = cur.byte("ByteCount", Category::ByteCount);
            let data = cur
                .take(byte_count.into(), data_end)
                .ok_or(Error::ByteCountMismatch(byte_count))?;
            let values = if fn_code == f::WriteMultipleCoils {
                format_bytes(data)
            } else {
                format_words(data)
            };
            cur.push("Values", values, Category::Value);
        }
        f::Custom(_) => {
            if let Some(data) = cur.take(data_end.saturating_sub(cur.pos), data_end) {
                if !data.is_empty() {
                    cur.push("Data", format_bytes(data), Category::Data);
                }
            }
        }
    }

    #[cfg(feature = "log")]
    if cur.pos < data_end {
        log::warn!(
            "{} byte(s) after the {} payload were not parsed",
            data_end - cur.pos,
            mode
        );
    }

    if mode == Mode::Rtu {
        if bytes.len() < cur.pos + 2 {
            return Err(Error::MissingCrc);
        }
        let crc = &bytes[bytes.len() - 2..];
        cur.push(
            "CRC",
            format!("{}{}", format_hex(crc[0], 2), format_hex(crc[1], 2)),
            Category::Crc,
        );
        #[cfg(feature = "log")]
        if let Err(err) = crate::rtu::verify_crc(bytes) {
            log::warn!("Displayed frame fails the CRC check: {err}");
        }
    }

    Ok(cur.segments)
}

/// Big-endian words; an odd byte at the end shows as `??`.
fn format_words(data: &[u8]) -> String {
    let words: Vec<_> = data
        .chunks(2)
        .map(|chunk| match *chunk {
            [hi, lo] => format_hex(join_word([hi, lo]), 4),
            _ => format_hex_or_placeholder(None::<u16>, 2),
        })
        .collect();
    words.join(" ")
}

/// Like [`decode`], but a failure becomes a single [`Category::Error`] segment.
#[must_use]
pub fn render(bytes: &[u8], mode: Mode) -> Vec<Segment> {
    decode(bytes, mode).unwrap_or_else(|err| {
        #[cfg(feature = "log")]
        log::error!("Breakdown error: {err}");
        vec![Segment {
            label: "Error",
            value: format!("Breakdown Error: {err}"),
            category: Category::Error,
        }]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Message, Request, Session, Transport};
    use alloc::string::ToString;
    use core::net::{Ipv4Addr, SocketAddrV4};

    fn labeled(segments: &[Segment]) -> Vec<(&'static str, &str)> {
        segments
            .iter()
            .map(|s| (s.label, s.value.as_str()))
            .collect()
    }

    #[test]
    fn read_coils_rtu_frame() {
        let segments = decode(&[0x04, 0x01, 0x00, 0x0A, 0x00, 0x0D, 0xDD, 0x98], Mode::Rtu).unwrap();
        assert_eq!(
            labeled(&segments),
            &[
                ("Slave ID", "04"),
                ("Func", "01"),
                ("Addr", "000A"),
                ("Qty", "000D"),
                ("CRC", "DD98"),
            ]
        );
        let categories: Vec<_> = segments.iter().map(|s| s.category).collect();
        assert_eq!(
            categories,
            &[
                Category::SlaveId,
                Category::FunctionCode,
                Category::Address,
                Category::Quantity,
                Category::Crc,
            ]
        );
    }

    #[test]
    fn read_holding_registers_tcp_frame() {
        let buf = &[
            0x00, 0x2A, 0x00, 0x00, 0x00, 0x06, 0x01, 0x03, 0x00, 0x64, 0x00, 0x02,
        ];
        let segments = decode(buf, Mode::Tcp).unwrap();
        assert_eq!(
            labeled(&segments),
            &[
                ("TID", "002A"),
                ("PID", "0000"),
                ("Length", "0006"),
                ("Unit ID", "01"),
                ("Func", "03"),
                ("Addr", "0064"),
                ("Qty", "0002"),
            ]
        );
    }

    #[test]
    fn write_multiple_coils_frame() {
        let buf = &[0x0A, 0x0F, 0x00, 0x00, 0x00, 0x02, 0x01, 0x01, 0x5E, 0xE4];
        let segments = decode(buf, Mode::Rtu).unwrap();
        assert_eq!(
            labeled(&segments),
            &[
                ("Slave ID", "0A"),
                ("Func", "0F"),
                ("Addr", "0000"),
                ("Qty", "0002"),
                ("ByteCount", "01"),
                ("Values", "01"),
                ("CRC", "5EE4"),
            ]
        );
    }

    #[test]
    fn write_multiple_registers_frame() {
        let buf = &[
            0x00, 0x01, 0x00, 0x00, 0x00, 0x0B, 0x11, 0x10, 0x00, 0x01, 0x00, 0x02, 0x04, 0x00,
            0x0A, 0x01, 0x02,
        ];
        let segments = decode(buf, Mode::Tcp).unwrap();
        assert_eq!(segments[8].to_string(), "Values: 000A 0102");
        assert_eq!(segments[8].category, Category::Value);
    }

    #[test]
    fn odd_register_byte_count() {
        let buf = &[0x01, 0x10, 0x00, 0x01, 0x00, 0x02, 0x03, 0x00, 0x0A, 0x01, 0xAA, 0xBB];
        let segments = decode(buf, Mode::Rtu).unwrap();
        let values = segments.iter().find(|s| s.label == "Values").unwrap();
        assert_eq!(values.value, "000A ??");
    }

    #[test]
    fn unknown_function_code_shows_data() {
        let buf = &[0x01, 0x07, 0xAB, 0xCD, 0x12, 0x34];
        let segments = decode(buf, Mode::Rtu).unwrap();
        assert_eq!(
            labeled(&segments),
            &[
                ("Slave ID", "01"),
                ("Func", "07"),
                ("Data", "AB CD"),
                ("CRC", "1234"),
            ]
        );

        let segments = decode(&[0x01, 0x07, 0x12, 0x34], Mode::Rtu).unwrap();
        assert!(segments.iter().all(|s| s.category != Category::Data));
    }

    #[test]
    fn structural_errors() {
        assert_eq!(decode(&[], Mode::Rtu).unwrap_err(), Error::MissingSlaveId);
        assert_eq!(
            decode(&[0x01], Mode::Rtu).unwrap_err(),
            Error::MissingFunctionCode
        );
        assert_eq!(
            decode(&[0, 1, 0, 0, 0, 6], Mode::Tcp).unwrap_err(),
            Error::IncompleteHeader
        );
        assert_eq!(
            decode(&[0, 1, 0, 0, 0, 1, 1], Mode::Tcp).unwrap_err(),
            Error::MissingFunctionCode
        );
        assert_eq!(
            decode(&[0x01, 0x03, 0x00, 0x0A, 0x00], Mode::Rtu).unwrap_err(),
            Error::IncompleteData("Addr/Qty")
        );
        assert_eq!(
            decode(&[0, 1, 0, 0, 0, 4, 1, 0x06, 0x00, 0x0A], Mode::Tcp).unwrap_err(),
            Error::IncompleteData("Addr/Value")
        );
        assert_eq!(
            decode(&[0x01, 0x0F, 0x00, 0x00, 0x00, 0x02, 0xAA, 0xBB], Mode::Rtu).unwrap_err(),
            Error::IncompleteData("Addr/Qty/BC")
        );
        assert_eq!(
            decode(
                &[0x01, 0x0F, 0x00, 0x00, 0x00, 0x02, 0x05, 0x01, 0xAA, 0xBB],
                Mode::Rtu
            )
            .unwrap_err(),
            Error::ByteCountMismatch(5)
        );
        assert_eq!(
            decode(&[0x01, 0x07, 0xAA], Mode::Rtu).unwrap_err(),
            Error::MissingCrc
        );
    }

    #[test]
    fn trailing_bytes_are_tolerated() {
        let buf = &[0x04, 0x01, 0x00, 0x0A, 0x00, 0x0D, 0xFF, 0xDD, 0x98];
        let segments = decode(buf, Mode::Rtu).unwrap();
        assert_eq!(segments.last().unwrap().value, "DD98");
        assert_eq!(segments.len(), 5);
    }

    #[test]
    fn crc_is_displayed_not_verified() {
        let buf = &[0x04, 0x01, 0x00, 0x0A, 0x00, 0x0D, 0x00, 0x00];
        let segments = decode(buf, Mode::Rtu).unwrap();
        assert_eq!(segments.last().unwrap().value, "0000");
    }

    #[test]
    fn render_turns_errors_into_a_segment() {
        assert_eq!(
            render(&[0x01], Mode::Rtu),
            &[Segment {
                label: "Error",
                value: "Breakdown Error: Missing function code".into(),
                category: Category::Error,
            }]
        );
        assert_eq!(
            render(&[0x04, 0x01, 0x00, 0x0A, 0x00, 0x0D, 0xDD, 0x98], Mode::Rtu).len(),
            5
        );
    }

    #[test]
    fn encoded_frames_break_down_into_their_fields() {
        let session = Session::with_transaction_id(0x1234);
        let requests = [
            (Request::ReadCoils(10, 13), "000A", "000D", None),
            (Request::ReadDiscreteInputs(0, 8), "0000", "0008", None),
            (Request::ReadHoldingRegisters(100, 2), "0064", "0002", None),
            (Request::ReadInputRegisters(0xFFFF, 125), "FFFF", "007D", None),
            (Request::WriteSingleCoil(172, true), "00AC", "FF00", None),
            (Request::WriteSingleRegister(200, 500), "00C8", "01F4", None),
            (
                Request::WriteMultipleCoils(19, vec![true, false, true, true, false, false, true, true, true, false]),
                "0013",
                "000A",
                Some("CD 01"),
            ),
            (
                Request::WriteMultipleRegisters(1, vec![10, 258]),
                "0001",
                "0002",
                Some("000A 0102"),
            ),
        ];
        let endpoint = SocketAddrV4::new(Ipv4Addr::LOCALHOST, 502);
        for transport in [Transport::Rtu, Transport::Tcp(endpoint)] {
            for (request, addr, second, values) in &requests {
                let message = Message {
                    transport,
                    unit_id: 0x11,
                    request: request.clone(),
                };
                let adu = session.encode(&message).unwrap();
                let segments = decode(&adu, transport.mode()).unwrap();
                let find = |label: &str| {
                    segments
                        .iter()
                        .find(|s| s.label == label)
                        .map(|s| s.value.as_str())
                };
                assert_eq!(
                    find("Func"),
                    Some(format_hex(request.function_code().value(), 2).as_str())
                );
                assert_eq!(find("Addr"), Some(*addr));
                assert_eq!(find("Qty").or_else(|| find("Value")), Some(*second));
                assert_eq!(find("Values"), *values);
                match transport {
                    Transport::Rtu => assert_eq!(find("Slave ID"), Some("11")),
                    Transport::Tcp(_) => assert_eq!(find("Unit ID"), Some("11")),
                }
            }
        }
    }
}

// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Modbus TCP

use super::*;

pub mod client;
pub mod server;
pub use crate::frame::tcp::*;

/// Transaction id, protocol id, length and unit id.
pub const HEADER_LEN: usize = 7;

/// The only protocol id carried by Modbus TCP.
pub const PROTOCOL_ID: u16 = 0x0000;

/// An extracted TCP PDU frame.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedFrame<'a> {
    pub transaction_id: TransactionId,
    pub unit_id: UnitId,
    pub pdu: &'a [u8],
}

/// Split a complete TCP ADU into its MBAP header fields and the PDU.
///
/// The length field must cover exactly the unit id plus the bytes that follow.
pub fn extract_frame(adu: &[u8]) -> Result<DecodedFrame<'_>> {
    if adu.len() < HEADER_LEN {
        return Err(Error::IncompleteHeader);
    }
    let (header, pdu) = adu.split_at(HEADER_LEN);
    let protocol_id = BigEndian::read_u16(&header[2..4]);
    if protocol_id != PROTOCOL_ID {
        return Err(Error::ProtocolNotModbus(protocol_id));
    }
    let m_length = usize::from(BigEndian::read_u16(&header[4..6]));
    if m_length != pdu.len() + 1 {
        return Err(Error::LengthMismatch(m_length, pdu.len() + 1));
    }
    if pdu.is_empty() {
        return Err(Error::MissingFunctionCode);
    }
    Ok(DecodedFrame {
        transaction_id: BigEndian::read_u16(&header[0..2]),
        unit_id: header[6],
        pdu,
    })
}

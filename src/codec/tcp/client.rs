// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Modbus TCP client (master) specific functions.
use super::*;

/// Encode a TCP request.
///
/// The MBAP length field counts the unit id plus the PDU.
pub fn encode_request(adu: &RequestAdu) -> Result<Vec<u8>> {
    let RequestAdu { hdr, pdu } = adu;
    let pdu = pdu.0.encode()?;
    prepend_header(*hdr, &pdu)
}

/// Put the MBAP header in front of an encoded PDU.
pub(crate) fn prepend_header(hdr: Header, pdu: &[u8]) -> Result<Vec<u8>> {
    let length = u16::try_from(pdu.len() + 1).map_err(|_| Error::BufferSize)?;
    let mut buf = Vec::with_capacity(HEADER_LEN + pdu.len());
    buf.extend_from_slice(&hdr.transaction_id.to_be_bytes());
    buf.extend_from_slice(&PROTOCOL_ID.to_be_bytes());
    buf.extend_from_slice(&length.to_be_bytes());
    buf.push(hdr.unit_id);
    buf.extend_from_slice(pdu);
    Ok(buf)
}

// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Modbus RTU client (master) specific functions.
use super::*;

/// Encode an RTU request.
pub fn encode_request(adu: &RequestAdu) -> Result<Vec<u8>> {
    let RequestAdu { hdr, pdu } = adu;
    let pdu = pdu.0.encode()?;
    let mut buf = Vec::with_capacity(pdu.len() + OVERHEAD_LEN);
    buf.push(hdr.slave);
    buf.extend_from_slice(&pdu);
    append_crc(&mut buf);
    debug_assert!(buf.len() <= MAX_FRAME_LEN);
    Ok(buf)
}

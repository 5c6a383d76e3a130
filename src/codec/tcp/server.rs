// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Modbus TCP server (slave) specific functions.
use super::*;

/// Decode a complete TCP request frame.
pub fn decode_request(buf: &[u8]) -> Result<RequestAdu> {
    let DecodedFrame {
        transaction_id,
        unit_id,
        pdu,
    } = extract_frame(buf)?;
    let hdr = Header {
        transaction_id,
        unit_id,
    };
    Request::try_from(pdu)
        .map(RequestPdu)
        .map(|pdu| RequestAdu { hdr, pdu })
        .inspect_err(|_err| {
            #[cfg(feature = "log")]
            log::error!("Failed to decode request PDU: {_err}");
        })
}

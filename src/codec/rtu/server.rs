// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Modbus RTU server (slave) specific functions.
use super::*;

/// Decode a complete RTU request frame.
pub fn decode_request(buf: &[u8]) -> Result<RequestAdu> {
    let DecodedFrame { slave, pdu } = extract_frame(buf)?;
    let hdr = Header { slave };
    Request::try_from(pdu)
        .map(RequestPdu)
        .map(|pdu| RequestAdu { hdr, pdu })
        .inspect_err(|_err| {
            #[cfg(feature = "log")]
            log::error!("Failed to decode request PDU: {_err}");
        })
}

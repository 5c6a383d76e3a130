// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use core::fmt;

use crate::{Field, ValidationErrors};

/// modbus-frames Error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// One or more request parameters failed validation
    Validation(ValidationErrors),
    /// A parameter could not be converted into its typed value
    InvalidParameter(Field),
    /// The function code has no frame construction
    UnsupportedFunction(u8),
    /// Number of values outside what one request can carry
    Quantity(usize),
    /// Invalid coil value
    CoilValue(u16),
    /// Invalid buffer size
    BufferSize,
    /// Invalid CRC
    Crc(u16, u16),
    /// Declared byte count exceeds the available data
    ByteCountMismatch(u8),
    /// Length Mismatch
    LengthMismatch(usize, usize),
    /// Protocol not Modbus
    ProtocolNotModbus(u16),
    /// Fewer bytes than an MBAP header
    IncompleteHeader,
    /// No slave id byte
    MissingSlaveId,
    /// No function code byte after the header
    MissingFunctionCode,
    /// Not enough bytes for the named fields
    IncompleteData(&'static str),
    /// Fewer than two bytes left for the RTU checksum
    MissingCrc,
    /// Malformed hex token in the input text
    InvalidHex,
    /// Not an unsigned 16 bit decimal number
    InvalidNumber,
    /// The input text contains no bytes
    EmptyInput,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Error::*;

        match self {
            Validation(errors) => write!(f, "Invalid parameters: {errors}"),
            InvalidParameter(field) => write!(f, "Invalid parameter: {field}"),
            UnsupportedFunction(fn_code) => {
                write!(f, "Function code {fn_code} construction not implemented")
            }
            Quantity(cnt) => write!(f, "Invalid quantity: {cnt}"),
            CoilValue(v) => write!(f, "Invalid coil value: 0x{v:0>4X}"),
            BufferSize => write!(f, "Invalid buffer size"),
            Crc(expected, actual) => write!(
                f,
                "Invalid CRC: expected = 0x{expected:0>4X}, actual = 0x{actual:0>4X}"
            ),
            ByteCountMismatch(cnt) => write!(f, "Byte count mismatch: {cnt}"),
            LengthMismatch(length_field, pdu_len) => write!(
                f,
                "Length Mismatch: Length Field: {length_field}, PDU Len + 1: {pdu_len}"
            ),
            ProtocolNotModbus(protocol_id) => {
                write!(f, "Protocol not Modbus(0), received {protocol_id} instead")
            }
            IncompleteHeader => write!(f, "Incomplete MBAP header"),
            MissingSlaveId => write!(f, "Missing slave id"),
            MissingFunctionCode => write!(f, "Missing function code"),
            IncompleteData(fields) => write!(f, "Incomplete data ({fields})"),
            MissingCrc => write!(f, "Missing CRC"),
            InvalidHex => write!(f, "Invalid hex in input"),
            InvalidNumber => write!(f, "Invalid number: expected 0-65535"),
            EmptyInput => write!(f, "No bytes in input"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{error::*, frame::*, util::*};
use alloc::vec::Vec;
use byteorder::{BigEndian, ByteOrder};

pub mod rtu;
pub mod tcp;

type Result<T> = core::result::Result<T, Error>;

impl Request {
    /// Serialize the request into a PDU: function code followed by payload.
    ///
    /// Multiple writes must carry between one value and
    /// [`MAX_WRITE_COILS`] / [`MAX_WRITE_REGISTERS`] values.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.pdu_len());
        buf.push(self.function_code().value());
        match self {
            Self::ReadCoils(address, quantity)
            | Self::ReadDiscreteInputs(address, quantity)
            | Self::ReadHoldingRegisters(address, quantity)
            | Self::ReadInputRegisters(address, quantity) => {
                buf.extend_from_slice(&split_word(*address));
                buf.extend_from_slice(&split_word(*quantity));
            }
            Self::WriteSingleCoil(address, state) => {
                buf.extend_from_slice(&split_word(*address));
                buf.extend_from_slice(&split_word(bool_to_u16_coil(*state)));
            }
            Self::WriteSingleRegister(address, word) => {
                buf.extend_from_slice(&split_word(*address));
                buf.extend_from_slice(&split_word(*word));
            }
            Self::WriteMultipleCoils(address, coils) => {
                let quantity = checked_quantity(coils.len(), MAX_WRITE_COILS)?;
                let packed = pack_coils(coils);
                buf.extend_from_slice(&split_word(*address));
                buf.extend_from_slice(&split_word(quantity));
                buf.push(packed.len() as u8);
                buf.extend_from_slice(&packed);
            }
            Self::WriteMultipleRegisters(address, words) => {
                let quantity = checked_quantity(words.len(), MAX_WRITE_REGISTERS)?;
                buf.extend_from_slice(&split_word(*address));
                buf.extend_from_slice(&split_word(quantity));
                buf.push((words.len() * 2) as u8);
                for w in words {
                    buf.extend_from_slice(&split_word(*w));
                }
            }
        }
        debug_assert_eq!(buf.len(), self.pdu_len());
        Ok(buf)
    }
}

fn checked_quantity(len: usize, max: u16) -> Result<Quantity> {
    if len == 0 || len > usize::from(max) {
        return Err(Error::Quantity(len));
    }
    Ok(len as Quantity)
}

impl TryFrom<&[u8]> for Request {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::BufferSize);
        }

        let fn_code = bytes[0];

        if bytes.len() < min_request_pdu_len(fn_code.into()) {
            return Err(Error::BufferSize);
        }

        use crate::frame::Request::*;
        use FunctionCode as f;

        // Every supported request starts with an address and a second word
        let addr = || BigEndian::read_u16(&bytes[1..3]);
        let word = || BigEndian::read_u16(&bytes[3..5]);

        let req = match FunctionCode::new(fn_code) {
            f::ReadCoils => ReadCoils(addr(), word()),
            f::ReadDiscreteInputs => ReadDiscreteInputs(addr(), word()),
            f::ReadInputRegisters => ReadInputRegisters(addr(), word()),
            f::ReadHoldingRegisters => ReadHoldingRegisters(addr(), word()),
            f::WriteSingleRegister => WriteSingleRegister(addr(), word()),
            f::WriteSingleCoil => WriteSingleCoil(addr(), u16_coil_to_bool(word())?),
            f::WriteMultipleCoils => {
                let quantity = usize::from(word());
                let data = byte_counted_data(bytes, packed_coils_len(quantity))?;
                WriteMultipleCoils(addr(), unpack_coils(data, quantity)?)
            }
            f::WriteMultipleRegisters => {
                let data = byte_counted_data(bytes, usize::from(word()) * 2)?;
                let words = data.chunks_exact(2).map(BigEndian::read_u16).collect();
                WriteMultipleRegisters(addr(), words)
            }
            f::Custom(code) => return Err(Error::UnsupportedFunction(code)),
        };
        Ok(req)
    }
}

/// Payload after the byte count of a multiple-write PDU.
///
/// The byte count must agree with both the quantity and the buffer.
fn byte_counted_data(bytes: &[u8], expected: usize) -> Result<&[u8]> {
    let byte_count = bytes[5];
    if bytes.len() < 6 + byte_count as usize || byte_count as usize != expected {
        return Err(Error::ByteCountMismatch(byte_count));
    }
    Ok(&bytes[6..6 + byte_count as usize])
}

fn min_request_pdu_len(fn_code: FunctionCode) -> usize {
    use FunctionCode::*;
    match fn_code {
        ReadCoils | ReadDiscreteInputs | ReadInputRegisters | WriteSingleCoil
        | ReadHoldingRegisters | WriteSingleRegister => 5,
        WriteMultipleCoils => 6,
        WriteMultipleRegisters => 6,
        Custom(_) => 1,
    }
}

// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use alloc::vec::Vec;
use core::{fmt, net::SocketAddrV4, str::FromStr};

pub(crate) mod rtu;
pub(crate) mod tcp;

use crate::{error::Error, validate::Field};

/// The transport a frame is built for.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Serial line: slave id, PDU and CRC-16.
    #[default]
    Rtu,
    /// MBAP header followed by the PDU.
    Tcp,
}

impl Mode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rtu => "rtu",
            Self::Tcp => "tcp",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("rtu") {
            Ok(Self::Rtu)
        } else if s.eq_ignore_ascii_case("tcp") {
            Ok(Self::Tcp)
        } else {
            Err(Error::InvalidParameter(Field::Mode))
        }
    }
}

/// A Modbus function code.
///
/// It is represented by an unsigned 8 bit integer.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionCode {
    /// Modbus Function Code: `01` (`0x01`).
    ReadCoils,

    /// Modbus Function Code: `02` (`0x02`).
    ReadDiscreteInputs,

    /// Modbus Function Code: `05` (`0x05`).
    WriteSingleCoil,

    /// Modbus Function Code: `06` (`0x06`).
    WriteSingleRegister,

    /// Modbus Function Code: `03` (`0x03`).
    ReadHoldingRegisters,

    /// Modbus Function Code: `04` (`0x04`).
    ReadInputRegisters,

    /// Modbus Function Code: `15` (`0x0F`).
    WriteMultipleCoils,

    /// Modbus Function Code: `16` (`0x10`).
    WriteMultipleRegisters,

    /// Any other function code. Frames can't be built for it, and the
    /// breakdown shows its payload as opaque data.
    Custom(u8),
}

impl FunctionCode {
    /// Create a new [`FunctionCode`] with `value`.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        match value {
            0x01 => Self::ReadCoils,
            0x02 => Self::ReadDiscreteInputs,
            0x05 => Self::WriteSingleCoil,
            0x06 => Self::WriteSingleRegister,
            0x03 => Self::ReadHoldingRegisters,
            0x04 => Self::ReadInputRegisters,
            0x0F => Self::WriteMultipleCoils,
            0x10 => Self::WriteMultipleRegisters,
            code => FunctionCode::Custom(code),
        }
    }

    /// Get the [`u8`] value of the current [`FunctionCode`].
    #[must_use]
    pub const fn value(self) -> u8 {
        match self {
            Self::ReadCoils => 0x01,
            Self::ReadDiscreteInputs => 0x02,
            Self::WriteSingleCoil => 0x05,
            Self::WriteSingleRegister => 0x06,
            Self::ReadHoldingRegisters => 0x03,
            Self::ReadInputRegisters => 0x04,
            Self::WriteMultipleCoils => 0x0F,
            Self::WriteMultipleRegisters => 0x10,
            Self::Custom(code) => code,
        }
    }

    /// `true` for every code a frame can be constructed for.
    #[must_use]
    pub const fn is_supported(self) -> bool {
        !matches!(self, Self::Custom(_))
    }
}

impl From<u8> for FunctionCode {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for FunctionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.value(), f)
    }
}

/// A Modbus address is represented by 16 bit (from `0` to `65535`).
pub type Address = u16;

/// A Coil represents a single bit.
///
/// - `true` is equivalent to `ON`, `1` and `0xFF00`.
/// - `false` is equivalent to `OFF`, `0` and `0x0000`.
pub type Coil = bool;

/// Modbus uses 16 bit for its data items (big-endian representation).
pub type Word = u16;

/// Number of items to process (`0` - `65535`).
pub type Quantity = u16;

/// Slave ID
pub type SlaveId = u8;

/// MBAP transaction id
pub type TransactionId = u16;

/// MBAP unit id
pub type UnitId = u8;

/// Most coils/discrete inputs one read request may ask for.
pub const MAX_READ_COILS: u16 = 2000;

/// Most registers one read request may ask for.
pub const MAX_READ_REGISTERS: u16 = 125;

/// Most coils one write request may carry.
pub const MAX_WRITE_COILS: u16 = 1968;

/// Most registers one write request may carry.
pub const MAX_WRITE_REGISTERS: u16 = 123;

/// A request represents a message from the client (master) to the server (slave).
///
/// The multiple-write variants carry their values; the quantity on the wire
/// is the number of values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    ReadCoils(Address, Quantity),
    ReadDiscreteInputs(Address, Quantity),
    ReadHoldingRegisters(Address, Quantity),
    ReadInputRegisters(Address, Quantity),
    WriteSingleCoil(Address, Coil),
    WriteSingleRegister(Address, Word),
    WriteMultipleCoils(Address, Vec<Coil>),
    WriteMultipleRegisters(Address, Vec<Word>),
}

/// Represents a message from the client (master) to the server (slave).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPdu(pub Request);

impl From<&Request> for FunctionCode {
    fn from(r: &Request) -> Self {
        use Request as R;

        match r {
            R::ReadCoils(_, _) => Self::ReadCoils,
            R::ReadDiscreteInputs(_, _) => Self::ReadDiscreteInputs,
            R::ReadHoldingRegisters(_, _) => Self::ReadHoldingRegisters,
            R::ReadInputRegisters(_, _) => Self::ReadInputRegisters,
            R::WriteSingleCoil(_, _) => Self::WriteSingleCoil,
            R::WriteSingleRegister(_, _) => Self::WriteSingleRegister,
            R::WriteMultipleCoils(_, _) => Self::WriteMultipleCoils,
            R::WriteMultipleRegisters(_, _) => Self::WriteMultipleRegisters,
        }
    }
}

impl Request {
    /// Number of bytes required for a serialized PDU frame.
    #[must_use]
    pub fn pdu_len(&self) -> usize {
        match self {
            Self::ReadCoils(_, _)
            | Self::ReadDiscreteInputs(_, _)
            | Self::ReadInputRegisters(_, _)
            | Self::ReadHoldingRegisters(_, _)
            | Self::WriteSingleRegister(_, _)
            | Self::WriteSingleCoil(_, _) => 5,
            Self::WriteMultipleCoils(_, coils) => 6 + crate::util::packed_coils_len(coils.len()),
            Self::WriteMultipleRegisters(_, words) => 6 + words.len() * 2,
        }
    }

    #[must_use]
    pub fn function_code(&self) -> FunctionCode {
        self.into()
    }
}

/// Where a validated request goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Rtu,
    /// The endpoint is validated but not part of the frame bytes.
    Tcp(SocketAddrV4),
}

impl Transport {
    #[must_use]
    pub const fn mode(&self) -> Mode {
        match self {
            Self::Rtu => Mode::Rtu,
            Self::Tcp(_) => Mode::Tcp,
        }
    }
}

/// A typed request bound to a transport and unit, ready to encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub transport: Transport,
    pub unit_id: UnitId,
    pub request: Request,
}

// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use alloc::{string::String, vec::Vec};
use core::{
    net::{Ipv4Addr, SocketAddrV4},
    str::FromStr,
};

use crate::{
    error::Error,
    frame::*,
    util::u16_coil_to_bool,
    validate::Field,
};

/// Request parameters as entered by a user.
///
/// Everything except the mode is kept as text so that [`validate`](crate::validate())
/// can report on input that isn't a number at all. Which of the
/// function-specific fields are read depends on the function code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestParameters {
    pub mode: Mode,
    /// Slave id (RTU) or unit id (TCP), decimal.
    pub unit_id: String,
    /// TCP only.
    pub ip: String,
    /// TCP only.
    pub port: String,
    /// Decimal function code, e.g. `"03"` or `"15"`.
    pub function_code: String,
    /// First address of function codes 01-04, 15 and 16.
    pub start: String,
    /// Number of items of function codes 01-04, 15 and 16.
    pub quantity: String,
    /// Address of function codes 05 and 06.
    pub address: String,
    /// Hex `FF00`/`0000` for function code 05, decimal for 06.
    pub value: String,
    /// Comma separated list for function codes 15 and 16.
    pub values: String,
}

impl Default for RequestParameters {
    fn default() -> Self {
        Self {
            mode: Mode::Rtu,
            unit_id: "1".into(),
            ip: "192.168.1.10".into(),
            port: "502".into(),
            function_code: String::new(),
            start: "0".into(),
            quantity: "1".into(),
            address: "0".into(),
            value: "0".into(),
            values: String::new(),
        }
    }
}

impl RequestParameters {
    /// The text of a field. [`Field::Mode`] has none.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        let text = match field {
            Field::Mode => return None,
            Field::UnitId => &self.unit_id,
            Field::Ip => &self.ip,
            Field::Port => &self.port,
            Field::FunctionCode => &self.function_code,
            Field::Start => &self.start,
            Field::Quantity => &self.quantity,
            Field::Address => &self.address,
            Field::Value => &self.value,
            Field::Values => &self.values,
        };
        Some(text)
    }

    pub fn text_mut(&mut self, field: Field) -> Option<&mut String> {
        let text = match field {
            Field::Mode => return None,
            Field::UnitId => &mut self.unit_id,
            Field::Ip => &mut self.ip,
            Field::Port => &mut self.port,
            Field::FunctionCode => &mut self.function_code,
            Field::Start => &mut self.start,
            Field::Quantity => &mut self.quantity,
            Field::Address => &mut self.address,
            Field::Value => &mut self.value,
            Field::Values => &mut self.values,
        };
        Some(text)
    }

    /// Replace the text of a field; the mode is parsed from `"rtu"`/`"tcp"`.
    pub fn set(&mut self, field: Field, text: &str) -> Result<(), Error> {
        match self.text_mut(field) {
            Some(slot) => *slot = text.into(),
            None => self.mode = text.parse()?,
        }
        Ok(())
    }
}

impl TryFrom<&RequestParameters> for Message {
    type Error = Error;

    /// Strict conversion into typed values.
    ///
    /// Unlike [`validate`](crate::validate()) this stops at the first
    /// offending field.
    fn try_from(params: &RequestParameters) -> Result<Self, Self::Error> {
        use FunctionCode as f;

        let code: u8 = parse_field(&params.function_code, Field::FunctionCode)?;
        let request = match FunctionCode::new(code) {
            f::ReadCoils => Request::ReadCoils(
                parse_field(&params.start, Field::Start)?,
                parse_quantity(&params.quantity, MAX_READ_COILS)?,
            ),
            f::ReadDiscreteInputs => Request::ReadDiscreteInputs(
                parse_field(&params.start, Field::Start)?,
                parse_quantity(&params.quantity, MAX_READ_COILS)?,
            ),
            f::ReadHoldingRegisters => Request::ReadHoldingRegisters(
                parse_field(&params.start, Field::Start)?,
                parse_quantity(&params.quantity, MAX_READ_REGISTERS)?,
            ),
            f::ReadInputRegisters => Request::ReadInputRegisters(
                parse_field(&params.start, Field::Start)?,
                parse_quantity(&params.quantity, MAX_READ_REGISTERS)?,
            ),
            f::WriteSingleCoil => Request::WriteSingleCoil(
                parse_field(&params.address, Field::Address)?,
                parse_coil_value(&params.value).ok_or(Error::InvalidParameter(Field::Value))?,
            ),
            f::WriteSingleRegister => Request::WriteSingleRegister(
                parse_field(&params.address, Field::Address)?,
                parse_field(&params.value, Field::Value)?,
            ),
            f::WriteMultipleCoils => {
                let quantity = parse_quantity(&params.quantity, MAX_WRITE_COILS)?;
                let coils = parse_values(&params.values, quantity, |v| match v {
                    "0" => Some(false),
                    "1" => Some(true),
                    _ => None,
                })?;
                Request::WriteMultipleCoils(parse_field(&params.start, Field::Start)?, coils)
            }
            f::WriteMultipleRegisters => {
                let quantity = parse_quantity(&params.quantity, MAX_WRITE_REGISTERS)?;
                let words = parse_values(&params.values, quantity, |v| v.parse::<Word>().ok())?;
                Request::WriteMultipleRegisters(parse_field(&params.start, Field::Start)?, words)
            }
            f::Custom(code) => return Err(Error::UnsupportedFunction(code)),
        };

        let unit_id = parse_field(&params.unit_id, Field::UnitId)?;
        let transport = match params.mode {
            Mode::Rtu => Transport::Rtu,
            Mode::Tcp => {
                let ip = parse_ipv4(&params.ip).ok_or(Error::InvalidParameter(Field::Ip))?;
                let port: u16 = parse_field(&params.port, Field::Port)?;
                if port == 0 {
                    return Err(Error::InvalidParameter(Field::Port));
                }
                Transport::Tcp(SocketAddrV4::new(ip, port))
            }
        };

        Ok(Message {
            transport,
            unit_id,
            request,
        })
    }
}

fn parse_field<T: FromStr>(text: &str, field: Field) -> Result<T, Error> {
    text.trim()
        .parse()
        .map_err(|_| Error::InvalidParameter(field))
}

fn parse_quantity(text: &str, max: Quantity) -> Result<Quantity, Error> {
    let quantity: Quantity = parse_field(text, Field::Quantity)?;
    if quantity == 0 || quantity > max {
        return Err(Error::InvalidParameter(Field::Quantity));
    }
    Ok(quantity)
}

fn parse_values<T>(
    text: &str,
    quantity: Quantity,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Vec<T>, Error> {
    let values = split_values(text)
        .map(|v| parse(v).ok_or(Error::InvalidParameter(Field::Values)))
        .collect::<Result<Vec<_>, _>>()?;
    if values.len() != usize::from(quantity) {
        return Err(Error::InvalidParameter(Field::Values));
    }
    Ok(values)
}

/// Trimmed, non-empty entries of a comma separated list.
pub(crate) fn split_values(text: &str) -> impl Iterator<Item = &str> {
    text.split(',').map(str::trim).filter(|v| !v.is_empty())
}

/// A single coil value given as hex text: `FF00` is on, `0000` (or `0`) off.
pub(crate) fn parse_coil_value(text: &str) -> Option<Coil> {
    let text = text.trim();
    let text = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    if text.is_empty() || text.len() > 4 || !text.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let value = u16::from_str_radix(text, 16).ok()?;
    u16_coil_to_bool(value).ok()
}

/// Dotted quad with one to three digits per octet.
///
/// Leading zeros are accepted, e.g. `192.168.001.010`.
pub(crate) fn parse_ipv4(text: &str) -> Option<Ipv4Addr> {
    let mut parts = text.trim().split('.');
    let mut octets = [0u8; 4];
    for octet in &mut octets {
        let part = parts.next()?;
        if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *octet = part.parse().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(Ipv4Addr::from(octets))
}

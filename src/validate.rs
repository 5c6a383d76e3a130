// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use alloc::{collections::BTreeMap, format, string::String};
use core::fmt;

use crate::{
    frame::{
        FunctionCode, MAX_READ_COILS, MAX_READ_REGISTERS, MAX_WRITE_COILS, MAX_WRITE_REGISTERS,
        Mode,
    },
    params::{RequestParameters, parse_coil_value, parse_ipv4, split_values},
    util::parse_decimal,
};

/// A user-editable request parameter.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Mode,
    UnitId,
    Ip,
    Port,
    FunctionCode,
    Start,
    Quantity,
    Address,
    Value,
    Values,
}

impl Field {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mode => "mode",
            Self::UnitId => "unit_id",
            Self::Ip => "ip",
            Self::Port => "port",
            Self::FunctionCode => "function_code",
            Self::Start => "start",
            Self::Quantity => "quantity",
            Self::Address => "address",
            Self::Value => "value",
            Self::Values => "values",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every field that failed validation, with one message per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<Field, String>);

impl ValidationErrors {
    fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    /// The message for `field`, if it failed.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Failed fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, msg)| (*field, msg.as_str()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, msg)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {msg}")?;
        }
        Ok(())
    }
}

const NOT_A_NUMBER: &str = "Field cannot be empty and must be a number.";

/// Check all parameters a request needs.
///
/// Every field is checked on its own, so the result names all offending
/// fields at once. A numeric function code without frame construction
/// passes here; building the frame rejects it.
pub fn validate(params: &RequestParameters) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if !matches!(parse_decimal(&params.unit_id), Some(0..=255)) {
        errors.insert(Field::UnitId, "Slave/Unit ID must be 0-255.");
    }

    if params.mode == Mode::Tcp {
        if parse_ipv4(&params.ip).is_none() {
            errors.insert(Field::Ip, "Invalid IP format.");
        }
        if !matches!(parse_decimal(&params.port), Some(1..=65535)) {
            errors.insert(Field::Port, "Port must be 1-65535.");
        }
    }

    if params.function_code.trim().is_empty() {
        errors.insert(Field::FunctionCode, "Please select a function code.");
    } else {
        match parse_decimal(&params.function_code) {
            Some(code @ 0..=255) => check_function_params(code as u8, params, &mut errors),
            _ => errors.insert(Field::FunctionCode, "Function code must be a number 0-255."),
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_function_params(code: u8, params: &RequestParameters, errors: &mut ValidationErrors) {
    use FunctionCode as f;

    match FunctionCode::new(code) {
        f::ReadCoils | f::ReadDiscreteInputs => {
            check_range(errors, Field::Start, &params.start, 0, 0xFFFF);
            check_range(errors, Field::Quantity, &params.quantity, 1, MAX_READ_COILS.into());
        }
        f::ReadHoldingRegisters | f::ReadInputRegisters => {
            check_range(errors, Field::Start, &params.start, 0, 0xFFFF);
            check_range(errors, Field::Quantity, &params.quantity, 1, MAX_READ_REGISTERS.into());
        }
        f::WriteSingleCoil => {
            check_range(errors, Field::Address, &params.address, 0, 0xFFFF);
            if parse_coil_value(&params.value).is_none() {
                errors.insert(Field::Value, "Value must be FF00 (ON) or 0000 (OFF).");
            }
        }
        f::WriteSingleRegister => {
            check_range(errors, Field::Address, &params.address, 0, 0xFFFF);
            check_range(errors, Field::Value, &params.value, 0, 0xFFFF);
        }
        f::WriteMultipleCoils => {
            check_range(errors, Field::Start, &params.start, 0, 0xFFFF);
            check_range(errors, Field::Quantity, &params.quantity, 1, MAX_WRITE_COILS.into());
            check_values(
                errors,
                params,
                |v| v == "0" || v == "1",
                "Values must be comma-separated 0s or 1s.",
            );
        }
        f::WriteMultipleRegisters => {
            check_range(errors, Field::Start, &params.start, 0, 0xFFFF);
            check_range(errors, Field::Quantity, &params.quantity, 1, MAX_WRITE_REGISTERS.into());
            check_values(
                errors,
                params,
                |v| v.parse::<u16>().is_ok(),
                "Values must be comma-separated numbers (0-65535).",
            );
        }
        f::Custom(_) => {}
    }
}

fn check_range(errors: &mut ValidationErrors, field: Field, text: &str, min: i64, max: i64) {
    match parse_decimal(text) {
        None => errors.insert(field, NOT_A_NUMBER),
        Some(value) if value < min || value > max => {
            errors.insert(field, format!("Value must be between {min} and {max}."));
        }
        Some(_) => {}
    }
}

/// The list must have one entry per quantity before its entries are judged.
fn check_values(
    errors: &mut ValidationErrors,
    params: &RequestParameters,
    is_valid: fn(&str) -> bool,
    message: &'static str,
) {
    let count = split_values(&params.values).count();
    match parse_decimal(&params.quantity) {
        Some(quantity) if quantity > 0 && usize::try_from(quantity) != Ok(count) => {
            errors.insert(
                Field::Values,
                format!("Expected {quantity} values, got {count}."),
            );
        }
        _ if !split_values(&params.values).all(is_valid) => errors.insert(Field::Values, message),
        _ => {}
    }
}

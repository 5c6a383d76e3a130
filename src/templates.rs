// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ready-made requests for common field devices.

use crate::{Field, Mode, RequestParameters};

/// A named request preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    pub key: &'static str,
    pub description: &'static str,
    pub mode: Mode,
    pub unit_id: &'static str,
    pub function_code: &'static str,
    /// Function specific fields; everything else keeps its default.
    pub fields: &'static [(Field, &'static str)],
}

impl Template {
    /// Parameters with this template applied on top of the defaults.
    #[must_use]
    pub fn parameters(&self) -> RequestParameters {
        let mut params = RequestParameters {
            mode: self.mode,
            unit_id: self.unit_id.into(),
            function_code: self.function_code.into(),
            ..Default::default()
        };
        for (field, text) in self.fields {
            if let Some(slot) = params.text_mut(*field) {
                *slot = (*text).into();
            }
        }
        params
    }
}

pub static TEMPLATES: [Template; 4] = [
    Template {
        key: "readTempFloat",
        description: "Read Temperature (Float): Reads 2 Holding Registers (e.g., 40101, 40102) \
                      often used for float values. Assumes Slave ID 1, Address 100 (0-based).",
        mode: Mode::Rtu,
        unit_id: "1",
        function_code: "03",
        fields: &[(Field::Start, "100"), (Field::Quantity, "2")],
    },
    Template {
        key: "setVfdSpeed",
        description: "Set VFD Speed: Writes a value (e.g., 500 for 50%) to a single Holding \
                      Register (e.g., 40201). Assumes Slave ID 5, Address 200 (0-based).",
        mode: Mode::Rtu,
        unit_id: "5",
        function_code: "06",
        fields: &[(Field::Address, "200"), (Field::Value, "500")],
    },
    Template {
        key: "readInputs8",
        description: "Read 8 Inputs: Reads status of 8 Discrete Inputs (e.g., 10001-10008). \
                      Assumes Slave ID 1, Start Address 0.",
        mode: Mode::Rtu,
        unit_id: "1",
        function_code: "02",
        fields: &[(Field::Start, "0"), (Field::Quantity, "8")],
    },
    Template {
        key: "startStopMotor",
        description: "Start Motor: Writes to two coils (e.g., 00001=Start, 00002=Stop). Sets \
                      Coil 1 to ON (1) and Coil 2 to OFF (0). Assumes Slave ID 10, Start \
                      Address 0.",
        mode: Mode::Rtu,
        unit_id: "10",
        function_code: "15",
        fields: &[
            (Field::Start, "0"),
            (Field::Quantity, "2"),
            (Field::Values, "1,0"),
        ],
    },
];

/// Look up a template by key.
#[must_use]
pub fn find(key: &str) -> Option<&'static Template> {
    TEMPLATES.iter().find(|t| t.key == key)
}

// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

#![doc = include_str!("../README.md")]
#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod breakdown;
mod codec;
mod error;
mod frame;
mod params;
mod session;
pub mod templates;
pub mod util;
mod validate;

pub use codec::rtu;
pub use codec::tcp;
pub use error::*;
pub use frame::*;
pub use params::*;
pub use session::*;
pub use validate::*;

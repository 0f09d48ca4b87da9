// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Typed physical quantities used by the protocol designer.
//!
//! Every quantity is a thin wrapper over a number tagged with a zero-sized unit
//! marker, so that a volume can not be passed where a flow rate is expected.

#[doc(hidden)]
pub use serde as _serde;

pub mod duration;
pub mod flow_rate;
pub mod length;
pub mod temperature;
pub(crate) mod unit;
pub mod volume;

pub use duration::{Duration, Seconds, seconds};
pub use flow_rate::{FlowRate, MicrolitersPerSecond, microliters_per_second};
pub use length::{Length, Millimeters, millimeters};
pub use temperature::{Celsius, Temperature, celsius};
pub use volume::{Microliters, Volume, microliters};

// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use crate::{quantity, unit_marker};

quantity!(Temperature);
unit_marker!(Celsius, "°C");

pub const fn celsius<T>(value: T) -> Temperature<Celsius, T> {
    Temperature {
        value,
        unit: Celsius,
    }
}

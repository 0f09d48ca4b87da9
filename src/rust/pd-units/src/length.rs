// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use crate::{quantity, unit_marker};

quantity!(Length);
unit_marker!(Millimeters, "mm");

pub const fn millimeters<T>(value: T) -> Length<Millimeters, T> {
    Length {
        value,
        unit: Millimeters,
    }
}

// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use crate::{quantity, unit_marker};

quantity!(FlowRate);
unit_marker!(MicrolitersPerSecond, "µL/s");

pub const fn microliters_per_second<T>(value: T) -> FlowRate<MicrolitersPerSecond, T> {
    FlowRate {
        value,
        unit: MicrolitersPerSecond,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", microliters_per_second(7.56)), "7.56 µL/s");
        assert_eq!(format!("{:#}", microliters_per_second(7.5)), "7.5 µL/s");
    }
}

// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use crate::{quantity, unit_marker};

quantity!(Volume);
unit_marker!(Microliters, "µL");

pub const fn microliters<T>(value: T) -> Volume<Microliters, T> {
    Volume {
        value,
        unit: Microliters,
    }
}

impl<U> Volume<U, f64> {
    /// Compare two volumes, treating differences up to `tolerance` as equal.
    pub fn approx_eq(self, other: Self, tolerance: f64) -> bool {
        (self.value - other.value).abs() <= tolerance
    }

    /// Clamp negative values produced by float subtraction to zero.
    pub fn clamp_non_negative(self) -> Self {
        if self.value < 0.0 {
            Volume {
                value: 0.0,
                unit: self.unit,
            }
        } else {
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creation() {
        let volume: Volume<Microliters> = 50.0.into();
        assert_eq!(volume.value(), 50.0);
        assert_eq!(microliters(20.0).value(), 20.0);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", microliters(50.0)), "50 µL");
        assert_eq!(format!("{}", microliters(0.1) + microliters(0.2)), "0.3 µL");
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(microliters(30.0) + microliters(20.0), microliters(50.0));
        assert_eq!(microliters(30.0) - microliters(30.0), microliters(-0.0));
        assert_eq!(microliters(30.0) * 2.0, microliters(60.0));
        assert_eq!(microliters(30.0) / 3.0, microliters(10.0));
        let total: Volume<Microliters> = [microliters(1.0), microliters(2.5)].into_iter().sum();
        assert_eq!(total, microliters(3.5));
    }

    #[test]
    fn test_cmp() {
        assert!(microliters(10.0) < microliters(20.0));
        assert!(microliters(20.0) >= microliters(20.0));
        assert!(microliters(50.0).approx_eq(microliters(50.0000001), 1e-3));
        assert!(!microliters(50.0).approx_eq(microliters(50.1), 1e-3));
    }

    #[test]
    fn test_clamp_non_negative() {
        assert_eq!(microliters(-1e-12).clamp_non_negative(), microliters(0.0));
        assert_eq!(microliters(3.0).clamp_non_negative(), microliters(3.0));
    }

    #[test]
    fn test_serde_as_number() {
        let json = serde_json::to_string(&microliters(12.5)).unwrap();
        assert_eq!(json, "12.5");
        let volume: Volume<Microliters> = serde_json::from_str("7").unwrap();
        assert_eq!(volume, microliters(7.0));
    }
}

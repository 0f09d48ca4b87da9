// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

pub(crate) fn round_to_significant_digits(x: f64, n: u32) -> f64 {
    if x == 0.0 {
        0.0
    } else {
        let order = x.abs().log10().floor();
        let scale = 10f64.powf((n as f64) - 1.0 - order);
        (x * scale).round() / scale
    }
}

#[macro_export]
macro_rules! quantity {
    ($ident:ident) => {
        /// A quantity represented with unit type.
        ///
        /// # Type Parameter
        /// - `T`: The underlying value (typically a floating point number)
        /// - `U`: The unit of the value. Typically, it is a zero-sized type.
        ///
        /// Serialized as the bare value, the unit is implied by the field it is stored in.
        #[derive(std::clone::Clone, std::marker::Copy, std::default::Default, core::fmt::Debug)]
        pub struct $ident<U, T = f64> {
            pub(crate) value: T,
            pub(crate) unit: U,
        }

        impl<U, T> $ident<U, T> {
            pub fn value(self) -> T {
                self.value
            }
        }

        impl<T: num_traits::Zero + std::cmp::PartialEq, U> PartialEq for $ident<U, T> {
            fn eq(&self, other: &Self) -> bool {
                let a = &self.value;
                let b = &other.value;
                if a.is_zero() && b.is_zero() {
                    true
                } else {
                    a == b
                }
            }
        }

        impl<T: num_traits::Zero + std::cmp::PartialEq, U> Eq for $ident<U, T> {}

        impl<U, T: num_traits::Zero + std::cmp::PartialOrd> PartialOrd for $ident<U, T> {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        impl<U, T: std::cmp::PartialOrd + num_traits::Zero> Ord for $ident<U, T> {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                if self.value < other.value {
                    std::cmp::Ordering::Less
                } else if self.value > other.value {
                    std::cmp::Ordering::Greater
                } else {
                    std::cmp::Ordering::Equal
                }
            }
        }

        impl<U, T> std::ops::Add for $ident<U, T>
        where
            T: std::ops::Add<Output = T> + std::marker::Copy,
            U: std::marker::Copy,
        {
            type Output = Self;

            fn add(self, rhs: Self) -> Self::Output {
                $ident {
                    value: self.value + rhs.value,
                    unit: self.unit,
                }
            }
        }

        impl<U, T> std::ops::AddAssign for $ident<U, T>
        where
            T: std::ops::AddAssign + std::marker::Copy,
        {
            fn add_assign(&mut self, rhs: Self) {
                self.value += rhs.value;
            }
        }

        impl<U, T> std::ops::Sub for $ident<U, T>
        where
            T: std::ops::Sub<Output = T> + std::marker::Copy,
            U: std::marker::Copy,
        {
            type Output = Self;

            fn sub(self, rhs: Self) -> Self::Output {
                $ident {
                    value: self.value - rhs.value,
                    unit: self.unit,
                }
            }
        }

        impl<U, T> std::ops::Mul<T> for $ident<U, T>
        where
            T: std::ops::Mul<T, Output = T> + std::marker::Copy,
            U: std::marker::Copy,
        {
            type Output = Self;

            fn mul(self, rhs: T) -> Self::Output {
                $ident {
                    value: self.value * rhs,
                    unit: self.unit,
                }
            }
        }

        impl<U, T> std::ops::Neg for $ident<U, T>
        where
            T: std::ops::Neg<Output = T> + std::marker::Copy,
            U: std::marker::Copy,
        {
            type Output = Self;

            fn neg(self) -> Self::Output {
                $ident {
                    value: -self.value,
                    unit: self.unit,
                }
            }
        }

        impl<U, T> std::ops::Div<T> for $ident<U, T>
        where
            T: std::ops::Div<T, Output = T> + std::marker::Copy,
            U: std::marker::Copy,
        {
            type Output = Self;

            fn div(self, rhs: T) -> Self::Output {
                $ident {
                    value: self.value / rhs,
                    unit: self.unit,
                }
            }
        }

        impl<U, T> std::iter::Sum for $ident<U, T>
        where
            T: num_traits::Zero + std::marker::Copy,
            U: std::marker::Copy + std::default::Default,
        {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                iter.fold(num_traits::Zero::zero(), |acc: Self, x| $ident {
                    value: acc.value + x.value,
                    unit: acc.unit,
                })
            }
        }

        impl<U, T> std::fmt::Display for $ident<U, T>
        where
            T: std::fmt::Display
                + std::fmt::Debug
                + num_traits::AsPrimitive<f64>
                + num_traits::Float,
            U: std::fmt::Display,
        {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                if f.alternate() {
                    std::fmt::Display::fmt(&self.value, f)?;
                } else {
                    // Drop the last digits of float noise, so that 0.1 µL + 0.2 µL prints as
                    // 0.3 µL and not 0.30000000000000004 µL.
                    let significand_digits = (-T::epsilon().log10() - T::one()).as_() as u32;
                    let value = $crate::unit::round_to_significant_digits(
                        self.value.as_(),
                        significand_digits,
                    );
                    std::fmt::Display::fmt(&value, f)?;
                }
                write!(f, " ")?;
                self.unit.fmt(f)
            }
        }

        impl<T, U> From<T> for $ident<U, T>
        where
            T: num_traits::Num,
            U: std::default::Default,
        {
            fn from(value: T) -> Self {
                $ident {
                    value,
                    unit: U::default(),
                }
            }
        }

        impl<U> From<$ident<U, f64>> for f64 {
            fn from(value: $ident<U, f64>) -> Self {
                value.value
            }
        }

        impl<U, T> num_traits::Zero for $ident<U, T>
        where
            T: num_traits::Zero + std::marker::Copy,
            U: std::marker::Copy + std::default::Default,
        {
            fn zero() -> Self {
                Self {
                    value: T::zero(),
                    unit: U::default(),
                }
            }

            fn is_zero(&self) -> bool {
                self.value.is_zero()
            }
        }

        impl<U, T: $crate::_serde::Serialize> $crate::_serde::Serialize for $ident<U, T> {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: $crate::_serde::Serializer,
            {
                self.value.serialize(serializer)
            }
        }

        impl<'de, U, T> $crate::_serde::Deserialize<'de> for $ident<U, T>
        where
            U: std::default::Default,
            T: $crate::_serde::Deserialize<'de>,
        {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: $crate::_serde::Deserializer<'de>,
            {
                T::deserialize(deserializer).map(|value| $ident {
                    value,
                    unit: U::default(),
                })
            }
        }
    };
}

/// Declares a zero-sized unit marker with its display symbol.
#[macro_export]
macro_rules! unit_marker {
    ($ident:ident, $symbol:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $ident;

        impl std::fmt::Display for $ident {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, $symbol)
            }
        }
    };
}

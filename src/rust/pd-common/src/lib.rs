// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

pub mod deck;
pub mod ids;
pub mod pipette_traits;
pub mod types;

// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Largest volume tolerance accepted; above this, distinct pipetting volumes compare equal.
const MAX_VOLUME_TOLERANCE_UL: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct SanitizationChange {
    pub field: &'static str,
    pub original: String,
    pub sanitized: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StepGenerationSettings {
    /// Dispose of a used tip right after the step that used it, unless the next step
    /// of the same pipette keeps its tip.
    pub eager_tip_drop: bool,
    pub warn_on_well_overflow: bool,
    /// Volumes closer than this (in µL) are considered equal.
    pub volume_tolerance_ul: f64,
}

impl Default for StepGenerationSettings {
    fn default() -> Self {
        Self {
            eager_tip_drop: true,
            warn_on_well_overflow: true,
            volume_tolerance_ul: 0.001,
        }
    }
}

impl StepGenerationSettings {
    /// Parse settings from JSON. Missing fields take their default value.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn sanitize(&mut self) -> Result<Vec<SanitizationChange>> {
        let mut changes = vec![];
        let tolerance = self.volume_tolerance_ul;
        if tolerance.is_nan() {
            return Err(Error::new("Expected `volumeToleranceUl` to be a number"));
        }
        let sanitized = tolerance.clamp(0.0, MAX_VOLUME_TOLERANCE_UL);
        if sanitized != tolerance {
            changes.push(SanitizationChange {
                field: "volumeToleranceUl",
                original: tolerance.to_string(),
                sanitized: sanitized.to_string(),
                reason: format!("Not within [0, {MAX_VOLUME_TOLERANCE_UL}] µL."),
            });
            self.volume_tolerance_ul = sanitized;
        }
        Ok(changes)
    }
}

// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Labware definitions and the well geometry seen by multi-channel pipettes.

use indexmap::IndexMap;
use pd_common::types::LabwareCategory;
use pd_units::{Microliters, Volume};
use serde::{Deserialize, Serialize};

const ROW_NAMES: &str = "ABCDEFGHIJKLMNOP";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WellDefinition {
    pub total_liquid_volume: Volume<Microliters>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabwareDefinition {
    pub load_name: String,
    pub category: LabwareCategory,
    /// Well names, one inner vector per column, rows top to bottom.
    pub ordering: Vec<Vec<String>>,
    pub wells: IndexMap<String, WellDefinition>,
    /// Tip volume, only present for tip racks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tip_volume: Option<Volume<Microliters>>,
}

impl LabwareDefinition {
    /// Definition of a labware with a rectangular grid of identical wells.
    ///
    /// # Panics
    ///
    /// If `rows` exceeds the 16 rows of a 384 well layout.
    pub fn rectangular(
        load_name: &str,
        category: LabwareCategory,
        rows: usize,
        columns: usize,
        well_volume: Volume<Microliters>,
    ) -> Self {
        assert!(
            rows <= ROW_NAMES.len(),
            "Internal error: labware with {rows} rows"
        );
        let ordering: Vec<Vec<String>> = (1..=columns)
            .map(|column| {
                ROW_NAMES
                    .chars()
                    .take(rows)
                    .map(|row| format!("{row}{column}"))
                    .collect()
            })
            .collect();
        let wells = ordering
            .iter()
            .flatten()
            .map(|name| {
                (
                    name.clone(),
                    WellDefinition {
                        total_liquid_volume: well_volume,
                    },
                )
            })
            .collect();
        let tip_volume = (category == LabwareCategory::TipRack).then_some(well_volume);
        Self {
            load_name: load_name.to_string(),
            category,
            ordering,
            wells,
            tip_volume,
        }
    }

    pub fn is_tiprack(&self) -> bool {
        self.category == LabwareCategory::TipRack
    }

    /// All wells in column-major order.
    pub fn wells_in_order(&self) -> impl Iterator<Item = &String> {
        self.ordering.iter().flatten()
    }

    pub fn well_capacity(&self, well: &str) -> Option<Volume<Microliters>> {
        self.wells.get(well).map(|w| w.total_liquid_volume)
    }

    /// Wells reached by the channels of a pipette whose first channel is in `well`.
    ///
    /// The result has one entry per channel; several channels may share a well.
    /// Returns `None` if the pipette can not be placed with its first channel in `well`.
    pub fn wells_for_channels(&self, well: &str, channels: u8) -> Option<Vec<String>> {
        if !self.wells.contains_key(well) {
            return None;
        }
        match channels {
            1 => Some(vec![well.to_string()]),
            8 => {
                let column = self
                    .ordering
                    .iter()
                    .find(|column| column.iter().any(|w| w == well))?;
                let row = column.iter().position(|w| w == well)?;
                match column.len() {
                    1 => Some(vec![well.to_string(); 8]),
                    8 if row == 0 => Some(column.clone()),
                    16 if row < 2 => Some(column.iter().skip(row).step_by(2).cloned().collect()),
                    _ => None,
                }
            }
            96 => {
                if self.wells.len() == 1 {
                    return Some(vec![well.to_string(); 96]);
                }
                let is_96_layout =
                    self.ordering.len() == 12 && self.ordering.iter().all(|c| c.len() == 8);
                (is_96_layout && self.ordering[0][0] == well)
                    .then(|| self.wells_in_order().cloned().collect())
            }
            _ => None,
        }
    }
}

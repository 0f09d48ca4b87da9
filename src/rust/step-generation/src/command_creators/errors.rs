// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use pd_common::ids::{AdditionalEquipmentId, LabwareId, ModuleId, PipetteId};
use pd_common::types::ModuleKind;
use pd_units::{Microliters, Volume};
use serde::Serialize;

/// Reasons a step can not be carried out from the current robot state.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum CommandCreatorError {
    #[error("Attempted to interact with contents of a well with no tip on pipette '{pipette_id}'")]
    NoTipOnPipette { pipette_id: PipetteId },
    #[error("Not enough tips to complete the step with pipette '{pipette_id}'")]
    InsufficientTips { pipette_id: PipetteId },
    #[error("Tip {well_name} of '{labware_id}' was already used")]
    TipNotAvailable {
        labware_id: LabwareId,
        well_name: String,
    },
    #[error("Pipette '{pipette_id}' already has a tip attached and no drop tip location is set")]
    TipAlreadyAttached { pipette_id: PipetteId },
    #[error("Labware '{labware_id}' is not a tip rack")]
    NotATiprack { labware_id: LabwareId },
    #[error(
        "Well {well_name} of '{labware_id}' holds {available} but {requested} are needed"
    )]
    InsufficientLiquid {
        labware_id: LabwareId,
        well_name: String,
        requested: Volume<Microliters>,
        available: Volume<Microliters>,
    },
    #[error("Volume {volume} exceeds the maximum volume {max_volume} of pipette '{pipette_id}'")]
    PipetteVolumeExceeded {
        pipette_id: PipetteId,
        volume: Volume<Microliters>,
        max_volume: Volume<Microliters>,
    },
    #[error("Volume {volume} exceeds the tip capacity {capacity} of pipette '{pipette_id}'")]
    TipVolumeExceeded {
        pipette_id: PipetteId,
        volume: Volume<Microliters>,
        capacity: Volume<Microliters>,
    },
    #[error("A {channels} channel pipette can not access well {well_name} of '{labware_id}'")]
    InvalidWellForChannels {
        labware_id: LabwareId,
        well_name: String,
        channels: u8,
    },
    #[error("Transfer needs matching well counts, got {sources} sources and {destinations} destinations")]
    MismatchedWellCounts { sources: usize, destinations: usize },
    #[error("Heater-shaker '{module_id}' is shaking")]
    HeaterShakerIsShaking { module_id: ModuleId },
    #[error("Heater-shaker '{module_id}' can not shake with its labware latch open")]
    HeaterShakerLatchOpen { module_id: ModuleId },
    #[error("Lid of thermocycler '{module_id}' is closed")]
    ThermocyclerLidClosed { module_id: ModuleId },
    #[error("Module '{module_id}' is a {actual:?}, expected a {expected:?}")]
    ModuleKindMismatch {
        module_id: ModuleId,
        expected: ModuleKind,
        actual: ModuleKind,
    },
    #[error("Trash '{equipment_id}' has no usable deck location")]
    InvalidTrashLocation { equipment_id: AdditionalEquipmentId },
}

/// Conditions that do not stop a step but are reported alongside it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum CommandCreatorWarning {
    BelowPipetteMinimumVolume {
        pipette_id: PipetteId,
        volume: Volume<Microliters>,
        min_volume: Volume<Microliters>,
    },
    WellOverflow {
        labware_id: LabwareId,
        well_name: String,
        volume: Volume<Microliters>,
        capacity: Volume<Microliters>,
    },
    DispenseExceedsTipContents {
        pipette_id: PipetteId,
        volume: Volume<Microliters>,
        available: Volume<Microliters>,
    },
}

impl fmt::Display for CommandCreatorWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandCreatorWarning::BelowPipetteMinimumVolume {
                pipette_id,
                volume,
                min_volume,
            } => write!(
                f,
                "Volume {volume} is below the minimum volume {min_volume} of pipette '{pipette_id}'"
            ),
            CommandCreatorWarning::WellOverflow {
                labware_id,
                well_name,
                volume,
                capacity,
            } => write!(
                f,
                "Well {well_name} of '{labware_id}' would hold {volume}, more than its capacity {capacity}"
            ),
            CommandCreatorWarning::DispenseExceedsTipContents {
                pipette_id,
                volume,
                available,
            } => write!(
                f,
                "Dispensing {volume} with pipette '{pipette_id}' which only holds {available}"
            ),
        }
    }
}

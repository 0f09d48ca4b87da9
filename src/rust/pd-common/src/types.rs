// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PipetteMount {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModuleKind {
    TemperatureModuleType,
    MagneticModuleType,
    HeaterShakerModuleType,
    ThermocyclerModuleType,
}

/// Deck equipment that is not labware or a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AdditionalEquipmentKind {
    WasteChute,
    TrashBin,
    FixedTrash,
    StagingArea,
    Gripper,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LabwareCategory {
    TipRack,
    WellPlate,
    Reservoir,
    TubeRack,
    AluminumBlock,
    Adapter,
    Trash,
    Other,
}

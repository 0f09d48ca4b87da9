// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Simulated state of the robot between commands.

mod liquid;
mod tips;
mod update;

use indexmap::IndexMap;
use pd_common::ids::{LabwareId, LiquidId, ModuleId, PipetteId};
use pd_common::types::ModuleKind;
use pd_units::{Celsius, Length, Microliters, Millimeters, Temperature, Volume, microliters};
use serde::{Deserialize, Serialize};

use crate::invariant_context::InvariantContext;

pub use liquid::LiquidContents;
pub use tips::next_tip;
pub use update::{apply_command, apply_commands};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachedTip {
    pub tiprack_id: LabwareId,
    pub well_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipetteState {
    pub tip: Option<AttachedTip>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LabwareLocation {
    Slot(String),
    Module(ModuleId),
    Labware(LabwareId),
    OffDeck,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ModuleState {
    TemperatureModule {
        target: Option<Temperature<Celsius>>,
    },
    MagneticModule {
        engaged_height: Option<Length<Millimeters>>,
    },
    HeaterShaker {
        latch_open: bool,
        target_temperature: Option<Temperature<Celsius>>,
        target_speed: Option<u32>,
    },
    Thermocycler {
        lid_open: bool,
        block_target: Option<Temperature<Celsius>>,
        lid_target: Option<Temperature<Celsius>>,
    },
}

impl ModuleState {
    /// State of a freshly loaded module.
    pub fn idle(kind: ModuleKind) -> Self {
        match kind {
            ModuleKind::TemperatureModuleType => ModuleState::TemperatureModule { target: None },
            ModuleKind::MagneticModuleType => ModuleState::MagneticModule {
                engaged_height: None,
            },
            ModuleKind::HeaterShakerModuleType => ModuleState::HeaterShaker {
                latch_open: false,
                target_temperature: None,
                target_speed: None,
            },
            ModuleKind::ThermocyclerModuleType => ModuleState::Thermocycler {
                lid_open: true,
                block_target: None,
                lid_target: None,
            },
        }
    }

    pub fn kind(&self) -> ModuleKind {
        match self {
            ModuleState::TemperatureModule { .. } => ModuleKind::TemperatureModuleType,
            ModuleState::MagneticModule { .. } => ModuleKind::MagneticModuleType,
            ModuleState::HeaterShaker { .. } => ModuleKind::HeaterShakerModuleType,
            ModuleState::Thermocycler { .. } => ModuleKind::ThermocyclerModuleType,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidState {
    /// Liquid per labware and well.
    pub labware: IndexMap<LabwareId, IndexMap<String, LiquidContents>>,
    /// Liquid per pipette, one entry per channel.
    pub pipettes: IndexMap<PipetteId, Vec<LiquidContents>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RobotState {
    pub pipettes: IndexMap<PipetteId, PipetteState>,
    /// Tip presence per tip rack and well.
    pub tipracks: IndexMap<LabwareId, IndexMap<String, bool>>,
    pub labware: IndexMap<LabwareId, LabwareLocation>,
    pub modules: IndexMap<ModuleId, ModuleState>,
    pub liquid: LiquidState,
}

impl RobotState {
    /// Starting state for `ctx`: all tip racks full, no tips attached, modules idle and
    /// no liquid anywhere.
    pub fn initial(ctx: &InvariantContext) -> Self {
        let pipettes = ctx
            .pipette_entities
            .keys()
            .map(|id| (id.clone(), PipetteState::default()))
            .collect();
        let tipracks = ctx
            .labware_entities
            .values()
            .filter(|labware| labware.definition.is_tiprack())
            .map(|labware| {
                let wells = labware
                    .definition
                    .wells_in_order()
                    .map(|well| (well.clone(), true))
                    .collect();
                (labware.id.clone(), wells)
            })
            .collect();
        let modules = ctx
            .module_entities
            .values()
            .map(|module| (module.id.clone(), ModuleState::idle(module.kind)))
            .collect();
        Self {
            pipettes,
            tipracks,
            labware: IndexMap::new(),
            modules,
            liquid: LiquidState::default(),
        }
    }

    pub fn with_labware_location(mut self, labware: &str, location: LabwareLocation) -> Self {
        self.labware.insert(labware.into(), location);
        self
    }

    pub fn with_well_liquid(
        mut self,
        labware: &str,
        well: &str,
        liquid: &str,
        volume: Volume<Microliters>,
    ) -> Self {
        self.liquid
            .labware
            .entry(labware.into())
            .or_default()
            .entry(well.to_string())
            .or_default()
            .add(liquid.into(), volume);
        self
    }

    pub fn attached_tip(&self, pipette: &PipetteId) -> Option<&AttachedTip> {
        self.pipettes.get(pipette).and_then(|p| p.tip.as_ref())
    }

    pub fn tip_attached(&self, pipette: &PipetteId) -> bool {
        self.attached_tip(pipette).is_some()
    }

    pub fn has_tip(&self, tiprack: &LabwareId, well: &str) -> bool {
        self.tipracks
            .get(tiprack)
            .and_then(|wells| wells.get(well))
            .copied()
            .unwrap_or(false)
    }

    pub fn well_contents(&self, labware: &LabwareId, well: &str) -> Option<&LiquidContents> {
        self.liquid.labware.get(labware)?.get(well)
    }

    pub fn well_volume(&self, labware: &LabwareId, well: &str) -> Volume<Microliters> {
        self.well_contents(labware, well)
            .map_or(microliters(0.0), LiquidContents::total)
    }

    pub fn tip_contents(&self, pipette: &PipetteId) -> &[LiquidContents] {
        self.liquid
            .pipettes
            .get(pipette)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Liquid held by the first channel of the pipette.
    pub fn tip_volume(&self, pipette: &PipetteId) -> Volume<Microliters> {
        self.tip_contents(pipette)
            .first()
            .map_or(microliters(0.0), LiquidContents::total)
    }

    pub fn total_liquid(&self, liquid: &LiquidId) -> Volume<Microliters> {
        let in_wells = self
            .liquid
            .labware
            .values()
            .flat_map(|wells| wells.values())
            .map(|contents| contents.volume_of(liquid));
        let in_tips = self
            .liquid
            .pipettes
            .values()
            .flatten()
            .map(|contents| contents.volume_of(liquid));
        in_wells.chain(in_tips).sum()
    }

    /// The module the labware sits on, directly or through adapters.
    pub fn module_under_labware(&self, labware: &LabwareId) -> Option<&ModuleId> {
        let mut current = labware;
        // Bounded by the number of labware so that a cyclic stack can not loop forever.
        for _ in 0..=self.labware.len() {
            match self.labware.get(current)? {
                LabwareLocation::Module(module) => return Some(module),
                LabwareLocation::Labware(below) => current = below,
                LabwareLocation::Slot(_) | LabwareLocation::OffDeck => return None,
            }
        }
        None
    }
}

// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use indexmap::IndexMap;
use pd_common::ids::{AdditionalEquipmentId, LabwareId, ModuleId, PipetteId};
use pd_common::pipette_traits::{PipetteName, PipetteTraits};
use pd_common::types::{AdditionalEquipmentKind, ModuleKind, PipetteMount};
use pd_units::{Microliters, Volume};
use serde::{Deserialize, Serialize};

use crate::labware::LabwareDefinition;
use crate::settings::StepGenerationSettings;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipetteEntity {
    pub id: PipetteId,
    pub name: PipetteName,
    pub mount: PipetteMount,
    /// Tip racks assigned to the pipette, in the order tips are taken from them.
    pub tiprack_labware_ids: Vec<LabwareId>,
}

impl PipetteEntity {
    pub fn traits(&self) -> &'static PipetteTraits {
        self.name.traits()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabwareEntity {
    pub id: LabwareId,
    pub definition: LabwareDefinition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleEntity {
    pub id: ModuleId,
    pub kind: ModuleKind,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalEquipmentEntity {
    pub id: AdditionalEquipmentId,
    pub kind: AdditionalEquipmentKind,
    /// Deck cutout the equipment is loaded into, if it occupies one.
    #[serde(default)]
    pub location: Option<String>,
}

/// Equipment and settings of a protocol run.
///
/// Created once before the timeline is generated and never changed during a run.
/// Lookups by id expect the id to be known; the steps handed to the generator are
/// validated against the same context upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvariantContext {
    pub pipette_entities: IndexMap<PipetteId, PipetteEntity>,
    pub labware_entities: IndexMap<LabwareId, LabwareEntity>,
    #[serde(default)]
    pub module_entities: IndexMap<ModuleId, ModuleEntity>,
    #[serde(default)]
    pub additional_equipment_entities: IndexMap<AdditionalEquipmentId, AdditionalEquipmentEntity>,
    #[serde(default)]
    pub settings: StepGenerationSettings,
}

impl InvariantContext {
    pub fn pipette(&self, id: &PipetteId) -> &PipetteEntity {
        self.pipette_entities
            .get(id)
            .unwrap_or_else(|| panic!("Internal error: Unknown pipette '{id}'"))
    }

    pub fn labware(&self, id: &LabwareId) -> &LabwareEntity {
        self.labware_entities
            .get(id)
            .unwrap_or_else(|| panic!("Internal error: Unknown labware '{id}'"))
    }

    pub fn module(&self, id: &ModuleId) -> &ModuleEntity {
        self.module_entities
            .get(id)
            .unwrap_or_else(|| panic!("Internal error: Unknown module '{id}'"))
    }

    pub fn additional_equipment(&self, id: &AdditionalEquipmentId) -> &AdditionalEquipmentEntity {
        self.additional_equipment_entities
            .get(id)
            .unwrap_or_else(|| panic!("Internal error: Unknown additional equipment '{id}'"))
    }

    pub fn pipette_traits(&self, id: &PipetteId) -> &'static PipetteTraits {
        self.pipette(id).traits()
    }

    /// Usable volume of a tip from `tiprack` on pipette `id`.
    pub fn tip_capacity_for(&self, id: &PipetteId, tiprack: &LabwareId) -> Volume<Microliters> {
        let max_volume = self.pipette_traits(id).max_volume;
        match self.labware(tiprack).definition.tip_volume {
            Some(tip_volume) => tip_volume.min(max_volume),
            None => max_volume,
        }
    }

    /// Usable volume of any tip the pipette may pick up.
    ///
    /// The smallest capacity over all assigned tip racks, so that a volume sized
    /// against it fits whichever rack the next tip comes from.
    pub fn tip_capacity(&self, id: &PipetteId) -> Volume<Microliters> {
        self.pipette(id)
            .tiprack_labware_ids
            .iter()
            .map(|tiprack| self.tip_capacity_for(id, tiprack))
            .min()
            .unwrap_or(self.pipette_traits(id).max_volume)
    }
}

pub struct InvariantContextBuilder {
    inner: InvariantContext,
}

impl InvariantContextBuilder {
    pub fn new() -> Self {
        Self {
            inner: InvariantContext::default(),
        }
    }

    pub fn pipette(
        mut self,
        id: &str,
        name: PipetteName,
        mount: PipetteMount,
        tipracks: &[&str],
    ) -> Self {
        let id = PipetteId::from(id);
        self.inner.pipette_entities.insert(
            id.clone(),
            PipetteEntity {
                id,
                name,
                mount,
                tiprack_labware_ids: tipracks.iter().map(|&t| t.into()).collect(),
            },
        );
        self
    }

    pub fn labware(mut self, id: &str, definition: LabwareDefinition) -> Self {
        let id = LabwareId::from(id);
        self.inner
            .labware_entities
            .insert(id.clone(), LabwareEntity { id, definition });
        self
    }

    pub fn module(mut self, id: &str, kind: ModuleKind, model: &str) -> Self {
        let id = ModuleId::from(id);
        self.inner.module_entities.insert(
            id.clone(),
            ModuleEntity {
                id,
                kind,
                model: model.to_string(),
            },
        );
        self
    }

    pub fn additional_equipment(
        mut self,
        id: &str,
        kind: AdditionalEquipmentKind,
        location: Option<&str>,
    ) -> Self {
        let id = AdditionalEquipmentId::from(id);
        self.inner.additional_equipment_entities.insert(
            id.clone(),
            AdditionalEquipmentEntity {
                id,
                kind,
                location: location.map(str::to_string),
            },
        );
        self
    }

    pub fn settings(mut self, settings: StepGenerationSettings) -> Self {
        self.inner.settings = settings;
        self
    }

    pub fn build(self) -> InvariantContext {
        self.inner
    }
}

impl Default for InvariantContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

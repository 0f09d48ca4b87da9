// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Resolved arguments of the user-authored steps.
//!
//! Arguments arrive here already resolved and validated against the form the user
//! filled in; every id refers to an entity of the [`InvariantContext`].
//!
//! [`InvariantContext`]: crate::invariant_context::InvariantContext

use pd_common::ids::{AdditionalEquipmentId, LabwareId, ModuleId, PipetteId};
use pd_common::pipette_traits::PipetteTraits;
use pd_units::{
    Celsius, Duration, FlowRate, Length, Microliters, MicrolitersPerSecond, Millimeters, Seconds,
    Temperature, Volume,
};
use serde::{Deserialize, Serialize};

use crate::command::{Offset, WellLocation};

pub const DEFAULT_ASPIRATE_OFFSET_FROM_BOTTOM_MM: f64 = 1.0;
pub const DEFAULT_DISPENSE_OFFSET_FROM_BOTTOM_MM: f64 = 0.5;
pub const TOUCH_TIP_OFFSET_FROM_TOP_MM: f64 = -1.0;
pub const BLOWOUT_OFFSET_FROM_TOP_MM: f64 = 0.0;

/// When a step takes a fresh tip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeTipPolicy {
    /// Before every aspirate.
    #[default]
    Always,
    /// Once at the start of the step.
    Once,
    /// Keep using the attached tip.
    Never,
    /// Whenever the source well changes.
    PerSource,
    /// Whenever the destination well changes.
    PerDest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlowoutLocation {
    SourceWell,
    DestWell,
    Equipment(AdditionalEquipmentId),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MixParams {
    pub volume: Volume<Microliters>,
    pub times: u32,
}

/// Flow rates and well offsets of a liquid handling step. Unset values use defaults.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PipettingOptions {
    pub aspirate_flow_rate: Option<FlowRate<MicrolitersPerSecond>>,
    pub dispense_flow_rate: Option<FlowRate<MicrolitersPerSecond>>,
    pub blowout_flow_rate: Option<FlowRate<MicrolitersPerSecond>>,
    pub aspirate_offset_from_bottom_mm: Option<f64>,
    pub dispense_offset_from_bottom_mm: Option<f64>,
}

/// [`PipettingOptions`] with the defaults of a pipette filled in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedPipetting {
    pub aspirate_flow_rate: FlowRate<MicrolitersPerSecond>,
    pub dispense_flow_rate: FlowRate<MicrolitersPerSecond>,
    pub blowout_flow_rate: FlowRate<MicrolitersPerSecond>,
    pub aspirate_location: WellLocation,
    pub dispense_location: WellLocation,
}

impl PipettingOptions {
    pub fn resolve(&self, traits: &PipetteTraits) -> ResolvedPipetting {
        ResolvedPipetting {
            aspirate_flow_rate: self
                .aspirate_flow_rate
                .unwrap_or(traits.default_aspirate_flow_rate),
            dispense_flow_rate: self
                .dispense_flow_rate
                .unwrap_or(traits.default_dispense_flow_rate),
            blowout_flow_rate: self
                .blowout_flow_rate
                .unwrap_or(traits.default_blowout_flow_rate),
            aspirate_location: WellLocation::from_bottom(
                self.aspirate_offset_from_bottom_mm
                    .unwrap_or(DEFAULT_ASPIRATE_OFFSET_FROM_BOTTOM_MM),
            ),
            dispense_location: WellLocation::from_bottom(
                self.dispense_offset_from_bottom_mm
                    .unwrap_or(DEFAULT_DISPENSE_OFFSET_FROM_BOTTOM_MM),
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferArgs {
    pub pipette_id: PipetteId,
    pub source_labware_id: LabwareId,
    pub source_wells: Vec<String>,
    pub dest_labware_id: LabwareId,
    pub dest_wells: Vec<String>,
    /// Volume moved per source/destination pair.
    pub volume: Volume<Microliters>,
    pub change_tip: ChangeTipPolicy,
    pub drop_tip_location: AdditionalEquipmentId,
    #[serde(default)]
    pub pre_wet_tip: bool,
    #[serde(default)]
    pub mix_before_aspirate: Option<MixParams>,
    #[serde(default)]
    pub touch_tip_after_aspirate: bool,
    #[serde(default)]
    pub mix_in_destination: Option<MixParams>,
    #[serde(default)]
    pub touch_tip_after_dispense: bool,
    #[serde(default)]
    pub blowout_location: Option<BlowoutLocation>,
    #[serde(flatten)]
    pub pipetting: PipettingOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidateArgs {
    pub pipette_id: PipetteId,
    pub source_labware_id: LabwareId,
    pub source_wells: Vec<String>,
    pub dest_labware_id: LabwareId,
    pub dest_well: String,
    /// Volume taken from each source well.
    pub volume: Volume<Microliters>,
    pub change_tip: ChangeTipPolicy,
    pub drop_tip_location: AdditionalEquipmentId,
    #[serde(default)]
    pub mix_first_aspirate: Option<MixParams>,
    #[serde(default)]
    pub touch_tip_after_aspirate: bool,
    #[serde(default)]
    pub mix_in_destination: Option<MixParams>,
    #[serde(default)]
    pub touch_tip_after_dispense: bool,
    #[serde(default)]
    pub blowout_location: Option<BlowoutLocation>,
    #[serde(flatten)]
    pub pipetting: PipettingOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MixArgs {
    pub pipette_id: PipetteId,
    pub labware_id: LabwareId,
    pub wells: Vec<String>,
    pub volume: Volume<Microliters>,
    pub times: u32,
    pub change_tip: ChangeTipPolicy,
    pub drop_tip_location: AdditionalEquipmentId,
    #[serde(default)]
    pub touch_tip: bool,
    /// Source and destination both refer to the mixed well.
    #[serde(default)]
    pub blowout_location: Option<BlowoutLocation>,
    #[serde(flatten)]
    pub pipetting: PipettingOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickUpTipArgs {
    pub pipette_id: PipetteId,
    /// Explicit tip to pick up; the next available tip otherwise.
    #[serde(default)]
    pub tiprack_id: Option<LabwareId>,
    #[serde(default)]
    pub well_name: Option<String>,
    #[serde(default)]
    pub change_tip: ChangeTipPolicy,
    #[serde(default)]
    pub drop_tip_location: Option<AdditionalEquipmentId>,
}

/// Arguments of a single aspirate or dispense step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AspirateDispenseArgs {
    pub pipette_id: PipetteId,
    pub labware_id: LabwareId,
    pub well_name: String,
    pub volume: Volume<Microliters>,
    #[serde(default)]
    pub flow_rate: Option<FlowRate<MicrolitersPerSecond>>,
    #[serde(default)]
    pub offset_from_bottom_mm: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlowoutArgs {
    pub pipette_id: PipetteId,
    pub labware_id: LabwareId,
    pub well_name: String,
    #[serde(default)]
    pub flow_rate: Option<FlowRate<MicrolitersPerSecond>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropTipArgs {
    pub pipette_id: PipetteId,
    pub drop_tip_location: AdditionalEquipmentId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveToAddressableAreaArgs {
    pub pipette_id: PipetteId,
    pub addressable_area_name: String,
    #[serde(default)]
    pub offset: Offset,
}

/// Wait for a duration, or until the user resumes the protocol if no duration is set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DelayArgs {
    pub seconds: Option<Duration<Seconds>>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureModuleArgs {
    pub module_id: ModuleId,
    /// Target temperature; `None` deactivates the module.
    #[serde(default)]
    pub target: Option<Temperature<Celsius>>,
    #[serde(default)]
    pub wait_for_temperature: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MagneticModuleArgs {
    pub module_id: ModuleId,
    /// Engage height; `None` disengages the magnets.
    #[serde(default)]
    pub engage_height: Option<Length<Millimeters>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaterShakerArgs {
    pub module_id: ModuleId,
    pub latch_open: bool,
    #[serde(default)]
    pub target_temperature: Option<Temperature<Celsius>>,
    #[serde(default)]
    pub target_speed: Option<u32>,
}

/// Arguments of a step, keyed by the command creator that compiles it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "commandCreatorFnName", rename_all = "camelCase")]
pub enum StepArgs {
    Transfer(TransferArgs),
    Consolidate(ConsolidateArgs),
    Mix(MixArgs),
    PickUpTip(PickUpTipArgs),
    Aspirate(AspirateDispenseArgs),
    Dispense(AspirateDispenseArgs),
    Blowout(BlowoutArgs),
    DropTip(DropTipArgs),
    MoveToAddressableArea(MoveToAddressableAreaArgs),
    Delay(DelayArgs),
    TemperatureModule(TemperatureModuleArgs),
    MagneticModule(MagneticModuleArgs),
    HeaterShaker(HeaterShakerArgs),
    /// A step kind without a command creator.
    #[serde(other)]
    Unsupported,
}

impl StepArgs {
    pub fn pipette_id(&self) -> Option<&PipetteId> {
        match self {
            StepArgs::Transfer(args) => Some(&args.pipette_id),
            StepArgs::Consolidate(args) => Some(&args.pipette_id),
            StepArgs::Mix(args) => Some(&args.pipette_id),
            StepArgs::PickUpTip(args) => Some(&args.pipette_id),
            StepArgs::Aspirate(args) | StepArgs::Dispense(args) => Some(&args.pipette_id),
            StepArgs::Blowout(args) => Some(&args.pipette_id),
            StepArgs::DropTip(args) => Some(&args.pipette_id),
            StepArgs::MoveToAddressableArea(args) => Some(&args.pipette_id),
            StepArgs::Delay(_)
            | StepArgs::TemperatureModule(_)
            | StepArgs::MagneticModule(_)
            | StepArgs::HeaterShaker(_)
            | StepArgs::Unsupported => None,
        }
    }

    /// Tip policy the step applies when it starts.
    ///
    /// Single pipetting steps work with whatever tip is attached and count as
    /// [`ChangeTipPolicy::Never`]; a drop tip step gets rid of the tip and counts as
    /// [`ChangeTipPolicy::Always`]. `None` for steps without a pipette.
    pub fn change_tip(&self) -> Option<ChangeTipPolicy> {
        match self {
            StepArgs::Transfer(args) => Some(args.change_tip),
            StepArgs::Consolidate(args) => Some(args.change_tip),
            StepArgs::Mix(args) => Some(args.change_tip),
            StepArgs::PickUpTip(args) => Some(args.change_tip),
            StepArgs::Aspirate(_)
            | StepArgs::Dispense(_)
            | StepArgs::Blowout(_)
            | StepArgs::MoveToAddressableArea(_) => Some(ChangeTipPolicy::Never),
            StepArgs::DropTip(_) => Some(ChangeTipPolicy::Always),
            StepArgs::Delay(_)
            | StepArgs::TemperatureModule(_)
            | StepArgs::MagneticModule(_)
            | StepArgs::HeaterShaker(_)
            | StepArgs::Unsupported => None,
        }
    }

    /// Where the step disposes of used tips.
    pub fn drop_tip_location(&self) -> Option<&AdditionalEquipmentId> {
        match self {
            StepArgs::Transfer(args) => Some(&args.drop_tip_location),
            StepArgs::Consolidate(args) => Some(&args.drop_tip_location),
            StepArgs::Mix(args) => Some(&args.drop_tip_location),
            StepArgs::PickUpTip(args) => args.drop_tip_location.as_ref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pd_units::microliters;

    #[test]
    fn test_deserialize_transfer() {
        let json = r#"{
            "commandCreatorFnName": "transfer",
            "pipetteId": "p300",
            "sourceLabwareId": "reservoir",
            "sourceWells": ["A1"],
            "destLabwareId": "plate",
            "destWells": ["A1", "B1"],
            "volume": 50,
            "changeTip": "perSource",
            "dropTipLocation": "wasteChute",
            "blowoutLocation": {"equipment": "trashBin"},
            "aspirateFlowRate": 20
        }"#;
        let args: StepArgs = serde_json::from_str(json).unwrap();
        let StepArgs::Transfer(transfer) = &args else {
            panic!("Expected a transfer, got {args:?}");
        };
        assert_eq!(transfer.volume, microliters(50.0));
        assert_eq!(transfer.change_tip, ChangeTipPolicy::PerSource);
        assert_eq!(
            transfer.blowout_location,
            Some(BlowoutLocation::Equipment("trashBin".into()))
        );
        assert_eq!(
            transfer.pipetting.aspirate_flow_rate.map(|f| f.value()),
            Some(20.0)
        );
        assert_eq!(transfer.pipetting.dispense_flow_rate, None);
        assert!(!transfer.pre_wet_tip);
        assert_eq!(args.drop_tip_location(), Some(&"wasteChute".into()));
    }

    #[test]
    fn test_unknown_creator_is_unsupported() {
        let json = r#"{"commandCreatorFnName": "thermocyclerProfile", "moduleId": "tc"}"#;
        let args: StepArgs = serde_json::from_str(json).unwrap();
        assert_eq!(args, StepArgs::Unsupported);
        assert_eq!(args.pipette_id(), None);
        assert_eq!(args.change_tip(), None);
    }

    #[test]
    fn test_change_tip_of_atomic_steps() {
        let aspirate = StepArgs::Aspirate(AspirateDispenseArgs {
            pipette_id: "p300".into(),
            labware_id: "plate".into(),
            well_name: "A1".to_string(),
            volume: microliters(10.0),
            flow_rate: None,
            offset_from_bottom_mm: None,
        });
        assert_eq!(aspirate.change_tip(), Some(ChangeTipPolicy::Never));
        assert_eq!(aspirate.drop_tip_location(), None);

        let drop_tip = StepArgs::DropTip(DropTipArgs {
            pipette_id: "p300".into(),
            drop_tip_location: "trashBin".into(),
        });
        assert_eq!(drop_tip.change_tip(), Some(ChangeTipPolicy::Always));
    }

    #[test]
    fn test_pipetting_defaults() {
        let traits = pd_common::pipette_traits::PipetteName::P300SingleGen2.traits();
        let resolved = PipettingOptions::default().resolve(traits);
        assert_eq!(resolved.aspirate_flow_rate, traits.default_aspirate_flow_rate);
        assert_eq!(
            resolved.aspirate_location,
            WellLocation::from_bottom(DEFAULT_ASPIRATE_OFFSET_FROM_BOTTOM_MM)
        );
    }
}

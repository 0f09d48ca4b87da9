// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Shared fixtures for the unit tests.
//!
//! The fixture deck carries a single channel and an eight channel pipette, each with
//! its own tip rack, a 96 well plate and a 12 well reservoir on the deck, a plate on
//! the heater-shaker, one module of each kind and three disposal locations.

use pd_common::pipette_traits::PipetteName;
use pd_common::ids::LabwareId;
use pd_common::types::{AdditionalEquipmentKind, LabwareCategory, ModuleKind, PipetteMount};
use pd_units::microliters;

use crate::invariant_context::{InvariantContext, InvariantContextBuilder};
use crate::labware::LabwareDefinition;
use crate::robot_state::{LabwareLocation, RobotState};
use crate::settings::StepGenerationSettings;
use crate::step_args::{ChangeTipPolicy, PipettingOptions, TransferArgs};

#[derive(Default)]
pub(crate) struct TestContext {
    pub settings: StepGenerationSettings,
}

pub(crate) fn fixture_context(test_context: TestContext) -> InvariantContext {
    InvariantContextBuilder::new()
        .pipette(
            "p300",
            PipetteName::P300SingleGen2,
            PipetteMount::Left,
            &["tiprack"],
        )
        .pipette(
            "p300multi",
            PipetteName::P300MultiGen2,
            PipetteMount::Right,
            &["tiprack_multi"],
        )
        .labware(
            "tiprack",
            LabwareDefinition::rectangular(
                "opentrons_96_tiprack_300ul",
                LabwareCategory::TipRack,
                8,
                12,
                microliters(300.0),
            ),
        )
        .labware(
            "tiprack_multi",
            LabwareDefinition::rectangular(
                "opentrons_96_tiprack_300ul",
                LabwareCategory::TipRack,
                8,
                12,
                microliters(300.0),
            ),
        )
        .labware(
            "plate",
            LabwareDefinition::rectangular(
                "corning_96_wellplate_360ul_flat",
                LabwareCategory::WellPlate,
                8,
                12,
                microliters(360.0),
            ),
        )
        .labware(
            "reservoir",
            LabwareDefinition::rectangular(
                "nest_12_reservoir_15ml",
                LabwareCategory::Reservoir,
                1,
                12,
                microliters(15000.0),
            ),
        )
        .labware(
            "hs_plate",
            LabwareDefinition::rectangular(
                "nest_96_wellplate_200ul_flat",
                LabwareCategory::WellPlate,
                8,
                12,
                microliters(200.0),
            ),
        )
        .module(
            "temp",
            ModuleKind::TemperatureModuleType,
            "temperatureModuleV2",
        )
        .module("mag", ModuleKind::MagneticModuleType, "magneticModuleV2")
        .module("hs", ModuleKind::HeaterShakerModuleType, "heaterShakerModuleV1")
        .module("tc", ModuleKind::ThermocyclerModuleType, "thermocyclerModuleV2")
        .additional_equipment(
            "wasteChute",
            AdditionalEquipmentKind::WasteChute,
            Some("cutoutD3"),
        )
        .additional_equipment(
            "trashBin",
            AdditionalEquipmentKind::TrashBin,
            Some("cutoutA3"),
        )
        .additional_equipment(
            "fixedTrash",
            AdditionalEquipmentKind::FixedTrash,
            Some("cutout12"),
        )
        .settings(test_context.settings)
        .build()
}

/// Initial state of [`fixture_context`] with labware placed and liquid loaded.
///
/// Reservoir wells A1 and A2 hold 10 mL of water and dye, plate column 1 and
/// `hs_plate` well A1 hold 100 µL of sample each. Everything else is empty.
pub(crate) fn fixture_robot_state(ctx: &InvariantContext) -> RobotState {
    let mut state = RobotState::initial(ctx)
        .with_labware_location("tiprack", LabwareLocation::Slot("C1".to_string()))
        .with_labware_location("tiprack_multi", LabwareLocation::Slot("C2".to_string()))
        .with_labware_location("plate", LabwareLocation::Slot("D1".to_string()))
        .with_labware_location("reservoir", LabwareLocation::Slot("D2".to_string()))
        .with_labware_location("hs_plate", LabwareLocation::Module("hs".into()))
        .with_well_liquid("reservoir", "A1", "water", microliters(10000.0))
        .with_well_liquid("reservoir", "A2", "dye", microliters(10000.0))
        .with_well_liquid("hs_plate", "A1", "sample", microliters(100.0));
    for row in "ABCDEFGH".chars() {
        state = state.with_well_liquid("plate", &format!("{row}1"), "sample", microliters(100.0));
    }
    state
}

/// Deck where `p300` takes tips from two racks of different size.
///
/// Rack `big` holds a single 300 µL tip that is already used, rack `small` is full of
/// 20 µL tips. Reservoir A1 holds water and plate column 1 holds sample as in
/// [`fixture_robot_state`].
pub(crate) fn mixed_tiprack_fixture() -> (InvariantContext, RobotState) {
    let ctx = InvariantContextBuilder::new()
        .pipette(
            "p300",
            PipetteName::P300SingleGen2,
            PipetteMount::Left,
            &["big", "small"],
        )
        .labware(
            "big",
            LabwareDefinition::rectangular(
                "opentrons_1_tiprack_300ul",
                LabwareCategory::TipRack,
                1,
                1,
                microliters(300.0),
            ),
        )
        .labware(
            "small",
            LabwareDefinition::rectangular(
                "opentrons_96_tiprack_20ul",
                LabwareCategory::TipRack,
                8,
                12,
                microliters(20.0),
            ),
        )
        .labware(
            "plate",
            LabwareDefinition::rectangular(
                "corning_96_wellplate_360ul_flat",
                LabwareCategory::WellPlate,
                8,
                12,
                microliters(360.0),
            ),
        )
        .labware(
            "reservoir",
            LabwareDefinition::rectangular(
                "nest_12_reservoir_15ml",
                LabwareCategory::Reservoir,
                1,
                12,
                microliters(15000.0),
            ),
        )
        .additional_equipment(
            "wasteChute",
            AdditionalEquipmentKind::WasteChute,
            Some("cutoutD3"),
        )
        .additional_equipment(
            "trashBin",
            AdditionalEquipmentKind::TrashBin,
            Some("cutoutA3"),
        )
        .build();
    let mut state = RobotState::initial(&ctx)
        .with_labware_location("big", LabwareLocation::Slot("C1".to_string()))
        .with_labware_location("small", LabwareLocation::Slot("C2".to_string()))
        .with_labware_location("plate", LabwareLocation::Slot("D1".to_string()))
        .with_labware_location("reservoir", LabwareLocation::Slot("D2".to_string()))
        .with_well_liquid("reservoir", "A1", "water", microliters(10000.0));
    for row in "ABCDEFGH".chars() {
        state = state.with_well_liquid("plate", &format!("{row}1"), "sample", microliters(100.0));
    }
    state
        .tipracks
        .get_mut::<LabwareId>(&"big".into())
        .unwrap()
        .insert("A1".to_string(), false);
    (ctx, state)
}

/// Transfer with `p300` from the reservoir into the plate, dropping tips into the
/// waste chute and with all options off.
pub(crate) fn transfer_args(
    sources: &[&str],
    dests: &[&str],
    volume: f64,
    change_tip: ChangeTipPolicy,
) -> TransferArgs {
    TransferArgs {
        pipette_id: "p300".into(),
        source_labware_id: "reservoir".into(),
        source_wells: sources.iter().map(|s| s.to_string()).collect(),
        dest_labware_id: "plate".into(),
        dest_wells: dests.iter().map(|d| d.to_string()).collect(),
        volume: microliters(volume),
        change_tip,
        drop_tip_location: "wasteChute".into(),
        pre_wet_tip: false,
        mix_before_aspirate: None,
        touch_tip_after_aspirate: false,
        mix_in_destination: None,
        touch_tip_after_dispense: false,
        blowout_location: None,
        pipetting: PipettingOptions::default(),
    }
}

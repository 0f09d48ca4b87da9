// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use indexmap::IndexMap;
use pd_common::ids::StepId;
use pd_common::pipette_traits::PipetteName;
use pd_common::types::{AdditionalEquipmentKind, LabwareCategory, PipetteMount};
use pd_units::microliters;
use std::hint::black_box;
use step_generation::labware::LabwareDefinition;
use step_generation::robot_state::LabwareLocation;
use step_generation::step_args::{PipettingOptions, TransferArgs};
use step_generation::{
    ChangeTipPolicy, InvariantContext, InvariantContextBuilder, RobotState, StepArgs,
    StepArgsAndErrors, generate_robot_state_timeline,
};

fn context() -> InvariantContext {
    InvariantContextBuilder::new()
        .pipette(
            "p300",
            PipetteName::P300SingleGen2,
            PipetteMount::Left,
            &["tiprack1", "tiprack2"],
        )
        .labware(
            "tiprack1",
            LabwareDefinition::rectangular(
                "opentrons_96_tiprack_300ul",
                LabwareCategory::TipRack,
                8,
                12,
                microliters(300.0),
            ),
        )
        .labware(
            "tiprack2",
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
        .additional_equipment(
            "wasteChute",
            AdditionalEquipmentKind::WasteChute,
            Some("cutoutD3"),
        )
        .build()
}

/// `n` transfers from the reservoir into consecutive plate wells, alternating between
/// reusing the tip and taking a fresh one.
fn steps(n: usize) -> IndexMap<StepId, StepArgsAndErrors> {
    let wells: Vec<String> = (1..=12)
        .flat_map(|column| "ABCDEFGH".chars().map(move |row| format!("{row}{column}")))
        .collect();
    (0..n)
        .map(|i| {
            let change_tip = if i % 2 == 0 {
                ChangeTipPolicy::Always
            } else {
                ChangeTipPolicy::Never
            };
            let args = StepArgs::Transfer(TransferArgs {
                pipette_id: "p300".into(),
                source_labware_id: "reservoir".into(),
                source_wells: vec!["A1".to_string()],
                dest_labware_id: "plate".into(),
                dest_wells: vec![wells[i % wells.len()].clone()],
                volume: microliters(50.0),
                change_tip,
                drop_tip_location: "wasteChute".into(),
                pre_wet_tip: false,
                mix_before_aspirate: None,
                touch_tip_after_aspirate: false,
                mix_in_destination: None,
                touch_tip_after_dispense: false,
                blowout_location: None,
                pipetting: PipettingOptions::default(),
            });
            let step = StepArgsAndErrors {
                step_args: Some(args),
                errors: false,
            };
            (StepId::from(format!("step{i}").as_str()), step)
        })
        .collect()
}

fn bench_timeline(c: &mut Criterion) {
    let sizes = [16, 64, 128];
    let ctx = context();
    let initial = RobotState::initial(&ctx)
        .with_labware_location("plate", LabwareLocation::Slot("D1".to_string()))
        .with_labware_location("reservoir", LabwareLocation::Slot("D2".to_string()))
        .with_well_liquid("reservoir", "A1", "water", microliters(15000.0));

    let mut group = c.benchmark_group("timeline");

    for &size in &sizes {
        let steps = steps(size);
        let order: Vec<StepId> = steps.keys().cloned().collect();
        group.bench_with_input(BenchmarkId::new("transfers", size), &size, |b, &_size| {
            b.iter(|| {
                black_box(generate_robot_state_timeline(
                    &steps, &order, &ctx, &initial,
                ))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_timeline);
criterion_main!(benches);

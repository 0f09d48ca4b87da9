// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use pd_units::{Microliters, Volume};

use super::{
    BlowOutAtLocationParams, ReplaceTipParams, aspirate_creator, blow_out_at_location,
    dispense_creator, mix_creators, replace_tip, touch_tip_creator,
};
use crate::command_creators::atomic::exceeds;
use crate::command_creators::{
    CommandCreatorError, CommandCreatorResult, CurriedCommandCreator, curry, reduce_to_result,
};
use crate::invariant_context::InvariantContext;
use crate::robot_state::RobotState;
use crate::step_args::{ChangeTipPolicy, ConsolidateArgs};

/// Number of `volume` aspirates that fit into one tip.
fn aspirates_per_trip(
    volume: Volume<Microliters>,
    capacity: Volume<Microliters>,
    tolerance: f64,
) -> usize {
    if volume.value() <= 0.0 {
        return usize::MAX;
    }
    ((capacity.value() + tolerance) / volume.value())
        .floor()
        .max(1.0) as usize
}

/// Collect `args.volume` from every source well and dispense it into one destination.
///
/// Sources are visited in order; the tip aspirates from as many sources as it can hold
/// before each dispense.
pub fn consolidate(
    args: &ConsolidateArgs,
    ctx: &InvariantContext,
    state: &RobotState,
) -> CommandCreatorResult {
    let pipette_id = &args.pipette_id;
    let tolerance = ctx.settings.volume_tolerance_ul;
    let capacity = ctx.tip_capacity(pipette_id);
    if exceeds(args.volume, capacity, tolerance) {
        return Err(CommandCreatorError::TipVolumeExceeded {
            pipette_id: pipette_id.clone(),
            volume: args.volume,
            capacity,
        }
        .into());
    }
    let pipetting = args.pipetting.resolve(ctx.pipette_traits(pipette_id));
    let per_trip = aspirates_per_trip(args.volume, capacity, tolerance);
    let source_labware = &args.source_labware_id;
    let dest_labware = &args.dest_labware_id;
    let dest = args.dest_well.as_str();

    let mut creators: Vec<CurriedCommandCreator<'_>> = vec![];
    for (trip, sources) in args.source_wells.chunks(per_trip).enumerate() {
        let new_tip = match args.change_tip {
            ChangeTipPolicy::Always | ChangeTipPolicy::PerSource => true,
            ChangeTipPolicy::Once | ChangeTipPolicy::PerDest => trip == 0,
            ChangeTipPolicy::Never => false,
        };
        if new_tip {
            creators.push(curry(
                replace_tip,
                ReplaceTipParams {
                    pipette_id: pipette_id.clone(),
                    drop_tip_location: Some(args.drop_tip_location.clone()),
                },
            ));
        }
        for (index, source) in sources.iter().enumerate() {
            if index == 0
                && let Some(mix) = &args.mix_first_aspirate
            {
                creators.extend(mix_creators(
                    pipette_id,
                    source_labware,
                    source,
                    mix,
                    &pipetting,
                ));
            }
            creators.push(aspirate_creator(
                pipette_id,
                source_labware,
                source,
                args.volume,
                &pipetting,
            ));
            if args.touch_tip_after_aspirate {
                creators.push(touch_tip_creator(pipette_id, source_labware, source));
            }
        }
        creators.push(dispense_creator(
            pipette_id,
            dest_labware,
            dest,
            args.volume * sources.len() as f64,
            &pipetting,
        ));
        if let Some(mix) = &args.mix_in_destination {
            creators.extend(mix_creators(
                pipette_id,
                dest_labware,
                dest,
                mix,
                &pipetting,
            ));
        }
        if args.touch_tip_after_dispense {
            creators.push(touch_tip_creator(pipette_id, dest_labware, dest));
        }
        if let (Some(location), Some(last_source)) = (&args.blowout_location, sources.last()) {
            creators.push(curry(
                blow_out_at_location,
                BlowOutAtLocationParams {
                    pipette_id: pipette_id.clone(),
                    target: location.target((source_labware, last_source), (dest_labware, dest)),
                    flow_rate: pipetting.blowout_flow_rate,
                },
            ));
        }
    }
    reduce_to_result(&creators, ctx, state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use crate::robot_state::apply_commands;
    use crate::step_args::PipettingOptions;
    use crate::test_utils::{
        TestContext, fixture_context, fixture_robot_state, mixed_tiprack_fixture,
    };
    use pd_units::microliters;

    fn consolidate_args(
        sources: &[&str],
        volume: f64,
        change_tip: ChangeTipPolicy,
    ) -> ConsolidateArgs {
        ConsolidateArgs {
            pipette_id: "p300".into(),
            source_labware_id: "plate".into(),
            source_wells: sources.iter().map(|s| s.to_string()).collect(),
            dest_labware_id: "reservoir".into(),
            dest_well: "A12".to_string(),
            volume: microliters(volume),
            change_tip,
            drop_tip_location: "trashBin".into(),
            mix_first_aspirate: None,
            touch_tip_after_aspirate: false,
            mix_in_destination: None,
            touch_tip_after_dispense: false,
            blowout_location: None,
            pipetting: PipettingOptions::default(),
        }
    }

    #[test]
    fn test_consolidate_in_trips() {
        let ctx = fixture_context(TestContext::default());
        let state = fixture_robot_state(&ctx);
        // 100 µL per source, three sources fit into a 300 µL tip.
        let args = consolidate_args(&["A1", "B1", "C1", "D1"], 100.0, ChangeTipPolicy::Once);
        let output = consolidate(&args, &ctx, &state).unwrap();
        let types: Vec<_> = output.commands.iter().map(Command::command_type).collect();
        assert_eq!(
            types,
            vec![
                "pickUpTip",
                "aspirate",
                "aspirate",
                "aspirate",
                "dispense",
                "aspirate",
                "dispense",
            ]
        );
        let dispensed: Vec<_> = output
            .commands
            .iter()
            .filter_map(|c| match c {
                Command::Dispense(params) => Some(params.volume),
                _ => None,
            })
            .collect();
        assert_eq!(dispensed, vec![microliters(300.0), microliters(100.0)]);

        let final_state = apply_commands(&output.commands, &ctx, &state);
        assert_eq!(
            final_state.well_volume(&"reservoir".into(), "A12"),
            microliters(400.0)
        );
    }

    #[test]
    fn test_consolidate_always_changes_tip_per_trip() {
        let ctx = fixture_context(TestContext::default());
        let state = fixture_robot_state(&ctx);
        let args = consolidate_args(&["A1", "B1", "C1", "D1"], 100.0, ChangeTipPolicy::Always);
        let output = consolidate(&args, &ctx, &state).unwrap();
        let types: Vec<_> = output.commands.iter().map(Command::command_type).collect();
        assert_eq!(types.iter().filter(|t| **t == "pickUpTip").count(), 2);
        assert!(types.contains(&"moveToAddressableAreaForDropTip"));
    }

    #[test]
    fn test_consolidate_volume_larger_than_tip() {
        let ctx = fixture_context(TestContext::default());
        let state = fixture_robot_state(&ctx);
        let args = consolidate_args(&["A1"], 350.0, ChangeTipPolicy::Once);
        assert!(matches!(
            consolidate(&args, &ctx, &state).unwrap_err().errors[..],
            [CommandCreatorError::TipVolumeExceeded { .. }]
        ));
    }

    #[test]
    fn test_consolidate_sized_for_smallest_tiprack() {
        let (ctx, state) = mixed_tiprack_fixture();
        let args = consolidate_args(&["A1", "B1", "C1"], 10.0, ChangeTipPolicy::Once);
        let output = consolidate(&args, &ctx, &state).unwrap();
        // Two sources fit into a 20 µL tip per trip.
        let dispenses = output
            .commands
            .iter()
            .filter(|c| c.command_type() == "dispense")
            .count();
        assert_eq!(dispenses, 2);

        let args = consolidate_args(&["A1"], 30.0, ChangeTipPolicy::Once);
        assert!(matches!(
            consolidate(&args, &ctx, &state).unwrap_err().errors[..],
            [CommandCreatorError::TipVolumeExceeded { .. }]
        ));
    }
}

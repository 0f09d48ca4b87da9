// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use pd_units::{Microliters, Volume};

use super::{
    BlowOutAtLocationParams, ReplaceTipParams, aspirate_creator, blow_out_at_location,
    dispense_creator, mix_creators, needs_new_tip, replace_tip, touch_tip_creator,
};
use crate::command_creators::{
    CommandCreatorError, CommandCreatorResult, CurriedCommandCreator, curry, reduce_to_result,
};
use crate::invariant_context::InvariantContext;
use crate::robot_state::RobotState;
use crate::step_args::TransferArgs;

/// Source/destination pairs: one to one, one source to many destinations or many
/// sources into one destination.
fn pair_wells<'a>(
    sources: &'a [String],
    dests: &'a [String],
) -> Option<Vec<(&'a str, &'a str)>> {
    let pairs = if sources.len() == dests.len() {
        sources
            .iter()
            .zip(dests)
            .map(|(s, d)| (s.as_str(), d.as_str()))
            .collect()
    } else if let [source] = sources {
        dests.iter().map(|d| (source.as_str(), d.as_str())).collect()
    } else if let [dest] = dests {
        sources.iter().map(|s| (s.as_str(), dest.as_str())).collect()
    } else {
        return None;
    };
    Some(pairs)
}

/// Split `volume` into the fewest equal parts that fit into a tip of `capacity`.
pub(crate) fn split_volume(
    volume: Volume<Microliters>,
    capacity: Volume<Microliters>,
    tolerance: f64,
) -> (usize, Volume<Microliters>) {
    if capacity.value() <= 0.0 {
        return (1, volume);
    }
    let parts = ((volume.value() - tolerance) / capacity.value()).ceil().max(1.0) as usize;
    (parts, volume / parts as f64)
}

/// Move `args.volume` from every source well to its destination well.
pub fn transfer(
    args: &TransferArgs,
    ctx: &InvariantContext,
    state: &RobotState,
) -> CommandCreatorResult {
    let pairs = pair_wells(&args.source_wells, &args.dest_wells).ok_or_else(|| {
        CommandCreatorError::MismatchedWellCounts {
            sources: args.source_wells.len(),
            destinations: args.dest_wells.len(),
        }
    })?;
    let pipette_id = &args.pipette_id;
    let pipetting = args.pipetting.resolve(ctx.pipette_traits(pipette_id));
    let (chunks, chunk_volume) = split_volume(
        args.volume,
        ctx.tip_capacity(pipette_id),
        ctx.settings.volume_tolerance_ul,
    );
    let source_labware = &args.source_labware_id;
    let dest_labware = &args.dest_labware_id;

    let mut creators: Vec<CurriedCommandCreator<'_>> = vec![];
    let mut previous = None;
    for &(source, dest) in &pairs {
        for _ in 0..chunks {
            let new_tip = needs_new_tip(args.change_tip, previous, source, dest);
            previous = Some((source, dest));
            if new_tip {
                creators.push(curry(
                    replace_tip,
                    ReplaceTipParams {
                        pipette_id: pipette_id.clone(),
                        drop_tip_location: Some(args.drop_tip_location.clone()),
                    },
                ));
                if args.pre_wet_tip {
                    creators.push(aspirate_creator(
                        pipette_id,
                        source_labware,
                        source,
                        chunk_volume,
                        &pipetting,
                    ));
                    creators.push(dispense_creator(
                        pipette_id,
                        source_labware,
                        source,
                        chunk_volume,
                        &pipetting,
                    ));
                }
            }
            if let Some(mix) = &args.mix_before_aspirate {
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
                chunk_volume,
                &pipetting,
            ));
            if args.touch_tip_after_aspirate {
                creators.push(touch_tip_creator(pipette_id, source_labware, source));
            }
            creators.push(dispense_creator(
                pipette_id,
                dest_labware,
                dest,
                chunk_volume,
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
            if let Some(location) = &args.blowout_location {
                creators.push(curry(
                    blow_out_at_location,
                    BlowOutAtLocationParams {
                        pipette_id: pipette_id.clone(),
                        target: location.target((source_labware, source), (dest_labware, dest)),
                        flow_rate: pipetting.blowout_flow_rate,
                    },
                ));
            }
        }
    }
    reduce_to_result(&creators, ctx, state)
}

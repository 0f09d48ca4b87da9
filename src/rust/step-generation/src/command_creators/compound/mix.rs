// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use super::{
    BlowOutAtLocationParams, ReplaceTipParams, blow_out_at_location, mix_creators, needs_new_tip,
    replace_tip, touch_tip_creator,
};
use crate::command_creators::{
    CommandCreatorResult, CurriedCommandCreator, curry, reduce_to_result,
};
use crate::invariant_context::InvariantContext;
use crate::robot_state::RobotState;
use crate::step_args::{MixArgs, MixParams};

/// Mix every well `args.times` times, optionally touching the tip and blowing out after
/// each well.
pub fn mix(args: &MixArgs, ctx: &InvariantContext, state: &RobotState) -> CommandCreatorResult {
    let pipette_id = &args.pipette_id;
    let labware = &args.labware_id;
    let pipetting = args.pipetting.resolve(ctx.pipette_traits(pipette_id));
    let cycle = MixParams {
        volume: args.volume,
        times: args.times,
    };

    let mut creators: Vec<CurriedCommandCreator<'_>> = vec![];
    let mut previous = None;
    for well in &args.wells {
        let well = well.as_str();
        // Each well is both the source and the destination of its mix.
        if needs_new_tip(args.change_tip, previous, well, well) {
            creators.push(curry(
                replace_tip,
                ReplaceTipParams {
                    pipette_id: pipette_id.clone(),
                    drop_tip_location: Some(args.drop_tip_location.clone()),
                },
            ));
        }
        previous = Some((well, well));
        creators.extend(mix_creators(pipette_id, labware, well, &cycle, &pipetting));
        if let Some(location) = &args.blowout_location {
            creators.push(curry(
                blow_out_at_location,
                BlowOutAtLocationParams {
                    pipette_id: pipette_id.clone(),
                    target: location.target((labware, well), (labware, well)),
                    flow_rate: pipetting.blowout_flow_rate,
                },
            ));
        }
        if args.touch_tip {
            creators.push(touch_tip_creator(pipette_id, labware, well));
        }
    }
    reduce_to_result(&creators, ctx, state)
}

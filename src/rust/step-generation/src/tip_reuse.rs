// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Eager tip drop.
//!
//! A step leaves its last tip attached. Unless the next step of the same pipette is
//! going to keep working with that tip, the tip is disposed of right after the step
//! instead of when the next step replaces it.

use crate::command_creators::compound::{DisposeTipParams, dispose_tip};
use crate::command_creators::{CommandCreatorResult, CommandsAndWarnings, CurriedCommandCreator};
use crate::invariant_context::InvariantContext;
use crate::robot_state::RobotState;
use crate::step_args::{ChangeTipPolicy, StepArgs};

/// Disposal to run after `step`, given the steps that follow it and the robot state
/// the step left behind.
pub fn eager_tip_disposal(
    step: &StepArgs,
    following: &[&StepArgs],
    robot_state: &RobotState,
) -> Option<DisposeTipParams> {
    let pipette_id = step.pipette_id()?;
    let drop_tip_location = step.drop_tip_location()?;
    if !robot_state.tip_attached(pipette_id) {
        return None;
    }
    let next_change_tip = following
        .iter()
        .find(|next| next.pipette_id() == Some(pipette_id))
        .and_then(|next| next.change_tip());
    if next_change_tip == Some(ChangeTipPolicy::Never) {
        return None;
    }
    Some(DisposeTipParams {
        pipette_id: pipette_id.clone(),
        drop_tip_location: drop_tip_location.clone(),
    })
}

/// Creator that runs after the commands of `step` and disposes of the tip when
/// [`eager_tip_disposal`] asks for it.
///
/// Does nothing when eager tip drop is turned off in the settings.
pub fn eager_drop_creator<'a>(
    step: &'a StepArgs,
    following: &'a [&'a StepArgs],
) -> CurriedCommandCreator<'a> {
    Box::new(
        move |ctx: &InvariantContext, state: &RobotState| -> CommandCreatorResult {
            if !ctx.settings.eager_tip_drop {
                return Ok(CommandsAndWarnings::default());
            }
            match eager_tip_disposal(step, following, state) {
                Some(disposal) => dispose_tip(&disposal, ctx, state),
                None => Ok(CommandsAndWarnings::default()),
            }
        },
    )
}

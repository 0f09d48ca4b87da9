// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Robot state timeline.
//!
//! The authored steps are simulated in order, one frame per step. Only the continuous
//! prefix of steps that resolve to a command creator is simulated; the first step
//! that does not resolve ends the timeline.
//!
//! A frame whose step fails keeps the commands emitted before the failure for
//! display, but its robot state is the state the step started from.

use indexmap::IndexMap;
use pd_common::ids::StepId;
use serde::Serialize;

use crate::command::Command;
use crate::command_creators::{
    CommandCreatorError, CommandCreatorWarning, CurriedCommandCreator, reduce_command_creators,
};
use crate::error::{Error, Result};
use crate::invariant_context::InvariantContext;
use crate::robot_state::RobotState;
use crate::step_args::StepArgs;
use crate::step_args_resolver::{StepArgsAndErrors, command_creator_for};
use crate::tip_reuse::eager_drop_creator;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineFrame {
    pub step_id: StepId,
    pub commands: Vec<Command>,
    /// State after the step, or the state before it if the step failed.
    pub robot_state: RobotState,
    pub warnings: Vec<CommandCreatorWarning>,
    pub errors: Vec<CommandCreatorError>,
}

impl TimelineFrame {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub frames: Vec<TimelineFrame>,
    /// Number of steps in the authored order, simulated or not.
    pub authored_steps: usize,
}

impl Timeline {
    /// Robot state after the last simulated step.
    pub fn final_robot_state(&self) -> Option<&RobotState> {
        self.frames.last().map(|frame| &frame.robot_state)
    }

    pub fn has_errors(&self) -> bool {
        self.frames.iter().any(TimelineFrame::has_errors)
    }

    /// Whether every authored step made it into the timeline.
    pub fn covers_all_steps(&self) -> bool {
        self.frames.len() == self.authored_steps
    }

    pub fn is_exportable(&self) -> bool {
        self.covers_all_steps() && !self.has_errors()
    }

    /// The commands of all frames, in order, as they would run on the robot.
    pub fn export_commands(&self) -> Result<Vec<Command>> {
        if let Some(frame) = self.frames.iter().find(|frame| frame.has_errors()) {
            return Err(Error::new(format!(
                "Cannot export protocol: step '{}' has errors",
                frame.step_id
            )));
        }
        if !self.covers_all_steps() {
            return Err(Error::new(format!(
                "Cannot export protocol: only {} of {} steps could be simulated",
                self.frames.len(),
                self.authored_steps
            )));
        }
        Ok(self
            .frames
            .iter()
            .flat_map(|frame| frame.commands.iter().cloned())
            .collect())
    }
}

struct ResolvedStep<'a> {
    step_id: &'a StepId,
    args: &'a StepArgs,
    creator: CurriedCommandCreator<'a>,
}

/// Longest prefix of `ordered_step_ids` whose steps resolve to a command creator.
fn continuous_steps<'a>(
    steps: &'a IndexMap<StepId, StepArgsAndErrors>,
    ordered_step_ids: &'a [StepId],
) -> Vec<ResolvedStep<'a>> {
    let mut resolved = Vec::with_capacity(ordered_step_ids.len());
    for step_id in ordered_step_ids {
        let Some(step) = steps.get(step_id) else {
            pd_log::warn!("Step '{}' is not defined, stopping the timeline", step_id);
            break;
        };
        if step.errors {
            pd_log::info!("Step '{}' has form errors, stopping the timeline", step_id);
            break;
        }
        let Some(args) = step.step_args.as_ref() else {
            pd_log::info!("Step '{}' is unresolved, stopping the timeline", step_id);
            break;
        };
        let Some(creator) = command_creator_for(args) else {
            pd_log::info!("Step '{}' is not supported, stopping the timeline", step_id);
            break;
        };
        resolved.push(ResolvedStep {
            step_id,
            args,
            creator,
        });
    }
    resolved
}

/// Simulate the steps in `ordered_step_ids` starting from `initial_robot_state`.
///
/// Each frame starts from the robot state of the previous frame. A step that fails
/// still gets a frame with its errors; the steps after it continue from the state
/// before the failed step.
pub fn generate_robot_state_timeline(
    steps: &IndexMap<StepId, StepArgsAndErrors>,
    ordered_step_ids: &[StepId],
    ctx: &InvariantContext,
    initial_robot_state: &RobotState,
) -> Timeline {
    let resolved = continuous_steps(steps, ordered_step_ids);
    pd_log::info!(
        "Simulating {} of {} steps",
        resolved.len(),
        ordered_step_ids.len()
    );
    // Lookahead for tip reuse never leaves the continuous prefix.
    let all_args: Vec<&StepArgs> = resolved.iter().map(|step| step.args).collect();

    let mut frames: Vec<TimelineFrame> = Vec::with_capacity(resolved.len());
    for (index, step) in resolved.into_iter().enumerate() {
        let previous = frames
            .last()
            .map_or(initial_robot_state, |frame| &frame.robot_state);
        let creators = [
            step.creator,
            eager_drop_creator(step.args, &all_args[index + 1..]),
        ];
        let frame = match reduce_command_creators(&creators, ctx, previous) {
            Ok(reduced) => {
                pd_log::diagnostic!(
                    "Step '{}': {} commands, {} warnings",
                    step.step_id,
                    reduced.commands.len(),
                    reduced.warnings.len()
                );
                TimelineFrame {
                    step_id: step.step_id.clone(),
                    commands: reduced.commands,
                    robot_state: reduced.robot_state,
                    warnings: reduced.warnings,
                    errors: vec![],
                }
            }
            Err(failure) => {
                let messages: Vec<String> =
                    failure.errors.iter().map(ToString::to_string).collect();
                pd_log::warn!(
                    "Step '{}' failed: {}",
                    step.step_id,
                    messages.join("; ")
                );
                TimelineFrame {
                    step_id: step.step_id.clone(),
                    commands: failure.commands,
                    robot_state: previous.clone(),
                    warnings: failure.warnings,
                    errors: failure.errors,
                }
            }
        };
        frames.push(frame);
    }
    Timeline {
        frames,
        authored_steps: ordered_step_ids.len(),
    }
}

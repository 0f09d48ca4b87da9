// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Command creators turn arguments into robot commands.
//!
//! A command creator is a pure function of its arguments, the [`InvariantContext`] and
//! the current [`RobotState`]. It either returns the commands to run together with any
//! warnings, or the errors that prevent it from running. Compound creators are built by
//! running simpler creators in sequence with [`reduce_command_creators`].

pub mod atomic;
pub mod compound;
mod errors;
pub mod modules;
pub mod step_creators;

pub use errors::{CommandCreatorError, CommandCreatorWarning};

use crate::command::Command;
use crate::invariant_context::InvariantContext;
use crate::robot_state::{RobotState, apply_command};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandsAndWarnings {
    pub commands: Vec<Command>,
    pub warnings: Vec<CommandCreatorWarning>,
}

impl CommandsAndWarnings {
    pub fn new(commands: Vec<Command>) -> Self {
        Self {
            commands,
            warnings: vec![],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandCreatorFailure {
    pub errors: Vec<CommandCreatorError>,
    pub warnings: Vec<CommandCreatorWarning>,
    /// Commands produced before the failing creator. Never applied to the robot state.
    pub commands: Vec<Command>,
}

impl CommandCreatorFailure {
    pub fn new(errors: Vec<CommandCreatorError>, warnings: Vec<CommandCreatorWarning>) -> Self {
        Self {
            errors,
            warnings,
            commands: vec![],
        }
    }
}

impl From<CommandCreatorError> for CommandCreatorFailure {
    fn from(error: CommandCreatorError) -> Self {
        Self::new(vec![error], vec![])
    }
}

pub type CommandCreatorResult = Result<CommandsAndWarnings, CommandCreatorFailure>;

/// A command creator with its arguments bound, waiting for the context and state.
pub type CurriedCommandCreator<'a> =
    Box<dyn Fn(&InvariantContext, &RobotState) -> CommandCreatorResult + 'a>;

pub type CommandCreator<A> = fn(&A, &InvariantContext, &RobotState) -> CommandCreatorResult;

/// Bind `args` to `creator`.
pub fn curry<'a, A: 'a>(creator: CommandCreator<A>, args: A) -> CurriedCommandCreator<'a> {
    Box::new(move |ctx: &InvariantContext, state: &RobotState| {
        creator(&args, ctx, state)
    })
}

/// Bind borrowed `args` to `creator`.
pub fn bind<'a, A>(creator: CommandCreator<A>, args: &'a A) -> CurriedCommandCreator<'a> {
    Box::new(move |ctx: &InvariantContext, state: &RobotState| creator(args, ctx, state))
}

/// Commands of a successful creator sequence and the robot state they lead to.
#[derive(Debug, Clone, PartialEq)]
pub struct ReducedCommands {
    pub commands: Vec<Command>,
    pub warnings: Vec<CommandCreatorWarning>,
    pub robot_state: RobotState,
}

impl From<ReducedCommands> for CommandsAndWarnings {
    fn from(value: ReducedCommands) -> Self {
        Self {
            commands: value.commands,
            warnings: value.warnings,
        }
    }
}

/// Run `creators` in order, each against the state left behind by the previous ones.
///
/// Stops at the first failing creator. The failure carries the commands of the
/// creators before it and all warnings collected so far.
pub fn reduce_command_creators(
    creators: &[CurriedCommandCreator<'_>],
    ctx: &InvariantContext,
    state: &RobotState,
) -> Result<ReducedCommands, CommandCreatorFailure> {
    let mut robot_state = state.clone();
    let mut commands = vec![];
    let mut warnings = vec![];
    for creator in creators {
        match creator(ctx, &robot_state) {
            Ok(output) => {
                for command in &output.commands {
                    apply_command(command, ctx, &mut robot_state);
                }
                commands.extend(output.commands);
                warnings.extend(output.warnings);
            }
            Err(failure) => {
                warnings.extend(failure.warnings);
                commands.extend(failure.commands);
                return Err(CommandCreatorFailure {
                    errors: failure.errors,
                    warnings,
                    commands,
                });
            }
        }
    }
    Ok(ReducedCommands {
        commands,
        warnings,
        robot_state,
    })
}

/// Run `creators` in order as one compound creator.
pub fn reduce_to_result(
    creators: &[CurriedCommandCreator<'_>],
    ctx: &InvariantContext,
    state: &RobotState,
) -> CommandCreatorResult {
    reduce_command_creators(creators, ctx, state).map(CommandsAndWarnings::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{PipetteParams, WaitForResumeParams};
    use crate::test_utils::{TestContext, fixture_context, fixture_robot_state};

    fn wait(_: &(), _: &InvariantContext, _: &RobotState) -> CommandCreatorResult {
        Ok(CommandsAndWarnings::new(vec![Command::WaitForResume(
            WaitForResumeParams { message: None },
        )]))
    }

    fn fail(_: &(), _: &InvariantContext, _: &RobotState) -> CommandCreatorResult {
        Err(CommandCreatorError::InsufficientTips {
            pipette_id: "p300".into(),
        }
        .into())
    }

    #[test]
    fn test_reduce_stops_at_first_failure() {
        let ctx = fixture_context(TestContext::default());
        let state = fixture_robot_state(&ctx);
        let creators = vec![curry(wait, ()), curry(fail, ()), curry(wait, ())];
        let failure = reduce_command_creators(&creators, &ctx, &state).unwrap_err();
        assert_eq!(failure.commands.len(), 1);
        assert_eq!(
            failure.errors,
            vec![CommandCreatorError::InsufficientTips {
                pipette_id: "p300".into()
            }]
        );
    }

    #[test]
    fn test_reduce_threads_state() {
        let ctx = fixture_context(TestContext::default());
        let state = fixture_robot_state(&ctx);
        let creators = vec![
            curry(atomic::pick_up_next_tip, "p300".into()),
            // Sees the tip picked up by the previous creator.
            curry(atomic::drop_tip_in_place, PipetteParams {
                pipette_id: "p300".into(),
            }),
        ];
        let reduced = reduce_command_creators(&creators, &ctx, &state).unwrap();
        let types: Vec<_> = reduced.commands.iter().map(Command::command_type).collect();
        assert_eq!(types, vec!["pickUpTip", "dropTipInPlace"]);
        assert!(!reduced.robot_state.tip_attached(&"p300".into()));
        assert!(!reduced.robot_state.has_tip(&"tiprack".into(), "A1"));
    }
}

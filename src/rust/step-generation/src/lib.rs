// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Step generation for the protocol designer.
//!
//! Compiles the user-authored steps of a protocol into a timeline of atomic robot
//! commands, simulating tip usage, liquid volumes and module states along the way.

pub mod command;
pub mod command_creators;
pub mod error;
pub mod invariant_context;
pub mod labware;
pub mod robot_state;
pub mod settings;
pub mod step_args;
pub mod step_args_resolver;
pub mod timeline;
pub mod tip_reuse;

#[cfg(test)]
mod test_utils;

pub use crate::command::Command;
pub use crate::command_creators::{
    CommandCreatorError, CommandCreatorFailure, CommandCreatorResult, CommandCreatorWarning,
    CommandsAndWarnings, CurriedCommandCreator, reduce_command_creators,
};
pub use crate::invariant_context::{InvariantContext, InvariantContextBuilder};
pub use crate::robot_state::RobotState;
pub use crate::settings::StepGenerationSettings;
pub use crate::step_args::{ChangeTipPolicy, StepArgs};
pub use crate::step_args_resolver::{StepArgsAndErrors, resolve_command_creator};
pub use crate::timeline::{Timeline, TimelineFrame, generate_robot_state_timeline};

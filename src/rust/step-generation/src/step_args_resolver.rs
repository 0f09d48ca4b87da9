// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

use crate::command_creators::{CurriedCommandCreator, bind};
use crate::command_creators::compound::{consolidate, mix, transfer};
use crate::command_creators::modules::heater_shaker;
use crate::command_creators::step_creators::{
    aspirate_step, blowout_step, delay_step, dispense_step, drop_tip_step, magnetic_module_step,
    move_to_addressable_area_step, pick_up_tip_step, temperature_module_step,
};
use crate::step_args::StepArgs;

/// A step as handed over by form validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepArgsAndErrors {
    /// Resolved arguments, `None` if the step form could not be resolved.
    #[serde(default)]
    pub step_args: Option<StepArgs>,
    /// Whether form validation reported errors for the step.
    #[serde(default)]
    pub errors: bool,
}

/// The command creator compiling `step`, with its arguments bound.
///
/// Returns `None` if the step has validation errors, unresolved arguments or a kind
/// without command creator.
pub fn resolve_command_creator(step: &StepArgsAndErrors) -> Option<CurriedCommandCreator<'_>> {
    if step.errors {
        return None;
    }
    command_creator_for(step.step_args.as_ref()?)
}

pub fn command_creator_for(args: &StepArgs) -> Option<CurriedCommandCreator<'_>> {
    let creator = match args {
        StepArgs::Transfer(args) => bind(transfer, args),
        StepArgs::Consolidate(args) => bind(consolidate, args),
        StepArgs::Mix(args) => bind(mix, args),
        StepArgs::PickUpTip(args) => bind(pick_up_tip_step, args),
        StepArgs::Aspirate(args) => bind(aspirate_step, args),
        StepArgs::Dispense(args) => bind(dispense_step, args),
        StepArgs::Blowout(args) => bind(blowout_step, args),
        StepArgs::DropTip(args) => bind(drop_tip_step, args),
        StepArgs::MoveToAddressableArea(args) => bind(move_to_addressable_area_step, args),
        StepArgs::Delay(args) => bind(delay_step, args),
        StepArgs::TemperatureModule(args) => bind(temperature_module_step, args),
        StepArgs::MagneticModule(args) => bind(magnetic_module_step, args),
        StepArgs::HeaterShaker(args) => bind(heater_shaker, args),
        StepArgs::Unsupported => return None,
    };
    Some(creator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step_args::DelayArgs;
    use crate::test_utils::{TestContext, fixture_context, fixture_robot_state};

    fn delay() -> StepArgsAndErrors {
        StepArgsAndErrors {
            step_args: Some(StepArgs::Delay(DelayArgs::default())),
            errors: false,
        }
    }

    #[test]
    fn test_resolve() {
        let ctx = fixture_context(TestContext::default());
        let state = fixture_robot_state(&ctx);
        let step = delay();
        let creator = resolve_command_creator(&step).unwrap();
        assert_eq!(creator(&ctx, &state).unwrap().commands.len(), 1);
    }

    #[test]
    fn test_unresolvable_steps() {
        let with_errors = StepArgsAndErrors {
            errors: true,
            ..delay()
        };
        assert!(resolve_command_creator(&with_errors).is_none());

        let without_args = StepArgsAndErrors {
            step_args: None,
            errors: false,
        };
        assert!(resolve_command_creator(&without_args).is_none());

        let unsupported = StepArgsAndErrors {
            step_args: Some(StepArgs::Unsupported),
            errors: false,
        };
        assert!(resolve_command_creator(&unsupported).is_none());
    }
}

// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Command creators for temperature, magnetic and heater-shaker modules.

use pd_common::ids::ModuleId;
use pd_common::types::ModuleKind;
use pd_units::{Celsius, Temperature};

use super::{
    CommandCreatorError, CommandCreatorFailure, CommandCreatorResult, CommandsAndWarnings,
    CurriedCommandCreator, curry, reduce_to_result,
};
use crate::command::{
    Command, MagnetEngageParams, ModuleParams, ShakeSpeedParams, TemperatureParams,
};
use crate::invariant_context::InvariantContext;
use crate::robot_state::{ModuleState, RobotState};
use crate::step_args::HeaterShakerArgs;

fn check_module_kind(
    module: &ModuleId,
    expected: ModuleKind,
    ctx: &InvariantContext,
) -> Result<(), CommandCreatorFailure> {
    let actual = ctx.module(module).kind;
    if actual == expected {
        Ok(())
    } else {
        Err(CommandCreatorError::ModuleKindMismatch {
            module_id: module.clone(),
            expected,
            actual,
        }
        .into())
    }
}

fn single(command: Command) -> CommandCreatorResult {
    Ok(CommandsAndWarnings::new(vec![command]))
}

pub fn set_temperature(
    params: &TemperatureParams,
    ctx: &InvariantContext,
    _state: &RobotState,
) -> CommandCreatorResult {
    check_module_kind(&params.module_id, ModuleKind::TemperatureModuleType, ctx)?;
    single(Command::TemperatureModuleSetTargetTemperature(params.clone()))
}

pub fn wait_for_temperature(
    params: &TemperatureParams,
    ctx: &InvariantContext,
    _state: &RobotState,
) -> CommandCreatorResult {
    check_module_kind(&params.module_id, ModuleKind::TemperatureModuleType, ctx)?;
    single(Command::TemperatureModuleWaitForTemperature(params.clone()))
}

pub fn deactivate_temperature(
    params: &ModuleParams,
    ctx: &InvariantContext,
    _state: &RobotState,
) -> CommandCreatorResult {
    check_module_kind(&params.module_id, ModuleKind::TemperatureModuleType, ctx)?;
    single(Command::TemperatureModuleDeactivate(params.clone()))
}

pub fn engage_magnet(
    params: &MagnetEngageParams,
    ctx: &InvariantContext,
    _state: &RobotState,
) -> CommandCreatorResult {
    check_module_kind(&params.module_id, ModuleKind::MagneticModuleType, ctx)?;
    single(Command::MagneticModuleEngage(params.clone()))
}

pub fn disengage_magnet(
    params: &ModuleParams,
    ctx: &InvariantContext,
    _state: &RobotState,
) -> CommandCreatorResult {
    check_module_kind(&params.module_id, ModuleKind::MagneticModuleType, ctx)?;
    single(Command::MagneticModuleDisengage(params.clone()))
}

fn is_shaking(module: &ModuleId, state: &RobotState) -> bool {
    matches!(
        state.modules.get(module),
        Some(ModuleState::HeaterShaker {
            target_speed: Some(_),
            ..
        })
    )
}

fn is_latch_open(module: &ModuleId, state: &RobotState) -> bool {
    matches!(
        state.modules.get(module),
        Some(ModuleState::HeaterShaker {
            latch_open: true,
            ..
        })
    )
}

fn set_latch(
    params: &(ModuleId, bool),
    ctx: &InvariantContext,
    state: &RobotState,
) -> CommandCreatorResult {
    let (module_id, open) = params;
    check_module_kind(module_id, ModuleKind::HeaterShakerModuleType, ctx)?;
    let module = ModuleParams {
        module_id: module_id.clone(),
    };
    if !open {
        return single(Command::HeaterShakerCloseLabwareLatch(module));
    }
    if is_shaking(module_id, state) {
        return Err(CommandCreatorError::HeaterShakerIsShaking {
            module_id: module_id.clone(),
        }
        .into());
    }
    single(Command::HeaterShakerOpenLabwareLatch(module))
}

fn set_heater_shaker_temperature(
    params: &(ModuleId, Option<Temperature<Celsius>>),
    ctx: &InvariantContext,
    _state: &RobotState,
) -> CommandCreatorResult {
    let (module_id, target) = params;
    check_module_kind(module_id, ModuleKind::HeaterShakerModuleType, ctx)?;
    match target {
        Some(celsius) => single(Command::HeaterShakerSetTargetTemperature(TemperatureParams {
            module_id: module_id.clone(),
            celsius: *celsius,
        })),
        None => single(Command::HeaterShakerDeactivateHeater(ModuleParams {
            module_id: module_id.clone(),
        })),
    }
}

fn set_shake_speed(
    params: &(ModuleId, Option<u32>),
    ctx: &InvariantContext,
    state: &RobotState,
) -> CommandCreatorResult {
    let (module_id, speed) = params;
    check_module_kind(module_id, ModuleKind::HeaterShakerModuleType, ctx)?;
    match speed {
        Some(rpm) => {
            if is_latch_open(module_id, state) {
                return Err(CommandCreatorError::HeaterShakerLatchOpen {
                    module_id: module_id.clone(),
                }
                .into());
            }
            single(Command::HeaterShakerSetAndWaitForShakeSpeed(ShakeSpeedParams {
                module_id: module_id.clone(),
                rpm: *rpm,
            }))
        }
        None => single(Command::HeaterShakerDeactivateShaker(ModuleParams {
            module_id: module_id.clone(),
        })),
    }
}

/// Bring a heater-shaker to the requested latch, temperature and shaking state.
///
/// Shaking stops before the latch moves and starts only after it is set, so that the
/// latch never opens while shaking.
pub fn heater_shaker(
    args: &HeaterShakerArgs,
    ctx: &InvariantContext,
    state: &RobotState,
) -> CommandCreatorResult {
    let module_id = &args.module_id;
    let mut creators: Vec<CurriedCommandCreator<'_>> = vec![];
    if args.target_speed.is_none() {
        creators.push(curry(set_shake_speed, (module_id.clone(), None)));
    }
    creators.push(curry(set_latch, (module_id.clone(), args.latch_open)));
    creators.push(curry(
        set_heater_shaker_temperature,
        (module_id.clone(), args.target_temperature),
    ));
    if args.target_speed.is_some() {
        creators.push(curry(set_shake_speed, (module_id.clone(), args.target_speed)));
    }
    reduce_to_result(&creators, ctx, state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::robot_state::apply_commands;
    use crate::test_utils::{TestContext, fixture_context, fixture_robot_state};
    use pd_units::{celsius, millimeters};

    fn command_types(result: &CommandCreatorResult) -> Vec<&'static str> {
        result
            .as_ref()
            .map(|output| output.commands.iter().map(Command::command_type).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_module_kind_mismatch() {
        let ctx = fixture_context(TestContext::default());
        let state = fixture_robot_state(&ctx);
        let failure = engage_magnet(
            &MagnetEngageParams {
                module_id: "temp".into(),
                height: millimeters(10.0),
            },
            &ctx,
            &state,
        )
        .unwrap_err();
        assert_eq!(
            failure.errors,
            vec![CommandCreatorError::ModuleKindMismatch {
                module_id: "temp".into(),
                expected: ModuleKind::MagneticModuleType,
                actual: ModuleKind::TemperatureModuleType,
            }]
        );
    }

    #[test]
    fn test_heater_shaker_start_shaking() {
        let ctx = fixture_context(TestContext::default());
        let state = fixture_robot_state(&ctx);
        let args = HeaterShakerArgs {
            module_id: "hs".into(),
            latch_open: false,
            target_temperature: Some(celsius(37.0)),
            target_speed: Some(500),
        };
        let result = heater_shaker(&args, &ctx, &state);
        assert_eq!(
            command_types(&result),
            vec![
                "heaterShaker/closeLabwareLatch",
                "heaterShaker/setTargetTemperature",
                "heaterShaker/setAndWaitForShakeSpeed",
            ]
        );
    }

    #[test]
    fn test_heater_shaker_stop_and_open() {
        let ctx = fixture_context(TestContext::default());
        let state = fixture_robot_state(&ctx);
        let shaking = HeaterShakerArgs {
            module_id: "hs".into(),
            latch_open: false,
            target_temperature: None,
            target_speed: Some(500),
        };
        let output = heater_shaker(&shaking, &ctx, &state).unwrap();
        let state = apply_commands(&output.commands, &ctx, &state);

        let open = HeaterShakerArgs {
            latch_open: true,
            target_speed: None,
            ..shaking
        };
        let result = heater_shaker(&open, &ctx, &state);
        assert_eq!(
            command_types(&result),
            vec![
                "heaterShaker/deactivateShaker",
                "heaterShaker/openLabwareLatch",
                "heaterShaker/deactivateHeater",
            ]
        );
    }

    #[test]
    fn test_shaking_with_open_latch() {
        let ctx = fixture_context(TestContext::default());
        let state = fixture_robot_state(&ctx);
        let args = HeaterShakerArgs {
            module_id: "hs".into(),
            latch_open: true,
            target_temperature: None,
            target_speed: Some(200),
        };
        let failure = heater_shaker(&args, &ctx, &state).unwrap_err();
        assert_eq!(
            failure.errors,
            vec![CommandCreatorError::HeaterShakerLatchOpen {
                module_id: "hs".into()
            }]
        );
        // Latch and heater commands ran before the failing one.
        assert_eq!(failure.commands.len(), 2);
    }
}

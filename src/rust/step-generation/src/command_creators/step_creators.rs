// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Command creators of the single-action step kinds.
//!
//! They fill in defaults from the pipette and delegate to the atomic and module
//! creators.

use super::atomic::{
    aspirate, blowout, dispense, move_to_addressable_area, pick_up_tip, wait_for_duration,
    wait_for_resume,
};
use super::compound::{
    DisposeTipParams, ReplaceTipParams, dispose_tip, drop_tip_if_attached, replace_tip,
};
use super::modules::{
    deactivate_temperature, disengage_magnet, engage_magnet, set_temperature,
    wait_for_temperature,
};
use super::{
    CommandCreatorError, CommandCreatorResult, CommandsAndWarnings, CurriedCommandCreator, curry,
    reduce_to_result,
};
use crate::command::{
    AspDispParams, BlowOutParams, MagnetEngageParams, ModuleParams, MoveToAddressableAreaParams,
    PickUpTipParams, TemperatureParams, WaitForDurationParams, WaitForResumeParams, WellLocation,
};
use crate::invariant_context::InvariantContext;
use crate::robot_state::RobotState;
use crate::step_args::{
    AspirateDispenseArgs, BLOWOUT_OFFSET_FROM_TOP_MM, BlowoutArgs, ChangeTipPolicy,
    DEFAULT_ASPIRATE_OFFSET_FROM_BOTTOM_MM, DEFAULT_DISPENSE_OFFSET_FROM_BOTTOM_MM, DelayArgs,
    DropTipArgs, MagneticModuleArgs, MoveToAddressableAreaArgs, PickUpTipArgs,
    TemperatureModuleArgs,
};

/// Pick up a tip, either the one named in the arguments or the next available one.
///
/// With [`ChangeTipPolicy::Never`] an attached tip is kept.
pub fn pick_up_tip_step(
    args: &PickUpTipArgs,
    ctx: &InvariantContext,
    state: &RobotState,
) -> CommandCreatorResult {
    let pipette_id = &args.pipette_id;
    let tip_attached = state.tip_attached(pipette_id);
    if tip_attached && args.change_tip == ChangeTipPolicy::Never {
        return Ok(CommandsAndWarnings::default());
    }
    let (Some(tiprack), Some(well)) = (&args.tiprack_id, &args.well_name) else {
        return replace_tip(
            &ReplaceTipParams {
                pipette_id: pipette_id.clone(),
                drop_tip_location: args.drop_tip_location.clone(),
            },
            ctx,
            state,
        );
    };
    let mut creators: Vec<CurriedCommandCreator<'_>> = vec![];
    if tip_attached {
        let Some(location) = &args.drop_tip_location else {
            return Err(CommandCreatorError::TipAlreadyAttached {
                pipette_id: pipette_id.clone(),
            }
            .into());
        };
        creators.push(curry(
            dispose_tip,
            DisposeTipParams {
                pipette_id: pipette_id.clone(),
                drop_tip_location: location.clone(),
            },
        ));
    }
    creators.push(curry(
        pick_up_tip,
        PickUpTipParams {
            pipette_id: pipette_id.clone(),
            labware_id: tiprack.clone(),
            well_name: well.clone(),
        },
    ));
    reduce_to_result(&creators, ctx, state)
}

pub fn aspirate_step(
    args: &AspirateDispenseArgs,
    ctx: &InvariantContext,
    state: &RobotState,
) -> CommandCreatorResult {
    let traits = ctx.pipette_traits(&args.pipette_id);
    let params = AspDispParams {
        pipette_id: args.pipette_id.clone(),
        volume: args.volume,
        labware_id: args.labware_id.clone(),
        well_name: args.well_name.clone(),
        well_location: WellLocation::from_bottom(
            args.offset_from_bottom_mm
                .unwrap_or(DEFAULT_ASPIRATE_OFFSET_FROM_BOTTOM_MM),
        ),
        flow_rate: args.flow_rate.unwrap_or(traits.default_aspirate_flow_rate),
    };
    aspirate(&params, ctx, state)
}

pub fn dispense_step(
    args: &AspirateDispenseArgs,
    ctx: &InvariantContext,
    state: &RobotState,
) -> CommandCreatorResult {
    let traits = ctx.pipette_traits(&args.pipette_id);
    let params = AspDispParams {
        pipette_id: args.pipette_id.clone(),
        volume: args.volume,
        labware_id: args.labware_id.clone(),
        well_name: args.well_name.clone(),
        well_location: WellLocation::from_bottom(
            args.offset_from_bottom_mm
                .unwrap_or(DEFAULT_DISPENSE_OFFSET_FROM_BOTTOM_MM),
        ),
        flow_rate: args.flow_rate.unwrap_or(traits.default_dispense_flow_rate),
    };
    dispense(&params, ctx, state)
}

pub fn blowout_step(
    args: &BlowoutArgs,
    ctx: &InvariantContext,
    state: &RobotState,
) -> CommandCreatorResult {
    let traits = ctx.pipette_traits(&args.pipette_id);
    let params = BlowOutParams {
        pipette_id: args.pipette_id.clone(),
        labware_id: args.labware_id.clone(),
        well_name: args.well_name.clone(),
        well_location: WellLocation::from_top(BLOWOUT_OFFSET_FROM_TOP_MM),
        flow_rate: args.flow_rate.unwrap_or(traits.default_blowout_flow_rate),
    };
    blowout(&params, ctx, state)
}

pub fn drop_tip_step(
    args: &DropTipArgs,
    ctx: &InvariantContext,
    state: &RobotState,
) -> CommandCreatorResult {
    drop_tip_if_attached(
        &DisposeTipParams {
            pipette_id: args.pipette_id.clone(),
            drop_tip_location: args.drop_tip_location.clone(),
        },
        ctx,
        state,
    )
}

pub fn move_to_addressable_area_step(
    args: &MoveToAddressableAreaArgs,
    ctx: &InvariantContext,
    state: &RobotState,
) -> CommandCreatorResult {
    let params = MoveToAddressableAreaParams {
        pipette_id: args.pipette_id.clone(),
        addressable_area_name: args.addressable_area_name.clone(),
        offset: args.offset,
    };
    move_to_addressable_area(&params, ctx, state)
}

/// Wait for the given duration, or until resumed when no duration is set.
pub fn delay_step(
    args: &DelayArgs,
    ctx: &InvariantContext,
    state: &RobotState,
) -> CommandCreatorResult {
    let message = args.message.clone();
    match args.seconds {
        Some(seconds) => {
            wait_for_duration(&WaitForDurationParams { seconds, message }, ctx, state)
        }
        None => wait_for_resume(&WaitForResumeParams { message }, ctx, state),
    }
}

pub fn temperature_module_step(
    args: &TemperatureModuleArgs,
    ctx: &InvariantContext,
    state: &RobotState,
) -> CommandCreatorResult {
    let module_id = args.module_id.clone();
    let Some(celsius) = args.target else {
        return deactivate_temperature(&ModuleParams { module_id }, ctx, state);
    };
    let params = TemperatureParams { module_id, celsius };
    let mut creators = vec![curry(set_temperature, params.clone())];
    if args.wait_for_temperature {
        creators.push(curry(wait_for_temperature, params));
    }
    reduce_to_result(&creators, ctx, state)
}

pub fn magnetic_module_step(
    args: &MagneticModuleArgs,
    ctx: &InvariantContext,
    state: &RobotState,
) -> CommandCreatorResult {
    let module_id = args.module_id.clone();
    match args.engage_height {
        Some(height) => engage_magnet(&MagnetEngageParams { module_id, height }, ctx, state),
        None => disengage_magnet(&ModuleParams { module_id }, ctx, state),
    }
}

// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Command creators emitting a single command after checking it against the state.

use indexmap::IndexMap;
use pd_common::ids::{LabwareId, PipetteId};
use pd_units::{Microliters, Volume};

use super::{
    CommandCreatorError, CommandCreatorFailure, CommandCreatorResult, CommandCreatorWarning,
    CommandsAndWarnings,
};
use crate::command::{
    AspDispParams, BlowOutInPlaceParams, BlowOutParams, Command, DropTipParams,
    MoveToAddressableAreaForDropTipParams, MoveToAddressableAreaParams, PickUpTipParams,
    PipetteParams, TouchTipParams, WaitForDurationParams, WaitForResumeParams,
};
use crate::invariant_context::InvariantContext;
use crate::robot_state::{ModuleState, RobotState, next_tip};

pub(crate) fn exceeds(volume: Volume<Microliters>, limit: Volume<Microliters>, tolerance: f64) -> bool {
    volume.value() > limit.value() + tolerance
}

fn emit(
    command: Command,
    errors: Vec<CommandCreatorError>,
    warnings: Vec<CommandCreatorWarning>,
) -> CommandCreatorResult {
    if errors.is_empty() {
        Ok(CommandsAndWarnings {
            commands: vec![command],
            warnings,
        })
    } else {
        Err(CommandCreatorFailure::new(errors, warnings))
    }
}

fn require_tip(pipette: &PipetteId, state: &RobotState) -> Result<(), CommandCreatorFailure> {
    if state.tip_attached(pipette) {
        Ok(())
    } else {
        Err(CommandCreatorError::NoTipOnPipette {
            pipette_id: pipette.clone(),
        }
        .into())
    }
}

fn channel_wells(
    pipette: &PipetteId,
    labware: &LabwareId,
    well: &str,
    ctx: &InvariantContext,
) -> Result<Vec<String>, CommandCreatorError> {
    let channels = ctx.pipette_traits(pipette).channels;
    ctx.labware(labware)
        .definition
        .wells_for_channels(well, channels)
        .ok_or_else(|| CommandCreatorError::InvalidWellForChannels {
            labware_id: labware.clone(),
            well_name: well.to_string(),
            channels,
        })
}

/// Number of channels entering each well.
fn channels_per_well(wells: &[String]) -> IndexMap<&str, usize> {
    let mut counts = IndexMap::new();
    for well in wells {
        *counts.entry(well.as_str()).or_insert(0) += 1;
    }
    counts
}

/// Errors from modules that block pipetting into labware sitting on them.
pub(crate) fn pipetting_module_errors(
    labware: &LabwareId,
    state: &RobotState,
) -> Vec<CommandCreatorError> {
    let Some(module_id) = state.module_under_labware(labware) else {
        return vec![];
    };
    match state.modules.get(module_id) {
        Some(ModuleState::HeaterShaker {
            target_speed: Some(_),
            ..
        }) => vec![CommandCreatorError::HeaterShakerIsShaking {
            module_id: module_id.clone(),
        }],
        Some(ModuleState::Thermocycler {
            lid_open: false, ..
        }) => vec![CommandCreatorError::ThermocyclerLidClosed {
            module_id: module_id.clone(),
        }],
        _ => vec![],
    }
}

fn below_minimum_warning(
    params: &AspDispParams,
    ctx: &InvariantContext,
) -> Option<CommandCreatorWarning> {
    let min_volume = ctx.pipette_traits(&params.pipette_id).min_volume;
    (params.volume < min_volume).then(|| CommandCreatorWarning::BelowPipetteMinimumVolume {
        pipette_id: params.pipette_id.clone(),
        volume: params.volume,
        min_volume,
    })
}

pub fn aspirate(
    params: &AspDispParams,
    ctx: &InvariantContext,
    state: &RobotState,
) -> CommandCreatorResult {
    let pipette_id = &params.pipette_id;
    require_tip(pipette_id, state)?;
    let tolerance = ctx.settings.volume_tolerance_ul;
    let traits = ctx.pipette_traits(pipette_id);
    let mut errors = pipetting_module_errors(&params.labware_id, state);

    if exceeds(params.volume, traits.max_volume, tolerance) {
        errors.push(CommandCreatorError::PipetteVolumeExceeded {
            pipette_id: pipette_id.clone(),
            volume: params.volume,
            max_volume: traits.max_volume,
        });
    } else if let Some(tip) = state.attached_tip(pipette_id) {
        let capacity = ctx.tip_capacity_for(pipette_id, &tip.tiprack_id);
        let volume = state.tip_volume(pipette_id) + params.volume;
        if exceeds(volume, capacity, tolerance) {
            errors.push(CommandCreatorError::TipVolumeExceeded {
                pipette_id: pipette_id.clone(),
                volume,
                capacity,
            });
        }
    }

    match channel_wells(pipette_id, &params.labware_id, &params.well_name, ctx) {
        Ok(wells) => {
            for (well, channels) in channels_per_well(&wells) {
                let requested = params.volume * channels as f64;
                let available = state.well_volume(&params.labware_id, well);
                if exceeds(requested, available, tolerance) {
                    errors.push(CommandCreatorError::InsufficientLiquid {
                        labware_id: params.labware_id.clone(),
                        well_name: well.to_string(),
                        requested,
                        available,
                    });
                }
            }
        }
        Err(error) => errors.push(error),
    }

    let warnings = below_minimum_warning(params, ctx).into_iter().collect();
    emit(Command::Aspirate(params.clone()), errors, warnings)
}

pub fn dispense(
    params: &AspDispParams,
    ctx: &InvariantContext,
    state: &RobotState,
) -> CommandCreatorResult {
    let pipette_id = &params.pipette_id;
    require_tip(pipette_id, state)?;
    let tolerance = ctx.settings.volume_tolerance_ul;
    let mut errors = pipetting_module_errors(&params.labware_id, state);
    let mut warnings: Vec<_> = below_minimum_warning(params, ctx).into_iter().collect();

    let available = state.tip_volume(pipette_id);
    if exceeds(params.volume, available, tolerance) {
        warnings.push(CommandCreatorWarning::DispenseExceedsTipContents {
            pipette_id: pipette_id.clone(),
            volume: params.volume,
            available,
        });
    }

    match channel_wells(pipette_id, &params.labware_id, &params.well_name, ctx) {
        Ok(wells) if ctx.settings.warn_on_well_overflow => {
            let definition = &ctx.labware(&params.labware_id).definition;
            for (well, channels) in channels_per_well(&wells) {
                let Some(capacity) = definition.well_capacity(well) else {
                    continue;
                };
                let volume =
                    state.well_volume(&params.labware_id, well) + params.volume * channels as f64;
                if exceeds(volume, capacity, tolerance) {
                    warnings.push(CommandCreatorWarning::WellOverflow {
                        labware_id: params.labware_id.clone(),
                        well_name: well.to_string(),
                        volume,
                        capacity,
                    });
                }
            }
        }
        Ok(_) => {}
        Err(error) => errors.push(error),
    }

    emit(Command::Dispense(params.clone()), errors, warnings)
}

/// Blow out into a well. The labware may also be disposal equipment addressed like
/// labware, e.g. the fixed trash.
pub fn blowout(
    params: &BlowOutParams,
    ctx: &InvariantContext,
    state: &RobotState,
) -> CommandCreatorResult {
    require_tip(&params.pipette_id, state)?;
    let mut errors = pipetting_module_errors(&params.labware_id, state);
    if ctx.labware_entities.contains_key(&params.labware_id)
        && let Err(error) =
            channel_wells(&params.pipette_id, &params.labware_id, &params.well_name, ctx)
    {
        errors.push(error);
    }
    emit(Command::BlowOut(params.clone()), errors, vec![])
}

pub fn blow_out_in_place(
    params: &BlowOutInPlaceParams,
    _ctx: &InvariantContext,
    state: &RobotState,
) -> CommandCreatorResult {
    require_tip(&params.pipette_id, state)?;
    emit(Command::BlowOutInPlace(params.clone()), vec![], vec![])
}

pub fn touch_tip(
    params: &TouchTipParams,
    ctx: &InvariantContext,
    state: &RobotState,
) -> CommandCreatorResult {
    require_tip(&params.pipette_id, state)?;
    let mut errors = pipetting_module_errors(&params.labware_id, state);
    if let Err(error) = channel_wells(&params.pipette_id, &params.labware_id, &params.well_name, ctx)
    {
        errors.push(error);
    }
    emit(Command::TouchTip(params.clone()), errors, vec![])
}

pub fn pick_up_tip(
    params: &PickUpTipParams,
    ctx: &InvariantContext,
    state: &RobotState,
) -> CommandCreatorResult {
    if state.tip_attached(&params.pipette_id) {
        return Err(CommandCreatorError::TipAlreadyAttached {
            pipette_id: params.pipette_id.clone(),
        }
        .into());
    }
    if !ctx.labware(&params.labware_id).definition.is_tiprack() {
        return Err(CommandCreatorError::NotATiprack {
            labware_id: params.labware_id.clone(),
        }
        .into());
    }
    let wells = channel_wells(&params.pipette_id, &params.labware_id, &params.well_name, ctx)?;
    if let Some(used) = wells.iter().find(|w| !state.has_tip(&params.labware_id, w)) {
        return Err(CommandCreatorError::TipNotAvailable {
            labware_id: params.labware_id.clone(),
            well_name: used.clone(),
        }
        .into());
    }
    emit(Command::PickUpTip(params.clone()), vec![], vec![])
}

/// Pick up the next tip from the tip racks assigned to the pipette.
pub fn pick_up_next_tip(
    pipette: &PipetteId,
    ctx: &InvariantContext,
    state: &RobotState,
) -> CommandCreatorResult {
    let Some((tiprack, well)) = next_tip(ctx, state, pipette) else {
        return Err(CommandCreatorError::InsufficientTips {
            pipette_id: pipette.clone(),
        }
        .into());
    };
    pick_up_tip(
        &PickUpTipParams {
            pipette_id: pipette.clone(),
            labware_id: tiprack,
            well_name: well,
        },
        ctx,
        state,
    )
}

/// Drop the tip into a well. Nothing to do without a tip.
pub fn drop_tip(
    params: &DropTipParams,
    _ctx: &InvariantContext,
    state: &RobotState,
) -> CommandCreatorResult {
    if !state.tip_attached(&params.pipette_id) {
        return Ok(CommandsAndWarnings::default());
    }
    emit(Command::DropTip(params.clone()), vec![], vec![])
}

/// Drop the tip at the current position. Nothing to do without a tip.
pub fn drop_tip_in_place(
    params: &PipetteParams,
    _ctx: &InvariantContext,
    state: &RobotState,
) -> CommandCreatorResult {
    if !state.tip_attached(&params.pipette_id) {
        return Ok(CommandsAndWarnings::default());
    }
    emit(Command::DropTipInPlace(params.clone()), vec![], vec![])
}

pub fn move_to_addressable_area(
    params: &MoveToAddressableAreaParams,
    _ctx: &InvariantContext,
    _state: &RobotState,
) -> CommandCreatorResult {
    emit(Command::MoveToAddressableArea(params.clone()), vec![], vec![])
}

pub fn move_to_addressable_area_for_drop_tip(
    params: &MoveToAddressableAreaForDropTipParams,
    _ctx: &InvariantContext,
    _state: &RobotState,
) -> CommandCreatorResult {
    emit(
        Command::MoveToAddressableAreaForDropTip(params.clone()),
        vec![],
        vec![],
    )
}

pub fn wait_for_duration(
    params: &WaitForDurationParams,
    _ctx: &InvariantContext,
    _state: &RobotState,
) -> CommandCreatorResult {
    emit(Command::WaitForDuration(params.clone()), vec![], vec![])
}

pub fn wait_for_resume(
    params: &WaitForResumeParams,
    _ctx: &InvariantContext,
    _state: &RobotState,
) -> CommandCreatorResult {
    emit(Command::WaitForResume(params.clone()), vec![], vec![])
}

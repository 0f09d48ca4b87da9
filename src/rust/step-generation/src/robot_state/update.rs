// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Effect of a single command on the robot state.
//!
//! Commands reaching this point were emitted by a command creator that already checked
//! them against the state; inconsistencies are internal errors.

use pd_common::ids::{LabwareId, ModuleId, PipetteId};

use super::{AttachedTip, LiquidContents, LiquidState, ModuleState, RobotState};
use crate::command::{
    AspDispParams, BlowOutParams, Command, DropTipParams, PickUpTipParams, PipetteParams,
};
use crate::invariant_context::InvariantContext;

/// Apply `commands` in order to a copy of `state`.
pub fn apply_commands(
    commands: &[Command],
    ctx: &InvariantContext,
    state: &RobotState,
) -> RobotState {
    let mut next = state.clone();
    for command in commands {
        apply_command(command, ctx, &mut next);
    }
    next
}

pub fn apply_command(command: &Command, ctx: &InvariantContext, state: &mut RobotState) {
    match command {
        Command::PickUpTip(params) => pick_up_tip(params, ctx, state),
        Command::Aspirate(params) => aspirate(params, ctx, state),
        Command::Dispense(params) => dispense(params, ctx, state),
        Command::BlowOut(params) => blow_out(params, ctx, state),
        Command::BlowOutInPlace(params) => {
            discard_tip_contents(&params.pipette_id, state);
        }
        Command::DropTip(DropTipParams { pipette_id, .. })
        | Command::DropTipInPlace(PipetteParams { pipette_id }) => {
            discard_tip_contents(pipette_id, state);
            state.pipettes.entry(pipette_id.clone()).or_default().tip = None;
            state.liquid.pipettes.shift_remove(pipette_id);
        }
        Command::TouchTip(_)
        | Command::MoveToAddressableArea(_)
        | Command::MoveToAddressableAreaForDropTip(_)
        | Command::WaitForDuration(_)
        | Command::WaitForResume(_)
        | Command::TemperatureModuleWaitForTemperature(_) => {}
        Command::TemperatureModuleSetTargetTemperature(params) => {
            if let ModuleState::TemperatureModule { target } =
                module_state_mut(&params.module_id, ctx, state)
            {
                *target = Some(params.celsius);
            }
        }
        Command::TemperatureModuleDeactivate(params) => {
            if let ModuleState::TemperatureModule { target } =
                module_state_mut(&params.module_id, ctx, state)
            {
                *target = None;
            }
        }
        Command::MagneticModuleEngage(params) => {
            if let ModuleState::MagneticModule { engaged_height } =
                module_state_mut(&params.module_id, ctx, state)
            {
                *engaged_height = Some(params.height);
            }
        }
        Command::MagneticModuleDisengage(params) => {
            if let ModuleState::MagneticModule { engaged_height } =
                module_state_mut(&params.module_id, ctx, state)
            {
                *engaged_height = None;
            }
        }
        Command::HeaterShakerOpenLabwareLatch(params) => {
            set_latch(&params.module_id, true, ctx, state);
        }
        Command::HeaterShakerCloseLabwareLatch(params) => {
            set_latch(&params.module_id, false, ctx, state);
        }
        Command::HeaterShakerSetTargetTemperature(params) => {
            if let ModuleState::HeaterShaker {
                target_temperature, ..
            } = module_state_mut(&params.module_id, ctx, state)
            {
                *target_temperature = Some(params.celsius);
            }
        }
        Command::HeaterShakerDeactivateHeater(params) => {
            if let ModuleState::HeaterShaker {
                target_temperature, ..
            } = module_state_mut(&params.module_id, ctx, state)
            {
                *target_temperature = None;
            }
        }
        Command::HeaterShakerSetAndWaitForShakeSpeed(params) => {
            if let ModuleState::HeaterShaker { target_speed, .. } =
                module_state_mut(&params.module_id, ctx, state)
            {
                *target_speed = Some(params.rpm);
            }
        }
        Command::HeaterShakerDeactivateShaker(params) => {
            if let ModuleState::HeaterShaker { target_speed, .. } =
                module_state_mut(&params.module_id, ctx, state)
            {
                *target_speed = None;
            }
        }
    }
}

/// Wells touched by the channels of `pipette` when its first channel is in `well`.
fn channel_wells(
    pipette: &PipetteId,
    labware: &LabwareId,
    well: &str,
    ctx: &InvariantContext,
) -> Vec<String> {
    let channels = ctx.pipette_traits(pipette).channels;
    ctx.labware(labware)
        .definition
        .wells_for_channels(well, channels)
        .unwrap_or_else(|| {
            panic!("Internal error: Pipette '{pipette}' can not access well {well} of '{labware}'")
        })
}

fn pick_up_tip(params: &PickUpTipParams, ctx: &InvariantContext, state: &mut RobotState) {
    let wells = channel_wells(&params.pipette_id, &params.labware_id, &params.well_name, ctx);
    let tiprack = state.tipracks.entry(params.labware_id.clone()).or_default();
    for well in &wells {
        tiprack.insert(well.clone(), false);
    }
    state.pipettes.entry(params.pipette_id.clone()).or_default().tip = Some(AttachedTip {
        tiprack_id: params.labware_id.clone(),
        well_name: params.well_name.clone(),
    });
    state.liquid.pipettes.insert(
        params.pipette_id.clone(),
        vec![LiquidContents::new(); wells.len()],
    );
}

fn aspirate(params: &AspDispParams, ctx: &InvariantContext, state: &mut RobotState) {
    let wells = channel_wells(&params.pipette_id, &params.labware_id, &params.well_name, ctx);
    let LiquidState { labware, pipettes } = &mut state.liquid;
    let tips = pipettes.entry(params.pipette_id.clone()).or_default();
    tips.resize(wells.len(), LiquidContents::new());
    let labware_liquid = labware.entry(params.labware_id.clone()).or_default();
    for (tip, well) in tips.iter_mut().zip(&wells) {
        let removed = labware_liquid
            .entry(well.clone())
            .or_default()
            .split(params.volume);
        tip.merge(removed);
    }
}

fn dispense(params: &AspDispParams, ctx: &InvariantContext, state: &mut RobotState) {
    let wells = channel_wells(&params.pipette_id, &params.labware_id, &params.well_name, ctx);
    let LiquidState { labware, pipettes } = &mut state.liquid;
    let tips = pipettes.entry(params.pipette_id.clone()).or_default();
    tips.resize(wells.len(), LiquidContents::new());
    let labware_liquid = labware.entry(params.labware_id.clone()).or_default();
    for (tip, well) in tips.iter_mut().zip(&wells) {
        let removed = tip.split(params.volume);
        labware_liquid.entry(well.clone()).or_default().merge(removed);
    }
}

fn blow_out(params: &BlowOutParams, ctx: &InvariantContext, state: &mut RobotState) {
    // Blowing out into disposal equipment addresses it like labware, the liquid is gone.
    if !ctx.labware_entities.contains_key(&params.labware_id) {
        discard_tip_contents(&params.pipette_id, state);
        return;
    }
    let wells = channel_wells(&params.pipette_id, &params.labware_id, &params.well_name, ctx);
    let LiquidState { labware, pipettes } = &mut state.liquid;
    let Some(tips) = pipettes.get_mut(&params.pipette_id) else {
        return;
    };
    let labware_liquid = labware.entry(params.labware_id.clone()).or_default();
    for (tip, well) in tips.iter_mut().zip(&wells) {
        labware_liquid
            .entry(well.clone())
            .or_default()
            .merge(tip.take_all());
    }
}

fn discard_tip_contents(pipette: &PipetteId, state: &mut RobotState) {
    if let Some(tips) = state.liquid.pipettes.get_mut(pipette) {
        tips.iter_mut().for_each(|tip| *tip = LiquidContents::new());
    }
}

fn set_latch(module: &ModuleId, open: bool, ctx: &InvariantContext, state: &mut RobotState) {
    if let ModuleState::HeaterShaker { latch_open, .. } = module_state_mut(module, ctx, state) {
        *latch_open = open;
    }
}

/// State of `module`, reset to idle if it is missing or does not match the module kind.
fn module_state_mut<'a>(
    module: &ModuleId,
    ctx: &InvariantContext,
    state: &'a mut RobotState,
) -> &'a mut ModuleState {
    let kind = ctx.module(module).kind;
    let module_state = state
        .modules
        .entry(module.clone())
        .or_insert_with(|| ModuleState::idle(kind));
    if module_state.kind() != kind {
        *module_state = ModuleState::idle(kind);
    }
    module_state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{TemperatureParams, WellLocation};
    use crate::test_utils::{TestContext, fixture_context, fixture_robot_state};
    use pd_units::{celsius, microliters, microliters_per_second};

    fn asp_disp(pipette: &str, labware: &str, well: &str, volume: f64) -> AspDispParams {
        AspDispParams {
            pipette_id: pipette.into(),
            volume: microliters(volume),
            labware_id: labware.into(),
            well_name: well.to_string(),
            well_location: WellLocation::from_bottom(1.0),
            flow_rate: microliters_per_second(50.0),
        }
    }

    fn pick_up(pipette: &str, tiprack: &str, well: &str) -> Command {
        Command::PickUpTip(PickUpTipParams {
            pipette_id: pipette.into(),
            labware_id: tiprack.into(),
            well_name: well.to_string(),
        })
    }

    #[test]
    fn test_pick_up_aspirate_dispense_drop() {
        let ctx = fixture_context(TestContext::default());
        let initial = fixture_robot_state(&ctx);
        let pipette = PipetteId::from("p300");
        let commands = vec![
            pick_up("p300", "tiprack", "A1"),
            Command::Aspirate(asp_disp("p300", "reservoir", "A1", 50.0)),
        ];
        let state = apply_commands(&commands, &ctx, &initial);
        assert!(state.tip_attached(&pipette));
        assert!(!state.has_tip(&"tiprack".into(), "A1"));
        assert_eq!(state.tip_volume(&pipette), microliters(50.0));
        assert_eq!(
            state.well_volume(&"reservoir".into(), "A1"),
            initial.well_volume(&"reservoir".into(), "A1") - microliters(50.0)
        );

        let commands = vec![
            Command::Dispense(asp_disp("p300", "plate", "B2", 30.0)),
            Command::DropTipInPlace(PipetteParams {
                pipette_id: pipette.clone(),
            }),
        ];
        let state = apply_commands(&commands, &ctx, &state);
        assert!(!state.tip_attached(&pipette));
        assert_eq!(state.well_volume(&"plate".into(), "B2"), microliters(30.0));
        assert!(state.tip_contents(&pipette).is_empty());
        // The discarded 20 µL left the deck.
        assert_eq!(
            state.total_liquid(&"water".into()),
            initial.total_liquid(&"water".into()) - microliters(20.0)
        );
    }

    #[test]
    fn test_multi_channel_aspirate_from_reservoir_row() {
        let ctx = fixture_context(TestContext::default());
        let initial = fixture_robot_state(&ctx);
        let commands = vec![
            pick_up("p300multi", "tiprack_multi", "A1"),
            Command::Aspirate(asp_disp("p300multi", "reservoir", "A1", 10.0)),
            Command::Dispense(asp_disp("p300multi", "plate", "A3", 10.0)),
        ];
        let state = apply_commands(&commands, &ctx, &initial);
        // All eight channels draw from the same reservoir well.
        assert_eq!(
            state.well_volume(&"reservoir".into(), "A1"),
            initial.well_volume(&"reservoir".into(), "A1") - microliters(80.0)
        );
        assert_eq!(state.well_volume(&"plate".into(), "H3"), microliters(10.0));
        assert!(!state.has_tip(&"tiprack_multi".into(), "H1"));
        assert!(state.has_tip(&"tiprack_multi".into(), "A2"));
    }

    #[test]
    fn test_blow_out_into_trash_discards_liquid() {
        let ctx = fixture_context(TestContext::default());
        let initial = fixture_robot_state(&ctx);
        let commands = vec![
            pick_up("p300", "tiprack", "A1"),
            Command::Aspirate(asp_disp("p300", "reservoir", "A1", 40.0)),
            Command::BlowOut(BlowOutParams {
                pipette_id: "p300".into(),
                labware_id: "fixedTrash".into(),
                well_name: "A1".to_string(),
                well_location: WellLocation::from_top(0.0),
                flow_rate: microliters_per_second(50.0),
            }),
        ];
        let state = apply_commands(&commands, &ctx, &initial);
        assert_eq!(state.tip_volume(&"p300".into()), microliters(0.0));
        assert!(state.tip_attached(&"p300".into()));
        assert!(!state.liquid.labware.contains_key(&LabwareId::from("fixedTrash")));
    }

    #[test]
    fn test_module_commands() {
        let ctx = fixture_context(TestContext::default());
        let mut state = RobotState::initial(&ctx);
        apply_command(
            &Command::TemperatureModuleSetTargetTemperature(TemperatureParams {
                module_id: "temp".into(),
                celsius: celsius(4.0),
            }),
            &ctx,
            &mut state,
        );
        apply_command(
            &Command::HeaterShakerOpenLabwareLatch(crate::command::ModuleParams {
                module_id: "hs".into(),
            }),
            &ctx,
            &mut state,
        );
        assert_eq!(
            state.modules[&ModuleId::from("temp")],
            ModuleState::TemperatureModule {
                target: Some(celsius(4.0))
            }
        );
        assert!(matches!(
            state.modules[&ModuleId::from("hs")],
            ModuleState::HeaterShaker {
                latch_open: true,
                ..
            }
        ));
    }
}

// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Command creators composed of other command creators.

mod consolidate;
mod mix;
mod transfer;

pub use consolidate::consolidate;
pub use mix::mix;
pub use transfer::transfer;

use pd_common::deck::{trash_bin_addressable_area, waste_chute_addressable_area};
use pd_common::ids::{AdditionalEquipmentId, LabwareId, PipetteId};
use pd_common::types::AdditionalEquipmentKind;
use pd_units::{FlowRate, Microliters, MicrolitersPerSecond, Volume};

use super::atomic::{
    aspirate, blow_out_in_place, blowout, dispense, drop_tip, drop_tip_in_place,
    move_to_addressable_area, move_to_addressable_area_for_drop_tip, pick_up_next_tip, touch_tip,
};
use super::{
    CommandCreatorError, CommandCreatorResult, CommandsAndWarnings, CurriedCommandCreator, curry,
    reduce_to_result,
};
use crate::command::{
    AspDispParams, BlowOutInPlaceParams, BlowOutParams, DropTipParams,
    MoveToAddressableAreaForDropTipParams, MoveToAddressableAreaParams, Offset, PipetteParams,
    TouchTipParams, WellLocation,
};
use crate::invariant_context::{AdditionalEquipmentEntity, InvariantContext};
use crate::robot_state::RobotState;
use crate::step_args::{
    BLOWOUT_OFFSET_FROM_TOP_MM, BlowoutLocation, ChangeTipPolicy, MixParams, ResolvedPipetting,
    TOUCH_TIP_OFFSET_FROM_TOP_MM,
};

/// Well all disposal equipment addressed like labware is reached through.
const DISPOSAL_WELL: &str = "A1";

#[derive(Debug, Clone, PartialEq)]
pub struct DisposeTipParams {
    pub pipette_id: PipetteId,
    pub drop_tip_location: AdditionalEquipmentId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplaceTipParams {
    pub pipette_id: PipetteId,
    /// Where the attached tip goes; a pipette with a tip and no location can not replace it.
    pub drop_tip_location: Option<AdditionalEquipmentId>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MovableTrashAction {
    DropTip,
    BlowOut {
        flow_rate: FlowRate<MicrolitersPerSecond>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MovableTrashParams {
    pub pipette_id: PipetteId,
    pub trash_id: AdditionalEquipmentId,
    pub action: MovableTrashAction,
}

/// Resolved target of a blow out.
#[derive(Debug, Clone, PartialEq)]
pub enum BlowoutTarget {
    Well {
        labware_id: LabwareId,
        well_name: String,
    },
    Equipment(AdditionalEquipmentId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlowOutAtLocationParams {
    pub pipette_id: PipetteId,
    pub target: BlowoutTarget,
    pub flow_rate: FlowRate<MicrolitersPerSecond>,
}

impl BlowoutLocation {
    pub fn target(
        &self,
        source: (&LabwareId, &str),
        dest: (&LabwareId, &str),
    ) -> BlowoutTarget {
        let well = |(labware_id, well_name): (&LabwareId, &str)| BlowoutTarget::Well {
            labware_id: labware_id.clone(),
            well_name: well_name.to_string(),
        };
        match self {
            BlowoutLocation::SourceWell => well(source),
            BlowoutLocation::DestWell => well(dest),
            BlowoutLocation::Equipment(id) => BlowoutTarget::Equipment(id.clone()),
        }
    }
}

/// Disposal equipment other than chutes and bins is addressed as labware with one well.
fn equipment_as_labware(equipment: &AdditionalEquipmentEntity) -> LabwareId {
    LabwareId::from(equipment.id.as_str())
}

/// Move to a trash bin and drop the tip or blow out there.
pub fn movable_trash_commands(
    params: &MovableTrashParams,
    ctx: &InvariantContext,
    state: &RobotState,
) -> CommandCreatorResult {
    let trash = ctx.additional_equipment(&params.trash_id);
    let Some(area) = trash
        .location
        .as_deref()
        .and_then(trash_bin_addressable_area)
    else {
        return Err(CommandCreatorError::InvalidTrashLocation {
            equipment_id: params.trash_id.clone(),
        }
        .into());
    };
    let pipette_id = params.pipette_id.clone();
    let creators = match params.action {
        MovableTrashAction::DropTip => vec![
            curry(
                move_to_addressable_area_for_drop_tip,
                MoveToAddressableAreaForDropTipParams {
                    pipette_id: pipette_id.clone(),
                    addressable_area_name: area,
                    offset: Offset::default(),
                    alternate_drop_location: true,
                },
            ),
            curry(drop_tip_in_place, PipetteParams { pipette_id }),
        ],
        MovableTrashAction::BlowOut { flow_rate } => vec![
            curry(
                move_to_addressable_area,
                MoveToAddressableAreaParams {
                    pipette_id: pipette_id.clone(),
                    addressable_area_name: area,
                    offset: Offset::default(),
                },
            ),
            curry(
                blow_out_in_place,
                BlowOutInPlaceParams {
                    pipette_id,
                    flow_rate,
                },
            ),
        ],
    };
    reduce_to_result(&creators, ctx, state)
}

/// Get rid of the attached tip at `drop_tip_location`, dispatching on the kind of
/// equipment found there.
pub fn dispose_tip(
    params: &DisposeTipParams,
    ctx: &InvariantContext,
    state: &RobotState,
) -> CommandCreatorResult {
    let equipment = ctx.additional_equipment(&params.drop_tip_location);
    let pipette_id = params.pipette_id.clone();
    let creators = match equipment.kind {
        AdditionalEquipmentKind::WasteChute => {
            let channels = ctx.pipette_traits(&pipette_id).channels;
            vec![
                curry(
                    move_to_addressable_area,
                    MoveToAddressableAreaParams {
                        pipette_id: pipette_id.clone(),
                        addressable_area_name: waste_chute_addressable_area(channels),
                        offset: Offset::default(),
                    },
                ),
                curry(drop_tip_in_place, PipetteParams { pipette_id }),
            ]
        }
        AdditionalEquipmentKind::TrashBin => vec![curry(
            movable_trash_commands,
            MovableTrashParams {
                pipette_id,
                trash_id: equipment.id.clone(),
                action: MovableTrashAction::DropTip,
            },
        )],
        AdditionalEquipmentKind::FixedTrash
        | AdditionalEquipmentKind::StagingArea
        | AdditionalEquipmentKind::Gripper => vec![curry(
            drop_tip,
            DropTipParams {
                pipette_id,
                labware_id: equipment_as_labware(equipment),
                well_name: DISPOSAL_WELL.to_string(),
            },
        )],
    };
    reduce_to_result(&creators, ctx, state)
}

/// [`dispose_tip`] if the pipette carries a tip, nothing otherwise.
pub fn drop_tip_if_attached(
    params: &DisposeTipParams,
    ctx: &InvariantContext,
    state: &RobotState,
) -> CommandCreatorResult {
    if state.tip_attached(&params.pipette_id) {
        dispose_tip(params, ctx, state)
    } else {
        Ok(CommandsAndWarnings::default())
    }
}

/// Dispose of the attached tip, if any, and pick up the next available one.
pub fn replace_tip(
    params: &ReplaceTipParams,
    ctx: &InvariantContext,
    state: &RobotState,
) -> CommandCreatorResult {
    let mut creators = vec![];
    if state.tip_attached(&params.pipette_id) {
        let Some(location) = &params.drop_tip_location else {
            return Err(CommandCreatorError::TipAlreadyAttached {
                pipette_id: params.pipette_id.clone(),
            }
            .into());
        };
        creators.push(curry(
            dispose_tip,
            DisposeTipParams {
                pipette_id: params.pipette_id.clone(),
                drop_tip_location: location.clone(),
            },
        ));
    }
    creators.push(curry(pick_up_next_tip, params.pipette_id.clone()));
    reduce_to_result(&creators, ctx, state)
}

pub fn blow_out_at_location(
    params: &BlowOutAtLocationParams,
    ctx: &InvariantContext,
    state: &RobotState,
) -> CommandCreatorResult {
    let pipette_id = params.pipette_id.clone();
    let blowout_into = |labware_id: LabwareId, well_name: String| BlowOutParams {
        pipette_id: pipette_id.clone(),
        labware_id,
        well_name,
        well_location: WellLocation::from_top(BLOWOUT_OFFSET_FROM_TOP_MM),
        flow_rate: params.flow_rate,
    };
    match &params.target {
        BlowoutTarget::Well {
            labware_id,
            well_name,
        } => blowout(
            &blowout_into(labware_id.clone(), well_name.clone()),
            ctx,
            state,
        ),
        BlowoutTarget::Equipment(id) => {
            let equipment = ctx.additional_equipment(id);
            match equipment.kind {
                AdditionalEquipmentKind::WasteChute => {
                    let channels = ctx.pipette_traits(&pipette_id).channels;
                    let creators = vec![
                        curry(
                            move_to_addressable_area,
                            MoveToAddressableAreaParams {
                                pipette_id: pipette_id.clone(),
                                addressable_area_name: waste_chute_addressable_area(channels),
                                offset: Offset::default(),
                            },
                        ),
                        curry(
                            blow_out_in_place,
                            BlowOutInPlaceParams {
                                pipette_id: pipette_id.clone(),
                                flow_rate: params.flow_rate,
                            },
                        ),
                    ];
                    reduce_to_result(&creators, ctx, state)
                }
                AdditionalEquipmentKind::TrashBin => movable_trash_commands(
                    &MovableTrashParams {
                        pipette_id: pipette_id.clone(),
                        trash_id: id.clone(),
                        action: MovableTrashAction::BlowOut {
                            flow_rate: params.flow_rate,
                        },
                    },
                    ctx,
                    state,
                ),
                AdditionalEquipmentKind::FixedTrash
                | AdditionalEquipmentKind::StagingArea
                | AdditionalEquipmentKind::Gripper => blowout(
                    &blowout_into(equipment_as_labware(equipment), DISPOSAL_WELL.to_string()),
                    ctx,
                    state,
                ),
            }
        }
    }
}

/// Whether a step with `policy` takes a fresh tip before moving `source` to `dest`,
/// given the pair handled before, if any.
pub(crate) fn needs_new_tip(
    policy: ChangeTipPolicy,
    previous: Option<(&str, &str)>,
    source: &str,
    dest: &str,
) -> bool {
    match (policy, previous) {
        (ChangeTipPolicy::Never, _) => false,
        (_, None) => true,
        (ChangeTipPolicy::Always, Some(_)) => true,
        (ChangeTipPolicy::Once, Some(_)) => false,
        (ChangeTipPolicy::PerSource, Some((previous_source, _))) => previous_source != source,
        (ChangeTipPolicy::PerDest, Some((_, previous_dest))) => previous_dest != dest,
    }
}

pub(crate) fn aspirate_creator(
    pipette_id: &PipetteId,
    labware_id: &LabwareId,
    well_name: &str,
    volume: Volume<Microliters>,
    pipetting: &ResolvedPipetting,
) -> CurriedCommandCreator<'static> {
    curry(
        aspirate,
        AspDispParams {
            pipette_id: pipette_id.clone(),
            volume,
            labware_id: labware_id.clone(),
            well_name: well_name.to_string(),
            well_location: pipetting.aspirate_location,
            flow_rate: pipetting.aspirate_flow_rate,
        },
    )
}

pub(crate) fn dispense_creator(
    pipette_id: &PipetteId,
    labware_id: &LabwareId,
    well_name: &str,
    volume: Volume<Microliters>,
    pipetting: &ResolvedPipetting,
) -> CurriedCommandCreator<'static> {
    curry(
        dispense,
        AspDispParams {
            pipette_id: pipette_id.clone(),
            volume,
            labware_id: labware_id.clone(),
            well_name: well_name.to_string(),
            well_location: pipetting.dispense_location,
            flow_rate: pipetting.dispense_flow_rate,
        },
    )
}

pub(crate) fn touch_tip_creator(
    pipette_id: &PipetteId,
    labware_id: &LabwareId,
    well_name: &str,
) -> CurriedCommandCreator<'static> {
    curry(
        touch_tip,
        TouchTipParams {
            pipette_id: pipette_id.clone(),
            labware_id: labware_id.clone(),
            well_name: well_name.to_string(),
            well_location: WellLocation::from_top(TOUCH_TIP_OFFSET_FROM_TOP_MM),
        },
    )
}

/// `mix.times` aspirate/dispense cycles in one well.
pub(crate) fn mix_creators(
    pipette_id: &PipetteId,
    labware_id: &LabwareId,
    well_name: &str,
    mix: &MixParams,
    pipetting: &ResolvedPipetting,
) -> Vec<CurriedCommandCreator<'static>> {
    (0..mix.times)
        .flat_map(|_| {
            [
                aspirate_creator(pipette_id, labware_id, well_name, mix.volume, pipetting),
                dispense_creator(pipette_id, labware_id, well_name, mix.volume, pipetting),
            ]
        })
        .collect()
}

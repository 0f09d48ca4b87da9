// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use anyhow::Context;
use indexmap::IndexMap;
use pd_common::ids::{LabwareId, LiquidId, StepId};
use pd_units::{Microliters, Volume};
use serde::Deserialize;
use step_generation::robot_state::LabwareLocation;
use step_generation::{InvariantContext, RobotState, StepArgsAndErrors};

/// Liquid loaded into a well before the protocol starts.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WellLiquid {
    pub labware_id: LabwareId,
    pub well_name: String,
    pub liquid_id: LiquidId,
    pub volume: Volume<Microliters>,
}

/// Protocol as handed over by the designer.
///
/// The starting state is either given in full as `initialRobotState`, or derived
/// from the context with `labwareLocations` and `wellLiquids` applied.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolDocument {
    pub invariant_context: InvariantContext,
    #[serde(default)]
    pub initial_robot_state: Option<RobotState>,
    #[serde(default)]
    pub labware_locations: IndexMap<LabwareId, LabwareLocation>,
    #[serde(default)]
    pub well_liquids: Vec<WellLiquid>,
    pub steps: IndexMap<StepId, StepArgsAndErrors>,
    pub ordered_step_ids: Vec<StepId>,
}

impl ProtocolDocument {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("Invalid protocol document")
    }

    pub fn initial_robot_state(&self) -> RobotState {
        if let Some(state) = &self.initial_robot_state {
            return state.clone();
        }
        let mut state = RobotState::initial(&self.invariant_context);
        for (labware, location) in &self.labware_locations {
            state.labware.insert(labware.clone(), location.clone());
        }
        for liquid in &self.well_liquids {
            state
                .liquid
                .labware
                .entry(liquid.labware_id.clone())
                .or_default()
                .entry(liquid.well_name.clone())
                .or_default()
                .add(liquid.liquid_id.clone(), liquid.volume);
        }
        state
    }
}

// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use pd_common::ids::{LabwareId, PipetteId};

use super::RobotState;
use crate::invariant_context::InvariantContext;

/// Tip rack and well of the next pickup that supplies a tip to every channel of the pipette.
///
/// Tip racks are searched in the order they are assigned to the pipette, wells in
/// column-major order.
pub fn next_tip(
    ctx: &InvariantContext,
    state: &RobotState,
    pipette: &PipetteId,
) -> Option<(LabwareId, String)> {
    let entity = ctx.pipette(pipette);
    let channels = entity.traits().channels;
    entity.tiprack_labware_ids.iter().find_map(|tiprack| {
        let definition = &ctx.labware(tiprack).definition;
        definition
            .wells_in_order()
            .find(|well| {
                definition
                    .wells_for_channels(well, channels)
                    .is_some_and(|wells| wells.iter().all(|w| state.has_tip(tiprack, w)))
            })
            .map(|well| (tiprack.clone(), well.clone()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{TestContext, fixture_context};

    #[test]
    fn test_single_channel_takes_first_tip() {
        let ctx = fixture_context(TestContext::default());
        let mut state = RobotState::initial(&ctx);
        let pipette = PipetteId::from("p300");
        assert_eq!(
            next_tip(&ctx, &state, &pipette),
            Some(("tiprack".into(), "A1".to_string()))
        );
        state.tipracks[&LabwareId::from("tiprack")].insert("A1".to_string(), false);
        assert_eq!(
            next_tip(&ctx, &state, &pipette),
            Some(("tiprack".into(), "B1".to_string()))
        );
    }

    #[test]
    fn test_multi_channel_needs_full_column() {
        let ctx = fixture_context(TestContext::default());
        let mut state = RobotState::initial(&ctx);
        let pipette = PipetteId::from("p300multi");
        // A single missing tip in column 1 makes the whole column unusable.
        state.tipracks[&LabwareId::from("tiprack_multi")].insert("H1".to_string(), false);
        assert_eq!(
            next_tip(&ctx, &state, &pipette),
            Some(("tiprack_multi".into(), "A2".to_string()))
        );
    }

    #[test]
    fn test_no_tips_left() {
        let ctx = fixture_context(TestContext::default());
        let mut state = RobotState::initial(&ctx);
        for tip in state.tipracks[&LabwareId::from("tiprack")].values_mut() {
            *tip = false;
        }
        assert_eq!(next_tip(&ctx, &state, &"p300".into()), None);
    }
}

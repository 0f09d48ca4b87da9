// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Addressable area naming.
//!
//! Disposal locations are not labware, the robot reaches them through named
//! addressable areas whose names depend on the pipette and the deck cutout.

/// Cutout of the legacy fixed trash.
pub const FIXED_TRASH_CUTOUT: &str = "cutout12";
pub const FIXED_TRASH_ADDRESSABLE_AREA: &str = "fixedTrash";

/// Addressable area a pipette with `channels` channels uses to reach the waste chute.
pub fn waste_chute_addressable_area(channels: u8) -> String {
    format!("{channels}ChannelWasteChute")
}

/// Addressable area of a trash bin loaded into `cutout`, e.g. `cutoutA3` -> `movableTrashA3`.
///
/// Returns `None` for names that are not deck cutouts.
pub fn trash_bin_addressable_area(cutout: &str) -> Option<String> {
    if cutout == FIXED_TRASH_CUTOUT {
        return Some(FIXED_TRASH_ADDRESSABLE_AREA.to_string());
    }
    let slot = cutout.strip_prefix("cutout")?;
    let mut chars = slot.chars();
    let row = chars.next()?;
    let column = chars.as_str();
    if !('A'..='D').contains(&row) || column.is_empty() || !column.chars().all(|c| c.is_ascii_digit())
    {
        return None;
    }
    Some(format!("movableTrash{slot}"))
}

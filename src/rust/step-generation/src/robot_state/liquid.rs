// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use indexmap::IndexMap;
use pd_common::ids::LiquidId;
use pd_units::{Microliters, Volume, microliters};
use serde::{Deserialize, Serialize};

/// Volumes below this are dropped from a liquid map.
const EMPTY_VOLUME_UL: f64 = 1e-9;

/// Liquid in one well or one tip, by liquid id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LiquidContents(IndexMap<LiquidId, Volume<Microliters>>);

impl LiquidContents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, liquid: LiquidId, volume: Volume<Microliters>) -> Self {
        self.add(liquid, volume);
        self
    }

    pub fn add(&mut self, liquid: LiquidId, volume: Volume<Microliters>) {
        *self.0.entry(liquid).or_insert(microliters(0.0)) += volume;
    }

    pub fn volume_of(&self, liquid: &LiquidId) -> Volume<Microliters> {
        self.0.get(liquid).copied().unwrap_or(microliters(0.0))
    }

    pub fn total(&self) -> Volume<Microliters> {
        self.0.values().copied().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LiquidId, &Volume<Microliters>)> {
        self.0.iter()
    }

    /// Remove `volume` from the contents, taking every liquid in proportion to its share.
    ///
    /// Returns the removed part. Taking more than is present empties the contents; the
    /// missing volume is air and is not tracked.
    pub fn split(&mut self, volume: Volume<Microliters>) -> LiquidContents {
        let total = self.total().value();
        if total <= EMPTY_VOLUME_UL || volume.value() <= 0.0 {
            return LiquidContents::new();
        }
        let ratio = (volume.value() / total).min(1.0);
        let mut removed = LiquidContents::new();
        for (liquid, amount) in self.0.iter_mut() {
            let taken = *amount * ratio;
            *amount = (*amount - taken).clamp_non_negative();
            removed.0.insert(liquid.clone(), taken);
        }
        self.0.retain(|_, amount| amount.value() > EMPTY_VOLUME_UL);
        removed.0.retain(|_, amount| amount.value() > EMPTY_VOLUME_UL);
        removed
    }

    pub fn merge(&mut self, other: LiquidContents) {
        for (liquid, volume) in other.0 {
            self.add(liquid, volume);
        }
    }

    pub fn take_all(&mut self) -> LiquidContents {
        std::mem::take(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(entries: &[(&str, f64)]) -> LiquidContents {
        entries
            .iter()
            .fold(LiquidContents::new(), |acc, &(id, volume)| {
                acc.with(id.into(), microliters(volume))
            })
    }

    #[test]
    fn test_split_proportionally() {
        let mut well = contents(&[("water", 75.0), ("dye", 25.0)]);
        let removed = well.split(microliters(40.0));
        assert_eq!(removed.volume_of(&"water".into()), microliters(30.0));
        assert_eq!(removed.volume_of(&"dye".into()), microliters(10.0));
        assert_eq!(well.total(), microliters(60.0));
    }

    #[test]
    fn test_split_more_than_present() {
        let mut well = contents(&[("water", 10.0)]);
        let removed = well.split(microliters(50.0));
        assert_eq!(removed.total(), microliters(10.0));
        assert!(well.is_empty());
    }

    #[test]
    fn test_split_empty() {
        let mut well = LiquidContents::new();
        assert!(well.split(microliters(5.0)).is_empty());
    }

    #[test]
    fn test_merge() {
        let mut well = contents(&[("water", 10.0)]);
        well.merge(contents(&[("water", 5.0), ("dye", 1.0)]));
        assert_eq!(well.volume_of(&"water".into()), microliters(15.0));
        assert_eq!(well.volume_of(&"dye".into()), microliters(1.0));
        let all = well.take_all();
        assert_eq!(all.total(), microliters(16.0));
        assert!(well.is_empty());
    }
}

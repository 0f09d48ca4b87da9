// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use pd_units::{
    FlowRate, Microliters, MicrolitersPerSecond, Volume, microliters, microliters_per_second,
};
use serde::{Deserialize, Serialize};

/// Pipette models known to the protocol designer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipetteName {
    P20SingleGen2,
    P300SingleGen2,
    P1000SingleGen2,
    P20MultiGen2,
    P300MultiGen2,
    P50SingleFlex,
    P1000SingleFlex,
    P50MultiFlex,
    P1000MultiFlex,
    #[serde(rename = "p1000_96")]
    P1000Flex96,
}

impl PipetteName {
    pub fn traits(&self) -> &'static PipetteTraits {
        PipetteTraits::from_pipette_name(self)
    }
}

/// Commonly used pipette traits
pub struct PipetteTraits {
    pub channels: u8,
    pub min_volume: Volume<Microliters>,
    pub max_volume: Volume<Microliters>,
    pub default_aspirate_flow_rate: FlowRate<MicrolitersPerSecond>,
    pub default_dispense_flow_rate: FlowRate<MicrolitersPerSecond>,
    pub default_blowout_flow_rate: FlowRate<MicrolitersPerSecond>,
}

impl PipetteTraits {
    pub fn from_pipette_name(name: &PipetteName) -> &'static Self {
        match name {
            PipetteName::P20SingleGen2 => &P20_SINGLE_GEN2_TRAITS,
            PipetteName::P300SingleGen2 => &P300_SINGLE_GEN2_TRAITS,
            PipetteName::P1000SingleGen2 => &P1000_SINGLE_GEN2_TRAITS,
            PipetteName::P20MultiGen2 => &P20_MULTI_GEN2_TRAITS,
            PipetteName::P300MultiGen2 => &P300_MULTI_GEN2_TRAITS,
            PipetteName::P50SingleFlex => &P50_SINGLE_FLEX_TRAITS,
            PipetteName::P1000SingleFlex => &P1000_SINGLE_FLEX_TRAITS,
            PipetteName::P50MultiFlex => &P50_MULTI_FLEX_TRAITS,
            PipetteName::P1000MultiFlex => &P1000_MULTI_FLEX_TRAITS,
            PipetteName::P1000Flex96 => &P1000_96_TRAITS,
        }
    }
}

pub const P20_SINGLE_GEN2_TRAITS: PipetteTraits = PipetteTraits {
    channels: 1,
    min_volume: microliters(1.0),
    max_volume: microliters(20.0),
    default_aspirate_flow_rate: microliters_per_second(7.56),
    default_dispense_flow_rate: microliters_per_second(7.56),
    default_blowout_flow_rate: microliters_per_second(7.56),
};

pub const P300_SINGLE_GEN2_TRAITS: PipetteTraits = PipetteTraits {
    channels: 1,
    min_volume: microliters(20.0),
    max_volume: microliters(300.0),
    default_aspirate_flow_rate: microliters_per_second(92.86),
    default_dispense_flow_rate: microliters_per_second(92.86),
    default_blowout_flow_rate: microliters_per_second(92.86),
};

pub const P1000_SINGLE_GEN2_TRAITS: PipetteTraits = PipetteTraits {
    channels: 1,
    min_volume: microliters(100.0),
    max_volume: microliters(1000.0),
    default_aspirate_flow_rate: microliters_per_second(274.7),
    default_dispense_flow_rate: microliters_per_second(274.7),
    default_blowout_flow_rate: microliters_per_second(274.7),
};

pub const P20_MULTI_GEN2_TRAITS: PipetteTraits = PipetteTraits {
    channels: 8,
    min_volume: microliters(1.0),
    max_volume: microliters(20.0),
    default_aspirate_flow_rate: microliters_per_second(7.6),
    default_dispense_flow_rate: microliters_per_second(7.6),
    default_blowout_flow_rate: microliters_per_second(7.6),
};

pub const P300_MULTI_GEN2_TRAITS: PipetteTraits = PipetteTraits {
    channels: 8,
    min_volume: microliters(20.0),
    max_volume: microliters(300.0),
    default_aspirate_flow_rate: microliters_per_second(94.0),
    default_dispense_flow_rate: microliters_per_second(94.0),
    default_blowout_flow_rate: microliters_per_second(94.0),
};

pub const P50_SINGLE_FLEX_TRAITS: PipetteTraits = PipetteTraits {
    channels: 1,
    min_volume: microliters(1.0),
    max_volume: microliters(50.0),
    default_aspirate_flow_rate: microliters_per_second(35.0),
    default_dispense_flow_rate: microliters_per_second(57.0),
    default_blowout_flow_rate: microliters_per_second(57.0),
};

pub const P1000_SINGLE_FLEX_TRAITS: PipetteTraits = PipetteTraits {
    channels: 1,
    min_volume: microliters(5.0),
    max_volume: microliters(1000.0),
    default_aspirate_flow_rate: microliters_per_second(160.0),
    default_dispense_flow_rate: microliters_per_second(160.0),
    default_blowout_flow_rate: microliters_per_second(80.0),
};

pub const P50_MULTI_FLEX_TRAITS: PipetteTraits = PipetteTraits {
    channels: 8,
    min_volume: microliters(1.0),
    max_volume: microliters(50.0),
    default_aspirate_flow_rate: microliters_per_second(35.0),
    default_dispense_flow_rate: microliters_per_second(57.0),
    default_blowout_flow_rate: microliters_per_second(57.0),
};

pub const P1000_MULTI_FLEX_TRAITS: PipetteTraits = PipetteTraits {
    channels: 8,
    min_volume: microliters(5.0),
    max_volume: microliters(1000.0),
    default_aspirate_flow_rate: microliters_per_second(160.0),
    default_dispense_flow_rate: microliters_per_second(160.0),
    default_blowout_flow_rate: microliters_per_second(80.0),
};

pub const P1000_96_TRAITS: PipetteTraits = PipetteTraits {
    channels: 96,
    min_volume: microliters(5.0),
    max_volume: microliters(1000.0),
    default_aspirate_flow_rate: microliters_per_second(160.0),
    default_dispense_flow_rate: microliters_per_second(160.0),
    default_blowout_flow_rate: microliters_per_second(80.0),
};

// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Atomic robot commands, serialized as `{"commandType": ..., "params": {...}}`.

use pd_common::ids::{LabwareId, ModuleId, PipetteId};
use pd_units::{
    Celsius, Duration, FlowRate, Length, Microliters, MicrolitersPerSecond, Millimeters, Seconds,
    Temperature, Volume,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Offset {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Offset {
    pub const fn z(z: f64) -> Self {
        Self { x: 0.0, y: 0.0, z }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WellOrigin {
    Top,
    Bottom,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WellLocation {
    pub origin: WellOrigin,
    pub offset: Offset,
}

impl WellLocation {
    pub const fn from_bottom(z: f64) -> Self {
        Self {
            origin: WellOrigin::Bottom,
            offset: Offset::z(z),
        }
    }

    pub const fn from_top(z: f64) -> Self {
        Self {
            origin: WellOrigin::Top,
            offset: Offset::z(z),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickUpTipParams {
    pub pipette_id: PipetteId,
    pub labware_id: LabwareId,
    pub well_name: String,
}

/// Parameters shared by aspirate and dispense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AspDispParams {
    pub pipette_id: PipetteId,
    pub volume: Volume<Microliters>,
    pub labware_id: LabwareId,
    pub well_name: String,
    pub well_location: WellLocation,
    pub flow_rate: FlowRate<MicrolitersPerSecond>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlowOutParams {
    pub pipette_id: PipetteId,
    pub labware_id: LabwareId,
    pub well_name: String,
    pub well_location: WellLocation,
    pub flow_rate: FlowRate<MicrolitersPerSecond>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlowOutInPlaceParams {
    pub pipette_id: PipetteId,
    pub flow_rate: FlowRate<MicrolitersPerSecond>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TouchTipParams {
    pub pipette_id: PipetteId,
    pub labware_id: LabwareId,
    pub well_name: String,
    pub well_location: WellLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropTipParams {
    pub pipette_id: PipetteId,
    pub labware_id: LabwareId,
    pub well_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipetteParams {
    pub pipette_id: PipetteId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveToAddressableAreaParams {
    pub pipette_id: PipetteId,
    pub addressable_area_name: String,
    pub offset: Offset,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveToAddressableAreaForDropTipParams {
    pub pipette_id: PipetteId,
    pub addressable_area_name: String,
    pub offset: Offset,
    /// Let the robot alternate the drop position inside the area.
    pub alternate_drop_location: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitForDurationParams {
    pub seconds: Duration<Seconds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitForResumeParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleParams {
    pub module_id: ModuleId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureParams {
    pub module_id: ModuleId,
    pub celsius: Temperature<Celsius>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MagnetEngageParams {
    pub module_id: ModuleId,
    pub height: Length<Millimeters>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShakeSpeedParams {
    pub module_id: ModuleId,
    pub rpm: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "commandType", content = "params", rename_all = "camelCase")]
pub enum Command {
    PickUpTip(PickUpTipParams),
    Aspirate(AspDispParams),
    Dispense(AspDispParams),
    #[serde(rename = "blowout")]
    BlowOut(BlowOutParams),
    BlowOutInPlace(BlowOutInPlaceParams),
    TouchTip(TouchTipParams),
    DropTip(DropTipParams),
    DropTipInPlace(PipetteParams),
    MoveToAddressableArea(MoveToAddressableAreaParams),
    MoveToAddressableAreaForDropTip(MoveToAddressableAreaForDropTipParams),
    WaitForDuration(WaitForDurationParams),
    WaitForResume(WaitForResumeParams),
    #[serde(rename = "temperatureModule/setTargetTemperature")]
    TemperatureModuleSetTargetTemperature(TemperatureParams),
    #[serde(rename = "temperatureModule/waitForTemperature")]
    TemperatureModuleWaitForTemperature(TemperatureParams),
    #[serde(rename = "temperatureModule/deactivate")]
    TemperatureModuleDeactivate(ModuleParams),
    #[serde(rename = "magneticModule/engage")]
    MagneticModuleEngage(MagnetEngageParams),
    #[serde(rename = "magneticModule/disengage")]
    MagneticModuleDisengage(ModuleParams),
    #[serde(rename = "heaterShaker/openLabwareLatch")]
    HeaterShakerOpenLabwareLatch(ModuleParams),
    #[serde(rename = "heaterShaker/closeLabwareLatch")]
    HeaterShakerCloseLabwareLatch(ModuleParams),
    #[serde(rename = "heaterShaker/setTargetTemperature")]
    HeaterShakerSetTargetTemperature(TemperatureParams),
    #[serde(rename = "heaterShaker/deactivateHeater")]
    HeaterShakerDeactivateHeater(ModuleParams),
    #[serde(rename = "heaterShaker/setAndWaitForShakeSpeed")]
    HeaterShakerSetAndWaitForShakeSpeed(ShakeSpeedParams),
    #[serde(rename = "heaterShaker/deactivateShaker")]
    HeaterShakerDeactivateShaker(ModuleParams),
}

impl Command {
    /// The `commandType` the command is serialized with.
    pub fn command_type(&self) -> &'static str {
        match self {
            Command::PickUpTip(_) => "pickUpTip",
            Command::Aspirate(_) => "aspirate",
            Command::Dispense(_) => "dispense",
            Command::BlowOut(_) => "blowout",
            Command::BlowOutInPlace(_) => "blowOutInPlace",
            Command::TouchTip(_) => "touchTip",
            Command::DropTip(_) => "dropTip",
            Command::DropTipInPlace(_) => "dropTipInPlace",
            Command::MoveToAddressableArea(_) => "moveToAddressableArea",
            Command::MoveToAddressableAreaForDropTip(_) => "moveToAddressableAreaForDropTip",
            Command::WaitForDuration(_) => "waitForDuration",
            Command::WaitForResume(_) => "waitForResume",
            Command::TemperatureModuleSetTargetTemperature(_) => {
                "temperatureModule/setTargetTemperature"
            }
            Command::TemperatureModuleWaitForTemperature(_) => {
                "temperatureModule/waitForTemperature"
            }
            Command::TemperatureModuleDeactivate(_) => "temperatureModule/deactivate",
            Command::MagneticModuleEngage(_) => "magneticModule/engage",
            Command::MagneticModuleDisengage(_) => "magneticModule/disengage",
            Command::HeaterShakerOpenLabwareLatch(_) => "heaterShaker/openLabwareLatch",
            Command::HeaterShakerCloseLabwareLatch(_) => "heaterShaker/closeLabwareLatch",
            Command::HeaterShakerSetTargetTemperature(_) => "heaterShaker/setTargetTemperature",
            Command::HeaterShakerDeactivateHeater(_) => "heaterShaker/deactivateHeater",
            Command::HeaterShakerSetAndWaitForShakeSpeed(_) => {
                "heaterShaker/setAndWaitForShakeSpeed"
            }
            Command::HeaterShakerDeactivateShaker(_) => "heaterShaker/deactivateShaker",
        }
    }

    /// The pipette the command moves, if any.
    pub fn pipette_id(&self) -> Option<&PipetteId> {
        match self {
            Command::PickUpTip(p) => Some(&p.pipette_id),
            Command::Aspirate(p) | Command::Dispense(p) => Some(&p.pipette_id),
            Command::BlowOut(p) => Some(&p.pipette_id),
            Command::BlowOutInPlace(p) => Some(&p.pipette_id),
            Command::TouchTip(p) => Some(&p.pipette_id),
            Command::DropTip(p) => Some(&p.pipette_id),
            Command::DropTipInPlace(p) => Some(&p.pipette_id),
            Command::MoveToAddressableArea(p) => Some(&p.pipette_id),
            Command::MoveToAddressableAreaForDropTip(p) => Some(&p.pipette_id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pd_units::{celsius, microliters, microliters_per_second};
    use serde_json::json;

    #[test]
    fn test_serialize_aspirate() {
        let command = Command::Aspirate(AspDispParams {
            pipette_id: "p300".into(),
            volume: microliters(50.0),
            labware_id: "plate".into(),
            well_name: "A1".to_string(),
            well_location: WellLocation::from_bottom(1.0),
            flow_rate: microliters_per_second(92.86),
        });
        assert_eq!(
            serde_json::to_value(&command).unwrap(),
            json!({
                "commandType": "aspirate",
                "params": {
                    "pipetteId": "p300",
                    "volume": 50.0,
                    "labwareId": "plate",
                    "wellName": "A1",
                    "wellLocation": {"origin": "bottom", "offset": {"x": 0.0, "y": 0.0, "z": 1.0}},
                    "flowRate": 92.86
                }
            })
        );
    }

    #[test]
    fn test_command_type_matches_serialized_name() {
        let commands = [
            Command::BlowOutInPlace(BlowOutInPlaceParams {
                pipette_id: "p".into(),
                flow_rate: microliters_per_second(10.0),
            }),
            Command::DropTipInPlace(PipetteParams {
                pipette_id: "p".into(),
            }),
            Command::HeaterShakerSetTargetTemperature(TemperatureParams {
                module_id: "hs".into(),
                celsius: celsius(37.0),
            }),
            Command::WaitForResume(WaitForResumeParams { message: None }),
        ];
        for command in commands {
            let value = serde_json::to_value(&command).unwrap();
            assert_eq!(value["commandType"], command.command_type());
        }
    }

    #[test]
    fn test_deserialize_round_trip_of_module_command() {
        let json = r#"{"commandType": "magneticModule/engage", "params": {"moduleId": "mag", "height": 10.5}}"#;
        let command: Command = serde_json::from_str(json).unwrap();
        assert_eq!(command.command_type(), "magneticModule/engage");
        assert_eq!(command.pipette_id(), None);
    }
}

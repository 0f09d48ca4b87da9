// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! String identifiers assigned by the protocol designer.
//!
//! Each entity kind gets its own newtype so that a labware id can not be used to look
//! up a pipette.

#[macro_export]
macro_rules! string_uid {
    ($t:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $t(pub String);

        impl $t {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $t {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $t {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl std::fmt::Display for $t {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_uid!(PipetteId);
string_uid!(LabwareId);
string_uid!(ModuleId);
string_uid!(AdditionalEquipmentId);
string_uid!(StepId);
string_uid!(LiquidId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uid_conversions() {
        let id = PipetteId::from("pipette-1");
        assert_eq!(id.as_str(), "pipette-1");
        assert_eq!(id.to_string(), "pipette-1");
        assert_eq!(id, PipetteId("pipette-1".to_string()));
    }

    #[test]
    fn test_uid_serializes_transparently() {
        let id = LabwareId::from("plate");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"plate\"");
        let parsed: LabwareId = serde_json::from_str("\"plate\"").unwrap();
        assert_eq!(parsed, id);
    }
}

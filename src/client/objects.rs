//! TripIt travel object kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Every object kind the v1 API can list or fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    Air,
    Activity,
    Car,
    Parking,
    Cruise,
    Directions,
    Lodging,
    Map,
    Note,
    PointsProgram,
    Profile,
    Rail,
    Restaurant,
    Transport,
    Trip,
    Weather,
}

impl ObjectType {
    pub const ALL: [ObjectType; 16] = [
        ObjectType::Air,
        ObjectType::Activity,
        ObjectType::Car,
        ObjectType::Parking,
        ObjectType::Cruise,
        ObjectType::Directions,
        ObjectType::Lodging,
        ObjectType::Map,
        ObjectType::Note,
        ObjectType::PointsProgram,
        ObjectType::Profile,
        ObjectType::Rail,
        ObjectType::Restaurant,
        ObjectType::Transport,
        ObjectType::Trip,
        ObjectType::Weather,
    ];

    /// Path token used in API endpoints.
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Air => "air",
            ObjectType::Activity => "activity",
            ObjectType::Car => "car",
            ObjectType::Parking => "parking",
            ObjectType::Cruise => "cruise",
            ObjectType::Directions => "directions",
            ObjectType::Lodging => "lodging",
            ObjectType::Map => "map",
            ObjectType::Note => "note",
            ObjectType::PointsProgram => "points_program",
            ObjectType::Profile => "profile",
            ObjectType::Rail => "rail",
            ObjectType::Restaurant => "restaurant",
            ObjectType::Transport => "transport",
            ObjectType::Trip => "trip",
            ObjectType::Weather => "weather",
        }
    }

    /// Payload key for create/replace bodies. `None` for read-only kinds.
    pub fn payload_key(&self) -> Option<&'static str> {
        match self {
            ObjectType::Air => Some("AirObject"),
            ObjectType::Lodging => Some("LodgingObject"),
            ObjectType::Car => Some("CarObject"),
            ObjectType::Rail => Some("RailObject"),
            ObjectType::Restaurant => Some("RestaurantObject"),
            ObjectType::Activity => Some("ActivityObject"),
            ObjectType::Note => Some("NoteObject"),
            ObjectType::Directions => Some("DirectionsObject"),
            ObjectType::Cruise => Some("CruiseObject"),
            ObjectType::Transport => Some("TransportObject"),
            ObjectType::Map => Some("MapObject"),
            ObjectType::Parking => Some("ParkingObject"),
            ObjectType::PointsProgram
            | ObjectType::Profile
            | ObjectType::Trip
            | ObjectType::Weather => None,
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown object type token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown object type: {0}")]
pub struct UnknownObjectType(pub String);

impl FromStr for ObjectType {
    type Err = UnknownObjectType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownObjectType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_token() {
        for object_type in ObjectType::ALL {
            assert_eq!(object_type.as_str().parse::<ObjectType>().unwrap(), object_type);
            let json = serde_json::to_value(object_type).unwrap();
            assert_eq!(json, serde_json::Value::String(object_type.as_str().into()));
        }
    }

    #[test]
    fn test_irregular_payload_keys() {
        assert_eq!(ObjectType::Air.payload_key(), Some("AirObject"));
        assert_eq!(ObjectType::Lodging.payload_key(), Some("LodgingObject"));
        assert_eq!(ObjectType::Directions.payload_key(), Some("DirectionsObject"));
        assert_eq!(ObjectType::PointsProgram.payload_key(), None);
        assert_eq!(ObjectType::Weather.payload_key(), None);
    }

    #[test]
    fn test_unknown_token() {
        assert_eq!(
            "hotel".parse::<ObjectType>(),
            Err(UnknownObjectType("hotel".into()))
        );
    }
}

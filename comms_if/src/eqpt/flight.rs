//! # Flight State Feedback

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Flight state as reported by the vehicle's autopilot.
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlyingState {
    Landed,
    TakingOff,
    Hovering,
    Flying,
    Landing,
    Emergency,
    /// Takeoff was started by the operator rather than the flight software
    UserTakeoff,
    Unknown,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl FlyingState {
    /// True if the vehicle is holding or moving in the air.
    pub fn is_airborne(&self) -> bool {
        matches!(self, FlyingState::Hovering | FlyingState::Flying)
    }

    /// True if the vehicle is in the process of leaving the ground.
    pub fn is_taking_off(&self) -> bool {
        matches!(self, FlyingState::TakingOff | FlyingState::UserTakeoff)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_wire_names() {
        assert_eq!(
            serde_json::to_string(&FlyingState::TakingOff).unwrap(),
            "\"TAKING_OFF\""
        );
        assert_eq!(
            serde_json::from_str::<FlyingState>("\"LANDED\"").unwrap(),
            FlyingState::Landed
        );
    }

    #[test]
    fn test_classification() {
        assert!(FlyingState::Hovering.is_airborne());
        assert!(FlyingState::Flying.is_airborne());
        assert!(!FlyingState::Landing.is_airborne());
        assert!(FlyingState::UserTakeoff.is_taking_off());
        assert!(!FlyingState::Landed.is_taking_off());
    }
}

use serde::{Deserialize, Serialize};

/// Lifecycle states of a shipment. `Void` marks external deletion; nothing
/// in receiving may touch a void shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    Draft,
    PartialReceived,
    Complete,
    Void,
}

impl ShipmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentStatus::Draft => "draft",
            ShipmentStatus::PartialReceived => "partial_received",
            ShipmentStatus::Complete => "complete",
            ShipmentStatus::Void => "void",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(ShipmentStatus::Draft),
            "partial_received" => Some(ShipmentStatus::PartialReceived),
            "complete" => Some(ShipmentStatus::Complete),
            "void" => Some(ShipmentStatus::Void),
            _ => None,
        }
    }

    /// Whether a receive submission may run against a shipment in this state.
    pub fn accepts_submission(&self) -> bool {
        matches!(self, ShipmentStatus::Draft | ShipmentStatus::PartialReceived)
    }

    /// Legal status transitions. Unlock is the only path out of `Complete`;
    /// repeated partial rounds stay in `PartialReceived`.
    pub fn can_transition_to(&self, to: ShipmentStatus) -> bool {
        use ShipmentStatus::*;
        match (*self, to) {
            (Draft, PartialReceived) => true,
            (Draft, Complete) => true,
            (PartialReceived, PartialReceived) => true,
            (PartialReceived, Complete) => true,
            // Unlock: correction path, line data survives.
            (Complete, Draft) => true,
            (Void, _) => false,
            _ => false,
        }
    }
}

impl std::fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::StatusKind;
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShipmentId(pub String);

/// Lifecycle of a government-arranged HHG shipment. Shipments cannot be
/// canceled on their own; see `ShipmentSummaryStatus`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipmentStatus {
    Draft,
    Submitted,
    Awarded,
    Accepted,
    Approved,
    InTransit,
    Delivered,
    Completed,
}

impl ShipmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Submitted => "SUBMITTED",
            Self::Awarded => "AWARDED",
            Self::Accepted => "ACCEPTED",
            Self::Approved => "APPROVED",
            Self::InTransit => "IN_TRANSIT",
            Self::Delivered => "DELIVERED",
            Self::Completed => "COMPLETED",
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Draft)
    }
}

impl FromStr for ShipmentStatus {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "DRAFT" => Ok(Self::Draft),
            "SUBMITTED" => Ok(Self::Submitted),
            "AWARDED" => Ok(Self::Awarded),
            "ACCEPTED" => Ok(Self::Accepted),
            "APPROVED" => Ok(Self::Approved),
            "IN_TRANSIT" => Ok(Self::InTransit),
            "DELIVERED" => Ok(Self::Delivered),
            "COMPLETED" => Ok(Self::Completed),
            other => Err(DomainError::UnknownStatus {
                kind: StatusKind::Shipment,
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentRecord {
    pub id: ShipmentId,
    #[serde(default)]
    pub status: Option<String>,
}

impl ShipmentRecord {
    pub fn new(id: impl Into<String>, status: Option<&str>) -> Self {
        Self { id: ShipmentId(id.into()), status: status.map(str::to_string) }
    }

    /// The shipment's own status when it is one of the active values.
    /// Drafts, unknown values and uninitialized records all yield `None`.
    pub fn active_status(&self) -> Option<ShipmentStatus> {
        self.status
            .as_deref()
            .and_then(|raw| raw.parse::<ShipmentStatus>().ok())
            .filter(ShipmentStatus::is_active)
    }
}

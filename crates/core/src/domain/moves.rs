use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::ppm::PpmRecord;
use crate::domain::shipment::ShipmentRecord;
use crate::domain::StatusKind;
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MoveId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrdersId(pub String);

impl fmt::Display for MoveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for OrdersId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How the service member chose to move their belongings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveType {
    #[serde(rename = "HHG")]
    Hhg,
    #[serde(rename = "PPM")]
    Ppm,
    #[serde(rename = "HHG_PPM", alias = "COMBO")]
    HhgPpm,
}

impl MoveType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hhg => "HHG",
            Self::Ppm => "PPM",
            Self::HhgPpm => "HHG_PPM",
        }
    }
}

impl FromStr for MoveType {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "HHG" => Ok(Self::Hhg),
            "PPM" => Ok(Self::Ppm),
            "HHG_PPM" | "COMBO" => Ok(Self::HhgPpm),
            other => Err(DomainError::InvariantViolation(format!(
                "unsupported move type `{other}` (expected HHG|PPM|HHG_PPM)"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MoveStatus {
    Draft,
    Submitted,
    Approved,
    Completed,
    Canceled,
}

impl MoveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Submitted => "SUBMITTED",
            Self::Approved => "APPROVED",
            Self::Completed => "COMPLETED",
            Self::Canceled => "CANCELED",
        }
    }
}

impl FromStr for MoveStatus {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "DRAFT" => Ok(Self::Draft),
            "SUBMITTED" => Ok(Self::Submitted),
            "APPROVED" => Ok(Self::Approved),
            "COMPLETED" => Ok(Self::Completed),
            "CANCELED" => Ok(Self::Canceled),
            other => Err(DomainError::UnknownStatus {
                kind: StatusKind::Move,
                value: other.to_string(),
            }),
        }
    }
}

/// A move as the data service returns it. Statuses stay raw until a
/// consumer parses them, so corrupt values surface where they are read.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub id: MoveId,
    pub orders_id: OrdersId,
    #[serde(default)]
    pub locator: Option<String>,
    pub status: String,
    #[serde(default)]
    pub selected_move_type: Option<MoveType>,
    #[serde(default)]
    pub ppm: Option<PpmRecord>,
    #[serde(default)]
    pub shipments: Vec<ShipmentRecord>,
}

impl MoveRecord {
    pub fn draft(id: MoveId, orders_id: OrdersId, locator: impl Into<String>) -> Self {
        Self {
            id,
            orders_id,
            locator: Some(locator.into()),
            status: MoveStatus::Draft.as_str().to_string(),
            selected_move_type: None,
            ppm: None,
            shipments: Vec::new(),
        }
    }

    pub fn status(&self) -> Result<MoveStatus, DomainError> {
        self.status.parse()
    }

    /// The first HHG shipment, which is the one the summary reports on.
    pub fn primary_shipment(&self) -> Option<&ShipmentRecord> {
        self.shipments.first()
    }
}

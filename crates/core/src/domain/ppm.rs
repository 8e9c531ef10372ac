use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::moves::MoveStatus;
use crate::domain::StatusKind;
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PpmId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PpmStatus {
    Draft,
    Submitted,
    Approved,
    PaymentRequested,
    Completed,
    Canceled,
}

impl PpmStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Submitted => "SUBMITTED",
            Self::Approved => "APPROVED",
            Self::PaymentRequested => "PAYMENT_REQUESTED",
            Self::Completed => "COMPLETED",
            Self::Canceled => "CANCELED",
        }
    }
}

impl FromStr for PpmStatus {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "DRAFT" => Ok(Self::Draft),
            "SUBMITTED" => Ok(Self::Submitted),
            "APPROVED" => Ok(Self::Approved),
            "PAYMENT_REQUESTED" => Ok(Self::PaymentRequested),
            "COMPLETED" => Ok(Self::Completed),
            "CANCELED" => Ok(Self::Canceled),
            other => Err(DomainError::UnknownStatus {
                kind: StatusKind::Ppm,
                value: other.to_string(),
            }),
        }
    }
}

/// A single-leg move stands in for its PPM, so every move status has a
/// PPM counterpart.
impl From<MoveStatus> for PpmStatus {
    fn from(status: MoveStatus) -> Self {
        match status {
            MoveStatus::Draft => Self::Draft,
            MoveStatus::Submitted => Self::Submitted,
            MoveStatus::Approved => Self::Approved,
            MoveStatus::Completed => Self::Completed,
            MoveStatus::Canceled => Self::Canceled,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PpmRecord {
    pub id: PpmId,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub planned_move_date: Option<NaiveDate>,
}

impl PpmRecord {
    /// An absent status means the PPM leg has not been submitted yet.
    pub fn status(&self) -> Result<PpmStatus, DomainError> {
        match self.status.as_deref() {
            None => Ok(PpmStatus::Draft),
            Some(raw) => raw.parse(),
        }
    }

    /// The move counts as under way from its planned date onwards. Without a
    /// planned date there is nothing to wait for.
    pub fn move_in_progress(&self, today: NaiveDate) -> bool {
        self.planned_move_date.map_or(true, |planned| planned <= today)
    }
}

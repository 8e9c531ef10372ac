use serde::{Deserialize, Serialize};

use crate::domain::moves::{MoveStatus, MoveType};
use crate::domain::ppm::PpmStatus;
use crate::domain::shipment::{ShipmentRecord, ShipmentStatus};

/// Status the HHG summary is drawn from. Cancellation applies to the whole
/// move, so it only exists here and not on the shipment itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipmentSummaryStatus {
    Canceled,
    #[serde(untagged)]
    Shipment(ShipmentStatus),
}

impl ShipmentSummaryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Canceled => "CANCELED",
            Self::Shipment(status) => status.as_str(),
        }
    }
}

/// A combo move's PPM leg keeps its own lifecycle. Otherwise the move status
/// stands in for the PPM, except that an approved move reports a PPM that is
/// still a draft or submitted as submitted.
pub fn effective_ppm_status(
    move_status: MoveStatus,
    ppm_status: PpmStatus,
    move_type: Option<MoveType>,
) -> PpmStatus {
    if move_type == Some(MoveType::HhgPpm) {
        return ppm_status;
    }

    match (move_status, ppm_status) {
        (MoveStatus::Approved, PpmStatus::Submitted | PpmStatus::Draft) => PpmStatus::Submitted,
        (move_status, _) => PpmStatus::from(move_status),
    }
}

pub fn effective_shipment_status(
    move_status: MoveStatus,
    shipment: Option<&ShipmentRecord>,
) -> ShipmentSummaryStatus {
    if move_status == MoveStatus::Canceled {
        return ShipmentSummaryStatus::Canceled;
    }

    let status = shipment.and_then(ShipmentRecord::active_status).unwrap_or(ShipmentStatus::Draft);
    ShipmentSummaryStatus::Shipment(status)
}

/// Status an office queue lists a move under. A PPM waiting on payment is
/// surfaced ahead of the move's own status.
pub fn queue_status(move_status: MoveStatus, ppm_status: Option<PpmStatus>) -> &'static str {
    match ppm_status {
        Some(PpmStatus::PaymentRequested) => PpmStatus::PaymentRequested.as_str(),
        _ => move_status.as_str(),
    }
}

/// HHG is the legacy default, so anything other than a pure PPM move shows it.
pub fn shows_hhg_summary(move_type: Option<MoveType>) -> bool {
    let is_hhg = move_type == Some(MoveType::Hhg);
    let is_ppm = move_type == Some(MoveType::Ppm);
    let is_combo = move_type == Some(MoveType::HhgPpm);
    is_hhg || is_combo || (!is_hhg && !is_ppm)
}

pub fn shows_ppm_summary(move_type: Option<MoveType>) -> bool {
    matches!(move_type, Some(MoveType::Ppm | MoveType::HhgPpm))
}

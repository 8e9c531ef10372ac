use serde::{Deserialize, Serialize};

use crate::domain::ppm::PpmStatus;
use crate::domain::shipment::ShipmentStatus;
use crate::summary::status::ShipmentSummaryStatus;

/// Maps effective statuses to views. Implementations match exhaustively, so
/// a status added without a view fails to compile.
pub trait SummaryViews {
    type View;

    /// `move_in_progress` only matters for an approved PPM whose planned
    /// move date has arrived.
    fn ppm_view(&self, status: PpmStatus, move_in_progress: bool) -> Self::View;

    fn shipment_view(&self, status: ShipmentSummaryStatus) -> Self::View;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryView {
    CanceledMove,
    PpmDraft,
    PpmSubmitted,
    PpmApproved,
    PpmInProgress,
    PpmPaymentRequested,
    PpmCompleted,
    HhgDraft,
    HhgSubmitted,
    HhgApproved,
    HhgInTransit,
    HhgDelivered,
}

impl SummaryView {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CanceledMove => "canceled_move",
            Self::PpmDraft => "ppm_draft",
            Self::PpmSubmitted => "ppm_submitted",
            Self::PpmApproved => "ppm_approved",
            Self::PpmInProgress => "ppm_in_progress",
            Self::PpmPaymentRequested => "ppm_payment_requested",
            Self::PpmCompleted => "ppm_completed",
            Self::HhgDraft => "hhg_draft",
            Self::HhgSubmitted => "hhg_submitted",
            Self::HhgApproved => "hhg_approved",
            Self::HhgInTransit => "hhg_in_transit",
            Self::HhgDelivered => "hhg_delivered",
        }
    }

    pub fn headline(&self) -> &'static str {
        match self {
            Self::CanceledMove => "New move",
            Self::PpmDraft | Self::HhgDraft => "Next Step: Finish setting up your move",
            Self::PpmSubmitted | Self::HhgSubmitted => "Next Step: Awaiting approval",
            Self::PpmApproved | Self::HhgApproved => "Next step: Get ready to move",
            Self::PpmInProgress => "Next step: Request Payment",
            Self::PpmPaymentRequested => "Next step: Wait for your payment",
            Self::PpmCompleted => "Your PPM is complete",
            Self::HhgInTransit => "Your belongings are on the way",
            Self::HhgDelivered => "Your shipment has been delivered",
        }
    }

    pub fn call_to_action(&self) -> Option<&'static str> {
        match self {
            Self::CanceledMove => Some("Start here"),
            Self::PpmDraft | Self::HhgDraft => Some("Continue Move Setup"),
            Self::PpmSubmitted => Some("Find Weight Scales"),
            Self::PpmApproved | Self::PpmInProgress => Some("Request Payment"),
            Self::PpmPaymentRequested
            | Self::PpmCompleted
            | Self::HhgSubmitted
            | Self::HhgApproved
            | Self::HhgInTransit
            | Self::HhgDelivered => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct StandardSummaryViews;

impl SummaryViews for StandardSummaryViews {
    type View = SummaryView;

    fn ppm_view(&self, status: PpmStatus, move_in_progress: bool) -> SummaryView {
        match status {
            PpmStatus::Draft => SummaryView::PpmDraft,
            PpmStatus::Submitted => SummaryView::PpmSubmitted,
            PpmStatus::Approved if move_in_progress => SummaryView::PpmInProgress,
            PpmStatus::Approved => SummaryView::PpmApproved,
            PpmStatus::PaymentRequested => SummaryView::PpmPaymentRequested,
            PpmStatus::Completed => SummaryView::PpmCompleted,
            PpmStatus::Canceled => SummaryView::CanceledMove,
        }
    }

    fn shipment_view(&self, status: ShipmentSummaryStatus) -> SummaryView {
        match status {
            ShipmentSummaryStatus::Canceled => SummaryView::CanceledMove,
            ShipmentSummaryStatus::Shipment(shipment) => match shipment {
                ShipmentStatus::Draft => SummaryView::HhgDraft,
                ShipmentStatus::Submitted | ShipmentStatus::Awarded | ShipmentStatus::Accepted => {
                    SummaryView::HhgSubmitted
                }
                ShipmentStatus::Approved => SummaryView::HhgApproved,
                ShipmentStatus::InTransit => SummaryView::HhgInTransit,
                ShipmentStatus::Delivered | ShipmentStatus::Completed => SummaryView::HhgDelivered,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{StandardSummaryViews, SummaryView, SummaryViews};
    use crate::domain::ppm::PpmStatus;
    use crate::domain::shipment::ShipmentStatus;
    use crate::summary::status::ShipmentSummaryStatus;

    #[test]
    fn cancellation_renders_the_new_move_view_for_both_legs() {
        let views = StandardSummaryViews;
        assert_eq!(views.ppm_view(PpmStatus::Canceled, true), SummaryView::CanceledMove);
        assert_eq!(views.shipment_view(ShipmentSummaryStatus::Canceled), SummaryView::CanceledMove);
        assert_eq!(SummaryView::CanceledMove.call_to_action(), Some("Start here"));
    }

    #[test]
    fn awaiting_award_statuses_share_the_submitted_view() {
        let views = StandardSummaryViews;
        for status in [ShipmentStatus::Submitted, ShipmentStatus::Awarded, ShipmentStatus::Accepted]
        {
            assert_eq!(
                views.shipment_view(ShipmentSummaryStatus::Shipment(status)),
                SummaryView::HhgSubmitted
            );
        }
    }

    #[test]
    fn ppm_views_follow_the_ppm_lifecycle() {
        let views = StandardSummaryViews;
        assert_eq!(views.ppm_view(PpmStatus::Draft, false), SummaryView::PpmDraft);
        assert_eq!(views.ppm_view(PpmStatus::Submitted, false), SummaryView::PpmSubmitted);
        assert_eq!(views.ppm_view(PpmStatus::Approved, false), SummaryView::PpmApproved);
        assert_eq!(
            views.ppm_view(PpmStatus::PaymentRequested, false),
            SummaryView::PpmPaymentRequested
        );
        assert_eq!(SummaryView::PpmSubmitted.headline(), "Next Step: Awaiting approval");
    }

    #[test]
    fn approved_ppm_under_way_skips_the_get_ready_step() {
        let views = StandardSummaryViews;
        assert_eq!(views.ppm_view(PpmStatus::Approved, true), SummaryView::PpmInProgress);
        assert_eq!(views.ppm_view(PpmStatus::Submitted, true), SummaryView::PpmSubmitted);

        assert_eq!(SummaryView::PpmApproved.headline(), "Next step: Get ready to move");
        assert_eq!(SummaryView::PpmInProgress.headline(), "Next step: Request Payment");
        assert_eq!(SummaryView::PpmInProgress.call_to_action(), Some("Request Payment"));
    }
}

use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::audit::{AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink};
use crate::domain::moves::{MoveId, MoveRecord, MoveStatus, MoveType};
use crate::domain::ppm::PpmStatus;
use crate::errors::DomainError;
use crate::summary::status::{
    effective_ppm_status, effective_shipment_status, queue_status, shows_hhg_summary,
    shows_ppm_summary, ShipmentSummaryStatus,
};
use crate::summary::views::{StandardSummaryViews, SummaryViews};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LegSummary<V> {
    pub status: &'static str,
    pub view: V,
}

/// What the move summary screen shows for one move.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MoveSummaryPlan<V> {
    pub move_id: MoveId,
    pub locator: Option<String>,
    pub move_status: MoveStatus,
    pub move_type: Option<MoveType>,
    /// Status an office queue lists the move under.
    pub queue_status: &'static str,
    pub hhg: Option<LegSummary<V>>,
    pub ppm: Option<LegSummary<V>>,
    pub edit_move_enabled: bool,
}

pub struct MoveSummaryDispatcher<V> {
    views: V,
}

impl<V> MoveSummaryDispatcher<V>
where
    V: SummaryViews,
{
    pub fn new(views: V) -> Self {
        Self { views }
    }

    pub fn dispatch(&self, record: &MoveRecord) -> Result<MoveSummaryPlan<V::View>, DomainError> {
        self.dispatch_on(record, Local::now().date_naive())
    }

    /// Dispatches as of `today`, which decides whether an approved PPM is
    /// already under way.
    pub fn dispatch_on(
        &self,
        record: &MoveRecord,
        today: NaiveDate,
    ) -> Result<MoveSummaryPlan<V::View>, DomainError> {
        let move_status = record.status()?;
        let move_type = record.selected_move_type;

        let hhg = if shows_hhg_summary(move_type) {
            let status = effective_shipment_status(move_status, record.primary_shipment());
            Some(self.shipment_leg(status))
        } else {
            None
        };

        let mut shown_ppm_status = None;
        let ppm = if shows_ppm_summary(move_type) {
            let ppm_status = match &record.ppm {
                Some(ppm) => ppm.status()?,
                None => PpmStatus::Draft,
            };
            shown_ppm_status = Some(ppm_status);
            let in_progress = record.ppm.as_ref().is_some_and(|ppm| ppm.move_in_progress(today));
            let status = effective_ppm_status(move_status, ppm_status, move_type);
            let view = self.views.ppm_view(status, in_progress);
            Some(LegSummary { status: status.as_str(), view })
        } else {
            None
        };

        Ok(MoveSummaryPlan {
            move_id: record.id.clone(),
            locator: record.locator.clone(),
            move_status,
            move_type,
            queue_status: queue_status(move_status, shown_ppm_status),
            hhg,
            ppm,
            edit_move_enabled: move_status != MoveStatus::Draft,
        })
    }

    pub fn dispatch_with_audit<S>(
        &self,
        record: &MoveRecord,
        sink: &S,
        audit: &AuditContext,
    ) -> Result<MoveSummaryPlan<V::View>, DomainError>
    where
        S: AuditSink,
    {
        let result = self.dispatch(record);
        match &result {
            Ok(plan) => sink.emit(
                AuditEvent::from_context(
                    audit,
                    "summary.dispatched",
                    AuditCategory::Summary,
                    AuditOutcome::Success,
                )
                .with_metadata("move_status", plan.move_status.as_str())
                .with_metadata("queue_status", plan.queue_status)
                .with_metadata("hhg", plan.hhg.as_ref().map_or("hidden", |leg| leg.status))
                .with_metadata("ppm", plan.ppm.as_ref().map_or("hidden", |leg| leg.status)),
            ),
            Err(error) => sink.emit(
                AuditEvent::from_context(
                    audit,
                    "summary.unknown_status",
                    AuditCategory::Summary,
                    AuditOutcome::Failed,
                )
                .with_metadata("error", error.to_string()),
            ),
        }
        result
    }

    fn shipment_leg(&self, status: ShipmentSummaryStatus) -> LegSummary<V::View> {
        LegSummary { status: status.as_str(), view: self.views.shipment_view(status) }
    }
}

impl Default for MoveSummaryDispatcher<StandardSummaryViews> {
    fn default() -> Self {
        Self::new(StandardSummaryViews)
    }
}

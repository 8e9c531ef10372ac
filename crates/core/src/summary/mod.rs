pub mod dispatcher;
pub mod status;
pub mod views;

pub use dispatcher::{LegSummary, MoveSummaryDispatcher, MoveSummaryPlan};
pub use status::{
    effective_ppm_status, effective_shipment_status, queue_status, shows_hhg_summary,
    shows_ppm_summary, ShipmentSummaryStatus,
};
pub use views::{StandardSummaryViews, SummaryView, SummaryViews};

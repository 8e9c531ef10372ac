pub mod audit;
pub mod config;
pub mod data;
pub mod domain;
pub mod errors;
pub mod flows;
pub mod summary;

pub use audit::{AuditContext, AuditEvent, AuditSink, InMemoryAuditSink};
pub use data::{DataServiceError, InMemoryMoveService, MoveDataService};
pub use domain::moves::{MoveId, MoveRecord, MoveStatus, MoveType, OrdersId};
pub use domain::ppm::{PpmRecord, PpmStatus};
pub use domain::shipment::{ShipmentRecord, ShipmentStatus};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use flows::{FlowState, FlowTable, PageKey, PageRenderer, Route, RouteHandler, WizardPage};
pub use summary::{MoveSummaryDispatcher, MoveSummaryPlan, SummaryView};

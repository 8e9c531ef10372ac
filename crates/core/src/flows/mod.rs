pub mod navigation;
pub mod pages;
pub mod path;
pub mod router;
pub mod state;

pub use navigation::{Navigation, SubmitAction, WizardPage};
pub use pages::{InFlowRule, PageDescriptor, PageKey, PageView, SubmitBehavior};
pub use path::{PathParams, PathPattern};
pub use router::{FlowTable, PageRenderer, Route, RouteHandler};
pub use state::FlowState;

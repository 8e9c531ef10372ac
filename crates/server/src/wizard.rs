//! Wizard routes for the service member move flow.
//!
//! HTML Endpoints (one pair per declared wizard path):
//! - `GET  <page path>`                       render the page, or the missing-context page
//! - `POST <page path>`                       submit the page and report where to go next
//!
//! JSON API Endpoints:
//! - `POST /api/v1/sessions`                  start a wizard session from a flow state
//! - `GET  /api/v1/sessions/{session_id}`     read a session's state and in-flow pages
//! - `PUT  /api/v1/sessions/{session_id}`     replace a session's state
//! - `DELETE /api/v1/sessions/{session_id}`   end a session and release its slot
//! - `GET  /api/v1/wizard/pages`              in-flow pages and navigation for the caller
//! - `GET  /api/v1/moves/{move_id}/summary`   summary views for a move

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::{get, post, MethodRouter},
    Json, Router,
};
use mymove_core::audit::{AuditContext, AuditEvent, AuditSink};
use mymove_core::data::MoveDataService;
use mymove_core::domain::moves::{MoveId, MoveStatus, MoveType};
use mymove_core::errors::{ApplicationError, DomainError, InterfaceError};
use mymove_core::flows::{
    FlowState, FlowTable, Navigation, PageKey, PageRenderer, PageView, PathParams, SubmitAction,
    WizardPage,
};
use mymove_core::summary::{
    LegSummary, MoveSummaryDispatcher, MoveSummaryPlan, StandardSummaryViews, SummaryView,
};
use serde::{Deserialize, Serialize};
use tera::{Context, Tera};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::sessions::{SessionError, SessionLease, SessionStore};

const PAGE_TEMPLATE: &str = "wizard/page.html";
const MISSING_CONTEXT_TEMPLATE: &str = "wizard/missing_context.html";
const MISSING_CONTEXT_MESSAGE: &str = "You are trying to load a page that the system does not \
                                       have context for. Please go to the home page and try again.";

#[derive(Clone)]
pub struct WizardState {
    flows: Arc<FlowTable>,
    data: Arc<dyn MoveDataService>,
    sessions: SessionStore,
    templates: Arc<Tera>,
    dispatcher: Arc<MoveSummaryDispatcher<StandardSummaryViews>>,
    session_header: String,
}

impl WizardState {
    pub fn new(
        flows: Arc<FlowTable>,
        data: Arc<dyn MoveDataService>,
        sessions: SessionStore,
        session_header: impl Into<String>,
    ) -> Result<Self, tera::Error> {
        Ok(Self {
            flows,
            data,
            sessions,
            templates: init_templates()?,
            dispatcher: Arc::new(MoveSummaryDispatcher::default()),
            session_header: session_header.into(),
        })
    }

    fn session_id<'h>(&self, headers: &'h HeaderMap) -> Option<&'h str> {
        headers
            .get(self.session_header.as_str())
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    /// The caller's state when the header names a live session. Anything else
    /// falls back to an empty state.
    fn session(&self, headers: &HeaderMap) -> FlowState {
        self.session_id(headers).and_then(|id| self.sessions.get(id)).unwrap_or_default()
    }

    /// Like `session`, but holds the session until the lease is dropped so a
    /// read-modify-write cannot interleave with another one.
    async fn leased_session(&self, headers: &HeaderMap) -> (Option<SessionLease>, FlowState) {
        let lease = match self.session_id(headers) {
            Some(session_id) => self.sessions.lease(session_id).await,
            None => None,
        };
        let flow_state = lease.as_ref().and_then(|lease| self.sessions.get(lease.session_id()));
        match flow_state {
            Some(flow_state) => (lease, flow_state),
            None => (None, FlowState::default()),
        }
    }
}

/// Forwards audit events to the structured log.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn emit(&self, event: AuditEvent) {
        let move_id = event.move_id.as_ref().map_or("unknown", |move_id| move_id.0.as_str());
        info!(
            event_name = %event.event_type,
            correlation_id = %event.correlation_id,
            move_id = %move_id,
            actor = %event.actor,
            category = ?event.category,
            outcome = ?event.outcome,
            metadata = ?event.metadata,
            "audit event recorded"
        );
    }
}

#[derive(Debug, Error)]
pub enum WizardError {
    #[error(transparent)]
    Application(#[from] ApplicationError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("template rendering failed: {0}")]
    Template(#[from] tera::Error),
    #[error("no wizard page is declared at `{0}`")]
    UndeclaredPath(String),
    #[error("page `{0}` is not in flow for this wizard session")]
    OutOfFlow(PageKey),
}

impl From<DomainError> for WizardError {
    fn from(value: DomainError) -> Self {
        Self::Application(value.into())
    }
}

impl WizardError {
    fn into_interface(self, correlation_id: &str) -> InterfaceError {
        let message = self.to_string();
        let correlation_id = correlation_id.to_string();
        match self {
            Self::Application(error) => error.into_interface(correlation_id),
            Self::Session(SessionError::NotFound(_)) | Self::UndeclaredPath(_) => {
                InterfaceError::NotFound { message, correlation_id }
            }
            Self::Session(SessionError::LimitReached(_)) => {
                InterfaceError::ServiceUnavailable { message, correlation_id }
            }
            Self::OutOfFlow(_) => InterfaceError::Conflict { message, correlation_id },
            Self::Template(_) => InterfaceError::Internal { message, correlation_id },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub correlation_id: String,
}

#[derive(Debug)]
pub struct ApiError(InterfaceError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
            InterfaceError::Conflict { .. } => StatusCode::CONFLICT,
            InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            error: self.0.user_message(),
            correlation_id: self.0.correlation_id().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

fn reject(error: impl Into<WizardError>, correlation_id: &str) -> ApiError {
    let interface = error.into().into_interface(correlation_id);
    match &interface {
        InterfaceError::Internal { message, .. } => error!(
            event_name = "wizard.request.failed",
            correlation_id = %correlation_id,
            error = %message,
            "wizard request failed"
        ),
        other => warn!(
            event_name = "wizard.request.rejected",
            correlation_id = %correlation_id,
            error = %other,
            "wizard request rejected"
        ),
    }
    ApiError(interface)
}

fn undeclared(uri: &Uri, correlation_id: &str) -> ApiError {
    reject(WizardError::UndeclaredPath(uri.path().to_string()), correlation_id)
}

fn init_templates() -> Result<Arc<Tera>, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        (PAGE_TEMPLATE, include_str!("../templates/wizard/page.html")),
        (MISSING_CONTEXT_TEMPLATE, include_str!("../templates/wizard/missing_context.html")),
    ])?;
    Ok(Arc::new(tera))
}

pub fn router(state: WizardState) -> Router {
    let mut router = Router::new()
        .route("/api/v1/sessions", post(create_session))
        .route(
            "/api/v1/sessions/{session_id}",
            get(show_session).put(replace_session).delete(delete_session),
        )
        .route("/api/v1/wizard/pages", get(list_pages))
        .route("/api/v1/moves/{move_id}/summary", get(move_summary));

    // Patterns match with or without a trailing slash, so both forms are routed.
    for page in state.flows.pages() {
        let path = page.path.as_str().trim_end_matches('/');
        if path.is_empty() {
            router = router.route("/", page_methods());
            continue;
        }
        router = router.route(path, page_methods()).route(&format!("{path}/"), page_methods());
    }

    router.with_state(state)
}

fn page_methods() -> MethodRouter<WizardState> {
    get(show_page).post(submit_page)
}

struct TeraPageRenderer<'a> {
    templates: &'a Tera,
    params: &'a PathParams,
    current_path: &'a str,
}

impl TeraPageRenderer<'_> {
    fn link(
        &self,
        path: Result<Option<String>, DomainError>,
        direction: &'static str,
    ) -> Option<String> {
        match path {
            Ok(path) => path,
            Err(error) => {
                debug!(
                    event_name = "wizard.link.unbound",
                    direction,
                    error = %error,
                    "neighbour page needs context this session does not have yet"
                );
                None
            }
        }
    }
}

impl PageRenderer for TeraPageRenderer<'_> {
    type Output = Result<String, tera::Error>;

    fn render_page(&self, page: &WizardPage) -> Self::Output {
        let navigation = page.navigation();
        let mut context = Context::new();
        context.insert("key", page.key.as_str());
        context.insert("title", &page_title(page.key));
        context.insert("description", &page.description);
        context.insert("view", &page.view);
        context.insert("step", &navigation.position.map_or(0, |position| position + 1));
        context.insert("total", &navigation.total);
        context.insert("is_last", &navigation.is_last());
        context.insert("previous_href", &self.link(page.previous_path(self.params), "previous"));
        context.insert("next_href", &self.link(page.next_path(self.params), "next"));
        context.insert("pages", &page.pages);
        context.insert("current_path", self.current_path);
        self.templates.render(PAGE_TEMPLATE, &context)
    }

    fn render_missing_context(&self) -> Self::Output {
        let mut context = Context::new();
        context.insert("message", MISSING_CONTEXT_MESSAGE);
        self.templates.render(MISSING_CONTEXT_TEMPLATE, &context)
    }
}

fn page_title(key: PageKey) -> String {
    let words = key.as_str().replace('-', " ");
    let mut chars = words.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => words,
    }
}

async fn show_page(
    State(state): State<WizardState>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Html<String>, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();
    let flow_state = state.session(&headers);
    let audit = AuditContext::new(flow_state.move_id.clone(), correlation_id.as_str(), "wizard");

    let (route, params) = state
        .flows
        .resolve_with_audit(uri.path(), &flow_state, &TracingAuditSink, &audit)
        .ok_or_else(|| undeclared(&uri, &correlation_id))?;

    let renderer =
        TeraPageRenderer { templates: &state.templates, params: &params, current_path: uri.path() };
    let body = route.render(&renderer).map_err(|error| reject(error, &correlation_id))?;
    Ok(Html(body))
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub page: PageKey,
    #[serde(flatten)]
    pub action: SubmitAction,
    pub next_path: Option<String>,
    pub move_id: Option<MoveId>,
}

async fn submit_page(
    State(state): State<WizardState>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Json<SubmitResponse>, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();
    // Held until the response is built: a second submit on the same session
    // waits here and then sees the move this one created.
    let (lease, flow_state) = state.leased_session(&headers).await;
    let audit = AuditContext::new(flow_state.move_id.clone(), correlation_id.as_str(), "wizard");

    let (route, params) = state
        .flows
        .resolve_with_audit(uri.path(), &flow_state, &TracingAuditSink, &audit)
        .ok_or_else(|| undeclared(&uri, &correlation_id))?;
    let Some(page) = route.page() else {
        return Err(reject(WizardError::OutOfFlow(route.key), &correlation_id));
    };

    let action = page.submit_action().map_err(|error| reject(error, &correlation_id))?;
    let (page, created) = match &action {
        SubmitAction::Advance => (page.clone(), None),
        SubmitAction::CreateMove { orders_id } => {
            let record = state
                .data
                .create_move(orders_id)
                .await
                .map_err(|error| reject(ApplicationError::from(error), &correlation_id))?;
            let next_state = flow_state.clone().with_move(record.id.clone());
            if let Some(lease) = &lease {
                state
                    .sessions
                    .replace(lease.session_id(), next_state.clone())
                    .map_err(|error| reject(error, &correlation_id))?;
            }

            info!(
                event_name = "wizard.move.created",
                correlation_id = %correlation_id,
                move_id = %record.id,
                orders_id = %orders_id,
                "created move for current orders"
            );

            let page = state
                .flows
                .route(route.key, &next_state)
                .and_then(|route| route.page().cloned())
                .ok_or_else(|| reject(WizardError::OutOfFlow(route.key), &correlation_id))?;
            (page, Some(record.id))
        }
    };

    let next_path = page.next_path(&params).map_err(|error| reject(error, &correlation_id))?;
    Ok(Json(SubmitResponse { page: page.key, action, next_path, move_id: created }))
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub state: FlowState,
    pub pages: Vec<PageKey>,
}

impl SessionResponse {
    fn new(flows: &FlowTable, session_id: String, state: FlowState) -> Self {
        let pages = flows.in_flow_paths(&state);
        Self { session_id, state, pages }
    }
}

async fn create_session(
    State(state): State<WizardState>,
    Json(flow_state): Json<FlowState>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let correlation_id = Uuid::new_v4().to_string();
    let session_id =
        state.sessions.create(flow_state.clone()).map_err(|error| reject(error, &correlation_id))?;

    info!(
        event_name = "wizard.session.created",
        correlation_id = %correlation_id,
        session_id = %session_id,
        "wizard session started"
    );

    Ok((StatusCode::CREATED, Json(SessionResponse::new(&state.flows, session_id, flow_state))))
}

async fn show_session(
    State(state): State<WizardState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionResponse>, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();
    let flow_state = state
        .sessions
        .get(&session_id)
        .ok_or_else(|| reject(SessionError::NotFound(session_id.clone()), &correlation_id))?;
    Ok(Json(SessionResponse::new(&state.flows, session_id, flow_state)))
}

async fn replace_session(
    State(state): State<WizardState>,
    Path(session_id): Path<String>,
    Json(flow_state): Json<FlowState>,
) -> Result<Json<SessionResponse>, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();
    let _lease = state
        .sessions
        .lease(&session_id)
        .await
        .ok_or_else(|| reject(SessionError::NotFound(session_id.clone()), &correlation_id))?;
    state
        .sessions
        .replace(&session_id, flow_state.clone())
        .map_err(|error| reject(error, &correlation_id))?;
    Ok(Json(SessionResponse::new(&state.flows, session_id, flow_state)))
}

async fn delete_session(
    State(state): State<WizardState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();
    let lease = state
        .sessions
        .lease(&session_id)
        .await
        .ok_or_else(|| reject(SessionError::NotFound(session_id.clone()), &correlation_id))?;
    state.sessions.remove(lease.session_id()).map_err(|error| reject(error, &correlation_id))?;

    info!(
        event_name = "wizard.session.ended",
        correlation_id = %correlation_id,
        session_id = %session_id,
        "wizard session ended"
    );
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Default, Deserialize)]
pub struct PagesQuery {
    pub current: Option<PageKey>,
}

#[derive(Debug, Serialize)]
pub struct PageListing {
    pub key: PageKey,
    pub pattern: String,
    /// The concrete path, once the session knows every parameter.
    pub href: Option<String>,
    pub view: PageView,
    pub description: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct PagesResponse {
    pub pages: Vec<PageListing>,
    pub navigation: Option<Navigation>,
}

async fn list_pages(
    State(state): State<WizardState>,
    headers: HeaderMap,
    Query(query): Query<PagesQuery>,
) -> Json<PagesResponse> {
    let flow_state = state.session(&headers);
    let params = flow_state.path_params();
    let in_flow = state.flows.in_flow_paths(&flow_state);

    let pages = in_flow
        .iter()
        .filter_map(|key| state.flows.descriptor(*key))
        .map(|descriptor| PageListing {
            key: descriptor.key,
            pattern: descriptor.path.to_string(),
            href: descriptor.path.fill(&params).ok(),
            view: descriptor.view,
            description: descriptor.description,
        })
        .collect();
    let navigation = query.current.map(|current| Navigation::locate(current, &in_flow));

    Json(PagesResponse { pages, navigation })
}

#[derive(Debug, Serialize)]
pub struct LegResponse {
    pub status: &'static str,
    pub view: SummaryView,
    pub headline: &'static str,
    pub call_to_action: Option<&'static str>,
}

impl From<LegSummary<SummaryView>> for LegResponse {
    fn from(leg: LegSummary<SummaryView>) -> Self {
        Self {
            status: leg.status,
            view: leg.view,
            headline: leg.view.headline(),
            call_to_action: leg.view.call_to_action(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub move_id: MoveId,
    pub locator: Option<String>,
    pub move_status: MoveStatus,
    pub move_type: Option<MoveType>,
    pub queue_status: &'static str,
    pub edit_move_enabled: bool,
    pub hhg: Option<LegResponse>,
    pub ppm: Option<LegResponse>,
}

impl From<MoveSummaryPlan<SummaryView>> for SummaryResponse {
    fn from(plan: MoveSummaryPlan<SummaryView>) -> Self {
        Self {
            move_id: plan.move_id,
            locator: plan.locator,
            move_status: plan.move_status,
            move_type: plan.move_type,
            queue_status: plan.queue_status,
            edit_move_enabled: plan.edit_move_enabled,
            hhg: plan.hhg.map(LegResponse::from),
            ppm: plan.ppm.map(LegResponse::from),
        }
    }
}

async fn move_summary(
    State(state): State<WizardState>,
    Path(move_id): Path<String>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();
    let move_id = MoveId(move_id);

    let record = state
        .data
        .fetch_move(&move_id)
        .await
        .map_err(|error| reject(ApplicationError::from(error), &correlation_id))?;

    let audit = AuditContext::new(Some(move_id), correlation_id.as_str(), "summary");
    let plan = state
        .dispatcher
        .dispatch_with_audit(&record, &TracingAuditSink, &audit)
        .map_err(|error| reject(error, &correlation_id))?;

    Ok(Json(SummaryResponse::from(plan)))
}

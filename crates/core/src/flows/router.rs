use std::collections::HashSet;

use crate::audit::{AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink};
use crate::errors::DomainError;
use crate::flows::navigation::WizardPage;
use crate::flows::pages::{InFlowRule, PageDescriptor, PageKey, PageView};
use crate::flows::path::{PathParams, PathPattern};
use crate::flows::state::FlowState;

/// Turns resolved routes into whatever the outer layer displays.
pub trait PageRenderer {
    type Output;

    fn render_page(&self, page: &WizardPage) -> Self::Output;

    fn render_missing_context(&self) -> Self::Output;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteHandler {
    Page(WizardPage),
    /// Shown for every out-of-flow path, whatever its parameters.
    MissingContext,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    pub key: PageKey,
    pub path: PathPattern,
    pub handler: RouteHandler,
}

impl Route {
    pub fn is_in_flow(&self) -> bool {
        matches!(self.handler, RouteHandler::Page(_))
    }

    pub fn page(&self) -> Option<&WizardPage> {
        match &self.handler {
            RouteHandler::Page(page) => Some(page),
            RouteHandler::MissingContext => None,
        }
    }

    pub fn render<R>(&self, renderer: &R) -> R::Output
    where
        R: PageRenderer,
    {
        match &self.handler {
            RouteHandler::Page(page) => renderer.render_page(page),
            RouteHandler::MissingContext => renderer.render_missing_context(),
        }
    }
}

/// Ordered, immutable table of wizard pages. Declaration order is the
/// wizard order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlowTable {
    pages: Vec<PageDescriptor>,
}

impl FlowTable {
    pub fn new(pages: Vec<PageDescriptor>) -> Result<Self, DomainError> {
        let mut keys = HashSet::new();
        let mut paths = HashSet::new();
        for page in &pages {
            if !keys.insert(page.key) {
                return Err(DomainError::DuplicatePage(page.key));
            }
            if !paths.insert(page.path.as_str().trim_end_matches('/').to_string()) {
                return Err(DomainError::DuplicatePath(page.path.as_str().to_string()));
            }
        }
        Ok(Self { pages })
    }

    /// The service member move wizard.
    pub fn standard() -> Result<Self, DomainError> {
        use InFlowRule::{HasHhg, HasPpm, IsCombo, PpmOnly};
        use PageKey::*;

        let pages = vec![
            PageDescriptor::form(ServiceMemberCreate, "/service-member/{service_member_id}/create"),
            PageDescriptor::form(ServiceMemberName, "/service-member/{service_member_id}/name"),
            PageDescriptor::form(ContactInfo, "/service-member/{service_member_id}/contact-info"),
            PageDescriptor::form(DutyStation, "/service-member/{service_member_id}/duty-station")
                .described("current duty station"),
            PageDescriptor::form(
                ResidenceAddress,
                "/service-member/{service_member_id}/residence-address",
            ),
            PageDescriptor::form(
                BackupMailingAddress,
                "/service-member/{service_member_id}/backup-mailing-address",
            ),
            PageDescriptor::form(
                BackupContacts,
                "/service-member/{service_member_id}/backup-contacts",
            )
            .described("Backup contacts"),
            PageDescriptor::new(
                ServiceMemberTransition,
                "/service-member/{service_member_id}/transition",
                InFlowRule::Always,
                PageView::Transition,
            ),
            PageDescriptor::form(Orders, "/orders"),
            PageDescriptor::form(UploadOrders, "/orders/upload").described("Upload your orders"),
            PageDescriptor::new(
                OrdersTransition,
                "/orders/transition",
                InFlowRule::Always,
                PageView::Transition,
            )
            .creates_move(),
            PageDescriptor::form(MoveType, "/moves/{move_id}"),
            PageDescriptor::new(
                HhgSchedule,
                "/moves/{move_id}/schedule",
                HasHhg,
                PageView::Placeholder,
            )
            .described("Pick a move date"),
            PageDescriptor::new(
                HhgAddress,
                "/moves/{move_id}/address",
                HasHhg,
                PageView::Placeholder,
            )
            .described("enter your addresses"),
            PageDescriptor::new(
                PpmTransition,
                "/moves/{move_id}/ppm-transition",
                IsCombo,
                PageView::Transition,
            ),
            PageDescriptor::new(PpmStart, "/moves/{move_id}/ppm-start", PpmOnly, PageView::Form),
            PageDescriptor::new(PpmSize, "/moves/{move_id}/ppm-size", HasPpm, PageView::Form),
            PageDescriptor::new(
                PpmIncentive,
                "/moves/{move_id}/ppm-incentive",
                HasPpm,
                PageView::Form,
            ),
            PageDescriptor::form(Review, "/moves/{move_id}/review"),
            PageDescriptor::form(Agreement, "/moves/{move_id}/agreement"),
        ];

        Self::new(pages)
    }

    pub fn pages(&self) -> &[PageDescriptor] {
        &self.pages
    }

    pub fn descriptor(&self, key: PageKey) -> Option<&PageDescriptor> {
        self.pages.iter().find(|page| page.key == key)
    }

    pub fn in_flow_paths(&self, state: &FlowState) -> Vec<PageKey> {
        self.pages.iter().filter(|page| page.is_in_flow(state)).map(|page| page.key).collect()
    }

    pub fn build_routes(&self, state: &FlowState) -> Vec<Route> {
        let in_flow = self.in_flow_paths(state);
        self.pages.iter().map(|page| self.route_for(page, &in_flow, state)).collect()
    }

    pub fn route(&self, key: PageKey, state: &FlowState) -> Option<Route> {
        let page = self.descriptor(key)?;
        Some(self.route_for(page, &self.in_flow_paths(state), state))
    }

    /// Finds the declared page for a concrete request path.
    pub fn resolve(&self, path: &str, state: &FlowState) -> Option<(Route, PathParams)> {
        let (page, params) = self
            .pages
            .iter()
            .find_map(|page| page.path.matches(path).map(|params| (page, params)))?;
        Some((self.route_for(page, &self.in_flow_paths(state), state), params))
    }

    pub fn resolve_with_audit<S>(
        &self,
        path: &str,
        state: &FlowState,
        sink: &S,
        audit: &AuditContext,
    ) -> Option<(Route, PathParams)>
    where
        S: AuditSink,
    {
        let resolved = self.resolve(path, state);
        match &resolved {
            Some((route, _)) if route.is_in_flow() => sink.emit(
                AuditEvent::from_context(
                    audit,
                    "wizard.page_resolved",
                    AuditCategory::Wizard,
                    AuditOutcome::Success,
                )
                .with_metadata("page", route.key.as_str())
                .with_metadata("path", path),
            ),
            Some((route, _)) => sink.emit(
                AuditEvent::from_context(
                    audit,
                    "wizard.missing_context",
                    AuditCategory::Wizard,
                    AuditOutcome::Rejected,
                )
                .with_metadata("page", route.key.as_str())
                .with_metadata("path", path),
            ),
            None => {}
        }
        resolved
    }

    fn route_for(&self, page: &PageDescriptor, in_flow: &[PageKey], state: &FlowState) -> Route {
        let handler = if page.is_in_flow(state) {
            RouteHandler::Page(WizardPage::new(page, in_flow.to_vec(), self.patterns(), state))
        } else {
            RouteHandler::MissingContext
        };
        Route { key: page.key, path: page.path.clone(), handler }
    }

    fn patterns(&self) -> Vec<(PageKey, PathPattern)> {
        self.pages.iter().map(|page| (page.key, page.path.clone())).collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::audit::{AuditContext, InMemoryAuditSink};
    use crate::domain::moves::{MoveId, MoveType, OrdersId};
    use crate::errors::DomainError;
    use crate::flows::navigation::SubmitAction;
    use crate::flows::pages::{InFlowRule, PageDescriptor, PageKey, PageView};
    use crate::flows::path::PathParams;
    use crate::flows::router::{FlowTable, PageRenderer, RouteHandler};
    use crate::flows::state::FlowState;

    fn state(move_type: Option<MoveType>) -> FlowState {
        FlowState {
            service_member_id: Some("sm-1".to_string()),
            selected_move_type: move_type,
            has_move: true,
            move_id: Some(MoveId("move-1".to_string())),
            current_orders_id: Some(OrdersId("orders-1".to_string())),
        }
    }

    fn standard() -> FlowTable {
        FlowTable::standard().expect("standard wizard table is well formed")
    }

    fn is_subsequence(candidate: &[PageKey], declared: &[PageKey]) -> bool {
        let mut declared = declared.iter();
        candidate.iter().all(|key| declared.any(|declared_key| declared_key == key))
    }

    #[test]
    fn in_flow_paths_preserve_declaration_order_for_every_move_type() {
        let table = standard();
        let declared: Vec<PageKey> = table.pages().iter().map(|page| page.key).collect();

        for move_type in [None, Some(MoveType::Hhg), Some(MoveType::Ppm), Some(MoveType::HhgPpm)] {
            let in_flow = table.in_flow_paths(&state(move_type));
            assert!(is_subsequence(&in_flow, &declared), "{move_type:?} reordered pages");
        }
    }

    #[test]
    fn ppm_flow_skips_hhg_and_combo_pages() {
        let in_flow = standard().in_flow_paths(&state(Some(MoveType::Ppm)));

        assert!(in_flow.contains(&PageKey::PpmStart));
        assert!(in_flow.contains(&PageKey::PpmSize));
        assert!(!in_flow.contains(&PageKey::HhgSchedule));
        assert!(!in_flow.contains(&PageKey::PpmTransition));
        assert_eq!(in_flow.len(), 17);
    }

    #[test]
    fn combo_flow_adds_transition_instead_of_ppm_start() {
        let in_flow = standard().in_flow_paths(&state(Some(MoveType::HhgPpm)));
        let tail: Vec<PageKey> =
            in_flow.iter().skip_while(|key| **key != PageKey::MoveType).copied().collect();

        assert_eq!(
            tail,
            vec![
                PageKey::MoveType,
                PageKey::HhgSchedule,
                PageKey::HhgAddress,
                PageKey::PpmTransition,
                PageKey::PpmSize,
                PageKey::PpmIncentive,
                PageKey::Review,
                PageKey::Agreement,
            ]
        );
    }

    #[test]
    fn undetermined_move_type_keeps_only_unconditional_pages() {
        let table = standard();
        let in_flow = table.in_flow_paths(&FlowState::default());
        let unconditional =
            table.pages().iter().filter(|page| page.rule == InFlowRule::Always).count();

        assert_eq!(in_flow.len(), unconditional);
        assert_eq!(in_flow.last(), Some(&PageKey::Agreement));
    }

    #[test]
    fn in_flow_paths_is_idempotent() {
        let table = standard();
        let snapshot = state(Some(MoveType::Hhg));

        assert_eq!(table.in_flow_paths(&snapshot), table.in_flow_paths(&snapshot));
    }

    #[test]
    fn every_declared_page_gets_exactly_one_route() {
        let table = standard();
        let snapshot = state(Some(MoveType::Ppm));
        let routes = table.build_routes(&snapshot);

        assert_eq!(routes.len(), table.pages().len());
        for (route, page) in routes.iter().zip(table.pages()) {
            assert_eq!(route.key, page.key);
            assert_eq!(route.is_in_flow(), page.is_in_flow(&snapshot));
        }
        let schedule = routes.iter().find(|route| route.key == PageKey::HhgSchedule);
        assert_eq!(schedule.map(|route| &route.handler), Some(&RouteHandler::MissingContext));
    }

    #[test]
    fn in_flow_routes_carry_the_filtered_page_list() {
        let table = standard();
        let snapshot = state(Some(MoveType::Hhg));
        let expected = table.in_flow_paths(&snapshot);

        for route in table.build_routes(&snapshot) {
            if let Some(page) = route.page() {
                assert_eq!(page.pages, expected);
                assert_eq!(page.key, route.key);
            }
        }
    }

    #[test]
    fn out_of_flow_route_is_placeholder_regardless_of_parameters() {
        let table = standard();
        let snapshot = state(Some(MoveType::Hhg));

        for path in ["/moves/move-1/ppm-size", "/moves/another/ppm-size", "/moves/x/ppm-size/"] {
            let (route, _) = table.resolve(path, &snapshot).expect("declared path resolves");
            assert_eq!(route.key, PageKey::PpmSize);
            assert_eq!(route.handler, RouteHandler::MissingContext);
        }
    }

    #[test]
    fn resolve_returns_none_for_undeclared_paths() {
        let table = standard();
        assert!(table.resolve("/moves/move-1/garage", &FlowState::default()).is_none());
    }

    #[test]
    fn resolve_extracts_path_parameters() {
        let table = standard();
        let (route, params) =
            table.resolve("/service-member/sm-42/name", &FlowState::default()).expect("resolves");

        assert_eq!(route.key, PageKey::ServiceMemberName);
        assert_eq!(params.get("service_member_id"), Some("sm-42"));
    }

    #[test]
    fn duplicate_keys_and_paths_are_rejected() {
        let duplicate_key = FlowTable::new(vec![
            PageDescriptor::form(PageKey::Orders, "/orders"),
            PageDescriptor::form(PageKey::Orders, "/orders/again"),
        ]);
        assert_eq!(duplicate_key, Err(DomainError::DuplicatePage(PageKey::Orders)));

        let duplicate_path = FlowTable::new(vec![
            PageDescriptor::form(PageKey::Orders, "/orders"),
            PageDescriptor::form(PageKey::UploadOrders, "/orders/"),
        ]);
        assert_eq!(duplicate_path, Err(DomainError::DuplicatePath("/orders/".to_string())));
    }

    #[test]
    fn standard_table_passes_construction_checks() {
        let table = FlowTable::standard().expect("standard wizard table is well formed");
        assert_eq!(table.pages().len(), 20);
        assert_eq!(FlowTable::new(table.pages().to_vec()), Ok(table));
    }

    #[test]
    fn next_path_fills_parameters_from_state() {
        let table = standard();
        let snapshot = state(Some(MoveType::Ppm));
        let route = table.route(PageKey::MoveType, &snapshot).expect("declared");
        let page = route.page().expect("move type page is always in flow");

        assert_eq!(
            page.next_path(&PathParams::default()).expect("bound"),
            Some("/moves/move-1/ppm-start".to_string())
        );
        assert_eq!(
            page.previous_path(&PathParams::default()).expect("bound"),
            Some("/orders/transition".to_string())
        );
    }

    #[test]
    fn next_path_reports_unbound_move_id() {
        let table = standard();
        let snapshot = FlowState::for_service_member("sm-1");
        let route = table.route(PageKey::OrdersTransition, &snapshot).expect("declared");
        let page = route.page().expect("in flow");

        let error = page.next_path(&PathParams::default()).expect_err("no move id yet");
        assert!(matches!(
            error,
            DomainError::UnboundPathParameter { ref parameter, .. } if parameter == "move_id"
        ));
    }

    #[test]
    fn last_page_has_no_next_path() {
        let table = standard();
        let route = table.route(PageKey::Agreement, &state(None)).expect("declared");
        let page = route.page().expect("in flow");

        assert_eq!(page.next_path(&PathParams::default()), Ok(None));
    }

    #[test]
    fn orders_transition_creates_move_only_when_missing() {
        let table = standard();
        let without_move = FlowState::for_service_member("sm-1")
            .with_orders(OrdersId("orders-7".to_string()));
        let route = table.route(PageKey::OrdersTransition, &without_move).expect("declared");

        assert_eq!(
            route.page().expect("in flow").submit_action(),
            Ok(SubmitAction::CreateMove { orders_id: OrdersId("orders-7".to_string()) })
        );

        let with_move = without_move.with_move(MoveId("move-7".to_string()));
        let route = table.route(PageKey::OrdersTransition, &with_move).expect("declared");
        assert_eq!(route.page().expect("in flow").submit_action(), Ok(SubmitAction::Advance));
    }

    #[test]
    fn orders_transition_without_orders_is_an_error() {
        let table = standard();
        let route =
            table.route(PageKey::OrdersTransition, &FlowState::default()).expect("declared");

        assert_eq!(
            route.page().expect("in flow").submit_action(),
            Err(DomainError::MissingOrders(PageKey::OrdersTransition))
        );
    }

    struct LabelRenderer;

    impl PageRenderer for LabelRenderer {
        type Output = String;

        fn render_page(&self, page: &crate::flows::WizardPage) -> String {
            match page.view {
                PageView::Placeholder => format!("placeholder:{}", page.key),
                _ => format!("page:{}", page.key),
            }
        }

        fn render_missing_context(&self) -> String {
            "missing-context".to_string()
        }
    }

    #[test]
    fn routes_dispatch_to_the_renderer() {
        let table = standard();
        let rendered: Vec<String> = table
            .build_routes(&state(Some(MoveType::Hhg)))
            .iter()
            .map(|route| route.render(&LabelRenderer))
            .collect();

        assert!(rendered.contains(&"placeholder:hhg-schedule".to_string()));
        assert!(rendered.contains(&"page:review".to_string()));
        assert_eq!(rendered.iter().filter(|label| *label == "missing-context").count(), 4);
    }

    #[test]
    fn resolution_is_audited() {
        let table = standard();
        let sink = InMemoryAuditSink::default();
        let audit = AuditContext::new(None, "req-9", "wizard");

        let snapshot = state(Some(MoveType::Hhg));

        let _ = table.resolve_with_audit("/moves/m/ppm-size", &snapshot, &sink, &audit);
        let _ = table.resolve_with_audit("/moves/m/review", &snapshot, &sink, &audit);
        let _ = table.resolve_with_audit("/nowhere", &snapshot, &sink, &audit);

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, "wizard.missing_context");
        assert_eq!(events[1].event_type, "wizard.page_resolved");
        assert_eq!(events[1].metadata.get("page").map(String::as_str), Some("review"));
    }
}

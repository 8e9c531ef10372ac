use mymove_core::domain::moves::{MoveId, MoveType, OrdersId};
use mymove_core::flows::{FlowState, FlowTable, PageKey, PathParams, RouteHandler, SubmitAction};

use crate::commands::CommandResult;

#[derive(Debug, Clone, Default)]
pub struct FlowArgs {
    pub service_member_id: Option<String>,
    pub move_type: Option<MoveType>,
    pub move_id: Option<String>,
    pub orders_id: Option<String>,
    pub page: Option<PageKey>,
}

impl FlowArgs {
    fn state(&self) -> FlowState {
        let mut state = FlowState {
            service_member_id: self.service_member_id.clone(),
            selected_move_type: self.move_type,
            ..FlowState::default()
        };
        if let Some(orders_id) = &self.orders_id {
            state = state.with_orders(OrdersId(orders_id.clone()));
        }
        if let Some(move_id) = &self.move_id {
            state = state.with_move(MoveId(move_id.clone()));
        }
        state
    }
}

pub fn run(args: &FlowArgs) -> CommandResult {
    let table = match FlowTable::standard() {
        Ok(table) => table,
        Err(error) => return CommandResult::failure("flow", "flow_table", error.to_string(), 7),
    };
    let state = args.state();
    let params = state.path_params();
    let in_flow = table.in_flow_paths(&state);
    let move_type = state.selected_move_type.map_or("<unset>", |move_type| move_type.as_str());

    let mut lines = vec![format!(
        "in-flow pages for move type {move_type} ({} of {}):",
        in_flow.len(),
        table.pages().len()
    )];
    for (index, key) in in_flow.iter().enumerate() {
        let Some(descriptor) = table.descriptor(*key) else {
            continue;
        };
        let href = descriptor.path.fill(&params).unwrap_or_else(|_| descriptor.path.to_string());
        lines.push(format!("  {:>2}. {key} {href}", index + 1));
    }

    if let Some(key) = args.page {
        lines.extend(describe_page(&table, key, &state, &params));
    }

    CommandResult::success("flow", lines.join("\n"))
}

fn describe_page(
    table: &FlowTable,
    key: PageKey,
    state: &FlowState,
    params: &PathParams,
) -> Vec<String> {
    let Some(route) = table.route(key, state) else {
        return vec![format!("page {key}: not declared in the flow table")];
    };

    let page = match &route.handler {
        RouteHandler::Page(page) => page,
        RouteHandler::MissingContext => {
            return vec![format!("page {key}: missing context (not in flow for this state)")];
        }
    };

    let navigation = page.navigation();
    let step = navigation.position.map_or(0, |position| position + 1);
    let mut lines = vec![format!("page {key}: in flow (step {step} of {})", navigation.total)];

    let previous_path = page.previous_path(params).ok().flatten();
    lines.push(neighbour_line("previous", navigation.previous, previous_path));
    let next_path = page.next_path(params).ok().flatten();
    lines.push(neighbour_line("next", navigation.next, next_path));

    let submit = match page.submit_action() {
        Ok(SubmitAction::Advance) => "advance".to_string(),
        Ok(SubmitAction::CreateMove { orders_id }) => format!("create move for orders {orders_id}"),
        Err(error) => format!("blocked ({error})"),
    };
    lines.push(format!("  submit: {submit}"));

    lines
}

fn neighbour_line(label: &str, neighbour: Option<PageKey>, path: Option<String>) -> String {
    match neighbour {
        Some(neighbour) => {
            let path = path.unwrap_or_else(|| "<needs more context>".to_string());
            format!("  {label}: {neighbour} {path}")
        }
        None => format!("  {label}: <none>"),
    }
}

use std::path::PathBuf;

use mymove_core::config::{AppConfig, LoadOptions};
use mymove_core::data::{DataServiceError, InMemoryMoveService, MoveDataService};
use mymove_core::domain::moves::MoveId;
use mymove_core::summary::{LegSummary, MoveSummaryDispatcher, MoveSummaryPlan, SummaryView};

use crate::commands::{runtime, CommandResult};

pub fn run(fixture: Option<PathBuf>, move_id: Option<String>) -> CommandResult {
    let path = match fixture {
        Some(path) => path,
        None => match AppConfig::load(LoadOptions::default()) {
            Ok(config) => match config.data.fixtures_path {
                Some(path) => path,
                None => {
                    return CommandResult::failure(
                        "summary",
                        "missing_fixture",
                        "no move fixtures to read; pass --fixture or set data.fixtures_path",
                        2,
                    );
                }
            },
            Err(error) => {
                return CommandResult::failure(
                    "summary",
                    "config_validation",
                    format!("configuration issue: {error}"),
                    2,
                );
            }
        },
    };

    let service = match InMemoryMoveService::from_fixture_file(&path) {
        Ok(service) => service,
        Err(error) => {
            return CommandResult::failure("summary", "fixture_load", error.to_string(), 4);
        }
    };

    let records = match move_id {
        Some(move_id) => {
            let runtime = match runtime("summary") {
                Ok(runtime) => runtime,
                Err(failure) => return failure,
            };
            match runtime.block_on(service.fetch_move(&MoveId(move_id))) {
                Ok(record) => vec![record],
                Err(error @ DataServiceError::MoveNotFound(_)) => {
                    let message = error.to_string();
                    return CommandResult::failure("summary", "move_not_found", message, 5);
                }
                Err(error) => {
                    return CommandResult::failure("summary", "data_service", error.to_string(), 4);
                }
            }
        }
        None => service.records(),
    };

    let dispatcher = MoveSummaryDispatcher::default();
    let mut lines = vec![format!("move summaries from `{}`:", path.display())];
    for record in &records {
        match dispatcher.dispatch(record) {
            Ok(plan) => lines.extend(render_plan(&plan)),
            Err(error) => {
                return CommandResult::failure(
                    "summary",
                    "unknown_status",
                    format!("move `{}`: {error}", record.id),
                    6,
                );
            }
        }
    }

    CommandResult::success("summary", lines.join("\n"))
}

fn render_plan(plan: &MoveSummaryPlan<SummaryView>) -> Vec<String> {
    let locator = plan.locator.as_deref().unwrap_or("-");
    let move_type = plan.move_type.map_or("<unset>", |move_type| move_type.as_str());
    let edit = if plan.edit_move_enabled { "enabled" } else { "disabled" };

    let mut lines = vec![format!(
        "- {} [{locator}] status={} type={move_type} edit_move={edit} queue={}",
        plan.move_id,
        plan.move_status.as_str(),
        plan.queue_status
    )];
    if let Some(leg) = &plan.hhg {
        lines.push(render_leg("hhg", leg));
    }
    if let Some(leg) = &plan.ppm {
        lines.push(render_leg("ppm", leg));
    }
    lines
}

fn render_leg(label: &str, leg: &LegSummary<SummaryView>) -> String {
    format!("    {label}: {} -> {} \"{}\"", leg.status, leg.view.as_str(), leg.view.headline())
}

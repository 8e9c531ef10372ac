use mymove_core::config::{AppConfig, LoadOptions};
use mymove_core::data::InMemoryMoveService;
use mymove_core::flows::FlowTable;
use mymove_core::summary::MoveSummaryDispatcher;
use serde::Serialize;

use crate::commands::CommandResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

/// Exits 1 when any check fails so scripts can gate on the report.
pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = if report.overall_status == CheckStatus::Fail { 1 } else { 0 };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report() -> DoctorReport {
    let mut checks = vec![check_flow_table()];

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.insert(
                0,
                DoctorCheck {
                    name: "config_validation",
                    status: CheckStatus::Pass,
                    details: "configuration loaded and validated".to_string(),
                },
            );
            checks.push(check_move_fixtures(&config));
        }
        Err(error) => {
            checks.insert(
                0,
                DoctorCheck {
                    name: "config_validation",
                    status: CheckStatus::Fail,
                    details: error.to_string(),
                },
            );
            checks.push(DoctorCheck {
                name: "move_fixtures",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
        }
    }

    // Skipped checks do not fail the report.
    let any_fail = checks.iter().any(|check| check.status == CheckStatus::Fail);
    let overall_status = if any_fail { CheckStatus::Fail } else { CheckStatus::Pass };
    let summary = if any_fail {
        "doctor: one or more readiness checks failed".to_string()
    } else {
        "doctor: all readiness checks passed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_flow_table() -> DoctorCheck {
    match FlowTable::standard() {
        Ok(table) => DoctorCheck {
            name: "flow_table_integrity",
            status: CheckStatus::Pass,
            details: format!("{} pages with unique keys and paths", table.pages().len()),
        },
        Err(error) => DoctorCheck {
            name: "flow_table_integrity",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn check_move_fixtures(config: &AppConfig) -> DoctorCheck {
    let Some(path) = &config.data.fixtures_path else {
        return DoctorCheck {
            name: "move_fixtures",
            status: CheckStatus::Skipped,
            details: "no data.fixtures_path configured".to_string(),
        };
    };

    let service = match InMemoryMoveService::from_fixture_file(path) {
        Ok(service) => service,
        Err(error) => {
            return DoctorCheck {
                name: "move_fixtures",
                status: CheckStatus::Fail,
                details: error.to_string(),
            };
        }
    };

    let dispatcher = MoveSummaryDispatcher::default();
    let records = service.records();
    for record in &records {
        if let Err(error) = dispatcher.dispatch(record) {
            return DoctorCheck {
                name: "move_fixtures",
                status: CheckStatus::Fail,
                details: format!("move `{}` cannot be summarized: {error}", record.id),
            };
        }
    }

    DoctorCheck {
        name: "move_fixtures",
        status: CheckStatus::Pass,
        details: format!("{} moves loaded from `{}`", records.len(), path.display()),
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

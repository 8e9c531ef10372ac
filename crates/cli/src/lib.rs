pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use mymove_core::domain::moves::MoveType;
use mymove_core::flows::PageKey;

use crate::commands::flow::FlowArgs;

#[derive(Debug, Parser)]
#[command(
    name = "mymove",
    about = "MyMove operator CLI",
    long_about = "Inspect the move wizard flow table, move summaries, config, and readiness.",
    after_help = "Examples:\n  mymove flow --move-type PPM --move-id move-1 --page ppm-size\n  \
                  mymove summary --fixture moves.json\n  mymove doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "List the wizard pages that are in flow for a given wizard state")]
    Flow {
        #[arg(long, help = "Service member id bound into page paths")]
        service_member_id: Option<String>,
        #[arg(long, help = "Selected move type (HHG, PPM, HHG_PPM or COMBO)")]
        move_type: Option<MoveType>,
        #[arg(long, help = "Current move id bound into page paths")]
        move_id: Option<String>,
        #[arg(long, help = "Current orders id")]
        orders_id: Option<String>,
        #[arg(long, help = "Describe navigation and submit behavior for one page")]
        page: Option<PageKey>,
    },
    #[command(about = "Render move summaries from a fixture file")]
    Summary {
        #[arg(long, help = "Move fixture file; defaults to data.fixtures_path")]
        fixture: Option<PathBuf>,
        #[arg(long, help = "Summarize a single move")]
        move_id: Option<String>,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config, the flow table, and move fixtures")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Flow { service_member_id, move_type, move_id, orders_id, page } => {
            let args = FlowArgs { service_member_id, move_type, move_id, orders_id, page };
            commands::flow::run(&args)
        }
        Command::Summary { fixture, move_id } => commands::summary::run(fixture, move_id),
        Command::Config => commands::config::run(),
        Command::Doctor { json } => commands::doctor::run(json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

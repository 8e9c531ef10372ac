use std::process::ExitCode;

fn main() -> ExitCode {
    mymove_cli::run()
}

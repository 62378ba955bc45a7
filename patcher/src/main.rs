//! WAR patcher CLI entrypoint.
//!
//! This binary copies or downloads a WAR, swaps the requested library JARs into
//! `WEB-INF/lib`, and rebuilds the archive at the output path.

use clap::Parser;
use env_logger::Env;
use std::io::Write;
use warpatch::cli::Cli;
use warpatch::error::Result;
use warpatch::output::{failure_message, write_stderr_line};
use warpatch::pipeline::{PatchReport, patch_war};

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let exit_code = exit_code_for_parse_error(&err);
            if err.print().is_err() {
                // Nothing left to report to.
            }
            std::process::exit(exit_code);
        }
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(cli.log_filter())).init();

    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, stderr: &mut dyn Write) -> Result<PatchReport> {
    let config = cli.patch_config();
    log::debug!("patch configuration: {config:?}");
    patch_war(&config, stderr)
}

/// Help and version requests succeed; every other parse failure is a usage
/// error.
fn exit_code_for_parse_error(err: &clap::Error) -> i32 {
    i32::from(err.use_stderr())
}

fn exit_code_for_run_result(result: Result<PatchReport>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(_) => 0,
        Err(err) => {
            write_stderr_line(stderr, failure_message(&err));
            1
        }
    }
}

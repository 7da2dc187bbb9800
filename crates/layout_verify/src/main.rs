//! Binary entry point for the layout verifier.
//!
//! Exit code 0 means the run completed, even with failed checks; the
//! transcript and report carry the verdicts. Exit code 1 means the run
//! itself broke (no Chrome, navigation failure, no category card, or
//! unwritable artifacts).

use env_logger::{Builder, Env};
use layout_verify::verify_core::{RunOptions, run};
use log::error;
use std::env;
use std::path::PathBuf;
use std::process::exit;

/// Parse an optional `--dir` argument from the command line.
fn parse_dir_from_args() -> Option<PathBuf> {
    let mut args = env::args();
    let _program_name: Option<String> = args.next();
    let mut dir_flag_pending = false;

    for arg in args {
        if dir_flag_pending {
            return Some(PathBuf::from(arg));
        }
        if let Some(value) = arg.strip_prefix("--dir=") {
            return Some(PathBuf::from(value));
        }
        if arg == "--dir" {
            dir_flag_pending = true;
        }
    }
    None
}

#[tokio::main]
async fn main() {
    let _log_init: Result<(), _> = Builder::from_env(Env::default().filter_or("RUST_LOG", "info"))
        .is_test(false)
        .try_init();

    let mut options = RunOptions::from_env();
    if let Some(dir) = parse_dir_from_args() {
        options.page_dir = dir;
    }

    if let Err(err) = run(&options).await {
        error!("error: {err:?}");
        exit(1);
    }
}

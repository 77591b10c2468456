//! cli
//!
//! Command-line interface layer for rls.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments
//! - Initialise logging
//! - Run the release command and map its outcome to an exit code
//!
//! # Architecture
//!
//! The CLI layer is thin. It gathers the release request from flags, config
//! and git history, and hands it to the [`crate::engine`] reconciler, the
//! only code that changes anything on the forge.

pub mod args;
pub mod exit;
mod release;

pub use args::Cli;
pub use exit::ExitCode;

use std::ffi::OsString;

use clap::error::ErrorKind;
use clap::Parser;

use crate::engine;
use crate::ui::output::{self, Verbosity};

/// Run the CLI application and return the process exit code.
///
/// This is the main entry point called from `main.rs`.
pub fn run<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::Ok,
                _ => ExitCode::ParseFlags,
            };
            let _ = e.print();
            return code.code();
        }
    };

    let ctx = engine::Context {
        debug: cli.debug,
        quiet: cli.quiet,
        interactive: cli.interactive(),
    };
    init_logging(Verbosity::from_flags(ctx.quiet, ctx.debug));

    match release::release(&cli, &ctx) {
        Ok(()) => ExitCode::Ok.code(),
        Err(e) => {
            output::error(format!("{:#}", e));
            ExitCode::for_error(&e).code()
        }
    }
}

/// Route the `log` facade to stderr. `RUST_LOG` overrides the level.
fn init_logging(verbosity: Verbosity) {
    let env = env_logger::Env::default().default_filter_or(verbosity.log_filter());
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}

//! CLI module - argument parsing, logging setup and command dispatch

pub mod args;
pub mod commands;

pub use args::{Cli, GlobalOpts, OutputFormat};

/// Install the stderr log subscriber.
///
/// `RUST_LOG` takes precedence over the `-v` count.
pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = match verbose {
        0 => "drd=warn",
        1 => "drd=info",
        2 => "drd=debug",
        _ => "drd=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

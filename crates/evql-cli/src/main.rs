mod cli;
mod commands;

use tracing_subscriber::EnvFilter;

use cli::{LoadParams, ParseParams, build_cli};

fn main() {
    let matches = build_cli().get_matches();
    init_tracing(matches.get_count("verbose"));

    match matches.subcommand() {
        Some(("parse", m)) => {
            let params = ParseParams::from_matches(m);
            commands::parse::run(params.into());
        }
        Some(("load", m)) => {
            let params = LoadParams::from_matches(m);
            commands::load::run(params.into());
        }
        _ => unreachable!("clap should have caught this"),
    }
}

/// Log to stderr. `EVQL_LOG` takes an `EnvFilter` directive string; each `-v`
/// raises the floor one level.
fn init_tracing(verbose: u8) {
    let mut filter = EnvFilter::try_from_env("EVQL_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    match verbose {
        0 => {}
        1 => filter = filter.add_directive(tracing::Level::DEBUG.into()),
        _ => filter = filter.add_directive(tracing::Level::TRACE.into()),
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

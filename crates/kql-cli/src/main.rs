mod cli;
mod commands;

use tracing_subscriber::EnvFilter;

use cli::{
    CheckParams, EditParams, ParseParams, TableEmitParams, TableInspectParams, TokensParams,
    build_cli,
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("parse", m)) => {
            let params = ParseParams::from_matches(m);
            commands::parse::run(params.into());
        }
        Some(("check", m)) => {
            let params = CheckParams::from_matches(m);
            commands::check::run(params.into());
        }
        Some(("tokens", m)) => {
            let params = TokensParams::from_matches(m);
            commands::tokens::run(params.into());
        }
        Some(("edit", m)) => {
            let params = EditParams::from_matches(m);
            commands::edit::run(params.into());
        }
        Some(("table", m)) => match m.subcommand() {
            Some(("emit", m)) => {
                let params = TableEmitParams::from_matches(m);
                commands::table::emit(params.into());
            }
            Some(("inspect", m)) => {
                let params = TableInspectParams::from_matches(m);
                commands::table::inspect(params.into());
            }
            _ => unreachable!("clap should have caught this"),
        },
        _ => unreachable!("clap should have caught this"),
    }
}

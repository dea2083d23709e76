mod config;

use config::InterpreterConfig;
use opensplit_application::{DebtQuery, GroupRepository, LedgerParser, MemberDirectory};
use opensplit_domain::NettingEngine;
use opensplit_infrastructure::{InMemoryGroupRepository, LedgerFileParser};
use opensplit_presentation::{DebtPresenter, format_parse_error, format_query_error};
use std::{borrow::Cow, collections::HashMap, env, fs, io, process};
use tracing_subscriber::EnvFilter;

type CliResult<T> = Result<T, Cow<'static, str>>;

const USAGE: &str = "Usage: opensplit-interpreter <ledger-file> [group]";

fn main() {
    init_logging();

    if let Err(err) = run() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run() -> CliResult<()> {
    let mut args = env::args().skip(1);
    let Some(path) = args.next() else {
        return Err(USAGE.into());
    };
    let selected_group = args.next();

    let config = InterpreterConfig::from_env().map_err(|err| err.to_string())?;
    tracing::debug!(
        workers = config.workers.get(),
        show_positions = config.show_positions,
        "Loaded configuration"
    );

    let source =
        fs::read_to_string(&path).map_err(|err| format!("Failed to read '{path}': {err}"))?;
    let ledger = LedgerFileParser
        .parse(&source)
        .map_err(|err| format_parse_error(&err))?;
    let repository = InMemoryGroupRepository::new(ledger);
    let query = DebtQuery::new(&repository, NettingEngine::with_workers(config.workers));

    let names = match selected_group {
        Some(name) => vec![name],
        None => query.group_names().into_iter().map(str::to_string).collect(),
    };
    if names.is_empty() {
        return Err(format!("'{path}' does not declare any group").into());
    }

    let reports = names
        .iter()
        .map(|name| render_group(&repository, &query, name, config.show_positions))
        .collect::<CliResult<Vec<_>>>()?;
    print!("{}", reports.join("\n"));

    Ok(())
}

fn render_group(
    repository: &InMemoryGroupRepository<'_>,
    query: &DebtQuery<'_>,
    name: &str,
    show_positions: bool,
) -> CliResult<String> {
    let group = repository.load_group(name);
    let summary = query
        .debts_for_group(name)
        .map_err(|err| format_query_error(&err, group.as_ref()))?;

    let no_display_names: HashMap<String, String> = HashMap::new();
    let directory: &dyn MemberDirectory = match &group {
        Some(roster) => roster,
        None => &no_display_names,
    };
    Ok(DebtPresenter::render(&summary, directory).to_text(show_positions))
}

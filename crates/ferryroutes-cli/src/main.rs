use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use ferryroutes_cli::commands::import::handle_import;
use ferryroutes_cli::commands::query::{handle_query, parse_request};
use ferryroutes_cli::output::{print_error, print_footer, OutputFormat};
use ferryroutes_lib::QueryRequest;

#[derive(Parser, Debug)]
#[command(author, version, about = "Ferry route dataset and query tools")]
struct Cli {
    /// Override the dataset directory or file path (defaults to FERRY_DATA_DIR,
    /// then the platform data directory).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import a JSON dataset, replacing the current one.
    Import {
        /// JSON file with `routes`, `vessels_and_prices` and `dates_and_vessels`,
        /// or a bare list of routes.
        json: PathBuf,
    },
    /// List all routes, or the routes between two ports.
    Routes {
        #[arg(long = "from", requires = "to")]
        from: Option<String>,
        #[arg(long = "to", requires = "from")]
        to: Option<String>,
    },
    /// Vessel prices on a route.
    Prices { route_id: String },
    /// Shortest crossing between two ports.
    Duration {
        #[arg(long = "from")]
        from: String,
        #[arg(long = "to")]
        to: String,
    },
    /// Services running between two ports on a date.
    Availability {
        #[arg(long = "from")]
        from: String,
        #[arg(long = "to")]
        to: String,
        /// Travel date (YYYY-MM-DD).
        #[arg(long)]
        date: String,
    },
    /// One-stop journeys between two ports.
    Indirect {
        #[arg(long = "from")]
        from: String,
        #[arg(long = "to")]
        to: String,
    },
    /// Vessels scheduled on a route.
    Vessels { route_id: String },
    /// Departures from a port.
    Schedule { origin: String },
    /// Lowest fare between two ports.
    Cheapest {
        #[arg(long = "from")]
        from: String,
        #[arg(long = "to")]
        to: String,
    },
    /// Highest fare in the dataset.
    MostExpensive,
    /// Alternative destinations, ports and dates.
    Suggest {
        /// Origin port or fragment of its name.
        #[arg(long)]
        origin: Option<String>,
        /// Travel date (YYYY-MM-DD).
        #[arg(long)]
        date: Option<String>,
    },
    /// Run a query given as JSON, inline or as `@file.json`.
    Query { request: String },
}

impl Command {
    fn into_request(self) -> Result<QueryRequest> {
        Ok(match self {
            Command::Import { .. } => bail!("import does not run a query"),
            Command::Routes {
                from: Some(origin),
                to: Some(destination),
            } => QueryRequest::RoutesByPorts {
                origin,
                destination,
            },
            Command::Routes { .. } => QueryRequest::AllRoutes,
            Command::Prices { route_id } => QueryRequest::PriceLookup { route_id },
            Command::Duration { from, to } => QueryRequest::ShortestDuration {
                origin: from,
                destination: to,
            },
            Command::Availability { from, to, date } => QueryRequest::Availability {
                origin: from,
                destination: to,
                date,
            },
            Command::Indirect { from, to } => QueryRequest::IndirectRoute {
                origin: from,
                destination: to,
            },
            Command::Vessels { route_id } => QueryRequest::Vessels { route_id },
            Command::Schedule { origin } => QueryRequest::Schedule { origin },
            Command::Cheapest { from, to } => QueryRequest::CheapestRoute {
                origin: from,
                destination: to,
            },
            Command::MostExpensive => QueryRequest::MostExpensiveRoute,
            Command::Suggest { origin, date } => QueryRequest::Suggestions { origin, date },
            Command::Query { request } => parse_request(&request)?,
        })
    }
}

fn main() -> ExitCode {
    init_tracing();
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            print_error(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let started = Instant::now();
    let data_dir = cli.data_dir.as_deref();

    match cli.command {
        Command::Import { json } => handle_import(&json, data_dir, cli.format)?,
        command => handle_query(data_dir, &command.into_request()?, cli.format)?,
    }

    if cli.format == OutputFormat::Text {
        print_footer(started.elapsed());
    }
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

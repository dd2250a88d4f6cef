//! # Zoo Cashier Library
//!
//! The cash desk of the Zoo de Kinshasa as a command-line application:
//! ticket sales with group discount, the sale ledger, finance order
//! approval and printable documents.
//!
//! ## Module Organization
//! ```text
//! zoo_cashier/
//! ├── lib.rs          ◄─── You are here (logging & dispatch)
//! ├── cli.rs          ◄─── clap argument definitions
//! ├── state/
//! │   ├── mod.rs      ◄─── AppState: config, repositories, tariff, spool
//! │   └── config.rs   ◄─── cashier.toml + environment overrides
//! ├── commands/
//! │   ├── sale.rs     ◄─── sell, quote, ledger, invoice
//! │   ├── order.rs    ◄─── finance orders
//! │   ├── report.rs   ◄─── daily report, visitor page
//! │   └── config.rs   ◄─── prices, config show/init
//! ├── print/          ◄─── HTML receipts, invoices and reports
//! ├── output.rs       ◄─── tables or --json on stdout
//! └── error.rs        ◄─── ApiError for every command
//! ```
//!
//! ## One Invocation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Initialize logging (stderr, RUST_LOG or -v)                         │
//! │  2. Load configuration (--config, $ZOO_CONFIG, platform dir)            │
//! │  3. Open storage (sqlite | json | memory)                               │
//! │  4. Run the command with the current time                               │
//! │  5. Print the result, close storage                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;
pub mod print;
pub mod state;

use chrono::Utc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cli::{
    Cli, Command, ConfigCommand, LedgerCommand, OrdersCommand, ReportCommand, VisitorsCommand,
};
use commands::order::NewOrder;
use commands::report::VisitorDocument;
use commands::sale::SellRequest;
use error::{ApiError, ApiResult};
use output::emit;
use state::config::CashierConfig;
use state::AppState;

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG` wins when set
/// - otherwise `info`, `-v` for debug, `-vv` for trace
///
/// Logs go to stderr so `--json` output stays clean.
pub fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info,zoo=debug,sqlx=warn",
        1 => "debug,sqlx=warn",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Runs one parsed command line to completion.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = CashierConfig::load(cli.config.clone()).map_err(ApiError::from)?;

    // Writing the config file does not need storage.
    if let Command::Config(ConfigCommand::Init { force }) = &cli.command {
        let path = cli
            .config
            .clone()
            .or_else(CashierConfig::default_config_path)
            .ok_or_else(|| ApiError::validation("Aucun dossier de configuration disponible"))?;
        let written = commands::config::init(&config, &path, *force)?;
        return emit(&written, cli.json, &config.store.currency);
    }

    let state = AppState::open(config).await?;
    info!(backend = %state.config.storage.backend, "Cashier ready");

    let result = dispatch(&state, &cli).await;
    state.close().await;
    result
}

async fn dispatch(state: &AppState, cli: &Cli) -> anyhow::Result<()> {
    let now = Utc::now();
    let json = cli.json;
    let currency = state.currency().to_string();
    debug!(command = ?cli.command, "Dispatching command");

    match &cli.command {
        Command::Sell(args) => {
            let request = SellRequest {
                client: args.client.clone(),
                tickets: args.tickets.clone(),
                receipt: args.receipt,
            };
            let recorded = commands::sale::sell(state, request, now).await?;
            emit(&recorded, json, &currency)
        }
        Command::Quote(args) => {
            let quote = commands::sale::quote(
                state,
                &args.tickets,
                args.client.clone(),
                args.receipt,
                now,
            )
            .await?;
            emit(&quote, json, &currency)
        }
        Command::Ledger(LedgerCommand::List) => {
            emit(&commands::sale::ledger_list(state).await?, json, &currency)
        }
        Command::Ledger(LedgerCommand::Show { id }) => {
            emit(&commands::sale::ledger_show(state, id).await?, json, &currency)
        }
        Command::Ledger(LedgerCommand::Clear { yes }) => {
            emit(&commands::sale::ledger_clear(state, *yes).await?, json, &currency)
        }
        Command::Invoice { sale_id } => {
            emit(&commands::sale::invoice(state, sale_id).await?, json, &currency)
        }
        Command::Report(ReportCommand::Daily { date }) => {
            emit(&commands::report::daily(state, *date, now).await?, json, &currency)
        }
        Command::Visitors(VisitorsCommand::Stats(filter)) => {
            let request = filter.clone().into();
            emit(&commands::report::stats(state, &request, now).await?, json, &currency)
        }
        Command::Visitors(VisitorsCommand::List(filter)) => {
            let printed = print_visitors(state, filter, VisitorDocument::List, now).await?;
            emit(&printed, json, &currency)
        }
        Command::Visitors(VisitorsCommand::Report(filter)) => {
            let printed = print_visitors(state, filter, VisitorDocument::Detailed, now).await?;
            emit(&printed, json, &currency)
        }
        Command::Orders(OrdersCommand::List { all }) => {
            emit(&commands::order::list(state, *all).await?, json, &currency)
        }
        Command::Orders(OrdersCommand::Add(args)) => {
            let new = NewOrder {
                reservation_id: args.reservation.clone(),
                visitor_name: args.name.clone(),
                category: args.category,
                ticket_type: args.ticket_type,
                quantity: args.quantity,
                visit_date: args.visit_date,
                token: args.token.clone(),
            };
            emit(&commands::order::add(state, new, now).await?, json, &currency)
        }
        Command::Orders(OrdersCommand::Import { file }) => {
            emit(&commands::order::import(state, file).await?, json, &currency)
        }
        Command::Orders(OrdersCommand::Approve { id }) => {
            emit(&commands::order::approve(state, id, now).await?, json, &currency)
        }
        Command::Orders(OrdersCommand::Reject { id }) => {
            emit(&commands::order::reject(state, id).await?, json, &currency)
        }
        Command::Prices => emit(&commands::config::prices(state), json, &currency),
        Command::Config(ConfigCommand::Show) => {
            emit(&commands::config::show(state, cli.config.clone()), json, &currency)
        }
        Command::Config(ConfigCommand::Init { .. }) => {
            Err(ApiError::internal("config init is handled before storage is opened").into())
        }
    }
}

async fn print_visitors(
    state: &AppState,
    filter: &cli::FilterArgs,
    document: VisitorDocument,
    now: chrono::DateTime<Utc>,
) -> ApiResult<commands::Printed> {
    let request = filter.clone().into();
    commands::report::print_visitors(state, &request, document, now).await
}

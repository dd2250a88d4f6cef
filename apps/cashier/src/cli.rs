//! # Command Line
//!
//! ```text
//! zoo-cashier [--config FILE] [--json] [-v]
//!   sell     --client NAME --add CATEGORY:TYPE=QTY... [--receipt]
//!   quote    --add CATEGORY:TYPE=QTY... [--client NAME] [--receipt]
//!   ledger   list | show ID | clear --yes
//!   invoice  SALE_ID
//!   report   daily [--date YYYY-MM-DD]
//!   visitors stats | list | report [--period P] [--date D] [--category C] [--search S]
//!   orders   list [--all] | add ... | import FILE | approve ID | reject ID
//!   prices
//!   config   show | init [--force]
//! ```

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use zoo_core::{Period, TicketType, VisitorCategory};

use crate::commands::report::FilterRequest;
use crate::commands::sale::TicketSpec;

#[derive(Debug, Parser)]
#[command(
    name = "zoo-cashier",
    about = env!("CARGO_PKG_DESCRIPTION"),
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        help = "Configuration file (default: $ZOO_CONFIG or the platform config dir)"
    )]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Print results as JSON instead of tables")]
    pub json: bool,

    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "More logging (-v debug, -vv trace)"
    )]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Record a sale and optionally print its receipt
    Sell(SellArgs),

    /// Price tickets without recording anything
    Quote(QuoteArgs),

    /// Browse or clear the sale ledger
    #[command(subcommand)]
    Ledger(LedgerCommand),

    /// Print the invoice of a recorded sale
    Invoice {
        #[arg(help = "Sale id (SALE-...)")]
        sale_id: String,
    },

    /// Cash desk reports
    #[command(subcommand)]
    Report(ReportCommand),

    /// Visitor statistics and printed visitor documents
    #[command(subcommand)]
    Visitors(VisitorsCommand),

    /// Finance orders waiting for approval
    #[command(subcommand)]
    Orders(OrdersCommand),

    /// Show the tariff and the group discount
    Prices,

    /// Show or create the configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Debug, Args)]
pub struct SellArgs {
    #[arg(long, help = "Client name printed on the receipt")]
    pub client: String,

    #[arg(
        long = "add",
        value_name = "CATEGORY:TYPE=QTY",
        required = true,
        help = "Tickets, e.g. national:adult=2 (repeatable)"
    )]
    pub tickets: Vec<TicketSpec>,

    #[arg(long, help = "Print the receipt after recording")]
    pub receipt: bool,
}

#[derive(Debug, Args)]
pub struct QuoteArgs {
    #[arg(
        long = "add",
        value_name = "CATEGORY:TYPE=QTY",
        required = true,
        help = "Tickets, e.g. expatriate:child=3 (repeatable)"
    )]
    pub tickets: Vec<TicketSpec>,

    #[arg(long, help = "(Optional) Client name, needed for --receipt")]
    pub client: Option<String>,

    #[arg(long, help = "Print a preview receipt")]
    pub receipt: bool,
}

#[derive(Debug, Subcommand)]
pub enum LedgerCommand {
    /// Every recorded sale, oldest first
    List,
    /// One sale with its lines
    Show { id: String },
    /// Delete every sale
    Clear {
        #[arg(long, help = "Confirm the deletion")]
        yes: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum ReportCommand {
    /// Print the daily cash report
    Daily {
        #[arg(long, help = "Day to report (YYYY-MM-DD, default: today)")]
        date: Option<NaiveDate>,
    },
}

#[derive(Debug, Clone, Args)]
pub struct FilterArgs {
    #[arg(long, default_value = "day", help = "day | week | month | year | all")]
    pub period: Period,

    #[arg(long, help = "Anchor date of the period (YYYY-MM-DD, default: today)")]
    pub date: Option<NaiveDate>,

    #[arg(long, help = "Only sales with this visitor category")]
    pub category: Option<VisitorCategory>,

    #[arg(long, help = "Client name or sale id contains this text")]
    pub search: Option<String>,
}

impl From<FilterArgs> for FilterRequest {
    fn from(args: FilterArgs) -> Self {
        FilterRequest {
            period: args.period,
            date: args.date,
            category: args.category,
            search: args.search,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum VisitorsCommand {
    /// Visitor figures for the selection
    Stats(FilterArgs),
    /// Print the visitor list
    List(FilterArgs),
    /// Print the detailed visitor report
    Report(FilterArgs),
}

#[derive(Debug, Subcommand)]
pub enum OrdersCommand {
    /// Pending orders (all orders with --all)
    List {
        #[arg(long, help = "Include processed orders")]
        all: bool,
    },
    /// Enter an order from a reservation
    Add(AddOrderArgs),
    /// Import a JSON array of orders (all or nothing)
    Import { file: PathBuf },
    /// Approve an order: records the matching sale
    Approve { id: String },
    /// Reject an order: deletes it
    Reject { id: String },
}

#[derive(Debug, Args)]
pub struct AddOrderArgs {
    #[arg(long, help = "Reservation reference")]
    pub reservation: String,

    #[arg(long, help = "Visitor name")]
    pub name: String,

    #[arg(long)]
    pub category: VisitorCategory,

    #[arg(long = "type", value_name = "TYPE")]
    pub ticket_type: TicketType,

    #[arg(long)]
    pub quantity: i64,

    #[arg(long, help = "Visit date (YYYY-MM-DD)")]
    pub visit_date: NaiveDate,

    #[arg(long, help = "Payment token from the reservation")]
    pub token: String,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Effective configuration (file + environment)
    Show,
    /// Write the effective configuration to the config file
    Init {
        #[arg(long, help = "Overwrite an existing file")]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("zoo-cashier").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_sell_arguments() {
        let cli = parse(&[
            "sell",
            "--client",
            "Famille Mbala",
            "--add",
            "national:adult=2",
            "--add",
            "diplomatique:enfant=1",
            "--receipt",
            "--json",
        ]);
        assert!(cli.json);
        match cli.command {
            Command::Sell(args) => {
                assert_eq!(args.client, "Famille Mbala");
                assert_eq!(args.tickets.len(), 2);
                assert_eq!(args.tickets[1].category, VisitorCategory::Diplomatic);
                assert!(args.receipt);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_sell_requires_client_and_tickets() {
        assert!(Cli::try_parse_from(["zoo-cashier", "sell", "--add", "national:adult=1"]).is_err());
        assert!(Cli::try_parse_from(["zoo-cashier", "sell", "--client", "X"]).is_err());
        assert!(
            Cli::try_parse_from(["zoo-cashier", "sell", "--client", "X", "--add", "lion:adult=1"])
                .is_err()
        );
    }

    #[test]
    fn test_visitor_filters() {
        let cli = parse(&[
            "visitors", "list", "--period", "semaine", "--date", "2025-03-12", "--category", "scientific",
        ]);
        match cli.command {
            Command::Visitors(VisitorsCommand::List(args)) => {
                let request = FilterRequest::from(args);
                assert_eq!(request.period, Period::Week);
                assert_eq!(request.date, NaiveDate::from_ymd_opt(2025, 3, 12));
                assert_eq!(request.category, Some(VisitorCategory::Scientific));
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let cli = parse(&["visitors", "stats"]);
        match cli.command {
            Command::Visitors(VisitorsCommand::Stats(args)) => assert_eq!(args.period, Period::Day),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_order_commands() {
        let cli = parse(&[
            "orders", "add", "--reservation", "RES-9", "--name", "Mme Smith", "--category", "expat",
            "--type", "adult", "--quantity", "2", "--visit-date", "2025-07-05", "--token", "tok",
        ]);
        match cli.command {
            Command::Orders(OrdersCommand::Add(args)) => {
                assert_eq!(args.category, VisitorCategory::Expatriate);
                assert_eq!(args.ticket_type, TicketType::Adult);
                assert_eq!(args.quantity, 2);
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let cli = parse(&["orders", "list", "--all"]);
        assert!(matches!(cli.command, Command::Orders(OrdersCommand::List { all: true })));
    }

    #[test]
    fn test_global_flags_anywhere() {
        let cli = parse(&["-vv", "ledger", "clear", "--yes", "--config", "/tmp/zoo.toml"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/zoo.toml")));
        assert!(matches!(cli.command, Command::Ledger(LedgerCommand::Clear { yes: true })));
    }
}

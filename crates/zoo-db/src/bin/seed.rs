//! # Seed Data Generator
//!
//! Fills a ledger with demo sales and pending finance orders.
//!
//! ## Usage
//! ```bash
//! # Seven days of sales into ./zoo_dev.db (default)
//! cargo run -p zoo-db --bin seed
//!
//! # Thirty days
//! cargo run -p zoo-db --bin seed -- --days 30
//!
//! # JSON snapshot files instead of SQLite
//! cargo run -p zoo-db --bin seed -- --json ./data
//! ```
//!
//! Every day gets a handful of sales mixing all four categories, one of
//! them a school group above the discount threshold.

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use std::env;
use std::path::PathBuf;
use zoo_core::{ids, FinanceOrder, Money, OrderStatus, TicketSheet, TicketType, VisitorCategory};
use zoo_db::{Database, DbConfig, Repositories};

const CLIENTS: &[&str] = &[
    "Famille Mbala",
    "Famille Kasongo",
    "Ambassade de France",
    "Université de Kinshasa",
    "M. et Mme Dupont",
    "Complexe scolaire Les Anges",
    "Famille Tshisekedi",
    "Institut des Musées Nationaux",
];

/// (category, ticket type, quantity) per client slot.
const BASKETS: &[&[(VisitorCategory, TicketType, i64)]] = &[
    &[(VisitorCategory::National, TicketType::Adult, 2), (VisitorCategory::National, TicketType::Child, 3)],
    &[(VisitorCategory::National, TicketType::Adult, 1), (VisitorCategory::National, TicketType::Child, 1)],
    &[(VisitorCategory::Diplomatic, TicketType::Adult, 4), (VisitorCategory::Expatriate, TicketType::Child, 2)],
    &[(VisitorCategory::Scientific, TicketType::Adult, 12)],
    &[(VisitorCategory::Expatriate, TicketType::Adult, 2)],
    &[(VisitorCategory::National, TicketType::Adult, 8), (VisitorCategory::National, TicketType::Child, 110)],
    &[(VisitorCategory::National, TicketType::Adult, 3)],
    &[(VisitorCategory::Scientific, TicketType::Child, 5), (VisitorCategory::National, TicketType::Adult, 1)],
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    let mut days: i64 = 7;
    let mut db_path = "./zoo_dev.db".to_string();
    let mut json_dir: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--days" | "-n" => {
                if i + 1 < args.len() {
                    days = args[i + 1].parse().context("--days expects a number")?;
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--json" | "-j" => {
                if i + 1 < args.len() {
                    json_dir = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Zoo Cashier Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -n, --days <N>     Days of sales to generate (default: 7)");
                println!("  -d, --db <PATH>    Database file path (default: ./zoo_dev.db)");
                println!("  -j, --json <DIR>   Write JSON snapshot files into DIR instead");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Zoo Cashier Seed Data Generator");
    println!("===============================");

    let repos = match &json_dir {
        Some(dir) => {
            println!("Snapshots: {}", dir.display());
            Repositories::json(dir).await?
        }
        None => {
            println!("Database: {}", db_path);
            let db = Database::new(DbConfig::new(&db_path)).await?;
            Repositories::sqlite(&db)
        }
    };

    let existing = repos.sales.list().await?.len();
    if existing > 0 {
        println!("Ledger already has {} sales, skipping seed.", existing);
        println!("Clear the ledger to regenerate.");
        return Ok(());
    }

    let now = Utc::now();
    let mut generated = 0;
    let mut revenue = Money::zero();

    for day in 0..days.max(0) {
        let opening = now - Duration::days(day);
        for (slot, client) in CLIENTS.iter().enumerate() {
            // Skip some slots so days differ
            if (day as usize + slot) % 3 == 2 {
                continue;
            }
            let at = opening - Duration::minutes(35 * slot as i64);
            let sale = {
                let mut sheet = TicketSheet::standard(at);
                for &(category, ticket_type, qty) in BASKETS[slot % BASKETS.len()] {
                    sheet.set_quantity(category, ticket_type, qty);
                }
                sheet.set_client_name(*client);
                sheet.checkout(at)?
            };

            revenue += sale.net_amount;
            repos.sales.append(&sale).await?;
            generated += 1;
        }
    }

    println!("Generated {} sales, net {}", generated, revenue);

    for (n, order) in pending_orders(now).into_iter().enumerate() {
        repos.orders.insert(&order).await?;
        println!("  Pending order {}: {} ({})", n + 1, order.id, order.visitor_name);
    }

    println!();
    println!("Seed complete!");
    Ok(())
}

fn pending_orders(now: DateTime<Utc>) -> Vec<FinanceOrder> {
    let specs = [
        ("Famille Ilunga", VisitorCategory::National, TicketType::Child, 4),
        ("Lycée Bosangani", VisitorCategory::National, TicketType::Child, 120),
        ("Mme Smith", VisitorCategory::Expatriate, TicketType::Adult, 2),
    ];

    specs
        .iter()
        .enumerate()
        .map(|(n, &(name, category, ticket_type, quantity))| FinanceOrder {
            id: ids::order_id(now),
            reservation_id: format!("RES-{:04}", n + 1),
            visitor_name: name.to_string(),
            category,
            ticket_type,
            quantity,
            total_amount: Money::zero(),
            visit_date: (now + Duration::days(n as i64 + 1)).date_naive(),
            status: OrderStatus::Pending,
            token: format!("seed-token-{}", n + 1),
            transfer_date: Some(now),
        })
        .collect()
}

//! # Terminal Output
//!
//! Command results go to stdout either as tables for the cashier or as
//! pretty JSON (`--json`) for scripts. Logs stay on stderr.

use comfy_table::{presets::UTF8_FULL, Cell, Table};
use serde::Serialize;
use zoo_core::{FinanceOrder, Money, Sale};

use crate::commands::config::{ConfigView, PriceList};
use crate::commands::order::{Approved, Imported, Rejected};
use crate::commands::report::VisitorSummary;
use crate::commands::sale::{LedgerCleared, Quote, SaleRecorded};
use crate::commands::Printed;

/// Human rendering of a command result.
pub trait Render: Serialize {
    fn render(&self, currency: &str) -> String;
}

/// Prints `value` as JSON or as its rendering.
pub fn emit<T: Render>(value: &T, json: bool, currency: &str) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", value.render(currency));
    }
    Ok(())
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

fn money(amount: Money, currency: &str) -> String {
    amount.format_with(currency)
}

fn sale_table(sales: &[Sale], currency: &str) -> Table {
    let rows = sales
        .iter()
        .map(|s| {
            vec![
                s.id.clone(),
                s.timestamp.format("%d/%m/%Y %H:%M").to_string(),
                s.client_name.clone(),
                s.visitor_count.to_string(),
                money(s.gross_amount, currency),
                money(s.discount_amount, currency),
                money(s.net_amount, currency),
            ]
        })
        .collect();
    pretty_table(
        &["Référence", "Date", "Client", "Visiteurs", "Montant", "Réduction", "Net"],
        rows,
    )
}

fn sale_detail(sale: &Sale, currency: &str) -> String {
    let rows = sale
        .lines
        .iter()
        .map(|l| {
            vec![
                l.visitor_category.label().to_string(),
                l.ticket_type.label().to_string(),
                l.quantity.to_string(),
                money(l.unit_price, currency),
                money(l.line_total, currency),
            ]
        })
        .collect();

    let mut out = format!(
        "Vente {}  (facture {})\nClient: {}\nDate: {}\n",
        sale.id,
        sale.invoice_number,
        sale.client_name,
        sale.timestamp.format("%d/%m/%Y %H:%M:%S")
    );
    if let Some(order_id) = &sale.order_id {
        out.push_str(&format!("Commande: {}\n", order_id));
    }
    out.push_str(&pretty_table(&["Catégorie", "Type", "Qté", "Prix U.", "Total"], rows).to_string());
    out.push_str(&format!(
        "\nSous-total: {}\nRéduction: {}\nTOTAL: {}",
        money(sale.gross_amount, currency),
        money(sale.discount_amount, currency),
        money(sale.net_amount, currency)
    ));
    out
}

fn order_table(orders: &[FinanceOrder], currency: &str) -> Table {
    let rows = orders
        .iter()
        .map(|o| {
            vec![
                o.id.clone(),
                o.reservation_id.clone(),
                o.visitor_name.clone(),
                format!("{} - {}", o.category.label(), o.ticket_type.label()),
                o.quantity.to_string(),
                money(o.total_amount, currency),
                o.visit_date.format("%d/%m/%Y").to_string(),
                o.status.label().to_string(),
            ]
        })
        .collect();
    pretty_table(
        &["Commande", "Réservation", "Visiteur", "Billet", "Qté", "Montant", "Visite", "Statut"],
        rows,
    )
}

// =============================================================================
// Render implementations
// =============================================================================

impl Render for Vec<Sale> {
    fn render(&self, currency: &str) -> String {
        if self.is_empty() {
            return "Aucune vente enregistrée".to_string();
        }
        let net: Money = self.iter().map(|s| s.net_amount).sum();
        format!(
            "{}\n{} vente(s), net {}",
            sale_table(self, currency),
            self.len(),
            money(net, currency)
        )
    }
}

impl Render for Sale {
    fn render(&self, currency: &str) -> String {
        sale_detail(self, currency)
    }
}

impl Render for SaleRecorded {
    fn render(&self, currency: &str) -> String {
        let mut out = format!("Vente enregistrée\n{}", sale_detail(&self.sale, currency));
        if let Some(receipt) = &self.receipt {
            out.push_str(&format!("\n{}", receipt.render(currency)));
        }
        out
    }
}

impl Render for Quote {
    fn render(&self, currency: &str) -> String {
        let rows = self
            .lines
            .iter()
            .map(|l| {
                vec![
                    l.label(),
                    l.quantity.to_string(),
                    money(l.unit_price, currency),
                    money(l.line_total, currency),
                ]
            })
            .collect();
        let mut out = pretty_table(&["Billet", "Qté", "Prix U.", "Total"], rows).to_string();
        out.push_str(&format!(
            "\nVisiteurs: {}\nSous-total: {}\nRéduction: {}\nTOTAL: {}",
            self.totals.visitor_count,
            money(self.totals.gross_amount, currency),
            money(self.totals.discount_amount, currency),
            money(self.totals.net_amount, currency)
        ));
        if let Some(receipt) = &self.receipt {
            out.push_str(&format!("\n{}", receipt.render(currency)));
        }
        out
    }
}

impl Render for LedgerCleared {
    fn render(&self, _currency: &str) -> String {
        format!("{} vente(s) supprimée(s)", self.removed)
    }
}

impl Render for Printed {
    fn render(&self, _currency: &str) -> String {
        format!("Document prêt à imprimer : {}", self.path.display())
    }
}

impl Render for Vec<FinanceOrder> {
    fn render(&self, currency: &str) -> String {
        if self.is_empty() {
            return "Aucune commande en attente".to_string();
        }
        order_table(self, currency).to_string()
    }
}

impl Render for FinanceOrder {
    fn render(&self, currency: &str) -> String {
        format!(
            "Commande enregistrée\n{}",
            order_table(std::slice::from_ref(self), currency)
        )
    }
}

impl Render for Imported {
    fn render(&self, _currency: &str) -> String {
        format!("{} commande(s) importée(s) : {}", self.imported, self.ids.join(", "))
    }
}

impl Render for Approved {
    fn render(&self, currency: &str) -> String {
        format!(
            "Commande {} approuvée\n{}",
            self.order.id,
            sale_detail(&self.sale, currency)
        )
    }
}

impl Render for Rejected {
    fn render(&self, _currency: &str) -> String {
        format!("Commande {} rejetée et supprimée", self.order_id)
    }
}

impl Render for VisitorSummary {
    fn render(&self, currency: &str) -> String {
        let stats = &self.stats;
        let mut out = format!("Période: {}\nCatégorie: {}\n", self.period, self.category);
        out.push_str(
            &pretty_table(
                &["Total Visiteurs", "Total Ventes", "Recettes Totales", "Moyenne par vente"],
                vec![vec![
                    stats.total_visitors.to_string(),
                    stats.total_sales.to_string(),
                    money(stats.total_revenue, currency),
                    money(stats.average_per_sale, currency),
                ]],
            )
            .to_string(),
        );

        let rows = stats
            .categories
            .iter()
            .map(|c| {
                vec![
                    c.category.label().to_string(),
                    c.visitors.to_string(),
                    c.share_label(stats.total_visitors),
                    money(c.revenue, currency),
                    if c.category.is_free() { "GRATUIT" } else { "PAYANT" }.to_string(),
                ]
            })
            .collect();
        out.push('\n');
        out.push_str(
            &pretty_table(&["Catégorie", "Nombre", "Pourcentage", "Recettes", "Statut"], rows)
                .to_string(),
        );

        if !self.sales.is_empty() {
            out.push('\n');
            out.push_str(&sale_table(&self.sales, currency).to_string());
        }
        out
    }
}

impl Render for PriceList {
    fn render(&self, currency: &str) -> String {
        let rows = self
            .entries
            .iter()
            .map(|e| {
                let price = if e.free {
                    "Gratuit".to_string()
                } else {
                    money(e.unit_price, currency)
                };
                vec![
                    e.category.label().to_string(),
                    e.ticket_type.label().to_string(),
                    price,
                ]
            })
            .collect();
        format!(
            "{}\nRéduction de groupe: {} à partir de {} visiteurs",
            pretty_table(&["Catégorie", "Type", "Prix"], rows),
            self.discount_percent,
            self.discount_threshold
        )
    }
}

impl Render for ConfigView {
    fn render(&self, _currency: &str) -> String {
        let file = self
            .config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(aucun)".to_string());
        let toml = toml::to_string_pretty(&self.config)
            .unwrap_or_else(|e| format!("# configuration illisible : {}", e));
        format!(
            "# Fichier: {}\n# Données: {}\n# Impressions: {}\n{}",
            file,
            self.data_dir.display(),
            self.print_dir.display(),
            toml
        )
    }
}

impl Render for std::path::PathBuf {
    fn render(&self, _currency: &str) -> String {
        format!("Configuration écrite : {}", self.display())
    }
}

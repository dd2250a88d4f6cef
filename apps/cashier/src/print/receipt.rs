//! # Receipt and Invoice
//!
//! One sale on one page. The receipt is handed over at the desk; the
//! invoice is reprinted later from the ledger and carries the invoice
//! number.

use zoo_core::{DiscountPolicy, Sale};

use super::{amount, escape_html, footer, header, page, table, Document, DocumentKind};
use crate::state::config::StoreInfo;

const SALE_STYLE: &str = r#".client-info { background: #f4f8f5; border-left: 4px solid #1a5632; padding: 8px 12px; margin-bottom: 15px; }
.totals { text-align: right; margin-top: 10px; }
.totals .grand-total { font-size: 18px; font-weight: bold; color: #1a5632; }
.thanks { text-align: center; font-style: italic; margin-top: 20px; }"#;

/// REÇU DE VENTE for a recorded sale or a sheet preview.
pub fn receipt(sale: &Sale, store: &StoreInfo, policy: &DiscountPolicy) -> Document {
    let meta = vec![
        format!("Référence: {}", sale.id),
        format!("Date: {}", sale.timestamp.format("%d/%m/%Y %H:%M:%S")),
    ];
    Document {
        kind: DocumentKind::Receipt,
        reference: sale.id.clone(),
        html: render(sale, store, policy, "REÇU DE VENTE", &meta, "Reçu"),
    }
}

/// FACTURE for a sale already in the ledger.
pub fn invoice(sale: &Sale, store: &StoreInfo, policy: &DiscountPolicy) -> Document {
    let mut meta = vec![
        format!("Facture N°: {}", sale.invoice_number),
        format!("Référence: {}", sale.id),
        format!("Date: {}", sale.timestamp.format("%d/%m/%Y %H:%M:%S")),
    ];
    if let Some(order_id) = &sale.order_id {
        meta.push(format!("Commande: {}", order_id));
    }
    Document {
        kind: DocumentKind::Invoice,
        reference: sale.invoice_number.clone(),
        html: render(sale, store, policy, "FACTURE", &meta, "Facture"),
    }
}

fn render(
    sale: &Sale,
    store: &StoreInfo,
    policy: &DiscountPolicy,
    heading: &str,
    meta: &[String],
    title: &str,
) -> String {
    let mut body = header(store, heading, meta);

    body.push_str(&format!(
        "<div class=\"client-info\"><strong>Client:</strong> {}</div>\n",
        escape_html(&sale.client_name)
    ));

    let rows: Vec<Vec<String>> = sale
        .lines
        .iter()
        .map(|line| {
            let unit = if line.unit_price.is_zero() {
                "Gratuit".to_string()
            } else {
                amount(line.unit_price, store)
            };
            vec![
                escape_html(line.visitor_category.label()),
                escape_html(line.ticket_type.label()),
                line.quantity.to_string(),
                unit,
                amount(line.line_total, store),
            ]
        })
        .collect();
    body.push_str(&table(
        &["Catégorie", "Type", "Qté", "Prix U.", "Total"],
        &rows,
        |_| None,
    ));

    body.push_str("<div class=\"totals\">\n");
    body.push_str(&format!(
        "<p>Sous-total: {}</p>\n",
        amount(sale.gross_amount, store)
    ));
    if !sale.discount_amount.is_zero() {
        body.push_str(&format!(
            "<p>Réduction {}: -{}</p>\n",
            escape_html(&policy.percent_label()),
            amount(sale.discount_amount, store)
        ));
    }
    body.push_str(&format!(
        "<p class=\"grand-total\">TOTAL: {}</p>\n</div>\n",
        amount(sale.net_amount, store)
    ));

    body.push_str(&format!(
        "<p class=\"thanks\">Merci {} pour votre visite !</p>\n",
        escape_html(&sale.client_name)
    ));

    body.push_str(&footer(&[
        format!("{} - {}", store.name, store.address),
        format!("Tél: {}", store.phone),
        store.website.clone(),
    ]));

    page(&format!("{} - {}", title, store.name), SALE_STYLE, &body)
}

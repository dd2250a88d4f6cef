//! # Cash and Visitor Reports
//!
//! ```text
//! report daily              ──► daily_report()     RAPPORT JOURNALIER DE CAISSE
//! visitors list   [filters] ──► visitor_list()     LISTE DES VISITEURS
//! visitors report [filters] ──► detailed_report()  RAPPORT DÉTAILLÉ DES VISITEURS
//! ```
//!
//! Each report refuses to render an empty selection.

use chrono::{DateTime, NaiveDate, Utc};
use zoo_core::{CoreError, CoreResult, Sale, SaleFilter, VisitorCategory, VisitorStats};

use super::{amount, escape_html, footer, header, page, table, Document, DocumentKind};
use crate::state::config::StoreInfo;

/// Shown when a visitor document is asked for an empty selection.
pub const NO_DATA_MESSAGE: &str = "Aucune donnée à imprimer pour les critères sélectionnés";

const REPORT_STYLE: &str = r#".summary { background: #f4f8f5; padding: 10px 15px; margin-bottom: 15px; }
.summary p { margin: 4px 0; }
.stats { display: flex; gap: 10px; margin-bottom: 15px; }
.stat-card { flex: 1; border: 1px solid #1a5632; border-radius: 4px; padding: 10px; text-align: center; }
.stat-card .value { font-size: 20px; font-weight: bold; color: #1a5632; }
.free-category td { color: #1a5632; font-style: italic; }"#;

/// "Aucune vente enregistrée aujourd'hui" for today, the date otherwise.
pub fn no_sales_message(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        "Aucune vente enregistrée aujourd'hui".to_string()
    } else {
        format!("Aucune vente enregistrée le {}", date.format("%d/%m/%Y"))
    }
}

fn status(category: VisitorCategory) -> &'static str {
    if category.is_free() {
        "GRATUIT"
    } else {
        "PAYANT"
    }
}

fn generated_line(generated_at: DateTime<Utc>) -> String {
    format!("Rapport généré le {}", generated_at.format("%d/%m/%Y %H:%M"))
}

fn summary(title: &str, lines: &[(&str, String)]) -> String {
    let mut html = format!("<div class=\"summary\">\n<h3>{}</h3>\n", escape_html(title));
    for (label, value) in lines {
        html.push_str(&format!("<p><strong>{}:</strong> {}</p>\n", escape_html(label), value));
    }
    html.push_str("</div>\n");
    html
}

// =============================================================================
// Daily Cash Report
// =============================================================================

/// RAPPORT JOURNALIER DE CAISSE for the sales of `date`.
///
/// ## Errors
/// [`CoreError::NothingToPrint`] when `sales` is empty.
pub fn daily_report(
    date: NaiveDate,
    sales: &[&Sale],
    store: &StoreInfo,
    generated_at: DateTime<Utc>,
) -> CoreResult<Document> {
    if sales.is_empty() {
        return Err(CoreError::nothing_to_print(no_sales_message(
            date,
            generated_at.date_naive(),
        )));
    }

    let stats = VisitorStats::from_sales(sales.iter().copied());

    let mut body = header(
        store,
        "RAPPORT JOURNALIER DE CAISSE",
        &[format!("Date: {}", date.format("%d/%m/%Y"))],
    );

    body.push_str(&summary(
        "Résumé de la journée",
        &[
            ("Total des ventes", stats.total_sales.to_string()),
            ("Total des visiteurs", stats.total_visitors.to_string()),
            ("Total des recettes (net)", amount(stats.total_revenue, store)),
            ("Total des réductions", amount(stats.total_discount, store)),
        ],
    ));

    let mut rows: Vec<Vec<String>> = sales
        .iter()
        .map(|sale| {
            vec![
                escape_html(&sale.id),
                escape_html(&sale.client_name),
                sale.timestamp.format("%H:%M").to_string(),
                sale.visitor_count.to_string(),
                amount(sale.gross_amount, store),
                amount(sale.discount_amount, store),
                amount(sale.net_amount, store),
            ]
        })
        .collect();
    rows.push(vec![
        "TOTAL JOURNALIER".to_string(),
        String::new(),
        String::new(),
        stats.total_visitors.to_string(),
        amount(stats.gross_revenue, store),
        amount(stats.total_discount, store),
        amount(stats.total_revenue, store),
    ]);
    let last = rows.len() - 1;

    body.push_str("<h3>Détail des ventes</h3>\n");
    body.push_str(&table(
        &["Référence", "Client", "Heure", "Visiteurs", "Montant", "Réduction", "Net"],
        &rows,
        |i| (i == last).then_some("total-row"),
    ));

    body.push_str(&footer(&[
        generated_line(generated_at),
        format!("{} - Service de Caisse", store.name),
    ]));

    Ok(Document {
        kind: DocumentKind::DailyReport,
        reference: date.format("%Y-%m-%d").to_string(),
        html: page(&format!("Rapport journalier - {}", store.name), REPORT_STYLE, &body),
    })
}

// =============================================================================
// Visitor Documents
// =============================================================================

fn filter_reference(filter: &SaleFilter) -> String {
    match filter.category {
        Some(category) => format!("{}-{}-{}", filter.period, filter.date, category.as_str()),
        None => format!("{}-{}", filter.period, filter.date),
    }
}

/// Category breakdown rows plus a TOTAL row. Free categories are tagged
/// for the stylesheet.
fn category_rows(
    stats: &VisitorStats,
    store: &StoreInfo,
    with_revenue: bool,
) -> (Vec<Vec<String>>, Vec<bool>) {
    let mut rows = Vec::new();
    let mut free = Vec::new();

    for entry in &stats.categories {
        let mut row = vec![
            escape_html(entry.category.label()),
            entry.visitors.to_string(),
            entry.share_label(stats.total_visitors),
        ];
        if with_revenue {
            row.push(amount(entry.revenue, store));
        }
        row.push(status(entry.category).to_string());
        rows.push(row);
        free.push(entry.category.is_free());
    }

    let mut total = vec![
        "TOTAL".to_string(),
        stats.total_visitors.to_string(),
        "100%".to_string(),
    ];
    if with_revenue {
        total.push(amount(stats.total_revenue, store));
    }
    total.push(String::new());
    rows.push(total);
    free.push(false);

    (rows, free)
}

/// LISTE DES VISITEURS: summary, category breakdown, one row per sale.
///
/// ## Errors
/// [`CoreError::NothingToPrint`] when the selection is empty.
pub fn visitor_list(
    filter: &SaleFilter,
    sales: &[&Sale],
    store: &StoreInfo,
    generated_at: DateTime<Utc>,
) -> CoreResult<Document> {
    if sales.is_empty() {
        return Err(CoreError::nothing_to_print(NO_DATA_MESSAGE));
    }
    let stats = VisitorStats::from_sales(sales.iter().copied());

    let mut body = header(
        store,
        "LISTE DES VISITEURS",
        &[
            format!("Période: {}", filter.period_label()),
            format!("Catégorie: {}", filter.category_label()),
        ],
    );

    body.push_str(&summary(
        "Résumé",
        &[
            ("Total des clients", stats.total_sales.to_string()),
            ("Total des visiteurs", stats.total_visitors.to_string()),
            ("Recettes totales", amount(stats.total_revenue, store)),
        ],
    ));

    let (rows, free) = category_rows(&stats, store, false);
    let last = rows.len() - 1;
    body.push_str("<h3>Répartition par catégorie</h3>\n");
    body.push_str(&table(
        &["Catégorie", "Nombre de visiteurs", "Pourcentage", "Statut"],
        &rows,
        |i| {
            if i == last {
                Some("total-row")
            } else if free[i] {
                Some("free-category")
            } else {
                None
            }
        },
    ));

    let client_rows: Vec<Vec<String>> = sales
        .iter()
        .map(|sale| {
            let category = sale
                .lines
                .first()
                .map(|l| l.visitor_category.label())
                .unwrap_or("-");
            let paid = if sale.net_amount.is_zero() {
                "GRATUIT"
            } else {
                "PAYANT"
            };
            vec![
                sale.timestamp.format("%d/%m/%Y").to_string(),
                escape_html(&sale.id),
                escape_html(&sale.client_name),
                sale.visitor_count.to_string(),
                escape_html(category),
                amount(sale.net_amount, store),
                paid.to_string(),
            ]
        })
        .collect();
    body.push_str("<h3>Détail des clients</h3>\n");
    body.push_str(&table(
        &[
            "Date",
            "Référence",
            "Client",
            "Nombre de billets",
            "Catégorie",
            "Montant payé",
            "Statut",
        ],
        &client_rows,
        |_| None,
    ));

    body.push_str(&footer(&[
        generated_line(generated_at),
        format!("{} - Service des Visiteurs", store.name),
    ]));

    Ok(Document {
        kind: DocumentKind::VisitorList,
        reference: filter_reference(filter),
        html: page(&format!("Liste des visiteurs - {}", store.name), REPORT_STYLE, &body),
    })
}

/// RAPPORT DÉTAILLÉ DES VISITEURS: stat cards, category breakdown with
/// revenue, and one row per sale line.
///
/// ## Errors
/// [`CoreError::NothingToPrint`] when the selection is empty.
pub fn detailed_report(
    filter: &SaleFilter,
    sales: &[&Sale],
    store: &StoreInfo,
    generated_at: DateTime<Utc>,
) -> CoreResult<Document> {
    if sales.is_empty() {
        return Err(CoreError::nothing_to_print(NO_DATA_MESSAGE));
    }
    let stats = VisitorStats::from_sales(sales.iter().copied());

    let mut body = header(
        store,
        "RAPPORT DÉTAILLÉ DES VISITEURS",
        &[
            format!("Période: {}", filter.period_label()),
            format!("Catégorie: {}", filter.category_label()),
        ],
    );

    body.push_str("<div class=\"stats\">\n");
    for (label, value) in [
        ("Total Visiteurs", stats.total_visitors.to_string()),
        ("Total Ventes", stats.total_sales.to_string()),
        ("Recettes Totales", amount(stats.total_revenue, store)),
        ("Moyenne par vente", amount(stats.average_per_sale, store)),
    ] {
        body.push_str(&format!(
            "<div class=\"stat-card\"><div class=\"value\">{}</div><div>{}</div></div>\n",
            value,
            escape_html(label)
        ));
    }
    body.push_str("</div>\n");

    let (rows, free) = category_rows(&stats, store, true);
    let last = rows.len() - 1;
    body.push_str("<h3>Répartition par catégorie de visiteur</h3>\n");
    body.push_str(&table(
        &["Catégorie", "Nombre", "Pourcentage", "Recettes", "Statut"],
        &rows,
        |i| {
            if i == last {
                Some("total-row")
            } else if free[i] {
                Some("free-category")
            } else {
                None
            }
        },
    ));

    let mut line_rows = Vec::new();
    let mut line_free = Vec::new();
    for sale in sales {
        for line in &sale.lines {
            line_rows.push(vec![
                sale.timestamp.format("%d/%m/%Y").to_string(),
                sale.timestamp.format("%H:%M").to_string(),
                escape_html(&sale.id),
                escape_html(&sale.client_name),
                line.quantity.to_string(),
                escape_html(&line.label()),
                amount(line.unit_price, store),
                amount(line.line_total, store),
                status(line.visitor_category).to_string(),
            ]);
            line_free.push(line.visitor_category.is_free());
        }
    }
    body.push_str("<h3>Détail complet des ventes</h3>\n");
    body.push_str(&table(
        &[
            "Date",
            "Heure",
            "Référence",
            "Client",
            "Billets",
            "Catégorie",
            "Prix unitaire",
            "Montant",
            "Statut",
        ],
        &line_rows,
        |i| line_free[i].then_some("free-category"),
    ));

    body.push_str(&footer(&[
        generated_line(generated_at),
        format!("{} - Direction Générale", store.name),
    ]));

    Ok(Document {
        kind: DocumentKind::DetailedReport,
        reference: filter_reference(filter),
        html: page(
            &format!("Rapport détaillé des visiteurs - {}", store.name),
            REPORT_STYLE,
            &body,
        ),
    })
}

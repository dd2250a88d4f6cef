//! # Printable Documents
//!
//! Every printed output is a self-contained HTML page written to the print
//! directory, where the desk's browser or printer picks it up.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Print Flow                                           │
//! │                                                                         │
//! │  Sale / filtered ledger                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  receipt::receipt()        REÇU DE VENTE                                │
//! │  receipt::invoice()        FACTURE                                      │
//! │  report::daily_report()    RAPPORT JOURNALIER DE CAISSE                 │
//! │  report::visitor_list()    LISTE DES VISITEURS                          │
//! │  report::detailed_report() RAPPORT DÉTAILLÉ DES VISITEURS               │
//! │       │                                                                 │
//! │       ▼  Document { kind, reference, html }                             │
//! │  PrintSpool::spool() ──► <print dir>/<kind>-<reference>.html            │
//! │       │                                                                 │
//! │       └── write fails ──► "Impossible d'ouvrir le document              │
//! │                            d'impression" (no retry)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All text coming from the ledger or the cashier goes through
//! [`escape_html`] before reaching a page.

pub mod receipt;
pub mod report;

use std::path::{Path, PathBuf};
use tracing::{error, info};
use zoo_core::Money;

use crate::error::{ApiError, ApiResult};
use crate::state::config::StoreInfo;

/// Brand colour of the printed documents.
const ACCENT: &str = "#1a5632";

// =============================================================================
// Document
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Receipt,
    Invoice,
    DailyReport,
    VisitorList,
    DetailedReport,
}

impl DocumentKind {
    /// File name prefix in the print directory.
    pub const fn slug(&self) -> &'static str {
        match self {
            DocumentKind::Receipt => "recu",
            DocumentKind::Invoice => "facture",
            DocumentKind::DailyReport => "rapport-journalier",
            DocumentKind::VisitorList => "liste-visiteurs",
            DocumentKind::DetailedReport => "rapport-detaille",
        }
    }
}

/// A rendered page, ready for the spool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub kind: DocumentKind,
    /// Sale id, date or period the document is about.
    pub reference: String,
    pub html: String,
}

impl Document {
    /// `<kind>-<reference>.html` with anything unsafe in a file name
    /// replaced by `_`.
    pub fn file_name(&self) -> String {
        let reference: String = self
            .reference
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("{}-{}.html", self.kind.slug(), reference)
    }
}

// =============================================================================
// Print Spool
// =============================================================================

/// Directory the rendered documents are written into.
#[derive(Debug, Clone)]
pub struct PrintSpool {
    dir: PathBuf,
}

impl PrintSpool {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        PrintSpool { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `doc` and returns where it landed.
    ///
    /// ## Errors
    /// [`ApiError::print_failed`] if the directory or the file cannot be
    /// written. The underlying I/O error is only logged.
    pub async fn spool(&self, doc: &Document) -> ApiResult<PathBuf> {
        let path = self.dir.join(doc.file_name());

        let written: std::io::Result<()> = async {
            tokio::fs::create_dir_all(&self.dir).await?;
            tokio::fs::write(&path, doc.html.as_bytes()).await
        }
        .await;

        match written {
            Ok(()) => {
                info!(path = %path.display(), kind = doc.kind.slug(), "Document spooled");
                Ok(path)
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Print spool write failed");
                Err(ApiError::print_failed())
            }
        }
    }
}

// =============================================================================
// HTML helpers
// =============================================================================

/// Escapes text for element content and double-quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Amount with the configured currency, escaped.
pub(crate) fn amount(money: Money, store: &StoreInfo) -> String {
    escape_html(&money.format_with(&store.currency))
}

/// Wraps `body` in a full page with the shared stylesheet.
pub(crate) fn page(title: &str, extra_style: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="fr">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
body {{ font-family: Arial, sans-serif; margin: 20px; color: #222; }}
.header {{ text-align: center; border-bottom: 2px solid {accent}; padding-bottom: 10px; margin-bottom: 20px; }}
.header h1 {{ color: {accent}; margin: 0; }}
.header h2 {{ margin: 5px 0; }}
table {{ width: 100%; border-collapse: collapse; margin: 15px 0; }}
th {{ background: {accent}; color: #fff; padding: 8px; text-align: left; }}
td {{ border-bottom: 1px solid #ddd; padding: 6px 8px; }}
.total-row td {{ font-weight: bold; border-top: 2px solid {accent}; }}
.footer {{ text-align: center; margin-top: 30px; font-size: 12px; color: #666; }}
{extra_style}
</style>
</head>
<body>
{body}
</body>
</html>
"#,
        title = escape_html(title),
        accent = ACCENT,
        extra_style = extra_style,
        body = body,
    )
}

/// Store name, document heading and the meta lines under it.
pub(crate) fn header(store: &StoreInfo, heading: &str, meta: &[String]) -> String {
    let mut html = format!(
        "<div class=\"header\">\n<h1>{}</h1>\n<h2>{}</h2>\n",
        escape_html(&store.name),
        escape_html(heading)
    );
    for line in meta {
        html.push_str(&format!("<p>{}</p>\n", escape_html(line)));
    }
    html.push_str("</div>\n");
    html
}

/// Table with a header row; cells are already-escaped HTML.
pub(crate) fn table(
    headers: &[&str],
    rows: &[Vec<String>],
    class_of: impl Fn(usize) -> Option<&'static str>,
) -> String {
    let mut html = String::from("<table>\n<thead><tr>");
    for h in headers {
        html.push_str(&format!("<th>{}</th>", escape_html(h)));
    }
    html.push_str("</tr></thead>\n<tbody>\n");
    for (i, row) in rows.iter().enumerate() {
        match class_of(i) {
            Some(class) => html.push_str(&format!("<tr class=\"{}\">", class)),
            None => html.push_str("<tr>"),
        }
        for cell in row {
            html.push_str(&format!("<td>{}</td>", cell));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>\n");
    html
}

/// Footer lines, escaped.
pub(crate) fn footer(lines: &[String]) -> String {
    let mut html = String::from("<div class=\"footer\">\n");
    for line in lines {
        html.push_str(&format!("<p>{}</p>\n", escape_html(line)));
    }
    html.push_str("</div>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Tom & Jerry's"</b>"#),
            "&lt;b&gt;&quot;Tom &amp; Jerry&#39;s&quot;&lt;/b&gt;"
        );
        assert_eq!(escape_html("Famille Mbala"), "Famille Mbala");
    }

    #[test]
    fn test_file_name_is_sanitized() {
        let doc = Document {
            kind: DocumentKind::VisitorList,
            reference: "Semaine du 09/03/2025".to_string(),
            html: String::new(),
        };
        assert_eq!(doc.file_name(), "liste-visiteurs-Semaine_du_09_03_2025.html");
    }

    #[tokio::test]
    async fn test_spool_writes_into_print_dir() {
        let dir = tempfile::tempdir().unwrap();
        let spool = PrintSpool::new(dir.path().join("prints"));
        let doc = Document {
            kind: DocumentKind::Receipt,
            reference: "SALE-1".to_string(),
            html: "<p>ok</p>".to_string(),
        };

        let path = spool.spool(&doc).await.unwrap();
        assert_eq!(path, dir.path().join("prints").join("recu-SALE-1.html"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "<p>ok</p>");
    }

    #[tokio::test]
    async fn test_spool_failure_is_print_failed() {
        let dir = tempfile::tempdir().unwrap();
        // A file where the print directory should be
        let blocker = dir.path().join("prints");
        std::fs::write(&blocker, "not a directory").unwrap();

        let doc = Document {
            kind: DocumentKind::Invoice,
            reference: "SALE-1".to_string(),
            html: String::new(),
        };
        let err = PrintSpool::new(blocker).spool(&doc).await.unwrap_err();
        assert_eq!(err, ApiError::print_failed());
    }
}

//! # Configuration Commands

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;
use zoo_core::{Money, TicketType, VisitorCategory};

use crate::error::{ApiError, ApiResult};
use crate::state::config::CashierConfig;
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceEntry {
    pub category: VisitorCategory,
    pub ticket_type: TicketType,
    pub unit_price: Money,
    pub free: bool,
}

/// The tariff and the group discount rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceList {
    pub entries: Vec<PriceEntry>,
    /// Visitor count from which the discount applies.
    pub discount_threshold: i64,
    pub discount_percent: String,
}

pub fn prices(state: &AppState) -> PriceList {
    PriceList {
        entries: state
            .table
            .entries()
            .map(|(category, ticket_type, unit_price)| PriceEntry {
                category,
                ticket_type,
                unit_price,
                free: category.is_free(),
            })
            .collect(),
        discount_threshold: state.policy.threshold,
        discount_percent: state.policy.percent_label(),
    }
}

/// The effective configuration, after file and environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigView {
    pub config: CashierConfig,
    pub data_dir: PathBuf,
    pub print_dir: PathBuf,
    pub config_file: Option<PathBuf>,
}

pub fn show(state: &AppState, config_file: Option<PathBuf>) -> ConfigView {
    ConfigView {
        data_dir: state.config.data_dir(),
        print_dir: state.config.print_dir(),
        config: state.config.clone(),
        config_file: config_file.or_else(CashierConfig::default_config_path),
    }
}

/// Writes `config` to `path` unless a file is already there.
pub fn init(config: &CashierConfig, path: &Path, force: bool) -> ApiResult<PathBuf> {
    if path.exists() && !force {
        return Err(ApiError::validation(format!(
            "{} existe déjà (utilisez --force pour l'écraser)",
            path.display()
        )));
    }
    config.save(path)?;
    info!(path = %path.display(), "Configuration file written");
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::config::{StorageBackend, CONFIG_FILE};

    #[test]
    fn test_price_list() {
        let state = AppState::in_memory(CashierConfig::default());
        let list = prices(&state);

        assert_eq!(list.entries.len(), 8);
        assert_eq!(list.entries[0].unit_price.francs(), 2_500);
        assert_eq!(list.entries[1].unit_price.francs(), 1_000);
        assert!(list.entries.iter().filter(|e| e.free).all(|e| e.unit_price.is_zero()));
        assert_eq!(list.discount_threshold, 100);
        assert_eq!(list.discount_percent, "10%");
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let config = CashierConfig::under(dir.path(), StorageBackend::Json);

        assert_eq!(init(&config, &path, false).unwrap(), path);
        assert!(init(&config, &path, false).is_err());
        assert!(init(&config, &path, true).is_ok());
        assert_eq!(CashierConfig::load(Some(path)).unwrap(), config);
    }
}

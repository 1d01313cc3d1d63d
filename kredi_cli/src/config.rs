use std::{env, path::PathBuf};

use tracing::{debug, info};

/// Default catalog file when neither `--catalog` nor `KREDI_CATALOG` is set
pub const DEFAULT_CATALOG: &str = "catalog.krd";

pub struct Config {
    pub catalog_path: PathBuf,
    /// Written into lock files so other admins see who is editing
    pub user_id: String,
}

impl Config {
    /// Environment first, then defaults. A `--catalog` flag wins over both.
    pub fn load(catalog_override: Option<PathBuf>) -> Self {
        let catalog_path = catalog_override
            .unwrap_or_else(|| PathBuf::from(load_or("KREDI_CATALOG", DEFAULT_CATALOG)));

        let user_id = var("KREDI_USER")
            .or_else(|| var("USER"))
            .or_else(|| var("USERNAME"))
            .unwrap_or_else(|| {
                info!("KREDI_USER not set, using default: admin");
                "admin".to_string()
            });

        Self {
            catalog_path,
            user_id,
        }
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .or_else(|| {
            debug!("Environment variable {key} not found");
            None
        })
}

fn load_or(key: &str, default: &str) -> String {
    var(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins() {
        let config = Config::load(Some(PathBuf::from("/tmp/other.krd")));
        assert_eq!(config.catalog_path, PathBuf::from("/tmp/other.krd"));
        assert!(!config.user_id.is_empty());
    }
}

//! Data validation utilities.

use std::path::{Path, PathBuf};

use realm_core::data::EconomyConfig;
use realm_core::error::Result;

/// File name of the economy definition inside a data directory.
pub const ECONOMY_FILE: &str = "economy.ron";

/// Resolve a path argument to the economy file.
///
/// A directory means `<dir>/economy.ron`; anything else is used as is.
#[must_use]
pub fn economy_file(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join(ECONOMY_FILE)
    } else {
        path.to_path_buf()
    }
}

/// Parse and validate the economy definition at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be parsed or fails validation.
pub fn validate_data_directory(path: &Path) -> Result<EconomyConfig> {
    let file = economy_file(path);
    tracing::debug!(file = %file.display(), "Validating economy data");
    let config = EconomyConfig::load(&file)?;
    config.ensure_valid()?;
    tracing::info!(
        fantasy_structures = config.fantasy_structures.len(),
        scifi_structures = config.scifi_structures.len(),
        shops = config.shops.len(),
        "Economy data is valid"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use realm_core::error::EconomyError;

    #[test]
    fn test_shipped_data_is_valid() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/data");
        let config = validate_data_directory(&dir).unwrap();
        assert_eq!(config, EconomyConfig::default());
    }

    #[test]
    fn test_invalid_config_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = EconomyConfig::default();
        config.tap_yield = -1.0;
        std::fs::write(dir.path().join(ECONOMY_FILE), config.to_ron_string().unwrap()).unwrap();

        let err = validate_data_directory(dir.path()).unwrap_err();
        assert!(matches!(err, EconomyError::InvalidConfig(_)));
    }

    #[test]
    fn test_unparseable_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("broken.ron");
        std::fs::write(&file, "(tap_yield: )").unwrap();

        let err = validate_data_directory(&file).unwrap_err();
        assert!(matches!(err, EconomyError::DataParse { .. }));
    }
}

//! Config module.
//! Immutable render settings (square size, square colors, piece asset directory,
//! output path), loaded once at startup from an optional JSON file.
//! Missing keys fall back to defaults, so `{}` is a valid config.
//! Square size must be between 1 and `MAX_SQUARE_SIZE` pixels.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Largest accepted square edge, in pixels.
pub const MAX_SQUARE_SIZE: u32 = 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid render config: {0}")]
    Invalid(String),
}

/// Settings handed to the image renderer. Never mutated after load.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Edge length of one square, in pixels.
    pub square_size: u32,
    /// RGB of light squares (top-left is light).
    pub light: [u8; 3],
    pub dark: [u8; 3],
    /// Directory holding `wp.png`, `bk.png`, ...
    pub asset_dir: PathBuf,
    /// PNG rewritten on every render.
    pub output: PathBuf,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            square_size: 50,
            light: [240, 240, 240],
            dark: [96, 96, 96],
            asset_dir: PathBuf::from("image"),
            output: PathBuf::from("board.png"),
        }
    }
}

impl RenderConfig {
    /// Width and height of the rendered board, `None` on overflow.
    pub fn board_size(&self) -> Option<u32> {
        self.square_size.checked_mul(8)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.square_size == 0 || self.square_size > MAX_SQUARE_SIZE {
            return Err(ConfigError::Invalid(format!(
                "square_size must be between 1 and {} pixels, got {}",
                MAX_SQUARE_SIZE, self.square_size
            )));
        }
        if self.board_size().is_none() {
            return Err(ConfigError::Invalid(format!(
                "square_size {} overflows the board size",
                self.square_size
            )));
        }
        Ok(())
    }
}

/// Reads and validates a JSON config file.
pub fn load_config(path: &Path) -> Result<RenderConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: RenderConfig = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = RenderConfig::default();
        assert_eq!(config.square_size, 50);
        assert_eq!(config.board_size(), Some(400));
        assert!(config.validate().is_ok());
        assert_eq!(config.light, [240, 240, 240]);
        assert_eq!(config.dark, [96, 96, 96]);
    }

    #[test]
    fn test_load_config_partial_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"square_size": 64, "asset_dir": "pieces/merida"}}"#).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.square_size, 64);
        assert_eq!(config.asset_dir, PathBuf::from("pieces/merida"));
        assert_eq!(config.output, PathBuf::from("board.png"));
    }

    #[test]
    fn test_load_config_rejects_unknown_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"squaresize": 64}}"#).unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_config_rejects_bad_square_sizes() {
        for size in [0u64, 1025, u32::MAX as u64] {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            write!(file, r#"{{"square_size": {}}}"#, size).unwrap();

            let err = load_config(file.path()).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "size {size}: {err}");
        }
    }

    #[test]
    fn test_load_config_accepts_size_limits() {
        for size in [1, MAX_SQUARE_SIZE] {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            write!(file, r#"{{"square_size": {}}}"#, size).unwrap();
            assert_eq!(load_config(file.path()).unwrap().square_size, size);
        }
    }

    #[test]
    fn test_board_size_overflow() {
        let config = RenderConfig {
            square_size: u32::MAX,
            ..RenderConfig::default()
        };
        assert_eq!(config.board_size(), None);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config(Path::new("does/not/exist.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("does/not/exist.json"));
    }
}

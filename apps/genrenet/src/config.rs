//! # Configuration Loading
//!
//! Builds the run's [`Config`] in three layers:
//!
//! 1. compiled-in defaults
//! 2. a TOML file (`genrenet.toml` unless `--config` names another one)
//! 3. command-line overrides
//!
//! The result is validated once, before any cache or network activity.
//! The default file is optional; a file named with `--config` must exist.

use clap::Args;
use genrenet_core::{Config, GenreNetError};
use std::path::{Path, PathBuf};

/// Configuration file read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "genrenet.toml";

/// Command-line overrides of `[params]`.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct ParamOverrides {
    /// Lowest average rating kept (inclusive)
    #[arg(long)]
    pub minimal_rating: Option<f64>,

    /// Highest average rating kept (inclusive)
    #[arg(long)]
    pub maximal_rating: Option<f64>,

    /// Earliest release year kept (inclusive)
    #[arg(long)]
    pub minimal_year: Option<i32>,

    /// Latest release year kept (inclusive)
    #[arg(long)]
    pub maximal_year: Option<i32>,

    /// Lowest co-occurrence count drawn as an edge (inclusive)
    #[arg(long)]
    pub minimal_count: Option<u64>,

    /// Highest co-occurrence count drawn as an edge (inclusive)
    #[arg(long)]
    pub maximal_count: Option<u64>,

    /// Keep only the N most frequent pairs
    #[arg(long)]
    pub top: Option<usize>,

    /// Keep only the N least frequent pairs
    #[arg(long)]
    pub last: Option<usize>,

    /// Fraction in (0, 1] of qualifying titles to sample
    #[arg(long)]
    pub sampling: Option<f64>,

    /// Seed for reproducible sampling
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Command-line overrides of `[dataset]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetOverrides {
    pub cache_dir: Option<PathBuf>,
    pub freshness_days: Option<u32>,
    pub include_crew: bool,
    pub base_url: Option<String>,
}

/// Read the configuration file, apply overrides and validate.
pub fn load_config(
    path: Option<&Path>,
    params: &ParamOverrides,
    dataset: &DatasetOverrides,
) -> Result<Config, GenreNetError> {
    let mut config = match path {
        Some(path) => read_file(path)?,
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if default.is_file() {
                read_file(default)?
            } else {
                Config::default()
            }
        }
    };

    apply_params(&mut config, params);
    apply_dataset(&mut config, dataset);
    config.validate()?;

    Ok(config)
}

/// Parse a TOML configuration file.
pub fn read_file(path: &Path) -> Result<Config, GenreNetError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        GenreNetError::Configuration(format!("Cannot read {}: {}", path.display(), e))
    })?;
    parse(&raw)
        .map_err(|e| GenreNetError::Configuration(format!("{}: {}", path.display(), e)))
}

/// Parse TOML configuration text.
pub fn parse(raw: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(raw)
}

fn apply_params(config: &mut Config, overrides: &ParamOverrides) {
    let p = &mut config.params;
    if let Some(v) = overrides.minimal_rating {
        p.minimal_rating = v;
    }
    if let Some(v) = overrides.maximal_rating {
        p.maximal_rating = v;
    }
    if let Some(v) = overrides.minimal_year {
        p.minimal_year = v;
    }
    if let Some(v) = overrides.maximal_year {
        p.maximal_year = v;
    }
    if let Some(v) = overrides.minimal_count {
        p.minimal_count = v;
    }
    if let Some(v) = overrides.maximal_count {
        p.maximal_count = v;
    }
    if let Some(v) = overrides.top {
        p.top = v;
    }
    if let Some(v) = overrides.last {
        p.last = v;
    }
    if let Some(v) = overrides.sampling {
        p.sampling = v;
    }
    if overrides.seed.is_some() {
        p.seed = overrides.seed;
    }
}

fn apply_dataset(config: &mut Config, overrides: &DatasetOverrides) {
    if let Some(dir) = &overrides.cache_dir {
        config.dataset.cache_dir = dir.clone();
    }
    if let Some(days) = overrides.freshness_days {
        config.dataset.freshness_days = days;
    }
    if overrides.include_crew {
        config.dataset.include_crew = true;
    }
    if let Some(url) = &overrides.base_url {
        config.dataset.base_url = url.clone();
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_values_then_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("genrenet.toml");
        std::fs::write(
            &path,
            "[params]\nminimal_rating = 6.5\ntop = 10\n\n[dataset]\nfreshness_days = 3\n",
        )
        .expect("write");

        let overrides = ParamOverrides {
            top: Some(4),
            ..ParamOverrides::default()
        };
        let config = load_config(Some(&path), &overrides, &DatasetOverrides::default())
            .expect("load");

        assert!((config.params.minimal_rating - 6.5).abs() < f64::EPSILON);
        assert_eq!(config.params.top, 4);
        assert_eq!(config.dataset.freshness_days, 3);
    }

    #[test]
    fn explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load_config(
            Some(&dir.path().join("absent.toml")),
            &ParamOverrides::default(),
            &DatasetOverrides::default(),
        )
        .expect_err("missing");
        assert!(matches!(err, GenreNetError::Configuration(_)));
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert!(parse("[params]\nminimal_ratting = 5.0\n").is_err());
    }

    #[test]
    fn overrides_are_validated() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("genrenet.toml");
        std::fs::write(&path, "").expect("write");

        let overrides = ParamOverrides {
            sampling: Some(1.5),
            ..ParamOverrides::default()
        };
        let err = load_config(Some(&path), &overrides, &DatasetOverrides::default())
            .expect_err("sampling out of range");
        assert!(err.to_string().contains("sampling"));
    }
}

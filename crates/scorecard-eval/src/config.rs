//! Settings resolution for the evaluation binary.
//!
//! Each setting is resolved in order:
//! 1. Command-line flag
//! 2. Environment variable (`$SCORECARD_ENDPOINT`, `$SCORECARD_DATA_DIR`)
//! 3. Production default from [`scorecard_core::config`]

use anyhow::{anyhow, Result};
use scorecard_core::config::{DATA_DIR_ENV, DEFAULT_DATA_DIR, DEFAULT_ENDPOINT, ENDPOINT_ENV};
use std::path::PathBuf;

/// Resolves the analysis endpoint and checks it is an HTTP(S) URL.
pub fn endpoint(cli: Option<&str>) -> Result<String> {
    let env = std::env::var(ENDPOINT_ENV).ok();
    let endpoint = pick(cli.map(str::to_string), env, DEFAULT_ENDPOINT.to_string());

    if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
        return Err(anyhow!(
            "Unsupported endpoint: {} (only http/https allowed)",
            endpoint
        ));
    }
    Ok(endpoint)
}

/// Resolves the golden dataset directory.
///
/// The directory is not checked here; a missing dataset is reported when
/// the ground truth is loaded.
pub fn data_dir(cli: Option<&PathBuf>) -> PathBuf {
    let env = std::env::var(DATA_DIR_ENV).ok().map(PathBuf::from);
    pick(cli.cloned(), env, PathBuf::from(DEFAULT_DATA_DIR))
}

fn pick<T>(cli: Option<T>, env: Option<T>, default: T) -> T {
    cli.or(env).unwrap_or(default)
}

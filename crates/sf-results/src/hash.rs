//! Content-based fingerprint of a run configuration.

use serde::Serialize;
use sf_sim::RunConfig;
use sha2::{Digest, Sha256};

use crate::ResultsResult;

/// SHA-256 over the JSON form of `config`, as lowercase hex.
///
/// Stored in every checkpoint so a restart can tell whether it is resuming
/// under the configuration that produced it.
pub fn config_fingerprint<P: Serialize>(config: &RunConfig<P>) -> ResultsResult<String> {
    let mut hasher = Sha256::new();
    let json = serde_json::to_string(config)?;
    hasher.update(json.as_bytes());
    let result = hasher.finalize();
    Ok(format!("{:x}", result))
}

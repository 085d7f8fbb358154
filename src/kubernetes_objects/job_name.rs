use rand::TryRngCore;
use rand::rngs::OsRng;

use crate::config::ConfigError;

const RANDOM_SUFFIX_BYTES: usize = 16;

/// Appends 128 random bits, hex encoded, to `base`.
pub fn generate_job_name(base: &str) -> Result<String, ConfigError> {
    job_name_with(base, &mut OsRng)
}

fn job_name_with<R: TryRngCore>(base: &str, rng: &mut R) -> Result<String, ConfigError> {
    let mut suffix = [0u8; RANDOM_SUFFIX_BYTES];
    rng.try_fill_bytes(&mut suffix)
        .map_err(|e| ConfigError::RandomSourceUnavailable(e.to_string()))?;
    Ok(format!("{base}-{}", hex::encode(suffix)))
}

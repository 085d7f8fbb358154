use std::time::Duration;

use duration_string::DurationString;
use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(test, derive(PartialEq))]
pub struct PollingConfig {
    #[serde(
        deserialize_with = "deserialize_duration",
        default = "default_poll_interval"
    )]
    pub poll_interval: Duration,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
        }
    }
}

const fn default_poll_interval() -> Duration {
    Duration::from_secs(3)
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    DurationString::deserialize(deserializer).map(Duration::from)
}

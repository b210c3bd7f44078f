use std::time::Duration;

pub(crate) const COMPUTE_TIME: Duration = Duration::from_secs(120);

pub(crate) const ASSET_DIRECTORY: &str = "./assets";

pub(crate) const BIND_ADDRESS: &str = "0.0.0.0";
pub(crate) const PORT: u16 = 8080;

// knowledge bases and entailment results are posted back as a whole
pub(crate) const JSON_LIMIT: usize = 16 * 1024 * 1024;

#[cfg(feature = "mock_long_computations")]
pub(crate) const MOCK_DELAY: Duration = Duration::from_secs(20);

/// Settings of the service, read from the environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Config {
    pub(crate) bind: String,
    pub(crate) port: u16,
    pub(crate) compute_time: Duration,
    pub(crate) assets: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: BIND_ADDRESS.to_string(),
            port: PORT,
            compute_time: COMPUTE_TIME,
            assets: ASSET_DIRECTORY.to_string(),
        }
    }
}

impl Config {
    /// Overrides the defaults with `KLM_BIND`, `KLM_PORT`, `KLM_COMPUTE_TIME` (seconds) and `KLM_ASSETS`.
    pub(crate) fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();
        Self {
            bind: lookup("KLM_BIND").unwrap_or(default.bind),
            port: parsed(&lookup, "KLM_PORT").unwrap_or(default.port),
            compute_time: parsed(&lookup, "KLM_COMPUTE_TIME")
                .map(Duration::from_secs)
                .unwrap_or(default.compute_time),
            assets: lookup("KLM_ASSETS").unwrap_or(default.assets),
        }
    }

    /// The compute time in milliseconds, used as time budget of the reasoner.
    pub(crate) fn budget_ms(&self) -> u64 {
        u64::try_from(self.compute_time.as_millis()).unwrap_or(u64::MAX)
    }
}

fn parsed<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let value = lookup(key)?;
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            log::warn!("ignoring {}={}, not a valid value", key, value);
            None
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn overrides() {
        let config = Config::from_lookup(|key| match key {
            "KLM_PORT" => Some("9090".to_string()),
            "KLM_COMPUTE_TIME" => Some("5".to_string()),
            "KLM_BIND" => Some("127.0.0.1".to_string()),
            _ => None,
        });
        assert_eq!(config.port, 9090);
        assert_eq!(config.compute_time, Duration::from_secs(5));
        assert_eq!(config.bind, "127.0.0.1");
        assert_eq!(config.assets, ASSET_DIRECTORY);
        assert_eq!(config.budget_ms(), 5000);
    }

    #[test]
    fn invalid_values_are_ignored() {
        let config = Config::from_lookup(|key| (key == "KLM_PORT").then(|| "http".to_string()));
        assert_eq!(config, Config::default());
    }
}

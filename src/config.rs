use crate::error::FailureKind;
use anyhow::Context as AnyhowContext;
use std::process::ExitCode;
use std::time::Duration;
use watch_types::parse_duration;

pub const DEFAULT_INVENTORY_URL: &str = "https://timeworld.ru/upload/files/ostatki.zip";
pub const DEFAULT_OZON_API_URL: &str = "https://api-seller.ozon.ru";
pub const DEFAULT_MARKET_API_URL: &str = "https://api.partner.market.yandex.ru";

const ENV_FILE: &str = ".env";

/// Loads `.env` from the working directory when one exists.
pub fn load_env_file() -> Result<(), anyhow::Error> {
    load_env_file_from(ENV_FILE)
}

pub fn load_env_file_from(path: &str) -> Result<(), anyhow::Error> {
    match std::fs::File::open(path) {
        Ok(_) => envmnt::load_file(path).with_context(|| format!("Unable to load {path} file")),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(anyhow::anyhow!("Unable to open {path} file: {err}")),
    }
}

pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// What the process reports to its scheduler after a failed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitPolicy {
    /// Log the failure and exit with status 0.
    AlwaysSucceed,
    /// Log the failure and exit with status 1.
    FailOnError,
}

impl ExitPolicy {
    pub fn from_flag(fail_on_error: bool) -> Self {
        match fail_on_error {
            true => Self::FailOnError,
            false => Self::AlwaysSucceed,
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(&env_lookup)
    }

    pub fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Self {
        let fail = match lookup("SYNC_FAIL_EXIT_CODE") {
            Some(raw) if !raw.trim().is_empty() => parse_flag(&raw).unwrap_or_else(|| {
                log::warn!("Unrecognised SYNC_FAIL_EXIT_CODE {raw:?}, exiting with 0 on failure");
                false
            }),
            _ => false,
        };
        Self::from_flag(fail)
    }

    pub fn exit_status(self, result: &Result<(), anyhow::Error>) -> u8 {
        match (result, self) {
            (Ok(()), _) | (Err(_), Self::AlwaysSucceed) => 0,
            (Err(_), Self::FailOnError) => 1,
        }
    }

    pub fn finish(self, result: Result<(), anyhow::Error>) -> ExitCode {
        if let Err(err) = &result {
            log::error!("{}: {err:?}", FailureKind::classify(err));
        }
        ExitCode::from(self.exit_status(&result))
    }
}

fn env_lookup(key: &str) -> Option<String> {
    envmnt::exists(key).then(|| envmnt::get_or(key, ""))
}

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String, anyhow::Error> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| anyhow::anyhow!("{key} is not set"))
}

fn optional(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpOptions {
    pub connect_timeout: Duration,
    pub timeout: Duration,
    /// Retries for transient failures; zero keeps every request single-shot.
    pub max_retries: u32,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            timeout: Duration::from_secs(60),
            max_retries: 0,
        }
    }
}

impl HttpOptions {
    pub fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, anyhow::Error> {
        let defaults = Self::default();
        let duration = |key: &str, default: Duration| match lookup(key) {
            Some(raw) if !raw.trim().is_empty() => {
                parse_duration(&raw).with_context(|| format!("Invalid {key}"))
            }
            _ => Ok(default),
        };
        Ok(Self {
            connect_timeout: duration("HTTP_CONNECT_TIMEOUT", defaults.connect_timeout)?,
            timeout: duration("HTTP_TIMEOUT", defaults.timeout)?,
            max_retries: match lookup("HTTP_MAX_RETRIES") {
                Some(raw) if !raw.trim().is_empty() => raw
                    .trim()
                    .parse()
                    .with_context(|| format!("Invalid HTTP_MAX_RETRIES {raw:?}"))?,
                _ => defaults.max_retries,
            },
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommonConfig {
    pub inventory_url: String,
    pub http: HttpOptions,
}

impl CommonConfig {
    pub fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, anyhow::Error> {
        Ok(Self {
            inventory_url: optional(lookup, "INVENTORY_URL", DEFAULT_INVENTORY_URL),
            http: HttpOptions::from_lookup(lookup)?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OzonConfig {
    pub common: CommonConfig,
    pub api_url: String,
    pub client_id: String,
    pub seller_token: String,
}

impl OzonConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        Self::from_lookup(&env_lookup)
    }

    pub fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, anyhow::Error> {
        Ok(Self {
            common: CommonConfig::from_lookup(lookup)?,
            api_url: optional(lookup, "OZON_API_URL", DEFAULT_OZON_API_URL),
            client_id: required(lookup, "CLIENT_ID")?,
            seller_token: required(lookup, "SELLER_TOKEN")?,
        })
    }
}

/// Yandex Market campaign together with the warehouse its stocks belong to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Campaign {
    pub name: &'static str,
    pub id: String,
    pub warehouse_id: u64,
}

impl Campaign {
    fn from_lookup(
        lookup: &impl Fn(&str) -> Option<String>,
        name: &'static str,
        id_key: &str,
        warehouse_key: &str,
    ) -> Result<Self, anyhow::Error> {
        let warehouse = required(lookup, warehouse_key)?;
        Ok(Self {
            name,
            id: required(lookup, id_key)?,
            warehouse_id: warehouse
                .parse()
                .with_context(|| format!("Invalid {warehouse_key} {warehouse:?}"))?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarketConfig {
    pub common: CommonConfig,
    pub api_url: String,
    pub token: String,
    pub campaigns: Vec<Campaign>,
}

impl MarketConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        Self::from_lookup(&env_lookup)
    }

    pub fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, anyhow::Error> {
        Ok(Self {
            common: CommonConfig::from_lookup(lookup)?,
            api_url: optional(lookup, "MARKET_API_URL", DEFAULT_MARKET_API_URL),
            token: required(lookup, "MARKET_TOKEN")?,
            campaigns: vec![
                Campaign::from_lookup(lookup, "FBS", "FBS_ID", "WAREHOUSE_FBS_ID")?,
                Campaign::from_lookup(lookup, "DBS", "DBS_ID", "WAREHOUSE_DBS_ID")?,
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn parses_flags() {
        assert_eq!(Some(true), parse_flag(" Yes "));
        assert_eq!(Some(false), parse_flag("0"));
        assert_eq!(None, parse_flag("maybe"));
    }

    #[test]
    fn reads_ozon_config_with_defaults() {
        let config =
            OzonConfig::from_lookup(&lookup(&[("CLIENT_ID", "123"), ("SELLER_TOKEN", " key ")]))
                .unwrap();
        assert_eq!("123", config.client_id);
        assert_eq!("key", config.seller_token);
        assert_eq!(DEFAULT_OZON_API_URL, config.api_url);
        assert_eq!(DEFAULT_INVENTORY_URL, config.common.inventory_url);
        assert_eq!(HttpOptions::default(), config.common.http);
    }

    #[test]
    fn requires_ozon_credentials() {
        let err = OzonConfig::from_lookup(&lookup(&[("CLIENT_ID", "123")])).unwrap_err();
        assert_eq!("SELLER_TOKEN is not set", err.to_string());
        assert!(OzonConfig::from_lookup(&lookup(&[("CLIENT_ID", ""), ("SELLER_TOKEN", "k")]))
            .is_err());
    }

    #[test]
    fn reads_market_campaigns() {
        let config = MarketConfig::from_lookup(&lookup(&[
            ("MARKET_TOKEN", "token"),
            ("FBS_ID", "1001"),
            ("DBS_ID", "1002"),
            ("WAREHOUSE_FBS_ID", "55"),
            ("WAREHOUSE_DBS_ID", "56"),
            ("HTTP_TIMEOUT", "2m"),
            ("HTTP_MAX_RETRIES", "3"),
            ("INVENTORY_URL", "http://localhost/ostatki.zip"),
        ]))
        .unwrap();
        assert_eq!(
            vec![
                Campaign {
                    name: "FBS",
                    id: "1001".to_string(),
                    warehouse_id: 55
                },
                Campaign {
                    name: "DBS",
                    id: "1002".to_string(),
                    warehouse_id: 56
                },
            ],
            config.campaigns
        );
        assert_eq!(Duration::from_secs(120), config.common.http.timeout);
        assert_eq!(Duration::from_secs(10), config.common.http.connect_timeout);
        assert_eq!(3, config.common.http.max_retries);
        assert_eq!("http://localhost/ostatki.zip", config.common.inventory_url);
    }

    #[test]
    fn rejects_invalid_values() {
        let base = [
            ("MARKET_TOKEN", "token"),
            ("FBS_ID", "1001"),
            ("DBS_ID", "1002"),
            ("WAREHOUSE_DBS_ID", "56"),
        ];
        let mut vars = base.to_vec();
        vars.push(("WAREHOUSE_FBS_ID", "main"));
        assert!(MarketConfig::from_lookup(&lookup(&vars)).is_err());

        let mut vars = base.to_vec();
        vars.push(("WAREHOUSE_FBS_ID", "55"));
        vars.push(("HTTP_CONNECT_TIMEOUT", "soon"));
        assert!(MarketConfig::from_lookup(&lookup(&vars)).is_err());
    }

    #[test]
    fn exit_policy_defaults_to_success() {
        assert_eq!(ExitPolicy::AlwaysSucceed, ExitPolicy::from_lookup(&lookup(&[])));
        assert_eq!(
            ExitPolicy::FailOnError,
            ExitPolicy::from_lookup(&lookup(&[("SYNC_FAIL_EXIT_CODE", "true")]))
        );
        assert_eq!(
            ExitPolicy::AlwaysSucceed,
            ExitPolicy::from_lookup(&lookup(&[("SYNC_FAIL_EXIT_CODE", "ture")]))
        );
    }

    #[test]
    fn exit_status_follows_policy() {
        let failed: Result<(), anyhow::Error> = Err(anyhow::anyhow!("boom"));
        assert_eq!(0, ExitPolicy::AlwaysSucceed.exit_status(&failed));
        assert_eq!(1, ExitPolicy::FailOnError.exit_status(&failed));
        assert_eq!(0, ExitPolicy::FailOnError.exit_status(&Ok(())));
        assert_eq!(ExitPolicy::FailOnError, ExitPolicy::from_flag(true));
    }

    #[test]
    fn env_file_is_optional_but_must_be_readable() {
        let dir = std::env::temp_dir();
        assert!(load_env_file_from(&dir.join("watch-sync-missing.env").to_string_lossy()).is_ok());
        assert!(load_env_file_from(&dir.to_string_lossy()).is_err());
    }
}

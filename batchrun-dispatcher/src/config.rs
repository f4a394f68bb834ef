//! Dispatcher configuration
//!
//! Credentials for the two remote services plus every tunable of a run:
//! resource ids, pool shape, task command template, polling cadence,
//! completion timeout, artifact token lifetime and cleanup policy.

use batchrun_core::domain::pool::{NodeOs, PoolSpec};
use std::time::Duration;

use crate::error::ConfigError;

/// Placeholder in the command template replaced by the artifact's file path
pub const FILE_PLACEHOLDER: &str = "{file}";

/// Longest lifetime a read token may be issued for (7 days)
pub const MAX_TOKEN_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Account credentials for the compute and storage services
///
/// All five account strings are required. A missing one is reported before
/// any remote call is made.
#[derive(Clone)]
pub struct Credentials {
    pub batch_account_name: String,
    pub batch_account_key: String,
    pub batch_account_url: String,
    pub storage_account_name: String,
    pub storage_account_key: String,
    /// Blob endpoint; derived from the storage account name when unset
    pub storage_endpoint: String,
}

impl Credentials {
    /// Reads credentials from the process environment
    ///
    /// Required environment variables:
    /// - BATCH_ACCOUNT_NAME
    /// - BATCH_ACCOUNT_KEY
    /// - BATCH_ACCOUNT_URL
    /// - STORAGE_ACCOUNT_NAME
    /// - STORAGE_ACCOUNT_KEY
    ///
    /// Optional:
    /// - STORAGE_ENDPOINT (default: https://{STORAGE_ACCOUNT_NAME}.blob.core.windows.net)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Reads credentials through an arbitrary variable lookup
    ///
    /// Empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var: &'static str| {
            lookup(var)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::MissingVar(var))
        };

        let batch_account_name = required("BATCH_ACCOUNT_NAME")?;
        let batch_account_key = required("BATCH_ACCOUNT_KEY")?;
        let batch_account_url = required("BATCH_ACCOUNT_URL")?;
        let storage_account_name = required("STORAGE_ACCOUNT_NAME")?;
        let storage_account_key = required("STORAGE_ACCOUNT_KEY")?;

        let storage_endpoint = lookup("STORAGE_ENDPOINT")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| format!("https://{}.blob.core.windows.net", storage_account_name));

        let credentials = Self {
            batch_account_name,
            batch_account_key,
            batch_account_url,
            storage_account_name,
            storage_account_key,
            storage_endpoint,
        };
        credentials.validate()?;
        Ok(credentials)
    }

    /// Checks that both service URLs are http(s)
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (var, url) in [
            ("BATCH_ACCOUNT_URL", &self.batch_account_url),
            ("STORAGE_ENDPOINT", &self.storage_endpoint),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::InvalidVar {
                    var,
                    value: url.clone(),
                    reason: "must start with http:// or https://".to_string(),
                });
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("batch_account_name", &self.batch_account_name)
            .field("batch_account_url", &self.batch_account_url)
            .field("storage_account_name", &self.storage_account_name)
            .field("storage_endpoint", &self.storage_endpoint)
            .finish_non_exhaustive()
    }
}

/// When remote resources acquired by a run are released
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CleanupPolicy {
    /// Release on every exit path, success or failure
    #[default]
    Always,
    /// Release only after a fully successful run; a failed run leaves its
    /// pool, job and container allocated
    OnSuccess,
    /// Never release; useful for inspecting a run afterwards
    Never,
}

impl CleanupPolicy {
    /// Whether a run that ended with `succeeded` should release its lease
    pub fn should_release(&self, succeeded: bool) -> bool {
        match self {
            CleanupPolicy::Always => true,
            CleanupPolicy::OnSuccess => succeeded,
            CleanupPolicy::Never => false,
        }
    }
}

impl std::fmt::Display for CleanupPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CleanupPolicy::Always => write!(f, "always"),
            CleanupPolicy::OnSuccess => write!(f, "on-success"),
            CleanupPolicy::Never => write!(f, "never"),
        }
    }
}

impl std::str::FromStr for CleanupPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "always" => Ok(CleanupPolicy::Always),
            "on-success" | "on_success" | "onsuccess" => Ok(CleanupPolicy::OnSuccess),
            "never" => Ok(CleanupPolicy::Never),
            other => Err(format!(
                "unknown cleanup policy '{}' (expected always, on-success or never)",
                other
            )),
        }
    }
}

/// Run configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Pool to create (id, VM size, node count, image)
    pub pool: PoolSpec,

    pub job_id: String,

    /// Blob container holding the uploaded inputs
    pub container: String,

    /// Task command line; `{file}` is replaced by the input's file name
    pub command_template: String,

    /// How often task states are polled
    pub poll_interval: Duration,

    /// Maximum time to wait for all tasks to complete
    pub completion_timeout: Duration,

    /// Lifetime of the read-only access token issued for each input
    pub token_ttl: Duration,

    pub cleanup_policy: CleanupPolicy,
}

impl Config {
    /// Creates a configuration with defaults for the given node OS
    pub fn new(os: NodeOs) -> Self {
        Self {
            pool: PoolSpec::new("netcoreconf-pool", os),
            job_id: "netcoreconf-job".to_string(),
            container: "input".to_string(),
            command_template: os.default_command_template().to_string(),
            poll_interval: Duration::from_secs(5),
            completion_timeout: Duration::from_secs(30 * 60),
            token_ttl: Duration::from_secs(2 * 60 * 60),
            cleanup_policy: CleanupPolicy::default(),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Every variable is optional and overrides the default:
    /// - POOL_ID, JOB_ID, CONTAINER
    /// - POLL_INTERVAL (seconds, default: 5)
    /// - COMPLETION_TIMEOUT (seconds, default: 1800)
    /// - TOKEN_TTL (seconds, default: 7200)
    /// - CLEANUP_POLICY (always | on-success | never, default: always)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`Config::from_env`] with an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(pool_id) = lookup("POOL_ID") {
            config.pool.id = pool_id;
        }
        if let Some(job_id) = lookup("JOB_ID") {
            config.job_id = job_id;
        }
        if let Some(container) = lookup("CONTAINER") {
            config.container = container;
        }
        if let Some(secs) = parse_seconds(&lookup, "POLL_INTERVAL")? {
            config.poll_interval = secs;
        }
        if let Some(secs) = parse_seconds(&lookup, "COMPLETION_TIMEOUT")? {
            config.completion_timeout = secs;
        }
        if let Some(secs) = parse_seconds(&lookup, "TOKEN_TTL")? {
            config.token_ttl = secs;
        }
        if let Some(value) = lookup("CLEANUP_POLICY") {
            config.cleanup_policy =
                value
                    .parse()
                    .map_err(|reason| ConfigError::InvalidVar {
                        var: "CLEANUP_POLICY",
                        value: value.clone(),
                        reason,
                    })?;
        }

        Ok(config)
    }

    /// Renders the command line for one input file
    pub fn command_line(&self, file_path: &str) -> String {
        self.command_template.replace(FILE_PLACEHOLDER, file_path)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pool.id.is_empty() {
            return Err(ConfigError::Invalid("pool id cannot be empty".to_string()));
        }

        if self.job_id.is_empty() {
            return Err(ConfigError::Invalid("job id cannot be empty".to_string()));
        }

        if self.container.is_empty() {
            return Err(ConfigError::Invalid("container cannot be empty".to_string()));
        }

        if self.pool.target_dedicated_nodes == 0 {
            return Err(ConfigError::Invalid(
                "pool must have at least one node".to_string(),
            ));
        }

        if !self.command_template.contains(FILE_PLACEHOLDER) {
            return Err(ConfigError::Invalid(format!(
                "command template must contain {}",
                FILE_PLACEHOLDER
            )));
        }

        if self.poll_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "poll_interval must be greater than 0".to_string(),
            ));
        }

        if self.completion_timeout < self.poll_interval {
            return Err(ConfigError::Invalid(
                "completion_timeout must be at least one poll_interval".to_string(),
            ));
        }

        // Inputs are downloaded by the node when a task starts, which can be
        // as late as the end of the completion window.
        if self.token_ttl <= self.completion_timeout {
            return Err(ConfigError::Invalid(
                "token_ttl must be longer than completion_timeout".to_string(),
            ));
        }

        if self.token_ttl > MAX_TOKEN_TTL {
            return Err(ConfigError::Invalid(format!(
                "token_ttl cannot exceed {} seconds",
                MAX_TOKEN_TTL.as_secs()
            )));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(NodeOs::default())
    }
}

fn parse_seconds<F>(lookup: &F, var: &'static str) -> Result<Option<Duration>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(var) else {
        return Ok(None);
    };

    value
        .trim()
        .parse::<u64>()
        .map(|secs| Some(Duration::from_secs(secs)))
        .map_err(|e| ConfigError::InvalidVar {
            var,
            value,
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    const ALL_CREDENTIALS: &[(&str, &str)] = &[
        ("BATCH_ACCOUNT_NAME", "batchacct"),
        ("BATCH_ACCOUNT_KEY", "batchkey"),
        ("BATCH_ACCOUNT_URL", "https://batchacct.westeurope.batch.example"),
        ("STORAGE_ACCOUNT_NAME", "storeacct"),
        ("STORAGE_ACCOUNT_KEY", "storekey"),
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.pool.id, "netcoreconf-pool");
        assert_eq!(config.job_id, "netcoreconf-job");
        assert_eq!(config.container, "input");
        assert_eq!(config.completion_timeout, Duration::from_secs(1800));
        assert_eq!(config.token_ttl, Duration::from_secs(7200));
        assert_eq!(config.cleanup_policy, CleanupPolicy::Always);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_command_line() {
        let config = Config::default();
        assert_eq!(
            config.command_line("stock0.csv"),
            "/bin/bash -c 'cat stock0.csv'"
        );
        assert_eq!(
            Config::new(NodeOs::Windows).command_line("stock0.csv"),
            "cmd /c type stock0.csv"
        );
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        config.command_template = "echo hello".to_string();
        assert!(config.validate().is_err());
        config.command_template = "cat {file}".to_string();

        config.poll_interval = Duration::ZERO;
        assert!(config.validate().is_err());
        config.poll_interval = Duration::from_secs(5);

        config.token_ttl = config.completion_timeout;
        assert!(config.validate().is_err());
        config.token_ttl = Duration::from_secs(9_000_000_000_000);
        assert!(config.validate().is_err());
        config.token_ttl = MAX_TOKEN_TTL;
        assert!(config.validate().is_ok());
        config.token_ttl = Duration::from_secs(7200);

        config.pool.target_dedicated_nodes = 0;
        assert!(config.validate().is_err());
        config.pool.target_dedicated_nodes = 1;

        config.job_id = String::new();
        assert!(config.validate().is_err());
        config.job_id = "job".to_string();

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_lookup_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("POOL_ID", "p1"),
            ("POLL_INTERVAL", "2"),
            ("COMPLETION_TIMEOUT", "60"),
            ("CLEANUP_POLICY", "on-success"),
        ]))
        .unwrap();

        assert_eq!(config.pool.id, "p1");
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.completion_timeout, Duration::from_secs(60));
        assert_eq!(config.cleanup_policy, CleanupPolicy::OnSuccess);
        assert_eq!(config.job_id, "netcoreconf-job");
    }

    #[test]
    fn test_config_from_lookup_rejects_garbage() {
        let err = Config::from_lookup(lookup_from(&[("POLL_INTERVAL", "soon")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidVar {
                var: "POLL_INTERVAL",
                ..
            }
        ));

        assert!(Config::from_lookup(lookup_from(&[("CLEANUP_POLICY", "sometimes")])).is_err());
    }

    #[test]
    fn test_credentials_complete() {
        let creds = Credentials::from_lookup(lookup_from(ALL_CREDENTIALS)).unwrap();
        assert_eq!(creds.batch_account_name, "batchacct");
        assert_eq!(
            creds.storage_endpoint,
            "https://storeacct.blob.core.windows.net"
        );
    }

    #[test]
    fn test_credentials_each_one_required() {
        for (missing, _) in ALL_CREDENTIALS {
            let pairs: Vec<(&str, &str)> = ALL_CREDENTIALS
                .iter()
                .copied()
                .filter(|(k, _)| k != missing)
                .collect();
            let err = Credentials::from_lookup(lookup_from(&pairs)).unwrap_err();
            assert!(
                matches!(err, ConfigError::MissingVar(var) if var == *missing),
                "expected {} to be reported missing, got {:?}",
                missing,
                err
            );
        }
    }

    #[test]
    fn test_credentials_empty_counts_as_missing() {
        let mut pairs = ALL_CREDENTIALS.to_vec();
        pairs[1] = ("BATCH_ACCOUNT_KEY", "  ");
        let err = Credentials::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("BATCH_ACCOUNT_KEY")));
    }

    #[test]
    fn test_credentials_reject_bad_url() {
        let mut pairs = ALL_CREDENTIALS.to_vec();
        pairs[2] = ("BATCH_ACCOUNT_URL", "batchacct.example");
        assert!(Credentials::from_lookup(lookup_from(&pairs)).is_err());
    }

    #[test]
    fn test_credentials_debug_hides_keys() {
        let creds = Credentials::from_lookup(lookup_from(ALL_CREDENTIALS)).unwrap();
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("batchkey"));
        assert!(!debug.contains("storekey"));
    }

    #[test]
    fn test_cleanup_policy() {
        assert!(CleanupPolicy::Always.should_release(false));
        assert!(CleanupPolicy::OnSuccess.should_release(true));
        assert!(!CleanupPolicy::OnSuccess.should_release(false));
        assert!(!CleanupPolicy::Never.should_release(true));
        assert_eq!("On-Success".parse(), Ok(CleanupPolicy::OnSuccess));
    }
}

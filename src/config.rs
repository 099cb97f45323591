use std::net::IpAddr;
use std::path::PathBuf;
use tracing::Level;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_CLI: &str = "openclaw";
pub const DEFAULT_STATIC_ROOT: &str = "public";
pub const DEFAULT_LOG_FILE: &str = "clawboard.log";

/// Runtime settings, read once from the environment at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub host: String,
    pub port: u16,
    pub cli_program: String,
    pub static_root: PathBuf,
    pub log_file: PathBuf,
    pub log_level: Level,
    /// Files probed in order by `/api/logs`.
    pub log_search_paths: Vec<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            cli_program: DEFAULT_CLI.to_string(),
            static_root: PathBuf::from(DEFAULT_STATIC_ROOT),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            log_level: Level::INFO,
            log_search_paths: default_log_search_paths(),
        }
    }
}

impl DashboardConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Unset, empty, or unparsable values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        Self {
            host: get("HOST").unwrap_or(defaults.host),
            port: get("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            cli_program: get("CLAWBOARD_CLI").unwrap_or(defaults.cli_program),
            static_root: get("STATIC_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_root),
            log_file: get("LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_file),
            log_level: get("LOG_LEVEL")
                .and_then(|l| l.parse().ok())
                .unwrap_or(defaults.log_level),
            log_search_paths: get("CLAWBOARD_LOG_PATHS")
                .map(|paths| std::env::split_paths(&paths).collect())
                .unwrap_or(defaults.log_search_paths),
        }
    }

    pub fn bind_addr(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// True when the bind address is reachable from other machines.
    pub fn is_network_exposed(&self) -> bool {
        let host = self.host.trim_start_matches('[').trim_end_matches(']');
        if host.eq_ignore_ascii_case("localhost") {
            return false;
        }
        match host.parse::<IpAddr>() {
            Ok(ip) => !ip.is_loopback(),
            Err(_) => true,
        }
    }
}

fn default_log_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".openclaw").join("logs").join("gateway.log"));
        paths.push(home.join(".openclaw").join("gateway.log"));
    }
    paths.push(PathBuf::from("/tmp/openclaw/openclaw.log"));
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> DashboardConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DashboardConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = config_from(&[]);
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert!(!config.is_network_exposed());
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("PORT", "9191"),
            ("HOST", "0.0.0.0"),
            ("CLAWBOARD_CLI", "/opt/openclaw/bin/openclaw"),
            ("STATIC_ROOT", "/srv/dash"),
            ("LOG_FILE", "/var/log/clawboard.log"),
            ("LOG_LEVEL", "debug"),
            ("CLAWBOARD_LOG_PATHS", "/a.log:/b.log"),
        ]);
        assert_eq!(config.port, 9191);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.cli_program, "/opt/openclaw/bin/openclaw");
        assert_eq!(config.static_root, PathBuf::from("/srv/dash"));
        assert_eq!(config.log_file, PathBuf::from("/var/log/clawboard.log"));
        assert_eq!(config.log_level, Level::DEBUG);
        #[cfg(unix)]
        assert_eq!(
            config.log_search_paths,
            vec![PathBuf::from("/a.log"), PathBuf::from("/b.log")]
        );
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = config_from(&[("PORT", "eighty"), ("LOG_LEVEL", "loud"), ("HOST", "  ")]);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.host, DEFAULT_HOST);
    }

    #[test]
    fn exposure_detection() {
        let exposed = |host: &str| {
            DashboardConfig {
                host: host.to_string(),
                ..DashboardConfig::default()
            }
            .is_network_exposed()
        };
        assert!(!exposed("127.0.0.1"));
        assert!(!exposed("localhost"));
        assert!(!exposed("::1"));
        assert!(exposed("0.0.0.0"));
        assert!(exposed("192.168.1.20"));
        assert!(exposed("dash.internal"));
    }

    #[test]
    fn ipv6_bind_addr_is_bracketed() {
        let config = DashboardConfig {
            host: "::1".to_string(),
            ..DashboardConfig::default()
        };
        assert_eq!(config.bind_addr(), "[::1]:8080");
    }
}

//! Structured view of the CLI's human-readable `status` report.
//!
//! The report format is owned by the external tool and carries no version
//! marker, so every pattern the dashboard depends on lives in this module.
//! A pattern that stops matching only drops or defaults its own field.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Version string reported when `--version` cannot be read.
pub const UNKNOWN_VERSION: &str = "unknown";

/// Prefix of Anthropic secret keys. Reports usually mask the rest of the key.
const ANTHROPIC_KEY_PREFIX: &str = "sk-ant-";

static NPM_UPDATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"npm update\s+([^\s│)]+)").expect("npm update pattern"));

static UPDATE_ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Update\s*│\s*([^│\n]*?)\s*│").expect("update row pattern"));

static SESSIONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)sessions[\s:│]+(\d+)").expect("sessions pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthMode {
    Oauth,
    ApiKey,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayState {
    Running,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRecord {
    pub auth_mode: AuthMode,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_info: Option<String>,
    pub sessions: u64,
    pub gateway: GatewayState,
}

/// Turns raw `--version` output into the reported version.
pub fn normalize_version(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => UNKNOWN_VERSION.to_string(),
    }
}

/// Builds a record from one `status` report and an already-resolved version.
pub fn parse_status_report(text: &str, version: String) -> StatusRecord {
    StatusRecord {
        auth_mode: detect_auth_mode(text),
        version,
        latest_version: NPM_UPDATE
            .captures(text)
            .map(|caps| caps[1].to_string()),
        update_info: UPDATE_ROW
            .captures(text)
            .map(|caps| caps[1].trim().to_string())
            .filter(|info| !info.is_empty()),
        sessions: SESSIONS
            .captures(text)
            .and_then(|caps| caps[1].parse().ok())
            .unwrap_or(0),
        gateway: if text.contains("running") {
            GatewayState::Running
        } else {
            GatewayState::Unknown
        },
    }
}

/// OAuth markers win over key markers. With no marker at all the report is
/// treated as OAuth rather than guessing that a key is configured.
pub fn detect_auth_mode(text: &str) -> AuthMode {
    if text.contains("oauth") || text.contains("claude-cli") {
        AuthMode::Oauth
    } else if text.contains("api-key") || text.contains(ANTHROPIC_KEY_PREFIX) {
        AuthMode::ApiKey
    } else {
        AuthMode::Oauth
    }
}

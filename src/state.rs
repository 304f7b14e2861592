//! Application state
//!
//! Holds all shared components and state

use crate::guardian_loop::GuardianLoop;
use crate::hardware::DependencyProvider;
use crate::tick_scheduler::TickScheduler;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Component attributes (JSON object)
    pub guardian_config_path: PathBuf,
    /// Robot gateway URL
    pub gateway_url: String,
    pub api_key: String,
    pub api_key_id: String,
    /// Tick cadence of the scheduler
    pub tick_interval_ms: u64,
    /// Alert track
    pub audio_file: PathBuf,
    /// External player command
    pub audio_player: String,
    pub audio_args: Vec<String>,
    /// Start the loop without waiting for a push
    pub autostart: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            guardian_config_path: std::env::var("GUARDIAN_CONFIG")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("guardian.json")),
            gateway_url: std::env::var("ROBOT_GATEWAY_URL")
                .unwrap_or_else(|_| "http://localhost:8081".to_string()),
            api_key: std::env::var("ROBOT_API_KEY").unwrap_or_default(),
            api_key_id: std::env::var("ROBOT_API_KEY_ID").unwrap_or_default(),
            tick_interval_ms: std::env::var("TICK_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(500),
            audio_file: std::env::var("ALERT_AUDIO_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("guardian.mp3")),
            audio_player: std::env::var("ALERT_AUDIO_PLAYER")
                .unwrap_or_else(|_| "mpg123".to_string()),
            audio_args: std::env::var("ALERT_AUDIO_ARGS")
                .map(|v| parse_args(&v))
                .unwrap_or_else(|_| vec!["-q".to_string()]),
            autostart: std::env::var("GUARDIAN_AUTOSTART")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
        }
    }
}

fn parse_args(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_string).collect()
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// GuardianLoop (every access goes through this mutex)
    pub guardian: Arc<Mutex<GuardianLoop>>,
    /// TickScheduler (periodic tick driver)
    pub scheduler: Arc<TickScheduler>,
    /// Source of fresh dependency sets for reconfigure
    pub dependencies: Arc<dyn DependencyProvider>,
    pub started_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        assert_eq!(parse_args("-q  --gain 50"), vec!["-q", "--gain", "50"]);
        assert!(parse_args("   ").is_empty());
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" 1 "));
        assert!(parse_flag("ON"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(""));
    }
}

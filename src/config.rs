use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "config/app.json";

/// Identity handed to the dev auth provider. In production this would come
/// from the external identity provider instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    #[serde(default = "default_display_name")]
    pub display_name: String,
    #[serde(default = "default_email")]
    pub email: String,
    #[serde(default)]
    pub photo_url: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            display_name: default_display_name(),
            email: default_email(),
            photo_url: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub identity: IdentityConfig,
    /// Number of most-recent messages kept in the live chat view.
    #[serde(default = "default_chat_window")]
    pub chat_window: usize,
    /// Number of most-recent comments previewed under a collapsed post.
    #[serde(default = "default_preview_comments")]
    pub preview_comments: usize,
    /// Seed a handful of demo posts and messages at startup.
    #[serde(default = "default_seed_demo")]
    pub seed_demo: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            identity: IdentityConfig::default(),
            chat_window: default_chat_window(),
            preview_comments: default_preview_comments(),
            seed_demo: default_seed_demo(),
        }
    }
}

fn default_display_name() -> String {
    "Dev User".to_string()
}

fn default_email() -> String {
    "dev@example.com".to_string()
}

fn default_chat_window() -> usize {
    50
}

fn default_preview_comments() -> usize {
    2
}

fn default_seed_demo() -> bool {
    true
}

pub fn load_config(path: &str) -> AppConfig {
    let path = Path::new(path);
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Failed to parse config file {}: {err}", path.display());
                AppConfig::default()
            }
        },
        Err(err) => {
            log::info!(
                "Config file {} not found ({err}); using defaults",
                path.display()
            );
            AppConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.chat_window, 50);
        assert_eq!(config.preview_comments, 2);
        assert_eq!(config.identity.display_name, "Dev User");
        assert!(config.seed_demo);
    }

    #[test]
    fn partial_identity_keeps_other_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"identity":{"display_name":"Ana"},"chat_window":10}"#)
                .unwrap();
        assert_eq!(config.identity.display_name, "Ana");
        assert_eq!(config.identity.email, "dev@example.com");
        assert_eq!(config.chat_window, 10);
    }
}

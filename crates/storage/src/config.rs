//! Typed view of the config file.

use std::path::{Path, PathBuf};

use app_core::ids::TvSlot;
use tracing::warn;

use crate::env_file::EnvFile;
use crate::paths;

pub const TV01_IP: &str = "TV01_IP";
pub const TV02_IP: &str = "TV02_IP";
pub const APP_ID_KEYS: [&str; 4] = ["APP1_ID", "APP2_ID", "APP3_ID", "APP4_ID"];
pub const ADMIN_PASSWORD: &str = "ADMIN_PASSWORD";
pub const ICON_DIR: &str = "ICON_DIR";
pub const ADMIN_PORT: &str = "ADMIN_PORT";
pub const FULLSCREEN: &str = "FULLSCREEN";

/// Keys the admin panel edits, in form order.
pub const EDITABLE_KEYS: [&str; 8] = [
    TV01_IP,
    TV02_IP,
    APP_ID_KEYS[0],
    APP_ID_KEYS[1],
    APP_ID_KEYS[2],
    APP_ID_KEYS[3],
    ADMIN_PASSWORD,
    ICON_DIR,
];

pub const DEFAULT_ADMIN_PORT: u16 = 9000;

/// Built-in value for `key`, if it has one.
pub fn default_value(key: &str) -> Option<String> {
    let v = match key {
        TV01_IP => "10.24.10.23".to_string(),
        TV02_IP => "10.24.10.99".to_string(),
        "APP1_ID" => "app1".to_string(),
        "APP2_ID" => "app2".to_string(),
        "APP3_ID" => "app3".to_string(),
        "APP4_ID" => "app4".to_string(),
        ADMIN_PASSWORD => "admin".to_string(),
        ICON_DIR => paths::default_icon_dir().display().to_string(),
        ADMIN_PORT => DEFAULT_ADMIN_PORT.to_string(),
        FULLSCREEN => "0".to_string(),
        _ => return None,
    };
    Some(v)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    pub tv_ips: [String; 2],
    pub app_ids: [String; 4],
    pub admin_password: String,
    pub icon_dir: PathBuf,
    pub admin_port: u16,
    pub fullscreen: bool,
}

impl RemoteConfig {
    /// Resolve every key: file value, then (optionally) the process
    /// environment, then the built-in default.
    pub fn from_env_file(env: &EnvFile, overlay_process_env: bool) -> Self {
        let lookup = |key: &str| -> String {
            if let Some(v) = env.get(key) {
                return v.to_string();
            }
            if overlay_process_env {
                if let Ok(v) = std::env::var(key) {
                    return v;
                }
            }
            default_value(key).unwrap_or_default()
        };

        let admin_port = {
            let raw = lookup(ADMIN_PORT);
            raw.trim().parse().unwrap_or_else(|_| {
                warn!(value = %raw, "invalid {ADMIN_PORT}; using {DEFAULT_ADMIN_PORT}");
                DEFAULT_ADMIN_PORT
            })
        };

        Self {
            tv_ips: [lookup(TV01_IP), lookup(TV02_IP)],
            app_ids: APP_ID_KEYS.map(|k| lookup(k)),
            admin_password: lookup(ADMIN_PASSWORD),
            icon_dir: PathBuf::from(lookup(ICON_DIR)),
            admin_port,
            fullscreen: matches!(
                lookup(FULLSCREEN).trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "auto"
            ),
        }
    }

    /// Load as the remote does, letting process env fill gaps.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let env = EnvFile::load(path)?;
        Ok(Self::from_env_file(&env, true))
    }

    pub fn tv_ip(&self, slot: TvSlot) -> &str {
        &self.tv_ips[slot.index()]
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self::from_env_file(&EnvFile::new(), false)
    }
}

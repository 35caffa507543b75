//! Configuration constants and utilities for formline
//!
//! Feature toggles and runtime tunables are read from an INI file:
//!
//! ```ini
//! [toggles]
//! FT_FORMS-12407 = true
//!
//! [runtime]
//! challenge_timeout_ms = 30000
//! thank_you_message = Thanks!
//! ```
//!
//! A missing file means every toggle is off and every tunable keeps its default.

use crate::runtime::settings::{RuntimeSettings, ToggleSource};
use anyhow::{Context, Result};
use ini::Ini;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Default config file path for formline
pub const DEFAULT_CONFIG_PATH: &str = "~/.formline/config";

/// Environment variable name for overriding the config path
pub const CONFIG_PATH_ENV_VAR: &str = "FORMLINE_CONFIG_PATH";

const TOGGLES_SECTION: &str = "toggles";
const RUNTIME_SECTION: &str = "runtime";

/// Get the config file path, checking environment variable first, then falling back to default
pub fn get_config_path() -> String {
    std::env::var_os(CONFIG_PATH_ENV_VAR)
        .and_then(|val| val.into_string().ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
}

/// Named boolean toggles from the `[toggles]` section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureFlags {
    flags: BTreeMap<String, bool>,
}

impl FeatureFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, enabled: bool) -> Self {
        self.flags.insert(name.to_string(), enabled);
        self
    }

    fn from_ini(ini: &Ini) -> Self {
        let mut flags = BTreeMap::new();
        if let Some(section) = ini.section(Some(TOGGLES_SECTION)) {
            for (name, value) in section.iter() {
                match parse_bool(value) {
                    Some(enabled) => {
                        flags.insert(name.to_string(), enabled);
                    }
                    None => tracing::warn!("Ignoring toggle '{}' with value '{}'", name, value),
                }
            }
        }
        Self { flags }
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

impl ToggleSource for FeatureFlags {
    fn is_enabled(&self, toggle: &str) -> bool {
        self.flags.get(toggle).copied().unwrap_or(false)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Everything the config file contributes to a form load
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    pub flags: FeatureFlags,
    pub challenge_timeout: Option<Duration>,
    pub thank_you_message: Option<String>,
}

impl RuntimeConfig {
    /// Resolve the settings a form is built with
    pub fn settings(&self) -> RuntimeSettings {
        let mut settings = RuntimeSettings::resolve(&self.flags)
            .with_thank_you_message(self.thank_you_message.clone());
        if let Some(timeout) = self.challenge_timeout {
            settings = settings.with_challenge_timeout(timeout);
        }
        settings
    }

    fn from_ini(ini: &Ini) -> Result<Self> {
        let runtime = ini.section(Some(RUNTIME_SECTION));
        let challenge_timeout = runtime
            .and_then(|section| section.get("challenge_timeout_ms"))
            .map(|raw| {
                raw.trim()
                    .parse::<u64>()
                    .map(Duration::from_millis)
                    .with_context(|| format!("Invalid challenge_timeout_ms '{raw}'"))
            })
            .transpose()?;
        let thank_you_message = runtime
            .and_then(|section| section.get("thank_you_message"))
            .map(str::to_string);

        Ok(Self {
            flags: FeatureFlags::from_ini(ini),
            challenge_timeout,
            thank_you_message,
        })
    }
}

/// Parse config text in the INI format described above
pub fn parse_runtime_config(text: &str) -> Result<RuntimeConfig> {
    let ini = Ini::load_from_str(text).context("Failed to parse config")?;
    RuntimeConfig::from_ini(&ini)
}

/// Load the config file at `path` (with `~` expanded). A missing file yields defaults.
pub fn load_runtime_config(path: &str) -> Result<RuntimeConfig> {
    let expanded = shellexpand::tilde(path).into_owned();
    if !Path::new(&expanded).exists() {
        tracing::debug!("No config at {}; captcha runtime stays off", expanded);
        return Ok(RuntimeConfig::default());
    }
    let ini = Ini::load_from_file(&expanded)
        .with_context(|| format!("Failed to read config from {expanded}"))?;
    let config = RuntimeConfig::from_ini(&ini)?;
    tracing::debug!("Loaded {} toggle(s) from {}", config.flags.len(), expanded);
    Ok(config)
}

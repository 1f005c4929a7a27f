/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Shell preferences.
//!
//! Layered lowest to highest: built-in defaults, the TOML config file,
//! `TENANTSHELL_*` environment variables, then command line flags.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use bpaf::{Bpaf, ParseFailure};
use log::warn;
use serde::Deserialize;
use tenantshell_core::origin::DEFAULT_SUFFIX_DOMAIN;
use tenantshell_core::refresh::DEFAULT_REFRESH_FALLBACK;
use tenantshell_core::routes::{LOGIN_PATH_MARKER, LOGOUT_PATH_MARKER};

const CONFIG_FILE_NAME: &str = "tenantshell.toml";
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(8);

#[derive(Debug, Clone, PartialEq)]
pub struct ShellPreferences {
    pub suffix_domain: String,
    /// `None` means the platform data directory.
    pub data_dir: Option<PathBuf>,
    pub ephemeral: bool,
    pub refresh_fallback: Duration,
    pub probe_timeout: Duration,
    pub route_markers: Vec<String>,
    pub log_filter: Option<String>,
    pub window_width: f32,
    pub window_height: f32,
}

impl Default for ShellPreferences {
    fn default() -> Self {
        Self {
            suffix_domain: DEFAULT_SUFFIX_DOMAIN.to_string(),
            data_dir: None,
            ephemeral: false,
            refresh_fallback: DEFAULT_REFRESH_FALLBACK,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            route_markers: vec![LOGOUT_PATH_MARKER.to_string(), LOGIN_PATH_MARKER.to_string()],
            log_filter: None,
            window_width: 420.0,
            window_height: 860.0,
        }
    }
}

/// Contents of `tenantshell.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub suffix_domain: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub ephemeral: Option<bool>,
    pub refresh_fallback_ms: Option<u64>,
    pub probe_timeout_ms: Option<u64>,
    pub route_markers: Option<Vec<String>>,
    pub log_filter: Option<String>,
    pub window: Option<WindowConfig>,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig {
    pub width: Option<f32>,
    pub height: Option<f32>,
}

/// Tenant Shell: hosts a tenant's web origin in a single window.
#[derive(Debug, Clone, Default, Bpaf)]
#[bpaf(options, version)]
pub struct CommandLine {
    /// Read preferences from FILE instead of the default config location
    #[bpaf(long("config"), argument("FILE"))]
    pub config: Option<PathBuf>,
    /// Directory holding the tenant record
    #[bpaf(long("data-dir"), argument("DIR"))]
    pub data_dir: Option<PathBuf>,
    /// Keep the tenant record in memory only
    #[bpaf(long("ephemeral"), switch)]
    pub ephemeral: bool,
    /// Domain tenant origins are built under
    #[bpaf(long("suffix-domain"), argument("DOMAIN"))]
    pub suffix_domain: Option<String>,
    /// Log filter directive, e.g. `info` or `tenantshell=debug`
    #[bpaf(long("log-filter"), argument("FILTER"))]
    pub log_filter: Option<String>,
    /// Clear the refresh indicator after MS if the reload never reports back
    #[bpaf(long("refresh-fallback-ms"), argument("MS"))]
    pub refresh_fallback_ms: Option<u64>,
    /// Give up on the origin reachability check after MS
    #[bpaf(long("probe-timeout-ms"), argument("MS"))]
    pub probe_timeout_ms: Option<u64>,
}

#[derive(Debug)]
pub enum PrefsError {
    Io(String),
    Parse(String),
}

impl std::fmt::Display for PrefsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrefsError::Io(e) => write!(f, "IO error: {e}"),
            PrefsError::Parse(e) => write!(f, "Config parse error: {e}"),
        }
    }
}

impl std::error::Error for PrefsError {}

pub enum ArgumentParsingResult {
    Run(ShellPreferences),
    Exit,
    ErrorParsing,
}

pub fn parse_command_line_arguments(args: &[String]) -> ArgumentParsingResult {
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    let command_line = match command_line().run_inner(args.as_slice()) {
        Ok(command_line) => command_line,
        Err(failure) => return report_parse_failure(failure),
    };

    let config_path = command_line.config.clone().or_else(default_config_path);
    let file = match config_path.as_deref() {
        Some(path) => match load_config_file(path, command_line.config.is_some()) {
            Ok(file) => file,
            Err(e) => {
                // Logging is configured from these preferences, so it is not up yet.
                eprintln!("{e}");
                return ArgumentParsingResult::ErrorParsing;
            },
        },
        None => ConfigFile::default(),
    };

    let mut prefs = ShellPreferences::default();
    apply_config_file(&mut prefs, file);
    apply_env(&mut prefs, |key| env::var(key).ok());
    apply_command_line(&mut prefs, command_line);
    ArgumentParsingResult::Run(prefs)
}

fn report_parse_failure(failure: ParseFailure) -> ArgumentParsingResult {
    failure.print_mesage(100);
    match failure {
        ParseFailure::Stderr(..) => ArgumentParsingResult::ErrorParsing,
        _ => ArgumentParsingResult::Exit,
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    let mut dir = dirs::config_dir()?;
    dir.push("tenantshell");
    dir.push(CONFIG_FILE_NAME);
    Some(dir)
}

/// Read a config file. A missing default file is not an error; a missing
/// file that was asked for explicitly is.
pub fn load_config_file(path: &Path, explicit: bool) -> Result<ConfigFile, PrefsError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && !explicit => {
            return Ok(ConfigFile::default());
        },
        Err(e) => {
            return Err(PrefsError::Io(format!(
                "Failed to read {}: {e}",
                path.display()
            )));
        },
    };
    parse_config(&text).map_err(|e| match e {
        PrefsError::Parse(msg) => PrefsError::Parse(format!("{}: {msg}", path.display())),
        other => other,
    })
}

pub fn parse_config(text: &str) -> Result<ConfigFile, PrefsError> {
    toml::from_str(text).map_err(|e| PrefsError::Parse(format!("{e}")))
}

pub fn apply_config_file(prefs: &mut ShellPreferences, file: ConfigFile) {
    if let Some(suffix) = file.suffix_domain {
        prefs.suffix_domain = suffix;
    }
    if let Some(dir) = file.data_dir {
        prefs.data_dir = Some(dir);
    }
    if let Some(ephemeral) = file.ephemeral {
        prefs.ephemeral = ephemeral;
    }
    if let Some(ms) = file.refresh_fallback_ms {
        prefs.refresh_fallback = Duration::from_millis(ms);
    }
    if let Some(ms) = file.probe_timeout_ms {
        prefs.probe_timeout = Duration::from_millis(ms);
    }
    if let Some(markers) = file.route_markers {
        prefs.route_markers = markers;
    }
    if let Some(filter) = file.log_filter {
        prefs.log_filter = Some(filter);
    }
    if let Some(window) = file.window {
        if let Some(width) = window.width {
            prefs.window_width = width;
        }
        if let Some(height) = window.height {
            prefs.window_height = height;
        }
    }
}

/// Apply `TENANTSHELL_*` overrides read through `lookup`. Unparseable values
/// are logged and skipped.
pub fn apply_env(prefs: &mut ShellPreferences, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(dir) = non_blank(lookup("TENANTSHELL_DATA_DIR")) {
        prefs.data_dir = Some(PathBuf::from(dir));
    }
    if let Some(suffix) = non_blank(lookup("TENANTSHELL_SUFFIX_DOMAIN")) {
        prefs.suffix_domain = suffix;
    }
    if let Some(filter) = non_blank(lookup("TENANTSHELL_LOG")) {
        prefs.log_filter = Some(filter);
    }
    if let Some(ms) = env_millis(&lookup, "TENANTSHELL_REFRESH_FALLBACK_MS") {
        prefs.refresh_fallback = ms;
    }
    if let Some(ms) = env_millis(&lookup, "TENANTSHELL_PROBE_TIMEOUT_MS") {
        prefs.probe_timeout = ms;
    }
    if let Some(value) = non_blank(lookup("TENANTSHELL_EPHEMERAL")) {
        match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => prefs.ephemeral = true,
            "0" | "false" | "no" | "off" => prefs.ephemeral = false,
            other => warn!("TENANTSHELL_EPHEMERAL invalid ('{other}'); ignoring"),
        }
    }
}

pub fn apply_command_line(prefs: &mut ShellPreferences, command_line: CommandLine) {
    if let Some(dir) = command_line.data_dir {
        prefs.data_dir = Some(dir);
    }
    if command_line.ephemeral {
        prefs.ephemeral = true;
    }
    if let Some(suffix) = command_line.suffix_domain {
        prefs.suffix_domain = suffix;
    }
    if let Some(filter) = command_line.log_filter {
        prefs.log_filter = Some(filter);
    }
    if let Some(ms) = command_line.refresh_fallback_ms {
        prefs.refresh_fallback = Duration::from_millis(ms);
    }
    if let Some(ms) = command_line.probe_timeout_ms {
        prefs.probe_timeout = Duration::from_millis(ms);
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn env_millis(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<Duration> {
    let value = non_blank(lookup(key))?;
    match value.trim().parse::<u64>() {
        Ok(ms) => Some(Duration::from_millis(ms)),
        Err(_) => {
            warn!("{key} invalid ('{value}'); expected milliseconds");
            None
        },
    }
}

// src/config/model.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::op::Op;
use crate::types::OpName;
use crate::watch::patterns::PathPatterns;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [watch]
/// root = "."
///
/// [default]
/// delay = "200ms"
/// watch = ["src/**"]
/// exclude = ["**/*.tmp"]
///
/// [handler.build]
/// cmd = "cargo build"
/// ops = ["write"]
/// ```
///
/// All sections are optional and have reasonable defaults, but validation
/// requires at least one handler.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    /// `[watch]` section.
    #[serde(default)]
    pub watch: WatchSection,

    /// Defaults for `delay`, `watch`, `exclude` and `ops` from `[default]`.
    #[serde(default)]
    pub default: DefaultSection,

    /// All handlers from `[handler.<name>]`, keyed by handler name.
    #[serde(default)]
    pub handler: BTreeMap<String, HandlerConfig>,
}

/// `[watch]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WatchSection {
    /// Directory to watch. Relative paths are resolved against the directory
    /// containing the config file, which is also the default.
    #[serde(default)]
    pub root: Option<PathBuf>,
}

/// `[default]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct DefaultSection {
    #[serde(default = "default_delay")]
    pub delay: String,

    #[serde(default = "default_watch")]
    pub watch: Vec<String>,

    #[serde(default)]
    pub exclude: Vec<String>,

    #[serde(default = "default_ops")]
    pub ops: Vec<OpName>,
}

fn default_delay() -> String {
    "200ms".to_string()
}

fn default_watch() -> Vec<String> {
    vec!["**".to_string()]
}

fn default_ops() -> Vec<OpName> {
    vec![
        OpName::Create,
        OpName::Write,
        OpName::Remove,
        OpName::Rename,
    ]
}

impl Default for DefaultSection {
    fn default() -> Self {
        Self {
            delay: default_delay(),
            watch: default_watch(),
            exclude: Vec::new(),
            ops: default_ops(),
        }
    }
}

/// `[handler.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct HandlerConfig {
    /// Shell command to run.
    pub cmd: String,

    /// Debounce delay, e.g. `"500ms"`. Falls back to `[default].delay`.
    #[serde(default)]
    pub delay: Option<String>,

    #[serde(default)]
    pub watch: Option<Vec<String>>,

    #[serde(default)]
    pub exclude: Option<Vec<String>>,

    #[serde(default)]
    pub append_default_watch: bool,

    #[serde(default)]
    pub append_default_exclude: bool,

    /// Operations this handler reacts to. Falls back to `[default].ops`.
    #[serde(default)]
    pub ops: Option<Vec<OpName>>,
}

/// Fully resolved handler definition.
#[derive(Debug, Clone)]
pub struct HandlerSpec {
    pub name: String,
    pub cmd: String,
    pub delay: Duration,
    pub ops: Op,
    pub patterns: PathPatterns,
}

/// Validated configuration. Build it with `ConfigFile::try_from(raw)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub watch: WatchSection,
    pub default: DefaultSection,
    pub handler: BTreeMap<String, HandlerConfig>,
    handlers: Vec<HandlerSpec>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile, handlers: Vec<HandlerSpec>) -> Self {
        Self {
            watch: raw.watch,
            default: raw.default,
            handler: raw.handler,
            handlers,
        }
    }

    /// Resolved handlers, in name order.
    pub fn handlers(&self) -> &[HandlerSpec] {
        &self.handlers
    }

    /// Directory to watch, given the directory the config was loaded from.
    pub fn resolve_root(&self, config_dir: &Path) -> PathBuf {
        match &self.watch.root {
            Some(root) if root.is_absolute() => root.clone(),
            Some(root) => config_dir.join(root),
            None => config_dir.to_path_buf(),
        }
    }
}

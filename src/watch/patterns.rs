// src/watch/patterns.rs

use std::fmt;

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

/// Default watch configuration from `[default]` in the config.
///
/// ```toml
/// [default]
/// watch = ["src/**/*.rs"]
/// exclude = ["**/*.tmp"]
/// ```
#[derive(Debug, Clone, Default)]
pub struct WatchDefaults {
    pub watch: Vec<String>,
    pub exclude: Vec<String>,
}

/// Raw per-handler pattern specification coming from the config.
///
/// - `watch` / `exclude` are optional handler-local lists.
/// - `append_default_watch` / `append_default_exclude` control whether the
///   handler lists are merged with the default lists.
#[derive(Debug, Clone)]
pub struct RawPatternSpec {
    pub name: String,
    pub watch: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
    pub append_default_watch: bool,
    pub append_default_exclude: bool,
}

/// Compiled watch/exclude glob patterns for a single handler.
///
/// Patterns are evaluated against event names, i.e. paths relative to the
/// watch root such as `"src/main.rs"`.
#[derive(Clone)]
pub struct PathPatterns {
    watch_set: GlobSet,
    exclude_set: Option<GlobSet>,
}

impl fmt::Debug for PathPatterns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathPatterns")
            .field("watch", &self.watch_set.len())
            .field("exclude", &self.exclude_set.as_ref().map(GlobSet::len))
            .finish()
    }
}

impl PathPatterns {
    /// Compile the effective patterns for one handler.
    ///
    /// - If `append_default_watch = true`, effective watch list is
    ///   `handler.watch + default.watch`.
    /// - Else, if `handler.watch` is Some, use only that.
    /// - Else, use `default.watch`.
    ///
    /// Same rules for `exclude`.
    pub fn build(defaults: &WatchDefaults, spec: &RawPatternSpec) -> Result<Self> {
        let watch_patterns = effective_patterns(
            spec.watch.as_ref(),
            &defaults.watch,
            spec.append_default_watch,
        );
        let exclude_patterns = effective_patterns(
            spec.exclude.as_ref(),
            &defaults.exclude,
            spec.append_default_exclude,
        );

        let watch_set = build_globset(&watch_patterns)
            .with_context(|| format!("building watch globset for handler {}", spec.name))?;

        let exclude_set = if exclude_patterns.is_empty() {
            None
        } else {
            Some(
                build_globset(&exclude_patterns).with_context(|| {
                    format!("building exclude globset for handler {}", spec.name)
                })?,
            )
        };

        Ok(Self {
            watch_set,
            exclude_set,
        })
    }

    /// Returns true if the relative path is watched and not excluded.
    pub fn matches(&self, rel_path: &str) -> bool {
        if !self.watch_set.is_match(rel_path) {
            return false;
        }
        if let Some(exclude) = &self.exclude_set {
            if exclude.is_match(rel_path) {
                return false;
            }
        }
        true
    }
}

/// Helper to decide the effective patterns list for a given dimension (watch or exclude).
fn effective_patterns(
    own_list: Option<&Vec<String>>,
    default_list: &[String],
    append_default: bool,
) -> Vec<String> {
    match (own_list, append_default) {
        (Some(list), true) => {
            let mut combined = list.clone();
            combined.extend(default_list.iter().cloned());
            combined
        }
        (Some(list), false) => list.clone(),
        (None, _) => default_list.to_vec(),
    }
}

/// Build a GlobSet from simple string patterns.
pub fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

// src/config/validate.rs

use crate::config::model::{ConfigFile, HandlerConfig, HandlerSpec, RawConfigFile};
use crate::errors::{FswatchError, Result};
use crate::op::Op;
use crate::types::{ops_mask, parse_duration};
use crate::watch::patterns::{PathPatterns, RawPatternSpec, WatchDefaults};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = FswatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        ensure_has_handlers(&raw)?;
        parse_delay("[default].delay", &raw.default.delay)?;

        let defaults = WatchDefaults {
            watch: raw.default.watch.clone(),
            exclude: raw.default.exclude.clone(),
        };

        let handlers = raw
            .handler
            .iter()
            .map(|(name, handler)| resolve_handler(&raw, &defaults, name, handler))
            .collect::<Result<Vec<_>>>()?;

        Ok(ConfigFile::new_unchecked(raw, handlers))
    }
}

fn ensure_has_handlers(cfg: &RawConfigFile) -> Result<()> {
    if cfg.handler.is_empty() {
        return Err(FswatchError::ConfigError(
            "config must contain at least one [handler.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn resolve_handler(
    cfg: &RawConfigFile,
    defaults: &WatchDefaults,
    name: &str,
    handler: &HandlerConfig,
) -> Result<HandlerSpec> {
    if handler.cmd.trim().is_empty() {
        return Err(FswatchError::ConfigError(format!(
            "handler '{}' has an empty `cmd`",
            name
        )));
    }

    let delay = match &handler.delay {
        Some(delay) => parse_delay(&format!("handler '{}' delay", name), delay)?,
        None => parse_delay("[default].delay", &cfg.default.delay)?,
    };

    let ops = ops_mask(handler.ops.as_deref().unwrap_or(&cfg.default.ops));
    if !ops.intersects(Op::CREATE | Op::WRITE | Op::REMOVE | Op::RENAME) {
        return Err(FswatchError::ConfigError(format!(
            "handler '{}' must react to at least one of create, write, remove or rename",
            name
        )));
    }

    let spec = RawPatternSpec {
        name: name.to_string(),
        watch: handler.watch.clone(),
        exclude: handler.exclude.clone(),
        append_default_watch: handler.append_default_watch,
        append_default_exclude: handler.append_default_exclude,
    };
    let patterns = PathPatterns::build(defaults, &spec)
        .map_err(|err| FswatchError::ConfigError(format!("{err:#}")))?;

    Ok(HandlerSpec {
        name: name.to_string(),
        cmd: handler.cmd.clone(),
        delay,
        ops,
        patterns,
    })
}

fn parse_delay(what: &str, value: &str) -> Result<std::time::Duration> {
    parse_duration(value).map_err(|msg| FswatchError::ConfigError(format!("{what}: {msg}")))
}

#![allow(dead_code)]

use fswatch::config::{ConfigFile, HandlerConfig, RawConfigFile};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn with_handler(mut self, name: &str, handler: HandlerConfig) -> Self {
        self.config.handler.insert(name.to_string(), handler);
        self
    }

    pub fn with_default_delay(mut self, delay: &str) -> Self {
        self.config.default.delay = delay.to_string();
        self
    }

    pub fn with_global_watch(mut self, pattern: &str) -> Self {
        self.config.default.watch.push(pattern.to_string());
        self
    }

    pub fn with_global_exclude(mut self, pattern: &str) -> Self {
        self.config.default.exclude.push(pattern.to_string());
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `HandlerConfig`.
pub struct HandlerConfigBuilder {
    handler: HandlerConfig,
}

impl HandlerConfigBuilder {
    pub fn new(cmd: &str) -> Self {
        Self {
            handler: HandlerConfig {
                cmd: cmd.to_string(),
                delay: None,
                watch: None,
                exclude: None,
                append_default_watch: false,
                append_default_exclude: false,
                ops: None,
            },
        }
    }

    pub fn delay(mut self, delay: &str) -> Self {
        self.handler.delay = Some(delay.to_string());
        self
    }

    pub fn watch(mut self, pattern: &str) -> Self {
        self.handler
            .watch
            .get_or_insert_with(Vec::new)
            .push(pattern.to_string());
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.handler
            .exclude
            .get_or_insert_with(Vec::new)
            .push(pattern.to_string());
        self
    }

    pub fn ops(mut self, ops: &[fswatch::types::OpName]) -> Self {
        self.handler.ops = Some(ops.to_vec());
        self
    }

    pub fn append_default_watch(mut self, val: bool) -> Self {
        self.handler.append_default_watch = val;
        self
    }

    pub fn append_default_exclude(mut self, val: bool) -> Self {
        self.handler.append_default_exclude = val;
        self
    }

    pub fn build(self) -> HandlerConfig {
        self.handler
    }
}

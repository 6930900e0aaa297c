use crate::error::Error;

use serde::Deserialize;

/// Application-wide settings for a [`Wireframe`](crate::Wireframe).
///
/// Can be built in code or loaded from TOML:
///
/// ```
/// use wireframe::Config;
///
/// let config = Config::from_toml("human_debug_output = true").unwrap();
/// assert!(config.shows_debug_pages());
/// assert!(config.shows_error_pages());
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    human_error_output: bool,
    human_debug_output: bool,
    body_limit: usize,
}

impl Config {
    /// Create a [`Config`] instance with the default settings.
    pub fn new() -> Self {
        Self {
            human_error_output: true,
            human_debug_output: false,
            body_limit: 262_144, // (~256kB)
        }
    }

    /// Parse settings from a TOML document. Missing keys keep their
    /// defaults.
    pub fn from_toml(source: &str) -> Result<Self, Error> {
        Ok(toml::from_str(source)?)
    }

    /// Render error statuses as HTML pages for browsers.
    ///
    /// Enabled by default.
    pub fn human_error_output(mut self, enabled: bool) -> Self {
        self.human_error_output = enabled;
        self
    }

    /// Render unexpected errors as an HTML page with a backtrace for
    /// browsers, instead of passing them to the host.
    ///
    /// Disabled by default.
    pub fn human_debug_output(mut self, enabled: bool) -> Self {
        self.human_debug_output = enabled;
        self
    }

    /// Set maximum number of bytes read from a request body.
    ///
    /// By default the limit is 256kB.
    pub fn body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    pub fn shows_error_pages(&self) -> bool {
        self.human_error_output
    }

    pub fn shows_debug_pages(&self) -> bool {
        self.human_debug_output
    }

    pub fn limit(&self) -> usize {
        self.body_limit
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

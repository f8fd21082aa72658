//! Logging setup.
//!
//! auxi logs through [`tracing`]. Nothing is installed globally until you
//! ask: build a [`LogConfig`], tweak it, call [`LogConfig::init`] once at
//! startup. `RUST_LOG` overrides the configured level when set.
//!
//! ```rust,no_run
//! use auxi::logging::LogConfig;
//!
//! LogConfig::default()
//!     .level("debug")
//!     .timestamps(true)
//!     .source_location(true)
//!     .init()
//!     .expect("logging already initialised");
//! ```

use tracing_subscriber::EnvFilter;

use crate::error::Error;

/// Output options for the process-wide subscriber.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogConfig {
    level: String,
    ansi: bool,
    target: bool,
    timestamps: bool,
    source_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            ansi: true,
            target: false,
            timestamps: false,
            source_location: false,
        }
    }
}

impl LogConfig {
    /// Default filter directive, e.g. `"info"` or `"auxi=debug,warn"`.
    pub fn level(mut self, directive: impl Into<String>) -> Self {
        self.level = directive.into();
        self
    }

    /// Colored level names.
    pub fn ansi(mut self, on: bool) -> Self {
        self.ansi = on;
        self
    }

    /// Prefix each line with the emitting module path.
    pub fn target(mut self, on: bool) -> Self {
        self.target = on;
        self
    }

    pub fn timestamps(mut self, on: bool) -> Self {
        self.timestamps = on;
        self
    }

    /// Append `file:line` of the call site.
    pub fn source_location(mut self, on: bool) -> Self {
        self.source_location = on;
        self
    }

    /// Filter used by [`init`](Self::init): `RUST_LOG` if set and valid, else
    /// the configured level.
    pub fn filter(&self) -> Result<EnvFilter, Error> {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.level))
            .map_err(|e| Error::Logging(format!("invalid level `{}`: {e}", self.level)))
    }

    /// Installs the global subscriber. Fails if one is already installed.
    pub fn init(&self) -> Result<(), Error> {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(self.filter()?)
            .with_ansi(self.ansi)
            .with_target(self.target)
            .with_file(self.source_location)
            .with_line_number(self.source_location);

        let installed = if self.timestamps {
            builder.try_init()
        } else {
            builder.without_time().try_init()
        };
        installed.map_err(|e| Error::Logging(e.to_string()))
    }
}

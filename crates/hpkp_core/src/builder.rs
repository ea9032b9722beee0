//! Pin configuration and the compiled-header cache.
//!
//! **States:** `Dirty -> Compiled`
//!
//! - Every mutator moves the builder to `Dirty`.
//! - `header()` on a `Dirty` builder runs the compiler once and moves to
//!   `Compiled`; further reads return the cached line untouched.
//!
//! A builder is not internally synchronized. Hosts sharing one across threads
//! must guard the whole builder with a single lock.

use crate::header::compile_header;
use crate::pin::{DEFAULT_ALGORITHM, PinEntry, PinError};

/// 60 days.
pub const DEFAULT_MAX_AGE_SECONDS: u64 = 5_184_000;

/// Directive values and pins that make up one header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    /// Pins in insertion order; header output follows this order.
    pub pins: Vec<PinEntry>,
    pub include_subdomains: bool,
    pub max_age_seconds: u64,
    pub report_only: bool,
    /// Only affects output when non-empty.
    pub report_uri: Option<String>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            pins: Vec::new(),
            include_subdomains: false,
            max_age_seconds: DEFAULT_MAX_AGE_SECONDS,
            report_only: false,
            report_uri: None,
        }
    }
}

/// Compile cache state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileState {
    /// Configuration changed since the last compile (or never compiled).
    Dirty,
    /// Header line compiled from the current configuration.
    Compiled(String),
}

/// Incremental header builder with a lazily compiled header line.
#[derive(Debug, Clone)]
pub struct HeaderBuilder {
    config: Configuration,
    state: CompileState,
    compile_count: u64,
}

impl Default for HeaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HeaderBuilder {
    /// Create a builder with no pins and default directives.
    pub fn new() -> Self {
        Self::from_configuration(Configuration::default())
    }

    /// Create a builder from previously assembled (e.g. persisted) state.
    pub fn from_configuration(config: Configuration) -> Self {
        Self {
            config,
            state: CompileState::Dirty,
            compile_count: 0,
        }
    }

    /// Add a `sha256` pin. See [`HeaderBuilder::add_hash_with`].
    pub fn add_hash(&mut self, hash: impl AsRef<[u8]>) -> Result<&mut Self, PinError> {
        self.add_hash_with(hash, DEFAULT_ALGORITHM)
    }

    /// Normalize `hash` and append it as a pin for `algorithm`.
    ///
    /// On error nothing is stored and the cache state is unchanged.
    pub fn add_hash_with(
        &mut self,
        hash: impl AsRef<[u8]>,
        algorithm: &str,
    ) -> Result<&mut Self, PinError> {
        let pin = match PinEntry::new(hash, algorithm) {
            Ok(pin) => pin,
            Err(err) => {
                tracing::warn!("pin rejected algo={} error={}", algorithm, err);
                return Err(err);
            }
        };
        tracing::debug!(
            "pin added algo={} digest={} total={}",
            pin.algorithm().as_str(),
            pin.digest(),
            self.config.pins.len() + 1
        );
        self.config.pins.push(pin);
        self.mark_dirty();
        Ok(self)
    }

    pub fn include_subdomains(&mut self, include: bool) -> &mut Self {
        self.config.include_subdomains = include;
        self.mark_dirty();
        self
    }

    pub fn max_age(&mut self, seconds: u64) -> &mut Self {
        self.config.max_age_seconds = seconds;
        self.mark_dirty();
        self
    }

    /// Restore `max-age` to [`DEFAULT_MAX_AGE_SECONDS`].
    pub fn reset_max_age(&mut self) -> &mut Self {
        self.max_age(DEFAULT_MAX_AGE_SECONDS)
    }

    pub fn report_only(&mut self, report_only: bool) -> &mut Self {
        self.config.report_only = report_only;
        self.mark_dirty();
        self
    }

    /// Set the report URI. An empty URI disables the `report-uri` directive
    /// and the report-only header name.
    pub fn report_uri(&mut self, uri: impl Into<String>) -> &mut Self {
        self.config.report_uri = Some(uri.into());
        self.mark_dirty();
        self
    }

    /// The compiled header line, compiling first if the configuration changed.
    pub fn header(&mut self) -> &str {
        if self.state == CompileState::Dirty {
            let compiled = compile_header(&self.config);
            self.compile_count += 1;
            tracing::debug!(
                "header compiled pins={} len={} compile_count={}",
                self.config.pins.len(),
                compiled.len(),
                self.compile_count
            );
            self.state = CompileState::Compiled(compiled);
        }
        match &self.state {
            CompileState::Compiled(header) => header,
            CompileState::Dirty => "",
        }
    }

    /// Whether the next `header()` call will recompile.
    pub fn is_stale(&self) -> bool {
        self.state == CompileState::Dirty
    }

    pub fn state(&self) -> &CompileState {
        &self.state
    }

    /// Number of times the compiler has run for this builder.
    pub fn compile_count(&self) -> u64 {
        self.compile_count
    }

    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    fn mark_dirty(&mut self) {
        self.state = CompileState::Dirty;
    }
}

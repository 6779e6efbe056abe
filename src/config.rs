//! The configuration handle: one value owning the registry, the parameter
//! slots, and the diagnostics log for a parsing session.
//!
//! Usage follows a fixed shape: register parameters and actions, parse the
//! command line at one priority, parse the configuration file at another,
//! then query. Distinct priorities per source make resolution independent of
//! parse order; the conventional choice is a higher priority for the command
//! line so it wins over the file (see [`crate`] docs for the full model).
//!
//! A handle covers one independent configuration task. It is not
//! synchronized internally: share it across threads only behind external
//! locking. Dropping it releases the descriptors, slots, and log it owns —
//! values handed out by [`value()`](Config::value) are borrowed, so clone
//! what must outlive the handle.

use std::io;
use std::path::Path;

use crate::args;
use crate::diagnostics::{Diagnostic, DiagnosticLog, Severity};
use crate::error::ConfigError;
use crate::file;
use crate::registry::{ActionSpec, ParamSpec, Registry};
use crate::value::Value;

pub struct Config {
    registry: Registry,
    log: DiagnosticLog,
}

impl Config {
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            log: DiagnosticLog::new(),
        }
    }

    /// Register a batch of parameters. All-or-nothing: if any descriptor is
    /// invalid or collides with anything already registered (or with the
    /// rest of the batch), one error is logged per violation and none of the
    /// batch is kept. Registering a corrected batch afterwards is fine.
    pub fn register_params(
        &mut self,
        specs: impl IntoIterator<Item = ParamSpec>,
    ) -> Result<(), ConfigError> {
        self.registry
            .register_params(specs.into_iter().collect(), &mut self.log)
    }

    /// Register a batch of command-line actions, with the same
    /// all-or-nothing contract as [`register_params`](Self::register_params).
    pub fn register_actions(
        &mut self,
        specs: impl IntoIterator<Item = ActionSpec>,
    ) -> Result<(), ConfigError> {
        self.registry
            .register_actions(specs.into_iter().collect(), &mut self.log)
    }

    /// Parse command-line tokens (without the program name — pass
    /// `std::env::args().skip(1)`) at the given source priority.
    ///
    /// Returns the index of the first token the parser did not consume;
    /// tokens from there on are the caller's to interpret. An `Err` means at
    /// least one error-severity diagnostic was logged during this call.
    pub fn parse_args<I, S>(&mut self, tokens: I, priority: i32) -> Result<usize, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        args::parse_args(&mut self.registry, &mut self.log, &tokens, priority)
    }

    /// Read and parse a configuration file at the given source priority.
    ///
    /// An unreadable file aborts immediately with [`ConfigError::Io`].
    /// Malformed lines are fail-soft: each is logged and parsing continues;
    /// the call fails once at the end if any line failed.
    pub fn parse_file(
        &mut self,
        path: impl AsRef<Path>,
        priority: i32,
    ) -> Result<(), ConfigError> {
        file::parse_file(&mut self.registry, &mut self.log, path.as_ref(), priority)
    }

    /// Parse configuration-file text from memory. Same contract as
    /// [`parse_file`](Self::parse_file) minus the I/O.
    pub fn parse_str(&mut self, content: &str, priority: i32) -> Result<(), ConfigError> {
        file::parse_str(&mut self.registry, &mut self.log, content, priority)
    }

    /// Whether a parameter received a value from any source. `name` is the
    /// file key, or the long option for parameters registered without one.
    pub fn is_set(&self, name: &str) -> bool {
        self.registry.lookup(name).is_some_and(|p| p.slot.is_set())
    }

    /// Element count of an array parameter's value; 0 for unset parameters,
    /// scalars, unknown names, and explicitly empty arrays (`[]` — check
    /// [`is_set`](Self::is_set) to tell the last two apart).
    pub fn array_len(&self, name: &str) -> usize {
        self.registry.lookup(name).map_or(0, |p| p.slot.array_len())
    }

    /// The resolved value of a parameter, if any source supplied one.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.registry.lookup(name).and_then(|p| p.slot.value())
    }

    /// Registered parameter descriptors, in registration order. Useful for
    /// rendering usage text in the caller.
    pub fn params(&self) -> impl Iterator<Item = &ParamSpec> {
        self.registry.params.iter().map(|p| &p.spec)
    }

    /// Registered action descriptors, in registration order.
    pub fn actions(&self) -> impl Iterator<Item = &ActionSpec> {
        self.registry.actions.iter()
    }

    /// Error-severity diagnostics, oldest first. Does not clear.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.log.iter(Severity::Error)
    }

    /// Warning-severity diagnostics, oldest first. Does not clear.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.log.iter(Severity::Warning)
    }

    /// Remove and return all error diagnostics. Warnings stay.
    pub fn drain_errors(&mut self) -> Vec<Diagnostic> {
        self.log.drain(Severity::Error)
    }

    /// Remove and return all warning diagnostics. Errors stay.
    pub fn drain_warnings(&mut self) -> Vec<Diagnostic> {
        self.log.drain(Severity::Warning)
    }

    /// Drain error diagnostics to a sink, one prefixed line each.
    pub fn report_errors<W: io::Write>(
        &mut self,
        sink: &mut W,
        prefix: &str,
    ) -> io::Result<()> {
        self.log.report(Severity::Error, sink, prefix)
    }

    /// Drain warning diagnostics to a sink, one prefixed line each.
    pub fn report_warnings<W: io::Write>(
        &mut self,
        sink: &mut W,
        prefix: &str,
    ) -> io::Result<()> {
        self.log.report(Severity::Warning, sink, prefix)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

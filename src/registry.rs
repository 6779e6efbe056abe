//! Parameter and action descriptors, and the registry that validates them.
//!
//! Registration is batched and all-or-nothing: every descriptor in a batch is
//! checked against its own constraints, against every previously registered
//! descriptor, and against the rest of the batch. One diagnostics entry is
//! logged per violation; if any violation is found the whole batch is
//! discarded and the call fails. Re-registering a corrected batch afterwards
//! is fine.
//!
//! Parameters and actions share one option namespace: a short or long option
//! taken by either blocks both.

use std::fmt;

use crate::diagnostics::DiagnosticLog;
use crate::error::ConfigError;
use crate::store::Slot;
use crate::value::ValueKind;

/// Descriptor for a configuration parameter: a named, typed value slot.
///
/// At least one identity — short option, long option, or file key — must be
/// set. The short/long options feed the command-line parser; the file key
/// feeds the configuration-file parser and is the primary query name.
pub struct ParamSpec {
    pub(crate) short: Option<char>,
    pub(crate) long: Option<String>,
    pub(crate) key: Option<String>,
    pub(crate) kind: ValueKind,
    pub(crate) help: Option<String>,
}

impl ParamSpec {
    pub fn new(kind: ValueKind) -> Self {
        Self {
            short: None,
            long: None,
            key: None,
            kind,
            help: None,
        }
    }

    /// Short command-line option (`-c`).
    pub fn short(mut self, opt: char) -> Self {
        self.short = Some(opt);
        self
    }

    /// Long command-line option (`--count`), without the dashes.
    pub fn long(mut self, opt: impl Into<String>) -> Self {
        self.long = Some(opt.into());
        self
    }

    /// File key matched by the configuration-file parser (`COUNT = ...`).
    pub fn key(mut self, name: impl Into<String>) -> Self {
        self.key = Some(name.into());
        self
    }

    /// Human description, stored for the caller to render.
    pub fn help(mut self, text: impl Into<String>) -> Self {
        self.help = Some(text.into());
        self
    }

    pub fn short_option(&self) -> Option<char> {
        self.short
    }

    pub fn long_option(&self) -> Option<&str> {
        self.long.as_deref()
    }

    pub fn file_key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn description(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// The identity used in diagnostics about this parameter.
    pub(crate) fn display_name(&self) -> String {
        if let Some(key) = &self.key {
            key.clone()
        } else if let Some(long) = &self.long {
            format!("--{long}")
        } else if let Some(short) = self.short {
            format!("-{short}")
        } else {
            "<unnamed>".to_string()
        }
    }
}

impl fmt::Debug for ParamSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamSpec")
            .field("short", &self.short)
            .field("long", &self.long)
            .field("key", &self.key)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Descriptor for a command-line action: an option that triggers an
/// immediate callback instead of storing a value.
///
/// The closure captures whatever context it needs and may never return
/// (printing usage and calling `std::process::exit` is the expected use).
/// Argument parsing stops right after invoking it.
pub struct ActionSpec {
    pub(crate) short: Option<char>,
    pub(crate) long: Option<String>,
    pub(crate) action: Box<dyn FnMut()>,
    pub(crate) help: Option<String>,
}

impl ActionSpec {
    pub fn new(action: impl FnMut() + 'static) -> Self {
        Self {
            short: None,
            long: None,
            action: Box::new(action),
            help: None,
        }
    }

    pub fn short(mut self, opt: char) -> Self {
        self.short = Some(opt);
        self
    }

    pub fn long(mut self, opt: impl Into<String>) -> Self {
        self.long = Some(opt.into());
        self
    }

    pub fn help(mut self, text: impl Into<String>) -> Self {
        self.help = Some(text.into());
        self
    }

    pub fn short_option(&self) -> Option<char> {
        self.short
    }

    pub fn long_option(&self) -> Option<&str> {
        self.long.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.help.as_deref()
    }

    fn display_name(&self) -> String {
        if let Some(long) = &self.long {
            format!("--{long}")
        } else if let Some(short) = self.short {
            format!("-{short}")
        } else {
            "<unnamed>".to_string()
        }
    }
}

impl fmt::Debug for ActionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionSpec")
            .field("short", &self.short)
            .field("long", &self.long)
            .finish()
    }
}

/// A registered parameter: its descriptor plus the slot holding its value.
pub(crate) struct Param {
    pub(crate) spec: ParamSpec,
    pub(crate) slot: Slot,
}

#[derive(Default)]
pub(crate) struct Registry {
    pub(crate) params: Vec<Param>,
    pub(crate) actions: Vec<ActionSpec>,
}

/// A long option or file key: leading alphanumeric, then alphanumerics,
/// `_`, `-`, or `.`.
fn valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphanumeric())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// A short option: any graphic ASCII character that cannot be confused
/// with the option syntax itself.
fn valid_short(opt: char) -> bool {
    opt.is_ascii_graphic() && !matches!(opt, '-' | '=')
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register a batch of parameters. All-or-nothing: on any violation,
    /// logs one error per violation and registers none of the batch.
    pub(crate) fn register_params(
        &mut self,
        specs: Vec<ParamSpec>,
        log: &mut DiagnosticLog,
    ) -> Result<(), ConfigError> {
        let mut count = 0;
        for (i, spec) in specs.iter().enumerate() {
            count += self.validate_param(spec, &specs[..i], log);
        }
        if count > 0 {
            return Err(ConfigError::Registration { count });
        }
        self.params.extend(specs.into_iter().map(|spec| Param {
            spec,
            slot: Slot::new(),
        }));
        Ok(())
    }

    /// Register a batch of actions, with the same all-or-nothing contract.
    pub(crate) fn register_actions(
        &mut self,
        specs: Vec<ActionSpec>,
        log: &mut DiagnosticLog,
    ) -> Result<(), ConfigError> {
        let mut count = 0;
        for (i, spec) in specs.iter().enumerate() {
            count += self.validate_action(spec, &specs[..i], log);
        }
        if count > 0 {
            return Err(ConfigError::Registration { count });
        }
        self.actions.extend(specs);
        Ok(())
    }

    fn validate_param(
        &self,
        spec: &ParamSpec,
        earlier: &[ParamSpec],
        log: &mut DiagnosticLog,
    ) -> usize {
        let mut count = 0;
        let name = spec.display_name();

        if spec.short.is_none() && spec.long.is_none() && spec.key.is_none() {
            log.error("parameter descriptor has no short option, long option, or file key");
            count += 1;
        }
        if let Some(short) = spec.short {
            if !valid_short(short) {
                log.error(format!("parameter '{name}': invalid short option '{short}'"));
                count += 1;
            }
        }
        if let Some(long) = &spec.long {
            if !valid_name(long) {
                log.error(format!("parameter '{name}': invalid long option '{long}'"));
                count += 1;
            }
        }
        if let Some(key) = &spec.key {
            if !valid_name(key) {
                log.error(format!("parameter '{name}': invalid file key '{key}'"));
                count += 1;
            }
        }

        count + self.check_collisions(
            "parameter",
            &name,
            spec.short,
            spec.long.as_deref(),
            spec.key.as_deref(),
            earlier.iter().map(|p| (p.short, p.long.as_deref(), p.key.as_deref())),
            log,
        )
    }

    fn validate_action(
        &self,
        spec: &ActionSpec,
        earlier: &[ActionSpec],
        log: &mut DiagnosticLog,
    ) -> usize {
        let mut count = 0;
        let name = spec.display_name();

        if spec.short.is_none() && spec.long.is_none() {
            log.error("action descriptor has no short or long option");
            count += 1;
        }
        if let Some(short) = spec.short {
            if !valid_short(short) {
                log.error(format!("action '{name}': invalid short option '{short}'"));
                count += 1;
            }
        }
        if let Some(long) = &spec.long {
            if !valid_name(long) {
                log.error(format!("action '{name}': invalid long option '{long}'"));
                count += 1;
            }
        }

        count + self.check_collisions(
            "action",
            &name,
            spec.short,
            spec.long.as_deref(),
            None,
            earlier.iter().map(|a| (a.short, a.long.as_deref(), None)),
            log,
        )
    }

    /// Check one new descriptor's identities against everything registered
    /// and against the earlier part of its own batch. Options live in one
    /// namespace shared by parameters and actions; file keys only collide
    /// with other file keys.
    #[allow(clippy::too_many_arguments)]
    fn check_collisions<'a>(
        &self,
        what: &str,
        name: &str,
        short: Option<char>,
        long: Option<&str>,
        key: Option<&str>,
        earlier: impl Iterator<Item = (Option<char>, Option<&'a str>, Option<&'a str>)>,
        log: &mut DiagnosticLog,
    ) -> usize {
        let mut taken_shorts: Vec<char> = Vec::new();
        let mut taken_longs: Vec<&str> = Vec::new();
        let mut taken_keys: Vec<&str> = Vec::new();

        for p in &self.params {
            taken_shorts.extend(p.spec.short);
            taken_longs.extend(p.spec.long.as_deref());
            taken_keys.extend(p.spec.key.as_deref());
        }
        for a in &self.actions {
            taken_shorts.extend(a.short);
            taken_longs.extend(a.long.as_deref());
        }
        for (s, l, k) in earlier {
            taken_shorts.extend(s);
            taken_longs.extend(l);
            taken_keys.extend(k);
        }

        let mut count = 0;
        if let Some(s) = short {
            if taken_shorts.contains(&s) {
                log.error(format!("{what} '{name}': duplicate short option '-{s}'"));
                count += 1;
            }
        }
        if let Some(l) = long {
            if taken_longs.contains(&l) {
                log.error(format!("{what} '{name}': duplicate long option '--{l}'"));
                count += 1;
            }
        }
        if let Some(k) = key {
            if taken_keys.contains(&k) {
                log.error(format!("{what} '{name}': duplicate file key '{k}'"));
                count += 1;
            }
        }
        count
    }

    pub(crate) fn param_by_short(&self, opt: char) -> Option<usize> {
        self.params.iter().position(|p| p.spec.short == Some(opt))
    }

    pub(crate) fn param_by_long(&self, opt: &str) -> Option<usize> {
        self.params
            .iter()
            .position(|p| p.spec.long.as_deref() == Some(opt))
    }

    pub(crate) fn param_by_key(&self, key: &str) -> Option<usize> {
        self.params
            .iter()
            .position(|p| p.spec.key.as_deref() == Some(key))
    }

    pub(crate) fn action_by_short(&self, opt: char) -> Option<usize> {
        self.actions.iter().position(|a| a.short == Some(opt))
    }

    pub(crate) fn action_by_long(&self, opt: &str) -> Option<usize> {
        self.actions
            .iter()
            .position(|a| a.long.as_deref() == Some(opt))
    }

    /// Query lookup: file key first, then long option.
    pub(crate) fn lookup(&self, name: &str) -> Option<&Param> {
        self.param_by_key(name)
            .or_else(|| self.param_by_long(name))
            .map(|i| &self.params[i])
    }
}

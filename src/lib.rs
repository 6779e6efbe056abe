//! Command-line option and configuration-file parsing with priority-based
//! value merging. Register your parameters once, parse both sources, and
//! read back typed values.
//!
//! ```no_run
//! use optcfg::{Config, ParamSpec, ValueKind};
//!
//! let mut cfg = Config::new();
//! cfg.register_params([
//!     ParamSpec::new(ValueKind::Int)
//!         .key("COUNT")
//!         .short('c')
//!         .long("count")
//!         .help("Number of iterations."),
//!     ParamSpec::new(ValueKind::StrArray).key("NAMES").long("names"),
//! ])?;
//!
//! cfg.parse_args(std::env::args().skip(1), 5)?;
//! cfg.parse_file("input.conf", 1)?;
//!
//! if cfg.is_set("COUNT") {
//!     let count = cfg.value("COUNT").unwrap().as_int().unwrap();
//! }
//! cfg.report_warnings(&mut std::io::stderr().lock(), "Warning:")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Why optcfg
//!
//! Small tools keep re-growing the same plumbing: a hand-rolled argv loop,
//! a hand-rolled `KEY = value` reader, and ad-hoc rules for what happens
//! when both supply the same setting. Optcfg replaces that with one
//! registry. A parameter is declared once — its option spellings, its file
//! key, its type — and both parsers feed the same typed slot through the
//! same merge rule. Add a parameter to the registry and the command line,
//! the file format, and the queries all pick it up.
//!
//! # Priority model
//!
//! Every parse call carries a caller-chosen integer priority. A new value
//! replaces a stored one iff its priority is **greater than or equal to**
//! the stored one (an unset parameter accepts anything). Two consequences:
//!
//! - **Order independence.** Give each source a distinct priority and the
//!   outcome is the same whichever source you parse first. The conventional
//!   choice is a high priority for the command line and a low one for the
//!   file, so flags always win — handy when the file's own path is itself a
//!   command-line parameter.
//! - **Last write wins within a source.** Duplicate flags or duplicate file
//!   keys carry equal priority, so the later occurrence overwrites the
//!   earlier one.
//!
//! A value suppressed by a higher-priority earlier value is reported as a
//! warning, not silently dropped. The library imposes no ordering between
//! sources; the comparison rule is the whole contract.
//!
//! # The two grammars
//!
//! **Command line**: `-c7`, `-c 7`, `--count=7`, `--count 7`. Array values
//! travel as one token: `--names '[alice,bob]'`. A scalar bool flag may
//! stand alone (`-v` means true). `--` ends option parsing. Unrecognized
//! options are warnings, and the first bare token stops the parse — its
//! index is returned so the caller can pick up the trailing arguments.
//!
//! **Configuration file**: line-oriented `NAME = VALUE` assignments, `#`
//! comments, trailing-backslash continuations, and `[a, b, c]` arrays.
//! Values containing metacharacters are quoted with `'` or `"`. Unknown
//! keys are warnings; malformed lines are errors that name the line and
//! keep the parse going.
//!
//! # Typed values
//!
//! A parameter is registered with a [`ValueKind`]: bool, char, int, long,
//! float, double, or string — scalar or homogeneous array. Coercion is
//! strict: full-string parses, overflow checks against the declared width,
//! a closed set of boolean spellings, all-or-nothing array conversion.
//! Successful values land in a [`Value`], read back through `as_int()`,
//! `as_str_array()`, and friends; its `Display` form is the canonical
//! literal the parsers would accept back.
//!
//! # Actions
//!
//! Flags like `--help` or `--version` don't store a value — they trigger a
//! registered callback ([`ActionSpec`]) that typically prints something and
//! exits the process. The parser's contract deliberately ends at "invoke":
//! the callback may never return, and if it does, parsing stops right after
//! it. Option names share one namespace across parameters and actions.
//!
//! # Diagnostics, not aborts
//!
//! Nothing in the parse path panics on bad input. Every anomaly — duplicate
//! registration, malformed line, failed coercion, suppressed value, unknown
//! key — is appended to the handle's diagnostics log as a severity-tagged
//! entry. Fallible calls return a summary error when (and only when) they
//! logged at least one error-severity entry; warnings never fail a call.
//! Inspect with [`Config::errors`]/[`Config::warnings`], or drain to any
//! writer with [`Config::report_errors`]/[`Config::report_warnings`].
//! A failed coercion never touches the stored value, and arrays are never
//! partially written.

pub mod error;

mod args;
mod config;
mod diagnostics;
mod file;
mod lex;
mod registry;
mod store;
mod value;

pub use config::Config;
pub use diagnostics::{Diagnostic, Severity};
pub use error::ConfigError;
pub use registry::{ActionSpec, ParamSpec};
pub use value::{CoerceError, Value, ValueKind};

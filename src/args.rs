//! The command-line parser.
//!
//! A single pass over the caller's token vector (program name excluded),
//! classifying each token:
//!
//! - `--name` / `--name=VALUE` — long option, value attached after `=` or in
//!   the next token.
//! - `-x` / `-xVALUE` — short option, value attached in the same token or in
//!   the next one.
//! - `--` — end of options; everything after it is left for the caller.
//! - anything else — a positional argument; parsing stops there.
//!
//! Options are looked up actions first, then parameters. Matching an action
//! invokes its callback and ends the parse immediately — the callback may
//! never return. Unrecognized options are warnings, not errors; the parser
//! keeps going so every anomaly in one invocation gets reported.
//!
//! The returned index is the first token the parser did not consume; the
//! caller can enumerate unused trailing arguments from there.
//!
//! Scalar bool parameters are the one kind whose value is optional: `-v`
//! alone means `true`, and a following token is taken as the value only when
//! it spells a boolean literal. Every other kind requires a value; its
//! absence is an error.

use crate::diagnostics::{DiagnosticLog, Severity};
use crate::error::ConfigError;
use crate::lex;
use crate::registry::Registry;
use crate::store::{self, SetOutcome};
use crate::value::{self, ValueKind};

pub(crate) fn parse_args(
    registry: &mut Registry,
    log: &mut DiagnosticLog,
    tokens: &[String],
    priority: i32,
) -> Result<usize, ConfigError> {
    let errors_before = log.count(Severity::Error);

    let mut i = 0;
    let consumed = loop {
        let Some(token) = tokens.get(i) else {
            break tokens.len();
        };

        if token == "--" {
            break i + 1;
        }

        if let Some(body) = token.strip_prefix("--") {
            let (name, attached) = match body.split_once('=') {
                Some((n, v)) => (n, Some(v)),
                None => (body, None),
            };

            if let Some(act) = registry.action_by_long(name) {
                if let Some(v) = attached {
                    log.warning(format!("option '--{name}' takes no value, ignoring '{v}'"));
                }
                (registry.actions[act].action)();
                break i + 1;
            }
            match registry.param_by_long(name) {
                Some(p) => i = apply(registry, log, tokens, i, p, attached, priority),
                None => {
                    log.warning(format!("unrecognized option '--{name}'"));
                    i += 1;
                }
            }
            continue;
        }

        if token.len() >= 2 && token.starts_with('-') {
            let mut chars = token[1..].chars();
            let opt = chars.next().unwrap_or_default();
            let rest = chars.as_str();
            let attached = (!rest.is_empty()).then_some(rest);

            if let Some(act) = registry.action_by_short(opt) {
                if let Some(v) = attached {
                    log.warning(format!("option '-{opt}' takes no value, ignoring '{v}'"));
                }
                (registry.actions[act].action)();
                break i + 1;
            }
            match registry.param_by_short(opt) {
                Some(p) => i = apply(registry, log, tokens, i, p, attached, priority),
                None => {
                    log.warning(format!("unrecognized option '-{opt}'"));
                    i += 1;
                }
            }
            continue;
        }

        // First positional argument: stop here, leave it unconsumed.
        break i;
    };

    if consumed < tokens.len() {
        let n = tokens.len() - consumed;
        log.warning(format!(
            "{n} trailing argument(s) left unparsed, starting at '{}'",
            tokens[consumed]
        ));
    }

    let errors = log.count(Severity::Error) - errors_before;
    if errors > 0 {
        Err(ConfigError::ParseFailed { count: errors })
    } else {
        Ok(consumed)
    }
}

/// Resolve the value for a matched parameter and hand it to the store.
/// Returns the index of the next unprocessed token.
fn apply(
    registry: &mut Registry,
    log: &mut DiagnosticLog,
    tokens: &[String],
    at: usize,
    param_idx: usize,
    attached: Option<&str>,
    priority: i32,
) -> usize {
    let display = option_display(&tokens[at]);
    let kind = registry.params[param_idx].spec.kind;

    let (text, next) = match attached {
        Some(v) => (Some(v.to_string()), at + 1),
        None if kind == ValueKind::Bool => {
            // Value optional: use the next token only if it is a bool literal.
            match tokens.get(at + 1) {
                Some(peek) if value::parse_bool(peek).is_some() => {
                    (Some(peek.clone()), at + 2)
                }
                _ => (Some("true".to_string()), at + 1),
            }
        }
        None => match tokens.get(at + 1) {
            Some(next_tok) => (Some(next_tok.clone()), at + 2),
            None => {
                log.error(format!("missing value for option '{display}'"));
                (None, at + 1)
            }
        },
    };
    let Some(text) = text else {
        return next;
    };

    let raw = match lex::lex_arg_value(&text) {
        Ok(raw) => raw,
        Err(e) => {
            log.error(format!("option '{display}': {e}"));
            return next;
        }
    };

    let param = &mut registry.params[param_idx];
    match store::set_param(param, &raw, priority) {
        Ok(SetOutcome::Stored) => {}
        Ok(SetOutcome::Suppressed) => {
            log.warning(format!(
                "option '{display}': parameter '{}' already set with higher priority, ignoring",
                param.spec.display_name()
            ));
        }
        Err(e) => {
            log.error(format!("option '{display}': {e}"));
        }
    }
    next
}

/// The option part of a token, for diagnostics: `--name=v` → `--name`.
fn option_display(token: &str) -> String {
    if let Some(body) = token.strip_prefix("--") {
        let name = body.split_once('=').map_or(body, |(n, _)| n);
        format!("--{name}")
    } else {
        token.chars().take(2).collect()
    }
}

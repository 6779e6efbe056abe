//! Per-parameter value slots and the priority rule that arbitrates writes.
//!
//! Each set attempt carries the priority of its source. A new value is
//! admitted iff the slot is unset or the new priority is greater than or
//! equal to the recorded one — so equal priorities mean last write wins
//! (duplicates within one source), and distinct per-source priorities make
//! the outcome independent of the order the sources are parsed in.
//!
//! The priority check happens before coercion: a suppressed attempt is never
//! coerced, never touches the slot, and surfaces as a warning, not a type
//! error. Installing a value drops whatever the slot held before.

use crate::lex::RawValue;
use crate::registry::Param;
use crate::value::{CoerceError, Value};

/// Storage for one parameter's resolved value.
#[derive(Debug, Default)]
pub(crate) struct Slot {
    value: Option<Value>,
    priority: i32,
}

/// What a set attempt did to the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SetOutcome {
    Stored,
    /// A strictly higher-priority value was already present; the attempt
    /// was ignored without coercing the literal.
    Suppressed,
}

impl Slot {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn is_set(&self) -> bool {
        self.value.is_some()
    }

    pub(crate) fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Element count of a stored array; 0 for unset slots and scalars.
    pub(crate) fn array_len(&self) -> usize {
        self.value.as_ref().map_or(0, Value::array_len)
    }

    /// The §4.5 rule: unset slots admit anything; set slots admit
    /// equal-or-higher priority.
    fn admits(&self, priority: i32) -> bool {
        self.value.is_none() || priority >= self.priority
    }

    fn install(&mut self, value: Value, priority: i32) {
        // Assignment drops the displaced value; no leak on re-resolution.
        self.value = Some(value);
        self.priority = priority;
    }
}

/// Attempt to set a parameter from lexed text at the given priority.
///
/// A rejected coercion leaves the slot exactly as it was.
pub(crate) fn set_param(
    param: &mut Param,
    raw: &RawValue,
    priority: i32,
) -> Result<SetOutcome, CoerceError> {
    if !param.slot.admits(priority) {
        return Ok(SetOutcome::Suppressed);
    }
    let value = Value::coerce(param.spec.kind, raw)?;
    param.slot.install(value, priority);
    Ok(SetOutcome::Stored)
}

//! The configuration-file parser.
//!
//! Line-oriented, single pass:
//!
//! ```text
//! # comment to end of line
//! KEY = value
//! ARRKEY = [v1, v2, "two words"]
//! LONGVAL = first part \
//!           continued on the next line
//! ```
//!
//! Comments are stripped first (a `#` inside quotes is literal), then a
//! trailing backslash joins the physical line with the next one. Each
//! non-empty logical line must be a `NAME = VALUE` assignment; the value
//! goes through the shared lexer ([`crate::lex`]) and then coercion against
//! the registered kind.
//!
//! Failures are fail-soft per line: every malformed line is logged with its
//! number and content, and parsing continues so one bad line does not hide
//! the rest. The call reports failure once at the end if any line failed.
//! Only an unreadable file aborts immediately.
//!
//! An unknown key is a warning and its (well-formed) value is ignored; a
//! value that does not even lex is an error whether or not the key is known.

use std::path::Path;

use crate::diagnostics::DiagnosticLog;
use crate::error::ConfigError;
use crate::lex;
use crate::registry::Registry;
use crate::store::{self, SetOutcome};

pub(crate) fn parse_file(
    registry: &mut Registry,
    log: &mut DiagnosticLog,
    path: &Path,
    priority: i32,
) -> Result<(), ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_str(registry, log, &content, priority)
}

pub(crate) fn parse_str(
    registry: &mut Registry,
    log: &mut DiagnosticLog,
    content: &str,
    priority: i32,
) -> Result<(), ConfigError> {
    let physical: Vec<&str> = content.lines().collect();
    let mut errors = 0;

    let mut i = 0;
    while i < physical.len() {
        let line_no = i + 1;
        let mut logical = String::new();

        // Comment stripping happens before the continuation join, so a
        // commented-out backslash does not continue the line.
        loop {
            let stripped = lex::strip_comment(physical[i]).trim_end();
            i += 1;
            match stripped.strip_suffix('\\') {
                Some(head) => {
                    logical.push_str(head);
                    if i >= physical.len() {
                        break;
                    }
                }
                None => {
                    logical.push_str(stripped);
                    break;
                }
            }
        }

        if !apply_line(registry, log, logical.trim(), line_no, priority) {
            errors += 1;
        }
    }

    if errors > 0 {
        Err(ConfigError::ParseFailed { count: errors })
    } else {
        Ok(())
    }
}

/// Process one logical line. Returns false if the line produced an error.
fn apply_line(
    registry: &mut Registry,
    log: &mut DiagnosticLog,
    line: &str,
    line_no: usize,
    priority: i32,
) -> bool {
    if line.is_empty() {
        return true;
    }

    let Some((name, value)) = lex::split_assignment(line) else {
        log.error(format!("line {line_no}: expected NAME = VALUE: '{line}'"));
        return false;
    };
    let name = name.trim();
    if name.is_empty() {
        log.error(format!("line {line_no}: missing key name: '{line}'"));
        return false;
    }

    // Lex before the registry lookup: a value that does not even lex is an
    // error no matter whether the key is known.
    let raw = match lex::lex_file_value(value.trim()) {
        Ok(raw) => raw,
        Err(e) => {
            log.error(format!("line {line_no}: key '{name}': {e}"));
            return false;
        }
    };

    let Some(idx) = registry.param_by_key(name) else {
        log.warning(format!("line {line_no}: unknown key '{name}', value ignored"));
        return true;
    };

    match store::set_param(&mut registry.params[idx], &raw, priority) {
        Ok(SetOutcome::Stored) => true,
        Ok(SetOutcome::Suppressed) => {
            log.warning(format!(
                "line {line_no}: parameter '{name}' already set with higher priority, ignoring"
            ));
            true
        }
        Err(e) => {
            log.error(format!("line {line_no}: key '{name}': {e}"));
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Severity;
    use crate::registry::{Param, ParamSpec};
    use crate::value::ValueKind;
    use std::fs;
    use tempfile::TempDir;

    fn registry() -> (Registry, DiagnosticLog) {
        let mut reg = Registry::new();
        let mut log = DiagnosticLog::new();
        reg.register_params(
            vec![
                ParamSpec::new(ValueKind::Int).key("COUNT"),
                ParamSpec::new(ValueKind::Str).key("TITLE"),
                ParamSpec::new(ValueKind::Bool).key("ENABLED"),
                ParamSpec::new(ValueKind::StrArray).key("NAMES"),
                ParamSpec::new(ValueKind::DoubleArray).key("WEIGHTS"),
            ],
            &mut log,
        )
        .unwrap();
        (reg, log)
    }

    fn get<'r>(reg: &'r Registry, key: &str) -> &'r Param {
        reg.lookup(key).unwrap()
    }

    #[test]
    fn simple_assignments() {
        let (mut reg, mut log) = registry();
        parse_str(&mut reg, &mut log, "COUNT = 7\nENABLED = yes\n", 1).unwrap();
        assert_eq!(get(&reg, "COUNT").slot.value().unwrap().as_int(), Some(7));
        assert_eq!(get(&reg, "ENABLED").slot.value().unwrap().as_bool(), Some(true));
    }

    #[test]
    fn whitespace_around_tokens_insignificant() {
        let (mut reg, mut log) = registry();
        parse_str(&mut reg, &mut log, "   COUNT=7   \n", 1).unwrap();
        assert_eq!(get(&reg, "COUNT").slot.value().unwrap().as_int(), Some(7));
    }

    #[test]
    fn comments_and_blank_lines_skipped() {
        let (mut reg, mut log) = registry();
        parse_str(
            &mut reg,
            &mut log,
            "# leading comment\n\nCOUNT = 7 # trailing comment\n",
            1,
        )
        .unwrap();
        assert_eq!(get(&reg, "COUNT").slot.value().unwrap().as_int(), Some(7));
        assert_eq!(log.count(Severity::Warning), 0);
    }

    #[test]
    fn hash_inside_quotes_is_literal() {
        let (mut reg, mut log) = registry();
        parse_str(&mut reg, &mut log, "TITLE = \"a#b\"\n", 1).unwrap();
        assert_eq!(get(&reg, "TITLE").slot.value().unwrap().as_str(), Some("a#b"));
    }

    #[test]
    fn continuation_joins_lines() {
        let (mut reg, mut log) = registry();
        parse_str(&mut reg, &mut log, "TITLE = first part \\\ncontinued\n", 1).unwrap();
        let title = get(&reg, "TITLE").slot.value().unwrap().as_str().unwrap();
        assert_eq!(title, "first part continued");
    }

    #[test]
    fn continuation_after_comment_strip() {
        // The backslash is inside the comment, so no join happens.
        let (mut reg, mut log) = registry();
        parse_str(
            &mut reg,
            &mut log,
            "COUNT = 7 # note \\\nTITLE = x\n",
            1,
        )
        .unwrap();
        assert_eq!(get(&reg, "COUNT").slot.value().unwrap().as_int(), Some(7));
        assert_eq!(get(&reg, "TITLE").slot.value().unwrap().as_str(), Some("x"));
    }

    #[test]
    fn array_assignment() {
        let (mut reg, mut log) = registry();
        parse_str(
            &mut reg,
            &mut log,
            "NAMES = [alice, \"bob smith\", carol]\n",
            1,
        )
        .unwrap();
        let names = get(&reg, "NAMES").slot.value().unwrap().as_str_array().unwrap();
        assert_eq!(names, ["alice", "bob smith", "carol"]);
        assert_eq!(get(&reg, "NAMES").slot.array_len(), 3);
    }

    #[test]
    fn empty_array_is_set_with_count_zero() {
        let (mut reg, mut log) = registry();
        parse_str(&mut reg, &mut log, "NAMES = []\n", 1).unwrap();
        let slot = &get(&reg, "NAMES").slot;
        assert!(slot.is_set());
        assert_eq!(slot.array_len(), 0);
    }

    #[test]
    fn unknown_key_is_warning_not_error() {
        let (mut reg, mut log) = registry();
        parse_str(&mut reg, &mut log, "FOO = 1\nCOUNT = 2\n", 1).unwrap();
        assert_eq!(get(&reg, "COUNT").slot.value().unwrap().as_int(), Some(2));
        let warnings = log.drain(Severity::Warning);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("unknown key 'FOO'"));
    }

    #[test]
    fn unknown_key_with_malformed_value_is_error() {
        let (mut reg, mut log) = registry();
        let err = parse_str(&mut reg, &mut log, "FOO = [1, 2\n", 1).unwrap_err();
        assert!(matches!(err, ConfigError::ParseFailed { count: 1 }));
        let msgs = log.drain(Severity::Error);
        assert!(msgs[0].message.contains("line 1"));
        assert!(msgs[0].message.contains("missing closing ']'"));
    }

    #[test]
    fn malformed_line_names_number_and_content() {
        let (mut reg, mut log) = registry();
        let err = parse_str(&mut reg, &mut log, "COUNT = 1\nnot an assignment\n", 1).unwrap_err();
        assert!(matches!(err, ConfigError::ParseFailed { count: 1 }));
        let msgs = log.drain(Severity::Error);
        assert!(msgs[0].message.contains("line 2"));
        assert!(msgs[0].message.contains("not an assignment"));
    }

    #[test]
    fn fail_soft_processes_remaining_lines() {
        let (mut reg, mut log) = registry();
        let err = parse_str(
            &mut reg,
            &mut log,
            "COUNT = abc\nTITLE = ok\nENABLED = maybe\n",
            1,
        )
        .unwrap_err();
        // Both bad lines logged, the good line still applied.
        assert!(matches!(err, ConfigError::ParseFailed { count: 2 }));
        assert_eq!(get(&reg, "TITLE").slot.value().unwrap().as_str(), Some("ok"));
    }

    #[test]
    fn unterminated_array_leaves_destination_unset() {
        let (mut reg, mut log) = registry();
        let err = parse_str(&mut reg, &mut log, "WEIGHTS = [1.5, 2.5\n", 1).unwrap_err();
        assert!(matches!(err, ConfigError::ParseFailed { count: 1 }));
        assert!(!get(&reg, "WEIGHTS").slot.is_set());
    }

    #[test]
    fn type_error_preserves_prior_value() {
        let (mut reg, mut log) = registry();
        parse_str(&mut reg, &mut log, "COUNT = 7\n", 1).unwrap();
        let err = parse_str(&mut reg, &mut log, "COUNT = abc\n", 1).unwrap_err();
        assert!(matches!(err, ConfigError::ParseFailed { count: 1 }));
        assert_eq!(get(&reg, "COUNT").slot.value().unwrap().as_int(), Some(7));
    }

    #[test]
    fn duplicate_key_last_write_wins() {
        let (mut reg, mut log) = registry();
        parse_str(&mut reg, &mut log, "COUNT = 1\nCOUNT = 2\n", 1).unwrap();
        assert_eq!(get(&reg, "COUNT").slot.value().unwrap().as_int(), Some(2));
    }

    #[test]
    fn suppressed_by_higher_priority_logs_warning() {
        let (mut reg, mut log) = registry();
        parse_str(&mut reg, &mut log, "COUNT = 7\n", 5).unwrap();
        parse_str(&mut reg, &mut log, "COUNT = 3\n", 1).unwrap();
        assert_eq!(get(&reg, "COUNT").slot.value().unwrap().as_int(), Some(7));
        let warnings = log.drain(Severity::Warning);
        assert!(warnings[0].message.contains("already set with higher priority"));
    }

    #[test]
    fn bare_multiword_string_value_allowed() {
        // The rest of the line is unambiguously the value; quoting is only
        // needed for metacharacters.
        let (mut reg, mut log) = registry();
        parse_str(&mut reg, &mut log, "TITLE = hello brave world\n", 1).unwrap();
        assert_eq!(
            get(&reg, "TITLE").slot.value().unwrap().as_str(),
            Some("hello brave world")
        );
    }

    // --- real files ---

    #[test]
    fn missing_file_is_io_error() {
        let (mut reg, mut log) = registry();
        let dir = TempDir::new().unwrap();
        let err = parse_file(&mut reg, &mut log, &dir.path().join("absent.conf"), 1).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        // I/O failures abort before any line is read: nothing logged.
        assert_eq!(log.count(Severity::Error), 0);
    }

    #[test]
    fn parses_a_real_file() {
        let (mut reg, mut log) = registry();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("input.conf");
        fs::write(
            &path,
            "# settings\nCOUNT = 7\nNAMES = [a, b]\nENABLED = on\n",
        )
        .unwrap();

        parse_file(&mut reg, &mut log, &path, 1).unwrap();
        assert_eq!(get(&reg, "COUNT").slot.value().unwrap().as_int(), Some(7));
        assert_eq!(get(&reg, "NAMES").slot.array_len(), 2);
        assert_eq!(get(&reg, "ENABLED").slot.value().unwrap().as_bool(), Some(true));
    }
}

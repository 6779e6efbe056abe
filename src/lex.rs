//! The value micro-grammar shared by both parsers.
//!
//! A value is either a scalar literal or a bracketed array of literals:
//!
//! ```text
//! bare-literal
//! "quoted literal"        'single quotes work too'
//! [elem, elem, "two words", elem]
//! []
//! ```
//!
//! Quoting turns an arbitrary span — including commas, brackets, `#`, and
//! whitespace — into one literal; everything between the quotes is kept
//! verbatim. The lexer comes in two strictness levels:
//!
//! - **File mode** ([`lex_file_value`]): the configuration file is the only
//!   tokenizer, so a bare scalar must not contain `,`, `[`, `]`, or a quote
//!   character (those need quoting to disambiguate).
//! - **Argument mode** ([`lex_arg_value`]): the shell already tokenized, so
//!   anything that is not a bracketed array or a fully quoted span is taken
//!   verbatim.
//!
//! Array elements are strict in both modes: a bare element must be a single
//! word free of metacharacters.
//!
//! Comment stripping and the `NAME = VALUE` split live here as well because
//! both must respect quoting ([`strip_comment`], [`split_assignment`]).

use thiserror::Error;

/// A lexed value, not yet coerced to a parameter's kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RawValue {
    Scalar(String),
    Array(Vec<String>),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum LexError {
    #[error("empty value")]
    Empty,

    #[error("empty array element")]
    EmptyElement,

    #[error("unterminated quote")]
    UnterminatedQuote,

    #[error("missing closing ']' in array value")]
    UnterminatedArray,

    #[error("unexpected text after closing quote: '{rest}'")]
    TrailingAfterQuote { rest: String },

    #[error("unexpected text after closing ']': '{rest}'")]
    TrailingAfterArray { rest: String },

    #[error("literal '{literal}' contains reserved characters; wrap it in quotes")]
    ReservedChars { literal: String },
}

fn is_quote(c: char) -> bool {
    c == '\'' || c == '"'
}

/// Cut a line at the first `#` that sits outside any quoted span.
pub(crate) fn strip_comment(line: &str) -> &str {
    let mut quote: Option<char> = None;
    for (i, c) in line.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if is_quote(c) => quote = Some(c),
            None if c == '#' => return &line[..i],
            None => {}
        }
    }
    line
}

/// Split a logical line at the first `=` outside quotes into
/// `(name, value)`. Neither side is trimmed. Returns `None` when the line
/// has no unquoted `=`.
pub(crate) fn split_assignment(line: &str) -> Option<(&str, &str)> {
    let mut quote: Option<char> = None;
    for (i, c) in line.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if is_quote(c) => quote = Some(c),
            None if c == '=' => return Some((&line[..i], &line[i + 1..])),
            None => {}
        }
    }
    None
}

/// Lex a configuration-file value (already comment-stripped and trimmed).
///
/// Bare scalars may contain interior whitespace — the rest of the line is
/// unambiguously the value — but not commas, brackets, or quote characters.
pub(crate) fn lex_file_value(text: &str) -> Result<RawValue, LexError> {
    if text.is_empty() {
        return Err(LexError::Empty);
    }
    if text.starts_with('[') {
        return lex_array(text);
    }
    if let Some(first) = text.chars().next().filter(|c| is_quote(*c)) {
        return Ok(RawValue::Scalar(unquote_exact(text, first)?.to_string()));
    }
    if text.contains([',', '[', ']', '\'', '"']) {
        return Err(LexError::ReservedChars {
            literal: text.to_string(),
        });
    }
    Ok(RawValue::Scalar(text.to_string()))
}

/// Lex a command-line value token.
///
/// The shell already grouped the token, so only two shapes get special
/// treatment: a bracketed array, and a token fully wrapped in matching
/// quotes (the quotes are dropped). Everything else is scalar, verbatim —
/// an empty token is the empty string, not an error.
pub(crate) fn lex_arg_value(text: &str) -> Result<RawValue, LexError> {
    if text.starts_with('[') {
        return lex_array(text);
    }
    if text.len() >= 2 {
        if let Some(q) = text.chars().next().filter(|c| is_quote(*c)) {
            if text.ends_with(q) {
                return Ok(RawValue::Scalar(text[1..text.len() - 1].to_string()));
            }
        }
    }
    Ok(RawValue::Scalar(text.to_string()))
}

/// Lex `[ elem, elem, ... ]`. `text` starts with `[`; the matching `]` must
/// close the value, modulo trailing whitespace.
fn lex_array(text: &str) -> Result<RawValue, LexError> {
    let mut quote: Option<char> = None;
    let mut close = None;
    for (i, c) in text.char_indices().skip(1) {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == ']' => {
                close = Some(i);
                break;
            }
            None if is_quote(c) => quote = Some(c),
            None => {}
        }
    }
    let Some(close) = close else {
        return Err(LexError::UnterminatedArray);
    };

    let rest = text[close + 1..].trim();
    if !rest.is_empty() {
        return Err(LexError::TrailingAfterArray { rest: rest.into() });
    }

    let body = &text[1..close];
    if body.trim().is_empty() {
        // Explicitly empty: `[]` is a zero-element array, not an absence.
        return Ok(RawValue::Array(Vec::new()));
    }

    let mut elems = Vec::new();
    for piece in split_top_level(body) {
        elems.push(lex_element(piece.trim())?);
    }
    Ok(RawValue::Array(elems))
}

/// Split an array body on commas outside quotes.
fn split_top_level(body: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in body.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if is_quote(c) => quote = Some(c),
            None if c == ',' => {
                pieces.push(&body[start..i]);
                start = i + 1;
            }
            None => {}
        }
    }
    pieces.push(&body[start..]);
    pieces
}

/// Lex one array element (already trimmed): a quoted span or a bare word.
fn lex_element(piece: &str) -> Result<String, LexError> {
    if piece.is_empty() {
        return Err(LexError::EmptyElement);
    }
    if let Some(q) = piece.chars().next().filter(|c| is_quote(*c)) {
        return Ok(unquote_exact(piece, q)?.to_string());
    }
    if piece.contains(['[', ']', '\'', '"']) || piece.chars().any(char::is_whitespace) {
        return Err(LexError::ReservedChars {
            literal: piece.to_string(),
        });
    }
    Ok(piece.to_string())
}

/// Strip matching quotes from `text`, which starts with the quote `q`.
/// The closing quote must end the span, modulo trailing whitespace.
fn unquote_exact(text: &str, q: char) -> Result<&str, LexError> {
    let Some(close) = text[1..].find(q).map(|p| p + 1) else {
        return Err(LexError::UnterminatedQuote);
    };
    let rest = text[close + 1..].trim();
    if !rest.is_empty() {
        return Err(LexError::TrailingAfterQuote { rest: rest.into() });
    }
    Ok(&text[1..close])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(s: &str) -> RawValue {
        RawValue::Scalar(s.to_string())
    }

    fn array(elems: &[&str]) -> RawValue {
        RawValue::Array(elems.iter().map(|e| e.to_string()).collect())
    }

    // --- strip_comment ---

    #[test]
    fn comment_cut_at_hash() {
        assert_eq!(strip_comment("KEY = 1 # note"), "KEY = 1 ");
    }

    #[test]
    fn hash_inside_quotes_kept() {
        assert_eq!(strip_comment(r##"KEY = "a#b" # note"##), r#"KEY = "a#b" "#);
    }

    #[test]
    fn line_without_hash_untouched() {
        assert_eq!(strip_comment("KEY = 1"), "KEY = 1");
    }

    #[test]
    fn whole_line_comment() {
        assert_eq!(strip_comment("# all comment"), "");
    }

    // --- split_assignment ---

    #[test]
    fn splits_at_first_equals() {
        let (name, value) = split_assignment("KEY = a=b").unwrap();
        assert_eq!(name, "KEY ");
        assert_eq!(value, " a=b");
    }

    #[test]
    fn equals_inside_quotes_not_a_split_point() {
        let (name, value) = split_assignment(r#"KEY = "a=b""#).unwrap();
        assert_eq!(name.trim(), "KEY");
        assert_eq!(value.trim(), r#""a=b""#);
    }

    #[test]
    fn no_equals_is_none() {
        assert!(split_assignment("just words").is_none());
    }

    // --- scalars, file mode ---

    #[test]
    fn bare_scalar() {
        assert_eq!(lex_file_value("42").unwrap(), scalar("42"));
    }

    #[test]
    fn bare_scalar_with_interior_whitespace() {
        // The rest of the line is unambiguously the value.
        assert_eq!(
            lex_file_value("first part continued").unwrap(),
            scalar("first part continued")
        );
    }

    #[test]
    fn quoted_scalar_keeps_spaces_and_metachars() {
        assert_eq!(lex_file_value(r#""a, [b] c""#).unwrap(), scalar("a, [b] c"));
    }

    #[test]
    fn single_quoted_scalar() {
        assert_eq!(lex_file_value("'bob smith'").unwrap(), scalar("bob smith"));
    }

    #[test]
    fn empty_quoted_scalar() {
        assert_eq!(lex_file_value(r#""""#).unwrap(), scalar(""));
    }

    #[test]
    fn empty_value_rejected() {
        assert_eq!(lex_file_value(""), Err(LexError::Empty));
    }

    #[test]
    fn unterminated_quote_rejected() {
        assert_eq!(lex_file_value(r#""abc"#), Err(LexError::UnterminatedQuote));
    }

    #[test]
    fn text_after_closing_quote_rejected() {
        assert!(matches!(
            lex_file_value(r#""abc" def"#),
            Err(LexError::TrailingAfterQuote { .. })
        ));
    }

    #[test]
    fn bare_scalar_with_comma_rejected() {
        assert!(matches!(
            lex_file_value("a,b"),
            Err(LexError::ReservedChars { .. })
        ));
    }

    #[test]
    fn bare_scalar_with_bracket_rejected() {
        assert!(matches!(
            lex_file_value("a]b"),
            Err(LexError::ReservedChars { .. })
        ));
    }

    // --- arrays ---

    #[test]
    fn simple_array() {
        assert_eq!(lex_file_value("[1, 2, 3]").unwrap(), array(&["1", "2", "3"]));
    }

    #[test]
    fn array_whitespace_insignificant() {
        assert_eq!(
            lex_file_value("[  a ,b,   c ]").unwrap(),
            array(&["a", "b", "c"])
        );
    }

    #[test]
    fn array_with_quoted_elements() {
        assert_eq!(
            lex_file_value(r#"[alice, "bob smith", carol]"#).unwrap(),
            array(&["alice", "bob smith", "carol"])
        );
    }

    #[test]
    fn quoted_element_may_contain_comma_and_bracket() {
        assert_eq!(
            lex_file_value(r#"["a,b", "c]d"]"#).unwrap(),
            array(&["a,b", "c]d"])
        );
    }

    #[test]
    fn empty_array() {
        assert_eq!(lex_file_value("[]").unwrap(), array(&[]));
        assert_eq!(lex_file_value("[   ]").unwrap(), array(&[]));
    }

    #[test]
    fn missing_close_bracket_rejected() {
        assert_eq!(lex_file_value("[1,2"), Err(LexError::UnterminatedArray));
    }

    #[test]
    fn text_after_close_bracket_rejected() {
        assert!(matches!(
            lex_file_value("[1,2] 3"),
            Err(LexError::TrailingAfterArray { .. })
        ));
    }

    #[test]
    fn trailing_comma_is_empty_element() {
        assert_eq!(lex_file_value("[a,]"), Err(LexError::EmptyElement));
    }

    #[test]
    fn bare_element_with_space_rejected() {
        assert!(matches!(
            lex_file_value("[bob smith]"),
            Err(LexError::ReservedChars { .. })
        ));
    }

    // --- argument mode ---

    #[test]
    fn arg_scalar_verbatim() {
        assert_eq!(lex_arg_value("hello world").unwrap(), scalar("hello world"));
    }

    #[test]
    fn arg_empty_is_empty_string() {
        assert_eq!(lex_arg_value("").unwrap(), scalar(""));
    }

    #[test]
    fn arg_fully_quoted_unwrapped() {
        assert_eq!(lex_arg_value(r#""a b""#).unwrap(), scalar("a b"));
    }

    #[test]
    fn arg_partial_quote_kept_verbatim() {
        assert_eq!(lex_arg_value(r#""ab"#).unwrap(), scalar(r#""ab"#));
    }

    #[test]
    fn arg_array_goes_through_array_grammar() {
        assert_eq!(lex_arg_value("[x,y]").unwrap(), array(&["x", "y"]));
    }

    #[test]
    fn arg_unterminated_array_rejected() {
        assert_eq!(lex_arg_value("[x,y"), Err(LexError::UnterminatedArray));
    }
}

// src/parse/scanner.rs
//! Lexical groundwork for fact extraction.
//!
//! The extractor never builds a real AST. Instead, comments are masked out
//! up front so statement recognition and brace counting operate on code
//! where `//`, `/* */`, and string-literal contents can no longer produce
//! phantom braces or fake import statements. String literals are preserved
//! (import specifiers live inside them); brace counting re-checks string
//! state on its own.

/// Replaces comment contents with spaces, preserving newlines and string
/// literals. Unterminated constructs mask to end of input.
#[must_use]
pub fn strip_comments(text: &str) -> String {
    #[derive(PartialEq)]
    enum State {
        Code,
        LineComment,
        BlockComment,
        Single,
        Double,
        Template,
    }

    let mut out = String::with_capacity(text.len());
    let mut state = State::Code;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            State::Code => match c {
                '/' if chars.peek() == Some(&'/') => {
                    state = State::LineComment;
                    chars.next();
                    out.push_str("  ");
                }
                '/' if chars.peek() == Some(&'*') => {
                    state = State::BlockComment;
                    chars.next();
                    out.push_str("  ");
                }
                '\'' => {
                    state = State::Single;
                    out.push(c);
                }
                '"' => {
                    state = State::Double;
                    out.push(c);
                }
                '`' => {
                    state = State::Template;
                    out.push(c);
                }
                _ => out.push(c),
            },
            State::LineComment => {
                if c == '\n' {
                    state = State::Code;
                    out.push('\n');
                } else {
                    out.push(' ');
                }
            }
            State::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    state = State::Code;
                    out.push_str("  ");
                } else if c == '\n' {
                    out.push('\n');
                } else {
                    out.push(' ');
                }
            }
            State::Single | State::Double | State::Template => {
                out.push(c);
                if c == '\\' {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                } else if (c == '\'' && state == State::Single)
                    || (c == '"' && state == State::Double)
                    || (c == '`' && state == State::Template)
                {
                    state = State::Code;
                } else if c == '\n' && state != State::Template {
                    // Plain strings do not span lines; bail out rather than
                    // swallowing the rest of the file on malformed input.
                    state = State::Code;
                }
            }
        }
    }

    out
}

/// Net `{`/`}` delta for one line, ignoring braces inside string literals.
#[must_use]
pub fn brace_delta(line: &str) -> i32 {
    let mut delta = 0i32;
    let mut in_single = false;
    let mut in_double = false;
    let mut in_template = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\' {
            chars.next();
            continue;
        }
        match c {
            '\'' if !in_double && !in_template => in_single = !in_single,
            '"' if !in_single && !in_template => in_double = !in_double,
            '`' if !in_single && !in_double => in_template = !in_template,
            '{' if !in_single && !in_double && !in_template => delta += 1,
            '}' if !in_single && !in_double && !in_template => delta -= 1,
            _ => {}
        }
    }

    delta
}

/// Splits on top-level commas, respecting `{}`/`[]`/`()` nesting and string
/// literals. Used for parameter lists and named import/export lists.
#[must_use]
pub fn split_top_level_commas(input: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut braces = 0i32;
    let mut brackets = 0i32;
    let mut parens = 0i32;
    let mut in_single = false;
    let mut in_double = false;
    let mut in_template = false;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\' {
            current.push(c);
            if let Some(escaped) = chars.next() {
                current.push(escaped);
            }
            continue;
        }

        match c {
            '\'' if !in_double && !in_template => in_single = !in_single,
            '"' if !in_single && !in_template => in_double = !in_double,
            '`' if !in_single && !in_double => in_template = !in_template,
            _ => {}
        }

        if in_single || in_double || in_template {
            current.push(c);
            continue;
        }

        match c {
            '{' => braces += 1,
            '}' => braces -= 1,
            '[' => brackets += 1,
            ']' => brackets -= 1,
            '(' => parens += 1,
            ')' => parens -= 1,
            ',' if braces == 0 && brackets == 0 && parens == 0 => {
                if !current.trim().is_empty() {
                    parts.push(current.trim().to_string());
                }
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(c);
    }

    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }
    parts
}

/// 1-based line number of a byte offset.
#[must_use]
pub fn line_of_offset(text: &str, offset: usize) -> usize {
    text[..offset.min(text.len())]
        .bytes()
        .filter(|b| *b == b'\n')
        .count()
        + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_line_comments_keeps_strings() {
        let out = strip_comments("const a = 'x // not a comment'; // real\nconst b = 1;");
        assert!(out.contains("'x // not a comment'"));
        assert!(!out.contains("real"));
        assert_eq!(out.lines().count(), 2);
    }

    #[test]
    fn strips_block_comments_preserving_lines() {
        let out = strip_comments("a /* one\ntwo */ b");
        assert_eq!(out.lines().count(), 2);
        assert!(out.contains('a'));
        assert!(out.contains('b'));
        assert!(!out.contains("two"));
    }

    #[test]
    fn brace_delta_ignores_string_braces() {
        assert_eq!(brace_delta("if (x) {"), 1);
        assert_eq!(brace_delta("const s = '{{{';"), 0);
        assert_eq!(brace_delta("const t = `}`; }"), -1);
    }

    #[test]
    fn splits_respecting_nesting() {
        let parts = split_top_level_commas("a: string, { b, c }: Opts, d = [1, 2]");
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[1], "{ b, c }: Opts");
    }

    #[test]
    fn splits_respecting_strings() {
        let parts = split_top_level_commas("a = 'x,y', b");
        assert_eq!(parts.len(), 2);
    }
}

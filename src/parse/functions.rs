// src/parse/functions.rs
//! Function-fact extraction for complexity rules.
//!
//! Identifies function-like declarations (standalone functions, assigned
//! arrows, object-literal method shorthand, class methods) while rejecting
//! call expressions that superficially look like declarations. Operates on
//! comment-stripped lines.

use std::sync::LazyLock;

use regex::Regex;

use crate::parse::scanner::{brace_delta, split_top_level_commas};

#[derive(Debug, Clone)]
pub struct FunctionFact {
    pub name: String,
    /// 1-based, inclusive.
    pub line_start: usize,
    pub line_end: usize,
    pub line_count: usize,
    pub arg_count: usize,
}

/// A destructured object parameter with its bound-key count.
#[derive(Debug, Clone)]
pub struct ObjectParamFact {
    pub line: usize,
    pub key_count: usize,
    pub preview: String,
}

/// Control-flow keywords that can never be function names.
const EXCLUDED_KEYWORDS: &[&str] = &[
    "if", "else", "for", "while", "switch", "case", "default", "try", "catch", "finally", "with",
    "return", "throw", "break", "continue", "do", "typeof", "instanceof", "in", "new", "delete",
    "void", "yield", "await",
];

const PAT_FUNCTION: usize = 0;
const PAT_ARROW: usize = 1;
const PAT_OBJECT_METHOD: usize = 2;
const PAT_CLASS_METHOD: usize = 3;

static FN_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // function declarations: export function name( / function name(
        Regex::new(r"^\s*(?:export\s+)?(?:async\s+)?function\s+(\w+)\s*\(").expect("valid regex"),
        // assigned arrows: const name = ( / export const name = async (
        Regex::new(r"^\s*(?:export\s+)?const\s+(\w+)\s*=\s*(?:async\s*)?\(").expect("valid regex"),
        // object method shorthand: name: ( / name: async (
        Regex::new(r"^\s*(\w+)\s*:\s*(?:async\s*)?\(").expect("valid regex"),
        // class methods: public/private/static name(
        Regex::new(r"^\s*(?:public\s+|private\s+|protected\s+)?(?:static\s+)?(?:async\s+)?(\w+)\s*\(")
            .expect("valid regex"),
    ]
});

static INTERFACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:export\s+)?interface\s+\w+").expect("valid regex"));

static CLASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:export\s+)?class\s+\w+").expect("valid regex"));

// Call shapes that are never declarations: trailing call, member chains,
// this-calls, hook calls, console/timer idioms, call-then-chain.
static CALL_SHAPE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"\w+\([^)]*\);?\s*$").expect("valid regex"),
        Regex::new(r"\w+\.\w+\(").expect("valid regex"),
        Regex::new(r"^\s*this\.\w+\(").expect("valid regex"),
        Regex::new(r"^\s*use\w+\(").expect("valid regex"),
        Regex::new(r"^\s*(?:console|setTimeout|setInterval|addEventListener|dispatch|eventBus)\(")
            .expect("valid regex"),
        Regex::new(r"\w+\([^)]*\)\s*\.").expect("valid regex"),
    ]
});

static TYPE_OBJECT_ANNOTATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":\s*\{[^}]*\}").expect("valid regex"));
static TYPE_ANNOTATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":\s*[^=,{}]+").expect("valid regex"));
static DEFAULT_VALUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)=.*$").expect("valid regex"));

static DESTRUCTURE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\s*([^{}]+)\s*\}").expect("valid regex"));

/// Extracts function facts from comment-stripped content.
#[must_use]
pub fn extract(stripped: &str) -> Vec<FunctionFact> {
    let lines: Vec<&str> = stripped.lines().collect();
    let mut facts = Vec::new();

    let mut in_interface = false;
    let mut interface_depth = 0i32;

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        let trimmed = line.trim();
        if trimmed.is_empty() {
            i += 1;
            continue;
        }

        // Interface bodies hold type members, not functions.
        if INTERFACE_RE.is_match(line) {
            in_interface = true;
            interface_depth = 0;
        }
        if in_interface {
            interface_depth += raw_brace_delta(line);
            if interface_depth <= 0 {
                in_interface = false;
            }
            i += 1;
            continue;
        }

        if let Some((pattern_idx, name, name_end)) = match_declaration(line) {
            if is_valid_declaration(line, pattern_idx, &lines, i) {
                let params = extract_parameters(&lines, i, name_end);
                let arg_count = count_arguments(&params);
                let (line_start, line_end) = find_boundaries(&lines, i, pattern_idx);
                facts.push(FunctionFact {
                    name,
                    line_start,
                    line_end,
                    line_count: line_end - line_start + 1,
                    arg_count,
                });
            }
        }

        i += 1;
    }

    facts
}

/// Scans for destructured object parameters with their key counts. This is
/// a lighter single-line pass, independent of function-boundary logic.
#[must_use]
pub fn object_params(stripped: &str, max_keys: usize) -> Vec<ObjectParamFact> {
    let mut facts = Vec::new();

    for (idx, line) in stripped.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        for caps in DESTRUCTURE_RE.captures_iter(trimmed) {
            let keys: Vec<&str> = caps[1]
                .split(',')
                .map(|k| k.split(':').next().unwrap_or("").trim())
                .filter(|k| !k.is_empty() && !k.starts_with("..."))
                .collect();

            if keys.len() > max_keys {
                let mut preview: String = keys
                    .iter()
                    .take(3)
                    .copied()
                    .collect::<Vec<_>>()
                    .join(", ");
                if keys.len() > 3 {
                    preview.push_str(&format!(", ... (+{} more)", keys.len() - 3));
                }
                facts.push(ObjectParamFact {
                    line: idx + 1,
                    key_count: keys.len(),
                    preview,
                });
            }
        }
    }

    facts
}

fn match_declaration(line: &str) -> Option<(usize, String, usize)> {
    for (idx, pattern) in FN_PATTERNS.iter().enumerate() {
        if let Some(caps) = pattern.captures(line) {
            let name = caps.get(1).expect("pattern has a name group");
            if !EXCLUDED_KEYWORDS.contains(&name.as_str().to_lowercase().as_str()) {
                return Some((idx, name.as_str().to_string(), name.end()));
            }
        }
    }
    None
}

fn is_valid_declaration(line: &str, pattern_idx: usize, lines: &[&str], line_idx: usize) -> bool {
    let trimmed = line.trim();
    match pattern_idx {
        PAT_FUNCTION => true,
        PAT_ARROW => line.contains('=') && (line.contains("=>") || line.contains("function")),
        PAT_OBJECT_METHOD => line.contains(':') && line.contains("=>"),
        PAT_CLASS_METHOD => {
            if is_obvious_call(trimmed) {
                return false;
            }
            if !in_class_context(lines, line_idx) {
                return false;
            }
            if line.contains('{') {
                return true;
            }
            if trimmed.ends_with(");") || trimmed.ends_with(')') {
                return false;
            }
            // Signature may continue; a brace on the next non-empty line
            // confirms a declaration.
            let next = lines[line_idx + 1..]
                .iter()
                .map(|l| l.trim())
                .find(|l| !l.is_empty());
            if next.is_some_and(|l| l.starts_with('{')) {
                return true;
            }
            ["public", "private", "protected", "static"]
                .iter()
                .any(|kw| line.contains(kw))
        }
        _ => false,
    }
}

fn is_obvious_call(trimmed: &str) -> bool {
    if CALL_SHAPE_RES.iter().any(|re| re.is_match(trimmed)) {
        return true;
    }
    let parens = trimmed.matches('(').count();
    let braces = trimmed.matches('{').count();
    parens > 1
        || braces > 1
        || (parens >= 1 && braces >= 1 && trimmed.ends_with(");"))
}

/// Backtracks to confirm the nearest enclosing declaration is a class body
/// opened and not yet closed, by brace-depth count.
fn in_class_context(lines: &[&str], current: usize) -> bool {
    let mut depth = 0i32;
    for i in (0..=current).rev() {
        let line = lines[i].trim();
        if line.is_empty() {
            continue;
        }
        depth += line.matches('}').count() as i32;
        depth -= line.matches('{').count() as i32;
        if CLASS_RE.is_match(line) {
            return depth <= 0;
        }
        if depth > 0 {
            break;
        }
    }
    false
}

/// Collects the parameter list from the opening paren (at or after
/// `search_from` on the declaration line) to its balanced close, across
/// lines if needed.
fn extract_parameters(lines: &[&str], start_idx: usize, search_from: usize) -> String {
    let first = lines[start_idx];
    let from = search_from.min(first.len());
    let Some(paren_off) = first[from..].find('(') else {
        return String::new();
    };
    let paren_pos = from + paren_off;

    let mut depth = 0i32;
    let mut params = String::new();

    for (i, raw) in lines.iter().enumerate().skip(start_idx) {
        let segment: &str = if i == start_idx { &raw[paren_pos..] } else { raw };
        for c in segment.chars() {
            match c {
                '(' => {
                    if depth > 0 {
                        params.push(c);
                    }
                    depth += 1;
                }
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return params.trim().to_string();
                    }
                    params.push(c);
                }
                _ if depth > 0 => params.push(c),
                _ => {}
            }
        }
        if depth > 0 {
            params.push('\n');
        }
    }

    params.trim().to_string()
}

/// Counts parameters after stripping type annotations and default values.
#[must_use]
pub fn count_arguments(params: &str) -> usize {
    if params.trim().is_empty() {
        return 0;
    }

    split_top_level_commas(params)
        .iter()
        .filter(|arg| {
            let arg = arg.trim();
            if arg.is_empty() || arg == "..." {
                return false;
            }
            let arg = TYPE_OBJECT_ANNOTATION_RE.replace_all(arg, "");
            let arg = TYPE_ANNOTATION_RE.replace_all(&arg, "");
            let arg = DEFAULT_VALUE_RE.replace(&arg, "");
            !arg.trim().is_empty()
        })
        .count()
}

/// Brace-balanced scan from the declaration line to where nesting returns
/// to zero. Expression-bodied arrows end at their statement end instead.
fn find_boundaries(lines: &[&str], start_idx: usize, pattern_idx: usize) -> (usize, usize) {
    let line_start = start_idx + 1;

    if pattern_idx == PAT_ARROW {
        return arrow_boundaries(lines, start_idx, line_start);
    }

    let mut depth = 0i32;
    let mut found_opening = false;

    for (i, line) in lines.iter().enumerate().skip(start_idx) {
        if line.trim().is_empty() {
            continue;
        }
        let delta = brace_delta(line);
        depth += delta;
        if !found_opening && delta > 0 {
            found_opening = true;
        }
        if found_opening && depth == 0 {
            return (line_start, i + 1);
        }
    }

    (line_start, line_start)
}

fn arrow_boundaries(lines: &[&str], start_idx: usize, line_start: usize) -> (usize, usize) {
    let mut depth = 0i32;
    let mut found_arrow = false;
    let mut has_braces = false;

    for (i, line) in lines.iter().enumerate().skip(start_idx) {
        if line.contains("=>") {
            found_arrow = true;
            if line.contains('{') {
                has_braces = true;
            }
        }

        if !found_arrow {
            continue;
        }

        if has_braces {
            depth += raw_brace_delta(line);
            if depth == 0 && i > start_idx {
                return (line_start, i + 1);
            }
        } else {
            let end = line.trim_end();
            let next_starts_statement = lines.get(i + 1).is_some_and(|next| {
                let next = next.trim();
                !next.is_empty() && !next.starts_with('.') && !next.starts_with(')')
            });
            if end.ends_with(';')
                || end.ends_with(',')
                || i == lines.len() - 1
                || next_starts_statement
            {
                return (line_start, i + 1);
            }
        }
    }

    (line_start, line_start)
}

fn raw_brace_delta(line: &str) -> i32 {
    line.matches('{').count() as i32 - line.matches('}').count() as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::scanner::strip_comments;

    fn facts(src: &str) -> Vec<FunctionFact> {
        extract(&strip_comments(src))
    }

    #[test]
    fn function_declaration_with_span() {
        let src = "export function greet(name: string) {\n  return name;\n}\n";
        let f = facts(src);
        assert_eq!(f.len(), 1);
        assert_eq!(f[0].name, "greet");
        assert_eq!(f[0].line_start, 1);
        assert_eq!(f[0].line_end, 3);
        assert_eq!(f[0].arg_count, 1);
    }

    #[test]
    fn arrow_assignment() {
        let src = "const add = (a: number, b: number) => {\n  return a + b;\n};\n";
        let f = facts(src);
        assert_eq!(f.len(), 1);
        assert_eq!(f[0].name, "add");
        assert_eq!(f[0].arg_count, 2);
        assert_eq!(f[0].line_count, 3);
    }

    #[test]
    fn expression_arrow_single_line() {
        let f = facts("const id = (x: T) => x;\n");
        assert_eq!(f.len(), 1);
        assert_eq!(f[0].line_count, 1);
    }

    #[test]
    fn call_expression_is_not_a_declaration() {
        let src = "describe('suite', () => {\n  doThing(1, 2);\n});\nconsole.log(x);\n";
        assert!(facts(src).is_empty());
    }

    #[test]
    fn class_method_requires_class_context() {
        let src = "class Store {\n  save(item: Item) {\n    this.items.push(item);\n  }\n}\n";
        let f = facts(src);
        assert_eq!(f.len(), 1);
        assert_eq!(f[0].name, "save");
    }

    #[test]
    fn method_shaped_line_outside_class_rejected() {
        // Call shape with block argument: looks like a method but is not.
        let src = "waitFor(() => {\n  expect(x).toBe(1);\n});\n";
        assert!(facts(src).is_empty());
    }

    #[test]
    fn interface_members_are_not_functions() {
        let src = "interface Api {\n  fetch(url: string): Promise<Response>;\n  post(url: string): void;\n}\n";
        assert!(facts(src).is_empty());
    }

    #[test]
    fn counts_args_with_nested_annotations() {
        let n = count_arguments("a: { x: number, y: number }, b: string = 'x,y', c?: number");
        assert_eq!(n, 3);
    }

    #[test]
    fn braces_in_strings_do_not_break_span() {
        let src = "function render() {\n  const tpl = '{open';\n  return tpl;\n}\n";
        let f = facts(src);
        assert_eq!(f.len(), 1);
        assert_eq!(f[0].line_end, 4);
    }

    #[test]
    fn object_param_key_count() {
        let src = "function configure({ host, port, user, pass, tls, retries, timeout }: Opts) {}\n";
        let v = object_params(&strip_comments(src), 6);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].key_count, 7);
        assert!(v[0].preview.contains("host"));
    }

    #[test]
    fn object_param_under_limit_is_clean() {
        let src = "const f = ({ a, b, c }: Opts) => a;\n";
        assert!(object_params(&strip_comments(src), 6).is_empty());
    }
}

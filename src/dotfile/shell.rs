// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Pieces shared by the shell run command formats.
//!
//! Bash and Zsh agree on how environment variables and aliases look, so both
//! models use the same records and the same assignment grammar.
//!
//! # Compound Commands
//!
//! Line rules only ever see one line at a time. Pulling a line like
//! `eval "$(starship init zsh)"` out of the `if` block guarding it would
//! leave an empty block behind, which the shell refuses to run. Thus, every
//! line from the opening of a compound command (`if`, `for`, `while`,
//! `until`, `case`, `select`, or a `{` group) through its matching close is
//! kept as a raw line, comments and indentation included.

use crate::dotfile::{claim_line, Claim, Line, Rule};

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{str::FromStr, sync::LazyLock};

/// `export NAME=value`
pub(crate) static EXPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^export\s+([A-Za-z_][A-Za-z0-9_]*)=(.*)$").expect("export pattern")
});

/// `NAME=value`
pub(crate) static ASSIGNMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)=(.*)$").expect("assignment pattern"));

/// Environment variable assignment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EnvironmentVar {
    /// Variable name.
    pub key: String,

    /// Unquoted value.
    pub value: String,

    /// Whether the variable is exported to child processes.
    pub export: bool,
}

impl EnvironmentVar {
    /// Construct new environment variable.
    pub fn new(key: impl Into<String>, value: impl Into<String>, export: bool) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            export,
        }
    }

    /// Render as shell assignment.
    pub(crate) fn to_line(&self) -> String {
        if self.export {
            format!("export {}=\"{}\"", self.key, self.value)
        } else {
            format!("{}=\"{}\"", self.key, self.value)
        }
    }
}

/// Shell alias definition.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ShellAlias {
    /// Name of the alias.
    pub name: String,

    /// Command the alias expands to.
    pub command: String,

    /// Optional human readable note, never written to file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ShellAlias {
    /// Construct new alias without description.
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            description: None,
        }
    }

    /// Render as `alias name='command'`.
    pub(crate) fn to_line(&self) -> String {
        format!("alias {}='{}'", self.name, self.command)
    }
}

/// Strip exactly one layer of matching outer quotes.
///
/// Nothing inside the quotes is unescaped.
pub(crate) fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &value[1..value.len() - 1];
        }
    }

    value
}

/// Parse a number, falling back to default when the text is not one.
pub(crate) fn number_or<T: FromStr>(value: &str, default: T) -> T {
    value.trim().parse().unwrap_or(default)
}

/// Split the words following a command keyword, e.g., `setopt A B`.
pub(crate) fn words_after<'a>(text: &'a str, keyword: &str) -> Option<Vec<String>> {
    let rest = text.strip_prefix(keyword)?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }

    Some(rest.split_whitespace().map(str::to_string).collect())
}

const BLOCK_OPENERS: [&str; 6] = ["if", "for", "while", "until", "case", "select"];
const BLOCK_CLOSERS: [&str; 4] = ["fi", "done", "esac", "}"];
const BLOCK_CONTINUATIONS: [&str; 5] = ["then", "do", "else", "elif", "!"];

/// Net change in compound command nesting caused by a line.
///
/// Looks at the command word of every `;` separated segment, so one-line
/// blocks like `if x; then y; fi` do not change nesting at all.
pub(crate) fn nesting_change(text: &str) -> isize {
    if text.starts_with('#') {
        return 0;
    }

    let mut change = 0;
    for segment in text.split(';') {
        let mut words = segment.split_whitespace().peekable();
        while words.next_if(|word| BLOCK_CONTINUATIONS.contains(word)).is_some() {}

        if let Some(command) = words.peek() {
            if BLOCK_OPENERS.contains(command) {
                change += 1;
            } else if BLOCK_CLOSERS.contains(command) {
                change -= 1;
            }
        }

        change += words.filter(|word| *word == "{").count() as isize;
    }

    change
}

/// Offer shell lines to an ordered rule list.
///
/// Works like [`apply_rules`](crate::dotfile::apply_rules), except that
/// compound commands are kept whole as raw lines.
pub(crate) fn apply_shell_rules<'a, M>(
    lines: impl IntoIterator<Item = &'a str>,
    rules: &[Rule<M>],
    model: &mut M,
) -> Vec<String> {
    let mut raw_lines = Vec::new();
    let mut depth = 0usize;
    for raw in lines {
        let text = raw.trim();
        let change = nesting_change(text);
        if depth > 0 || change > 0 {
            if !text.is_empty() {
                raw_lines.push(raw.to_string());
            }
            depth = depth.saturating_add_signed(change);
            continue;
        }

        if text.is_empty() || text.starts_with('#') {
            continue;
        }

        if claim_line(Line { raw, text }, rules, model) == Claim::Raw {
            raw_lines.push(raw.to_string());
        }
    }

    raw_lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use simple_test_case::test_case;

    #[test_case(r#""hello world""#, "hello world"; "double quotes")]
    #[test_case("'hello world'", "hello world"; "single quotes")]
    #[test_case(r#""a\"b""#, r#"a\"b"#; "one layer only")]
    #[test_case(r#""'nested'""#, "'nested'"; "nested quotes kept")]
    #[test_case(r#""mismatched'"#, r#""mismatched'"#; "mismatched quotes")]
    #[test_case(r#"""#, r#"""#; "lone quote")]
    #[test_case("bare", "bare"; "unquoted")]
    #[test]
    fn unquote_strips_one_layer(input: &str, expect: &str) {
        pretty_assertions::assert_eq!(unquote(input), expect);
    }

    #[test]
    fn number_or_falls_back() {
        assert_eq!(number_or("42", 7u32), 42);
        assert_eq!(number_or("forty-two", 7u32), 7);
        assert_eq!(number_or("", 7u32), 7);
        assert_eq!(number_or("0.5", 1.0f64), 0.5);
    }

    #[test]
    fn words_after_requires_separator() {
        assert_eq!(
            words_after("setopt AUTO_CD  CORRECT", "setopt"),
            Some(vec!["AUTO_CD".to_string(), "CORRECT".to_string()])
        );
        assert_eq!(words_after("setoptions", "setopt"), None);
    }

    #[test_case("if [ -f ~/.bashrc ]; then", 1; "if opens")]
    #[test_case("for rc in ~/.bashrc.d/*; do", 1; "for opens")]
    #[test_case("case $- in", 1; "case opens")]
    #[test_case("greet() {", 1; "function opens")]
    #[test_case("fi", -1; "fi closes")]
    #[test_case("done < list.txt", -1; "done closes")]
    #[test_case("}", -1; "brace closes")]
    #[test_case("if x; then y; fi", 0; "one line if")]
    #[test_case("greet() { echo hi; }", 0; "one line function")]
    #[test_case("if a; then if b; then c; fi; fi", 0; "nested one line if")]
    #[test_case("else", 0; "else alone")]
    #[test_case("echo \"do it if you want\"", 0; "keywords as arguments")]
    #[test_case("# if this then that", 0; "comment")]
    #[test]
    fn nesting_change_of_line(text: &str, expect: isize) {
        pretty_assertions::assert_eq!(nesting_change(text), expect);
    }

    #[derive(Debug, Default)]
    struct Evals(Vec<String>);

    fn eval(line: Line<'_>, model: &mut Evals) -> Claim {
        if line.text.starts_with("eval ") {
            model.0.push(line.text.to_string());
            return Claim::Parsed;
        }

        Claim::Pass
    }

    #[test]
    fn compound_commands_stay_whole() {
        let rules: &[Rule<Evals>] = &[("eval", eval)];
        let mut model = Evals::default();
        let content = indoc! {r#"
            eval "$(direnv hook zsh)"
            if command -v starship &> /dev/null; then
                # prompt
                eval "$(starship init zsh)"

            fi
            stray
            eval "$(zoxide init zsh)"
        "#};

        let raw = apply_shell_rules(content.lines(), rules, &mut model);

        assert_eq!(
            model.0,
            vec![r#"eval "$(direnv hook zsh)""#, r#"eval "$(zoxide init zsh)""#]
        );
        assert_eq!(
            raw,
            vec![
                "if command -v starship &> /dev/null; then",
                "    # prompt",
                r#"    eval "$(starship init zsh)""#,
                "fi",
                "stray",
            ]
        );
    }

    #[test]
    fn environment_var_lines() {
        assert_eq!(
            EnvironmentVar::new("EDITOR", "nvim", true).to_line(),
            r#"export EDITOR="nvim""#
        );
        assert_eq!(
            EnvironmentVar::new("PAGER", "less", false).to_line(),
            r#"PAGER="less""#
        );
    }
}

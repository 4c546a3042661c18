// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Bash run commands.
//!
//! Models the parts of a `.bashrc` that users most commonly tweak: history
//! settings, shell options, environment variables, `PATH` additions,
//! aliases, sourced files, and startup commands like `eval "$(starship init
//! bash)"`.
//!
//! # Interactive Guard
//!
//! Most distributions start `.bashrc` with a `case` statement that returns
//! early for non-interactive shells. The canonical four line form of that
//! guard is recognized as a unit and tracked as a flag, since stringification
//! writes it back out at the top of the file. Any other `case` statement is
//! kept as raw lines.

use crate::dotfile::{
    shell::{
        apply_shell_rules, number_or, unquote, EnvironmentVar, ShellAlias, ASSIGNMENT, EXPORT,
    },
    Claim, ConfigKind, DotfileFormat, Emitter, Line, Rule,
};

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::{debug, instrument};

/// Default `HISTSIZE`.
pub const DEFAULT_HIST_SIZE: i64 = 1000;

/// Default `HISTFILESIZE`.
pub const DEFAULT_HIST_FILE_SIZE: i64 = 2000;

const INTERACTIVE_GUARD: [&str; 4] = ["case $- in", "*i*) ;;", "*) return;;", "esac"];

static ALIAS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^alias\s+([^=]+)=['"](.+?)['"]$"#).expect("alias pattern")
});

static CONDITIONAL_SOURCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[\s+-[fr]\s+(\S+)\s+\]\s+&&\s+(?:\.|source)\s+(\S+)$")
        .expect("conditional source pattern")
});

/// Structured `.bashrc`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BashConfig {
    /// Environment variables other than `PATH` additions.
    pub environment: Vec<EnvironmentVar>,

    /// Alias definitions.
    pub aliases: Vec<ShellAlias>,

    /// Files sourced at startup.
    pub sources: Vec<String>,

    /// Directories prepended to `PATH`.
    pub path_additions: Vec<String>,

    /// History settings.
    pub history_settings: BashHistory,

    /// Options enabled through `shopt -s`.
    pub shop_options: Vec<String>,

    /// Commands run at startup, e.g., `eval` lines.
    pub startup_commands: Vec<String>,

    /// Whether the non-interactive early return guard is present.
    pub interactive_guard: bool,

    /// Lines that were not recognized.
    pub raw_lines: Vec<String>,
}

/// Bash history settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BashHistory {
    /// `HISTCONTROL`.
    pub hist_control: String,

    /// `HISTSIZE`.
    pub hist_size: i64,

    /// `HISTFILESIZE`.
    pub hist_file_size: i64,

    /// `HISTIGNORE`, omitted from output when empty.
    pub hist_ignore: String,
}

impl Default for BashHistory {
    fn default() -> Self {
        Self {
            hist_control: "ignoreboth".into(),
            hist_size: DEFAULT_HIST_SIZE,
            hist_file_size: DEFAULT_HIST_FILE_SIZE,
            hist_ignore: String::new(),
        }
    }
}

impl DotfileFormat for BashConfig {
    const KIND: ConfigKind = ConfigKind::Bash;

    fn parse(content: &str) -> Self {
        parse(content)
    }

    fn stringify(&self) -> String {
        stringify(self)
    }

    fn default_model() -> Self {
        default_model()
    }
}

/// Default Bash configuration.
pub fn default_model() -> BashConfig {
    BashConfig {
        environment: Vec::new(),
        aliases: vec![
            ShellAlias::new("ls", "ls --color=auto"),
            ShellAlias::new("ll", "ls -la"),
            ShellAlias::new("la", "ls -A"),
            ShellAlias::new("grep", "grep --color=auto"),
            ShellAlias::new("fgrep", "fgrep --color=auto"),
            ShellAlias::new("egrep", "egrep --color=auto"),
        ],
        sources: Vec::new(),
        path_additions: Vec::new(),
        history_settings: BashHistory::default(),
        shop_options: vec!["histappend".into(), "checkwinsize".into()],
        startup_commands: Vec::new(),
        interactive_guard: true,
        raw_lines: Vec::new(),
    }
}

const RULES: &[Rule<BashConfig>] = &[
    ("export", export),
    ("assignment", assignment),
    ("shopt", shopt),
    ("alias", alias),
    ("source", source),
    ("conditional source", conditional_source),
    ("eval", eval),
    ("lesspipe", lesspipe),
];

/// Parse `.bashrc` content.
#[instrument(skip(content), level = "debug")]
pub fn parse(content: &str) -> BashConfig {
    let mut config = BashConfig {
        aliases: Vec::new(),
        shop_options: Vec::new(),
        interactive_guard: false,
        ..default_model()
    };

    let (lines, guarded) = strip_interactive_guard(content);
    config.interactive_guard = guarded;
    config.raw_lines = apply_shell_rules(lines, RULES, &mut config);
    debug!(
        "parsed bash config with {} raw lines",
        config.raw_lines.len()
    );

    config
}

/// Render `.bashrc` content.
#[instrument(skip(config), level = "debug")]
pub fn stringify(config: &BashConfig) -> String {
    let mut out = Emitter::with_header("Bash Configuration");

    if config.interactive_guard {
        out.line("# If not running interactively, don't do anything");
        out.line("case $- in");
        out.line("    *i*) ;;");
        out.line("      *) return;;");
        out.line("esac");
        out.blank();
    }

    let history = &config.history_settings;
    let mut history_lines = vec![
        format!("HISTCONTROL={}", shell_word(&history.hist_control)),
        format!("HISTSIZE={}", history.hist_size),
        format!("HISTFILESIZE={}", history.hist_file_size),
    ];
    if !history.hist_ignore.is_empty() {
        history_lines.push(format!("HISTIGNORE=\"{}\"", history.hist_ignore));
    }
    out.section("History", history_lines);

    out.section(
        "Shell Options",
        config.shop_options.iter().map(|opt| format!("shopt -s {opt}")),
    );
    out.section(
        "Environment Variables",
        config.environment.iter().map(EnvironmentVar::to_line),
    );
    if !config.path_additions.is_empty() {
        out.section(
            "PATH Additions",
            [format!(
                "export PATH=\"{}:$PATH\"",
                config.path_additions.join(":")
            )],
        );
    }
    out.section("Aliases", config.aliases.iter().map(ShellAlias::to_line));
    out.section("Sourced Files", config.sources.iter().map(|src| source_line(src)));
    out.section("Startup Commands", config.startup_commands.iter().cloned());
    out.raw_lines(&config.raw_lines);

    out.finish()
}

fn source_line(src: &str) -> String {
    if src.contains('$') {
        format!("[ -f \"{src}\" ] && . \"{src}\"")
    } else if src.contains(char::is_whitespace) {
        format!("source \"{src}\"")
    } else {
        format!("source {src}")
    }
}

fn shell_word(value: &str) -> String {
    if value.contains(char::is_whitespace) {
        format!("\"{value}\"")
    } else {
        value.to_string()
    }
}

/// Remove the canonical non-interactive guard from the line sequence.
///
/// Blank lines and comments may sit between the four guard lines.
fn strip_interactive_guard(content: &str) -> (Vec<&str>, bool) {
    let lines: Vec<&str> = content.lines().collect();
    for (start, line) in lines.iter().enumerate() {
        if line.trim() != INTERACTIVE_GUARD[0] {
            continue;
        }

        let mut found = vec![start];
        for (index, line) in lines.iter().enumerate().skip(start + 1) {
            let text = line.trim();
            if text.is_empty() || text.starts_with('#') {
                continue;
            }

            if text != INTERACTIVE_GUARD[found.len()] {
                break;
            }

            found.push(index);
            if found.len() == INTERACTIVE_GUARD.len() {
                break;
            }
        }

        if found.len() == INTERACTIVE_GUARD.len() {
            let kept = lines
                .iter()
                .enumerate()
                .filter(|(index, _)| !found.contains(index))
                .map(|(_, line)| *line)
                .collect();
            return (kept, true);
        }
    }

    (lines, false)
}

fn export(line: Line<'_>, config: &mut BashConfig) -> Claim {
    let Some(captures) = EXPORT.captures(line.text) else {
        return Claim::Pass;
    };

    let key = &captures[1];
    let value = unquote(&captures[2]);
    if key == "PATH" && value.contains("$PATH") {
        config.path_additions.extend(
            value
                .split(':')
                .filter(|segment| *segment != "$PATH" && !segment.trim().is_empty())
                .map(str::to_string),
        );
    } else {
        config
            .environment
            .push(EnvironmentVar::new(key, value, true));
    }

    Claim::Parsed
}

fn assignment(line: Line<'_>, config: &mut BashConfig) -> Claim {
    if line.text.starts_with("alias") {
        return Claim::Pass;
    }

    let Some(captures) = ASSIGNMENT.captures(line.text) else {
        return Claim::Pass;
    };

    // INVARIANT: Arrays are not environment variables.
    let text = &captures[2];
    if text.starts_with('(') {
        return Claim::Pass;
    }

    let key = &captures[1];
    let value = unquote(text);
    let history = &mut config.history_settings;
    match key {
        "HISTCONTROL" => history.hist_control = value.into(),
        "HISTSIZE" => history.hist_size = number_or(value, DEFAULT_HIST_SIZE),
        "HISTFILESIZE" => history.hist_file_size = number_or(value, DEFAULT_HIST_FILE_SIZE),
        "HISTIGNORE" => history.hist_ignore = value.into(),
        _ => {
            // INVARIANT: `NAME=value command` runs a command, it is not an
            // assignment worth managing.
            if value == text && text.contains(char::is_whitespace) {
                return Claim::Pass;
            }

            config
                .environment
                .push(EnvironmentVar::new(key, value, false));
        }
    }

    Claim::Parsed
}

fn shopt(line: Line<'_>, config: &mut BashConfig) -> Claim {
    let Some(options) = line.text.strip_prefix("shopt -s ") else {
        return Claim::Pass;
    };

    config
        .shop_options
        .extend(options.split_whitespace().map(str::to_string));

    Claim::Parsed
}

fn alias(line: Line<'_>, config: &mut BashConfig) -> Claim {
    if !line.text.starts_with("alias ") {
        return Claim::Pass;
    }

    let Some(captures) = ALIAS.captures(line.text) else {
        return Claim::Raw;
    };

    config
        .aliases
        .push(ShellAlias::new(captures[1].trim(), &captures[2]));

    Claim::Parsed
}

fn source(line: Line<'_>, config: &mut BashConfig) -> Claim {
    let Some(path) = line
        .text
        .strip_prefix("source ")
        .or_else(|| line.text.strip_prefix(". "))
    else {
        return Claim::Pass;
    };

    let path = strip_quotes(path);
    if path.is_empty() {
        return Claim::Raw;
    }

    config.sources.push(path);

    Claim::Parsed
}

fn conditional_source(line: Line<'_>, config: &mut BashConfig) -> Claim {
    let Some(captures) = CONDITIONAL_SOURCE.captures(line.text) else {
        return Claim::Pass;
    };

    let tested = strip_quotes(&captures[1]);
    let sourced = strip_quotes(&captures[2]);
    if tested != sourced || !sourced.contains('$') {
        return Claim::Pass;
    }

    config.sources.push(sourced);

    Claim::Parsed
}

fn eval(line: Line<'_>, config: &mut BashConfig) -> Claim {
    if !line.text.starts_with("eval ") {
        return Claim::Pass;
    }

    config.startup_commands.push(line.text.into());

    Claim::Parsed
}

fn lesspipe(line: Line<'_>, config: &mut BashConfig) -> Claim {
    if !line.text.contains("lesspipe") {
        return Claim::Pass;
    }

    config.startup_commands.push(line.text.into());

    Claim::Parsed
}

fn strip_quotes(path: &str) -> String {
    path.chars()
        .filter(|ch| !matches!(ch, '"' | '\'' | '`'))
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use simple_test_case::test_case;

    #[test]
    fn parse_recognized_directives() {
        let result = parse(indoc! {r#"
            # If not running interactively, don't do anything
            case $- in
                *i*) ;;
                  *) return;;
            esac

            HISTCONTROL=ignoredups
            HISTSIZE=5000
            HISTFILESIZE=not-a-number
            shopt -s histappend globstar
            export EDITOR="nvim"
            export PATH="$HOME/.local/bin:$HOME/.cargo/bin:$PATH"
            PAGER='less -R'
            alias ll='ls -la'
            source ~/.bash_aliases
            eval "$(starship init bash)"
            [ -x /usr/bin/lesspipe ] && eval "$(SHELL=/bin/sh lesspipe)"
        "#});

        let expect = BashConfig {
            environment: vec![
                EnvironmentVar::new("EDITOR", "nvim", true),
                EnvironmentVar::new("PAGER", "less -R", false),
            ],
            aliases: vec![ShellAlias::new("ll", "ls -la")],
            sources: vec!["~/.bash_aliases".into()],
            path_additions: vec!["$HOME/.local/bin".into(), "$HOME/.cargo/bin".into()],
            history_settings: BashHistory {
                hist_control: "ignoredups".into(),
                hist_size: 5000,
                hist_file_size: DEFAULT_HIST_FILE_SIZE,
                hist_ignore: String::new(),
            },
            shop_options: vec!["histappend".into(), "globstar".into()],
            startup_commands: vec![
                r#"eval "$(starship init bash)""#.into(),
                r#"[ -x /usr/bin/lesspipe ] && eval "$(SHELL=/bin/sh lesspipe)""#.into(),
            ],
            interactive_guard: true,
            raw_lines: Vec::new(),
        };

        assert_eq!(result, expect);
    }

    #[test]
    fn path_export_is_decomposed() {
        let result = parse(r#"export PATH="/a:/b:$PATH""#);
        assert_eq!(result.path_additions, vec!["/a", "/b"]);
        assert!(result.environment.is_empty());
    }

    #[test]
    fn path_export_without_self_reference_is_plain_variable() {
        let result = parse(r#"export PATH="/usr/bin:/bin""#);
        assert!(result.path_additions.is_empty());
        assert_eq!(
            result.environment,
            vec![EnvironmentVar::new("PATH", "/usr/bin:/bin", true)]
        );
    }

    #[test]
    fn quotes_are_stripped_once() {
        let result = parse(r#"KEY="a\"b""#);
        assert_eq!(result.environment[0].value, r#"a\"b"#);
    }

    #[test]
    fn unknown_lines_become_raw_in_order() {
        let content = indoc! {r#"
            if [ -f /etc/bashrc ]; then
                . /etc/bashrc
            fi
            complete -cf sudo
            case "$TERM" in
            xterm*) PS1="\u@\h " ;;
            esac
            alias broken=
            shopt -u dotglob
            greet() { echo hi; }
            FOO=bar make
        "#};
        let result = parse(content);

        assert_eq!(
            result.raw_lines,
            vec![
                "if [ -f /etc/bashrc ]; then",
                "    . /etc/bashrc",
                "fi",
                "complete -cf sudo",
                r#"case "$TERM" in"#,
                r#"xterm*) PS1="\u@\h " ;;"#,
                "esac",
                "alias broken=",
                "shopt -u dotglob",
                "greet() { echo hi; }",
                "FOO=bar make",
            ]
        );
        assert!(result.sources.is_empty());
        assert!(!result.interactive_guard);

        let output = stringify(&result);
        assert!(output.ends_with(indoc! {r#"
            # Additional Configuration
            if [ -f /etc/bashrc ]; then
                . /etc/bashrc
            fi
            complete -cf sudo
            case "$TERM" in
            xterm*) PS1="\u@\h " ;;
            esac
            alias broken=
            shopt -u dotglob
            greet() { echo hi; }
            FOO=bar make
        "#}));
    }

    #[test]
    fn stringify_canonical_layout() {
        let mut config = default_model();
        config.environment = vec![EnvironmentVar::new("EDITOR", "nvim", true)];
        config.path_additions = vec!["/opt/bin".into()];
        config.sources = vec!["$HOME/.bash_aliases".into(), "/etc/bash_completion".into()];
        config.startup_commands = vec![r#"eval "$(zoxide init bash)""#.into()];
        config.aliases.truncate(2);

        let result = stringify(&config);
        let expect = indoc! {r#"
            # Bash Configuration
            # Managed by Argus

            # If not running interactively, don't do anything
            case $- in
                *i*) ;;
                  *) return;;
            esac

            # History
            HISTCONTROL=ignoreboth
            HISTSIZE=1000
            HISTFILESIZE=2000

            # Shell Options
            shopt -s histappend
            shopt -s checkwinsize

            # Environment Variables
            export EDITOR="nvim"

            # PATH Additions
            export PATH="/opt/bin:$PATH"

            # Aliases
            alias ls='ls --color=auto'
            alias ll='ls -la'

            # Sourced Files
            [ -f "$HOME/.bash_aliases" ] && . "$HOME/.bash_aliases"
            source /etc/bash_completion

            # Startup Commands
            eval "$(zoxide init bash)"
        "#};

        assert_eq!(result, expect);
    }

    #[test]
    fn structured_content_round_trips() {
        let config = BashConfig {
            environment: vec![
                EnvironmentVar::new("EDITOR", "nvim", true),
                EnvironmentVar::new("LESS", "-R --mouse", false),
            ],
            aliases: vec![
                ShellAlias::new("gs", "git status"),
                ShellAlias::new("..", "cd .."),
            ],
            sources: vec!["$HOME/.bash_aliases".into(), "~/.fzf.bash".into()],
            path_additions: vec!["$HOME/bin".into(), "/opt/tools/bin".into()],
            history_settings: BashHistory {
                hist_control: "ignoredups erasedups".into(),
                hist_size: 0,
                hist_file_size: 100_000,
                hist_ignore: "ls:bg:fg".into(),
            },
            shop_options: vec!["autocd".into(), "globstar".into()],
            startup_commands: vec![r#"eval "$(direnv hook bash)""#.into()],
            interactive_guard: false,
            raw_lines: Vec::new(),
        };

        assert_eq!(parse(&stringify(&config)), config);
    }

    #[test_case("HISTSIZE=-1\nHISTFILESIZE=-1\n", (-1, -1); "unlimited")]
    #[test_case("HISTSIZE=0\nHISTFILESIZE=500\n", (0, 500); "disabled")]
    #[test_case("HISTSIZE=lots\n", (DEFAULT_HIST_SIZE, DEFAULT_HIST_FILE_SIZE); "not a number")]
    #[test]
    fn history_sizes_survive_save(content: &str, expect: (i64, i64)) {
        let result = parse(&stringify(&parse(content))).history_settings;
        pretty_assertions::assert_eq!((result.hist_size, result.hist_file_size), expect);
    }

    #[test]
    fn default_model_round_trips() {
        let config = default_model();
        assert_eq!(parse(&stringify(&config)), config);
    }

    #[test]
    fn stringify_is_idempotent_with_raw_lines() {
        let content = indoc! {r#"
            case $- in
                *i*) ;;
                  *) return;;
            esac
            HISTSIZE=100
            if command -v starship &> /dev/null; then
                eval "$(starship init bash)"
            fi
            complete -cf sudo
        "#};

        let once = stringify(&parse(content));
        let twice = stringify(&parse(&once));
        assert_eq!(once, twice);
    }
}

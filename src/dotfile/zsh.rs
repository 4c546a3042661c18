// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Zsh run commands.
//!
//! Besides the usual environment, alias, and history settings, `.zshrc`
//! files tend to carry plugin `source` lines, `bindkey` widgets, and tuning
//! for the popular autosuggestion and syntax highlighting plugins. All of
//! these have a structured home in [`ZshConfig`].
//!
//! History related `setopt` names are kept with the history settings rather
//! than with the general shell options, so they land in the history section
//! of the generated file.

use crate::dotfile::{
    shell::{
        apply_shell_rules, number_or, unquote, words_after, EnvironmentVar, ShellAlias,
        ASSIGNMENT, EXPORT,
    },
    Claim, ConfigKind, DotfileFormat, Emitter, Line, Rule,
};

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, sync::LazyLock};
use tracing::{debug, instrument};

/// Default `HISTFILE`.
pub const DEFAULT_HIST_FILE: &str = "~/.zsh_history";

/// Default `HISTSIZE` and `SAVEHIST`.
pub const DEFAULT_HIST_SIZE: i64 = 10000;

/// Default `ZSH_AUTOSUGGEST_HIGHLIGHT_STYLE`.
pub const DEFAULT_HIGHLIGHT_STYLE: &str = "fg=#666666";

/// Default `ZSH_AUTOSUGGEST_BUFFER_MAX_SIZE`.
pub const DEFAULT_BUFFER_MAX_SIZE: u32 = 20;

static ALIAS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^alias\s+([^=]+)=['"]?(.+?)['"]?$"#).expect("alias pattern")
});

static BINDKEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^bindkey\s+['"]([^'"]+)['"]\s+(.+)$"#).expect("bindkey pattern")
});

static AUTOSUGGEST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(ZSH_AUTOSUGGEST_[A-Z_]+)=(.*)$").expect("autosuggest pattern")
});

static HIGHLIGHT_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ZSH_HIGHLIGHT_STYLES\[([^\]]+)\]=(.*)$").expect("highlight style pattern")
});

/// Structured `.zshrc`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZshConfig {
    /// Environment variables.
    pub environment: Vec<EnvironmentVar>,

    /// History settings.
    pub history: ZshHistory,

    /// Options enabled through `setopt` that are not history related.
    pub options: Vec<String>,

    /// Sourced plugin scripts.
    pub plugins: Vec<ZshPlugin>,

    /// Alias definitions.
    pub aliases: Vec<ShellAlias>,

    /// `bindkey` widgets.
    pub keybindings: Vec<ZshKeybinding>,

    /// Tuning of the `zsh-autosuggestions` plugin.
    pub autosuggestions: ZshAutosuggestions,

    /// `ZSH_HIGHLIGHT_STYLES` entries by token.
    pub syntax_highlighting: BTreeMap<String, String>,

    /// Commands run at startup, e.g., `eval` lines.
    pub startup_commands: Vec<String>,

    /// Lines that were not recognized.
    pub raw_lines: Vec<String>,
}

/// Zsh history settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZshHistory {
    /// `HISTFILE`.
    pub file: String,

    /// `HISTSIZE`.
    pub size: i64,

    /// `SAVEHIST`.
    pub save_size: i64,

    /// History related `setopt` names.
    pub options: Vec<String>,
}

impl Default for ZshHistory {
    fn default() -> Self {
        Self {
            file: DEFAULT_HIST_FILE.into(),
            size: DEFAULT_HIST_SIZE,
            save_size: DEFAULT_HIST_SIZE,
            options: vec![
                "SHARE_HISTORY".into(),
                "HIST_IGNORE_DUPS".into(),
                "HIST_IGNORE_SPACE".into(),
            ],
        }
    }
}

/// Sourced plugin script.
///
/// Only enabled plugins are written out. A disabled plugin does not survive
/// a stringify then parse cycle.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ZshPlugin {
    pub name: String,
    pub path: String,
    pub enabled: bool,
}

impl ZshPlugin {
    /// Construct enabled plugin, naming it after its script path.
    pub fn from_path(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            name: plugin_name(&path),
            path,
            enabled: true,
        }
    }
}

/// Key binding to a ZLE widget.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ZshKeybinding {
    pub key: String,
    pub widget: String,

    /// Optional human readable note, never written to file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ZshKeybinding {
    pub fn new(key: impl Into<String>, widget: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            widget: widget.into(),
            description: None,
        }
    }
}

/// `zsh-autosuggestions` settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZshAutosuggestions {
    /// `ZSH_AUTOSUGGEST_STRATEGY` entries.
    pub strategy: Vec<String>,

    /// `ZSH_AUTOSUGGEST_HIGHLIGHT_STYLE`.
    pub highlight_style: String,

    /// `ZSH_AUTOSUGGEST_BUFFER_MAX_SIZE`.
    pub buffer_max_size: u32,
}

impl ZshAutosuggestions {
    fn is_configured(&self) -> bool {
        !self.strategy.is_empty()
            || self.highlight_style != DEFAULT_HIGHLIGHT_STYLE
            || self.buffer_max_size != DEFAULT_BUFFER_MAX_SIZE
    }
}

impl Default for ZshAutosuggestions {
    fn default() -> Self {
        Self {
            strategy: vec!["history".into(), "completion".into()],
            highlight_style: DEFAULT_HIGHLIGHT_STYLE.into(),
            buffer_max_size: DEFAULT_BUFFER_MAX_SIZE,
        }
    }
}

impl DotfileFormat for ZshConfig {
    const KIND: ConfigKind = ConfigKind::Zsh;

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

/// Default Zsh configuration.
pub fn default_model() -> ZshConfig {
    ZshConfig {
        environment: Vec::new(),
        history: ZshHistory::default(),
        options: vec!["AUTO_CD".into(), "INTERACTIVE_COMMENTS".into(), "CORRECT".into()],
        plugins: Vec::new(),
        aliases: vec![
            ShellAlias::new("ls", "ls --color=auto"),
            ShellAlias::new("ll", "ls -la"),
            ShellAlias::new("la", "ls -A"),
            ShellAlias::new("grep", "grep --color=auto"),
        ],
        keybindings: Vec::new(),
        autosuggestions: ZshAutosuggestions::default(),
        syntax_highlighting: BTreeMap::new(),
        startup_commands: Vec::new(),
        raw_lines: Vec::new(),
    }
}

/// Check if `setopt` name belongs with the history settings.
pub fn is_history_option(name: &str) -> bool {
    name.starts_with("HIST_")
        || matches!(
            name,
            "SHARE_HISTORY" | "APPEND_HISTORY" | "INC_APPEND_HISTORY" | "EXTENDED_HISTORY"
        )
}

const RULES: &[Rule<ZshConfig>] = &[
    ("export", export),
    ("history", history),
    ("setopt", setopt),
    ("unsetopt", unsetopt),
    ("alias", alias),
    ("bindkey", bindkey),
    ("source", source),
    ("autosuggest", autosuggest),
    ("highlight style", highlight_style),
    ("eval", eval),
    ("assignment", assignment),
];

/// Parse `.zshrc` content.
#[instrument(skip(content), level = "debug")]
pub fn parse(content: &str) -> ZshConfig {
    let mut config = ZshConfig {
        history: ZshHistory {
            options: Vec::new(),
            ..ZshHistory::default()
        },
        options: Vec::new(),
        aliases: Vec::new(),
        autosuggestions: ZshAutosuggestions {
            strategy: Vec::new(),
            ..ZshAutosuggestions::default()
        },
        ..default_model()
    };

    config.raw_lines = apply_shell_rules(content.lines(), RULES, &mut config);
    debug!("parsed zsh config with {} raw lines", config.raw_lines.len());

    config
}

/// Render `.zshrc` content.
#[instrument(skip(config), level = "debug")]
pub fn stringify(config: &ZshConfig) -> String {
    let mut out = Emitter::with_header("Zsh Configuration");

    let history = &config.history;
    let history_lines = [
        format!("HISTFILE={}", history.file),
        format!("HISTSIZE={}", history.size),
        format!("SAVEHIST={}", history.save_size),
    ]
    .into_iter()
    .chain(history.options.iter().map(|opt| format!("setopt {opt}")));
    out.section("History", history_lines);

    out.section(
        "Shell Options",
        config.options.iter().map(|opt| format!("setopt {opt}")),
    );
    out.section(
        "Environment Variables",
        config.environment.iter().map(EnvironmentVar::to_line),
    );
    out.section(
        "Key Bindings",
        config
            .keybindings
            .iter()
            .map(|bind| format!("bindkey '{}' {}", bind.key, bind.widget)),
    );
    out.section("Aliases", config.aliases.iter().map(ShellAlias::to_line));

    let suggest = &config.autosuggestions;
    if suggest.is_configured() {
        let mut lines = Vec::new();
        if !suggest.strategy.is_empty() {
            lines.push(format!(
                "ZSH_AUTOSUGGEST_STRATEGY=({})",
                suggest.strategy.join(" ")
            ));
        }
        lines.push(format!(
            "ZSH_AUTOSUGGEST_HIGHLIGHT_STYLE=\"{}\"",
            suggest.highlight_style
        ));
        lines.push(format!(
            "ZSH_AUTOSUGGEST_BUFFER_MAX_SIZE={}",
            suggest.buffer_max_size
        ));
        out.section("Zsh Autosuggestions", lines);
    }

    out.section(
        "Syntax Highlighting",
        config
            .syntax_highlighting
            .iter()
            .map(|(token, style)| format!("ZSH_HIGHLIGHT_STYLES[{token}]=\"{style}\"")),
    );
    out.section(
        "Plugins",
        config
            .plugins
            .iter()
            .filter(|plugin| plugin.enabled)
            .map(|plugin| format!("source {}", plugin.path)),
    );
    out.section("Startup Commands", config.startup_commands.iter().cloned());
    out.raw_lines(&config.raw_lines);

    out.finish()
}

fn plugin_name(path: &str) -> String {
    let known = ["zsh-autosuggestions", "zsh-syntax-highlighting", "zsh-completions"];
    if let Some(name) = known.iter().find(|name| path.contains(*name)) {
        return name.to_string();
    }

    let file = path.rsplit('/').next().unwrap_or(path);
    file.strip_suffix(".zsh").unwrap_or(file).to_string()
}

fn export(line: Line<'_>, config: &mut ZshConfig) -> Claim {
    let Some(captures) = EXPORT.captures(line.text) else {
        return Claim::Pass;
    };

    config
        .environment
        .push(EnvironmentVar::new(&captures[1], unquote(&captures[2]), true));

    Claim::Parsed
}

fn history(line: Line<'_>, config: &mut ZshConfig) -> Claim {
    let Some(captures) = ASSIGNMENT.captures(line.text) else {
        return Claim::Pass;
    };

    let value = unquote(&captures[2]);
    let history = &mut config.history;
    match &captures[1] {
        "HISTFILE" => history.file = value.into(),
        "HISTSIZE" => history.size = number_or(value, DEFAULT_HIST_SIZE),
        "SAVEHIST" => history.save_size = number_or(value, DEFAULT_HIST_SIZE),
        _ => return Claim::Pass,
    }

    Claim::Parsed
}

fn setopt(line: Line<'_>, config: &mut ZshConfig) -> Claim {
    let Some(names) = words_after(line.text, "setopt") else {
        return Claim::Pass;
    };

    for name in names {
        if is_history_option(&name) {
            config.history.options.push(name);
        } else {
            config.options.push(name);
        }
    }

    Claim::Parsed
}

fn unsetopt(line: Line<'_>, _: &mut ZshConfig) -> Claim {
    if words_after(line.text, "unsetopt").is_some() {
        return Claim::Raw;
    }

    Claim::Pass
}

fn alias(line: Line<'_>, config: &mut ZshConfig) -> Claim {
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

fn bindkey(line: Line<'_>, config: &mut ZshConfig) -> Claim {
    if !line.text.starts_with("bindkey ") {
        return Claim::Pass;
    }

    let Some(captures) = BINDKEY.captures(line.text) else {
        return Claim::Raw;
    };

    config
        .keybindings
        .push(ZshKeybinding::new(&captures[1], captures[2].trim()));

    Claim::Parsed
}

fn source(line: Line<'_>, config: &mut ZshConfig) -> Claim {
    let Some(path) = line
        .text
        .strip_prefix("source ")
        .or_else(|| line.text.strip_prefix(". "))
    else {
        return Claim::Pass;
    };

    let path = path.trim();
    if path.is_empty() {
        return Claim::Raw;
    }

    config.plugins.push(ZshPlugin::from_path(path));

    Claim::Parsed
}

fn autosuggest(line: Line<'_>, config: &mut ZshConfig) -> Claim {
    let Some(captures) = AUTOSUGGEST.captures(line.text) else {
        return Claim::Pass;
    };

    let value = unquote(&captures[2]);
    let suggest = &mut config.autosuggestions;
    match &captures[1] {
        "ZSH_AUTOSUGGEST_STRATEGY" => {
            suggest.strategy = value
                .replace(['(', ')'], " ")
                .split_whitespace()
                .map(str::to_string)
                .collect();
        }
        "ZSH_AUTOSUGGEST_HIGHLIGHT_STYLE" => suggest.highlight_style = value.into(),
        "ZSH_AUTOSUGGEST_BUFFER_MAX_SIZE" => {
            suggest.buffer_max_size = number_or(value, DEFAULT_BUFFER_MAX_SIZE)
        }
        _ => return Claim::Raw,
    }

    Claim::Parsed
}

fn highlight_style(line: Line<'_>, config: &mut ZshConfig) -> Claim {
    let Some(captures) = HIGHLIGHT_STYLE.captures(line.text) else {
        return Claim::Pass;
    };

    config
        .syntax_highlighting
        .insert(captures[1].to_string(), unquote(&captures[2]).to_string());

    Claim::Parsed
}

fn eval(line: Line<'_>, config: &mut ZshConfig) -> Claim {
    if !line.text.starts_with("eval ") {
        return Claim::Pass;
    }

    config.startup_commands.push(line.text.into());

    Claim::Parsed
}

fn assignment(line: Line<'_>, config: &mut ZshConfig) -> Claim {
    let Some(captures) = ASSIGNMENT.captures(line.text) else {
        return Claim::Pass;
    };

    // INVARIANT: Arrays like `plugins=(git)` and command prefixes like
    // `FOO=bar make` stay verbatim.
    let text = &captures[2];
    let value = unquote(text);
    if text.starts_with('(') || (value == text && text.contains(char::is_whitespace)) {
        return Claim::Pass;
    }

    config
        .environment
        .push(EnvironmentVar::new(&captures[1], value, false));

    Claim::Parsed
}

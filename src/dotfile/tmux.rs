// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Tmux configuration.
//!
//! Option assignments through any of `set`, `set-option`, `setw`, or
//! `set-window-option` are routed by option name, regardless of their flags.
//! Key bindings keep their command verbatim, with a trailing `# comment`
//! serving as the binding's description.
//!
//! The prefix block written by [`stringify`] rebinds the prefix key through
//! `unbind C-b` and `bind <prefix> send-prefix`. Both lines are consumed
//! again by [`parse`] so that they do not pile up as key bindings or raw
//! lines after repeated saves.

use crate::dotfile::{
    apply_rules,
    shell::{number_or, unquote},
    Claim, ConfigKind, DotfileFormat, Emitter, Line, Rule,
};

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{borrow::Cow, sync::LazyLock};
use tracing::{debug, instrument};

/// Default `history-limit`.
pub const DEFAULT_HISTORY_LIMIT: u32 = 10000;

/// Default `base-index` and `pane-base-index`.
pub const DEFAULT_BASE_INDEX: u32 = 1;

/// Default `escape-time`.
pub const DEFAULT_ESCAPE_TIME: u32 = 0;

/// Default `status-left-length` and `status-right-length`.
pub const DEFAULT_STATUS_LENGTH: u32 = 20;

static SET_OPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:set|set-option|setw|set-window-option)\s+((?:-[A-Za-z]+\s+)*)(\S+)\s+(.+)$")
        .expect("set option pattern")
});

static BIND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^bind(?:-key)?\s+(-[rn]\s+)?(\S+)\s+(.+)$").expect("bind pattern")
});

/// Structured `.tmux.conf`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TmuxConfig {
    pub general: TmuxGeneral,
    pub appearance: TmuxAppearance,
    pub keybindings: Vec<TmuxKeybinding>,

    /// Lines that were not recognized.
    pub raw_lines: Vec<String>,
}

/// Server and session behavior.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TmuxGeneral {
    /// Prefix key, e.g., `C-a`.
    pub prefix: String,
    pub mouse: bool,
    pub history_limit: u32,
    pub base_index: u32,
    pub pane_base_index: u32,
    pub renumber_windows: bool,

    /// Escape time in milliseconds.
    pub escape_time: u32,
    pub default_terminal: String,

    /// Entries appended to `terminal-overrides`.
    pub terminal_overrides: Vec<String>,
}

/// Status bar look.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TmuxAppearance {
    pub status_position: StatusPosition,
    pub status_style: String,
    pub status_left: String,
    pub status_right: String,
    pub status_left_length: u32,
    pub status_right_length: u32,
    pub window_status_format: String,
    pub window_status_current_format: String,
}

/// Where the status bar is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusPosition {
    Top,
    Bottom,
}

impl StatusPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }

    fn from_value(value: &str) -> Option<Self> {
        match value {
            "top" => Some(Self::Top),
            "bottom" => Some(Self::Bottom),
            _ => None,
        }
    }
}

/// Key binding.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TmuxKeybinding {
    pub key: String,

    /// Command exactly as written after the key.
    pub command: String,

    /// `-n` for no prefix, `-r` for repeatable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<String>,

    /// Written as trailing comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TmuxKeybinding {
    pub fn new(key: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            command: command.into(),
            flags: None,
            description: None,
        }
    }

    pub fn with_flags(mut self, flags: impl Into<String>) -> Self {
        self.flags = Some(flags.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn to_line(&self) -> String {
        let flags = self
            .flags
            .as_deref()
            .map(|flags| format!("{flags} "))
            .unwrap_or_default();
        let comment = self
            .description
            .as_deref()
            .map(|description| format!(" # {description}"))
            .unwrap_or_default();
        format!("bind {flags}{} {}{comment}", self.key, self.command)
    }
}

impl DotfileFormat for TmuxConfig {
    const KIND: ConfigKind = ConfigKind::Tmux;

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

/// Default Tmux configuration.
pub fn default_model() -> TmuxConfig {
    TmuxConfig {
        general: TmuxGeneral {
            prefix: "C-a".into(),
            mouse: true,
            history_limit: DEFAULT_HISTORY_LIMIT,
            base_index: DEFAULT_BASE_INDEX,
            pane_base_index: DEFAULT_BASE_INDEX,
            renumber_windows: true,
            escape_time: DEFAULT_ESCAPE_TIME,
            default_terminal: "tmux-256color".into(),
            terminal_overrides: vec![",xterm-256color:RGB".into()],
        },
        appearance: TmuxAppearance {
            status_position: StatusPosition::Bottom,
            status_style: "bg=#1e1e2e fg=#cdd6f4".into(),
            status_left: "#[fg=#89b4fa,bold] #S ".into(),
            status_right: "#[fg=#a6adc8] %H:%M ".into(),
            status_left_length: DEFAULT_STATUS_LENGTH,
            status_right_length: DEFAULT_STATUS_LENGTH,
            window_status_format: "#[fg=#6c7086] #I:#W ".into(),
            window_status_current_format: "#[fg=#89b4fa,bold] #I:#W ".into(),
        },
        keybindings: vec![
            TmuxKeybinding::new("|", r##"split-window -h -c "#{pane_current_path}""##)
                .with_description("Split horizontal"),
            TmuxKeybinding::new("-", r##"split-window -v -c "#{pane_current_path}""##)
                .with_description("Split vertical"),
            TmuxKeybinding::new("h", "select-pane -L").with_description("Move left"),
            TmuxKeybinding::new("j", "select-pane -D").with_description("Move down"),
            TmuxKeybinding::new("k", "select-pane -U").with_description("Move up"),
            TmuxKeybinding::new("l", "select-pane -R").with_description("Move right"),
            TmuxKeybinding::new("H", "resize-pane -L 5")
                .with_flags("-r")
                .with_description("Resize left"),
            TmuxKeybinding::new("J", "resize-pane -D 5")
                .with_flags("-r")
                .with_description("Resize down"),
            TmuxKeybinding::new("K", "resize-pane -U 5")
                .with_flags("-r")
                .with_description("Resize up"),
            TmuxKeybinding::new("L", "resize-pane -R 5")
                .with_flags("-r")
                .with_description("Resize right"),
            TmuxKeybinding::new(
                "r",
                r#"source-file ~/.tmux.conf \; display "Config reloaded!""#,
            )
            .with_description("Reload config"),
        ],
        raw_lines: Vec::new(),
    }
}

const RULES: &[Rule<TmuxConfig>] = &[
    ("set option", set_option),
    ("bind", bind),
    ("unbind", unbind),
];

/// Parse `.tmux.conf` content.
#[instrument(skip(content), level = "debug")]
pub fn parse(content: &str) -> TmuxConfig {
    let mut config = default_model();
    config.keybindings.clear();
    config.general.terminal_overrides.clear();

    config.raw_lines = apply_rules(content.lines(), RULES, &mut config);

    // INVARIANT: The prefix rebinding is regenerated by stringify.
    let prefix = config.general.prefix.clone();
    config.keybindings.retain(|bind| {
        !(bind.command == "send-prefix" && bind.key == prefix && bind.flags.is_none())
    });
    debug!("parsed tmux config with {} raw lines", config.raw_lines.len());

    config
}

/// Render `.tmux.conf` content.
#[instrument(skip(config), level = "debug")]
pub fn stringify(config: &TmuxConfig) -> String {
    let general = &config.general;
    let appearance = &config.appearance;
    let mut out = Emitter::with_header("Tmux Configuration");

    out.section(
        "Prefix key",
        [
            format!("set -g prefix {}", general.prefix),
            "unbind C-b".into(),
            format!("bind {} send-prefix", general.prefix),
        ],
    );

    let general_lines = [
        format!("set -g mouse {}", on_off(general.mouse)),
        format!("set -g history-limit {}", general.history_limit),
        format!("set -g base-index {}", general.base_index),
        format!("setw -g pane-base-index {}", general.pane_base_index),
        format!("set -g renumber-windows {}", on_off(general.renumber_windows)),
        format!("set -sg escape-time {}", general.escape_time),
        format!("set -g default-terminal {}", double_quote(&general.default_terminal)),
    ]
    .into_iter()
    .chain(
        general
            .terminal_overrides
            .iter()
            .map(|entry| format!("set -ag terminal-overrides {}", double_quote(entry))),
    );
    out.section("General Settings", general_lines);

    out.section(
        "Status Bar",
        [
            format!("set -g status-position {}", appearance.status_position.as_str()),
            format!("set -g status-style {}", quote(&appearance.status_style)),
            format!("set -g status-left {}", quote(&appearance.status_left)),
            format!("set -g status-right {}", quote(&appearance.status_right)),
            format!("set -g status-left-length {}", appearance.status_left_length),
            format!("set -g status-right-length {}", appearance.status_right_length),
        ],
    );
    out.section(
        "Window Status",
        [
            format!(
                "setw -g window-status-format {}",
                quote(&appearance.window_status_format)
            ),
            format!(
                "setw -g window-status-current-format {}",
                quote(&appearance.window_status_current_format)
            ),
        ],
    );
    out.section(
        "Keybindings",
        config.keybindings.iter().map(TmuxKeybinding::to_line),
    );
    out.raw_lines(&config.raw_lines);

    out.finish()
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

fn quote(value: &str) -> String {
    if value.contains('\'') {
        double_quote(value)
    } else {
        format!("'{value}'")
    }
}

/// Double quote with `\` and `"` escaped, the only escapes tmux needs there.
fn double_quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Strip one layer of quotes, undoing [`double_quote`] escapes.
fn unquote_value(value: &str) -> Cow<'_, str> {
    let Some(inner) = value.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')) else {
        return Cow::Borrowed(unquote(value));
    };
    if !inner.contains('\\') {
        return Cow::Borrowed(inner);
    }

    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(ch) = chars.next() {
        match (ch, chars.peek()) {
            ('\\', Some(&next)) if next == '"' || next == '\\' => {
                result.push(next);
                chars.next();
            }
            _ => result.push(ch),
        }
    }

    Cow::Owned(result)
}

fn switch(value: &str) -> Option<bool> {
    match value {
        "on" => Some(true),
        "off" => Some(false),
        _ => None,
    }
}

fn set_option(line: Line<'_>, config: &mut TmuxConfig) -> Claim {
    let Some(captures) = SET_OPTION.captures(line.text) else {
        return Claim::Pass;
    };

    let flags = &captures[1];
    let key = &captures[2];
    let value = unquote_value(captures[3].trim());
    let value = value.as_ref();
    let general = &mut config.general;
    let appearance = &mut config.appearance;
    match key {
        "prefix" => general.prefix = value.into(),
        "mouse" => match switch(value) {
            Some(flag) => general.mouse = flag,
            None => return Claim::Raw,
        },
        "history-limit" => general.history_limit = number_or(value, DEFAULT_HISTORY_LIMIT),
        "base-index" => general.base_index = number_or(value, DEFAULT_BASE_INDEX),
        "pane-base-index" => general.pane_base_index = number_or(value, DEFAULT_BASE_INDEX),
        "renumber-windows" => match switch(value) {
            Some(flag) => general.renumber_windows = flag,
            None => return Claim::Raw,
        },
        "escape-time" => general.escape_time = number_or(value, DEFAULT_ESCAPE_TIME),
        "default-terminal" => general.default_terminal = value.into(),
        "terminal-overrides" if flags.contains('a') => {
            general.terminal_overrides.push(value.into());
        }
        "status-position" => match StatusPosition::from_value(value) {
            Some(position) => appearance.status_position = position,
            None => return Claim::Raw,
        },
        "status-style" => appearance.status_style = value.into(),
        "status-left" => appearance.status_left = value.into(),
        "status-right" => appearance.status_right = value.into(),
        "status-left-length" => {
            appearance.status_left_length = number_or(value, DEFAULT_STATUS_LENGTH)
        }
        "status-right-length" => {
            appearance.status_right_length = number_or(value, DEFAULT_STATUS_LENGTH)
        }
        "window-status-format" => appearance.window_status_format = value.into(),
        "window-status-current-format" => {
            appearance.window_status_current_format = value.into()
        }
        _ => return Claim::Raw,
    }

    Claim::Parsed
}

fn bind(line: Line<'_>, config: &mut TmuxConfig) -> Claim {
    let Some(captures) = BIND.captures(line.text) else {
        return Claim::Pass;
    };

    // INVARIANT: Key tables and other flags are not modeled.
    let key = &captures[2];
    if key.len() > 1 && key.starts_with('-') {
        return Claim::Raw;
    }

    let (command, description) = split_comment(&captures[3]);
    config.keybindings.push(TmuxKeybinding {
        key: key.into(),
        command: command.into(),
        flags: captures.get(1).map(|flags| flags.as_str().trim().to_string()),
        description: description.map(str::to_string),
    });

    Claim::Parsed
}

fn unbind(line: Line<'_>, _: &mut TmuxConfig) -> Claim {
    match line.text.split_whitespace().collect::<Vec<_>>().as_slice() {
        ["unbind" | "unbind-key", "C-b"] => Claim::Parsed,
        ["unbind" | "unbind-key", ..] => Claim::Raw,
        _ => Claim::Pass,
    }
}

/// Split a trailing ` # comment` that sits outside of quotes.
fn split_comment(command: &str) -> (&str, Option<&str>) {
    let mut open_quote = None;
    let mut escaped = false;
    let mut previous = ' ';
    for (index, ch) in command.char_indices() {
        if escaped {
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else if let Some(open) = open_quote {
            if ch == open {
                open_quote = None;
            }
        } else if ch == '"' || ch == '\'' {
            open_quote = Some(ch);
        } else if ch == '#' && previous.is_whitespace() {
            let rest = &command[index + 1..];
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                return (command[..index].trim_end(), Some(rest.trim()));
            }
        }
        previous = ch;
    }

    (command.trim_end(), None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use simple_test_case::test_case;

    #[test_case(
        r##"split-window -h -c "#{pane_current_path}" # Split horizontal"##,
        (r##"split-window -h -c "#{pane_current_path}""##, Some("Split horizontal"));
        "quoted hash kept"
    )]
    #[test_case(
        r#"source-file ~/.tmux.conf \; display "Reloaded # now""#,
        (r#"source-file ~/.tmux.conf \; display "Reloaded # now""#, None);
        "hash inside quotes"
    )]
    #[test_case("select-pane -L", ("select-pane -L", None); "no comment")]
    #[test_case("display #{pane_id}", ("display #{pane_id}", None); "format expansion")]
    #[test]
    fn split_trailing_comment(input: &str, expect: (&str, Option<&str>)) {
        pretty_assertions::assert_eq!(split_comment(input), expect);
    }

    #[test]
    fn repeatable_binding_keeps_shape() {
        let result = parse("bind -r H resize-pane -L 5");
        let expect = TmuxKeybinding::new("H", "resize-pane -L 5").with_flags("-r");
        assert_eq!(result.keybindings, vec![expect.clone()]);
        assert_eq!(expect.to_line(), "bind -r H resize-pane -L 5");
        assert!(stringify(&result).contains("\nbind -r H resize-pane -L 5\n"));
    }

    #[test]
    fn parse_option_variants() {
        let result = parse(indoc! {r##"
            set -g prefix C-Space
            unbind C-b
            bind C-Space send-prefix
            set-option -g mouse off
            set -g history-limit lots
            setw -g pane-base-index 0
            set-window-option -g window-status-format "#I #W"
            set -sg escape-time 10
            set -ga terminal-overrides ",alacritty:RGB"
            set -g status-position top
            set -g status-left-length 40
            bind -r Left resize-pane -L 2 # Shrink
            bind-key -n M-h select-pane -L
        "##});

        let mut expect = default_model();
        expect.general.prefix = "C-Space".into();
        expect.general.mouse = false;
        expect.general.pane_base_index = 0;
        expect.general.escape_time = 10;
        expect.general.terminal_overrides = vec![",alacritty:RGB".into()];
        expect.appearance.window_status_format = "#I #W".into();
        expect.appearance.status_position = StatusPosition::Top;
        expect.appearance.status_left_length = 40;
        expect.keybindings = vec![
            TmuxKeybinding::new("Left", "resize-pane -L 2")
                .with_flags("-r")
                .with_description("Shrink"),
            TmuxKeybinding::new("M-h", "select-pane -L").with_flags("-n"),
        ];

        assert_eq!(result, expect);
    }

    #[test]
    fn unknown_lines_become_raw_in_order() {
        let result = parse(indoc! {r#"
            set -g @plugin 'tmux-plugins/tpm'
            set -g status-position middle
            set -g mouse maybe
            unbind r
            bind -T copy-mode-vi v send -X begin-selection
            run '~/.tmux/plugins/tpm/tpm'
        "#});

        assert_eq!(
            result.raw_lines,
            vec![
                "set -g @plugin 'tmux-plugins/tpm'",
                "set -g status-position middle",
                "set -g mouse maybe",
                "unbind r",
                "bind -T copy-mode-vi v send -X begin-selection",
                "run '~/.tmux/plugins/tpm/tpm'",
            ]
        );
        assert!(result.keybindings.is_empty());
        assert_eq!(result.appearance.status_position, StatusPosition::Bottom);
    }

    #[test]
    fn stringify_canonical_layout() {
        let mut config = default_model();
        config.keybindings.truncate(1);
        config.raw_lines = vec!["run '~/.tmux/plugins/tpm/tpm'".into()];

        let result = stringify(&config);
        let expect = indoc! {r##"
            # Tmux Configuration
            # Managed by Argus

            # Prefix key
            set -g prefix C-a
            unbind C-b
            bind C-a send-prefix

            # General Settings
            set -g mouse on
            set -g history-limit 10000
            set -g base-index 1
            setw -g pane-base-index 1
            set -g renumber-windows on
            set -sg escape-time 0
            set -g default-terminal "tmux-256color"
            set -ag terminal-overrides ",xterm-256color:RGB"

            # Status Bar
            set -g status-position bottom
            set -g status-style 'bg=#1e1e2e fg=#cdd6f4'
            set -g status-left '#[fg=#89b4fa,bold] #S '
            set -g status-right '#[fg=#a6adc8] %H:%M '
            set -g status-left-length 20
            set -g status-right-length 20

            # Window Status
            setw -g window-status-format '#[fg=#6c7086] #I:#W '
            setw -g window-status-current-format '#[fg=#89b4fa,bold] #I:#W '

            # Keybindings
            bind | split-window -h -c "#{pane_current_path}" # Split horizontal

            # Additional Configuration
            run '~/.tmux/plugins/tpm/tpm'
        "##};

        assert_eq!(result, expect);
    }

    #[test]
    fn structured_content_round_trips() {
        let mut config = default_model();
        config.general.prefix = "C-b".into();
        config.general.mouse = false;
        config.general.renumber_windows = false;
        config.general.terminal_overrides = vec![
            ",xterm-256color:RGB".into(),
            "*:Ss=\\E[%p1%d q:Se=\\E[ q".into(),
        ];
        config.appearance.status_right = "#{?client_prefix,PREFIX ,}'%Y'".into();
        config.keybindings.push(TmuxKeybinding::new("C-l", "send-keys C-l").with_flags("-n"));

        assert_eq!(parse(&stringify(&config)), config);
    }

    #[test]
    fn mixed_quotes_are_escaped() {
        let mut config = default_model();
        config.appearance.status_left = r#"#[fg=red] "it's" C:\ "#.into();

        let result = stringify(&config);
        assert!(result.contains(r##"set -g status-left "#[fg=red] \"it's\" C:\\ ""##));
        assert_eq!(parse(&result), config);
    }

    #[test]
    fn double_quoted_escapes_are_undone() {
        let result = parse(r#"set -g status-right "say \"hi\" to \\ and \E[0m""#);
        assert_eq!(result.appearance.status_right, r#"say "hi" to \ and \E[0m"#);
    }

    #[test]
    fn default_model_round_trips() {
        let config = default_model();
        assert_eq!(parse(&stringify(&config)), config);
    }

    #[test]
    fn repeated_saves_do_not_accumulate() {
        let once = stringify(&parse(&stringify(&default_model())));
        let twice = stringify(&parse(&once));
        assert_eq!(once, twice);
        assert_eq!(once.matches("send-prefix").count(), 1);
        assert_eq!(once.matches("terminal-overrides").count(), 1);
    }
}

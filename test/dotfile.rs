// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use crate::{BASHRC, KITTY_CONF, STARSHIP_TOML, TMUX_CONF, ZSHRC};

use argus::dotfile::{
    bash, kitty, shell::ShellAlias, starship, starship::StarshipValue, tmux,
    tmux::TmuxKeybinding, zsh, zsh::ZshKeybinding, ConfigKind,
};

use pretty_assertions::assert_eq;
use simple_test_case::test_case;

#[test_case(ConfigKind::Bash, BASHRC; "bash")]
#[test_case(ConfigKind::Zsh, ZSHRC; "zsh")]
#[test_case(ConfigKind::Tmux, TMUX_CONF; "tmux")]
#[test_case(ConfigKind::Kitty, KITTY_CONF; "kitty")]
#[test_case(ConfigKind::Starship, STARSHIP_TOML; "starship")]
#[test]
fn normalize_is_idempotent(kind: ConfigKind, content: &str) {
    let once = kind.normalize(content);
    let twice = kind.normalize(&once);
    pretty_assertions::assert_eq!(twice, once);
}

#[test_case(ConfigKind::Bash; "bash")]
#[test_case(ConfigKind::Zsh; "zsh")]
#[test_case(ConfigKind::Tmux; "tmux")]
#[test_case(ConfigKind::Kitty; "kitty")]
#[test_case(ConfigKind::Starship; "starship")]
#[test]
fn default_content_is_canonical(kind: ConfigKind) {
    let content = kind.default_content();
    pretty_assertions::assert_eq!(kind.normalize(&content), content);
}

#[test]
fn parse_handwritten_bashrc() {
    let result = bash::parse(BASHRC);

    assert!(result.interactive_guard);
    assert_eq!(
        result.aliases,
        vec![
            ShellAlias::new("ls", "ls --color=auto"),
            ShellAlias::new("ll", "ls -la"),
            ShellAlias::new("la", "ls -A"),
            ShellAlias::new("l", "ls -CF"),
            ShellAlias::new("grep", "grep --color=auto"),
            ShellAlias::new("fgrep", "fgrep --color=auto"),
            ShellAlias::new("egrep", "egrep --color=auto"),
        ]
    );
    assert_eq!(result.history_settings.hist_control, "ignoreboth");
    assert_eq!(result.history_settings.hist_size, 1000);
    assert_eq!(result.history_settings.hist_file_size, 2000);
    assert_eq!(result.shop_options, vec!["histappend", "checkwinsize"]);
    assert_eq!(
        result.startup_commands,
        vec![r#"[ -x /usr/bin/lesspipe ] && eval "$(SHELL=/bin/sh lesspipe)""#]
    );
    assert!(result.sources.is_empty());
    assert_eq!(
        result.raw_lines,
        vec![
            "if command -v starship &> /dev/null; then",
            r#"    eval "$(starship init bash)""#,
            "fi",
            "if [ -d ~/.bashrc.d ]; then",
            "    for rc in ~/.bashrc.d/*; do",
            r#"        if [ -f "$rc" ]; then"#,
            r#"            . "$rc""#,
            "        fi",
            "    done",
            "fi",
        ]
    );
}

#[test]
fn normalized_bashrc_keeps_blocks_intact() {
    let result = ConfigKind::Bash.normalize(BASHRC);

    let expect = [
        "if [ -d ~/.bashrc.d ]; then",
        "    for rc in ~/.bashrc.d/*; do",
        r#"        if [ -f "$rc" ]; then"#,
        r#"            . "$rc""#,
        "        fi",
        "    done",
        "fi",
    ]
    .join("\n");
    assert!(result.contains(&expect), "block was split apart:\n{result}");
}

#[test]
fn parse_handwritten_zshrc() {
    let result = zsh::parse(ZSHRC);

    assert_eq!(result.history.file, "~/.zsh_history");
    assert_eq!(result.history.size, 10000);
    assert_eq!(result.history.save_size, 10000);
    assert_eq!(
        result.history.options,
        vec!["SHARE_HISTORY", "HIST_IGNORE_DUPS", "HIST_IGNORE_SPACE"]
    );
    assert_eq!(result.options, vec!["AUTO_CD", "INTERACTIVE_COMMENTS", "CORRECT"]);
    assert_eq!(
        result.keybindings,
        vec![
            ZshKeybinding::new("^[[A", "history-search-backward"),
            ZshKeybinding::new("^[[B", "history-search-forward"),
        ]
    );
    assert_eq!(result.aliases.len(), 5);
    assert_eq!(result.aliases[3], ShellAlias::new("l", "ls -CF"));
    assert!(result.startup_commands.is_empty());
    assert_eq!(
        result.raw_lines,
        vec![
            "bindkey -e",
            "if command -v starship &> /dev/null; then",
            r#"    eval "$(starship init zsh)""#,
            "fi",
            "if command -v zoxide &> /dev/null; then",
            r#"    eval "$(zoxide init zsh)""#,
            "fi",
        ]
    );
}

#[test]
fn parse_handwritten_tmux_conf() {
    let result = tmux::parse(TMUX_CONF);

    assert_eq!(result.general.prefix, "C-a");
    assert!(result.general.mouse);
    assert_eq!(result.general.history_limit, 10000);
    assert_eq!(result.general.base_index, 1);
    assert_eq!(result.general.pane_base_index, 1);
    assert!(result.general.renumber_windows);
    assert_eq!(result.general.escape_time, 0);
    assert_eq!(result.general.default_terminal, "tmux-256color");
    assert_eq!(result.general.terminal_overrides, vec![",xterm-256color:RGB"]);
    assert_eq!(result.appearance.status_style, "bg=#1e1e2e fg=#cdd6f4");
    assert_eq!(result.appearance.status_left, "#[fg=#89b4fa,bold] #S ");
    assert_eq!(result.appearance.status_left_length, 20);
    assert_eq!(result.appearance.status_right_length, tmux::DEFAULT_STATUS_LENGTH);

    assert_eq!(result.keybindings.len(), 16);
    assert_eq!(
        result.keybindings[..2],
        [
            TmuxKeybinding::new("|", r##"split-window -h -c "#{pane_current_path}""##),
            TmuxKeybinding::new("-", r##"split-window -v -c "#{pane_current_path}""##),
        ]
    );
    assert_eq!(
        result.keybindings[6],
        TmuxKeybinding::new("H", "resize-pane -L 5").with_flags("-r")
    );
    assert_eq!(
        result.keybindings[10],
        TmuxKeybinding::new("M-1", "select-window -t 1").with_flags("-n")
    );
    assert_eq!(
        result.keybindings[15],
        TmuxKeybinding::new("r", r#"source-file ~/.tmux.conf \; display "Config reloaded!""#)
    );
    assert!(result.keybindings.iter().all(|bind| bind.command != "send-prefix"));
    assert_eq!(result.raw_lines, vec![r#"unbind '"'"#, "unbind %"]);
}

#[test]
fn parse_handwritten_kitty_conf() {
    let result = kitty::parse(KITTY_CONF);
    assert_eq!(result, kitty::default_model());
}

#[test]
fn parse_handwritten_starship_toml() {
    let result = starship::parse(STARSHIP_TOML);

    assert_eq!(
        result.format,
        [
            "$os\\",
            "$username\\",
            "$directory\\",
            "$git_branch\\",
            "$git_status\\",
            "$nodejs\\",
            "$rust\\",
            "$golang\\",
            "$python\\",
            "$line_break\\",
            "$character",
        ]
        .join("\n")
    );
    assert_eq!(
        result.modules.keys().map(String::as_str).collect::<Vec<_>>(),
        vec![
            "character",
            "directory",
            "git_branch",
            "git_status",
            "golang",
            "nodejs",
            "os",
            "python",
            "rust",
        ]
    );
    assert_eq!(
        result.modules["directory"]["truncation_length"],
        StarshipValue::Integer(3)
    );
    assert_eq!(result.modules["os"]["disabled"], StarshipValue::Boolean(false));
    assert_eq!(
        result.modules["git_status"]["diverged"],
        StarshipValue::from("⇕⇡${ahead_count}⇣${behind_count}")
    );
    assert!(result.raw_lines.is_empty());
    assert!(result.raw_tables.is_empty());
}

#[test]
fn unknown_directives_survive_every_kind() {
    let cases = [
        (ConfigKind::Bash, "complete -cf sudo"),
        (ConfigKind::Zsh, "zstyle ':completion:*' menu select"),
        (ConfigKind::Tmux, "set -g @plugin 'tmux-plugins/tpm'"),
        (ConfigKind::Kitty, "url_style curly"),
        (ConfigKind::Starship, "add_newline = false"),
    ];

    for (kind, line) in cases {
        let result = kind.normalize(&format!("{line}\n"));
        assert!(
            result.lines().any(|output| output == line),
            "{kind} dropped {line:?}:\n{result}"
        );
    }
}

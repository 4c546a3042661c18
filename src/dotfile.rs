// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Dotfile round-trip engine.
//!
//! Argus understands five line-oriented configuration formats: Bash, Zsh,
//! Tmux, Kitty, and Starship. Each format gets its own structured model, and
//! each model can be produced from file text through `parse`, turned back into
//! file text through `stringify`, or started fresh through `default_model`.
//!
//! # Raw Lines
//!
//! Dotfiles are hand-edited. No parser can hope to understand every directive
//! a user might throw into their `.bashrc`, so every line that a parser does
//! not recognize is kept verbatim as a __raw line__. Raw lines are written
//! back out as one trailing block during stringification. Thus, loading and
//! saving a file without editing it never destroys unknown configuration.
//! The only thing that may change is where those unknown lines sit relative
//! to the recognized ones.
//!
//! # Line Rules
//!
//! Each format classifies lines through an ordered list of named __line
//! rules__. A rule is offered the trimmed line and either claims it into the
//! model, claims it as a raw line, or passes it along to the next rule. The
//! first rule to claim a line wins, and a line that no rule claims becomes a
//! raw line. Keeping the rules in a plain list makes the priority order of
//! each grammar easy to audit and test.
//!
//! Parsing never fails. Malformed directives degrade to raw lines, and
//! numeric values that do not parse fall back to documented defaults.

pub mod bash;
pub mod kitty;
pub mod shell;
pub mod starship;
pub mod tmux;
pub mod zsh;

use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};
use tracing::{debug, trace};

/// Parse, stringify, and default behavior of a dotfile model.
pub trait DotfileFormat: Sized {
    /// Kind of dotfile that the model represents.
    const KIND: ConfigKind;

    /// Parse file content into structured model.
    fn parse(content: &str) -> Self;

    /// Render structured model back into file content.
    fn stringify(&self) -> String;

    /// Sensible starting configuration for a missing file.
    fn default_model() -> Self;
}

/// Supported dotfile kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigKind {
    /// Bash run commands, i.e., `.bashrc`.
    Bash,

    /// Zsh run commands, i.e., `.zshrc`.
    Zsh,

    /// Tmux configuration, i.e., `.tmux.conf`.
    Tmux,

    /// Kitty terminal configuration, i.e., `kitty.conf`.
    Kitty,

    /// Starship prompt configuration, i.e., `starship.toml`.
    Starship,
}

impl ConfigKind {
    /// Every supported kind.
    pub const ALL: [ConfigKind; 5] = [
        ConfigKind::Bash,
        ConfigKind::Zsh,
        ConfigKind::Tmux,
        ConfigKind::Kitty,
        ConfigKind::Starship,
    ];

    /// Name of the kind as used on the command line and in backup metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bash => "bash",
            Self::Zsh => "zsh",
            Self::Tmux => "tmux",
            Self::Kitty => "kitty",
            Self::Starship => "starship",
        }
    }

    /// Parse then stringify file content of this kind.
    ///
    /// Recognized directives come back in canonical form, unrecognized lines
    /// come back in a trailing block.
    pub fn normalize(&self, content: &str) -> String {
        match self {
            Self::Bash => bash::stringify(&bash::parse(content)),
            Self::Zsh => zsh::stringify(&zsh::parse(content)),
            Self::Tmux => tmux::stringify(&tmux::parse(content)),
            Self::Kitty => kitty::stringify(&kitty::parse(content)),
            Self::Starship => starship::stringify(&starship::parse(content)),
        }
    }

    /// File content of the default model of this kind.
    pub fn default_content(&self) -> String {
        match self {
            Self::Bash => bash::stringify(&bash::default_model()),
            Self::Zsh => zsh::stringify(&zsh::default_model()),
            Self::Tmux => tmux::stringify(&tmux::default_model()),
            Self::Kitty => kitty::stringify(&kitty::default_model()),
            Self::Starship => starship::stringify(&starship::default_model()),
        }
    }
}

impl Display for ConfigKind {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(self.as_str())
    }
}

impl FromStr for ConfigKind {
    type Err = UnknownConfigKind;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        match data.trim().to_lowercase().as_str() {
            "bash" => Ok(Self::Bash),
            "zsh" => Ok(Self::Zsh),
            "tmux" => Ok(Self::Tmux),
            "kitty" => Ok(Self::Kitty),
            "starship" => Ok(Self::Starship),
            _ => Err(UnknownConfigKind(data.into())),
        }
    }
}

/// Backup metadata of a dotfile.
///
/// Produced by whatever layer performs the actual backup, Argus only
/// carries it around.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminalBackup {
    /// File name of backup.
    pub filename: String,

    /// Absolute path to backup.
    pub path: String,

    /// Seconds since Unix epoch when backup was made.
    pub timestamp: u64,

    /// Kind of dotfile that was backed up.
    pub config_type: ConfigKind,
}

/// Given name does not match any supported dotfile kind.
#[derive(Clone, Debug, thiserror::Error)]
#[error("unknown config type {0:?}, expected one of bash, zsh, tmux, kitty, starship")]
pub struct UnknownConfigKind(pub String);

/// A single line offered to a line rule.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Line<'a> {
    /// Line exactly as it appeared in the file.
    pub(crate) raw: &'a str,

    /// Line with surrounding whitespace removed.
    pub(crate) text: &'a str,
}

/// What a line rule decided to do with a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Claim {
    /// Line was absorbed into structured model.
    Parsed,

    /// Line belongs to this rule, but must be kept verbatim.
    Raw,

    /// Line is not for this rule.
    Pass,
}

/// Named line rule over model `M`.
pub(crate) type Rule<M> = (&'static str, fn(Line<'_>, &mut M) -> Claim);

/// Offer each meaningful line to an ordered rule list.
///
/// Skips blank lines and full-line `#` comments. Returns the raw lines in
/// their original order.
pub(crate) fn apply_rules<'a, M>(
    lines: impl IntoIterator<Item = &'a str>,
    rules: &[Rule<M>],
    model: &mut M,
) -> Vec<String> {
    let mut raw_lines = Vec::new();
    for raw in lines {
        let text = raw.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }

        if claim_line(Line { raw, text }, rules, model) == Claim::Raw {
            raw_lines.push(raw.to_string());
        }
    }

    raw_lines
}

/// Offer one line to an ordered rule list.
///
/// Returns [`Claim::Raw`] when no rule claims the line.
pub(crate) fn claim_line<M>(line: Line<'_>, rules: &[Rule<M>], model: &mut M) -> Claim {
    let claim = rules
        .iter()
        .find_map(|(name, rule)| match rule(line, model) {
            Claim::Pass => None,
            claim => {
                trace!("rule {name} claimed {:?} as {claim:?}", line.text);
                Some(claim)
            }
        })
        .unwrap_or(Claim::Raw);

    if claim == Claim::Raw {
        debug!("preserve unrecognized line {:?}", line.text);
    }

    claim
}

/// Output buffer for canonical file content.
///
/// Sections are only written when they have at least one line, and each
/// written section is followed by a blank line.
#[derive(Debug, Default)]
pub(crate) struct Emitter {
    lines: Vec<String>,
}

impl Emitter {
    /// Start output with a two line header comment.
    pub(crate) fn with_header(title: &str) -> Self {
        let mut emitter = Self::default();
        emitter.line(format!("# {title}"));
        emitter.line("# Managed by Argus");
        emitter.blank();
        emitter
    }

    pub(crate) fn line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub(crate) fn blank(&mut self) {
        self.lines.push(String::new());
    }

    /// Write titled section if there is anything to put in it.
    pub(crate) fn section<I, S>(&mut self, title: &str, body: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut body = body.into_iter().map(Into::into).peekable();
        if body.peek().is_none() {
            return;
        }

        self.line(format!("# {title}"));
        self.lines.extend(body);
        self.blank();
    }

    /// Write preserved raw lines as final section.
    pub(crate) fn raw_lines(&mut self, raw_lines: &[String]) {
        self.section("Additional Configuration", raw_lines.iter().cloned());
    }

    pub(crate) fn finish(self) -> String {
        self.lines.join("\n")
    }
}

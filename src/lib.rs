// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Dotfile round-trip engine and theme scheduler.
//!
//! Argus manages two kinds of desktop configuration. The first is plain text
//! dotfiles for shells, terminals, and prompts: Bash, Zsh, Tmux, Kitty, and
//! Starship. Each format can be parsed into a structured model, edited, and
//! written back out without losing anything the parser did not understand.
//! The second is a multi-app theming system: a base palette, a table of
//! semantic tokens that reference palette slots, and a schedule that decides
//! which theme and variant should be active on any given day.
//!
//! Both engines operate purely on in-memory data. Reading and writing the
//! actual files is left to the caller.
//!
//! # See Also
//!
//! 1. [`dotfile`]
//! 2. [`theme`]

pub mod dotfile;
pub mod path;
pub mod settings;
pub mod theme;

pub use dotfile::{ConfigKind, DotfileFormat};
pub use theme::{
    palette::{SemanticTokens, ThemePalette},
    schedule::{ScheduleEvaluation, ThemeSchedule},
    Theme,
};

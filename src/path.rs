// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Determine relevent path information for external files that need to be
//! interacted with, or managed in some way.

use crate::dotfile::ConfigKind;

use std::path::PathBuf;

/// Determine absolute path to user's home directory.
///
/// Does not check if the path returned actually exists.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or(NoWayHome)
}

/// Determine default absolute path to Argus configuration directory.
///
/// Uses XDG Base Directory path `$XDG_CONFIG_HOME/argus`. Does not check if
/// the path returned actually exists.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
///
/// # See Also
///
/// - [XDG Base Directory](https://wiki.archlinux.org/title/XDG_Base_Directory)
pub fn default_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|path| path.join("argus"))
        .ok_or(NoWayHome)
}

/// Determine default absolute path to settings file.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
pub fn default_settings_file() -> Result<PathBuf> {
    default_config_dir().map(|path| path.join("argus.toml"))
}

/// Determine default absolute path to theme directory.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
pub fn default_themes_dir() -> Result<PathBuf> {
    default_config_dir().map(|path| path.join("themes"))
}

/// Determine default absolute path to theme schedule file.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
pub fn default_schedule_file() -> Result<PathBuf> {
    default_themes_dir().map(|path| path.join("schedule.json"))
}

/// Determine default absolute path of a managed dotfile.
///
/// Shell configurations live directly in the home directory, terminal and
/// prompt configurations live under `~/.config`.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
pub fn default_dotfile(kind: ConfigKind) -> Result<PathBuf> {
    let home = home_dir()?;
    let path = match kind {
        ConfigKind::Bash => home.join(".bashrc"),
        ConfigKind::Zsh => home.join(".zshrc"),
        ConfigKind::Tmux => home.join(".tmux.conf"),
        ConfigKind::Kitty => home.join(".config").join("kitty").join("kitty.conf"),
        ConfigKind::Starship => home.join(".config").join("starship.toml"),
    };

    Ok(path)
}

/// No way to determine user's home directory.
///
/// # See Also
///
/// - [`dirs::home_dir`](https://docs.rs/dirs/latest/dirs/fn.home_dir.html)
#[derive(Clone, Debug, thiserror::Error)]
#[error("cannot determine absolute path to user's home directory")]
pub struct NoWayHome;

/// Friendly result alias :3
pub type Result<T, E = NoWayHome> = std::result::Result<T, E>;

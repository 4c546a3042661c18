// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Settings file layout.
//!
//! Specify the layout of `argus.toml`, the settings file that tells Argus
//! where themes, the theme schedule, and managed dotfiles live. File I/O is
//! left to the caller to figure out.
//!
//! # General Layout
//!
//! Every entry is optional. Missing entries fall back to the default
//! locations given by the [`path`](crate::path) module. Paths are shell
//! expanded on load, so `~` and environment variables may be used freely:
//!
//! ```toml
//! themes_dir = "$XDG_DATA_HOME/argus/themes"
//! schedule = "~/.config/argus/themes/schedule.json"
//!
//! [files]
//! bash = "~/.config/bash/bashrc"
//! kitty = "~/.config/kitty/kitty.conf"
//! ```

use crate::{
    dotfile::ConfigKind,
    path::{default_dotfile, default_schedule_file, default_themes_dir, NoWayHome},
};

use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    path::PathBuf,
    str::FromStr,
};

/// Layout of `argus.toml`.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct Settings {
    /// Directory holding theme JSON files.
    pub themes_dir: Option<String>,

    /// Path to theme schedule JSON file.
    pub schedule: Option<String>,

    /// Locations of managed dotfiles.
    pub files: Option<DotfilePaths>,
}

impl Settings {
    /// Absolute path to theme directory.
    ///
    /// # Errors
    ///
    /// - Return [`SettingsError::NoWayHome`] if default location cannot be
    ///   determined.
    pub fn themes_dir(&self) -> Result<PathBuf> {
        match &self.themes_dir {
            Some(path) => Ok(PathBuf::from(path)),
            None => Ok(default_themes_dir()?),
        }
    }

    /// Absolute path to theme schedule file.
    ///
    /// # Errors
    ///
    /// - Return [`SettingsError::NoWayHome`] if default location cannot be
    ///   determined.
    pub fn schedule(&self) -> Result<PathBuf> {
        match &self.schedule {
            Some(path) => Ok(PathBuf::from(path)),
            None => Ok(default_schedule_file()?),
        }
    }

    /// Absolute path to theme file with given identifier.
    ///
    /// # Errors
    ///
    /// - Return [`SettingsError::NoWayHome`] if default location cannot be
    ///   determined.
    pub fn theme_file(&self, id: &str) -> Result<PathBuf> {
        self.themes_dir().map(|dir| dir.join(format!("{id}.json")))
    }

    /// Absolute path to managed dotfile of given kind.
    ///
    /// # Errors
    ///
    /// - Return [`SettingsError::NoWayHome`] if default location cannot be
    ///   determined.
    pub fn dotfile(&self, kind: ConfigKind) -> Result<PathBuf> {
        match self.files.as_ref().and_then(|files| files.get(kind)) {
            Some(path) => Ok(PathBuf::from(path)),
            None => Ok(default_dotfile(kind)?),
        }
    }
}

impl FromStr for Settings {
    type Err = SettingsError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut settings: Settings = toml::de::from_str(data).map_err(SettingsError::Deserialize)?;

        // INVARIANT: Perform shell expansion on every path.
        expand(&mut settings.themes_dir)?;
        expand(&mut settings.schedule)?;
        if let Some(files) = settings.files.as_mut() {
            for kind in ConfigKind::ALL {
                expand(files.get_mut(kind))?;
            }
        }

        Ok(settings)
    }
}

impl Display for Settings {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::ser::to_string_pretty(self)
                .map_err(SettingsError::Serialize)?
                .as_str(),
        )
    }
}

fn expand(path: &mut Option<String>) -> Result<()> {
    if let Some(path) = path.as_mut() {
        *path = shellexpand::full(path.as_str())
            .map_err(SettingsError::ShellExpansion)?
            .into_owned();
    }

    Ok(())
}

/// Per-kind dotfile locations.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct DotfilePaths {
    pub bash: Option<String>,
    pub zsh: Option<String>,
    pub tmux: Option<String>,
    pub kitty: Option<String>,
    pub starship: Option<String>,
}

impl DotfilePaths {
    pub fn get(&self, kind: ConfigKind) -> Option<&str> {
        match kind {
            ConfigKind::Bash => self.bash.as_deref(),
            ConfigKind::Zsh => self.zsh.as_deref(),
            ConfigKind::Tmux => self.tmux.as_deref(),
            ConfigKind::Kitty => self.kitty.as_deref(),
            ConfigKind::Starship => self.starship.as_deref(),
        }
    }

    fn get_mut(&mut self, kind: ConfigKind) -> &mut Option<String> {
        match kind {
            ConfigKind::Bash => &mut self.bash,
            ConfigKind::Zsh => &mut self.zsh,
            ConfigKind::Tmux => &mut self.tmux,
            ConfigKind::Kitty => &mut self.kitty,
            ConfigKind::Starship => &mut self.starship,
        }
    }
}

/// Settings error types.
#[derive(Clone, Debug, thiserror::Error)]
pub enum SettingsError {
    /// Failed to deserialize settings.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize settings.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    /// Failed to perform shell expansion on settings.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),

    /// Failed to determine default location.
    #[error(transparent)]
    NoWayHome(#[from] NoWayHome),
}

impl From<SettingsError> for FmtError {
    fn from(_: SettingsError) -> Self {
        FmtError
    }
}

/// Friendly result alias :3
type Result<T, E = SettingsError> = std::result::Result<T, E>;

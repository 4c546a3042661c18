// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Theme engine.
//!
//! A theme bundles a day and an optional night __variant__. Each variant
//! carries a wallpaper, a base palette, and optionally a partial table of
//! semantic tokens that overrides the default token table. A theme without a
//! night variant simply uses its day variant at night.
//!
//! Themes and schedules are persisted as JSON. Like the rest of Argus, this
//! module only deals with the text of those files, it never touches the file
//! system itself.
//!
//! # See Also
//!
//! 1. [`palette`]
//! 2. [`schedule`]
//! 3. [`validate`]

pub mod palette;
pub mod schedule;
pub mod validate;

use palette::{resolve_all_tokens, SemanticTokens, ThemePalette};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    str::FromStr,
};

/// Which half of the day a variant is meant for.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    #[default]
    Day,
    Night,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Night => "night",
        }
    }
}

impl Display for Variant {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(self.as_str())
    }
}

/// Day or night version of a theme.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeVariant {
    /// Path to wallpaper image.
    #[serde(default)]
    pub wallpaper: String,

    #[serde(default)]
    pub palette: Option<ThemePalette>,

    /// Partial token table merged over the default one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_tokens: Option<SemanticTokens>,
}

impl ThemeVariant {
    /// Construct variant from wallpaper and complete palette.
    pub fn new(wallpaper: impl Into<String>, palette: ThemePalette) -> Self {
        Self { wallpaper: wallpaper.into(), palette: Some(palette), semantic_tokens: None }
    }

    /// Default token table with this variant's overrides applied.
    pub fn tokens(&self) -> SemanticTokens {
        match &self.semantic_tokens {
            Some(overrides) => SemanticTokens::default().merged(overrides),
            None => SemanticTokens::default(),
        }
    }

    /// Resolve every semantic token of this variant into a hex color.
    pub fn resolved_tokens(&self) -> BTreeMap<String, String> {
        let palette = self.palette.clone().unwrap_or_default();
        resolve_all_tokens(&self.tokens(), &palette)
    }
}

/// Variants of a theme.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct ThemeVariants {
    /// Required by validation.
    #[serde(default)]
    pub day: Option<ThemeVariant>,

    /// Falls back to day variant when missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub night: Option<ThemeVariant>,
}

/// Per-application override blocks.
///
/// Contents are free-form, and only interpreted by whatever generates the
/// final configuration of each application.
#[derive(Default, Debug, PartialEq, Clone, Deserialize, Serialize)]
pub struct ThemeApps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hyprland: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waybar: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kitty: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starship: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rofi: Option<serde_json::Value>,
}

/// Complete theme definition.
///
/// # General Layout
///
/// Every theme has an identifier, e.g., `january-frost`, and a display
/// name. The interesting part lives in `variants`, which holds the palettes
/// and wallpapers. Everything else is descriptive metadata used when themes
/// are listed or scheduled.
#[derive(Default, Debug, PartialEq, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Semantic version of the theme.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default)]
    pub variants: ThemeVariants,

    #[serde(default)]
    pub apps: ThemeApps,

    /// Tags used for filtering, e.g., `winter` or `minimal`.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Month (1 through 12) of a monthly theme.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_holiday: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Theme {
    /// Construct theme with default day and night palettes.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        let variant = |palette| ThemeVariant {
            semantic_tokens: Some(SemanticTokens::default()),
            ..ThemeVariant::new("", palette)
        };

        Self {
            id: id.into(),
            name: name.into(),
            description: Some(String::new()),
            version: Some("1.0.0".into()),
            variants: ThemeVariants {
                day: Some(variant(ThemePalette::default_day())),
                night: Some(variant(ThemePalette::default_night())),
            },
            created_at: Some(now),
            updated_at: Some(now),
            ..Default::default()
        }
    }

    /// Variant to use for given half of the day.
    ///
    /// Night falls back to day when the theme has no night variant.
    pub fn variant(&self, which: Variant) -> Option<&ThemeVariant> {
        match which {
            Variant::Day => self.variants.day.as_ref(),
            Variant::Night => self.variants.night.as_ref().or(self.variants.day.as_ref()),
        }
    }

    /// Palette to use for given half of the day.
    ///
    /// Empty night slots are filled in from the day palette.
    pub fn palette(&self, which: Variant) -> ThemePalette {
        let palette_of = |variant: Option<&ThemeVariant>| {
            variant.and_then(|variant| variant.palette.clone()).unwrap_or_default()
        };

        let day = palette_of(self.variants.day.as_ref());
        match which {
            Variant::Day => day,
            Variant::Night => day.merged(&palette_of(self.variants.night.as_ref())),
        }
    }

    /// Resolve semantic tokens for given half of the day.
    pub fn resolved_tokens(&self, which: Variant) -> BTreeMap<String, String> {
        let tokens = self.variant(which).map(ThemeVariant::tokens).unwrap_or_default();
        resolve_all_tokens(&tokens, &self.palette(which))
    }

    /// Summarize theme for listings.
    pub fn metadata(&self) -> ThemeMetadata {
        ThemeMetadata {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            author: self.author.clone(),
            version: self.version.clone(),
            tags: self.tags.clone(),
            month: self.month,
            is_holiday: self.is_holiday,
            day_wallpaper: self
                .variants
                .day
                .as_ref()
                .map(|day| day.wallpaper.clone())
                .unwrap_or_default(),
            night_wallpaper: self.variants.night.as_ref().map(|night| night.wallpaper.clone()),
            accent_color: self.palette(Variant::Day).accent,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl FromStr for Theme {
    type Err = ThemeError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(data).map_err(ThemeError::Deserialize)
    }
}

impl Display for Theme {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            serde_json::to_string_pretty(self)
                .map_err(ThemeError::Serialize)?
                .as_str(),
        )
    }
}

/// Listing summary of a theme.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeMetadata {
    pub id: String,
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    pub tags: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_holiday: Option<bool>,

    pub day_wallpaper: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub night_wallpaper: Option<String>,

    /// Day accent color for previews.
    pub accent_color: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Theme error types.
#[derive(Debug, thiserror::Error)]
pub enum ThemeError {
    /// Failed to deserialize theme.
    #[error(transparent)]
    Deserialize(serde_json::Error),

    /// Failed to serialize theme.
    #[error(transparent)]
    Serialize(serde_json::Error),
}

impl From<ThemeError> for FmtError {
    fn from(_: ThemeError) -> Self {
        FmtError
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palette::PaletteSlot;
    use pretty_assertions::assert_eq;

    #[test]
    fn deserialize_theme() -> anyhow::Result<()> {
        let result: Theme = r##"{
            "id": "january-frost",
            "name": "January Frost",
            "author": "blah",
            "variants": {
                "day": {
                    "wallpaper": "~/Pictures/frost-day.png",
                    "palette": { "base": "#eff1f5", "accent": "#04a5e5" },
                    "semanticTokens": { "primary": "teal" }
                }
            },
            "apps": { "kitty": { "background_opacity": "0.9" } },
            "tags": ["winter", "cool"],
            "month": 1,
            "createdAt": "2025-01-01T00:00:00Z"
        }"##
        .parse()?;

        assert_eq!(result.id, "january-frost");
        assert_eq!(result.month, Some(1));
        assert_eq!(result.variants.night, None);
        assert_eq!(
            result.apps.kitty,
            Some(serde_json::json!({ "background_opacity": "0.9" }))
        );

        let day = result.variant(Variant::Day).unwrap();
        assert_eq!(day.tokens().get("primary"), Some("teal"));
        assert_eq!(day.tokens().get("error"), Some("red"));
        assert_eq!(result.created_at.map(|at| at.to_rfc3339()), Some("2025-01-01T00:00:00+00:00".into()));

        Ok(())
    }

    #[test]
    fn theme_json_round_trip() -> anyhow::Result<()> {
        let theme = Theme::new("blah", "Blah");
        let result: Theme = theme.to_string().parse()?;
        assert_eq!(result, theme);
        Ok(())
    }

    #[test]
    fn new_theme_has_complete_variants() {
        let theme = Theme::new("blah", "Blah");
        assert_eq!(theme.version.as_deref(), Some("1.0.0"));
        assert_eq!(theme.palette(Variant::Day), ThemePalette::default_day());
        assert_eq!(theme.palette(Variant::Night), ThemePalette::default_night());
        assert_eq!(
            theme.resolved_tokens(Variant::Night).get("activeBorder").map(String::as_str),
            Some("#8aadf4")
        );
    }

    #[test]
    fn night_falls_back_to_day() {
        let mut theme = Theme::new("blah", "Blah");
        theme.variants.night = None;

        assert_eq!(theme.variant(Variant::Night), theme.variant(Variant::Day));
        assert_eq!(theme.palette(Variant::Night), ThemePalette::default_day());
    }

    #[test]
    fn partial_night_palette_fills_from_day() {
        let mut theme = Theme::new("blah", "Blah");
        theme.variants.night = Some(ThemeVariant::new(
            "night.png",
            ThemePalette { base: "#000000".into(), ..Default::default() },
        ));

        let result = theme.palette(Variant::Night);
        assert_eq!(result.base, "#000000");
        assert_eq!(result.get(PaletteSlot::Accent), "#1e66f5");
    }

    #[test]
    fn metadata_summarizes_theme() {
        let mut theme = Theme::new("blah", "Blah");
        theme.variants.day.as_mut().unwrap().wallpaper = "day.png".into();
        theme.variants.night.as_mut().unwrap().wallpaper = "night.png".into();

        let result = theme.metadata();
        assert_eq!(result.day_wallpaper, "day.png");
        assert_eq!(result.night_wallpaper.as_deref(), Some("night.png"));
        assert_eq!(result.accent_color, "#1e66f5");
    }

    #[test]
    fn reject_malformed_theme() {
        assert!("{ not json".parse::<Theme>().is_err());
    }
}

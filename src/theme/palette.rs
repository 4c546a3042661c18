// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Base palettes and semantic tokens.
//!
//! A palette holds the actual hex colors of a theme variant in seventeen
//! fixed slots. Semantic tokens never hold colors themselves. Instead, each
//! token names the palette slot it should take its color from, so the same
//! token table works for every palette.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::{
    collections::{btree_map, BTreeMap},
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
    sync::LazyLock,
};

static HEX_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#([0-9A-Fa-f]{6}|[0-9A-Fa-f]{8})$").expect("valid hex color pattern")
});

static COLOR_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z0-9]+)\}").expect("valid color reference pattern"));

/// Base color palette of a theme variant.
///
/// Slots missing from serialized data come back as empty strings, so an
/// incomplete palette can still be loaded and reported on by validation.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ThemePalette {
    pub base: String,
    pub mantle: String,
    pub crust: String,
    pub surface0: String,
    pub surface1: String,
    pub surface2: String,
    pub text: String,
    pub subtext0: String,
    pub subtext1: String,
    pub accent: String,
    pub secondary: String,
    pub red: String,
    pub green: String,
    pub yellow: String,
    pub blue: String,
    pub pink: String,
    pub teal: String,
}

impl ThemePalette {
    /// Light palette used for new day variants.
    pub fn default_day() -> Self {
        Self::from_slots([
            "#eff1f5", "#e6e9ef", "#dce0e8", "#ccd0da", "#bcc0cc", "#acb0be", "#4c4f69", "#5c5f77",
            "#6c6f85", "#1e66f5", "#7287fd", "#d20f39", "#40a02b", "#df8e1d", "#1e66f5", "#ea76cb",
            "#179299",
        ])
    }

    /// Dark palette used for new night variants.
    pub fn default_night() -> Self {
        Self::from_slots([
            "#24273a", "#1e2030", "#181926", "#363a4f", "#494d64", "#5b6078", "#cad3f5", "#a5adcb",
            "#8087a2", "#8aadf4", "#b7bdf8", "#ed8796", "#a6da95", "#eed49f", "#8aadf4", "#f5bde6",
            "#8bd5ca",
        ])
    }

    // INVARIANT: Colors are given in the order of PaletteSlot::ALL.
    fn from_slots(colors: [&str; 17]) -> Self {
        let mut palette = Self::default();
        for (slot, color) in PaletteSlot::ALL.into_iter().zip(colors) {
            *palette.get_mut(slot) = color.to_string();
        }

        palette
    }

    /// Color held by given slot.
    pub fn get(&self, slot: PaletteSlot) -> &str {
        match slot {
            PaletteSlot::Base => &self.base,
            PaletteSlot::Mantle => &self.mantle,
            PaletteSlot::Crust => &self.crust,
            PaletteSlot::Surface0 => &self.surface0,
            PaletteSlot::Surface1 => &self.surface1,
            PaletteSlot::Surface2 => &self.surface2,
            PaletteSlot::Text => &self.text,
            PaletteSlot::Subtext0 => &self.subtext0,
            PaletteSlot::Subtext1 => &self.subtext1,
            PaletteSlot::Accent => &self.accent,
            PaletteSlot::Secondary => &self.secondary,
            PaletteSlot::Red => &self.red,
            PaletteSlot::Green => &self.green,
            PaletteSlot::Yellow => &self.yellow,
            PaletteSlot::Blue => &self.blue,
            PaletteSlot::Pink => &self.pink,
            PaletteSlot::Teal => &self.teal,
        }
    }

    /// Mutable access to color held by given slot.
    pub fn get_mut(&mut self, slot: PaletteSlot) -> &mut String {
        match slot {
            PaletteSlot::Base => &mut self.base,
            PaletteSlot::Mantle => &mut self.mantle,
            PaletteSlot::Crust => &mut self.crust,
            PaletteSlot::Surface0 => &mut self.surface0,
            PaletteSlot::Surface1 => &mut self.surface1,
            PaletteSlot::Surface2 => &mut self.surface2,
            PaletteSlot::Text => &mut self.text,
            PaletteSlot::Subtext0 => &mut self.subtext0,
            PaletteSlot::Subtext1 => &mut self.subtext1,
            PaletteSlot::Accent => &mut self.accent,
            PaletteSlot::Secondary => &mut self.secondary,
            PaletteSlot::Red => &mut self.red,
            PaletteSlot::Green => &mut self.green,
            PaletteSlot::Yellow => &mut self.yellow,
            PaletteSlot::Blue => &mut self.blue,
            PaletteSlot::Pink => &mut self.pink,
            PaletteSlot::Teal => &mut self.teal,
        }
    }

    /// Iterate over every slot and its color in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (PaletteSlot, &str)> + '_ {
        PaletteSlot::ALL.into_iter().map(|slot| (slot, self.get(slot)))
    }

    /// Layer another palette on top of this one.
    ///
    /// Non-empty slots of `overrides` win, empty slots keep the color of
    /// `self`.
    pub fn merged(&self, overrides: &ThemePalette) -> Self {
        let mut palette = self.clone();
        for (slot, color) in overrides.iter() {
            if !color.is_empty() {
                *palette.get_mut(slot) = color.to_string();
            }
        }

        palette
    }
}

/// Named slot of a [`ThemePalette`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PaletteSlot {
    Base,
    Mantle,
    Crust,
    Surface0,
    Surface1,
    Surface2,
    Text,
    Subtext0,
    Subtext1,
    Accent,
    Secondary,
    Red,
    Green,
    Yellow,
    Blue,
    Pink,
    Teal,
}

impl PaletteSlot {
    /// Every slot in canonical order.
    pub const ALL: [PaletteSlot; 17] = [
        PaletteSlot::Base,
        PaletteSlot::Mantle,
        PaletteSlot::Crust,
        PaletteSlot::Surface0,
        PaletteSlot::Surface1,
        PaletteSlot::Surface2,
        PaletteSlot::Text,
        PaletteSlot::Subtext0,
        PaletteSlot::Subtext1,
        PaletteSlot::Accent,
        PaletteSlot::Secondary,
        PaletteSlot::Red,
        PaletteSlot::Green,
        PaletteSlot::Yellow,
        PaletteSlot::Blue,
        PaletteSlot::Pink,
        PaletteSlot::Teal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Mantle => "mantle",
            Self::Crust => "crust",
            Self::Surface0 => "surface0",
            Self::Surface1 => "surface1",
            Self::Surface2 => "surface2",
            Self::Text => "text",
            Self::Subtext0 => "subtext0",
            Self::Subtext1 => "subtext1",
            Self::Accent => "accent",
            Self::Secondary => "secondary",
            Self::Red => "red",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Blue => "blue",
            Self::Pink => "pink",
            Self::Teal => "teal",
        }
    }
}

impl Display for PaletteSlot {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(self.as_str())
    }
}

impl FromStr for PaletteSlot {
    type Err = UnknownPaletteSlot;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|slot| slot.as_str() == data)
            .ok_or_else(|| UnknownPaletteSlot(data.into()))
    }
}

/// Given name is not one of the seventeen palette slots.
#[derive(Clone, Debug, thiserror::Error)]
#[error("unknown palette slot {0:?}")]
pub struct UnknownPaletteSlot(pub String);

/// Table of semantic token names to palette slot names.
///
/// The [`Default`] table covers window manager, status bar, terminal, and
/// interface roles. Theme variants usually carry a partial table that is
/// merged over the default one.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(transparent)]
pub struct SemanticTokens(BTreeMap<String, String>);

impl SemanticTokens {
    /// Empty token table.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Palette slot name that a token refers to.
    pub fn get(&self, token: &str) -> Option<&str> {
        self.0.get(token).map(String::as_str)
    }

    /// Point token at palette slot name.
    pub fn insert(&mut self, token: impl Into<String>, slot: impl Into<String>) {
        self.0.insert(token.into(), slot.into());
    }

    /// Layer partial table on top of this one, entries of `overrides` win.
    pub fn merged(&self, overrides: &SemanticTokens) -> Self {
        let mut tokens = self.clone();
        for (token, slot) in overrides.iter() {
            tokens.insert(token, slot);
        }

        tokens
    }

    /// Iterate over token and slot name pairs ordered by token name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.0.iter().map(|(token, slot)| (token.as_str(), slot.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for SemanticTokens {
    fn default() -> Self {
        DEFAULT_SEMANTIC_TOKENS.iter().copied().collect()
    }
}

impl<K, V> FromIterator<(K, V)> for SemanticTokens
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(token, slot)| (token.into(), slot.into())).collect())
    }
}

impl IntoIterator for SemanticTokens {
    type Item = (String, String);
    type IntoIter = btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

const DEFAULT_SEMANTIC_TOKENS: &[(&str, &str)] = &[
    // Window manager.
    ("activeBorder", "accent"),
    ("inactiveBorder", "surface1"),
    ("shadow", "crust"),
    // Status bar.
    ("barBackground", "base"),
    ("barForeground", "text"),
    ("workspaceActive", "accent"),
    ("workspaceEmpty", "surface0"),
    ("workspaceVisible", "surface1"),
    ("workspaceUrgent", "red"),
    // Terminal.
    ("cursorColor", "accent"),
    ("selectionBg", "surface2"),
    ("selectionFg", "text"),
    // Interface.
    ("primary", "accent"),
    ("secondary", "secondary"),
    ("success", "green"),
    ("warning", "yellow"),
    ("error", "red"),
    ("info", "blue"),
    ("bgPrimary", "base"),
    ("bgSecondary", "mantle"),
    ("bgTertiary", "crust"),
    ("bgElevated", "surface0"),
    ("bgHover", "surface1"),
    ("bgActive", "surface2"),
    ("textPrimary", "text"),
    ("textSecondary", "subtext0"),
    ("textMuted", "subtext1"),
    ("textDisabled", "surface2"),
    ("textOnAccent", "base"),
    ("border", "surface1"),
    ("borderSubtle", "surface0"),
    ("divider", "surface0"),
    ("buttonPrimary", "accent"),
    ("buttonSecondary", "surface1"),
    ("buttonHover", "surface2"),
    ("inputBg", "surface0"),
    ("inputBorder", "surface1"),
    ("inputFocus", "accent"),
    ("toastBg", "surface0"),
    ("toastBorder", "surface1"),
    ("toastSuccess", "green"),
    ("toastWarning", "yellow"),
    ("toastError", "red"),
    ("toastInfo", "blue"),
    ("cardBg", "surface0"),
    ("cardBorder", "surface1"),
    ("cardHeaderBg", "surface1"),
    ("navBg", "mantle"),
    ("navItemHover", "surface0"),
    ("navItemActive", "surface1"),
    ("navAccent", "accent"),
    ("authBg", "base"),
    ("authCardBg", "surface0"),
    ("authAccent", "accent"),
];

/// Look up palette slot by name.
///
/// Returns `None` when `slot` is not one of the seventeen slot names.
pub fn resolve_token<'p>(slot: &str, palette: &'p ThemePalette) -> Option<&'p str> {
    slot.parse::<PaletteSlot>().ok().map(|slot| palette.get(slot))
}

/// Resolve every token of a table into a hex color.
///
/// Tokens pointing at unknown slots or at empty slots are left out.
pub fn resolve_all_tokens(
    tokens: &SemanticTokens,
    palette: &ThemePalette,
) -> BTreeMap<String, String> {
    tokens
        .iter()
        .filter_map(|(token, slot)| match resolve_token(slot, palette) {
            Some(color) if !color.is_empty() => Some((token.to_string(), color.to_string())),
            _ => None,
        })
        .collect()
}

/// Check for `#RRGGBB` or `#RRGGBBAA` color.
pub fn is_valid_hex_color(color: &str) -> bool {
    HEX_COLOR.is_match(color)
}

/// Give hex color an alpha channel.
///
/// An existing alpha channel of a `#RRGGBBAA` color is replaced. Alpha is
/// clamped into `[0, 1]`.
pub fn hex_with_alpha(hex: &str, alpha: f64) -> String {
    let base = if hex.len() == 9 { hex.get(..7).unwrap_or(hex) } else { hex };
    let alpha = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!("{base}{alpha:02x}")
}

/// Replace `{slot}` placeholders with palette colors.
///
/// Placeholders that do not name a palette slot are left untouched.
pub fn expand_color_refs(template: &str, palette: &ThemePalette) -> String {
    COLOR_REF
        .replace_all(template, |caps: &Captures<'_>| match resolve_token(&caps[1], palette) {
            Some(color) => color.to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Structural validation of themes.
//!
//! Validation never fails outright. Every problem found is collected into a
//! [`Validation`] report as a human readable message, and the caller decides
//! what to do about it.

use super::{
    palette::{is_valid_hex_color, PaletteSlot, ThemePalette},
    Theme,
};

use serde::{Deserialize, Serialize};

/// Result of a validation pass.
#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Validation {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl Validation {
    /// Build report from collected error messages.
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self { valid: errors.is_empty(), errors }
    }
}

/// Check that a theme has everything needed to be applied.
///
/// Requires an identifier, a name, a day variant with a palette, and a
/// non-empty color in every palette slot. Colors are not checked for hex
/// syntax, see [`invalid_hex_slots`] for that.
pub fn validate_theme(theme: &Theme) -> Validation {
    let mut errors = Vec::new();

    if theme.id.trim().is_empty() {
        errors.push("Theme ID is required".to_string());
    }

    if theme.name.trim().is_empty() {
        errors.push("Theme name is required".to_string());
    }

    match &theme.variants.day {
        None => errors.push("Day variant is required".to_string()),
        Some(day) => match &day.palette {
            None => errors.push("Day variant must have a palette".to_string()),
            Some(palette) => errors.extend(
                palette
                    .iter()
                    .filter(|(_, color)| color.is_empty())
                    .map(|(slot, _)| format!("Palette missing required color: {slot}")),
            ),
        },
    }

    Validation::from_errors(errors)
}

/// Palette slots whose colors are not valid hex colors.
///
/// Empty slots are left to [`validate_theme`].
pub fn invalid_hex_slots(palette: &ThemePalette) -> Vec<PaletteSlot> {
    palette
        .iter()
        .filter(|(_, color)| !color.is_empty() && !is_valid_hex_color(color))
        .map(|(slot, _)| slot)
        .collect()
}

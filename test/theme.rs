// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use argus::theme::{
    palette::{expand_color_refs, hex_with_alpha, ThemePalette},
    schedule::{
        evaluate_schedule, validate_schedule_for_month, ChangeKind, FixedDaylight,
        ScheduleEvaluation, SelectionReason, ThemeSchedule,
    },
    validate::validate_theme,
    Theme, Variant,
};

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use pretty_assertions::assert_eq;
use simple_test_case::test_case;

fn at(date: &str) -> NaiveDateTime {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|date| date.and_hms_opt(10, 0, 0).unwrap_or_default())
        .unwrap_or_default()
}

#[test]
fn theme_file_round_trip() -> Result<()> {
    let mut theme = Theme::new("january-frost", "January Frost");
    theme.tags = vec!["winter".into(), "cool".into()];
    theme.month = Some(1);

    let result: Theme = theme.to_string().parse()?;
    assert_eq!(result, theme);
    assert!(validate_theme(&result).valid);

    Ok(())
}

#[test]
fn night_variant_resolves_against_merged_palette() -> Result<()> {
    let theme: Theme = r##"{
        "id": "dusk",
        "name": "Dusk",
        "variants": {
            "day": { "wallpaper": "day.png", "palette": {
                "base": "#eff1f5", "mantle": "#e6e9ef", "crust": "#dce0e8",
                "surface0": "#ccd0da", "surface1": "#bcc0cc", "surface2": "#acb0be",
                "text": "#4c4f69", "subtext0": "#5c5f77", "subtext1": "#6c6f85",
                "accent": "#1e66f5", "secondary": "#7287fd", "red": "#d20f39",
                "green": "#40a02b", "yellow": "#df8e1d", "blue": "#1e66f5",
                "pink": "#ea76cb", "teal": "#179299"
            } },
            "night": { "wallpaper": "night.png", "palette": { "base": "#24273a" } }
        }
    }"##
    .parse()?;

    let day = theme.resolved_tokens(Variant::Day);
    let night = theme.resolved_tokens(Variant::Night);
    assert_eq!(day.get("barBackground").map(String::as_str), Some("#eff1f5"));
    assert_eq!(night.get("barBackground").map(String::as_str), Some("#24273a"));
    assert_eq!(night.get("activeBorder"), day.get("activeBorder"));

    let palette = theme.palette(Variant::Night);
    assert_eq!(
        expand_color_refs("background {base} foreground {text} {unknown}", &palette),
        "background #24273a foreground #4c4f69 {unknown}"
    );
    assert_eq!(hex_with_alpha(&palette.base, 0.5), "#24273a80");

    let metadata = theme.metadata();
    assert_eq!(metadata.day_wallpaper, "day.png");
    assert_eq!(metadata.night_wallpaper.as_deref(), Some("night.png"));
    assert_eq!(metadata.accent_color, "#1e66f5");

    Ok(())
}

#[test]
fn theme_without_night_variant_falls_back_to_day() {
    let mut theme = Theme::new("plain", "Plain");
    theme.variants.night = None;

    assert_eq!(theme.palette(Variant::Night), ThemePalette::default_day());
    assert_eq!(theme.resolved_tokens(Variant::Night), theme.resolved_tokens(Variant::Day));
}

#[test_case("2025-03-10", "march-spring", SelectionReason::Monthly, None, "2025-07-01"; "monthly")]
#[test_case("2025-07-04", "independence-day", SelectionReason::Holiday, Some("Independence Day"), "2025-07-08"; "holiday")]
#[test_case("2025-12-20", "christmas", SelectionReason::Holiday, Some("Christmas"), "2025-12-27"; "christmas")]
#[test_case("2025-12-31", "new-year", SelectionReason::Holiday, Some("New Year"), "2026-01-03"; "new year entered")]
#[test_case("2026-01-01", "new-year", SelectionReason::Holiday, Some("New Year"), "2026-07-01"; "new year wrapped")]
#[test]
fn seasonal_schedule_at_night(
    date: &str,
    theme: &str,
    reason: SelectionReason,
    holiday: Option<&str>,
    next: &str,
) {
    let now = at(date);
    let result = evaluate_schedule(now, &ThemeSchedule::seasonal(), &FixedDaylight::night());

    let expect = ScheduleEvaluation {
        theme_id: theme.into(),
        variant: Variant::Night,
        reason,
        holiday: holiday.map(str::to_string),
        next_change: Some(at(next).date().and_hms_opt(0, 0, 0).unwrap_or_default()),
        next_change_type: Some(ChangeKind::Theme),
    };
    pretty_assertions::assert_eq!(result, expect);
}

#[test]
fn daylight_transition_comes_first() {
    let now = at("2025-03-10");
    let sunset = now.date().and_hms_opt(18, 30, 0).unwrap_or_default();
    let daylight = FixedDaylight { is_day: true, next_transition: Some(sunset) };

    let result = evaluate_schedule(now, &ThemeSchedule::seasonal(), &daylight);
    assert_eq!(result.variant, Variant::Day);
    assert_eq!(result.next_change, Some(sunset));
    assert_eq!(result.next_change_type, Some(ChangeKind::Variant));
}

#[test]
fn schedule_file_round_trip() -> Result<()> {
    let schedule: ThemeSchedule = r#"{
        "defaultMode": "monthly",
        "dayNightEnabled": false,
        "fixedVariant": "night",
        "monthly": { "1": "january-frost", "2": "february-hearts" },
        "holidays": [
            { "name": "Birthday", "theme": "party", "startDate": "02-10",
              "endDate": "02-12", "year": 2025 }
        ]
    }"#
    .parse()?;

    assert_eq!(schedule.to_string().parse::<ThemeSchedule>()?, schedule);

    let result = evaluate_schedule(at("2025-02-11"), &schedule, &FixedDaylight::day());
    assert_eq!(result.theme_id, "party");
    assert_eq!(result.variant, Variant::Night);

    let result = evaluate_schedule(at("2026-02-11"), &schedule, &FixedDaylight::day());
    assert_eq!(result.theme_id, "february-hearts");
    assert_eq!(result.reason, SelectionReason::Monthly);

    let validation = validate_schedule_for_month(&schedule, 3);
    assert!(!validation.valid);

    Ok(())
}

// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Theme scheduling.
//!
//! A schedule decides which theme should be active on a given date, and
//! whether its day or night variant should be showing. Theme selection
//! follows a fixed precedence:
//!
//! 1. A fixed theme, when the schedule is in fixed mode.
//! 2. The first enabled holiday whose date range contains the date.
//! 3. The theme assigned to the calendar month.
//!
//! Holiday ranges are written as `MM-DD` boundaries without a year, so a
//! range whose start comes after its end wraps around New Year.
//!
//! Sunrise and sunset are not computed here. Day and night answers come from
//! a [`Daylight`] implementation supplied by the caller.

use super::{validate::Validation, Variant};

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    str::FromStr,
    sync::LazyLock,
};
use tracing::{debug, instrument};

static MONTH_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}-\d{2}$").expect("valid month day pattern"));

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// How themes get picked.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleMode {
    /// Pick by holiday, then by calendar month.
    #[default]
    Monthly,

    /// No automatic theme switching.
    Manual,

    /// Always use one theme.
    Fixed,
}

/// Geographic location for sunrise and sunset.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Location {
    /// Decimal degrees.
    pub latitude: f64,

    /// Decimal degrees.
    pub longitude: f64,

    /// IANA time zone name, e.g., `America/New_York`.
    pub timezone: String,
}

impl Default for Location {
    fn default() -> Self {
        Self { latitude: 40.7128, longitude: -74.006, timezone: "America/New_York".into() }
    }
}

/// Theme assignments per calendar month.
///
/// Months are numbered 1 through 12, and are serialized as the JSON keys
/// `"1"` through `"12"`. Empty assignments count as unassigned.
#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct MonthlyThemes(BTreeMap<u32, String>);

impl MonthlyThemes {
    /// Theme assigned to given month.
    pub fn get(&self, month: u32) -> Option<&str> {
        self.0
            .get(&month)
            .map(String::as_str)
            .filter(|theme| (1..=12).contains(&month) && !theme.is_empty())
    }

    /// Assign theme to given month.
    ///
    /// Months outside of 1 through 12 are ignored.
    pub fn set(&mut self, month: u32, theme: impl Into<String>) {
        if (1..=12).contains(&month) {
            self.0.insert(month, theme.into());
        }
    }

    /// Iterate over assigned months from January through December.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> + '_ {
        (1..=12).filter_map(|month| self.get(month).map(|theme| (month, theme)))
    }
}

impl<S: Into<String>> FromIterator<(u32, S)> for MonthlyThemes {
    fn from_iter<I: IntoIterator<Item = (u32, S)>>(iter: I) -> Self {
        let mut monthly = Self::default();
        for (month, theme) in iter {
            monthly.set(month, theme);
        }

        monthly
    }
}

/// Holiday override.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeHoliday {
    /// Display name.
    pub name: String,

    /// Theme to use while the holiday lasts.
    pub theme: String,

    /// First day in `MM-DD` form.
    pub start_date: String,

    /// Last day in `MM-DD` form.
    pub end_date: String,

    /// Only apply in this year when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,

    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

impl ThemeHoliday {
    /// Construct recurring, enabled holiday.
    pub fn new(
        name: impl Into<String>,
        theme: impl Into<String>,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            theme: theme.into(),
            start_date: start_date.into(),
            end_date: end_date.into(),
            year: None,
            enabled: true,
        }
    }

    fn applies_in(&self, year: i32) -> bool {
        self.enabled && self.year.map_or(true, |only| only == year)
    }
}

fn enabled_by_default() -> bool {
    true
}

/// Complete schedule configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeSchedule {
    #[serde(default)]
    pub default_mode: ScheduleMode,

    #[serde(default)]
    pub location: Location,

    /// Switch between day and night variants automatically.
    #[serde(default = "enabled_by_default")]
    pub day_night_enabled: bool,

    /// Minutes added to sunrise.
    #[serde(default)]
    pub sunrise_offset: i32,

    /// Minutes added to sunset.
    #[serde(default)]
    pub sunset_offset: i32,

    #[serde(default)]
    pub monthly: MonthlyThemes,

    /// Holiday overrides, scanned in order.
    #[serde(default)]
    pub holidays: Vec<ThemeHoliday>,

    /// Theme used in fixed mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_theme: Option<String>,

    /// Variant used when day and night switching is off.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_variant: Option<Variant>,
}

impl ThemeSchedule {
    /// Seasonal schedule with a theme per month and the usual holidays.
    pub fn seasonal() -> Self {
        Self {
            monthly: MonthlyThemes::from_iter([
                (1, "january-frost"),
                (2, "february-hearts"),
                (3, "march-spring"),
                (4, "april-rain"),
                (5, "may-bloom"),
                (6, "june-summer"),
                (7, "july-fireworks"),
                (8, "august-heat"),
                (9, "september-harvest"),
                (10, "october-autumn"),
                (11, "november-cozy"),
                (12, "december-winter"),
            ]),
            holidays: vec![
                ThemeHoliday::new("Independence Day", "independence-day", "07-01", "07-07"),
                ThemeHoliday::new("Thanksgiving", "thanksgiving", "11-20", "11-30"),
                ThemeHoliday::new("Christmas", "christmas", "12-15", "12-26"),
                ThemeHoliday::new("New Year", "new-year", "12-30", "01-02"),
            ],
            ..Default::default()
        }
    }
}

impl Default for ThemeSchedule {
    fn default() -> Self {
        Self {
            default_mode: ScheduleMode::default(),
            location: Location::default(),
            day_night_enabled: true,
            sunrise_offset: 0,
            sunset_offset: 0,
            monthly: MonthlyThemes::default(),
            holidays: Vec::new(),
            fixed_theme: None,
            fixed_variant: None,
        }
    }
}

impl FromStr for ThemeSchedule {
    type Err = ScheduleError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(data).map_err(ScheduleError::Deserialize)
    }
}

impl Display for ThemeSchedule {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            serde_json::to_string_pretty(self)
                .map_err(ScheduleError::Serialize)?
                .as_str(),
        )
    }
}

/// Why a theme was selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionReason {
    Monthly,
    Holiday,
    Fixed,
    Manual,
}

/// Theme picked for a date.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeSelection {
    pub theme_id: String,
    pub reason: SelectionReason,

    /// Name of the holiday that won.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holiday: Option<String>,
}

/// What changes at the next scheduled change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Theme,
    Variant,
}

/// Next scheduled change.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NextChange {
    pub time: NaiveDateTime,

    #[serde(rename = "type")]
    pub kind: ChangeKind,

    pub reason: String,
}

/// Full answer of schedule evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEvaluation {
    pub theme_id: String,
    pub variant: Variant,
    pub reason: SelectionReason,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holiday: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_change: Option<NaiveDateTime>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_change_type: Option<ChangeKind>,
}

/// Source of sunrise and sunset answers.
pub trait Daylight {
    /// Whether it is day at given time for the schedule's location and
    /// offsets.
    fn is_daytime(&self, schedule: &ThemeSchedule, at: NaiveDateTime) -> bool;

    /// Next sunrise or sunset after given time.
    fn next_transition(&self, schedule: &ThemeSchedule, at: NaiveDateTime)
        -> Option<NaiveDateTime>;
}

/// Daylight answers already known to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDaylight {
    pub is_day: bool,
    pub next_transition: Option<NaiveDateTime>,
}

impl FixedDaylight {
    pub fn day() -> Self {
        Self { is_day: true, next_transition: None }
    }

    pub fn night() -> Self {
        Self { is_day: false, next_transition: None }
    }
}

impl Daylight for FixedDaylight {
    fn is_daytime(&self, _: &ThemeSchedule, _: NaiveDateTime) -> bool {
        self.is_day
    }

    fn next_transition(&self, _: &ThemeSchedule, _: NaiveDateTime) -> Option<NaiveDateTime> {
        self.next_transition
    }
}

/// English name of month 1 through 12, empty for anything else.
pub fn month_name(month: u32) -> &'static str {
    match month {
        1..=12 => MONTH_NAMES[month as usize - 1],
        _ => "",
    }
}

fn month_day(boundary: &str) -> Option<(u32, u32)> {
    let (month, day) = boundary.split_once('-')?;
    let (month, day) = (month.trim().parse().ok()?, day.trim().parse().ok()?);
    ((1..=12).contains(&month) && (1..=31).contains(&day)).then_some((month, day))
}

fn ordinal((month, day): (u32, u32)) -> u32 {
    month * 100 + day
}

/// Check if date falls inside an `MM-DD` range, boundaries included.
///
/// A range whose start comes after its end wraps around New Year. Malformed
/// boundaries never match.
pub fn is_date_in_range(date: NaiveDate, start: &str, end: &str) -> bool {
    let (Some(start), Some(end)) = (month_day(start), month_day(end)) else {
        return false;
    };

    let current = ordinal((date.month(), date.day()));
    let (start, end) = (ordinal(start), ordinal(end));
    if start > end {
        current >= start || current <= end
    } else {
        current >= start && current <= end
    }
}

/// First enabled holiday containing given date, in array order.
pub fn find_active_holiday(date: NaiveDate, holidays: &[ThemeHoliday]) -> Option<&ThemeHoliday> {
    holidays.iter().find(|holiday| {
        holiday.applies_in(date.year())
            && is_date_in_range(date, &holiday.start_date, &holiday.end_date)
    })
}

/// Pick theme for given date.
///
/// Themes missing from the monthly table come back as `default`.
pub fn theme_for_date(date: NaiveDate, schedule: &ThemeSchedule) -> ThemeSelection {
    if let (ScheduleMode::Fixed, Some(theme)) = (schedule.default_mode, &schedule.fixed_theme) {
        return ThemeSelection {
            theme_id: theme.clone(),
            reason: SelectionReason::Fixed,
            holiday: None,
        };
    }

    if let Some(holiday) = find_active_holiday(date, &schedule.holidays) {
        return ThemeSelection {
            theme_id: holiday.theme.clone(),
            reason: SelectionReason::Holiday,
            holiday: Some(holiday.name.clone()),
        };
    }

    ThemeSelection {
        theme_id: schedule.monthly.get(date.month()).unwrap_or("default").to_string(),
        reason: SelectionReason::Monthly,
        holiday: None,
    }
}

/// Start of given day, with `02-29` rolled to `03-01` outside leap years.
fn midnight(year: i32, (month, day): (u32, u32)) -> Option<NaiveDateTime> {
    let date = match (month, day) {
        (2, 29) => NaiveDate::from_ymd_opt(year, 2, 29)
            .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1)),
        _ => NaiveDate::from_ymd_opt(year, month, day),
    };

    date.map(|date| date.and_time(NaiveTime::MIN))
}

/// Approximate next calendar theme change.
///
/// Holidays are scanned in array order, not chronological order. The first
/// holiday that starts later this year wins, otherwise the end of a holiday
/// that is underway. Failing that, the next change is the first day of next
/// month.
pub fn next_theme_change(now: NaiveDateTime, schedule: &ThemeSchedule) -> Option<NextChange> {
    let today = now.date();
    for holiday in schedule.holidays.iter().filter(|holiday| holiday.applies_in(today.year())) {
        let bounds = (month_day(&holiday.start_date), month_day(&holiday.end_date));
        let (Some(start), Some(end)) = bounds else {
            continue;
        };

        if let Some(time) = midnight(today.year(), start).filter(|time| *time > now) {
            return Some(NextChange {
                time,
                kind: ChangeKind::Theme,
                reason: format!("Holiday: {}", holiday.name),
            });
        }

        if !is_date_in_range(today, &holiday.start_date, &holiday.end_date) {
            continue;
        }

        // INVARIANT: A year-wrapping holiday entered in December ends next year.
        let today_ordinal = ordinal((today.month(), today.day()));
        let wraps = ordinal(start) > ordinal(end) && today_ordinal >= ordinal(start);
        let end_year = if wraps { today.year() + 1 } else { today.year() };
        let over = midnight(end_year, end)
            .and_then(|end| end.checked_add_days(chrono::Days::new(1)))
            .filter(|time| *time > now);

        if let Some(time) = over {
            return Some(NextChange {
                time,
                kind: ChangeKind::Theme,
                reason: format!("End of {}", holiday.name),
            });
        }
    }

    let (year, month) = match today.month() {
        12 => (today.year() + 1, 1),
        month => (today.year(), month + 1),
    };

    midnight(year, (month, 1)).map(|time| NextChange {
        time,
        kind: ChangeKind::Theme,
        reason: "Monthly theme change".into(),
    })
}

/// Evaluate schedule at given local time.
///
/// Combines theme selection with variant selection. When day and night
/// switching is on, the variant and the next change come from `daylight`.
/// Otherwise the fixed variant (day when unset) is used and the next change
/// is the next calendar theme change.
#[instrument(skip(schedule, daylight), level = "debug")]
pub fn evaluate_schedule(
    now: NaiveDateTime,
    schedule: &ThemeSchedule,
    daylight: &impl Daylight,
) -> ScheduleEvaluation {
    let mut selection = theme_for_date(now.date(), schedule);
    if schedule.default_mode == ScheduleMode::Manual {
        if let Some(theme) = &schedule.fixed_theme {
            selection = ThemeSelection {
                theme_id: theme.clone(),
                reason: SelectionReason::Manual,
                holiday: None,
            };
        }
    }
    debug!("selected theme {} ({:?})", selection.theme_id, selection.reason);

    let variant = if schedule.day_night_enabled {
        if daylight.is_daytime(schedule, now) {
            Variant::Day
        } else {
            Variant::Night
        }
    } else {
        schedule.fixed_variant.unwrap_or_default()
    };

    let calendar_change = || match selection.reason {
        SelectionReason::Fixed | SelectionReason::Manual => None,
        SelectionReason::Monthly | SelectionReason::Holiday => next_theme_change(now, schedule),
    };

    let next_change = schedule
        .day_night_enabled
        .then(|| daylight.next_transition(schedule, now))
        .flatten()
        .map(|time| (time, ChangeKind::Variant))
        .or_else(|| calendar_change().map(|change| (change.time, change.kind)));

    ScheduleEvaluation {
        theme_id: selection.theme_id,
        variant,
        reason: selection.reason,
        holiday: selection.holiday,
        next_change: next_change.map(|(time, _)| time),
        next_change_type: next_change.map(|(_, kind)| kind),
    }
}

/// Validate schedule against the current month.
pub fn validate_schedule(schedule: &ThemeSchedule) -> Validation {
    validate_schedule_for_month(schedule, Local::now().month())
}

/// Validate schedule.
///
/// Checks location bounds, `MM-DD` holiday boundaries, holiday themes, and
/// in monthly mode, that given month has a theme assigned.
pub fn validate_schedule_for_month(schedule: &ThemeSchedule, month: u32) -> Validation {
    let mut errors = Vec::new();

    if !(-90.0..=90.0).contains(&schedule.location.latitude) {
        errors.push("Latitude must be between -90 and 90".to_string());
    }

    if !(-180.0..=180.0).contains(&schedule.location.longitude) {
        errors.push("Longitude must be between -180 and 180".to_string());
    }

    for holiday in &schedule.holidays {
        if !MONTH_DAY.is_match(&holiday.start_date) {
            errors.push(format!(
                "Invalid start date format for {}: {}",
                holiday.name, holiday.start_date
            ));
        }

        if !MONTH_DAY.is_match(&holiday.end_date) {
            errors.push(format!(
                "Invalid end date format for {}: {}",
                holiday.name, holiday.end_date
            ));
        }

        if holiday.theme.is_empty() {
            errors.push(format!("No theme specified for {}", holiday.name));
        }
    }

    if schedule.default_mode == ScheduleMode::Monthly && schedule.monthly.get(month).is_none() {
        errors.push(format!("No theme assigned for current month ({})", month_name(month)));
    }

    Validation::from_errors(errors)
}

/// Schedule error types.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    /// Failed to deserialize schedule.
    #[error(transparent)]
    Deserialize(serde_json::Error),

    /// Failed to serialize schedule.
    #[error(transparent)]
    Serialize(serde_json::Error),
}

impl From<ScheduleError> for FmtError {
    fn from(_: ScheduleError) -> Self {
        FmtError
    }
}

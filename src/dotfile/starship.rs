// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Starship prompt configuration.
//!
//! Starship is configured through TOML, but only a small, predictable part of
//! TOML is modeled here: the top-level `format`, `right_format`, and
//! `palette` strings, `[palettes.<name>]` color tables, and flat
//! `[module]` tables holding strings, numbers, and booleans.
//!
//! # Raw Lines
//!
//! Everything else is kept verbatim. Unknown top-level keys and
//! `[[array.of.tables]]` blocks are written back before the first table, so
//! top-level keys stay top-level. Lines inside a table that cannot be
//! modeled, e.g., arrays or inline tables, stay inside that table through
//! [`StarshipConfig::raw_tables`].
//!
//! Strings are taken literally. One layer of quotes is removed and nothing
//! inside is unescaped, including multi-line strings.

use crate::dotfile::{claim_line, Claim, ConfigKind, DotfileFormat, Emitter, Line, Rule};

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, sync::LazyLock};
use tracing::{debug, instrument, trace};

/// Default prompt format.
pub const DEFAULT_FORMAT: &str =
    "$os$username$directory$git_branch$git_status$nodejs$rust$golang$python$line_break$character";

static TABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[\s*([A-Za-z0-9_.-]+)\s*\]\s*(?:#.*)?$").expect("table pattern")
});

static BARE_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("bare key pattern"));

const PALETTE_PREFIX: &str = "palettes.";

/// Structured `starship.toml`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StarshipConfig {
    /// Left prompt format, omitted when empty.
    pub format: String,

    /// Right prompt format, omitted when empty.
    pub right_format: String,

    /// Name of active palette, omitted when empty.
    pub palette: String,

    /// Color tables by palette name.
    pub palettes: BTreeMap<String, BTreeMap<String, String>>,

    /// Module settings by module name.
    pub modules: BTreeMap<String, BTreeMap<String, StarshipValue>>,

    /// Unrecognized lines inside a table, by table name.
    #[serde(default)]
    pub raw_tables: BTreeMap<String, Vec<String>>,

    /// Unrecognized top-level lines and array of table blocks.
    pub raw_lines: Vec<String>,
}

/// Value of a module setting.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum StarshipValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl StarshipValue {
    fn to_toml(&self) -> String {
        match self {
            Self::Boolean(flag) => flag.to_string(),
            Self::Integer(number) => number.to_string(),
            Self::Float(number) => toml::Value::Float(*number).to_string(),
            Self::String(text) => toml_string(text),
        }
    }
}

impl From<bool> for StarshipValue {
    fn from(flag: bool) -> Self {
        Self::Boolean(flag)
    }
}

impl From<i64> for StarshipValue {
    fn from(number: i64) -> Self {
        Self::Integer(number)
    }
}

impl From<f64> for StarshipValue {
    fn from(number: f64) -> Self {
        Self::Float(number)
    }
}

impl From<&str> for StarshipValue {
    fn from(text: &str) -> Self {
        Self::String(text.into())
    }
}

impl DotfileFormat for StarshipConfig {
    const KIND: ConfigKind = ConfigKind::Starship;

    fn parse(content: &str) -> Self {
        parse(content)
    }

    fn stringify(&self) -> String {
        stringify(self)
    }

    fn default_model() -> Self {
        default_model()
    }
}

/// Default Starship configuration.
pub fn default_model() -> StarshipConfig {
    let modules: [(&str, Vec<(&str, StarshipValue)>); 4] = [
        (
            "character",
            vec![
                ("success_symbol", "[❯](green)".into()),
                ("error_symbol", "[❯](red)".into()),
            ],
        ),
        ("os", vec![("disabled", false.into())]),
        (
            "directory",
            vec![
                ("truncation_length", StarshipValue::Integer(3)),
                ("truncate_to_repo", true.into()),
            ],
        ),
        ("git_branch", vec![("symbol", " ".into())]),
    ];

    StarshipConfig {
        format: DEFAULT_FORMAT.into(),
        modules: modules
            .into_iter()
            .map(|(name, settings)| {
                let settings = settings
                    .into_iter()
                    .map(|(key, value)| (key.to_string(), value))
                    .collect();
                (name.to_string(), settings)
            })
            .collect(),
        ..Default::default()
    }
}

/// Table a line belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Section {
    Top,
    Palette(String),
    Module(String),
    ArrayTable,
}

impl Section {
    fn table_name(&self) -> Option<String> {
        match self {
            Self::Palette(name) => Some(format!("{PALETTE_PREFIX}{name}")),
            Self::Module(name) => Some(name.clone()),
            Self::Top | Self::ArrayTable => None,
        }
    }
}

/// Multi-line string still waiting for its closing delimiter.
#[derive(Debug)]
struct PendingString {
    key: String,
    delimiter: &'static str,
    body: Vec<String>,
    raw: Vec<String>,
}

#[derive(Debug)]
struct Reader {
    config: StarshipConfig,
    section: Section,
    pending: Option<PendingString>,
}

impl Reader {
    fn new() -> Self {
        Self {
            config: StarshipConfig::default(),
            section: Section::Top,
            pending: None,
        }
    }

    fn preserve(&mut self, raw: impl Into<String>) {
        let raw = raw.into();
        match self.section.table_name() {
            Some(table) => self.config.raw_tables.entry(table).or_default().push(raw),
            None => self.config.raw_lines.push(raw),
        }
    }

    /// Feed line that sits inside a multi-line string.
    ///
    /// Returns `false` when no multi-line string is open.
    fn continue_string(&mut self, raw: &str) -> bool {
        let Some(pending) = self.pending.as_mut() else {
            return false;
        };

        pending.raw.push(raw.to_string());
        let Some(end) = raw.find(pending.delimiter) else {
            pending.body.push(raw.to_string());
            return true;
        };

        pending.body.push(raw[..end].to_string());
        if let Some(pending) = self.pending.take() {
            let value = StarshipValue::String(pending.body.join("\n"));
            if self.assign(&pending.key, value) == Claim::Raw {
                for raw in pending.raw {
                    self.preserve(raw);
                }
            }
        }

        true
    }

    fn assign(&mut self, key: &str, value: StarshipValue) -> Claim {
        let config = &mut self.config;
        match (&self.section, value) {
            (Section::Top, StarshipValue::String(text)) => match key {
                "format" => config.format = text,
                "right_format" => config.right_format = text,
                "palette" => config.palette = text,
                _ => return Claim::Raw,
            },
            (Section::Palette(name), StarshipValue::String(color)) => {
                config
                    .palettes
                    .entry(name.clone())
                    .or_default()
                    .insert(key.into(), color);
            }
            (Section::Module(name), value) => {
                config
                    .modules
                    .entry(name.clone())
                    .or_default()
                    .insert(key.into(), value);
            }
            _ => return Claim::Raw,
        }

        Claim::Parsed
    }
}

const RULES: &[Rule<Reader>] = &[
    ("array table", array_table),
    ("table", table),
    ("array table body", array_table_body),
    ("key value", key_value),
];

/// Parse `starship.toml` content.
///
/// Starts from an empty configuration, not from the defaults.
#[instrument(skip(content), level = "debug")]
pub fn parse(content: &str) -> StarshipConfig {
    let mut reader = Reader::new();
    for raw in content.lines() {
        if reader.continue_string(raw) {
            continue;
        }

        let text = raw.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }

        if claim_line(Line { raw, text }, RULES, &mut reader) == Claim::Raw {
            reader.preserve(raw);
        }
    }

    if let Some(pending) = reader.pending.take() {
        debug!("multi-line string {:?} is never closed", pending.key);
        for raw in pending.raw {
            reader.preserve(raw);
        }
    }

    let config = reader.config;
    debug!(
        "parsed starship config with {} raw lines and {} tables holding raw lines",
        config.raw_lines.len(),
        config.raw_tables.len()
    );

    config
}

/// Render `starship.toml` content.
#[instrument(skip(config), level = "debug")]
pub fn stringify(config: &StarshipConfig) -> String {
    let mut out = Emitter::with_header("Starship Prompt Configuration");

    for (key, value) in [
        ("format", &config.format),
        ("right_format", &config.right_format),
        ("palette", &config.palette),
    ] {
        if !value.is_empty() {
            out.line(format!("{key} = {}", toml_string(value)));
            out.blank();
        }
    }

    out.raw_lines(&config.raw_lines);

    let mut emitted = Vec::new();
    for (name, colors) in &config.palettes {
        let table = format!("{PALETTE_PREFIX}{name}");
        let body = colors
            .iter()
            .map(|(color, value)| format!("{color} = {}", toml_string(value)));
        emit_table(&mut out, &table, body, config.raw_tables.get(&table));
        emitted.push(table);
    }

    for (name, settings) in &config.modules {
        let body = settings
            .iter()
            .map(|(key, value)| format!("{key} = {}", value.to_toml()));
        emit_table(&mut out, name, body, config.raw_tables.get(name));
        emitted.push(name.clone());
    }

    for (table, raw) in &config.raw_tables {
        if !emitted.contains(table) {
            trace!("table {table:?} only holds raw lines");
            emit_table(&mut out, table, std::iter::empty(), Some(raw));
        }
    }

    out.finish()
}

fn emit_table(
    out: &mut Emitter,
    table: &str,
    body: impl Iterator<Item = String>,
    raw: Option<&Vec<String>>,
) {
    out.line(format!("[{table}]"));
    for line in body {
        out.line(line);
    }
    for line in raw.into_iter().flatten() {
        out.line(line.clone());
    }
    out.blank();
}

/// Quote string for TOML output.
fn toml_string(value: &str) -> String {
    if value.contains('\n') {
        format!("\"\"\"\n{value}\"\"\"")
    } else if value.contains('"') && !value.contains('\'') {
        format!("'{value}'")
    } else {
        format!("\"{value}\"")
    }
}

/// Coerce single line TOML value.
///
/// Booleans and numbers go through the TOML parser, so hex, octal, binary,
/// underscores, `inf`, and `nan` keep their meaning. Arrays, inline tables,
/// dates, bare words, and values with trailing comments are not modeled.
fn coerce(value: &str) -> Option<StarshipValue> {
    if let Some(quote) = value.chars().next().filter(|ch| matches!(ch, '"' | '\'')) {
        if value.len() >= 2 && value.ends_with(quote) {
            return Some(StarshipValue::String(value[1..value.len() - 1].into()));
        }

        return None;
    }

    if value.starts_with(['[', '{']) || value.contains('#') {
        return None;
    }

    let entry = toml::from_str::<toml::Table>(&format!("value = {value}")).ok()?;
    match entry.get("value")? {
        toml::Value::Boolean(flag) => Some(StarshipValue::Boolean(*flag)),
        toml::Value::Integer(number) => Some(StarshipValue::Integer(*number)),
        toml::Value::Float(number) => Some(StarshipValue::Float(*number)),
        _ => None,
    }
}

fn array_table(line: Line<'_>, reader: &mut Reader) -> Claim {
    if !line.text.starts_with("[[") {
        return Claim::Pass;
    }

    reader.section = Section::ArrayTable;

    Claim::Raw
}

fn table(line: Line<'_>, reader: &mut Reader) -> Claim {
    if !line.text.starts_with('[') {
        return Claim::Pass;
    }

    let Some(captures) = TABLE.captures(line.text) else {
        // INVARIANT: Lines of an unknown table must not leak into the
        // previous one.
        reader.section = Section::ArrayTable;
        return Claim::Raw;
    };

    let name = &captures[1];
    let config = &mut reader.config;
    reader.section = match name.strip_prefix(PALETTE_PREFIX) {
        Some(palette) if !palette.is_empty() => {
            config.palettes.entry(palette.into()).or_default();
            Section::Palette(palette.into())
        }
        _ => {
            config.modules.entry(name.into()).or_default();
            Section::Module(name.into())
        }
    };

    Claim::Parsed
}

fn array_table_body(_: Line<'_>, reader: &mut Reader) -> Claim {
    if reader.section == Section::ArrayTable {
        return Claim::Raw;
    }

    Claim::Pass
}

fn key_value(line: Line<'_>, reader: &mut Reader) -> Claim {
    let Some((key, value)) = line.text.split_once('=') else {
        return Claim::Pass;
    };

    let key = key.trim();
    let value = value.trim();
    if !BARE_KEY.is_match(key) {
        return Claim::Raw;
    }

    if let Some(delimiter) = ["\"\"\"", "'''"]
        .into_iter()
        .find(|delimiter| value.starts_with(delimiter))
    {
        let rest = &value[delimiter.len()..];
        if let Some(end) = rest.find(delimiter) {
            if !rest[end + delimiter.len()..].trim().is_empty() {
                return Claim::Raw;
            }

            return reader.assign(key, StarshipValue::String(rest[..end].into()));
        }

        let body = if rest.is_empty() {
            Vec::new()
        } else {
            vec![rest.to_string()]
        };
        reader.pending = Some(PendingString {
            key: key.into(),
            delimiter,
            body,
            raw: vec![line.raw.to_string()],
        });

        return Claim::Parsed;
    }

    match coerce(value) {
        Some(value) => reader.assign(key, value),
        None => Claim::Raw,
    }
}

// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Kitty terminal configuration.
//!
//! Kitty uses one `key value` directive per line. The key is everything up to
//! the first whitespace, the value is the rest of the line.

use crate::dotfile::{apply_rules, Claim, ConfigKind, DotfileFormat, Emitter, Line, Rule};

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, instrument};

pub const DEFAULT_FONT_SIZE: f64 = 12.0;
pub const DEFAULT_BACKGROUND_OPACITY: f64 = 1.0;
pub const DEFAULT_CURSOR_BLINK_INTERVAL: f64 = 0.5;
pub const DEFAULT_PADDING_WIDTH: u32 = 8;
pub const DEFAULT_MARGIN_WIDTH: u32 = 0;
pub const DEFAULT_BORDER_WIDTH: u32 = 0;
pub const DEFAULT_SCROLLBACK_LINES: i64 = 10000;

/// Structured `kitty.conf`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KittyConfig {
    pub font: KittyFont,
    pub appearance: KittyAppearance,
    pub window: KittyWindow,
    pub tab_bar: KittyTabBar,
    pub behavior: KittyBehavior,
    pub keybindings: Vec<KittyKeybinding>,
    pub theme: KittyTheme,

    /// Lines that were not recognized.
    pub raw_lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KittyFont {
    pub family: String,

    /// Size in points.
    pub size: f64,
    pub bold: String,
    pub italic: String,
    pub bold_italic: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KittyAppearance {
    /// Between 0 and 1.
    pub background_opacity: f64,
    pub cursor_shape: CursorShape,

    /// Set by a positive blink interval. Written as a zero interval when disabled.
    pub cursor_blink: bool,

    /// Seconds between blinks.
    pub cursor_blink_interval: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KittyWindow {
    /// Width with unit, e.g., `120c` for cells.
    pub initial_width: String,

    /// Height with unit, e.g., `40c` for cells.
    pub initial_height: String,
    pub padding_width: u32,
    pub margin_width: u32,
    pub border_width: u32,
    pub remember_size: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct KittyTabBar {
    pub style: TabBarStyle,
    pub edge: TabBarEdge,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KittyBehavior {
    /// Shell to launch, `.` means the login shell.
    pub shell: String,

    /// Negative means unlimited.
    pub scrollback_lines: i64,
    pub copy_on_select: CopyOnSelect,
    pub enable_audio_bell: bool,
}

/// `map` directive.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct KittyKeybinding {
    /// Key combination, e.g., `ctrl+shift+t`.
    pub key: String,
    pub action: String,

    /// Modifiers written in front of the key as `mods+key`.
    ///
    /// Parsing keeps the full combination in the key, so a binding with
    /// separate modifiers comes back with them merged into the key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mods: Option<String>,
}

impl KittyKeybinding {
    pub fn new(key: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            action: action.into(),
            mods: None,
        }
    }

    fn to_line(&self) -> String {
        match &self.mods {
            Some(mods) => format!("map {mods}+{} {}", self.key, self.action),
            None => format!("map {} {}", self.key, self.action),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KittyTheme {
    /// Color theme file pulled in through `include`, empty for none.
    pub include_file: String,
}

/// Shape of the text cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorShape {
    Block,
    Beam,
    Underline,
}

/// How tabs are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TabBarStyle {
    Fade,
    Slant,
    Separator,
    Powerline,
    Hidden,
}

/// Edge of the window the tab bar sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TabBarEdge {
    Top,
    Bottom,
}

macro_rules! keyword_enum {
    ($name:ident { $($variant:ident => $keyword:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $keyword,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = ();

            fn from_str(data: &str) -> Result<Self, Self::Err> {
                match data {
                    $($keyword => Ok(Self::$variant),)+
                    _ => Err(()),
                }
            }
        }
    };
}

keyword_enum!(CursorShape {
    Block => "block",
    Beam => "beam",
    Underline => "underline",
});

keyword_enum!(TabBarStyle {
    Fade => "fade",
    Slant => "slant",
    Separator => "separator",
    Powerline => "powerline",
    Hidden => "hidden",
});

keyword_enum!(TabBarEdge {
    Top => "top",
    Bottom => "bottom",
});

/// What happens to selected text.
///
/// Serialized like the backend does it: `false` when off, otherwise the name
/// of the target.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "CopyTarget", into = "CopyTarget")]
pub enum CopyOnSelect {
    /// Selections are not copied.
    Off,

    /// Selections go to the system clipboard.
    Clipboard,

    /// Selections go to a named private buffer.
    Buffer(String),
}

impl CopyOnSelect {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Off => "no",
            Self::Clipboard => "clipboard",
            Self::Buffer(name) => name,
        }
    }

    fn from_value(value: &str) -> Self {
        match value {
            "no" => Self::Off,
            "clipboard" => Self::Clipboard,
            name => Self::Buffer(name.into()),
        }
    }
}

#[derive(Deserialize, Serialize)]
#[serde(untagged)]
enum CopyTarget {
    Flag(bool),
    Name(String),
}

impl From<CopyTarget> for CopyOnSelect {
    fn from(target: CopyTarget) -> Self {
        match target {
            CopyTarget::Flag(false) => Self::Off,
            CopyTarget::Flag(true) => Self::Clipboard,
            CopyTarget::Name(name) => Self::from_value(&name),
        }
    }
}

impl From<CopyOnSelect> for CopyTarget {
    fn from(copy: CopyOnSelect) -> Self {
        match copy {
            CopyOnSelect::Off => Self::Flag(false),
            CopyOnSelect::Clipboard => Self::Name("clipboard".into()),
            CopyOnSelect::Buffer(name) => Self::Name(name),
        }
    }
}

impl DotfileFormat for KittyConfig {
    const KIND: ConfigKind = ConfigKind::Kitty;

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

/// Default Kitty configuration.
pub fn default_model() -> KittyConfig {
    KittyConfig {
        font: KittyFont {
            family: "JetBrains Mono Nerd Font".into(),
            size: DEFAULT_FONT_SIZE,
            bold: "auto".into(),
            italic: "auto".into(),
            bold_italic: "auto".into(),
        },
        appearance: KittyAppearance {
            background_opacity: DEFAULT_BACKGROUND_OPACITY,
            cursor_shape: CursorShape::Beam,
            cursor_blink: true,
            cursor_blink_interval: DEFAULT_CURSOR_BLINK_INTERVAL,
        },
        window: KittyWindow {
            initial_width: "120c".into(),
            initial_height: "40c".into(),
            padding_width: DEFAULT_PADDING_WIDTH,
            margin_width: DEFAULT_MARGIN_WIDTH,
            border_width: DEFAULT_BORDER_WIDTH,
            remember_size: true,
        },
        tab_bar: KittyTabBar {
            style: TabBarStyle::Powerline,
            edge: TabBarEdge::Bottom,
        },
        behavior: KittyBehavior {
            shell: ".".into(),
            scrollback_lines: DEFAULT_SCROLLBACK_LINES,
            copy_on_select: CopyOnSelect::Clipboard,
            enable_audio_bell: false,
        },
        keybindings: Vec::new(),
        theme: KittyTheme::default(),
        raw_lines: Vec::new(),
    }
}

const RULES: &[Rule<KittyConfig>] = &[("directive", directive)];

/// Parse `kitty.conf` content.
#[instrument(skip(content), level = "debug")]
pub fn parse(content: &str) -> KittyConfig {
    let mut config = default_model();
    config.raw_lines = apply_rules(content.lines(), RULES, &mut config);
    debug!("parsed kitty config with {} raw lines", config.raw_lines.len());

    config
}

/// Render `kitty.conf` content.
#[instrument(skip(config), level = "debug")]
pub fn stringify(config: &KittyConfig) -> String {
    let font = &config.font;
    let appearance = &config.appearance;
    let window = &config.window;
    let behavior = &config.behavior;
    let mut out = Emitter::with_header("Kitty Terminal Configuration");

    out.section(
        "Font",
        [
            format!("font_family      {}", font.family),
            format!("bold_font        {}", font.bold),
            format!("italic_font      {}", font.italic),
            format!("bold_italic_font {}", font.bold_italic),
            format!("font_size        {}", font.size),
        ],
    );

    let interval = if appearance.cursor_blink {
        appearance.cursor_blink_interval
    } else {
        0.0
    };
    out.section(
        "Cursor",
        [
            format!("cursor_shape {}", appearance.cursor_shape.as_str()),
            format!("cursor_blink_interval {interval}"),
        ],
    );
    out.section(
        "Appearance",
        [format!("background_opacity {}", appearance.background_opacity)],
    );
    out.section(
        "Scrollback",
        [format!("scrollback_lines {}", behavior.scrollback_lines)],
    );
    out.section(
        "Mouse",
        [format!("copy_on_select {}", behavior.copy_on_select.as_str())],
    );

    let mut window_lines = vec![
        format!("remember_window_size  {}", yes_no(window.remember_size)),
        format!("initial_window_width  {}", window.initial_width),
        format!("initial_window_height {}", window.initial_height),
        format!("window_padding_width  {}", window.padding_width),
    ];
    if window.margin_width > 0 {
        window_lines.push(format!("window_margin_width   {}", window.margin_width));
    }
    if window.border_width > 0 {
        window_lines.push(format!("window_border_width   {}", window.border_width));
    }
    out.section("Window", window_lines);

    out.section(
        "Tab bar",
        [
            format!("tab_bar_edge {}", config.tab_bar.edge.as_str()),
            format!("tab_bar_style {}", config.tab_bar.style.as_str()),
        ],
    );
    out.section(
        "Bell",
        [format!("enable_audio_bell {}", yes_no(behavior.enable_audio_bell))],
    );
    out.section("Shell", [format!("shell {}", behavior.shell)]);
    if !config.theme.include_file.is_empty() {
        out.section("Theme", [format!("include {}", config.theme.include_file)]);
    }
    out.section(
        "Keybindings",
        config.keybindings.iter().map(KittyKeybinding::to_line),
    );
    out.raw_lines(&config.raw_lines);

    out.finish()
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn switch(value: &str) -> Option<bool> {
    match value {
        "yes" | "y" | "true" => Some(true),
        "no" | "n" | "false" => Some(false),
        _ => None,
    }
}

/// Parse finite number, falling back to default otherwise.
fn finite_or(value: &str, default: f64) -> f64 {
    value
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
        .unwrap_or(default)
}

fn integer_or<T: FromStr>(value: &str, default: T) -> T {
    value.parse().unwrap_or(default)
}

fn directive(line: Line<'_>, config: &mut KittyConfig) -> Claim {
    let Some((key, value)) = line.text.split_once(char::is_whitespace) else {
        return Claim::Raw;
    };

    let value = value.trim();
    if value.is_empty() {
        return Claim::Raw;
    }

    let font = &mut config.font;
    let appearance = &mut config.appearance;
    let window = &mut config.window;
    let behavior = &mut config.behavior;
    match key {
        "font_family" => font.family = value.into(),
        "font_size" => font.size = finite_or(value, DEFAULT_FONT_SIZE),
        "bold_font" => font.bold = value.into(),
        "italic_font" => font.italic = value.into(),
        "bold_italic_font" => font.bold_italic = value.into(),
        "background_opacity" => {
            appearance.background_opacity = finite_or(value, DEFAULT_BACKGROUND_OPACITY)
        }
        "cursor_shape" => match value.parse() {
            Ok(shape) => appearance.cursor_shape = shape,
            Err(_) => return Claim::Raw,
        },
        "cursor_blink_interval" => {
            let interval = finite_or(value, DEFAULT_CURSOR_BLINK_INTERVAL);
            appearance.cursor_blink_interval = interval;
            appearance.cursor_blink = interval > 0.0;
        }
        "initial_window_width" => window.initial_width = value.into(),
        "initial_window_height" => window.initial_height = value.into(),
        "window_padding_width" => window.padding_width = integer_or(value, DEFAULT_PADDING_WIDTH),
        "window_margin_width" => window.margin_width = integer_or(value, DEFAULT_MARGIN_WIDTH),
        "window_border_width" => window.border_width = integer_or(value, DEFAULT_BORDER_WIDTH),
        "remember_window_size" => match switch(value) {
            Some(flag) => window.remember_size = flag,
            None => return Claim::Raw,
        },
        "tab_bar_style" => match value.parse() {
            Ok(style) => config.tab_bar.style = style,
            Err(_) => return Claim::Raw,
        },
        "tab_bar_edge" => match value.parse() {
            Ok(edge) => config.tab_bar.edge = edge,
            Err(_) => return Claim::Raw,
        },
        "shell" => behavior.shell = value.into(),
        "scrollback_lines" => {
            behavior.scrollback_lines = integer_or(value, DEFAULT_SCROLLBACK_LINES)
        }
        "copy_on_select" => behavior.copy_on_select = CopyOnSelect::from_value(value),
        "enable_audio_bell" => match switch(value) {
            Some(flag) => behavior.enable_audio_bell = flag,
            None => return Claim::Raw,
        },
        "map" => {
            let mut parts = value.split_whitespace();
            let (Some(key), Some(first)) = (parts.next(), parts.next()) else {
                return Claim::Raw;
            };
            let action = std::iter::once(first).chain(parts).collect::<Vec<_>>().join(" ");
            config.keybindings.push(KittyKeybinding::new(key, action));
        }
        // INVARIANT: Only one theme include is modeled, later ones stay verbatim.
        "include" if config.theme.include_file.is_empty() => {
            config.theme.include_file = value.into();
        }
        _ => return Claim::Raw,
    }

    Claim::Parsed
}

// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use argus::{
    dotfile::{bash, kitty, starship, tmux, zsh, ConfigKind},
    path::default_settings_file,
    settings::Settings,
    theme::{
        schedule::{evaluate_schedule, validate_schedule, FixedDaylight, ThemeSchedule},
        validate::{invalid_hex_slots, validate_theme},
        Theme, ThemeMetadata, Variant,
    },
};

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::{
    fs::{read_dir, read_to_string},
    path::{Path, PathBuf},
    process::exit,
};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "argus [options] <argus-command>",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    /// Path to settings file.
    #[arg(short, long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    fn run(self) -> Result<()> {
        let settings = load_settings(self.config)?;
        match self.command {
            Command::Normalize(opts) => run_normalize(&settings, opts),
            Command::Defaults(opts) => run_defaults(opts),
            Command::Inspect(opts) => run_inspect(&settings, opts),
            Command::Schedule(opts) => run_schedule(&settings, opts),
            Command::Validate(opts) => run_validate(&settings, opts),
            Command::Resolve(opts) => run_resolve(&settings, opts),
            Command::List => run_list(&settings),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Parse dotfile and print it back in canonical form.
    #[command(override_usage = "argus normalize [options] <kind>")]
    Normalize(DotfileOptions),

    /// Print default configuration of dotfile kind.
    #[command(override_usage = "argus defaults <kind>")]
    Defaults(DefaultsOptions),

    /// Print parsed model of dotfile as JSON.
    #[command(override_usage = "argus inspect [options] <kind>")]
    Inspect(DotfileOptions),

    /// Evaluate theme schedule.
    #[command(override_usage = "argus schedule [options]")]
    Schedule(ScheduleOptions),

    /// Validate theme.
    #[command(override_usage = "argus validate <theme>")]
    Validate(ThemeOptions),

    /// Print semantic tokens of theme resolved into colors.
    #[command(override_usage = "argus resolve [options] <theme>")]
    Resolve(ResolveOptions),

    /// List available themes.
    #[command(override_usage = "argus list")]
    List,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct DotfileOptions {
    /// Kind of dotfile: bash, zsh, tmux, kitty, or starship.
    #[arg(value_name = "kind")]
    pub kind: ConfigKind,

    /// Read dotfile from path instead of its configured location.
    #[arg(short, long, value_name = "path")]
    pub file: Option<PathBuf>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct DefaultsOptions {
    /// Kind of dotfile: bash, zsh, tmux, kitty, or starship.
    #[arg(value_name = "kind")]
    pub kind: ConfigKind,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct ScheduleOptions {
    /// Evaluate for date in YYYY-MM-DD form instead of today.
    #[arg(short, long, value_name = "date")]
    pub date: Option<NaiveDate>,

    /// Treat time of evaluation as night.
    #[arg(short, long)]
    pub night: bool,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct ThemeOptions {
    /// Theme identifier or path to theme file.
    #[arg(value_name = "theme")]
    pub theme: String,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct ResolveOptions {
    /// Theme identifier or path to theme file.
    #[arg(value_name = "theme")]
    pub theme: String,

    /// Resolve night variant instead of day variant.
    #[arg(short, long)]
    pub night: bool,
}

fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .with_timer(false)
        .without_time()
        .with_writer(std::io::stderr);
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = run() {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

fn run() -> Result<()> {
    Cli::parse().run()
}

fn load_settings(path: Option<PathBuf>) -> Result<Settings> {
    let path = match path {
        Some(path) => path,
        None => default_settings_file()?,
    };

    if !path.exists() {
        debug!("no settings at {:?}, use defaults", path.display());
        return Ok(Settings::default());
    }

    let data = read_to_string(&path)
        .with_context(|| format!("failed to read settings {:?}", path.display()))?;
    data.parse::<Settings>()
        .with_context(|| format!("invalid settings {:?}", path.display()))
}

fn read_dotfile(settings: &Settings, opts: &DotfileOptions) -> Result<Option<String>> {
    let path = match &opts.file {
        Some(path) => path.clone(),
        None => settings.dotfile(opts.kind)?,
    };

    if !path.exists() {
        warn!("{:?} does not exist, use default {} configuration", path.display(), opts.kind);
        return Ok(None);
    }

    let data = read_to_string(&path)
        .with_context(|| format!("failed to read {:?}", path.display()))?;
    Ok(Some(data))
}

fn run_normalize(settings: &Settings, opts: DotfileOptions) -> Result<()> {
    let output = match read_dotfile(settings, &opts)? {
        Some(data) => opts.kind.normalize(&data),
        None => opts.kind.default_content(),
    };
    println!("{output}");

    Ok(())
}

fn run_defaults(opts: DefaultsOptions) -> Result<()> {
    println!("{}", opts.kind.default_content());
    Ok(())
}

fn run_inspect(settings: &Settings, opts: DotfileOptions) -> Result<()> {
    let data = read_dotfile(settings, &opts)?;
    let output = match (opts.kind, data.as_deref()) {
        (ConfigKind::Bash, Some(data)) => serde_json::to_string_pretty(&bash::parse(data))?,
        (ConfigKind::Bash, None) => serde_json::to_string_pretty(&bash::default_model())?,
        (ConfigKind::Zsh, Some(data)) => serde_json::to_string_pretty(&zsh::parse(data))?,
        (ConfigKind::Zsh, None) => serde_json::to_string_pretty(&zsh::default_model())?,
        (ConfigKind::Tmux, Some(data)) => serde_json::to_string_pretty(&tmux::parse(data))?,
        (ConfigKind::Tmux, None) => serde_json::to_string_pretty(&tmux::default_model())?,
        (ConfigKind::Kitty, Some(data)) => serde_json::to_string_pretty(&kitty::parse(data))?,
        (ConfigKind::Kitty, None) => serde_json::to_string_pretty(&kitty::default_model())?,
        (ConfigKind::Starship, Some(data)) => {
            serde_json::to_string_pretty(&starship::parse(data))?
        }
        (ConfigKind::Starship, None) => serde_json::to_string_pretty(&starship::default_model())?,
    };
    println!("{output}");

    Ok(())
}

fn run_schedule(settings: &Settings, opts: ScheduleOptions) -> Result<()> {
    let path = settings.schedule()?;
    let schedule = if path.exists() {
        read_to_string(&path)
            .with_context(|| format!("failed to read schedule {:?}", path.display()))?
            .parse::<ThemeSchedule>()
            .with_context(|| format!("invalid schedule {:?}", path.display()))?
    } else {
        info!("no schedule at {:?}, use seasonal schedule", path.display());
        ThemeSchedule::seasonal()
    };

    for problem in validate_schedule(&schedule).errors {
        warn!("{problem}");
    }

    let now = Local::now().naive_local();
    let now = match opts.date {
        Some(date) => date.and_time(now.time()),
        None => now,
    };

    let daylight = if opts.night { FixedDaylight::night() } else { FixedDaylight::day() };
    let evaluation = evaluate_schedule(now, &schedule, &daylight);
    println!("{}", serde_json::to_string_pretty(&evaluation)?);

    Ok(())
}

fn run_validate(settings: &Settings, opts: ThemeOptions) -> Result<()> {
    let theme = load_theme(settings, &opts.theme)?;

    for which in [Variant::Day, Variant::Night] {
        let Some(palette) = theme.variant(which).and_then(|variant| variant.palette.as_ref())
        else {
            continue;
        };

        for slot in invalid_hex_slots(palette) {
            warn!("{which} palette color {slot} is not a hex color: {:?}", palette.get(slot));
        }
    }

    let validation = validate_theme(&theme);
    if !validation.valid {
        for problem in &validation.errors {
            error!("{problem}");
        }
        bail!("theme {:?} is invalid", opts.theme);
    }

    info!("theme {:?} is valid", theme.id);

    Ok(())
}

fn run_resolve(settings: &Settings, opts: ResolveOptions) -> Result<()> {
    let theme = load_theme(settings, &opts.theme)?;
    let which = if opts.night { Variant::Night } else { Variant::Day };
    for (token, color) in theme.resolved_tokens(which) {
        println!("{token} = {color}");
    }

    Ok(())
}

fn run_list(settings: &Settings) -> Result<()> {
    let dir = settings.themes_dir()?;
    let mut themes: Vec<ThemeMetadata> = Vec::new();
    for entry in read_dir(&dir).with_context(|| format!("failed to read {:?}", dir.display()))? {
        let path = entry?.path();
        if !is_theme_file(&path) {
            continue;
        }

        match read_to_string(&path).map(|data| data.parse::<Theme>()) {
            Ok(Ok(theme)) => themes.push(theme.metadata()),
            Ok(Err(error)) => warn!("skip {:?}: {error}", path.display()),
            Err(error) => warn!("skip {:?}: {error}", path.display()),
        }
    }

    themes.sort_by(|a, b| a.name.cmp(&b.name));
    for theme in themes {
        println!("{:<24} {:<32} {}", theme.id, theme.name, theme.accent_color);
    }

    Ok(())
}

fn is_theme_file(path: &Path) -> bool {
    let is_json = path.extension().and_then(|ext| ext.to_str()) == Some("json");
    let is_reserved = path
        .file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.') || name == "schedule.json")
        .unwrap_or(true);

    is_json && !is_reserved
}

fn load_theme(settings: &Settings, theme: &str) -> Result<Theme> {
    let path = PathBuf::from(theme);
    let path = if path.exists() { path } else { settings.theme_file(theme)? };

    read_to_string(&path)
        .with_context(|| format!("failed to read theme {:?}", path.display()))?
        .parse::<Theme>()
        .with_context(|| format!("invalid theme {:?}", path.display()))
}

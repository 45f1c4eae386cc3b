// Copyright (c) 2026 rezky_nightky

use std::fmt::Display;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use tracing::warn;

use crate::charset::CHARSET_LISTING;
use crate::column::DEFAULT_FACTOR;
use crate::runtime::DrawVariant;
use crate::scheduler::DEFAULT_FPS;
use crate::stats::DEFAULT_POPULATION;

pub const DEFAULT_SIZE: f32 = 14.0;
pub const DEFAULT_FADE: f32 = 0.05;
/// Host frame rate; the rain cannot tick more often than the host draws.
pub const MAX_FPS: f64 = 60.0;

pub const DEFAULT_PARAMS_USAGE: &str = "DEFAULT PARAMS USAGE:\n  contagion-rain --draw corona --fps 25 --size 14 --factor 0.996 --pop 7.78e9 --fade 0.05 --charset auto";

pub fn color_enabled_stdout() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(std::env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

pub fn default_params_usage_for_help() -> String {
    if color_enabled_stdout() {
        let (head, rest) = DEFAULT_PARAMS_USAGE
            .split_once('\n')
            .unwrap_or((DEFAULT_PARAMS_USAGE, ""));
        format!("\x1b[1;36m{}\x1b[0m\n{}", head, rest)
    } else {
        DEFAULT_PARAMS_USAGE.to_string()
    }
}

/// Raw command line. Tuning values stay strings so a bad value can fall back
/// to its default instead of aborting.
#[derive(Parser, Debug, Clone)]
#[command(name = "contagion-rain", version, disable_version_flag = true)]
pub struct Args {
    #[arg(
        short = 'D',
        long = "draw",
        default_value = "corona",
        help_heading = "SIMULATION",
        help = "Rain variant: corona, pixel, random"
    )]
    pub draw: String,

    #[arg(
        long = "stats",
        help_heading = "SIMULATION",
        help = "Stats cache file (JSON: confirmed, dead, recovered, active, timestamp)"
    )]
    pub stats: Option<PathBuf>,

    #[arg(
        long = "factor",
        default_value = "0.996",
        help_heading = "SIMULATION",
        help = "Reinfection resistance (min 0 max 1)"
    )]
    pub factor: String,

    #[arg(
        long = "pop",
        default_value = "7.78e9",
        help_heading = "SIMULATION",
        help = "Total population used to scale the infection chance"
    )]
    pub pop: String,

    #[arg(
        long = "seed",
        help_heading = "SIMULATION",
        help = "Seed for a reproducible rain"
    )]
    pub seed: Option<u64>,

    #[arg(
        short = 'f',
        long = "fps",
        default_value = "25",
        help_heading = "APPEARANCE",
        help = "Simulation ticks per second (min >0 max 60, the host frame rate)"
    )]
    pub fps: String,

    #[arg(
        long = "size",
        default_value = "14",
        help_heading = "APPEARANCE",
        help = "Glyph size in points"
    )]
    pub size: String,

    #[arg(
        long = "fade",
        default_value = "0.05",
        help_heading = "APPEARANCE",
        help = "Trail fade per tick (min >0 max 1)"
    )]
    pub fade: String,

    #[arg(
        long = "charset",
        default_value = "auto",
        help_heading = "APPEARANCE",
        help = "Decorative charset preset (see --list-charsets)"
    )]
    pub charset: String,

    #[arg(
        long = "colormode",
        help_heading = "APPEARANCE",
        help = "Force color mode (allowed: 0,4,8,24). Default: auto-detect from COLORTERM/TERM"
    )]
    pub colormode: Option<u16>,

    #[arg(
        long = "duration",
        help_heading = "GENERAL",
        help = "Stop after N seconds (<=0 disables)"
    )]
    pub duration: Option<f64>,

    #[arg(
        short = 's',
        long = "screensaver",
        help_heading = "GENERAL",
        help = "Screensaver mode (exit on keypress)"
    )]
    pub screensaver: bool,

    #[arg(
        long = "log-file",
        help_heading = "GENERAL",
        help = "Write diagnostics to this file (filter with CONTAGION_RAIN_LOG)"
    )]
    pub log_file: Option<PathBuf>,

    #[arg(
        long = "list-charsets",
        help_heading = "HELP",
        help = "List available charset presets and exit"
    )]
    pub list_charsets: bool,

    #[arg(
        long = "info",
        short = 'i',
        help_heading = "HELP",
        help = "Print version info and exit"
    )]
    pub info: bool,

    #[arg(
        long = "version",
        short = 'v',
        help_heading = "HELP",
        help = "Print version and exit"
    )]
    pub version: bool,
}

/// Resolved tuning, read once when the rain is built.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub fps: f64,
    pub size: f32,
    pub factor: f64,
    pub population: u64,
    pub variant: DrawVariant,
    pub fade: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            size: DEFAULT_SIZE,
            factor: DEFAULT_FACTOR,
            population: DEFAULT_POPULATION,
            variant: DrawVariant::default(),
            fade: DEFAULT_FADE,
        }
    }
}

fn lenient<T, F>(name: &str, raw: &str, default: T, valid: F) -> T
where
    T: FromStr + Display + Copy,
    F: Fn(T) -> bool,
{
    match raw.trim().parse::<T>() {
        Ok(v) if valid(v) => v,
        _ => {
            warn!(option = name, value = raw, fallback = %default, "invalid value, using default");
            default
        }
    }
}

impl Settings {
    pub fn from_args(args: &Args) -> Self {
        let fps = lenient("--fps", &args.fps, DEFAULT_FPS, |v: f64| {
            v.is_finite() && v > 0.0 && v <= MAX_FPS
        });
        let size = lenient("--size", &args.size, DEFAULT_SIZE, |v: f32| {
            v.is_finite() && v >= 1.0
        });
        let factor = lenient("--factor", &args.factor, DEFAULT_FACTOR, |v: f64| {
            (0.0..=1.0).contains(&v)
        });
        let population = lenient(
            "--pop",
            &args.pop,
            DEFAULT_POPULATION as f64,
            |v: f64| v.is_finite() && v >= 0.0 && v <= u64::MAX as f64,
        ) as u64;
        let fade = lenient("--fade", &args.fade, DEFAULT_FADE, |v: f32| {
            v.is_finite() && v > 0.0 && v <= 1.0
        });
        let variant = match args.draw.parse::<DrawVariant>() {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "invalid --draw, using corona");
                DrawVariant::default()
            }
        };

        Self {
            fps,
            size,
            factor,
            population,
            variant,
            fade,
        }
    }
}

pub fn print_list_charsets() {
    if color_enabled_stdout() {
        println!("\x1b[1;36mAVAILABLE CHARSET PRESETS:\x1b[0m");
    } else {
        println!("AVAILABLE CHARSET PRESETS:");
    }
    println!();
    println!("VALUE        DESCRIPTION");
    for (name, desc) in CHARSET_LISTING {
        println!("{:<12} {}", name, desc);
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["contagion-rain"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn defaults_match_documented_values() {
        let s = Settings::from_args(&args(&[]));
        assert_eq!(s, Settings::default());
        assert_eq!(s.population, 7_780_000_000);
        assert_eq!(s.fps, 25.0);
        assert_eq!(s.size, 14.0);
        assert_eq!(s.factor, 0.996);
        assert_eq!(s.variant, DrawVariant::Corona);
    }

    #[test]
    fn garbage_values_fall_back_to_defaults() {
        let s = Settings::from_args(&args(&[
            "--fps", "fast", "--size=-3", "--factor", "2", "--pop", "lots", "--draw", "matrix",
            "--fade", "0",
        ]));
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn valid_values_are_applied() {
        let s = Settings::from_args(&args(&[
            "--fps", "60", "--size", "10", "--factor", "0.5", "--pop", "100", "--draw", "pixel",
        ]));
        assert_eq!(s.fps, 60.0);
        assert_eq!(s.size, 10.0);
        assert_eq!(s.factor, 0.5);
        assert_eq!(s.population, 100);
        assert_eq!(s.variant, DrawVariant::Pixel);
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn fallback_is_reported_as_a_warning() {
        let out = Captured::default();
        let writer = out.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .with_writer(move || writer.clone())
            .finish();

        let s = tracing::subscriber::with_default(subscriber, || {
            Settings::from_args(&args(&["--fps", "fast"]))
        });

        assert_eq!(s.fps, DEFAULT_FPS);
        let text = String::from_utf8(out.0.lock().unwrap().clone()).unwrap();
        assert!(text.contains("WARN"), "{}", text);
        assert!(text.contains("--fps"), "{}", text);
        assert!(text.contains("fast"), "{}", text);
    }

    #[test]
    fn fps_above_host_rate_falls_back() {
        assert_eq!(Settings::from_args(&args(&["--fps", "120"])).fps, DEFAULT_FPS);
        assert_eq!(Settings::from_args(&args(&["--fps", "60"])).fps, MAX_FPS);
    }

    #[test]
    fn exponent_population_is_accepted() {
        let s = Settings::from_args(&args(&["--pop", "1e3"]));
        assert_eq!(s.population, 1000);
    }
}

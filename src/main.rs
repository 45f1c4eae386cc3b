// Copyright (c) 2026 rezky_nightky

mod cell;
mod charset;
mod column;
mod config;
mod error;
mod frame;
mod palette;
mod queue;
mod rain;
mod runtime;
mod scheduler;
mod stats;
mod surface;
mod terminal;

use std::env;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::thread;

use clap::builder::styling::{AnsiColor as ClapAnsiColor, Color as ClapColor};
use clap::builder::styling::{Effects as ClapEffects, Style as ClapStyle};
use clap::builder::Styles as ClapStyles;
use clap::{CommandFactory, FromArgMatches};
use crossterm::event::{Event, KeyCode, KeyEventKind};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, info, subscriber::DefaultGuard, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::charset::{build_chars, charset_from_str, Glyphs, Icons};
use crate::config::{
    color_enabled_stdout, default_params_usage_for_help, print_list_charsets, Args, Settings,
    MAX_FPS,
};
use crate::error::Error;
use crate::frame::Frame;
use crate::rain::Rain;
use crate::runtime::ColorMode;
use crate::stats::StatsFeed;
use crate::surface::Surface;
use crate::terminal::{restore_terminal_best_effort, Terminal};

const HELP_TEMPLATE_PLAIN: &str = "\
{before-help}{about-with-newline}
USAGE:
  {usage}

{all-args}{after-help}";

const HELP_TEMPLATE_COLOR: &str = "\
{before-help}{about-with-newline}
\x1b[1;36mUSAGE:\x1b[0m
  {usage}

{all-args}{after-help}";

const LOG_ENV: &str = "CONTAGION_RAIN_LOG";

/// Host refresh rate; the rain's own scheduler decides which of these tick.
/// Rounded up so a rain at `MAX_FPS` ticks on every host frame.
const HOST_PERIOD: Duration = Duration::from_micros((1_000_000.0 / MAX_FPS) as u64 + 1);
const STATS_REFRESH: Duration = Duration::from_secs(60);

fn build_info() -> &'static str {
    env!("CONTAGION_RAIN_BUILD")
}

fn clap_styles() -> ClapStyles {
    ClapStyles::styled()
        .header(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Cyan))),
        )
        .usage(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Green))),
        )
        .literal(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Yellow))))
        .placeholder(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Magenta))))
}

fn log_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default))
}

/// Diagnostics go to `log_file` for the whole run. Without one, a stderr
/// logger is installed for startup only and returned as a guard; drop it
/// before the terminal takes over the screen.
fn init_logging(log_file: Option<&Path>) -> Result<Option<DefaultGuard>, Error> {
    let Some(path) = log_file else {
        let guard = tracing_subscriber::registry()
            .with(log_filter("warn"))
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .set_default();
        return Ok(Some(guard));
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| Error::Log {
            path: path.to_path_buf(),
            source,
        })?;

    tracing_subscriber::registry()
        .with(log_filter("info"))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
    Ok(None)
}

fn default_to_ascii() -> bool {
    let lang = env::var("LANG").unwrap_or_default();
    !lang.to_ascii_uppercase().contains("UTF")
}

fn detect_color_mode_auto() -> ColorMode {
    let colorterm = env::var("COLORTERM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorMode::TrueColor;
    }

    let term = env::var("TERM").unwrap_or_default().to_ascii_lowercase();
    if term == "dumb" {
        return ColorMode::Mono;
    }
    if term.contains("256color") {
        return ColorMode::Color256;
    }

    ColorMode::Color16
}

fn detect_color_mode(args: &Args) -> ColorMode {
    match args.colormode {
        Some(0) => ColorMode::Mono,
        Some(4) => ColorMode::Color16,
        Some(8) => ColorMode::Color256,
        Some(24) => ColorMode::TrueColor,
        Some(m) => {
            warn!(colormode = m, "invalid --colormode (allowed: 0,4,8,24), auto-detecting");
            detect_color_mode_auto()
        }
        None => detect_color_mode_auto(),
    }
}

fn new_rain(settings: &Settings, glyphs: &Glyphs, frame: &Frame, master: &mut StdRng) -> Rain {
    let rng = StdRng::seed_from_u64(master.random());
    Rain::new(settings, glyphs.clone(), frame.width(), frame.height(), rng)
}

fn main() -> Result<(), Error> {
    std::panic::set_hook(Box::new(|info| {
        restore_terminal_best_effort();
        eprintln!("{}", info);
    }));

    #[cfg(unix)]
    {
        if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            thread::spawn(move || {
                if let Some(sig) = signals.forever().next() {
                    restore_terminal_best_effort();
                    std::process::exit(128 + sig);
                }
            });
        }
    }

    #[cfg(windows)]
    {
        if let Err(e) = ctrlc::set_handler(|| {
            restore_terminal_best_effort();
            std::process::exit(130);
        }) {
            eprintln!("failed to install Ctrl-C handler: {}", e);
        }
    }

    let mut cmd = Args::command();
    cmd = cmd.styles(clap_styles());
    cmd = cmd.before_help(default_params_usage_for_help());
    let help_template = if color_enabled_stdout() {
        HELP_TEMPLATE_COLOR
    } else {
        HELP_TEMPLATE_PLAIN
    };
    cmd = cmd.help_template(help_template);
    cmd.build();

    if cmd.get_arguments().any(|a| a.get_id().as_str() == "help") {
        cmd = cmd.mut_arg("help", |a| a.help_heading("HELP"));
    }
    cmd.build();

    let matches = cmd.get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    if args.list_charsets {
        print_list_charsets();
        return Ok(());
    }

    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if args.info {
        println!("Version: v{}", env!("CARGO_PKG_VERSION"));
        println!("Build: {}", build_info());
        println!("Copyright: (c) 2026 {}", env!("CARGO_PKG_AUTHORS"));
        println!("License: {}", env!("CARGO_PKG_LICENSE"));
        return Ok(());
    }

    let startup_log = init_logging(args.log_file.as_deref())?;

    let settings = Settings::from_args(&args);
    let def_ascii = default_to_ascii();
    let color_mode = detect_color_mode(&args);

    let charset = charset_from_str(&args.charset, def_ascii).unwrap_or_else(|e| {
        warn!(error = %e, "unknown --charset, using auto");
        charset::Charset::NONE
    });
    let glyphs = Glyphs::new(build_chars(charset, def_ascii), Icons::for_locale(def_ascii));

    let mut stats = StatsFeed::from_path(args.stats.as_deref(), settings.population);

    let mut master = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    info!(?settings, ?color_mode, "starting");
    drop(startup_log);

    let mut term = Terminal::new(color_mode).map_err(Error::SurfaceUnavailable)?;
    let (w, h) = term.size()?;
    let mut frame = Frame::for_terminal(w, h, settings.size);
    let mut rain = new_rain(&settings, &glyphs, &frame, &mut master);
    rain.start();
    info!(
        variant = ?rain.variant(),
        factor = rain.factor(),
        slots = frame.width,
        rows = frame.height,
        glyph_size = frame.glyph_size(),
        "rain ready"
    );

    let start_time = Instant::now();
    let end_time = args
        .duration
        .filter(|s| s.is_finite() && *s > 0.0)
        .map(|s| start_time + Duration::from_secs_f64(s.min(86_400.0)));
    let mut next_refresh = start_time + STATS_REFRESH;
    let mut next_frame = start_time;
    let mut quit = false;

    while !quit {
        let now = Instant::now();
        if end_time.is_some_and(|end| now >= end) {
            debug!("duration elapsed");
            break;
        }

        let mut pending_resize: Option<(u16, u16)> = None;
        let timeout = next_frame.saturating_duration_since(now);
        if Terminal::poll_event(timeout)? {
            while Terminal::poll_event(Duration::from_millis(0))? {
                match Terminal::read_event()? {
                    Event::Resize(nw, nh) => pending_resize = Some((nw, nh)),
                    Event::Key(k) if k.kind == KeyEventKind::Press => {
                        if args.screensaver {
                            quit = true;
                            break;
                        }
                        match k.code {
                            KeyCode::Esc | KeyCode::Char('q') => quit = true,
                            KeyCode::Char('p') | KeyCode::Char(' ') => rain.toggle(),
                            KeyCode::Char('r') => {
                                stats.refresh();
                            }
                            _ => {}
                        }
                    }
                    _ => {}
                }
            }
        }
        if quit {
            break;
        }

        if let Some((nw, nh)) = pending_resize {
            let running = rain.is_running();
            frame = Frame::for_terminal(nw, nh, settings.size);
            rain = new_rain(&settings, &glyphs, &frame, &mut master);
            if running {
                rain.start();
            }
            debug!(cols = nw, rows = nh, "viewport resized");
        }

        let now = Instant::now();
        if now >= next_refresh {
            stats.refresh();
            next_refresh = now + STATS_REFRESH;
        }

        if now < next_frame {
            continue;
        }
        let ts_ms = next_frame.duration_since(start_time).as_secs_f64() * 1000.0;
        rain.on_frame(ts_ms, &stats, &mut frame);
        if frame.is_dirty_all() || !frame.dirty_indices().is_empty() {
            term.draw(&mut frame)?;
        }

        next_frame += HOST_PERIOD;
        if now > next_frame {
            next_frame = now;
        }
    }

    info!(elapsed_s = start_time.elapsed().as_secs_f64(), "exiting");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_warnings_are_reported_without_a_log_file() {
        let guard = init_logging(None).unwrap();
        assert!(guard.is_some());
        assert!(tracing::enabled!(tracing::Level::WARN));
        assert!(!tracing::enabled!(tracing::Level::DEBUG));
    }

    #[test]
    fn host_frames_keep_up_with_the_fastest_rain() {
        let mut s = scheduler::Scheduler::new(MAX_FPS);
        s.start();
        let step = HOST_PERIOD.as_secs_f64() * 1000.0;
        let ticks = (1..=120)
            .filter(|&n| s.on_frame(n as f64 * step) == scheduler::FrameOutcome::Tick)
            .count();
        assert_eq!(ticks, 120);
    }
}

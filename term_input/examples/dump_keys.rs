// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words SIGWINCH SIGTERM termios

//! Print every key event decoded from the terminal. Press `q` to quit.
//!
//! ```text
//! cargo run --example dump_keys -- --esc-timeout-ms 50 --log-file /tmp/dump_keys.log
//! ```

use clap::Parser;
use miette::{Context, IntoDiagnostic};
use r3bl_term_input::{Continuation, InputConfig, InputEngine, KeyCode, KeyMap,
                      MOUSE_DISABLE_BUTTON_MOTION, MOUSE_DISABLE_SGR,
                      MOUSE_DISABLE_URXVT, MOUSE_DISABLE_X11, MOUSE_ENABLE_BUTTON_MOTION,
                      MOUSE_ENABLE_SGR, MOUSE_ENABLE_URXVT, MOUSE_ENABLE_X11, MatchPolicy,
                      MouseMode, SignalMonitor, TracingConfig, Utf8Mode,
                      setup_default_miette_global_report_handler};
use rustix::termios::{self, OptionalActions, Termios};
use signal_hook::consts::{SIGTERM, SIGWINCH};
use std::{cell::Cell,
          fs::File,
          io::Write,
          os::fd::OwnedFd,
          path::PathBuf,
          rc::Rc,
          time::Duration};

const ISSUES_URL: &str = "https://github.com/r3bl-org/r3bl-open-core/issues/new";

/// More info: <https://docs.rs/clap/latest/clap/_derive/_tutorial/chapter_2/index.html>
#[derive(Debug, Parser)]
#[command(bin_name = "dump_keys")]
#[command(about = "Print the key events decoded from raw terminal input")]
#[command(next_line_help = true)]
struct CLIArgs {
    /// JSON file with an input config. Flags below override its values.
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// How long a lone ESC waits for the rest of a sequence.
    #[arg(long, short = 't')]
    esc_timeout_ms: Option<u64>,

    /// How overlapping key map entries are resolved: `LongestMatch` or `FirstMatch`.
    #[arg(long, short = 'm')]
    match_policy: Option<MatchPolicy>,

    /// Don't turn on mouse reporting, and decode mouse reports as plain keys.
    #[arg(long)]
    no_mouse: bool,

    /// Treat bytes above 0x7F as Latin-1 instead of UTF-8.
    #[arg(long)]
    no_utf8: bool,

    /// Write debug logs to this file.
    #[arg(long, short = 'l')]
    log_file: Option<String>,
}

impl CLIArgs {
    fn input_config(&self) -> miette::Result<InputConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .into_diagnostic()
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                InputConfig::try_from_json_str(&json)?
            }
            None => InputConfig::default(),
        };
        if let Some(millis) = self.esc_timeout_ms {
            config = config.with_esc_timeout(Duration::from_millis(millis));
        }
        if let Some(match_policy) = self.match_policy {
            config = config.with_match_policy(match_policy);
        }
        if self.no_mouse {
            config = config.with_mouse(MouseMode::Disabled);
        }
        if self.no_utf8 {
            config = config.with_utf8(Utf8Mode::Disabled);
        }
        Ok(config)
    }
}

/// The controlling terminal in raw mode. Restores the original settings (and turns
/// mouse reporting back off) when dropped.
struct RawTerminal {
    tty: File,
    original: Termios,
    mouse: bool,
}

impl RawTerminal {
    fn enable(mouse: bool) -> miette::Result<Self> {
        let tty = File::options()
            .read(true)
            .write(true)
            .open("/dev/tty")
            .into_diagnostic()
            .context("failed to open /dev/tty")?;

        let original = termios::tcgetattr(&tty)
            .into_diagnostic()
            .context("failed to retrieve terminal attributes")?;
        let mut raw = original.clone();
        raw.make_raw();
        termios::tcsetattr(&tty, OptionalActions::Now, &raw)
            .into_diagnostic()
            .context("failed to set terminal attributes")?;

        let mut it = Self {
            tty,
            original,
            mouse,
        };
        if mouse {
            for sequence in [
                MOUSE_ENABLE_X11,
                MOUSE_ENABLE_BUTTON_MOTION,
                MOUSE_ENABLE_SGR,
                MOUSE_ENABLE_URXVT,
            ] {
                it.write(sequence)?;
            }
        }
        Ok(it)
    }

    fn write(&mut self, text: &str) -> miette::Result<()> {
        self.tty.write_all(text.as_bytes()).into_diagnostic()?;
        self.tty.flush().into_diagnostic()
    }

    /// Raw mode turns off output post-processing, so lines end in `\r\n`.
    fn println(&mut self, line: &str) -> miette::Result<()> {
        self.write(line)?;
        self.write("\r\n")
    }
}

impl Drop for RawTerminal {
    fn drop(&mut self) {
        if self.mouse {
            for sequence in [
                MOUSE_DISABLE_URXVT,
                MOUSE_DISABLE_SGR,
                MOUSE_DISABLE_BUTTON_MOTION,
                MOUSE_DISABLE_X11,
            ] {
                let _unused = self.tty.write_all(sequence.as_bytes());
            }
        }
        if let Err(error) = termios::tcsetattr(&self.tty, OptionalActions::Now, &self.original)
        {
            tracing::error!(message = "dump_keys: failed to restore terminal", error = %error);
        }
    }
}

fn main() -> miette::Result<()> {
    setup_default_miette_global_report_handler(ISSUES_URL);
    let cli_args = CLIArgs::parse();
    if let Some(log_file) = &cli_args.log_file {
        TracingConfig::new_file(Some(log_file.clone())).install_global()?;
    }
    let config = cli_args.input_config()?;
    tracing::debug!(message = "dump_keys: starting", config = ?config);

    let mut terminal = RawTerminal::enable(config.mouse == MouseMode::Enabled)?;

    // A separate open file description, so non-blocking reads don't affect the writes
    // to `terminal`.
    let keyboard: OwnedFd = File::open("/dev/tty")
        .into_diagnostic()
        .context("failed to open /dev/tty for reading")?
        .into();
    let mut engine = InputEngine::new(keyboard, KeyMap::xterm(), config)?;

    let resizes = Rc::new(Cell::new(0_u32));
    let resizes_clone = Rc::clone(&resizes);
    let signals = SignalMonitor::new(&[SIGWINCH, SIGTERM], move |signals, control| {
        for &signal in signals {
            match signal {
                SIGWINCH => resizes_clone.set(resizes_clone.get() + 1),
                _ => control.stop(),
            }
        }
        Continuation::Continue
    })?;
    engine.event_loop_mut().register(Box::new(signals))?;

    terminal.println("Press keys to see their events. `q` quits.")?;

    'dispatch: loop {
        engine.run_once(None)?;

        if resizes.take() > 0 {
            terminal.println("(terminal resized)")?;
        }
        for event in engine.drain_events() {
            terminal.println(&format!("{:<24} {event:?}", event.to_string()))?;
            if event.code == KeyCode::Char('q') && event.modifiers.is_empty() {
                break 'dispatch;
            }
        }
        for discard in engine.drain_discards() {
            terminal.println(&format!("discarded: {discard}"))?;
        }
        if engine.is_input_closed() || engine.event_loop_mut().take_stop_request() {
            break;
        }
    }

    drop(terminal);
    println!("Goodbye.");
    Ok(())
}

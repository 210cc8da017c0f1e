mod gamepad;
mod lcd;
mod platform;
mod songs;
mod storage;

use anyhow::{Context, Result};
use chiptune_core::{channel, Player};
use crossterm::terminal;
use directories::ProjectDirs;
use gamepad::Buttons;
use lcd::Lcd;
use log::LevelFilter;
use platform::AudioOutput;
use simplelog::{CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, WriteLogger};
use songs::Library;
use std::fs::{create_dir_all, File};
use storage::FileStorage;

const LOG_FILE: &str = "chiptune-player.log";

fn main() -> Result<()> {
    init_logging()?;

    terminal::enable_raw_mode().context("failed to put the terminal into raw mode")?;
    let _raw_mode_guard = RawModeGuard;

    let storage = FileStorage::new();
    let settings = storage.as_ref().map(|s| s.load_settings()).unwrap_or_default();

    let mut library = Library::at(settings.last_song_index);
    let mut lcd = Lcd::new();
    let mut gamepad = gamepad::Gamepad::new();

    let (producer, pump) = channel();
    let mut player = Player::new(producer);
    let _audio = AudioOutput::start(pump).context("failed to start audio output")?;

    player.load(library.current().data);
    lcd.set_title(library.current().name);
    lcd.set_status("Stopped");
    render(&lcd);

    loop {
        player.process_frame();

        // Start and Select take priority over a simultaneous direction
        // press, matching the source's `if / else if` dispatch chain.
        let buttons = gamepad.poll();
        if buttons.contains(Buttons::START) {
            if player.state() != chiptune_core::PlayState::Playing {
                player.play();
                lcd.set_status("Playing");
            } else {
                player.pause();
                lcd.set_status("Paused");
            }
        } else if buttons.contains(Buttons::SELECT) {
            player.stop();
            lcd.set_status("Stopped");
        } else if buttons.contains(Buttons::LEFT) || buttons.contains(Buttons::RIGHT) {
            let was_playing = player.state() == chiptune_core::PlayState::Playing;
            player.stop();
            let song = if buttons.contains(Buttons::LEFT) {
                library.prev()
            } else {
                library.next()
            };
            player.load(song.data);
            lcd.set_title(song.name);
            if was_playing {
                player.play();
                lcd.set_status("Playing");
            } else {
                lcd.set_status("Stopped");
            }
            if let Some(storage) = &storage {
                let _ = storage.save_settings(&storage::Settings {
                    last_song_index: library.index(),
                    volume_trim: settings.volume_trim,
                });
            }
        }

        render(&lcd);
        player.wait_vblank();
    }
}

/// Terminal logging alone isn't enough here: the main loop clears and
/// redraws the whole screen every frame (see [`render`]), so any line a
/// `TermLogger` prints is wiped out well before a user could read it. A
/// `WriteLogger` under the platform config directory gives diagnostics (an
/// audio device dropping out, a failed settings save) somewhere durable to
/// land; `TermLogger` is kept alongside it for the brief window before raw
/// mode and the redraw loop take over the screen.
fn init_logging() -> Result<()> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(LevelFilter::Info, Config::default(), TerminalMode::Mixed)];

    if let Some(dirs) = ProjectDirs::from("", "", "chiptune-player") {
        if create_dir_all(dirs.config_dir()).is_ok() {
            if let Ok(file) = File::create(dirs.config_dir().join(LOG_FILE)) {
                loggers.push(WriteLogger::new(LevelFilter::Debug, Config::default(), file));
            }
        }
    }

    CombinedLogger::init(loggers).context("failed to install combined logger")
}

fn render(lcd: &Lcd) {
    print!("\x1B[2J\x1B[H{}\n", lcd.render());
}

/// Restores the terminal's normal line-buffered mode on drop, regardless of
/// how `main` exits.
struct RawModeGuard;

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

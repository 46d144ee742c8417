//! versekeys - Play a poem on your MIDI keyboard.
//!
//! Loads a text, connects to a MIDI input device and speaks the next word of
//! the text on every key press, pitched by the note number.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use crossbeam_channel::RecvTimeoutError;
use std::collections::VecDeque;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use versekeys_core::{
    note_name, DevicePrompt, Effect, MidiSessionManager, Notice, Presenter, Session, SpeechSink,
    MELODIES,
};

mod config;
mod speech;

use config::Config;
use speech::{NullSpeech, TtsSpeech};

/// How often the port list is re-enumerated for hot-plug detection
const HOTPLUG_POLL: Duration = Duration::from_millis(500);

#[derive(Parser)]
#[command(name = "versekeys")]
#[command(author, version, about = "Play a poem on your MIDI keyboard", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Poem file to perform
    text_file: Option<PathBuf>,

    /// Inline poem text (overrides the file)
    #[arg(short, long)]
    text: Option<String>,

    /// Config file path (default: ~/.config/versekeys/config.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// Preferred MIDI device (name substring, skips the selection prompt)
    #[arg(short, long)]
    device: Option<String>,

    /// Disable speech output (display only)
    #[arg(long)]
    mute: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a default configuration file
    Init,
    /// Show the configuration file path
    ConfigPath,
    /// List available MIDI input devices
    ListDevices,
    /// List the built-in reference melodies
    Melodies,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Init) => {
            let path = Config::create_default_config_file()?;
            println!("Created default config at: {}", path.display());
            return Ok(());
        }
        Some(Commands::ConfigPath) => {
            let path = Config::config_path()?;
            println!("{}", path.display());
            return Ok(());
        }
        Some(Commands::ListDevices) => return list_devices(),
        Some(Commands::Melodies) => {
            print_melodies();
            return Ok(());
        }
        None => {}
    }

    // Load config
    let mut config = if let Some(path) = &cli.config {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)?
    } else {
        Config::load_or_default()
    };

    // Apply CLI overrides
    if cli.device.is_some() {
        config.midi.device = cli.device.clone();
    }

    let text = load_text(&cli)?;

    run(config, &text, cli.mute)
}

fn list_devices() -> Result<()> {
    let (manager, _notes) = MidiSessionManager::new("versekeys-probe");
    let devices = manager.list_devices()?;
    if devices.is_empty() {
        println!("No MIDI input devices found");
    } else {
        println!("Available MIDI input devices:");
        for device in devices {
            println!("  {}. {}", device.port_index + 1, device.name);
        }
    }
    Ok(())
}

fn print_melodies() {
    println!("Built-in reference melodies:");
    for melody in MELODIES {
        println!("  {:<12} {}", melody.key, melody.name);
        let notes: Vec<String> = melody.notes.iter().map(|&n| note_name(n)).collect();
        println!("  {:<12} {}", "", notes.join(" "));
    }
}

fn load_text(cli: &Cli) -> Result<String> {
    if let Some(text) = &cli.text {
        return Ok(text.clone());
    }
    if let Some(path) = &cli.text_file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("failed to read poem file {}", path.display()));
    }
    bail!("no text given; pass a poem file or use --text");
}

fn run(config: Config, text: &str, mute: bool) -> Result<()> {
    let speech: Box<dyn SpeechSink> = if mute {
        Box::new(NullSpeech)
    } else {
        match TtsSpeech::new(&config.speech) {
            Ok(tts) => Box::new(tts),
            Err(e) => {
                log::warn!("speech disabled: {}", e);
                eprintln!("Speech engine unavailable, continuing in display-only mode");
                Box::new(NullSpeech)
            }
        }
    };

    let mut session = Session::new(speech, StdoutPresenter);
    session.set_text(text);
    println!("Loaded {} words", session.word_count());

    let (mut manager, notes) = MidiSessionManager::new(&config.midi.client_name);
    let mut prompt = SelectionPrompt {
        preferred: config.midi.device.clone(),
    };

    let effects = manager.discover();
    apply_effects(effects, &mut manager, &mut session, &mut prompt);

    if manager.active_device().is_none() {
        println!("Waiting for a MIDI device; plug one in and it will be picked up");
    }
    println!("Press Ctrl+C to quit");

    loop {
        match notes.recv_timeout(HOTPLUG_POLL) {
            Ok(note) => session.on_note(note),
            Err(RecvTimeoutError::Timeout) => {
                let effects = manager.poll_hotplug();
                apply_effects(effects, &mut manager, &mut session, &mut prompt);
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    Ok(())
}

/// Surface effects from the session manager: notices, selection prompts and
/// status updates. Attach/Detach are already applied inside the manager.
fn apply_effects<S: SpeechSink, P: Presenter>(
    effects: Vec<Effect>,
    manager: &mut MidiSessionManager,
    session: &mut Session<S, P>,
    prompt: &mut SelectionPrompt,
) {
    let mut queue: VecDeque<Effect> = effects.into();
    while let Some(effect) = queue.pop_front() {
        match effect {
            Effect::Notify(notice) => print_notice(&notice),
            Effect::PromptSelection(names) => {
                let choice = prompt.choose(&names);
                queue.extend(manager.select(choice));
            }
            Effect::Status {
                connected,
                device_name,
            } => session.presenter_mut().midi_status(connected, &device_name),
            Effect::Attach(_) | Effect::Detach => {}
        }
    }
}

fn print_notice(notice: &Notice) {
    match notice {
        Notice::NoDevices => {
            eprintln!("No MIDI devices found. Connect your MIDI keyboard and try again.")
        }
        Notice::DiscoveryFailed(msg) => eprintln!("Error connecting to MIDI device: {}", msg),
    }
}

/// Prints each spoken word with its position, plus connection status lines.
struct StdoutPresenter;

impl Presenter for StdoutPresenter {
    fn show_word(&mut self, word: &str, index: usize, total: usize) {
        println!("  {:<24} [{}/{}]", word, index + 1, total);
    }

    fn midi_status(&mut self, connected: bool, device_name: &str) {
        if connected {
            println!("Connected: {}", device_name);
        } else {
            println!("No MIDI device connected");
        }
    }
}

/// Resolves multi-device selection: a configured device hint wins when it
/// matches exactly one port, otherwise the user picks interactively.
struct SelectionPrompt {
    preferred: Option<String>,
}

impl DevicePrompt for SelectionPrompt {
    fn choose(&mut self, device_names: &[String]) -> Option<usize> {
        if let Some(hint) = &self.preferred {
            if let Some(index) = match_device_hint(hint, device_names) {
                log::info!("device '{}' matched hint '{}'", device_names[index], hint);
                return Some(index);
            }
        }

        println!("Multiple MIDI devices found:");
        for (i, name) in device_names.iter().enumerate() {
            println!("  {}. {}", i + 1, name);
        }
        print!("Enter device number (1-{}): ", device_names.len());
        io::stdout().flush().ok();

        let mut line = String::new();
        io::stdin().read_line(&mut line).ok()?;
        let number: usize = line.trim().parse().ok()?;
        if (1..=device_names.len()).contains(&number) {
            Some(number - 1)
        } else {
            None
        }
    }
}

/// Find the single device matching the hint as a case-insensitive name
/// substring. Ambiguous hints return `None` so the user still gets a prompt.
fn match_device_hint(hint: &str, device_names: &[String]) -> Option<usize> {
    let hint_lower = hint.to_lowercase();
    let mut matches = device_names
        .iter()
        .enumerate()
        .filter(|(_, name)| name.to_lowercase().contains(&hint_lower))
        .map(|(i, _)| i);
    let first = matches.next()?;
    if matches.next().is_some() {
        log::warn!("device hint '{}' is ambiguous", hint);
        return None;
    }
    Some(first)
}

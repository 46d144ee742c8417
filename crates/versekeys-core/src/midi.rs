//! MIDI input support for versekeys.
//!
//! This module provides:
//! - Raw message parsing and note-on filtering
//! - An explicit session state machine for device discovery, selection and
//!   hot-plug handling
//! - A midir-backed manager that drives the machine against real hardware
//!
//! The state machine is pure: transitions consume an input and return the
//! new state plus a list of [`Effect`]s, so every path (multi-device
//! selection, cancelled prompts, unplugging the active device) is testable
//! without a MIDI port in sight. The manager applies `Attach`/`Detach`
//! effects itself and surfaces the rest to the caller.

#[cfg(feature = "native")]
use crate::error::{Error, Result};
#[cfg(feature = "native")]
use crossbeam_channel::{unbounded, Receiver, Sender};
#[cfg(feature = "native")]
use midir::{MidiInput, MidiInputConnection};

/// Status byte for note-on messages on channel 0 (0x90 = 144)
pub const NOTE_ON_STATUS: u8 = 0x90;

/// Status byte for note-off messages on channel 0 (0x80 = 128)
pub const NOTE_OFF_STATUS: u8 = 0x80;

/// MIDI message types parsed from raw MIDI bytes.
///
/// Only note messages are represented; everything else in the stream is
/// irrelevant to word triggering and parses to `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MidiMessage {
    /// Note on event (channel 0-15, note 0-127, velocity 1-127)
    NoteOn { channel: u8, note: u8, velocity: u8 },
    /// Note off event (channel 0-15, note 0-127)
    NoteOff { channel: u8, note: u8 },
}

impl MidiMessage {
    /// Parse raw MIDI bytes into a MidiMessage.
    ///
    /// Note-on with velocity 0 is treated as note-off per MIDI convention.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 3 {
            return None;
        }

        let status = bytes[0];
        let msg_type = status & 0xF0;
        let channel = status & 0x0F;
        let note = bytes[1];

        match msg_type {
            NOTE_ON_STATUS => {
                let velocity = bytes[2];
                if velocity == 0 {
                    Some(MidiMessage::NoteOff { channel, note })
                } else {
                    Some(MidiMessage::NoteOn {
                        channel,
                        note,
                        velocity,
                    })
                }
            }
            NOTE_OFF_STATUS => Some(MidiMessage::NoteOff { channel, note }),
            _ => None,
        }
    }
}

/// Extract the trigger note from raw MIDI bytes.
///
/// Returns `Some(note)` only for note-on with velocity > 0; every other
/// message (note-off, velocity-0 note-on, controllers, clock, anything
/// malformed) yields `None` and is silently dropped by the caller.
pub fn trigger_note(bytes: &[u8]) -> Option<u8> {
    match MidiMessage::from_bytes(bytes)? {
        MidiMessage::NoteOn { note, .. } => Some(note),
        MidiMessage::NoteOff { .. } => None,
    }
}

/// Information about a MIDI input device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiDeviceInfo {
    /// Device name (as reported by the system)
    pub name: String,
    /// Port index at enumeration time (may shift across hot-plug events;
    /// the name is the stable identity)
    pub port_index: usize,
}

/// User-visible, non-fatal conditions raised during the device lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Device discovery failed at the platform level (or the capability is
    /// unavailable entirely). Reported once, not retried.
    DiscoveryFailed(String),
    /// Discovery succeeded but found zero input devices.
    NoDevices,
}

/// Side effects requested by a state transition.
///
/// `Attach`/`Detach` are consumed by [`MidiSessionManager`]; the rest are
/// surfaced to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Activate this device's listener. Always preceded by `Detach` when a
    /// listener was active, so device changes never double-dispatch.
    Attach(MidiDeviceInfo),
    /// Deactivate the current listener, if any.
    Detach,
    /// Report a non-fatal condition to the user.
    Notify(Notice),
    /// Ask the user to pick one of several devices by name.
    PromptSelection(Vec<String>),
    /// Report the connection status for display.
    Status { connected: bool, device_name: String },
}

/// Session states for the MIDI input lifecycle.
///
/// `Disconnected → Discovering → (Disconnected | AwaitingSelection |
/// Connected) → Disconnected`. A zero-device discovery collapses straight
/// back to `Disconnected` after the notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No device access requested, or a previous attempt ended.
    Disconnected,
    /// Device enumeration in flight.
    Discovering,
    /// Several devices found; waiting for the user to pick one.
    AwaitingSelection { devices: Vec<MidiDeviceInfo> },
    /// Listener active on exactly one device.
    Connected { device: MidiDeviceInfo },
}

impl SessionState {
    /// Start device discovery.
    ///
    /// Valid from any state; a currently connected device is detached first
    /// so at most one listener ever exists.
    pub fn begin_discovery(self) -> (Self, Vec<Effect>) {
        let mut effects = Vec::new();
        if matches!(self, SessionState::Connected { .. }) {
            effects.push(Effect::Detach);
        }
        (SessionState::Discovering, effects)
    }

    /// Discovery failed: report once and return to `Disconnected`.
    pub fn discovery_failed(self, reason: String) -> (Self, Vec<Effect>) {
        (
            SessionState::Disconnected,
            vec![Effect::Notify(Notice::DiscoveryFailed(reason))],
        )
    }

    /// Discovery finished with the enumerated input devices.
    ///
    /// Zero devices reports a notice and disconnects; exactly one device
    /// auto-connects; several devices wait for a selection.
    pub fn discovery_complete(self, devices: Vec<MidiDeviceInfo>) -> (Self, Vec<Effect>) {
        match devices.len() {
            0 => (
                SessionState::Disconnected,
                vec![Effect::Notify(Notice::NoDevices)],
            ),
            1 => {
                let device = devices.into_iter().next().unwrap();
                let effects = vec![
                    Effect::Attach(device.clone()),
                    Effect::Status {
                        connected: true,
                        device_name: device.name.clone(),
                    },
                ];
                (SessionState::Connected { device }, effects)
            }
            _ => {
                let names = devices.iter().map(|d| d.name.clone()).collect();
                (
                    SessionState::AwaitingSelection { devices },
                    vec![Effect::PromptSelection(names)],
                )
            }
        }
    }

    /// Resolve a pending multi-device selection.
    ///
    /// `choice` is a 0-based index into the offered device list. An invalid
    /// or cancelled selection returns to `Disconnected` without activating
    /// any listener and without surfacing an error. Ignored outside
    /// `AwaitingSelection`.
    pub fn device_selected(self, choice: Option<usize>) -> (Self, Vec<Effect>) {
        let SessionState::AwaitingSelection { devices } = self else {
            return (self, Vec::new());
        };

        match choice {
            Some(index) if index < devices.len() => {
                let device = devices.into_iter().nth(index).unwrap();
                let effects = vec![
                    Effect::Attach(device.clone()),
                    Effect::Status {
                        connected: true,
                        device_name: device.name.clone(),
                    },
                ];
                (SessionState::Connected { device }, effects)
            }
            _ => (SessionState::Disconnected, Vec::new()),
        }
    }

    /// A device appeared at runtime.
    ///
    /// Auto-promotes to `Connected` when no device is active, mirroring the
    /// single-device auto-selection policy. Ignored in every other state.
    pub fn hot_plug(self, device: MidiDeviceInfo) -> (Self, Vec<Effect>) {
        match self {
            SessionState::Disconnected => {
                let effects = vec![
                    Effect::Attach(device.clone()),
                    Effect::Status {
                        connected: true,
                        device_name: device.name.clone(),
                    },
                ];
                (SessionState::Connected { device }, effects)
            }
            other => (other, Vec::new()),
        }
    }

    /// A device disappeared at runtime.
    ///
    /// Clears the listener and disconnects when it names the active device;
    /// ignored otherwise.
    pub fn hot_unplug(self, device: &MidiDeviceInfo) -> (Self, Vec<Effect>) {
        match self {
            SessionState::Connected { device: active } if active.name == device.name => (
                SessionState::Disconnected,
                vec![
                    Effect::Detach,
                    Effect::Status {
                        connected: false,
                        device_name: String::new(),
                    },
                ],
            ),
            other => (other, Vec::new()),
        }
    }
}

/// A hot-plug change derived from comparing successive port enumerations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HotPlugEvent {
    Connected(MidiDeviceInfo),
    Disconnected(MidiDeviceInfo),
}

/// Diff two port enumerations into hot-plug events.
///
/// Devices are identified by name; port indices shift when the port list
/// changes. ALSA exposes no hot-plug callback, so the event loop polls
/// enumeration and feeds the diff into the state machine.
pub fn diff_ports(old: &[MidiDeviceInfo], new: &[MidiDeviceInfo]) -> Vec<HotPlugEvent> {
    let mut events = Vec::new();
    for device in old {
        if !new.iter().any(|d| d.name == device.name) {
            events.push(HotPlugEvent::Disconnected(device.clone()));
        }
    }
    for device in new {
        if !old.iter().any(|d| d.name == device.name) {
            events.push(HotPlugEvent::Connected(device.clone()));
        }
    }
    events
}

/// MIDI session manager.
///
/// Owns the lifecycle of exactly one active input device: discovery,
/// selection, hot-plug and message filtering. Parsed note-on triggers are
/// forwarded over a channel; everything else in the raw stream is dropped
/// inside the port callback.
#[cfg(feature = "native")]
pub struct MidiSessionManager {
    /// Client name reported to the MIDI backend
    client_name: String,
    /// Channel feeding trigger notes to the event loop
    note_tx: Sender<u8>,
    /// Active connection (kept alive; dropping it detaches the listener)
    connection: Option<MidiInputConnection<()>>,
    /// Lifecycle state
    state: SessionState,
    /// Port list from the most recent enumeration, for hot-plug diffing
    known_ports: Vec<MidiDeviceInfo>,
}

#[cfg(feature = "native")]
impl MidiSessionManager {
    /// Create a new manager and the receiver carrying trigger note numbers.
    pub fn new(client_name: &str) -> (Self, Receiver<u8>) {
        let (tx, rx) = unbounded();
        (
            Self {
                client_name: client_name.to_string(),
                note_tx: tx,
                connection: None,
                state: SessionState::Disconnected,
                known_ports: Vec::new(),
            },
            rx,
        )
    }

    /// Current lifecycle state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The active device, if any.
    pub fn active_device(&self) -> Option<&MidiDeviceInfo> {
        match &self.state {
            SessionState::Connected { device } => Some(device),
            _ => None,
        }
    }

    /// Enumerate available MIDI input ports.
    pub fn list_devices(&self) -> Result<Vec<MidiDeviceInfo>> {
        let midi_in = MidiInput::new(&format!("{}-probe", self.client_name))
            .map_err(|e| Error::Midi(format!("failed to create MIDI input: {}", e)))?;

        let ports = midi_in.ports();
        let mut devices = Vec::new();
        for (index, port) in ports.iter().enumerate() {
            let name = midi_in
                .port_name(port)
                .unwrap_or_else(|_| format!("Unknown Device {}", index));
            devices.push(MidiDeviceInfo {
                name,
                port_index: index,
            });
        }
        Ok(devices)
    }

    /// Run device discovery and return the surface effects.
    ///
    /// Enumeration failure is folded into the state machine as a
    /// `discovery_failed` input, so the session ends `Disconnected` with a
    /// single notice rather than an error.
    pub fn discover(&mut self) -> Vec<Effect> {
        let (state, mut effects) = std::mem::replace(&mut self.state, SessionState::Disconnected)
            .begin_discovery();
        self.state = state;

        match self.list_devices() {
            Ok(devices) => {
                self.known_ports = devices.clone();
                let (state, more) = std::mem::replace(&mut self.state, SessionState::Disconnected)
                    .discovery_complete(devices);
                self.state = state;
                effects.extend(more);
            }
            Err(e) => {
                let (state, more) = std::mem::replace(&mut self.state, SessionState::Disconnected)
                    .discovery_failed(e.to_string());
                self.state = state;
                effects.extend(more);
            }
        }

        self.apply(effects)
    }

    /// Resolve a pending multi-device selection (0-based index, `None` on
    /// cancel) and return the surface effects.
    pub fn select(&mut self, choice: Option<usize>) -> Vec<Effect> {
        let (state, effects) = std::mem::replace(&mut self.state, SessionState::Disconnected)
            .device_selected(choice);
        self.state = state;
        self.apply(effects)
    }

    /// Re-enumerate ports, diff against the last known set and feed any
    /// hot-plug changes into the state machine. Returns the surface effects.
    pub fn poll_hotplug(&mut self) -> Vec<Effect> {
        let current = match self.list_devices() {
            Ok(devices) => devices,
            Err(e) => {
                log::debug!("hot-plug poll failed: {}", e);
                return Vec::new();
            }
        };

        let changes = diff_ports(&self.known_ports, &current);
        self.known_ports = current;

        let mut effects = Vec::new();
        for change in changes {
            let state = std::mem::replace(&mut self.state, SessionState::Disconnected);
            let (state, more) = match change {
                HotPlugEvent::Disconnected(device) => {
                    let result = state.hot_unplug(&device);
                    if matches!(result.0, SessionState::Disconnected)
                        && result.1.contains(&Effect::Detach)
                    {
                        log::info!("MIDI device unplugged: {}", device.name);
                    }
                    result
                }
                HotPlugEvent::Connected(device) => {
                    log::debug!("MIDI device appeared: {}", device.name);
                    state.hot_plug(device)
                }
            };
            self.state = state;
            effects.extend(more);
        }

        self.apply(effects)
    }

    /// Apply `Attach`/`Detach` effects, passing the rest through.
    ///
    /// `Detach` is always applied before a subsequent `Attach`, so device
    /// changes are atomic with respect to listener attachment. An attach
    /// failure downgrades to a discovery-failed notice and leaves the
    /// session `Disconnected`.
    fn apply(&mut self, effects: Vec<Effect>) -> Vec<Effect> {
        let mut surfaced = Vec::new();
        for effect in effects {
            match effect {
                Effect::Detach => self.detach(),
                Effect::Attach(device) => {
                    if let Err(e) = self.attach(&device) {
                        log::warn!("failed to attach MIDI device {}: {}", device.name, e);
                        self.state = SessionState::Disconnected;
                        surfaced.push(Effect::Notify(Notice::DiscoveryFailed(e.to_string())));
                        // Drop the queued Status effect for this attach
                        return surfaced;
                    }
                }
                other => surfaced.push(other),
            }
        }
        surfaced
    }

    /// Open the device's port and install the parse-and-forward callback.
    fn attach(&mut self, device: &MidiDeviceInfo) -> Result<()> {
        // Old listener goes first; never two at once
        self.detach();

        let midi_in = MidiInput::new(&self.client_name)
            .map_err(|e| Error::Midi(format!("failed to create MIDI input: {}", e)))?;

        let ports = midi_in.ports();
        // Resolve by name first; indices shift across hot-plug events
        let port = ports
            .iter()
            .find(|p| midi_in.port_name(p).map(|n| n == device.name).unwrap_or(false))
            .or_else(|| ports.get(device.port_index))
            .ok_or_else(|| Error::DeviceNotFound(device.name.clone()))?;

        let tx = self.note_tx.clone();
        let connection = midi_in
            .connect(
                port,
                "versekeys-input",
                move |timestamp, bytes, _| {
                    log::debug!("[MIDI RAW] timestamp={} bytes={:?}", timestamp, bytes);
                    if let Some(note) = trigger_note(bytes) {
                        let _ = tx.send(note);
                    }
                },
                (),
            )
            .map_err(|e| Error::Midi(format!("failed to connect to MIDI device: {}", e)))?;

        self.connection = Some(connection);
        log::info!("connected to MIDI device: {}", device.name);
        Ok(())
    }

    /// Drop the active connection, if any.
    fn detach(&mut self) {
        if self.connection.take().is_some() {
            log::debug!("MIDI listener detached");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(name: &str, index: usize) -> MidiDeviceInfo {
        MidiDeviceInfo {
            name: name.to_string(),
            port_index: index,
        }
    }

    #[test]
    fn test_parse_note_on() {
        let msg = MidiMessage::from_bytes(&[0x90, 60, 100]).unwrap();
        assert_eq!(
            msg,
            MidiMessage::NoteOn {
                channel: 0,
                note: 60,
                velocity: 100
            }
        );
    }

    #[test]
    fn test_parse_note_on_velocity_zero_is_note_off() {
        let msg = MidiMessage::from_bytes(&[0x90, 60, 0]).unwrap();
        assert_eq!(
            msg,
            MidiMessage::NoteOff {
                channel: 0,
                note: 60
            }
        );
    }

    #[test]
    fn test_parse_other_status_dropped() {
        assert!(MidiMessage::from_bytes(&[0xB0, 64, 100]).is_none());
        assert!(MidiMessage::from_bytes(&[0xF8]).is_none());
        assert!(MidiMessage::from_bytes(&[]).is_none());
    }

    #[test]
    fn test_trigger_filter() {
        assert_eq!(trigger_note(&[144, 64, 100]), Some(64));
        assert_eq!(trigger_note(&[144, 64, 0]), None);
        assert_eq!(trigger_note(&[128, 64, 100]), None);
        assert_eq!(trigger_note(&[176, 64, 100]), None);
    }

    #[test]
    fn test_trigger_filter_any_channel() {
        // Note-on on channel 5 still triggers
        assert_eq!(trigger_note(&[0x95, 72, 64]), Some(72));
    }

    #[test]
    fn test_discovery_no_devices() {
        let (state, effects) = SessionState::Discovering.discovery_complete(Vec::new());
        assert_eq!(state, SessionState::Disconnected);
        assert_eq!(effects, vec![Effect::Notify(Notice::NoDevices)]);
    }

    #[test]
    fn test_discovery_single_device_auto_connects() {
        let dev = device("Keystation", 0);
        let (state, effects) = SessionState::Discovering.discovery_complete(vec![dev.clone()]);
        assert_eq!(
            state,
            SessionState::Connected {
                device: dev.clone()
            }
        );
        assert_eq!(
            effects,
            vec![
                Effect::Attach(dev),
                Effect::Status {
                    connected: true,
                    device_name: "Keystation".to_string()
                }
            ]
        );
    }

    #[test]
    fn test_discovery_multiple_devices_prompts() {
        let devices = vec![device("A", 0), device("B", 1)];
        let (state, effects) = SessionState::Discovering.discovery_complete(devices.clone());
        assert_eq!(state, SessionState::AwaitingSelection { devices });
        assert_eq!(
            effects,
            vec![Effect::PromptSelection(vec![
                "A".to_string(),
                "B".to_string()
            ])]
        );
    }

    #[test]
    fn test_discovery_failure_notifies_once() {
        let (state, effects) =
            SessionState::Discovering.discovery_failed("no backend".to_string());
        assert_eq!(state, SessionState::Disconnected);
        assert_eq!(
            effects,
            vec![Effect::Notify(Notice::DiscoveryFailed(
                "no backend".to_string()
            ))]
        );
    }

    #[test]
    fn test_valid_selection_connects() {
        let devices = vec![device("A", 0), device("B", 1)];
        let state = SessionState::AwaitingSelection { devices };
        let (state, effects) = state.device_selected(Some(1));
        assert_eq!(
            state,
            SessionState::Connected {
                device: device("B", 1)
            }
        );
        assert!(matches!(effects[0], Effect::Attach(_)));
    }

    #[test]
    fn test_invalid_selection_disconnects_silently() {
        let devices = vec![device("A", 0), device("B", 1)];
        let (state, effects) = SessionState::AwaitingSelection {
            devices: devices.clone(),
        }
        .device_selected(Some(7));
        assert_eq!(state, SessionState::Disconnected);
        assert!(effects.is_empty());

        let (state, effects) =
            SessionState::AwaitingSelection { devices }.device_selected(None);
        assert_eq!(state, SessionState::Disconnected);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_hot_plug_auto_promotes_when_idle() {
        let dev = device("LPK25", 0);
        let (state, effects) = SessionState::Disconnected.hot_plug(dev.clone());
        assert_eq!(state, SessionState::Connected { device: dev.clone() });
        assert_eq!(effects[0], Effect::Attach(dev));
    }

    #[test]
    fn test_hot_plug_ignored_while_connected() {
        let active = device("A", 0);
        let state = SessionState::Connected {
            device: active.clone(),
        };
        let (state, effects) = state.hot_plug(device("B", 1));
        assert_eq!(state, SessionState::Connected { device: active });
        assert!(effects.is_empty());
    }

    #[test]
    fn test_hot_unplug_of_active_device_disconnects() {
        let active = device("A", 0);
        let state = SessionState::Connected {
            device: active.clone(),
        };
        let (state, effects) = state.hot_unplug(&active);
        assert_eq!(state, SessionState::Disconnected);
        assert_eq!(effects[0], Effect::Detach);
        assert_eq!(
            effects[1],
            Effect::Status {
                connected: false,
                device_name: String::new()
            }
        );
    }

    #[test]
    fn test_hot_unplug_of_other_device_ignored() {
        let active = device("A", 0);
        let state = SessionState::Connected {
            device: active.clone(),
        };
        let (state, effects) = state.hot_unplug(&device("B", 1));
        assert_eq!(state, SessionState::Connected { device: active });
        assert!(effects.is_empty());
    }

    #[test]
    fn test_begin_discovery_detaches_active_listener() {
        let state = SessionState::Connected {
            device: device("A", 0),
        };
        let (state, effects) = state.begin_discovery();
        assert_eq!(state, SessionState::Discovering);
        assert_eq!(effects, vec![Effect::Detach]);

        let (state, effects) = SessionState::Disconnected.begin_discovery();
        assert_eq!(state, SessionState::Discovering);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_diff_ports() {
        let old = vec![device("A", 0), device("B", 1)];
        let new = vec![device("B", 0), device("C", 1)];
        let events = diff_ports(&old, &new);
        assert_eq!(
            events,
            vec![
                HotPlugEvent::Disconnected(device("A", 0)),
                HotPlugEvent::Connected(device("C", 1)),
            ]
        );
    }

    #[test]
    fn test_diff_ports_no_change() {
        let ports = vec![device("A", 0)];
        assert!(diff_ports(&ports, &ports).is_empty());
    }
}

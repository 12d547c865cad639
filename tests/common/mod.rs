//! Host fakes for driving the full controller.

#![allow(dead_code)]

use std::collections::VecDeque;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use heapless::String;

use meshterm::error::{Error, MeshError};
use meshterm::mesh::{Channel, Contact, MeshEngine, NodePrefs, SendReceipt};
use meshterm::radio::RadioParams;
use meshterm::storage::FlashSettingsStore;
use meshterm::text::truncated;
use meshterm::ui::input::{InputSource, KeyState};
use meshterm::ui::surface::{DisplaySurface, Ink};
use meshterm::{Clock, ScreenController};

pub type TestUi = ScreenController<FakeMesh, RecordingSurface, ScriptedInput, FlashSettingsStore, ManualClock>;

pub fn contact(name: &str) -> Contact {
    Contact {
        name: truncated(name),
        public_key: [0; 32],
    }
}

pub fn channel(slot: u8, name: &str) -> Channel {
    Channel {
        slot,
        name: truncated(name),
    }
}

/// In-memory mesh engine that records what the UI asked of it.
pub struct FakeMesh {
    pub contacts: Vec<Contact>,
    pub channels: Vec<Channel>,
    pub prefs: NodePrefs,
    pub sent_direct: Vec<(std::string::String, std::string::String)>,
    pub sent_channel: Vec<(u8, std::string::String, std::string::String)>,
    pub fail_sends: Option<MeshError>,
    pub persisted: usize,
    pub factory_resets: usize,
    pub ble_pin: u32,
}

impl FakeMesh {
    pub fn new() -> Self {
        Self {
            contacts: Vec::new(),
            channels: Vec::new(),
            prefs: NodePrefs {
                node_name: truncated("node-1"),
                radio: RadioParams::default(),
            },
            sent_direct: Vec::new(),
            sent_channel: Vec::new(),
            fail_sends: None,
            persisted: 0,
            factory_resets: 0,
            ble_pin: 0,
        }
    }

    pub fn with_contacts(mut self, names: &[&str]) -> Self {
        self.contacts = names.iter().map(|n| contact(n)).collect();
        self
    }

    pub fn with_channels(mut self, names: &[&str]) -> Self {
        self.channels = names
            .iter()
            .enumerate()
            .map(|(slot, n)| channel(slot as u8, n))
            .collect();
        self
    }
}

impl MeshEngine for FakeMesh {
    fn contact_count(&self) -> usize {
        self.contacts.len()
    }

    fn contact_at(&self, index: usize) -> Option<Contact> {
        self.contacts.get(index).cloned()
    }

    fn channel_at(&self, slot: usize) -> Option<Channel> {
        self.channels.iter().find(|c| c.slot as usize == slot).cloned()
    }

    fn send_direct_message(
        &mut self,
        contact: &Contact,
        _timestamp: u32,
        text: &str,
    ) -> Result<SendReceipt, MeshError> {
        if let Some(e) = self.fail_sends {
            return Err(e);
        }
        self.sent_direct.push((contact.name.to_string(), text.to_string()));
        Ok(SendReceipt {
            expected_ack: 0xA5A5,
            timeout_ms: 4_000,
        })
    }

    fn send_channel_message(
        &mut self,
        channel: &Channel,
        _timestamp: u32,
        sender_name: &str,
        text: &str,
    ) -> Result<(), MeshError> {
        if let Some(e) = self.fail_sends {
            return Err(e);
        }
        self.sent_channel
            .push((channel.slot, sender_name.to_string(), text.to_string()));
        Ok(())
    }

    fn remove_contact(&mut self, contact: &Contact) -> Result<(), MeshError> {
        let before = self.contacts.len();
        self.contacts.retain(|c| c.name != contact.name);
        if self.contacts.len() == before {
            Err(MeshError::UnknownTarget)
        } else {
            Ok(())
        }
    }

    fn prefs(&self) -> &NodePrefs {
        &self.prefs
    }

    fn prefs_mut(&mut self) -> &mut NodePrefs {
        &mut self.prefs
    }

    fn persist_preferences(&mut self) -> Result<(), MeshError> {
        self.persisted += 1;
        Ok(())
    }

    fn factory_reset(&mut self) -> Result<(), MeshError> {
        self.factory_resets += 1;
        self.contacts.clear();
        self.channels.clear();
        Ok(())
    }

    fn ble_pin(&self) -> u32 {
        self.ble_pin
    }

    fn share_uri(&self) -> String<160> {
        truncated("meshcore://contact/add?name=node-1")
    }
}

/// Surface that keeps the text printed in the latest frame.
#[derive(Default)]
pub struct RecordingSurface {
    pub on: bool,
    pub brightness: u8,
    pub palette: Option<(Rgb565, Rgb565)>,
    pub frames: usize,
    pub texts: Vec<std::string::String>,
    pending: Vec<std::string::String>,
    size: u8,
}

impl RecordingSurface {
    pub fn shows(&self, needle: &str) -> bool {
        self.texts.iter().any(|t| t.contains(needle))
    }
}

impl DisplaySurface for RecordingSurface {
    fn is_on(&self) -> bool {
        self.on
    }

    fn turn_on(&mut self) {
        self.on = true;
    }

    fn turn_off(&mut self) {
        self.on = false;
    }

    fn set_brightness(&mut self, level: u8) {
        self.brightness = level;
    }

    fn set_palette(&mut self, light: Rgb565, dark: Rgb565) {
        self.palette = Some((light, dark));
    }

    fn begin_frame(&mut self) {
        self.pending.clear();
        self.size = 1;
    }

    fn end_frame(&mut self) -> Result<(), Error> {
        self.frames += 1;
        self.texts = std::mem::take(&mut self.pending);
        Ok(())
    }

    fn set_color(&mut self, _ink: Ink) {}

    fn set_text_size(&mut self, size: u8) {
        self.size = size.max(1);
    }

    fn set_cursor(&mut self, _at: Point) {}

    fn draw_rect(&mut self, _rect: Rectangle) {}

    fn fill_rect(&mut self, _rect: Rectangle) {}

    fn fill_rect_rgb(&mut self, _rect: Rectangle, _color: Rgb565) {}

    fn print(&mut self, text: &str) {
        self.pending.push(text.to_string());
    }

    fn text_width(&self, text: &str) -> u32 {
        text.chars().count() as u32 * 6 * self.size as u32
    }
}

/// Keyboard replaying queued snapshots, one per `update`.
#[derive(Default)]
pub struct ScriptedInput {
    queue: VecDeque<Option<KeyState>>,
    current: Option<KeyState>,
    changed: bool,
}

impl ScriptedInput {
    pub fn press(&mut self, key: KeyState) {
        self.queue.push_back(Some(key));
    }

    pub fn release(&mut self) {
        self.queue.push_back(None);
    }
}

impl InputSource for ScriptedInput {
    fn update(&mut self) {
        match self.queue.pop_front() {
            Some(next) => {
                self.changed = next != self.current;
                self.current = next;
            }
            None => self.changed = false,
        }
    }

    fn changed(&self) -> bool {
        self.changed
    }

    fn is_pressed(&self) -> bool {
        self.current.is_some()
    }

    fn snapshot(&self) -> KeyState {
        self.current.clone().unwrap_or_default()
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ManualClock {
    pub now_ms: u64,
    pub epoch: u32,
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms
    }

    fn epoch_secs(&self) -> u32 {
        self.epoch
    }
}

pub fn build(mesh: FakeMesh) -> TestUi {
    let clock = ManualClock {
        now_ms: 1_000,
        epoch: 1_700_000_000,
    };
    let mut ui = ScreenController::new(
        mesh,
        RecordingSurface::default(),
        ScriptedInput::default(),
        FlashSettingsStore::new(),
        clock,
    );
    ui.poll();
    ui
}

pub fn advance(ui: &mut TestUi, ms: u64) {
    ui.clock_mut().now_ms += ms;
}

/// Press and release `key`, polling once for each edge.
pub fn tap(ui: &mut TestUi, key: KeyState) {
    ui.input_mut().press(key);
    ui.poll();
    ui.input_mut().release();
    ui.poll();
}

pub fn type_text(ui: &mut TestUi, text: &str) {
    for c in text.chars() {
        let key = if c == ' ' {
            KeyState::space()
        } else {
            KeyState::chars(c.encode_utf8(&mut [0; 4]))
        };
        tap(ui, key);
    }
}

pub fn up(ui: &mut TestUi) {
    tap(ui, KeyState::chars(";"));
}

pub fn down(ui: &mut TestUi) {
    tap(ui, KeyState::chars("."));
}

pub fn right(ui: &mut TestUi) {
    tap(ui, KeyState::chars("/"));
}

pub fn enter(ui: &mut TestUi) {
    tap(ui, KeyState::enter());
}

pub fn escape(ui: &mut TestUi) {
    tap(ui, KeyState::opt());
}

//! Settings menu: nested categories, modal editors and the radio wizard.
//!
//! The wizard never touches the display or the clock. It mutates its own
//! state and the mesh preferences, then reports a [`SettingsEffect`] that the
//! controller turns into notifications, theme changes or a restart.

use core::fmt::Write;

use heapless::{String, Vec};

use super::input::{Command, InputContext, Nav};
use super::list::{Focus, ListNavigator};
use super::theme;
use crate::config::{BRIGHTNESS_STEP, DEVICE_NAME_CHARS, NUMERIC_CHARS};
use crate::mesh::MeshEngine;
use crate::radio::{RadioField, RadioParams, RADIO_PRESETS};
use crate::storage::{SettingsStore, UiPrefs};
use crate::text::{truncated, EditBuffer};

/// Row and info-line text.
pub type RowText = String<32>;

/// Rows in the longest category (Radio Setup, presets).
pub const MAX_ROWS: usize = 7;

const MAIN_MENU: [(&str, SettingsCategory); 5] = [
    ("Public Info", SettingsCategory::PublicInfo),
    ("Radio Setup", SettingsCategory::RadioSetup),
    ("Theme", SettingsCategory::Theme),
    ("Other", SettingsCategory::Other),
    ("Device Info", SettingsCategory::DeviceInfo),
];

/// Radio Setup rows after the five parameters.
const PRESETS_ROW: usize = 5;
const MANUAL_ROW: usize = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingsCategory {
    MainMenu,
    Theme,
    PublicInfo,
    RadioSetup,
    Other,
    DeviceInfo,
    RadioPreset,
}

impl SettingsCategory {
    pub fn title(self) -> &'static str {
        match self {
            SettingsCategory::MainMenu => "Settings",
            SettingsCategory::Theme => "Theme",
            SettingsCategory::PublicInfo => "Public Info",
            SettingsCategory::RadioSetup => "Radio Setup",
            SettingsCategory::Other => "Other",
            SettingsCategory::DeviceInfo => "Device Info",
            SettingsCategory::RadioPreset => "Presets",
        }
    }

    fn item_count(self) -> usize {
        match self {
            SettingsCategory::MainMenu => MAIN_MENU.len(),
            SettingsCategory::Theme => 3,
            SettingsCategory::PublicInfo => 2,
            SettingsCategory::RadioSetup => 7,
            SettingsCategory::Other => 2,
            SettingsCategory::DeviceInfo => 0,
            SettingsCategory::RadioPreset => RADIO_PRESETS.len(),
        }
    }

    fn bar(self) -> BarKind {
        match self {
            SettingsCategory::Theme | SettingsCategory::Other => BarKind::SaveBack,
            _ => BarKind::Back,
        }
    }
}

/// Bottom bar layout of a category.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BarKind {
    Back,
    SaveBack,
}

/// Half of a Save/Back bar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BarChoice {
    Save,
    Back,
}

/// In-progress radio parameter edit.
#[derive(Clone, Debug, PartialEq)]
pub struct RadioDraft {
    pub field: RadioField,
    pub buffer: EditBuffer<NUMERIC_CHARS>,
    /// `None` for a standalone edit, `Some(0..=4)` inside the wizard.
    pub wizard_step: Option<u8>,
    /// Values accepted so far; written to the node prefs on completion.
    pub staged: RadioParams,
}

impl RadioDraft {
    fn standalone(field: RadioField, current: RadioParams) -> Self {
        Self {
            field,
            buffer: EditBuffer::from_str_lossy(&current.format_field(field)),
            wizard_step: None,
            staged: current,
        }
    }

    fn wizard(current: RadioParams) -> Self {
        Self {
            field: RadioField::SEQUENCE[0],
            buffer: EditBuffer::new(),
            wizard_step: Some(0),
            staged: current,
        }
    }
}

/// Modal state layered over the category list.
#[derive(Clone, Debug, PartialEq)]
pub enum SettingsMode {
    Browsing,
    EditingName(EditBuffer<DEVICE_NAME_CHARS>),
    EditingRadio(RadioDraft),
    ShowingShare,
    ConfirmingReset,
}

/// What the controller must do after a settings command.
#[derive(Clone, Debug, PartialEq)]
pub enum SettingsEffect {
    None,
    /// Leave settings for the contacts list.
    ExitToContacts,
    /// Apply brightness, palette and auto-off.
    ApplyPrefs(UiPrefs),
    Notify {
        title: &'static str,
        text: &'static str,
    },
    /// Preferences are persisted; show `notice` and restart.
    Restart { notice: &'static str },
}

/// Render model for the settings screen.
#[derive(Clone, Debug, PartialEq)]
pub enum SettingsView<'a> {
    List {
        title: &'static str,
        rows: Vec<RowText, MAX_ROWS>,
        /// First row index shown.
        scroll: usize,
        /// Focused row, `None` while the bar is focused.
        selected: Option<usize>,
        bar: BarKind,
        bar_focus: Option<BarChoice>,
    },
    Edit {
        title: RowText,
        text: &'a str,
        hint: &'static str,
    },
    Share {
        name: &'a str,
        uri: String<160>,
    },
    Confirm {
        prompt: &'static str,
    },
    Info {
        title: &'static str,
        lines: Vec<RowText, 6>,
    },
}

#[derive(Clone, Debug)]
pub struct SettingsWizard {
    category: SettingsCategory,
    mode: SettingsMode,
    nav: ListNavigator,
    bar: BarChoice,
    prefs: UiPrefs,
}

impl SettingsWizard {
    /// Open at the main menu with the currently applied prefs.
    pub fn new(prefs: UiPrefs) -> Self {
        Self {
            category: SettingsCategory::MainMenu,
            mode: SettingsMode::Browsing,
            nav: ListNavigator::new(true),
            bar: BarChoice::Save,
            prefs,
        }
    }

    pub fn category(&self) -> SettingsCategory {
        self.category
    }

    pub fn mode(&self) -> &SettingsMode {
        &self.mode
    }

    pub fn prefs(&self) -> &UiPrefs {
        &self.prefs
    }

    pub fn navigator(&self) -> &ListNavigator {
        &self.nav
    }

    /// Current wizard step, `-1` outside the wizard.
    pub fn wizard_step(&self) -> i8 {
        match &self.mode {
            SettingsMode::EditingRadio(RadioDraft {
                wizard_step: Some(step),
                ..
            }) => *step as i8,
            _ => -1,
        }
    }

    pub fn input_context(&self) -> InputContext {
        match self.mode {
            SettingsMode::Browsing if self.category == SettingsCategory::DeviceInfo => {
                InputContext::AnyKey
            }
            SettingsMode::Browsing => InputContext::Menu,
            SettingsMode::EditingName(_) | SettingsMode::EditingRadio(_) => InputContext::TextEdit,
            SettingsMode::ShowingShare => InputContext::AnyKey,
            SettingsMode::ConfirmingReset => InputContext::Confirm,
        }
    }

    pub fn handle<M, S>(&mut self, cmd: &Command, mesh: &mut M, store: &mut S) -> SettingsEffect
    where
        M: MeshEngine + ?Sized,
        S: SettingsStore + ?Sized,
    {
        match self.mode {
            SettingsMode::Browsing => self.handle_browsing(cmd, mesh, store),
            SettingsMode::EditingName(_) => self.handle_name_edit(cmd, mesh),
            SettingsMode::EditingRadio(_) => self.handle_radio_edit(cmd, mesh),
            SettingsMode::ShowingShare => {
                self.mode = SettingsMode::Browsing;
                SettingsEffect::None
            }
            SettingsMode::ConfirmingReset => self.handle_reset_confirm(cmd, mesh),
        }
    }

    fn enter(&mut self, category: SettingsCategory) {
        info!("Settings: {:?} -> {:?}", self.category, category);
        self.category = category;
        self.mode = SettingsMode::Browsing;
        self.nav = ListNavigator::new(true);
        self.nav.normalize(category.item_count());
        self.bar = BarChoice::Save;
    }

    /// Drop unsaved theme/auto-off edits.
    fn discard<S: SettingsStore + ?Sized>(&mut self, store: &S) -> SettingsEffect {
        self.prefs = UiPrefs::load(store);
        SettingsEffect::ApplyPrefs(self.prefs)
    }

    fn handle_browsing<M, S>(&mut self, cmd: &Command, mesh: &mut M, store: &mut S) -> SettingsEffect
    where
        M: MeshEngine + ?Sized,
        S: SettingsStore + ?Sized,
    {
        let count = self.category.item_count();

        if self.category == SettingsCategory::DeviceInfo {
            self.enter(SettingsCategory::MainMenu);
            return SettingsEffect::None;
        }

        match cmd {
            Command::Escape => {
                if self.category == SettingsCategory::MainMenu {
                    SettingsEffect::ExitToContacts
                } else {
                    self.enter(SettingsCategory::MainMenu);
                    self.discard(store)
                }
            }
            Command::Nav(Nav::Up) => {
                self.nav.up(count);
                SettingsEffect::None
            }
            Command::Nav(Nav::Down) => {
                self.nav.down(count);
                SettingsEffect::None
            }
            Command::Nav(dir @ (Nav::Left | Nav::Right)) => self.adjust(*dir == Nav::Right),
            Command::Nav(Nav::Select) => match self.nav.selected_item(count) {
                Some(idx) => self.activate(idx, mesh),
                None => self.activate_bar(store),
            },
            _ => SettingsEffect::None,
        }
    }

    /// Left/Right: change the focused value, or move across the Save/Back bar.
    fn adjust(&mut self, forward: bool) -> SettingsEffect {
        if self.nav.pseudo_focused() {
            if self.category.bar() == BarKind::SaveBack {
                self.bar = if forward { BarChoice::Back } else { BarChoice::Save };
            }
            return SettingsEffect::None;
        }

        let prefs = &mut self.prefs;
        match (self.category, self.nav.focus()) {
            (SettingsCategory::Theme, Focus::Item(0)) => {
                prefs.brightness = if forward {
                    prefs.brightness.saturating_add(BRIGHTNESS_STEP)
                } else {
                    prefs.brightness.saturating_sub(BRIGHTNESS_STEP)
                };
            }
            (SettingsCategory::Theme, Focus::Item(1)) => {
                prefs.main_color = cycle_color(prefs.main_color, forward);
            }
            (SettingsCategory::Theme, Focus::Item(2)) => {
                prefs.secondary_color = cycle_color(prefs.secondary_color, forward);
            }
            (SettingsCategory::Other, Focus::Item(0)) => {
                prefs.auto_off = if forward {
                    prefs.auto_off.next()
                } else {
                    prefs.auto_off.prev()
                };
                // Auto-off only takes effect on Save.
                return SettingsEffect::None;
            }
            _ => return SettingsEffect::None,
        }
        SettingsEffect::ApplyPrefs(self.prefs)
    }

    /// Select on a real row.
    fn activate<M: MeshEngine + ?Sized>(&mut self, idx: usize, mesh: &mut M) -> SettingsEffect {
        match self.category {
            SettingsCategory::MainMenu => {
                if let Some((_, category)) = MAIN_MENU.get(idx) {
                    self.enter(*category);
                }
                SettingsEffect::None
            }
            SettingsCategory::Theme => {
                self.nav.focus_pseudo();
                self.bar = BarChoice::Save;
                SettingsEffect::None
            }
            SettingsCategory::PublicInfo => {
                if idx == 0 {
                    let name = EditBuffer::from_str_lossy(&mesh.prefs().node_name);
                    self.mode = SettingsMode::EditingName(name);
                } else {
                    self.mode = SettingsMode::ShowingShare;
                }
                SettingsEffect::None
            }
            SettingsCategory::RadioSetup => {
                let current = mesh.prefs().radio;
                match idx {
                    PRESETS_ROW => self.enter(SettingsCategory::RadioPreset),
                    MANUAL_ROW => {
                        info!("Settings: manual radio setup, step 0");
                        self.mode = SettingsMode::EditingRadio(RadioDraft::wizard(current));
                    }
                    _ => {
                        if let Some(field) = RadioField::SEQUENCE.get(idx) {
                            self.mode =
                                SettingsMode::EditingRadio(RadioDraft::standalone(*field, current));
                        }
                    }
                }
                SettingsEffect::None
            }
            SettingsCategory::Other => {
                if idx == 1 {
                    self.mode = SettingsMode::ConfirmingReset;
                } else {
                    self.nav.focus_pseudo();
                    self.bar = BarChoice::Save;
                }
                SettingsEffect::None
            }
            SettingsCategory::RadioPreset => {
                let Some(preset) = RADIO_PRESETS.get(idx) else {
                    return SettingsEffect::None;
                };
                info!("Settings: applying preset {}", preset.name);
                mesh.prefs_mut().radio.apply_preset(preset);
                persist_and_restart(mesh, "Preset applied")
            }
            SettingsCategory::DeviceInfo => SettingsEffect::None,
        }
    }

    /// Select on the bottom bar.
    fn activate_bar<S: SettingsStore + ?Sized>(&mut self, store: &mut S) -> SettingsEffect {
        match (self.category, self.category.bar(), self.bar) {
            (SettingsCategory::MainMenu, _, _) => SettingsEffect::ExitToContacts,
            (SettingsCategory::RadioPreset, _, _) => {
                self.enter(SettingsCategory::RadioSetup);
                self.nav
                    .focus_item(PRESETS_ROW, SettingsCategory::RadioSetup.item_count());
                SettingsEffect::None
            }
            (category, BarKind::SaveBack, BarChoice::Save) => {
                let saved = if category == SettingsCategory::Theme {
                    self.prefs.save_theme(store)
                } else {
                    self.prefs.save_auto_off(store)
                };
                match saved {
                    Ok(()) => {
                        info!("Settings: {:?} saved", category);
                        let prefs = self.prefs;
                        self.enter(SettingsCategory::MainMenu);
                        SettingsEffect::ApplyPrefs(prefs)
                    }
                    Err(e) => {
                        warn!("Settings: save failed: {:?}", e);
                        SettingsEffect::Notify {
                            title: category.title(),
                            text: "Save failed",
                        }
                    }
                }
            }
            (_, BarKind::SaveBack, BarChoice::Back) => {
                self.enter(SettingsCategory::MainMenu);
                self.discard(store)
            }
            (_, BarKind::Back, _) => {
                self.enter(SettingsCategory::MainMenu);
                SettingsEffect::None
            }
        }
    }

    fn handle_name_edit<M: MeshEngine + ?Sized>(&mut self, cmd: &Command, mesh: &mut M) -> SettingsEffect {
        let SettingsMode::EditingName(buffer) = &mut self.mode else {
            return SettingsEffect::None;
        };
        match cmd {
            Command::Insert(chars) => {
                for &c in chars {
                    buffer.push(c);
                }
                SettingsEffect::None
            }
            Command::DeleteBack => {
                buffer.pop();
                SettingsEffect::None
            }
            Command::Escape => {
                self.mode = SettingsMode::Browsing;
                SettingsEffect::None
            }
            Command::Submit => {
                if buffer.is_empty() {
                    return SettingsEffect::Notify {
                        title: "Public Info",
                        text: "Name cannot be empty",
                    };
                }
                mesh.prefs_mut().node_name = truncated(buffer.as_str());
                self.mode = SettingsMode::Browsing;
                match mesh.persist_preferences() {
                    Ok(()) => {
                        info!("Settings: node name saved");
                        SettingsEffect::Notify {
                            title: "Public Info",
                            text: "Name saved",
                        }
                    }
                    Err(e) => {
                        warn!("Settings: persist failed: {:?}", e);
                        SettingsEffect::Notify {
                            title: "Public Info",
                            text: "Save failed",
                        }
                    }
                }
            }
            _ => SettingsEffect::None,
        }
    }

    fn handle_radio_edit<M: MeshEngine + ?Sized>(&mut self, cmd: &Command, mesh: &mut M) -> SettingsEffect {
        let SettingsMode::EditingRadio(draft) = &mut self.mode else {
            return SettingsEffect::None;
        };
        match cmd {
            Command::Insert(chars) => {
                for &c in chars {
                    if draft.field.accepts_char(draft.buffer.as_str(), c) {
                        draft.buffer.push(c);
                    }
                }
                SettingsEffect::None
            }
            Command::DeleteBack => {
                draft.buffer.pop();
                SettingsEffect::None
            }
            Command::Escape => {
                if draft.wizard_step.is_some() {
                    info!("Settings: wizard abandoned");
                }
                self.mode = SettingsMode::Browsing;
                SettingsEffect::None
            }
            Command::Submit => {
                let value = match draft.field.parse(draft.buffer.as_str()) {
                    Ok(value) => value,
                    Err(_) => {
                        debug!("Settings: rejected {:?}", draft.field);
                        return SettingsEffect::Notify {
                            title: "Radio Setup",
                            text: draft.field.invalid_message(),
                        };
                    }
                };
                draft.staged.apply(draft.field, value);

                let wizard_step = draft.wizard_step;
                match wizard_step {
                    Some(step) if (step as usize) + 1 < RadioField::SEQUENCE.len() => {
                        let next = step + 1;
                        let field = RadioField::SEQUENCE[next as usize];
                        info!("Settings: wizard step {}", next);
                        draft.field = field;
                        draft.wizard_step = Some(next);
                        draft.buffer = EditBuffer::from_str_lossy(&draft.staged.format_field(field));
                        SettingsEffect::None
                    }
                    _ => {
                        let staged = draft.staged;
                        self.mode = SettingsMode::Browsing;
                        mesh.prefs_mut().radio = staged;
                        persist_and_restart(mesh, "Radio updated")
                    }
                }
            }
            _ => SettingsEffect::None,
        }
    }

    fn handle_reset_confirm<M: MeshEngine + ?Sized>(&mut self, cmd: &Command, mesh: &mut M) -> SettingsEffect {
        self.mode = SettingsMode::Browsing;
        if *cmd != Command::Submit {
            return SettingsEffect::None;
        }
        match mesh.factory_reset() {
            Ok(()) => {
                warn!("Settings: factory reset");
                SettingsEffect::Restart {
                    notice: "Factory reset",
                }
            }
            Err(e) => {
                error!("Settings: factory reset failed: {:?}", e);
                SettingsEffect::Notify {
                    title: "Other",
                    text: "Reset failed",
                }
            }
        }
    }

    /// Build the render model.
    pub fn view<'a, M: MeshEngine + ?Sized>(&'a self, mesh: &'a M) -> SettingsView<'a> {
        match &self.mode {
            SettingsMode::EditingName(buffer) => SettingsView::Edit {
                title: truncated("Node name"),
                text: buffer.as_str(),
                hint: "Enter save, Opt cancel",
            },
            SettingsMode::EditingRadio(draft) => {
                let mut title = RowText::new();
                let _ = match draft.wizard_step {
                    Some(step) => write!(title, "{}/5 {}", step + 1, draft.field.label()),
                    None => write!(title, "{}", draft.field.label()),
                };
                if !draft.field.unit().is_empty() {
                    let _ = write!(title, " ({})", draft.field.unit());
                }
                SettingsView::Edit {
                    title,
                    text: draft.buffer.as_str(),
                    hint: "Enter save, Opt back",
                }
            }
            SettingsMode::ShowingShare => SettingsView::Share {
                name: mesh.prefs().node_name.as_str(),
                uri: mesh.share_uri(),
            },
            SettingsMode::ConfirmingReset => SettingsView::Confirm {
                prompt: "Factory reset?",
            },
            SettingsMode::Browsing if self.category == SettingsCategory::DeviceInfo => {
                SettingsView::Info {
                    title: self.category.title(),
                    lines: device_info(mesh),
                }
            }
            SettingsMode::Browsing => SettingsView::List {
                title: self.category.title(),
                rows: self.rows(mesh),
                scroll: self.nav.scroll_offset(),
                selected: self.nav.selected_item(self.category.item_count()),
                bar: self.category.bar(),
                bar_focus: if self.nav.pseudo_focused() {
                    Some(self.bar)
                } else {
                    None
                },
            },
        }
    }

    fn rows<M: MeshEngine + ?Sized>(&self, mesh: &M) -> Vec<RowText, MAX_ROWS> {
        let mut rows = Vec::new();
        let mut push = |row: RowText| {
            let _ = rows.push(row);
        };
        match self.category {
            SettingsCategory::MainMenu => MAIN_MENU.iter().for_each(|(label, _)| push(truncated(label))),
            SettingsCategory::Theme => {
                let percent = self.prefs.brightness as u32 * 100 / 255;
                push(row_fmt(format_args!("Brightness: {}%", percent)));
                push(row_fmt(format_args!("Main: {}", theme::lookup(self.prefs.main_color).name)));
                push(row_fmt(format_args!(
                    "Secondary: {}",
                    theme::lookup(self.prefs.secondary_color).name
                )));
            }
            SettingsCategory::PublicInfo => {
                push(row_fmt(format_args!("Name: {}", mesh.prefs().node_name)));
                push(truncated("Share contact"));
            }
            SettingsCategory::RadioSetup => {
                let radio = mesh.prefs().radio;
                for field in RadioField::SEQUENCE {
                    let mut row = row_fmt(format_args!(
                        "{}: {}",
                        short_label(field),
                        radio.format_field(field)
                    ));
                    if !field.unit().is_empty() {
                        let _ = write!(row, " {}", field.unit());
                    }
                    push(row);
                }
                push(truncated("Presets"));
                push(truncated("Manual setup"));
            }
            SettingsCategory::Other => {
                push(row_fmt(format_args!("Auto-off: {}", self.prefs.auto_off.label())));
                push(truncated("Factory reset"));
            }
            SettingsCategory::RadioPreset => RADIO_PRESETS.iter().for_each(|p| push(truncated(p.name))),
            SettingsCategory::DeviceInfo => {}
        }
        rows
    }
}

fn cycle_color(index: u8, forward: bool) -> u8 {
    if forward {
        theme::next_index(index)
    } else {
        theme::prev_index(index)
    }
}

fn short_label(field: RadioField) -> &'static str {
    match field {
        RadioField::Frequency => "Freq",
        RadioField::Bandwidth => "BW",
        RadioField::SpreadingFactor => "SF",
        RadioField::CodingRate => "CR",
        RadioField::TxPower => "TX",
    }
}

fn row_fmt(args: core::fmt::Arguments<'_>) -> RowText {
    let mut row = RowText::new();
    // Overlong rows are cut; the list shows 18 characters anyway.
    let _ = row.write_fmt(args);
    row
}

fn persist_and_restart<M: MeshEngine + ?Sized>(mesh: &mut M, notice: &'static str) -> SettingsEffect {
    match mesh.persist_preferences() {
        Ok(()) => {
            info!("Settings: radio persisted, restart scheduled");
            SettingsEffect::Restart { notice }
        }
        Err(e) => {
            error!("Settings: persist failed: {:?}", e);
            SettingsEffect::Notify {
                title: "Radio Setup",
                text: "Save failed",
            }
        }
    }
}

fn device_info<M: MeshEngine + ?Sized>(mesh: &M) -> Vec<RowText, 6> {
    let prefs = mesh.prefs();
    let radio = prefs.radio;
    let mut lines = Vec::new();
    for line in [
        row_fmt(format_args!("Name: {}", prefs.node_name)),
        row_fmt(format_args!("Firmware: v{}", env!("CARGO_PKG_VERSION"))),
        row_fmt(format_args!(
            "Freq: {} MHz",
            radio.format_field(RadioField::Frequency)
        )),
        row_fmt(format_args!(
            "BW: {} SF{} CR{}",
            radio.format_field(RadioField::Bandwidth),
            radio.spreading_factor,
            radio.coding_rate
        )),
        row_fmt(format_args!("TX power: {} dBm", radio.tx_power_dbm)),
        row_fmt(format_args!("Contacts: {}", mesh.contact_count())),
    ] {
        let _ = lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests;

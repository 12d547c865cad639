use super::*;
use crate::error::{MeshError, StoreError};
use crate::mesh::{Channel, Contact, NodePrefs, SendReceipt};
use crate::storage::AutoOff;
use crate::ui::input::KeyState;

struct Mesh {
    prefs: NodePrefs,
    persisted: usize,
    reset: bool,
}

impl Mesh {
    fn new() -> Self {
        Self {
            prefs: NodePrefs {
                node_name: truncated("node-1"),
                radio: RadioParams::default(),
            },
            persisted: 0,
            reset: false,
        }
    }
}

impl MeshEngine for Mesh {
    fn contact_count(&self) -> usize {
        0
    }
    fn contact_at(&self, _index: usize) -> Option<Contact> {
        None
    }
    fn channel_at(&self, _slot: usize) -> Option<Channel> {
        None
    }
    fn send_direct_message(&mut self, _: &Contact, _: u32, _: &str) -> Result<SendReceipt, MeshError> {
        Err(MeshError::UnknownTarget)
    }
    fn send_channel_message(&mut self, _: &Channel, _: u32, _: &str, _: &str) -> Result<(), MeshError> {
        Err(MeshError::UnknownTarget)
    }
    fn remove_contact(&mut self, _: &Contact) -> Result<(), MeshError> {
        Ok(())
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
        self.reset = true;
        Ok(())
    }
    fn ble_pin(&self) -> u32 {
        0
    }
    fn share_uri(&self) -> String<160> {
        truncated("meshcore://contact/add?name=node-1")
    }
}

#[derive(Default)]
struct Store {
    values: std::vec::Vec<(std::string::String, u8)>,
}

impl SettingsStore for Store {
    fn get(&self, _ns: &str, key: &str) -> Result<Option<u8>, StoreError> {
        Ok(self.values.iter().find(|(k, _)| k == key).map(|(_, v)| *v))
    }
    fn set(&mut self, _ns: &str, key: &str, value: u8) -> Result<(), StoreError> {
        self.values.retain(|(k, _)| k != key);
        self.values.push((key.into(), value));
        Ok(())
    }
}

struct Rig {
    wizard: SettingsWizard,
    mesh: Mesh,
    store: Store,
}

impl Rig {
    fn new() -> Self {
        Self {
            wizard: SettingsWizard::new(UiPrefs::default()),
            mesh: Mesh::new(),
            store: Store::default(),
        }
    }

    fn cmd(&mut self, cmd: Command) -> SettingsEffect {
        self.wizard.handle(&cmd, &mut self.mesh, &mut self.store)
    }

    fn key(&mut self, key: KeyState) -> SettingsEffect {
        let cmd = crate::ui::input::route(&key, self.wizard.input_context());
        self.cmd(cmd)
    }

    fn type_text(&mut self, text: &str) {
        for c in text.chars() {
            self.key(KeyState::chars(c.encode_utf8(&mut [0; 4])));
        }
    }

    fn down(&mut self, times: usize) {
        for _ in 0..times {
            self.cmd(Command::Nav(Nav::Down));
        }
    }

    fn select(&mut self) -> SettingsEffect {
        self.cmd(Command::Nav(Nav::Select))
    }

    fn open_manual_setup(&mut self) {
        self.down(1);
        self.select();
        assert_eq!(self.wizard.category(), SettingsCategory::RadioSetup);
        self.down(MANUAL_ROW);
        self.select();
    }

    fn buffer(&self) -> &str {
        match self.wizard.mode() {
            SettingsMode::EditingRadio(draft) => draft.buffer.as_str(),
            SettingsMode::EditingName(buffer) => buffer.as_str(),
            _ => "",
        }
    }
}

#[test]
fn wizard_visits_each_step_once_then_restarts() {
    let mut rig = Rig::new();
    rig.open_manual_setup();
    assert_eq!(rig.wizard.wizard_step(), 0);
    assert_eq!(rig.buffer(), "");

    let inputs = ["869.525", "250", "11", "5", "20"];
    let mut visited = std::vec::Vec::new();
    let mut last = SettingsEffect::None;
    for text in inputs {
        visited.push(rig.wizard.wizard_step());
        // Later steps start prefilled.
        while !rig.buffer().is_empty() {
            rig.key(KeyState::backspace());
        }
        rig.type_text(text);
        last = rig.key(KeyState::enter());
    }

    assert_eq!(visited, [0, 1, 2, 3, 4]);
    assert_eq!(last, SettingsEffect::Restart { notice: "Radio updated" });
    assert_eq!(rig.wizard.wizard_step(), -1);
    let radio = rig.mesh.prefs.radio;
    assert_eq!(radio.frequency_mhz, 869.525);
    assert_eq!(radio.bandwidth_khz, 250.0);
    assert_eq!(radio.spreading_factor, 11);
    assert_eq!(radio.tx_power_dbm, 20);
    assert_eq!(rig.mesh.persisted, 1);
}

#[test]
fn later_wizard_steps_are_prefilled() {
    let mut rig = Rig::new();
    rig.open_manual_setup();
    rig.type_text("868");
    rig.key(KeyState::enter());
    assert_eq!(rig.wizard.wizard_step(), 1);
    assert_eq!(rig.buffer(), "62.5");
}

#[test]
fn invalid_text_is_filtered_and_rejected() {
    let mut rig = Rig::new();
    rig.open_manual_setup();
    rig.type_text("invalid");
    assert_eq!(rig.buffer(), "");

    let effect = rig.key(KeyState::enter());
    assert_eq!(
        effect,
        SettingsEffect::Notify {
            title: "Radio Setup",
            text: "Invalid frequency"
        }
    );
    assert_eq!(rig.wizard.wizard_step(), 0);
    assert_eq!(rig.mesh.persisted, 0);
}

#[test]
fn out_of_range_keeps_step() {
    let mut rig = Rig::new();
    rig.open_manual_setup();
    rig.type_text("915");
    rig.key(KeyState::enter());
    while !rig.buffer().is_empty() {
        rig.key(KeyState::backspace());
    }
    rig.type_text("600");
    let effect = rig.key(KeyState::enter());
    assert!(matches!(effect, SettingsEffect::Notify { text: "Invalid bandwidth", .. }));
    assert_eq!(rig.wizard.wizard_step(), 1);
}

#[test]
fn escape_abandons_wizard_without_persisting() {
    let mut rig = Rig::new();
    rig.open_manual_setup();
    rig.type_text("433");
    rig.key(KeyState::enter());
    rig.key(KeyState::opt());
    assert_eq!(rig.wizard.wizard_step(), -1);
    assert_eq!(rig.wizard.mode(), &SettingsMode::Browsing);
    assert_eq!(rig.mesh.prefs.radio, RadioParams::default());
    assert_eq!(rig.mesh.persisted, 0);
}

#[test]
fn standalone_edit_is_prefilled_and_restarts() {
    let mut rig = Rig::new();
    rig.down(1);
    rig.select();
    rig.down(2);
    rig.select();
    assert_eq!(rig.wizard.wizard_step(), -1);
    assert_eq!(rig.buffer(), "7");

    rig.key(KeyState::backspace());
    rig.type_text("9");
    let effect = rig.key(KeyState::enter());
    assert_eq!(effect, SettingsEffect::Restart { notice: "Radio updated" });
    assert_eq!(rig.mesh.prefs.radio.spreading_factor, 9);
}

#[test]
fn preset_applies_and_restarts() {
    let mut rig = Rig::new();
    rig.down(1);
    rig.select();
    rig.down(PRESETS_ROW);
    rig.select();
    assert_eq!(rig.wizard.category(), SettingsCategory::RadioPreset);

    rig.down(1);
    let effect = rig.select();
    assert_eq!(effect, SettingsEffect::Restart { notice: "Preset applied" });
    assert_eq!(rig.mesh.prefs.radio.frequency_mhz, 869.618);
    assert_eq!(rig.mesh.prefs.radio.coding_rate, 8);
}

#[test]
fn preset_back_returns_to_radio_setup() {
    let mut rig = Rig::new();
    rig.down(1);
    rig.select();
    rig.down(PRESETS_ROW);
    rig.select();
    rig.cmd(Command::Nav(Nav::Up));
    assert!(rig.wizard.navigator().pseudo_focused());
    rig.select();
    assert_eq!(rig.wizard.category(), SettingsCategory::RadioSetup);
}

#[test]
fn theme_changes_apply_live_and_back_discards() {
    let mut rig = Rig::new();
    rig.down(2);
    rig.select();
    assert_eq!(rig.wizard.category(), SettingsCategory::Theme);

    let effect = rig.cmd(Command::Nav(Nav::Right));
    let SettingsEffect::ApplyPrefs(prefs) = effect else {
        panic!("expected live apply, got {:?}", effect);
    };
    assert_eq!(prefs.brightness, 143);

    rig.down(1);
    rig.cmd(Command::Nav(Nav::Right));
    assert_eq!(rig.wizard.prefs().main_color, 1);

    let effect = rig.cmd(Command::Escape);
    assert_eq!(effect, SettingsEffect::ApplyPrefs(UiPrefs::default()));
    assert_eq!(rig.wizard.category(), SettingsCategory::MainMenu);
}

#[test]
fn theme_save_persists() {
    let mut rig = Rig::new();
    rig.down(2);
    rig.select();
    rig.cmd(Command::Nav(Nav::Left));
    // Select on a row jumps to the Save half of the bar.
    rig.select();
    assert!(rig.wizard.navigator().pseudo_focused());
    let effect = rig.select();
    assert!(matches!(effect, SettingsEffect::ApplyPrefs(p) if p.brightness == 113));
    assert_eq!(UiPrefs::load(&rig.store).brightness, 113);
}

#[test]
fn other_autooff_cycles_and_saves() {
    let mut rig = Rig::new();
    rig.down(3);
    rig.select();
    assert_eq!(rig.wizard.category(), SettingsCategory::Other);
    rig.cmd(Command::Nav(Nav::Right));
    assert_eq!(rig.wizard.prefs().auto_off, AutoOff::Min10);
    rig.cmd(Command::Nav(Nav::Up));
    let effect = rig.select();
    assert!(matches!(effect, SettingsEffect::ApplyPrefs(p) if p.auto_off == AutoOff::Min10));
    assert_eq!(UiPrefs::load(&rig.store).auto_off, AutoOff::Min10);
}

#[test]
fn factory_reset_needs_enter() {
    let mut rig = Rig::new();
    rig.down(3);
    rig.select();
    rig.down(1);
    rig.select();
    assert_eq!(rig.wizard.input_context(), InputContext::Confirm);
    assert_eq!(rig.key(KeyState::chars("n")), SettingsEffect::None);
    assert!(!rig.mesh.reset);

    rig.select();
    let effect = rig.key(KeyState::enter());
    assert_eq!(effect, SettingsEffect::Restart { notice: "Factory reset" });
    assert!(rig.mesh.reset);
}

#[test]
fn name_edit_rejects_empty_and_saves() {
    let mut rig = Rig::new();
    rig.select();
    assert_eq!(rig.wizard.category(), SettingsCategory::PublicInfo);
    rig.select();
    assert_eq!(rig.buffer(), "node-1");

    for _ in 0..6 {
        rig.key(KeyState::backspace());
    }
    let effect = rig.key(KeyState::enter());
    assert!(matches!(effect, SettingsEffect::Notify { text: "Name cannot be empty", .. }));

    rig.type_text("Base");
    rig.key(KeyState::enter());
    assert_eq!(rig.mesh.prefs.node_name.as_str(), "Base");
    assert_eq!(rig.mesh.persisted, 1);
    assert_eq!(rig.wizard.mode(), &SettingsMode::Browsing);
}

#[test]
fn share_view_shows_node_name_and_uri() {
    let mut rig = Rig::new();
    rig.select();
    rig.down(1);
    rig.select();
    assert_eq!(rig.wizard.input_context(), InputContext::AnyKey);
    match rig.wizard.view(&rig.mesh) {
        SettingsView::Share { name, uri } => {
            assert_eq!(name, "node-1");
            assert!(uri.starts_with("meshcore://"));
        }
        other => panic!("expected share view, got {:?}", other),
    }
    rig.key(KeyState::chars("x"));
    assert_eq!(rig.wizard.mode(), &SettingsMode::Browsing);
}

#[test]
fn device_info_returns_on_any_key() {
    let mut rig = Rig::new();
    rig.down(4);
    rig.select();
    assert_eq!(rig.wizard.input_context(), InputContext::AnyKey);
    assert!(matches!(rig.wizard.view(&rig.mesh), SettingsView::Info { .. }));
    rig.key(KeyState::chars("x"));
    assert_eq!(rig.wizard.category(), SettingsCategory::MainMenu);
}

#[test]
fn escape_from_main_menu_exits() {
    let mut rig = Rig::new();
    assert_eq!(rig.key(KeyState::opt()), SettingsEffect::ExitToContacts);
    rig.cmd(Command::Nav(Nav::Up));
    assert_eq!(rig.select(), SettingsEffect::ExitToContacts);
}

#[test]
fn radio_rows_show_current_values() {
    let mut rig = Rig::new();
    rig.down(1);
    rig.select();
    let SettingsView::List { rows, bar, .. } = rig.wizard.view(&rig.mesh) else {
        panic!("expected list");
    };
    assert_eq!(rows[0].as_str(), "Freq: 910.525 MHz");
    assert_eq!(rows[2].as_str(), "SF: 7");
    assert_eq!(rows[6].as_str(), "Manual setup");
    assert_eq!(bar, BarKind::Back);
}

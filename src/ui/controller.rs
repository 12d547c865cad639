//! Top-level screen state machine.
//!
//! [`ScreenController`] owns every collaborator and drives one cooperative
//! loop iteration per [`ScreenController::poll`]:
//!
//! 1. Rescan the keyboard; a new key-down is gated by the power manager,
//!    then by the notification overlay, then routed for the current state.
//! 2. Backspace held in a text field repeats on a timestamp schedule.
//! 3. Notification expiry and display auto-off are checked.
//! 4. At most one full redraw happens if anything changed.
//!
//! Inbound messages arrive through [`ScreenController::on_inbound_message`]
//! between polls; they only touch history, unread flags, the overlay and
//! the power state, never the active screen or an edit buffer.

use core::fmt::Write;
use core::mem;

use heapless::{String, Vec};

use super::input::{route, BackspaceRepeat, Command, InputContext, InputSource, KeyState, Nav};
use super::list::ListNavigator;
use super::notification::NotificationOverlay;
use super::render::{self, ListRow, RowStyle, Tab};
use super::settings::{SettingsEffect, SettingsWizard};
use super::surface::DisplaySurface;
use super::theme::Palette;
use crate::chat::layout::clamp_scroll;
use crate::chat::{layout, ChatHistoryStore, ChatMessage, ConversationKey, InboundEffect};
use crate::clock::Clock;
use crate::config::{
    COMPOSE_CHARS, CURSOR_BLINK_MILLIS, LIST_WINDOW, MAX_CONTACTS, MAX_GROUP_CHANNELS,
    RESTART_DELAY_MILLIS,
};
use crate::mesh::{live_channel, Channel, Contact, InboundMessage, MeshEngine, MessageOrigin, Name};
use crate::power::{KeyGate, PowerManager};
use crate::storage::{SettingsStore, UiPrefs};
use crate::text::EditBuffer;

/// Top-level screens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Screen {
    Contacts,
    Channels,
    Chat,
    Settings,
}

/// Result of one loop iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoopOutcome {
    Idle,
    Rendered,
    /// Preferences were persisted and the restart notice has elapsed;
    /// the board should reboot now.
    Restart,
}

/// Who the open chat talks to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChatTarget {
    Contact(Contact),
    Channel(Channel),
}

impl ChatTarget {
    pub fn key(&self) -> ConversationKey<'_> {
        match self {
            ChatTarget::Contact(contact) => ConversationKey::contact(&contact.name),
            ChatTarget::Channel(channel) => ConversationKey::channel(&channel.name),
        }
    }
}

/// An open conversation and the list it was opened from.
#[derive(Clone, Debug)]
pub struct ChatScreen {
    pub parent: Tab,
    pub parent_nav: ListNavigator,
    pub target: ChatTarget,
    /// 0 shows the newest message.
    pub scroll: usize,
    /// Draft while composing.
    pub compose: Option<EditBuffer<COMPOSE_CHARS>>,
}

/// One variant per screen or modal, carrying only its own data.
#[derive(Clone, Debug)]
pub enum UiState {
    Contacts(ListNavigator),
    Channels(ListNavigator),
    Chat(ChatScreen),
    Settings(SettingsWizard),
    /// Contact removal awaiting Enter.
    ConfirmRemove { nav: ListNavigator, contact: Contact },
}

impl UiState {
    fn list(tab: Tab, nav: ListNavigator) -> Self {
        match tab {
            Tab::Contacts => UiState::Contacts(nav),
            Tab::Channels => UiState::Channels(nav),
        }
    }

    fn fresh_contacts() -> Self {
        UiState::Contacts(ListNavigator::new(true))
    }
}

pub struct ScreenController<M, D, I, S, C> {
    mesh: M,
    display: D,
    input: I,
    store: S,
    clock: C,
    state: UiState,
    history: ChatHistoryStore,
    notification: NotificationOverlay,
    power: PowerManager,
    backspace: BackspaceRepeat,
    prefs: UiPrefs,
    blink_on: bool,
    dirty: bool,
    restart_at: Option<u64>,
}

impl<M, D, I, S, C> ScreenController<M, D, I, S, C>
where
    M: MeshEngine,
    D: DisplaySurface,
    I: InputSource,
    S: SettingsStore,
    C: Clock,
{
    /// Load UI prefs, apply the theme and switch the display on.
    pub fn new(mesh: M, display: D, input: I, store: S, clock: C) -> Self {
        let now = clock.now_ms();
        let prefs = UiPrefs::load(&store);
        let mut controller = Self {
            mesh,
            display,
            input,
            store,
            clock,
            state: UiState::fresh_contacts(),
            history: ChatHistoryStore::new(),
            notification: NotificationOverlay::new(),
            power: PowerManager::new(prefs.auto_off.millis(), now),
            backspace: BackspaceRepeat::Idle,
            prefs,
            blink_on: true,
            dirty: true,
            restart_at: None,
        };
        controller.apply_prefs(prefs, now);
        controller.display.turn_on();
        info!("UI: started, auto-off {} ms", prefs.auto_off.millis());
        controller
    }

    /// One loop iteration.
    pub fn poll(&mut self) -> LoopOutcome {
        let now = self.clock.now_ms();

        self.input.update();
        if self.input.changed() {
            if self.input.is_pressed() {
                let key = self.input.snapshot();
                self.handle_key(&key);
            } else {
                self.backspace.release();
            }
        } else if self.notification.is_active() {
            // the overlay owns input until it goes away
            self.backspace.release();
        } else if self.backspace.is_held() && self.backspace.poll(now) {
            self.dispatch(Command::DeleteBack, now);
            self.dirty = true;
        }

        if self.notification.expire(now) {
            debug!("UI: notification expired");
            self.dirty = true;
        }

        if self.power.tick(now, self.display.is_on()) {
            self.display.turn_off();
        }

        if self.is_composing() {
            let blink_on = (now / CURSOR_BLINK_MILLIS) % 2 == 0;
            if blink_on != self.blink_on {
                self.blink_on = blink_on;
                self.dirty = true;
            }
        }

        if self.restart_at.is_some_and(|at| now >= at) {
            warn!("UI: restart requested");
            return LoopOutcome::Restart;
        }

        if self.dirty && self.display.is_on() {
            self.render(now);
            self.dirty = false;
            return LoopOutcome::Rendered;
        }
        LoopOutcome::Idle
    }

    /// Handle one key-down snapshot.
    pub fn handle_key(&mut self, key: &KeyState) {
        let now = self.clock.now_ms();

        if self.power.register_key(now, self.display.is_on()) == KeyGate::WakeOnly {
            self.display.turn_on();
            self.backspace.release();
            self.dirty = true;
            return;
        }

        if self.notification.dismiss() {
            debug!("UI: notification dismissed by key");
            self.backspace.release();
            self.dirty = true;
            return;
        }

        let context = self.input_context();
        let cmd = route(key, context);
        if cmd == Command::DeleteBack && context.repeats_backspace() {
            self.backspace.press(now);
        } else {
            self.backspace.release();
        }

        self.dispatch(cmd, now);
        self.dirty = true;
    }

    /// Inbound-message callback from the mesh engine.
    pub fn on_inbound_message(&mut self, msg: InboundMessage<'_>) {
        let now = self.clock.now_ms();
        let timestamp = self.clock.epoch_secs();

        let channel = match msg.origin {
            MessageOrigin::Direct => None,
            MessageOrigin::Channel { slot } => match live_channel(&self.mesh, slot as usize) {
                Some(channel) => Some(channel),
                None => {
                    warn!("UI: message for empty channel slot {}", slot);
                    return;
                }
            },
            MessageOrigin::Unknown => channel_by_sender(&self.mesh, msg.from_name),
        };

        let message = match &channel {
            Some(channel) => ChatMessage::incoming(
                ConversationKey::channel(&channel.name),
                msg.from_name,
                msg.text,
                timestamp,
            ),
            None => ChatMessage::incoming(
                ConversationKey::contact(msg.from_name),
                msg.from_name,
                msg.text,
                timestamp,
            ),
        };

        let open = match &self.state {
            UiState::Chat(chat) => Some(chat.target.key()),
            _ => None,
        };
        let effect = self
            .history
            .record_inbound(message, channel.as_ref().map(|c| c.slot), open);
        debug!("UI: inbound path_len={} -> {:?}", msg.path_len, effect);

        if self.power.wake(now, self.display.is_on()) {
            self.display.turn_on();
        }
        if effect == InboundEffect::Notify {
            self.notification.show(msg.from_name, msg.text, now);
            self.backspace.release();
        }
        self.dirty = true;
    }

    pub fn screen(&self) -> Screen {
        match self.state {
            UiState::Contacts(_) | UiState::ConfirmRemove { .. } => Screen::Contacts,
            UiState::Channels(_) => Screen::Channels,
            UiState::Chat(_) => Screen::Chat,
            UiState::Settings(_) => Screen::Settings,
        }
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    /// Conversation shown in Chat, if any.
    pub fn open_conversation(&self) -> Option<ConversationKey<'_>> {
        match &self.state {
            UiState::Chat(chat) => Some(chat.target.key()),
            _ => None,
        }
    }

    pub fn input_context(&self) -> InputContext {
        match &self.state {
            UiState::Contacts(_) | UiState::Channels(_) => InputContext::List,
            UiState::Chat(chat) if chat.compose.is_some() => InputContext::ChatCompose,
            UiState::Chat(_) => InputContext::ChatIdle,
            UiState::Settings(wizard) => wizard.input_context(),
            UiState::ConfirmRemove { .. } => InputContext::Confirm,
        }
    }

    pub fn history(&self) -> &ChatHistoryStore {
        &self.history
    }

    pub fn notification(&self) -> &NotificationOverlay {
        &self.notification
    }

    pub fn power(&self) -> &PowerManager {
        &self.power
    }

    pub fn prefs(&self) -> &UiPrefs {
        &self.prefs
    }

    pub fn restart_pending(&self) -> bool {
        self.restart_at.is_some()
    }

    pub fn mesh(&self) -> &M {
        &self.mesh
    }

    pub fn mesh_mut(&mut self) -> &mut M {
        &mut self.mesh
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// For the board loop to flush settings to flash.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    fn is_composing(&self) -> bool {
        matches!(&self.state, UiState::Chat(chat) if chat.compose.is_some())
    }

    fn apply_prefs(&mut self, prefs: UiPrefs, now: u64) {
        self.prefs = prefs;
        let palette = Palette::from_indices(prefs.main_color, prefs.secondary_color);
        self.display.set_palette(palette.light, palette.dark);
        self.display.set_brightness(prefs.brightness);
        if self.power.timeout_ms() != prefs.auto_off.millis() {
            self.power.set_timeout(prefs.auto_off.millis(), now);
        }
    }

    fn dispatch(&mut self, cmd: Command, now: u64) {
        let state = mem::replace(&mut self.state, UiState::fresh_contacts());
        self.state = match state {
            UiState::Contacts(nav) => self.on_list(Tab::Contacts, nav, cmd),
            UiState::Channels(nav) => self.on_list(Tab::Channels, nav, cmd),
            UiState::Chat(chat) => self.on_chat(chat, cmd, now),
            UiState::Settings(wizard) => self.on_settings(wizard, cmd, now),
            UiState::ConfirmRemove { nav, contact } => self.on_confirm_remove(nav, contact, cmd, now),
        };
    }

    fn list_len(&self, tab: Tab, nav: &ListNavigator) -> usize {
        match tab {
            Tab::Contacts => contact_indices(&self.mesh, nav).len(),
            Tab::Channels => channels(&self.mesh, nav).len(),
        }
    }

    fn on_list(&mut self, tab: Tab, mut nav: ListNavigator, cmd: Command) -> UiState {
        let count = self.list_len(tab, &nav);
        match cmd {
            Command::Nav(Nav::Up) => nav.up(count),
            Command::Nav(Nav::Down) => nav.down(count),
            Command::Nav(Nav::Left | Nav::Right) => {
                let other = match tab {
                    Tab::Contacts => Tab::Channels,
                    Tab::Channels => Tab::Contacts,
                };
                info!("UI: {:?} -> {:?}", tab, other);
                let mut fresh = ListNavigator::new(true);
                fresh.normalize(self.list_len(other, &fresh));
                return UiState::list(other, fresh);
            }
            Command::Nav(Nav::Select) => match nav.selected_item(count) {
                Some(idx) => {
                    if let Some(target) = self.target_at(tab, &nav, idx) {
                        return self.open_chat(tab, nav, target);
                    }
                }
                None if nav.pseudo_focused() => {
                    info!("UI: {:?} -> Settings", tab);
                    return UiState::Settings(SettingsWizard::new(self.prefs));
                }
                None => {}
            },
            Command::Insert(chars) => {
                for c in chars {
                    nav.push_filter(c);
                }
                let count = self.list_len(tab, &nav);
                nav.normalize(count);
            }
            Command::DeleteBack => {
                nav.pop_filter();
                let count = self.list_len(tab, &nav);
                nav.normalize(count);
            }
            Command::Escape => {
                nav.clear_filter();
                let count = self.list_len(tab, &nav);
                nav.normalize(count);
            }
            Command::RemoveSelected if tab == Tab::Contacts => {
                if let Some(ChatTarget::Contact(contact)) =
                    nav.selected_item(count).and_then(|idx| self.target_at(tab, &nav, idx))
                {
                    return UiState::ConfirmRemove { nav, contact };
                }
            }
            _ => {}
        }
        UiState::list(tab, nav)
    }

    /// Contact or channel behind filtered row `idx`.
    fn target_at(&self, tab: Tab, nav: &ListNavigator, idx: usize) -> Option<ChatTarget> {
        match tab {
            Tab::Contacts => {
                let real = *contact_indices(&self.mesh, nav).get(idx)?;
                self.mesh.contact_at(real).map(ChatTarget::Contact)
            }
            Tab::Channels => channels(&self.mesh, nav)
                .get(idx)
                .cloned()
                .map(ChatTarget::Channel),
        }
    }

    fn open_chat(&mut self, parent: Tab, parent_nav: ListNavigator, target: ChatTarget) -> UiState {
        if let ChatTarget::Channel(channel) = &target {
            self.history.mark_conversation_read(channel.slot);
        }
        info!("UI: {:?} -> Chat", parent);
        UiState::Chat(ChatScreen {
            parent,
            parent_nav,
            target,
            scroll: 0,
            compose: None,
        })
    }

    fn leave_chat(&self, chat: ChatScreen) -> UiState {
        let mut nav = chat.parent_nav;
        nav.clear_filter();
        nav.normalize(self.list_len(chat.parent, &nav));
        info!("UI: Chat -> {:?}", chat.parent);
        UiState::list(chat.parent, nav)
    }

    fn on_chat(&mut self, mut chat: ChatScreen, cmd: Command, now: u64) -> UiState {
        match cmd {
            Command::Escape => {
                if chat.compose.as_ref().is_some_and(|draft| !draft.is_empty()) {
                    chat.compose = None;
                } else {
                    return self.leave_chat(chat);
                }
            }
            Command::ScrollOlder => {
                let count = self.history.count_for(chat.target.key());
                chat.scroll = clamp_scroll(chat.scroll + 1, count);
            }
            Command::ScrollNewer => chat.scroll = chat.scroll.saturating_sub(1),
            Command::Insert(chars) => {
                let draft = chat.compose.get_or_insert_with(EditBuffer::new);
                for c in chars {
                    draft.push(c);
                }
            }
            Command::DeleteBack => {
                if let Some(draft) = chat.compose.as_mut() {
                    draft.pop();
                }
            }
            Command::Submit => {
                if let Some(draft) = chat.compose.take() {
                    if !draft.is_empty() {
                        self.send(&chat.target, draft.as_str(), now);
                        chat.scroll = 0;
                    }
                }
            }
            _ => {}
        }
        UiState::Chat(chat)
    }

    /// Record the outgoing message, then hand it to the mesh engine.
    fn send(&mut self, target: &ChatTarget, text: &str, now: u64) {
        let timestamp = self.clock.epoch_secs();
        let me: Name = self.mesh.prefs().node_name.clone();
        self.history
            .append(ChatMessage::outgoing(target.key(), &me, text, timestamp));

        let sent = match target {
            ChatTarget::Contact(contact) => self
                .mesh
                .send_direct_message(contact, timestamp, text)
                .map(|receipt| {
                    debug!(
                        "UI: sent direct, ack {} timeout {} ms",
                        receipt.expected_ack,
                        receipt.timeout_ms
                    );
                }),
            ChatTarget::Channel(channel) => {
                self.mesh
                    .send_channel_message(channel, timestamp, &me, text)
            }
        };

        if let Err(e) = sent {
            warn!("UI: send failed: {}", e);
            let mut reason: String<32> = String::new();
            let _ = write!(reason, "{}", e);
            self.notification.show("Send failed", &reason, now);
        }
    }

    fn on_confirm_remove(&mut self, mut nav: ListNavigator, contact: Contact, cmd: Command, now: u64) -> UiState {
        if cmd == Command::Submit {
            match self.mesh.remove_contact(&contact) {
                Ok(()) => info!("UI: removed contact {}", contact.name.as_str()),
                Err(e) => {
                    warn!("UI: remove failed: {}", e);
                    self.notification.show(&contact.name, "Remove failed", now);
                }
            }
        }
        let count = self.list_len(Tab::Contacts, &nav);
        nav.normalize(count);
        UiState::Contacts(nav)
    }

    fn on_settings(&mut self, mut wizard: SettingsWizard, cmd: Command, now: u64) -> UiState {
        match wizard.handle(&cmd, &mut self.mesh, &mut self.store) {
            SettingsEffect::None => {}
            SettingsEffect::ExitToContacts => {
                info!("UI: Settings -> Contacts");
                let mut nav = ListNavigator::new(true);
                nav.normalize(self.list_len(Tab::Contacts, &nav));
                return UiState::Contacts(nav);
            }
            SettingsEffect::ApplyPrefs(prefs) => self.apply_prefs(prefs, now),
            SettingsEffect::Notify { title, text } => self.notification.show(title, text, now),
            SettingsEffect::Restart { notice } => {
                info!("UI: restart in {} ms", RESTART_DELAY_MILLIS);
                self.notification
                    .show_for("Restarting", notice, now, RESTART_DELAY_MILLIS);
                self.restart_at = Some(now + RESTART_DELAY_MILLIS);
            }
        }
        UiState::Settings(wizard)
    }

    fn render(&mut self, now: u64) {
        let Self {
            mesh,
            display,
            state,
            history,
            notification,
            prefs,
            ..
        } = self;
        let mesh: &M = mesh;
        let state: &UiState = state;
        let history: &ChatHistoryStore = history;
        let palette = Palette::from_indices(prefs.main_color, prefs.secondary_color);

        display.begin_frame();
        render::clear(display);

        if let Some(current) = notification.current() {
            render::draw_notification(display, current);
        } else {
            match state {
                UiState::Contacts(nav) => draw_list(display, mesh, history, palette, Tab::Contacts, nav),
                UiState::Channels(nav) => draw_list(display, mesh, history, palette, Tab::Channels, nav),
                UiState::ConfirmRemove { nav, contact } => {
                    draw_list(display, mesh, history, palette, Tab::Contacts, nav);
                    render::draw_confirm(display, "Remove contact?", &contact.name);
                }
                UiState::Chat(chat) => {
                    let key = chat.target.key();
                    let thread = history.filter_by_conversation(key);
                    let bubbles = layout(&thread, chat.scroll, key.is_channel);
                    render::draw_chat_header(display, key.is_channel, key.name);
                    render::draw_bubbles(display, &bubbles);
                    render::draw_compose_bar(
                        display,
                        chat.compose.as_ref().map(|draft| draft.as_str()),
                        now,
                    );
                }
                UiState::Settings(wizard) => render::draw_settings(display, &wizard.view(mesh)),
            }
        }

        if let Err(e) = display.end_frame() {
            warn!("UI: frame failed: {}", e);
        }
    }
}

/// Indices of contacts whose names match the list filter.
fn contact_indices<M: MeshEngine + ?Sized>(mesh: &M, nav: &ListNavigator) -> Vec<usize, MAX_CONTACTS> {
    let mut indices = Vec::new();
    for idx in 0..mesh.contact_count().min(MAX_CONTACTS) {
        if let Some(contact) = mesh.contact_at(idx) {
            if nav.matches(&contact.name) && indices.push(idx).is_err() {
                break;
            }
        }
    }
    indices
}

/// Non-empty channels whose names match the list filter, in slot order.
fn channels<M: MeshEngine + ?Sized>(mesh: &M, nav: &ListNavigator) -> Vec<Channel, MAX_GROUP_CHANNELS> {
    let mut found = Vec::new();
    for slot in 0..MAX_GROUP_CHANNELS {
        if let Some(channel) = live_channel(mesh, slot) {
            if nav.matches(&channel.name) && found.push(channel).is_err() {
                break;
            }
        }
    }
    found
}

/// Channel whose name appears in `from_name`; only used when the transport
/// cannot say where a message came from.
fn channel_by_sender<M: MeshEngine + ?Sized>(mesh: &M, from_name: &str) -> Option<Channel> {
    (0..MAX_GROUP_CHANNELS)
        .filter_map(|slot| live_channel(mesh, slot))
        .find(|channel| from_name.contains(channel.name.as_str()))
}

fn draw_list<M, D>(
    display: &mut D,
    mesh: &M,
    history: &ChatHistoryStore,
    palette: Palette,
    tab: Tab,
    nav: &ListNavigator,
) where
    M: MeshEngine + ?Sized,
    D: DisplaySurface + ?Sized,
{
    render::draw_header(display, palette, nav.pseudo_focused(), mesh.ble_pin());

    let mut rows: Vec<ListRow, LIST_WINDOW> = Vec::new();
    let (count, placeholder) = match tab {
        Tab::Contacts => {
            let indices = contact_indices(mesh, nav);
            for &idx in &indices[nav.visible(indices.len())] {
                if let Some(contact) = mesh.contact_at(idx) {
                    let _ = rows.push(ListRow::new(&contact.name, false));
                }
            }
            (indices.len(), "No contacts")
        }
        Tab::Channels => {
            let found = channels(mesh, nav);
            for channel in &found[nav.visible(found.len())] {
                let _ = rows.push(ListRow::new(&channel.name, history.is_unread(channel.slot)));
            }
            (found.len(), "No channels")
        }
    };

    let selected = nav
        .selected_item(count)
        .map(|idx| idx - nav.scroll_offset());
    render::draw_rows(
        display,
        RowStyle::LIST.with_marker(tab == Tab::Contacts),
        &rows,
        selected,
        placeholder,
    );
    render::draw_bottom_bar(display, tab, nav.filter());
}

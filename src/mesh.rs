//! Mesh engine collaborator interface.
//!
//! Routing, encryption and store-and-forward live behind [`MeshEngine`]; the
//! UI only reads contacts/channels, submits messages and edits preferences.

use heapless::String;

use crate::config::NAME_CHARS;
use crate::error::MeshError;
use crate::radio::RadioParams;

/// Bounded display name (contacts, channels, node).
pub type Name = String<NAME_CHARS>;

/// A known peer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Contact {
    pub name: Name,
    pub public_key: [u8; 32],
}

/// A group channel occupying one of the engine's channel slots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Channel {
    pub slot: u8,
    pub name: Name,
}

/// Node-wide preferences owned by the mesh engine.
#[derive(Clone, Debug, PartialEq)]
pub struct NodePrefs {
    pub node_name: Name,
    pub radio: RadioParams,
}

/// Acknowledgement bookkeeping returned by a direct send.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SendReceipt {
    pub expected_ack: u32,
    pub timeout_ms: u32,
}

/// Where an inbound message came from, as far as the transport knows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MessageOrigin {
    Direct,
    Channel { slot: u8 },
    /// Transport could not tell; the UI falls back to matching channel names.
    Unknown,
}

/// Payload of the engine's inbound-message callback.
#[derive(Clone, Copy, Debug)]
pub struct InboundMessage<'a> {
    pub path_len: u8,
    pub origin: MessageOrigin,
    pub from_name: &'a str,
    pub text: &'a str,
}

pub trait MeshEngine {
    fn contact_count(&self) -> usize;

    fn contact_at(&self, index: usize) -> Option<Contact>;

    /// Channel in `slot`; empty slots return `None` or an empty name.
    fn channel_at(&self, slot: usize) -> Option<Channel>;

    fn send_direct_message(
        &mut self,
        contact: &Contact,
        timestamp: u32,
        text: &str,
    ) -> Result<SendReceipt, MeshError>;

    fn send_channel_message(
        &mut self,
        channel: &Channel,
        timestamp: u32,
        sender_name: &str,
        text: &str,
    ) -> Result<(), MeshError>;

    fn remove_contact(&mut self, contact: &Contact) -> Result<(), MeshError>;

    fn prefs(&self) -> &NodePrefs;

    fn prefs_mut(&mut self) -> &mut NodePrefs;

    /// Write the current preferences to the engine's storage.
    fn persist_preferences(&mut self) -> Result<(), MeshError>;

    /// Erase identity, contacts and channels.
    fn factory_reset(&mut self) -> Result<(), MeshError>;

    /// BLE pairing PIN; 0 when BLE is disabled.
    fn ble_pin(&self) -> u32;

    /// Shareable contact URI for this node.
    fn share_uri(&self) -> String<160>;
}

/// Resolve a non-empty channel in `slot`.
pub fn live_channel<M: MeshEngine + ?Sized>(mesh: &M, slot: usize) -> Option<Channel> {
    mesh.channel_at(slot).filter(|channel| !channel.name.is_empty())
}

//! meshterm - keyboard-driven chat and settings UI for handheld mesh radios.
//!
//! The crate is the pure UI core: screens, navigation, chat history, the
//! radio setup wizard and power management. Everything outside it (mesh
//! engine, keyboard scanner, panel driver, settings flash) arrives through
//! the traits in [`mesh`], [`ui::input`], [`ui::surface`], [`storage`] and
//! [`clock`], so the whole state machine runs on the host under
//! `cargo test`.
//!
//! Board glue owns the loop:
//!
//! ```ignore
//! let mut ui = ScreenController::new(mesh, EgSurface::new(st7789), keyboard, store, clock);
//! loop {
//!     while let Some(msg) = mesh_events.try_receive() {
//!         ui.on_inbound_message(msg.as_inbound());
//!     }
//!     let outcome = ui.poll();
//!     // writes only when a setting changed since the last save
//!     let _ = ui.store_mut().save_to_flash(&mut flash).await;
//!     if outcome == LoopOutcome::Restart {
//!         cortex_m::peripheral::SCB::sys_reset();
//!     }
//! }
//! ```

#![cfg_attr(not(test), no_std)]

// must stay first so the logging macros are visible to every module
#[macro_use]
mod fmt;

// ═══════════════════════════════════════════════════════════════════════════
// Core modules
// ═══════════════════════════════════════════════════════════════════════════

pub mod chat;
pub mod clock;
pub mod config;
pub mod error;
pub mod mesh;
pub mod power;
pub mod power_logic;
pub mod radio;
pub mod storage;
pub mod text;
pub mod ui;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports
// ═══════════════════════════════════════════════════════════════════════════

pub use chat::{ChatHistoryStore, ChatMessage, ConversationKey};
pub use clock::Clock;
pub use error::{Error, MeshError, StoreError};
pub use mesh::{Channel, Contact, InboundMessage, MeshEngine, MessageOrigin, NodePrefs};
pub use power::PowerManager;
pub use radio::RadioParams;
pub use storage::{AutoOff, SettingsStore, UiPrefs};
pub use ui::{DisplaySurface, EgSurface, InputSource, KeyState, LoopOutcome, Screen, ScreenController};

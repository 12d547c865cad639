//! User interface subsystem - keyboard-driven screens on a colour TFT.
//!
//! The controller maintains a state machine that reacts to key presses and
//! inbound mesh messages, rendering the current view through a
//! [`DisplaySurface`].
//!
//! ## Components
//!
//! - **Input**: keyboard snapshots routed to commands per context
//! - **Lists**: Contacts and Channels with search filter and settings icon
//! - **Chat**: bubble thread plus compose bar
//! - **Settings**: theme, node name, radio wizard, presets, factory reset
//! - **Display**: embedded-graphics adapter (ST7789 135×240, landscape)

pub mod controller;
pub mod display;
pub mod input;
pub mod list;
pub mod notification;
pub mod render;
pub mod settings;
pub mod surface;
pub mod theme;

pub use controller::{ChatScreen, ChatTarget, LoopOutcome, Screen, ScreenController, UiState};
pub use display::EgSurface;
pub use input::{route, Command, InputContext, InputSource, KeyState, Nav};
pub use list::ListNavigator;
pub use notification::{Notification, NotificationOverlay};
pub use settings::{SettingsCategory, SettingsEffect, SettingsWizard};
pub use surface::{DisplaySurface, Ink};

//! Power management - display auto-off and wake-key suppression.
//!
//! Implements:
//! - Auto-off deadline, pushed back by every handled key
//! - Wake on key: the waking key is swallowed, the next one is processed
//! - Wake on inbound message, without swallowing anything
//!
//! Timestamps are milliseconds from the [`Clock`](crate::clock::Clock); the
//! manager itself never reads time.

use crate::config;
use crate::power_logic;

/// Display power mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerMode {
    /// Display on, deadline armed.
    Awake,
    /// Display found off without the timer blanking it.
    Off,
    /// Blanked by the auto-off timer.
    Sleeping,
}

/// What the controller should do with a key event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyGate {
    /// Dispatch the key normally.
    Dispatch,
    /// Turn the display back on; the key has no other effect.
    WakeOnly,
}

/// Power manager tracks activity and blanks the display when idle.
#[derive(Clone, Debug)]
pub struct PowerManager {
    mode: PowerMode,
    timeout_ms: u64,
    next_off: Option<u64>,
    ignore_next_keypress: bool,
}

impl PowerManager {
    /// Create a manager with `timeout_ms` (0 = never) armed from `now_ms`.
    pub fn new(timeout_ms: u64, now_ms: u64) -> Self {
        Self {
            mode: PowerMode::Awake,
            timeout_ms,
            next_off: power_logic::next_off_deadline(now_ms, timeout_ms),
            ignore_next_keypress: false,
        }
    }

    /// Record a raw key event.
    ///
    /// If the display was off or sleeping, the display must be turned back on
    /// and this key is consumed as a wake signal.
    pub fn register_key(&mut self, now_ms: u64, display_on: bool) -> KeyGate {
        self.touch(now_ms);

        if !display_on || self.mode != PowerMode::Awake {
            info!("Power: key wake from {:?}", self.mode);
            self.mode = PowerMode::Awake;
            self.ignore_next_keypress = true;
        }

        if self.ignore_next_keypress {
            self.ignore_next_keypress = false;
            return KeyGate::WakeOnly;
        }
        KeyGate::Dispatch
    }

    /// Wake for an inbound message. Returns `true` if the display must be turned on.
    pub fn wake(&mut self, now_ms: u64, display_on: bool) -> bool {
        self.touch(now_ms);
        let was_dark = !display_on || self.mode != PowerMode::Awake;
        if was_dark {
            info!("Power: message wake from {:?}", self.mode);
        }
        self.mode = PowerMode::Awake;
        was_dark
    }

    /// Push the auto-off deadline back.
    pub fn touch(&mut self, now_ms: u64) {
        self.next_off = power_logic::next_off_deadline(now_ms, self.timeout_ms);
    }

    /// Periodic check. Returns `true` when the display should be turned off now.
    pub fn tick(&mut self, now_ms: u64, display_on: bool) -> bool {
        if power_logic::deadline_passed(display_on, now_ms, self.next_off) {
            info!("Power: auto-off after {} ms idle", self.timeout_ms);
            self.mode = PowerMode::Sleeping;
            return true;
        }

        if !display_on && self.mode == PowerMode::Awake {
            self.mode = PowerMode::Off;
        }
        false
    }

    /// Change the auto-off timeout (0 = never) and re-arm from `now_ms`.
    pub fn set_timeout(&mut self, timeout_ms: u64, now_ms: u64) {
        self.timeout_ms = timeout_ms;
        self.touch(now_ms);
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    pub fn mode(&self) -> PowerMode {
        self.mode
    }

    pub fn next_off(&self) -> Option<u64> {
        self.next_off
    }

    pub fn is_awake(&self) -> bool {
        self.mode == PowerMode::Awake
    }
}

impl Default for PowerManager {
    fn default() -> Self {
        Self::new(config::AUTO_OFF_MILLIS, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_pushes_deadline_back() {
        let mut pm = PowerManager::new(1_000, 0);
        assert_eq!(pm.register_key(800, true), KeyGate::Dispatch);
        assert_eq!(pm.next_off(), Some(1_800));
        assert!(!pm.tick(1_500, true));
        assert!(pm.tick(1_801, true));
        assert_eq!(pm.mode(), PowerMode::Sleeping);
    }

    #[test]
    fn waking_key_is_swallowed_once() {
        let mut pm = PowerManager::new(1_000, 0);
        assert!(pm.tick(2_000, true));
        assert_eq!(pm.register_key(2_100, false), KeyGate::WakeOnly);
        assert!(pm.is_awake());
        assert_eq!(pm.register_key(2_200, true), KeyGate::Dispatch);
    }

    #[test]
    fn never_timeout_keeps_display_on() {
        let mut pm = PowerManager::new(0, 0);
        assert!(!pm.tick(u64::MAX / 2, true));
        assert!(pm.is_awake());
    }

    #[test]
    fn externally_blanked_display_counts_as_off() {
        let mut pm = PowerManager::new(0, 0);
        assert!(!pm.tick(10, false));
        assert_eq!(pm.mode(), PowerMode::Off);
        assert_eq!(pm.register_key(20, false), KeyGate::WakeOnly);
    }

    #[test]
    fn message_wake_does_not_swallow_next_key() {
        let mut pm = PowerManager::new(1_000, 0);
        assert!(pm.tick(5_000, true));
        assert!(pm.wake(5_100, false));
        assert_eq!(pm.next_off(), Some(6_100));
        assert_eq!(pm.register_key(5_200, true), KeyGate::Dispatch);
    }

    #[test]
    fn set_timeout_rearms() {
        let mut pm = PowerManager::new(1_000, 0);
        pm.set_timeout(30_000, 500);
        assert_eq!(pm.next_off(), Some(30_500));
        pm.set_timeout(0, 600);
        assert_eq!(pm.next_off(), None);
    }
}

//! Time sources.
//!
//! The loop compares raw millisecond timestamps; nothing here sleeps.

/// Monotonic milliseconds for timers plus wall-clock seconds for messages.
pub trait Clock {
    /// Milliseconds since boot.
    fn now_ms(&self) -> u64;

    /// Seconds since the Unix epoch, as best known.
    fn epoch_secs(&self) -> u32;
}

#[cfg(feature = "embedded")]
pub use embassy::EmbassyClock;

#[cfg(feature = "embedded")]
mod embassy {
    use embassy_time::Instant;

    use super::Clock;

    /// Clock backed by the embassy time driver, calibrated against an epoch offset.
    #[derive(Clone, Debug)]
    pub struct EmbassyClock {
        offset_secs: i64,
    }

    impl EmbassyClock {
        pub fn new() -> Self {
            Self { offset_secs: 0 }
        }

        /// Recalibrate so that `epoch_secs()` reports `epoch` right now.
        pub fn set_epoch_secs(&mut self, epoch: u32) {
            let uptime = Instant::now().as_secs() as i64;
            self.offset_secs = epoch as i64 - uptime;
        }
    }

    impl Default for EmbassyClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Clock for EmbassyClock {
        fn now_ms(&self) -> u64 {
            Instant::now().as_millis()
        }

        fn epoch_secs(&self) -> u32 {
            let adjusted = Instant::now().as_secs() as i64 + self.offset_secs;
            adjusted.clamp(0, u32::MAX as i64) as u32
        }
    }
}

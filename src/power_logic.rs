/// Auto-off deadline after activity at `now_ms`; `None` when the timeout is disabled.
pub fn next_off_deadline(now_ms: u64, timeout_ms: u64) -> Option<u64> {
    if timeout_ms == 0 {
        None
    } else {
        Some(now_ms.saturating_add(timeout_ms))
    }
}

/// Decide whether the screen should be blanked on this tick.
pub fn deadline_passed(display_on: bool, now_ms: u64, next_off: Option<u64>) -> bool {
    if !display_on {
        return false;
    }

    match next_off {
        Some(deadline) => now_ms > deadline,
        None => false,
    }
}

//! Time provider abstraction
//!
//! This module provides a [`Clock`] trait that abstracts over time sources.
//! Lock expiry, node creation stamps, and resolution audit stamps all read
//! the clock injected into their component, never the system time directly.
//!
//! # Example
//!
//! ```
//! use concord::{Clock, ManualClock};
//!
//! let clock = ManualClock::new(1_000);
//! assert_eq!(clock.now_millis(), 1_000);
//! clock.advance(500);
//! assert_eq!(clock.now_millis(), 1_500);
//! ```

use std::fmt::Debug;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{TimeZone, Utc};

/// A time provider for getting current timestamps.
pub trait Clock: Send + Sync + Debug {
    /// Returns the current time as milliseconds since Unix epoch.
    fn now_millis(&self) -> u64;

    /// Returns the current time as an RFC3339-formatted string.
    fn now_rfc3339(&self) -> String {
        millis_to_rfc3339(self.now_millis())
    }
}

/// Production clock using real system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    fn now_rfc3339(&self) -> String {
        Utc::now().to_rfc3339()
    }
}

/// Clock that only moves when told to.
///
/// Reads never advance it, so a sequence of operations observes one stable
/// instant until [`ManualClock::advance`] or [`ManualClock::set`] is called.
/// Used for deterministic lock expiry.
pub struct ManualClock {
    millis: Mutex<u64>,
}

impl ManualClock {
    /// Create a clock frozen at the given time in milliseconds.
    pub fn new(millis: u64) -> Self {
        Self {
            millis: Mutex::new(millis),
        }
    }

    /// Move the clock forward by the given number of milliseconds.
    pub fn advance(&self, ms: u64) {
        let mut millis = self.millis.lock().unwrap_or_else(|e| e.into_inner());
        *millis = millis.saturating_add(ms);
    }

    /// Set the clock to a specific time in milliseconds.
    pub fn set(&self, ms: u64) {
        *self.millis.lock().unwrap_or_else(|e| e.into_inner()) = ms;
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        *self.millis.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        // 2024-01-01 00:00:00 UTC
        Self::new(1704067200000)
    }
}

impl Debug for ManualClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualClock")
            .field("millis", &self.now_millis())
            .finish()
    }
}

/// Render epoch milliseconds as RFC3339.
pub fn millis_to_rfc3339(millis: u64) -> String {
    let secs = (millis / 1000) as i64;
    let nanos = ((millis % 1000) * 1_000_000) as u32;
    Utc.timestamp_opt(secs, nanos)
        .single()
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| "1970-01-01T00:00:00+00:00".to_string())
}

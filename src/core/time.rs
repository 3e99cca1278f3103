// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Logical receive timestamp for log records.
//!
//! Records carry a `{sec, nsec}` receive time assigned by the upstream
//! source. The derived ordering (seconds, then nanoseconds) is the total
//! order used for the pipeline's final sort.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Nanoseconds per second.
const NSEC_PER_SEC: u64 = 1_000_000_000;

/// Logical receive timestamp: seconds plus nanoseconds.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Time {
    /// Whole seconds
    pub sec: u64,
    /// Nanoseconds within the second (< 1_000_000_000 for normalized times)
    pub nsec: u32,
}

impl Time {
    /// Create a time from seconds and nanoseconds.
    pub const fn new(sec: u64, nsec: u32) -> Self {
        Self { sec, nsec }
    }

    /// Create a time from total nanoseconds.
    pub const fn from_nanos(nanos: u64) -> Self {
        Self {
            sec: nanos / NSEC_PER_SEC,
            nsec: (nanos % NSEC_PER_SEC) as u32,
        }
    }

    /// Convert to total nanoseconds.
    pub const fn as_nanos(self) -> u64 {
        self.sec * NSEC_PER_SEC + self.nsec as u64
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}", self.sec, self.nsec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_ordering() {
        assert!(Time::new(1, 0) < Time::new(2, 0));
        assert!(Time::new(1, 500) < Time::new(1, 501));
        assert!(Time::new(2, 0) > Time::new(1, 999_999_999));
        assert_eq!(Time::new(3, 7), Time::new(3, 7));
    }

    #[test]
    fn test_time_nanos_round_trip() {
        let t = Time::new(1_490_149_580, 117_017_840);
        assert_eq!(Time::from_nanos(t.as_nanos()), t);
    }

    #[test]
    fn test_time_display() {
        assert_eq!(Time::new(5, 42).to_string(), "5.000000042");
    }
}

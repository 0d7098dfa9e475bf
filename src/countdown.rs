use serde::{Serialize, Serializer};
use std::fmt;

const SECS_PER_HOUR: i64 = 3_600;
const SECS_PER_MINUTE: i64 = 60;

/// Lock state of a deposit relative to a given `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockStatus {
    /// No deposit to time.
    Unavailable,
    Unlocked,
    Locked {
        hours: i64,
        minutes: i64,
        seconds: i64,
    },
}

impl UnlockStatus {
    pub fn at(unlock_timestamp: i64, now: i64) -> Self {
        let remaining = unlock_timestamp.saturating_sub(now);
        if remaining <= 0 {
            return Self::Unlocked;
        }

        Self::Locked {
            hours: remaining / SECS_PER_HOUR,
            minutes: (remaining % SECS_PER_HOUR) / SECS_PER_MINUTE,
            seconds: remaining % SECS_PER_MINUTE,
        }
    }

    pub fn for_unlock(unlock_timestamp: Option<i64>, now: i64) -> Self {
        unlock_timestamp.map_or(Self::Unavailable, |t| Self::at(t, now))
    }

    pub fn is_unlocked(&self) -> bool {
        matches!(self, Self::Unlocked)
    }

    /// Seconds left until unlock, if still locked.
    pub fn remaining_secs(&self) -> Option<i64> {
        match self {
            Self::Locked {
                hours,
                minutes,
                seconds,
            } => Some(hours * SECS_PER_HOUR + minutes * SECS_PER_MINUTE + seconds),
            _ => None,
        }
    }
}

impl fmt::Display for UnlockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => f.write_str("N/A"),
            Self::Unlocked => f.write_str("Unlocked"),
            Self::Locked {
                hours,
                minutes,
                seconds,
            } => write!(f, "{hours}h {minutes}m {seconds}s"),
        }
    }
}

impl Serialize for UnlockStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn past_or_present_unlock_is_unlocked() {
        assert_eq!(UnlockStatus::at(100, 100), UnlockStatus::Unlocked);
        assert_eq!(UnlockStatus::at(90, 100), UnlockStatus::Unlocked);
        assert_eq!(UnlockStatus::at(i64::MIN, i64::MAX), UnlockStatus::Unlocked);
        assert_eq!(UnlockStatus::at(0, 100).to_string(), "Unlocked");
    }

    #[test]
    fn renders_hours_minutes_seconds() {
        let now = 1_700_000_000;
        assert_eq!(UnlockStatus::at(now + 3661, now).to_string(), "1h 1m 1s");
        assert_eq!(UnlockStatus::at(now + 59, now).to_string(), "0h 0m 59s");
        assert_eq!(UnlockStatus::at(now + 90_000, now).to_string(), "25h 0m 0s");
    }

    #[test]
    fn decomposition_is_exact() {
        let now = 1_000;
        for remaining in [1, 59, 60, 61, 3_599, 3_600, 3_601, 86_399, 1_234_567] {
            let status = UnlockStatus::at(now + remaining, now);
            let UnlockStatus::Locked {
                hours,
                minutes,
                seconds,
            } = status
            else {
                panic!("expected locked for {remaining}");
            };
            assert!((0..60).contains(&minutes));
            assert!((0..60).contains(&seconds));
            assert_eq!(hours * 3600 + minutes * 60 + seconds, remaining);
            assert_eq!(status.remaining_secs(), Some(remaining));
            assert_eq!(UnlockStatus::at(now + remaining, now), status);
        }
    }

    #[test]
    fn missing_unlock_is_unavailable() {
        let status = UnlockStatus::for_unlock(None, 10);
        assert_eq!(status.to_string(), "N/A");
        assert!(!status.is_unlocked());
        assert_eq!(status.remaining_secs(), None);
    }

    #[test]
    fn serializes_as_display_string() {
        let json = serde_json::to_string(&UnlockStatus::at(3_661, 0)).unwrap();
        assert_eq!(json, r#""1h 1m 1s""#);
    }
}

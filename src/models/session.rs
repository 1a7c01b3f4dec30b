use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum BurstStatus {
    #[default]
    Idle,
    Running,
    Stopped,
}

/// A finished burst: one folder of sequentially numbered raw frames.
///
/// Only sessions with at least one persisted frame ever leave the sampler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BurstSession {
    pub id: String,
    pub folder_name: String,
    pub subject: String,
    pub started_at: DateTime<Utc>,
    pub stopped_at: DateTime<Utc>,
    pub frame_count: u32,
}

impl BurstSession {
    /// Wall-clock label shown in the burst history list (`HH:MM`).
    pub fn display_time(&self) -> String {
        self.started_at
            .with_timezone(&Local)
            .format("%H:%M")
            .to_string()
    }

    pub fn duration_ms(&self) -> i64 {
        (self.stopped_at - self.started_at).num_milliseconds().max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn session(started_at: DateTime<Utc>, stopped_at: DateTime<Utc>) -> BurstSession {
        BurstSession {
            id: "s".into(),
            folder_name: "f".into(),
            subject: "Rex".into(),
            started_at,
            stopped_at,
            frame_count: 3,
        }
    }

    #[test]
    fn display_time_uses_local_clock() {
        let started = Utc.with_ymd_and_hms(2024, 3, 9, 14, 7, 59).unwrap();
        let expected = started.with_timezone(&Local).format("%H:%M").to_string();
        let label = session(started, started).display_time();
        assert_eq!(label, expected);
        assert_eq!(label.len(), 5);
    }

    #[test]
    fn duration_never_negative() {
        let started = Utc.with_ymd_and_hms(2024, 3, 9, 14, 0, 0).unwrap();
        let stopped = started + Duration::milliseconds(2500);
        assert_eq!(session(started, stopped).duration_ms(), 2500);
        assert_eq!(session(stopped, started).duration_ms(), 0);
    }
}

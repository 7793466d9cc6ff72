//! Identifier and date generation for new rules
//!
//! Sigma rules carry a UUIDv4 `id`, Snort rules a six-digit `sid`. The free
//! functions only guarantee shape and range; [`Ledger`] additionally remembers
//! everything a session was handed so it never receives the same value twice.

use chrono::Local;
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use tracing::warn;
use uuid::Uuid;

/// Lowest SID handed out by [`generate_sid`]
pub const SID_MIN: u32 = 100_000;

/// Highest SID handed out by [`generate_sid`]
pub const SID_MAX: u32 = 999_999;

static UUID_V4: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
        .expect("Invalid regex pattern")
});

/// Generate a fresh lowercase, hyphenated version-4 UUID
pub fn generate_uuid_v4() -> String {
    Uuid::new_v4().to_string()
}

/// Generate a pseudo-random SID in `[SID_MIN, SID_MAX]`
pub fn generate_sid() -> u32 {
    rand::thread_rng().gen_range(SID_MIN..=SID_MAX)
}

/// Today's local date formatted as `YYYY-MM-DD`
pub fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Check whether a string has the canonical UUIDv4 shape
pub fn is_uuid_v4(value: &str) -> bool {
    UUID_V4.is_match(value)
}

/// Record of identifiers issued to, or claimed by, one builder session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    uuids: HashSet<String>,
    sids: BTreeSet<u32>,
}

impl Ledger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw UUIDs until one this ledger has not seen appears
    pub fn fresh_uuid(&mut self) -> String {
        loop {
            let id = generate_uuid_v4();
            if self.uuids.insert(id.clone()) {
                return id;
            }
        }
    }

    /// Draw SIDs until one this ledger has not seen appears
    pub fn fresh_sid(&mut self) -> u32 {
        if self.sids.len() as u32 > SID_MAX - SID_MIN {
            warn!("SID range exhausted for this session, uniqueness is no longer guaranteed");
            return generate_sid();
        }
        loop {
            let sid = generate_sid();
            if self.sids.insert(sid) {
                return sid;
            }
        }
    }

    /// Mark a UUID as taken
    pub fn record_uuid(&mut self, id: impl Into<String>) {
        self.uuids.insert(id.into());
    }

    /// Mark a SID as taken
    pub fn record_sid(&mut self, sid: u32) {
        self.sids.insert(sid);
    }

    /// Whether a SID was issued or recorded
    pub fn has_sid(&self, sid: u32) -> bool {
        self.sids.contains(&sid)
    }

    /// Whether a UUID was issued or recorded
    pub fn has_uuid(&self, id: &str) -> bool {
        self.uuids.contains(id)
    }

    /// Number of SIDs seen so far
    pub fn issued_sids(&self) -> usize {
        self.sids.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_shape() {
        for _ in 0..64 {
            let id = generate_uuid_v4();
            assert_eq!(id.len(), 36);
            assert!(is_uuid_v4(&id), "bad uuid: {id}");
        }
    }

    #[test]
    fn test_is_uuid_v4_rejects_other_versions() {
        assert!(!is_uuid_v4("123e4567-e89b-12d3-a456-426614174000"));
        assert!(!is_uuid_v4("123E4567-E89B-42D3-A456-426614174000"));
        assert!(!is_uuid_v4("123e4567-e89b-42d3-c456-426614174000"));
        assert!(is_uuid_v4("123e4567-e89b-42d3-a456-426614174000"));
    }

    #[test]
    fn test_sid_range() {
        for _ in 0..1000 {
            let sid = generate_sid();
            assert!((SID_MIN..=SID_MAX).contains(&sid));
        }
    }

    #[test]
    fn test_today_format() {
        let date = today();
        assert_eq!(date.len(), 10);
        assert!(chrono::NaiveDate::parse_from_str(&date, "%Y-%m-%d").is_ok());
    }

    #[test]
    fn test_ledger_never_repeats() {
        let mut ledger = Ledger::new();
        ledger.record_sid(123_456);

        let mut seen = BTreeSet::new();
        for _ in 0..500 {
            let sid = ledger.fresh_sid();
            assert_ne!(sid, 123_456);
            assert!(seen.insert(sid));
        }
        assert_eq!(ledger.issued_sids(), 501);

        let first = ledger.fresh_uuid();
        let second = ledger.fresh_uuid();
        assert_ne!(first, second);
        assert!(ledger.has_uuid(&first));
        assert!(ledger.has_sid(123_456));
    }
}

//! Record id assignment
//!
//! Ids handed out for records created without one. Each id is fixed-width
//! lowercase hex: 11 digits of milliseconds since the Unix epoch followed by
//! 5 digits of sequence. Ids from one process are strictly increasing, both
//! numerically and in byte order, so newly assigned records sort last in a
//! bucket.

use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

/// Largest sequence value that fits in 5 hex digits
const MAX_SEQUENCE: u32 = 0xF_FFFF;

struct IdState {
    last_ms: u64,
    sequence: u32,
}

static STATE: Mutex<IdState> = parking_lot::const_mutex(IdState {
    last_ms: 0,
    sequence: 0,
});

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Produce the next unique id for this process
pub fn next_id() -> String {
    let mut state = STATE.lock();

    // The clock may step backwards; never reuse an earlier timestamp.
    let mut ms = now_ms().max(state.last_ms);
    if ms == state.last_ms {
        if state.sequence == MAX_SEQUENCE {
            ms += 1;
            state.sequence = 0;
        } else {
            state.sequence += 1;
        }
    } else {
        state.sequence = 0;
    }
    state.last_ms = ms;

    format!("{:011x}{:05x}", ms, state.sequence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::thread;

    #[test]
    fn test_ids_strictly_increase() {
        let ids: Vec<String> = (0..1000).map(|_| next_id()).collect();
        for pair in ids.windows(2) {
            assert!(pair[0] < pair[1], "{} should sort before {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_id_shape() {
        let id = next_id();
        assert_eq!(id.len(), 16);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_ids_unique_across_threads() {
        let handles: Vec<_> = (0..4)
            .map(|_| thread::spawn(|| (0..500).map(|_| next_id()).collect::<Vec<_>>()))
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate id generated");
            }
        }
        assert_eq!(seen.len(), 2000);
    }
}

//! Snowflake ID Generator
//!
//! Twitter-style distributed unique ID generation for all primary keys.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// CampusMatch epoch (2024-01-01T00:00:00.000Z)
const CAMPUS_EPOCH: u64 = 1704067200000;

/// Snowflake ID generator
pub struct SnowflakeGenerator {
    machine_id: u64,
    node_id: u64,
    /// Packed `(last_timestamp << 12) | sequence`, advanced with CAS so
    /// concurrent callers never observe the same (timestamp, sequence) pair.
    state: AtomicU64,
}

impl SnowflakeGenerator {
    /// Create a new snowflake generator
    pub fn new(machine_id: u64, node_id: u64) -> Self {
        Self {
            machine_id: machine_id & 0x1F, // 5 bits
            node_id: node_id & 0x1F,       // 5 bits
            state: AtomicU64::new(0),
        }
    }

    /// Generate a new snowflake ID
    pub fn generate(&self) -> i64 {
        loop {
            let now = self.current_timestamp();
            let state = self.state.load(Ordering::SeqCst);
            let last = state >> 12;
            let sequence = state & 0xFFF;

            let (timestamp, next_sequence) = if now <= last {
                if sequence == 0xFFF {
                    // Sequence exhausted for this millisecond; wait for the clock
                    std::hint::spin_loop();
                    continue;
                }
                (last, sequence + 1)
            } else {
                (now, 0)
            };

            let next_state = (timestamp << 12) | next_sequence;
            if self
                .state
                .compare_exchange(state, next_state, Ordering::SeqCst, Ordering::SeqCst)
                .is_err()
            {
                continue;
            }

            let id = ((timestamp - CAMPUS_EPOCH) << 22)
                | (self.machine_id << 17)
                | (self.node_id << 12)
                | next_sequence;

            return id as i64;
        }
    }

    /// Get current timestamp in milliseconds
    fn current_timestamp(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("Time went backwards")
            .as_millis() as u64
    }
}

/// Extract timestamp from snowflake ID
pub fn extract_timestamp(snowflake: i64) -> u64 {
    ((snowflake as u64) >> 22) + CAMPUS_EPOCH
}

/// Normalize a pair of student ids so (a, b) and (b, a) key the same match.
pub fn ordered_pair(a: i64, b: i64) -> (i64, i64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Parse snowflake from its string form (JSON clients send ids as strings)
pub fn from_string(s: &str) -> Result<i64, std::num::ParseIntError> {
    s.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_unique() {
        let gen = SnowflakeGenerator::new(1, 1);
        let id1 = gen.generate();
        let id2 = gen.generate();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_no_collisions_within_a_millisecond() {
        let gen = SnowflakeGenerator::new(1, 1);
        let mut seen = std::collections::HashSet::new();
        // Far more ids than fit in one millisecond's sequence space
        for _ in 0..10_000 {
            assert!(seen.insert(gen.generate()));
        }
    }

    #[test]
    fn test_no_collisions_across_threads() {
        use std::sync::Arc;

        let gen = Arc::new(SnowflakeGenerator::new(1, 1));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let gen = Arc::clone(&gen);
                std::thread::spawn(move || (0..2_000).map(|_| gen.generate()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = std::collections::HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id));
            }
        }
    }

    #[test]
    fn test_extract_timestamp() {
        let gen = SnowflakeGenerator::new(1, 1);
        let id = gen.generate();
        let ts = extract_timestamp(id);
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_millis() as u64;
        assert!(ts <= now);
        assert!(ts > now - 1000); // Within 1 second
    }

    #[test]
    fn test_ordered_pair_is_symmetric() {
        assert_eq!(ordered_pair(5, 9), (5, 9));
        assert_eq!(ordered_pair(9, 5), (5, 9));
        assert_eq!(ordered_pair(7, 7), (7, 7));
    }
}

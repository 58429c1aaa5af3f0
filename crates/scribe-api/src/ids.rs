//! Entity id generation.
//!
//! Ids are random, rounded up to a multiple of [`ID_STEP`], and always fit a
//! positive SQLite `INTEGER`. They are not guaranteed unique: a collision
//! surfaces as a primary key violation on insert.

use uuid::Uuid;

pub const ID_STEP: u64 = 100_000;

/// Largest multiple of `ID_STEP` that still fits in an `i64`.
const MAX_ID: u64 = (i64::MAX as u64 / ID_STEP) * ID_STEP;

pub fn next_id() -> i64 {
    let (high, _) = Uuid::new_v4().as_u64_pair();
    id_from_entropy(high)
}

fn id_from_entropy(raw: u64) -> i64 {
    let steps = (raw % MAX_ID).div_ceil(ID_STEP).max(1);
    (steps * ID_STEP) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_up_to_step() {
        assert_eq!(id_from_entropy(0), 100_000);
        assert_eq!(id_from_entropy(99_999), 100_000);
        assert_eq!(id_from_entropy(100_000), 100_000);
        assert_eq!(id_from_entropy(100_001), 200_000);
        assert_eq!(id_from_entropy(123_456_789), 123_500_000);
    }

    #[test]
    fn extremes_stay_positive_and_in_range() {
        for raw in [u64::MAX, u64::MAX - 1, MAX_ID - 1, MAX_ID, i64::MAX as u64] {
            let id = id_from_entropy(raw);
            assert!(id > 0, "raw {} gave {}", raw, id);
            assert_eq!(id as u64 % ID_STEP, 0);
        }
    }

    #[test]
    fn generated_ids_are_positive_multiples() {
        for _ in 0..1000 {
            let id = next_id();
            assert!(id > 0);
            assert_eq!(id % ID_STEP as i64, 0);
        }
    }
}

//! Basic type definitions for the chat server
//!
//! Provides:
//! - `UserId`: process-unique numeric user identifier
//! - `IdGenerator`: the issuer of those identifiers

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::AppError;

/// Unique user identifier (newtype pattern)
///
/// Issued once per connection by [`IdGenerator`] and never reused.
/// Ordered so the roster iterates users in arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UserId(pub u64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Issues strictly increasing user identifiers starting at 1.
///
/// The counter is the only state shared between connection tasks.
/// It never wraps: once `u64::MAX` has been handed out every further
/// call fails with [`AppError::IdsExhausted`].
#[derive(Debug)]
pub struct IdGenerator {
    last: AtomicU64,
}

impl IdGenerator {
    /// Create a generator whose first identifier is 1
    pub fn new() -> Self {
        Self::after(0)
    }

    fn after(last: u64) -> Self {
        Self {
            last: AtomicU64::new(last),
        }
    }

    /// Issue the next identifier
    pub fn next_id(&self) -> Result<UserId, AppError> {
        self.last
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_add(1))
            .map(|previous| UserId(previous + 1))
            .map_err(|_| AppError::IdsExhausted)
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn test_ids_start_at_one() {
        let ids = IdGenerator::new();
        assert_eq!(ids.next_id().unwrap(), UserId(1));
        assert_eq!(ids.next_id().unwrap(), UserId(2));
        assert_eq!(ids.next_id().unwrap(), UserId(3));
    }

    #[test]
    fn test_concurrent_ids_unique_and_increasing() {
        let ids = Arc::new(IdGenerator::new());

        let workers: Vec<_> = (0..8)
            .map(|_| {
                let ids = Arc::clone(&ids);
                thread::spawn(move || {
                    (0..1000)
                        .map(|_| ids.next_id().unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for worker in workers {
            let issued = worker.join().unwrap();
            // Strictly increasing per caller
            assert!(issued.windows(2).all(|w| w[0] < w[1]));
            for id in issued {
                assert!(seen.insert(id), "duplicate id {}", id);
            }
        }

        assert_eq!(seen.len(), 8000);
        assert!(seen.contains(&UserId(1)));
        assert!(seen.contains(&UserId(8000)));
    }

    #[test]
    fn test_ids_exhausted_instead_of_wrapping() {
        let ids = IdGenerator::after(u64::MAX - 1);
        assert_eq!(ids.next_id().unwrap(), UserId(u64::MAX));
        assert!(matches!(ids.next_id(), Err(AppError::IdsExhausted)));
        assert!(matches!(ids.next_id(), Err(AppError::IdsExhausted)));
    }

    #[test]
    fn test_user_id_display() {
        assert_eq!(UserId(42).to_string(), "42");
    }
}

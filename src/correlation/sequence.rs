//! Request ID allocation.

// ============================================================================
// Imports
// ============================================================================

use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::identifiers::RequestId;

// ============================================================================
// SequenceAllocator
// ============================================================================

/// Issues request IDs `1, 2, ..., RequestId::MAX, 1, ...`.
///
/// Lock-free; each call advances the shared counter exactly once.
/// Uniqueness holds among outstanding requests as long as no call stays
/// pending for a full wrap period.
#[derive(Debug, Default)]
pub struct SequenceAllocator {
    /// Last issued value (0 before the first call).
    last: AtomicU32,
}

impl SequenceAllocator {
    /// Creates an allocator whose first ID is 1.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last: AtomicU32::new(0),
        }
    }

    /// Creates an allocator as if `last` had just been issued.
    #[inline]
    #[must_use]
    pub const fn resume_after(last: u32) -> Self {
        Self {
            last: AtomicU32::new(last),
        }
    }

    /// Returns the next request ID.
    pub fn next(&self) -> RequestId {
        let previous = match self
            .last
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                Some(last % RequestId::MAX + 1)
            }) {
            Ok(previous) | Err(previous) => previous,
        };

        RequestId::from_non_zero(NonZeroU32::MIN.saturating_add(previous % RequestId::MAX))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashSet;
    use std::sync::Arc;

    use proptest::prelude::*;

    #[test]
    fn test_starts_at_one() {
        let allocator = SequenceAllocator::new();
        assert_eq!(allocator.next().get(), 1);
        assert_eq!(allocator.next().get(), 2);
        assert_eq!(allocator.next().get(), 3);
    }

    #[test]
    fn test_wraps_without_zero() {
        let allocator = SequenceAllocator::resume_after(RequestId::MAX - 1);
        assert_eq!(allocator.next().get(), RequestId::MAX);
        assert_eq!(allocator.next().get(), 1);
        assert_eq!(allocator.next().get(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_ids_are_distinct() {
        let allocator = Arc::new(SequenceAllocator::new());
        let mut tasks = Vec::new();

        for _ in 0..8 {
            let allocator = Arc::clone(&allocator);
            tasks.push(tokio::spawn(async move {
                (0..500).map(|_| allocator.next().get()).collect::<Vec<_>>()
            }));
        }

        let mut seen = HashSet::new();
        for task in tasks {
            for id in task.await.expect("task completes") {
                assert_ne!(id, 0);
                assert!(seen.insert(id), "duplicate id {id}");
            }
        }
        assert_eq!(seen.len(), 4000);
    }

    proptest! {
        #[test]
        fn prop_never_zero_and_cycles(start in 0u32..=RequestId::MAX, steps in 1usize..64) {
            let allocator = SequenceAllocator::resume_after(start);
            let mut expected = start;
            for _ in 0..steps {
                expected = expected % RequestId::MAX + 1;
                let id = allocator.next().get();
                prop_assert_ne!(id, 0);
                prop_assert!(id <= RequestId::MAX);
                prop_assert_eq!(id, expected);
            }
        }
    }
}

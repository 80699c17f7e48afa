use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

// ============================================================================
// Basic transitions
// ============================================================================

#[test]
fn test_new_flags_are_not_pending() {
    let flags = PendingFlags::new();
    assert!(flags.is_empty());

    flags.ensure_capacity(3);
    assert_eq!(flags.len(), 4);
    for index in 0..4 {
        assert!(!flags.is_pending(index));
    }
}

#[test]
fn test_mark_then_clear_round_trip() {
    let flags = PendingFlags::new();
    flags.ensure_capacity(0);

    assert!(flags.try_mark_pending(0));
    assert!(flags.is_pending(0));

    flags.clear_pending(0);
    assert!(!flags.is_pending(0));
}

#[test]
fn test_second_mark_loses() {
    let flags = PendingFlags::new();
    flags.ensure_capacity(5);

    assert!(flags.try_mark_pending(5));
    assert!(!flags.try_mark_pending(5));

    // After the deferred free clears it, the next cycle can win again
    flags.clear_pending(5);
    assert!(flags.try_mark_pending(5));
}

#[test]
fn test_flags_are_independent() {
    let flags = PendingFlags::new();
    flags.ensure_capacity(2);

    assert!(flags.try_mark_pending(1));
    assert!(!flags.is_pending(0));
    assert!(!flags.is_pending(2));
}

// ============================================================================
// Growth tests
// ============================================================================

#[test]
fn test_ensure_capacity_preserves_flag_values() {
    let flags = PendingFlags::new();
    flags.ensure_capacity(3);
    assert!(flags.try_mark_pending(1));
    assert!(flags.try_mark_pending(3));

    // Grow far beyond the initial size
    flags.ensure_capacity(10_000);

    assert!(!flags.is_pending(0));
    assert!(flags.is_pending(1));
    assert!(!flags.is_pending(2));
    assert!(flags.is_pending(3));
    // The large index is usable immediately
    assert!(flags.try_mark_pending(10_000));
}

#[test]
fn test_ensure_capacity_never_shrinks() {
    let flags = PendingFlags::new();
    flags.ensure_capacity(99);
    flags.ensure_capacity(0);
    assert_eq!(flags.len(), 100);
}

// ============================================================================
// Race tests
// ============================================================================

#[test]
fn test_exactly_one_winner_under_contention() {
    let flags = Arc::new(PendingFlags::new());
    flags.ensure_capacity(0);

    for _cycle in 0..50 {
        let barrier = Arc::new(Barrier::new(16));
        let wins = Arc::new(AtomicUsize::new(0));

        let threads: Vec<_> = (0..16)
            .map(|_| {
                let flags = flags.clone();
                let barrier = barrier.clone();
                let wins = wins.clone();
                thread::spawn(move || {
                    barrier.wait();
                    if flags.try_mark_pending(0) {
                        wins.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();
        for handle in threads {
            handle.join().unwrap();
        }

        assert_eq!(wins.load(Ordering::SeqCst), 1);
        flags.clear_pending(0);
    }
}

#[test]
fn test_marks_on_covered_indices_survive_concurrent_growth() {
    let flags = Arc::new(PendingFlags::new());
    flags.ensure_capacity(15);

    let grower = {
        let flags = flags.clone();
        thread::spawn(move || {
            for index in (16..50_000).step_by(1000) {
                flags.ensure_capacity(index);
            }
        })
    };
    let marker = {
        let flags = flags.clone();
        thread::spawn(move || {
            for _ in 0..2000 {
                for index in 0..16 {
                    if flags.try_mark_pending(index) {
                        flags.clear_pending(index);
                    }
                }
            }
        })
    };

    grower.join().unwrap();
    marker.join().unwrap();

    for index in 0..16 {
        assert!(!flags.is_pending(index));
    }
}

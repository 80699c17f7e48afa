use super::*;
use std::sync::Arc;
use std::thread;

// ============================================================================
// Basic tests
// ============================================================================

#[test]
fn test_new_table_is_empty() {
    let table = GenerationTable::new();
    assert!(table.is_empty());
    assert_eq!(table.len(), 0);
}

#[test]
fn test_new_entries_start_at_zero() {
    let table = GenerationTable::new();
    table.resize(4);
    for index in 0..4 {
        assert_eq!(table.load(index), 0);
    }
}

#[test]
fn test_bump_increments_by_exactly_one() {
    let table = GenerationTable::new();
    table.resize(2);

    table.bump(0);
    assert_eq!(table.load(0), 1);
    assert_eq!(table.load(1), 0);

    table.bump(0);
    table.bump(0);
    assert_eq!(table.load(0), 3);
}

// ============================================================================
// Growth tests
// ============================================================================

#[test]
fn test_resize_never_shrinks() {
    let table = GenerationTable::new();
    table.resize(8);
    table.resize(2);
    assert_eq!(table.len(), 8);
}

#[test]
fn test_resize_preserves_existing_generations() {
    let table = GenerationTable::new();
    table.resize(4);
    table.bump(1);
    table.bump(1);
    table.bump(3);

    // Grow far beyond the initial size
    table.resize(10_000);

    assert_eq!(table.load(0), 0);
    assert_eq!(table.load(1), 2);
    assert_eq!(table.load(2), 0);
    assert_eq!(table.load(3), 1);
    // The new range is usable immediately
    assert_eq!(table.load(9_999), 0);
    table.bump(9_999);
    assert_eq!(table.load(9_999), 1);
}

// ============================================================================
// Concurrency tests
// ============================================================================

#[test]
fn test_concurrent_bumps_are_not_lost() {
    let table = Arc::new(GenerationTable::new());
    table.resize(1);

    let threads: Vec<_> = (0..8)
        .map(|_| {
            let table = table.clone();
            thread::spawn(move || {
                for _ in 0..1000 {
                    table.bump(0);
                }
            })
        })
        .collect();
    for handle in threads {
        handle.join().unwrap();
    }

    assert_eq!(table.load(0), 8000);
}

#[test]
fn test_loads_survive_concurrent_growth() {
    let table = Arc::new(GenerationTable::new());
    table.resize(16);
    for index in 0..16 {
        table.bump(index);
    }

    let grower = {
        let table = table.clone();
        thread::spawn(move || {
            for capacity in (16..50_000).step_by(1000) {
                table.resize(capacity);
            }
        })
    };
    let reader = {
        let table = table.clone();
        thread::spawn(move || {
            for _ in 0..5000 {
                for index in 0..16 {
                    assert_eq!(table.load(index), 1);
                }
            }
        })
    };

    grower.join().unwrap();
    reader.join().unwrap();
}

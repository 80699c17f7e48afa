use super::*;

// ============================================================================
// Minting tests
// ============================================================================

#[test]
fn test_mints_sequential_indices_from_base() {
    let mut segment = HeapSegment::new(100, 4);
    assert_eq!(segment.allocate(), Some(100));
    assert_eq!(segment.allocate(), Some(101));
    assert_eq!(segment.allocate(), Some(102));
    assert_eq!(segment.allocate(), Some(103));
    assert_eq!(segment.allocate(), None);
}

#[test]
fn test_zero_base_segment() {
    let mut segment = HeapSegment::new(0, 2);
    assert_eq!(segment.allocate(), Some(0));
    assert_eq!(segment.allocate(), Some(1));
    assert_eq!(segment.allocate(), None);
}

// ============================================================================
// Recycling tests
// ============================================================================

#[test]
fn test_release_and_recycle() {
    let mut segment = HeapSegment::new(10, 3);
    let a = segment.allocate().unwrap(); // 10
    let _b = segment.allocate().unwrap(); // 11

    segment.release(a);
    assert_eq!(segment.allocate(), Some(10));
}

#[test]
fn test_recycled_positions_come_before_fresh_ones() {
    // Free positions are a stack: last freed = first recycled
    let mut segment = HeapSegment::new(0, 4);
    let a = segment.allocate().unwrap(); // 0
    let b = segment.allocate().unwrap(); // 1

    segment.release(a);
    segment.release(b);

    assert_eq!(segment.allocate(), Some(1));
    assert_eq!(segment.allocate(), Some(0));
    // Free set exhausted, next is fresh
    assert_eq!(segment.allocate(), Some(2));
}

#[test]
fn test_full_segment_with_release_becomes_allocatable() {
    let mut segment = HeapSegment::new(0, 2);
    let a = segment.allocate().unwrap();
    segment.allocate().unwrap();
    assert_eq!(segment.allocate(), None);

    segment.release(a);
    assert_eq!(segment.allocate(), Some(a));
}

// ============================================================================
// Range and count tests
// ============================================================================

#[test]
fn test_contains_is_range_containment() {
    let segment = HeapSegment::new(50, 10);
    assert!(!segment.contains(49));
    assert!(segment.contains(50));
    assert!(segment.contains(59));
    assert!(!segment.contains(60));
    assert!(!segment.contains(0));
}

#[test]
fn test_counts_track_allocations() {
    let mut segment = HeapSegment::new(0, 4);
    assert_eq!(segment.allocated_count(), 0);
    assert_eq!(segment.remaining(), 4);

    let a = segment.allocate().unwrap();
    segment.allocate().unwrap();
    assert_eq!(segment.allocated_count(), 2);
    assert_eq!(segment.remaining(), 2);

    segment.release(a);
    assert_eq!(segment.allocated_count(), 1);
    assert_eq!(segment.remaining(), 3);
}

#[test]
#[should_panic(expected = "double free")]
fn test_double_free_is_detected_in_debug() {
    let mut segment = HeapSegment::new(0, 2);
    let a = segment.allocate().unwrap();
    segment.release(a);
    segment.release(a);
}

//! Hole and End-of-Data Tests
//!
//! - Reads at or past the logical size return 0
//! - Reads inside the logical size but over an unallocated segment or block
//!   return 0 and leave the destination untouched
//! - A single call never crosses a block boundary

use segstore::store::{Interrupt, Store, StoreConfig};

fn small_store() -> Store {
    Store::new(StoreConfig::new(4, 2)).unwrap()
}

#[tokio::test]
async fn test_read_past_size_returns_zero() {
    let store = small_store();
    let interrupt = Interrupt::new();

    let mut pos = 0;
    store.write(&mut pos, &b"abcd"[..], 4, &interrupt).await.unwrap();

    for offset in [4u64, 5, 8, 1_000, u64::MAX] {
        let mut pos = offset;
        let mut out = Vec::new();
        let n = store.read(&mut pos, &mut out, 16, &interrupt).await.unwrap();
        assert_eq!(n, 0, "offset {}", offset);
        assert!(out.is_empty());
        assert_eq!(pos, offset);
    }
}

#[tokio::test]
async fn test_hole_in_untouched_segment() {
    // itemsize 8: offset 100 is segment 12, offset 4 is segment 0
    let store = small_store();
    let interrupt = Interrupt::new();

    let mut pos = 100;
    assert_eq!(store.write(&mut pos, &b"!"[..], 1, &interrupt).await.unwrap(), 1);
    assert_eq!(store.size().await, 101);

    for offset in [0u64, 4, 50, 99] {
        let mut pos = offset;
        let mut out = [0x55u8; 4];
        let n = store.read(&mut pos, &mut out[..], 4, &interrupt).await.unwrap();
        assert_eq!(n, 0, "offset {} is a hole", offset);
        assert_eq!(out, [0x55; 4]);
    }

    let mut pos = 100;
    let mut out = Vec::new();
    assert_eq!(store.read(&mut pos, &mut out, 4, &interrupt).await.unwrap(), 1);
    assert_eq!(out, b"!");
}

#[tokio::test]
async fn test_hole_in_allocated_segment() {
    let store = small_store();
    let interrupt = Interrupt::new();

    // Block 1 of segment 0 only
    let mut pos = 4;
    store.write(&mut pos, &b"wxyz"[..], 4, &interrupt).await.unwrap();

    let mut pos = 0;
    let mut out = Vec::new();
    assert_eq!(store.read(&mut pos, &mut out, 8, &interrupt).await.unwrap(), 0);

    let stat = store.stat().await;
    assert_eq!(stat.segments, 1);
    assert_eq!(stat.allocated_blocks, 1);
    assert_eq!(store.metrics().hole_reads, 1);
}

#[tokio::test]
async fn test_unwritten_bytes_of_allocated_block_read_as_zero() {
    let store = small_store();
    let interrupt = Interrupt::new();

    let mut pos = 3;
    store.write(&mut pos, &b"z"[..], 1, &interrupt).await.unwrap();

    let mut pos = 0;
    let mut out = Vec::new();
    assert_eq!(store.read(&mut pos, &mut out, 4, &interrupt).await.unwrap(), 4);
    assert_eq!(out, b"\0\0\0z");
}

#[tokio::test]
async fn test_write_crossing_block_is_truncated() {
    let store = small_store();
    let interrupt = Interrupt::new();

    let mut pos = 2;
    let n = store
        .write(&mut pos, &b"abcdef"[..], 6, &interrupt)
        .await
        .unwrap();
    assert_eq!(n, 2);
    assert_eq!(pos, 4);
    assert_eq!(store.size().await, 4);

    // Follow-up write lands the rest contiguously
    let n = store.write(&mut pos, &b"cdef"[..], 4, &interrupt).await.unwrap();
    assert_eq!(n, 4);

    let mut pos = 2;
    let mut out = Vec::new();
    store.read(&mut pos, &mut out, 6, &interrupt).await.unwrap();
    store.read(&mut pos, &mut out, 6, &interrupt).await.unwrap();
    assert_eq!(out, b"abcdef");
}

#[tokio::test]
async fn test_read_crossing_block_is_truncated() {
    let store = small_store();
    let interrupt = Interrupt::new();

    let mut pos = 0;
    for chunk in [&b"0123"[..], &b"4567"[..]] {
        store.write(&mut pos, chunk, 4, &interrupt).await.unwrap();
    }

    let mut pos = 3;
    let mut out = [0u8; 8];
    let n = store.read(&mut pos, &mut out[..], 5, &interrupt).await.unwrap();
    assert_eq!(n, 1);
    assert_eq!(out[0], b'3');
    assert_eq!(pos, 4);
}

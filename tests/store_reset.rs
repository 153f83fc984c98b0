//! Reset and Configuration Tests
//!
//! - Reset frees the whole chain and zeroes the logical size
//! - Write-only open truncates, other modes do not
//! - Geometry changes apply only from the next reset on
//! - Configuration loads from JSON files and rejects bad values

use std::fs;
use std::sync::Arc;

use segstore::store::{AccessMode, Interrupt, Store, StoreConfig, StoreErrorCode};
use tempfile::TempDir;

fn small_store() -> Arc<Store> {
    Arc::new(Store::new(StoreConfig::new(4, 2)).unwrap())
}

// =============================================================================
// Reset
// =============================================================================

#[tokio::test]
async fn test_reset_then_read_returns_zero() {
    let store = small_store();
    let interrupt = Interrupt::new();

    let mut handle = store.open(AccessMode::ReadWrite).await;
    handle.write_all(&[7u8; 37]).await.unwrap();
    assert_eq!(store.size().await, 37);

    store.reset(&interrupt).await.unwrap();

    let mut pos = 0;
    let mut out = Vec::new();
    assert_eq!(store.read(&mut pos, &mut out, 37, &interrupt).await.unwrap(), 0);

    let stat = store.stat().await;
    assert_eq!(stat.size, 0);
    assert_eq!(stat.segments, 0);
    assert_eq!(stat.allocated_blocks, 0);
}

#[tokio::test]
async fn test_reset_releases_what_was_allocated() {
    let store = small_store();
    let mut handle = store.open(AccessMode::ReadWrite).await;
    handle.write_all(&[1u8; 10]).await.unwrap();
    handle.set_position(60);
    handle.write_all(b"x").await.unwrap();

    let allocated = store.metrics();
    store.reset(&Interrupt::new()).await.unwrap();
    let released = store.metrics();

    assert_eq!(released.segments_released, allocated.segments_allocated);
    assert_eq!(released.blocks_released, allocated.blocks_allocated);
}

#[tokio::test]
async fn test_reset_on_empty_store_is_noop() {
    let store = small_store();
    let interrupt = Interrupt::new();
    store.reset(&interrupt).await.unwrap();
    store.reset(&interrupt).await.unwrap();

    let metrics = store.metrics();
    assert_eq!(metrics.resets, 2);
    assert_eq!(metrics.segments_released, 0);
}

#[tokio::test]
async fn test_only_write_only_open_truncates() {
    let store = small_store();
    let mut handle = store.open(AccessMode::ReadWrite).await;
    handle.write_all(b"payload").await.unwrap();

    store.open(AccessMode::ReadOnly).await;
    store.open(AccessMode::ReadWrite).await;
    assert_eq!(store.size().await, 7);

    store.open(AccessMode::WriteOnly).await;
    assert_eq!(store.size().await, 0);
}

// =============================================================================
// Deferred geometry
// =============================================================================

#[tokio::test]
async fn test_geometry_change_waits_for_reset() {
    let store = small_store();
    let interrupt = Interrupt::new();

    let mut pos = 0;
    store.write(&mut pos, &[1u8; 16][..], 16, &interrupt).await.unwrap();

    store.set_block_size(16, &interrupt).await.unwrap();
    store.set_blocks_per_segment(4, &interrupt).await.unwrap();

    // Still clamped at the old 4-byte blocks
    let mut pos = 0;
    assert_eq!(
        store.write(&mut pos, &[2u8; 16][..], 16, &interrupt).await.unwrap(),
        4
    );
    let stat = store.stat().await;
    assert_eq!(stat.geometry.block_size, 4);
    assert_eq!(stat.config, StoreConfig::new(16, 4));

    // Existing blocks are not resized
    let mut pos = 40;
    store.write(&mut pos, &[3u8; 16][..], 16, &interrupt).await.unwrap();
    assert_eq!(store.stat().await.segments, 6);

    store.reset(&interrupt).await.unwrap();

    let mut pos = 0;
    assert_eq!(
        store.write(&mut pos, &[4u8; 16][..], 16, &interrupt).await.unwrap(),
        16
    );
    let stat = store.stat().await;
    assert_eq!(stat.geometry.block_size, 16);
    assert_eq!(stat.geometry.blocks_per_segment, 4);
    assert_eq!(stat.segments, 1);
    assert_eq!(stat.allocated_blocks, 1);
}

#[tokio::test]
async fn test_invalid_geometry_change_rejected() {
    let store = small_store();
    let interrupt = Interrupt::new();

    let err = store.set_blocks_per_segment(0, &interrupt).await.unwrap_err();
    assert_eq!(err.code(), StoreErrorCode::SegstoreInvalidConfig);

    store.reset(&interrupt).await.unwrap();
    assert_eq!(store.geometry().await.blocks_per_segment, 2);
}

// =============================================================================
// Configuration loading
// =============================================================================

#[tokio::test]
async fn test_store_from_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("segstore.json");
    fs::write(&path, r#"{"block_size": 8, "blocks_per_segment": 2}"#).unwrap();

    let config = StoreConfig::load(&path).unwrap();
    let store = Arc::new(Store::new(config).unwrap());

    let mut handle = store.open(AccessMode::ReadWrite).await;
    assert_eq!(handle.write(&[9u8; 20]).await.unwrap(), 8);
    assert_eq!(store.stat().await.geometry.segment_span(), 16);
}

#[test]
fn test_config_file_errors() {
    let temp_dir = TempDir::new().unwrap();

    let missing = StoreConfig::load(&temp_dir.path().join("absent.json")).unwrap_err();
    assert_eq!(missing.code(), StoreErrorCode::SegstoreInvalidConfig);
    assert!(missing.message().contains("absent.json"));

    let path = temp_dir.path().join("zero.json");
    fs::write(&path, r#"{"block_size": 0}"#).unwrap();
    assert!(StoreConfig::load(&path).is_err());

    let path = temp_dir.path().join("garbage.json");
    fs::write(&path, "block_size = 8").unwrap();
    assert!(StoreConfig::load(&path).is_err());
}

// Host-side tests for the image manifest and its status tracking.

use orbfield_core::{sequential_name, AssetCatalog, AssetError, AssetManifest, AssetStatus, ImageId};

#[test]
fn sequential_names_are_zero_padded_and_one_based() {
    let manifest = AssetManifest::sequential(50);
    assert_eq!(manifest.len(), 50);
    assert_eq!(manifest.name(ImageId(0)), Some("01.jpg"));
    assert_eq!(manifest.name(ImageId(9)), Some("10.jpg"));
    assert_eq!(manifest.name(ImageId(49)), Some("50.jpg"));
    assert_eq!(manifest.name(ImageId(50)), None);
    assert_eq!(sequential_name(100), "100.jpg");
}

#[test]
fn slots_start_pending() {
    let manifest = AssetManifest::sequential(4);
    assert_eq!(manifest.count(AssetStatus::Pending), 4);
    assert!(manifest.ids().all(|id| !manifest.is_ready(id)));
}

#[test]
fn marking_updates_status_and_readiness() {
    let mut manifest = AssetManifest::sequential(3);
    manifest.mark_ready(ImageId(0)).unwrap();
    manifest.mark_failed(ImageId(2)).unwrap();

    assert_eq!(manifest.status(ImageId(0)), Some(AssetStatus::Ready));
    assert_eq!(manifest.status(ImageId(1)), Some(AssetStatus::Pending));
    assert_eq!(manifest.status(ImageId(2)), Some(AssetStatus::Failed));
    assert!(manifest.is_ready(ImageId(0)));
    assert!(!manifest.is_ready(ImageId(2)));
    assert!(manifest.is_failed(ImageId(2)));
    assert!(!manifest.is_failed(ImageId(1)), "pending is not failed");
    assert_eq!(manifest.count(AssetStatus::Ready), 1);
    assert_eq!(manifest.count(AssetStatus::Failed), 1);
}

#[test]
fn unknown_slot_is_an_error() {
    let mut manifest = AssetManifest::sequential(2);
    let err = manifest.mark_ready(ImageId(5)).unwrap_err();
    assert_eq!(
        err,
        AssetError::UnknownSlot {
            id: ImageId(5),
            len: 2
        }
    );
    assert_eq!(err.to_string(), "no image slot #5 (manifest holds 2)");
    assert!(!manifest.is_ready(ImageId(5)));
}

#[test]
fn empty_manifest() {
    let manifest = AssetManifest::sequential(0);
    assert!(manifest.is_empty());
    assert_eq!(manifest.ids().count(), 0);
}

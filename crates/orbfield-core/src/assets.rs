//! Image asset bookkeeping.
//!
//! The scene never owns pixel data. It refers to images by [`ImageId`] and asks
//! an [`AssetCatalog`] whether a slot is usable before emitting a draw for it.
//! Front-ends own the decoded pixels and report load results through
//! [`AssetManifest::mark_ready`] / [`AssetManifest::mark_failed`].

use std::fmt;

/// Index into the fixed, ordered set of images.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(pub usize);

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetStatus {
    Pending,
    Ready,
    Failed,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AssetError {
    #[error("no image slot {id} (manifest holds {len})")]
    UnknownSlot { id: ImageId, len: usize },
}

/// Read-only view of which image slots can be drawn.
pub trait AssetCatalog {
    fn len(&self) -> usize;

    fn is_ready(&self, id: ImageId) -> bool;

    /// Slots that will never load. Pending slots are not failed.
    fn is_failed(&self, _id: ImageId) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone, Debug)]
struct Slot {
    name: String,
    status: AssetStatus,
}

/// Named image slots with their load status.
#[derive(Clone, Debug, Default)]
pub struct AssetManifest {
    slots: Vec<Slot>,
}

impl AssetManifest {
    /// Slots named `01.jpg`, `02.jpg`, ... up to `count`.
    pub fn sequential(count: usize) -> Self {
        let slots = (1..=count)
            .map(|i| Slot {
                name: sequential_name(i),
                status: AssetStatus::Pending,
            })
            .collect();
        Self { slots }
    }

    pub fn ids(&self) -> impl Iterator<Item = ImageId> + '_ {
        (0..self.slots.len()).map(ImageId)
    }

    pub fn name(&self, id: ImageId) -> Option<&str> {
        self.slots.get(id.0).map(|s| s.name.as_str())
    }

    pub fn status(&self, id: ImageId) -> Option<AssetStatus> {
        self.slots.get(id.0).map(|s| s.status)
    }

    pub fn mark_ready(&mut self, id: ImageId) -> Result<(), AssetError> {
        self.set_status(id, AssetStatus::Ready)
    }

    pub fn mark_failed(&mut self, id: ImageId) -> Result<(), AssetError> {
        self.set_status(id, AssetStatus::Failed)
    }

    pub fn count(&self, status: AssetStatus) -> usize {
        self.slots.iter().filter(|s| s.status == status).count()
    }

    fn set_status(&mut self, id: ImageId, status: AssetStatus) -> Result<(), AssetError> {
        let len = self.slots.len();
        let slot = self
            .slots
            .get_mut(id.0)
            .ok_or(AssetError::UnknownSlot { id, len })?;
        slot.status = status;
        Ok(())
    }
}

impl AssetCatalog for AssetManifest {
    fn len(&self) -> usize {
        self.slots.len()
    }

    fn is_ready(&self, id: ImageId) -> bool {
        self.status(id) == Some(AssetStatus::Ready)
    }

    fn is_failed(&self, id: ImageId) -> bool {
        self.status(id) == Some(AssetStatus::Failed)
    }
}

/// File name for the 1-based `index`, zero-padded to two digits.
pub fn sequential_name(index: usize) -> String {
    format!("{:02}.jpg", index)
}

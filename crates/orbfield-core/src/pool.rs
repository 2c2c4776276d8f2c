use crate::assets::{AssetCatalog, ImageId};
use rand::seq::SliceRandom;
use rand::Rng;

/// Shuffled queue of image ids that refills itself when drained.
///
/// Every id is handed out once per cycle, so no image repeats until all of
/// them have been used.
#[derive(Clone, Debug)]
pub struct ImagePool {
    image_count: usize,
    queue: Vec<ImageId>,
    refills: u64,
}

impl ImagePool {
    pub fn new<R: Rng + ?Sized>(image_count: usize, rng: &mut R) -> Self {
        let mut pool = Self {
            image_count,
            queue: Vec::with_capacity(image_count),
            refills: 0,
        };
        pool.fill(rng);
        pool
    }

    /// Take the next usable image, reshuffling the full set first if drained.
    /// Failed slots are skipped; pending ones are handed out. `None` when no
    /// slot is usable.
    pub fn next<R, A>(&mut self, rng: &mut R, assets: &A) -> Option<ImageId>
    where
        R: Rng + ?Sized,
        A: AssetCatalog + ?Sized,
    {
        let mut refilled = false;
        loop {
            match self.queue.pop() {
                Some(id) if assets.is_failed(id) => continue,
                Some(id) => return Some(id),
                // A full fresh cycle with nothing usable means every slot failed.
                None if self.image_count == 0 || refilled => return None,
                None => {
                    self.fill(rng);
                    self.refills += 1;
                    refilled = true;
                    log::debug!("[pool] refilled {} images", self.image_count);
                }
            }
        }
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    /// Times the queue has been rebuilt after running dry.
    pub fn refills(&self) -> u64 {
        self.refills
    }

    fn fill<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.queue.clear();
        self.queue.extend((0..self.image_count).map(ImageId));
        self.queue.shuffle(rng);
    }
}

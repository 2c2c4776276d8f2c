use crate::assets::ImageId;
use crate::constants::{FLASH_CHANCE, FLASH_DURATION};
use rand::Rng;

/// Rare full-screen image that fades out over a fixed number of frames.
#[derive(Clone, Debug, Default)]
pub struct FlashOverlay {
    image: Option<ImageId>,
    countdown: u32,
}

impl FlashOverlay {
    /// Roll for a new flash when idle. Returns the picked image on trigger.
    pub fn maybe_trigger<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        image_count: usize,
    ) -> Option<ImageId> {
        if self.is_active() || image_count == 0 {
            return None;
        }
        if rng.gen::<f32>() >= FLASH_CHANCE {
            return None;
        }
        let image = ImageId(rng.gen_range(0..image_count));
        self.trigger(image);
        Some(image)
    }

    pub fn trigger(&mut self, image: ImageId) {
        log::debug!("[flash] {}", image);
        self.image = Some(image);
        self.countdown = FLASH_DURATION;
    }

    /// Count down one frame; the image is released when the countdown ends.
    pub fn update(&mut self) {
        if self.countdown == 0 {
            return;
        }
        self.countdown -= 1;
        if self.countdown == 0 {
            self.image = None;
        }
    }

    pub fn is_active(&self) -> bool {
        self.countdown > 0
    }

    pub fn image(&self) -> Option<ImageId> {
        self.image
    }

    pub fn countdown(&self) -> u32 {
        self.countdown
    }

    /// 255 at the start of a flash, falling linearly to 0 as it ends.
    pub fn opacity(&self) -> f32 {
        255.0 * self.countdown as f32 / FLASH_DURATION as f32
    }
}

//! Background image loading.
//!
//! Images are read and decoded off the render thread and handed back over a
//! channel; the frame loop uploads whatever has arrived and keeps drawing in
//! the meantime.

use image::imageops::{self, FilterType};
use image::RgbaImage;
use orbfield_core::{AssetManifest, ImageId};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("decoding {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("{path} has no pixels")]
    Empty { path: PathBuf },
}

pub struct LoadedImage {
    pub id: ImageId,
    pub name: String,
    pub result: Result<RgbaImage, LoadError>,
}

pub struct AssetLoader {
    rx: Receiver<LoadedImage>,
    done: bool,
}

impl AssetLoader {
    /// Start decoding every manifest slot from `dir` in file order. Images
    /// larger than `max_dimension` on either side are scaled down to fit.
    pub fn spawn(
        dir: &Path,
        manifest: &AssetManifest,
        max_dimension: u32,
    ) -> anyhow::Result<Self> {
        let jobs: Vec<(ImageId, String)> = manifest
            .ids()
            .filter_map(|id| manifest.name(id).map(|n| (id, n.to_string())))
            .collect();
        let dir = dir.to_path_buf();
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("asset-loader".into())
            .spawn(move || {
                for (id, name) in jobs {
                    let result = load_rgba(&dir.join(&name), max_dimension);
                    if tx.send(LoadedImage { id, name, result }).is_err() {
                        break;
                    }
                }
            })?;
        Ok(Self { rx, done: false })
    }

    /// Everything decoded since the last call.
    pub fn drain(&mut self) -> Vec<LoadedImage> {
        let mut out = Vec::new();
        if self.done {
            return out;
        }
        loop {
            match self.rx.try_recv() {
                Ok(img) => out.push(img),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.done = true;
                    break;
                }
            }
        }
        out
    }
}

fn load_rgba(path: &Path, max_dimension: u32) -> Result<RgbaImage, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let img = image::load_from_memory(&bytes).map_err(|source| LoadError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let img = img.to_rgba8();
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        });
    }
    match fit_within(width, height, max_dimension) {
        Some((w, h)) => {
            log::warn!(
                "{} is {}x{}, scaling to {}x{}",
                path.display(),
                width,
                height,
                w,
                h
            );
            Ok(imageops::resize(&img, w, h, FilterType::Triangle))
        }
        None => Ok(img),
    }
}

/// Size that fits `max` on both sides keeping the aspect ratio, or `None`
/// when the image already fits.
fn fit_within(width: u32, height: u32, max: u32) -> Option<(u32, u32)> {
    let max = max.max(1);
    if width <= max && height <= max {
        return None;
    }
    let scale = max as f64 / width.max(height) as f64;
    let side = |v: u32| ((v as f64 * scale).round() as u32).clamp(1, max);
    Some((side(width), side(height)))
}

//! Photo acquisition behind a completion barrier.
//!
//! Every image of a batch is decoded on its own thread; [`PhotoBatch::load`]
//! joins all of them before returning, so layout only ever sees a complete,
//! index-ordered batch. A single failure fails the whole batch.

use std::path::{Path, PathBuf};
use std::thread;

use anyhow::{anyhow, Context, Result};
use image::RgbaImage;
use mosaic::Photo;

/// A decoded image together with its position in the batch.
pub struct LoadedPhoto {
    pub index: usize,
    pub path: PathBuf,
    pub image: RgbaImage,
}

impl LoadedPhoto {
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Layout-side description of this image (unsized until a viewport is applied).
    pub fn layout_photo(&self) -> Result<Photo> {
        let (width, height) = self.dimensions();
        Photo::new(self.index, width, height)
            .with_context(|| format!("cannot lay out {}", self.path.display()))
    }
}

/// A fully resolved batch, ordered by index.
pub struct PhotoBatch {
    photos: Vec<LoadedPhoto>,
}

impl PhotoBatch {
    /// Decodes every path concurrently and waits for all of them.
    pub fn load(paths: &[PathBuf]) -> Result<Self> {
        let results: Vec<Result<LoadedPhoto>> = thread::scope(|scope| {
            let handles: Vec<_> = paths
                .iter()
                .enumerate()
                .map(|(index, path)| scope.spawn(move || decode(index, path)))
                .collect();
            handles
                .into_iter()
                .zip(paths)
                .map(|(handle, path)| {
                    handle.join().unwrap_or_else(|_| {
                        Err(anyhow!("decoder thread panicked for {}", path.display()))
                    })
                })
                .collect()
        });

        let photos = results.into_iter().collect::<Result<Vec<_>>>()?;
        tracing::debug!(count = photos.len(), "photo batch resolved");
        Ok(Self { photos })
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn photos(&self) -> &[LoadedPhoto] {
        &self.photos
    }

    pub fn layout_photos(&self) -> Result<Vec<Photo>> {
        self.photos.iter().map(LoadedPhoto::layout_photo).collect()
    }
}

fn decode(index: usize, path: &Path) -> Result<LoadedPhoto> {
    let image = image::open(path)
        .with_context(|| format!("failed to open photo #{index} at {}", path.display()))?;
    tracing::trace!(index, path = %path.display(), "decoded photo");
    Ok(LoadedPhoto {
        index,
        path: path.to_path_buf(),
        image: image.to_rgba8(),
    })
}

/// Reads only the image headers of `paths` to build an unsized layout batch.
pub fn probe_photos(paths: &[PathBuf]) -> Result<Vec<Photo>> {
    paths
        .iter()
        .enumerate()
        .map(|(index, path)| {
            let (width, height) = image::image_dimensions(path)
                .with_context(|| format!("failed to read dimensions of {}", path.display()))?;
            Photo::new(index, width, height)
                .with_context(|| format!("cannot lay out {}", path.display()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        let image: RgbaImage = ImageBuffer::from_pixel(width, height, Rgba([200, 40, 40, 255]));
        image.save(&path).unwrap();
        path
    }

    #[test]
    fn load_keeps_batch_order() {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<PathBuf> = (0..6)
            .map(|i| write_png(dir.path(), &format!("p{i}.png"), 10 + i, 20))
            .collect();

        let batch = PhotoBatch::load(&paths).unwrap();
        assert_eq!(batch.len(), 6);
        for (position, photo) in batch.photos().iter().enumerate() {
            assert_eq!(photo.index, position);
            assert_eq!(photo.dimensions(), (10 + position as u32, 20));
        }

        let layout = batch.layout_photos().unwrap();
        assert_eq!(layout[3].index(), 3);
        assert_eq!(layout[3].natural_size(), (13, 20));
    }

    #[test]
    fn one_failure_fails_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = vec![write_png(dir.path(), "ok.png", 4, 4)];
        paths.push(dir.path().join("missing.png"));
        assert!(PhotoBatch::load(&paths).is_err());
    }

    #[test]
    fn probe_reads_headers() {
        let dir = tempfile::tempdir().unwrap();
        let paths = vec![
            write_png(dir.path(), "a.png", 30, 10),
            write_png(dir.path(), "b.png", 10, 30),
        ];
        let photos = probe_photos(&paths).unwrap();
        assert!((photos[0].aspect() - 3.0).abs() < 1e-6);
        assert_eq!(photos[1].natural_size(), (10, 30));
    }
}

//! Videos stored as directories of grayscale PNG frames

use crate::io::configuration::FRAME_PREFIX;
use crate::io::error::{PatternError, Result, file_system_error, invalid_source};
use image::{Delay, Frame, GrayImage, Luma, Rgba, RgbaImage};
use ndarray::Array2;
use std::path::{Path, PathBuf};

/// Load one frame as a grayscale array
///
/// Color images are converted to luma.
///
/// # Errors
///
/// Returns `ImageLoad` if the file cannot be decoded.
pub fn load_frame(path: &Path) -> Result<Array2<u8>> {
    let image = image::open(path)
        .map_err(|source| PatternError::ImageLoad {
            path: path.to_path_buf(),
            source,
        })?
        .to_luma8();

    let (width, height) = image.dimensions();
    Array2::from_shape_vec((height as usize, width as usize), image.into_raw())
        .map_err(|error| invalid_source(&format!("{}: {error}", path.display())))
}

fn to_gray_image(frame: &Array2<u8>) -> Result<GrayImage> {
    let (height, width) = frame.dim();
    GrayImage::from_raw(width as u32, height as u32, frame.iter().copied().collect())
        .ok_or_else(|| invalid_source(&format!("frame of size {height}x{width} has no image form")))
}

/// Write one frame as a grayscale PNG
///
/// # Errors
///
/// Returns `FileSystem` if the parent directory cannot be created and
/// `ImageExport` if encoding fails.
pub fn save_frame(frame: &Array2<u8>, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(file_system_error(parent, "create directory"))?;
    }

    to_gray_image(frame)?
        .save(path)
        .map_err(|source| PatternError::ImageExport {
            path: path.to_path_buf(),
            source,
        })
}

/// Lazy reader over the PNG frames of a directory in file name order
#[derive(Debug, Clone)]
pub struct FrameReader {
    paths: Vec<PathBuf>,
    position: usize,
    limit: usize,
}

impl FrameReader {
    /// List the frames of `dir`
    ///
    /// # Errors
    ///
    /// Returns `FileSystem` if the directory cannot be listed.
    pub fn open(dir: &Path) -> Result<Self> {
        let entries = std::fs::read_dir(dir).map_err(file_system_error(dir, "read directory"))?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry.map_err(file_system_error(dir, "read directory entry"))?.path();
            let is_png = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
            if path.is_file() && is_png {
                paths.push(path);
            }
        }
        paths.sort();

        tracing::debug!(dir = %dir.display(), frames = paths.len(), "frame directory opened");

        Ok(Self {
            limit: paths.len(),
            paths,
            position: 0,
        })
    }

    /// Read at most `max_frames` frames
    #[must_use]
    pub fn with_max_frames(mut self, max_frames: Option<usize>) -> Self {
        if let Some(max) = max_frames {
            self.limit = self.limit.min(max);
        }
        self
    }

    /// Number of frames that will be read in total
    pub const fn frame_count(&self) -> usize {
        self.limit
    }

    /// Paths of all frames in the directory
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Whether the directory holds no frame
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Read all remaining frames into memory
    ///
    /// # Errors
    ///
    /// Returns the first decoding error.
    pub fn read_all(self) -> Result<Vec<Array2<u8>>> {
        self.collect()
    }
}

impl Iterator for FrameReader {
    type Item = Result<Array2<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.limit {
            return None;
        }
        let path = self.paths.get(self.position)?;
        self.position += 1;
        Some(load_frame(path))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.limit.saturating_sub(self.position);
        (remaining, Some(remaining))
    }
}

/// Sequential writer of numbered PNG frames
#[derive(Debug)]
pub struct FrameWriter {
    dir: PathBuf,
    written: usize,
}

impl FrameWriter {
    /// Prepare `dir` for output, creating it if needed
    ///
    /// # Errors
    ///
    /// Returns `FileSystem` if the directory cannot be created.
    pub fn create(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir).map_err(file_system_error(dir, "create directory"))?;
        Ok(Self {
            dir: dir.to_path_buf(),
            written: 0,
        })
    }

    /// Path of the `index`-th frame
    pub fn frame_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{FRAME_PREFIX}{index:06}.png"))
    }

    /// Write the next frame
    ///
    /// # Errors
    ///
    /// Returns `ImageExport` if encoding fails.
    pub fn write(&mut self, frame: &Array2<u8>) -> Result<PathBuf> {
        let path = self.frame_path(self.written);
        save_frame(frame, &path)?;
        self.written += 1;
        Ok(path)
    }

    /// Frames written so far
    pub const fn written(&self) -> usize {
        self.written
    }

    /// Output directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Write an animated GIF preview of a frame sequence
///
/// # Errors
///
/// Returns `InvalidSourceData` for an empty sequence, `FileSystem` if the file
/// cannot be created and `ImageExport` if encoding fails.
pub fn save_gif(frames: &[Array2<u8>], path: &Path, frame_delay_ms: u32) -> Result<()> {
    if frames.is_empty() {
        return Err(invalid_source(&"no frame to write into the preview"));
    }

    let mut encoded = Vec::with_capacity(frames.len());
    for frame in frames {
        let gray = to_gray_image(frame)?;
        let rgba = RgbaImage::from_fn(gray.width(), gray.height(), |x, y| {
            let Luma([value]) = *gray.get_pixel(x, y);
            Rgba([value, value, value, u8::MAX])
        });
        encoded.push(Frame::from_parts(
            rgba,
            0,
            0,
            Delay::from_numer_denom_ms(frame_delay_ms, 1),
        ));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(file_system_error(parent, "create directory"))?;
    }
    let file = std::fs::File::create(path).map_err(file_system_error(path, "create file"))?;

    let mut encoder = image::codecs::gif::GifEncoder::new(file);
    encoder
        .encode_frames(encoded)
        .map_err(|source| PatternError::ImageExport {
            path: path.to_path_buf(),
            source,
        })
}

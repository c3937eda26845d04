//! Frame sources for the command line: image directories and a synthetic sweep

use async_trait::async_trait;
use chaser_core::{Frame, SourceError};
use chaser_drive::FrameSource;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const IMAGE_EXTENSIONS: &[&str] = &["png", "pgm", "ppm", "pnm", "jpg", "jpeg", "bmp", "tif", "tiff"];

/// Decodes every image in a directory, in file name order
pub struct DirectorySource {
    pending: VecDeque<PathBuf>,
}

impl DirectorySource {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, SourceError> {
        let dir = dir.as_ref();
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && has_image_extension(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        debug!("Found {} image files in {}", paths.len(), dir.display());
        Ok(Self {
            pending: paths.into(),
        })
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[async_trait]
impl FrameSource for DirectorySource {
    async fn next_frame(&mut self) -> Option<Frame> {
        while let Some(path) = self.pending.pop_front() {
            let decoded = tokio::task::spawn_blocking(move || chaser_eye::frame_from_path(&path)).await;
            match decoded {
                Ok(Ok(frame)) => return Some(frame),
                Ok(Err(e)) => warn!("Skipping frame: {}", e),
                Err(e) => warn!("Frame decoder task failed: {}", e),
            }
        }
        None
    }
}

/// A bright ball moving left to right across a dark mono frame
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    width: usize,
    height: usize,
    total: usize,
    next: usize,
}

const BACKGROUND: u8 = 40;
const BALL: u8 = 255;

impl SyntheticSource {
    pub fn new(width: usize, height: usize, total: usize) -> Self {
        Self {
            width,
            height,
            total,
            next: 0,
        }
    }

    /// Ball center column for frame `index`
    fn ball_column(&self, index: usize) -> usize {
        if self.total <= 1 {
            return self.width / 2;
        }
        index * self.width.saturating_sub(1) / (self.total - 1)
    }

    /// Render frame `index` of the sweep
    pub fn render(&self, index: usize) -> Frame {
        let mut pixels = vec![BACKGROUND; self.width * self.height];
        let radius = (self.height.min(self.width) / 8).max(1) as isize;
        let cx = self.ball_column(index) as isize;
        let cy = (self.height / 2) as isize;

        for y in (cy - radius).max(0)..(cy + radius + 1).min(self.height as isize) {
            for x in (cx - radius).max(0)..(cx + radius + 1).min(self.width as isize) {
                let (dx, dy) = (x - cx, y - cy);
                if dx * dx + dy * dy <= radius * radius {
                    pixels[y as usize * self.width + x as usize] = BALL;
                }
            }
        }

        Frame::mono8(self.height, self.width, pixels)
    }
}

impl Iterator for SyntheticSource {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.next >= self.total {
            return None;
        }
        let frame = self.render(self.next);
        self.next += 1;
        Some(frame)
    }
}

#[async_trait]
impl FrameSource for SyntheticSource {
    async fn next_frame(&mut self) -> Option<Frame> {
        self.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chaser_core::{Command, PolicyThresholds};
    use chaser_drive::decide;

    #[test]
    fn test_synthetic_sweep_left_to_right() {
        let thresholds = PolicyThresholds::default();
        let commands: Vec<Command> = SyntheticSource::new(90, 30, 3)
            .map(|frame| decide(chaser_eye::locate(&frame, 255), frame.stride(), &thresholds))
            .collect();

        assert_eq!(
            commands,
            vec![
                Command::new(0.0, 0.5),
                Command::new(0.4, 0.0),
                Command::new(0.0, -0.5),
            ]
        );
    }

    #[test]
    fn test_synthetic_frames_are_well_formed() {
        let source = SyntheticSource::new(16, 4, 5);
        assert_eq!(source.count(), 5);
        assert!(SyntheticSource::new(16, 4, 5).all(|f| f.is_well_formed()));
    }

    #[tokio::test]
    async fn test_directory_source_sorted_and_skips_bad_files() {
        let dir = tempfile::tempdir().unwrap();

        let mut right = image::GrayImage::new(9, 1);
        right.put_pixel(7, 0, image::Luma([255]));
        right.put_pixel(8, 0, image::Luma([255]));
        right.save(dir.path().join("b.png")).unwrap();

        let mut left = image::GrayImage::new(9, 1);
        left.put_pixel(1, 0, image::Luma([255]));
        left.put_pixel(2, 0, image::Luma([255]));
        left.save(dir.path().join("a.png")).unwrap();

        std::fs::write(dir.path().join("c.png"), b"not an image").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        let mut source = DirectorySource::open(dir.path()).unwrap();
        assert_eq!(source.remaining(), 3);

        let first = source.next_frame().await.unwrap();
        assert_eq!(first.pixels()[1], 255);
        let second = source.next_frame().await.unwrap();
        assert_eq!(second.pixels()[7], 255);
        assert!(source.next_frame().await.is_none());
    }

    #[test]
    fn test_missing_directory() {
        assert!(matches!(
            DirectorySource::open("/no/such/frames"),
            Err(SourceError::Io(_))
        ));
    }
}

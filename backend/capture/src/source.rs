//! Frame sources.
//!
//! A [`FrameSource`] stands in for the camera device. It is acquired when a
//! scan starts and released when the scan stops.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};

use ticketscan_core::CaptureError;

use crate::frame::Frame;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

#[async_trait]
pub trait FrameSource: Send {
    fn name(&self) -> &str;

    /// Acquire the device. Failure means the scan never starts.
    async fn open(&mut self) -> Result<(), CaptureError>;

    /// Next frame, or `None` once the stream has ended.
    async fn next_frame(&mut self) -> Result<Option<Frame>, CaptureError>;

    /// Release the device.
    fn close(&mut self);
}

/// Replays still images from a directory in file-name order.
pub struct DirectorySource {
    dir: PathBuf,
    files: Vec<PathBuf>,
    cursor: usize,
    looped: bool,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            files: Vec::new(),
            cursor: 0,
            looped: false,
        }
    }

    /// Restart from the first image instead of ending the stream.
    pub fn looped(mut self, looped: bool) -> Self {
        self.looped = looped;
        self
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[async_trait]
impl FrameSource for DirectorySource {
    fn name(&self) -> &str {
        "directory"
    }

    async fn open(&mut self) -> Result<(), CaptureError> {
        let unavailable =
            |msg: String| CaptureError::CameraUnavailable(format!("{}: {msg}", self.dir.display()));

        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| unavailable(e.to_string()))?
        {
            let path = entry.path();
            if is_image(&path) {
                files.push(path);
            }
        }
        if files.is_empty() {
            return Err(unavailable("no images found".into()));
        }
        files.sort();

        info!(dir = %self.dir.display(), frames = files.len(), "Frame directory opened");
        self.files = files;
        self.cursor = 0;
        Ok(())
    }

    async fn next_frame(&mut self) -> Result<Option<Frame>, CaptureError> {
        if self.cursor >= self.files.len() {
            if !self.looped || self.files.is_empty() {
                return Ok(None);
            }
            self.cursor = 0;
        }
        let path = self.files[self.cursor].clone();
        self.cursor += 1;

        debug!(path = %path.display(), "Loading frame");
        tokio::task::spawn_blocking(move || Frame::open(&path))
            .await
            .map_err(|e| CaptureError::InvalidFrame(format!("frame decode task failed: {e}")))?
            .map(Some)
    }

    fn close(&mut self) {
        self.files.clear();
        self.cursor = 0;
    }
}

#[cfg(test)]
pub(crate) mod test_source {
    use std::collections::VecDeque;

    use super::*;

    /// In-memory source for driver tests.
    pub struct StaticSource {
        pub frames: VecDeque<Frame>,
        /// Keep yielding the last frame once the queue is drained.
        pub repeat_last: bool,
        pub fail_open: bool,
        last: Option<Frame>,
    }

    impl StaticSource {
        pub fn new(frames: Vec<Frame>, repeat_last: bool) -> Self {
            Self {
                frames: frames.into(),
                repeat_last,
                fail_open: false,
                last: None,
            }
        }

        pub fn broken() -> Self {
            Self {
                fail_open: true,
                ..Self::new(Vec::new(), false)
            }
        }
    }

    #[async_trait]
    impl FrameSource for StaticSource {
        fn name(&self) -> &str {
            "static"
        }

        async fn open(&mut self) -> Result<(), CaptureError> {
            if self.fail_open {
                return Err(CaptureError::CameraUnavailable("permission denied".into()));
            }
            Ok(())
        }

        async fn next_frame(&mut self) -> Result<Option<Frame>, CaptureError> {
            match self.frames.pop_front() {
                Some(frame) => {
                    self.last = Some(frame.clone());
                    Ok(Some(frame))
                }
                None if self.repeat_last => Ok(self.last.clone()),
                None => Ok(None),
            }
        }

        fn close(&mut self) {
            self.frames.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::test_frames::solid;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ticketscan-{tag}-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn missing_directory_is_camera_unavailable() {
        let mut source = DirectorySource::new("/definitely/not/here");
        let err = source.open().await.unwrap_err();
        assert!(matches!(err, CaptureError::CameraUnavailable(_)));
    }

    #[tokio::test]
    async fn directory_without_images_is_camera_unavailable() {
        let dir = temp_dir("empty");
        std::fs::write(dir.join("notes.txt"), "hello").unwrap();
        let err = DirectorySource::new(&dir).open().await.unwrap_err();
        assert!(matches!(err, CaptureError::CameraUnavailable(_)));
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[tokio::test]
    async fn replays_images_in_name_order() {
        let dir = temp_dir("replay");
        std::fs::write(dir.join("b.png"), solid(10).encode_png().unwrap()).unwrap();
        std::fs::write(dir.join("a.png"), solid(250).encode_png().unwrap()).unwrap();

        let mut source = DirectorySource::new(&dir);
        source.open().await.unwrap();
        assert_eq!(source.len(), 2);

        let first = source.next_frame().await.unwrap().unwrap();
        assert_eq!(first.data()[0], 250);
        let second = source.next_frame().await.unwrap().unwrap();
        assert_eq!(second.data()[0], 10);
        assert!(source.next_frame().await.unwrap().is_none());

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[tokio::test]
    async fn looped_source_restarts() {
        let dir = temp_dir("loop");
        std::fs::write(dir.join("only.png"), solid(128).encode_png().unwrap()).unwrap();

        let mut source = DirectorySource::new(&dir).looped(true);
        source.open().await.unwrap();
        for _ in 0..3 {
            assert!(source.next_frame().await.unwrap().is_some());
        }
        std::fs::remove_dir_all(dir).unwrap();
    }
}

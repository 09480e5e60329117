//! Video codec collaborator.
//!
//! The dispatcher only needs two operations from a codec: split a container
//! into ordered still frames and put processed frames back into a container.
//! Frames travel as PNG so the hop through workers is lossless; only the
//! final container encode is lossy.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::probe::probe_video;

/// File name pattern for extracted and reassembled frames.
const FRAME_PATTERN: &str = "frame_%06d.png";
const FRAME_PREFIX: &str = "frame_";

/// Playback parameters captured at decode time and reused for encode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoFormat {
    pub fps: f64,
    pub width: u32,
    pub height: u32,
}

/// A video split into ordered PNG frames.
#[derive(Debug, Clone)]
pub struct DecodedVideo {
    /// PNG-encoded frames in display order
    pub frames: Vec<Vec<u8>>,
    pub format: VideoFormat,
}

impl DecodedVideo {
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

/// Splits containers into frames and reassembles them.
#[async_trait]
pub trait VideoCodec: Send + Sync {
    /// Decode a container into ordered PNG frames.
    async fn decode(&self, video: &[u8]) -> MediaResult<DecodedVideo>;

    /// Encode PNG frames, in the given order, into a container.
    async fn encode(&self, frames: &[Vec<u8>], format: &VideoFormat) -> MediaResult<Vec<u8>>;
}

/// `VideoCodec` backed by the `ffmpeg` and `ffprobe` binaries.
#[derive(Debug, Clone)]
pub struct FfmpegCodec {
    /// Parent directory for per-call scratch directories
    work_dir: Option<PathBuf>,
    /// Video codec used for the output container
    output_codec: String,
    timeout: Duration,
}

impl Default for FfmpegCodec {
    fn default() -> Self {
        Self {
            work_dir: None,
            output_codec: "mpeg4".to_string(),
            timeout: Duration::from_secs(600),
        }
    }
}

impl FfmpegCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place scratch directories under `dir` instead of the system temp dir.
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(dir.into());
        self
    }

    pub fn with_output_codec(mut self, codec: impl Into<String>) -> Self {
        self.output_codec = codec.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn scratch_dir(&self) -> MediaResult<tempfile::TempDir> {
        let dir = match &self.work_dir {
            Some(parent) => {
                std::fs::create_dir_all(parent)?;
                tempfile::Builder::new().prefix("vcluster-").tempdir_in(parent)?
            }
            None => tempfile::Builder::new().prefix("vcluster-").tempdir()?,
        };
        Ok(dir)
    }

    fn runner(&self) -> FfmpegRunner {
        FfmpegRunner::new().with_timeout(self.timeout)
    }
}

#[async_trait]
impl VideoCodec for FfmpegCodec {
    async fn decode(&self, video: &[u8]) -> MediaResult<DecodedVideo> {
        if video.is_empty() {
            return Err(MediaError::invalid_video("empty upload"));
        }

        let scratch = self.scratch_dir()?;
        let input = scratch.path().join("input.bin");
        tokio::fs::write(&input, video).await?;

        let info = probe_video(&input).await?;

        let frames_dir = scratch.path().join("frames");
        tokio::fs::create_dir_all(&frames_dir).await?;

        let cmd = FfmpegCommand::new(&input, frames_dir.join(FRAME_PATTERN))
            .passthrough_frames()
            .video_codec("png");
        self.runner().run(&cmd).await?;

        let frames = read_frames(&frames_dir).await?;
        if frames.is_empty() {
            return Err(MediaError::invalid_video("no frames could be decoded"));
        }

        info!(
            frames = frames.len(),
            width = info.width,
            height = info.height,
            fps = info.fps,
            "Decoded video"
        );

        Ok(DecodedVideo {
            frames,
            format: VideoFormat {
                fps: info.fps,
                width: info.width,
                height: info.height,
            },
        })
    }

    async fn encode(&self, frames: &[Vec<u8>], format: &VideoFormat) -> MediaResult<Vec<u8>> {
        if frames.is_empty() {
            return Err(MediaError::invalid_video("no frames to encode"));
        }

        let scratch = self.scratch_dir()?;
        let frames_dir = scratch.path().join("frames");
        tokio::fs::create_dir_all(&frames_dir).await?;

        // ffmpeg's %06d sequence numbering starts at 1
        for (i, frame) in frames.iter().enumerate() {
            let path = frames_dir.join(format!("{}{:06}.png", FRAME_PREFIX, i + 1));
            tokio::fs::write(path, frame).await?;
        }

        // yuv420p subsamples chroma 2x2, so the output size must be even
        let output = scratch.path().join("output.mp4");
        let cmd = FfmpegCommand::new(frames_dir.join(FRAME_PATTERN), &output)
            .input_frame_rate(format.fps)
            .size(round_up_even(format.width), round_up_even(format.height))
            .video_codec(self.output_codec.clone())
            .output_args(["-q:v", "2"])
            .pixel_format("yuv420p");
        self.runner().run(&cmd).await?;

        let bytes = tokio::fs::read(&output).await?;
        debug!(frames = frames.len(), bytes = bytes.len(), "Encoded video");
        Ok(bytes)
    }
}

fn round_up_even(n: u32) -> u32 {
    n.saturating_add(n % 2)
}

/// Read `frame_NNNNNN.png` files from a directory in sequence order.
async fn read_frames(dir: &Path) -> MediaResult<Vec<Vec<u8>>> {
    let mut names = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with(FRAME_PREFIX) && name.ends_with(".png") {
            names.push(name);
        }
    }
    // Zero-padded sequence numbers sort lexicographically
    names.sort();

    let mut frames = Vec::with_capacity(names.len());
    for name in names {
        frames.push(tokio::fs::read(dir.join(name)).await?);
    }
    Ok(frames)
}

//! Video codec and per-frame filters for the frame cluster.
//!
//! This crate provides:
//! - The `VideoCodec` collaborator the dispatcher uses to split a video into
//!   frames and reassemble processed frames
//! - An FFmpeg CLI implementation of it (`FfmpegCodec`)
//! - The image filters behind each `FrameTransform`

pub mod codec;
pub mod command;
pub mod error;
pub mod filters;
pub mod probe;

pub use codec::{DecodedVideo, FfmpegCodec, VideoCodec, VideoFormat};
pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use filters::{apply_transform, decode_image, encode_png, transform_png};
pub use probe::{probe_video, VideoInfo};

//! Shared fixtures for broker tests.
#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use image::{DynamicImage, Rgb, RgbImage};
use serde_json::json;
use vcluster_broker::{Dispatcher, DispatcherConfig, InMemoryJobStore};
use vcluster_client::RegistryClient;
use vcluster_media::{
    decode_image, encode_png, DecodedVideo, MediaError, MediaResult, VideoCodec, VideoFormat,
};
use vcluster_models::{FrameTask, Job, JobId};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Codec where every input byte is one frame and encoding concatenates frames.
///
/// With echoing workers the artifact equals the input, so any reordering
/// shows up as a byte mismatch.
pub struct ByteCodec;

#[async_trait]
impl VideoCodec for ByteCodec {
    async fn decode(&self, video: &[u8]) -> MediaResult<DecodedVideo> {
        if video.is_empty() {
            return Err(MediaError::invalid_video("empty upload"));
        }
        Ok(DecodedVideo {
            frames: video.iter().map(|b| vec![*b]).collect(),
            format: VideoFormat {
                fps: 24.0,
                width: 1,
                height: 1,
            },
        })
    }

    async fn encode(&self, frames: &[Vec<u8>], _format: &VideoFormat) -> MediaResult<Vec<u8>> {
        Ok(frames.concat())
    }
}

/// Codec turning every input byte into a 1x1 grey PNG and back.
///
/// Used against real workers, which need decodable images.
pub struct PixelCodec;

#[async_trait]
impl VideoCodec for PixelCodec {
    async fn decode(&self, video: &[u8]) -> MediaResult<DecodedVideo> {
        let frames = video
            .iter()
            .map(|&b| encode_png(&DynamicImage::ImageRgb8(RgbImage::from_pixel(1, 1, Rgb([b, b, b])))))
            .collect::<MediaResult<Vec<_>>>()?;
        Ok(DecodedVideo {
            frames,
            format: VideoFormat {
                fps: 24.0,
                width: 1,
                height: 1,
            },
        })
    }

    async fn encode(&self, frames: &[Vec<u8>], _format: &VideoFormat) -> MediaResult<Vec<u8>> {
        frames
            .iter()
            .map(|png| Ok(decode_image(png)?.to_rgb8().get_pixel(0, 0)[0]))
            .collect()
    }
}

pub fn test_config(output_dir: &Path) -> DispatcherConfig {
    DispatcherConfig {
        output_dir: output_dir.to_path_buf(),
        max_batch: 10,
        health_timeout: Duration::from_millis(500),
        frame_timeout: Duration::from_secs(5),
        job_timeout: Some(Duration::from_secs(30)),
    }
}

pub fn dispatcher_with(
    config: DispatcherConfig,
    registry_url: &str,
    codec: Arc<dyn VideoCodec>,
) -> Dispatcher {
    Dispatcher::new(
        config,
        codec,
        RegistryClient::new(registry_url),
        Arc::new(InMemoryJobStore::new()),
    )
}

pub fn byte_dispatcher(registry_url: &str, output_dir: &Path) -> Dispatcher {
    dispatcher_with(test_config(output_dir), registry_url, Arc::new(ByteCodec))
}

/// Echo worker response; frames listed in `failing` get a 500.
///
/// Responses are delayed by an amount that decreases with the frame index
/// inside each group of seven, so results complete out of order.
fn respond(failing: Vec<u32>, base_delay: Duration) -> impl Fn(&Request) -> ResponseTemplate {
    move |req: &Request| {
        let Ok(task) = serde_json::from_slice::<FrameTask>(&req.body) else {
            return ResponseTemplate::new(400);
        };
        if failing.contains(&task.frame_index) {
            return ResponseTemplate::new(500);
        }
        let shuffle = Duration::from_millis(u64::from(7 - task.frame_index % 7) * 5);
        ResponseTemplate::new(200)
            .set_body_json(task.respond(task.image.clone()))
            .set_delay(base_delay + shuffle)
    }
}

async fn mount_health(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({"status": "ok"})))
        .mount(server)
        .await;
}

/// Healthy worker echoing every frame.
pub async fn echo_worker() -> MockServer {
    worker_failing_on(Vec::new()).await
}

/// Healthy worker that returns 500 for the given frame indices.
pub async fn worker_failing_on(failing: Vec<u32>) -> MockServer {
    let server = MockServer::start().await;
    mount_health(&server, 200).await;
    Mock::given(method("POST"))
        .and(path("/process-frame"))
        .respond_with(respond(failing, Duration::ZERO))
        .mount(&server)
        .await;
    server
}

/// Healthy worker that takes `delay` per frame.
pub async fn slow_worker(delay: Duration) -> MockServer {
    let server = MockServer::start().await;
    mount_health(&server, 200).await;
    Mock::given(method("POST"))
        .and(path("/process-frame"))
        .respond_with(respond(Vec::new(), delay))
        .mount(&server)
        .await;
    server
}

/// Healthy worker whose frame calls always fail.
pub async fn failing_worker() -> MockServer {
    let server = MockServer::start().await;
    mount_health(&server, 200).await;
    Mock::given(method("POST"))
        .and(path("/process-frame"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    server
}

/// Worker failing its health probe. It must never be sent a frame.
pub async fn unhealthy_worker() -> MockServer {
    let server = MockServer::start().await;
    mount_health(&server, 503).await;
    Mock::given(method("POST"))
        .and(path("/process-frame"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    server
}

/// Registry listing the given endpoints as `node-0`, `node-1`, ...
pub async fn registry_with(endpoints: &[String]) -> MockServer {
    let nodes: Vec<_> = endpoints
        .iter()
        .enumerate()
        .map(|(i, endpoint)| json!({"id": format!("node-{}", i), "endpoint": endpoint}))
        .collect();

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/nodes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"nodes": nodes})))
        .mount(&server)
        .await;
    server
}

/// Sorted frame indices a worker was asked to process.
pub async fn received_frames(server: &MockServer) -> Vec<u32> {
    let mut frames: Vec<u32> = server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|req| req.url.path() == "/process-frame")
        .filter_map(|req| serde_json::from_slice::<FrameTask>(&req.body).ok())
        .map(|task| task.frame_index)
        .collect();
    frames.sort_unstable();
    frames
}

/// Poll until the job leaves `Processing`.
pub async fn wait_for_terminal(dispatcher: &Dispatcher, id: &JobId) -> Job {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(20);
    loop {
        let job = dispatcher.job(id).await.expect("job exists");
        if job.is_terminal() {
            return job;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "job {} did not finish",
            id
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

/// Number of files in a directory (0 if it does not exist).
pub fn file_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

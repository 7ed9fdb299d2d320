//! Camera container: the current video stream descriptor.

use aerolink_types::VideoStreamInfo;

use crate::field::{Latest, LatestWriter, field};

pub fn camera() -> (Camera, CameraWriter) {
    let (video_stream_info, video_stream_info_writer) = field();
    (
        Camera { video_stream_info },
        CameraWriter {
            video_stream_info: video_stream_info_writer,
        },
    )
}

#[derive(Debug, Clone)]
pub struct Camera {
    video_stream_info: Latest<VideoStreamInfo>,
}

impl Camera {
    pub fn video_stream_info(&self) -> &Latest<VideoStreamInfo> {
        &self.video_stream_info
    }
}

#[derive(Debug, Clone)]
pub struct CameraWriter {
    pub video_stream_info: LatestWriter<VideoStreamInfo>,
}

impl CameraWriter {
    pub fn reset(&self) {
        self.video_stream_info.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_uri_wins() {
        let (camera, writer) = camera();
        writer
            .video_stream_info
            .set(VideoStreamInfo::new("rtsp://10.41.1.1:8554/live"));
        writer
            .video_stream_info
            .set(VideoStreamInfo::new("rtsp://10.41.1.1:8554/thermal"));

        let info = camera.video_stream_info().get().unwrap();
        assert_eq!(info.uri, "rtsp://10.41.1.1:8554/thermal");

        writer.reset();
        assert!(camera.video_stream_info().get().is_none());
    }
}

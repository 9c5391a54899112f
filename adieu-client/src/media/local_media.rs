use crate::error::ClientError;
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8};
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

/// The local camera and microphone feed for one call.
///
/// Tracks are shared with every remote session; the application keeps
/// writing samples into them for as long as the call lasts.
#[derive(Clone)]
pub struct LocalMedia {
    stream_id: String,
    tracks: Vec<Arc<TrackLocalStaticSample>>,
}

impl LocalMedia {
    pub fn new(stream_id: impl Into<String>, tracks: Vec<Arc<TrackLocalStaticSample>>) -> Self {
        Self {
            stream_id: stream_id.into(),
            tracks,
        }
    }

    pub fn stream_id(&self) -> &str {
        &self.stream_id
    }

    pub fn tracks(&self) -> &[Arc<TrackLocalStaticSample>] {
        &self.tracks
    }

    pub fn track_ids(&self) -> Vec<String> {
        self.tracks.iter().map(|t| t.id().to_owned()).collect()
    }
}

impl std::fmt::Debug for LocalMedia {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalMedia")
            .field("stream_id", &self.stream_id)
            .field("tracks", &self.track_ids())
            .finish()
    }
}

/// Grants access to local capture devices.
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Fails with [`ClientError::MediaUnavailable`] when capture is denied
    /// or no device exists.
    async fn acquire(&self) -> Result<LocalMedia, ClientError>;
}

/// Produces sample-fed Opus and VP8 tracks for the application to write
/// frames into.
#[derive(Debug, Clone, Copy)]
pub struct SampleMediaSource {
    pub audio: bool,
    pub video: bool,
}

impl Default for SampleMediaSource {
    fn default() -> Self {
        Self {
            audio: true,
            video: true,
        }
    }
}

#[async_trait]
impl MediaSource for SampleMediaSource {
    async fn acquire(&self) -> Result<LocalMedia, ClientError> {
        if !self.audio && !self.video {
            return Err(ClientError::MediaUnavailable(
                "no capture device enabled".to_owned(),
            ));
        }

        let stream_id = format!("adieu-{}", Uuid::new_v4());
        let mut tracks = Vec::new();

        if self.audio {
            tracks.push(Arc::new(TrackLocalStaticSample::new(
                RTCRtpCodecCapability {
                    mime_type: MIME_TYPE_OPUS.to_owned(),
                    ..Default::default()
                },
                "audio".to_owned(),
                stream_id.clone(),
            )));
        }
        if self.video {
            tracks.push(Arc::new(TrackLocalStaticSample::new(
                RTCRtpCodecCapability {
                    mime_type: MIME_TYPE_VP8.to_owned(),
                    ..Default::default()
                },
                "video".to_owned(),
                stream_id.clone(),
            )));
        }

        Ok(LocalMedia::new(stream_id, tracks))
    }
}

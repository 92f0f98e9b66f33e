//! Transcript retrieval.
//!
//! No video-platform client is wired in; transcripts are served from a
//! canned lecture text keyed by the extracted video id.

const MOCK_TRANSCRIPT: &str = "Welcome to this lecture on machine learning. \
    Supervised learning aims to predict labels for new data using labelled examples. \
    Unsupervised learning looks for structure in data without labels, for example by clustering. \
    Reinforcement learning trains an agent through rewards and penalties. \
    In the next session we will build a simple classifier and evaluate its accuracy.";

/// Minimum length of a plausible video id.
const MIN_VIDEO_ID_LEN: usize = 6;

/// Extract the video id from a watch URL (`v=<id>`) or short link
/// (`youtu.be/<id>`). Anything else is returned trimmed, as-is.
pub fn extract_video_id(url: &str) -> String {
    let url = url.trim();
    for marker in ["v=", "youtu.be/"] {
        if let Some(pos) = url.find(marker) {
            let id: String = url[pos + marker.len()..]
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
                .collect();
            if id.len() >= MIN_VIDEO_ID_LEN {
                return id;
            }
        }
    }
    url.to_string()
}

pub fn mock_transcript(video_id: &str) -> String {
    tracing::debug!("Serving mock transcript for video {}", video_id);
    MOCK_TRANSCRIPT.to_string()
}

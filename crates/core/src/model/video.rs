use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use url::Url;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum VideoUrlError {
    #[error(transparent)]
    Invalid(#[from] url::ParseError),

    #[error("video url has no host")]
    MissingHost,

    #[error("unsupported video host: {0}")]
    UnsupportedHost(String),

    #[error("url does not identify a video")]
    MissingVideoId,
}

//
// ─── VIDEO REFERENCE ───────────────────────────────────────────────────────────
//

/// Opaque identifier of an embeddable video, extracted from a lesson URL.
///
/// Accepts the watch-page form (`youtube.com/watch?v=ID`), the short form
/// (`youtu.be/ID`), and direct embed paths (`youtube.com/embed/ID`).
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoRef(String);

impl VideoRef {
    /// Extracts the video identifier from a lesson URL.
    ///
    /// # Errors
    ///
    /// Returns `VideoUrlError` when the URL cannot be parsed, points at a
    /// host that is not a known video host, or carries no video identifier.
    pub fn parse(raw: &str) -> Result<Self, VideoUrlError> {
        let url = Url::parse(raw.trim())?;
        let host = url.host_str().ok_or(VideoUrlError::MissingHost)?;
        let host = host.strip_prefix("www.").unwrap_or(host);

        let id = match host {
            "youtu.be" => first_path_segment(&url),
            "youtube.com" | "m.youtube.com" => {
                if url.path() == "/watch" {
                    url.query_pairs()
                        .find(|(key, _)| key == "v")
                        .map(|(_, value)| value.into_owned())
                } else {
                    // /embed/ID and /shorts/ID keep the id as the last segment.
                    last_path_segment(&url)
                }
            }
            other => return Err(VideoUrlError::UnsupportedHost(other.to_owned())),
        };

        match id {
            Some(id) if !id.is_empty() => Ok(Self(id)),
            _ => Err(VideoUrlError::MissingVideoId),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// URL understood by the embedded player.
    #[must_use]
    pub fn embed_url(&self) -> String {
        format!("https://www.youtube.com/embed/{}", self.0)
    }
}

fn first_path_segment(url: &Url) -> Option<String> {
    url.path_segments()
        .and_then(|mut segments| segments.find(|segment| !segment.is_empty()))
        .map(str::to_owned)
}

fn last_path_segment(url: &Url) -> Option<String> {
    url.path_segments()
        .and_then(|segments| segments.rev().find(|segment| !segment.is_empty()))
        .map(str::to_owned)
}

impl fmt::Debug for VideoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VideoRef({})", self.0)
    }
}

impl fmt::Display for VideoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

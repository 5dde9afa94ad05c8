//! Video source classification.
//!
//! A locator is either a deep link into a remote embedded player (YouTube)
//! or a directly addressable media location (upload blob, file, plain URL).

use std::fmt;

use crate::core::deeplink;
use crate::core::time::Time;

const REMOTE_HOSTS: [&str; 5] = [
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "music.youtube.com",
    "www.youtube-nocookie.com",
];
const SHORT_HOST: &str = "youtu.be";
const LOCAL_SCHEMES: [&str; 5] = ["http", "https", "blob", "file", "data"];

/// Error type for source classification
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("No source given")]
    Empty,
    #[error("Unrecognized source: {0}")]
    Unrecognized(String),
}

/// Which backend family can play a source
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Directly addressable media element
    Local,
    /// Sandboxed embedded player, addressed by video id
    Remote { video_id: String },
}

impl SourceKind {
    pub fn is_remote(&self) -> bool {
        matches!(self, SourceKind::Remote { .. })
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Local => write!(f, "local"),
            SourceKind::Remote { video_id } => write!(f, "remote({video_id})"),
        }
    }
}

/// A user-supplied video source. Immutable once classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoSource {
    locator: String,
    kind: SourceKind,
    embedded_start: Time,
}

impl VideoSource {
    /// Classify a locator and extract its embedded start time.
    pub fn classify(locator: &str) -> Result<Self, SourceError> {
        let locator = locator.trim();
        if locator.is_empty() {
            return Err(SourceError::Empty);
        }

        let kind = if let Some(video_id) = remote_video_id(locator) {
            SourceKind::Remote { video_id }
        } else if is_direct_locator(locator) {
            SourceKind::Local
        } else {
            return Err(SourceError::Unrecognized(locator.to_string()));
        };

        Ok(Self {
            locator: locator.to_string(),
            embedded_start: deeplink::embedded_start_time(locator),
            kind,
        })
    }

    pub fn locator(&self) -> &str {
        &self.locator
    }

    pub fn kind(&self) -> &SourceKind {
        &self.kind
    }

    pub fn embedded_start(&self) -> Time {
        self.embedded_start
    }

    /// Initial position for a backend given an explicitly requested start.
    pub fn start_position(&self, requested: Time) -> Time {
        self.embedded_start.max(crate::core::time::clamp_non_negative(requested))
    }
}

/// Extract the remote video id from watch, embed, shorts and short-host links.
fn remote_video_id(locator: &str) -> Option<String> {
    let url = deeplink::parse_locator(locator)?;
    let host = url.host_str()?.to_ascii_lowercase();
    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());

    let id = if host == SHORT_HOST {
        segments.next()?.to_string()
    } else if REMOTE_HOSTS.contains(&host.as_str()) {
        match segments.next()? {
            "watch" => url
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned())?,
            "embed" | "shorts" | "live" => segments.next()?.to_string(),
            _ => return None,
        }
    } else {
        return None;
    };

    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    valid.then_some(id)
}

fn is_direct_locator(locator: &str) -> bool {
    if let Some((scheme, rest)) = locator.split_once(':') {
        let scheme = scheme.to_ascii_lowercase();
        if LOCAL_SCHEMES.contains(&scheme.as_str()) {
            return !rest.is_empty();
        }
        // Windows drive letter, e.g. C:\clips\a.mp4
        if scheme.len() == 1 && scheme.chars().all(|c| c.is_ascii_alphabetic()) {
            return true;
        }
    }
    locator.contains('/') || locator.contains('\\')
}

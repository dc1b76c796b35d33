use serde::{Deserialize, Serialize};

/// Host every eligible pin image is served from.
pub const IMAGE_HOST_MARKER: &str = "i.pinimg.com";
/// Avatar-sized thumbnails, never a pin.
pub const TINY_THUMBNAIL_MARKER: &str = "75x75";
/// Profile pictures of board owners and commenters.
pub const PROFILE_PICTURE_MARKER: &str = "profile_display";
/// Resolution path segment for the full-size image.
pub const ORIGINALS_SEGMENT: &str = "/originals/";
/// Thumbnail path segments the CDN serves in board grids.
pub const THUMBNAIL_SEGMENTS: [&str; 3] = ["/236x/", "/474x/", "/564x/"];

/// Rules deciding which `<img>` sources are pins and how to reach their
/// full-resolution variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierRules {
    pub host_marker: String,
    pub excluded_markers: Vec<String>,
    pub thumbnail_segments: Vec<String>,
    pub originals_segment: String,
}

impl Default for ClassifierRules {
    fn default() -> Self {
        Self {
            host_marker: IMAGE_HOST_MARKER.to_string(),
            excluded_markers: vec![
                TINY_THUMBNAIL_MARKER.to_string(),
                PROFILE_PICTURE_MARKER.to_string(),
            ],
            thumbnail_segments: THUMBNAIL_SEGMENTS.iter().map(|s| s.to_string()).collect(),
            originals_segment: ORIGINALS_SEGMENT.to_string(),
        }
    }
}

impl ClassifierRules {
    pub fn is_eligible(&self, raw: &str) -> bool {
        !raw.is_empty()
            && raw.contains(self.host_marker.as_str())
            && !self
                .excluded_markers
                .iter()
                .any(|marker| raw.contains(marker.as_str()))
    }

    pub fn upgrade(&self, raw: &str) -> String {
        self.thumbnail_segments
            .iter()
            .fold(raw.to_string(), |acc, segment| {
                acc.replace(segment.as_str(), &self.originals_segment)
            })
    }

    /// Eligible sources come back upgraded; everything else is dropped.
    pub fn classify(&self, raw: &str) -> Option<String> {
        self.is_eligible(raw).then(|| self.upgrade(raw))
    }
}

/// `true` for non-empty sources on the image host that are neither tiny
/// thumbnails nor profile pictures.
pub fn is_eligible(raw: &str) -> bool {
    ClassifierRules::default().is_eligible(raw)
}

/// Rewrites thumbnail resolution segments to the originals segment.
///
/// Best effort: sources without a known segment are returned unchanged.
pub fn upgrade(raw: &str) -> String {
    ClassifierRules::default().upgrade(raw)
}

pub fn classify(raw: &str) -> Option<String> {
    ClassifierRules::default().classify(raw)
}

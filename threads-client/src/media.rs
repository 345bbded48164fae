use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MediaType {
    #[default]
    Text,
    Image,
    Video,
    Carousel,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Text => "TEXT",
            MediaType::Image => "IMAGE",
            MediaType::Video => "VIDEO",
            MediaType::Carousel => "CAROUSEL",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TEXT" => Ok(MediaType::Text),
            "IMAGE" => Ok(MediaType::Image),
            "VIDEO" => Ok(MediaType::Video),
            "CAROUSEL" => Ok(MediaType::Carousel),
            other => Err(format!("unknown media type: {}", other)),
        }
    }
}

/// The one media-specific parameter attached to a container request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MediaPayload {
    #[default]
    Text,
    Image(String),
    Video(String),
    CarouselItem,
}

impl MediaPayload {
    /// Picks the payload from loose arguments. Precedence: an IMAGE with a url,
    /// else a VIDEO with a url, else the carousel-item flag. Anything that loses
    /// is dropped.
    pub fn select(
        media_type: MediaType,
        image_url: Option<&str>,
        video_url: Option<&str>,
        is_carousel_item: bool,
    ) -> Self {
        match (media_type, image_url, video_url) {
            (MediaType::Image, Some(url), _) => MediaPayload::Image(url.to_string()),
            (MediaType::Video, _, Some(url)) => MediaPayload::Video(url.to_string()),
            _ if is_carousel_item => MediaPayload::CarouselItem,
            _ => MediaPayload::Text,
        }
    }

    pub fn query_param(&self) -> Option<(&'static str, String)> {
        match self {
            MediaPayload::Text => None,
            MediaPayload::Image(url) => Some(("image_url", url.clone())),
            MediaPayload::Video(url) => Some(("video_url", url.clone())),
            MediaPayload::CarouselItem => Some(("is_carousel_item", "true".to_string())),
        }
    }
}

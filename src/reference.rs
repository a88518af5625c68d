//! Playable references into the source recording.

use crate::error::{Result, VidseekError};
use url::Url;

/// Default embeddable player base.
pub const DEFAULT_EMBED_BASE: &str = "https://www.youtube.com/embed";

/// Extract the platform video id from a watch, short or embed URL.
///
/// Accepts `watch?v=<id>`, `youtu.be/<id>`, `/embed/<id>` and `/shorts/<id>`.
pub fn platform_video_id(video_url: &str) -> Result<String> {
    let invalid = || VidseekError::InvalidUrl(video_url.to_string());
    let url = Url::parse(video_url.trim()).map_err(|_| invalid())?;

    let from_query = url
        .query_pairs()
        .find(|(key, _)| key == "v")
        .map(|(_, value)| value.into_owned());

    let from_path = || {
        let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
        match (url.host_str(), segments.as_slice()) {
            (Some("youtu.be"), [id, ..]) => Some(id.to_string()),
            (_, ["embed" | "shorts" | "v" | "live", id, ..]) => Some(id.to_string()),
            _ => None,
        }
    };

    let id = from_query.or_else(from_path).ok_or_else(invalid)?;
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid {
        return Err(invalid());
    }
    Ok(id)
}

/// Embeddable URL starting playback at `start_seconds`.
pub fn embed_url(embed_base: &str, platform_id: &str, start_seconds: u32) -> String {
    format!(
        "{}/{}?start={}",
        embed_base.trim_end_matches('/'),
        platform_id,
        start_seconds
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_video_id_forms() {
        for url in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://www.youtube.com/watch?list=PL1&v=dQw4w9WgXcQ&t=42s",
            "https://youtu.be/dQw4w9WgXcQ?t=10",
            "https://www.youtube.com/embed/dQw4w9WgXcQ?start=0",
            "https://youtube.com/shorts/dQw4w9WgXcQ",
        ] {
            assert_eq!(platform_video_id(url).unwrap(), "dQw4w9WgXcQ", "{}", url);
        }
    }

    #[test]
    fn test_platform_video_id_rejects_unknown_forms() {
        for url in [
            "not a url",
            "https://www.youtube.com/",
            "https://www.youtube.com/watch?v=",
            "https://www.youtube.com/watch?v=bad%20id",
        ] {
            assert!(
                matches!(platform_video_id(url), Err(VidseekError::InvalidUrl(_))),
                "{}",
                url
            );
        }
    }

    #[test]
    fn test_embed_url() {
        assert_eq!(
            embed_url(DEFAULT_EMBED_BASE, "dQw4w9WgXcQ", 330),
            "https://www.youtube.com/embed/dQw4w9WgXcQ?start=330"
        );
        assert_eq!(
            embed_url("https://player.example/", "abc", 0),
            "https://player.example/abc?start=0"
        );
    }
}

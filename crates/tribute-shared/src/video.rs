//! YouTube link handling for the video gallery.

const ID_MARKERS: &[&str] = &["youtu.be/", "v/", "embed/", "watch?v=", "&v="];

const YOUTUBE_ID_LEN: usize = 11;

pub fn is_youtube_url(url: &str) -> bool {
    url.contains("youtube.com") || url.contains("youtu.be")
}

/// The 11-character video id of a YouTube link.
///
/// The id follows the last recognised marker (`watch?v=`, `youtu.be/`,
/// `embed/`, `v/`, `&v=`, or a `u/<char>/` channel-page segment) and runs
/// up to the next `#`, `&` or `?`.
pub fn youtube_id(url: &str) -> Option<&str> {
    if !is_youtube_url(url) {
        return None;
    }

    let start = ID_MARKERS
        .iter()
        .filter_map(|marker| url.rfind(marker).map(|pos| pos + marker.len()))
        .chain(channel_marker_end(url))
        .max()?;

    let rest = &url[start..];
    let end = rest.find(&['#', '&', '?'][..]).unwrap_or(rest.len());
    let id = &rest[..end];

    (id.len() == YOUTUBE_ID_LEN).then_some(id)
}

/// End of the last `u/X/` segment, `X` being one ASCII word character.
fn channel_marker_end(url: &str) -> Option<usize> {
    let bytes = url.as_bytes();
    url.match_indices("u/")
        .map(|(pos, _)| pos + 2)
        .filter(|&after| {
            bytes
                .get(after)
                .is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'_')
                && bytes.get(after + 1) == Some(&b'/')
        })
        .map(|after| after + 2)
        .last()
}

pub fn youtube_thumbnail_url(url: &str) -> Option<String> {
    youtube_id(url).map(|id| format!("https://img.youtube.com/vi/{id}/maxresdefault.jpg"))
}

pub fn youtube_embed_url(url: &str) -> Option<String> {
    youtube_id(url).map(|id| format!("https://www.youtube.com/embed/{id}?autoplay=1"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_ids_from_common_forms() {
        assert_eq!(
            youtube_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(youtube_id("https://youtu.be/L_jWHffIx5E?t=42"), Some("L_jWHffIx5E"));
        assert_eq!(
            youtube_id("https://www.youtube.com/embed/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            youtube_id("https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ#x"),
            Some("dQw4w9WgXcQ")
        );
    }

    #[test]
    fn extracts_ids_from_channel_page_links() {
        assert_eq!(
            youtube_id("https://www.youtube.com/user/kenangan#p/u/1/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            youtube_id("https://www.youtube.com/user/kenangan#p/u/a/L_jWHffIx5E?rel=0"),
            Some("L_jWHffIx5E")
        );
        assert_eq!(youtube_id("https://www.youtube.com/user/kenangan#p/u/12/dQw4w9WgXcQ"), None);
    }

    #[test]
    fn rejects_other_links() {
        assert_eq!(youtube_id("https://vimeo.com/12345678901"), None);
        assert_eq!(youtube_id("https://www.youtube.com/watch?v=short"), None);
        assert_eq!(youtube_id("https://www.youtube.com/"), None);
    }

    #[test]
    fn derived_urls() {
        let url = "https://youtu.be/dQw4w9WgXcQ";
        assert_eq!(
            youtube_thumbnail_url(url).as_deref(),
            Some("https://img.youtube.com/vi/dQw4w9WgXcQ/maxresdefault.jpg")
        );
        assert_eq!(
            youtube_embed_url(url).as_deref(),
            Some("https://www.youtube.com/embed/dQw4w9WgXcQ?autoplay=1")
        );
    }
}

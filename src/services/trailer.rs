use crate::models::Video;

const YOUTUBE_WATCH_URL: &str = "https://www.youtube.com/watch?v=";

fn is_youtube_trailer(video: &Video) -> bool {
    video.site == "YouTube" && matches!(video.video_type.as_str(), "Trailer" | "Teaser")
}

/// Picks the trailer to play from a movie's video list.
///
/// Only YouTube trailers and teasers qualify. An official one wins, otherwise the
/// first qualifying video in list order; `None` when nothing qualifies.
pub fn resolve_trailer(videos: &[Video]) -> Option<&Video> {
    videos
        .iter()
        .filter(|video| is_youtube_trailer(video))
        .find(|video| video.official == Some(true))
        .or_else(|| videos.iter().find(|video| is_youtube_trailer(video)))
}

pub fn youtube_url(video: &Video) -> String {
    format!("{}{}", YOUTUBE_WATCH_URL, video.key)
}

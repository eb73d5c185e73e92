use crate::api::client::ApiClient;
use crate::api::endpoints::fetch_currently_playing;
use crate::api::models::{CurrentlyPlayingResponse, Track};
use crate::errors::UpstreamApiError;
use crate::utils::duration::format_mmss;

/// A simplified view of the user's playback.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSnapshot {
    pub is_playing: bool,
    /// `"Artist, Artist - Track"`; absent when nothing (or no track) is playing.
    pub song: Option<String>,
    pub progress_ms: u64,
    pub duration_ms: u64,
}

impl PlaybackSnapshot {
    pub fn idle() -> Self {
        PlaybackSnapshot {
            is_playing: false,
            song: None,
            progress_ms: 0,
            duration_ms: 0,
        }
    }

    pub fn from_response(response: CurrentlyPlayingResponse) -> Self {
        let progress_ms = response.progress_ms.unwrap_or_default();
        let is_playing = response.is_playing.unwrap_or_default();
        match response.item {
            Some(track) => PlaybackSnapshot {
                is_playing,
                song: Some(song_label(&track)),
                progress_ms,
                duration_ms: track.duration_ms.unwrap_or_default(),
            },
            None => PlaybackSnapshot {
                is_playing,
                song: None,
                progress_ms,
                duration_ms: 0,
            },
        }
    }

    pub fn progress(&self) -> String {
        format_mmss(self.progress_ms)
    }

    pub fn duration(&self) -> String {
        format_mmss(self.duration_ms)
    }
}

fn song_label(track: &Track) -> String {
    let artists = track
        .artists
        .iter()
        .flatten()
        .map(|a| a.name.as_deref().unwrap_or_default())
        .collect::<Vec<_>>()
        .join(", ");
    format!("{} - {}", artists, track.name.as_deref().unwrap_or_default())
}

/// Fetches the current playback with `access_token` and shapes it.
pub async fn fetch_playback_snapshot(
    api_client: &ApiClient,
    access_token: &str,
) -> Result<PlaybackSnapshot, UpstreamApiError> {
    let snapshot = match fetch_currently_playing(api_client, access_token).await? {
        Some(response) => PlaybackSnapshot::from_response(response),
        None => PlaybackSnapshot::idle(),
    };

    tracing::debug!(is_playing = snapshot.is_playing, song = ?snapshot.song, "playback fetched");
    Ok(snapshot)
}

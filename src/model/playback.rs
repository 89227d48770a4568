//! Playback-related types: the authoritative snapshot, track metadata and the
//! status payload decoding.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer};
use tokio::time::Instant;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PlaybackState {
    Playing,
    Paused,
    #[default]
    Stopped,
}

impl PlaybackState {
    pub fn parse(state: &str) -> Self {
        match state.trim().to_ascii_lowercase().as_str() {
            "play" | "playing" => PlaybackState::Playing,
            "pause" | "paused" => PlaybackState::Paused,
            _ => PlaybackState::Stopped,
        }
    }
}

/// Last authoritative playback position. Replaced wholesale on each
/// successful poll, never mutated in place.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaybackSnapshot {
    pub state: PlaybackState,
    pub elapsed_seconds: f64,
    pub duration_seconds: f64,
    /// Arrival time of the response this snapshot came from.
    pub captured_at: Instant,
}

impl Default for PlaybackSnapshot {
    fn default() -> Self {
        Self {
            state: PlaybackState::Stopped,
            elapsed_seconds: 0.0,
            duration_seconds: 0.0,
            captured_at: Instant::now(),
        }
    }
}

impl PlaybackSnapshot {
    /// Build a snapshot, holding `0 <= elapsed <= duration` when a duration is known.
    pub fn new(state: PlaybackState, elapsed: f64, duration: f64, captured_at: Instant) -> Self {
        let duration_seconds = if duration.is_finite() { duration.max(0.0) } else { 0.0 };
        let mut elapsed_seconds = if elapsed.is_finite() { elapsed.max(0.0) } else { 0.0 };
        if duration_seconds > 0.0 {
            elapsed_seconds = elapsed_seconds.min(duration_seconds);
        }

        Self {
            state,
            elapsed_seconds,
            duration_seconds,
            captured_at,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Elapsed time extrapolated to `now`, never past the duration.
    /// Frozen at the captured value unless playing.
    pub fn interpolated_elapsed(&self, now: Instant) -> f64 {
        if !self.is_playing() {
            return self.elapsed_seconds;
        }
        let drift = now.saturating_duration_since(self.captured_at).as_secs_f64();
        let elapsed = self.elapsed_seconds + drift;
        if self.duration_seconds > 0.0 {
            elapsed.min(self.duration_seconds)
        } else {
            elapsed
        }
    }
}

/// Metadata about the current song
#[derive(Clone, Debug, PartialEq)]
pub struct TrackMetadata {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub file: String,
}

impl Default for TrackMetadata {
    fn default() -> Self {
        Self {
            title: "No track playing".to_string(),
            artist: String::new(),
            album: String::new(),
            file: String::new(),
        }
    }
}

/// Player settings reported alongside the position
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlaybackSettings {
    pub volume: Option<u8>,
    pub shuffle: bool,
    pub repeat: bool,
    pub bitrate: Option<u32>,
    pub audio_format: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioOutput {
    pub name: String,
    pub enabled: bool,
}

/// An output as listed by the audio settings endpoint. Toggling one takes
/// its numeric id, not its name.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct OutputDevice {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub enabled: bool,
}

/// Everything besides the position that a poll reports.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NowPlaying {
    pub track: TrackMetadata,
    pub settings: PlaybackSettings,
    pub outputs: Vec<AudioOutput>,
}

// ============================================================================
// Wire format
// ============================================================================

/// Accepts JSON numbers, numeric strings and booleans.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        serde_json::Value::Bool(b) => Some(if b { 1.0 } else { 0.0 }),
        _ => None,
    }))
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawStatus {
    #[serde(default)]
    state: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    elapsed: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    duration: Option<f64>,
    /// Legacy `"elapsed:duration"` form.
    #[serde(default)]
    time: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    volume: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    random: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    repeat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    bitrate: Option<f64>,
    #[serde(default, alias = "audio")]
    #[serde(rename = "audioFormat")]
    audio_format: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawSong {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    artist: Option<String>,
    #[serde(default)]
    album: Option<String>,
    #[serde(default)]
    file: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    duration: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawOutput {
    #[serde(default, rename = "outputEnabled", deserialize_with = "lenient_f64")]
    output_enabled: Option<f64>,
}

/// Decoded status query response.
#[derive(Debug, Default, Deserialize)]
pub struct StatusReport {
    #[serde(default)]
    pub(crate) ok: Option<bool>,
    #[serde(default)]
    pub(crate) error: Option<String>,
    #[serde(default)]
    status: RawStatus,
    #[serde(default, alias = "current")]
    song: RawSong,
    #[serde(default)]
    outputs: HashMap<String, RawOutput>,
}

impl StatusReport {
    fn legacy_time(&self) -> (Option<f64>, Option<f64>) {
        match self.status.time.as_deref().and_then(|t| t.split_once(':')) {
            Some((elapsed, duration)) => (elapsed.trim().parse().ok(), duration.trim().parse().ok()),
            None => (None, None),
        }
    }

    /// Split into the position snapshot (anchored at `captured_at`) and the rest.
    pub fn into_parts(self, captured_at: Instant) -> (PlaybackSnapshot, NowPlaying) {
        let state = self
            .status
            .state
            .as_deref()
            .map(PlaybackState::parse)
            .unwrap_or_default();

        let (legacy_elapsed, legacy_duration) = self.legacy_time();
        let snapshot = if state == PlaybackState::Stopped {
            PlaybackSnapshot::new(state, 0.0, 0.0, captured_at)
        } else {
            let elapsed = self.status.elapsed.or(legacy_elapsed).unwrap_or(0.0);
            let duration = self
                .status
                .duration
                .or(legacy_duration)
                .or(self.song.duration)
                .unwrap_or(0.0);
            PlaybackSnapshot::new(state, elapsed, duration, captured_at)
        };

        let file = self.song.file.unwrap_or_default();
        let track = if self.song.title.is_none() && file.is_empty() {
            TrackMetadata::default()
        } else {
            TrackMetadata {
                title: self
                    .song
                    .title
                    .unwrap_or_else(|| file.rsplit('/').next().unwrap_or(&file).to_string()),
                artist: self.song.artist.unwrap_or_default(),
                album: self.song.album.unwrap_or_default(),
                file,
            }
        };

        let settings = PlaybackSettings {
            volume: self
                .status
                .volume
                .filter(|v| *v >= 0.0)
                .map(|v| v.min(100.0) as u8),
            shuffle: self.status.random.is_some_and(|v| v != 0.0),
            repeat: self.status.repeat.is_some_and(|v| v != 0.0),
            bitrate: self.status.bitrate.map(|b| b.max(0.0) as u32),
            audio_format: self.status.audio_format,
        };

        let mut outputs: Vec<AudioOutput> = self
            .outputs
            .into_iter()
            .map(|(name, output)| AudioOutput {
                name,
                enabled: output.output_enabled.is_some_and(|v| v != 0.0),
            })
            .collect();
        outputs.sort_by(|a, b| a.name.cmp(&b.name));

        (
            snapshot,
            NowPlaying {
                track,
                settings,
                outputs,
            },
        )
    }
}

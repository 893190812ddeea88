// Per-page session context.
// Owns the mutable state one page keeps for the lifetime of a subtitle
// track: tracked video identity, loaded cues, player binding and display
// styles. Created on first activation, reset on navigation, torn down on
// drop.

use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{AppError, AppResult};
use crate::models::{StyleOverrides, SubtitleStyles};
use crate::services::playback::{DisplayState, PlayerEvent, PlayerLocator, Synchronizer};
use crate::services::subtitles::parse_srt;

/// Watch-page URL with a `v` query parameter carrying the video identity.
static WATCH_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://[^/]+/watch\?(?:[^#]*&)?v=([A-Za-z0-9_-]+)")
        .expect("Failed to compile watch URL pattern")
});

/// Extracts the video identity from a watch-page URL, if any.
pub fn video_id_from_url(url: &str) -> Option<String> {
    WATCH_URL
        .captures(url)
        .map(|caps| caps[1].to_string())
}

/// Outcome of applying style overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleApplication {
    Applied,
    /// No display surface exists yet; the merged styles take effect when one
    /// is created.
    Pending,
}

/// What became of subtitle content handed back by a resolution pass.
#[derive(Debug, PartialEq, Eq)]
pub enum ResolvedContent {
    Loaded(usize),
    /// The tracked video identity moved on while the resolution was in
    /// flight; the late result is dropped.
    Stale,
}

pub struct Session<L: PlayerLocator> {
    video_id: Option<String>,
    synchronizer: Synchronizer<L>,
    styles: SubtitleStyles,
    display_ready: bool,
}

impl<L: PlayerLocator> Session<L> {
    pub fn new(locator: L, styles: SubtitleStyles) -> Self {
        Self {
            video_id: None,
            synchronizer: Synchronizer::new(locator),
            styles,
            display_ready: false,
        }
    }

    pub fn video_id(&self) -> Option<&str> {
        self.video_id.as_deref()
    }

    pub fn styles(&self) -> &SubtitleStyles {
        &self.styles
    }

    /// Marks the display surface as created and returns the styles it should
    /// be initialized with.
    pub fn display_created(&mut self) -> &SubtitleStyles {
        self.display_ready = true;
        &self.styles
    }

    /// Tracks a navigation. Returns true when the identity changed to a new
    /// video, i.e. when the caller should trigger a resolution pass.
    pub fn on_navigation(&mut self, video_id: Option<&str>) -> bool {
        match video_id {
            Some(id) if self.video_id.as_deref() != Some(id) => {
                info!("Video changed to {}, resetting subtitle track", id);
                self.video_id = Some(id.to_string());
                self.synchronizer.clear();
                true
            }
            Some(_) => false,
            None => {
                if self.video_id.take().is_some() {
                    info!("No video present, resetting subtitle track");
                    self.synchronizer.clear();
                }
                false
            }
        }
    }

    /// Activates content resolved for `video_id`, unless the tracked
    /// identity has moved on since the resolution started. Resolution passes
    /// are never cancelled mid-flight, so a late result for a stale identity
    /// is discarded here.
    pub fn accept_resolved(&mut self, video_id: &str, raw: &str) -> AppResult<ResolvedContent> {
        if self.video_id.as_deref() != Some(video_id) {
            warn!(
                "Discarding stale subtitle content for {} (current video: {:?})",
                video_id, self.video_id
            );
            return Ok(ResolvedContent::Stale);
        }
        self.load_custom(raw).map(ResolvedContent::Loaded)
    }

    /// Parses and activates explicitly supplied subtitle content.
    pub fn load_custom(&mut self, raw: &str) -> AppResult<usize> {
        let cues = parse_srt(raw);
        if cues.is_empty() {
            return Err(AppError::SubtitleError(
                "Subtitle content was empty or invalid after parsing".to_string(),
            ));
        }
        let count = cues.len();
        self.synchronizer.load_cues(cues);
        Ok(count)
    }

    /// Merges partial style overrides into the live style state.
    pub fn apply_style_overrides(&mut self, overrides: &StyleOverrides) -> StyleApplication {
        self.styles.merge(overrides);
        if self.display_ready {
            StyleApplication::Applied
        } else {
            StyleApplication::Pending
        }
    }

    /// Forwards a player event to the synchronizer and returns the derived
    /// display state.
    pub fn handle_player_event(&mut self, event: PlayerEvent) -> DisplayState {
        self.synchronizer.handle_event(event)
    }
}

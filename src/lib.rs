//! Subtitle synchronization engine.
//!
//! Parses SRT content into timed cues, maps the current playback position to
//! the active cue on every player event, and resolves/publishes subtitle
//! files against an ordered list of configured GitHub repository profiles.
//! The UI layers (popup form, page injection) sit on the other side of the
//! message surface in [`commands`].

pub mod commands;
pub mod config;
pub mod errors;
pub mod models;
pub mod services;
pub mod session;
pub mod utils;

pub use config::{Settings, SettingsStore};
pub use errors::{AppError, AppResult};
pub use models::{
    AttemptRecord, Cue, Profile, PublishOutcome, ResolutionOutcome, ResolveError, StyleOverrides,
    SubtitleStyles,
};
pub use session::Session;

// Commands module
// The inbound message surface consumed by the UI layers (popup form, page
// script). Each function is one message handler; all state flows in through
// parameters.

use log::info;

use crate::config::Settings;
use crate::errors::{AppError, AppResult};
use crate::models::{
    AttemptRecord, PublishOutcome, ResolutionOutcome, ResolveError, StyleOverrides,
};
use crate::services::github::{GithubTransport, Publisher, Resolver};
use crate::services::playback::PlayerLocator;
use crate::session::{Session, StyleApplication};

/// Response to an auto-load request: the resolver outcome plus the
/// configuration states that prevent a pass from running at all.
#[derive(Debug)]
pub enum AutoLoadResponse {
    Loaded {
        content: String,
        source: String,
        attempts: Vec<AttemptRecord>,
    },
    NotFound {
        attempts: Vec<AttemptRecord>,
    },
    Disabled,
    NoProfilesConfigured,
    Failed {
        error: ResolveError,
        attempts: Vec<AttemptRecord>,
    },
}

/// Handles a subtitle auto-load request for a freshly tracked video.
pub async fn request_auto_load<T: GithubTransport>(
    settings: &Settings,
    transport: &T,
    video_id: &str,
) -> AutoLoadResponse {
    if !settings.auto_load_enabled {
        return AutoLoadResponse::Disabled;
    }
    if settings.profiles.is_empty() {
        return AutoLoadResponse::NoProfilesConfigured;
    }

    match Resolver::new(transport)
        .resolve(video_id, &settings.profiles)
        .await
    {
        ResolutionOutcome::Found {
            content,
            profile_name,
            attempts,
        } => {
            info!("Auto-load for {} succeeded via '{}'", video_id, profile_name);
            AutoLoadResponse::Loaded {
                content,
                source: format!("github ({})", profile_name),
                attempts,
            }
        }
        ResolutionOutcome::NotFound { attempts } => AutoLoadResponse::NotFound { attempts },
        ResolutionOutcome::Failed { error, attempts } => {
            AutoLoadResponse::Failed { error, attempts }
        }
    }
}

/// Parses and activates explicitly supplied subtitle content, e.g. from a
/// local file upload. Returns the number of cues loaded.
pub fn load_custom_srt<L: PlayerLocator>(session: &mut Session<L>, raw: &str) -> AppResult<usize> {
    session.load_custom(raw)
}

/// Merges partial style overrides into the session's live style state.
pub fn apply_subtitle_styles<L: PlayerLocator>(
    session: &mut Session<L>,
    overrides: &StyleOverrides,
) -> StyleApplication {
    session.apply_style_overrides(overrides)
}

/// Whether the active profile is usable for publishing: complete identity
/// plus a token.
pub fn check_token_status(settings: &Settings) -> bool {
    settings
        .active_profile()
        .map(|profile| profile.has_identity() && profile.token.is_some())
        .unwrap_or(false)
}

/// Handles an upload request against the active profile.
pub async fn upload_srt<T: GithubTransport>(
    settings: &Settings,
    transport: &T,
    file_name: &str,
    content: &str,
    video_id: &str,
) -> AppResult<PublishOutcome> {
    if settings.profiles.is_empty() {
        return Err(AppError::ConfigurationError(
            "No GitHub profiles are configured".to_string(),
        ));
    }
    let Some(active_name) = settings.active_profile_name.as_deref() else {
        return Err(AppError::ConfigurationError(
            "No active GitHub profile is selected".to_string(),
        ));
    };
    let Some(profile) = settings.active_profile() else {
        return Err(AppError::ConfigurationError(format!(
            "Active profile '{}' was not found",
            active_name
        )));
    };

    Publisher::new(transport)
        .publish(video_id, file_name, content, profile)
        .await
}

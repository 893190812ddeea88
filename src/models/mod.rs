// Domain models module
// Core data structures shared across the engine

use serde::{Deserialize, Serialize};

/// One timed subtitle entry. Immutable once produced by the parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    /// Start of the display window, in seconds.
    pub start_time: f64,
    /// End of the display window, in seconds. Never precedes `start_time`.
    pub end_time: f64,
    /// Plain text, internal line breaks preserved.
    pub text: String,
}

impl Cue {
    pub fn new(start_time: f64, end_time: f64, text: String) -> Self {
        Self {
            start_time,
            end_time,
            text,
        }
    }

    /// Whether this cue's display window covers `time`.
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start_time && time <= self.end_time
    }
}

/// A named remote repository location plus optional credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Unique key among the configured profiles.
    pub name: String,
    pub user: String,
    pub repo: String,
    #[serde(default)]
    pub branch: String,
    /// Optional directory prefix inside the repository.
    #[serde(default)]
    pub path: String,
    /// Personal access token for private repositories and publishing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Profile {
    /// A profile is eligible for lookup when its repository identity is
    /// complete.
    pub fn has_identity(&self) -> bool {
        !self.user.is_empty() && !self.repo.is_empty()
    }

    /// Configured branch, falling back to "main".
    pub fn effective_branch(&self) -> &str {
        if self.branch.is_empty() {
            "main"
        } else {
            &self.branch
        }
    }
}

/// Presentation parameters of the subtitle display surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubtitleStyles {
    pub font_size: String,
    pub color: String,
    pub background_color: String,
    pub bottom: String,
}

impl Default for SubtitleStyles {
    fn default() -> Self {
        Self {
            font_size: "2.0em".to_string(),
            color: "#FFFFFF".to_string(),
            background_color: "rgba(8, 8, 8, 0.75)".to_string(),
            bottom: "60px".to_string(),
        }
    }
}

/// Partial style update; unset fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleOverrides {
    pub font_size: Option<String>,
    pub color: Option<String>,
    pub background_color: Option<String>,
    pub bottom: Option<String>,
}

impl SubtitleStyles {
    /// Merges `overrides` into the live style state, field by field.
    pub fn merge(&mut self, overrides: &StyleOverrides) {
        if let Some(font_size) = &overrides.font_size {
            self.font_size = font_size.clone();
        }
        if let Some(color) = &overrides.color {
            self.color = color.clone();
        }
        if let Some(background_color) = &overrides.background_color {
            self.background_color = background_color.clone();
        }
        if let Some(bottom) = &overrides.bottom {
            self.bottom = bottom.clone();
        }
    }
}

/// Outcome of one request during a resolution pass, kept for diagnostics and
/// discarded after the pass completes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttemptRecord {
    pub profile_name: String,
    pub request_url: String,
    pub status: AttemptStatus,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AttemptStatus {
    Http(u16),
    NetworkError,
}

/// The sticky non-benign failure retained across a resolution pass. A 404 is
/// expected (the next profile is simply tried) and never becomes one of
/// these.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveError {
    Unauthorized { message: String },
    Forbidden { message: String },
    Http { status: u16, message: String },
    Network { message: String },
}

impl ResolveError {
    pub fn message(&self) -> &str {
        match self {
            ResolveError::Unauthorized { message }
            | ResolveError::Forbidden { message }
            | ResolveError::Http { message, .. }
            | ResolveError::Network { message } => message,
        }
    }
}

impl From<ResolveError> for crate::errors::AppError {
    fn from(error: ResolveError) -> Self {
        use crate::errors::AppError;
        match error {
            ResolveError::Unauthorized { message } => AppError::AuthenticationError(message),
            ResolveError::Forbidden { message } => AppError::PermissionError(message),
            ResolveError::Http { status, message } => AppError::HttpError { status, message },
            ResolveError::Network { message } => AppError::NetworkError(message),
        }
    }
}

/// Result of one full resolution pass over the configured profiles.
#[derive(Debug)]
pub enum ResolutionOutcome {
    /// The first profile that had the file wins; remaining profiles are
    /// never contacted.
    Found {
        content: String,
        profile_name: String,
        attempts: Vec<AttemptRecord>,
    },
    /// Every eligible profile was tried and none had the file.
    NotFound { attempts: Vec<AttemptRecord> },
    /// At least one profile failed in a way more specific than absence; the
    /// most recent such failure is surfaced.
    Failed {
        error: ResolveError,
        attempts: Vec<AttemptRecord>,
    },
}

/// Successful publish result. Failures are reported through `AppError`.
#[derive(Debug, Clone, PartialEq)]
pub enum PublishOutcome {
    Created {
        file_name: String,
        url: Option<String>,
    },
    /// An existing file was overwritten with its version token attached.
    Updated {
        file_name: String,
        url: Option<String>,
    },
}

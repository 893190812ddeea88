// Remote publisher.
// Creates or updates a subtitle file in a profile's repository through the
// contents API.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use log::info;
use serde_json::{Value, json};

use crate::errors::{AppError, AppResult};
use crate::models::{Profile, PublishOutcome};

use super::transport::GithubTransport;
use super::{contents_url, subtitle_path};

/// Probe result for the target path before writing.
enum Existence {
    Absent,
    /// Present, with the version token the update payload must carry.
    Present { sha: String },
}

pub struct Publisher<'a, T: GithubTransport> {
    transport: &'a T,
}

impl<'a, T: GithubTransport> Publisher<'a, T> {
    pub fn new(transport: &'a T) -> Self {
        Self { transport }
    }

    /// Publishes `content` as `file_name` in the profile's repository.
    ///
    /// Overwrite policy: an existing file is updated in place by attaching
    /// its version token to the commit payload. A probe that proves
    /// existence without yielding a version token is a conflict, not a
    /// blind create.
    pub async fn publish(
        &self,
        video_id: &str,
        file_name: &str,
        content: &str,
        profile: &Profile,
    ) -> AppResult<PublishOutcome> {
        if !profile.has_identity() {
            return Err(AppError::ConfigurationError(format!(
                "Profile '{}' is missing the user or repository name",
                profile.name
            )));
        }
        let Some(token) = profile.token.as_deref() else {
            return Err(AppError::ConfigurationError(format!(
                "Profile '{}' has no token configured; publishing requires one",
                profile.name
            )));
        };

        let file_path = subtitle_path(profile, file_name);
        let url = contents_url(profile, &file_path);
        let existence = self.probe(&url, &file_path, profile, token).await?;

        let mut payload = json!({
            "message": format!("SRT for video {}: {}", video_id, file_name),
            "content": BASE64.encode(content.as_bytes()),
            "branch": profile.effective_branch(),
        });
        let updating = match &existence {
            Existence::Present { sha } => {
                info!(
                    "Publish (profile '{}'): updating existing '{}' with version token {}",
                    profile.name, file_path, sha
                );
                payload["sha"] = Value::String(sha.clone());
                true
            }
            Existence::Absent => {
                info!(
                    "Publish (profile '{}'): creating new file '{}'",
                    profile.name, file_path
                );
                false
            }
        };

        let response = self.transport.put(&url, token, &payload).await.map_err(|e| {
            AppError::NetworkError(format!(
                "Network error while uploading (profile '{}'): {}",
                profile.name, e
            ))
        })?;

        if !response.is_success() {
            return Err(AppError::HttpError {
                status: response.status,
                message: format!(
                    "GitHub upload failed (profile '{}'): {}",
                    profile.name,
                    error_message(&response.body)
                ),
            });
        }

        let artifact_url = serde_json::from_str::<Value>(&response.body)
            .ok()
            .and_then(|body| {
                body.pointer("/content/html_url")
                    .or_else(|| body.pointer("/commit/html_url"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            });
        let file_name = file_name.to_string();
        Ok(if updating {
            PublishOutcome::Updated {
                file_name,
                url: artifact_url,
            }
        } else {
            PublishOutcome::Created {
                file_name,
                url: artifact_url,
            }
        })
    }

    /// Checks whether the target path already holds a file and captures its
    /// version token if so.
    async fn probe(
        &self,
        url: &str,
        file_path: &str,
        profile: &Profile,
        token: &str,
    ) -> AppResult<Existence> {
        let check_url = format!("{}?ref={}", url, profile.effective_branch());
        info!(
            "Publish (profile '{}'): checking target {}",
            profile.name, check_url
        );
        let response = self
            .transport
            .get(&check_url, Some(token))
            .await
            .map_err(|e| {
                AppError::NetworkError(format!(
                    "Network error while checking the target file (profile '{}'): {}",
                    profile.name, e
                ))
            })?;

        if response.status == 404 {
            return Ok(Existence::Absent);
        }
        if !response.is_success() {
            let mut message = format!(
                "Target check failed (HTTP {}, profile '{}'): {}",
                response.status,
                profile.name,
                error_message(&response.body)
            );
            if response.status == 401 {
                message.push_str(" (check the token)");
            }
            return Err(AppError::HttpError {
                status: response.status,
                message,
            });
        }
        if !response.is_json() {
            // 2xx with a non-JSON body proves the path exists but yields no
            // version token, so an in-place update is impossible.
            return Err(AppError::RemoteConflictError(format!(
                "'{}' already exists but its version token could not be read (unexpected content type)",
                file_path
            )));
        }

        let body: Value = serde_json::from_str(&response.body).map_err(|e| {
            AppError::RemoteConflictError(format!(
                "Unexpected JSON while checking '{}': {}",
                file_path, e
            ))
        })?;
        if body.is_array() {
            return Err(AppError::RemoteConflictError(format!(
                "Path '{}' is a directory (profile '{}')",
                file_path, profile.name
            )));
        }
        match (
            body.get("type").and_then(Value::as_str),
            body.get("sha").and_then(Value::as_str),
        ) {
            (Some("file"), Some(sha)) => Ok(Existence::Present {
                sha: sha.to_string(),
            }),
            (Some("file"), None) => Err(AppError::RemoteConflictError(format!(
                "'{}' exists but its metadata carried no version token (profile '{}')",
                file_path, profile.name
            ))),
            (Some(other), _) => Err(AppError::RemoteConflictError(format!(
                "Path '{}' is not a file (type: {}, profile '{}')",
                file_path, other, profile.name
            ))),
            _ => Err(AppError::RemoteConflictError(format!(
                "Unexpected metadata while checking '{}' (profile '{}')",
                file_path, profile.name
            ))),
        }
    }
}

/// Pulls the `message` field out of an error payload when parseable, else
/// truncates the raw body text.
fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(message) = value.get("message").and_then(Value::as_str) {
            return message.to_string();
        }
    }
    let text: String = body.trim().chars().take(200).collect();
    if text.is_empty() {
        "Unknown error".to_string()
    } else {
        text
    }
}

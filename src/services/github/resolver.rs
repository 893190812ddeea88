// Remote profile resolver.
// Walks the configured profiles in order and returns the first subtitle file
// that can be fetched, or an aggregated failure report.

use log::{info, warn};
use serde::Deserialize;

use crate::models::{AttemptRecord, AttemptStatus, Profile, ResolutionOutcome, ResolveError};

use super::transport::GithubTransport;
use super::{contents_url, subtitle_path};

/// Subset of the contents-API metadata response the resolver needs.
#[derive(Debug, Deserialize)]
struct ContentsMetadata {
    download_url: Option<String>,
}

pub struct Resolver<'a, T: GithubTransport> {
    transport: &'a T,
}

impl<'a, T: GithubTransport> Resolver<'a, T> {
    pub fn new(transport: &'a T) -> Self {
        Self { transport }
    }

    /// One full resolution pass over `profiles` for `video_id`.
    ///
    /// Profiles are tried strictly in list order with at most one request in
    /// flight. The first successful fetch wins immediately; otherwise the
    /// most recent non-benign failure is surfaced together with the full
    /// attempt trail. A 404 only means "try the next profile" and is never
    /// surfaced as the final error.
    pub async fn resolve(&self, video_id: &str, profiles: &[Profile]) -> ResolutionOutcome {
        let mut attempts: Vec<AttemptRecord> = Vec::new();
        let mut last_error: Option<ResolveError> = None;
        let file_name = format!("{}.srt", video_id);

        for profile in profiles {
            if !profile.has_identity() {
                info!(
                    "Auto-load: skipping profile '{}' due to missing user/repo",
                    profile.name
                );
                continue;
            }

            let file_path = subtitle_path(profile, &file_name);
            let url = format!(
                "{}?ref={}",
                contents_url(profile, &file_path),
                profile.effective_branch()
            );
            let token = profile.token.as_deref();

            info!("Auto-load (profile '{}'): attempting {}", profile.name, url);
            let response = match self.transport.get(&url, token).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(
                        "Auto-load (profile '{}'): network error for {}: {}",
                        profile.name, video_id, e
                    );
                    attempts.push(network_attempt(profile, &url, &e.to_string()));
                    last_error = Some(ResolveError::Network {
                        message: format!("Network error (profile '{}'): {}", profile.name, e),
                    });
                    continue;
                }
            };

            match response.status {
                404 => {
                    // Absence is expected, not exceptional; never sticky.
                    attempts.push(http_attempt(
                        profile,
                        &url,
                        404,
                        "File not found (404). Check path, branch and file name; private repositories need a token with read access.",
                    ));
                    continue;
                }
                401 => {
                    warn!(
                        "Auto-load (profile '{}'): unauthorized (401) for {}",
                        profile.name, video_id
                    );
                    attempts.push(http_attempt(
                        profile,
                        &url,
                        401,
                        "Unauthorized (401). The token is invalid or expired.",
                    ));
                    last_error = Some(ResolveError::Unauthorized {
                        message: format!(
                            "GitHub authentication failed (profile '{}'). Check the token.",
                            profile.name
                        ),
                    });
                    continue;
                }
                403 => {
                    warn!(
                        "Auto-load (profile '{}'): forbidden (403) for {}",
                        profile.name, video_id
                    );
                    attempts.push(http_attempt(
                        profile,
                        &url,
                        403,
                        "Forbidden (403). The token lacks repo scope or the API rate limit was exceeded.",
                    ));
                    last_error = Some(ResolveError::Forbidden {
                        message: format!(
                            "GitHub access forbidden (profile '{}'). Check token scopes or the rate limit.",
                            profile.name
                        ),
                    });
                    continue;
                }
                status if !response.is_success() => {
                    warn!(
                        "Auto-load (profile '{}'): lookup failed with HTTP {} for {}",
                        profile.name, status, video_id
                    );
                    attempts.push(http_attempt(
                        profile,
                        &url,
                        status,
                        &format!("GitHub API error (HTTP {}).", status),
                    ));
                    last_error = Some(ResolveError::Http {
                        status,
                        message: format!(
                            "GitHub lookup failed (HTTP {}, profile '{}')",
                            status, profile.name
                        ),
                    });
                    continue;
                }
                _ => {}
            }

            // 2xx: the contents API returns metadata; the raw bytes need a
            // second fetch through the download URL, which must carry the
            // auth header too for private repositories.
            let metadata: ContentsMetadata = match serde_json::from_str(&response.body) {
                Ok(metadata) => metadata,
                Err(e) => {
                    attempts.push(http_attempt(
                        profile,
                        &url,
                        response.status,
                        &format!("Unexpected metadata response: {}", e),
                    ));
                    continue;
                }
            };
            let Some(download_url) = metadata.download_url else {
                attempts.push(http_attempt(
                    profile,
                    &url,
                    response.status,
                    "Metadata response carried no download URL; the path may be a directory rather than a file.",
                ));
                continue;
            };

            let download = match self.transport.get(&download_url, token).await {
                Ok(download) => download,
                Err(e) => {
                    attempts.push(network_attempt(profile, &download_url, &e.to_string()));
                    last_error = Some(ResolveError::Network {
                        message: format!("Network error (profile '{}'): {}", profile.name, e),
                    });
                    continue;
                }
            };
            if !download.is_success() {
                attempts.push(http_attempt(
                    profile,
                    &download_url,
                    download.status,
                    "Failed to fetch the file through its download URL. Check that the token can read contents.",
                ));
                continue;
            }

            info!(
                "Auto-load (profile '{}'): successfully fetched {}",
                profile.name, file_name
            );
            return ResolutionOutcome::Found {
                content: download.body,
                profile_name: profile.name.clone(),
                attempts,
            };
        }

        match last_error {
            Some(error) => ResolutionOutcome::Failed { error, attempts },
            None => ResolutionOutcome::NotFound { attempts },
        }
    }
}

fn http_attempt(profile: &Profile, url: &str, status: u16, message: &str) -> AttemptRecord {
    AttemptRecord {
        profile_name: profile.name.clone(),
        request_url: url.to_string(),
        status: AttemptStatus::Http(status),
        message: message.to_string(),
    }
}

fn network_attempt(profile: &Profile, url: &str, message: &str) -> AttemptRecord {
    AttemptRecord {
        profile_name: profile.name.clone(),
        request_url: url.to_string(),
        status: AttemptStatus::NetworkError,
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::super::transport::testing::ScriptedTransport;
    use super::*;
    use crate::models::AttemptStatus;

    fn profile(name: &str) -> Profile {
        Profile {
            name: name.to_string(),
            user: format!("{}-user", name),
            repo: "subs".to_string(),
            branch: String::new(),
            path: String::new(),
            token: Some(format!("{}-token", name)),
        }
    }

    fn metadata_with_download_url() -> String {
        r#"{"type":"file","download_url":"https://raw.example/abc.srt"}"#.to_string()
    }

    const SRT: &str = "1\n00:00:01,000 --> 00:00:02,000\nhello";

    #[tokio::test]
    async fn test_first_success_wins_and_404_is_not_sticky() {
        let transport = ScriptedTransport::new(vec![
            ScriptedTransport::json(404, r#"{"message":"Not Found"}"#),
            ScriptedTransport::json(200, &metadata_with_download_url()),
            ScriptedTransport::raw(200, SRT),
        ]);
        let resolver = Resolver::new(&transport);

        let outcome = resolver
            .resolve("abc", &[profile("a"), profile("b")])
            .await;

        match outcome {
            ResolutionOutcome::Found {
                content,
                profile_name,
                attempts,
            } => {
                assert_eq!(content, SRT);
                assert_eq!(profile_name, "b");
                assert_eq!(attempts.len(), 1);
                assert_eq!(attempts[0].profile_name, "a");
                assert_eq!(attempts[0].status, AttemptStatus::Http(404));
            }
            other => panic!("expected Found, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_auth_error_sticky_over_trailing_404() {
        let transport = ScriptedTransport::new(vec![
            ScriptedTransport::json(401, r#"{"message":"Bad credentials"}"#),
            ScriptedTransport::json(404, r#"{"message":"Not Found"}"#),
        ]);
        let resolver = Resolver::new(&transport);

        let outcome = resolver
            .resolve("abc", &[profile("a"), profile("b")])
            .await;

        match outcome {
            ResolutionOutcome::Failed { error, attempts } => {
                assert!(matches!(error, ResolveError::Unauthorized { .. }));
                assert!(error.message().contains("profile 'a'"));
                assert_eq!(attempts.len(), 2);
            }
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_last_sticky_error_wins() {
        let transport = ScriptedTransport::new(vec![
            ScriptedTransport::json(401, "{}"),
            ScriptedTransport::json(403, "{}"),
        ]);
        let resolver = Resolver::new(&transport);

        let outcome = resolver
            .resolve("abc", &[profile("a"), profile("b")])
            .await;

        match outcome {
            ResolutionOutcome::Failed { error, .. } => {
                assert!(matches!(error, ResolveError::Forbidden { .. }));
                assert!(error.message().contains("profile 'b'"));
            }
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_all_profiles_missing_identity_yields_not_found() {
        let transport = ScriptedTransport::new(Vec::new());
        let resolver = Resolver::new(&transport);

        let incomplete = Profile {
            name: "broken".to_string(),
            user: String::new(),
            repo: "subs".to_string(),
            branch: String::new(),
            path: String::new(),
            token: None,
        };
        let outcome = resolver.resolve("abc", &[incomplete]).await;

        match outcome {
            ResolutionOutcome::NotFound { attempts } => assert!(attempts.is_empty()),
            other => panic!("expected NotFound, got {:?}", other),
        }
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_network_error_is_sticky() {
        let transport = ScriptedTransport::new(vec![
            ScriptedTransport::network("connection refused"),
            ScriptedTransport::json(404, "{}"),
        ]);
        let resolver = Resolver::new(&transport);

        let outcome = resolver
            .resolve("abc", &[profile("a"), profile("b")])
            .await;

        match outcome {
            ResolutionOutcome::Failed { error, attempts } => {
                assert!(matches!(error, ResolveError::Network { .. }));
                assert_eq!(attempts.len(), 2);
                assert_eq!(attempts[0].status, AttemptStatus::NetworkError);
            }
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_download_url_continues_without_sticky() {
        let transport = ScriptedTransport::new(vec![
            ScriptedTransport::json(200, r#"{"type":"dir"}"#),
            ScriptedTransport::json(200, &metadata_with_download_url()),
            ScriptedTransport::raw(200, SRT),
        ]);
        let resolver = Resolver::new(&transport);

        let outcome = resolver
            .resolve("abc", &[profile("a"), profile("b")])
            .await;

        match outcome {
            ResolutionOutcome::Found { profile_name, .. } => assert_eq!(profile_name, "b"),
            other => panic!("expected Found, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_request_urls_scope_branch_and_path() {
        let transport = ScriptedTransport::new(vec![
            ScriptedTransport::json(200, &metadata_with_download_url()),
            ScriptedTransport::raw(200, SRT),
        ]);
        let resolver = Resolver::new(&transport);

        let mut profile = profile("a");
        profile.branch = "develop".to_string();
        profile.path = "srt/".to_string();
        resolver.resolve("abc", &[profile]).await;

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(
            requests[0].url,
            "https://api.github.com/repos/a-user/subs/contents/srt/abc.srt?ref=develop"
        );
        assert_eq!(requests[0].token.as_deref(), Some("a-token"));
        // The download URL indirection keeps the auth header.
        assert_eq!(requests[1].url, "https://raw.example/abc.srt");
        assert_eq!(requests[1].token.as_deref(), Some("a-token"));
    }
}

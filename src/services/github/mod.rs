// GitHub services module
// Remote subtitle lookup and publishing over the GitHub contents API

pub mod publisher;
pub mod resolver;
pub mod transport;

pub use publisher::Publisher;
pub use resolver::Resolver;
pub use transport::{GithubTransport, RawResponse, ReqwestTransport, TransportError};

use crate::models::Profile;

pub(crate) const API_ROOT: &str = "https://api.github.com";

/// Repository-relative path for a subtitle file, honoring the profile's
/// optional directory prefix with any trailing slash stripped.
pub(crate) fn subtitle_path(profile: &Profile, file_name: &str) -> String {
    let prefix = profile.path.trim_end_matches('/');
    if prefix.is_empty() {
        file_name.to_string()
    } else {
        format!("{}/{}", prefix, file_name)
    }
}

/// Contents-API URL for a path inside the profile's repository.
pub(crate) fn contents_url(profile: &Profile, file_path: &str) -> String {
    format!(
        "{}/repos/{}/{}/contents/{}",
        API_ROOT, profile.user, profile.repo, file_path
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(path: &str) -> Profile {
        Profile {
            name: "primary".to_string(),
            user: "someone".to_string(),
            repo: "subs".to_string(),
            branch: String::new(),
            path: path.to_string(),
            token: None,
        }
    }

    #[test]
    fn test_subtitle_path_strips_trailing_slash() {
        assert_eq!(subtitle_path(&profile(""), "abc.srt"), "abc.srt");
        assert_eq!(subtitle_path(&profile("srt"), "abc.srt"), "srt/abc.srt");
        assert_eq!(subtitle_path(&profile("srt/"), "abc.srt"), "srt/abc.srt");
    }

    #[test]
    fn test_contents_url_layout() {
        assert_eq!(
            contents_url(&profile(""), "abc.srt"),
            "https://api.github.com/repos/someone/subs/contents/abc.srt"
        );
    }
}

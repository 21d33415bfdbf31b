use url::Url;

/// Pull the username out of a profile URL like `https://github.com/octo`
///
/// The username is the first non-empty path segment. Malformed URLs and
/// URLs without a path yield `None`.
pub fn resolve_username(profile_url: &str) -> Option<String> {
    let url = Url::parse(profile_url.trim()).ok()?;
    let username = url
        .path_segments()?
        .find(|segment| !segment.is_empty())?
        .to_string();
    Some(username)
}

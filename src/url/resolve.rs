use crate::GrabError;
use url::{ParseError, Url};

/// Resolves a raw query match against the page it was found on
///
/// # Resolution Rules
///
/// 1. Surrounding whitespace is trimmed
/// 2. Matches without a path resolve to nothing: `http://host`, `//host`,
///    `?query`, `#fragment` and opaque URLs such as `mailto:` or `javascript:`
/// 3. Absolute URLs are used as-is
/// 4. Scheme-relative references (`//host/path`) take the base scheme
/// 5. For relative references, a path starting with `/` replaces the base
///    path; any other path is appended to the base path verbatim
/// 6. The base query is never carried over: a relative reference keeps its
///    own query (if any) and drops its fragment
///
/// # Arguments
///
/// * `base` - URL of the page the match was extracted from
/// * `raw` - The extracted text
///
/// # Returns
///
/// * `Ok(Some(Url))` - The resolved URL
/// * `Ok(None)` - The match has no path, there is nothing to resolve
/// * `Err(GrabError::InvalidMatch)` - The match is not a URL reference
///
/// # Examples
///
/// ```
/// use grabber::url::resolve_match;
/// use url::Url;
///
/// let base = Url::parse("http://x/old/path").unwrap();
/// let url = resolve_match(&base, "/a/b").unwrap().unwrap();
/// assert_eq!(url.as_str(), "http://x/a/b");
/// ```
pub fn resolve_match(base: &Url, raw: &str) -> Result<Option<Url>, GrabError> {
    let raw = raw.trim();

    match Url::parse(raw) {
        Ok(absolute) => {
            if absolute.cannot_be_a_base() || !has_path_after_authority(raw) {
                Ok(None)
            } else {
                Ok(Some(absolute))
            }
        }
        Err(ParseError::RelativeUrlWithoutBase) => resolve_relative(base, raw),
        Err(source) => Err(GrabError::InvalidMatch {
            raw: raw.to_string(),
            source,
        }),
    }
}

fn resolve_relative(base: &Url, raw: &str) -> Result<Option<Url>, GrabError> {
    if raw.starts_with("//") {
        if !has_path_after_authority(raw) {
            return Ok(None);
        }
        return base
            .join(raw)
            .map(Some)
            .map_err(|source| GrabError::InvalidMatch {
                raw: raw.to_string(),
                source,
            });
    }

    let reference = raw.split('#').next().unwrap_or_default();
    let (path, query) = match reference.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (reference, None),
    };

    if path.is_empty() {
        return Ok(None);
    }

    let mut resolved = base.clone();
    if path.starts_with('/') {
        resolved.set_path(path);
    } else {
        let appended = format!("{}{}", base.path(), path);
        resolved.set_path(&appended);
    }
    resolved.set_query(query);
    resolved.set_fragment(None);

    Ok(Some(resolved))
}

/// Whether a hierarchical reference has a path after its authority
///
/// The url crate normalizes `http://host` to `http://host/`, so the path is
/// checked on the raw text instead.
fn has_path_after_authority(raw: &str) -> bool {
    let Some((_, rest)) = raw.split_once("//") else {
        return true;
    };
    let after_authority = rest.trim_start_matches(|c| !matches!(c, '/' | '?' | '#'));
    after_authority.starts_with('/')
}

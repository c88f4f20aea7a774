use std::borrow::Cow;
use url::Url;

/// Derives the destination file name for a download URL
///
/// The last path segment is percent-decoded. If decoding fails, or the
/// decoded name would not be a plain file name (`.`, `..`, or containing a
/// path separator), the raw segment is used instead.
///
/// Returns `None` when the URL has no usable last segment (e.g. it ends in `/`).
///
/// # Examples
///
/// ```
/// use grabber::url::file_name_for;
/// use url::Url;
///
/// let url = Url::parse("http://example.com/files/my%20photo.jpg").unwrap();
/// assert_eq!(file_name_for(&url).as_deref(), Some("my photo.jpg"));
/// ```
pub fn file_name_for(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.last()?;
    if segment.is_empty() {
        return None;
    }

    let name = match urlencoding::decode(segment) {
        Ok(decoded) if is_plain_file_name(&decoded) => decoded,
        _ => Cow::Borrowed(segment),
    };

    Some(name.into_owned())
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\', '\0'])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(url: &str) -> Option<String> {
        file_name_for(&Url::parse(url).unwrap())
    }

    #[test]
    fn test_last_segment() {
        assert_eq!(name("http://x/a/b/c.png").as_deref(), Some("c.png"));
    }

    #[test]
    fn test_query_is_ignored() {
        assert_eq!(name("http://x/dl/file.zip?token=1").as_deref(), Some("file.zip"));
    }

    #[test]
    fn test_percent_decoded() {
        assert_eq!(
            name("http://x/%C5%BC%C3%B3%C5%82w.txt").as_deref(),
            Some("żółw.txt")
        );
    }

    #[test]
    fn test_invalid_utf8_falls_back_to_raw() {
        assert_eq!(name("http://x/bad%FF.bin").as_deref(), Some("bad%FF.bin"));
    }

    #[test]
    fn test_separator_falls_back_to_raw() {
        assert_eq!(
            name("http://x/..%2F..%2Fetc%2Fpasswd").as_deref(),
            Some("..%2F..%2Fetc%2Fpasswd")
        );
    }

    #[test]
    fn test_no_file_name() {
        assert_eq!(name("http://x/gallery/"), None);
        assert_eq!(name("http://x"), None);
    }
}

//! Link header parsing (RFC 5988)
//!
//! Format: `Link: <https://canvas.test/api/v1/courses?page=2>; rel="next", <...>; rel="last"`

/// URL of the `rel="next"` entry, if any
pub fn next_url(header: Option<&str>) -> Option<&str> {
    header.and_then(|h| find_link(h, "next"))
}

/// URL of the first entry whose relation is exactly `rel`
///
/// An entry matches when it ends with `rel="<rel>"`; the first match wins.
pub fn find_link<'a>(header: &'a str, rel: &str) -> Option<&'a str> {
    let suffix = format!("rel=\"{rel}\"");

    let entry = header
        .split(',')
        .find(|entry| entry.trim_end().ends_with(&suffix))?;

    let start = entry.find('<')? + 1;
    let end = start + entry[start..].find('>')?;
    Some(&entry[start..end])
}

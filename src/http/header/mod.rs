//! Case-insensitive header storage and cookies.

mod cookie;
mod map;

pub use cookie::{Cookie, CookieJar};
pub use map::Headers;

/// Canonical form of a header name: lower case, with
/// underscores replaced by dashes.
///
/// ```rust
/// use wireframe::http::header::canonical;
///
/// assert_eq!(canonical("Content_Type"), "content-type");
/// ```
pub fn canonical(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '_' => '-',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

pub const CONTENT_TYPE: &str = "content-type";
pub const SET_COOKIE: &str = "Set-Cookie";

use super::form::{self, FormKind};
use super::header::{canonical, CookieJar, Headers, CONTENT_TYPE};
use super::{Body, Method, Params};
use crate::error::Error;

use std::cell::RefCell;
use std::fmt;

use bytes::Bytes;
use once_cell::unsync::OnceCell;

/// Case-insensitive substrings of a `User-Agent` that suggest a browser.
const HUMAN_USER_AGENT_SIGNATURES: [&str; 6] =
    ["mozilla", "firefox", "opera", "chrome", "safari", "msie"];

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Form field that overrides the method of a `POST` request.
const METHOD_OVERRIDE_FIELD: &str = "http_method";

/// A snapshot of an inbound request as the host transport sees it.
///
/// ```rust
/// use wireframe::http::Environ;
///
/// let environ = Environ::new("get", "/item/42")
///     .query("verbose=1")
///     .header("User-Agent", "curl/8.0");
/// assert_eq!(environ.method(), "get");
/// ```
#[derive(Debug, Default)]
pub struct Environ {
    method: String,
    path: String,
    query: Option<String>,
    headers: Vec<(String, String)>,
    body: Body,
}

impl Environ {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = body.into();
        self
    }

    /// Take a snapshot of an `http` crate request.
    ///
    /// Header values that are not valid UTF-8 are dropped.
    pub fn from_http(req: http::Request<Body>) -> Self {
        let (parts, body) = req.into_parts();

        Self {
            method: parts.method.as_str().to_owned(),
            path: parts.uri.path().to_owned(),
            query: parts.uri.query().map(str::to_owned),
            headers: parts
                .headers
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|value| (name.as_str().to_owned(), value.to_owned()))
                })
                .collect(),
            body,
        }
    }

    /// The method as sent by the client, before normalization.
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_string(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Whether the `User-Agent` header looks like a browser.
    pub fn is_human(&self) -> bool {
        self.headers()
            .find(|(name, _)| canonical(name) == "user-agent")
            .map_or(false, |(_, agent)| looks_human(agent))
    }
}

fn looks_human(agent: &str) -> bool {
    let agent = agent.to_ascii_lowercase();
    HUMAN_USER_AGENT_SIGNATURES
        .iter()
        .any(|signature| agent.contains(signature))
}

/// The unnamed values a path matcher extracted.
///
/// Regex and route matchers always produce a sequence; a predicate
/// matcher may hand back a bare string, which cannot be indexed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Captures {
    Seq(Vec<String>),
    Text(String),
}

impl Captures {
    /// An empty capture result counts as "no match".
    pub fn is_empty(&self) -> bool {
        match self {
            Captures::Seq(values) => values.is_empty(),
            Captures::Text(text) => text.is_empty(),
        }
    }

    /// Index into the captures. Negative indices count from the end.
    pub fn get(&self, index: isize) -> Result<&str, Error> {
        let values = match self {
            Captures::Seq(values) => values,
            Captures::Text(_) => return Err(Error::TypeMismatch),
        };

        let resolved = if index < 0 {
            values.len() as isize + index
        } else {
            index
        };

        usize::try_from(resolved)
            .ok()
            .and_then(|i| values.get(i))
            .map(String::as_str)
            .ok_or(Error::OutOfRange(index))
    }
}

impl Default for Captures {
    fn default() -> Self {
        Captures::Seq(Vec::new())
    }
}

impl From<Vec<String>> for Captures {
    fn from(values: Vec<String>) -> Self {
        Captures::Seq(values)
    }
}

impl From<Vec<&str>> for Captures {
    fn from(values: Vec<&str>) -> Self {
        Captures::Seq(values.into_iter().map(str::to_owned).collect())
    }
}

impl From<String> for Captures {
    fn from(text: String) -> Self {
        Captures::Text(text)
    }
}

impl From<&str> for Captures {
    fn from(text: &str) -> Self {
        Captures::Text(text.to_owned())
    }
}

/// A key for [`Request::get`]: an index into the unnamed captures,
/// or a name looked up in the named captures and then the form fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key<'a> {
    Index(isize),
    Name(&'a str),
}

impl From<isize> for Key<'_> {
    fn from(index: isize) -> Self {
        Key::Index(index)
    }
}

impl From<i32> for Key<'_> {
    fn from(index: i32) -> Self {
        Key::Index(index as isize)
    }
}

impl From<usize> for Key<'_> {
    fn from(index: usize) -> Self {
        // no capture list is long enough for isize::MAX to be in range
        Key::Index(isize::try_from(index).unwrap_or(isize::MAX))
    }
}

impl<'a> From<&'a str> for Key<'a> {
    fn from(name: &'a str) -> Self {
        Key::Name(name)
    }
}

impl<'a> From<&'a String> for Key<'a> {
    fn from(name: &'a String) -> Self {
        Key::Name(name)
    }
}

/// An inbound HTTP request, normalized for handlers.
///
/// Built once per request by the application; handlers in a chain
/// share it by mutable reference.
pub struct Request {
    environ: Environ,
    path: String,
    path_values: Captures,
    path_named_values: Params,
    headers: Headers,
    cookies: CookieJar,
    user: Option<String>,
    password: Option<String>,
    human_user_agent: bool,
    legacy_browser: bool,
    content_type: String,
    fields: Params,
    body: RefCell<Option<Body>>,
    data: OnceCell<Bytes>,
    body_limit: usize,
    http_method: String,
    extensions: http::Extensions,
}

impl Request {
    /// Build the request context.
    ///
    /// Fails if a form body cannot be read or decoded.
    pub fn new(
        mut environ: Environ,
        path_values: Captures,
        path_named_values: Params,
        body_limit: usize,
    ) -> Result<Self, Error> {
        let body = std::mem::take(&mut environ.body);
        let headers: Headers = environ.headers.iter().cloned().collect();

        let mut request = Request {
            path: environ.path.clone(),
            path_values,
            path_named_values,
            cookies: CookieJar::parse(headers.get("cookie").unwrap_or_default()),
            headers,
            user: None,
            password: None,
            human_user_agent: false,
            legacy_browser: false,
            content_type: DEFAULT_CONTENT_TYPE.to_owned(),
            fields: Params::new(),
            body: RefCell::new(None),
            data: OnceCell::new(),
            body_limit,
            http_method: String::new(),
            extensions: http::Extensions::new(),
            environ,
        };

        request.setup_human_user_agent();
        request.setup_data(body)?;
        request.setup_http_method();

        Ok(request)
    }

    fn setup_human_user_agent(&mut self) {
        if let Some(agent) = self.headers.get("user-agent") {
            self.human_user_agent = looks_human(agent);
            self.legacy_browser = agent.to_ascii_lowercase().contains("msie");
        }
    }

    fn setup_data(&mut self, body: Body) -> Result<(), Error> {
        let full_type = self.headers.get(CONTENT_TYPE).map(str::to_owned);

        if let Some(ref full_type) = full_type {
            let essence = full_type.split(';').next().unwrap_or_default().trim();
            if !essence.is_empty() {
                self.content_type = essence.to_ascii_lowercase();
            }
        }

        let query = self.environ.query.as_deref().unwrap_or_default();

        match full_type.as_deref().and_then(FormKind::of) {
            Some(_) if self.environ.method.eq_ignore_ascii_case("GET") => {
                self.fields = form::urlencoded(query.as_bytes())?;
            }
            Some(_) => {
                // decoded the way a POST would be, whatever the actual method
                let bytes = body.read_all(self.body_limit)?;
                let full_type = full_type.as_deref().unwrap_or_default();
                self.fields = form::decode(full_type, &bytes)?;
                self.fields.extend(form::urlencoded(query.as_bytes())?);
            }
            None => {
                *self.body.get_mut() = Some(body);
                self.fields = form::urlencoded(query.as_bytes()).unwrap_or_default();
            }
        }

        Ok(())
    }

    fn setup_http_method(&mut self) {
        self.http_method = self.environ.method.to_ascii_uppercase();

        if self.http_method == "POST" {
            let method = self.fields.get(METHOD_OVERRIDE_FIELD).filter(|m| !m.is_empty());
            if let Some(method) = method {
                self.http_method = method.to_ascii_uppercase();
            }
        }
    }

    /// The transport snapshot this request was built from.
    pub fn environ(&self) -> &Environ {
        &self.environ
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Unnamed values captured by the path matcher.
    pub fn path_values(&self) -> &Captures {
        &self.path_values
    }

    /// Named values captured by the path matcher.
    pub fn path_named_values(&self) -> &Params {
        &self.path_named_values
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    /// The effective, upper-cased HTTP method, after any
    /// `http_method` override of a `POST`.
    pub fn http_method(&self) -> &str {
        &self.http_method
    }

    /// The effective method, if it is one of the fixed vocabulary.
    pub fn method(&self) -> Option<Method> {
        Method::from_name(&self.http_method)
    }

    /// Content type without parameters; `application/octet-stream`
    /// when the client sent none.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Decoded form fields.
    pub fn fields(&self) -> &Params {
        &self.fields
    }

    /// The raw request body.
    ///
    /// The body stream is read on first access and cached. Form
    /// submissions have already been decoded into [`fields`](Self::fields)
    /// and report `None`.
    pub fn data(&self) -> Result<Option<&Bytes>, Error> {
        if let Some(data) = self.data.get() {
            return Ok(Some(data));
        }

        let body = match self.body.borrow_mut().take() {
            Some(body) => body,
            None => return Ok(None),
        };

        self.data
            .get_or_try_init(|| body.read_all(self.body_limit))
            .map(Some)
    }

    /// Look up a request value.
    ///
    /// An integer key indexes the unnamed path captures; a name is
    /// looked up in the named captures, then in the form fields.
    ///
    /// ```rust
    /// # use wireframe::http::{Environ, Request};
    /// let req = Request::new(
    ///     Environ::new("GET", "/item/42").query("q=x"),
    ///     vec!["42"].into(),
    ///     Default::default(),
    ///     1024,
    /// )?;
    ///
    /// assert_eq!(req.get(0)?, "42");
    /// assert_eq!(req.get("q")?, "x");
    /// assert!(req.get("missing").is_err());
    /// # Ok::<_, wireframe::Error>(())
    /// ```
    pub fn get<'k>(&self, key: impl Into<Key<'k>>) -> Result<&str, Error> {
        match key.into() {
            Key::Index(index) => self.path_values.get(index),
            Key::Name(name) => self
                .path_named_values
                .get(name)
                .or_else(|| self.fields.get(name))
                .ok_or_else(|| Error::NotFound(name.to_owned())),
        }
    }

    /// Like [`get`](Self::get), but absent values are `None`.
    /// A type mismatch is still an error.
    pub fn value<'k>(&self, key: impl Into<Key<'k>>) -> Result<Option<&str>, Error> {
        match self.get(key) {
            Ok(value) => Ok(Some(value)),
            Err(Error::NotFound(_)) | Err(Error::OutOfRange(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Whether `name` is a named capture or a form field.
    pub fn contains(&self, name: &str) -> bool {
        self.path_named_values.contains(name) || self.fields.contains(name)
    }

    /// The authenticated user, once an authentication processor ran.
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn set_login(&mut self, user: impl Into<String>, password: impl Into<String>) {
        self.user = Some(user.into());
        self.password = Some(password.into());
    }

    /// Whether the user agent looks like a browser.
    pub fn is_human(&self) -> bool {
        self.human_user_agent
    }

    /// Whether the user agent identifies as Internet Explorer.
    pub fn is_legacy_browser(&self) -> bool {
        self.legacy_browser
    }

    /// Values attached by processors earlier in the chain.
    pub fn extensions(&self) -> &http::Extensions {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut http::Extensions {
        &mut self.extensions
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("http_method", &self.http_method)
            .field("path", &self.path)
            .field("path_values", &self.path_values)
            .field("path_named_values", &self.path_named_values)
            .field("headers", &self.headers)
            .field("fields", &self.fields)
            .field("user", &self.user)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::body::Unreadable;

    fn build(environ: Environ) -> Request {
        Request::new(environ, Captures::default(), Params::new(), 1024).unwrap()
    }

    #[test]
    fn method_override_only_on_post() {
        let post = build(
            Environ::new("post", "/")
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body("http_method=delete&x=1"),
        );
        assert_eq!(post.http_method(), "DELETE");
        assert_eq!(post.method(), Some(Method::Delete));
        assert_eq!(post.get("x").unwrap(), "1");

        let get = build(Environ::new("GET", "/").query("http_method=DELETE"));
        assert_eq!(get.http_method(), "GET");
    }

    #[test]
    fn blank_method_override_is_ignored() {
        let post = build(
            Environ::new("POST", "/")
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body("http_method=&x=1"),
        );
        assert_eq!(post.http_method(), "POST");
        assert_eq!(post.get("x").unwrap(), "1");
    }

    #[test]
    fn form_put_is_decoded_like_post() {
        let req = build(
            Environ::new("PUT", "/")
                .query("b=2")
                .header("content-type", "application/x-www-form-urlencoded; charset=utf-8")
                .body("a=1"),
        );

        assert_eq!(req.http_method(), "PUT");
        assert_eq!(req.content_type(), "application/x-www-form-urlencoded");
        assert_eq!(req.get("a").unwrap(), "1");
        assert_eq!(req.get("b").unwrap(), "2");
        assert!(req.data().unwrap().is_none());
    }

    #[test]
    fn raw_body_is_read_once() {
        let req = build(
            Environ::new("POST", "/")
                .header("Content-Type", "application/json")
                .body("{\"a\":1}"),
        );

        assert_eq!(req.content_type(), "application/json");
        assert!(req.fields().is_empty());
        assert_eq!(req.data().unwrap().unwrap(), "{\"a\":1}");
        assert_eq!(req.data().unwrap().unwrap(), "{\"a\":1}");
    }

    #[test]
    fn unreadable_body_only_fails_on_access() {
        let req = build(Environ::new("POST", "/").body(Body::reader(Unreadable)));

        assert!(req.fields().is_empty());
        assert!(matches!(req.data(), Err(Error::Io(_))));
        assert!(req.data().unwrap().is_none());
    }

    #[test]
    fn oversized_form_is_rejected() {
        let result = Request::new(
            Environ::new("POST", "/")
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body("a=123456789"),
            Captures::default(),
            Params::new(),
            4,
        );

        assert!(matches!(result, Err(Error::BodyTooLarge(4))));
    }

    #[test]
    fn lookup() {
        let named: Params = vec![("id".to_owned(), "7".to_owned())].into();
        let req = Request::new(
            Environ::new("GET", "/a/b").query("id=8&q=x"),
            vec!["a", "b"].into(),
            named,
            1024,
        )
        .unwrap();

        assert_eq!(req.get(0).unwrap(), "a");
        assert_eq!(req.get(-1).unwrap(), "b");
        assert!(matches!(req.get(2), Err(Error::OutOfRange(2))));
        assert!(matches!(req.get(usize::MAX), Err(Error::OutOfRange(_))));
        assert!(matches!(req.get(1usize), Ok("b")));
        assert_eq!(req.get("id").unwrap(), "7");
        assert_eq!(req.get("q").unwrap(), "x");
        assert!(matches!(req.get("nope"), Err(Error::NotFound(_))));
        assert_eq!(req.value("nope").unwrap(), None);

        assert!(req.contains("id"));
        assert!(req.contains("q"));
        assert!(!req.contains("0"));
    }

    #[test]
    fn text_captures_cannot_be_indexed() {
        let req = Request::new(
            Environ::new("GET", "/x"),
            "x".into(),
            Params::new(),
            1024,
        )
        .unwrap();

        assert!(matches!(req.get(0), Err(Error::TypeMismatch)));
        assert!(matches!(req.value(0), Err(Error::TypeMismatch)));
    }

    #[test]
    fn user_agent_heuristic() {
        let req = build(
            Environ::new("GET", "/")
                .header("User-Agent", "Mozilla/4.0 (compatible; MSIE 6.0; Windows NT 5.1)"),
        );
        assert!(req.is_human());
        assert!(req.is_legacy_browser());

        let req = build(Environ::new("GET", "/").header("User-Agent", "curl/8.0"));
        assert!(!req.is_human());
        assert!(!req.is_legacy_browser());

        assert!(!build(Environ::new("GET", "/")).is_human());
    }

    #[test]
    fn cookies_and_headers() {
        let req = build(
            Environ::new("GET", "/")
                .header("Cookie", "sid=abc; theme=dark")
                .header("X_Custom", "1"),
        );

        assert_eq!(req.cookies().value("sid"), Some("abc"));
        assert_eq!(req.headers().get("x-custom"), Some("1"));
        assert_eq!(req.user(), None);
    }
}

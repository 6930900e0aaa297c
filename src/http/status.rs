use super::header::Headers;

use std::fmt;

/// Status code of an HTTP response.
///
/// This is a closed set: handlers select an outcome from it,
/// they never invent a numeric code.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum StatusCode {
    /// 200 OK
    Ok,

    /// 201 Created
    Created,

    /// 202 Accepted
    Accepted,

    /// 204 No Content
    NoContent,

    /// 301 Moved Permanently
    MovedPermanently,

    /// 302 Found
    Found,

    /// 303 See Other
    SeeOther,

    /// 304 Not Modified
    NotModified,

    /// 307 Temporary Redirect
    TemporaryRedirect,

    /// 400 Bad Request
    BadRequest,

    /// 401 Unauthorized
    Unauthorized,

    /// 403 Forbidden
    Forbidden,

    /// 404 Not Found
    NotFound,

    /// 405 Method Not Allowed
    MethodNotAllowed,

    /// 406 Not Acceptable
    NotAcceptable,

    /// 408 Request Timeout
    RequestTimeout,

    /// 409 Conflict
    Conflict,

    /// 410 Gone
    Gone,

    /// 500 Internal Server Error
    InternalServerError,

    /// 501 Not Implemented
    NotImplemented,

    /// 503 Service Unavailable
    ServiceUnavailable,
}

impl StatusCode {
    /// The numeric HTTP status code.
    pub fn code(self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::Created => 201,
            StatusCode::Accepted => 202,
            StatusCode::NoContent => 204,
            StatusCode::MovedPermanently => 301,
            StatusCode::Found => 302,
            StatusCode::SeeOther => 303,
            StatusCode::NotModified => 304,
            StatusCode::TemporaryRedirect => 307,
            StatusCode::BadRequest => 400,
            StatusCode::Unauthorized => 401,
            StatusCode::Forbidden => 403,
            StatusCode::NotFound => 404,
            StatusCode::MethodNotAllowed => 405,
            StatusCode::NotAcceptable => 406,
            StatusCode::RequestTimeout => 408,
            StatusCode::Conflict => 409,
            StatusCode::Gone => 410,
            StatusCode::InternalServerError => 500,
            StatusCode::NotImplemented => 501,
            StatusCode::ServiceUnavailable => 503,
        }
    }

    /// Returns the class of a given status.
    pub fn class(self) -> StatusClass {
        match self.code() / 100 {
            2 => StatusClass::Success,
            3 => StatusClass::Redirection,
            4 => StatusClass::ClientError,
            _ => StatusClass::ServerError,
        }
    }

    /// The canonical reason for a given status code.
    pub fn reason(self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::Accepted => "Accepted",
            StatusCode::NoContent => "No Content",
            StatusCode::MovedPermanently => "Moved Permanently",
            StatusCode::Found => "Found",
            StatusCode::SeeOther => "See Other",
            StatusCode::NotModified => "Not Modified",
            StatusCode::TemporaryRedirect => "Temporary Redirect",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Unauthorized => "Unauthorized",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::NotAcceptable => "Not Acceptable",
            StatusCode::RequestTimeout => "Request Timeout",
            StatusCode::Conflict => "Conflict",
            StatusCode::Gone => "Gone",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::NotImplemented => "Not Implemented",
            StatusCode::ServiceUnavailable => "Service Unavailable",
        }
    }

    /// Whether this is a 4xx or 5xx status.
    pub fn is_error(self) -> bool {
        matches!(
            self.class(),
            StatusClass::ClientError | StatusClass::ServerError
        )
    }
}

impl Default for StatusCode {
    fn default() -> Self {
        StatusCode::Ok
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code(), self.reason())
    }
}

/// Class of an HTTP status.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum StatusClass {
    /// The request has succeeded.
    Success,

    /// Further action needs to be taken to fulfill the request.
    Redirection,

    /// The request cannot be fulfilled due to a client error.
    ClientError,

    /// The server failed to fulfill a valid request.
    ServerError,
}

/// A terminal outcome of a request.
///
/// A `Status` is both a description of the response to send and the
/// value a handler returns to stop the rest of its chain. It carries
/// a code, a human remark, and any headers the outcome requires
/// (`Allow`, `WWW-Authenticate`, `Location`).
///
/// ```rust
/// use wireframe::http::Status;
///
/// let status = Status::method_not_allowed(["GET", "POST"]);
/// assert_eq!(status.headers().get("allow"), Some("GET,POST"));
/// ```
#[derive(Debug, Clone)]
pub struct Status {
    code: StatusCode,
    remark: String,
    headers: Headers,
}

impl Status {
    /// Create a status with an empty remark.
    pub fn new(code: StatusCode) -> Self {
        Self {
            code,
            remark: String::new(),
            headers: Headers::new(),
        }
    }

    /// Attach a human readable remark.
    pub fn with_remark(mut self, remark: impl Into<String>) -> Self {
        self.remark = remark.into();
        self
    }

    /// Attach an extra header. An empty value is ignored.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    pub fn code(&self) -> StatusCode {
        self.code
    }

    pub fn remark(&self) -> &str {
        &self.remark
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub(crate) fn into_parts(self) -> (StatusCode, String, Headers) {
        (self.code, self.remark, self.headers)
    }

    pub fn is_error(&self) -> bool {
        self.code.is_error()
    }

    pub fn is_unauthorized(&self) -> bool {
        self.code == StatusCode::Unauthorized
    }

    /// 405 with an `Allow` header listing `allowed`, comma joined.
    pub fn method_not_allowed<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allow = allowed
            .into_iter()
            .map(|m| m.as_ref().to_owned())
            .collect::<Vec<_>>()
            .join(",");

        Status::new(StatusCode::MethodNotAllowed).with_header("Allow", allow)
    }

    /// 401 carrying a `WWW-Authenticate: Basic realm="<realm>"` challenge.
    pub fn unauthorized_basic(realm: &str) -> Self {
        Status::new(StatusCode::Unauthorized)
            .with_header("WWW-Authenticate", format!("Basic realm=\"{}\"", realm))
    }

    /// 204 with an `Allow` header, as answered to `OPTIONS`.
    pub fn no_content_allow<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut status = Status::method_not_allowed(allowed);
        status.code = StatusCode::NoContent;
        status
    }

    /// A redirect of the given kind to `location`.
    pub fn redirect(code: StatusCode, location: impl Into<String>) -> Self {
        Status::new(code).with_header("Location", location)
    }
}

macro_rules! shorthand {
    ($($name:ident => $code:ident),* $(,)?) => {
        impl Status {$(
            #[doc = concat!("Shorthand for `Status::new(StatusCode::", stringify!($code), ").with_remark(remark)`.")]
            pub fn $name(remark: impl Into<String>) -> Self {
                Status::new(StatusCode::$code).with_remark(remark)
            }
        )*}
    };
}

shorthand! {
    ok => Ok,
    created => Created,
    accepted => Accepted,
    no_content => NoContent,
    bad_request => BadRequest,
    unauthorized => Unauthorized,
    forbidden => Forbidden,
    not_found => NotFound,
    not_acceptable => NotAcceptable,
    request_timeout => RequestTimeout,
    conflict => Conflict,
    gone => Gone,
    internal_server_error => InternalServerError,
    not_implemented => NotImplemented,
    service_unavailable => ServiceUnavailable,
}

impl From<StatusCode> for Status {
    fn from(code: StatusCode) -> Self {
        Status::new(code)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.code, f)
    }
}

impl std::error::Error for Status {}

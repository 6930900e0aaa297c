use super::header::{Headers, CONTENT_TYPE};
use super::{Status, StatusCode};
use crate::error::Error;
use crate::BoxError;

use std::{fmt, mem};

use bytes::{Bytes, BytesMut};

type Cleanup = Box<dyn FnOnce() -> Result<(), BoxError> + Send>;

/// The response under construction.
///
/// Every handler in a chain appends to the same response. Cleanup
/// actions pushed onto it run exactly once, last pushed first, when
/// the response is finalized (or dropped without being finalized).
pub struct Response {
    status: StatusCode,
    remark: String,
    headers: Headers,
    body: Vec<Bytes>,
    cleanup: Vec<Cleanup>,
    extensions: http::Extensions,
}

impl Response {
    /// A `200 OK` response with a `text/plain` content type.
    pub fn new() -> Self {
        let mut headers = Headers::new();
        headers.set(CONTENT_TYPE, mime::TEXT_PLAIN.as_ref());

        Self {
            status: StatusCode::Ok,
            remark: String::new(),
            headers,
            body: Vec::new(),
            cleanup: Vec::new(),
            extensions: http::Extensions::new(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// The remark of the [`Status`] this response was made from.
    pub fn remark(&self) -> &str {
        &self.remark
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Set a header; an empty value removes it.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.set(name, value);
    }

    pub fn set_content_type(&mut self, mime: &mime::Mime) {
        self.headers.set(CONTENT_TYPE, mime.as_ref());
    }

    /// Append a fragment to the body.
    pub fn append(&mut self, fragment: impl Into<Bytes>) {
        self.body.push(fragment.into());
    }

    /// The body fragments, in append order.
    pub fn fragments(&self) -> &[Bytes] {
        &self.body
    }

    /// Register an action to run when the response is finalized.
    pub fn push_cleanup<F>(&mut self, action: F)
    where
        F: FnOnce() -> Result<(), BoxError> + Send + 'static,
    {
        self.cleanup.push(Box::new(action));
    }

    pub fn pending_cleanup(&self) -> usize {
        self.cleanup.len()
    }

    /// Move the cleanup actions of `other` onto this response,
    /// keeping their order below any already registered here.
    pub(crate) fn adopt_cleanup(&mut self, other: &mut Response) {
        let mut adopted = mem::take(&mut other.cleanup);
        adopted.append(&mut self.cleanup);
        self.cleanup = adopted;
    }

    /// Values attached by processors, such as a content negotiator
    /// or a session id.
    pub fn extensions(&self) -> &http::Extensions {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut http::Extensions {
        &mut self.extensions
    }

    /// Run every cleanup action, most recently pushed first.
    ///
    /// Each action runs even if an earlier one failed; failures are
    /// logged and counted in [`Error::Cleanup`]. Calling this again
    /// is a no-op.
    pub fn finalize(&mut self) -> Result<(), Error> {
        let mut failed = 0;

        while let Some(action) = self.cleanup.pop() {
            if let Err(err) = action() {
                tracing::warn!(error = %err, "cleanup action failed");
                failed += 1;
            }
        }

        match failed {
            0 => Ok(()),
            n => Err(Error::Cleanup(n)),
        }
    }

    /// Serialize the status line, header lines and body.
    pub fn serialize(&self) -> Serialized {
        let mut body = BytesMut::with_capacity(self.body.iter().map(Bytes::len).sum());
        for fragment in &self.body {
            body.extend_from_slice(fragment);
        }

        Serialized {
            status_line: self.status.to_string(),
            headers: self.headers.lines(),
            body: body.freeze(),
        }
    }

    /// Convert into an `http` crate response, then finalize.
    ///
    /// Header lines that are not valid HTTP are skipped with a warning.
    pub fn into_http(mut self) -> http::Response<Bytes> {
        let Serialized { headers, body, .. } = self.serialize();
        let mut res = http::Response::new(body);

        *res.status_mut() = http::StatusCode::from_u16(self.status.code())
            .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR);

        for (name, value) in headers {
            let name = http::header::HeaderName::from_bytes(name.as_bytes());
            let value = http::HeaderValue::from_str(&value);

            match (name, value) {
                (Ok(name), Ok(value)) => {
                    res.headers_mut().append(name, value);
                }
                _ => tracing::warn!("skipping invalid header line"),
            }
        }

        // failures were already logged one by one
        let _ = self.finalize();
        res
    }
}

impl Default for Response {
    fn default() -> Self {
        Response::new()
    }
}

impl Drop for Response {
    fn drop(&mut self) {
        let _ = self.finalize();
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body", &self.body)
            .field("cleanup", &self.cleanup.len())
            .finish()
    }
}

/// A status becomes a body-less response carrying its headers.
impl From<Status> for Response {
    fn from(status: Status) -> Self {
        let (code, remark, headers) = status.into_parts();

        let mut res = Response::new();
        res.status = code;
        res.remark = remark;
        res.headers.merge(&headers);
        res
    }
}

/// A response as it goes on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct Serialized {
    /// `"<code> <reason>"`
    pub status_line: String,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl Serialized {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

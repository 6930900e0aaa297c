use crate::error::Error;

use std::fmt;
use std::io::Read;

use bytes::Bytes;

/// Respresents the body of an HTTP request, as handed over by the host.
#[non_exhaustive]
pub enum Body {
    /// A blocking stream, read on demand.
    Reader(Box<dyn Read + Send>),
    Once(Bytes),
    Empty,
}

impl Body {
    /// Create a `Body` from a blocking reader.
    pub fn reader<R>(reader: R) -> Self
    where
        R: Read + Send + 'static,
    {
        Self::Reader(Box::new(reader))
    }

    /// Create a body directly from bytes.
    pub fn once(bytes: impl Into<Bytes>) -> Self {
        Self::Once(bytes.into())
    }

    /// Create an empty `Body`.
    pub fn empty() -> Self {
        Self::Empty
    }

    /// Read the whole body.
    ///
    /// `limit` indicates the maximum bytes that can be read
    /// before returning [`Error::BodyTooLarge`].
    pub fn read_all(self, limit: usize) -> Result<Bytes, Error> {
        match self {
            Body::Empty => Ok(Bytes::new()),
            Body::Once(bytes) if bytes.len() > limit => Err(Error::BodyTooLarge(limit)),
            Body::Once(bytes) => Ok(bytes),
            Body::Reader(reader) => {
                let mut buf = Vec::new();
                // one extra byte tells an exact fit from an overflow
                let read = reader.take(limit as u64 + 1).read_to_end(&mut buf)?;

                if read > limit {
                    return Err(Error::BodyTooLarge(limit));
                }

                Ok(Bytes::from(buf))
            }
        }
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Reader(_) => f.write_str("Body::Reader"),
            Body::Once(bytes) => write!(f, "Body::Once({} bytes)", bytes.len()),
            Body::Empty => f.write_str("Body::Empty"),
        }
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Body::Once(bytes)
    }
}

impl From<&'static str> for Body {
    fn from(str: &'static str) -> Self {
        Body::Once(Bytes::from_static(str.as_bytes()))
    }
}

impl From<String> for Body {
    fn from(string: String) -> Self {
        Body::Once(Bytes::from(string))
    }
}

/// A reader that always fails, standing in for a host that
/// forbids reading its input stream.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct Unreadable;

#[cfg(test)]
impl Read for Unreadable {
    fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
        Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "input stream is not readable",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io;

    #[test]
    fn limit() {
        let body = Body::reader(io::Cursor::new(b"abcd".to_vec()));
        assert_eq!(body.read_all(4).unwrap(), "abcd");

        let body = Body::reader(io::Cursor::new(b"abcde".to_vec()));
        assert!(matches!(body.read_all(4), Err(Error::BodyTooLarge(4))));

        assert!(matches!(
            Body::from("abcde").read_all(4),
            Err(Error::BodyTooLarge(4))
        ));
    }

    #[test]
    fn unreadable() {
        let body = Body::reader(Unreadable);
        assert!(matches!(body.read_all(16), Err(Error::Io(_))));
    }
}

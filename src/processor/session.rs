use crate::handler::Handler;
use crate::http::{Cookie, Request, Response};
use crate::reject::Outcome;

use uuid::Uuid;

/// The opaque session identifier of the current request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A processor that tracks an opaque session id in a cookie.
///
/// The id is read from the request cookie named `key`. When absent, a
/// random UUID is minted and sent back as a cookie. Either way it is
/// stored as a [`SessionId`] in the response extensions.
#[derive(Debug, Clone)]
pub struct Session {
    key: String,
    path: Option<String>,
}

impl Session {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            path: None,
        }
    }

    /// Restrict the session cookie to `path`.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::new("sessionid")
    }
}

impl Handler for Session {
    fn call(&self, req: &mut Request, res: &mut Response) -> Outcome {
        let id = match req.cookies().value(&self.key) {
            Some(existing) => existing.to_owned(),
            None => {
                let minted = Uuid::new_v4().to_string();

                let mut cookie = Cookie::new(self.key.clone(), minted.clone());
                if let Some(path) = &self.path {
                    cookie = cookie.path(path.clone());
                }
                res.headers_mut().cookies_mut().insert(cookie);

                minted
            }
        };

        res.extensions_mut().insert(SessionId(id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Environ, Params};

    fn request(cookie: Option<&str>) -> Request {
        let mut environ = Environ::new("GET", "/");
        if let Some(value) = cookie {
            environ = environ.header("Cookie", value);
        }
        Request::new(environ, Default::default(), Params::new(), 1024).unwrap()
    }

    #[test]
    fn reuses_existing_id() {
        let mut req = request(Some("theme=dark; sid=abc123"));
        let mut res = Response::new();
        Session::new("sid").call(&mut req, &mut res).unwrap();

        assert_eq!(res.extensions().get::<SessionId>().map(SessionId::as_str), Some("abc123"));
        assert!(res.headers().cookies().is_empty());
    }

    #[test]
    fn mints_new_id() {
        let mut req = request(None);
        let mut res = Response::new();
        Session::new("sid").path("/app").call(&mut req, &mut res).unwrap();

        let id = res.extensions().get::<SessionId>().cloned().unwrap();
        assert_eq!(id.as_str().len(), 36);

        let cookie = res.headers().cookies().get("sid").unwrap();
        assert_eq!(cookie.value(), id.as_str());
        assert!(cookie.to_string().contains("Path=/app"));
    }
}

use crate::handler::Handler;
use crate::http::{Request, Response, Status};
use crate::reject::Outcome;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// A user name and password sent with `Authorization: Basic`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

/// Decode the basic authentication credentials of a request.
///
/// Returns `None` when the header is absent, uses another scheme, or
/// is not valid base64 text.
pub fn decode(req: &Request) -> Option<Credentials> {
    let header = req.headers().get("authorization")?;

    let mut parts = header.split_whitespace();
    let (scheme, coded) = (parts.next()?, parts.next()?);
    if scheme != "Basic" || parts.next().is_some() {
        return None;
    }

    let decoded = String::from_utf8(STANDARD.decode(coded).ok()?).ok()?;
    let (user, password) = decoded.split_once(':')?;

    Some(Credentials {
        user: user.to_owned(),
        password: password.to_owned(),
    })
}

/// Checks decoded credentials before they are attached to the request.
pub trait Login: Send + Sync + 'static {
    fn verify(&self, credentials: &Credentials) -> bool;
}

/// Accepts any credentials.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAll;

impl Login for AcceptAll {
    fn verify(&self, _: &Credentials) -> bool {
        true
    }
}

impl<F> Login for F
where
    F: Fn(&Credentials) -> bool + Send + Sync + 'static,
{
    fn verify(&self, credentials: &Credentials) -> bool {
        self(credentials)
    }
}

/// A processor for HTTP basic authentication.
///
/// Accepted credentials are set as the request's user and password.
/// When authentication is required, missing or rejected credentials
/// stop the chain with `401 Unauthorized` and a challenge for the realm.
#[derive(Debug)]
pub struct BasicAuth<L = AcceptAll> {
    realm: String,
    require: bool,
    login: L,
}

impl BasicAuth {
    pub fn new(realm: impl Into<String>) -> Self {
        Self {
            realm: realm.into(),
            require: true,
            login: AcceptAll,
        }
    }
}

impl<L> BasicAuth<L>
where
    L: Login,
{
    /// Let requests without valid credentials through unauthenticated.
    pub fn optional(mut self) -> Self {
        self.require = false;
        self
    }

    /// Check credentials with `login`.
    pub fn login<T: Login>(self, login: T) -> BasicAuth<T> {
        BasicAuth {
            realm: self.realm,
            require: self.require,
            login,
        }
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }
}

impl<L> Handler for BasicAuth<L>
where
    L: Login,
{
    fn call(&self, req: &mut Request, _: &mut Response) -> Outcome {
        match decode(req) {
            Some(credentials) if self.login.verify(&credentials) => {
                req.set_login(credentials.user, credentials.password);
                Ok(())
            }
            _ if self.require => Err(Status::unauthorized_basic(&self.realm).into()),
            _ => Ok(()),
        }
    }
}

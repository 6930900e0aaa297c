//! Request and response contexts and the types they are made of.

pub mod form;
pub mod header;

mod body;
mod method;
mod params;
mod request;
mod response;
mod status;

pub use body::Body;
pub use bytes::Bytes;
pub use header::{Cookie, CookieJar, Headers};
pub use method::Method;
pub use params::Params;
pub use request::{Captures, Environ, Key, Request};
pub use response::{Response, Serialized};
pub use status::{Status, StatusClass, StatusCode};

//! A small web resource framework.
//!
//! A [`Wireframe`] holds an ordered list of path registrations. Each
//! request is matched against them in order, its method is resolved to a
//! [`Handler`], and the handler runs against a shared [`Request`] and
//! [`Response`]. Handlers stop the chain by returning a [`Status`], which
//! then becomes the response.
//!
//! [`Request`]: http::Request
//! [`Response`]: http::Response
//! [`Status`]: http::Status

mod config;
mod dispatcher;
mod error;
mod handler;
mod reject;
mod router;
mod wireframe;

pub mod http;
pub mod processor;

pub use config::Config;
pub use dispatcher::{Dispatch, Invocable, MethodMap, Resource};
pub use error::Error;
pub use handler::{Chain, Handler};
pub use reject::{Fault, Outcome, Rejection};
pub use router::{IntoMatcher, Matched, Matcher, Refused};
pub use wireframe::Wireframe;

/// A type-erased error, as returned by cleanup actions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

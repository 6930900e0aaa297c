//! Reusable handlers that derive attributes from a request.
//!
//! Each processor is an ordinary [`Handler`](crate::Handler), meant to
//! run ahead of the page handler in a [`Chain`](crate::Chain):
//!
//! ```
//! use wireframe::http::{Request, Response};
//! use wireframe::processor::{BasicAuth, Session};
//! use wireframe::{chain, MethodMap, Outcome};
//!
//! fn account(req: &mut Request, res: &mut Response) -> Outcome {
//!     res.append(format!("hello {}", req.user().unwrap_or_default()));
//!     Ok(())
//! }
//!
//! let methods = MethodMap::new().get(chain![
//!     BasicAuth::new("accounts"),
//!     Session::new("sessionid"),
//!     account,
//! ]);
//! ```

mod basic_auth;
mod negotiate;
mod session;

pub use basic_auth::{decode, AcceptAll, BasicAuth, Credentials, Login};
pub use negotiate::{Negotiate, Negotiator};
pub use session::{Session, SessionId};

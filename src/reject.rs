use crate::http::{Status, StatusCode};
use crate::{BoxError, Error};

use std::backtrace::Backtrace;
use std::fmt;

/// The result of running a handler.
pub type Outcome = Result<(), Rejection>;

/// Why a handler chain stopped early.
///
/// A [`Status`] is a deliberate, terminal HTTP outcome. Anything else
/// is a [`Fault`]: a programming error or an I/O failure that was not
/// mapped to a status.
#[derive(Debug)]
pub enum Rejection {
    Status(Status),
    Fault(Fault),
}

impl Rejection {
    /// Create a fault rejection from any error.
    pub fn fault(err: impl Into<BoxError>) -> Self {
        Rejection::Fault(Fault::new(err))
    }

    pub fn as_status(&self) -> Option<&Status> {
        match self {
            Rejection::Status(status) => Some(status),
            Rejection::Fault(_) => None,
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Status(status) => fmt::Display::fmt(status, f),
            Rejection::Fault(fault) => fmt::Display::fmt(fault, f),
        }
    }
}

impl From<Status> for Rejection {
    fn from(status: Status) -> Self {
        Rejection::Status(status)
    }
}

impl From<StatusCode> for Rejection {
    fn from(code: StatusCode) -> Self {
        Rejection::Status(Status::new(code))
    }
}

impl From<Fault> for Rejection {
    fn from(fault: Fault) -> Self {
        Rejection::Fault(fault)
    }
}

impl From<Error> for Rejection {
    fn from(err: Error) -> Self {
        Rejection::fault(err)
    }
}

impl From<std::io::Error> for Rejection {
    fn from(err: std::io::Error) -> Self {
        Rejection::fault(err)
    }
}

/// An unexpected error raised by a handler, with the backtrace
/// captured where it was converted.
pub struct Fault {
    error: BoxError,
    backtrace: Backtrace,
}

impl Fault {
    pub fn new(err: impl Into<BoxError>) -> Self {
        Self {
            error: err.into(),
            backtrace: Backtrace::force_capture(),
        }
    }

    pub fn error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        &*self.error
    }

    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }

    /// The error message followed by the backtrace, for logs and
    /// debug pages.
    pub fn trace(&self) -> String {
        format!("{}\n\n{}", self.error, self.backtrace())
    }
}

impl fmt::Debug for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fault")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl std::error::Error for Fault {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.error)
    }
}

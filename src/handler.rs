use crate::http::{Request, Response};
use crate::reject::Outcome;

use std::sync::Arc;

/// Something that can handle a request by mutating a response.
///
/// Plain functions and closures with the right signature are handlers:
///
/// ```
/// use wireframe::http::{Request, Response};
/// use wireframe::Outcome;
///
/// fn hello(_: &mut Request, res: &mut Response) -> Outcome {
///     res.append("hello");
///     Ok(())
/// }
/// ```
///
/// Returning an `Err` stops the chain the handler runs in.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, req: &mut Request, res: &mut Response) -> Outcome;
}

impl<F> Handler for F
where
    F: Fn(&mut Request, &mut Response) -> Outcome + Send + Sync + 'static,
{
    fn call(&self, req: &mut Request, res: &mut Response) -> Outcome {
        self(req, res)
    }
}

impl Handler for Box<dyn Handler> {
    fn call(&self, req: &mut Request, res: &mut Response) -> Outcome {
        (**self).call(req, res)
    }
}

impl<H> Handler for Arc<H>
where
    H: Handler,
{
    fn call(&self, req: &mut Request, res: &mut Response) -> Outcome {
        (**self).call(req, res)
    }
}

/// Handlers run in sequence against the same request and response.
///
/// The first handler that returns an `Err` stops the chain; the rest
/// are not run.
#[derive(Default)]
pub struct Chain {
    handlers: Vec<Box<dyn Handler>>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler to the end of the chain.
    pub fn then(mut self, handler: impl Handler) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Handler for Chain {
    fn call(&self, req: &mut Request, res: &mut Response) -> Outcome {
        for handler in &self.handlers {
            handler.call(req, res)?;
        }

        Ok(())
    }
}

/// Build a [`Chain`] from a list of handlers.
///
/// ```
/// # use wireframe::http::{Request, Response};
/// # use wireframe::{chain, Outcome};
/// # fn auth(_: &mut Request, _: &mut Response) -> Outcome { Ok(()) }
/// # fn page(_: &mut Request, _: &mut Response) -> Outcome { Ok(()) }
/// let handler = chain![auth, page];
/// assert_eq!(handler.len(), 2);
/// ```
#[macro_export]
macro_rules! chain {
    ($($handler:expr),* $(,)?) => {
        $crate::Chain::new()$(.then($handler))*
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Environ, Params, Status};
    use crate::Rejection;

    fn request() -> Request {
        Request::new(Environ::new("GET", "/"), Default::default(), Params::new(), 1024).unwrap()
    }

    fn first(_: &mut Request, res: &mut Response) -> Outcome {
        res.append("1");
        Ok(())
    }

    fn stop(_: &mut Request, _: &mut Response) -> Outcome {
        Err(Status::forbidden("stop").into())
    }

    fn never(_: &mut Request, res: &mut Response) -> Outcome {
        res.append("never");
        Ok(())
    }

    #[test]
    fn chain_short_circuits() {
        let chain = chain![first, stop, never];
        let mut req = request();
        let mut res = Response::new();

        let err = chain.call(&mut req, &mut res).unwrap_err();
        assert!(matches!(err, Rejection::Status(ref s) if s.remark() == "stop"));
        assert_eq!(res.fragments().len(), 1);
    }

    #[test]
    fn chains_nest() {
        let inner = Chain::new().then(first).then(first);
        let outer = Chain::new().then(inner).then(first);
        let mut req = request();
        let mut res = Response::new();

        outer.call(&mut req, &mut res).unwrap();
        assert_eq!(res.serialize().body, "111");
    }
}

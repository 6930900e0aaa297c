use crate::handler::{Chain, Handler};
use crate::http::{Method, Request, Response, Status};
use crate::reject::Outcome;

use std::fmt;

/// A mapping from HTTP method name to the handler for it.
///
/// Keys are upper-cased and kept in insertion order, which is the order
/// they are listed in when a request's method is not allowed.
#[derive(Default)]
pub struct MethodMap {
    handlers: Vec<(String, Box<dyn Handler>)>,
}

macro_rules! insert_method {
    ($($name:ident => $method:literal),* $(,)?) => {$(
        #[doc = concat!("Handle `", $method, "` requests.")]
        pub fn $name(self, handler: impl Handler) -> Self {
            self.on($method, handler)
        }
    )*};
}

impl MethodMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle requests whose method is `method`, compared without case.
    ///
    /// Registering the same method twice replaces the earlier handler
    /// but keeps its position.
    pub fn on(mut self, method: &str, handler: impl Handler) -> Self {
        let method = method.to_ascii_uppercase();
        let handler: Box<dyn Handler> = Box::new(handler);

        match self.handlers.iter_mut().find(|(key, _)| *key == method) {
            Some(entry) => entry.1 = handler,
            None => self.handlers.push((method, handler)),
        }

        self
    }

    /// Handle requests for `method` with handlers run in sequence.
    pub fn chain(self, method: &str, chain: Chain) -> Self {
        self.on(method, chain)
    }

    insert_method! {
        get => "GET",
        post => "POST",
        put => "PUT",
        delete => "DELETE",
        head => "HEAD",
        options => "OPTIONS",
    }

    pub fn methods(&self) -> impl Iterator<Item = &str> {
        self.handlers.iter().map(|(key, _)| key.as_str())
    }

    /// Find the handler for an upper-case method name.
    pub fn resolve(&self, method: &str) -> Result<&dyn Handler, Status> {
        self.handlers
            .iter()
            .find(|(key, _)| key == method)
            .map(|(_, handler)| &**handler)
            .ok_or_else(|| Status::method_not_allowed(self.methods()))
    }
}

impl fmt::Debug for MethodMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.methods()).finish()
    }
}

/// An object that dispatches a request on its own.
pub trait Dispatch: Send + Sync + 'static {
    fn dispatch(&self, req: &mut Request, res: &mut Response) -> Outcome;
}

/// A handler registered as a dispatcher, called for every method.
pub struct Invocable<H>(pub H);

impl<H> Dispatch for Invocable<H>
where
    H: Handler,
{
    fn dispatch(&self, req: &mut Request, res: &mut Response) -> Outcome {
        self.0.call(req, res)
    }
}

type Operation<T> = Box<dyn Fn(&mut T, &mut Request, &mut Response) -> Outcome + Send + Sync>;

/// A dispatcher built from a factory and one optional operation per
/// HTTP method.
///
/// A fresh instance is made for every request that resolves to a
/// defined method. `OPTIONS` is always answered: unless overridden, with
/// `204 No Content` and an `Allow` header listing the defined methods.
///
/// ```
/// use wireframe::http::{Request, Response};
/// use wireframe::{Outcome, Resource};
///
/// #[derive(Default)]
/// struct Page {
///     visits: usize,
/// }
///
/// impl Page {
///     fn prepare(&mut self, _: &mut Request, _: &mut Response) -> Outcome {
///         self.visits += 1;
///         Ok(())
///     }
///
///     fn get(&mut self, _: &mut Request, res: &mut Response) -> Outcome {
///         res.append(format!("visits: {}", self.visits));
///         Ok(())
///     }
/// }
///
/// let page = Resource::new(Page::default)
///     .prepare(Page::prepare)
///     .get(Page::get);
///
/// assert_eq!(page.allowed(), ["GET", "OPTIONS"]);
/// ```
pub struct Resource<T> {
    factory: Box<dyn Fn() -> T + Send + Sync>,
    prepare: Option<Operation<T>>,
    table: [Option<Operation<T>>; 6],
}

macro_rules! define_method {
    ($($name:ident => $method:ident),* $(,)?) => {$(
        #[doc = concat!("Define the `", stringify!($method), "` operation.")]
        pub fn $name<F>(self, op: F) -> Self
        where
            F: Fn(&mut T, &mut Request, &mut Response) -> Outcome + Send + Sync + 'static,
        {
            self.define(Method::$method, op)
        }
    )*};
}

impl<T> Resource<T>
where
    T: 'static,
{
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            factory: Box::new(factory),
            prepare: None,
            table: Default::default(),
        }
    }

    /// Run `op` on the fresh instance before every resolved operation.
    pub fn prepare<F>(mut self, op: F) -> Self
    where
        F: Fn(&mut T, &mut Request, &mut Response) -> Outcome + Send + Sync + 'static,
    {
        self.prepare = Some(Box::new(op));
        self
    }

    /// Define the operation for `method`, replacing any earlier one.
    pub fn define<F>(mut self, method: Method, op: F) -> Self
    where
        F: Fn(&mut T, &mut Request, &mut Response) -> Outcome + Send + Sync + 'static,
    {
        self.table[method.index()] = Some(Box::new(op));
        self
    }

    define_method! {
        get => Get,
        post => Post,
        put => Put,
        delete => Delete,
        head => Head,
        options => Options,
    }

    /// The methods this resource answers, in `Allow` order.
    pub fn allowed(&self) -> Vec<&'static str> {
        Method::ALL
            .into_iter()
            .filter(|&method| method == Method::Options || self.table[method.index()].is_some())
            .map(Method::as_str)
            .collect()
    }

    fn run(&self, op: Option<&Operation<T>>, req: &mut Request, res: &mut Response) -> Outcome {
        let mut instance = (self.factory)();

        if let Some(prepare) = &self.prepare {
            prepare(&mut instance, req, res)?;
        }

        match op {
            Some(op) => op(&mut instance, req, res),
            None => Err(Status::no_content_allow(self.allowed()).into()),
        }
    }
}

impl<T> Dispatch for Resource<T>
where
    T: 'static,
{
    fn dispatch(&self, req: &mut Request, res: &mut Response) -> Outcome {
        match req.method() {
            Some(method) => match &self.table[method.index()] {
                Some(op) => self.run(Some(op), req, res),
                None if method == Method::Options => self.run(None, req, res),
                None => Err(Status::method_not_allowed(self.allowed()).into()),
            },
            None => Err(Status::method_not_allowed(self.allowed()).into()),
        }
    }
}

impl<T> fmt::Debug for Resource<T>
where
    T: 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("allowed", &self.allowed())
            .field("prepare", &self.prepare.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Environ, Params, StatusCode};
    use crate::Rejection;

    fn request(method: &str) -> Request {
        Request::new(Environ::new(method, "/"), Default::default(), Params::new(), 1024).unwrap()
    }

    fn status(outcome: Outcome) -> Status {
        match outcome {
            Err(Rejection::Status(status)) => status,
            other => panic!("expected a status, got {:?}", other),
        }
    }

    fn ok(_: &mut Request, res: &mut Response) -> Outcome {
        res.append("ok");
        Ok(())
    }

    #[test]
    fn method_map_lists_keys_in_order() {
        let map = MethodMap::new().on("post", ok).get(ok).on("Post", ok);
        assert_eq!(map.methods().collect::<Vec<_>>(), ["POST", "GET"]);

        let err = map.resolve("DELETE").err().unwrap();
        assert_eq!(err.code(), StatusCode::MethodNotAllowed);
        assert_eq!(err.headers().get("Allow"), Some("POST,GET"));
        assert!(map.resolve("GET").is_ok());
    }

    #[derive(Default)]
    struct Counter {
        prepared: bool,
    }

    impl Counter {
        fn prepare(&mut self, _: &mut Request, _: &mut Response) -> Outcome {
            self.prepared = true;
            Ok(())
        }

        fn get(&mut self, _: &mut Request, res: &mut Response) -> Outcome {
            res.append(if self.prepared { "prepared" } else { "raw" });
            Ok(())
        }
    }

    fn counter() -> Resource<Counter> {
        Resource::new(Counter::default)
            .prepare(Counter::prepare)
            .get(Counter::get)
    }

    #[test]
    fn resource_runs_prepare_first() {
        let mut req = request("GET");
        let mut res = Response::new();
        counter().dispatch(&mut req, &mut res).unwrap();
        assert_eq!(res.serialize().body, "prepared");
    }

    #[test]
    fn resource_rejects_undefined_methods() {
        let mut req = request("PUT");
        let mut res = Response::new();
        let status = status(counter().dispatch(&mut req, &mut res));
        assert_eq!(status.code(), StatusCode::MethodNotAllowed);
        assert_eq!(status.headers().get("allow"), Some("GET,OPTIONS"));
    }

    #[test]
    fn resource_default_options() {
        let mut req = request("OPTIONS");
        let mut res = Response::new();
        let status = status(counter().dispatch(&mut req, &mut res));
        assert_eq!(status.code(), StatusCode::NoContent);
        assert_eq!(status.headers().get("allow"), Some("GET,OPTIONS"));
    }

    #[test]
    fn resource_unknown_method() {
        let mut req = request("PATCH");
        let mut res = Response::new();
        let status = status(counter().dispatch(&mut req, &mut res));
        assert_eq!(status.code(), StatusCode::MethodNotAllowed);
    }

    #[test]
    fn invocable_handles_every_method() {
        let dispatcher = Invocable(ok);
        for method in ["GET", "PATCH"] {
            let mut req = request(method);
            let mut res = Response::new();
            dispatcher.dispatch(&mut req, &mut res).unwrap();
        }
    }
}

use crate::config::Config;
use crate::dispatcher::{Dispatch, MethodMap};
use crate::error::Error;
use crate::http::{Body, Bytes, Environ, Request, Response, Status, StatusCode};
use crate::reject::{Fault, Outcome, Rejection};
use crate::router::{IntoMatcher, Router};

use std::fmt;

/// What a registration hands a matched request to.
enum Target {
    Methods(MethodMap),
    Dispatcher(Box<dyn Dispatch>),
}

/// The application: an ordered list of path registrations and the
/// settings used to finalize responses.
///
/// ```
/// use wireframe::http::{Environ, Request, Response, StatusCode};
/// use wireframe::{MethodMap, Outcome, Wireframe};
///
/// fn item(req: &mut Request, res: &mut Response) -> Outcome {
///     res.append(format!("item {}", req.get(0)?));
///     Ok(())
/// }
///
/// let app = Wireframe::new()
///     .map(r"^/item/(\d+)$", MethodMap::new().get(item))
///     .unwrap();
///
/// let res = app.serve(Environ::new("GET", "/item/42")).unwrap();
/// assert_eq!(res.status(), StatusCode::Ok);
/// assert_eq!(res.serialize().body, "item 42");
/// ```
pub struct Wireframe {
    router: Router<Target>,
    config: Config,
}

/// What is known about the request when the chain stops.
struct Seen {
    method: String,
    human: bool,
}

impl Wireframe {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            router: Router::new(),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Register a method map for paths accepted by `matcher`.
    ///
    /// String matchers are compiled as regular expressions.
    pub fn map(mut self, matcher: impl IntoMatcher, methods: MethodMap) -> Result<Self, Error> {
        self.router
            .push(matcher.into_matcher()?, Target::Methods(methods));
        Ok(self)
    }

    /// Register a dispatcher object for paths accepted by `matcher`.
    pub fn dispatcher(
        mut self,
        matcher: impl IntoMatcher,
        dispatcher: impl Dispatch,
    ) -> Result<Self, Error> {
        self.router
            .push(matcher.into_matcher()?, Target::Dispatcher(Box::new(dispatcher)));
        Ok(self)
    }

    /// Dispatch a request and finalize the outcome into a response.
    ///
    /// Statuses raised along the way become the response. Any other
    /// error is logged and either rendered as a debug page for browsers
    /// or returned, for the host to answer with a generic 500.
    pub fn serve(&self, environ: Environ) -> Result<Response, Fault> {
        let path = environ.path().to_owned();
        tracing::debug!(path = %path, "request URL path");

        let mut seen = Seen {
            method: String::from("?"),
            human: environ.is_human(),
        };
        let mut res = Response::new();

        match self.run(environ, &mut res, &mut seen) {
            Ok(()) => Ok(res),
            Err(Rejection::Status(status)) => Ok(self.finish_status(status, &path, &seen, res)),
            Err(Rejection::Fault(fault)) => self.finish_fault(fault, &path, &seen, res),
        }
    }

    /// Serve an `http` crate request, returning the serialized response.
    ///
    /// Cleanup actions run after the response is serialized.
    pub fn handle(&self, req: http::Request<Body>) -> Result<http::Response<Bytes>, Fault> {
        self.serve(Environ::from_http(req)).map(Response::into_http)
    }

    fn run(&self, environ: Environ, res: &mut Response, seen: &mut Seen) -> Outcome {
        let (matched, target) = match self.router.find(environ.path()) {
            Some(found) => found,
            None => return Err(Status::not_found(format!("URL path: {}", environ.path())).into()),
        };

        let mut req = Request::new(
            environ,
            matched.values,
            matched.named,
            self.config.limit(),
        )
        .map_err(|err| Status::bad_request(err.to_string()))?;

        seen.method = req.http_method().to_owned();
        tracing::debug!(method = %seen.method, "request HTTP method");

        match target {
            Target::Methods(methods) => methods.resolve(req.http_method())?.call(&mut req, res),
            Target::Dispatcher(dispatcher) => dispatcher.dispatch(&mut req, res),
        }
    }

    fn finish_status(&self, status: Status, path: &str, seen: &Seen, mut working: Response) -> Response {
        if status.is_unauthorized() {
            let mut res = Response::from(status);
            res.adopt_cleanup(&mut working);
            return res;
        }

        let mut res = if status.is_error() {
            tracing::debug!(
                path = %path,
                method = %seen.method,
                status = %status,
                remark = status.remark(),
                "HTTP error"
            );

            if self.config.shows_error_pages() && seen.human {
                let title = format!("Error: {}", status);
                human_page(status.code(), &title, status.remark())
            } else {
                Response::from(status)
            }
        } else {
            tracing::debug!(path = %path, method = %seen.method, status = %status, "HTTP status");
            Response::from(status)
        };

        res.adopt_cleanup(&mut working);
        res
    }

    fn finish_fault(
        &self,
        fault: Fault,
        path: &str,
        seen: &Seen,
        mut working: Response,
    ) -> Result<Response, Fault> {
        let trace = fault.trace();
        tracing::error!(path = %path, method = %seen.method, error = %fault, "{}", trace);

        if self.config.shows_debug_pages() && seen.human {
            let mut res = human_page(StatusCode::InternalServerError, "Internal error", &trace);
            res.adopt_cleanup(&mut working);
            Ok(res)
        } else {
            // dropping the working response still runs its cleanup
            Err(fault)
        }
    }
}

impl Default for Wireframe {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Wireframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wireframe")
            .field("routes", &self.router.len())
            .field("config", &self.config)
            .finish()
    }
}

fn human_page(code: StatusCode, title: &str, remark: &str) -> Response {
    let mut res = Response::new();
    res.set_status(code);
    res.set_content_type(&mime::TEXT_HTML);

    let title = escape(title);
    res.append(format!(
        "<html>\n<head>\n<title>{title}</title>\n</head>\n<body>\n<h1>{title}</h1>\n<pre>{}</pre>\n</body>\n</html>",
        escape(remark),
    ));
    res
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape(r#"<a href="x">&</a>"#), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
    }

    #[test]
    fn human_page_keeps_status() {
        let res = human_page(StatusCode::NotFound, "Error: 404 Not Found", "<missing>");
        assert_eq!(res.status(), StatusCode::NotFound);
        assert_eq!(res.header("content-type"), Some("text/html"));

        let body = res.serialize().body;
        let body = std::str::from_utf8(&body).unwrap();
        assert!(body.contains("<title>Error: 404 Not Found</title>"));
        assert!(body.contains("<pre>&lt;missing&gt;</pre>"));
    }

    #[test]
    fn unmatched_path() {
        let res = Wireframe::new().serve(Environ::new("GET", "/nowhere")).unwrap();
        assert_eq!(res.status(), StatusCode::NotFound);
        assert_eq!(res.remark(), "URL path: /nowhere");
    }
}

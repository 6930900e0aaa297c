use crate::handler::Handler;
use crate::http::{Request, Response, Status};
use crate::reject::Outcome;

use regex::Regex;

/// A processor for server-side content negotiation.
///
/// Parses the request's `Accept` header and stores the resulting
/// [`Negotiator`] in the response extensions for later handlers.
#[derive(Debug, Default, Clone, Copy)]
pub struct Negotiate;

impl Handler for Negotiate {
    fn call(&self, req: &mut Request, res: &mut Response) -> Outcome {
        let negotiator = Negotiator::parse(req.headers().get("accept").unwrap_or_default());
        res.extensions_mut().insert(negotiator);
        Ok(())
    }
}

/// The content types a client accepts, best first.
#[derive(Debug, Clone, Default)]
pub struct Negotiator {
    accept: Vec<(f32, Regex)>,
}

impl Negotiator {
    /// Parse an `Accept` header value.
    ///
    /// Entries are ordered by descending quality; entries of equal
    /// quality keep their order. A `*` in a type matches any run of
    /// non-whitespace characters.
    pub fn parse(header: &str) -> Self {
        let mut accept = header
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .filter_map(|item| {
                let mut params = item.split(';');
                let content_type = params.next()?.trim();
                let quality = params
                    .map(|param| param.replace(' ', ""))
                    .find_map(|param| param.strip_prefix("q=").map(str::to_owned))
                    .and_then(|q| q.parse::<f32>().ok())
                    .unwrap_or(1.0);

                let pattern = regex::escape(content_type).replace(r"\*", r"\S*?");
                Regex::new(&format!("^{}$", pattern))
                    .ok()
                    .map(|regex| (quality, regex))
            })
            .collect::<Vec<_>>();

        accept.sort_by(|a, b| b.0.total_cmp(&a.0));
        Self { accept }
    }

    /// Pick the best of the `available` content types.
    ///
    /// Without an `Accept` header the first available type is chosen.
    /// Fails with `406 Not Acceptable` if nothing can be chosen.
    pub fn select<'a>(&self, available: &[&'a str]) -> Result<&'a str, Status> {
        let selected = if self.accept.is_empty() {
            available.first().copied()
        } else {
            self.accept.iter().find_map(|(_, regex)| {
                available
                    .iter()
                    .copied()
                    .find(|content_type| regex.is_match(content_type))
            })
        };

        selected.ok_or_else(|| Status::not_acceptable(available.join(", ")))
    }

    /// Is `content_type` acceptable to the client?
    ///
    /// Anything is acceptable when no `Accept` header was sent.
    pub fn is_acceptable(&self, content_type: &str) -> bool {
        self.accept.is_empty()
            || self
                .accept
                .iter()
                .any(|(_, regex)| regex.is_match(content_type))
    }

    /// Fail with `406 Not Acceptable` unless `content_type` is acceptable.
    pub fn check(&self, content_type: &str) -> Result<(), Status> {
        if self.is_acceptable(content_type) {
            Ok(())
        } else {
            Err(Status::not_acceptable(content_type))
        }
    }

    /// The accepted patterns with their quality, best first.
    pub fn preferences(&self) -> impl Iterator<Item = (f32, &str)> {
        self.accept.iter().map(|(q, regex)| (*q, regex.as_str()))
    }
}

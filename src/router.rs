use crate::error::Error;
use crate::http::{Captures, Params};

use std::fmt;

use matchit::Node;
use regex::Regex;

type Predicate = Box<dyn Fn(&str) -> Result<Captures, Refused> + Send + Sync>;

/// Decides whether a URL path belongs to a registration, and extracts
/// values from it when it does.
pub enum Matcher {
    /// A user function. Returning empty captures or any error means
    /// "no match".
    Predicate(Predicate),
    /// A regular expression anchored at the start of the path.
    ///
    /// Unnamed groups become the unnamed captures and named groups
    /// the named captures.
    Pattern(Regex),
    /// A route template such as `/users/:id`, whose parameters become
    /// the named captures.
    Route(Node<()>),
}

/// The values a matcher extracted from a path.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Matched {
    pub values: Captures,
    pub named: Params,
}

impl Matcher {
    /// Match with a function of the path.
    ///
    /// ```
    /// use wireframe::{Matcher, Refused};
    ///
    /// let numeric = Matcher::predicate(|path: &str| -> Result<Vec<String>, Refused> {
    ///     let id: u32 = path.trim_start_matches('/').parse()?;
    ///     Ok(vec![id.to_string()])
    /// });
    ///
    /// assert!(numeric.matches("/42").is_some());
    /// assert!(numeric.matches("/about").is_none());
    /// ```
    pub fn predicate<F, C>(f: F) -> Self
    where
        F: Fn(&str) -> Result<C, Refused> + Send + Sync + 'static,
        C: Into<Captures>,
    {
        Matcher::Predicate(Box::new(move |path| f(path).map(Into::into)))
    }

    /// Compile a regular expression matcher.
    pub fn pattern(pattern: &str) -> Result<Self, Error> {
        Ok(Matcher::Pattern(Regex::new(pattern)?))
    }

    /// Build a route template matcher.
    pub fn route(template: &str) -> Result<Self, Error> {
        let mut node = Node::default();
        node.insert(template, ())?;
        Ok(Matcher::Route(node))
    }

    /// Try to match a URL path.
    pub fn matches(&self, path: &str) -> Option<Matched> {
        match self {
            Matcher::Predicate(f) => match f(path) {
                Ok(values) if !values.is_empty() => Some(Matched {
                    values,
                    named: Params::new(),
                }),
                _ => None,
            },
            Matcher::Pattern(regex) => {
                let caps = regex.captures(path)?;
                // a match anywhere else in the path does not count
                if caps.get(0)?.start() != 0 {
                    return None;
                }

                let mut values = Vec::new();
                let mut named = Params::new();

                for (i, name) in regex.capture_names().enumerate().skip(1) {
                    let group = caps.get(i).map(|m| m.as_str());
                    match name {
                        Some(name) => {
                            if let Some(value) = group {
                                named.push(name, value);
                            }
                        }
                        // a group that took no part in the match reads as ""
                        None => values.push(group.unwrap_or_default().to_owned()),
                    }
                }

                Some(Matched {
                    values: Captures::Seq(values),
                    named,
                })
            }
            Matcher::Route(node) => {
                let matched = node.at(path).ok()?;
                let named = matched
                    .params
                    .iter()
                    .map(|(k, v)| (k.to_owned(), v.to_owned()))
                    .collect::<Vec<_>>();

                Some(Matched {
                    values: Captures::default(),
                    named: named.into(),
                })
            }
        }
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Predicate(_) => f.write_str("Predicate(..)"),
            Matcher::Pattern(regex) => f.debug_tuple("Pattern").field(&regex.as_str()).finish(),
            Matcher::Route(_) => f.write_str("Route(..)"),
        }
    }
}

impl From<Regex> for Matcher {
    fn from(regex: Regex) -> Self {
        Matcher::Pattern(regex)
    }
}

/// Conversion into a [`Matcher`] at registration time.
///
/// Strings are compiled as regular expressions.
pub trait IntoMatcher {
    fn into_matcher(self) -> Result<Matcher, Error>;
}

impl IntoMatcher for Matcher {
    fn into_matcher(self) -> Result<Matcher, Error> {
        Ok(self)
    }
}

impl IntoMatcher for Regex {
    fn into_matcher(self) -> Result<Matcher, Error> {
        Ok(Matcher::Pattern(self))
    }
}

impl IntoMatcher for &str {
    fn into_matcher(self) -> Result<Matcher, Error> {
        Matcher::pattern(self)
    }
}

impl IntoMatcher for String {
    fn into_matcher(self) -> Result<Matcher, Error> {
        Matcher::pattern(&self)
    }
}

/// A predicate matcher's "no match".
///
/// Any error converts into it, so predicates can use `?` freely.
#[derive(Debug, Default)]
pub struct Refused(Option<String>);

impl Refused {
    pub fn new() -> Self {
        Self::default()
    }
}

impl fmt::Display for Refused {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(reason) => write!(f, "path refused: {}", reason),
            None => f.write_str("path refused"),
        }
    }
}

impl<E> From<E> for Refused
where
    E: std::error::Error,
{
    fn from(err: E) -> Self {
        Refused(Some(err.to_string()))
    }
}

/// Registrations in the order they were added; the first match wins.
pub(crate) struct Router<T> {
    routes: Vec<(Matcher, T)>,
}

impl<T> Router<T> {
    pub(crate) fn new() -> Self {
        Self { routes: Vec::new() }
    }

    pub(crate) fn push(&mut self, matcher: Matcher, target: T) {
        self.routes.push((matcher, target));
    }

    pub(crate) fn len(&self) -> usize {
        self.routes.len()
    }

    pub(crate) fn find(&self, path: &str) -> Option<(Matched, &T)> {
        self.routes
            .iter()
            .find_map(|(matcher, target)| matcher.matches(path).map(|m| (m, target)))
    }
}

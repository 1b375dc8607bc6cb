//! Route storage and lookup.

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;

use crate::parser::Method;
use crate::routing::pattern::{DynamicPattern, PathPattern};
use crate::server::{Error, Parameters, Responder};

/// A registered dynamic route for one method.
#[derive(Clone)]
pub struct Route {
    /// The method this route answers.
    pub method: Method,
    /// The path pattern as registered.
    pub pattern: String,
    /// The responder invoked on a match.
    pub responder: Arc<dyn Responder>,
}

struct DynamicEntry {
    pattern: DynamicPattern,
    routes: HashMap<Method, Route>,
}

/// Responders keyed by method and path.
///
/// Exact paths are looked up in a map before dynamic patterns are scanned.
/// Dynamic patterns are tried in registration order and the first one that
/// matches the path and has a route for the method wins, so overlapping
/// patterns must be registered most specific first.
#[derive(Default)]
pub struct RouteRegistry {
    exact: HashMap<String, HashMap<Method, Arc<dyn Responder>>>,
    dynamic: Vec<DynamicEntry>,
    default: Option<Arc<dyn Responder>>,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `responder` for every method in `methods` at `path`.
    ///
    /// Empty `methods` or an empty `path` registers nothing. Registering the
    /// same method and path again replaces the earlier responder; a dynamic
    /// pattern keeps the priority of its first registration.
    pub fn add(&mut self, methods: &[Method], path: &str, responder: Arc<dyn Responder>) -> Result<(), Error> {
        if methods.is_empty() || path.is_empty() {
            debug!("Ignoring route registration without methods or path");
            return Ok(());
        }

        match PathPattern::compile(path)? {
            PathPattern::Exact(path) => {
                let by_method = self.exact.entry(path).or_default();
                for method in methods {
                    by_method.insert(*method, Arc::clone(&responder));
                }
            }
            PathPattern::Dynamic(pattern) => {
                let index = match self.dynamic.iter().position(|e| e.pattern.source() == path) {
                    Some(index) => index,
                    None => {
                        self.dynamic.push(DynamicEntry {
                            pattern,
                            routes: HashMap::new(),
                        });
                        self.dynamic.len() - 1
                    }
                };
                let entry = &mut self.dynamic[index];
                for method in methods {
                    entry.routes.insert(*method, Route {
                        method: *method,
                        pattern: path.to_string(),
                        responder: Arc::clone(&responder),
                    });
                }
            }
        }

        Ok(())
    }

    /// Set the responder used when nothing else matches.
    pub fn set_default(&mut self, responder: Option<Arc<dyn Responder>>) {
        self.default = responder;
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Find the responder for `method` and `path`.
    ///
    /// An exact path registered only for other methods is a configuration
    /// error and does not fall through to dynamic routes or the default.
    pub fn resolve(&self, method: Method, path: &str) -> Result<(Arc<dyn Responder>, Parameters), Error> {
        if let Some(by_method) = self.exact.get(path) {
            return match by_method.get(&method) {
                Some(responder) => Ok((Arc::clone(responder), Parameters::new())),
                None => Err(Error::MethodNotRegistered(method, path.to_string())),
            };
        }

        for entry in &self.dynamic {
            let Some(route) = entry.routes.get(&method) else {
                continue;
            };
            if let Some(parameters) = entry.pattern.captures(path) {
                return Ok((Arc::clone(&route.responder), parameters));
            }
        }

        match &self.default {
            Some(responder) => Ok((Arc::clone(responder), Parameters::new())),
            None => Err(Error::RouteNotFound(method, path.to_string())),
        }
    }

    /// Every registered (method, path) pair: exact paths first, then dynamic
    /// patterns in priority order.
    pub fn routes(&self) -> Vec<(Method, String)> {
        let mut exact: Vec<(Method, String)> = self
            .exact
            .iter()
            .flat_map(|(path, by_method)| by_method.keys().map(move |m| (*m, path.clone())))
            .collect();
        exact.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));

        let dynamic = self.dynamic.iter().flat_map(|entry| {
            let mut methods: Vec<&Route> = entry.routes.values().collect();
            methods.sort_by_key(|route| route.method);
            methods.into_iter().map(|route| (route.method, route.pattern.clone()))
        });

        exact.into_iter().chain(dynamic).collect()
    }

    /// Number of (method, path) registrations.
    pub fn len(&self) -> usize {
        self.exact.values().map(HashMap::len).sum::<usize>()
            + self.dynamic.iter().map(|e| e.routes.len()).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

//! Per-method middleware run before dispatch.

use std::collections::HashMap;
use std::sync::Arc;

use crate::parser::{HttpRequest, Method};
use crate::server::HttpResponse;

/// What a middleware step wants to happen next.
#[derive(Debug)]
pub enum Flow {
    /// Hand the response to the next step, then to dispatch.
    Continue(HttpResponse),
    /// Stop here and send this response without dispatching.
    Halt(HttpResponse),
}

/// A middleware step. It may mutate the in-progress response and decides
/// whether dispatch proceeds.
pub type MiddlewareFn = Arc<dyn Fn(&HttpRequest, HttpResponse) -> Flow + Send + Sync>;

/// Ordered middleware steps per method.
#[derive(Default, Clone)]
pub struct MiddlewarePipeline {
    steps: HashMap<Method, Vec<MiddlewareFn>>,
}

impl MiddlewarePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `step` to the pipeline of every listed method.
    pub fn use_step(&mut self, methods: &[Method], step: MiddlewareFn) {
        for method in methods {
            self.steps.entry(*method).or_default().push(Arc::clone(&step));
        }
    }

    /// Run the steps registered for the request's method in registration
    /// order.
    ///
    /// Returns the resulting response and whether dispatch should follow.
    /// The first step that halts ends the run.
    pub fn run(&self, request: &HttpRequest, mut response: HttpResponse) -> (HttpResponse, bool) {
        let Some(steps) = self.steps.get(&request.method) else {
            return (response, true);
        };

        for step in steps {
            match step(request, response) {
                Flow::Continue(next) => response = next,
                Flow::Halt(last) => return (last, false),
            }
        }

        (response, true)
    }

    /// Number of steps registered for `method`.
    pub fn len(&self, method: Method) -> usize {
        self.steps.get(&method).map_or(0, Vec::len)
    }
}

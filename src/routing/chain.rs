//! Filter chain execution.
//!
//! Filters run strictly in the order dispatch produced them. A filter that
//! returns [`FilterResult::Stop`] ends the chain: no later filter runs and
//! the endpoint is skipped. Later stages only see what earlier filters put
//! into the [`RequestContext`].

use crate::http::{Request, RequestContext, Response};
use crate::routing::dispatch::Route;

/// Outcome of one filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterResult {
    /// Proceed to the next filter, or to the endpoint.
    Continue,
    /// Terminate the chain; whatever the filter wrote is final.
    Stop,
}

/// A non-terminal request handler.
pub trait Filter: Send + Sync {
    fn filter(&self, req: &Request, res: &mut Response, ctx: &mut RequestContext) -> FilterResult;
}

impl<F> Filter for F
where
    F: Fn(&Request, &mut Response, &mut RequestContext) -> FilterResult + Send + Sync,
{
    fn filter(&self, req: &Request, res: &mut Response, ctx: &mut RequestContext) -> FilterResult {
        self(req, res, ctx)
    }
}

/// A terminal request handler; responsible for writing the response.
pub trait Endpoint: Send + Sync {
    fn handle(&self, req: &Request, res: &mut Response, ctx: &mut RequestContext);
}

impl<F> Endpoint for F
where
    F: Fn(&Request, &mut Response, &mut RequestContext) + Send + Sync,
{
    fn handle(&self, req: &Request, res: &mut Response, ctx: &mut RequestContext) {
        self(req, res, ctx)
    }
}

/// How a chain finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainOutcome {
    /// Every filter continued and the endpoint ran.
    Completed,
    /// The filter at this chain position stopped the request.
    Stopped { filter_index: usize },
}

impl Route<'_> {
    /// Run the filters in order, then the endpoint unless a filter stopped.
    pub fn execute(&self, req: &Request, res: &mut Response, ctx: &mut RequestContext) -> ChainOutcome {
        for (index, binding) in self.filters.iter().enumerate() {
            if binding.handler.filter(req, res, ctx) == FilterResult::Stop {
                tracing::debug!(
                    path = %req.path(),
                    filter = %binding.pattern(),
                    position = index,
                    "Filter stopped request"
                );
                return ChainOutcome::Stopped { filter_index: index };
            }
        }
        self.endpoint.handler.handle(req, res, ctx);
        ChainOutcome::Completed
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::http::{Method, StatusCode};

    use super::*;
    use crate::routing::{RouteRegistry, Resolution};

    type Log = Arc<Mutex<Vec<&'static str>>>;

    fn recording(log: &Log, name: &'static str, result: FilterResult)
        -> impl Fn(&Request, &mut Response, &mut RequestContext) -> FilterResult + Send + Sync + 'static
    {
        let log = Arc::clone(log);
        move |_req, _res, _ctx| {
            log.lock().unwrap().push(name);
            result
        }
    }

    fn run(registry: &RouteRegistry, path: &str) -> (ChainOutcome, Response) {
        let req = Request::new(Method::GET, path);
        let mut res = Response::new();
        let mut ctx = RequestContext::new();
        match registry.table().resolve(req.method(), req.path()) {
            Resolution::Found(route) => (route.execute(&req, &mut res, &mut ctx), res),
            Resolution::NotFound => panic!("no route for {}", path),
        }
    }

    #[test]
    fn filters_run_in_registration_order_before_endpoint() {
        let log: Log = Arc::default();
        let mut registry = RouteRegistry::new();
        let endpoint_log = Arc::clone(&log);
        registry
            .path("/a", |p| {
                p.filter(".*", recording(&log, "first", FilterResult::Continue))?;
                p.filter(".*", recording(&log, "second", FilterResult::Continue))?;
                p.end_point(Method::GET, "/b", move |_req, res, _ctx| {
                    endpoint_log.lock().unwrap().push("endpoint");
                    res.ok("done");
                })
            })
            .unwrap();

        let (outcome, res) = run(&registry, "/a/b");
        assert_eq!(outcome, ChainOutcome::Completed);
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "endpoint"]);
    }

    #[test]
    fn stop_skips_later_filters_and_endpoint() {
        let log: Log = Arc::default();
        let mut registry = RouteRegistry::new();
        let endpoint_log = Arc::clone(&log);
        registry
            .path("/a", |p| {
                p.filter(".*", recording(&log, "first", FilterResult::Stop))?;
                p.filter(".*", recording(&log, "second", FilterResult::Continue))?;
                p.end_point(Method::GET, "/b", move |_req, _res, _ctx| {
                    endpoint_log.lock().unwrap().push("endpoint");
                })
            })
            .unwrap();

        let (outcome, _res) = run(&registry, "/a/b");
        assert_eq!(outcome, ChainOutcome::Stopped { filter_index: 0 });
        assert_eq!(*log.lock().unwrap(), vec!["first"]);
    }

    #[test]
    fn outer_node_filters_run_before_inner() {
        let log: Log = Arc::default();
        let mut registry = RouteRegistry::new();
        registry
            .path("/outer", |p| {
                p.path("/inner", |p| {
                    p.filter(".*", recording(&log, "inner", FilterResult::Continue))?;
                    p.end_point(Method::GET, "/x", |_req, res, _ctx| res.ok("x"))
                })?;
                p.filter(".*", recording(&log, "outer", FilterResult::Continue))
            })
            .unwrap();
        registry
            .filter(".*", recording(&log, "root", FilterResult::Continue))
            .unwrap();

        run(&registry, "/outer/inner/x");
        assert_eq!(*log.lock().unwrap(), vec!["root", "outer", "inner"]);
    }

    #[test]
    fn attributes_flow_from_filter_to_endpoint() {
        let mut registry = RouteRegistry::new();
        registry
            .path("/api", |p| {
                p.filter(".*", |_req: &Request, _res: &mut Response, ctx: &mut RequestContext| {
                    ctx.set_attribute("user", "fred@example.com".to_string());
                    FilterResult::Continue
                })?;
                p.end_point(Method::GET, "/me", |_req, res, ctx| {
                    let user = ctx.attribute::<String>("user").cloned().unwrap_or_default();
                    res.ok(format!("User Is logged in: {}", user));
                })
            })
            .unwrap();

        let (_, res) = run(&registry, "/api/me");
        assert_eq!(res.body_text(), "User Is logged in: fred@example.com");
    }
}

//! Conditional routes contributed to the operator's management API.
//!
//! # Design Decisions
//! - Route composition is a pure function of module presence
//! - The list is complete before the operator launches; nothing is added afterwards

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::modules::ContinuityChecker;

/// Path polled by the readiness prober, served by the operator.
pub const HEALTHZ_PATH: &str = "/healthz";

/// Path resetting the continuity checker.
pub const RESET_CC_PATH: &str = "/v1/reset_cc";

/// Adds one route to the operator's HTTP router while the operator builds it.
pub type HttpOption = Box<dyn FnOnce(Router) -> Router + Send>;

/// Optional modules that contribute routes.
#[derive(Clone, Default)]
pub struct Features {
    pub continuity_checker: Option<Arc<dyn ContinuityChecker>>,
}

/// Ordered list of route registrations for the present features.
pub fn http_options(features: &Features) -> Vec<HttpOption> {
    let mut options: Vec<HttpOption> = Vec::new();

    if let Some(checker) = &features.continuity_checker {
        options.push(reset_continuity_checker(checker.clone()));
    }

    options
}

/// Apply registrations in order. Used by operators while building their router.
pub fn apply(router: Router, options: Vec<HttpOption>) -> Router {
    options.into_iter().fold(router, |router, option| option(router))
}

fn reset_continuity_checker(checker: Arc<dyn ContinuityChecker>) -> HttpOption {
    Box::new(move |router: Router| {
        router.route(
            RESET_CC_PATH,
            get(move || {
                let checker = checker.clone();
                async move {
                    checker.reset();
                    tracing::info!("Continuity checker reset");
                    "ok"
                }
            }),
        )
    })
}

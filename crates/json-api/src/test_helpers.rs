//! Test helpers.

use std::sync::Arc;

use salvo::{affix_state::inject, prelude::*};

use eshop_app::{context::AppContext, domain::catalog::MockCatalogService};

use crate::state::State;

pub(crate) fn state_with_catalog(catalog: MockCatalogService) -> Arc<State> {
    State::from_app_context(AppContext {
        catalog: Arc::new(catalog),
    })
}

pub(crate) fn catalog_service(catalog: MockCatalogService, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state_with_catalog(catalog)))
            .push(route),
    )
}

/// Service over a fresh process-local catalog.
pub(crate) fn in_memory_service(router: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(State::from_app_context(AppContext::in_memory())))
            .push(router),
    )
}

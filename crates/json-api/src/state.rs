//! State

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use eshop_app::context::AppContext;

use crate::config::server::IMPORT_MAX_BODY_BYTES;

/// Shared request state injected into every route.
#[derive(Clone)]
pub(crate) struct State {
    pub(crate) app: AppContext,
    pub(crate) import_max_body_bytes: usize,
}

impl State {
    #[must_use]
    pub(crate) fn new(app: AppContext) -> Self {
        Self {
            app,
            import_max_body_bytes: IMPORT_MAX_BODY_BYTES,
        }
    }

    #[must_use]
    pub(crate) fn with_import_max_body_bytes(mut self, limit: usize) -> Self {
        self.import_max_body_bytes = limit;
        self
    }

    #[must_use]
    pub(crate) fn from_app_context(app: AppContext) -> Arc<Self> {
        Arc::new(Self::new(app))
    }
}

impl Debug for State {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("State")
            .field("import_max_body_bytes", &self.import_max_body_bytes)
            .finish_non_exhaustive()
    }
}

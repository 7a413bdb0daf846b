//! App Router

use salvo::Router;

use crate::catalog;

/// Catalog routes. Trailing slashes are optional on every path.
pub(crate) fn app_router() -> Router {
    Router::new()
        .push(Router::with_path("import").post(catalog::import::handler))
        .push(
            Router::with_path("detail/{entity}")
                .get(catalog::index::handler)
                .push(Router::with_path("{id:num}").get(catalog::get::handler)),
        )
}

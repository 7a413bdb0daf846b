//! Depot helper extensions.

use std::any::{Any, type_name};

use salvo::prelude::{Depot, StatusError};
use tracing::error;

/// Typed depot lookups that fail as HTTP errors.
pub(crate) trait DepotExt {
    /// Fetch an injected value; a missing one is a wiring fault, reported as a 500.
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError>;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError> {
        self.obtain::<T>().map_err(|_missing| {
            error!("{} was not injected into the depot", type_name::<T>());

            StatusError::internal_server_error()
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use salvo::{prelude::*, test::TestClient};

    use crate::state::State;

    use super::*;

    #[handler]
    async fn needs_state(depot: &mut Depot) -> Result<&'static str, StatusError> {
        depot.obtain_or_500::<Arc<State>>()?;

        Ok("ok")
    }

    #[tokio::test]
    async fn missing_state_is_a_server_error() {
        let service = Service::new(Router::with_path("state").get(needs_state));

        let res = TestClient::get("http://example.com/state").send(&service).await;

        assert_eq!(res.status_code, Some(StatusCode::INTERNAL_SERVER_ERROR));
    }
}

//! Remote trace context carried on request headers.

use opentelemetry::{
    Context, global,
    propagation::{Extractor, TextMapPropagator},
    trace::TraceContextExt as _,
};
use salvo::http::{HeaderMap, HeaderName};

/// Parent context from the installed propagator, when the headers carry a valid one.
pub(super) fn extract_parent_context(headers: &HeaderMap) -> Option<Context> {
    global::get_text_map_propagator(|propagator| remote_context(propagator, headers))
}

fn remote_context(propagator: &dyn TextMapPropagator, headers: &HeaderMap) -> Option<Context> {
    // Empty base context: no fallback to the in-process span
    let context = propagator.extract_with_context(&Context::new(), &RequestHeaders(headers));
    let valid = context.span().span_context().is_valid();

    valid.then_some(context)
}

#[derive(Debug)]
struct RequestHeaders<'a>(&'a HeaderMap);

impl Extractor for RequestHeaders<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|value| value.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(HeaderName::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use opentelemetry_sdk::propagation::TraceContextPropagator;
    use salvo::http::HeaderValue;

    use super::*;

    const TRACEPARENT: &str = "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01";

    fn headers(traceparent: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert("traceparent", HeaderValue::from_static(traceparent));

        headers
    }

    #[test]
    fn valid_traceparent_becomes_the_parent() {
        let context = remote_context(&TraceContextPropagator::new(), &headers(TRACEPARENT));

        let trace_id = context.map(|context| context.span().span_context().trace_id().to_string());

        assert_eq!(
            trace_id.as_deref(),
            Some("4bf92f3577b34da6a3ce929d0e0e4736")
        );
    }

    #[test]
    fn missing_or_malformed_traceparent_is_ignored() {
        let propagator = TraceContextPropagator::new();

        assert!(remote_context(&propagator, &HeaderMap::new()).is_none());
        assert!(remote_context(&propagator, &headers("00-not-a-trace-01")).is_none());
    }
}

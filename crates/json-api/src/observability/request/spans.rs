//! HTTP span helpers.

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct RequestSpanName {
    pub(super) otel_path: String,
    pub(super) otel_span_name: String,
}

pub(super) fn request_span_name(method: &str, path: &str) -> RequestSpanName {
    let otel_path = normalise_path_for_span_name(path);
    let otel_span_name = format!("{method} {otel_path}");

    RequestSpanName {
        otel_path,
        otel_span_name,
    }
}

/// Collapse numeric id segments so detail lookups share one route label.
fn normalise_path_for_span_name(path: &str) -> String {
    let trimmed = path.trim_matches('/');

    if trimmed.is_empty() {
        return "/".to_owned();
    }

    let segments: Vec<&str> = trimmed
        .split('/')
        .map(|segment| {
            if !segment.is_empty() && segment.bytes().all(|byte| byte.is_ascii_digit()) {
                "{id}"
            } else {
                segment
            }
        })
        .collect();

    format!("/{}", segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_segments_become_placeholders() {
        let names = request_span_name("GET", "/detail/product/42/");

        assert_eq!(names.otel_path, "/detail/product/{id}");
        assert_eq!(names.otel_span_name, "GET /detail/product/{id}");
    }

    #[test]
    fn trailing_slash_is_ignored() {
        assert_eq!(
            request_span_name("POST", "/import/"),
            request_span_name("POST", "/import")
        );
    }

    #[test]
    fn root_path_is_kept() {
        assert_eq!(request_span_name("GET", "/").otel_path, "/");
    }
}

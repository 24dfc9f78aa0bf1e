use lambda_http::{Request, RequestExt};
use uuid::Uuid;

/// Method and path with the `/api` stage prefix stripped.
pub(crate) fn route(event: &Request) -> (String, String) {
    let raw_path = event.uri().path();
    // API Gateway REST APIs include the stage in the path
    let path = raw_path.strip_prefix("/api").unwrap_or(raw_path);
    let path = if path.len() > 1 { path.trim_end_matches('/') } else { path };
    (event.method().as_str().to_string(), path.to_string())
}

/// A query string parameter as decoded by API Gateway.
pub(crate) fn query_param(event: &Request, key: &str) -> Option<String> {
    let params = event.query_string_parameters();
    params.first(key).map(|v| v.to_string())
}

/// Parse the `{id}` segment following `prefix`, e.g. `/tasks/{id}`.
pub(crate) fn path_id(path: &str, prefix: &str) -> Option<Result<Uuid, uuid::Error>> {
    let rest = path.strip_prefix(prefix)?;
    if rest.is_empty() || rest.contains('/') {
        return None;
    }
    Some(Uuid::parse_str(rest))
}

/// Treat empty strings like missing values.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

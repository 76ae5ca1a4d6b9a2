//! Request body extractors.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, FromRequest, Request},
};
use serde_json::{Map, Value};

/// Request input as a JSON object.
///
/// A body that is absent, empty, malformed, or not an object is read as no
/// input at all, so handlers answer with their own 401/422 instead of a
/// transport-level error. The content type is not checked. Field typing is
/// left to the caller so that type mismatches can be reported per field.
#[derive(Debug, Clone, Default)]
pub struct JsonObject(pub Map<String, Value>);

impl<S> FromRequest<S> for JsonObject
where
    S: Send + Sync,
{
    type Rejection = BytesRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await?;
        Ok(Self(parse_object(&bytes)))
    }
}

fn parse_object(bytes: &[u8]) -> Map<String, Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Map::new();
    }

    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            tracing::debug!("request body is not a JSON object; treating it as empty");
            Map::new()
        }
        Err(err) => {
            tracing::debug!(error = %err, "request body is not valid JSON; treating it as empty");
            Map::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::header::CONTENT_TYPE};

    fn request(content_type: Option<&str>, body: &'static str) -> Request {
        let mut builder = Request::builder().method("POST").uri("/");
        if let Some(content_type) = content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        builder.body(Body::from(body)).unwrap()
    }

    async fn extract(content_type: Option<&str>, body: &'static str) -> Map<String, Value> {
        let JsonObject(map) = JsonObject::from_request(request(content_type, body), &())
            .await
            .unwrap();
        map
    }

    #[tokio::test]
    async fn object_body_is_accepted() {
        let map = extract(Some("application/json"), r#"{"a":1}"#).await;
        assert_eq!(map.get("a"), Some(&Value::from(1)));
    }

    #[tokio::test]
    async fn content_type_is_not_required() {
        let map = extract(None, r#"{"a":1}"#).await;
        assert_eq!(map.get("a"), Some(&Value::from(1)));
    }

    #[tokio::test]
    async fn absent_body_is_empty_input() {
        assert!(extract(None, "").await.is_empty());
        assert!(extract(Some("application/json"), "  \n").await.is_empty());
    }

    #[tokio::test]
    async fn non_object_or_malformed_body_is_empty_input() {
        assert!(extract(Some("application/json"), "[1,2]").await.is_empty());
        assert!(extract(Some("application/json"), "{").await.is_empty());
        assert!(extract(Some("text/plain"), "title=Dune").await.is_empty());
    }
}

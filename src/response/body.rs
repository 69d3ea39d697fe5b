use super::{ResponseError, ResponseInfo};
use bytes::Bytes;
use futures_util::future::BoxFuture;
use futures_util::stream::BoxStream;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Chunked body source.
pub type BodyStream = BoxStream<'static, std::io::Result<Bytes>>;

pub type CustomBodyFuture = BoxFuture<'static, Result<Bytes, ResponseError>>;

/// Renders a body itself. Receives the full response description and the
/// basename the application is mounted under.
pub type CustomBodyHandler = Arc<dyn Fn(&ResponseInfo, &str) -> CustomBodyFuture + Send + Sync>;

pub enum Body {
    Json(serde_json::Value),
    Text(String),
    Html(String),
    Empty,
    Redirect { url: String, use_basename: bool },
    Stream(BodyStream),
    Buffer(Bytes),
    File(PathBuf),
    /// Sent as-is, without a content type.
    Raw(String),
    Custom(CustomBodyHandler),
}

impl Body {
    /// Name of the variant, e.g. `"json"`.
    pub fn kind(&self) -> &'static str {
        match self {
            Body::Json(_) => "json",
            Body::Text(_) => "text",
            Body::Html(_) => "html",
            Body::Empty => "empty",
            Body::Redirect { .. } => "redirect",
            Body::Stream(_) => "stream",
            Body::Buffer(_) => "buffer",
            Body::File(_) => "file",
            Body::Raw(_) => "raw",
            Body::Custom(_) => "custom",
        }
    }

    /// Content type implied by the variant, if any.
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            Body::Json(_) => Some("application/json; charset=utf-8"),
            Body::Text(_) => Some("text/plain; charset=utf-8"),
            Body::Html(_) => Some("text/html; charset=utf-8"),
            Body::Buffer(_) => Some("application/octet-stream"),
            _ => None,
        }
    }

    /// Redirect target, prefixed with `basename` when the redirect asks for it.
    pub fn location(&self, basename: &str) -> Option<String> {
        let Body::Redirect { url, use_basename } = self else {
            return None;
        };

        if !*use_basename || basename.is_empty() {
            return Some(url.clone());
        }

        let base = basename.trim_end_matches('/');
        let path = url.trim_start_matches('/');
        Some(format!("{base}/{path}"))
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Json(value) => f.debug_tuple("Json").field(value).finish(),
            Body::Text(value) => f.debug_tuple("Text").field(value).finish(),
            Body::Html(value) => f.debug_tuple("Html").field(value).finish(),
            Body::Empty => f.write_str("Empty"),
            Body::Redirect { url, use_basename } => f
                .debug_struct("Redirect")
                .field("url", url)
                .field("use_basename", use_basename)
                .finish(),
            Body::Stream(_) => f.write_str("Stream(..)"),
            Body::Buffer(value) => f.debug_tuple("Buffer").field(value).finish(),
            Body::File(path) => f.debug_tuple("File").field(path).finish(),
            Body::Raw(value) => f.debug_tuple("Raw").field(value).finish(),
            Body::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

//! Declarative response descriptions.
//!
//! Middleware build a [`ResponseInfo`] piece by piece (`status`, `header`,
//! `cookie`, a body, ...) and fold the pieces together with [`merge`]. The
//! description is plain data: turning it into bytes on the wire is the
//! server's job.

mod body;
mod cookies;
mod disposition;
pub mod error;

pub use body::{Body, BodyStream, CustomBodyFuture, CustomBodyHandler};
pub use cookies::{CookieEntry, CookieOptions};
pub use disposition::content_disposition;
pub use error::ResponseError;

use bytes::Bytes;
use hyper::{
    HeaderMap, StatusCode,
    header::{CONTENT_DISPOSITION, CONTENT_TYPE, HeaderName, HeaderValue, VARY},
};
use log::debug;
use mime_guess::Mime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Header or cookie value: a string or a number.
///
/// Integers stay integers: `Value::from(2)` is written as `2`, never `2.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Number(serde_json::Number),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(text) => f.write_str(text),
            Value::Number(number) => write!(f, "{number}"),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

macro_rules! integer_values {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Number(serde_json::Number::from(value))
                }
            }
        )*
    };
}

integer_values!(i32, i64, u16, u32, u64, usize);

impl From<f64> for Value {
    /// NaN and infinities have no JSON number form and are kept as text.
    fn from(value: f64) -> Self {
        serde_json::Number::from_f64(value)
            .map_or_else(|| Value::Text(value.to_string()), Value::Number)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::from(f64::from(value))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub code: StatusCode,
    pub message: Option<String>,
}

pub type Cookies = BTreeMap<String, CookieEntry>;

#[derive(Debug, Default)]
pub struct ResponseInfo {
    pub status: Option<Status>,
    pub headers: Option<HeaderMap>,
    pub cookies: Option<Cookies>,
    pub body: Option<Body>,
    pub vary: Option<Vec<String>>,
}

impl ResponseInfo {
    fn with_body(body: Body) -> Self {
        Self {
            body: Some(body),
            ..Self::default()
        }
    }

    /// Folds `other` into `self`; see [`merge`].
    pub fn merge(mut self, other: ResponseInfo) -> Self {
        if let Some(body) = other.body {
            self.body = Some(body);
        }

        if let Some(status) = other.status {
            self.status = Some(status);
        }

        if let Some(incoming) = other.headers {
            let headers = self.headers.get_or_insert_with(HeaderMap::new);
            let mut last: Option<HeaderName> = None;
            for (name, value) in incoming {
                match name {
                    Some(name) => {
                        headers.insert(name.clone(), value);
                        last = Some(name);
                    }
                    None => {
                        if let Some(name) = &last {
                            headers.append(name.clone(), value);
                        }
                    }
                }
            }
        }

        if let Some(cookies) = other.cookies {
            self.cookies.get_or_insert_with(Cookies::new).extend(cookies);
        }

        if let Some(vary) = other.vary {
            self.vary.get_or_insert_with(Vec::new).extend(vary);
        }

        self
    }

    /// Status code to send, `200 OK` when none was set.
    pub fn status_code(&self) -> StatusCode {
        self.status.as_ref().map_or(StatusCode::OK, |status| status.code)
    }

    /// Header values for every cookie, in name order.
    pub fn set_cookie_headers(&self) -> Result<Vec<HeaderValue>, ResponseError> {
        let Some(cookies) = &self.cookies else {
            return Ok(Vec::new());
        };

        cookies
            .iter()
            .map(|(name, entry)| {
                HeaderValue::from_str(&entry.to_cookie(name).to_string()).map_err(Into::into)
            })
            .collect()
    }

    /// Collapses `vary` into one `Vary` header value, deduplicated
    /// case-insensitively.
    pub fn vary_header(&self) -> Result<Option<HeaderValue>, ResponseError> {
        let Some(fields) = &self.vary else {
            return Ok(None);
        };

        let mut seen: Vec<String> = Vec::with_capacity(fields.len());
        for field in fields {
            if !seen.iter().any(|f| f.eq_ignore_ascii_case(field)) {
                seen.push(field.clone());
            }
        }

        if seen.iter().any(|f| f == "*") {
            return Ok(Some(HeaderValue::from_static("*")));
        }

        Ok(Some(HeaderValue::from_str(&seen.join(", "))?))
    }

    /// All headers to send: explicit headers, the body's implied content type
    /// when none was set, and `Vary`.
    pub fn header_map(&self) -> Result<HeaderMap, ResponseError> {
        let mut headers = self.headers.clone().unwrap_or_default();

        if !headers.contains_key(CONTENT_TYPE) {
            if let Some(content_type) = self.body.as_ref().and_then(Body::content_type) {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
            }
        }

        if let Some(vary) = self.vary_header()? {
            headers.insert(VARY, vary);
        }

        Ok(headers)
    }

    /// Runs a [`Body::Custom`] handler. `None` for every other body.
    pub fn render_custom(&self, basename: &str) -> Option<CustomBodyFuture> {
        match &self.body {
            Some(Body::Custom(handler)) => Some(handler(self, basename)),
            _ => None,
        }
    }
}

/// Folds responses left to right: the last body and status win, headers and
/// cookies are overwritten by name, `vary` fields accumulate.
pub fn merge(responses: impl IntoIterator<Item = ResponseInfo>) -> ResponseInfo {
    responses
        .into_iter()
        .fold(ResponseInfo::default(), ResponseInfo::merge)
}

pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<ResponseInfo, ResponseError> {
    Ok(ResponseInfo::with_body(Body::Json(serde_json::to_value(
        value,
    )?)))
}

pub fn text(value: impl Into<String>) -> ResponseInfo {
    ResponseInfo::with_body(Body::Text(value.into()))
}

pub fn html(value: impl Into<String>) -> ResponseInfo {
    ResponseInfo::with_body(Body::Html(value.into()))
}

pub fn empty() -> ResponseInfo {
    ResponseInfo::with_body(Body::Empty)
}

pub fn raw(value: impl Into<String>) -> ResponseInfo {
    ResponseInfo::with_body(Body::Raw(value.into()))
}

/// Redirect relative to the application basename.
pub fn redirect(url: impl Into<String>) -> ResponseInfo {
    redirect_with(url, true)
}

pub fn redirect_with(url: impl Into<String>, use_basename: bool) -> ResponseInfo {
    ResponseInfo::with_body(Body::Redirect {
        url: url.into(),
        use_basename,
    })
}

pub fn custom<F>(handler: F) -> ResponseInfo
where
    F: Fn(&ResponseInfo, &str) -> CustomBodyFuture + Send + Sync + 'static,
{
    ResponseInfo::with_body(Body::Custom(Arc::new(handler)))
}

pub fn stream(stream: BodyStream) -> ResponseInfo {
    ResponseInfo::with_body(Body::Stream(stream))
}

pub fn buffer(buffer: impl Into<Bytes>) -> ResponseInfo {
    ResponseInfo::with_body(Body::Buffer(buffer.into()))
}

pub fn file(filename: impl Into<PathBuf>) -> ResponseInfo {
    ResponseInfo::with_body(Body::File(filename.into()))
}

/// `Content-Disposition: attachment`, with a filename when given.
pub fn attachment(filename: Option<&str>) -> Result<ResponseInfo, ResponseError> {
    let value = HeaderValue::from_str(&content_disposition(filename))?;
    let mut map = HeaderMap::with_capacity(1);
    map.insert(CONTENT_DISPOSITION, value);
    Ok(headers(map))
}

pub fn status(code: u16, message: Option<&str>) -> Result<ResponseInfo, ResponseError> {
    let code = StatusCode::from_u16(code).map_err(|_| ResponseError::InvalidStatusCode(code))?;
    Ok(ResponseInfo {
        status: Some(Status {
            code,
            message: message.map(str::to_string),
        }),
        ..ResponseInfo::default()
    })
}

pub fn headers(headers: HeaderMap) -> ResponseInfo {
    ResponseInfo {
        headers: Some(headers),
        ..ResponseInfo::default()
    }
}

pub fn header(name: &str, value: impl Into<Value>) -> Result<ResponseInfo, ResponseError> {
    let name = HeaderName::from_bytes(name.as_bytes())?;
    let value = HeaderValue::from_str(&value.into().to_string())?;
    let mut map = HeaderMap::with_capacity(1);
    map.insert(name, value);
    Ok(headers(map))
}

/// Sets `Content-Type` from an extension (`"json"`, `".html"`, `"a.png"`) or
/// a full MIME type. Unknown types yield an empty header set.
pub fn r#type(ty: &str) -> ResponseInfo {
    let Some(content_type) = content_type(ty) else {
        debug!("unknown content type `{ty}`");
        return headers(HeaderMap::new());
    };

    let mut map = HeaderMap::with_capacity(1);
    if let Ok(value) = HeaderValue::from_str(&content_type) {
        map.insert(CONTENT_TYPE, value);
    }
    headers(map)
}

/// Resolves a full `Content-Type` value, adding `charset=utf-8` to textual
/// types that do not carry a charset.
pub fn content_type(ty: &str) -> Option<String> {
    let mime: Mime = if ty.contains('/') {
        ty.parse().ok()?
    } else {
        let ext = ty.rsplit('.').next()?.to_ascii_lowercase();
        if ext.is_empty() {
            return None;
        }
        mime_guess::from_ext(&ext).first()?
    };

    let has_charset = mime
        .params()
        .any(|(name, _)| name.as_str().eq_ignore_ascii_case("charset"));

    if has_charset || !is_textual(&mime) {
        return Some(mime.to_string());
    }

    Some(format!("{mime}; charset=utf-8"))
}

fn is_textual(mime: &Mime) -> bool {
    let subtype = mime.subtype().as_str();
    mime.type_().as_str() == "text"
        || subtype == "json"
        || subtype == "javascript"
        || mime.suffix().is_some_and(|suffix| suffix.as_str() == "json")
}

/// Cookies sharing one set of options. `None` values clear the cookie.
pub fn cookies<K>(
    config: impl IntoIterator<Item = (K, Option<Value>)>,
    options: Option<CookieOptions>,
) -> ResponseInfo
where
    K: Into<String>,
{
    let cookies = config
        .into_iter()
        .map(|(name, value)| {
            (
                name.into(),
                CookieEntry {
                    value,
                    options: options.clone(),
                },
            )
        })
        .collect();

    ResponseInfo {
        cookies: Some(cookies),
        ..ResponseInfo::default()
    }
}

pub fn cookie(
    name: impl Into<String>,
    value: impl Into<Value>,
    options: Option<CookieOptions>,
) -> ResponseInfo {
    cookies([(name.into(), Some(value.into()))], options)
}

/// Expires `name` on the client.
pub fn clear_cookie(name: impl Into<String>, options: Option<CookieOptions>) -> ResponseInfo {
    cookies([(name.into(), None)], options)
}

pub fn vary<I>(fields: I) -> ResponseInfo
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    ResponseInfo {
        vary: Some(fields.into_iter().map(Into::into).collect()),
        ..ResponseInfo::default()
    }
}

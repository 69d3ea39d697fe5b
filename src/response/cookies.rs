use super::Value;
use chrono::{DateTime, Utc};
use cookie::time::{Duration as CookieDuration, OffsetDateTime};
use cookie::{Cookie, SameSite};
use std::time::Duration;

/// Attributes applied when a cookie is written.
#[derive(Debug, Clone, PartialEq)]
pub struct CookieOptions {
    pub max_age: Option<Duration>,
    pub expires: Option<DateTime<Utc>>,
    /// Defaults to `/`.
    pub path: Option<String>,
    pub domain: Option<String>,
    pub secure: bool,
    /// Defaults to `true`.
    pub http_only: bool,
    pub same_site: Option<SameSite>,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            max_age: None,
            expires: None,
            path: Some("/".to_string()),
            domain: None,
            secure: false,
            http_only: true,
            same_site: None,
        }
    }
}

impl CookieOptions {
    pub fn max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    pub fn expires(mut self, at: DateTime<Utc>) -> Self {
        self.expires = Some(at);
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    pub fn same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = Some(same_site);
        self
    }
}

/// One cookie to set. A `None` value clears the cookie on the client.
#[derive(Debug, Clone, PartialEq)]
pub struct CookieEntry {
    pub value: Option<Value>,
    pub options: Option<CookieOptions>,
}

impl CookieEntry {
    /// Builds the cookie using the `cookie` crate.
    pub fn to_cookie(&self, name: &str) -> Cookie<'static> {
        let defaults = CookieOptions::default();
        let options = self.options.as_ref().unwrap_or(&defaults);
        let value = self.value.as_ref().map(ToString::to_string).unwrap_or_default();

        let mut cookie = Cookie::build((name.to_owned(), value))
            .secure(options.secure)
            .http_only(options.http_only);

        if let Some(path) = &options.path {
            cookie = cookie.path(path.clone());
        }

        if let Some(domain) = &options.domain {
            cookie = cookie.domain(domain.clone());
        }

        if let Some(same_site) = options.same_site {
            cookie = cookie.same_site(same_site);
        }

        if self.value.is_none() {
            return cookie
                .max_age(CookieDuration::ZERO)
                .expires(OffsetDateTime::UNIX_EPOCH)
                .build();
        }

        if let Some(max_age) = options.max_age {
            let seconds = i64::try_from(max_age.as_secs()).unwrap_or(i64::MAX);
            cookie = cookie.max_age(CookieDuration::seconds(seconds));
        }

        if let Some(expires) = options.expires {
            if let Ok(at) = OffsetDateTime::from_unix_timestamp(expires.timestamp()) {
                cookie = cookie.expires(at);
            }
        }

        cookie.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn serializes_value_and_attributes() {
        let entry = CookieEntry {
            value: Some(Value::from("abc123")),
            options: Some(
                CookieOptions::default()
                    .max_age(Duration::from_secs(60))
                    .same_site(SameSite::Lax)
                    .secure(true),
            ),
        };

        let cookie = entry.to_cookie("session");
        assert_eq!(cookie.name(), "session");
        assert_eq!(cookie.value(), "abc123");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age(), Some(CookieDuration::seconds(60)));
    }

    #[test]
    fn unbounded_max_age_saturates() {
        let entry = CookieEntry {
            value: Some(Value::from("v")),
            options: Some(CookieOptions::default().max_age(Duration::MAX)),
        };

        let cookie = entry.to_cookie("k");
        assert_eq!(cookie.max_age(), Some(CookieDuration::seconds(i64::MAX)));
        assert!(!cookie.to_string().contains("Max-Age=-"));
    }

    #[test]
    fn numbers_are_written_without_fraction() {
        let entry = CookieEntry {
            value: Some(Value::from(42)),
            options: None,
        };
        assert_eq!(entry.to_cookie("n").value(), "42");
    }

    #[test]
    fn missing_value_expires_the_cookie() {
        let entry = CookieEntry {
            value: None,
            options: None,
        };

        let cookie = entry.to_cookie("session");
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(CookieDuration::ZERO));
        assert_eq!(cookie.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));
    }

    #[test]
    fn converts_expiry_timestamps() {
        let at = Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap();
        let entry = CookieEntry {
            value: Some(Value::from("v")),
            options: Some(CookieOptions::default().expires(at)),
        };

        let expires = entry.to_cookie("k").expires_datetime().unwrap();
        assert_eq!(expires.unix_timestamp(), at.timestamp());
    }
}

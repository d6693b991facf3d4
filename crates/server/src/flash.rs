//! One-shot flash notifications carried in a cookie
//!
//! A handler that redirects sets the cookie; the next rendered page shows the
//! message and clears it.

use axum::http::{HeaderMap, header};
use axum::response::{IntoResponse, Redirect, Response};

pub const FLASH_COOKIE: &str = "flash";

/// Bootstrap alert class of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Success,
    Danger,
}

impl FlashLevel {
    pub fn css_class(&self) -> &'static str {
        match self {
            FlashLevel::Success => "alert-success",
            FlashLevel::Danger => "alert-danger",
        }
    }

    fn from_css_class(class: &str) -> Option<Self> {
        match class {
            "alert-success" => Some(FlashLevel::Success),
            "alert-danger" => Some(FlashLevel::Danger),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Danger,
            message: message.into(),
        }
    }

    /// `Set-Cookie` value carrying this notification
    pub fn to_cookie(&self) -> String {
        let value = format!("{}|{}", self.level.css_class(), self.message);
        format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            FLASH_COOKIE,
            urlencoding::encode(&value)
        )
    }

    fn from_cookie_value(raw: &str) -> Option<Self> {
        let decoded = urlencoding::decode(raw).ok()?;
        let (class, message) = decoded.split_once('|')?;
        Some(Self {
            level: FlashLevel::from_css_class(class)?,
            message: message.to_string(),
        })
    }

    /// Read the notification from the request's `Cookie` headers
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|cookies| cookies.split(';'))
            .filter_map(|cookie| cookie.trim().split_once('='))
            .find(|(name, _)| *name == FLASH_COOKIE)
            .and_then(|(_, value)| Self::from_cookie_value(value))
    }
}

/// `Set-Cookie` value that removes the notification
pub fn clear_cookie() -> String {
    format!("{}=; Path=/; Max-Age=0", FLASH_COOKIE)
}

/// 303 redirect to `location` carrying `flash`
pub fn redirect_with(location: &str, flash: Flash) -> Response {
    (
        [(header::SET_COOKIE, flash.to_cookie())],
        Redirect::to(location),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, StatusCode};

    #[test]
    fn test_cookie_round_trip() {
        let flash = Flash::danger("Failed: a|b; c=d");
        let cookie = flash.to_cookie();
        let pair = cookie.split(';').next().unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {}", pair)).unwrap(),
        );

        assert_eq!(Flash::from_headers(&headers), Some(flash));
    }

    #[test]
    fn test_missing_or_garbled_cookie() {
        let mut headers = HeaderMap::new();
        assert_eq!(Flash::from_headers(&headers), None);

        headers.insert(header::COOKIE, HeaderValue::from_static("flash=nonsense"));
        assert_eq!(Flash::from_headers(&headers), None);

        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("flash=alert-info%7Chello"),
        );
        assert_eq!(Flash::from_headers(&headers), None);
    }

    #[test]
    fn test_redirect_sets_cookie() {
        let response = redirect_with("/somewhere", Flash::success("Saved"));

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/somewhere");
        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("flash=alert-success%7CSaved"));
    }
}

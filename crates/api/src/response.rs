//! Shared response envelope types for API handlers.
//!
//! - [`DataResponse`] -- `{ "data": T }` for plain resource reads.
//! - [`Page`] -- `{ component, props, url }` view-model for screens.
//! - [`ActionResponse`] -- `{ success, message, data? }` for every mutation.
//!   The client decides whether to flash the message or redirect.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// A server-built page object rendered by the client page framework.
#[derive(Debug, Serialize)]
pub struct Page<T: Serialize> {
    pub component: &'static str,
    pub props: T,
    pub url: String,
}

impl<T: Serialize> Page<T> {
    pub fn new(component: &'static str, props: T, url: impl Into<String>) -> Self {
        Self {
            component,
            props,
            url: url.into(),
        }
    }
}

/// Outcome of a mutating request.
#[derive(Debug, Serialize)]
pub struct ActionResponse<T: Serialize = ()> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl ActionResponse<()> {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}

impl<T: Serialize> ActionResponse<T> {
    pub fn with_data(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

//! HTTP/1.1 protocol types and parsing
//!
//! The minimal set of primitives the service needs: [`Method`],
//! [`StatusCode`], [`Request`] and [`Response`].

use std::fmt;

pub mod request;
pub mod response;

pub use request::{Request, RequestError};
pub use response::Response;

/// HTTP status codes returned by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum StatusCode {
    Ok = 200,
    BadRequest = 400,
    NotFound = 404,
    PayloadTooLarge = 413,
    InternalServerError = 500,
    ServiceUnavailable = 503,
}

impl StatusCode {
    pub fn as_u16(self) -> u16 {
        self as u16
    }

    pub fn canonical_reason(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::BadRequest => "Bad Request",
            Self::NotFound => "Not Found",
            Self::PayloadTooLarge => "Payload Too Large",
            Self::InternalServerError => "Internal Server Error",
            Self::ServiceUnavailable => "Service Unavailable",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.canonical_reason())
    }
}

/// HTTP request method
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    /// Any method the service does not route on
    Custom(String),
}

impl Method {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Custom(s) => s.as_str(),
        }
    }
}

impl From<&str> for Method {
    fn from(s: &str) -> Self {
        match s {
            "GET" => Self::Get,
            other => Self::Custom(other.to_owned()),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_display() {
        assert_eq!(StatusCode::ServiceUnavailable.to_string(), "503 Service Unavailable");
        assert_eq!(StatusCode::NotFound.as_u16(), 404);
    }

    #[test]
    fn method_from_str() {
        assert_eq!(Method::from("GET"), Method::Get);
        assert_eq!(Method::from("PATCH"), Method::Custom("PATCH".to_string()));
        assert_eq!(Method::from("PATCH").as_str(), "PATCH");
    }

    #[test]
    fn non_get_methods_keep_their_name() {
        for name in ["HEAD", "POST", "PUT", "DELETE"] {
            let method = Method::from(name);
            assert_eq!(method, Method::Custom(name.to_string()));
            assert_eq!(method.to_string(), name);
        }
    }

    #[test]
    fn method_names_are_case_sensitive() {
        assert_eq!(Method::from("get"), Method::Custom("get".to_string()));
    }
}

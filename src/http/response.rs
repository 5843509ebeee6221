//! HTTP/1.1 response builder

use bytes::{BufMut, BytesMut};

use super::StatusCode;

/// An HTTP/1.1 response, ready to be serialized and sent
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    keep_alive: bool,
}

impl Response {
    /// Creates a new response with the given status and an empty body
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
            keep_alive: true,
        }
    }

    /// Creates a `{"message": ...}` JSON response
    pub fn json_message(status: StatusCode, message: &str) -> Self {
        Self::new(status)
            .header("Content-Type", "application/json")
            .body(serde_json::json!({ "message": message }).to_string())
    }

    /// Creates an HTML response
    pub fn html(status: StatusCode, markup: impl Into<String>) -> Self {
        Self::new(status)
            .header("Content-Type", "text/html; charset=utf-8")
            .body(markup)
    }

    /// Appends a response header
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the response body from a string
    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into().into_bytes();
        self
    }

    /// Sets the response body from raw bytes
    #[must_use]
    pub fn body_bytes(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Controls whether `Connection: keep-alive` or `Connection: close` is written
    #[must_use]
    pub fn keep_alive(mut self, keep_alive: bool) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the first header value with the given case-insensitive name
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body_ref(&self) -> &[u8] {
        &self.body
    }

    /// Serializes the response using HTTP/1.1 wire format
    ///
    /// Always writes `Content-Length` and `Connection`; adds a plain-text
    /// `Content-Type` when the body is non-empty and none was set.
    pub fn into_bytes(mut self) -> BytesMut {
        let content_length = self.body.len();

        if !self.body.is_empty() && self.header_value("content-type").is_none() {
            self.headers
                .push(("Content-Type".into(), "text/plain; charset=utf-8".into()));
        }
        let connection = if self.keep_alive { "keep-alive" } else { "close" };
        self.headers.push(("Connection".into(), connection.into()));

        let mut buf = BytesMut::with_capacity(128 + self.headers.len() * 64 + content_length);

        buf.put(
            format!(
                "HTTP/1.1 {} {}\r\n",
                self.status.as_u16(),
                self.status.canonical_reason()
            )
            .as_bytes(),
        );
        for (name, value) in &self.headers {
            buf.put(format!("{name}: {value}\r\n").as_bytes());
        }
        buf.put(format!("Content-Length: {content_length}\r\n").as_bytes());
        buf.put(&b"\r\n"[..]);
        buf.put(self.body.as_slice());

        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_string(bytes: BytesMut) -> String {
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn simple_ok_response() {
        let r = Response::new(StatusCode::Ok).body("Hello");
        let s = to_string(r.into_bytes());
        assert!(s.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(s.contains("Content-Type: text/plain; charset=utf-8\r\n"));
        assert!(s.contains("Content-Length: 5\r\n"));
        assert!(s.ends_with("\r\n\r\nHello"));
    }

    #[test]
    fn json_message_response() {
        let r = Response::json_message(StatusCode::NotFound, "Not Found");
        assert_eq!(r.header_value("content-type"), Some("application/json"));
        let s = to_string(r.into_bytes());
        assert!(s.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(s.ends_with(r#"{"message":"Not Found"}"#));
    }

    #[test]
    fn binary_body() {
        let r = Response::new(StatusCode::Ok)
            .header("Content-Type", "image/png")
            .body_bytes(vec![0x89, b'P', b'N', b'G']);
        let bytes = r.into_bytes();
        assert!(bytes.ends_with(&[0x89, b'P', b'N', b'G']));
    }

    #[test]
    fn empty_body_has_no_content_type() {
        let s = to_string(Response::new(StatusCode::Ok).into_bytes());
        assert!(!s.contains("Content-Type"));
        assert!(s.contains("Content-Length: 0\r\n"));
    }

    #[test]
    fn connection_close() {
        let s = to_string(Response::new(StatusCode::Ok).keep_alive(false).into_bytes());
        assert!(s.contains("Connection: close\r\n"));
    }
}

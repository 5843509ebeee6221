//! HTTP/1.1 request parsing using the [`httparse`] crate

use std::collections::HashMap;

use thiserror::Error;

use super::Method;

/// Errors that can occur while parsing an HTTP/1.1 request
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("request is incomplete, more data needed")]
    Incomplete,

    #[error("HTTP parse error: {0}")]
    Parse(#[from] httparse::Error),

    #[error("missing required field: {field}")]
    MissingField { field: &'static str },
}

/// A parsed HTTP/1.1 request
///
/// Header names are stored lower-cased. Query parameters are
/// percent-decoded; when a key repeats, the first value wins.
#[derive(Debug)]
pub struct Request {
    method: Method,
    path: String,
    /// HTTP minor version: 0 for HTTP/1.0, 1 for HTTP/1.1
    version: u8,
    headers: HashMap<String, String>,
    params: HashMap<String, String>,
}

impl Request {
    /// Maximum number of headers we support per request
    const MAX_HEADERS: usize = 64;

    /// Parse a raw HTTP/1.1 request from a byte slice
    ///
    /// Returns the parsed `Request` and the byte offset at which the body begins.
    ///
    /// # Errors
    ///
    /// - [`RequestError::Incomplete`] if more data is needed to complete the headers
    /// - [`RequestError::Parse`] if the data is malformed
    /// - [`RequestError::MissingField`] if the method, path or version is absent
    pub fn parse(buf: &[u8]) -> Result<(Self, usize), RequestError> {
        let mut headers = [httparse::EMPTY_HEADER; Self::MAX_HEADERS];
        let mut raw_req = httparse::Request::new(&mut headers);

        let body_offset = match raw_req.parse(buf)? {
            httparse::Status::Complete(offset) => offset,
            httparse::Status::Partial => return Err(RequestError::Incomplete),
        };

        let method = Method::from(
            raw_req
                .method
                .ok_or(RequestError::MissingField { field: "method" })?,
        );
        let raw_path = raw_req
            .path
            .ok_or(RequestError::MissingField { field: "path" })?;
        let version = raw_req
            .version
            .ok_or(RequestError::MissingField { field: "version" })?;

        let (path, query) = match raw_path.split_once('?') {
            Some((path, query)) => (path.to_owned(), Some(query)),
            None => (raw_path.to_owned(), None),
        };

        let mut header_map = HashMap::with_capacity(raw_req.headers.len());
        for header in raw_req.headers.iter() {
            if let Ok(value) = std::str::from_utf8(header.value) {
                header_map.insert(header.name.to_ascii_lowercase(), value.to_owned());
            }
        }

        let params = query.map(parse_query_string).unwrap_or_default();

        Ok((
            Self {
                method,
                path,
                version,
                headers: header_map,
                params,
            },
            body_offset,
        ))
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request path (without the query string)
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns a header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Returns a decoded query parameter value by key
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Returns `true` if the connection should be kept alive after this request
    ///
    /// HTTP/1.1 defaults to keep-alive. HTTP/1.0 defaults to close unless
    /// `Connection: keep-alive` is explicitly set.
    pub fn is_keep_alive(&self) -> bool {
        match self.header("connection") {
            Some(conn) => conn.eq_ignore_ascii_case("keep-alive"),
            None => self.version == 1,
        }
    }

    /// Returns the value of the `Content-Length` header, if present and valid
    pub fn content_length(&self) -> Option<usize> {
        self.header("content-length")?.parse().ok()
    }
}

/// Parses a URL query string into a map, decoding `+` and percent escapes
fn parse_query_string(query: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        params.entry(key.into_owned()).or_insert_with(|| value.into_owned());
    }
    params
}

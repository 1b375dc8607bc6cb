//! Tests for request framing.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use serde::Deserialize;

    use crate::parser::{HttpRequest, Method, HttpVersion, Error, find_header_end, parse_request};

    #[test]
    fn test_parse_simple_get_request() {
        let request = b"GET /index.html HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.method, Method::GET);
        assert_eq!(result.path, "/index.html");
        assert_eq!(result.query, None);
        assert_eq!(result.version, HttpVersion::Http11);
        assert_eq!(result.headers.get("Host").unwrap(), "example.com");
        assert!(result.body.is_empty());
    }

    #[test]
    fn test_case_insensitive_headers() {
        let request = b"GET /index.html HTTP/1.1\r\nHost: example.com\r\nrange: bytes=0-4\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert!(result.has_header("HOST"));
        assert_eq!(result.get_header("Range").unwrap(), "bytes=0-4");
    }

    #[test]
    fn test_missing_host_header() {
        let request = b"GET /index.html HTTP/1.1\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::MissingHeader(ref h)) if h == "Host"));
    }

    #[test]
    fn test_http10_without_host() {
        let request = b"GET /index.html HTTP/1.0\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.version, HttpVersion::Http10);
        assert!(result.headers.is_empty());
    }

    #[test]
    fn test_invalid_method() {
        let request = b"INVALID /index.html HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::InvalidMethod(ref m)) if m == "INVALID"));
    }

    #[test]
    fn test_invalid_http_version() {
        let request = b"GET /index.html HTTP/2\r\nHost: example.com\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::InvalidVersion(ref v)) if v == "HTTP/2"));
    }

    #[test]
    fn test_relative_target_rejected() {
        let request = b"GET index.html HTTP/1.1\r\nHost: example.com\r\n\r\n";
        assert!(matches!(parse_request(request), Err(Error::InvalidPath)));
    }

    #[test]
    fn test_invalid_header_format() {
        let request = b"GET /index.html HTTP/1.1\r\nInvalidHeader\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::InvalidHeaderFormat)));
    }

    #[test]
    fn test_empty_request() {
        assert!(matches!(parse_request(b""), Err(Error::EmptyRequest)));
        assert!(matches!(parse_request(b"\r\n\r\n"), Err(Error::EmptyRequest)));
    }

    #[test]
    fn test_incomplete_request_line() {
        let result = parse_request(b"GET\r\n");
        assert!(matches!(result, Err(Error::MalformedRequestLine(_))));
    }

    #[test]
    fn test_all_methods() {
        for method in Method::ALL {
            let raw = format!("{method} /index.html HTTP/1.1\r\nHost: example.com\r\n\r\n");
            let result = parse_request(raw.as_bytes()).unwrap();
            assert_eq!(result.method, method);
        }
    }

    #[test]
    fn test_headers_with_multiple_colons() {
        let request = b"GET / HTTP/1.1\r\nHost: example.com\r\nX-Test: value:with:colons\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.headers.get("X-Test").unwrap(), "value:with:colons");
    }

    #[test]
    fn test_query_is_split_from_path() {
        let request = b"GET /search?q=test&flag&empty= HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.path, "/search");
        assert_eq!(result.query.as_deref(), Some("q=test&flag&empty="));
        assert_eq!(result.get_query_param("q").unwrap(), "test");
        assert_eq!(result.get_query_param("flag").unwrap(), "");
        assert!(result.has_query_param("empty"));
    }

    #[test]
    fn test_query_keeps_only_first_question_mark() {
        let request = HttpRequest::get("/file.txt?v=1?x=2");
        assert_eq!(request.path, "/file.txt");
        assert_eq!(request.query.as_deref(), Some("v=1?x=2"));
    }

    #[test]
    fn test_malformed_utf8_in_request() {
        let request = b"GET /index.html HTTP/1.1\r\nHost: example.com\r\nX-Test: \xFF\xFF\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::MalformedRequestLine(ref s)) if s == "Invalid UTF-8"));
    }

    #[test]
    fn test_body_read_up_to_content_length() {
        let request = b"POST /api HTTP/1.1\r\nHost: a\r\nContent-Length: 5\r\n\r\nhello world";
        let result = parse_request(request).unwrap();
        assert_eq!(result.body, b"hello");
    }

    #[test]
    fn test_invalid_content_length() {
        let request = b"POST /api HTTP/1.1\r\nHost: a\r\nContent-Length: lots\r\n\r\n";
        assert!(matches!(parse_request(request), Err(Error::InvalidContentLength(_))));
    }

    #[test]
    fn test_find_header_end() {
        assert_eq!(find_header_end(b"GET / HTTP/1.0\r\n\r\nbody"), Some(18));
        assert_eq!(find_header_end(b"GET / HTTP/1.0\r\n"), None);
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct TestUser {
        name: String,
    }

    #[test]
    fn test_json_parsing() {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());

        let body = br#"{"name":"John Doe"}"#.to_vec();
        let request = HttpRequest::with_body(Method::POST, "/api/users", HttpVersion::Http11, headers, body.clone());
        let user: TestUser = request.json().unwrap();
        assert_eq!(user.name, "John Doe");

        let plain = HttpRequest::with_body(Method::POST, "/api/users", HttpVersion::Http11, HashMap::new(), body);
        let result: Result<TestUser, _> = plain.json();
        assert!(matches!(result, Err(Error::MissingHeader(_))));
    }
}

use wireframe::http::{Cookie, Environ, Headers, Params, Request, Response};

#[test]
fn headers() {
    let mut headers = Headers::new();
    assert!(headers.is_empty());

    headers.set("A", "1");
    headers.set("B", "2");
    headers.set("C", "3");
    assert_eq!(headers.len(), 3);

    for (name, value) in [("a", "1"), ("B", "2"), ("c", "3")] {
        assert_eq!(headers.get(name), Some(value));
        assert_eq!(headers.remove(name).unwrap(), value);
        assert_eq!(headers.get(name), None);
        assert!(headers.remove(name).is_err());
    }

    assert!(headers.is_empty());

    headers.set("A", "1");
    headers.set("A", "2");
    assert_eq!(headers.get("A"), Some("2"));
    assert_eq!(headers.len(), 1);
}

#[test]
fn empty_value_removes() {
    let mut headers = Headers::new();
    headers.set("X-Trace", "abc");
    headers.set("X-Trace", "");
    assert_eq!(headers.get("X-Trace"), None);
}

#[test]
fn case_insensitive() {
    let mut headers = Headers::new();
    headers.set("Content-Type", "x");
    assert_eq!(headers.get("CONTENT-TYPE"), Some("x"));
    assert_eq!(headers.get("content_type"), Some("x"));

    headers.set("content_type", "");
    assert_eq!(headers.get("Content-Type"), None);
    assert!(!headers.contains("content-type"));
}

#[test]
fn request_headers_and_cookies() {
    let environ = Environ::new("GET", "/")
        .header("X-Forwarded-For", "10.0.0.1")
        .header("Cookie", "sid=\"xyz\"; theme=dark");
    let req = Request::new(environ, Default::default(), Params::new(), 1024).unwrap();

    assert_eq!(req.headers().get("x_forwarded_for"), Some("10.0.0.1"));
    assert_eq!(req.cookies().value("sid"), Some("xyz"));
    assert_eq!(req.cookies().value("theme"), Some("dark"));
}

#[test]
fn response_header_block() {
    let mut res = Response::new();
    res.append("ab");
    res.append("cd");
    res.set_header("X-Test", "1");
    res.headers_mut()
        .cookies_mut()
        .insert(Cookie::new("sid", "xyz"));

    let wire = res.serialize();
    assert_eq!(wire.body, "abcd");
    assert!(wire
        .headers
        .iter()
        .any(|(name, value)| name.eq_ignore_ascii_case("x-test") && value == "1"));
    assert!(wire
        .headers
        .iter()
        .any(|(name, value)| name == "Set-Cookie" && value.contains("sid=xyz")));
}

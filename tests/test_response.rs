use nethttp::http::{Response, ResponseBuilder, StatusCode};

#[test]
fn test_status_code_values() {
    assert_eq!(StatusCode::Ok.as_u16(), 200);
    assert_eq!(StatusCode::Created.as_u16(), 201);
    assert_eq!(StatusCode::NoContent.as_u16(), 204);
    assert_eq!(StatusCode::BadRequest.as_u16(), 400);
    assert_eq!(StatusCode::NotFound.as_u16(), 404);
    assert_eq!(StatusCode::MethodNotAllowed.as_u16(), 405);
    assert_eq!(StatusCode::InternalServerError.as_u16(), 500);
    assert_eq!(StatusCode::HttpVersionNotSupported.as_u16(), 505);
    assert_eq!(StatusCode::Unknown.as_u16(), 0);
}

#[test]
fn test_status_code_reason_phrases() {
    assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    assert_eq!(StatusCode::NotFound.reason_phrase(), "Not Found");
    assert_eq!(StatusCode::NotImplemented.reason_phrase(), "Not Implemented");
    assert_eq!(StatusCode::SwitchProxy.reason_phrase(), "Switch Proxy");
}

#[test]
fn test_status_table_is_ascending_and_complete() {
    let codes: Vec<u16> = StatusCode::ALL.iter().map(StatusCode::as_u16).collect();
    assert!(codes.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(codes.len(), 3 + 7 + 8 + 18 + 6);
    for status in StatusCode::ALL {
        assert_eq!(StatusCode::from_u16(status.as_u16()), *status);
        assert_eq!(StatusCode::from_token(status.reason_phrase()), *status);
    }
}

#[test]
fn test_status_from_token() {
    assert_eq!(StatusCode::from_token("200"), StatusCode::Ok);
    assert_eq!(StatusCode::from_token("418 I'm a teapot"), StatusCode::Unknown);
    assert_eq!(StatusCode::from_token(""), StatusCode::Unknown);
}

#[test]
fn test_serialize_adds_content_length() {
    let resp = ResponseBuilder::new(StatusCode::Ok)
        .body(b"Hello World\n".to_vec())
        .build();

    assert_eq!(
        resp.write(),
        b"HTTP/1.1 200 OK\r\nContent-Length: 12\r\n\r\nHello World\n"
    );
}

#[test]
fn test_serialize_keeps_caller_content_length() {
    let resp = ResponseBuilder::new(StatusCode::Ok)
        .header("content-length", 3)
        .body("abc")
        .build();

    assert_eq!(resp.to_string(), "HTTP/1.1 200 OK\r\ncontent-length: 3\r\n\r\nabc");
}

#[test]
fn test_response_round_trip() {
    let resp = ResponseBuilder::new(StatusCode::Accepted)
        .header("Content-Length", 4)
        .header("Content-Type", "text/plain")
        .body("sent")
        .build();

    let parsed: Response = resp.to_string().parse().unwrap();
    assert_eq!(parsed, resp);
}

#[test]
fn test_response_helpers() {
    let resp = Response::ok_with("hi");
    assert_eq!(resp.status, StatusCode::Ok);
    assert_eq!(resp.body, b"hi");

    let resp = Response::not_found();
    assert_eq!(resp.status, StatusCode::NotFound);
    assert_eq!(resp.body, b"404 Not Found");

    let resp = Response::internal_error();
    assert_eq!(resp.status, StatusCode::InternalServerError);
}

#[test]
fn test_default_response_is_not_ok() {
    let mut resp = Response::default();
    assert!(!resp.ok());
    resp.status = StatusCode::NoContent;
    assert!(resp.ok());
    resp.reset();
    assert!(!resp.ok());
}

use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::status::StatusCode;

/// Application callback invoked once per parsed request.
///
/// The handler fills in `response`; leaving its status unset sends
/// `501 Not Implemented`. Handlers run on connection threads, concurrently
/// with each other, so they must be `Send + Sync`.
///
/// Any `Fn(&Request, &mut Response)` closure is a handler:
///
/// ```
/// # use nethttp::http::{Handler, Request, Response, StatusCode};
/// fn assert_handler(_: impl Handler) {}
/// assert_handler(|_req: &Request, resp: &mut Response| resp.status = StatusCode::Ok);
/// ```
pub trait Handler: Send + Sync + 'static {
    fn handle(&self, request: &Request, response: &mut Response);
}

impl<F> Handler for F
where
    F: Fn(&Request, &mut Response) + Send + Sync + 'static,
{
    fn handle(&self, request: &Request, response: &mut Response) {
        self(request, response)
    }
}

/// Runs `handler` against a fresh response and applies the not-implemented
/// fallback.
pub fn respond(handler: &dyn Handler, request: &Request) -> Response {
    let mut response = Response::default();
    handler.handle(request, &mut response);
    if !response.ok() {
        response.status = StatusCode::NotImplemented;
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Method;

    #[test]
    fn silent_handler_gets_not_implemented() {
        let handler = |_: &Request, _: &mut Response| {};
        let response = respond(&handler, &Request::new(Method::GET, "/"));
        assert_eq!(response.status, StatusCode::NotImplemented);
    }

    #[test]
    fn handler_status_is_kept() {
        let handler = |_: &Request, resp: &mut Response| resp.status = StatusCode::Accepted;
        let response = respond(&handler, &Request::new(Method::GET, "/"));
        assert_eq!(response.status, StatusCode::Accepted);
    }
}

use std::sync::Arc;

use nethttp::config::Config;
use nethttp::http::{Method, Request, Response, StatusCode};
use nethttp::server::Server;

/// Demo handler: echoes POST bodies, greets GET, answers HEAD without a body.
fn handle(request: &Request, response: &mut Response) {
    response.headers.set("Content-Type", "text/plain");
    match request.method {
        Method::POST => {
            response.status = StatusCode::Ok;
            response.body = request.body.clone();
        }
        Method::GET => {
            response.status = StatusCode::Ok;
            response.body = format!("Hello from nethttp: {}\n", request.path).into_bytes();
        }
        Method::HEAD => response.status = StatusCode::Ok,
        _ => response.status = StatusCode::MethodNotAllowed,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;

    let server = Arc::new(Server::with_config(cfg.server.clone(), handle));
    server.start(cfg.server.port)?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    // stop() blocks until every connection thread has exited
    let stopping = Arc::clone(&server);
    tokio::task::spawn_blocking(move || stopping.stop()).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(method: Method) -> Response {
        let mut request = Request::new(method, "/demo");
        request.body = b"ping".to_vec();
        let mut response = Response::default();
        handle(&request, &mut response);
        response
    }

    #[test]
    fn head_has_no_body() {
        let response = call(Method::HEAD);
        assert_eq!(response.status, StatusCode::Ok);
        assert!(response.body.is_empty());
    }

    #[test]
    fn get_greets_and_post_echoes() {
        assert_eq!(call(Method::GET).body, b"Hello from nethttp: /demo\n");
        assert_eq!(call(Method::POST).body, b"ping");
        assert_eq!(call(Method::DELETE).status, StatusCode::MethodNotAllowed);
    }
}

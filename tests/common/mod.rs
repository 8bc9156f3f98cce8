// * Local HTTP server standing in for the proxy list page and the remote store

#![allow(dead_code)]

use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Request, Response, Server};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

pub const PROXY_PAGE: &str = "<!DOCTYPE html><html><head><title>Free Proxy List</title></head><body>\
    <div class=\"table-responsive\"><table class=\"table\" id=\"proxylisttable\">\
    <thead><tr><th>IP Address</th><th>Port</th><th>Code</th><th>Country</th>\
    <th>Anonymity</th><th>Google</th><th>Https</th><th>Last Checked</th></tr></thead>\
    <tbody>\
    <tr><td>1.2.3.4</td><td>8080</td><td>US</td><td>United States</td><td>elite proxy</td><td>yes</td><td>no</td><td>5 minutes ago</td></tr>\
    <tr><td>10.0.0.1</td><td>3128</td><td>DE</td><td>Germany</td><td>anonymous</td><td>no</td><td>yes</td><td>1 hour ago</td></tr>\
    </tbody></table></div></body></html>";

/// One request as seen by the server
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

pub type RequestLog = Arc<Mutex<Vec<Recorded>>>;

/// Spawns a server on an ephemeral port; `respond` maps each request to (status, body)
pub async fn spawn_server<F>(respond: F) -> (SocketAddr, RequestLog)
where
    F: Fn(&Recorded) -> (u16, String) + Send + Sync + 'static,
{
    let log: RequestLog = Arc::new(Mutex::new(Vec::new()));
    let respond = Arc::new(respond);
    let server_log = log.clone();

    let make_svc = make_service_fn(move |_conn| {
        let log = server_log.clone();
        let respond = respond.clone();
        async move {
            Ok::<_, Infallible>(service_fn(move |req: Request<Body>| {
                let log = log.clone();
                let respond = respond.clone();
                async move {
                    let method = req.method().to_string();
                    let path = req.uri().path().to_string();
                    let content_type = req
                        .headers()
                        .get("content-type")
                        .and_then(|v| v.to_str().ok())
                        .map(String::from);
                    let body = hyper::body::to_bytes(req.into_body())
                        .await
                        .map(|b| b.to_vec())
                        .unwrap_or_default();

                    let recorded = Recorded {
                        method,
                        path,
                        content_type,
                        body,
                    };
                    let (status, body) = respond(&recorded);
                    log.lock().unwrap().push(recorded);

                    Ok::<_, Infallible>(
                        Response::builder()
                            .status(status)
                            .body(Body::from(body))
                            .unwrap(),
                    )
                }
            }))
        }
    });

    let server = Server::bind(&SocketAddr::from(([127, 0, 0, 1], 0))).serve(make_svc);
    let addr = server.local_addr();
    tokio::spawn(server);
    (addr, log)
}

/// Page at `/`, 204 on `DELETE /proxies`, 201 on `POST /proxies/batch`
pub async fn spawn_happy_server() -> (SocketAddr, RequestLog) {
    spawn_server(|req| match (req.method.as_str(), req.path.as_str()) {
        ("GET", "/") => (200, PROXY_PAGE.to_string()),
        ("DELETE", "/proxies") => (204, String::new()),
        ("POST", "/proxies/batch") => (201, "{\"saved\":true}".to_string()),
        _ => (404, "Not Found".to_string()),
    })
    .await
}

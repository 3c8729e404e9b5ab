//! One registration block mounted under several prefixes.

use axum::http::Method;
use tinyweb::{RegistrationError, Scope, WebServer};

mod common;

fn composition(p: &mut Scope<'_>) -> Result<(), RegistrationError> {
    p.end_point(Method::GET, "/endpoint", |_req, res, _ctx| {
        res.ok("Hello from composed endpoint")
    })
}

fn composed_server() -> WebServer {
    let mut server = WebServer::new(common::local_config());
    server.path("/first", composition).unwrap();
    server.path("/second", composition).unwrap();
    server.path("/third", composition).unwrap();
    server.start().unwrap();
    server
}

#[tokio::test]
async fn every_mount_point_answers() {
    let mut server = composed_server();
    for prefix in ["/first", "/second", "/third"] {
        let (status, body) = common::get(&server, &format!("{}/endpoint", prefix)).await;
        assert_eq!(status, 200, "{}", prefix);
        assert_eq!(body, "Hello from composed endpoint");
    }
    server.stop().unwrap();
}

#[tokio::test]
async fn composition_is_not_mounted_elsewhere() {
    let mut server = composed_server();
    assert_eq!(common::get(&server, "/endpoint").await.0, 404);
    assert_eq!(common::get(&server, "/fourth/endpoint").await.0, 404);
    server.stop().unwrap();
}

#[test]
fn mounts_are_listed_in_order() {
    let mut server = WebServer::new(common::local_config());
    server.path("/second", composition).unwrap();
    server.path("/first", composition).unwrap();
    let paths: Vec<String> = server.routes().describe().into_iter().map(|(_, p)| p).collect();
    assert_eq!(paths, vec!["/first/endpoint", "/second/endpoint"]);
}

#[tokio::test]
async fn composition_with_path_variable() {
    fn greeting(p: &mut Scope<'_>) -> Result<(), RegistrationError> {
        p.end_point(Method::GET, "/{name}", |req, res, _ctx| {
            res.ok(format!("Hello, {}!", req.param("name").unwrap_or("?")))
        })
    }

    let mut server = WebServer::new(common::local_config());
    server.path("/hello", greeting).unwrap();
    server.path("/hi", greeting).unwrap();
    server.start().unwrap();

    assert_eq!(common::get(&server, "/hello/fred").await, (200, "Hello, fred!".to_string()));
    assert_eq!(common::get(&server, "/hi/wilma/").await, (200, "Hello, wilma!".to_string()));
    assert_eq!(common::get(&server, "/hi/a/b").await.0, 404);

    server.stop().unwrap();
}

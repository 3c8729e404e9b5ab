//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::sync::OnceLock;

use regex::Regex;
use tinyweb::{ServerConfig, WebServer};

/// Config bound to an ephemeral localhost port with a short drain.
pub fn local_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.listener.worker_threads = 2;
    config.timeouts.shutdown_secs = 1;
    config
}

/// Client that never routes localhost through an environment proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Absolute URL for `path` on a started server.
pub fn url(server: &WebServer, path: &str) -> String {
    format!("http://{}{}", server.local_addr().unwrap(), path)
}

pub async fn get(server: &WebServer, path: &str) -> (u16, String) {
    let res = client().get(url(server, path)).send().await.unwrap();
    let status = res.status().as_u16();
    (status, res.text().await.unwrap())
}

pub async fn get_with_header(server: &WebServer, path: &str, name: &str, value: &str) -> (u16, String) {
    let res = client()
        .get(url(server, path))
        .header(name, value)
        .send()
        .await
        .unwrap();
    let status = res.status().as_u16();
    (status, res.text().await.unwrap())
}

/// Rotate printable ASCII by 47. Its own inverse.
pub fn rot47(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            '!'..='O' => char::from(c as u8 + 47),
            'P'..='~' => char::from(c as u8 - 47),
            _ => c,
        })
        .collect()
}

/// The user behind a `logged-in` cookie, if it decodes to an email address.
///
/// Toy scheme for tests only: rot47 is not encryption.
pub fn authenticated_user(cookie: Option<&str>) -> Option<String> {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    let email = EMAIL.get_or_init(|| Regex::new(r"^[\w.%+-]+@[\w.-]+\.[a-zA-Z]{2,6}$").unwrap());

    let decoded = rot47(cookie?);
    email.is_match(&decoded).then_some(decoded)
}

#[test]
fn rot47_decodes_known_cookie() {
    assert_eq!(rot47("7C65o6I2>A=6]4@>"), "fred@example.com");
    assert_eq!(rot47(&rot47("any text")), "any text");
    assert_eq!(authenticated_user(Some("aeiouaeiou")), None);
    assert_eq!(authenticated_user(None), None);
}

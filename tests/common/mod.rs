#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::Router;
use cinevibe::Config;

/// Serves `app` on a loopback port and returns its base URL
pub async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

pub fn config(vars: &[(&str, &str)]) -> Config {
    Config::from_vars(
        vars.iter()
            .map(|(key, value)| (key.to_string(), value.to_string())),
    )
    .unwrap()
}

/// Requests seen by a stand-in server, as `(path, query params)`
#[derive(Clone, Default)]
pub struct RequestLog(Arc<Mutex<Vec<(String, HashMap<String, String>)>>>);

impl RequestLog {
    pub fn record(&self, path: &str, params: HashMap<String, String>) {
        self.0.lock().unwrap().push((path.to_string(), params));
    }

    pub fn paths(&self) -> Vec<String> {
        self.0.lock().unwrap().iter().map(|(p, _)| p.clone()).collect()
    }

    pub fn params_for(&self, path: &str) -> Option<HashMap<String, String>> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, params)| params.clone())
    }
}

//! Axum stub standing in for the external services.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
    Router,
};
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
pub struct Captured {
    pub method: String,
    pub path: String,
    pub headers: String,
    pub body: Vec<u8>,
}

impl Captured {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

pub struct Stub {
    pub base: String,
    requests: Arc<Mutex<Vec<Captured>>>,
}

impl Stub {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn requests(&self) -> Vec<Captured> {
        self.requests.lock().unwrap().clone()
    }
}

#[derive(Clone)]
struct Replies {
    requests: Arc<Mutex<Vec<Captured>>>,
    responses: Arc<Vec<(u16, String)>>,
}

async fn reply(
    State(replies): State<Replies>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let headers = headers
        .iter()
        .map(|(name, value)| format!("{name}: {}\r\n", value.to_str().unwrap_or_default()))
        .collect();

    let served = {
        let mut requests = replies.requests.lock().unwrap();
        requests.push(Captured {
            method: method.to_string(),
            path: uri.path().to_string(),
            headers,
            body: body.to_vec(),
        });
        requests.len() - 1
    };

    let (status, body) = &replies.responses[served.min(replies.responses.len() - 1)];
    (
        StatusCode::from_u16(*status).unwrap(),
        [(header::CONTENT_TYPE, "application/json")],
        body.clone(),
    )
}

async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    base
}

/// Answers requests with `responses` in order, repeating the last one
pub async fn serve(responses: Vec<(u16, &str)>) -> Stub {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let replies = Replies {
        requests: requests.clone(),
        responses: Arc::new(
            responses
                .into_iter()
                .map(|(status, body)| (status, body.to_string()))
                .collect(),
        ),
    };
    let app = Router::new().fallback(reply).with_state(replies);

    Stub {
        base: spawn(app).await,
        requests,
    }
}

/// Accepts requests and never answers
pub async fn serve_silent() -> Stub {
    let app = Router::new().fallback(|| async {
        std::future::pending::<()>().await;
        StatusCode::OK
    });

    Stub {
        base: spawn(app).await,
        requests: Arc::new(Mutex::new(Vec::new())),
    }
}

/// Address on which nothing listens
pub async fn closed_port() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;

use http::{Request, Response, StatusCode};
use indieauth_common::HttpClient;
use tokio::sync::Mutex;

/// Canned-response HTTP client recording every request it sees.
#[derive(Clone, Default)]
pub(crate) struct MockClient {
    queue: Arc<Mutex<VecDeque<Response<Vec<u8>>>>>,
    pub(crate) log: Arc<Mutex<Vec<Request<Vec<u8>>>>>,
}

impl MockClient {
    pub(crate) async fn push(&self, response: Response<Vec<u8>>) {
        self.queue.lock().await.push_back(response);
    }

    pub(crate) async fn push_json(&self, value: serde_json::Value) {
        self.push(
            Response::builder()
                .status(StatusCode::OK)
                .header("Content-Type", "application/json")
                .body(serde_json::to_vec(&value).unwrap())
                .unwrap(),
        )
        .await;
    }

    pub(crate) async fn push_html(&self, html: &str) {
        self.push(
            Response::builder()
                .status(StatusCode::OK)
                .header("Content-Type", "text/html")
                .body(html.as_bytes().to_vec())
                .unwrap(),
        )
        .await;
    }

    pub(crate) async fn push_status(&self, status: StatusCode) {
        self.push(Response::builder().status(status).body(Vec::new()).unwrap())
            .await;
    }

    pub(crate) async fn requests(&self) -> Vec<Request<Vec<u8>>> {
        std::mem::take(&mut *self.log.lock().await)
    }
}

impl HttpClient for MockClient {
    type Error = std::convert::Infallible;
    fn send_http(
        &self,
        request: Request<Vec<u8>>,
    ) -> impl Future<Output = core::result::Result<Response<Vec<u8>>, Self::Error>> + Send {
        let queue = self.queue.clone();
        let log = self.log.clone();
        async move {
            log.lock().await.push(request);
            Ok(queue
                .lock()
                .await
                .pop_front()
                .expect("no canned response left"))
        }
    }
}

pub(crate) fn header<'a>(request: &'a Request<Vec<u8>>, name: &str) -> Option<&'a str> {
    request.headers().get(name).and_then(|v| v.to_str().ok())
}

pub(crate) fn body(request: &Request<Vec<u8>>) -> &str {
    std::str::from_utf8(request.body()).unwrap()
}

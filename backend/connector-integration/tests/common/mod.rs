#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use common_utils::{errors::CustomResult, request::Request, Method};
use domain_types::{errors::ApiClientError, router_response_types::Response};
use error_stack::report;
use interfaces::api::ConnectorTransport;

/// What every call to a [`MockTransport`] answers with.
#[derive(Clone, Debug)]
pub enum Reply {
    Respond { status_code: u16, body: &'static str },
    Fail(ApiClientError),
}

/// In-process transport that records each request and replays one reply.
#[derive(Clone)]
pub struct MockTransport {
    reply: Reply,
    calls: Arc<Mutex<Vec<(Method, String)>>>,
}

impl MockTransport {
    pub fn respond(status_code: u16, body: &'static str) -> Self {
        Self::new(Reply::Respond { status_code, body })
    }

    pub fn fail(error: ApiClientError) -> Self {
        Self::new(Reply::Fail(error))
    }

    fn new(reply: Reply) -> Self {
        Self {
            reply,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn boxed(&self) -> Box<dyn ConnectorTransport> {
        Box::new(self.clone())
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<(Method, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ConnectorTransport for MockTransport {
    async fn send(&self, request: Request) -> CustomResult<Response, ApiClientError> {
        self.calls
            .lock()
            .unwrap()
            .push((request.method, request.url.clone()));

        match &self.reply {
            Reply::Respond { status_code, body } => Ok(Response {
                headers: Some(http::HeaderMap::new()),
                response: bytes::Bytes::from_static(body.as_bytes()),
                status_code: *status_code,
            }),
            Reply::Fail(error) => Err(report!(error.clone())),
        }
    }
}

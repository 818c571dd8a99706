#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::Read;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use async_trait::async_trait;
use tiny_http::{Response, Server, StatusCode};

use zapple_pay_core::{
    AuthorizationParams, AuthorizationRequest, AuthorizationStatus, PortError, WalletAuthPort,
};

pub const SAMPLE_PUBKEY: &str = "32e1827635450ebb3c5a7d12c1f8e7b2b514439ac10a67eef3d9fd9c5c68e245";

#[derive(Debug)]
struct Script {
    created: VecDeque<(Duration, Result<(String, String), PortError>)>,
    statuses: VecDeque<(Duration, AuthorizationStatus)>,
    fallback: AuthorizationStatus,
    create_calls: usize,
    status_calls: Vec<String>,
}

/// In-memory wallet auth service answering from a script.
#[derive(Debug, Clone)]
pub struct ScriptedPort {
    inner: Arc<Mutex<Script>>,
}

impl ScriptedPort {
    pub fn new(fallback: AuthorizationStatus) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Script {
                created: VecDeque::new(),
                statuses: VecDeque::new(),
                fallback,
                create_calls: 0,
                status_calls: Vec::new(),
            })),
        }
    }

    pub fn with_created(self, id: &str) -> Self {
        self.with_slow_created(id, Duration::ZERO)
    }

    /// The service answers `id` only after `delay`.
    pub fn with_slow_created(self, id: &str, delay: Duration) -> Self {
        self.inner.lock().expect("script lock").created.push_back((
            delay,
            Ok((
                id.to_owned(),
                format!("nostr+walletauth://{id}?relay=wss%3A%2F%2Frelay.example&secret=00"),
            )),
        ));
        self
    }

    pub fn with_create_error(self, err: PortError) -> Self {
        self.inner
            .lock()
            .expect("script lock")
            .created
            .push_back((Duration::ZERO, Err(err)));
        self
    }

    pub fn with_statuses(self, statuses: &[bool]) -> Self {
        for connected in statuses {
            self.push_status(Duration::ZERO, *connected);
        }
        self
    }

    pub fn push_status(&self, delay: Duration, connected: bool) {
        self.inner
            .lock()
            .expect("script lock")
            .statuses
            .push_back((delay, AuthorizationStatus::from(connected)));
    }

    pub fn create_calls(&self) -> usize {
        self.inner.lock().expect("script lock").create_calls
    }

    pub fn status_calls(&self) -> usize {
        self.inner.lock().expect("script lock").status_calls.len()
    }

    pub fn polled_ids(&self) -> Vec<String> {
        self.inner.lock().expect("script lock").status_calls.clone()
    }
}

#[async_trait]
impl WalletAuthPort for ScriptedPort {
    async fn create_authorization(
        &self,
        params: &AuthorizationParams,
    ) -> Result<AuthorizationRequest, PortError> {
        let (delay, next) = {
            let mut script = self.inner.lock().expect("script lock");
            script.create_calls += 1;
            script.created.pop_front().unwrap_or_else(|| {
                (
                    Duration::ZERO,
                    Err(PortError::Transport("no scripted creation".to_owned())),
                )
            })
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let (id, uri) = next?;
        AuthorizationRequest::new(id, uri, params).map_err(|e| PortError::Malformed(e.to_string()))
    }

    async fn authorization_status(&self, id: &str) -> Result<AuthorizationStatus, PortError> {
        let (delay, status) = {
            let mut script = self.inner.lock().expect("script lock");
            script.status_calls.push(id.to_owned());
            let fallback = script.fallback;
            script
                .statuses
                .pop_front()
                .unwrap_or((Duration::ZERO, fallback))
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(status)
    }
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: String,
    pub url: String,
    pub body: String,
}

pub type Calls = Arc<Mutex<Vec<RecordedCall>>>;

/// Serves every request with `route(method, url, body) -> (status, body)`.
pub fn spawn_mock_server<F>(route: F) -> (String, Calls)
where
    F: Fn(&str, &str, &str) -> (u16, String) + Send + 'static,
{
    let server = Server::http("127.0.0.1:0").expect("start server");
    let addr = format!("http://{}", server.server_addr());
    let calls: Calls = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&calls);

    thread::spawn(move || {
        while let Ok(mut req) = server.recv() {
            let method = req.method().to_string().to_ascii_uppercase();
            let url = req.url().to_owned();
            let mut body = String::new();
            let _ = req.as_reader().read_to_string(&mut body);

            let (code, payload) = route(&method, &url, &body);
            if let Ok(mut g) = recorded.lock() {
                g.push(RecordedCall { method, url, body });
            }

            let response = Response::from_string(payload)
                .with_status_code(StatusCode(code))
                .with_header(
                    "Content-Type: application/json"
                        .parse::<tiny_http::Header>()
                        .expect("header"),
                );
            let _ = req.respond(response);
        }
    });

    (addr, calls)
}

pub fn calls_to(calls: &Calls, path_prefix: &str) -> Vec<RecordedCall> {
    calls
        .lock()
        .expect("calls lock")
        .iter()
        .filter(|c| c.url.starts_with(path_prefix))
        .cloned()
        .collect()
}

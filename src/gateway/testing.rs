//! In-memory transport with scripted replies for tests

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::{OutboundRequest, RawResponse, Transport, TransportError};

#[derive(Clone, Debug)]
enum Outcome {
    Reply { status: u16, body: String },
    Fail(String),
}

#[derive(Clone, Debug)]
struct Scripted {
    delay: Duration,
    outcome: Outcome,
}

/// Replies are queued per path (query ignored). The last queued reply for a
/// path is sticky; unknown paths answer 404.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    routes: Mutex<HashMap<String, VecDeque<Scripted>>>,
    calls: Mutex<Vec<OutboundRequest>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ScriptedTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push(&self, path: &str, scripted: Scripted) {
        let mut routes = self.routes.lock().unwrap();
        routes.entry(path.to_string()).or_default().push_back(scripted);
    }

    pub(crate) fn json(&self, path: &str, value: serde_json::Value) {
        self.json_delayed(path, value, Duration::ZERO);
    }

    pub(crate) fn json_delayed(&self, path: &str, value: serde_json::Value, delay: Duration) {
        self.push(
            path,
            Scripted {
                delay,
                outcome: Outcome::Reply { status: 200, body: value.to_string() },
            },
        );
    }

    pub(crate) fn raw(&self, path: &str, status: u16, body: &str) {
        self.push(
            path,
            Scripted {
                delay: Duration::ZERO,
                outcome: Outcome::Reply { status, body: body.to_string() },
            },
        );
    }

    pub(crate) fn status(&self, path: &str, status: u16) {
        self.raw(path, status, r#"{"ok": false, "error": "scripted"}"#);
    }

    pub(crate) fn fail(&self, path: &str, message: &str) {
        self.push(
            path,
            Scripted {
                delay: Duration::ZERO,
                outcome: Outcome::Fail(message.to_string()),
            },
        );
    }

    pub(crate) fn calls(&self) -> Vec<OutboundRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn calls_to(&self, path: &str) -> Vec<OutboundRequest> {
        self.calls()
            .into_iter()
            .filter(|call| route_of(&call.path) == path)
            .collect()
    }

    pub(crate) fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_reply(&self, path: &str) -> Scripted {
        let mut routes = self.routes.lock().unwrap();
        match routes.get_mut(path) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) if !queue.is_empty() => queue[0].clone(),
            _ => Scripted {
                delay: Duration::ZERO,
                outcome: Outcome::Reply { status: 404, body: "{}".to_string() },
            },
        }
    }
}

fn route_of(path: &str) -> &str {
    path.split('?').next().unwrap_or(path)
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: OutboundRequest) -> Result<RawResponse, TransportError> {
        let scripted = self.next_reply(route_of(&request.path));
        self.calls.lock().unwrap().push(request);

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        if !scripted.delay.is_zero() {
            tokio::time::sleep(scripted.delay).await;
        }

        match scripted.outcome {
            Outcome::Reply { status, body } => Ok(RawResponse {
                status,
                body: body.into_bytes(),
            }),
            Outcome::Fail(message) => Err(TransportError(message)),
        }
    }
}

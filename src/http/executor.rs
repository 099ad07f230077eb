//! Executes request specs: build, send, classify, retry.

use async_trait::async_trait;
use log::debug;
use std::env::VarError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

use super::classify::classify;
use super::request::{PreparedRequest, RequestSpec, build_request};
use super::retry::with_retry;
use super::transport::{RawResponse, Transport, TransportError};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::runtime::Runtime;

/// Triggers every [`CancelSignal`] created alongside it.
#[derive(Debug, Clone)]
pub struct CancelHandle(Arc<watch::Sender<bool>>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.send_replace(true);
    }
}

/// Observes a [`CancelHandle`]. Cheap to clone.
#[derive(Debug, Clone)]
pub struct CancelSignal(watch::Receiver<bool>);

impl CancelSignal {
    pub fn is_cancelled(&self) -> bool {
        *self.0.borrow()
    }

    /// Resolves once cancelled. Never resolves if the handle is dropped first.
    pub async fn cancelled(&self) {
        let mut rx = self.0.clone();
        let triggered = rx.wait_for(|cancelled| *cancelled).await.is_ok();
        if !triggered {
            std::future::pending::<()>().await;
        }
    }
}

/// Creates a connected cancel handle and signal.
pub fn cancel_pair() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle(Arc::new(tx)), CancelSignal(rx))
}

/// Per-call controls. Either one abandons an in-flight send, which then
/// counts as a transport failure, and cuts any pending backoff short.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    pub deadline: Option<Instant>,
    pub cancel: Option<CancelSignal>,
}

impl CallOptions {
    fn deadline_passed(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Resolves when the call is cancelled or its deadline passes.
    async fn interrupted(&self) {
        match (&self.cancel, self.deadline) {
            (Some(signal), Some(deadline)) => tokio::select! {
                _ = signal.cancelled() => {}
                _ = tokio::time::sleep_until(deadline) => {}
            },
            (Some(signal), None) => signal.cancelled().await,
            (None, Some(deadline)) => tokio::time::sleep_until(deadline).await,
            (None, None) => std::future::pending().await,
        }
    }
}

/// The client runtime seen by one call: backoff sleeps end early once the
/// call is interrupted.
struct CallRuntime<'a> {
    inner: &'a dyn Runtime,
    options: &'a CallOptions,
}

#[async_trait]
impl<'a> Runtime for CallRuntime<'a> {
    fn env_var(&self, key: &str) -> std::result::Result<String, VarError> {
        self.inner.env_var(key)
    }

    async fn sleep(&self, duration: Duration) {
        tokio::select! {
            _ = self.inner.sleep(duration) => {}
            _ = self.options.interrupted() => debug!("Backoff cut short after cancel or deadline"),
        }
    }
}

/// Runs [`RequestSpec`]s under one client's configuration.
///
/// Holds no mutable state, so one executor can serve any number of
/// concurrent calls.
#[derive(Clone)]
pub struct Executor {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    runtime: Arc<dyn Runtime>,
}

impl Executor {
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        runtime: Arc<dyn Runtime>,
    ) -> Self {
        Self {
            config,
            transport,
            runtime,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Executes `spec` and returns the raw success body.
    #[tracing::instrument(skip(self, spec, options), fields(method = %spec.method(), path = spec.path()))]
    pub async fn execute(&self, spec: &RequestSpec, options: &CallOptions) -> Result<Vec<u8>> {
        let request = build_request(spec, &self.config)?;
        let operation_name = format!("{} {}", spec.method(), spec.path());
        let endpoint = spec.path();

        let request = &request;
        let transport = self.transport.as_ref();
        let timeout = self.config.timeout();
        let runtime = CallRuntime {
            inner: self.runtime.as_ref(),
            options,
        };

        with_retry(
            &operation_name,
            self.config.max_attempts(),
            &runtime,
            move |attempt| async move {
                debug!("Sending {} {} (attempt {})", request.method, request.url, attempt + 1);
                send_once(transport, request, timeout, options).await
            },
            |response: RawResponse| classify(response, endpoint),
        )
        .await
    }
}

async fn send_once(
    transport: &dyn Transport,
    request: &PreparedRequest,
    timeout: Duration,
    options: &CallOptions,
) -> std::result::Result<RawResponse, TransportError> {
    if options.cancel.as_ref().is_some_and(CancelSignal::is_cancelled) {
        return Err(TransportError::Cancelled);
    }
    if options.deadline_passed() {
        return Err(TransportError::DeadlineExceeded);
    }

    let send = async {
        match options.deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, transport.send(request, timeout))
                .await
                .unwrap_or(Err(TransportError::DeadlineExceeded)),
            None => transport.send(request, timeout).await,
        }
    };

    match &options.cancel {
        Some(signal) => tokio::select! {
            result = send => result,
            _ = signal.cancelled() => Err(TransportError::Cancelled),
        },
        None => send.await,
    }
}

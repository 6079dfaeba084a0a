//! tests/common/mod.rs
//!
//! Shared harness for the lifecycle integration tests: tracing setup and a
//! mock endpoint resource that records every hook call and observed state.

use async_trait::async_trait;
use petrel_lifecycle::completion::{AsyncCompletion, CompletionCallback, CorrelationState};
use petrel_lifecycle::error::{Error, Result};
use petrel_lifecycle::lifecycle::{EndpointLifecycle, EndpointState, LifecycleHooks, StateWatch};
use std::sync::{Arc, Mutex, Once, OnceLock};
use std::time::Duration;

/// Initializes tracing for tests, ensuring it's only done once.
pub fn init_tracing() {
    static TRACING_INIT: Once = Once::new();
    TRACING_INIT.call_once(|| {
        let filter = std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "petrel_lifecycle=debug".to_string());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .init();
    });
}

/// A mock endpoint resource in the shape of the real thing: every hook
/// records its name and the state it observed, begin-hooks hand out tokens
/// the test completes manually, and any single hook can be armed to fail
/// with a chosen message.
pub struct MockEndpoint {
    calls: Mutex<Vec<&'static str>>,
    entry_states: Mutex<Vec<(&'static str, EndpointState)>>,
    watch: OnceLock<StateWatch>,
    fail_at: Mutex<Option<(&'static str, String)>>,
    pub open_token: Mutex<Option<Arc<AsyncCompletion>>>,
    pub close_token: Mutex<Option<Arc<AsyncCompletion>>>,
}

impl MockEndpoint {
    /// Builds the mock together with its lifecycle, already wired to observe
    /// the lifecycle's state from inside hooks.
    pub fn create() -> (Arc<MockEndpoint>, Arc<EndpointLifecycle<MockEndpoint>>) {
        let mock = Arc::new(MockEndpoint {
            calls: Mutex::new(Vec::new()),
            entry_states: Mutex::new(Vec::new()),
            watch: OnceLock::new(),
            fail_at: Mutex::new(None),
            open_token: Mutex::new(None),
            close_token: Mutex::new(None),
        });
        let lifecycle = Arc::new(EndpointLifecycle::new(mock.clone()));
        let _ = mock.watch.set(lifecycle.state_watch());
        (mock, lifecycle)
    }

    /// Arms one hook to fail with the given message.
    pub fn fail_at(&self, hook: &'static str, message: &str) {
        *self.fail_at.lock().unwrap() = Some((hook, message.to_string()));
    }

    /// The hook names in invocation order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    /// The hook names joined with commas, for order assertions.
    pub fn calls_joined(&self) -> String {
        self.calls().join(",")
    }

    /// The state observed at the entry of the named hook.
    pub fn entry_state(&self, hook: &'static str) -> Option<EndpointState> {
        self.entry_states
            .lock()
            .unwrap()
            .iter()
            .find(|(name, _)| *name == hook)
            .map(|(_, state)| *state)
    }

    /// The token handed out by the most recent `on_begin_open`.
    pub fn open_token(&self) -> Arc<AsyncCompletion> {
        self.open_token.lock().unwrap().clone().unwrap()
    }

    /// The token handed out by the most recent `on_begin_close`.
    pub fn close_token(&self) -> Arc<AsyncCompletion> {
        self.close_token.lock().unwrap().clone().unwrap()
    }

    fn record(&self, hook: &'static str) -> Result<()> {
        self.calls.lock().unwrap().push(hook);
        if let Some(watch) = self.watch.get() {
            self.entry_states.lock().unwrap().push((hook, watch.current()));
        }
        if let Some((at, message)) = self.fail_at.lock().unwrap().clone() {
            if at == hook {
                return Err(Error::Resource(message));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl LifecycleHooks for MockEndpoint {
    fn on_opening(&self) -> Result<()> {
        self.record("on_opening")
    }

    async fn on_open(&self, _timeout: Duration) -> Result<()> {
        self.record("on_open")
    }

    fn on_begin_open(
        &self,
        timeout: Duration,
        callback: Option<CompletionCallback>,
        state: Option<CorrelationState>,
    ) -> Result<Arc<AsyncCompletion>> {
        self.record("on_begin_open")?;
        let token = AsyncCompletion::new(timeout, callback, state);
        *self.open_token.lock().unwrap() = Some(token.clone());
        Ok(token)
    }

    fn on_opened(&self) -> Result<()> {
        self.record("on_opened")
    }

    fn on_closing(&self) -> Result<()> {
        self.record("on_closing")
    }

    async fn on_close(&self, _timeout: Duration) -> Result<()> {
        self.record("on_close")
    }

    fn on_begin_close(
        &self,
        timeout: Duration,
        callback: Option<CompletionCallback>,
        state: Option<CorrelationState>,
    ) -> Result<Arc<AsyncCompletion>> {
        self.record("on_begin_close")?;
        let token = AsyncCompletion::new(timeout, callback, state);
        *self.close_token.lock().unwrap() = Some(token.clone());
        Ok(token)
    }

    fn on_closed(&self) -> Result<()> {
        self.record("on_closed")
    }

    fn on_abort(&self) {
        let _ = self.record("on_abort");
    }
}

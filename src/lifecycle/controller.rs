//! 端点生命周期控制器 - 统一管理打开/关闭/中止的完整协议
//! Endpoint Lifecycle Controller - Unified management of the full
//! open/close/abort protocol.
//!
//! 该模块是状态机本体：校验当前状态、按规定顺序调用派生资源的钩子、
//! 触发生命周期事件，并序列化并发转换。阻塞与非阻塞入口共享同一套
//! 钩子协议，对外行为完全一致。
//!
//! This module is the state machine proper: it validates the current state,
//! invokes the derived resource's hooks in the mandated order, fires the
//! lifecycle events, and serializes concurrent transitions. The blocking and
//! non-blocking entry points share one hook protocol and are observably
//! identical.

use super::{
    events::{EventDispatcher, EventListener, LifecycleEvent},
    hooks::LifecycleHooks,
    state::{EndpointState, StateWatch},
    validation::StateValidator,
};
use crate::{
    completion::{AsyncCompletion, CompletionCallback, CorrelationState},
    config::LifecycleConfig,
    error::{Error, Result},
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, trace, warn};

/// The lifecycle state machine for one communication endpoint.
///
/// The derived resource supplies the hook implementation `H`; the controller
/// owns the state, the transition guard and the event subscriber lists. One
/// controller tracks exactly one logical lifecycle, from `Created` to a
/// terminal state.
///
/// 单个通信端点的生命周期状态机。
///
/// 派生资源提供钩子实现 `H`；控制器拥有状态、转换守卫和事件订阅者列表。
/// 一个控制器恰好跟踪一个逻辑生命周期，从 `Created` 到某个终态。
pub struct EndpointLifecycle<H: LifecycleHooks> {
    /// The derived resource's hook implementation.
    /// 派生资源的钩子实现。
    hooks: Arc<H>,
    /// The shared state cell hooks and subscribers observe.
    /// 钩子和订阅者观察的共享状态单元。
    state: StateWatch,
    /// Per-event subscriber lists.
    /// 按事件划分的订阅者列表。
    events: EventDispatcher,
    /// Serializes transitions. Held across the entire hook sequence of one
    /// transition, so two transitions never interleave their hooks.
    /// 序列化转换。在一次转换的整个钩子序列期间持有，因此两次转换的钩子
    /// 永远不会交错。
    transition: Mutex<()>,
    /// Configuration for the default-timeout conveniences.
    /// 默认超时便捷方法使用的配置。
    config: LifecycleConfig,
    /// Endpoint ID for logging.
    /// 端点ID，用于日志记录。
    id: u32,
}

impl<H: LifecycleHooks> std::fmt::Debug for EndpointLifecycle<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointLifecycle")
            .field("id", &self.id)
            .field("state", &self.state.current())
            .field("config", &self.config)
            .finish()
    }
}

impl<H: LifecycleHooks> EndpointLifecycle<H> {
    /// Creates a new lifecycle in the `Created` state with default configuration.
    /// 以默认配置创建一个处于 `Created` 状态的新生命周期。
    pub fn new(hooks: Arc<H>) -> Self {
        Self::with_config(hooks, LifecycleConfig::default())
    }

    /// Creates a new lifecycle in the `Created` state.
    /// 创建一个处于 `Created` 状态的新生命周期。
    pub fn with_config(hooks: Arc<H>, config: LifecycleConfig) -> Self {
        let id = rand::random();
        trace!(id, "Endpoint lifecycle created");
        Self {
            hooks,
            state: StateWatch::new(EndpointState::Created),
            events: EventDispatcher::new(),
            transition: Mutex::new(()),
            config,
            id,
        }
    }

    /// The current state.
    /// 当前状态。
    pub fn state(&self) -> EndpointState {
        self.state.current()
    }

    /// A cloneable read view of the state, for hooks and subscribers that
    /// need to observe the in-progress value from another context.
    ///
    /// 状态的可克隆只读视图，供需要从其他上下文观察进行中状态值的钩子和
    /// 订阅者使用。
    pub fn state_watch(&self) -> StateWatch {
        self.state.clone()
    }

    /// The endpoint ID used in log records.
    /// 日志记录中使用的端点ID。
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Subscribes a listener to one lifecycle event. Listeners fire in
    /// registration order, synchronously inside the transition.
    ///
    /// 为一个生命周期事件订阅监听器。监听器按注册顺序在转换内部同步触发。
    pub fn subscribe(&self, event: LifecycleEvent, listener: EventListener) {
        self.events.subscribe(event, listener);
    }

    /// Opens the endpoint, blocking until the full hook sequence
    /// (`on_opening`, `on_open`, `on_opened`) has run.
    ///
    /// Valid only from `Created`. A hook failure propagates unchanged and
    /// leaves the state wherever the failing hook left it.
    ///
    /// 打开端点，阻塞直到完整的钩子序列（`on_opening`、`on_open`、
    /// `on_opened`）执行完毕。
    ///
    /// 仅在 `Created` 状态下有效。钩子失败原样传播，状态停留在失败钩子
    /// 留下的位置。
    pub async fn open(&self, timeout: Duration) -> Result<()> {
        let _guard = self.transition.lock().await;
        self.enter_opening("open")?;

        self.hooks.on_open(timeout).await?;
        self.finish_opening("open")
    }

    /// Opens with the configured default timeout.
    /// 使用配置的默认超时时间打开。
    pub async fn open_default(&self) -> Result<()> {
        self.open(self.config.default_open_timeout).await
    }

    /// Starts a non-blocking open: runs `on_opening`, then delegates to
    /// `on_begin_open` and returns its completion token. The caller finishes
    /// the transition with [`end_open`](Self::end_open).
    ///
    /// If `on_begin_open` fails, the error propagates immediately and no
    /// token is produced.
    ///
    /// 启动非阻塞打开：执行 `on_opening`，然后委托给 `on_begin_open` 并返回
    /// 其完成令牌。调用者通过 [`end_open`](Self::end_open) 完成转换。
    ///
    /// 如果 `on_begin_open` 失败，错误立即传播且不产生令牌。
    pub async fn begin_open(
        &self,
        timeout: Duration,
        callback: Option<CompletionCallback>,
        state: Option<CorrelationState>,
    ) -> Result<Arc<AsyncCompletion>> {
        let _guard = self.transition.lock().await;
        self.enter_opening("begin_open")?;

        self.hooks.on_begin_open(timeout, callback, state)
    }

    /// Finishes a non-blocking open: waits for the token to signal, rethrows
    /// any failure the asynchronous work recorded, then runs `on_opened` and
    /// moves the endpoint to `Opened`.
    ///
    /// 完成非阻塞打开：等待令牌置位，重新抛出异步工作记录的任何失败，
    /// 然后执行 `on_opened` 并将端点移至 `Opened`。
    pub async fn end_open(&self, token: Arc<AsyncCompletion>) -> Result<()> {
        token.wait().await;
        if let Some(failure) = token.take_failure() {
            return Err(failure);
        }

        let _guard = self.transition.lock().await;
        let state = self.state.current();
        // A concurrent close or abort may have consumed the pending open.
        // 并发的关闭或中止可能已经消耗了挂起的打开。
        if state != EndpointState::Opening {
            return Err(Error::InvalidState {
                operation: "end_open",
                state,
            });
        }

        self.finish_opening("end_open")
    }

    /// Closes the endpoint, blocking until the full hook sequence
    /// (`on_closing`, `on_close`, `on_closed`) has run.
    ///
    /// Valid from `Created`, `Opening` and `Opened`. Closing an already
    /// `Closed` endpoint is a no-op that returns normally.
    ///
    /// 关闭端点，阻塞直到完整的钩子序列（`on_closing`、`on_close`、
    /// `on_closed`）执行完毕。
    ///
    /// 在 `Created`、`Opening` 和 `Opened` 状态下有效。关闭已经 `Closed`
    /// 的端点是正常返回的空操作。
    pub async fn close(&self, timeout: Duration) -> Result<()> {
        let _guard = self.transition.lock().await;
        if self.enter_closing("close")?.is_noop() {
            return Ok(());
        }

        self.hooks.on_close(timeout).await?;
        self.finish_closing("close")
    }

    /// Closes with the configured default timeout.
    /// 使用配置的默认超时时间关闭。
    pub async fn close_default(&self) -> Result<()> {
        self.close(self.config.default_close_timeout).await
    }

    /// Starts a non-blocking close. Mirrors [`begin_open`](Self::begin_open)
    /// with the close hook triple, including the idempotent no-op: from
    /// `Closed` the returned token is already completed and `end_close` does
    /// nothing further.
    ///
    /// 启动非阻塞关闭。与 [`begin_open`](Self::begin_open) 对应，使用关闭
    /// 钩子三元组，并保持幂等空操作：在 `Closed` 状态下返回的令牌已完成，
    /// `end_close` 不再做任何事。
    pub async fn begin_close(
        &self,
        timeout: Duration,
        callback: Option<CompletionCallback>,
        state: Option<CorrelationState>,
    ) -> Result<Arc<AsyncCompletion>> {
        let _guard = self.transition.lock().await;
        if self.enter_closing("begin_close")?.is_noop() {
            return Ok(AsyncCompletion::completed(timeout, callback, state));
        }

        self.hooks.on_begin_close(timeout, callback, state)
    }

    /// Finishes a non-blocking close: waits for the token, rethrows any
    /// recorded failure, then runs `on_closed` and moves the endpoint to
    /// `Closed`. If the endpoint is already `Closed` (idempotent path) this
    /// returns without re-invoking any hook.
    ///
    /// 完成非阻塞关闭：等待令牌，重新抛出记录的失败，然后执行 `on_closed`
    /// 并将端点移至 `Closed`。如果端点已经 `Closed`（幂等路径），则不再
    /// 调用任何钩子直接返回。
    pub async fn end_close(&self, token: Arc<AsyncCompletion>) -> Result<()> {
        token.wait().await;
        if let Some(failure) = token.take_failure() {
            return Err(failure);
        }

        let _guard = self.transition.lock().await;
        let state = self.state.current();
        if state == EndpointState::Closed {
            return Ok(());
        }
        if state != EndpointState::Closing {
            return Err(Error::InvalidState {
                operation: "end_close",
                state,
            });
        }

        self.finish_closing("end_close")
    }

    /// Aborts the endpoint: runs `on_closing`, `on_abort`, `on_closed` and
    /// leaves the endpoint `Closed`. Never fails from the caller's point of
    /// view; a failing notification hook is logged and skipped. Aborting an
    /// already terminal endpoint is a no-op.
    ///
    /// 中止端点：执行 `on_closing`、`on_abort`、`on_closed`，并使端点进入
    /// `Closed`。从调用者的角度看从不失败；通知钩子失败会被记录并跳过。
    /// 中止已处于终态的端点是空操作。
    pub async fn abort(&self) {
        let _guard = self.transition.lock().await;
        let state = self.state.current();
        if !StateValidator::can_abort(state) {
            trace!(id = self.id, ?state, "Abort on terminal endpoint is a no-op");
            return;
        }

        debug!(id = self.id, from = ?state, "Aborting endpoint");
        if !self.state.store_if_not_terminal(EndpointState::Closing) {
            trace!(id = self.id, "Abort lost to a concurrent fault");
            return;
        }
        self.events.fire(LifecycleEvent::Closing);
        if let Err(error) = self.hooks.on_closing() {
            warn!(id = self.id, %error, "on_closing failed during abort");
        }

        self.hooks.on_abort();

        if let Err(error) = self.hooks.on_closed() {
            warn!(id = self.id, %error, "on_closed failed during abort");
        }
        if self.state.store_if_not_terminal(EndpointState::Closed) {
            self.events.fire(LifecycleEvent::Closed);
        } else {
            // A fault raced in while the hooks ran; the endpoint stays
            // Faulted and the Closed event does not fire.
            // 钩子运行期间有故障抢先进入；端点保持 Faulted，Closed 事件
            // 不触发。
            warn!(id = self.id, "Fault reported during abort");
        }
    }

    /// Reports an asynchronous fault from the derived resource, moving the
    /// endpoint to `Faulted` unless it already reached a terminal state. The
    /// core itself never calls this.
    ///
    /// 报告来自派生资源的异步故障，除非端点已到达终态，否则将其移至
    /// `Faulted`。核心自身从不调用此方法。
    pub fn fault(&self) {
        let state = self.state.current();
        // The store and the terminal check are one atomic step; fault runs
        // without the transition guard and must not resurrect a closed
        // endpoint.
        // 存储与终态检查是同一个原子步骤；fault 在转换守卫之外运行，不得
        // 使已关闭的端点复活。
        if !self.state.store_if_not_terminal(EndpointState::Faulted) {
            trace!(id = self.id, ?state, "Fault reported on terminal endpoint, ignored");
            return;
        }
        warn!(id = self.id, from = ?state, "Endpoint faulted");
    }

    /// Validates the open precondition, moves to `Opening` and runs the
    /// shared head of both open paths (`Opening` event, `on_opening`).
    ///
    /// 校验打开的前置条件，移至 `Opening`，并执行两条打开路径共享的头部
    /// （`Opening` 事件、`on_opening`）。
    fn enter_opening(&self, operation: &'static str) -> Result<()> {
        let state = self.state.current();
        if !StateValidator::can_open(state) {
            warn!(id = self.id, ?state, operation, "Open attempted from invalid state");
            return Err(Error::InvalidState { operation, state });
        }

        debug!(id = self.id, "Opening endpoint");
        if !self.state.store_if_not_terminal(EndpointState::Opening) {
            return Err(self.faulted_mid_transition(operation));
        }
        self.events.fire(LifecycleEvent::Opening);
        self.hooks.on_opening()
    }

    /// Runs the shared tail of both open paths: `on_opened`, then the state
    /// becomes `Opened` and the `Opened` event fires. A fault reported while
    /// the hooks ran wins; the transition fails instead of overwriting it.
    ///
    /// 执行两条打开路径共享的尾部：`on_opened`，然后状态变为 `Opened` 并
    /// 触发 `Opened` 事件。钩子运行期间报告的故障获胜；转换失败而不是将其
    /// 覆盖。
    fn finish_opening(&self, operation: &'static str) -> Result<()> {
        self.hooks.on_opened()?;
        if !self.state.store_if_not_terminal(EndpointState::Opened) {
            return Err(self.faulted_mid_transition(operation));
        }
        self.events.fire(LifecycleEvent::Opened);
        debug!(id = self.id, "Endpoint opened");
        Ok(())
    }

    /// Validates the close precondition and, unless the close is an
    /// idempotent no-op, runs the shared head of both close paths.
    ///
    /// 校验关闭的前置条件，除非关闭是幂等空操作，否则执行两条关闭路径
    /// 共享的头部。
    fn enter_closing(&self, operation: &'static str) -> Result<CloseEntry> {
        let state = self.state.current();
        if StateValidator::close_is_noop(state) {
            trace!(id = self.id, operation, "Close on closed endpoint is a no-op");
            return Ok(CloseEntry::AlreadyClosed);
        }
        if !StateValidator::can_close(state) {
            warn!(id = self.id, ?state, operation, "Close attempted from invalid state");
            return Err(Error::InvalidState { operation, state });
        }

        debug!(id = self.id, from = ?state, "Closing endpoint");
        if !self.state.store_if_not_terminal(EndpointState::Closing) {
            return Err(self.faulted_mid_transition(operation));
        }
        self.events.fire(LifecycleEvent::Closing);
        self.hooks.on_closing()?;
        Ok(CloseEntry::Entered)
    }

    /// Runs the shared tail of both close paths: `on_closed`, then the state
    /// becomes `Closed` and the `Closed` event fires. A fault reported while
    /// the hooks ran wins, as in [`finish_opening`](Self::finish_opening).
    ///
    /// 执行两条关闭路径共享的尾部：`on_closed`，然后状态变为 `Closed` 并
    /// 触发 `Closed` 事件。钩子运行期间报告的故障获胜，与
    /// [`finish_opening`](Self::finish_opening) 一致。
    fn finish_closing(&self, operation: &'static str) -> Result<()> {
        self.hooks.on_closed()?;
        if !self.state.store_if_not_terminal(EndpointState::Closed) {
            return Err(self.faulted_mid_transition(operation));
        }
        self.events.fire(LifecycleEvent::Closed);
        debug!(id = self.id, "Endpoint closed");
        Ok(())
    }

    /// The error for a transition whose state store lost to a concurrent
    /// terminal write.
    /// 状态存储输给并发终态写入的转换所对应的错误。
    fn faulted_mid_transition(&self, operation: &'static str) -> Error {
        let state = self.state.current();
        warn!(id = self.id, ?state, operation, "Transition lost to a concurrent fault");
        Error::InvalidState { operation, state }
    }
}

/// The outcome of validating a close entry.
/// 关闭入口校验的结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CloseEntry {
    Entered,
    AlreadyClosed,
}

impl CloseEntry {
    fn is_noop(self) -> bool {
        self == CloseEntry::AlreadyClosed
    }
}

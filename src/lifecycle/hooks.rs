//! Traits for abstracting over derived endpoint resources.
//!
//! 用于对派生端点资源进行抽象的 trait。

use crate::completion::{AsyncCompletion, CompletionCallback, CorrelationState};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// The hook contract a derived resource implements to perform real work at
/// each lifecycle step.
///
/// Every hook has a default implementation, so a resource overrides only the
/// steps where it has work to do. The controller guarantees the invocation
/// order and the state observed during each hook; the resource guarantees the
/// work itself, including honoring the caller-supplied timeout inside
/// `on_open`/`on_close`/`on_begin_open`/`on_begin_close`.
///
/// 派生资源为在每个生命周期步骤执行实际工作而实现的钩子契约。
///
/// 每个钩子都有默认实现，资源只需覆盖有实际工作的步骤。控制器保证调用顺序
/// 和每个钩子期间可观察到的状态；资源保证工作本身，包括在
/// `on_open`/`on_close`/`on_begin_open`/`on_begin_close` 内部遵守调用者给定的超时。
#[async_trait]
pub trait LifecycleHooks: Send + Sync + 'static {
    /// Called before any open work, while the endpoint is `Opening`.
    /// 在任何打开工作之前调用，此时端点处于 `Opening` 状态。
    fn on_opening(&self) -> Result<()> {
        Ok(())
    }

    /// Performs the blocking open work (e.g. bind a socket).
    /// 执行阻塞式打开工作（例如绑定套接字）。
    async fn on_open(&self, timeout: Duration) -> Result<()> {
        let _ = timeout;
        Ok(())
    }

    /// Starts the non-blocking open work and returns its completion token.
    ///
    /// The default has no asynchronous work and hands back an
    /// already-completed token, so `end_open` returns without suspending.
    ///
    /// 启动非阻塞打开工作并返回其完成令牌。
    ///
    /// 默认实现没有异步工作，返回一个已完成的令牌，因此 `end_open` 无需挂起即返回。
    fn on_begin_open(
        &self,
        timeout: Duration,
        callback: Option<CompletionCallback>,
        state: Option<CorrelationState>,
    ) -> Result<Arc<AsyncCompletion>> {
        Ok(AsyncCompletion::completed(timeout, callback, state))
    }

    /// Called after the open work succeeded, just before the endpoint
    /// becomes `Opened`.
    /// 在打开工作成功之后、端点变为 `Opened` 之前调用。
    fn on_opened(&self) -> Result<()> {
        Ok(())
    }

    /// Called before any close work, while the endpoint is `Closing`.
    /// 在任何关闭工作之前调用，此时端点处于 `Closing` 状态。
    fn on_closing(&self) -> Result<()> {
        Ok(())
    }

    /// Performs the blocking close work (e.g. release the socket).
    /// 执行阻塞式关闭工作（例如释放套接字）。
    async fn on_close(&self, timeout: Duration) -> Result<()> {
        let _ = timeout;
        Ok(())
    }

    /// Starts the non-blocking close work and returns its completion token.
    /// 启动非阻塞关闭工作并返回其完成令牌。
    fn on_begin_close(
        &self,
        timeout: Duration,
        callback: Option<CompletionCallback>,
        state: Option<CorrelationState>,
    ) -> Result<Arc<AsyncCompletion>> {
        Ok(AsyncCompletion::completed(timeout, callback, state))
    }

    /// Called after the close work, just before the endpoint becomes `Closed`.
    /// 在关闭工作之后、端点变为 `Closed` 之前调用。
    fn on_closed(&self) -> Result<()> {
        Ok(())
    }

    /// Tears the resource down unconditionally. Best-effort: infallible by
    /// signature, so resources cannot break abort's never-fails contract here.
    ///
    /// 无条件拆除资源。尽力而为：签名上不可失败，因此资源无法在此破坏
    /// 中止的"从不失败"契约。
    fn on_abort(&self) {}
}

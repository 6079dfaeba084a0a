//! 一次性完成令牌 - 非阻塞操作的可等待结果
//! One-shot completion token - the awaitable result of a non-blocking operation.
//!
//! 该模块提供了将一次 begin 调用与其配对的 end 调用关联起来的完成原语。
//! 同一个令牌同时服务于回调驱动和阻塞等待两种消费者。
//!
//! This module provides the completion primitive that correlates one begin-style
//! call with its matching end-style call. The same token serves callback-driven
//! and block-on-wait consumers identically.

use crate::error::Error;
use std::any::Any;
use std::sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicBool, Ordering},
};
use std::time::Duration;
use tokio::sync::Notify;

/// A callback invoked exactly once when the token completes.
/// 令牌完成时恰好调用一次的回调。
pub type CompletionCallback = Box<dyn Fn(&AsyncCompletion) + Send + Sync>;

/// Opaque caller-supplied correlation state carried by the token.
/// 令牌携带的调用者提供的不透明关联状态。
pub type CorrelationState = Arc<dyn Any + Send + Sync>;

/// A one-shot completion token representing one in-flight non-blocking operation.
///
/// The token is created by a begin-style call and consumed by the matching
/// end-style call. `complete` runs its signal-and-callback sequence at most
/// once, no matter how many times or from how many tasks it is invoked.
///
/// 代表一次在途非阻塞操作的一次性完成令牌。
///
/// 令牌由 begin 调用创建，由配对的 end 调用消费。无论 `complete` 被多少任务
/// 调用多少次，其信号与回调序列至多执行一次。
pub struct AsyncCompletion {
    /// The timeout the caller supplied to the begin-call.
    /// 调用者提供给 begin 调用的超时时间。
    timeout: Duration,
    /// Invoked once after the wait handle has been signaled.
    /// 在可等待信号置位之后调用一次。
    callback: Option<CompletionCallback>,
    /// Caller-supplied correlation object, handed back through `state()`.
    /// 调用者提供的关联对象，通过 `state()` 取回。
    state: Option<CorrelationState>,
    /// Set once the completion sequence has run.
    /// 完成序列执行后置位。
    completed: AtomicBool,
    /// Whether the operation completed without suspending the caller.
    /// 操作是否在未挂起调用者的情况下完成。
    completed_synchronously: AtomicBool,
    /// The idempotence guard. Independent of any lock held elsewhere, since
    /// `complete` may run on a different task than the one that created the token.
    /// 幂等守卫。独立于其他任何锁，因为 `complete` 可能在与创建令牌不同的任务上执行。
    completing: AtomicBool,
    /// A failure recorded by the asynchronous work, consumed by the end-call.
    /// 异步工作记录的失败，由 end 调用消费。
    failure: Mutex<Option<Error>>,
    /// The waitable completion signal.
    /// 可等待的完成信号。
    notify: Notify,
}

impl std::fmt::Debug for AsyncCompletion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncCompletion")
            .field("timeout", &self.timeout)
            .field("has_callback", &self.callback.is_some())
            .field("has_state", &self.state.is_some())
            .field("completed", &self.completed.load(Ordering::Acquire))
            .field(
                "completed_synchronously",
                &self.completed_synchronously.load(Ordering::Acquire),
            )
            .finish()
    }
}

impl AsyncCompletion {
    /// Creates a new, unsignaled completion token.
    /// 创建一个新的、未置位的完成令牌。
    pub fn new(
        timeout: Duration,
        callback: Option<CompletionCallback>,
        state: Option<CorrelationState>,
    ) -> Arc<Self> {
        Arc::new(Self {
            timeout,
            callback,
            state,
            completed: AtomicBool::new(false),
            completed_synchronously: AtomicBool::new(false),
            completing: AtomicBool::new(false),
            failure: Mutex::new(None),
            notify: Notify::new(),
        })
    }

    /// Creates a token that is already completed. Used by begin-hooks whose
    /// work finishes without suspending.
    ///
    /// 创建一个已完成的令牌。供工作无需挂起即告结束的 begin 钩子使用。
    pub fn completed(
        timeout: Duration,
        callback: Option<CompletionCallback>,
        state: Option<CorrelationState>,
    ) -> Arc<Self> {
        let token = Self::new(timeout, callback, state);
        token.complete();
        token
    }

    /// Marks the token complete. The first call signals the wait handle and
    /// then invokes the callback exactly once; every later call is a no-op.
    ///
    /// The wait handle is signaled *before* the callback runs, so a task
    /// already blocked on `wait` observes completion no later than the
    /// callback's side effects become visible.
    ///
    /// 将令牌标记为完成。首次调用置位可等待信号，然后恰好调用一次回调；
    /// 之后的调用均为空操作。
    ///
    /// 信号在回调之前置位，因此已阻塞在 `wait` 上的任务观察到完成的时刻
    /// 不晚于回调副作用变得可见的时刻。
    pub fn complete(&self) {
        if self.completing.swap(true, Ordering::AcqRel) {
            return;
        }

        self.completed_synchronously.store(true, Ordering::Release);
        self.completed.store(true, Ordering::Release);
        self.notify.notify_waiters();

        if let Some(callback) = &self.callback {
            callback(self);
        }
    }

    /// Records a failure of the underlying asynchronous work, then completes
    /// the token. The matching end-call consumes the failure and rethrows it;
    /// `fail` itself never reports an error.
    ///
    /// 记录底层异步工作的失败，然后完成令牌。配对的 end 调用消费该失败并将其
    /// 重新抛出；`fail` 本身从不报告错误。
    pub fn fail(&self, error: Error) {
        {
            let mut slot = self
                .failure
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            // First failure wins.
            slot.get_or_insert(error);
        }
        self.complete();
    }

    /// Waits until the token has been completed.
    /// 等待直到令牌完成。
    pub async fn wait(&self) {
        if self.completed.load(Ordering::Acquire) {
            return;
        }
        let mut notified = std::pin::pin!(self.notify.notified());
        // Register interest before the re-check; `complete` stores the flag
        // before it notifies, so a completion that lands between the re-check
        // and the await still wakes us.
        // 在再次检查之前注册等待；`complete` 先置位标志再发出通知，因此落在
        // 再次检查与 await 之间的完成仍会唤醒我们。
        notified.as_mut().enable();
        if self.completed.load(Ordering::Acquire) {
            return;
        }
        notified.await;
    }

    /// Takes the recorded failure, if any. Consumed by the end-call.
    /// 取出记录的失败（如有）。由 end 调用消费。
    pub fn take_failure(&self) -> Option<Error> {
        self.failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// The timeout the caller supplied to the begin-call.
    /// 调用者提供给 begin 调用的超时时间。
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The caller-supplied correlation state, if any.
    /// 调用者提供的关联状态（如有）。
    pub fn state(&self) -> Option<&CorrelationState> {
        self.state.as_ref()
    }

    /// Whether the completion sequence has run.
    /// 完成序列是否已执行。
    pub fn is_completed(&self) -> bool {
        self.completed.load(Ordering::Acquire)
    }

    /// Whether the operation completed without suspending the caller.
    /// 操作是否在未挂起调用者的情况下完成。
    pub fn completed_synchronously(&self) -> bool {
        self.completed_synchronously.load(Ordering::Acquire)
    }
}

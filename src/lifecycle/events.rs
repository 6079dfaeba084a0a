//! 生命周期事件分发 - 将转换通知按注册顺序同步送达订阅者
//! Lifecycle event dispatch - delivers transition notifications to
//! subscribers synchronously, in registration order.

use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::trace;

/// The four lifecycle events an endpoint fires.
///
/// Abort fires only `Closing` and `Closed`; from a subscriber's perspective
/// an abort looks like a close.
///
/// 端点触发的四种生命周期事件。
///
/// 中止只触发 `Closing` 和 `Closed`；从订阅者的角度看，中止就像一次关闭。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Fired once, immediately before the `on_opening` hook.
    /// 在 `on_opening` 钩子之前触发一次。
    Opening,
    /// Fired once, after the state has become `Opened`.
    /// 在状态变为 `Opened` 之后触发一次。
    Opened,
    /// Fired once, immediately before the `on_closing` hook.
    /// 在 `on_closing` 钩子之前触发一次。
    Closing,
    /// Fired once, after the state has become `Closed`.
    /// 在状态变为 `Closed` 之后触发一次。
    Closed,
}

/// 事件监听器类型定义
/// Event listener type definition
pub type EventListener = Box<dyn Fn(&LifecycleEvent) + Send + Sync>;

/// Holds the per-event subscriber lists and fires them inline with the
/// transition that produced the event.
///
/// 持有按事件划分的订阅者列表，并在产生事件的转换内同步触发它们。
pub(crate) struct EventDispatcher {
    opening: Mutex<Vec<EventListener>>,
    opened: Mutex<Vec<EventListener>>,
    closing: Mutex<Vec<EventListener>>,
    closed: Mutex<Vec<EventListener>>,
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("opening_listeners", &lock(&self.opening).len())
            .field("opened_listeners", &lock(&self.opened).len())
            .field("closing_listeners", &lock(&self.closing).len())
            .field("closed_listeners", &lock(&self.closed).len())
            .finish()
    }
}

/// A listener that panicked poisons its list; later subscribers still run.
/// 恐慌的监听器会毒化其列表；后续订阅者仍然运行。
fn lock<'a>(list: &'a Mutex<Vec<EventListener>>) -> MutexGuard<'a, Vec<EventListener>> {
    list.lock().unwrap_or_else(PoisonError::into_inner)
}

impl EventDispatcher {
    pub(crate) fn new() -> Self {
        Self {
            opening: Mutex::new(Vec::new()),
            opened: Mutex::new(Vec::new()),
            closing: Mutex::new(Vec::new()),
            closed: Mutex::new(Vec::new()),
        }
    }

    /// 注册事件监听器
    /// Register an event listener
    pub(crate) fn subscribe(&self, event: LifecycleEvent, listener: EventListener) {
        lock(self.list_for(event)).push(listener);
    }

    /// Fires one event to its subscribers, in registration order, on the
    /// calling task.
    ///
    /// The list lock is released while the listeners run, so a listener may
    /// itself call `subscribe` (even for the same event). A listener added
    /// during the firing is delivered from the next firing on.
    ///
    /// 在调用任务上，按注册顺序向订阅者触发一个事件。
    ///
    /// 监听器运行期间列表锁已释放，因此监听器自身可以调用 `subscribe`
    /// （即使针对同一事件）。触发期间新增的监听器从下一次触发起送达。
    pub(crate) fn fire(&self, event: LifecycleEvent) {
        let list = self.list_for(event);
        let listeners = std::mem::take(&mut *lock(list));
        trace!(?event, subscribers = listeners.len(), "Firing lifecycle event");
        for listener in listeners.iter() {
            listener(&event);
        }

        // Subscriptions made while the list was out land first; move them
        // back behind the original listeners to keep registration order.
        // 列表取出期间的订阅会先落入列表；将它们移回到原监听器之后以保持
        // 注册顺序。
        let mut guard = lock(list);
        let added = std::mem::replace(&mut *guard, listeners);
        guard.extend(added);
    }

    fn list_for(&self, event: LifecycleEvent) -> &Mutex<Vec<EventListener>> {
        match event {
            LifecycleEvent::Opening => &self.opening,
            LifecycleEvent::Opened => &self.opened,
            LifecycleEvent::Closing => &self.closing,
            LifecycleEvent::Closed => &self.closed,
        }
    }
}

//! Defines the lifecycle state machine states for an endpoint.
//!
//! 定义端点生命周期状态机的状态。

use std::sync::{
    Arc,
    atomic::{AtomicU8, Ordering},
};

/// The lifecycle state of a communication endpoint.
/// 通信端点的生命周期状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EndpointState {
    /// The endpoint has been constructed but not yet opened.
    /// 端点已构造但尚未打开。
    Created = 0,

    /// The open hook sequence is in progress.
    /// 打开钩子序列正在进行中。
    Opening = 1,

    /// The endpoint is fully open and usable.
    /// 端点已完全打开，可以使用。
    Opened = 2,

    /// The close (or abort) hook sequence is in progress.
    /// 关闭（或中止）钩子序列正在进行中。
    Closing = 3,

    /// The endpoint is closed. Terminal; repeated close/abort calls are no-ops.
    /// 端点已关闭。终态；重复的关闭/中止调用为空操作。
    Closed = 4,

    /// The endpoint has faulted. Terminal; entered only when a derived
    /// resource reports an asynchronous fault, never by the core itself.
    /// 端点已出错。终态；仅当派生资源报告异步故障时进入，核心自身从不触发。
    Faulted = 5,
}

impl EndpointState {
    /// Whether no further transition is permitted from this state.
    /// 该状态是否不允许任何后续转换。
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Closed | Self::Faulted)
    }

    fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::Created,
            1 => Self::Opening,
            2 => Self::Opened,
            3 => Self::Closing,
            4 => Self::Closed,
            _ => Self::Faulted,
        }
    }
}

/// A cheap, cloneable read view of an endpoint's current state.
///
/// Hooks and event subscribers run outside the controller's borrow, so the
/// state lives in a shared atomic cell they can observe at any point of the
/// transition. Writes go through the controller only.
///
/// 端点当前状态的廉价可克隆只读视图。
///
/// 钩子和事件订阅者在控制器借用之外运行，因此状态存放在它们可以在转换任意
/// 时刻观察的共享原子单元中。写入仅通过控制器进行。
#[derive(Debug, Clone)]
pub struct StateWatch {
    cell: Arc<AtomicU8>,
}

impl StateWatch {
    pub(crate) fn new(initial: EndpointState) -> Self {
        Self {
            cell: Arc::new(AtomicU8::new(initial as u8)),
        }
    }

    /// The state at this instant.
    /// 此刻的状态。
    pub fn current(&self) -> EndpointState {
        EndpointState::from_raw(self.cell.load(Ordering::Acquire))
    }

    #[cfg(test)]
    pub(crate) fn store(&self, state: EndpointState) {
        self.cell.store(state as u8, Ordering::Release);
    }

    /// Stores `state` unless the cell already holds a terminal state, in one
    /// atomic step. Returns whether the store took effect.
    ///
    /// `fault` runs without the transition guard, so every writer must lose
    /// to a terminal value that raced in between its own read and write.
    ///
    /// 除非单元已持有终态，否则以单个原子步骤存入 `state`。返回存储是否
    /// 生效。
    ///
    /// `fault` 在转换守卫之外运行，因此每个写入者都必须输给在自己读与写
    /// 之间抢先进入的终态值。
    pub(crate) fn store_if_not_terminal(&self, state: EndpointState) -> bool {
        let mut current = self.cell.load(Ordering::Acquire);
        loop {
            if EndpointState::from_raw(current).is_terminal() {
                return false;
            }
            match self.cell.compare_exchange_weak(
                current,
                state as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(observed) => current = observed,
            }
        }
    }
}

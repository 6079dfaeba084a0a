//! 生命周期状态验证逻辑模块
//! Lifecycle State Validation Logic Module
//!
//! 该模块负责判断每个公共动词从哪些状态是合法的、哪些是幂等的空操作、
//! 哪些必须被拒绝。为控制器提供一致且可靠的状态验证服务。
//!
//! This module decides from which states each public verb is legal, which
//! are idempotent no-ops, and which must be rejected. It provides consistent
//! and reliable state validation services for the controller.

use super::state::EndpointState;

/// 状态验证器，负责所有状态相关的验证和检查逻辑
/// State validator responsible for all state-related validation and check logic
pub struct StateValidator;

impl StateValidator {
    /// An open may only start from `Created`.
    /// 打开只能从 `Created` 状态开始。
    pub fn can_open(state: EndpointState) -> bool {
        matches!(state, EndpointState::Created)
    }

    /// A close may start from any state an open has passed through.
    /// `Closed` is handled separately as an idempotent no-op.
    ///
    /// 关闭可以从打开经过的任何状态开始。`Closed` 单独作为幂等空操作处理。
    pub fn can_close(state: EndpointState) -> bool {
        matches!(
            state,
            EndpointState::Created | EndpointState::Opening | EndpointState::Opened
        )
    }

    /// Whether a close from this state is a benign no-op.
    /// 从该状态关闭是否为无害的空操作。
    pub fn close_is_noop(state: EndpointState) -> bool {
        matches!(state, EndpointState::Closed)
    }

    /// An abort runs from any non-terminal state.
    /// 中止可以从任何非终态执行。
    pub fn can_abort(state: EndpointState) -> bool {
        !Self::is_terminal(state)
    }

    /// Whether no further transition is permitted from this state.
    /// 该状态是否不允许任何后续转换。
    pub fn is_terminal(state: EndpointState) -> bool {
        state.is_terminal()
    }

    /// Whether a derived resource may still report an asynchronous fault.
    /// 派生资源是否仍可以报告异步故障。
    pub fn can_fault(state: EndpointState) -> bool {
        !Self::is_terminal(state)
    }
}

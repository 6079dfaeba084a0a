//! 端点生命周期管理模块
//! Endpoint Lifecycle Management Module
//!
//! 该模块提供通信端点生命周期的统一管理：状态机、钩子调用协议、
//! 事件分发和转换验证。派生资源实现钩子契约，本模块保证状态跟踪。
//!
//! This module provides unified management of a communication endpoint's
//! lifecycle: the state machine, the hook invocation protocol, event
//! dispatch, and transition validation. Derived resources implement the hook
//! contract; this module guarantees the state tracking.

mod controller;
mod events;
mod hooks;
mod state;
mod validation;

// 重新导出主要类型和特征
// Re-export the main types and traits
pub use controller::EndpointLifecycle;
pub use events::{EventListener, LifecycleEvent};
pub use hooks::LifecycleHooks;
pub use state::{EndpointState, StateWatch};
pub use validation::StateValidator;

//! 定义了生命周期操作的可配置参数。
//! Defines configurable parameters for lifecycle operations.

use std::time::Duration;

/// A structure containing the configurable parameters for an endpoint lifecycle.
///
/// 包含端点生命周期所有可配置参数的结构体。
#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    /// The timeout handed to the open hooks when the caller does not supply one.
    /// 当调用者未提供超时时间时，传递给打开钩子的超时时间。
    pub default_open_timeout: Duration,
    /// The timeout handed to the close hooks when the caller does not supply one.
    /// 当调用者未提供超时时间时，传递给关闭钩子的超时时间。
    pub default_close_timeout: Duration,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            default_open_timeout: Duration::from_secs(60), // Matches common service defaults
            default_close_timeout: Duration::from_secs(60),
        }
    }
}

//! 定义了库中所有可能的错误类型。
//! Defines all possible error types in the library.

use crate::lifecycle::EndpointState;
use std::time::Duration;
use thiserror::Error;

/// The primary error type for the endpoint lifecycle library.
/// 端点生命周期库的主要错误类型。
#[derive(Debug, Error)]
pub enum Error {
    /// An operation was requested from a state that does not permit it.
    /// 从不允许该操作的状态请求了操作。
    #[error("cannot {operation} while the endpoint is {state:?}")]
    InvalidState {
        operation: &'static str,
        state: EndpointState,
    },

    /// A derived resource did not finish its hook work within the caller-supplied
    /// timeout. The core never produces this itself; resources surface it through
    /// the normal hook-failure path.
    ///
    /// 派生资源未能在调用者给定的超时时间内完成其钩子工作。核心自身从不产生此错误；
    /// 资源通过常规的钩子失败路径上报它。
    #[error("the operation did not complete within {0:?}")]
    Timeout(Duration),

    /// A failure reported by a derived resource from inside a hook. The message
    /// is carried verbatim so the original caller sees exactly what the hook said.
    ///
    /// 派生资源在钩子内部报告的失败。消息按原样携带，调用者看到的正是钩子所说的内容。
    #[error("{0}")]
    Resource(String),

    /// An underlying I/O error occurred inside a derived resource.
    /// 派生资源内部发生了底层的I/O错误。
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized `Result` type for this library.
/// 本库专用的 `Result` 类型。
pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for std::io::Error {
    fn from(err: Error) -> Self {
        use std::io::ErrorKind;
        match err {
            Error::Io(e) => e,
            Error::InvalidState { .. } => ErrorKind::InvalidInput.into(),
            Error::Timeout(_) => ErrorKind::TimedOut.into(),
            Error::Resource(msg) => std::io::Error::new(ErrorKind::Other, msg),
        }
    }
}

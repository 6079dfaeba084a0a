#![deny(clippy::expect_used, clippy::unwrap_used)]

//! The root of the endpoint lifecycle library.
//! 端点生命周期库的根。

pub mod completion;
pub mod config;
pub mod error;
pub mod lifecycle;

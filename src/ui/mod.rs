//! 交互层入口。
//!
//! 包含 Web JSON API 与一次性命令行子命令两套入口。

pub mod noui;
pub mod web;

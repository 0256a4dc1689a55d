//! 外部服务客户端（抓取 / 正文提取 / 翻译）。

pub mod service_client;

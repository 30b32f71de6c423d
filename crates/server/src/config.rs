//! 服务端运行配置。

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3001";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://homework-grader.db?mode=rwc";
pub const DEFAULT_GRADER_CONFIG: &str = "grader.toml";

/// 服务端配置。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// 数据库连接串。
    pub database_url: String,
    /// HTTP 监听地址。
    pub bind_addr: SocketAddr,
    /// 评分配置文件路径。
    pub grader_config_path: PathBuf,
}

impl ServerConfig {
    /// 从进程环境变量加载配置。
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 通过自定义查找函数加载配置，未设置的项使用默认值。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr
            .parse()
            .with_context(|| format!("invalid BIND_ADDR: {bind_addr}"))?;
        let grader_config_path = lookup("GRADER_CONFIG")
            .unwrap_or_else(|| DEFAULT_GRADER_CONFIG.to_string())
            .into();

        Ok(Self {
            database_url,
            bind_addr,
            grader_config_path,
        })
    }
}

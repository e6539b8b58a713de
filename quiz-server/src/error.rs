use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    /// 配置项无效
    #[error("Invalid configuration for {key}: {message}")]
    Config { key: &'static str, message: String },
    /// 无法监听指定地址
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    /// 文件或套接字 I/O 错误
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    pub fn config(key: &'static str, message: impl Into<String>) -> Self {
        ServerError::Config {
            key,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;

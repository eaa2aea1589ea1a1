//! 全 crate 统一的错误类型：各模块自己的错误经 `#[from]` 汇总到 [`Error`]

use crate::data::DataError;
use crate::nn::GraphError;
use crate::vision::VisionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Vision(#[from] VisionError),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 配置文件解析失败
    #[error("配置解析失败: {0}")]
    Json(#[from] serde_json::Error),

    /// 配置项取值不合法
    #[error("配置无效: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

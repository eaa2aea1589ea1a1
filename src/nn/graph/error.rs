/*
 * @Date         : 2026-10-19
 * @Description  : Graph 模块的错误类型
 */

use crate::nn::NodeId;
use thiserror::Error;

/// Graph 操作错误类型
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("节点不存在: {0:?}")]
    NodeNotFound(NodeId),

    #[error("非法操作: {0}")]
    InvalidOperation(String),

    #[error("形状不匹配: 期望 {expected:?}, 实际 {got:?}（{message}）")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
        message: String,
    },

    #[error("计算错误: {0}")]
    ComputationError(String),

    #[error("节点名称重复: {0}")]
    DuplicateNodeName(String),

    /// 参数分组与图中全部可训练参数不一致（重叠或遗漏）
    #[error("参数分组不合法: {0}")]
    ParameterPartition(String),

    #[error("检查点 IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("检查点格式错误: {0}")]
    Checkpoint(String),
}

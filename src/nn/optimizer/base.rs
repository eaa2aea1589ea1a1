/*
 * @Date         : 2026-10-19
 * @Description  : 优化器基础trait和辅助结构
 */

use crate::nn::{Graph, GraphError, NodeId};

/// 优化器核心 trait
pub trait Optimizer {
    /// 参数更新（使用已计算的梯度）
    ///
    /// 训练循环：
    /// ```ignore
    /// graph.forward(loss)?;
    /// graph.backward(loss)?;
    /// optimizer.step(&mut graph)?; // ← 只更新参数，不做 forward/backward
    /// ```
    fn step(&mut self, graph: &mut Graph) -> Result<(), GraphError>;

    /// 重置累积状态
    fn reset(&mut self);

    /// 本优化器负责更新的参数
    fn params(&self) -> &[NodeId];

    /// 前向 + 反向 + 更新一步到位，返回更新前的损失值
    fn minimize(&mut self, graph: &mut Graph, loss: NodeId) -> Result<f32, GraphError> {
        graph.forward(loss)?;
        let loss_value = graph.backward(loss)?;
        self.step(graph)?;
        Ok(loss_value)
    }
}

/// 优化器状态管理（内部实现，不对外暴露）
pub(super) struct OptimizerState {
    /// 可训练参数的节点 ID 列表
    trainable_nodes: Vec<NodeId>,
    learning_rate: f32,
}

impl OptimizerState {
    /// 只更新指定的参数组
    ///
    /// 用于需要分别优化不同参数组的场景，如 GAN 训练（G 和 D 用不同优化器）
    pub(super) const fn with_params(params: Vec<NodeId>, learning_rate: f32) -> Self {
        Self {
            trainable_nodes: params,
            learning_rate,
        }
    }

    pub(super) fn trainable_nodes(&self) -> &[NodeId] {
        &self.trainable_nodes
    }

    pub(super) const fn learning_rate(&self) -> f32 {
        self.learning_rate
    }
}

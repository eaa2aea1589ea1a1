/*
 * @Date         : 2026-10-19
 * @Description  : Adam优化器实现
 */

use super::base::{Optimizer, OptimizerState};
use crate::nn::{Graph, GraphError, NodeId};
use crate::tensor::Tensor;
use std::collections::HashMap;

/// Adam优化器
pub struct Adam {
    state: OptimizerState,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    /// 一阶矩估计
    m: HashMap<NodeId, Tensor>,
    /// 二阶矩估计
    v: HashMap<NodeId, Tensor>,
    /// 时间步
    t: usize,
}

impl Adam {
    /// 为指定参数组创建Adam优化器
    ///
    /// # 示例
    /// ```ignore
    /// // GAN 训练：分别为 G 和 D 创建优化器
    /// let optimizer_g = Adam::new(&g_params, 1e-4, 0.9, 0.999, 1e-8);
    /// let optimizer_d = Adam::new(&d_params, 1e-4, 0.9, 0.999, 1e-8);
    /// ```
    pub fn new(params: &[NodeId], learning_rate: f32, beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Self {
            state: OptimizerState::with_params(params.to_vec(), learning_rate),
            beta1,
            beta2,
            epsilon,
            m: HashMap::new(),
            v: HashMap::new(),
            t: 0,
        }
    }

    /// 使用默认参数（β1=0.9, β2=0.999, ε=1e-8）
    pub fn new_default(params: &[NodeId], learning_rate: f32) -> Self {
        Self::new(params, learning_rate, 0.9, 0.999, 1e-8)
    }

    /// 已执行的更新步数
    pub fn steps(&self) -> usize {
        self.t
    }
}

impl Optimizer for Adam {
    /// 直接使用节点的 `.grad` 进行 Adam 更新；没有梯度的参数本步跳过
    fn step(&mut self, graph: &mut Graph) -> Result<(), GraphError> {
        self.t += 1;

        // 先收集所有需要更新的参数及其梯度（避免借用冲突）
        let mut gradients = Vec::new();
        for &node_id in self.state.trainable_nodes() {
            if let Some(grad) = graph.get_node_grad(node_id)? {
                gradients.push((node_id, grad.clone()));
            }
        }

        for (node_id, gradient) in gradients {
            self.adam_update_with_gradient(graph, node_id, &gradient)?;
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.m.clear();
        self.v.clear();
        self.t = 0;
    }

    fn params(&self) -> &[NodeId] {
        self.state.trainable_nodes()
    }
}

impl Adam {
    fn adam_update_with_gradient(
        &mut self,
        graph: &mut Graph,
        node_id: NodeId,
        gradient: &Tensor,
    ) -> Result<(), GraphError> {
        let current_value = graph.expect_node_value(node_id)?.clone();

        // m = β1 * m + (1 - β1) * g
        let m = self
            .m
            .entry(node_id)
            .or_insert_with(|| Tensor::zeros(gradient.shape()));
        *m *= self.beta1;
        *m += &(gradient * (1.0 - self.beta1));

        // v = β2 * v + (1 - β2) * g²
        let v = self
            .v
            .entry(node_id)
            .or_insert_with(|| Tensor::zeros(gradient.shape()));
        *v *= self.beta2;
        *v += &(&(gradient * gradient) * (1.0 - self.beta2));

        // 偏差修正
        let m_hat = &*m / (1.0 - self.beta1.powi(self.t as i32));
        let v_hat = &*v / (1.0 - self.beta2.powi(self.t as i32));

        // θ = θ - α * m_hat / (√v_hat + ε)
        let update = &m_hat / &(v_hat.sqrt() + self.epsilon);
        let new_value = current_value - &update * self.state.learning_rate();

        graph.set_node_value(node_id, &new_value)
    }
}

/*
 * @Date         : 2026-10-19
 * @Description  : 静态计算图：先构图、再反复 喂输入 -> forward -> backward -> 优化器更新。
 *                 节点按创建顺序编号，父节点编号总小于子节点，因此编号顺序即拓扑序。
 */

mod error;
mod serialization;

pub use error::GraphError;

use super::Init;
use super::nodes::raw_node::{
    AddBias, ConcatRows, Input, MatMul, MseLoss, NodeType, Parameter, RealFakeLabels, Relu,
    Tanh, TraitNode, WeightedSum,
};
use super::nodes::{DynShape, NodeHandle, NodeId};
use crate::tensor::Tensor;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::{BTreeSet, HashMap};

pub struct Graph {
    nodes: Vec<NodeHandle>,
    name_index: HashMap<String, NodeId>,
    /// 参数初始化用的随机数发生器
    rng: StdRng,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// 带种子创建，保证参数初始化可复现
    pub fn new_with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            nodes: Vec::new(),
            name_index: HashMap::new(),
            rng,
        }
    }

    pub fn nodes_count(&self) -> usize {
        self.nodes.len()
    }

    fn get_node(&self, id: NodeId) -> Result<&NodeHandle, GraphError> {
        self.nodes.get(id.0).ok_or(GraphError::NodeNotFound(id))
    }

    fn get_node_mut(&mut self, id: NodeId) -> Result<&mut NodeHandle, GraphError> {
        self.nodes.get_mut(id.0).ok_or(GraphError::NodeNotFound(id))
    }

    fn add_node(
        &mut self,
        raw_node: NodeType,
        parents: Vec<NodeId>,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let id = NodeId(self.nodes.len());
        let name = match name {
            Some(name) => name.to_string(),
            None => format!("{}_{}", raw_node.kind().to_lowercase(), id.0),
        };
        if self.name_index.contains_key(&name) {
            return Err(GraphError::DuplicateNodeName(name));
        }

        let parents_require_grad = parents
            .iter()
            .map(|&p| self.get_node(p).map(NodeHandle::requires_grad))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .any(|r| r);
        let requires_grad =
            raw_node.is_trainable() || (raw_node.is_differentiable() && parents_require_grad);

        self.name_index.insert(name.clone(), id);
        self.nodes
            .push(NodeHandle::new(id, name, parents, raw_node, requires_grad));
        Ok(id)
    }

    fn parent_handles(&self, parents: &[NodeId]) -> Result<Vec<&NodeHandle>, GraphError> {
        parents.iter().map(|&p| self.get_node(p)).collect()
    }
}

// 构图
impl Graph {
    /// 输入节点：列数固定，行数（batch大小）在喂值时决定
    pub fn new_input_node(&mut self, cols: usize, name: Option<&str>) -> Result<NodeId, GraphError> {
        self.add_node(Input::new(cols).into(), vec![], name)
    }

    /// 参数节点：创建时即按 `init` 初始化
    pub fn new_parameter_node(
        &mut self,
        shape: &[usize],
        init: Init,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        if shape.len() != 2 {
            return Err(GraphError::InvalidOperation(format!(
                "参数形状必须是 [rows, cols]，实际为{shape:?}"
            )));
        }
        let value = init.generate(shape, &mut self.rng);
        let id = self.add_node(Parameter::new(shape[0], shape[1]).into(), vec![], name)?;
        self.get_node_mut(id)?.set_value(Some(value));
        Ok(id)
    }

    pub fn new_mat_mul_node(
        &mut self,
        left: NodeId,
        right: NodeId,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let node = MatMul::new(&self.parent_handles(&[left, right])?)?;
        self.add_node(node.into(), vec![left, right], name)
    }

    pub fn new_add_bias_node(
        &mut self,
        input: NodeId,
        bias: NodeId,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let node = AddBias::new(&self.parent_handles(&[input, bias])?)?;
        self.add_node(node.into(), vec![input, bias], name)
    }

    pub fn new_tanh_node(&mut self, input: NodeId, name: Option<&str>) -> Result<NodeId, GraphError> {
        let node = Tanh::new(&self.parent_handles(&[input])?)?;
        self.add_node(node.into(), vec![input], name)
    }

    pub fn new_relu_node(&mut self, input: NodeId, name: Option<&str>) -> Result<NodeId, GraphError> {
        let node = Relu::new(&self.parent_handles(&[input])?)?;
        self.add_node(node.into(), vec![input], name)
    }

    pub fn new_concat_rows_node(
        &mut self,
        top: NodeId,
        bottom: NodeId,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let node = ConcatRows::new(&self.parent_handles(&[top, bottom])?)?;
        self.add_node(node.into(), vec![top, bottom], name)
    }

    /// `real` 的每一行记 +1，`fake` 的每一行记 −1
    pub fn new_real_fake_labels_node(
        &mut self,
        real: NodeId,
        fake: NodeId,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let node = RealFakeLabels::new(&self.parent_handles(&[real, fake])?)?;
        self.add_node(node.into(), vec![real, fake], name)
    }

    pub fn new_mse_loss_node(
        &mut self,
        input: NodeId,
        target: NodeId,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let node = MseLoss::new(&self.parent_handles(&[input, target])?)?;
        self.add_node(node.into(), vec![input, target], name)
    }

    /// `Σ wᵢ · xᵢ`，所有 `xᵢ` 都须是标量节点
    pub fn new_weighted_sum_node(
        &mut self,
        terms: &[(NodeId, f32)],
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let (parents, weights): (Vec<NodeId>, Vec<f32>) = terms.iter().copied().unzip();
        let node = WeightedSum::new(&self.parent_handles(&parents)?, &weights)?;
        self.add_node(node.into(), parents, name)
    }
}

// 取值、赋值
impl Graph {
    /// 只能给叶子节点（输入、参数）赋值；形状须满足节点的期望形状
    pub fn set_node_value(&mut self, id: NodeId, value: &Tensor) -> Result<(), GraphError> {
        let node = self.get_node_mut(id)?;
        if !node.raw_node().is_leaf() {
            return Err(GraphError::InvalidOperation(format!(
                "{node}不是叶子节点，其值只能由前向传播计算"
            )));
        }
        let expected = node.expected_shape();
        if !expected.accepts(value.shape()) {
            return Err(GraphError::ShapeMismatch {
                expected: expected.to_vec(),
                got: value.shape().to_vec(),
                message: format!("{node}期望形状为{expected}"),
            });
        }
        node.set_value(Some(value.clone()));
        Ok(())
    }

    pub fn get_node_value(&self, id: NodeId) -> Result<Option<&Tensor>, GraphError> {
        Ok(self.get_node(id)?.value())
    }

    /// 取值并要求已计算过
    pub fn expect_node_value(&self, id: NodeId) -> Result<&Tensor, GraphError> {
        let node = self.get_node(id)?;
        node.value().ok_or_else(|| {
            GraphError::ComputationError(format!("{node}没有值，请先执行 forward"))
        })
    }

    pub fn get_node_grad(&self, id: NodeId) -> Result<Option<&Tensor>, GraphError> {
        Ok(self.get_node(id)?.grad())
    }

    pub fn get_node_name(&self, id: NodeId) -> Result<&str, GraphError> {
        Ok(self.get_node(id)?.name())
    }

    pub fn get_node_expected_shape(&self, id: NodeId) -> Result<DynShape, GraphError> {
        Ok(self.get_node(id)?.expected_shape())
    }

    pub fn get_node_by_name(&self, name: &str) -> Option<NodeId> {
        self.name_index.get(name).copied()
    }

    /// 图中全部可训练参数，按创建顺序
    pub fn get_trainable_nodes(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|node| node.is_trainable())
            .map(NodeHandle::id)
            .collect()
    }
}

// 前向、反向传播
impl Graph {
    /// 收集 `targets` 及其全部祖先，升序（即拓扑序）返回
    fn ancestors(&self, targets: &[NodeId]) -> Result<Vec<NodeId>, GraphError> {
        let mut visited = BTreeSet::new();
        let mut stack = targets.to_vec();
        while let Some(id) = stack.pop() {
            if visited.insert(id) {
                stack.extend_from_slice(self.get_node(id)?.parents());
            }
        }
        Ok(visited.into_iter().collect())
    }

    pub fn forward(&mut self, target: NodeId) -> Result<(), GraphError> {
        self.forward_nodes(&[target])
    }

    /// 一次前向传播同时算出多个目标节点（公共祖先只算一遍）
    pub fn forward_nodes(&mut self, targets: &[NodeId]) -> Result<(), GraphError> {
        for id in self.ancestors(targets)? {
            let node = self.get_node(id)?;
            if node.raw_node().is_leaf() {
                if node.value().is_none() {
                    return Err(GraphError::ComputationError(format!(
                        "{node}没有值，请先调用 set_node_value"
                    )));
                }
                continue;
            }

            let parent_values = self.parent_values(node)?;
            let value = node.raw_node().calc_value(&parent_values)?;
            self.get_node_mut(id)?.set_value(Some(value));
        }
        Ok(())
    }

    fn parent_values(&self, node: &NodeHandle) -> Result<Vec<&Tensor>, GraphError> {
        node.parents()
            .iter()
            .map(|&p| self.expect_node_value(p))
            .collect()
    }

    /// 清除所有节点的梯度
    pub fn zero_grad(&mut self) {
        for node in &mut self.nodes {
            node.set_grad(None);
        }
    }

    /// 从标量损失出发做反向传播，结果累加在各参数节点的 grad 上。
    /// 调用前须先对 `loss` 执行 forward；开始时会先清空全部旧梯度。
    ///
    /// 返回损失值
    pub fn backward(&mut self, loss: NodeId) -> Result<f32, GraphError> {
        let loss_node = self.get_node(loss)?;
        let loss_value = loss_node.value().ok_or_else(|| {
            GraphError::ComputationError(format!("损失{loss_node}没有值，请先执行 forward"))
        })?;
        let loss_scalar = loss_value.get_data_number().ok_or_else(|| {
            GraphError::InvalidOperation(format!(
                "反向传播要求损失为标量 [1, 1]，但得到 {:?}",
                loss_value.shape()
            ))
        })?;

        self.zero_grad();
        self.get_node_mut(loss)?
            .set_grad(Some(Tensor::ones(&[1, 1])));

        for id in self.ancestors(&[loss])?.into_iter().rev() {
            let node = self.get_node(id)?;
            if node.raw_node().is_leaf()
                || !node.requires_grad()
                || !node.raw_node().is_differentiable()
            {
                continue;
            }
            let Some(upstream) = node.grad() else {
                continue;
            };
            let value = self.expect_node_value(id)?;
            let parent_values = self.parent_values(node)?;

            let mut parent_grads = Vec::new();
            for (index, &parent) in node.parents().iter().enumerate() {
                if !self.get_node(parent)?.requires_grad() {
                    continue;
                }
                let grad = node
                    .raw_node()
                    .calc_grad_to_parent(index, &parent_values, value, upstream)?;
                parent_grads.push((parent, grad));
            }

            for (parent, grad) in parent_grads {
                self.get_node_mut(parent)?.accumulate_grad(&grad);
            }
        }

        Ok(loss_scalar)
    }
}

/*
 * @Date         : 2026-10-19
 * @Description  : 计算图节点：NodeId、期望形状 DynShape 以及图内部持有的 NodeHandle
 */

pub(in crate::nn) mod raw_node;

use crate::tensor::Tensor;
use raw_node::{NodeType, TraitNode};
use std::fmt;

/// 节点在所属图中的编号。编号按创建顺序递增，父节点的编号总小于子节点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// 节点的期望形状：batch 维（行）可以是动态的，特征维（列）固定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DynShape {
    /// `None` 表示行数在运行时由输入决定
    pub rows: Option<usize>,
    pub cols: usize,
}

impl DynShape {
    pub const fn dynamic(cols: usize) -> Self {
        Self { rows: None, cols }
    }

    pub const fn fixed(rows: usize, cols: usize) -> Self {
        Self {
            rows: Some(rows),
            cols,
        }
    }

    /// 检查一个具体形状是否满足期望
    pub fn accepts(&self, shape: &[usize]) -> bool {
        shape.len() == 2 && shape[1] == self.cols && self.rows.is_none_or(|r| r == shape[0])
    }

    /// 用于错误信息，动态行数记作0
    pub fn to_vec(self) -> Vec<usize> {
        vec![self.rows.unwrap_or(0), self.cols]
    }
}

impl fmt::Display for DynShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rows {
            Some(r) => write!(f, "[{r}, {}]", self.cols),
            None => write!(f, "[?, {}]", self.cols),
        }
    }
}

/// 图内部持有的节点：具体算子 + 名称、父节点、值和梯度
pub(in crate::nn) struct NodeHandle {
    id: NodeId,
    name: String,
    parents: Vec<NodeId>,
    raw_node: NodeType,
    /// 是否有可训练参数位于其祖先（含自身）中；为false时反向传播直接跳过
    requires_grad: bool,
    value: Option<Tensor>,
    grad: Option<Tensor>,
}

impl NodeHandle {
    pub(in crate::nn) fn new(
        id: NodeId,
        name: String,
        parents: Vec<NodeId>,
        raw_node: NodeType,
        requires_grad: bool,
    ) -> Self {
        Self {
            id,
            name,
            parents,
            raw_node,
            requires_grad,
            value: None,
            grad: None,
        }
    }

    pub(in crate::nn) fn id(&self) -> NodeId {
        self.id
    }

    pub(in crate::nn) fn name(&self) -> &str {
        &self.name
    }

    pub(in crate::nn) fn parents(&self) -> &[NodeId] {
        &self.parents
    }

    pub(in crate::nn) fn raw_node(&self) -> &NodeType {
        &self.raw_node
    }

    pub(in crate::nn) fn expected_shape(&self) -> DynShape {
        self.raw_node.expected_shape()
    }

    pub(in crate::nn) fn requires_grad(&self) -> bool {
        self.requires_grad
    }

    pub(in crate::nn) fn is_trainable(&self) -> bool {
        self.raw_node.is_trainable()
    }

    pub(in crate::nn) fn value(&self) -> Option<&Tensor> {
        self.value.as_ref()
    }

    pub(in crate::nn) fn set_value(&mut self, value: Option<Tensor>) {
        self.value = value;
    }

    pub(in crate::nn) fn grad(&self) -> Option<&Tensor> {
        self.grad.as_ref()
    }

    pub(in crate::nn) fn set_grad(&mut self, grad: Option<Tensor>) {
        self.grad = grad;
    }

    /// 梯度累加（一个节点可能有多个子节点）
    pub(in crate::nn) fn accumulate_grad(&mut self, grad: &Tensor) {
        match self.grad.as_mut() {
            Some(existing) => *existing += grad,
            None => self.grad = Some(grad.clone()),
        }
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]{}", self.raw_node.kind(), self.name)
    }
}

//! 叶子节点：输入（每次前向前由外部喂值）和参数（可训练，由优化器原地更新）

use super::TraitNode;
use crate::nn::GraphError;
use crate::nn::nodes::DynShape;
use crate::tensor::Tensor;

fn leaf_error(kind: &str) -> GraphError {
    GraphError::InvalidOperation(format!("{kind}是叶子节点，其值只能通过 set_node_value 设置"))
}

/// 输入节点，形状 [?, cols]
pub(in crate::nn) struct Input {
    shape: DynShape,
}

impl Input {
    pub(in crate::nn) const fn new(cols: usize) -> Self {
        Self {
            shape: DynShape::dynamic(cols),
        }
    }
}

impl TraitNode for Input {
    fn kind(&self) -> &'static str {
        "Input"
    }

    fn expected_shape(&self) -> DynShape {
        self.shape
    }

    fn is_leaf(&self) -> bool {
        true
    }

    fn calc_value(&self, _parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Err(leaf_error(self.kind()))
    }

    fn calc_grad_to_parent(
        &self,
        _index: usize,
        _parents: &[&Tensor],
        _value: &Tensor,
        _upstream: &Tensor,
    ) -> Result<Tensor, GraphError> {
        Err(leaf_error(self.kind()))
    }
}

/// 参数节点，形状固定
pub(in crate::nn) struct Parameter {
    shape: DynShape,
}

impl Parameter {
    pub(in crate::nn) const fn new(rows: usize, cols: usize) -> Self {
        Self {
            shape: DynShape::fixed(rows, cols),
        }
    }
}

impl TraitNode for Parameter {
    fn kind(&self) -> &'static str {
        "Parameter"
    }

    fn expected_shape(&self) -> DynShape {
        self.shape
    }

    fn is_leaf(&self) -> bool {
        true
    }

    fn is_trainable(&self) -> bool {
        true
    }

    fn calc_value(&self, _parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Err(leaf_error(self.kind()))
    }

    fn calc_grad_to_parent(
        &self,
        _index: usize,
        _parents: &[&Tensor],
        _value: &Tensor,
        _upstream: &Tensor,
    ) -> Result<Tensor, GraphError> {
        Err(leaf_error(self.kind()))
    }
}

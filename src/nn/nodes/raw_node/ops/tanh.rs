use super::super::TraitNode;
use crate::nn::GraphError;
use crate::nn::nodes::{DynShape, NodeHandle};
use crate::tensor::Tensor;

/// Tanh激活函数节点
///
/// forward: tanh(x) = (e^x - e^(-x)) / (e^x + e^(-x))
/// backward: d(tanh)/dx = 1 - tanh²(x)
pub(in crate::nn) struct Tanh {
    shape: DynShape,
}

impl Tanh {
    pub(in crate::nn) fn new(parents: &[&NodeHandle]) -> Result<Self, GraphError> {
        if parents.len() != 1 {
            return Err(GraphError::InvalidOperation(
                "Tanh节点只需要1个父节点".to_string(),
            ));
        }
        Ok(Self {
            shape: parents[0].expected_shape(),
        })
    }
}

impl TraitNode for Tanh {
    fn kind(&self) -> &'static str {
        "Tanh"
    }

    fn expected_shape(&self) -> DynShape {
        self.shape
    }

    fn calc_value(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parents[0].tanh())
    }

    fn calc_grad_to_parent(
        &self,
        _index: usize,
        _parents: &[&Tensor],
        value: &Tensor,
        upstream: &Tensor,
    ) -> Result<Tensor, GraphError> {
        // 直接复用前向结果 y，避免重复计算 tanh
        let local = value.map(|y| 1.0 - y * y);
        Ok(upstream * &local)
    }
}

use super::super::TraitNode;
use crate::nn::GraphError;
use crate::nn::nodes::{DynShape, NodeHandle};
use crate::tensor::Tensor;

/// ReLU激活函数节点：`max(x, 0)`，把输出截断为非负
///
/// x = 0 处的导数取 0（与 TensorFlow/PyTorch 一致）
pub(in crate::nn) struct Relu {
    shape: DynShape,
}

impl Relu {
    pub(in crate::nn) fn new(parents: &[&NodeHandle]) -> Result<Self, GraphError> {
        if parents.len() != 1 {
            return Err(GraphError::InvalidOperation(
                "Relu节点只需要1个父节点".to_string(),
            ));
        }
        Ok(Self {
            shape: parents[0].expected_shape(),
        })
    }
}

impl TraitNode for Relu {
    fn kind(&self) -> &'static str {
        "Relu"
    }

    fn expected_shape(&self) -> DynShape {
        self.shape
    }

    fn calc_value(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parents[0].relu())
    }

    fn calc_grad_to_parent(
        &self,
        _index: usize,
        parents: &[&Tensor],
        _value: &Tensor,
        upstream: &Tensor,
    ) -> Result<Tensor, GraphError> {
        let mask = parents[0].map(|x| if x > 0.0 { 1.0 } else { 0.0 });
        Ok(upstream * &mask)
    }
}

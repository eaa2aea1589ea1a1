use super::super::TraitNode;
use crate::nn::GraphError;
use crate::nn::nodes::{DynShape, NodeHandle};
use crate::tensor::Tensor;

/// 偏置加法节点：`y = x + b`，b 为 [1, m]，按行广播到 x 的每一行
///
/// - `∂L/∂x = G`
/// - `∂L/∂b = Σ_rows G`
pub(in crate::nn) struct AddBias {
    shape: DynShape,
}

impl AddBias {
    pub(in crate::nn) fn new(parents: &[&NodeHandle]) -> Result<Self, GraphError> {
        if parents.len() != 2 {
            return Err(GraphError::InvalidOperation(
                "AddBias节点需要2个父节点（输入和偏置）".to_string(),
            ));
        }
        let input = parents[0].expected_shape();
        let bias = parents[1].expected_shape();
        if bias != DynShape::fixed(1, input.cols) {
            return Err(GraphError::ShapeMismatch {
                expected: vec![1, input.cols],
                got: bias.to_vec(),
                message: format!("{}必须是与{}同列数的行向量", parents[1], parents[0]),
            });
        }
        Ok(Self { shape: input })
    }
}

impl TraitNode for AddBias {
    fn kind(&self) -> &'static str {
        "AddBias"
    }

    fn expected_shape(&self) -> DynShape {
        self.shape
    }

    fn calc_value(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        let (x, b) = (parents[0], parents[1]);
        if b.shape() != [1, x.cols()] {
            return Err(GraphError::ShapeMismatch {
                expected: vec![1, x.cols()],
                got: b.shape().to_vec(),
                message: "偏置形状与输入不符".to_string(),
            });
        }
        // ndarray 会把 [1, m] 广播到 [n, m]
        Ok(x + b)
    }

    fn calc_grad_to_parent(
        &self,
        index: usize,
        _parents: &[&Tensor],
        _value: &Tensor,
        upstream: &Tensor,
    ) -> Result<Tensor, GraphError> {
        match index {
            0 => Ok(upstream.clone()),
            1 => Ok(upstream.sum_rows()),
            _ => Err(GraphError::InvalidOperation(format!(
                "AddBias没有第{index}个父节点"
            ))),
        }
    }
}

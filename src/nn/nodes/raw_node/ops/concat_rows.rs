use super::super::TraitNode;
use crate::nn::GraphError;
use crate::nn::nodes::{DynShape, NodeHandle};
use crate::tensor::Tensor;

/// 沿 batch 维拼接两个节点：[n, m] + [k, m] -> [n + k, m]
///
/// 第一个父节点的行在前，第二个在后；反向传播时按同样的行界把梯度切回去
pub(in crate::nn) struct ConcatRows {
    shape: DynShape,
}

impl ConcatRows {
    pub(in crate::nn) fn new(parents: &[&NodeHandle]) -> Result<Self, GraphError> {
        if parents.len() != 2 {
            return Err(GraphError::InvalidOperation(
                "ConcatRows节点需要2个父节点".to_string(),
            ));
        }
        let top = parents[0].expected_shape();
        let bottom = parents[1].expected_shape();
        if top.cols != bottom.cols {
            return Err(GraphError::ShapeMismatch {
                expected: top.to_vec(),
                got: bottom.to_vec(),
                message: format!("{}与{}的列数必须相同", parents[0], parents[1]),
            });
        }
        let rows = match (top.rows, bottom.rows) {
            (Some(a), Some(b)) => Some(a + b),
            _ => None,
        };
        Ok(Self {
            shape: DynShape {
                rows,
                cols: top.cols,
            },
        })
    }
}

impl TraitNode for ConcatRows {
    fn kind(&self) -> &'static str {
        "ConcatRows"
    }

    fn expected_shape(&self) -> DynShape {
        self.shape
    }

    fn calc_value(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Tensor::concat_rows(parents[0], parents[1]).ok_or_else(|| GraphError::ShapeMismatch {
            expected: parents[0].shape().to_vec(),
            got: parents[1].shape().to_vec(),
            message: "按行拼接的两个张量列数不同".to_string(),
        })
    }

    fn calc_grad_to_parent(
        &self,
        index: usize,
        parents: &[&Tensor],
        _value: &Tensor,
        upstream: &Tensor,
    ) -> Result<Tensor, GraphError> {
        let split = parents[0].rows();
        match index {
            0 => Ok(upstream.slice_rows(0, split)),
            1 => Ok(upstream.slice_rows(split, upstream.rows())),
            _ => Err(GraphError::InvalidOperation(format!(
                "ConcatRows没有第{index}个父节点"
            ))),
        }
    }
}

use super::super::TraitNode;
use crate::nn::GraphError;
use crate::nn::nodes::{DynShape, NodeHandle};
use crate::tensor::Tensor;

/// 矩阵乘法节点：`C = A · B`
///
/// - A: [n, k]，B: [k, m]，C: [n, m]
/// - `∂L/∂A = G · Bᵀ`，`∂L/∂B = Aᵀ · G`
pub(in crate::nn) struct MatMul {
    shape: DynShape,
}

impl MatMul {
    pub(in crate::nn) fn new(parents: &[&NodeHandle]) -> Result<Self, GraphError> {
        if parents.len() != 2 {
            return Err(GraphError::InvalidOperation(
                "MatMul节点需要2个父节点".to_string(),
            ));
        }
        let left = parents[0].expected_shape();
        let right = parents[1].expected_shape();

        // 右矩阵的行数必须在构图时就确定（通常是参数）
        let Some(inner) = right.rows else {
            return Err(GraphError::InvalidOperation(format!(
                "MatMul的右父节点{}行数不能是动态的",
                parents[1]
            )));
        };
        if left.cols != inner {
            return Err(GraphError::ShapeMismatch {
                expected: vec![inner, right.cols],
                got: left.to_vec(),
                message: format!("{}的列数必须等于{}的行数", parents[0], parents[1]),
            });
        }

        Ok(Self {
            shape: DynShape {
                rows: left.rows,
                cols: right.cols,
            },
        })
    }
}

impl TraitNode for MatMul {
    fn kind(&self) -> &'static str {
        "MatMul"
    }

    fn expected_shape(&self) -> DynShape {
        self.shape
    }

    fn calc_value(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        let (a, b) = (parents[0], parents[1]);
        if a.cols() != b.rows() {
            return Err(GraphError::ShapeMismatch {
                expected: vec![a.rows(), b.rows()],
                got: a.shape().to_vec(),
                message: "MatMul左矩阵的列数与右矩阵的行数不一致".to_string(),
            });
        }
        Ok(a.mat_mul(b))
    }

    fn calc_grad_to_parent(
        &self,
        index: usize,
        parents: &[&Tensor],
        _value: &Tensor,
        upstream: &Tensor,
    ) -> Result<Tensor, GraphError> {
        match index {
            0 => Ok(upstream.mat_mul(&parents[1].transpose())),
            1 => Ok(parents[0].transpose().mat_mul(upstream)),
            _ => Err(GraphError::InvalidOperation(format!(
                "MatMul没有第{index}个父节点"
            ))),
        }
    }
}

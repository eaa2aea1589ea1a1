use super::super::{TraitNode, ensure_same_shape};
use crate::nn::GraphError;
use crate::nn::nodes::{DynShape, NodeHandle};
use crate::tensor::Tensor;

/// MSE（均方误差）损失节点
///
/// ## 公式
/// `MSE = mean((input - target)^2) = sum((input - target)^2) / N`
///
/// ## 梯度
/// - `∂L/∂input = 2 * (input - target) / N`
/// - `∂L/∂target = -2 * (input - target) / N`
///
/// 两个父节点都可能需要梯度：自编码器里 target 是原始输入（无梯度），
/// 判别器损失里 input 是标签（无梯度），target 是判别器输出。
///
/// ## 输出
/// - 标量损失值 [1, 1]
pub(in crate::nn) struct MseLoss;

impl MseLoss {
    pub(in crate::nn) fn new(parents: &[&NodeHandle]) -> Result<Self, GraphError> {
        if parents.len() != 2 {
            return Err(GraphError::InvalidOperation(
                "MseLoss 节点需要 2 个父节点（input 和 target）".to_string(),
            ));
        }

        let input = parents[0].expected_shape();
        let target = parents[1].expected_shape();
        let rows_compatible = match (input.rows, target.rows) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        };
        if input.cols != target.cols || !rows_compatible {
            return Err(GraphError::ShapeMismatch {
                expected: input.to_vec(),
                got: target.to_vec(),
                message: format!("{}与{}的形状必须兼容", parents[0], parents[1]),
            });
        }

        Ok(Self)
    }
}

impl TraitNode for MseLoss {
    fn kind(&self) -> &'static str {
        "MseLoss"
    }

    fn expected_shape(&self) -> DynShape {
        DynShape::fixed(1, 1)
    }

    fn calc_value(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        let (input, target) = (parents[0], parents[1]);
        ensure_same_shape(input, target, "MseLoss 的 input 和 target 形状必须相同")?;

        let diff = input - target;
        let squared = &diff * &diff;
        Ok(Tensor::new(&[squared.mean()], &[1, 1]))
    }

    fn calc_grad_to_parent(
        &self,
        index: usize,
        parents: &[&Tensor],
        _value: &Tensor,
        upstream: &Tensor,
    ) -> Result<Tensor, GraphError> {
        let upstream = upstream.get_data_number().ok_or_else(|| {
            GraphError::ComputationError("MseLoss 的上游梯度必须是标量".to_string())
        })?;
        let (input, target) = (parents[0], parents[1]);
        let numel = input.size().max(1) as f32;
        let scale = 2.0 * upstream / numel;
        let diff = input - target;
        match index {
            0 => Ok(&diff * scale),
            1 => Ok(&diff * -scale),
            _ => Err(GraphError::InvalidOperation(format!(
                "MseLoss没有第{index}个父节点"
            ))),
        }
    }
}

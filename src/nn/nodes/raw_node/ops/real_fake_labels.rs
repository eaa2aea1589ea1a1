use super::super::TraitNode;
use crate::nn::GraphError;
use crate::nn::nodes::{DynShape, NodeHandle};
use crate::tensor::Tensor;

/// 判别器标签节点：第一个父节点的每一行记 +1（真），第二个父节点的每一行记 −1（假）
///
/// 输出 [n_real + n_fake, 1]，与 `ConcatRows(real, fake)` 的行一一对应。
/// 只读取父节点的行数，不向父节点传梯度。
pub(in crate::nn) struct RealFakeLabels {
    shape: DynShape,
}

/// 真样本的标签
pub const REAL_LABEL: f32 = 1.0;
/// 假（重建）样本的标签
pub const FAKE_LABEL: f32 = -1.0;

impl RealFakeLabels {
    pub(in crate::nn) fn new(parents: &[&NodeHandle]) -> Result<Self, GraphError> {
        if parents.len() != 2 {
            return Err(GraphError::InvalidOperation(
                "RealFakeLabels节点需要2个父节点（真样本和假样本）".to_string(),
            ));
        }
        let rows = match (
            parents[0].expected_shape().rows,
            parents[1].expected_shape().rows,
        ) {
            (Some(a), Some(b)) => Some(a + b),
            _ => None,
        };
        Ok(Self {
            shape: DynShape { rows, cols: 1 },
        })
    }
}

impl TraitNode for RealFakeLabels {
    fn kind(&self) -> &'static str {
        "RealFakeLabels"
    }

    fn expected_shape(&self) -> DynShape {
        self.shape
    }

    fn is_differentiable(&self) -> bool {
        false
    }

    fn calc_value(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        let (num_real, num_fake) = (parents[0].rows(), parents[1].rows());
        let labels: Vec<f32> = std::iter::repeat_n(REAL_LABEL, num_real)
            .chain(std::iter::repeat_n(FAKE_LABEL, num_fake))
            .collect();
        Ok(Tensor::new(&labels, &[num_real + num_fake, 1]))
    }

    fn calc_grad_to_parent(
        &self,
        index: usize,
        parents: &[&Tensor],
        _value: &Tensor,
        _upstream: &Tensor,
    ) -> Result<Tensor, GraphError> {
        let parent = parents.get(index).ok_or_else(|| {
            GraphError::InvalidOperation(format!("RealFakeLabels没有第{index}个父节点"))
        })?;
        Ok(Tensor::zeros(parent.shape()))
    }
}

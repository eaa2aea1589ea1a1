mod loss;
mod ops;
mod variable;

pub(in crate::nn) use loss::*;
pub(in crate::nn) use ops::*;
pub use ops::{FAKE_LABEL, REAL_LABEL};
pub(in crate::nn) use variable::*;

use enum_dispatch::enum_dispatch;

use super::DynShape;
use crate::nn::GraphError;
use crate::tensor::Tensor;

#[enum_dispatch]
pub(in crate::nn) enum NodeType {
    Input(Input),
    Parameter(Parameter),
    MatMul(MatMul),
    AddBias(AddBias),
    Tanh(Tanh),
    Relu(Relu),
    ConcatRows(ConcatRows),
    RealFakeLabels(RealFakeLabels),
    MseLoss(MseLoss),
    WeightedSum(WeightedSum),
}

#[enum_dispatch(NodeType)]
pub(in crate::nn) trait TraitNode {
    /// 节点类型名（用于错误信息和自动命名）
    fn kind(&self) -> &'static str;

    fn expected_shape(&self) -> DynShape;

    /// 叶子节点（输入、参数）的值只能由外部设置
    fn is_leaf(&self) -> bool {
        false
    }

    /// 为false时梯度不会经由本节点流向父节点
    fn is_differentiable(&self) -> bool {
        true
    }

    /// 返回该节点是否应该在训练过程中被更新
    fn is_trainable(&self) -> bool {
        false
    }

    // 根据父节点的值计算本节点的值（Graph保证调用前所有父节点都已有值）
    fn calc_value(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError>;

    /// 向量-雅可比积：已知 `∂L/∂self = upstream`，求 `∂L/∂parents[index]`
    fn calc_grad_to_parent(
        &self,
        index: usize,
        parents: &[&Tensor],
        value: &Tensor,
        upstream: &Tensor,
    ) -> Result<Tensor, GraphError>;
}

/// 运行时检查两个具体形状是否一致
pub(in crate::nn) fn ensure_same_shape(
    left: &Tensor,
    right: &Tensor,
    message: &str,
) -> Result<(), GraphError> {
    if left.shape() == right.shape() {
        Ok(())
    } else {
        Err(GraphError::ShapeMismatch {
            expected: left.shape().to_vec(),
            got: right.shape().to_vec(),
            message: message.to_string(),
        })
    }
}

use super::super::TraitNode;
use crate::nn::GraphError;
use crate::nn::nodes::{DynShape, NodeHandle};
use crate::tensor::Tensor;

/// 标量加权和：`y = Σ wᵢ · xᵢ`，每个父节点都必须是 [1, 1]
///
/// 用于把多个损失组合成一个复合目标
pub(in crate::nn) struct WeightedSum {
    weights: Vec<f32>,
}

impl WeightedSum {
    pub(in crate::nn) fn new(parents: &[&NodeHandle], weights: &[f32]) -> Result<Self, GraphError> {
        if parents.is_empty() || parents.len() != weights.len() {
            return Err(GraphError::InvalidOperation(format!(
                "WeightedSum的父节点数量（{}）必须与权重数量（{}）相同且不为0",
                parents.len(),
                weights.len()
            )));
        }
        for parent in parents {
            let shape = parent.expected_shape();
            if shape != DynShape::fixed(1, 1) {
                return Err(GraphError::ShapeMismatch {
                    expected: vec![1, 1],
                    got: shape.to_vec(),
                    message: format!("WeightedSum的父节点{parent}必须是标量"),
                });
            }
        }
        Ok(Self {
            weights: weights.to_vec(),
        })
    }
}

impl TraitNode for WeightedSum {
    fn kind(&self) -> &'static str {
        "WeightedSum"
    }

    fn expected_shape(&self) -> DynShape {
        DynShape::fixed(1, 1)
    }

    fn calc_value(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        let mut sum = 0.0;
        for (parent, weight) in parents.iter().zip(&self.weights) {
            let value = parent.get_data_number().ok_or_else(|| {
                GraphError::ComputationError(format!(
                    "WeightedSum的父节点不是标量，形状: {:?}",
                    parent.shape()
                ))
            })?;
            sum += weight * value;
        }
        Ok(Tensor::new(&[sum], &[1, 1]))
    }

    fn calc_grad_to_parent(
        &self,
        index: usize,
        _parents: &[&Tensor],
        _value: &Tensor,
        upstream: &Tensor,
    ) -> Result<Tensor, GraphError> {
        let weight = self.weights.get(index).ok_or_else(|| {
            GraphError::InvalidOperation(format!("WeightedSum没有第{index}个父节点"))
        })?;
        Ok(upstream * *weight)
    }
}

/*
 * @Date         : 2026-10-19
 * @Description  : Linear (全连接) 层
 */

use crate::nn::{Graph, GraphError, Init, Module, NodeId};

/// 权重截断正态分布的标准差
pub const WEIGHT_STD_DEV: f32 = 0.1;
/// 偏置的初始常数
pub const BIAS_INIT: f32 = 0.1;

/// Linear (全连接) 层：`output = x @ W + b`
///
/// # 输入/输出形状
/// - 输入：[batch_size, in_features]
/// - 输出：[batch_size, out_features]
///
/// # 参数命名
/// - 权重 `{name}_W`：[in_features, out_features]，截断正态初始化（std = 0.1）
/// - 偏置 `{name}_b`：[1, out_features]，常数 0.1 初始化
///
/// # 使用示例
/// ```ignore
/// let fc = Linear::new(&mut graph, 784, 50, "encoder_1")?;
/// let h = fc.forward(&mut graph, x)?;
/// let h = graph.new_tanh_node(h, None)?;
/// ```
pub struct Linear {
    weights: NodeId,
    bias: NodeId,
    in_features: usize,
    out_features: usize,
    name: String,
}

impl Linear {
    pub fn new(
        graph: &mut Graph,
        in_features: usize,
        out_features: usize,
        name: &str,
    ) -> Result<Self, GraphError> {
        let weights = graph.new_parameter_node(
            &[in_features, out_features],
            Init::TruncatedNormal {
                std_dev: WEIGHT_STD_DEV,
            },
            Some(&format!("{name}_W")),
        )?;
        let bias = graph.new_parameter_node(
            &[1, out_features],
            Init::Constant(BIAS_INIT),
            Some(&format!("{name}_b")),
        )?;

        Ok(Self {
            weights,
            bias,
            in_features,
            out_features,
            name: name.to_string(),
        })
    }

    /// 前向构图：`x @ W + b`，输出节点以层名命名
    ///
    /// `x` 的列数必须等于 `in_features`，否则在构图时返回 `ShapeMismatch`
    pub fn forward(&self, graph: &mut Graph, x: NodeId) -> Result<NodeId, GraphError> {
        let xw = graph.new_mat_mul_node(x, self.weights, Some(&format!("{}_xW", self.name)))?;
        graph.new_add_bias_node(xw, self.bias, Some(&self.name))
    }

    pub fn in_features(&self) -> usize {
        self.in_features
    }

    pub fn out_features(&self) -> usize {
        self.out_features
    }

    pub fn weights(&self) -> NodeId {
        self.weights
    }

    pub fn bias(&self) -> NodeId {
        self.bias
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Module for Linear {
    fn parameters(&self) -> Vec<NodeId> {
        vec![self.weights, self.bias]
    }
}

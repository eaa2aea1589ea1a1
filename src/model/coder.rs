/*
 * @Date         : 2026-10-19
 * @Description  : 三层全连接堆叠：Encoder (D → 50 → 50 → L)、Decoder (L → 50 → 50 → D)、
 *                 Discriminator (D → 50 → 50 → 1)
 *
 * 各层依次命名为 `{prefix}_1..3`，参数为 `{prefix}_k_W` / `{prefix}_k_b`。
 */

use crate::nn::{Graph, GraphError, Linear, Module, NodeId};

/// 隐藏层宽度
pub const HIDDEN_WIDTH: usize = 50;

/// 层后的激活函数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Tanh,
    Relu,
}

impl Activation {
    fn apply(self, graph: &mut Graph, x: NodeId, name: &str) -> Result<NodeId, GraphError> {
        match self {
            Self::Tanh => graph.new_tanh_node(x, Some(name)),
            Self::Relu => graph.new_relu_node(x, Some(name)),
        }
    }

    const fn suffix(self) -> &'static str {
        match self {
            Self::Tanh => "tanh",
            Self::Relu => "relu",
        }
    }
}

/// 若干个 Linear + 激活 依次相连
struct Stack {
    layers: Vec<(Linear, Activation)>,
}

impl Stack {
    fn new(
        graph: &mut Graph,
        prefix: &str,
        widths: &[usize],
        activations: &[Activation],
    ) -> Result<Self, GraphError> {
        let layers = widths
            .windows(2)
            .zip(activations)
            .enumerate()
            .map(|(i, (w, &act))| {
                Linear::new(graph, w[0], w[1], &format!("{prefix}_{}", i + 1)).map(|fc| (fc, act))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { layers })
    }

    /// 最后一个激活节点以 `output_name` 命名
    fn forward(&self, graph: &mut Graph, x: NodeId, output_name: &str) -> Result<NodeId, GraphError> {
        let mut h = x;
        for (i, (fc, act)) in self.layers.iter().enumerate() {
            let z = fc.forward(graph, h)?;
            h = if i + 1 == self.layers.len() {
                act.apply(graph, z, output_name)?
            } else {
                act.apply(graph, z, &format!("{}_{}", fc.name(), act.suffix()))?
            };
        }
        Ok(h)
    }

    fn out_features(&self) -> usize {
        self.layers.last().map_or(0, |(fc, _)| fc.out_features())
    }
}

impl Module for Stack {
    fn parameters(&self) -> Vec<NodeId> {
        self.layers.iter().flat_map(|(fc, _)| fc.parameters()).collect()
    }
}

/// 编码器：`D → 50 → 50 → L`，每层后接 tanh
pub struct Encoder(Stack);

impl Encoder {
    pub fn new(graph: &mut Graph, input_width: usize, latent_width: usize) -> Result<Self, GraphError> {
        Stack::new(
            graph,
            "encoder",
            &[input_width, HIDDEN_WIDTH, HIDDEN_WIDTH, latent_width],
            &[Activation::Tanh; 3],
        )
        .map(Self)
    }

    /// 输出节点名为 `encoded`
    pub fn forward(&self, graph: &mut Graph, x: NodeId) -> Result<NodeId, GraphError> {
        self.0.forward(graph, x, "encoded")
    }

    pub fn latent_width(&self) -> usize {
        self.0.out_features()
    }
}

impl Module for Encoder {
    fn parameters(&self) -> Vec<NodeId> {
        self.0.parameters()
    }
}

/// 解码器：`L → 50 → 50 → D`，前两层 tanh，最后一层 relu
pub struct Decoder(Stack);

impl Decoder {
    pub fn new(graph: &mut Graph, latent_width: usize, output_width: usize) -> Result<Self, GraphError> {
        Stack::new(
            graph,
            "decoder",
            &[latent_width, HIDDEN_WIDTH, HIDDEN_WIDTH, output_width],
            &[Activation::Tanh, Activation::Tanh, Activation::Relu],
        )
        .map(Self)
    }

    /// 输出节点名为 `decoded`
    pub fn forward(&self, graph: &mut Graph, encoded: NodeId) -> Result<NodeId, GraphError> {
        self.0.forward(graph, encoded, "decoded")
    }
}

impl Module for Decoder {
    fn parameters(&self) -> Vec<NodeId> {
        self.0.parameters()
    }
}

/// 判别器：`D → 50 → 50 → 1`，每层后接 tanh，输出落在 (-1, 1)
pub struct Discriminator(Stack);

impl Discriminator {
    pub fn new(graph: &mut Graph, input_width: usize) -> Result<Self, GraphError> {
        Stack::new(
            graph,
            "discriminator",
            &[input_width, HIDDEN_WIDTH, HIDDEN_WIDTH, 1],
            &[Activation::Tanh; 3],
        )
        .map(Self)
    }

    /// 输出节点名为 `discriminated`
    pub fn forward(&self, graph: &mut Graph, x: NodeId) -> Result<NodeId, GraphError> {
        self.0.forward(graph, x, "discriminated")
    }
}

impl Module for Discriminator {
    fn parameters(&self) -> Vec<NodeId> {
        self.0.parameters()
    }
}

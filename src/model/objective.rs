/*
 * @Date         : 2026-10-19
 * @Description  : 两种训练目标的构图
 *
 * - 普通自编码器：x → encoder → decoder，loss = mean((x − decoded)²)
 * - gancoder：在此基础上把 [x; decoded] 按行拼接后送入判别器，
 *   标签为 rows(x) 个 +1 接 rows(decoded) 个 −1，
 *   d_loss = MSE(labels, discriminated)，g_loss = 重建 MSE，
 *   composite = w_g · g_loss − (1 − w_g) · d_loss
 */

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Decoder, Discriminator, Encoder};
use crate::nn::{Graph, GraphError, Module, NodeId};

/// 训练哪一种模型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Autoencoder,
    #[default]
    Gancoder,
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Autoencoder => write!(f, "autoencoder"),
            Self::Gancoder => write!(f, "gancoder"),
        }
    }
}

/// 输入宽度 D 与隐空间宽度 L
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoderDims {
    pub input_width: usize,
    pub latent_width: usize,
}

/// 参数分组：构图时由各模块直接返回句柄
#[derive(Debug, Clone, Default)]
pub struct ParamGroups {
    pub encoder: Vec<NodeId>,
    pub decoder: Vec<NodeId>,
    pub discriminator: Vec<NodeId>,
}

impl ParamGroups {
    /// 生成器 = 编码器 + 解码器
    pub fn generator(&self) -> Vec<NodeId> {
        self.encoder.iter().chain(&self.decoder).copied().collect()
    }

    /// 检查三组两两不相交，且并集恰为图中全部可训练参数
    pub fn verify_partition(&self, graph: &Graph) -> Result<(), GraphError> {
        let mut seen = HashSet::new();
        for (group, ids) in [
            ("encoder", &self.encoder),
            ("decoder", &self.decoder),
            ("discriminator", &self.discriminator),
        ] {
            for &id in ids {
                if !seen.insert(id) {
                    return Err(GraphError::ParameterPartition(format!(
                        "参数{}在{group}组中重复出现",
                        graph.get_node_name(id)?
                    )));
                }
            }
        }

        let trainable = graph.get_trainable_nodes();
        if let Some(&orphan) = trainable.iter().find(|id| !seen.contains(*id)) {
            return Err(GraphError::ParameterPartition(format!(
                "参数{}不属于任何分组",
                graph.get_node_name(orphan)?
            )));
        }
        if seen.len() != trainable.len() {
            return Err(GraphError::ParameterPartition(format!(
                "分组共有{}个参数，而图中可训练参数为{}个",
                seen.len(),
                trainable.len()
            )));
        }
        Ok(())
    }
}

/// 普通自编码器
pub struct AutoencoderObjective {
    pub x: NodeId,
    pub loss: NodeId,
    pub decoded: NodeId,
    pub encoded: NodeId,
    pub groups: ParamGroups,
}

impl AutoencoderObjective {
    pub fn build(graph: &mut Graph, dims: CoderDims) -> Result<Self, GraphError> {
        let x = graph.new_input_node(dims.input_width, Some("x"))?;
        let encoder = Encoder::new(graph, dims.input_width, dims.latent_width)?;
        let encoded = encoder.forward(graph, x)?;
        let decoder = Decoder::new(graph, dims.latent_width, dims.input_width)?;
        let decoded = decoder.forward(graph, encoded)?;
        let loss = graph.new_mse_loss_node(x, decoded, Some("loss"))?;

        Ok(Self {
            x,
            loss,
            decoded,
            encoded,
            groups: ParamGroups {
                encoder: encoder.parameters(),
                decoder: decoder.parameters(),
                discriminator: Vec::new(),
            },
        })
    }
}

/// 对抗式自编码器
pub struct GancoderObjective {
    pub x: NodeId,
    pub g_loss: NodeId,
    pub d_loss: NodeId,
    /// 生成器的优化目标
    pub composite: NodeId,
    pub decoded: NodeId,
    pub encoded: NodeId,
    pub discriminated: NodeId,
    pub labels: NodeId,
    pub groups: ParamGroups,
}

impl GancoderObjective {
    /// `generator_weight` 即 w_g，判别器损失的权重为 1 − w_g
    pub fn build(graph: &mut Graph, dims: CoderDims, generator_weight: f32) -> Result<Self, GraphError> {
        let x = graph.new_input_node(dims.input_width, Some("x"))?;
        let encoder = Encoder::new(graph, dims.input_width, dims.latent_width)?;
        let encoded = encoder.forward(graph, x)?;
        let decoder = Decoder::new(graph, dims.latent_width, dims.input_width)?;
        let decoded = decoder.forward(graph, encoded)?;

        let to_discriminate = graph.new_concat_rows_node(x, decoded, Some("to_discriminate"))?;
        let discriminator = Discriminator::new(graph, dims.input_width)?;
        let discriminated = discriminator.forward(graph, to_discriminate)?;
        let labels = graph.new_real_fake_labels_node(x, decoded, Some("discrimination_labels"))?;

        let d_loss = graph.new_mse_loss_node(labels, discriminated, Some("d_loss"))?;
        let g_loss = graph.new_mse_loss_node(x, decoded, Some("g_loss"))?;
        let composite = graph.new_weighted_sum_node(
            &[(g_loss, generator_weight), (d_loss, -(1.0 - generator_weight))],
            Some("composite_loss"),
        )?;

        Ok(Self {
            x,
            g_loss,
            d_loss,
            composite,
            decoded,
            encoded,
            discriminated,
            labels,
            groups: ParamGroups {
                encoder: encoder.parameters(),
                decoder: decoder.parameters(),
                discriminator: discriminator.parameters(),
            },
        })
    }
}

/// 训练驱动实际使用的目标
pub enum Objective {
    Autoencoder(AutoencoderObjective),
    Gancoder(GancoderObjective),
}

impl Objective {
    pub fn build(
        graph: &mut Graph,
        variant: Variant,
        dims: CoderDims,
        generator_weight: f32,
    ) -> Result<Self, GraphError> {
        Ok(match variant {
            Variant::Autoencoder => Self::Autoencoder(AutoencoderObjective::build(graph, dims)?),
            Variant::Gancoder => {
                Self::Gancoder(GancoderObjective::build(graph, dims, generator_weight)?)
            }
        })
    }

    pub const fn variant(&self) -> Variant {
        match self {
            Self::Autoencoder(_) => Variant::Autoencoder,
            Self::Gancoder(_) => Variant::Gancoder,
        }
    }

    pub const fn input(&self) -> NodeId {
        match self {
            Self::Autoencoder(o) => o.x,
            Self::Gancoder(o) => o.x,
        }
    }

    pub const fn encoded(&self) -> NodeId {
        match self {
            Self::Autoencoder(o) => o.encoded,
            Self::Gancoder(o) => o.encoded,
        }
    }

    pub const fn decoded(&self) -> NodeId {
        match self {
            Self::Autoencoder(o) => o.decoded,
            Self::Gancoder(o) => o.decoded,
        }
    }

    /// 生成器（编码器 + 解码器）每步最小化的损失
    pub const fn generator_objective(&self) -> NodeId {
        match self {
            Self::Autoencoder(o) => o.loss,
            Self::Gancoder(o) => o.composite,
        }
    }

    pub const fn groups(&self) -> &ParamGroups {
        match self {
            Self::Autoencoder(o) => &o.groups,
            Self::Gancoder(o) => &o.groups,
        }
    }
}

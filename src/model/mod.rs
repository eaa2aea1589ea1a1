/*
 * @Date         : 2026-10-19
 * @Description  : 自编码器模型：编码器、解码器、判别器，以及两种训练目标
 *                 （普通自编码器 / 对抗式 gancoder）的构图
 */

mod coder;
mod objective;

pub use coder::{Activation, Decoder, Discriminator, Encoder, HIDDEN_WIDTH};
pub use objective::{
    AutoencoderObjective, CoderDims, GancoderObjective, Objective, ParamGroups, Variant,
};

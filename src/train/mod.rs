/*
 * @Date         : 2026-10-19
 * @Description  : 训练：配置、训练驱动、隐空间导出
 */

mod config;
mod export;
mod trainer;

pub use config::TrainConfig;
pub use export::{format_scientific, write_latent};
pub use trainer::{Losses, TrainReport, Trainer};

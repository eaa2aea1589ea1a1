/*
 * @Date         : 2026-10-19
 * @Description  : 训练配置：默认值即原训练脚本的常量，可从 JSON 文件读取，命令行参数再覆盖
 */

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::model::{CoderDims, Variant};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub variant: Variant,

    // 批次与可视化网格（batch_size 须等于 grid_rows * grid_cols）
    pub batch_size: usize,
    pub grid_rows: usize,
    pub grid_cols: usize,
    pub image_height: usize,
    pub image_width: usize,

    /// 隐空间维数
    pub encoding_size: usize,
    /// 训练步数（闭区间：实际执行 0..=training_steps）
    pub training_steps: u64,

    // Adam
    pub learning_rate: f32,
    pub beta1: f32,
    pub beta2: f32,
    pub epsilon: f32,

    /// 组合损失中重建损失的权重 w_g，判别器损失权重为 1 - w_g
    pub generator_loss_weight: f32,
    /// 每个生成器步之后的判别器步数
    pub discriminator_steps: usize,

    pub summary_interval: u64,
    pub checkpoint_interval: u64,

    pub model_file: PathBuf,
    pub gan_model_file: PathBuf,
    pub log_dir: PathBuf,
    pub image_dir: PathBuf,
    pub latent_file: PathBuf,

    /// None 时使用默认缓存目录
    pub data_dir: Option<PathBuf>,
    /// 从训练集开头划出的验证集大小
    pub validation_size: usize,
    /// None 时参数初始化和打乱都取系统熵
    pub seed: Option<u64>,
    /// 训练前若检查点存在则从中恢复
    pub resume: bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            variant: Variant::default(),
            batch_size: 50,
            grid_rows: 5,
            grid_cols: 10,
            image_height: 28,
            image_width: 28,
            encoding_size: 2,
            training_steps: 2_000_000,
            learning_rate: 1e-4,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            generator_loss_weight: 0.99,
            discriminator_steps: 1,
            summary_interval: 500,
            checkpoint_interval: 1000,
            model_file: PathBuf::from("./model/model.ckpt"),
            gan_model_file: PathBuf::from("./gan_model/model.ckpt"),
            log_dir: PathBuf::from("./logs"),
            image_dir: PathBuf::from("./images"),
            latent_file: PathBuf::from("latent_relu.csv"),
            data_dir: None,
            validation_size: 5000,
            seed: None,
            resume: false,
        }
    }
}

impl TrainConfig {
    /// 读取 JSON 配置文件，缺省的字段取默认值
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// 当前变体对应的检查点路径
    pub fn checkpoint_path(&self) -> &Path {
        match self.variant {
            Variant::Autoencoder => &self.model_file,
            Variant::Gancoder => &self.gan_model_file,
        }
    }

    pub const fn image_dims(&self) -> (usize, usize) {
        (self.image_height, self.image_width)
    }

    pub const fn grid(&self) -> (usize, usize) {
        (self.grid_rows, self.grid_cols)
    }

    pub const fn input_width(&self) -> usize {
        self.image_height * self.image_width
    }

    pub const fn coder_dims(&self) -> CoderDims {
        CoderDims {
            input_width: self.input_width(),
            latent_width: self.encoding_size,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| -> Result<()> { Err(Error::Config(msg)) };
        if self.batch_size == 0 {
            return fail("batch_size 必须大于 0".to_string());
        }
        if self.batch_size != self.grid_rows * self.grid_cols {
            return fail(format!(
                "batch_size({})须等于网格单元数 {}x{}",
                self.batch_size, self.grid_rows, self.grid_cols
            ));
        }
        if self.input_width() == 0 || self.encoding_size == 0 {
            return fail("图像尺寸和 encoding_size 必须大于 0".to_string());
        }
        if self.summary_interval == 0 || self.checkpoint_interval == 0 {
            return fail("summary_interval 和 checkpoint_interval 必须大于 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.generator_loss_weight) {
            return fail(format!(
                "generator_loss_weight 须在 [0, 1] 内，实际为 {}",
                self.generator_loss_weight
            ));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return fail(format!("learning_rate 须为有限正数，实际为 {}", self.learning_rate));
        }
        Ok(())
    }
}

//! 浮点张量到 8 位灰度的映射
//!
//! - 存在负值：以 128 为零点，按绝对值最大者缩放到 ±127
//! - 全非负：以 0 为零点，最大值缩放到 255
//! - 缩放基准小于 [`ZERO_THRESHOLD`] 时 `scale` 取 0

use crate::tensor::Tensor;

pub const ZERO_THRESHOLD: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntensityMapping {
    pub offset: f32,
    pub scale: f32,
}

impl IntensityMapping {
    pub fn from_values(min: f32, max: f32) -> Self {
        if min < 0.0 {
            let max_abs = min.abs().max(max.abs());
            Self {
                offset: 128.0,
                scale: if max_abs < ZERO_THRESHOLD { 0.0 } else { 127.0 / max_abs },
            }
        } else {
            Self {
                offset: 0.0,
                scale: if max < ZERO_THRESHOLD { 0.0 } else { 255.0 / max },
            }
        }
    }

    /// 按张量自身的最小/最大值确定映射；空张量得到全零映射
    pub fn for_tensor(tensor: &Tensor) -> Self {
        match (tensor.min(), tensor.max()) {
            (Some(min), Some(max)) => Self::from_values(min, max),
            _ => Self::from_values(0.0, 0.0),
        }
    }

    /// `v * scale + offset` 截断并饱和到 [0, 255]
    pub fn apply(&self, value: f32) -> u8 {
        (value * self.scale + self.offset) as u8
    }
}

use crate::tensor::Tensor;
use rand::Rng;

/// 参数初始化方式
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Init {
    /// 均值为0的截断正态分布（超过2倍标准差的样本重采）
    TruncatedNormal { std_dev: f32 },
    /// 所有元素取同一常数
    Constant(f32),
    Zeros,
}

impl Init {
    pub(crate) fn generate<R: Rng>(&self, shape: &[usize], rng: &mut R) -> Tensor {
        match *self {
            Self::TruncatedNormal { std_dev } => Tensor::truncated_normal(0.0, std_dev, shape, rng),
            Self::Constant(value) => Tensor::full(shape, value),
            Self::Zeros => Tensor::zeros(shape),
        }
    }
}

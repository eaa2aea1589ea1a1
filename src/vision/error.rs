use thiserror::Error;

/// 可视化相关错误
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("网格需要{expected}张图像，实际为{got}张")]
    GridSizeMismatch { expected: usize, got: usize },

    #[error("每张图像应有{expected}个像素，实际为{got}个")]
    ImageSizeMismatch { expected: usize, got: usize },

    #[error("图像编码失败: {0}")]
    Encode(#[from] image::ImageError),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}

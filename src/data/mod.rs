//! 数据加载模块
//!
//! 提供 MNIST 读取、训练/验证/测试切分以及按 epoch 打乱的批量采样。
//!
//! # 主要组件
//!
//! - [`MnistDataset`]: IDX 格式的 MNIST 手写数字数据（支持 .gz）
//! - [`DataSource`]: 训练循环所需的数据源接口
//! - [`Datasets`]: train / validation / test 三份切分，本身即一个 [`DataSource`]
//! - [`DataError`]: 数据加载错误类型
//!
//! # 使用示例
//!
//! ```ignore
//! use gancoder::data::{DataSource, Datasets};
//!
//! let mut data = Datasets::read_mnist(&dir, 5000, Some(42))?;
//! let batch = data.next_batch(50)?;
//! assert_eq!(batch.images.shape(), &[50, 784]);
//! ```

pub mod datasets;
pub mod error;
mod source;

#[cfg(test)]
mod tests;

// Re-exports
pub use datasets::{MnistDataset, default_data_dir};
pub use error::DataError;
pub use source::{Batch, DataSource, Datasets, ShuffledSplit, Split};

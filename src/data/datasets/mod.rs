//! 内置数据集
//!
//! - MNIST：手写数字（自编码器的默认训练数据）

mod mnist;

pub use mnist::{MnistDataset, default_data_dir};

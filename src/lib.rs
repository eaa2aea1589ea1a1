//! # gancoder
//!
//! 用纯 rust 训练一个全连接自编码器（以及加入判别器的对抗变体 gancoder），
//! 把 MNIST 这类图像压到二维隐空间，并输出重建图、训练摘要、检查点和隐向量文件。
//!

pub mod data;
pub mod errors;
pub mod model;
pub mod nn;
pub mod summary;
pub mod tensor;
pub mod train;
pub mod vision;

pub use errors::{Error, Result};

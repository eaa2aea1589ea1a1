/*
 * @Date         : 2026-10-19
 * @Description  : Layer 模块 - 便捷结构，组合 Node 构建常见网络结构
 */

mod linear;

pub use linear::{BIAS_INIT, Linear, WEIGHT_STD_DEV};

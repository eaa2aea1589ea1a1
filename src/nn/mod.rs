/*
 * @Date         : 2026-10-19
 * @Description  : 负责神经网络（neural network）的构建：计算图、层、优化器
 */

mod graph;
mod init;
pub mod layer;
mod module;
mod nodes;
pub mod optimizer;

pub use graph::{Graph, GraphError};
pub use init::Init;
pub use layer::Linear;
pub use module::Module;
pub use nodes::raw_node::{FAKE_LABEL, REAL_LABEL};
pub use nodes::{DynShape, NodeId};
pub use optimizer::{Adam, Optimizer};

#[cfg(test)]
mod tests;

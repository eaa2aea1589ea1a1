/*
 * @Date         : 2026-10-19
 * @Description  : 优化器模块
 */

mod adam;
mod base;

pub use adam::Adam;
pub use base::Optimizer;

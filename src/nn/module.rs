/*
 * @Date         : 2026-10-19
 * @Description  : Module trait 定义
 */

use super::NodeId;

/// 模块 trait
///
/// # 设计原则
/// - `forward()` **不是** trait 方法（签名各异）
/// - `new()` **不是** trait 方法（参数各异）
/// - `parameters()` 返回本模块创建的参数节点（签名一致，放入 trait）
///
/// 每个模块在构建时自己记录参数归属，优化器和参数分组直接使用这些句柄，
/// 不再按名称在图中搜索。
pub trait Module {
    /// 获取所有可训练参数
    fn parameters(&self) -> Vec<NodeId>;
}

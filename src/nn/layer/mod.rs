/*
 * @Author       : 老董
 * @Date         : 2025-12-22
 * @Description  : Layer 模块 - 持有参数的层，前向/反向委托给 ops 中的算子
 */

mod grouped_conv2d;

pub use grouped_conv2d::GroupedConv2d;

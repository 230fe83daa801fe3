/*
 * @Author       : 老董
 * @Date         : 2024-01-31 20:23:53
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-18
 * @Description  : 负责神经网络（neural network）的构建：带参数的层与各网络结构的参数布局
 */

pub mod layer;
pub mod network;
mod param;

pub use layer::GroupedConv2d;
pub use network::{NetworkKind, NetworkPlan, create_network};
pub use param::{Init, Param};

#[cfg(test)]
mod tests;

//! # Shake Torch
//!
//! `shake_torch`用纯rust实现了两个带显式前向/反向的自定义算子：
//! 分组卷积（ResNeXt 用）与 Shake-Shake 正则化中的 shake noise，
//! 并提供在 CIFAR/MNIST 上训练 ResNet、DenseNet、ResNeXt、ShakeNet 所需的周边组件：
//! 网络参数布局、数据集加载与增强、学习率调度、日志与最佳模型快照、检查点。
//!

pub mod checkpoint;
pub mod config;
pub mod data;
pub mod errors;
pub mod nn;
pub mod ops;
pub mod tensor;
pub mod training;
pub mod utils;

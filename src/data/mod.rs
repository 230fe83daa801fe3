//! 数据加载模块
//!
//! 提供图像分类数据集的加载与数据增强。
//!
//! # 主要组件
//!
//! - [`ImageDataset`]: 带随机裁剪/翻转增强的图像数据集
//! - [`load_cifar10`] / [`load_cifar100`] / [`load_mnist`]: 从本地二进制文件加载
//! - [`DataError`]: 数据加载错误类型
//!
//! # 使用示例
//!
//! ```ignore
//! use shake_torch::data::load_dataset;
//!
//! let (train, test) = load_dataset("cifar10", "data/cifar10")?;
//! let mut rng = StdRng::seed_from_u64(0);
//! let (x, t) = train.get_batch(&[0, 1, 2, 3], &mut rng)?; // x: [4, 3, 32, 32]
//! ```

pub mod datasets;
pub mod error;
mod image_dataset;
pub mod transforms;

#[cfg(test)]
mod tests;

// Re-exports
pub use datasets::{load_cifar10, load_cifar100, load_dataset, load_mnist};
pub use error::DataError;
pub use image_dataset::ImageDataset;

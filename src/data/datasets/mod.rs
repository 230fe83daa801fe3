//! 内置数据集
//!
//! - MNIST：手写数字，[N, 1, 28, 28]，不做数据增强
//! - CIFAR-10 / CIFAR-100：32x32 彩色图像，训练集做补零随机裁剪与水平翻转

mod cifar;
mod mnist;

use std::path::Path;

pub use cifar::{load_cifar10, load_cifar100};
pub use mnist::load_mnist;

use crate::data::{DataError, ImageDataset};

/// 按名字加载数据集，返回`(训练集, 测试集)`
pub fn load_dataset(name: &str, root: impl AsRef<Path>) -> Result<(ImageDataset, ImageDataset), DataError> {
    match name {
        "mnist" => load_mnist(root),
        "cifar10" => load_cifar10(root),
        "cifar100" => load_cifar100(root),
        _ => Err(DataError::UnknownDataset(name.to_string())),
    }
}

/// 在`root`或`root/subdir`下查找文件
fn locate(root: &Path, subdir: &str, name: &str) -> Result<std::path::PathBuf, DataError> {
    [root.join(name), root.join(subdir).join(name)]
        .into_iter()
        .find(|path| path.exists())
        .ok_or_else(|| DataError::FileNotFound(root.join(name)))
}

//! CIFAR-10 / CIFAR-100 数据集（二进制版本）
//!
//! 每条记录为若干字节的标签，后接 3072 字节像素（R、G、B 三个 32x32 平面）：
//! - CIFAR-10：`<label><3072 bytes>`，训练集为 data_batch_1..5.bin，测试集为 test_batch.bin
//! - CIFAR-100：`<coarse label><fine label><3072 bytes>`，使用细分类标签，文件为 train.bin / test.bin

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::locate;
use crate::data::transforms::normalize_pixels;
use crate::data::{DataError, ImageDataset};

const IMAGE_SHAPE: [usize; 3] = [3, 32, 32];
const IMAGE_BYTES: usize = 3 * 32 * 32;
/// 训练集的数据增强参数
const TRAIN_PAD: usize = 4;

/// 加载 CIFAR-10，返回`(训练集, 测试集)`；`root`下（或其`cifar-10-batches-bin`子目录下）需有二进制文件
pub fn load_cifar10(root: impl AsRef<Path>) -> Result<(ImageDataset, ImageDataset), DataError> {
    let root = root.as_ref();
    let subdir = "cifar-10-batches-bin";
    let train_files = (1..=5)
        .map(|i| locate(root, subdir, &format!("data_batch_{i}.bin")))
        .collect::<Result<Vec<_>, _>>()?;
    let test_file = locate(root, subdir, "test_batch.bin")?;

    let train = read_records(&train_files, 1, 0)?;
    let test = read_records(&[test_file], 1, 0)?;
    Ok((
        ImageDataset::new(train.0, train.1, TRAIN_PAD, true)?,
        ImageDataset::new(test.0, test.1, 0, false)?,
    ))
}

/// 加载 CIFAR-100（细分类，100类），返回`(训练集, 测试集)`
pub fn load_cifar100(root: impl AsRef<Path>) -> Result<(ImageDataset, ImageDataset), DataError> {
    let root = root.as_ref();
    let subdir = "cifar-100-binary";
    let train = read_records(&[locate(root, subdir, "train.bin")?], 2, 1)?;
    let test = read_records(&[locate(root, subdir, "test.bin")?], 2, 1)?;
    Ok((
        ImageDataset::new(train.0, train.1, TRAIN_PAD, true)?,
        ImageDataset::new(test.0, test.1, 0, false)?,
    ))
}

/// 依次读取多个文件的记录，拼成 [N, 3, 32, 32] 的图像与标签
///
/// - `label_bytes`：每条记录开头的标签字节数
/// - `label_index`：使用其中第几个标签字节
fn read_records(
    paths: &[impl AsRef<Path>],
    label_bytes: usize,
    label_index: usize,
) -> Result<(crate::tensor::Tensor, Vec<usize>), DataError> {
    let record_size = label_bytes + IMAGE_BYTES;
    let mut pixels = Vec::new();
    let mut labels = Vec::new();

    for path in paths {
        let path = path.as_ref();
        let file = File::open(path).map_err(|_| DataError::FileNotFound(path.to_path_buf()))?;
        let mut bytes = Vec::new();
        BufReader::new(file).read_to_end(&mut bytes)?;

        if bytes.len() % record_size != 0 {
            return Err(DataError::FormatError(format!(
                "{}的长度{}不是记录长度{}的整数倍",
                path.display(),
                bytes.len(),
                record_size
            )));
        }
        for record in bytes.chunks_exact(record_size) {
            labels.push(usize::from(record[label_index]));
            pixels.extend_from_slice(&record[label_bytes..]);
        }
    }

    let mut shape = vec![labels.len()];
    shape.extend(IMAGE_SHAPE);
    Ok((normalize_pixels(&pixels, &shape)?, labels))
}

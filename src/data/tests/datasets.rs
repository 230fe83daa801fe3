//! 数据集加载单元测试：用临时目录中构造的小文件验证 CIFAR 二进制与 MNIST IDX 的解析

use std::fs;
use std::io::Write;
use std::path::Path;

use approx::assert_abs_diff_eq;
use flate2::Compression;
use flate2::write::GzEncoder;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::assert_err;
use crate::data::{DataError, load_cifar10, load_cifar100, load_dataset, load_mnist};

const PIXELS: usize = 3 * 32 * 32;

fn cifar_record(labels: &[u8], seed: u8) -> Vec<u8> {
    let mut record = labels.to_vec();
    record.extend((0..PIXELS).map(|i| (i as u8).wrapping_add(seed)));
    record
}

// ==================== CIFAR ====================

#[test]
fn test_load_cifar10() -> Result<(), DataError> {
    let root = tempfile::tempdir()?;
    let dir = root.path().join("cifar-10-batches-bin");
    fs::create_dir_all(&dir)?;
    for i in 1..=5u8 {
        let data = [cifar_record(&[i], 0), cifar_record(&[9], 1)].concat();
        fs::write(dir.join(format!("data_batch_{i}.bin")), data)?;
    }
    fs::write(dir.join("test_batch.bin"), cifar_record(&[4], 0))?;

    let (train, test) = load_cifar10(root.path())?;
    assert_eq!(train.len(), 10);
    assert_eq!(test.len(), 1);
    assert_eq!(train.labels(), &[1, 9, 2, 9, 3, 9, 4, 9, 5, 9]);
    assert_eq!((train.pad(), train.flip()), (4, true));
    assert_eq!((test.pad(), test.flip()), (0, false));
    assert_eq!(train.image_shape(), vec![3, 32, 32]);

    // 测试集不做增强，像素按 /255 归一化
    let mut rng = StdRng::seed_from_u64(0);
    let (image, label) = test.get_example(0, &mut rng)?;
    assert_eq!(label, 4);
    assert_eq!(image.shape(), &[3, 32, 32]);
    assert_abs_diff_eq!(image[[0, 0, 1]], 1.0 / 255.0);
    // 第 255 个字节位于第 7 行第 31 列
    assert_abs_diff_eq!(image[[0, 7, 31]], 1.0);
    assert_abs_diff_eq!(image[[1, 0, 0]], 0.0);
    Ok(())
}

#[test]
fn test_load_cifar100_uses_fine_labels() -> Result<(), DataError> {
    let root = tempfile::tempdir()?;
    let data = [cifar_record(&[3, 42], 0), cifar_record(&[19, 99], 0)].concat();
    fs::write(root.path().join("train.bin"), data)?;
    fs::write(root.path().join("test.bin"), cifar_record(&[0, 7], 0))?;

    let (train, test) = load_cifar100(root.path())?;
    assert_eq!(train.labels(), &[42, 99]);
    assert_eq!(test.labels(), &[7]);
    Ok(())
}

#[test]
fn test_cifar_rejects_truncated_file() -> Result<(), DataError> {
    let root = tempfile::tempdir()?;
    let mut data = cifar_record(&[0, 1], 0);
    data.pop();
    fs::write(root.path().join("train.bin"), data)?;
    fs::write(root.path().join("test.bin"), cifar_record(&[0, 7], 0))?;

    assert_err!(load_cifar100(root.path()), DataError::FormatError(_));
    assert_err!(load_cifar10(root.path()), DataError::FileNotFound(_));
    Ok(())
}

// ==================== MNIST ====================

fn idx_images(count: usize) -> Vec<u8> {
    let mut bytes = Vec::new();
    for v in [2051u32, count as u32, 28, 28] {
        bytes.extend(v.to_be_bytes());
    }
    bytes.extend((0..count * 28 * 28).map(|i| (i % 256) as u8));
    bytes
}

fn idx_labels(labels: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend(2049u32.to_be_bytes());
    bytes.extend((labels.len() as u32).to_be_bytes());
    bytes.extend(labels);
    bytes
}

fn write_gz(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut encoder = GzEncoder::new(fs::File::create(path)?, Compression::default());
    encoder.write_all(bytes)?;
    encoder.finish()?;
    Ok(())
}

#[test]
fn test_load_mnist_plain_and_gz() -> Result<(), DataError> {
    let root = tempfile::tempdir()?;
    let dir = root.path();
    write_gz(&dir.join("train-images-idx3-ubyte.gz"), &idx_images(3))?;
    write_gz(&dir.join("train-labels-idx1-ubyte.gz"), &idx_labels(&[5, 0, 4]))?;
    fs::write(dir.join("t10k-images-idx3-ubyte"), idx_images(2))?;
    fs::write(dir.join("t10k-labels-idx1-ubyte"), idx_labels(&[7, 2]))?;

    let (train, test) = load_dataset("mnist", dir)?;
    assert_eq!(train.len(), 3);
    assert_eq!(train.labels(), &[5, 0, 4]);
    assert_eq!(test.labels(), &[7, 2]);
    assert_eq!(train.image_shape(), vec![1, 28, 28]);
    assert_eq!((train.pad(), train.flip()), (0, false));

    let mut rng = StdRng::seed_from_u64(0);
    let (image, _) = train.get_example(1, &mut rng)?;
    // 第2张图的第1个像素是全局第 784 个字节：784 % 256 = 16
    assert_abs_diff_eq!(image[[0, 0, 0]], 16.0 / 255.0);
    Ok(())
}

#[test]
fn test_load_mnist_errors() -> Result<(), DataError> {
    let root = tempfile::tempdir()?;
    let dir = root.path();
    assert_err!(load_mnist(dir), DataError::FileNotFound(_));

    // 标签文件的 magic number 错误
    fs::write(dir.join("train-images-idx3-ubyte"), idx_images(1))?;
    fs::write(dir.join("train-labels-idx1-ubyte"), idx_images(1))?;
    assert_err!(load_mnist(dir), DataError::FormatError(_));

    // 图像与标签数量不一致
    fs::write(dir.join("train-labels-idx1-ubyte"), idx_labels(&[1, 2]))?;
    assert_err!(load_mnist(dir), DataError::ShapeMismatch { .. });

    assert_err!(load_dataset("svhn", dir), DataError::UnknownDataset(_));
    Ok(())
}

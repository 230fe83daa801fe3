//! MNIST 手写数字数据集
//!
//! 支持：
//! - IDX 二进制格式解析（支持 .gz 压缩）
//! - 像素归一化 (0-255 → 0-1)
//! - 图像形状为 [N, 1, 28, 28]，标签为类别下标

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;

use crate::data::transforms::normalize_pixels;
use crate::data::{DataError, ImageDataset};

const IMAGES_MAGIC: u32 = 2051;
const LABELS_MAGIC: u32 = 2049;
const SIDE: usize = 28;

/// 加载 MNIST，返回`(训练集, 测试集)`，均不做数据增强
///
/// `root`下需有`train-images-idx3-ubyte`等4个文件（解压后的或`.gz`均可）
pub fn load_mnist(root: impl AsRef<Path>) -> Result<(ImageDataset, ImageDataset), DataError> {
    let root = root.as_ref();
    let train = load_split(root, "train-images-idx3-ubyte", "train-labels-idx1-ubyte")?;
    let test = load_split(root, "t10k-images-idx3-ubyte", "t10k-labels-idx1-ubyte")?;
    Ok((train, test))
}

fn load_split(root: &Path, images_file: &str, labels_file: &str) -> Result<ImageDataset, DataError> {
    let (count, pixels) = parse_idx_images(open_idx(&find_file(root, images_file)?)?)?;
    let labels = parse_idx_labels(open_idx(&find_file(root, labels_file)?)?)?;

    if labels.len() != count {
        return Err(DataError::ShapeMismatch {
            expected: vec![count],
            got: vec![labels.len()],
        });
    }

    let images = normalize_pixels(&pixels, &[count, 1, SIDE, SIDE])?;
    ImageDataset::new(images, labels, 0, false)
}

/// 优先使用解压后的文件，其次是 .gz 文件
fn find_file(data_dir: &Path, base_name: &str) -> Result<PathBuf, DataError> {
    let uncompressed_path = data_dir.join(base_name);
    if uncompressed_path.exists() {
        return Ok(uncompressed_path);
    }

    let gz_path = data_dir.join(format!("{base_name}.gz"));
    if gz_path.exists() {
        return Ok(gz_path);
    }

    Err(DataError::FileNotFound(uncompressed_path))
}

fn open_idx(path: &Path) -> Result<Box<dyn Read>, DataError> {
    let file = File::open(path).map_err(|_| DataError::FileNotFound(path.to_path_buf()))?;
    Ok(if path.extension().is_some_and(|ext| ext == "gz") {
        Box::new(GzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(BufReader::new(file))
    })
}

fn read_u32(reader: &mut impl Read) -> Result<u32, DataError> {
    let mut bytes = [0u8; 4];
    reader
        .read_exact(&mut bytes)
        .map_err(|e| DataError::FormatError(format!("读取头部失败: {e}")))?;
    Ok(u32::from_be_bytes(bytes))
}

/// 解析 IDX 图像文件，返回`(图像数, 像素字节)`
///
/// IDX 格式：
/// - [0-3] magic number (0x00000803 = 2051)
/// - [4-7] number of images
/// - [8-11] number of rows
/// - [12-15] number of columns
/// - [16+] pixel data (unsigned byte)
fn parse_idx_images(mut reader: impl Read) -> Result<(usize, Vec<u8>), DataError> {
    let magic = read_u32(&mut reader)?;
    if magic != IMAGES_MAGIC {
        return Err(DataError::FormatError(format!(
            "无效的 magic number: {magic} (期望 {IMAGES_MAGIC})"
        )));
    }

    let num_images = read_u32(&mut reader)? as usize;
    let num_rows = read_u32(&mut reader)? as usize;
    let num_cols = read_u32(&mut reader)? as usize;
    if num_rows != SIDE || num_cols != SIDE {
        return Err(DataError::FormatError(format!(
            "无效的图像尺寸: {num_rows}x{num_cols} (期望 28x28)"
        )));
    }

    let mut pixels = vec![0u8; num_images * SIDE * SIDE];
    reader
        .read_exact(&mut pixels)
        .map_err(|e| DataError::FormatError(format!("读取像素数据失败: {e}")))?;
    Ok((num_images, pixels))
}

/// 解析 IDX 标签文件
///
/// IDX 格式：
/// - [0-3] magic number (0x00000801 = 2049)
/// - [4-7] number of labels
/// - [8+] label data (unsigned byte, 0-9)
fn parse_idx_labels(mut reader: impl Read) -> Result<Vec<usize>, DataError> {
    let magic = read_u32(&mut reader)?;
    if magic != LABELS_MAGIC {
        return Err(DataError::FormatError(format!(
            "无效的 magic number: {magic} (期望 {LABELS_MAGIC})"
        )));
    }

    let num_labels = read_u32(&mut reader)? as usize;
    let mut labels = vec![0u8; num_labels];
    reader
        .read_exact(&mut labels)
        .map_err(|e| DataError::FormatError(format!("读取标签数据失败: {e}")))?;
    Ok(labels.into_iter().map(usize::from).collect())
}

/*
 * @Author       : 老董
 * @Date         : 2026-10-18
 * @Description  : 带数据增强的图像分类数据集：随机平移裁剪（先四周补零再裁回原尺寸）与随机水平翻转
 */

use rand::Rng;

use crate::data::DataError;
use crate::tensor::Tensor;

/// 图像分类数据集
///
/// - `images`：[N, C, H, W]，补零在构造时一次性完成
/// - `labels`：长度为 N 的类别下标
/// - `pad > 0`时，取样本会在补零后的图像上随机裁出 H×W 的区域（偏移在`0..=2*pad`）
/// - `flip`为真时，取样本会以 1/2 的概率水平翻转
#[derive(Debug, Clone)]
pub struct ImageDataset {
    images: Tensor,
    labels: Vec<usize>,
    pad: usize,
    flip: bool,
}

impl ImageDataset {
    pub fn new(images: Tensor, labels: Vec<usize>, pad: usize, flip: bool) -> Result<Self, DataError> {
        if images.dimension() != 4 || images.shape()[0] != labels.len() {
            let mut expected = images.shape().to_vec();
            expected.resize(4, 0);
            expected[0] = labels.len();
            return Err(DataError::ShapeMismatch {
                expected,
                got: images.shape().to_vec(),
            });
        }

        let images = if pad > 0 {
            images.pad_spatial(pad, pad)?
        } else {
            images
        };
        Ok(Self {
            images,
            labels,
            pad,
            flip,
        })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub const fn pad(&self) -> usize {
        self.pad
    }

    pub const fn flip(&self) -> bool {
        self.flip
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// 单个样本（不含 batch 维度）的形状 [C, H, W]
    pub fn image_shape(&self) -> Vec<usize> {
        let shape = self.images.shape();
        vec![shape[1], shape[2] - 2 * self.pad, shape[3] - 2 * self.pad]
    }

    /// 取第`index`个样本（已做数据增强）：`(image [C, H, W], label)`
    pub fn get_example<R: Rng + ?Sized>(
        &self,
        index: usize,
        rng: &mut R,
    ) -> Result<(Tensor, usize), DataError> {
        if index >= self.len() {
            return Err(DataError::IndexOutOfBounds {
                index,
                len: self.len(),
            });
        }

        let mut image = self.images.select(0, index)?;
        if self.pad > 0 {
            let shape = self.image_shape();
            let (h, w) = (shape[1], shape[2]);
            let top = rng.gen_range(0..=2 * self.pad);
            let left = rng.gen_range(0..=2 * self.pad);
            image = image.narrow(1, top, h)?.narrow(2, left, w)?;
        }
        if self.flip && rng.gen_range(0..2) == 1 {
            image = image.flip(2)?;
        }

        Ok((image, self.labels[index]))
    }

    /// 按下标取一批样本：`(images [B, C, H, W], labels)`
    pub fn get_batch<R: Rng + ?Sized>(
        &self,
        indices: &[usize],
        rng: &mut R,
    ) -> Result<(Tensor, Vec<usize>), DataError> {
        let (images, labels): (Vec<_>, Vec<_>) = indices
            .iter()
            .map(|&i| self.get_example(i, rng))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .unzip();

        let images = Tensor::stack(&images.iter().collect::<Vec<_>>(), 0)?;
        Ok((images, labels))
    }
}

//! 数据变换函数

use crate::tensor::Tensor;

/// 将 0-255 的原始字节转换为 [N, ...] 形状、值范围 0-1 的 Tensor
pub fn normalize_pixels(bytes: &[u8], shape: &[usize]) -> Result<Tensor, crate::errors::TensorError> {
    let data = bytes.iter().map(|&p| f32::from(p) / 255.0).collect::<Vec<_>>();
    Tensor::try_new(&data, shape)
}

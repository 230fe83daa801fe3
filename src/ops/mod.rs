/*
 * @Author       : 老董
 * @Date         : 2026-10-18
 * @Description  : 可微算子层。每个算子都显式给出成对的前向/反向计算，
 *                 由外部的自动微分机制（或调用方）负责串联整张图
 */

mod conv2d;
mod grouped_conv2d;
mod shake;

pub use conv2d::{Convolution2d, conv_output_size};
pub use grouped_conv2d::{GroupedConvolution2d, grouped_convolution_2d};
pub use shake::{FixedMasks, MaskSource, Mode, RandomMask, ShakeNoise, shake_noise};

use crate::errors::OpError;
use crate::tensor::Tensor;

#[cfg(test)]
mod tests;

/// 可微算子：前向与反向成对出现。
///
/// - `forward`：按顺序接收输入，返回唯一输出
/// - `backward`：接收同一组输入与上游梯度，按输入顺序返回各输入的梯度
///
/// 输入的形状校验必须在任何数值计算之前完成，失败时不返回部分结果
pub trait Function {
    fn forward(&mut self, inputs: &[&Tensor]) -> Result<Tensor, OpError>;

    fn backward(&mut self, inputs: &[&Tensor], grad_output: &Tensor)
    -> Result<Vec<Tensor>, OpError>;
}

/// 把单个数扩展成(高, 宽)二元组，如步长、填充、卷积核尺寸
pub const fn pair(value: usize) -> (usize, usize) {
    (value, value)
}

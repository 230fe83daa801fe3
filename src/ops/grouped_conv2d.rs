/*
 * @Author       : 老董
 * @Date         : 2026-10-18
 * @Description  : 分组 2D 卷积算子（ResNeXt 使用）
 *
 * 形状约定：
 * - 输入 x: [N, C_in, H, W]
 * - 卷积核 W: [G, C_out/G, C_in/G, kH, kW]，即 G 组互相独立的卷积核
 * - 偏置 b（可选）: [G, C_out/G]
 * - 输出 y: [N, C_out, H', W']
 *
 * 第 i 组只读取 x 在通道轴上的第 i 段 [i*C_in/G, (i+1)*C_in/G)，
 * 只写入 y 在通道轴上的第 i 段，因此等价于一个块对角的普通卷积。
 * 各组之间没有数据依赖，用 Rayon 并行，全部完成后再按组序拼接。
 */

use rayon::prelude::*;

use super::{Convolution2d, Function};
use crate::errors::OpError;
use crate::tensor::Tensor;

const OP: &str = "GroupedConvolution2d";

/// 校验通过后的各维度长度
#[derive(Debug, Clone, Copy)]
struct GroupDims {
    groups: usize,
    in_per_group: usize,
    out_per_group: usize,
    batch: usize,
    out_h: usize,
    out_w: usize,
}

/// 分组 2D 卷积算子
#[derive(Debug, Clone)]
pub struct GroupedConvolution2d {
    conv: Convolution2d,
}

impl GroupedConvolution2d {
    pub const fn new(stride: (usize, usize), pad: (usize, usize)) -> Self {
        Self {
            conv: Convolution2d::new(stride, pad),
        }
    }

    fn check_inputs(&self, inputs: &[&Tensor]) -> Result<GroupDims, OpError> {
        if !(2..=3).contains(&inputs.len()) {
            return Err(OpError::InputCount {
                op: OP,
                expected: "2或3",
                got: inputs.len(),
            });
        }
        let (x_shape, w_shape) = (inputs[0].shape(), inputs[1].shape());
        if x_shape.len() != 4 {
            return Err(OpError::Rank {
                op: OP,
                operand: "x",
                expected: 4,
                got: x_shape.to_vec(),
            });
        }
        if w_shape.len() != 5 {
            return Err(OpError::Rank {
                op: OP,
                operand: "W",
                expected: 5,
                got: w_shape.to_vec(),
            });
        }

        let (groups, out_per_group, in_per_group) = (w_shape[0], w_shape[1], w_shape[2]);
        if groups == 0 {
            return Err(OpError::GroupCount {
                op: OP,
                what: "输入",
                channels: x_shape[1],
                groups,
            });
        }
        if x_shape[1] != groups * in_per_group {
            return Err(OpError::ChannelMismatch {
                op: OP,
                channels: x_shape[1],
                groups,
                per_group: in_per_group,
            });
        }

        if let Some(b) = inputs.get(2) {
            if b.dimension() != 2 {
                return Err(OpError::Rank {
                    op: OP,
                    operand: "b",
                    expected: 2,
                    got: b.shape().to_vec(),
                });
            }
            if b.shape() != [groups, out_per_group] {
                return Err(OpError::ShapeMismatch {
                    op: OP,
                    operand: "b",
                    expected: vec![groups, out_per_group],
                    got: b.shape().to_vec(),
                });
            }
        }

        // 单组的形状合法即全部合法（步长、填充、核尺寸对所有组相同）
        let group_out = self.conv.output_shape(
            &[x_shape[0], in_per_group, x_shape[2], x_shape[3]],
            &[out_per_group, in_per_group, w_shape[3], w_shape[4]],
        )?;

        Ok(GroupDims {
            groups,
            in_per_group,
            out_per_group,
            batch: x_shape[0],
            out_h: group_out[2],
            out_w: group_out[3],
        })
    }

    /// 取出第`group`组的输入：[x 的通道切片, W[group], b[group]（若有）]
    fn group_inputs(inputs: &[&Tensor], dims: GroupDims, group: usize) -> Result<Vec<Tensor>, OpError> {
        let mut group_inputs = vec![
            inputs[0].narrow(1, group * dims.in_per_group, dims.in_per_group)?,
            inputs[1].select(0, group)?,
        ];
        if let Some(b) = inputs.get(2) {
            group_inputs.push(b.select(0, group)?);
        }
        Ok(group_inputs)
    }
}

/// 把按组排列的 [G] 个 [N, C/G, H, W] 合并成 [N, C, H, W]：
/// 先堆叠成 [G, N, C/G, H, W]，再把组轴移到通道轴旁边并展平进通道维
fn merge_groups(parts: &[Tensor]) -> Result<Tensor, OpError> {
    let refs = parts.iter().collect::<Vec<_>>();
    let stacked = Tensor::stack(&refs, 0)?;
    let shape = stacked.shape().to_vec();
    let merged = stacked
        .permute(&[1, 0, 2, 3, 4])?
        .reshape(&[shape[1], shape[0] * shape[2], shape[3], shape[4]])?;
    Ok(merged)
}

impl Function for GroupedConvolution2d {
    fn forward(&mut self, inputs: &[&Tensor]) -> Result<Tensor, OpError> {
        let dims = self.check_inputs(inputs)?;

        let outputs = (0..dims.groups)
            .into_par_iter()
            .map(|group| {
                let group_inputs = Self::group_inputs(inputs, dims, group)?;
                let refs = group_inputs.iter().collect::<Vec<_>>();
                self.conv.clone().forward(&refs)
            })
            .collect::<Result<Vec<_>, OpError>>()?;

        merge_groups(&outputs)
    }

    fn backward(&mut self, inputs: &[&Tensor], grad_output: &Tensor) -> Result<Vec<Tensor>, OpError> {
        let dims = self.check_inputs(inputs)?;
        let expected_gy = [
            dims.batch,
            dims.groups * dims.out_per_group,
            dims.out_h,
            dims.out_w,
        ];
        if grad_output.shape() != expected_gy {
            return Err(OpError::ShapeMismatch {
                op: OP,
                operand: "gy",
                expected: expected_gy.to_vec(),
                got: grad_output.shape().to_vec(),
            });
        }

        let group_grads = (0..dims.groups)
            .into_par_iter()
            .map(|group| {
                let group_inputs = Self::group_inputs(inputs, dims, group)?;
                let refs = group_inputs.iter().collect::<Vec<_>>();
                let gy = grad_output.narrow(1, group * dims.out_per_group, dims.out_per_group)?;
                self.conv.clone().backward(&refs, &gy)
            })
            .collect::<Result<Vec<_>, OpError>>()?;

        // group_grads[i] = [gx_i, gW_i, gb_i（若有）]，按输入位置重新归拢
        let n_grads = inputs.len();
        let mut by_input: Vec<Vec<Tensor>> = (0..n_grads).map(|_| Vec::with_capacity(dims.groups)).collect();
        for grads in group_grads {
            for (slot, grad) in by_input.iter_mut().zip(grads) {
                slot.push(grad);
            }
        }

        let mut result = Vec::with_capacity(n_grads);
        let mut by_input = by_input.into_iter();
        if let Some(gx_parts) = by_input.next() {
            result.push(merge_groups(&gx_parts)?);
        }
        // gW: [G, C_out/G, C_in/G, kH, kW]；gb: [G, C_out/G]
        for parts in by_input {
            let refs = parts.iter().collect::<Vec<_>>();
            result.push(Tensor::stack(&refs, 0)?);
        }
        Ok(result)
    }
}

/// 分组卷积的便捷函数：有偏置时输入为(x, W, b)，否则为(x, W)
pub fn grouped_convolution_2d(
    x: &Tensor,
    w: &Tensor,
    b: Option<&Tensor>,
    stride: (usize, usize),
    pad: (usize, usize),
) -> Result<Tensor, OpError> {
    let mut func = GroupedConvolution2d::new(stride, pad);
    match b {
        Some(b) => func.forward(&[x, w, b]),
        None => func.forward(&[x, w]),
    }
}

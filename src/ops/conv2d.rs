/*
 * @Author       : 老董
 * @Date         : 2026-10-18
 * @Description  : 标准 2D 卷积算子（分组卷积的每一组都调用它）
 *
 * 形状约定（Batch-First）：
 * - 输入 x: [N, C_in, H, W]
 * - 卷积核 W: [C_out, C_in, kH, kW]
 * - 偏置 b（可选）: [C_out]
 * - 输出 y: [N, C_out, H', W']
 *
 * H' = (H + 2*pad_h - kH) / stride_h + 1
 * W' = (W + 2*pad_w - kW) / stride_w + 1
 *
 * 使用 Rayon 在 batch 维度并行
 */

use rayon::prelude::*;

use super::Function;
use crate::errors::OpError;
use crate::tensor::Tensor;

const OP: &str = "Convolution2d";

/// 卷积输出在某一空间维上的长度；步长为0或核比填充后的输入还大时返回None
pub const fn conv_output_size(size: usize, kernel: usize, stride: usize, pad: usize) -> Option<usize> {
    if stride == 0 || size + 2 * pad < kernel {
        return None;
    }
    Some((size + 2 * pad - kernel) / stride + 1)
}

/// 校验通过后的各维度长度
#[derive(Debug, Clone, Copy)]
struct ConvDims {
    batch: usize,
    in_c: usize,
    in_h: usize,
    in_w: usize,
    out_c: usize,
    k_h: usize,
    k_w: usize,
    out_h: usize,
    out_w: usize,
}

/// 2D 卷积算子
#[derive(Debug, Clone)]
pub struct Convolution2d {
    stride: (usize, usize),
    pad: (usize, usize),
}

impl Convolution2d {
    pub const fn new(stride: (usize, usize), pad: (usize, usize)) -> Self {
        Self { stride, pad }
    }

    pub const fn stride(&self) -> (usize, usize) {
        self.stride
    }

    pub const fn pad(&self) -> (usize, usize) {
        self.pad
    }

    /// 由输入与卷积核的形状推出输出形状 [N, C_out, H', W']
    pub fn output_shape(&self, x_shape: &[usize], w_shape: &[usize]) -> Result<Vec<usize>, OpError> {
        let dims = self.check_shapes(x_shape, w_shape, None)?;
        Ok(vec![dims.batch, dims.out_c, dims.out_h, dims.out_w])
    }

    fn check_inputs(&self, inputs: &[&Tensor]) -> Result<ConvDims, OpError> {
        if !(2..=3).contains(&inputs.len()) {
            return Err(OpError::InputCount {
                op: OP,
                expected: "2或3",
                got: inputs.len(),
            });
        }
        self.check_shapes(
            inputs[0].shape(),
            inputs[1].shape(),
            inputs.get(2).map(|b| b.shape()),
        )
    }

    fn check_shapes(
        &self,
        x_shape: &[usize],
        w_shape: &[usize],
        b_shape: Option<&[usize]>,
    ) -> Result<ConvDims, OpError> {
        if x_shape.len() != 4 {
            return Err(OpError::Rank {
                op: OP,
                operand: "x",
                expected: 4,
                got: x_shape.to_vec(),
            });
        }
        if w_shape.len() != 4 {
            return Err(OpError::Rank {
                op: OP,
                operand: "W",
                expected: 4,
                got: w_shape.to_vec(),
            });
        }
        let (batch, in_c, in_h, in_w) = (x_shape[0], x_shape[1], x_shape[2], x_shape[3]);
        let (out_c, k_h, k_w) = (w_shape[0], w_shape[2], w_shape[3]);

        if w_shape[1] != in_c {
            return Err(OpError::ShapeMismatch {
                op: OP,
                operand: "W",
                expected: vec![out_c, in_c, k_h, k_w],
                got: w_shape.to_vec(),
            });
        }
        if let Some(b_shape) = b_shape {
            if b_shape != [out_c] {
                return Err(OpError::ShapeMismatch {
                    op: OP,
                    operand: "b",
                    expected: vec![out_c],
                    got: b_shape.to_vec(),
                });
            }
        }

        let (stride_h, stride_w) = self.stride;
        let (pad_h, pad_w) = self.pad;
        let out_h = conv_output_size(in_h, k_h, stride_h, pad_h);
        let out_w = conv_output_size(in_w, k_w, stride_w, pad_w);
        let (Some(out_h), Some(out_w)) = (out_h, out_w) else {
            return Err(OpError::InvalidOutputSize {
                op: OP,
                input_hw: (in_h, in_w),
                kernel_hw: (k_h, k_w),
                stride: self.stride,
                pad: self.pad,
            });
        };

        Ok(ConvDims {
            batch,
            in_c,
            in_h,
            in_w,
            out_c,
            k_h,
            k_w,
            out_h,
            out_w,
        })
    }

    /// 执行卷积运算（Rayon 并行版本），`padded`为已补零的输入平铺数据
    fn convolve(&self, dims: ConvDims, padded: &[f32], kernel: &[f32], bias: Option<&[f32]>) -> Vec<f32> {
        let ConvDims {
            batch,
            in_c,
            in_h,
            in_w,
            out_c,
            k_h,
            k_w,
            out_h,
            out_w,
        } = dims;
        let (stride_h, stride_w) = self.stride;
        let (padded_h, padded_w) = (in_h + 2 * self.pad.0, in_w + 2 * self.pad.1);
        let sample_in = in_c * padded_h * padded_w;
        let single_sample_size = out_c * out_h * out_w;

        let batch_results: Vec<Vec<f32>> = (0..batch)
            .into_par_iter()
            .map(|b| {
                let input = &padded[b * sample_in..(b + 1) * sample_in];
                let mut sample_data = vec![0.0f32; single_sample_size];
                for oc in 0..out_c {
                    let bias_val = bias.map_or(0.0, |bias| bias[oc]);
                    for oh in 0..out_h {
                        for ow in 0..out_w {
                            let mut sum = bias_val;
                            let h_start = oh * stride_h;
                            let w_start = ow * stride_w;

                            for ic in 0..in_c {
                                for kh in 0..k_h {
                                    let row = ic * padded_h * padded_w + (h_start + kh) * padded_w;
                                    let k_row = ((oc * in_c + ic) * k_h + kh) * k_w;
                                    for kw in 0..k_w {
                                        sum += input[row + w_start + kw] * kernel[k_row + kw];
                                    }
                                }
                            }
                            sample_data[(oc * out_h + oh) * out_w + ow] = sum;
                        }
                    }
                }
                sample_data
            })
            .collect();

        batch_results.into_iter().flatten().collect()
    }
}

impl Function for Convolution2d {
    fn forward(&mut self, inputs: &[&Tensor]) -> Result<Tensor, OpError> {
        let dims = self.check_inputs(inputs)?;
        let padded = inputs[0].pad_spatial(self.pad.0, self.pad.1)?.to_vec();
        let kernel = inputs[1].to_vec();
        let bias = inputs.get(2).map(|b| b.to_vec());

        let data = self.convolve(dims, &padded, &kernel, bias.as_deref());
        Ok(Tensor::try_new(
            &data,
            &[dims.batch, dims.out_c, dims.out_h, dims.out_w],
        )?)
    }

    /// 对于 y = conv(x, W) + b：
    /// - dL/dx：上游梯度经卷积核散射回输入（转置卷积），落在填充区的部分丢弃
    /// - dL/dW：输入与上游梯度的相关运算，跨 batch 累加
    /// - dL/db：上游梯度在 N、H'、W' 上求和
    fn backward(&mut self, inputs: &[&Tensor], grad_output: &Tensor) -> Result<Vec<Tensor>, OpError> {
        let dims = self.check_inputs(inputs)?;
        let expected_gy = [dims.batch, dims.out_c, dims.out_h, dims.out_w];
        if grad_output.shape() != expected_gy {
            return Err(OpError::ShapeMismatch {
                op: OP,
                operand: "gy",
                expected: expected_gy.to_vec(),
                got: grad_output.shape().to_vec(),
            });
        }

        let ConvDims {
            batch,
            in_c,
            in_h,
            in_w,
            out_c,
            k_h,
            k_w,
            out_h,
            out_w,
        } = dims;
        let (stride_h, stride_w) = self.stride;
        let (pad_h, pad_w) = self.pad;
        let (padded_h, padded_w) = (in_h + 2 * pad_h, in_w + 2 * pad_w);

        let padded = inputs[0].pad_spatial(pad_h, pad_w)?.to_vec();
        let kernel = inputs[1].to_vec();
        let gy = grad_output.to_vec();
        let sample_in = in_c * padded_h * padded_w;
        let sample_out = out_c * out_h * out_w;
        let kernel_size = out_c * in_c * k_h * k_w;

        // ========== 每个样本独立计算 dL/dx 与 dL/dW 的贡献 ==========
        let per_sample: Vec<(Vec<f32>, Vec<f32>)> = (0..batch)
            .into_par_iter()
            .map(|b| {
                let input = &padded[b * sample_in..(b + 1) * sample_in];
                let upstream = &gy[b * sample_out..(b + 1) * sample_out];
                let mut sample_grad = vec![0.0f32; in_c * in_h * in_w];
                let mut sample_kernel_grad = vec![0.0f32; kernel_size];

                for oc in 0..out_c {
                    for oh in 0..out_h {
                        for ow in 0..out_w {
                            let grad_val = upstream[(oc * out_h + oh) * out_w + ow];
                            if grad_val == 0.0 {
                                continue;
                            }
                            let h_start = oh * stride_h;
                            let w_start = ow * stride_w;

                            for ic in 0..in_c {
                                for kh in 0..k_h {
                                    let ph = h_start + kh;
                                    let k_row = ((oc * in_c + ic) * k_h + kh) * k_w;
                                    let row = ic * padded_h * padded_w + ph * padded_w;
                                    for kw in 0..k_w {
                                        let pw = w_start + kw;
                                        sample_kernel_grad[k_row + kw] += grad_val * input[row + pw];

                                        // 填充区没有对应的输入元素
                                        if ph < pad_h || ph >= pad_h + in_h || pw < pad_w || pw >= pad_w + in_w {
                                            continue;
                                        }
                                        let idx = (ic * in_h + ph - pad_h) * in_w + pw - pad_w;
                                        sample_grad[idx] += grad_val * kernel[k_row + kw];
                                    }
                                }
                            }
                        }
                    }
                }
                (sample_grad, sample_kernel_grad)
            })
            .collect();

        // Reduce: 输入梯度按样本拼接，卷积核梯度跨样本累加
        let mut gx = Vec::with_capacity(batch * in_c * in_h * in_w);
        let mut gw = vec![0.0f32; kernel_size];
        for (sample_grad, sample_kernel_grad) in per_sample {
            gx.extend(sample_grad);
            for (total, g) in gw.iter_mut().zip(sample_kernel_grad) {
                *total += g;
            }
        }

        let mut grads = vec![
            Tensor::try_new(&gx, inputs[0].shape())?,
            Tensor::try_new(&gw, inputs[1].shape())?,
        ];

        if inputs.len() == 3 {
            let mut gb = vec![0.0f32; out_c];
            for b in 0..batch {
                for (oc, total) in gb.iter_mut().enumerate() {
                    let start = b * sample_out + oc * out_h * out_w;
                    *total += gy[start..start + out_h * out_w].iter().sum::<f32>();
                }
            }
            grads.push(Tensor::try_new(&gb, &[out_c])?);
        }

        Ok(grads)
    }
}

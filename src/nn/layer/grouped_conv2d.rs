/*
 * @Author       : 老董
 * @Date         : 2026-10-18
 * @Description  : GroupedConv2d (分组 2D 卷积) 层
 *
 * 输入/输出形状：
 * - 输入：[batch_size, in_channels, H, W]
 * - 输出：[batch_size, out_channels, H', W']
 *
 * 参数形状：
 * - W：[groups, out_channels/groups, in_channels/groups, kH, kW]
 * - b：[groups, out_channels/groups]（可选）
 */

use crate::errors::OpError;
use crate::nn::{Init, Param};
use crate::ops::{Function, GroupedConvolution2d};
use crate::tensor::Tensor;

const OP: &str = "GroupedConv2d";

/// GroupedConv2d (分组 2D 卷积) 层
///
/// 持有分组卷积核`W`与偏置`b`，前向调用分组卷积算子，
/// 反向把参数梯度累加进各自的`Param`并返回输入梯度。
///
/// # 使用示例
/// ```ignore
/// let mut conv = GroupedConv2d::new(Some(64), 64, 4, (3, 3), (1, 1), (1, 1), false, Some(0))?;
/// let y = conv.forward(&x)?;
/// let gx = conv.backward(&x, &gy)?;
/// ```
#[derive(Debug, Clone)]
pub struct GroupedConv2d {
    /// 分组卷积核 [groups, out/groups, in/groups, kH, kW]
    w: Param,
    /// 偏置 [groups, out/groups]（可选）
    b: Option<Param>,
    out_channels: usize,
    groups: usize,
    kernel_size: (usize, usize),
    stride: (usize, usize),
    padding: (usize, usize),
    seed: Option<u64>,
}

impl GroupedConv2d {
    /// 创建新的 GroupedConv2d 层
    ///
    /// # 参数
    /// - `in_channels`: 输入通道数；为`None`时延迟到第一次前向，由输入形状决定
    /// - `out_channels`: 输出通道数，须能被`groups`整除
    /// - `groups`: 分组数
    /// - `kernel_size`: 卷积核大小 (kH, kW)
    /// - `stride`: 步长 (sH, sW)
    /// - `padding`: 填充 (pH, pW)
    /// - `nobias`: 为`true`时不使用偏置
    /// - `seed`: 卷积核初始化的随机种子
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        in_channels: Option<usize>,
        out_channels: usize,
        groups: usize,
        kernel_size: (usize, usize),
        stride: (usize, usize),
        padding: (usize, usize),
        nobias: bool,
        seed: Option<u64>,
    ) -> Result<Self, OpError> {
        check_groups("输出", out_channels, groups)?;

        let b = if nobias {
            None
        } else {
            Some(Param::new(
                "b",
                Init::Zeros.generate(&[groups, out_channels / groups], None),
            ))
        };

        let mut layer = Self {
            w: Param::uninitialized("W"),
            b,
            out_channels,
            groups,
            kernel_size,
            stride,
            padding,
            seed,
        };
        if let Some(in_channels) = in_channels {
            layer.initialize(in_channels)?;
        }
        Ok(layer)
    }

    /// 给定输入通道数时各参数的形状：`[("W", ..), ("b", ..)]`，无偏置时只有`W`
    pub fn param_shapes(&self, in_channels: usize) -> Result<Vec<(&'static str, Vec<usize>)>, OpError> {
        check_groups("输入", in_channels, self.groups)?;
        let (k_h, k_w) = self.kernel_size;
        let out_per_group = self.out_channels / self.groups;

        let mut shapes = vec![(
            "W",
            vec![self.groups, out_per_group, in_channels / self.groups, k_h, k_w],
        )];
        if self.b.is_some() {
            shapes.push(("b", vec![self.groups, out_per_group]));
        }
        Ok(shapes)
    }

    fn initialize(&mut self, in_channels: usize) -> Result<(), OpError> {
        let shapes = self.param_shapes(in_channels)?;
        let w_shape = &shapes[0].1;
        let fan_in = w_shape[2..].iter().product();
        self.w
            .set_data(Init::LeCun { fan_in }.generate(w_shape, self.seed));
        Ok(())
    }

    /// 前向传播：`grouped_conv(x, W) + b`
    pub fn forward(&mut self, x: &Tensor) -> Result<Tensor, OpError> {
        self.ensure_initialized(x)?;
        let mut func = GroupedConvolution2d::new(self.stride, self.padding);
        let inputs = self.inputs(x)?;
        func.forward(&inputs)
    }

    /// 反向传播：把 dL/dW、dL/db 累加进参数梯度，返回 dL/dx
    pub fn backward(&mut self, x: &Tensor, grad_output: &Tensor) -> Result<Tensor, OpError> {
        self.ensure_initialized(x)?;
        let mut func = GroupedConvolution2d::new(self.stride, self.padding);
        let mut grads = {
            let inputs = self.inputs(x)?;
            func.backward(&inputs, grad_output)?
        }
        .into_iter();

        let (Some(gx), Some(gw)) = (grads.next(), grads.next()) else {
            unreachable!("分组卷积的反向至少返回 gx 与 gW");
        };
        self.w.accumulate_grad(gw);
        if let (Some(b), Some(gb)) = (self.b.as_mut(), grads.next()) {
            b.accumulate_grad(gb);
        }
        Ok(gx)
    }

    /// 清空所有参数的梯度
    pub fn cleargrads(&mut self) {
        self.w.clear_grad();
        if let Some(b) = self.b.as_mut() {
            b.clear_grad();
        }
    }

    pub fn params(&self) -> Vec<&Param> {
        std::iter::once(&self.w).chain(self.b.as_ref()).collect()
    }

    pub fn params_mut(&mut self) -> Vec<&mut Param> {
        std::iter::once(&mut self.w).chain(self.b.as_mut()).collect()
    }

    pub const fn groups(&self) -> usize {
        self.groups
    }

    pub const fn out_channels(&self) -> usize {
        self.out_channels
    }

    fn ensure_initialized(&mut self, x: &Tensor) -> Result<(), OpError> {
        if !self.w.is_initialized() {
            let in_channels = x.shape().get(1).copied().ok_or_else(|| OpError::Rank {
                op: OP,
                operand: "x",
                expected: 4,
                got: x.shape().to_vec(),
            })?;
            self.initialize(in_channels)?;
        }
        Ok(())
    }

    fn inputs<'a>(&'a self, x: &'a Tensor) -> Result<Vec<&'a Tensor>, OpError> {
        let w = self.w.data().ok_or_else(|| OpError::Rank {
            op: OP,
            operand: "W",
            expected: 5,
            got: Vec::new(),
        })?;
        let mut inputs = vec![x, w];
        if let Some(b) = self.b.as_ref().and_then(Param::data) {
            inputs.push(b);
        }
        Ok(inputs)
    }
}

fn check_groups(what: &'static str, channels: usize, groups: usize) -> Result<(), OpError> {
    if groups == 0 || channels % groups != 0 {
        return Err(OpError::GroupCount {
            op: OP,
            what,
            channels,
            groups,
        });
    }
    Ok(())
}

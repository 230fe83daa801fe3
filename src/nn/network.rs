/*
 * @Author       : 老董
 * @Date         : 2026-10-18
 * @Description  : 网络注册表：按名字选出网络结构，并给出其全部参数的层级名与形状
 *
 * 各网络均为 pre-activation 残差结构，共3个块，块之间做 2x2 平均池化：
 * - ResNet（pyramid）：  BN - Conv3x3 - BN - ReLU - Conv3x3 - BN，通道数逐单元线性增长
 * - DenseNet：           BN - ReLU - Conv3x3(growth) - BN，块间用 1x1 卷积过渡
 * - ResNeXt：            BN - Conv1x1 - BN - ReLU - GroupedConv3x3 - BN - ReLU - Conv1x1 - BN
 * - ShakeNet：           两条 BN - Conv3x3 - BN - ReLU - Conv3x3 - BN 支路，经 shake noise 混合
 */

use std::fmt;
use std::str::FromStr;

use crate::errors::NetworkError;
use crate::nn::GroupedConv2d;
use crate::ops::pair;

/// 可用的网络结构
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkKind {
    /// pyramidal ResNet，参数`[depth, alpha]`
    ResNet,
    /// 参数`[depth, growth]`
    DenseNet,
    /// 参数`[depth, width, groups]`
    ResNeXt,
    /// Shake-Shake ResNet，参数`[depth, width]`
    ShakeNet,
}

impl NetworkKind {
    pub const ALL: [Self; 4] = [Self::ResNet, Self::DenseNet, Self::ResNeXt, Self::ShakeNet];

    pub const fn name(self) -> &'static str {
        match self {
            Self::ResNet => "resnet",
            Self::DenseNet => "densenet",
            Self::ResNeXt => "resnext",
            Self::ShakeNet => "shakenet",
        }
    }

    /// 需要的整数参数个数
    pub const fn param_count(self) -> usize {
        match self {
            Self::ResNeXt => 3,
            _ => 2,
        }
    }

    /// `depth`换算成每个块单元数时的除数（每个单元含几层卷积 × 3 个块）
    const fn depth_divisor(self) -> usize {
        match self {
            Self::ResNet | Self::ShakeNet => 6,
            Self::DenseNet => 3,
            Self::ResNeXt => 9,
        }
    }
}

impl fmt::Display for NetworkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NetworkKind {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "resnet" | "pyramid" => Ok(Self::ResNet),
            "densenet" => Ok(Self::DenseNet),
            "resnext" => Ok(Self::ResNeXt),
            "shakenet" => Ok(Self::ShakeNet),
            _ => Err(NetworkError::UnknownName(s.to_string())),
        }
    }
}

/// 一个网络的参数布局：`("/block1/0/conv2/W", [..])`这样的层级名与形状，按定义顺序排列
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkPlan {
    kind: NetworkKind,
    category: usize,
    params: Vec<(String, Vec<usize>)>,
}

impl NetworkPlan {
    pub const fn kind(&self) -> NetworkKind {
        self.kind
    }

    pub const fn category(&self) -> usize {
        self.category
    }

    pub fn params(&self) -> &[(String, Vec<usize>)] {
        &self.params
    }

    /// 按名字查参数形状
    pub fn shape_of(&self, name: &str) -> Option<&[usize]> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s.as_slice())
    }

    /// 全部参数的元素个数之和
    pub fn total_size(&self) -> usize {
        self.params
            .iter()
            .map(|(_, s)| s.iter().product::<usize>())
            .sum()
    }
}

/// 按网络种类构建参数布局
///
/// - `category`：分类数（输出层宽度）
/// - `params`：网络的整数参数，个数见[`NetworkKind::param_count`]
/// - `in_channels`：输入图像的通道数（MNIST 为1，CIFAR 为3）
pub fn create_network(
    kind: NetworkKind,
    category: usize,
    params: &[usize],
    in_channels: usize,
) -> Result<NetworkPlan, NetworkError> {
    if params.len() != kind.param_count() {
        return Err(NetworkError::ParamCount {
            network: kind.name(),
            expected: kind.param_count(),
            got: params.to_vec(),
        });
    }
    let units = block_units(kind, params[0])?;

    let mut builder = PlanBuilder::default();
    match kind {
        NetworkKind::ResNet => build_resnet(&mut builder, category, units, params[1], in_channels),
        NetworkKind::DenseNet => {
            build_densenet(&mut builder, category, units, params[1], in_channels);
        }
        NetworkKind::ResNeXt => {
            if params[1] == 0 || params[2] == 0 {
                return Err(NetworkError::ZeroWidth { network: kind.name() });
            }
            build_resnext(&mut builder, category, units, params[1], params[2], in_channels)?;
        }
        NetworkKind::ShakeNet => {
            if params[1] == 0 {
                return Err(NetworkError::ZeroWidth { network: kind.name() });
            }
            build_shakenet(&mut builder, category, units, params[1], in_channels);
        }
    }

    Ok(NetworkPlan {
        kind,
        category,
        params: builder.params,
    })
}

fn block_units(kind: NetworkKind, depth: usize) -> Result<usize, NetworkError> {
    let divisor = kind.depth_divisor();
    let units = depth.saturating_sub(2) / divisor;
    if units == 0 {
        return Err(NetworkError::TooShallow {
            network: kind.name(),
            depth,
            min: divisor + 2,
        });
    }
    Ok(units)
}

// ==================== 各网络结构 ====================

fn build_resnet(b: &mut PlanBuilder, category: usize, units: usize, alpha: usize, in_channels: usize) {
    b.conv("/input", in_channels, 16, 3);
    b.norm("/norm", 16);

    for k in 0..3 {
        let (c_in, c_out) = (16 + alpha * k / 3, 16 + alpha * (k + 1) / 3);
        // 单元 i 的通道数在块的首尾之间线性插值
        let channels = (0..=units)
            .map(|i| (c_in * (units - i) + c_out * i) / units)
            .collect::<Vec<_>>();
        for i in 0..units {
            let unit = format!("/block{}/{i}", k + 1);
            b.norm(&format!("{unit}/norm0"), channels[i]);
            b.conv(&format!("{unit}/conv1"), channels[i], channels[i + 1], 3);
            b.norm(&format!("{unit}/norm1"), channels[i + 1]);
            b.conv(&format!("{unit}/conv2"), channels[i + 1], channels[i + 1], 3);
            b.norm(&format!("{unit}/norm2"), channels[i + 1]);
        }
    }

    b.linear("/output", 16 + alpha, category);
}

fn build_densenet(b: &mut PlanBuilder, category: usize, units: usize, growth: usize, in_channels: usize) {
    let width = |k: usize| 16 + growth * units * k;

    b.conv("/input", in_channels, 16, 3);
    b.norm("/norm", 16);

    for k in 0..3 {
        for i in 0..units {
            let unit = format!("/block{}/{i}", k + 1);
            let c_in = width(k) + growth * i;
            b.norm(&format!("{unit}/norm0"), c_in);
            b.conv(&format!("{unit}/conv1"), c_in, growth, 3);
            b.norm(&format!("{unit}/norm1"), growth);
        }
        // 前两个块之后接 1x1 过渡卷积
        if k < 2 {
            b.conv(&format!("/conv{}", k + 1), width(k + 1), width(k + 1), 1);
        }
    }

    b.linear("/output", width(3), category);
}

fn build_resnext(
    b: &mut PlanBuilder,
    category: usize,
    units: usize,
    width: usize,
    groups: usize,
    in_channels: usize,
) -> Result<(), NetworkError> {
    let width = width * groups;

    b.conv("/input", in_channels, width, 3);
    b.norm("/norm", width);

    for (k, (c_in, c_out)) in [(width, width), (width, width * 2), (width * 2, width * 4)]
        .into_iter()
        .enumerate()
    {
        for i in 0..units {
            let unit = format!("/block{}/{i}", k + 1);
            let c_in = if i == 0 { c_in } else { c_out };
            b.norm(&format!("{unit}/norm0"), c_in);
            b.conv(&format!("{unit}/conv1"), c_in, c_out, 1);
            b.norm(&format!("{unit}/norm1"), c_out);
            b.grouped_conv(&format!("{unit}/conv2"), c_out, c_out, groups, 3)?;
            b.norm(&format!("{unit}/norm2"), c_out);
            b.conv(&format!("{unit}/conv3"), c_out, c_out, 1);
            b.norm(&format!("{unit}/norm3"), c_out);
        }
    }

    b.linear("/output", width * 4, category);
    Ok(())
}

fn build_shakenet(b: &mut PlanBuilder, category: usize, units: usize, width: usize, in_channels: usize) {
    let width = width * 16;

    b.conv("/input", in_channels, width, 3);
    b.norm("/norm", width);

    for (k, (c_in, c_out)) in [(width, width), (width, width * 2), (width * 2, width * 4)]
        .into_iter()
        .enumerate()
    {
        for i in 0..units {
            let c_in = if i == 0 { c_in } else { c_out };
            for line in ["line1", "line2"] {
                let prefix = format!("/block{}/{i}/{line}", k + 1);
                b.norm(&format!("{prefix}/norm0"), c_in);
                b.conv(&format!("{prefix}/conv1"), c_in, c_out, 3);
                b.norm(&format!("{prefix}/norm1"), c_out);
                b.conv(&format!("{prefix}/conv2"), c_out, c_out, 3);
                b.norm(&format!("{prefix}/norm2"), c_out);
            }
        }
    }

    b.linear("/output", width * 4, category);
}

// ==================== 参数布局构建器 ====================

#[derive(Default)]
struct PlanBuilder {
    params: Vec<(String, Vec<usize>)>,
}

impl PlanBuilder {
    fn push(&mut self, prefix: &str, name: &str, shape: Vec<usize>) {
        self.params.push((format!("{prefix}/{name}"), shape));
    }

    /// 普通卷积：`W [out, in, k, k]`、`b [out]`
    fn conv(&mut self, prefix: &str, c_in: usize, c_out: usize, k: usize) {
        self.push(prefix, "W", vec![c_out, c_in, k, k]);
        self.push(prefix, "b", vec![c_out]);
    }

    /// 分组卷积，形状由[`GroupedConv2d::param_shapes`]给出
    fn grouped_conv(
        &mut self,
        prefix: &str,
        c_in: usize,
        c_out: usize,
        groups: usize,
        k: usize,
    ) -> Result<(), NetworkError> {
        let layer = GroupedConv2d::new(None, c_out, groups, pair(k), pair(1), pair(1), false, None)?;
        for (name, shape) in layer.param_shapes(c_in)? {
            self.push(prefix, name, shape);
        }
        Ok(())
    }

    /// BatchNormalization：`gamma [c]`、`beta [c]`
    fn norm(&mut self, prefix: &str, channels: usize) {
        self.push(prefix, "gamma", vec![channels]);
        self.push(prefix, "beta", vec![channels]);
    }

    /// 全连接：`W [out, in]`、`b [out]`
    fn linear(&mut self, prefix: &str, c_in: usize, c_out: usize) {
        self.push(prefix, "W", vec![c_out, c_in]);
        self.push(prefix, "b", vec![c_out]);
    }
}

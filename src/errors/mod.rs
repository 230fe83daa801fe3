/*
 * @Author       : 老董
 * @Date         : 2026-10-18
 * @Description  : 张量与算子层的错误类型
 */

use thiserror::Error;
mod ops;
pub use self::ops::*;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TensorError {
    // 张量二元运算
    #[error(
        "形状不一致，故无法{operator}：第一个张量的形状为{tensor1_shape:?}，第二个张量的形状为{tensor2_shape:?}"
    )]
    OperatorError {
        operator: Operator,
        tensor1_shape: Vec<usize>,
        tensor2_shape: Vec<usize>,
    },
    #[error("数据长度{len}与形状{shape:?}不符")]
    DataShapeMismatch { len: usize, shape: Vec<usize> },
    #[error("张量列表为空")]
    EmptyList,
    #[error("张量形状不兼容")]
    IncompatibleShape,
    #[error("需要交换的维度必须是唯一且在[0, <张量维数>)范围内")]
    PermuteNeedUniqueAndInRange,
    #[error("维度{axis}超出张量阶数{dimension}")]
    AxisOutOfRange { axis: usize, dimension: usize },
    #[error("在维度{axis}上截取的范围{start}..{end}超出长度{len}")]
    NarrowOutOfRange {
        axis: usize,
        start: usize,
        end: usize,
        len: usize,
    },
}

/// 算子（可微函数）的参数校验错误。
/// 所有校验都在数值计算开始前完成，出错时不会返回任何部分结果
#[derive(Error, Debug, PartialEq, Eq)]
pub enum OpError {
    #[error("{op}需要{expected}个输入，实际得到{got}个")]
    InputCount {
        op: &'static str,
        expected: &'static str,
        got: usize,
    },
    #[error("{op}的输入`{operand}`必须是{expected}阶张量，实际形状为{got:?}")]
    Rank {
        op: &'static str,
        operand: &'static str,
        expected: usize,
        got: Vec<usize>,
    },
    #[error("{op}的输入`{operand}`形状不匹配：期望{expected:?}，实际为{got:?}")]
    ShapeMismatch {
        op: &'static str,
        operand: &'static str,
        expected: Vec<usize>,
        got: Vec<usize>,
    },
    #[error("{op}：`x`的通道数{channels}不等于分组数{groups}×每组输入通道数{per_group}")]
    ChannelMismatch {
        op: &'static str,
        channels: usize,
        groups: usize,
        per_group: usize,
    },
    #[error("{op}：{what}通道数{channels}无法被分组数{groups}整除")]
    GroupCount {
        op: &'static str,
        what: &'static str,
        channels: usize,
        groups: usize,
    },
    #[error(
        "{op}：输出尺寸无效（输入{input_hw:?}，卷积核{kernel_hw:?}，步长{stride:?}，填充{pad:?}）"
    )]
    InvalidOutputSize {
        op: &'static str,
        input_hw: (usize, usize),
        kernel_hw: (usize, usize),
        stride: (usize, usize),
        pad: (usize, usize),
    },
    #[error(transparent)]
    Tensor(#[from] TensorError),
}

/// 构建网络参数布局时的错误
#[derive(Error, Debug, PartialEq, Eq)]
pub enum NetworkError {
    #[error("未知的网络名称`{0}`，可选：resnet/pyramid、densenet、resnext、shakenet")]
    UnknownName(String),
    #[error("{network}需要{expected}个整数参数，实际得到{got:?}")]
    ParamCount {
        network: &'static str,
        expected: usize,
        got: Vec<usize>,
    },
    #[error("{network}的深度{depth}过浅：每个块至少需要1个单元（深度至少为{min}）")]
    TooShallow {
        network: &'static str,
        depth: usize,
        min: usize,
    },
    #[error("{network}的宽度参数必须大于0")]
    ZeroWidth { network: &'static str },
    #[error(transparent)]
    Op(#[from] OpError),
}

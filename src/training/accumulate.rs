/*
 * @Author       : 老董
 * @Date         : 2026-10-18
 * @Description  : 子批次梯度累积：一个批次拆成若干不超过 procsize 的子批次依次反向，
 *                 梯度累加后再取平均，相当于用整批计算一次
 */

use std::ops::Range;

use crate::nn::Param;

/// 把长度为`len`的批次切成`max(ceil(len / procsize), 1)`段尽量均匀的连续区间
pub fn sub_batch_ranges(len: usize, procsize: usize) -> Vec<Range<usize>> {
    assert!(procsize > 0, "sub_batch_ranges: procsize必须大于0");
    let repeats = len.div_ceil(procsize).max(1);

    (0..repeats)
        .map(|i| len * i / repeats..len * (i + 1) / repeats)
        .collect()
}

/// 累积了`repeats`个子批次梯度的参数，梯度除以`repeats`；只有一个子批次时不做处理
pub fn average_grads<'a>(params: impl IntoIterator<Item = &'a mut Param>, repeats: usize) {
    if repeats <= 1 {
        return;
    }
    for param in params {
        param.scale_grad(repeats as f32);
    }
}

/*
 * @Author       : 老董
 * @Date         : 2026-10-18
 * @Description  : 张量的乘除：与纯数相乘/相除、同形状逐元素相乘，以及按样本（第0维）缩放
 */

use super::add::assert_same_shape;
use crate::errors::Operator;
use crate::tensor::Tensor;
use ndarray::Axis;
use std::ops::{Div, Mul};

impl Mul<f32> for &Tensor {
    type Output = Tensor;

    fn mul(self, scalar: f32) -> Tensor {
        Tensor {
            data: &self.data * scalar,
        }
    }
}

impl Mul<f32> for Tensor {
    type Output = Self;

    fn mul(self, scalar: f32) -> Self {
        Self {
            data: self.data * scalar,
        }
    }
}

impl Mul for &Tensor {
    type Output = Tensor;

    fn mul(self, other: &Tensor) -> Tensor {
        assert_same_shape(self, other, Operator::Mul);
        Tensor {
            data: &self.data * &other.data,
        }
    }
}

impl Div<f32> for &Tensor {
    type Output = Tensor;

    fn div(self, scalar: f32) -> Tensor {
        Tensor {
            data: &self.data / scalar,
        }
    }
}

impl Div<f32> for Tensor {
    type Output = Self;

    fn div(self, scalar: f32) -> Self {
        Self {
            data: self.data / scalar,
        }
    }
}

impl Tensor {
    /// 第n个样本整体乘以`factors[n]`，即把长度为N的向量广播到除第0维外的所有维度。
    /// `factors`长度必须等于第0维长度，否则panic
    pub fn scale_samples(&self, factors: &[f32]) -> Self {
        assert_eq!(
            self.shape().first().copied(),
            Some(factors.len()),
            "按样本缩放：因子个数{}与批大小{:?}不一致",
            factors.len(),
            self.shape().first()
        );
        let mut data = self.data.clone();
        for (mut sample, &factor) in data.axis_iter_mut(Axis(0)).zip(factors) {
            sample *= factor;
        }
        Self { data }
    }
}

/*
 * @Author       : 老董
 * @Date         : 2026-10-18
 * @Description  : 张量的减法，逐元素相减（或纯数减张量），形状不同会panic
 */

use super::add::assert_same_shape;
use crate::errors::Operator;
use crate::tensor::Tensor;
use std::ops::Sub;

impl Sub<&Tensor> for f32 {
    type Output = Tensor;

    fn sub(self, tensor: &Tensor) -> Tensor {
        Tensor {
            data: self - &tensor.data,
        }
    }
}

impl Sub for &Tensor {
    type Output = Tensor;

    fn sub(self, other: &Tensor) -> Tensor {
        assert_same_shape(self, other, Operator::Sub);
        Tensor {
            data: &self.data - &other.data,
        }
    }
}

impl Sub for Tensor {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        &self - &other
    }
}

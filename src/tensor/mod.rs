use ndarray::{Array, IxDyn};
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::errors::TensorError;

mod ops {
    pub mod add;
    pub mod mul;
    pub mod sub;
}

mod index;
mod property;
mod save_load;
mod shape;

#[cfg(test)]
mod tests;

/// 定义张量的结构体。本库中的张量始终是`f32`的n维数组，
/// 算子层只依赖其形状变换、切片、拼接与逐元素运算。
/// 注：只要通Tensor初始化的都是张量（即使标量也是张量）；
/// 而通常意义上的数字（类型为usize、i32、f64等）就只是纯数（number），在这里不被认为是张量。
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    data: Array<f32, IxDyn>,
}

impl Tensor {
    /// 创建一个张量。`data`的长度必须和`shape`中所有元素的乘积相等，否则会panic。
    /// 需要可恢复错误时请用`try_new`
    pub fn new(data: &[f32], shape: &[usize]) -> Self {
        match Self::try_new(data, shape) {
            Ok(tensor) => tensor,
            Err(e) => panic!("{}", e),
        }
    }

    /// 创建一个张量，`data`长度与`shape`不符时返回错误
    pub fn try_new(data: &[f32], shape: &[usize]) -> Result<Self, TensorError> {
        let data = Array::from_shape_vec(IxDyn(shape), data.to_vec()).map_err(|_| {
            TensorError::DataShapeMismatch {
                len: data.len(),
                shape: shape.to_vec(),
            }
        })?;
        Ok(Self { data })
    }

    pub fn zeros(shape: &[usize]) -> Self {
        Self {
            data: Array::zeros(IxDyn(shape)),
        }
    }

    pub fn ones(shape: &[usize]) -> Self {
        Self {
            data: Array::ones(IxDyn(shape)),
        }
    }

    /// 用同一个数填满指定形状
    pub fn full(value: f32, shape: &[usize]) -> Self {
        Self {
            data: Array::from_elem(IxDyn(shape), value),
        }
    }

    /// 创建一个随机张量，其值在[min, max]的闭区间。
    /// 带`seed`时结果可复现
    pub fn new_random(min: f32, max: f32, shape: &[usize], seed: Option<u64>) -> Self {
        let mut rng = seeded_rng(seed);
        let uniform = Uniform::from(min..=max);
        let data = (0..shape.iter().product::<usize>())
            .map(|_| uniform.sample(&mut rng))
            .collect::<Vec<_>>();
        Self::new(&data, shape)
    }

    /// 创建一个服从正态分布的随机张量（Box-Muller）。
    /// 带`seed`时结果可复现
    pub fn new_normal(mean: f32, std_dev: f32, shape: &[usize], seed: Option<u64>) -> Self {
        let mut rng = seeded_rng(seed);
        let data_len = shape.iter().product::<usize>();
        let mut data = Vec::with_capacity(data_len);

        while data.len() < data_len {
            let u1: f32 = rng.r#gen();
            let u2: f32 = rng.r#gen();
            let r = (-2.0 * u1.ln()).sqrt();
            let theta = 2.0 * std::f32::consts::PI * u2;
            let z0 = mean + std_dev * r * theta.cos();
            let z1 = mean + std_dev * r * theta.sin();

            if z0.is_finite() {
                data.push(z0);
            }
            if data.len() < data_len && z1.is_finite() {
                data.push(z1);
            }
        }

        Self::new(&data, shape)
    }

    /// 直接由ndarray数组构造
    pub fn from_array(data: Array<f32, IxDyn>) -> Self {
        Self { data }
    }

    /// 取出内部的ndarray数组
    pub fn into_array(self) -> Array<f32, IxDyn> {
        self.data
    }

    /// 逐元素映射
    pub fn map(&self, f: impl Fn(f32) -> f32) -> Self {
        Self {
            data: self.data.mapv(f),
        }
    }

    /// 所有元素之和
    pub fn sum(&self) -> f32 {
        self.data.sum()
    }

    /// 按元素顺序（行优先）拷贝出一份平铺数据
    pub fn to_vec(&self) -> Vec<f32> {
        self.data.iter().copied().collect()
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

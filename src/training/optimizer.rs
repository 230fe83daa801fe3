/*
 * @Author       : 老董
 * @Date         : 2026-10-18
 * @Description  : 带动量与权重衰减的随机梯度下降（MomentumSGD + WeightDecay）
 */

use std::collections::HashMap;

use crate::nn::Param;
use crate::tensor::Tensor;

/// 动量SGD优化器
///
/// 每步先做权重衰减 g ← g + decay·θ，再更新速度与参数：
/// v ← momentum·v - lr·g，θ ← θ + v。
/// 速度按参数在`update`入参中的位置保存，因此每次传入的参数顺序须保持一致
#[derive(Debug, Clone)]
pub struct MomentumSgd {
    learning_rate: f32,
    momentum: f32,
    decay: f32,
    /// 各参数的速度
    velocity: HashMap<usize, Tensor>,
}

impl MomentumSgd {
    pub fn new(learning_rate: f32, momentum: f32, decay: f32) -> Self {
        Self {
            learning_rate,
            momentum,
            decay,
            velocity: HashMap::new(),
        }
    }

    /// 用各参数当前的梯度更新一步；没有数据或梯度的参数跳过。梯度不会被清除
    pub fn update(&mut self, params: &mut [&mut Param]) {
        for (index, param) in params.iter_mut().enumerate() {
            let (Some(data), Some(grad)) = (param.data(), param.grad()) else {
                continue;
            };

            let grad = if self.decay == 0.0 {
                grad.clone()
            } else {
                grad + &(data * self.decay)
            };
            let velocity = match self.velocity.remove(&index) {
                Some(v) if v.is_same_shape(data) => &(v * self.momentum) - &(&grad * self.learning_rate),
                _ => &grad * -self.learning_rate,
            };

            let updated = data + &velocity;
            param.set_data(updated);
            self.velocity.insert(index, velocity);
        }
    }

    /// 清空速度
    pub fn reset(&mut self) {
        self.velocity.clear();
    }

    pub const fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    /// 学习率调度每个 epoch 调用一次
    pub fn set_learning_rate(&mut self, learning_rate: f32) {
        self.learning_rate = learning_rate;
    }

    pub const fn momentum(&self) -> f32 {
        self.momentum
    }

    pub const fn decay(&self) -> f32 {
        self.decay
    }
}

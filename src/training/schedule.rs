/*
 * @Author       : 老董
 * @Date         : 2026-10-18
 * @Description  : 学习率调度：阶梯衰减与（带热重启的）余弦退火
 */

use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};

#[enum_dispatch]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LearningRate {
    StepShift(StepShift),
    CosineShift(CosineShift),
}

/// 学习率调度：给定当前 epoch，返回此时应使用的学习率
#[enum_dispatch(LearningRate)]
pub trait Schedule {
    fn value(&self, epoch: usize) -> f64;
}

// ==================== StepShift ====================

/// 阶梯衰减：剩余 epoch 不超过总长的 1/2 时变为 0.1 倍，不超过 1/4 时变为 0.01 倍
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepShift {
    value: f64,
    period: usize,
}

impl StepShift {
    pub fn new(value: f64, period: usize) -> Self {
        Self { value, period }
    }
}

impl Schedule for StepShift {
    fn value(&self, epoch: usize) -> f64 {
        let current = self.period as i64 - epoch as i64;
        let period = self.period as i64;

        if current <= period / 4 {
            self.value * 0.01
        } else if current <= period / 2 {
            self.value * 0.1
        } else {
            self.value
        }
    }
}

// ==================== CosineShift ====================

/// 余弦退火（SGDR）。每个周期内从`max`按余弦曲线降到`min`，
/// 周期结束后重启，下一个周期的长度乘以`period_mult`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CosineShift {
    max: f64,
    min: f64,
    period: usize,
    period_mult: usize,
}

impl CosineShift {
    /// `min`默认为0
    pub fn new(max: f64, period: usize, period_mult: usize) -> Self {
        Self::with_min(max, 0.0, period, period_mult)
    }

    pub fn with_min(max: f64, min: f64, period: usize, period_mult: usize) -> Self {
        assert!(period > 0, "CosineShift: 周期必须大于0");
        assert!(period_mult > 0, "CosineShift: 周期倍率必须大于0");
        Self {
            max,
            min,
            period,
            period_mult,
        }
    }
}

impl Schedule for CosineShift {
    fn value(&self, epoch: usize) -> f64 {
        let mut range = self.period;
        let mut start = 0;
        let mut end = range;

        while end <= epoch {
            start = end;
            range *= self.period_mult;
            end += range;
        }

        let t_cur = (epoch - start) as f64;
        let t_i = range as f64;
        self.min + 0.5 * (self.max - self.min) * (1.0 + (t_cur / t_i * std::f64::consts::PI).cos())
    }
}

/*
 * @Author       : 老董
 * @Date         : 2026-10-18
 * @Description  : 按固定间隔触发的扩展触发器
 */

use serde::{Deserialize, Serialize};

use super::TrainingState;

/// 间隔的单位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalUnit {
    Epoch,
    Iteration,
}

/// 间隔触发器
///
/// - 按 epoch：`epoch / period`的值发生变化时触发一次（从检查点恢复后不会重复触发，
///   因为上一次的计数会随检查点一起保存）
/// - 按 iteration：`iteration > 0 && iteration % period == 0`时触发
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalTrigger {
    period: usize,
    unit: IntervalUnit,
    count: usize,
}

impl IntervalTrigger {
    pub fn new(period: usize, unit: IntervalUnit) -> Self {
        assert!(period > 0, "IntervalTrigger: 间隔必须大于0");
        Self {
            period,
            unit,
            count: 0,
        }
    }

    pub fn epoch(period: usize) -> Self {
        Self::new(period, IntervalUnit::Epoch)
    }

    pub fn iteration(period: usize) -> Self {
        Self::new(period, IntervalUnit::Iteration)
    }

    pub const fn period(&self) -> usize {
        self.period
    }

    pub const fn unit(&self) -> IntervalUnit {
        self.unit
    }

    /// 根据当前训练进度判断是否触发
    pub fn fire(&mut self, state: &TrainingState) -> bool {
        match self.unit {
            IntervalUnit::Epoch => {
                let count = state.epoch / self.period;
                if count != self.count {
                    self.count = count;
                    true
                } else {
                    false
                }
            }
            IntervalUnit::Iteration => state.iteration > 0 && state.iteration % self.period == 0,
        }
    }
}

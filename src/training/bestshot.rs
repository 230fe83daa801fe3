/*
 * @Author       : 老董
 * @Date         : 2026-10-18
 * @Description  : Bestshot：监视某个观测值，只在它刷新最好成绩时保存模型快照
 */

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{IntervalTrigger, Observation, Summary, TrainingError, TrainingState, write_atomic};

/// 怎样算“更好”
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparison {
    Max,
    Min,
}

impl Comparison {
    /// `value`是否严格优于`best`
    pub fn improves(self, value: f64, best: f64) -> bool {
        match self {
            Self::Max => value > best,
            Self::Min => value < best,
        }
    }
}

/// 最佳模型快照
///
/// 每次迭代累计`key`的观测值；`trigger`触发时取区间均值，
/// 若优于历史最好值则通过保存回调写出快照（先写临时文件再改名）。
/// 历史最好值与触发器计数可随检查点一起序列化
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bestshot {
    key: String,
    comp: Comparison,
    filename: String,
    trigger: IntervalTrigger,
    value: Option<f64>,
    #[serde(skip)]
    summary: Summary,
}

impl Default for Bestshot {
    fn default() -> Self {
        Self::new(
            "validation/main/accuracy",
            Comparison::Max,
            "bestshot.npz",
            IntervalTrigger::epoch(1),
        )
    }
}

impl Bestshot {
    pub fn new(key: &str, comp: Comparison, filename: &str, trigger: IntervalTrigger) -> Self {
        Self {
            key: key.to_string(),
            comp,
            filename: filename.to_string(),
            trigger,
            value: None,
            summary: Summary::default(),
        }
    }

    /// 累计一次观测；触发且成绩刷新时调用`save`写出快照，返回快照路径
    ///
    /// `save`接收的是临时文件路径，写入成功后才会被改名为`out_dir/filename`；
    /// 写入失败时临时文件会被删除，历史最好值保持不变
    pub fn observe<F>(
        &mut self,
        state: &TrainingState,
        observation: &Observation,
        out_dir: &Path,
        save: F,
    ) -> Result<Option<PathBuf>, TrainingError>
    where
        F: FnOnce(&Path) -> Result<(), TrainingError>,
    {
        if let Some(value) = observation.get(&self.key) {
            self.summary.add_value(&self.key, *value);
        }
        if !self.trigger.fire(state) {
            return Ok(None);
        }

        let mean = self.summary.compute_mean().get(&self.key).copied();
        self.summary.clear();

        // 区间内没有观测到该键时不做比较
        let Some(mean) = mean else {
            return Ok(None);
        };
        if self.value.is_some_and(|best| !self.comp.improves(mean, best)) {
            return Ok(None);
        }

        let path = write_atomic(out_dir, &self.filename, save)?;
        self.value = Some(mean);
        Ok(Some(path))
    }

    /// 历史最好值
    pub const fn best(&self) -> Option<f64> {
        self.value
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

/*
 * @Author       : 老董
 * @Date         : 2026-10-18
 * @Description  : 训练周边组件：触发器、学习率调度、动量SGD、日志、最佳模型快照、网络大小统计与子批次梯度累积。
 *                 这些组件都只读写显式传入的训练进度（`TrainingState`），不持有训练循环本身
 */

mod accumulate;
mod bestshot;
mod error;
mod network_size;
mod optimizer;
mod report;
mod schedule;
mod summary;
mod trigger;

pub use accumulate::{average_grads, sub_batch_ranges};
pub use bestshot::{Bestshot, Comparison};
pub use error::TrainingError;
pub use network_size::{network_size, write_network_size};
pub use optimizer::MomentumSgd;
pub use report::{LogEntry, LogReport, PrintReport};
pub use schedule::{CosineShift, LearningRate, Schedule, StepShift};
pub use summary::{Observation, Summary};
pub use trigger::{IntervalTrigger, IntervalUnit};

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[cfg(test)]
mod tests;

/// 训练进度
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingState {
    /// 已完成的 epoch 数
    pub epoch: usize,
    /// 已完成的迭代（参数更新）次数
    pub iteration: usize,
    /// 带小数的 epoch 进度，如 1.5 表示第2个 epoch 过半
    pub epoch_detail: f64,
    /// 训练开始以来经过的秒数
    pub elapsed_time: f64,
}

/// 先写到`dir`下的临时文件，成功后再改名为`filename`，避免中途失败留下半个文件
pub(crate) fn write_atomic<F>(dir: &Path, filename: &str, write: F) -> Result<PathBuf, TrainingError>
where
    F: FnOnce(&Path) -> Result<(), TrainingError>,
{
    fs::create_dir_all(dir)?;
    let tmp_path = dir.join(format!("tmp{filename}"));
    if let Err(e) = write(&tmp_path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }

    let path = dir.join(filename);
    fs::rename(&tmp_path, &path)?;
    Ok(path)
}

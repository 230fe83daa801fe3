/*
 * @Author       : 老董
 * @Date         : 2026-10-18
 * @Description  : 训练配置：可从 JSON 读取，未给出的超参数取默认值，
 *                 并由此推导结果目录名、学习率调度、类别数等
 */

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::nn::{NetworkKind, NetworkPlan, create_network};
use crate::training::{CosineShift, LearningRate, MomentumSgd, StepShift, TrainingError};

/// 学习率调度方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Learning {
    /// 阶梯衰减
    #[default]
    Step,
    /// 整个训练期一个余弦周期
    Cosine,
    /// 余弦热重启：首周期10个 epoch，之后每次翻倍
    Restart,
}

impl Learning {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Step => "step",
            Self::Cosine => "cosine",
            Self::Restart => "restart",
        }
    }
}

impl fmt::Display for Learning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Learning {
    type Err = TrainingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "step" => Ok(Self::Step),
            "cosine" => Ok(Self::Cosine),
            "restart" => Ok(Self::Restart),
            _ => Err(TrainingError::UnknownLearning(s.to_string())),
        }
    }
}

const fn default_rate() -> f64 {
    0.1
}
const fn default_momentum() -> f64 {
    0.9
}
const fn default_decay() -> f64 {
    0.0001
}
const fn default_epoch() -> usize {
    300
}
const fn default_batchsize() -> usize {
    128
}

/// 一次训练的全部配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    /// `mnist`、`cifar10`或`cifar100`
    pub dataset: String,
    /// 网络名，见[`NetworkKind`]
    pub network: String,
    /// 网络的整数参数
    pub params: Vec<usize>,
    #[serde(default)]
    pub learning: Learning,
    /// 初始学习率
    #[serde(default = "default_rate")]
    pub rate: f64,
    #[serde(default = "default_momentum")]
    pub momentum: f64,
    /// 权重衰减
    #[serde(default = "default_decay")]
    pub decay: f64,
    #[serde(default = "default_epoch")]
    pub epoch: usize,
    #[serde(default = "default_batchsize")]
    pub batchsize: usize,
    /// 一次前向/反向实际处理的样本数，为空时等于`batchsize`
    #[serde(default)]
    pub procsize: Option<usize>,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl TrainConfig {
    /// 其余字段取默认值
    pub fn new(dataset: &str, network: &str, params: &[usize]) -> Self {
        Self {
            dataset: dataset.to_string(),
            network: network.to_string(),
            params: params.to_vec(),
            learning: Learning::default(),
            rate: default_rate(),
            momentum: default_momentum(),
            decay: default_decay(),
            epoch: default_epoch(),
            batchsize: default_batchsize(),
            procsize: None,
            seed: None,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, TrainingError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, TrainingError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// 检查数据集名、网络名与各数值项
    pub fn validate(&self) -> Result<(), TrainingError> {
        self.category()?;
        self.network_kind()?;
        if self.epoch == 0 {
            return Err(TrainingError::InvalidConfig {
                key: "epoch",
                reason: "必须大于0".to_string(),
            });
        }
        if self.batchsize == 0 {
            return Err(TrainingError::InvalidConfig {
                key: "batchsize",
                reason: "必须大于0".to_string(),
            });
        }
        if self.procsize == Some(0) {
            return Err(TrainingError::InvalidConfig {
                key: "procsize",
                reason: "必须大于0".to_string(),
            });
        }
        if self.rate.is_nan() || self.rate <= 0.0 {
            return Err(TrainingError::InvalidConfig {
                key: "rate",
                reason: format!("必须为正数，实际为{}", self.rate),
            });
        }
        if !(0.0..1.0).contains(&self.momentum) {
            return Err(TrainingError::InvalidConfig {
                key: "momentum",
                reason: format!("必须在[0, 1)内，实际为{}", self.momentum),
            });
        }
        if self.decay.is_nan() || self.decay < 0.0 {
            return Err(TrainingError::InvalidConfig {
                key: "decay",
                reason: format!("不能为负数，实际为{}", self.decay),
            });
        }
        Ok(())
    }

    pub fn procsize(&self) -> usize {
        self.procsize.unwrap_or(self.batchsize)
    }

    /// 结果目录名，如`cifar10-resnext-29-8-64-cosine`
    pub fn result_name(&self) -> String {
        let params = self
            .params
            .iter()
            .map(usize::to_string)
            .collect::<Vec<_>>()
            .join("-");
        format!("{}-{}-{params}-{}", self.dataset, self.network, self.learning)
    }

    pub fn result_dir(&self, base: impl AsRef<Path>) -> PathBuf {
        base.as_ref().join(self.result_name())
    }

    pub fn schedule(&self) -> LearningRate {
        match self.learning {
            Learning::Step => StepShift::new(self.rate, self.epoch).into(),
            Learning::Cosine => CosineShift::new(self.rate, self.epoch, 1).into(),
            Learning::Restart => CosineShift::new(self.rate, 10, 2).into(),
        }
    }

    /// 以初始学习率、动量与权重衰减构建优化器；学习率之后由[`Self::schedule`]逐 epoch 调整
    pub fn optimizer(&self) -> MomentumSgd {
        MomentumSgd::new(self.rate as f32, self.momentum as f32, self.decay as f32)
    }

    /// 数据集的类别数
    pub fn category(&self) -> Result<usize, TrainingError> {
        match self.dataset.as_str() {
            "mnist" | "cifar10" => Ok(10),
            "cifar100" => Ok(100),
            other => Err(TrainingError::UnknownDataset(other.to_string())),
        }
    }

    /// 输入图像的通道数
    pub fn in_channels(&self) -> usize {
        if self.dataset == "mnist" { 1 } else { 3 }
    }

    pub fn network_kind(&self) -> Result<NetworkKind, TrainingError> {
        Ok(self.network.parse()?)
    }

    /// 按配置构建网络的参数布局
    pub fn create_plan(&self) -> Result<NetworkPlan, TrainingError> {
        Ok(create_network(
            self.network_kind()?,
            self.category()?,
            &self.params,
            self.in_channels(),
        )?)
    }
}

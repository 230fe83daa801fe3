//! 训练周边组件的错误类型定义

use std::path::PathBuf;
use thiserror::Error;

use crate::errors::NetworkError;

/// 训练相关错误
#[derive(Debug, Error)]
pub enum TrainingError {
    /// IO 错误
    #[error("IO 错误: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON（反）序列化错误
    #[error("JSON 错误: {0}")]
    JsonError(#[from] serde_json::Error),

    /// 写 npz 出错
    #[error("写入 npz 失败: {0}")]
    WriteNpz(#[from] ndarray_npy::WriteNpzError),

    /// 读 npz 出错
    #[error("读取 npz 失败: {0}")]
    ReadNpz(#[from] ndarray_npy::ReadNpzError),

    /// 网络名或网络参数有误
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// 未知的学习率调度名
    #[error("未知的学习率调度`{0}`，可选：step、cosine、restart")]
    UnknownLearning(String),

    /// 未知的数据集名
    #[error("未知的数据集`{0}`，可选：mnist、cifar10、cifar100")]
    UnknownDataset(String),

    /// 检查点中缺少某个参数
    #[error("检查点{path}中缺少参数`{name}`")]
    MissingParam { path: PathBuf, name: String },

    /// 检查点中参数的形状与当前参数不一致
    #[error("参数`{name}`的形状不一致：当前为{expected:?}，检查点中为{got:?}")]
    ParamShape {
        name: String,
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    /// 数值配置不合法
    #[error("配置项`{key}`不合法: {reason}")]
    InvalidConfig { key: &'static str, reason: String },
}

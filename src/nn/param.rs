/*
 * @Author       : 老董
 * @Date         : 2026-10-18
 * @Description  : 网络参数：带名字的张量及其累积梯度，以及参数初始化策略
 */

use crate::tensor::Tensor;

// ==================== Init 枚举 ====================

/// 参数初始化策略
#[derive(Debug, Clone)]
pub enum Init {
    /// 全零（偏置）
    Zeros,
    /// LeCun 正态初始化（卷积核）：std = sqrt(1/fan_in)
    LeCun { fan_in: usize },
}

impl Init {
    /// 生成初始化后的 Tensor；带`seed`时可复现
    pub fn generate(&self, shape: &[usize], seed: Option<u64>) -> Tensor {
        match self {
            Self::Zeros => Tensor::zeros(shape),
            Self::LeCun { fan_in } => {
                let std = (1.0 / (*fan_in).max(1) as f32).sqrt();
                Tensor::new_normal(0.0, std, shape, seed)
            }
        }
    }
}

// ==================== Param 结构 ====================

/// 带名字的参数。数据可以延迟到第一次前向时才初始化（此前为`None`）
#[derive(Debug, Clone)]
pub struct Param {
    name: String,
    data: Option<Tensor>,
    grad: Option<Tensor>,
}

impl Param {
    pub fn new(name: &str, data: Tensor) -> Self {
        Self {
            name: name.to_string(),
            data: Some(data),
            grad: None,
        }
    }

    /// 尚未初始化的参数
    pub fn uninitialized(name: &str) -> Self {
        Self {
            name: name.to_string(),
            data: None,
            grad: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> Option<&Tensor> {
        self.data.as_ref()
    }

    pub fn set_data(&mut self, data: Tensor) {
        self.data = Some(data);
    }

    pub fn is_initialized(&self) -> bool {
        self.data.is_some()
    }

    pub fn grad(&self) -> Option<&Tensor> {
        self.grad.as_ref()
    }

    /// 把`grad`累加到已有梯度上（没有则直接记下）
    pub fn accumulate_grad(&mut self, grad: Tensor) {
        match &mut self.grad {
            Some(total) => *total += &grad,
            None => self.grad = Some(grad),
        }
    }

    /// 梯度整体除以`divisor`（如子批次累积后取平均）
    pub fn scale_grad(&mut self, divisor: f32) {
        if let Some(grad) = self.grad.take() {
            self.grad = Some(grad / divisor);
        }
    }

    pub fn clear_grad(&mut self) {
        self.grad = None;
    }

    /// 参数中元素的个数，未初始化时为0
    pub fn size(&self) -> usize {
        self.data.as_ref().map_or(0, Tensor::size)
    }
}

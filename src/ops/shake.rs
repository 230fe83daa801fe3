/*
 * @Author       : 老董
 * @Date         : 2026-10-18
 * @Description  : Shake-Shake 噪声算子
 *
 * 前向：每个样本抽一个 {0,1} 掩码 m，y = m*x1 + (1-m)*x2
 * 反向：重新抽一个与前向无关的掩码 m'，g1 = m'*gy，g2 = (1-m')*gy
 *
 * 前向与反向的掩码必须各自独立抽取，复用前向掩码会改变正则化的统计行为。
 * 评估模式下不经过本算子，直接取两路平均 (x1+x2)/2，也不消耗随机数。
 */

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::Function;
use crate::errors::OpError;
use crate::tensor::Tensor;

const OP: &str = "ShakeNoise";

/// 训练/评估模式，作为参数显式传入而非全局状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Train,
    Eval,
}

/// 每个样本一个 {0,1} 掩码的来源
pub trait MaskSource {
    /// 返回长度为`n`、元素取0或1的掩码
    fn mask(&mut self, n: usize) -> Vec<f32>;
}

/// 伯努利(0.5)随机掩码，可重新播种以复现
pub struct RandomMask {
    rng: StdRng,
}

impl RandomMask {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }
}

impl MaskSource for RandomMask {
    fn mask(&mut self, n: usize) -> Vec<f32> {
        (0..n).map(|_| self.rng.gen_range(0..2u8) as f32).collect()
    }
}

impl fmt::Debug for RandomMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomMask").finish_non_exhaustive()
    }
}

/// 按顺序循环给出预设掩码，用于强制前向/反向掩码的测试场景。
/// 预设掩码比批大小短时循环填充，如`[1.0]`即全1掩码
#[derive(Debug, Clone)]
pub struct FixedMasks {
    masks: Vec<Vec<f32>>,
    next: usize,
}

impl FixedMasks {
    /// # Panics
    /// `masks`为空，或其中有空掩码
    pub fn new(masks: Vec<Vec<f32>>) -> Self {
        assert!(
            !masks.is_empty() && masks.iter().all(|m| !m.is_empty()),
            "FixedMasks: 至少需要1个非空掩码"
        );
        Self { masks, next: 0 }
    }

    /// 每次调用依次给出全为`values[i]`的掩码
    pub fn constant(values: &[f32]) -> Self {
        Self::new(values.iter().map(|&v| vec![v]).collect())
    }

    /// 已经给出的掩码个数
    pub const fn calls(&self) -> usize {
        self.next
    }
}

impl MaskSource for FixedMasks {
    fn mask(&mut self, n: usize) -> Vec<f32> {
        let pattern = &self.masks[self.next % self.masks.len()];
        self.next += 1;
        pattern.iter().copied().cycle().take(n).collect()
    }
}

/// Shake-Shake 噪声算子，输入为两路分支 (x1, x2)
pub struct ShakeNoise<'a> {
    source: &'a mut dyn MaskSource,
}

impl<'a> ShakeNoise<'a> {
    pub fn new(source: &'a mut dyn MaskSource) -> Self {
        Self { source }
    }

    /// 抽取一个长度为`n`的掩码，返回`(m, 1-m)`；掩码长度不对时报错
    fn draw(&mut self, n: usize) -> Result<(Vec<f32>, Vec<f32>), OpError> {
        let mask = self.source.mask(n);
        if mask.len() != n {
            return Err(OpError::ShapeMismatch {
                op: OP,
                operand: "mask",
                expected: vec![n],
                got: vec![mask.len()],
            });
        }
        let inverse = mask.iter().map(|m| 1.0 - m).collect();
        Ok((mask, inverse))
    }
}

/// 两路分支必须同形状且至少有 batch 维
fn check_pair(inputs: &[&Tensor]) -> Result<(), OpError> {
    if inputs.len() != 2 {
        return Err(OpError::InputCount {
            op: OP,
            expected: "2",
            got: inputs.len(),
        });
    }
    let (x1, x2) = (inputs[0], inputs[1]);
    if x1.dimension() == 0 {
        return Err(OpError::Rank {
            op: OP,
            operand: "x1",
            expected: 1,
            got: x1.shape().to_vec(),
        });
    }
    if !x1.is_same_shape(x2) {
        return Err(OpError::ShapeMismatch {
            op: OP,
            operand: "x2",
            expected: x1.shape().to_vec(),
            got: x2.shape().to_vec(),
        });
    }
    Ok(())
}

impl Function for ShakeNoise<'_> {
    fn forward(&mut self, inputs: &[&Tensor]) -> Result<Tensor, OpError> {
        check_pair(inputs)?;
        let (x1, x2) = (inputs[0], inputs[1]);

        let (mask, inverse) = self.draw(x1.shape()[0])?;
        Ok(x1.scale_samples(&mask) + x2.scale_samples(&inverse))
    }

    fn backward(&mut self, inputs: &[&Tensor], grad_output: &Tensor) -> Result<Vec<Tensor>, OpError> {
        check_pair(inputs)?;
        if !grad_output.is_same_shape(inputs[0]) {
            return Err(OpError::ShapeMismatch {
                op: OP,
                operand: "gy",
                expected: inputs[0].shape().to_vec(),
                got: grad_output.shape().to_vec(),
            });
        }

        // 与前向无关的新掩码
        let (mask, inverse) = self.draw(grad_output.shape()[0])?;
        Ok(vec![
            grad_output.scale_samples(&mask),
            grad_output.scale_samples(&inverse),
        ])
    }
}

/// 训练模式下做 Shake-Shake 混合；评估模式下返回 (x1+x2)/2，不消耗随机数
pub fn shake_noise(
    x1: &Tensor,
    x2: &Tensor,
    mode: Mode,
    source: &mut dyn MaskSource,
) -> Result<Tensor, OpError> {
    match mode {
        Mode::Train => ShakeNoise::new(source).forward(&[x1, x2]),
        Mode::Eval => {
            check_pair(&[x1, x2])?;
            Ok((x1 + x2) / 2.0)
        }
    }
}

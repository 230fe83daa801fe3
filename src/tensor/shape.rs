/*
 * @Author       : 老董
 * @Date         : 2026-10-18
 * @Description  : 张量的形状变换：变形、轴置换、沿轴截取/拼接/堆叠、空间填充与翻转。
 *                 所有方法都返回新张量，不修改自身
 */

use ndarray::{Array, Axis, IxDyn, Slice};

use super::Tensor;
use crate::errors::{Operator, TensorError};

impl Tensor {
    /// 按行优先顺序重新排列成`shape`，元素总数必须不变
    pub fn reshape(&self, shape: &[usize]) -> Result<Self, TensorError> {
        if shape.iter().product::<usize>() != self.size() {
            return Err(TensorError::IncompatibleShape);
        }
        Self::try_new(&self.to_vec(), shape)
    }

    /// 交换张量的维度顺序，`axes[i]`表示新张量第i维来自原张量的哪一维
    pub fn permute(&self, axes: &[usize]) -> Result<Self, TensorError> {
        let dimension = self.dimension();
        let mut seen = vec![false; dimension];
        if axes.len() != dimension {
            return Err(TensorError::PermuteNeedUniqueAndInRange);
        }
        for &axis in axes {
            if axis >= dimension || seen[axis] {
                return Err(TensorError::PermuteNeedUniqueAndInRange);
            }
            seen[axis] = true;
        }
        let permuted = self.data.clone().permuted_axes(IxDyn(axes));
        Ok(Self {
            data: permuted.as_standard_layout().into_owned(),
        })
    }

    /// 沿`axis`截取`[start, start+len)`这一连续段
    pub fn narrow(&self, axis: usize, start: usize, len: usize) -> Result<Self, TensorError> {
        self.check_axis(axis)?;
        let axis_len = self.shape()[axis];
        if start + len > axis_len {
            return Err(TensorError::NarrowOutOfRange {
                axis,
                start,
                end: start + len,
                len: axis_len,
            });
        }
        let view = self
            .data
            .slice_axis(Axis(axis), Slice::from(start..start + len));
        Ok(Self {
            data: view.as_standard_layout().into_owned(),
        })
    }

    /// 取`axis`上第`index`个子张量（结果少一阶）
    pub fn select(&self, axis: usize, index: usize) -> Result<Self, TensorError> {
        self.check_axis(axis)?;
        let axis_len = self.shape()[axis];
        if index >= axis_len {
            return Err(TensorError::NarrowOutOfRange {
                axis,
                start: index,
                end: index + 1,
                len: axis_len,
            });
        }
        Ok(Self {
            data: self.data.index_axis(Axis(axis), index).to_owned(),
        })
    }

    /// 沿已有的`axis`依次拼接，除该轴外其余维度必须一致
    pub fn concat(tensors: &[&Self], axis: usize) -> Result<Self, TensorError> {
        let first = tensors.first().ok_or(TensorError::EmptyList)?;
        first.check_axis(axis)?;
        let views = tensors.iter().map(|t| t.data.view()).collect::<Vec<_>>();
        let data = ndarray::concatenate(Axis(axis), &views).map_err(|_| {
            let mismatched = tensors
                .iter()
                .find(|t| t.dimension() != first.dimension() || !same_except(t, first, axis))
                .map_or_else(Vec::new, |t| t.shape().to_vec());
            TensorError::OperatorError {
                operator: Operator::Concat,
                tensor1_shape: first.shape().to_vec(),
                tensor2_shape: mismatched,
            }
        })?;
        Ok(Self { data })
    }

    /// 在新插入的第`axis`维上堆叠，所有张量形状必须一致
    pub fn stack(tensors: &[&Self], axis: usize) -> Result<Self, TensorError> {
        let first = tensors.first().ok_or(TensorError::EmptyList)?;
        if axis > first.dimension() {
            return Err(TensorError::AxisOutOfRange {
                axis,
                dimension: first.dimension(),
            });
        }
        if let Some(other) = tensors.iter().find(|t| !t.is_same_shape(first)) {
            return Err(TensorError::OperatorError {
                operator: Operator::Concat,
                tensor1_shape: first.shape().to_vec(),
                tensor2_shape: other.shape().to_vec(),
            });
        }
        let views = tensors.iter().map(|t| t.data.view()).collect::<Vec<_>>();
        let data = ndarray::stack(Axis(axis), &views).map_err(|_| TensorError::IncompatibleShape)?;
        Ok(Self { data })
    }

    /// 在最后两维（H、W）四周补零，前面的维度不变
    pub fn pad_spatial(&self, pad_h: usize, pad_w: usize) -> Result<Self, TensorError> {
        let dimension = self.dimension();
        if dimension < 2 {
            return Err(TensorError::AxisOutOfRange { axis: 1, dimension });
        }
        if pad_h == 0 && pad_w == 0 {
            return Ok(self.clone());
        }
        let mut shape = self.shape().to_vec();
        let (h, w) = (shape[dimension - 2], shape[dimension - 1]);
        shape[dimension - 2] = h + 2 * pad_h;
        shape[dimension - 1] = w + 2 * pad_w;

        let mut data = Array::zeros(IxDyn(&shape));
        let mut inner = data.slice_axis_mut(Axis(dimension - 2), Slice::from(pad_h..pad_h + h));
        inner.slice_axis_inplace(Axis(dimension - 1), Slice::from(pad_w..pad_w + w));
        inner.assign(&self.data);
        Ok(Self { data })
    }

    /// 沿`axis`反转元素顺序（如水平翻转图像）
    pub fn flip(&self, axis: usize) -> Result<Self, TensorError> {
        self.check_axis(axis)?;
        let view = self.data.slice_axis(Axis(axis), Slice::new(0, None, -1));
        Ok(Self {
            data: view.as_standard_layout().into_owned(),
        })
    }

    fn check_axis(&self, axis: usize) -> Result<(), TensorError> {
        if axis >= self.dimension() {
            return Err(TensorError::AxisOutOfRange {
                axis,
                dimension: self.dimension(),
            });
        }
        Ok(())
    }
}

fn same_except(a: &Tensor, b: &Tensor, axis: usize) -> bool {
    a.shape()
        .iter()
        .zip(b.shape())
        .enumerate()
        .all(|(i, (x, y))| i == axis || x == y)
}

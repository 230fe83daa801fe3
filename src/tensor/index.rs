use std::ops::{Index, IndexMut};

use super::Tensor;

// 以定长数组下标取元素，如`x[[n, c, h, w]]`；下标个数须与张量阶数一致，否则panic
impl<const N: usize> Index<[usize; N]> for Tensor {
    type Output = f32;

    fn index(&self, index: [usize; N]) -> &f32 {
        &self.data[&index[..]]
    }
}

impl<const N: usize> IndexMut<[usize; N]> for Tensor {
    fn index_mut(&mut self, index: [usize; N]) -> &mut f32 {
        &mut self.data[&index[..]]
    }
}

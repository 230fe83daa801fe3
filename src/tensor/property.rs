/*
 * @Author       : 老董
 * @Date         : 2026-10-18
 * @Description  : 本类仅包含一些属性方法，不包含任何运算方法，所以不会需要用到mut
 */

use super::Tensor;
use ndarray::ArrayViewD;

impl Tensor {
    /*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓快照/view↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
    pub fn view(&self) -> ArrayViewD<'_, f32> {
        self.data.view()
    }
    /*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑快照/view↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/

    /// 如激活张量的形状为[N, C, H, W]，分组卷积核为[G, C_out/G, C_in/G, kH, kW]
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// 张量的维（dim）数、阶（rank）数
    /// 即`shape()`的元素个数--如：形状为`[]`的标量阶数为0，向量阶数为1，矩阵阶数为2，以此类推
    pub fn dimension(&self) -> usize {
        self.data.ndim()
    }

    /// 计算张量中所有元素的数量
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// 判断两个张量的形状是否严格一致。如：形状为 [1, 4]，[1, 4]和[4]是不一致的，会返回false
    pub fn is_same_shape(&self, other: &Self) -> bool {
        self.shape() == other.shape()
    }

    /// 转化为纯数（number）。仅含1个元素时返回Some(number)，否则返回None
    pub fn number(&self) -> Option<f32> {
        if self.size() == 1 {
            self.data.iter().next().copied()
        } else {
            None
        }
    }
}

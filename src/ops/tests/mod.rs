
use crate::tensor::Tensor;

/// 中心差分求 f 在 x 处的数值梯度
fn numeric_grad(f: impl Fn(&Tensor) -> f32, x: &Tensor, eps: f32) -> Tensor {
    let base = x.to_vec();
    let grads = (0..base.len())
        .map(|i| {
            let mut plus = base.clone();
            let mut minus = base.clone();
            plus[i] += eps;
            minus[i] -= eps;
            let f_plus = f(&Tensor::new(&plus, x.shape()));
            let f_minus = f(&Tensor::new(&minus, x.shape()));
            (f_plus - f_minus) / (2.0 * eps)
        })
        .collect::<Vec<_>>();
    Tensor::new(&grads, x.shape())
}

/// 以 loss = sum(y ⊙ r) 作为标量损失，此时 dL/dy = r
fn weighted_sum(y: &Tensor, r: &Tensor) -> f32 {
    (y * r).sum()
}

use crate::nn::Param;
use crate::tensor::Tensor;
use crate::training::{average_grads, sub_batch_ranges};

#[test]
fn test_sub_batch_ranges() {
    assert_eq!(sub_batch_ranges(128, 128), vec![0..128]);
    assert_eq!(sub_batch_ranges(128, 64), vec![0..64, 64..128]);
    // ceil(10 / 4) = 3 段，尽量均匀
    assert_eq!(sub_batch_ranges(10, 4), vec![0..3, 3..6, 6..10]);
    // 最后一个不满的批次
    assert_eq!(sub_batch_ranges(5, 64), vec![0..5]);
    assert_eq!(sub_batch_ranges(0, 8), vec![0..0]);
}

#[test]
fn test_sub_batch_ranges_cover_batch_without_overlap() {
    for (len, procsize) in [(128, 48), (97, 10), (3, 1)] {
        let ranges = sub_batch_ranges(len, procsize);
        assert_eq!(ranges.first().map(|r| r.start), Some(0));
        assert_eq!(ranges.last().map(|r| r.end), Some(len));
        assert!(ranges.windows(2).all(|w| w[0].end == w[1].start));
        assert!(ranges.iter().all(|r| r.len() <= procsize));
    }
}

#[test]
fn test_average_grads() {
    let mut w = Param::new("W", Tensor::zeros(&[2]));
    let mut b = Param::new("b", Tensor::zeros(&[1]));
    w.accumulate_grad(Tensor::new(&[3.0, 6.0], &[2]));
    w.accumulate_grad(Tensor::new(&[3.0, 0.0], &[2]));

    average_grads([&mut w, &mut b], 2);
    assert_eq!(w.grad(), Some(&Tensor::new(&[3.0, 3.0], &[2])));
    // 没有梯度的参数保持为空
    assert!(b.grad().is_none());

    average_grads([&mut w], 1);
    assert_eq!(w.grad(), Some(&Tensor::new(&[3.0, 3.0], &[2])));
}

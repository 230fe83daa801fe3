use std::io::Cursor;

use crate::tensor::Tensor;

#[test]
fn test_save_and_load_through_buffer() {
    let tensor = Tensor::new_normal(0.0, 1.0, &[2, 3, 4], Some(42));
    let mut buffer = Vec::new();
    tensor.save(&mut buffer).unwrap();

    let loaded = Tensor::load(&mut Cursor::new(buffer)).unwrap();
    assert_eq!(loaded, tensor);
}

#[test]
fn test_load_truncated_data_fails() {
    let tensor = Tensor::ones(&[4, 4]);
    let mut buffer = Vec::new();
    tensor.save(&mut buffer).unwrap();
    buffer.truncate(buffer.len() / 2);

    assert!(Tensor::load(&mut Cursor::new(buffer)).is_err());
}

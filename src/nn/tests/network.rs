/*
 * @Author       : 老董
 * @Date         : 2026-10-18
 * @Description  : 网络注册表单元测试：名字解析、参数个数校验、参数布局与总大小
 */

use crate::assert_err;
use crate::errors::NetworkError;
use crate::nn::{NetworkKind, create_network};

// ==================== 名字解析 ====================

#[test]
fn test_network_kind_from_str() {
    assert_eq!("resnet".parse::<NetworkKind>(), Ok(NetworkKind::ResNet));
    assert_eq!("pyramid".parse::<NetworkKind>(), Ok(NetworkKind::ResNet));
    assert_eq!("DenseNet".parse::<NetworkKind>(), Ok(NetworkKind::DenseNet));
    assert_eq!("resnext".parse::<NetworkKind>(), Ok(NetworkKind::ResNeXt));
    assert_eq!("shakenet".parse::<NetworkKind>(), Ok(NetworkKind::ShakeNet));
    assert_eq!(
        "vgg".parse::<NetworkKind>(),
        Err(NetworkError::UnknownName("vgg".to_string()))
    );

    for kind in NetworkKind::ALL {
        assert_eq!(kind.to_string().parse::<NetworkKind>(), Ok(kind));
    }
}

// ==================== 参数校验 ====================

#[test]
fn test_create_network_rejects_bad_params() {
    assert_err!(
        create_network(NetworkKind::ResNet, 10, &[110], 3),
        NetworkError::ParamCount { expected: 2, .. }
    );
    assert_err!(
        create_network(NetworkKind::ResNeXt, 10, &[29, 4], 3),
        NetworkError::ParamCount { expected: 3, .. }
    );
    // (depth - 2) / 9 == 0
    assert_err!(
        create_network(NetworkKind::ResNeXt, 10, &[10, 4, 2], 3),
        NetworkError::TooShallow { depth: 10, min: 11, .. }
    );
    assert_err!(
        create_network(NetworkKind::DenseNet, 10, &[4, 12], 3),
        NetworkError::TooShallow { min: 5, .. }
    );
    assert_err!(
        create_network(NetworkKind::ShakeNet, 10, &[8, 0], 3),
        NetworkError::ZeroWidth { .. }
    );
}

// ==================== 参数布局 ====================

#[test]
fn test_resnet_plan() -> Result<(), NetworkError> {
    let plan = create_network(NetworkKind::ResNet, 10, &[8, 6], 3)?;
    assert_eq!(plan.kind(), NetworkKind::ResNet);
    assert_eq!(plan.category(), 10);
    assert_eq!(plan.shape_of("/input/W"), Some(&[16, 3, 3, 3][..]));
    assert_eq!(plan.shape_of("/norm/gamma"), Some(&[16][..]));
    // 块1: 16 -> 18，块2: 18 -> 20，块3: 20 -> 22
    assert_eq!(plan.shape_of("/block1/0/conv1/W"), Some(&[18, 16, 3, 3][..]));
    assert_eq!(plan.shape_of("/block3/0/conv2/W"), Some(&[22, 22, 3, 3][..]));
    assert_eq!(plan.shape_of("/output/W"), Some(&[10, 22][..]));
    assert_eq!(plan.total_size(), 21842);
    Ok(())
}

#[test]
fn test_resnet_plan_interpolates_unit_channels() -> Result<(), NetworkError> {
    // 每块2个单元，块1: 16 -> 20，单元通道 [16, 18, 20]
    let plan = create_network(NetworkKind::ResNet, 10, &[14, 12], 3)?;
    assert_eq!(plan.shape_of("/block1/0/conv1/W"), Some(&[18, 16, 3, 3][..]));
    assert_eq!(plan.shape_of("/block1/1/conv1/W"), Some(&[20, 18, 3, 3][..]));
    assert_eq!(plan.shape_of("/block1/2/conv1/W"), None);
    assert_eq!(plan.total_size(), 57758);
    Ok(())
}

#[test]
fn test_densenet_plan() -> Result<(), NetworkError> {
    let plan = create_network(NetworkKind::DenseNet, 10, &[5, 4], 3)?;
    // 每块1个单元，growth 4：块1输入16，过渡卷积 20 -> 20
    assert_eq!(plan.shape_of("/block1/0/conv1/W"), Some(&[4, 16, 3, 3][..]));
    assert_eq!(plan.shape_of("/conv1/W"), Some(&[20, 20, 1, 1][..]));
    assert_eq!(plan.shape_of("/conv2/W"), Some(&[24, 24, 1, 1][..]));
    assert_eq!(plan.shape_of("/conv3/W"), None);
    assert_eq!(plan.shape_of("/output/W"), Some(&[10, 28][..]));
    assert_eq!(plan.total_size(), 4106);

    let mnist = create_network(NetworkKind::DenseNet, 100, &[8, 2], 1)?;
    assert_eq!(mnist.shape_of("/input/W"), Some(&[16, 1, 3, 3][..]));
    assert_eq!(mnist.total_size(), 6668);
    Ok(())
}

#[test]
fn test_resnext_plan_uses_grouped_conv() -> Result<(), NetworkError> {
    let plan = create_network(NetworkKind::ResNeXt, 10, &[11, 2, 2], 3)?;
    // 基础宽度 2 * 2 = 4
    assert_eq!(plan.shape_of("/input/W"), Some(&[4, 3, 3, 3][..]));
    assert_eq!(plan.shape_of("/block1/0/conv2/W"), Some(&[2, 2, 2, 3, 3][..]));
    assert_eq!(plan.shape_of("/block1/0/conv2/b"), Some(&[2, 2][..]));
    assert_eq!(plan.shape_of("/block2/0/conv1/W"), Some(&[8, 4, 1, 1][..]));
    assert_eq!(plan.shape_of("/block3/0/conv2/W"), Some(&[2, 8, 8, 3, 3][..]));
    assert_eq!(plan.shape_of("/output/W"), Some(&[10, 16][..]));
    assert_eq!(plan.total_size(), 2598);
    Ok(())
}

#[test]
fn test_shakenet_plan_has_two_lines() -> Result<(), NetworkError> {
    let plan = create_network(NetworkKind::ShakeNet, 10, &[8, 1], 3)?;
    assert_eq!(plan.shape_of("/block1/0/line1/conv1/W"), Some(&[16, 16, 3, 3][..]));
    assert_eq!(plan.shape_of("/block1/0/line2/conv1/W"), Some(&[16, 16, 3, 3][..]));
    assert_eq!(plan.shape_of("/block2/0/line1/conv1/W"), Some(&[32, 16, 3, 3][..]));
    assert_eq!(plan.shape_of("/block3/0/line2/norm2/beta"), Some(&[64][..]));
    assert_eq!(plan.shape_of("/output/W"), Some(&[10, 64][..]));
    assert_eq!(plan.total_size(), 150186);
    Ok(())
}

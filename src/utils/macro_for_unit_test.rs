/// 错误断言宏 - 灵活粒度验证 Result 错误
///
/// # 用法
/// - `assert_err!(expr)`：只验证是 Err
/// - `assert_err!(expr, Pattern { .. })`：验证错误类型
/// - `assert_err!(expr, Pattern { field, .. } if condition)`：验证类型 + 条件
///
/// # 示例
/// ```ignore
/// // 只验证是错误
/// assert_err!(result);
///
/// // 验证错误类型（忽略所有字段）
/// assert_err!(result, OpError::ShapeMismatch { .. });
///
/// // 验证类型 + 出错的操作数
/// assert_err!(result, OpError::Rank { operand, .. } if *operand == "W");
/// ```
#[macro_export]
macro_rules! assert_err {
    // 只验证是 Err
    ($expr:expr) => {
        assert!($expr.is_err(), "预期 Err，实际得到 {:?}", $expr);
    };
    // 通用模式匹配（带 if guard 或复杂 pattern）
    ($expr:expr, $($pattern:tt)+) => {
        match &$expr {
            Err(e) => assert!(
                matches!(e, $($pattern)+),
                "错误类型不匹配：预期 `{}`，实际得到 `{:?}`",
                stringify!($($pattern)+),
                e
            ),
            Ok(v) => panic!(
                "预期 Err 匹配 `{}`，实际得到 Ok({:?})",
                stringify!($($pattern)+),
                v
            ),
        }
    };
}

/// panic断言宏：`assert_panic!(expr)`只验证触发了panic，
/// `assert_panic!(expr, msg)`同时验证panic消息
#[macro_export]
macro_rules! assert_panic {
    ($expr:expr) => {
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| $expr)) {
            Ok(_) => panic!("表达式没有触发panic"),
            Err(_) => (),
        }
    };
    ($expr:expr, $expected_msg:expr) => {
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| $expr)) {
            Ok(_) => panic!("表达式没有触发panic"),
            Err(err) => {
                let expected_msg_str = $expected_msg.to_string();
                if let Some(msg) = err.downcast_ref::<&'static str>() {
                    assert_eq!(*msg, expected_msg_str, "panic消息与预期不符");
                } else if let Some(msg) = err.downcast_ref::<String>() {
                    assert_eq!(*msg, expected_msg_str, "panic消息与预期不符");
                } else {
                    panic!(
                        "未找到预期的panic消息，预期的panic消息为: {}",
                        expected_msg_str
                    );
                }
            }
        }
    };
}

/// 逐元素比较两个张量（形状须一致），误差不超过`epsilon`
#[macro_export]
macro_rules! assert_tensor_close {
    ($left:expr, $right:expr) => {
        $crate::assert_tensor_close!($left, $right, 1e-5)
    };
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let (left, right) = (&$left, &$right);
        assert_eq!(left.shape(), right.shape(), "张量形状不一致");
        for (a, b) in left.to_vec().iter().zip(right.to_vec().iter()) {
            approx::assert_abs_diff_eq!(*a, *b, epsilon = $epsilon);
        }
    }};
}

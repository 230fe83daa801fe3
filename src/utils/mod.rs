//! # 常用接口模块
//!
//! 本模块提供一些单元测试里常用的断言宏


pub mod macro_for_unit_test;

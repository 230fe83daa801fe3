/*
 * @Author       : 老董
 * @Date         : 2026-10-18
 * @Description  : 检查点：以 NumPy 的 .npz 格式保存/恢复带名字的参数
 *
 * 参数名中开头的`/`在写入时去掉（如`/block1/0/conv2/W`存为`block1/0/conv2/W`），
 * 读取时按同样的规则匹配
 */

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use ndarray::ArrayD;
use ndarray_npy::{NpzReader, NpzWriter};

use crate::nn::Param;
use crate::tensor::Tensor;
use crate::training::TrainingError;

fn entry_name(name: &str) -> &str {
    name.trim_start_matches('/')
}

/// 把若干`(名字, 张量)`写入一个 .npz 文件
pub fn save_npz<'a, I>(path: impl AsRef<Path>, tensors: I) -> Result<(), TrainingError>
where
    I: IntoIterator<Item = (&'a str, &'a Tensor)>,
{
    let mut npz = NpzWriter::new(File::create(path)?);
    for (name, tensor) in tensors {
        npz.add_array(entry_name(name), &tensor.view())?;
    }
    npz.finish()?;
    Ok(())
}

/// 读出 .npz 文件中的全部张量
pub fn load_npz(path: impl AsRef<Path>) -> Result<BTreeMap<String, Tensor>, TrainingError> {
    let mut npz = NpzReader::new(BufReader::new(File::open(path)?))?;
    let mut tensors = BTreeMap::new();
    for name in npz.names()? {
        let array: ArrayD<f32> = npz.by_name(&name)?;
        let key = name.strip_suffix(".npy").unwrap_or(&name).to_string();
        tensors.insert(key, Tensor::from_array(array));
    }
    Ok(tensors)
}

/// 保存一组已初始化的参数，名字为`{prefix}/{参数名}`；未初始化的参数跳过
pub fn save_params(path: impl AsRef<Path>, prefix: &str, params: &[&Param]) -> Result<(), TrainingError> {
    let named = params
        .iter()
        .filter_map(|p| p.data().map(|data| (format!("{prefix}/{}", p.name()), data)))
        .collect::<Vec<_>>();
    save_npz(path, named.iter().map(|(name, data)| (name.as_str(), *data)))
}

/// 从 .npz 文件恢复一组参数（按`{prefix}/{参数名}`查找）
///
/// 先找齐全部参数并核对形状（未初始化的参数不核对），全部通过后才写入；
/// 任何一个缺失或形状不符都会报错，且不改动任何参数
pub fn restore_params(
    path: impl AsRef<Path>,
    prefix: &str,
    params: &mut [&mut Param],
) -> Result<(), TrainingError> {
    let path = path.as_ref();
    let mut tensors = load_npz(path)?;

    let mut loaded = Vec::with_capacity(params.len());
    for param in params.iter() {
        let name = format!("{prefix}/{}", param.name());
        let Some(data) = tensors.remove(entry_name(&name)) else {
            return Err(TrainingError::MissingParam {
                path: path.to_path_buf(),
                name,
            });
        };
        if let Some(current) = param.data() {
            if !current.is_same_shape(&data) {
                return Err(TrainingError::ParamShape {
                    name,
                    expected: current.shape().to_vec(),
                    got: data.shape().to_vec(),
                });
            }
        }
        loaded.push(data);
    }

    for (param, data) in params.iter_mut().zip(loaded) {
        param.set_data(data);
    }
    Ok(())
}

/*
 * @Author       : 老董
 * @Date         : 2026-10-18
 * @Description  : 统计网络各层级（"/"、"/block1"、"/block1/0"...）包含的参数个数
 */

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// 对每个参数名的所有前缀累加其元素个数，按名字排序返回
///
/// 如`/block1/0/conv1/W`会计入`/`、`/block1`、`/block1/0`、`/block1/0/conv1`与其自身
pub fn network_size(params: &[(String, Vec<usize>)]) -> Vec<(String, usize)> {
    let mut sizes = BTreeMap::<String, usize>::new();

    for (name, shape) in params {
        let size = shape.iter().product::<usize>();
        let parts = name.split('/').collect::<Vec<_>>();

        *sizes.entry("/".to_string()).or_default() += size;
        for i in 1..parts.len() {
            *sizes.entry(parts[..=i].join("/")).or_default() += size;
        }
    }

    sizes.into_iter().collect()
}

/// 以`name: size`逐行写入文件
pub fn write_network_size(path: impl AsRef<Path>, sizes: &[(String, usize)]) -> std::io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for (name, size) in sizes {
        writeln!(out, "{name}: {size}")?;
    }
    out.flush()
}

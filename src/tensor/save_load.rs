use std::io::{Read, Write};

use super::Tensor;

// 保存和加载张量
impl Tensor {
    /// 将单个Tensor以bincode格式写入`writer`
    pub fn save<W: Write>(&self, writer: &mut W) -> bincode::Result<()> {
        bincode::serialize_into(writer, &self.data)
    }

    /// 从`reader`加载单个Tensor
    pub fn load<R: Read>(reader: &mut R) -> bincode::Result<Self> {
        let data = bincode::deserialize_from(reader)?;
        Ok(Self { data })
    }
}

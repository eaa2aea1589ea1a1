/*
 * @Date         : 2026-10-19
 * @Description  : 检查点：全部可训练参数的二进制保存/加载
 *
 * 文件格式：
 * - [0-3]  魔数 "GCKP"
 * - [4-7]  版本号（u32，小端）
 * - [8..]  bincode 编码的 `CheckpointBody`
 *
 * 同一路径重复保存时直接覆盖，不做版本管理。
 */

use super::{Graph, GraphError};
use crate::tensor::Tensor;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// 参数文件魔数
const PARAMS_MAGIC: &[u8; 4] = b"GCKP";
/// 参数文件版本
const PARAMS_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct CheckpointBody {
    /// 恢复训练时应从哪一步继续
    step: u64,
    params: Vec<SavedParam>,
}

#[derive(Serialize, Deserialize)]
struct SavedParam {
    name: String,
    value: Tensor,
}

impl Graph {
    /// 保存所有可训练参数到二进制文件（父目录不存在时自动创建）
    pub fn save_params<P: AsRef<Path>>(&self, path: P, step: u64) -> Result<(), GraphError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let params = self
            .get_trainable_nodes()
            .into_iter()
            .map(|id| {
                Ok(SavedParam {
                    name: self.get_node_name(id)?.to_string(),
                    value: self.expect_node_value(id)?.clone(),
                })
            })
            .collect::<Result<Vec<_>, GraphError>>()?;
        let body = CheckpointBody { step, params };

        let mut writer = BufWriter::new(File::create(path)?);
        writer.write_all(PARAMS_MAGIC)?;
        writer.write_all(&PARAMS_VERSION.to_le_bytes())?;
        bincode::serialize_into(&mut writer, &body)
            .map_err(|e| GraphError::Checkpoint(format!("序列化参数失败: {e}")))?;
        writer.flush()?;

        tracing::debug!("已保存{}个参数到{}", body.params.len(), path.display());
        Ok(())
    }

    /// 从二进制文件按名称加载参数，返回文件中记录的步数。
    ///
    /// 图须先用代码构建为与保存时相同的结构；文件里多出的参数会被忽略，
    /// 图中缺失于文件的参数保持原值。
    pub fn load_params<P: AsRef<Path>>(&mut self, path: P) -> Result<u64, GraphError> {
        let path = path.as_ref();
        let mut reader = BufReader::new(File::open(path)?);

        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if &magic != PARAMS_MAGIC {
            return Err(GraphError::Checkpoint(format!(
                "{}不是有效的检查点文件",
                path.display()
            )));
        }

        let mut version_bytes = [0u8; 4];
        reader.read_exact(&mut version_bytes)?;
        let version = u32::from_le_bytes(version_bytes);
        if version != PARAMS_VERSION {
            return Err(GraphError::Checkpoint(format!(
                "不支持的检查点版本: {version}"
            )));
        }

        let body: CheckpointBody = bincode::deserialize_from(&mut reader)
            .map_err(|e| GraphError::Checkpoint(format!("反序列化参数失败: {e}")))?;

        let mut loaded = 0;
        for param in body.params {
            match self.get_node_by_name(&param.name) {
                Some(id) if self.get_node(id)?.is_trainable() => {
                    self.set_node_value(id, &param.value)?;
                    loaded += 1;
                }
                _ => tracing::warn!("检查点中的参数{}在图中不存在，已跳过", param.name),
            }
        }
        let expected = self.get_trainable_nodes().len();
        if loaded < expected {
            tracing::warn!("图中有{}个参数未出现在检查点中", expected - loaded);
        }

        Ok(body.step)
    }
}

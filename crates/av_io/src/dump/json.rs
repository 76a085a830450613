// crates/av_io/src/dump/json.rs

//! JSON 快照驱动
//!
//! # 文件格式
//!
//! ```text
//! {
//!   "time": 0.5,                      // 可选
//!   "num_ghost": 1,
//!   "block_ids": [0, 1],              // 可选
//!   "x_faces": [[...], [...]],        // (blocks, nx_total + 1)，含 ghost 区
//!   "y_faces": [[...], [...]],        // (blocks, ny_total + 1)
//!   "fields": {
//!     "density": { "shape": [2, 6, 6], "data": [...] }   // 行主序
//!   }
//! }
//! ```
//!
//! 非有限值写作 `"NaN"`、`"inf"`、`"-inf"`，`null` 读作 NaN，见 [`super::float_codec`]。
//!
//! 内部框架去掉两端各 `num_ghost` 个面；外边界框架即含 ghost 区的面坐标；
//! 无 ghost 框架与内部框架一致，和 `field(name, true)` 的结果配套。

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use ndarray::{Array2, IxDyn};
use serde::{Deserialize, Serialize};

use super::{strip_ghost_cells, BlockCoords, DumpReader, DumpSource, FieldTensor, Framing};
use crate::error::{IoError, IoResult};

// ============================================================
// 文件结构
// ============================================================

/// 场记录（形状 + 行主序数据）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRecord {
    /// 形状
    pub shape: Vec<usize>,
    /// 数据
    #[serde(with = "crate::dump::float_codec::vec")]
    pub data: Vec<f64>,
}

impl FieldRecord {
    /// 从张量创建记录
    pub fn from_tensor(tensor: &FieldTensor) -> Self {
        Self {
            shape: tensor.shape().to_vec(),
            data: tensor.iter().copied().collect(),
        }
    }
}

/// JSON 快照文件内容
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DumpFile {
    /// 模拟时间
    #[serde(default)]
    pub time: Option<f64>,
    /// 每侧 ghost 单元数
    #[serde(default)]
    pub num_ghost: usize,
    /// 块编号
    #[serde(default)]
    pub block_ids: Option<Vec<i64>>,
    /// x 方向面坐标（含 ghost 区）
    #[serde(with = "crate::dump::float_codec::nested")]
    pub x_faces: Vec<Vec<f64>>,
    /// y 方向面坐标（含 ghost 区）
    #[serde(with = "crate::dump::float_codec::nested")]
    pub y_faces: Vec<Vec<f64>>,
    /// 场
    #[serde(default)]
    pub fields: BTreeMap<String, FieldRecord>,
}

impl DumpFile {
    /// 写入 JSON 文件
    pub fn save(&self, path: &Path) -> IoResult<()> {
        let content = serde_json::to_string(self).map_err(|e| IoError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        fs::write(path, content).map_err(|source| IoError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

// ============================================================
// 快照
// ============================================================

/// 已解码并校验的 JSON 快照
#[derive(Debug, Clone)]
pub struct JsonDump {
    path: PathBuf,
    time: Option<f64>,
    num_ghost: usize,
    block_ids: Option<Vec<i64>>,
    ghost: BlockCoords,
    interior: BlockCoords,
    fields: BTreeMap<String, FieldTensor>,
}

impl JsonDump {
    /// 读取并校验快照文件
    pub fn open(path: &Path) -> IoResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| IoError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file: DumpFile = serde_json::from_str(&content).map_err(|e| IoError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_file_data(path, file)
    }

    /// 从内存中的文件内容构建
    pub fn from_file_data(path: &Path, file: DumpFile) -> IoResult<Self> {
        let n_blocks = file.x_faces.len();
        if file.y_faces.len() != n_blocks {
            return Err(IoError::malformed(
                path,
                format!("{} x face rows but {} y face rows", n_blocks, file.y_faces.len()),
            ));
        }
        let x = faces_to_array(&file.x_faces, "x", path)?;
        let y = faces_to_array(&file.y_faces, "y", path)?;
        let nx = x.ncols().saturating_sub(1);
        let ny = y.ncols().saturating_sub(1);

        let ng = file.num_ghost;
        if nx <= 2 * ng || ny <= 2 * ng {
            return Err(IoError::malformed(
                path,
                format!("block of {nx}x{ny} cells cannot hold {ng} ghost cells per side"),
            ));
        }

        if let Some(ids) = &file.block_ids {
            if ids.len() != n_blocks {
                return Err(IoError::malformed(
                    path,
                    format!("{} block ids for {} blocks", ids.len(), n_blocks),
                ));
            }
        }

        let mut fields = BTreeMap::new();
        for (name, record) in file.fields {
            let tensor = record_to_tensor(&name, record, path)?;
            let shape = tensor.shape();
            let rank = shape.len();
            if rank < 3 {
                return Err(IoError::malformed(
                    path,
                    format!("field \"{name}\" has rank {rank}, expected at least 3"),
                ));
            }
            if shape[0] != n_blocks || shape[rank - 2] != ny || shape[rank - 1] != nx {
                return Err(IoError::malformed(
                    path,
                    format!(
                        "field \"{name}\" has shape {:?}, expected ({n_blocks}, .., {ny}, {nx})",
                        shape
                    ),
                ));
            }
            fields.insert(name, tensor);
        }

        let ghost = BlockCoords::new(x, y);
        let interior = ghost.trimmed(ng);

        Ok(Self {
            path: path.to_path_buf(),
            time: file.time,
            num_ghost: ng,
            block_ids: file.block_ids,
            ghost,
            interior,
            fields,
        })
    }

    /// 每侧 ghost 单元数
    pub fn num_ghost(&self) -> usize {
        self.num_ghost
    }
}

fn faces_to_array(rows: &[Vec<f64>], axis: &str, path: &Path) -> IoResult<Array2<f64>> {
    let n_blocks = rows.len();
    if n_blocks == 0 {
        return Err(IoError::malformed(path, "dump contains no blocks"));
    }
    let width = rows[0].len();
    if width < 2 {
        return Err(IoError::malformed(path, format!("{axis} faces need at least 2 entries")));
    }
    if let Some(bad) = rows.iter().position(|r| r.len() != width) {
        return Err(IoError::malformed(
            path,
            format!("block {bad} has {} {axis} faces, expected {width}", rows[bad].len()),
        ));
    }
    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Array2::from_shape_vec((n_blocks, width), flat)
        .map_err(|e| IoError::malformed(path, e.to_string()))
}

fn record_to_tensor(name: &str, record: FieldRecord, path: &Path) -> IoResult<FieldTensor> {
    let expected: usize = record.shape.iter().product();
    if expected != record.data.len() {
        return Err(IoError::malformed(
            path,
            format!(
                "field \"{name}\" declares shape {:?} ({expected} values) but holds {}",
                record.shape,
                record.data.len()
            ),
        ));
    }
    FieldTensor::from_shape_vec(IxDyn(&record.shape), record.data)
        .map_err(|e| IoError::malformed(path, e.to_string()))
}

impl DumpSource for JsonDump {
    fn path(&self) -> &Path {
        &self.path
    }

    fn variables(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    fn field(&self, name: &str, interior: bool) -> IoResult<FieldTensor> {
        let tensor = self.fields.get(name).ok_or_else(|| IoError::FieldNotFound {
            name: name.to_string(),
            path: self.path.clone(),
        })?;
        if interior {
            strip_ghost_cells(tensor, self.num_ghost, &self.path)
        } else {
            Ok(tensor.clone())
        }
    }

    fn coords(&self, framing: Framing) -> BlockCoords {
        match framing {
            Framing::Ghost | Framing::Exterior => self.ghost.clone(),
            Framing::Interior | Framing::NoGhost => self.interior.clone(),
        }
    }

    fn block_ids(&self) -> Option<&[i64]> {
        self.block_ids.as_deref()
    }

    fn time(&self) -> Option<f64> {
        self.time
    }

    fn num_blocks(&self) -> usize {
        self.ghost.num_blocks()
    }
}

/// JSON 快照读取器
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDumpReader;

impl DumpReader for JsonDumpReader {
    type Dump = JsonDump;

    fn open(&self, path: &Path) -> IoResult<JsonDump> {
        tracing::trace!("Reading dump {}", path.display());
        JsonDump::open(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_file() -> DumpFile {
        // 1 个块，含 1 层 ghost，内部 2x2
        let mut fields = BTreeMap::new();
        fields.insert(
            "rho".to_string(),
            FieldRecord {
                shape: vec![1, 4, 4],
                data: (0..16).map(|v| v as f64).collect(),
            },
        );
        DumpFile {
            time: Some(1.5),
            num_ghost: 1,
            block_ids: Some(vec![7]),
            x_faces: vec![vec![-0.5, 0.0, 0.5, 1.0, 1.5]],
            y_faces: vec![vec![-0.5, 0.0, 0.5, 1.0, 1.5]],
            fields,
        }
    }

    #[test]
    fn test_framings() {
        let dump = JsonDump::from_file_data(Path::new("mem"), small_file()).unwrap();
        assert_eq!(dump.coords(Framing::Ghost).x.ncols(), 5);
        assert_eq!(dump.coords(Framing::Exterior), dump.coords(Framing::Ghost));
        let inner = dump.coords(Framing::Interior);
        assert_eq!(inner.x.row(0).to_vec(), vec![0.0, 0.5, 1.0]);
        assert_eq!(dump.coords(Framing::NoGhost), inner);
    }

    #[test]
    fn test_interior_field() {
        let dump = JsonDump::from_file_data(Path::new("mem"), small_file()).unwrap();
        let full = dump.field("rho", false).unwrap();
        assert_eq!(full.shape(), &[1, 4, 4]);
        let inner = dump.field("rho", true).unwrap();
        assert_eq!(inner.shape(), &[1, 2, 2]);
        assert_eq!(inner[[0, 0, 0]], 5.0);
        assert_eq!(inner[[0, 1, 1]], 10.0);
    }

    #[test]
    fn test_metadata() {
        let dump = JsonDump::from_file_data(Path::new("mem"), small_file()).unwrap();
        assert_eq!(dump.time(), Some(1.5));
        assert_eq!(dump.block_ids(), Some(&[7][..]));
        assert_eq!(dump.variables(), vec!["rho"]);
        assert!(dump.has_field("rho"));
        assert!(!dump.has_field("pressure"));
        assert!(matches!(
            dump.field("pressure", true),
            Err(IoError::FieldNotFound { .. })
        ));
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let mut file = small_file();
        file.fields.get_mut("rho").unwrap().shape = vec![1, 4, 3];
        assert!(JsonDump::from_file_data(Path::new("mem"), file).is_err());
    }

    #[test]
    fn test_ragged_faces_rejected() {
        let mut file = small_file();
        file.x_faces.push(vec![0.0, 1.0]);
        file.y_faces.push(vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        let err = JsonDump::from_file_data(Path::new("mem"), file).unwrap_err();
        assert!(matches!(err, IoError::Malformed { .. }));
    }

    #[test]
    fn test_save_and_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.00000.json");
        small_file().save(&path).unwrap();
        let dump = JsonDumpReader.open(&path).unwrap();
        assert_eq!(dump.path(), path.as_path());
        assert_eq!(dump.num_blocks(), 1);
    }

    #[test]
    fn test_save_and_open_keeps_non_finite_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.00001.json");
        let mut file = small_file();
        let rho = file.fields.get_mut("rho").unwrap();
        rho.data[5] = f64::NAN;
        rho.data[6] = f64::INFINITY;
        file.save(&path).unwrap();

        let dump = JsonDumpReader.open(&path).unwrap();
        let inner = dump.field("rho", true).unwrap();
        assert!(inner[[0, 0, 0]].is_nan());
        assert_eq!(inner[[0, 0, 1]], f64::INFINITY);
        assert_eq!(inner[[0, 1, 1]], 10.0);
    }

    #[test]
    fn test_missing_file() {
        let err = JsonDump::open(Path::new("/nonexistent/dump.json")).unwrap_err();
        assert!(matches!(err, IoError::Read { .. }));
    }
}

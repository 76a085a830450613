// crates/av_io/src/dump/float_codec.rs

//! 非有限浮点数的 JSON 编解码
//!
//! JSON 没有 NaN 与无穷大，serde_json 会把它们写成 `null` 且无法读回 `f64`。
//! 这里把非有限值写成字符串 `"NaN"`、`"inf"`、`"-inf"`；读取时接受这些字符串，
//! `null` 按 NaN 处理。
//!
//! 以 `#[serde(with = "...")]` 方式用在快照文件与渲染任务的数值字段上：
//!
//! - [`vec`]: `Vec<f64>`
//! - [`nested`]: `Vec<Vec<f64>>`
//! - [`array2`]: `Array2<f64>`，按行嵌套
//! - [`tensor`]: `ArrayD<f64>`，`{ "shape": [...], "data": [...] }`

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

const NAN: &str = "NaN";
const POS_INF: &str = "inf";
const NEG_INF: &str = "-inf";

/// 可无损往返 JSON 的 `f64`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JsonFloat(pub f64);

impl Serialize for JsonFloat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let v = self.0;
        if v.is_finite() {
            serializer.serialize_f64(v)
        } else if v.is_nan() {
            serializer.serialize_str(NAN)
        } else if v > 0.0 {
            serializer.serialize_str(POS_INF)
        } else {
            serializer.serialize_str(NEG_INF)
        }
    }
}

fn parse_special(text: &str) -> Option<f64> {
    match text.trim().to_ascii_lowercase().as_str() {
        "nan" => Some(f64::NAN),
        "inf" | "+inf" | "infinity" => Some(f64::INFINITY),
        "-inf" | "-infinity" => Some(f64::NEG_INFINITY),
        _ => None,
    }
}

struct JsonFloatVisitor;

impl<'de> Visitor<'de> for JsonFloatVisitor {
    type Value = JsonFloat;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number, \"NaN\", \"inf\", \"-inf\" or null")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<JsonFloat, E> {
        Ok(JsonFloat(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<JsonFloat, E> {
        Ok(JsonFloat(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<JsonFloat, E> {
        Ok(JsonFloat(v as f64))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<JsonFloat, E> {
        match parse_special(v) {
            Some(x) => Ok(JsonFloat(x)),
            None => Err(E::invalid_value(de::Unexpected::Str(v), &self)),
        }
    }

    fn visit_unit<E: de::Error>(self) -> Result<JsonFloat, E> {
        Ok(JsonFloat(f64::NAN))
    }

    fn visit_none<E: de::Error>(self) -> Result<JsonFloat, E> {
        Ok(JsonFloat(f64::NAN))
    }
}

impl<'de> Deserialize<'de> for JsonFloat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(JsonFloatVisitor)
    }
}

fn unwrap_all(values: Vec<JsonFloat>) -> Vec<f64> {
    values.into_iter().map(|v| v.0).collect()
}

/// `Vec<f64>`
pub mod vec {
    use super::*;

    /// 序列化
    pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(values.iter().map(|&v| JsonFloat(v)))
    }

    /// 反序列化
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        Vec::<JsonFloat>::deserialize(deserializer).map(unwrap_all)
    }
}

/// `Vec<Vec<f64>>`
pub mod nested {
    use super::*;

    struct Row<'a>(&'a [f64]);

    impl Serialize for Row<'_> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            super::vec::serialize(self.0, serializer)
        }
    }

    /// 序列化
    pub fn serialize<S: Serializer>(rows: &[Vec<f64>], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(rows.iter().map(|r| Row(r.as_slice())))
    }

    /// 反序列化
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Vec<f64>>, D::Error> {
        let rows = Vec::<Vec<JsonFloat>>::deserialize(deserializer)?;
        Ok(rows.into_iter().map(unwrap_all).collect())
    }
}

/// `Array2<f64>`，按行嵌套
pub mod array2 {
    use super::*;
    use ndarray::Array2;

    /// 序列化
    pub fn serialize<S: Serializer>(array: &Array2<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        let rows: Vec<Vec<f64>> = array.rows().into_iter().map(|r| r.to_vec()).collect();
        super::nested::serialize(&rows, serializer)
    }

    /// 反序列化
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Array2<f64>, D::Error> {
        let rows = super::nested::deserialize(deserializer)?;
        let ncols = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().position(|r| r.len() != ncols) {
            return Err(de::Error::custom(format!(
                "row {bad} has {} values, expected {ncols}",
                rows[bad].len()
            )));
        }
        let nrows = rows.len();
        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        Array2::from_shape_vec((nrows, ncols), flat).map_err(de::Error::custom)
    }
}

/// `ArrayD<f64>`，`{ "shape": [...], "data": [...] }`，数据按行主序
pub mod tensor {
    use super::*;
    use ndarray::{ArrayD, IxDyn};

    #[derive(Serialize)]
    struct TensorRef<'a> {
        shape: &'a [usize],
        #[serde(with = "crate::dump::float_codec::vec")]
        data: Vec<f64>,
    }

    #[derive(Deserialize)]
    struct TensorOwned {
        shape: Vec<usize>,
        #[serde(with = "crate::dump::float_codec::vec")]
        data: Vec<f64>,
    }

    /// 序列化
    pub fn serialize<S: Serializer>(tensor: &ArrayD<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        TensorRef {
            shape: tensor.shape(),
            data: tensor.iter().copied().collect(),
        }
        .serialize(serializer)
    }

    /// 反序列化
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ArrayD<f64>, D::Error> {
        let raw = TensorOwned::deserialize(deserializer)?;
        ArrayD::from_shape_vec(IxDyn(&raw.shape), raw.data).map_err(de::Error::custom)
    }
}

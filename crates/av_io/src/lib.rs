// crates/av_io/src/lib.rs

//! AmrView IO 模块
//!
//! 提供快照读取与数值表导入功能。
//!
//! # 模块
//!
//! - [`dump`]: 块结构快照能力接口与 JSON 驱动
//! - [`table`]: 空白分隔的数值文本表
//! - [`error`]: IO 错误类型
//!
//! # 使用示例
//!
//! ```rust,ignore
//! use av_io::dump::{DumpReader, DumpSource, Framing};
//! use av_io::JsonDumpReader;
//!
//! let dump = JsonDumpReader.open(Path::new("run/dump.00010.json"))?;
//! let rho = dump.field("density", true)?;
//! let coords = dump.coords(Framing::NoGhost);
//! ```

pub mod dump;
pub mod error;
pub mod table;

pub use dump::builder::DumpBuilder;
pub use dump::json::{DumpFile, FieldRecord, JsonDump, JsonDumpReader};
pub use dump::{BlockCoords, DumpReader, DumpSource, FieldTensor, Framing};
pub use error::{IoError, IoResult};
pub use table::{load_table, parse_table, save_table};

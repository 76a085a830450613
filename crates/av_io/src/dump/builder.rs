// crates/av_io/src/dump/builder.rs

//! 合成快照构建器
//!
//! 在单位正方形上按 `blocks_x × blocks_y` 均匀铺设块，每块 `cells × cells`
//! 个内部单元，外加每侧 `num_ghost` 层 ghost 单元。场值由闭包在单元中心
//! （含 ghost 区）计算。用于测试夹具与演示数据。
//!
//! ```
//! use av_io::dump::builder::DumpBuilder;
//!
//! let file = DumpBuilder::new(2, 1, 4)
//!     .with_ghost(1)
//!     .with_time(0.25)
//!     .scalar("density", |x, y| x + y)
//!     .build();
//! assert_eq!(file.x_faces.len(), 2);
//! assert_eq!(file.fields["density"].shape, vec![2, 6, 6]);
//! ```

use std::collections::BTreeMap;

use super::json::{DumpFile, FieldRecord};

/// 合成快照构建器
#[derive(Debug, Clone)]
pub struct DumpBuilder {
    blocks_x: usize,
    blocks_y: usize,
    cells: usize,
    num_ghost: usize,
    time: Option<f64>,
    block_ids: bool,
    fields: BTreeMap<String, FieldRecord>,
}

impl DumpBuilder {
    /// 创建构建器
    ///
    /// 块数与每块单元数至少为 1。
    pub fn new(blocks_x: usize, blocks_y: usize, cells: usize) -> Self {
        Self {
            blocks_x: blocks_x.max(1),
            blocks_y: blocks_y.max(1),
            cells: cells.max(1),
            num_ghost: 0,
            time: None,
            block_ids: true,
            fields: BTreeMap::new(),
        }
    }

    /// 设置 ghost 层数
    pub fn with_ghost(mut self, num_ghost: usize) -> Self {
        self.num_ghost = num_ghost;
        self
    }

    /// 设置模拟时间
    pub fn with_time(mut self, time: f64) -> Self {
        self.time = Some(time);
        self
    }

    /// 不写入块编号
    pub fn without_block_ids(mut self) -> Self {
        self.block_ids = false;
        self
    }

    /// 块总数
    pub fn num_blocks(&self) -> usize {
        self.blocks_x * self.blocks_y
    }

    fn total_cells(&self) -> usize {
        self.cells + 2 * self.num_ghost
    }

    fn spacing(&self) -> (f64, f64) {
        (
            1.0 / (self.blocks_x * self.cells) as f64,
            1.0 / (self.blocks_y * self.cells) as f64,
        )
    }

    /// 第 `b` 块的 `(bx, by)` 位置
    fn block_position(&self, b: usize) -> (usize, usize) {
        (b % self.blocks_x, b / self.blocks_x)
    }

    /// 含 ghost 区的面坐标
    fn faces(&self, origin: f64, h: f64) -> Vec<f64> {
        let ng = self.num_ghost as f64;
        (0..=self.total_cells())
            .map(|i| origin + (i as f64 - ng) * h)
            .collect()
    }

    /// 对每个块、每个单元中心调用 `f(x, y)`，按 `(y, x)` 行主序写出
    fn sample(&self, b: usize, mut f: impl FnMut(f64, f64) -> f64, out: &mut Vec<f64>) {
        let (dx, dy) = self.spacing();
        let (bx, by) = self.block_position(b);
        let xs = self.faces(bx as f64 * self.cells as f64 * dx, dx);
        let ys = self.faces(by as f64 * self.cells as f64 * dy, dy);
        for j in 0..self.total_cells() {
            let yc = 0.5 * (ys[j] + ys[j + 1]);
            for i in 0..self.total_cells() {
                let xc = 0.5 * (xs[i] + xs[i + 1]);
                out.push(f(xc, yc));
            }
        }
    }

    /// 添加标量场 `(block, y, x)`
    pub fn scalar(mut self, name: &str, f: impl Fn(f64, f64) -> f64) -> Self {
        let n = self.total_cells();
        let mut data = Vec::with_capacity(self.num_blocks() * n * n);
        for b in 0..self.num_blocks() {
            self.sample(b, &f, &mut data);
        }
        self.fields.insert(
            name.to_string(),
            FieldRecord {
                shape: vec![self.num_blocks(), n, n],
                data,
            },
        );
        self
    }

    /// 添加矢量场 `(block, c, y, x)`，`f(c, x, y)`
    pub fn vector(mut self, name: &str, components: usize, f: impl Fn(usize, f64, f64) -> f64) -> Self {
        let n = self.total_cells();
        let mut data = Vec::with_capacity(self.num_blocks() * components * n * n);
        for b in 0..self.num_blocks() {
            for c in 0..components {
                self.sample(b, |x, y| f(c, x, y), &mut data);
            }
        }
        self.fields.insert(
            name.to_string(),
            FieldRecord {
                shape: vec![self.num_blocks(), components, n, n],
                data,
            },
        );
        self
    }

    /// 添加张量场 `(block, c1, c2, y, x)`，`f(c1, c2, x, y)`
    pub fn tensor(
        mut self,
        name: &str,
        dims: [usize; 2],
        f: impl Fn(usize, usize, f64, f64) -> f64,
    ) -> Self {
        let n = self.total_cells();
        let mut data = Vec::with_capacity(self.num_blocks() * dims[0] * dims[1] * n * n);
        for b in 0..self.num_blocks() {
            for c1 in 0..dims[0] {
                for c2 in 0..dims[1] {
                    self.sample(b, |x, y| f(c1, c2, x, y), &mut data);
                }
            }
        }
        self.fields.insert(
            name.to_string(),
            FieldRecord {
                shape: vec![self.num_blocks(), dims[0], dims[1], n, n],
                data,
            },
        );
        self
    }

    /// 直接添加原始记录
    pub fn raw(mut self, name: &str, record: FieldRecord) -> Self {
        self.fields.insert(name.to_string(), record);
        self
    }

    /// 生成快照文件内容
    pub fn build(self) -> DumpFile {
        let (dx, dy) = self.spacing();
        let nb = self.num_blocks();
        let mut x_faces = Vec::with_capacity(nb);
        let mut y_faces = Vec::with_capacity(nb);
        for b in 0..nb {
            let (bx, by) = self.block_position(b);
            x_faces.push(self.faces(bx as f64 * self.cells as f64 * dx, dx));
            y_faces.push(self.faces(by as f64 * self.cells as f64 * dy, dy));
        }
        DumpFile {
            time: self.time,
            num_ghost: self.num_ghost,
            block_ids: self.block_ids.then(|| (0..nb as i64).collect()),
            x_faces,
            y_faces,
            fields: self.fields,
        }
    }
}

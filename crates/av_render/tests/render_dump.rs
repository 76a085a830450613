// crates/av_render/tests/render_dump.rs

//! 从快照到图像的端到端渲染测试

use av_config::ComponentSpec;
use av_io::{DumpBuilder, DumpSource, Framing, JsonDump};
use av_render::{reduce, render, RenderStyle, RenderTask};
use std::path::Path;

fn dump() -> JsonDump {
    let file = DumpBuilder::new(2, 2, 4)
        .with_ghost(1)
        .with_time(0.5)
        .vector("velocity", 2, |c, x, y| if c == 0 { x } else { (x * y).sin() })
        .build();
    JsonDump::from_file_data(Path::new("mem.json"), file).unwrap()
}

#[test]
fn test_interior_render_writes_png() {
    let dump = dump();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("vel_0000.png");

    let q = reduce(&dump.field("velocity", true).unwrap(), ComponentSpec::vector(1)).unwrap();
    let mut task = RenderTask::new(0, q.into_dyn(), dump.coords(Framing::NoGhost), &out);
    task.time_label = Some(0.5);
    task.style = RenderStyle::default().with_size(320, 240);

    render(&task).unwrap();
    let img = image::open(&out).unwrap();
    assert_eq!((img.width(), img.height()), (320, 240));
}

#[test]
fn test_debug_framing_render() {
    let dump = dump();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("vel_0001.png");

    // ghost 框架 + 含 ghost 区数据，交由渲染器归约
    let mut task = RenderTask::new(
        1,
        dump.field("velocity", false).unwrap(),
        dump.coords(Framing::Ghost),
        &out,
    );
    task.components = ComponentSpec::vector(0);
    task.mesh = true;
    task.block_ids = dump.block_ids().map(<[i64]>::to_vec);
    task.interior = Some(dump.coords(Framing::Interior));
    task.exterior = Some(dump.coords(Framing::Exterior));
    task.style = RenderStyle::default().with_size(320, 240);

    render(&task).unwrap();
    assert!(out.exists());
}

#[test]
fn test_task_survives_json_transport() {
    let dump = dump();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("vel_0002.png");

    let mut task = RenderTask::new(
        2,
        dump.field("velocity", true).unwrap(),
        dump.coords(Framing::NoGhost),
        &out,
    );
    task.components = ComponentSpec::vector(1);
    task.style = RenderStyle::default().with_size(160, 120);

    let shipped = RenderTask::from_json(&task.to_json().unwrap()).unwrap();
    render(&shipped).unwrap();
    assert!(out.exists());
}

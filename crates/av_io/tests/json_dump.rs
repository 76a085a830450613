// crates/av_io/tests/json_dump.rs

//! JSON 快照驱动集成测试

use av_io::{DumpBuilder, DumpReader, DumpSource, Framing, IoError, JsonDumpReader};

#[test]
fn test_written_dump_reads_back_all_framings() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sedov.00002.json");

    DumpBuilder::new(3, 2, 4)
        .with_ghost(2)
        .with_time(0.2)
        .scalar("pressure", |x, y| x * y)
        .build()
        .save(&path)
        .unwrap();

    let dump = JsonDumpReader.open(&path).unwrap();
    assert_eq!(dump.num_blocks(), 6);
    assert_eq!(dump.time(), Some(0.2));
    assert_eq!(dump.block_ids().map(|ids| ids.len()), Some(6));

    for framing in Framing::ALL {
        let coords = dump.coords(framing);
        assert_eq!(coords.num_blocks(), 6);
    }
    assert_eq!(dump.coords(Framing::Ghost).x.ncols(), 9);
    assert_eq!(dump.coords(Framing::NoGhost).x.ncols(), 5);

    let ghost = dump.field("pressure", false).unwrap();
    let interior = dump.field("pressure", true).unwrap();
    assert_eq!(ghost.shape(), &[6, 8, 8]);
    assert_eq!(interior.shape(), &[6, 4, 4]);
    assert_eq!(interior[[4, 0, 0]], ghost[[4, 2, 2]]);
}

#[test]
fn test_interior_block_bounds_tile_unit_square() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tile.json");
    DumpBuilder::new(2, 2, 3)
        .with_ghost(1)
        .scalar("rho", |_, _| 1.0)
        .build()
        .save(&path)
        .unwrap();

    let dump = JsonDumpReader.open(&path).unwrap();
    let coords = dump.coords(Framing::Interior);
    let (x0, x1, y0, y1) = coords.bounds(3);
    assert!((x0 - 0.5).abs() < 1e-12);
    assert!((x1 - 1.0).abs() < 1e-12);
    assert!((y0 - 0.5).abs() < 1e-12);
    assert!((y1 - 1.0).abs() < 1e-12);
}

#[test]
fn test_garbage_file_is_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(matches!(
        JsonDumpReader.open(&path),
        Err(IoError::Decode { .. })
    ));
}

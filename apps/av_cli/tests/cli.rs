// apps/av_cli/tests/cli.rs

//! 命令行端到端测试

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use av_io::DumpBuilder;

fn av_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_av_cli"))
        .args(args)
        .output()
        .unwrap()
}

fn write_dumps(dir: &Path, count: usize) -> Vec<PathBuf> {
    (0..count)
        .map(|i| {
            let path = dir.join(format!("sedov.{i:05}.json"));
            DumpBuilder::new(2, 1, 4)
                .with_ghost(1)
                .with_time(i as f64 * 0.1)
                .scalar("density", move |x, y| x + y + i as f64)
                .vector("velocity", 2, |c, x, y| if c == 0 { x } else { y })
                .build()
                .save(&path)
                .unwrap();
            path
        })
        .collect()
}

fn pngs(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".png"))
        .collect();
    names.sort();
    names
}

#[test]
fn test_movie_with_process_workers() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("frames");
    let files = write_dumps(dir.path(), 3);

    let mut args = vec!["movie", "density"];
    let paths: Vec<String> = files.iter().map(|p| p.display().to_string()).collect();
    args.extend(paths.iter().map(String::as_str));
    let out_str = out.display().to_string();
    args.extend(["-d", out_str.as_str(), "--prefix", "sedov", "-w", "2", "--width", "96", "--height", "72"]);

    let output = av_cli(&args);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(pngs(&out), vec!["sedov_0000.png", "sedov_0001.png", "sedov_0002.png"]);

    let img = image::open(out.join("sedov_0001.png")).unwrap();
    assert_eq!((img.width(), img.height()), (96, 72));
}

#[test]
fn test_movie_process_workers_mask_nan_cells() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("frames");
    let dump = dir.path().join("blast.00000.json");
    DumpBuilder::new(2, 1, 4)
        .with_ghost(1)
        .scalar("pressure", |x, y| if x < 0.25 { f64::NAN } else if y > 0.75 { f64::INFINITY } else { x * y })
        .build()
        .save(&dump)
        .unwrap();

    let dump_str = dump.display().to_string();
    let out_str = out.display().to_string();
    let output = av_cli(&[
        "movie", "pressure", dump_str.as_str(), "-d", out_str.as_str(), "--prefix", "blast",
        "--worker-type", "process", "-w", "1", "--width", "64", "--height", "48",
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(pngs(&out), vec!["blast_0000.png"]);
}

#[test]
fn test_movie_thread_workers_vector_component() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("frames");
    let files = write_dumps(dir.path(), 2);
    let out_str = out.display().to_string();

    let output = av_cli(&[
        "movie",
        "velocity",
        &files[0].display().to_string(),
        &files[1].display().to_string(),
        "--vector-component",
        "1",
        "--worker-type",
        "thread",
        "-d",
        &out_str,
        "--prefix",
        "",
        "--width",
        "64",
        "--height",
        "48",
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(pngs(&out), vec!["0000.png", "0001.png"]);
}

#[test]
fn test_movie_rejects_both_components() {
    let output = av_cli(&[
        "movie",
        "velocity",
        "a.json",
        "--vector-component",
        "0",
        "--tensor-component",
        "0",
        "1",
    ]);
    assert!(!output.status.success());
}

#[test]
fn test_component_out_of_range_fails() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("frames");
    let files = write_dumps(dir.path(), 1);
    let out_str = out.display().to_string();

    let output = av_cli(&[
        "movie",
        "velocity",
        &files[0].display().to_string(),
        "--vector-component",
        "5",
        "-d",
        &out_str,
    ]);
    assert!(!output.status.success());
    assert!(pngs(&out).is_empty());
}

#[test]
fn test_render_task_rejects_garbage() {
    use std::io::Write;
    use std::process::Stdio;

    let mut child = Command::new(env!("CARGO_BIN_EXE_av_cli"))
        .arg("render-task")
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(b"{not json").unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(!output.status.success());
    assert!(!output.stderr.is_empty());
}

#[test]
fn test_diff_exit_codes() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.hst");
    let b = dir.path().join("b.hst");
    fs::write(&a, "# t e\n0.0 1.0\n").unwrap();
    fs::write(&b, "# t e\n0.0 1.0002\n").unwrap();
    let (a, b) = (a.display().to_string(), b.display().to_string());

    let flagged = av_cli(&["diff", &a, &b, "-t", "1e-4"]);
    assert_eq!(flagged.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&flagged.stdout);
    assert!(stdout.starts_with("Diffs found!"));
    assert!(stdout.contains("Diff locations (row, column) = [(0, 1)]"));

    let clean = av_cli(&["diff", &a, &b, "-t", "2e-4"]);
    assert!(clean.status.success());
    assert_eq!(String::from_utf8_lossy(&clean.stdout), "No diffs found!\n");

    let json = av_cli(&["diff", &a, &b, "-t", "1e-4", "--format", "json"]);
    let v: serde_json::Value = serde_json::from_slice(&json.stdout).unwrap();
    assert_eq!(v["diffs"][0]["column"], 1);
}

#[test]
fn test_info_lists_fields() {
    let dir = tempfile::tempdir().unwrap();
    let files = write_dumps(dir.path(), 1);
    let output = av_cli(&["info", &files[0].display().to_string()]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("块数: 2"));
    assert!(stdout.contains("density"));
    assert!(stdout.contains("vector"));
}

#![deny(warnings)]
#![warn(clippy::pedantic)]

use std::time::{Duration, Instant};

use loadbench::lib_io::{write_burst, write_chunked, write_mixed_cpu};

#[test]
fn chunked_write_produces_exact_size() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("chunks");
    let file = std::fs::File::create(&path).expect("create");
    write_chunked(&file, 1_000_000, 4).expect("write");
    let len = std::fs::metadata(&path).expect("metadata").len();
    assert_eq!(len, 4_000_000);
}

#[test]
fn burst_removes_its_scratch_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let start = Instant::now();
    write_burst(dir.path(), 100_000, 2, Duration::from_millis(100)).expect("ok");
    assert!(start.elapsed() >= Duration::from_millis(100));
    assert_eq!(std::fs::read_dir(dir.path()).expect("read dir").count(), 0);
}

#[test]
fn mixed_cpu_spins_between_rewrites() {
    let dir = tempfile::tempdir().expect("tempdir");
    let start = Instant::now();
    write_mixed_cpu(dir.path(), 4096, 2, 2, Duration::from_millis(200)).expect("ok");
    assert!(start.elapsed() >= Duration::from_millis(200));
    assert_eq!(std::fs::read_dir(dir.path()).expect("read dir").count(), 0);
}

#[test]
fn mixed_cpu_rejects_zero_rounds() {
    let dir = tempfile::tempdir().expect("tempdir");
    let res = write_mixed_cpu(dir.path(), 4096, 1, 0, Duration::from_millis(10));
    assert!(res.is_err());
}

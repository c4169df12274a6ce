#[path = "utils.rs"]
mod utils;

use mmapfs::{FileIo, FsError, Namespace, Whence, BLOCK, FD_MAX};

#[test]
fn write_then_read_back_round_trips() {
    let path = utils::disk_prep_path("file-io-write-then-read", "img");
    let mut fs = utils::disk_setup(&path);

    let root = fs.root_dir().unwrap();
    let file = fs.create_file(root, "notes.txt").unwrap();

    let fd = fs.open_file(file).unwrap();
    let written = fs.write(fd, b"hello, filesystem").unwrap();
    assert_eq!(written, 18);

    fs.seek(fd, 0, Whence::Set).unwrap();
    let mut buf = [0u8; 18];
    let read = fs.read(fd, &mut buf).unwrap();
    assert_eq!(read, 18);
    assert_eq!(&buf, b"hello, filesystem");

    fs.close_file(fd).unwrap();
    utils::disk_destruct(fs);
}

#[test]
fn reading_past_eof_returns_zero_without_error() {
    let path = utils::disk_prep_path("file-io-read-past-eof", "img");
    let mut fs = utils::disk_setup(&path);

    let root = fs.root_dir().unwrap();
    let file = fs.create_file(root, "empty.txt").unwrap();
    let fd = fs.open_file(file).unwrap();

    let mut buf = [0u8; 16];
    assert_eq!(fs.read(fd, &mut buf).unwrap(), 0);

    fs.write(fd, b"abc").unwrap();
    fs.seek(fd, 3, Whence::Set).unwrap();
    assert_eq!(fs.read(fd, &mut buf).unwrap(), 0);

    utils::disk_destruct(fs);
}

#[test]
fn write_spanning_many_data_blocks_round_trips() {
    let path = utils::disk_prep_path("file-io-multi-block-write", "img");
    let mut fs = utils::disk_setup(&path);

    let root = fs.root_dir().unwrap();
    let file = fs.create_file(root, "big.bin").unwrap();
    let fd = fs.open_file(file).unwrap();

    // Comfortably larger than a handful of blocks, so the write has to
    // chase and extend the data-block chain more than once.
    let payload: Vec<u8> = (0..(BLOCK * 3 + 17))
        .map(|i| (i % 251) as u8)
        .collect();
    assert_eq!(fs.write(fd, &payload).unwrap(), payload.len());

    fs.seek(fd, 0, Whence::Set).unwrap();
    let mut readback = vec![0u8; payload.len()];
    assert_eq!(fs.read(fd, &mut readback).unwrap(), payload.len());
    assert_eq!(readback, payload);

    utils::disk_destruct(fs);
}

#[test]
fn writing_at_a_cursor_past_the_end_extends_the_file_with_a_gap() {
    let path = utils::disk_prep_path("file-io-write-gap", "img");
    let mut fs = utils::disk_setup(&path);

    let root = fs.root_dir().unwrap();
    let file = fs.create_file(root, "sparse.bin").unwrap();
    let fd = fs.open_file(file).unwrap();

    fs.write(fd, b"abc").unwrap();
    fs.seek(fd, 10, Whence::Set).unwrap();
    fs.write(fd, b"xyz").unwrap();

    fs.seek(fd, 0, Whence::Set).unwrap();
    let mut buf = [0u8; 13];
    assert_eq!(fs.read(fd, &mut buf).unwrap(), 13);
    assert_eq!(&buf[0..3], b"abc");
    assert_eq!(&buf[10..13], b"xyz");

    utils::disk_destruct(fs);
}

#[test]
fn seek_before_the_start_of_the_file_is_rejected() {
    let path = utils::disk_prep_path("file-io-seek-negative", "img");
    let mut fs = utils::disk_setup(&path);

    let root = fs.root_dir().unwrap();
    let file = fs.create_file(root, "f.bin").unwrap();
    let fd = fs.open_file(file).unwrap();

    let err = fs.seek(fd, -1, Whence::Set).unwrap_err();
    assert!(matches!(err, FsError::InvalidSeek));

    utils::disk_destruct(fs);
}

#[test]
fn a_closed_handle_cannot_be_used() {
    let path = utils::disk_prep_path("file-io-closed-handle", "img");
    let mut fs = utils::disk_setup(&path);

    let root = fs.root_dir().unwrap();
    let file = fs.create_file(root, "f.bin").unwrap();
    let fd = fs.open_file(file).unwrap();
    fs.close_file(fd).unwrap();

    let mut buf = [0u8; 4];
    assert!(matches!(fs.read(fd, &mut buf), Err(FsError::BadHandle)));

    utils::disk_destruct(fs);
}

#[test]
fn the_handle_table_runs_out_and_reuses_the_lowest_freed_index() {
    let path = utils::disk_prep_path("file-io-handle-exhaustion", "img");
    let mut fs = utils::disk_setup(&path);

    let root = fs.root_dir().unwrap();
    let file = fs.create_file(root, "shared.bin").unwrap();

    let mut fds = Vec::with_capacity(FD_MAX);
    for _ in 0..FD_MAX {
        fds.push(fs.open_file(file).unwrap());
    }
    assert!(matches!(fs.open_file(file), Err(FsError::TooManyOpen)));

    fs.close_file(fds[3]).unwrap();
    assert_eq!(fs.open_file(file).unwrap(), fds[3]);

    utils::disk_destruct(fs);
}

#[test]
fn opening_a_directory_as_a_file_fails() {
    let path = utils::disk_prep_path("file-io-open-dir", "img");
    let mut fs = utils::disk_setup(&path);

    let root = fs.root_dir().unwrap();
    let dir = fs.create_dir(root, "subdir").unwrap();
    assert!(matches!(fs.open_file(dir), Err(FsError::NotAFile)));

    utils::disk_destruct(fs);
}

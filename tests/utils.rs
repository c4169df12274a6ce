#![allow(dead_code)]

// General testing utilities shared across the integration test files.
use mmapfs::Mapper;
use std::fs::{create_dir_all, remove_dir, remove_file};
use std::path::{Path, PathBuf};

// Create the directories leading up to `img_name`, rooted at the crate
// root, and remove `img_name` first if a previous run left it behind, so
// every test starts from a fresh disk image.
pub fn disk_prep_path(name: &str, img_name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("fs-images");
    path.push(name);
    path.push(img_name);

    if path.exists() {
        remove_file(&path).unwrap();
    }
    {
        let prefix = path.parent().unwrap();
        create_dir_all(prefix).unwrap();
    }

    path
}

// Undo the directory creation from `disk_prep_path`, including its parent.
pub fn disk_unprep_path(path: &Path) {
    if path.exists() {
        remove_file(path).unwrap();
    }
    let parent = path.parent().unwrap();
    let _ = remove_dir(parent); // only succeeds if empty; fine either way
}

// Open a fresh filesystem image at `path`.
pub fn disk_setup(path: &Path) -> Mapper {
    Mapper::open_store(path).unwrap()
}

// Drop the mapper and clean up the files it left behind.
pub fn disk_destruct(fs: Mapper) {
    let path = fs.path().to_owned();
    drop(fs);
    disk_unprep_path(&path);
}

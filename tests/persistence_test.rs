#[path = "utils.rs"]
mod utils;

use mmapfs::{FileIo, Mapper, Namespace, Whence};

#[test]
fn contents_survive_closing_and_reopening_the_store() {
    let path = utils::disk_prep_path("persistence-reopen", "img");

    {
        let mut fs = utils::disk_setup(&path);
        let root = fs.root_dir().unwrap();
        let dir = fs.create_dir(root, "letters").unwrap();
        let file = fs.create_file(dir, "a.txt").unwrap();
        let fd = fs.open_file(file).unwrap();
        fs.write(fd, b"persisted").unwrap();
        fs.close_store().unwrap();
    }

    let mut fs = Mapper::open_store(&path).unwrap();
    let root = fs.root_dir().unwrap();
    let file = fs
        .resolve(root, "letters/a.txt")
        .unwrap()
        .expect("path survives a reopen");

    let fd = fs.open_file(file).unwrap();
    fs.seek(fd, 0, Whence::Set).unwrap();
    let mut buf = [0u8; 9];
    fs.read(fd, &mut buf).unwrap();
    assert_eq!(&buf, b"persisted");

    utils::disk_destruct(fs);
}

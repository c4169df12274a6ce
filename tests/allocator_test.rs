#[path = "utils.rs"]
mod utils;

use mmapfs::{BlockAllocator, NodeAllocator};

#[test]
fn freed_blocks_are_reused_before_the_store_grows_again() {
    let path = utils::disk_prep_path("allocator-block-reuse", "img");
    let mut fs = utils::disk_setup(&path);

    let a = fs.alloc_block().unwrap();
    let b = fs.alloc_block().unwrap();
    fs.free_block(b).unwrap();
    fs.free_block(a).unwrap();

    // The free list is LIFO: the most recently freed block comes back
    // first.
    assert_eq!(fs.alloc_block().unwrap(), a);
    assert_eq!(fs.alloc_block().unwrap(), b);

    utils::disk_destruct(fs);
}

#[test]
fn freed_nodes_are_reused_before_a_new_node_block_is_allocated() {
    let path = utils::disk_prep_path("allocator-node-reuse", "img");
    let mut fs = utils::disk_setup(&path);

    let n1 = fs.alloc_node().unwrap();
    let n2 = fs.alloc_node().unwrap();
    fs.free_node(n2).unwrap();

    assert_eq!(fs.alloc_node().unwrap(), n2);

    fs.free_node(n1).unwrap();
    fs.free_node(n2).unwrap();
    assert_eq!(fs.alloc_node().unwrap(), n2);
    assert_eq!(fs.alloc_node().unwrap(), n1);

    utils::disk_destruct(fs);
}

#[test]
fn node_allocation_grows_past_one_block_worth_of_slots() {
    let path = utils::disk_prep_path("allocator-node-block-growth", "img");
    let mut fs = utils::disk_setup(&path);

    // One node block plus the root directory's own slot is not very many
    // slots; allocate comfortably more than that to force a second node
    // block to be chained in.
    let mut offsets = Vec::new();
    for _ in 0..500 {
        offsets.push(fs.alloc_node().unwrap());
    }
    offsets.sort_unstable();
    offsets.dedup();
    assert_eq!(offsets.len(), 500);

    utils::disk_destruct(fs);
}

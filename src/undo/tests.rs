//! Tests for the undo slab log

use super::*;

fn add(log: &mut UndoLog, pos: usize, len: usize) {
    log.record_add(pos, len, 0);
}

fn del(log: &mut UndoLog, pos: usize, data: &[u8], backward: bool) {
    log.record_del(pos, data, 0, backward);
}

#[test]
fn typed_run_coalesces_up_to_cap() {
    let mut log = UndoLog::new();
    for i in 0..40 {
        add(&mut log, i, 1);
    }
    log.begin_read();
    // 40 single-byte Adds merge into ceil(40/35) = 2 blocks
    let first = log.next_run().unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].len, 5);
    assert_eq!(first[0].pos, 35);
    let second = log.next_run().unwrap();
    assert_eq!(second[0].len, 35);
    assert_eq!(second[0].pos, 0);
    assert!(log.next_run().is_none());
}

#[test]
fn non_adjacent_adds_do_not_merge() {
    let mut log = UndoLog::new();
    add(&mut log, 0, 3);
    add(&mut log, 10, 1);
    log.begin_read();
    assert_eq!(log.next_run().unwrap()[0].pos, 10);
    assert_eq!(log.next_run().unwrap()[0].pos, 0);
}

#[test]
fn chunk_blocks_never_coalesce() {
    let mut log = UndoLog::new();
    log.record_add(0, 3, flags::CHUNK);
    log.record_add(3, 3, 0);
    log.begin_read();
    assert_eq!(log.next_run().unwrap()[0].pos, 3);
    assert_eq!(log.next_run().unwrap()[0].pos, 0);
}

#[test]
fn forward_deletes_append() {
    let mut log = UndoLog::new();
    del(&mut log, 4, b"on", false);
    del(&mut log, 4, b"e ", false);
    log.begin_read();
    let run = log.next_run().unwrap();
    assert_eq!(run.len(), 1);
    assert_eq!(run[0].pos, 4);
    assert_eq!(run[0].data, b"one ");
}

#[test]
fn backward_deletes_prepend() {
    let mut log = UndoLog::new();
    del(&mut log, 4, b"wo", true);
    del(&mut log, 2, b"t ", true);
    log.begin_read();
    let run = log.next_run().unwrap();
    assert_eq!(run.len(), 1);
    assert_eq!(run[0].pos, 2);
    assert_eq!(run[0].data, b"t wo");
}

#[test]
fn firstmod_block_does_not_merge_into_prior_run() {
    let mut log = UndoLog::new();
    add(&mut log, 0, 2);
    log.record_add(2, 1, flags::FIRSTMOD);
    log.begin_read();
    let run = log.next_run().unwrap();
    assert_eq!(run[0].len, 1);
    assert!(run[0].flags & flags::FIRSTMOD != 0);
}

#[test]
fn save_marker_sets_sticky_flag_and_is_skipped() {
    let mut log = UndoLog::new();
    add(&mut log, 0, 3);
    log.record_save();
    log.begin_read();
    assert!(!log.seen_save());
    let run = log.next_run().unwrap();
    assert!(log.seen_save());
    assert_eq!(run[0].kind, BlockKind::Add);
}

#[test]
fn oversized_delete_splits_into_chain() {
    let mut log = UndoLog::new();
    // Nearly fill the first slab so the big delete has to split
    let filler = vec![b'x'; SLAB_SIZE - 300];
    del(&mut log, 0, &filler, false);
    let big = vec![b'y'; 600];
    log.record_del(100, &big, flags::CHUNK, false);

    log.begin_read();
    let run = log.next_run().unwrap();
    assert_eq!(run.len(), 2, "chained pair consumed as one run");
    // Newest first: the CHAIN remainder, then the head
    assert!(run[0].flags & flags::CHAIN != 0);
    assert_eq!(run[0].pos, 100);
    assert_eq!(run[1].pos, 100);
    let total: usize = run.iter().map(|op| op.data.len()).sum();
    assert_eq!(total, 600);
    let mut joined = run[1].data.clone();
    joined.extend_from_slice(&run[0].data);
    assert_eq!(joined, big);
}

#[test]
fn run_consumes_chained_pair() {
    let mut log = UndoLog::new();
    // A replace: Del then chained Add
    log.record_del(5, b"abc", flags::CHUNK, false);
    log.record_add(5, 2, flags::CHAIN);
    log.begin_read();
    let run = log.next_run().unwrap();
    assert_eq!(run.len(), 2);
    assert_eq!(run[0].kind, BlockKind::Add);
    assert_eq!(run[1].kind, BlockKind::Del);
    assert!(log.next_run().is_none());
}

#[test]
fn l0_drops_oldest_slabs() {
    let mut log = UndoLog::new();
    let chunk = vec![b'z'; SLAB_SIZE - 100];
    for _ in 0..(SLAB_MAX + 8) {
        log.record_del(0, &chunk, flags::CHUNK, false);
    }
    assert!(log.slab_count() <= SLAB_MAX + 1);
}

#[test]
fn dropping_read_slab_resets_read_state() {
    let mut log = UndoLog::new();
    let chunk = vec![b'z'; SLAB_SIZE - 100];
    log.record_del(0, &chunk, flags::CHUNK, false);
    log.begin_read();
    // Read head sits in slab 0; force enough records to collect it
    for _ in 0..(SLAB_MAX + 8) {
        log.record_del(0, &chunk, flags::CHUNK, false);
    }
    assert!(!log.mid_read() || log.next_run().is_some());
}

#[test]
fn gc_levels_report_and_escalate() {
    let mut log = UndoLog::new();
    let chunk = vec![b'z'; SLAB_SIZE - 100];
    for _ in 0..32 {
        log.record_del(0, &chunk, flags::CHUNK, false);
    }
    assert_eq!(log.gc(GcLevel::L1), Some(crate::constants::errors::MSG_UNDO_CLEARED));
    assert!(log.slab_count() <= SLAB_L1_TARGET);

    log.gc(GcLevel::L2);
    assert!(log.total_bytes() <= L2_MEM_MAX || log.slab_count() == 1);
    assert!(log.slab_count() >= 1);

    assert_eq!(log.gc(GcLevel::L3), Some(crate::constants::errors::MSG_UNDO_LOST));
    assert!(!log.is_enabled());
    log.record_add(0, 1, 0);
    log.begin_read();
    assert!(log.next_run().is_none());
}

#[test]
fn reset_restores_recording() {
    let mut log = UndoLog::new();
    log.gc(GcLevel::L3);
    log.reset();
    assert!(log.is_enabled());
    add(&mut log, 0, 1);
    log.begin_read();
    assert!(log.next_run().is_some());
}

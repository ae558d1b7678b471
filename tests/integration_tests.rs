//! Integration tests for linkdb
//!
//! End-to-end scenarios across engine restarts, plus a model-checked
//! workload of random operation sequences.

use std::collections::BTreeMap;

use linkdb::engine::Engine;
use linkdb::record::{MasterRecord, SlaveRecord};
use linkdb::LinkError;
use proptest::prelude::*;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn book(key: i32, isbn: i32) -> SlaveRecord {
    SlaveRecord::new(key, isbn, format!("t{}", isbn), format!("a{}", isbn), isbn as f64 / 4.0)
        .unwrap()
}

fn assert_consistent(engine: &Engine, model: &BTreeMap<i32, Vec<i32>>) {
    let report = engine.check().unwrap();
    assert!(report.is_ok(), "violations: {:?}", report.violations);

    assert_eq!(engine.index().len(), model.len());
    assert!(engine.index().is_sorted_unique());

    for (key, isbns) in model {
        let master = engine.get_master(*key).unwrap();
        assert_eq!(master.slave_count as usize, isbns.len());

        // Model keeps insertion order; chains are newest first
        let chain: Vec<i32> = engine.slaves_of(*key).unwrap().iter().map(|s| s.isbn).collect();
        let expected: Vec<i32> = isbns.iter().rev().copied().collect();
        assert_eq!(chain, expected);
    }
}

// =============================================================================
// Scenario Tests
// =============================================================================

#[test]
fn test_buyer_with_books_lifecycle() {
    let temp_dir = TempDir::new().unwrap();
    let mut engine = Engine::open_path(temp_dir.path()).unwrap();

    engine
        .insert_master(MasterRecord::new(555, "Alice", "Main St").unwrap())
        .unwrap();
    engine.insert_slave(555, book(555, 10)).unwrap();
    engine.insert_slave(555, book(555, 20)).unwrap();

    let master = engine.get_master(555).unwrap();
    assert_eq!(master.slave_count, 2);
    assert_eq!(master.head_slave, Some(1));
    assert_eq!(engine.get_slave(555, 20).unwrap().title, "t20");

    engine.delete_slave(555, 10).unwrap();
    assert!(matches!(
        engine.get_slave(555, 10),
        Err(LinkError::NotFound(_))
    ));
    assert_eq!(engine.get_master(555).unwrap().slave_count, 1);

    assert_eq!(engine.delete_master(555).unwrap(), 1);
    assert!(matches!(
        engine.get_master(555),
        Err(LinkError::NotFound(_))
    ));
    assert_eq!(engine.count_masters().unwrap(), 0);
    assert_eq!(engine.count_slaves().unwrap().total, 0);

    // Both slave slots are now reusable
    let mut free = engine.slave_free_list().as_slice().to_vec();
    free.sort_unstable();
    assert_eq!(free, vec![0, 1]);

    engine.close().unwrap();

    let engine = Engine::open_path(temp_dir.path()).unwrap();
    assert!(engine.index().is_empty());
    assert_eq!(engine.slave_free_list().len(), 2);
    assert!(engine.check().unwrap().is_ok());
}

#[test]
fn test_crash_without_close_recovers_index() {
    let temp_dir = TempDir::new().unwrap();

    {
        let mut engine = Engine::open_path(temp_dir.path()).unwrap();
        for key in [30, 10, 20] {
            engine
                .insert_master(MasterRecord::new(key, "n", "a").unwrap())
                .unwrap();
        }
        engine.insert_slave(20, book(20, 1)).unwrap();
    }

    let engine = Engine::open_path(temp_dir.path()).unwrap();

    let keys: Vec<i32> = engine.index().entries().iter().map(|e| e.key).collect();
    assert_eq!(keys, vec![10, 20, 30]);
    assert_eq!(engine.get_slave(20, 1).unwrap().isbn, 1);
    assert!(engine.check().unwrap().is_ok());
}

// =============================================================================
// Model-Checked Workload
// =============================================================================

/// One step of a generated workload
#[derive(Debug, Clone)]
enum Op {
    InsertMaster(i32),
    InsertSlave(i32),
    DeleteMaster(i32),
    /// Delete one of the key's books, picked by position
    DeleteSlave(i32, prop::sample::Index),
    /// Close and reopen the engine
    Restart,
}

fn op() -> impl Strategy<Value = Op> {
    let key = 0..8i32;
    prop_oneof![
        3 => key.clone().prop_map(Op::InsertMaster),
        4 => key.clone().prop_map(Op::InsertSlave),
        1 => key.clone().prop_map(Op::DeleteMaster),
        2 => (key, any::<prop::sample::Index>()).prop_map(|(k, i)| Op::DeleteSlave(k, i)),
        1 => Just(Op::Restart),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn test_workload_matches_model(ops in prop::collection::vec(op(), 1..80)) {
        let temp_dir = TempDir::new().unwrap();
        let mut engine = Engine::open_path(temp_dir.path()).unwrap();
        let mut model: BTreeMap<i32, Vec<i32>> = BTreeMap::new();
        let mut next_isbn = 1;

        for op in ops {
            match op {
                Op::InsertMaster(key) => {
                    let record = MasterRecord::new(key, format!("n{}", key), "addr").unwrap();
                    let result = engine.insert_master(record);
                    if model.contains_key(&key) {
                        prop_assert!(matches!(result, Err(LinkError::DuplicateKey(_))));
                    } else {
                        prop_assert!(result.is_ok());
                        model.insert(key, Vec::new());
                    }
                }
                Op::InsertSlave(key) => {
                    let result = engine.insert_slave(key, book(key, next_isbn));
                    match model.get_mut(&key) {
                        Some(isbns) => {
                            prop_assert!(result.is_ok());
                            isbns.push(next_isbn);
                        }
                        None => prop_assert!(matches!(result, Err(LinkError::NotFound(_)))),
                    }
                    next_isbn += 1;
                }
                Op::DeleteMaster(key) => {
                    let result = engine.delete_master(key);
                    match model.remove(&key) {
                        Some(isbns) => prop_assert_eq!(result.unwrap(), isbns.len()),
                        None => prop_assert!(matches!(result, Err(LinkError::NotFound(_)))),
                    }
                }
                Op::DeleteSlave(key, pick) => {
                    let Some(isbns) = model.get_mut(&key) else {
                        continue;
                    };
                    if isbns.is_empty() {
                        continue;
                    }
                    let victim = isbns.remove(pick.index(isbns.len()));
                    prop_assert_eq!(engine.delete_slave(key, victim).unwrap().isbn, victim);
                }
                Op::Restart => {
                    engine.close().unwrap();
                    engine = Engine::open_path(temp_dir.path()).unwrap();
                }
            }
        }

        assert_consistent(&engine, &model);

        // Slot reuse: every slot is either live or on its free-list
        let live_slaves: usize = model.values().map(Vec::len).sum();
        let slave_slots = engine.slaves().slot_count().unwrap() as usize;
        prop_assert_eq!(slave_slots, live_slaves + engine.slave_free_list().len());
        let master_slots = engine.masters().slot_count().unwrap() as usize;
        prop_assert_eq!(master_slots, model.len() + engine.master_free_list().len());
    }
}

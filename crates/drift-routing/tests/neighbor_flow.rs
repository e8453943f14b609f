//! End-to-end flows through the neighbor knowledge registry: entry
//! lifecycle, summary freshness, transfer slot accounting, and dataset
//! attachments, the way the routing logic drives them.

use std::sync::Arc;
use std::thread;

use drift_core::bloom::BloomFilter;
use drift_core::{BundleId, BundleMeta, Eid};
use drift_routing::config::RoutingConfig;
use drift_routing::database::{NeighborDatabase, NeighborError};
use drift_routing::dataset::DatasetError;
use drift_routing::summary::{FilterState, SummaryError};
use drift_routing::transfer::TransferError;

fn bundle_id(byte: u8) -> BundleId {
    [byte; 32]
}

#[derive(Debug, PartialEq, Eq)]
struct DeliveryPredictability {
    score: u32,
}

#[test]
fn create_then_get_returns_the_same_entry() {
    let database = NeighborDatabase::default();
    let mut db = database.lock();
    let a = Eid::from("dtn://node-a");
    let b = Eid::from("dtn://node-b");

    db.create(&a).add_known(&BundleMeta::new(bundle_id(1), 100));
    let entry = db.get(&a).expect("created entry should be retrievable");
    assert_eq!(entry.has(&bundle_id(1), false), Ok(true));

    assert_eq!(db.get(&b), Err(NeighborError::NotAvailable(b.clone())));
}

#[test]
fn transfer_slots_exhaust_and_recover() {
    let config = RoutingConfig {
        max_transfer_slots: 2,
        ..RoutingConfig::default()
    };
    let database = NeighborDatabase::new(config);
    let mut db = database.lock();
    let entry = db.create(&Eid::from("dtn://node-a"));

    entry.acquire_transfer(&bundle_id(1)).expect("slot 1");
    entry.acquire_transfer(&bundle_id(2)).expect("slot 2");
    assert_eq!(
        entry.acquire_transfer(&bundle_id(3)),
        Err(TransferError::NoSlotsAvailable)
    );

    entry.release_transfer(&bundle_id(1));
    entry.acquire_transfer(&bundle_id(3)).expect("freed slot");
    assert_eq!(
        entry.acquire_transfer(&bundle_id(3)),
        Err(TransferError::AlreadyInTransit)
    );
}

#[test]
fn summary_freshness_lifecycle_gates_queries() {
    let database = NeighborDatabase::default();
    let mut db = database.lock();
    let eid = Eid::from("dtn://node-a");
    let entry = db.create(&eid);

    // before any filter arrives, fresh queries fail and a request is allowed
    assert_eq!(
        entry.has(&bundle_id(9), true),
        Err(SummaryError::BloomfilterNotAvailable)
    );
    entry.acquire_filter_request().expect("first request");

    let mut filter = BloomFilter::recommended(64, 0.01, [0x42; 16]);
    filter.insert(&bundle_id(9));
    entry.update_summary(filter, 10, 0);
    assert_eq!(entry.has(&bundle_id(9), true), Ok(true));

    db.expire(11);
    let entry = db.get_mut(&eid).expect("entry should survive the sweep");
    assert_eq!(entry.filter_state(), FilterState::Expired);
    assert_eq!(
        entry.has(&bundle_id(9), true),
        Err(SummaryError::BloomfilterNotAvailable)
    );

    // exact knowledge keeps answering through the stale filter
    entry.add_known(&BundleMeta::new(bundle_id(9), 1_000));
    assert_eq!(entry.has(&bundle_id(9), true), Ok(true));
}

#[test]
fn final_filter_never_expires_and_blocks_requests() {
    let database = NeighborDatabase::default();
    let mut db = database.lock();
    let eid = Eid::from("dtn://node-a");

    db.create(&eid)
        .update_summary(BloomFilter::recommended(32, 0.05, [0; 16]), 0, 123);
    db.expire(u64::MAX);

    let entry = db.get(&eid).expect("entry should survive the sweep");
    assert_eq!(entry.filter_state(), FilterState::Final);
    assert_eq!(
        entry.acquire_filter_request(),
        Err(SummaryError::NoFilterRequestAvailable)
    );
}

#[test]
fn datasets_replace_and_remove_cleanly() {
    let database = NeighborDatabase::default();
    let mut db = database.lock();
    let entry = db.create(&Eid::from("dtn://node-a"));

    entry.put_dataset(DeliveryPredictability { score: 1 });
    assert_eq!(
        entry.dataset::<DeliveryPredictability>(),
        Ok(&DeliveryPredictability { score: 1 })
    );

    entry.put_dataset(DeliveryPredictability { score: 2 });
    assert_eq!(
        entry.dataset::<DeliveryPredictability>(),
        Ok(&DeliveryPredictability { score: 2 })
    );

    entry.remove_dataset::<DeliveryPredictability>();
    assert_eq!(
        entry.dataset::<DeliveryPredictability>(),
        Err(DatasetError::NotAvailable)
    );
}

#[test]
fn workers_share_the_database_without_oversubscribing_a_neighbor() {
    let config = RoutingConfig {
        max_transfer_slots: 3,
        ..RoutingConfig::default()
    };
    let database = Arc::new(NeighborDatabase::new(config));
    let eid = Eid::from("dtn://node-a");
    database.lock().create(&eid);

    let mut handles = Vec::new();
    for _ in 0..4 {
        let database = Arc::clone(&database);
        let eid = eid.clone();
        handles.push(thread::spawn(move || {
            let mut acquired = 0_usize;
            for _ in 0..8 {
                let id: BundleId = rand::random();
                let db = database.lock();
                let entry = db.get(&eid).expect("entry should exist");
                if entry.acquire_transfer(&id).is_ok() {
                    acquired += 1;
                }
                assert!(entry.free_transfer_slots() <= 3);
            }
            acquired
        }));
    }

    let total: usize = handles
        .into_iter()
        .map(|h| h.join().expect("worker should not panic"))
        .sum();
    assert_eq!(total, 3);
    assert_eq!(database.lock().get(&eid).expect("entry").free_transfer_slots(), 0);
}

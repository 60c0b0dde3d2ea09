use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use folio_core::{
    CancelToken, CommandProcessor, CompositeCommand, Deadline, EditError, EngineConfig, Locker,
    LockerGuard, NeverCanceled, ResourceLock,
};
use folio_document::commands::{ChangeClass, CreateRecord, DeleteRecord, SetField};
use folio_document::factory;
use folio_document::{Class, Document, NodeHandle, Record, RecordKind, Subtree};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn fast_config() -> EngineConfig {
    EngineConfig {
        poll_interval_ms: 20,
        ..EngineConfig::default()
    }
}

/// A genomic set with one nuc-prot entry and `extra` lone nucleotides.
fn genome(extra: usize) -> Document {
    let mut tree = Subtree::leaf(Record::set(Class::GenProd)).with_child(
        Subtree::leaf(Record::set(Class::NucProt))
            .with_child(
                Subtree::leaf(Record::sequence("NC_1", Class::Nucleotide))
                    .with_child(Subtree::leaf(
                        Record::feature("gene").with_field("locus", "abcA"),
                    ))
                    .with_child(Subtree::leaf(
                        Record::feature("CDS")
                            .with_field("product", "P_1")
                            .with_field("gene-xref", "abcA"),
                    )),
            )
            .with_child(Subtree::leaf(Record::sequence("P_1", Class::Protein))),
    );
    for i in 0..extra {
        tree = tree.with_child(
            Subtree::leaf(Record::sequence(format!("NC_{}", i + 100), Class::Nucleotide))
                .with_child(Subtree::leaf(Record::feature("gene"))),
        );
    }
    Document::from_subtree(&tree)
}

fn snapshot(processor: &CommandProcessor<Document>) -> Subtree {
    processor.read(|doc| doc.snapshot(doc.root()).unwrap())
}

fn find(processor: &CommandProcessor<Document>, id: &str) -> NodeHandle {
    processor.read(|doc| doc.find_by_id(id).unwrap())
}

// ---------------------------------------------------------------------------
// Composite ordering
// ---------------------------------------------------------------------------

#[test]
fn later_child_edits_record_created_by_earlier_child() {
    init_logger();
    let processor = CommandProcessor::shared(genome(0), &fast_config());
    let before = snapshot(&processor);
    let root = processor.read(|doc| doc.root());

    let create = CreateRecord::new(root, None, Record::sequence("NC_9", Class::Nucleotide));
    let created = create.created();
    let mut composite = CompositeCommand::new("Add Annotated Sequence");
    composite.add_command(Box::new(create));
    composite.add_command(Box::new(SetField::new(
        &created,
        "title",
        Some("annotated".into()),
    )));
    composite.add_command(Box::new(ChangeClass::new(&created, Class::Protein)));

    processor.execute(Box::new(composite)).unwrap();
    let handle = created.get().unwrap();
    let after = snapshot(&processor);
    processor.read(|doc| {
        let record = doc.record(handle).unwrap();
        assert_eq!(record.field("title"), Some("annotated"));
        assert_eq!(record.class, Class::Protein);
    });

    // Undo reverses the field edit while the record still exists, then
    // detaches it.
    assert_eq!(processor.undo().unwrap(), "Add Annotated Sequence");
    assert_eq!(snapshot(&processor), before);
    assert!(processor.read(|doc| doc.is_valid(handle) && !doc.is_attached(handle)));

    processor.redo().unwrap();
    assert_eq!(snapshot(&processor), after);
    assert_eq!(find(&processor, "NC_9"), handle);
}

#[test]
fn failing_child_leaves_earlier_children_applied() {
    init_logger();
    let processor = CommandProcessor::shared(genome(0), &fast_config());
    let nucleotide = find(&processor, "NC_1");
    let root = processor.read(|doc| doc.root());

    let mut composite = CompositeCommand::new("Half Done");
    composite.add_command(Box::new(SetField::new(
        nucleotide,
        "note",
        Some("first".into()),
    )));
    composite.add_command(Box::new(DeleteRecord::new(root)));

    let err = processor.execute(Box::new(composite)).unwrap_err();
    assert!(matches!(err, EditError::InvalidState(_)));
    // No rollback: the first child's edit stays, and nothing was recorded.
    assert_eq!(
        processor.read(|doc| doc.record(nucleotide).unwrap().field("note").map(str::to_owned)),
        Some("first".to_owned())
    );
    assert!(!processor.can_undo());
}

// ---------------------------------------------------------------------------
// Factory edits through the processor
// ---------------------------------------------------------------------------

#[test]
fn delete_feature_is_one_undo_step() {
    init_logger();
    let processor = CommandProcessor::shared(genome(0), &fast_config());
    let before = snapshot(&processor);
    let cds = processor.read(|doc| {
        let nucleotide = doc.find_by_id("NC_1").unwrap();
        doc.children(nucleotide).unwrap()[1]
    });

    let command = processor.read(|doc| factory::delete_feature(doc, cds, true).unwrap());
    processor.execute(Box::new(command)).unwrap();
    assert!(processor.read(|doc| doc.find_by_id("P_1").is_none()));
    assert_eq!(processor.undo_labels(), vec!["Delete Feature".to_owned()]);

    processor.undo().unwrap();
    assert_eq!(snapshot(&processor), before);
}

#[test]
fn remove_all_features_then_delete_sequence() {
    init_logger();
    let processor = CommandProcessor::shared(genome(2), &fast_config());
    let before = snapshot(&processor);
    let root = processor.read(|doc| doc.root());

    let (command, count) =
        processor.read(|doc| factory::delete_all_features(doc, root, true).unwrap());
    assert_eq!(count, 4);
    processor.execute(Box::new(command)).unwrap();
    let features_left = processor.read(|doc| {
        doc.descendants(root)
            .unwrap()
            .into_iter()
            .filter(|&h| doc.record(h).unwrap().kind == RecordKind::Feature)
            .count()
    });
    assert_eq!(features_left, 0);

    let nucleotide = find(&processor, "NC_1");
    let command = processor.read(|doc| factory::delete_sequence(doc, nucleotide).unwrap());
    processor.execute(Box::new(command)).unwrap();
    assert_eq!(processor.read(|doc| doc.children(root).unwrap().len()), 2);

    processor.undo().unwrap();
    processor.undo().unwrap();
    assert_eq!(snapshot(&processor), before);
    assert!(processor.redo().is_ok());
}

// ---------------------------------------------------------------------------
// Execute guard across threads
// ---------------------------------------------------------------------------

#[test]
fn concurrent_editors_are_serialized() {
    init_logger();
    const EDITORS: usize = 4;
    const EDITS: usize = 10;
    let processor = CommandProcessor::shared(genome(EDITORS), &fast_config());
    let inside = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..EDITORS)
        .map(|i| {
            let processor = Arc::clone(&processor);
            let inside = Arc::clone(&inside);
            thread::spawn(move || {
                let sequence = find(&processor, &format!("NC_{}", i + 100));
                for n in 0..EDITS {
                    let guard = processor.execute_guard();
                    assert!(guard.lock(&NeverCanceled));
                    assert_eq!(inside.fetch_add(1, Ordering::SeqCst), 0);
                    processor
                        .execute(Box::new(SetField::new(
                            sequence,
                            "revision",
                            Some(n.to_string()),
                        )))
                        .unwrap();
                    inside.fetch_sub(1, Ordering::SeqCst);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(processor.undo_count(), EDITORS * EDITS);
    for i in 0..EDITORS {
        let sequence = find(&processor, &format!("NC_{}", i + 100));
        let revision =
            processor.read(|doc| doc.record(sequence).unwrap().field("revision").map(str::to_owned));
        assert_eq!(revision, Some((EDITS - 1).to_string()));
    }
}

#[test]
fn canceled_background_job_does_not_edit() {
    init_logger();
    let processor = CommandProcessor::shared(genome(0), &fast_config());
    let before = snapshot(&processor);

    let ui_guard = processor.execute_guard();
    assert!(ui_guard.lock(&NeverCanceled));

    let token = CancelToken::new();
    let job = {
        let processor = Arc::clone(&processor);
        let token = token.clone();
        thread::spawn(move || {
            let guard = processor.execute_guard();
            if !guard.lock(&token) {
                return false;
            }
            let root = processor.read(|doc| doc.root());
            processor
                .execute(Box::new(CreateRecord::new(root, None, Record::set(Class::PopSet))))
                .unwrap();
            true
        })
    };

    thread::sleep(Duration::from_millis(60));
    token.cancel();
    assert!(!job.join().unwrap());
    assert_eq!(snapshot(&processor), before);
    assert!(ui_guard.is_locked());
}

#[test]
fn job_outliving_its_document() {
    init_logger();
    let processor = CommandProcessor::shared(genome(0), &fast_config());
    let guard = processor.execute_guard();
    assert!(guard.lock(&NeverCanceled));

    drop(processor);
    // Nothing left to coordinate with: unlock and relock are no-ops.
    guard.unlock();
    assert!(guard.lock(&Deadline::after(Duration::ZERO)));
}

#[test]
fn background_scan_submits_through_queue() {
    init_logger();
    let processor = CommandProcessor::shared(genome(3), &fast_config());

    let job = {
        let processor = Arc::clone(&processor);
        thread::spawn(move || {
            let guard = processor.execute_guard();
            let lock = LockerGuard::new(Some(&guard as &dyn Locker), &NeverCanceled);
            assert!(lock.is_locked());
            let genes: Vec<NodeHandle> = processor.read(|doc| {
                doc.descendants(doc.root())
                    .unwrap()
                    .into_iter()
                    .filter(|&h| doc.record(h).unwrap().feature_type() == Some("gene"))
                    .collect()
            });
            drop(lock);
            let command = factory::set_field_on_all(&genes, "evidence", Some("predicted"), "Mark Genes");
            processor.submit(Box::new(command));
            genes.len()
        })
    };

    let genes = job.join().unwrap();
    assert_eq!(genes, 4);
    assert!(!processor.is_execute_locked());

    let guard = processor.execute_guard();
    assert!(guard.lock(&NeverCanceled));
    assert_eq!(processor.apply_pending(), 1);
    drop(guard);
    assert_eq!(processor.undo_label().as_deref(), Some("Mark Genes"));
}

// ---------------------------------------------------------------------------
// Locker guard over a shared resource
// ---------------------------------------------------------------------------

#[test]
fn resource_lock_guards_a_long_scan() {
    init_logger();
    let resource = Arc::new(ResourceLock::with_poll_interval(Duration::from_millis(10)));
    let scans = Arc::new(AtomicUsize::new(0));
    let overlap = Arc::new(AtomicBool::new(false));
    let busy = Arc::new(AtomicBool::new(false));

    let workers: Vec<_> = (0..3)
        .map(|_| {
            let resource = Arc::clone(&resource);
            let scans = Arc::clone(&scans);
            let overlap = Arc::clone(&overlap);
            let busy = Arc::clone(&busy);
            thread::spawn(move || {
                for _ in 0..5 {
                    let _lock = LockerGuard::new(Some(&*resource as &dyn Locker), &NeverCanceled);
                    if busy.swap(true, Ordering::SeqCst) {
                        overlap.store(true, Ordering::SeqCst);
                    }
                    thread::sleep(Duration::from_millis(1));
                    busy.store(false, Ordering::SeqCst);
                    scans.fetch_add(1, Ordering::SeqCst);
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(scans.load(Ordering::SeqCst), 15);
    assert!(!overlap.load(Ordering::SeqCst));
    assert!(!resource.is_held());
}

#[test]
fn timed_out_scan_skips_work() {
    init_logger();
    let resource = ResourceLock::with_poll_interval(Duration::from_millis(10));
    assert!(resource.try_acquire());

    let start = Instant::now();
    let lock = LockerGuard::new(
        Some(&resource as &dyn Locker),
        &Deadline::after(Duration::from_millis(30)),
    );
    assert!(!lock.is_locked());
    assert!(start.elapsed() >= Duration::from_millis(30));
    drop(lock);
    // The first holder still owns it.
    assert!(resource.is_held());
}

// ---------------------------------------------------------------------------
// Arena reclamation
// ---------------------------------------------------------------------------

fn node_count(processor: &CommandProcessor<Document>) -> usize {
    processor.read(Document::node_count)
}

#[test]
fn forgotten_deletes_free_their_nodes() {
    init_logger();
    let config = EngineConfig {
        max_undo: 2,
        ..fast_config()
    };
    let processor = CommandProcessor::shared(genome(0), &config);
    let root = processor.read(Document::root);
    let initial = node_count(&processor);

    for _ in 0..200 {
        let create = CreateRecord::new(root, None, Record::feature("misc_feature"));
        let created = create.created();
        processor.execute(Box::new(create)).unwrap();
        processor.execute(Box::new(DeleteRecord::new(created))).unwrap();
        // Only the delete still on the undo stack keeps a node alive.
        assert!(node_count(&processor) <= initial + 1);
    }

    // The last delete can still be undone.
    processor.undo().unwrap();
    assert_eq!(node_count(&processor), initial + 1);
    processor.redo().unwrap();

    processor.clear_history();
    assert_eq!(node_count(&processor), initial);
}

#[test]
fn new_edit_after_undo_frees_the_undone_create() {
    init_logger();
    let processor = CommandProcessor::shared(genome(0), &fast_config());
    let root = processor.read(Document::root);
    let initial = node_count(&processor);

    let create = CreateRecord::new(root, None, Record::feature("misc_feature"));
    let created = create.created();
    processor.execute(Box::new(create)).unwrap();
    processor.undo().unwrap();
    let node = created.get().unwrap();
    assert!(processor.read(|doc| doc.is_valid(node)));

    processor
        .execute(Box::new(ChangeClass::new(root, Class::PopSet)))
        .unwrap();
    assert!(!processor.can_redo());
    assert!(!processor.read(|doc| doc.is_valid(node)));
    assert_eq!(node_count(&processor), initial);
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[test]
fn history_depth_comes_from_config() {
    init_logger();
    let config = EngineConfig::from_toml_str("max_undo = 2\npoll_interval_ms = 5").unwrap();
    let processor = CommandProcessor::shared(genome(0), &config);
    assert_eq!(processor.poll_interval(), Duration::from_millis(5));
    let nucleotide = find(&processor, "NC_1");

    for n in 0..3 {
        processor
            .execute(Box::new(SetField::new(nucleotide, "note", Some(n.to_string()))))
            .unwrap();
    }
    assert_eq!(processor.undo_count(), 2);
    processor.undo().unwrap();
    processor.undo().unwrap();
    assert!(matches!(processor.undo(), Err(EditError::NothingToUndo)));
    // The oldest edit fell off the history and stays applied.
    assert_eq!(
        processor.read(|doc| doc.record(nucleotide).unwrap().field("note").map(str::to_owned)),
        Some("0".to_owned())
    );
}

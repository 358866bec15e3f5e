use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashSet;
use taskdeck_core::repo::task_repo::decode_snapshot;
use taskdeck_core::{
    KeyValueStore, KvError, KvTaskRepository, LoadOutcome, MemoryKeyValueStore, Priority,
    RepoError, ReorderError, TaskId, TaskStore, TaskStoreError, TaskValidationError, TASKS_KEY,
};

type Store<'a> = TaskStore<KvTaskRepository<&'a MemoryKeyValueStore>>;

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
}

fn setup(kv: &MemoryKeyValueStore) -> Store<'_> {
    TaskStore::new(KvTaskRepository::new(kv))
}

/// Adds tasks so the resulting list order equals `specs` order.
fn seed(store: &mut Store<'_>, specs: &[(&str, Priority)]) -> Vec<TaskId> {
    let mut ids: Vec<TaskId> = specs
        .iter()
        .rev()
        .enumerate()
        .map(|(offset, (text, priority))| {
            store
                .add_at(
                    text,
                    *priority,
                    None,
                    base_time() + Duration::seconds(offset as i64),
                )
                .unwrap()
                .value
                .id
        })
        .collect();
    ids.reverse();
    ids
}

fn order(store: &Store<'_>) -> Vec<String> {
    store.tasks().iter().map(|task| task.text.clone()).collect()
}

fn assert_unique_ids(store: &Store<'_>) {
    let ids: HashSet<TaskId> = store.tasks().iter().map(|task| task.id).collect();
    assert_eq!(ids.len(), store.len(), "duplicate ids in {:?}", store.tasks());
}

fn stored_texts(kv: &MemoryKeyValueStore) -> Vec<String> {
    let raw = kv.get_item(TASKS_KEY).unwrap().expect("tasks should be stored");
    decode_snapshot(&raw)
        .unwrap()
        .into_iter()
        .map(|task| task.text)
        .collect()
}

#[test]
fn add_puts_new_task_first_with_defaults_and_trimmed_text() {
    let kv = MemoryKeyValueStore::new();
    let mut store = setup(&kv);

    store.add("first", Priority::Low, None).unwrap();
    let outcome = store.add("  second  ", Priority::High, None).unwrap();

    assert!(outcome.is_persisted());
    let task = outcome.value;
    assert_eq!(task.text, "second");
    assert!(!task.completed);
    assert_eq!(task.priority, Priority::High);
    assert_eq!(order(&store), vec!["second", "first"]);
    assert_eq!(stored_texts(&kv), vec!["second", "first"]);
}

#[test]
fn ids_stay_unique_when_created_in_the_same_millisecond() {
    let kv = MemoryKeyValueStore::new();
    let mut store = setup(&kv);
    let now = base_time();

    let ids: Vec<TaskId> = (0..50)
        .map(|n| {
            store
                .add_at(&format!("task {n}"), Priority::Medium, None, now)
                .unwrap()
                .value
                .id
        })
        .collect();

    let mut unique = ids.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), ids.len());
}

#[test]
fn ids_do_not_collide_with_restored_tasks() {
    let kv = MemoryKeyValueStore::new();
    let future = base_time() + Duration::days(365);
    let restored_id = {
        let mut store = setup(&kv);
        store
            .add_at("from the future", Priority::Low, None, future)
            .unwrap()
            .value
            .id
    };

    let (mut reopened, _) = TaskStore::open(KvTaskRepository::new(&kv));
    let fresh = reopened
        .add_at("now", Priority::Low, None, base_time())
        .unwrap()
        .value;
    assert!(fresh.id > restored_id);
}

#[test]
fn blank_text_is_rejected_without_writing() {
    let kv = MemoryKeyValueStore::new();
    let mut store = setup(&kv);

    let err = store.add(" \t\n", Priority::Medium, None).unwrap_err();
    assert_eq!(err, TaskStoreError::Validation(TaskValidationError::EmptyText));
    assert!(store.is_empty());
    assert_eq!(kv.get_item(TASKS_KEY).unwrap(), None);
}

#[test]
fn toggle_twice_restores_completion_and_unknown_id_is_noop() {
    let kv = MemoryKeyValueStore::new();
    let mut store = setup(&kv);
    let ids = seed(&mut store, &[("a", Priority::Medium)]);

    let once = store.toggle_completed(ids[0]).value.unwrap();
    assert!(once.completed);
    let twice = store.toggle_completed(ids[0]).value.unwrap();
    assert!(!twice.completed);

    let missing = store.toggle_completed(TaskId::new(1));
    assert!(missing.value.is_none());
    assert!(missing.is_persisted());
}

#[test]
fn remove_deletes_only_the_target() {
    let kv = MemoryKeyValueStore::new();
    let mut store = setup(&kv);
    let ids = seed(
        &mut store,
        &[("a", Priority::Low), ("b", Priority::Low), ("c", Priority::Low)],
    );

    let removed = store.remove(ids[1]).value.unwrap();
    assert_eq!(removed.text, "b");
    assert_eq!(order(&store), vec!["a", "c"]);
    assert_eq!(stored_texts(&kv), vec!["a", "c"]);
    assert!(store.remove(ids[1]).value.is_none());
}

#[test]
fn edit_validates_text_before_looking_up_id() {
    let kv = MemoryKeyValueStore::new();
    let mut store = setup(&kv);
    let ids = seed(&mut store, &[("draft", Priority::Medium)]);

    let blank = store.edit(TaskId::new(42), "   ").unwrap_err();
    assert_eq!(
        blank,
        TaskStoreError::Validation(TaskValidationError::EmptyText)
    );

    let missing = store.edit(TaskId::new(42), "text").unwrap();
    assert!(missing.value.is_none());

    let edited = store.edit(ids[0], "  final  ").unwrap().value.unwrap();
    assert_eq!(edited.text, "final");
    assert_eq!(stored_texts(&kv), vec!["final"]);
}

#[test]
fn clear_completed_removes_only_completed_and_keeps_order() {
    let kv = MemoryKeyValueStore::new();
    let mut store = setup(&kv);
    let ids = seed(
        &mut store,
        &[
            ("a", Priority::High),
            ("b", Priority::Low),
            ("c", Priority::Medium),
            ("d", Priority::High),
            ("e", Priority::Low),
        ],
    );
    store.toggle_completed(ids[1]);
    store.toggle_completed(ids[3]);

    let outcome = store.clear_completed();
    assert_eq!(outcome.value, 2);
    assert_eq!(order(&store), vec!["a", "c", "e"]);
    assert!(store.tasks().iter().all(|task| !task.completed));
    assert_eq!(stored_texts(&kv), vec!["a", "c", "e"]);

    assert_eq!(store.clear_completed().value, 0);
}

#[test]
fn sort_by_priority_is_stable_and_idempotent() {
    let kv = MemoryKeyValueStore::new();
    let mut store = setup(&kv);
    let ids = seed(
        &mut store,
        &[
            ("low a", Priority::Low),
            ("high b", Priority::High),
            ("medium c", Priority::Medium),
            ("high done", Priority::High),
            ("high e", Priority::High),
            ("low done", Priority::Low),
        ],
    );
    store.toggle_completed(ids[3]);
    store.toggle_completed(ids[5]);

    store.sort_by_priority();
    let sorted = order(&store);
    assert_eq!(
        sorted,
        vec!["high b", "high e", "medium c", "low a", "high done", "low done"]
    );

    store.sort_by_priority();
    assert_eq!(order(&store), sorted);
    assert_eq!(stored_texts(&kv), sorted);
}

#[test]
fn reorder_applies_valid_permutation() {
    let kv = MemoryKeyValueStore::new();
    let mut store = setup(&kv);
    let ids = seed(
        &mut store,
        &[("a", Priority::Low), ("b", Priority::Low), ("c", Priority::Low)],
    );

    store.reorder(&[ids[2], ids[0], ids[1]]).unwrap();
    assert_eq!(order(&store), vec!["c", "a", "b"]);
    assert_eq!(stored_texts(&kv), vec!["c", "a", "b"]);
}

#[test]
fn reorder_rejects_bad_sequences_without_changes() {
    let kv = MemoryKeyValueStore::new();
    let mut store = setup(&kv);
    let ids = seed(
        &mut store,
        &[("a", Priority::Low), ("b", Priority::Low), ("c", Priority::Low)],
    );
    let before = store.snapshot();
    let stored_before = kv.get_item(TASKS_KEY).unwrap();

    let unknown = store.reorder(&[ids[0], ids[1], TaskId::new(7)]).unwrap_err();
    assert_eq!(
        unknown,
        TaskStoreError::InvalidOperation(ReorderError::UnknownId(TaskId::new(7)))
    );
    let duplicate = store.reorder(&[ids[0], ids[0], ids[1]]).unwrap_err();
    assert_eq!(
        duplicate,
        TaskStoreError::InvalidOperation(ReorderError::DuplicateId(ids[0]))
    );
    let missing = store.reorder(&[ids[1], ids[0]]).unwrap_err();
    assert_eq!(
        missing,
        TaskStoreError::InvalidOperation(ReorderError::MissingId(ids[2]))
    );

    assert_eq!(store.snapshot(), before);
    assert_eq!(kv.get_item(TASKS_KEY).unwrap(), stored_before);
}

#[test]
fn move_task_relocates_one_task_and_clamps_index() {
    let kv = MemoryKeyValueStore::new();
    let mut store = setup(&kv);
    let ids = seed(
        &mut store,
        &[("a", Priority::Low), ("b", Priority::Low), ("c", Priority::Low)],
    );

    store.move_task(ids[0], 2).unwrap();
    assert_eq!(order(&store), vec!["b", "c", "a"]);
    store.move_task(ids[2], 0).unwrap();
    assert_eq!(order(&store), vec!["c", "b", "a"]);
    store.move_task(ids[2], 99).unwrap();
    assert_eq!(order(&store), vec!["b", "a", "c"]);

    let err = store.move_task(TaskId::new(5), 0).unwrap_err();
    assert_eq!(
        err,
        TaskStoreError::InvalidOperation(ReorderError::UnknownId(TaskId::new(5)))
    );
}

#[test]
fn failed_write_keeps_in_memory_change_and_previous_snapshot() {
    let kv = MemoryKeyValueStore::with_quota(400);
    let mut store = setup(&kv);
    store.add("short", Priority::Low, None).unwrap();
    let stored_before = kv.get_item(TASKS_KEY).unwrap();
    assert!(stored_before.is_some());

    let outcome = store.add(&"x".repeat(500), Priority::High, None).unwrap();

    assert!(!outcome.is_persisted());
    assert!(matches!(
        outcome.persist_error,
        Some(RepoError::Store(KvError::QuotaExceeded { .. }))
    ));
    assert_eq!(store.len(), 2);
    assert_eq!(kv.get_item(TASKS_KEY).unwrap(), stored_before);

    // Shrinking the list fits again and persists the full current state.
    let long_id = store.tasks()[0].id;
    assert!(store.remove(long_id).is_persisted());
    assert_eq!(stored_texts(&kv), vec!["short"]);
}

#[test]
fn ids_stay_unique_across_mixed_mutations_and_reload() {
    let kv = MemoryKeyValueStore::new();
    let mut store = setup(&kv);
    let now = base_time();

    let ids = seed(
        &mut store,
        &[("a", Priority::High), ("b", Priority::Low), ("c", Priority::Medium)],
    );
    assert_unique_ids(&store);

    store.remove(ids[1]);
    assert_unique_ids(&store);
    store.add_at("d", Priority::Low, None, now).unwrap();
    assert_unique_ids(&store);
    store.edit(ids[0], "a edited").unwrap();
    store.toggle_completed(ids[2]);
    assert_unique_ids(&store);

    let mut order: Vec<TaskId> = store.tasks().iter().map(|task| task.id).collect();
    order.reverse();
    store.reorder(&order).unwrap();
    store.sort_by_priority();
    assert_unique_ids(&store);

    let (mut reopened, outcome) = TaskStore::open(KvTaskRepository::new(&kv));
    assert!(matches!(outcome, LoadOutcome::Restored(3)));
    assert_unique_ids(&reopened);

    // Clock is behind every stored id; new ids must still land past them.
    for text in ["e", "f"] {
        reopened.add_at(text, Priority::Medium, None, now).unwrap();
        assert_unique_ids(&reopened);
    }
    let newest = reopened.tasks()[0].id;
    reopened.remove(newest);
    reopened.add_at("g", Priority::Medium, None, now).unwrap();
    assert_unique_ids(&reopened);
    assert_eq!(reopened.len(), 5);

    let (reloaded, outcome) = TaskStore::open(KvTaskRepository::new(&kv));
    assert!(matches!(outcome, LoadOutcome::Restored(5)));
    assert_unique_ids(&reloaded);
}

#[test]
fn add_refuses_when_stored_id_is_at_the_top_of_the_range() {
    let kv = MemoryKeyValueStore::new();
    let stored = format!(
        r#"[{{"id": {}, "text": "a", "completed": false, "priority": "medium",
             "dueDate": null, "createdAt": "2026-03-01T09:00:00Z"}}]"#,
        u64::MAX
    );
    kv.set_item(TASKS_KEY, &stored).unwrap();

    let (mut store, outcome) = TaskStore::open(KvTaskRepository::new(&kv));
    assert!(matches!(outcome, LoadOutcome::Restored(1)));

    let err = store.add("b", Priority::Medium, None).unwrap_err();
    assert_eq!(err, TaskStoreError::IdsExhausted);
    assert_eq!(store.len(), 1);
    assert_eq!(kv.get_item(TASKS_KEY).unwrap().as_deref(), Some(stored.as_str()));

    let (reloaded, outcome) = TaskStore::open(KvTaskRepository::new(&kv));
    assert!(matches!(outcome, LoadOutcome::Restored(1)));
    assert_eq!(reloaded.tasks()[0].id, TaskId::new(u64::MAX));
}

//! Integration tests for the store facade over the in-memory driver.

use entiflow_core::{
    CoreError, Entity, Settings, StreamOptions, UnwrapOptions,
};
use entiflow_store::StoreSettings;
use entiflow_testkit::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

#[tokio::test]
async fn create_persists_through_the_driver() {
    let (driver, store) = todo_store();
    let todo = Todo::new("ship it");

    let result = store
        .create(todo.clone())
        .unwrap(UnwrapOptions::default())
        .await
        .unwrap();

    assert_eq!(result, Some(todo.clone()));
    assert_eq!(driver.items(), vec![todo]);
}

#[tokio::test]
async fn find_unwraps_to_none_when_nothing_matches() {
    let (_driver, store) = todo_store();
    let result = store
        .find(MemoryQuery::ById(Uuid::new_v4()))
        .unwrap(UnwrapOptions::default())
        .await
        .unwrap();
    assert_eq!(result, None);
}

#[tokio::test]
async fn read_fails_when_nothing_matches() {
    let (_driver, store) = todo_store();
    let err = store
        .read(MemoryQuery::ById(Uuid::new_v4()))
        .unwrap(UnwrapOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound));
}

#[tokio::test]
async fn read_then_update_persists_the_replacement() {
    let (driver, store) = todo_store();
    let todo = Todo::new("draft");
    driver.insert(todo.clone());

    let result = store
        .read(MemoryQuery::ById(todo.id))
        .update(|todo| Todo { done: true, ..todo })
        .unwrap()
        .unwrap(UnwrapOptions::default())
        .await
        .unwrap()
        .unwrap();

    assert!(result.done);
    assert!(driver.get(todo.id).unwrap().done);
}

#[tokio::test]
async fn read_without_changes_never_writes() {
    let (driver, store) = todo_store();
    let todo = Todo::new("untouched");
    driver.insert(todo.clone());

    let result = store
        .read(MemoryQuery::ById(todo.id))
        .unwrap(UnwrapOptions::default())
        .await
        .unwrap();

    assert_eq!(result, Some(todo.clone()));
    assert_eq!(driver.items(), vec![todo]);
}

#[tokio::test]
async fn delete_removes_the_entity_and_returns_none() {
    let (driver, store) = todo_store();
    let todo = Todo::new("done with this");
    driver.insert(todo.clone());

    let result = store
        .read(MemoryQuery::ById(todo.id))
        .delete()
        .unwrap()
        .unwrap(UnwrapOptions::default())
        .await
        .unwrap();

    assert_eq!(result, None);
    assert!(driver.is_empty());
}

#[tokio::test]
async fn filter_applies_the_pipeline_to_every_match() {
    let (driver, store) = todo_store();
    let seeded = todos(3);
    for todo in &seeded {
        driver.insert(todo.clone());
    }

    let results = store
        .filter(MemoryQuery::All)
        .assign(TodoPatch {
            done: Some(true),
            ..TodoPatch::default()
        })
        .unwrap()
        .unwrap(StreamOptions::default().concurrency(4))
        .await
        .unwrap();

    // Input order survives the concurrent drain.
    let titles: Vec<String> = results
        .iter()
        .map(|todo| todo.clone().unwrap().title)
        .collect();
    assert_eq!(titles, vec!["todo-0", "todo-1", "todo-2"]);
    assert!(driver.items().iter().all(|todo| todo.done));
}

#[tokio::test]
async fn create_many_persists_in_input_order() {
    let (driver, store) = todo_store();
    let fresh = todos(3);

    let results = store
        .create_many(fresh.clone())
        .unwrap(StreamOptions::default())
        .await
        .unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(driver.items(), fresh);
}

#[tokio::test]
async fn track_commits_changes_to_known_entities() {
    let (driver, store) = todo_store();
    let todo = Todo::new("tracked");
    driver.insert(todo.clone());

    store
        .track(todo.clone())
        .assign(TodoPatch {
            title: Some("renamed".to_owned()),
            ..TodoPatch::default()
        })
        .unwrap()
        .unwrap(UnwrapOptions::default())
        .await
        .unwrap();

    assert_eq!(driver.get(todo.id).unwrap().title, "renamed");
}

#[tokio::test]
async fn driver_errors_reach_the_caller_unmodified() {
    let (driver, store) = todo_store();
    let todo = Todo::new("already there");
    driver.insert(todo.clone());

    let err = store
        .create(todo.clone())
        .unwrap(UnwrapOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), format!("duplicate entity {}", todo.id));
}

#[tokio::test]
async fn store_settings_disable_auto_commit() {
    let (driver, store) = todo_store_with(StoreSettings::new().auto_commit(false));
    let todo = Todo::new("pending");
    driver.insert(todo.clone());

    let err = store
        .read(MemoryQuery::ById(todo.id))
        .assign(TodoPatch {
            done: Some(true),
            ..TodoPatch::default()
        })
        .unwrap()
        .unwrap(UnwrapOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::ExpectedCommit { .. }));

    // An explicit checkpoint satisfies safe mode.
    store
        .read(MemoryQuery::ById(todo.id))
        .assign(TodoPatch {
            done: Some(true),
            ..TodoPatch::default()
        })
        .unwrap()
        .commit()
        .unwrap()
        .unwrap(UnwrapOptions::default())
        .await
        .unwrap();
    assert!(driver.get(todo.id).unwrap().done);
}

#[tokio::test]
async fn recording_writer_observes_entity_chains() {
    let recorder = Arc::new(RecordingWriter::new());
    let settings = Settings::new().writer(recorder.clone());
    let todo = Todo::new("observe me");

    Entity::<Todo>::create(todo.clone(), settings)
        .assign(TodoPatch {
            done: Some(true),
            ..TodoPatch::default()
        })
        .unwrap()
        .unwrap(UnwrapOptions::default())
        .await
        .unwrap();

    assert_eq!(recorder.created(), 1);
    assert_eq!(recorder.updated(), 0);
    let ops = recorder.ops();
    assert!(matches!(&ops[0], WriteOp::Create { target } if target.done));
}

#[tokio::test]
async fn failing_writer_aborts_the_unwrap() {
    let settings = Settings::new().writer(Arc::new(FailingWriter::new("backend offline")));
    let err = Entity::<Todo>::create(Todo::new("doomed"), settings)
        .unwrap(UnwrapOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "backend offline");
}

mod properties {
    use super::*;
    use futures::executor::block_on;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn tracking_without_mutations_returns_the_input(todo in todo_strategy()) {
            let (driver, store) = todo_store();
            driver.insert(todo.clone());

            let result = block_on(store.track(todo.clone()).unwrap(UnwrapOptions::default()));
            prop_assert_eq!(result.unwrap(), Some(todo.clone()));
            // A clean chain never writes.
            prop_assert_eq!(driver.items(), vec![todo]);
        }

        #[test]
        fn create_many_round_trips_any_batch(batch in todos_strategy(6)) {
            let (driver, store) = todo_store();
            let results = block_on(
                store.create_many(batch.clone()).unwrap(StreamOptions::default()),
            )
            .unwrap();

            let flattened: Vec<Todo> = results.into_iter().flatten().collect();
            prop_assert_eq!(&flattened, &batch);
            prop_assert_eq!(driver.items(), batch);
        }
    }
}

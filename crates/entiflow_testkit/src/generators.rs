//! Property-based test generators using proptest.

use crate::fixtures::Todo;
use proptest::prelude::*;
use uuid::Uuid;

/// Strategy for generating entity ids.
pub fn id_strategy() -> impl Strategy<Value = Uuid> {
    prop::array::uniform16(any::<u8>()).prop_map(Uuid::from_bytes)
}

/// Strategy for generating todo titles.
pub fn title_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9 ]{0,23}").expect("Invalid regex")
}

/// Strategy for generating todos.
pub fn todo_strategy() -> impl Strategy<Value = Todo> {
    (id_strategy(), title_strategy(), any::<bool>()).prop_map(|(id, title, done)| Todo {
        id,
        title,
        done,
    })
}

/// Strategy for generating up to `max` todos with distinct ids.
pub fn todos_strategy(max: usize) -> impl Strategy<Value = Vec<Todo>> {
    prop::collection::vec(todo_strategy(), 0..=max).prop_map(|mut items| {
        items.sort_by_key(|todo| todo.id);
        items.dedup_by_key(|todo| todo.id);
        items
    })
}

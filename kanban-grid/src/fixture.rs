//! Shared board used by the operation tests

use crate::context::BoardContext;
use crate::gateway::InMemoryGateway;
use crate::model::BoardModel;
use crate::types::{Column, Row, RowId, Task};
use std::sync::Arc;

/// c1 (limit 2) holds t1..t3 in r1, c2 holds t4 in r2 assigned to Alice.
/// Alice has a personal limit of 1, Bob has none.
pub(crate) fn board() -> BoardModel {
    BoardModel::new(
        vec![
            Column::new("c1", "To Do", 0).with_wip_limit(2),
            Column::new("c2", "Doing", 1),
            Column::new("c3", "Done", 2),
        ],
        vec![Row::new("r1", "Team A", 0), Row::new("r2", "Team B", 1)],
        vec![
            Task::new("t1", "One", "c1", Some(RowId::from("r1")), 0),
            Task::new("t2", "Two", "c1", Some(RowId::from("r1")), 1),
            Task::new("t3", "Three", "c1", Some(RowId::from("r1")), 2),
            Task::new("t4", "Four", "c2", Some(RowId::from("r2")), 0).with_user("u1"),
        ],
    )
}

/// A loaded context over an in-memory gateway, with the load calls cleared
pub(crate) async fn setup() -> (Arc<InMemoryGateway>, BoardContext) {
    let gateway = Arc::new(
        InMemoryGateway::new(board())
            .with_user("u1", "Alice", 1)
            .with_user("u2", "Bob", 0),
    );
    let ctx = BoardContext::new(gateway.clone());
    ctx.load().await.unwrap();
    gateway.clear_calls().await;
    (gateway, ctx)
}

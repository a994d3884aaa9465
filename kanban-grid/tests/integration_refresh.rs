//! Refetch ordering: stale snapshots and late results after detach

use async_trait::async_trait;
use kanban_grid::{
    BoardContext, BoardModel, Column, ColumnId, InMemoryGateway, PersistenceGateway, Result, Row,
    RowId, Task, TaskId, UserId, UserWipStatus,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex};

/// Gateway whose `fetch_tasks` answers only when the test releases it.
///
/// The n-th fetch waits on the n-th gate; everything else goes to an
/// in-memory gateway.
struct GatedGateway {
    inner: InMemoryGateway,
    gates: Mutex<VecDeque<oneshot::Receiver<Vec<Task>>>>,
    waiting: AtomicUsize,
}

impl GatedGateway {
    fn new(board: BoardModel, gates: usize) -> (Arc<Self>, Vec<oneshot::Sender<Vec<Task>>>) {
        let (senders, receivers): (Vec<_>, VecDeque<_>) = (0..gates).map(|_| oneshot::channel()).unzip();
        let gateway = Arc::new(Self {
            inner: InMemoryGateway::new(board),
            gates: Mutex::new(receivers),
            waiting: AtomicUsize::new(0),
        });
        (gateway, senders)
    }

    /// Yield until `count` fetches are parked on their gates
    async fn wait_for(&self, count: usize) {
        while self.waiting.load(Ordering::SeqCst) < count {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl PersistenceGateway for GatedGateway {
    async fn move_task_to_column(&self, task_id: &TaskId, column_id: &ColumnId) -> Result<Task> {
        self.inner.move_task_to_column(task_id, column_id).await
    }

    async fn move_task_to_row(&self, task_id: &TaskId, row_id: Option<&RowId>) -> Result<Task> {
        self.inner.move_task_to_row(task_id, row_id).await
    }

    async fn reorder_task_position(&self, task_id: &TaskId, position: u32) -> Result<Task> {
        self.inner.reorder_task_position(task_id, position).await
    }

    async fn reorder_column_position(&self, column_id: &ColumnId, position: u32) -> Result<Column> {
        self.inner.reorder_column_position(column_id, position).await
    }

    async fn reorder_row_position(&self, row_id: &RowId, position: u32) -> Result<Row> {
        self.inner.reorder_row_position(row_id, position).await
    }

    async fn check_user_wip_status(&self, user_id: &UserId) -> Result<UserWipStatus> {
        self.inner.check_user_wip_status(user_id).await
    }

    async fn assign_user_to_task(&self, task_id: &TaskId, user_id: &UserId) -> Result<Task> {
        self.inner.assign_user_to_task(task_id, user_id).await
    }

    async fn delete_row(&self, row_id: &RowId, cascade: bool) -> Result<()> {
        self.inner.delete_row(row_id, cascade).await
    }

    async fn delete_column(&self, column_id: &ColumnId, reassign_to: &ColumnId) -> Result<()> {
        self.inner.delete_column(column_id, reassign_to).await
    }

    async fn fetch_columns(&self) -> Result<Vec<Column>> {
        self.inner.fetch_columns().await
    }

    async fn fetch_rows(&self) -> Result<Vec<Row>> {
        self.inner.fetch_rows().await
    }

    async fn fetch_tasks(&self) -> Result<Vec<Task>> {
        let gate = self.gates.lock().await.pop_front();
        self.waiting.fetch_add(1, Ordering::SeqCst);
        match gate {
            Some(gate) => Ok(gate.await.unwrap_or_default()),
            None => self.inner.fetch_tasks().await,
        }
    }
}

fn board() -> BoardModel {
    BoardModel::new(
        vec![Column::new("c1", "To Do", 0), Column::new("c2", "Doing", 1)],
        vec![Row::new("r1", "Lane", 0)],
        vec![Task::new("t1", "One", "c1", None, 0)],
    )
}

fn snapshot(column: &str) -> Vec<Task> {
    vec![Task::new("t1", "One", column, None, 0)]
}

#[tokio::test]
async fn test_stale_snapshot_is_discarded() {
    let (gateway, mut gates) = GatedGateway::new(board(), 2);
    let ctx = Arc::new(BoardContext::with_model(gateway.clone(), board()));

    let older = tokio::spawn({
        let ctx = ctx.clone();
        async move { ctx.refresh_tasks().await }
    });
    gateway.wait_for(1).await;
    let newer = tokio::spawn({
        let ctx = ctx.clone();
        async move { ctx.refresh_tasks().await }
    });
    gateway.wait_for(2).await;

    // The newer request resolves first, then the older one straggles in
    let stale_gate = gates.remove(0);
    gates.remove(0).send(snapshot("c2")).unwrap();
    assert!(newer.await.unwrap().unwrap());
    stale_gate.send(snapshot("c1")).unwrap();
    assert!(!older.await.unwrap().unwrap());

    let model = ctx.model().await;
    assert_eq!(model.task(&TaskId::from("t1")).unwrap().column_id.as_str(), "c2");
}

#[tokio::test]
async fn test_in_order_snapshots_both_apply() {
    let (gateway, mut gates) = GatedGateway::new(board(), 2);
    let ctx = Arc::new(BoardContext::with_model(gateway.clone(), board()));

    let first = tokio::spawn({
        let ctx = ctx.clone();
        async move { ctx.refresh_tasks().await }
    });
    gateway.wait_for(1).await;
    gates.remove(0).send(snapshot("c2")).unwrap();
    assert!(first.await.unwrap().unwrap());

    let second = tokio::spawn({
        let ctx = ctx.clone();
        async move { ctx.refresh_tasks().await }
    });
    gateway.wait_for(2).await;
    gates.remove(0).send(snapshot("c1")).unwrap();
    assert!(second.await.unwrap().unwrap());

    let model = ctx.model().await;
    assert_eq!(model.task(&TaskId::from("t1")).unwrap().column_id.as_str(), "c1");
}

#[tokio::test]
async fn test_results_after_detach_are_dropped() {
    let (gateway, mut gates) = GatedGateway::new(board(), 1);
    let ctx = Arc::new(BoardContext::with_model(gateway.clone(), board()));
    let before = ctx.snapshot().await;

    let pending = tokio::spawn({
        let ctx = ctx.clone();
        async move { ctx.refresh_tasks().await }
    });
    gateway.wait_for(1).await;

    ctx.detach();
    gates.remove(0).send(snapshot("c2")).unwrap();

    assert!(!pending.await.unwrap().unwrap());
    assert_eq!(ctx.snapshot().await, before);
}

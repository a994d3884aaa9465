//! BoardContext - state shared by the board operations
//!
//! The context owns the model, the gateway handle, the drag session and the
//! bookkeeping around them (refresh tickets, notices, activity). It provides
//! access, not logic: operations decide what changes.

use crate::activity::LogEntry;
use crate::config::BoardConfig;
use crate::drag::DragSession;
use crate::error::{KanbanError, Result};
use crate::gateway::{HttpGateway, PersistenceGateway};
use crate::model::BoardModel;
use crate::notice::{Notice, NoticeQueue};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard};
use tracing::{debug, info, trace, warn};

/// A collection the gateway can refetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Columns,
    Rows,
    Tasks,
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Columns => "columns",
            Self::Rows => "rows",
            Self::Tasks => "tasks",
        })
    }
}

/// Monotonic refresh tickets for one collection.
///
/// A snapshot is applied only if its ticket is newer than the last one
/// applied, so a slow response can never overwrite a fresher one.
#[derive(Debug, Default)]
struct Ticket {
    issued: AtomicU64,
    applied: AtomicU64,
}

impl Ticket {
    fn issue(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn accept(&self, ticket: u64) -> bool {
        self.applied.fetch_max(ticket, Ordering::SeqCst) < ticket
    }
}

#[derive(Debug, Default)]
struct Tickets {
    columns: Ticket,
    rows: Ticket,
    tasks: Ticket,
}

impl Tickets {
    fn get(&self, collection: Collection) -> &Ticket {
        match collection {
            Collection::Columns => &self.columns,
            Collection::Rows => &self.rows,
            Collection::Tasks => &self.tasks,
        }
    }
}

/// Context passed to every board operation
pub struct BoardContext {
    gateway: Arc<dyn PersistenceGateway>,
    model: RwLock<BoardModel>,
    session: Mutex<DragSession>,
    tickets: Tickets,
    mounted: AtomicBool,
    notices: Mutex<NoticeQueue>,
    activity: Mutex<Vec<LogEntry>>,
}

impl BoardContext {
    /// Create a context with an empty model; call [`load`](Self::load) next
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self::with_model(gateway, BoardModel::default())
    }

    /// Create a context seeded with an already fetched model
    pub fn with_model(gateway: Arc<dyn PersistenceGateway>, model: BoardModel) -> Self {
        Self {
            gateway,
            model: RwLock::new(model),
            session: Mutex::new(DragSession::new()),
            tickets: Tickets::default(),
            mounted: AtomicBool::new(true),
            notices: Mutex::new(NoticeQueue::new()),
            activity: Mutex::new(Vec::new()),
        }
    }

    /// Create a context talking to the REST service described by `config`
    pub fn connect(config: &BoardConfig) -> Result<Self> {
        let gateway = HttpGateway::new(config)?;
        info!(api = %gateway.base_url(), "connecting board");
        Ok(Self::new(Arc::new(gateway)))
    }

    pub fn gateway(&self) -> &dyn PersistenceGateway {
        self.gateway.as_ref()
    }

    // =========================================================================
    // Model access
    // =========================================================================

    /// Read access to the model; hold the guard only briefly
    pub async fn model(&self) -> RwLockReadGuard<'_, BoardModel> {
        self.model.read().await
    }

    /// Copy of the current model
    pub async fn snapshot(&self) -> BoardModel {
        self.model.read().await.clone()
    }

    /// Apply a local change to the model, all or nothing.
    ///
    /// `change` runs against a copy that replaces the model only if it
    /// succeeds. Returns `Ok(None)` without running `change` once the
    /// context is detached.
    pub async fn mutate<R>(
        &self,
        change: impl FnOnce(&mut BoardModel) -> Result<R> + Send,
    ) -> Result<Option<R>> {
        if !self.is_mounted() {
            debug!("context detached, dropping local change");
            return Ok(None);
        }
        let mut model = self.model.write().await;
        let mut draft = model.clone();
        let result = change(&mut draft)?;
        *model = draft;
        Ok(Some(result))
    }

    /// Mirror a change the service already accepted.
    ///
    /// If the local change cannot be applied the model no longer matches the
    /// service, so `collections` are refetched before the error is returned.
    pub async fn commit<R>(
        &self,
        collections: &[Collection],
        change: impl FnOnce(&mut BoardModel) -> Result<R> + Send,
    ) -> Result<Option<R>> {
        match self.mutate(change).await {
            Ok(result) => Ok(result),
            Err(error) => {
                warn!(%error, "local change failed after the service accepted it");
                for collection in collections {
                    self.reconcile(*collection).await;
                }
                Err(error)
            }
        }
    }

    // =========================================================================
    // Refetch
    // =========================================================================

    /// Fetch all three collections
    pub async fn load(&self) -> Result<()> {
        tokio::try_join!(
            self.refresh_columns(),
            self.refresh_rows(),
            self.refresh_tasks()
        )?;
        let model = self.model.read().await;
        info!(
            columns = model.columns().len(),
            rows = model.rows().len(),
            tasks = model.tasks().len(),
            "board loaded"
        );
        Ok(())
    }

    pub async fn refresh(&self, collection: Collection) -> Result<bool> {
        match collection {
            Collection::Columns => self.refresh_columns().await,
            Collection::Rows => self.refresh_rows().await,
            Collection::Tasks => self.refresh_tasks().await,
        }
    }

    /// Refetch columns; `Ok(false)` when the snapshot arrived stale or late
    pub async fn refresh_columns(&self) -> Result<bool> {
        let ticket = self.tickets.columns.issue();
        let columns = self.gateway.fetch_columns().await?;
        Ok(self
            .apply(Collection::Columns, ticket, |m| m.replace_columns(columns))
            .await)
    }

    pub async fn refresh_rows(&self) -> Result<bool> {
        let ticket = self.tickets.rows.issue();
        let rows = self.gateway.fetch_rows().await?;
        Ok(self
            .apply(Collection::Rows, ticket, |m| m.replace_rows(rows))
            .await)
    }

    pub async fn refresh_tasks(&self) -> Result<bool> {
        let ticket = self.tickets.tasks.issue();
        let tasks = self.gateway.fetch_tasks().await?;
        Ok(self
            .apply(Collection::Tasks, ticket, |m| m.replace_tasks(tasks))
            .await)
    }

    /// Refetch after a change, keeping the local model if the fetch fails
    pub async fn reconcile(&self, collection: Collection) {
        if let Err(error) = self.refresh(collection).await {
            warn!(%collection, %error, "refetch failed, keeping local model");
        }
    }

    async fn apply(
        &self,
        collection: Collection,
        ticket: u64,
        replace: impl FnOnce(&mut BoardModel) + Send,
    ) -> bool {
        if !self.is_mounted() {
            debug!(%collection, ticket, "context detached, dropping snapshot");
            return false;
        }
        let mut model = self.model.write().await;
        if !self.tickets.get(collection).accept(ticket) {
            debug!(%collection, ticket, "discarding stale snapshot");
            return false;
        }
        replace(&mut model);
        trace!(%collection, ticket, "snapshot applied");
        true
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Stop accepting results; anything still in flight is dropped on arrival
    pub fn detach(&self) {
        if self.mounted.swap(false, Ordering::SeqCst) {
            debug!("board context detached");
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    // =========================================================================
    // Drag session
    // =========================================================================

    pub async fn session(&self) -> MutexGuard<'_, DragSession> {
        self.session.lock().await
    }

    // =========================================================================
    // Notices
    // =========================================================================

    /// Raise a notice for `error` and return its id
    pub async fn notify(&self, error: &KanbanError) -> String {
        self.notices.lock().await.push(Notice::from_error(error))
    }

    pub async fn notices(&self) -> Vec<Notice> {
        self.notices.lock().await.list().to_vec()
    }

    pub async fn dismiss_notice(&self, id: &str) -> bool {
        self.notices.lock().await.dismiss(id)
    }

    // =========================================================================
    // Activity logging
    // =========================================================================

    pub async fn append_activity(&self, entry: LogEntry) {
        self.activity.lock().await.push(entry);
    }

    /// Activity entries, newest first, optionally limited
    pub async fn read_activity(&self, limit: Option<usize>) -> Vec<LogEntry> {
        let activity = self.activity.lock().await;
        let newest_first = activity.iter().rev().cloned();
        match limit {
            Some(limit) => newest_first.take(limit).collect(),
            None => newest_first.collect(),
        }
    }
}

impl fmt::Debug for BoardContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoardContext")
            .field("mounted", &self.is_mounted())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::InMemoryGateway;
    use crate::types::{Column, Row, Task, TaskId};

    fn gateway() -> Arc<InMemoryGateway> {
        Arc::new(InMemoryGateway::new(BoardModel::new(
            vec![Column::new("c1", "To Do", 0)],
            vec![Row::new("r1", "Lane", 0)],
            vec![Task::new("t1", "One", "c1", None, 0)],
        )))
    }

    #[test]
    fn test_ticket_rejects_older_snapshots() {
        let ticket = Ticket::default();
        let first = ticket.issue();
        let second = ticket.issue();
        assert!(ticket.accept(second));
        assert!(!ticket.accept(first));
        assert!(!ticket.accept(second));
    }

    #[tokio::test]
    async fn test_load_fetches_everything() {
        let ctx = BoardContext::new(gateway());
        ctx.load().await.unwrap();

        let model = ctx.model().await;
        assert_eq!(model.columns().len(), 1);
        assert_eq!(model.rows().len(), 1);
        assert_eq!(model.tasks().len(), 1);
    }

    #[tokio::test]
    async fn test_detached_context_ignores_results() {
        let ctx = BoardContext::new(gateway());
        ctx.detach();

        assert!(!ctx.refresh_tasks().await.unwrap());
        assert!(ctx.mutate(|_| Ok(())).await.unwrap().is_none());
        assert!(ctx.snapshot().await.tasks().is_empty());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_model() {
        let gw = gateway();
        let ctx = BoardContext::new(gw.clone());
        ctx.load().await.unwrap();
        let before = ctx.snapshot().await;

        gw.fail_next("fetch_tasks", 503, "maintenance").await;
        assert!(ctx.refresh_tasks().await.is_err());
        assert_eq!(ctx.snapshot().await, before);
    }

    #[tokio::test]
    async fn test_failed_change_is_not_half_applied() {
        let ctx = BoardContext::new(gateway());
        ctx.load().await.unwrap();
        let before = ctx.snapshot().await;

        let result = ctx
            .mutate(|m| {
                m.set_task_position(&TaskId::from("t1"), 7)?;
                m.set_task_position(&TaskId::from("ghost"), 0)
            })
            .await;

        assert!(matches!(result, Err(KanbanError::TaskNotFound { .. })));
        assert_eq!(ctx.snapshot().await, before);
    }

    #[tokio::test]
    async fn test_failed_commit_refetches() {
        let gw = gateway();
        let ctx = BoardContext::new(gw.clone());
        ctx.load().await.unwrap();
        gw.update_board(|m| m.upsert_task(Task::new("t2", "Two", "c1", None, 1)))
            .await;

        let result = ctx
            .commit(&[Collection::Tasks], |m| {
                m.set_task_position(&TaskId::from("t1"), 7)?;
                m.set_task_position(&TaskId::from("ghost"), 0)
            })
            .await;

        assert!(result.is_err());
        let model = ctx.model().await;
        assert_eq!(model.tasks().len(), 2);
        assert_eq!(model.task(&TaskId::from("t1")).unwrap().position, 0);
    }

    #[tokio::test]
    async fn test_notices_and_activity() {
        let ctx = BoardContext::new(gateway());
        let id = ctx.notify(&KanbanError::LastRow { id: "r1".into() }).await;
        assert_eq!(ctx.notices().await.len(), 1);
        assert!(ctx.dismiss_notice(&id).await);
        assert!(ctx.notices().await.is_empty());

        ctx.append_activity(LogEntry::new("a", serde_json::json!({}), serde_json::json!({}), None, 0))
            .await;
        ctx.append_activity(LogEntry::new("b", serde_json::json!({}), serde_json::json!({}), None, 0))
            .await;
        let entries = ctx.read_activity(Some(1)).await;
        assert_eq!(entries[0].op, "b");
    }
}

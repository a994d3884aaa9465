//! Drop router: the entry points the grid UI calls during a drag gesture.
//!
//! A drop is resolved in two steps. [`dispatch`] looks at the payload kind
//! and the target and picks an operation (or decides there is nothing to
//! do); the router then runs that operation through the processor. Nothing
//! here panics on bad input: refusals and failures come back as an
//! [`ActionOutcome`] and are queued as notices on the context.

use crate::config::BoardConfig;
use crate::context::BoardContext;
use crate::drag::{DataTransfer, DragEvent, DragKind, DragPayload, DragSession, GestureEnd};
use crate::error::{ErrorSeverity, KanbanError, Result, Severity};
use crate::model::BoardModel;
use crate::operation::Execute;
use crate::processor::BoardOperationProcessor;
use crate::column::{DeleteColumn, ReorderColumn};
use crate::row::{DeleteRow, ReorderRow};
use crate::task::{AssignUser, MoveTask, ReorderTask};
use crate::types::{Cell, ColumnId, RowId, Task, TaskId, UserId};
use crate::wip::WipBadge;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Where something was dropped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    Cell(Cell),
    ColumnHeader(ColumnId),
    RowHeader(RowId),
    Task(TaskId),
}

/// What a handler did with a request
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    /// Valid request that changes nothing; no service call was made
    Noop,
    /// The payload does not apply to this target, or there was no payload
    Ignored,
    Applied { op: String, result: Value },
    /// Refused by a board rule; a warning notice was raised
    Rejected { notice_id: String, message: String },
    /// The service or the model failed; an error notice was raised
    Failed { notice_id: String, message: String },
}

impl ActionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// The operation a drop resolves to
#[derive(Debug, Clone)]
pub enum Action {
    MoveTask(MoveTask),
    ReorderTask(ReorderTask),
    AssignUser(AssignUser),
    ReorderColumn(ReorderColumn),
    ReorderRow(ReorderRow),
}

#[derive(Debug, Clone)]
pub enum Dispatch {
    Noop,
    Ignored,
    Run(Action),
}

/// Decide what dropping `payload` on `target` means for `model`.
///
/// Ids are not checked here; an unknown id reaches the operation, which
/// fails and is logged like any other attempt.
pub fn dispatch(model: &BoardModel, payload: &DragPayload, target: &DropTarget) -> Dispatch {
    match (payload.kind, target) {
        (DragKind::Task, DropTarget::Cell(cell)) => {
            let id = TaskId::from(payload.id.as_str());
            let current = model.task(&id).map(Task::cell);
            let recorded = payload.source_cell();
            if let (Some(source), Some(current)) = (&recorded, &current) {
                if source != current {
                    debug!(task = %id, %source, %current, "payload source differs from model");
                }
            }
            match recorded.or(current) {
                Some(source) if &source == cell => Dispatch::Noop,
                _ => Dispatch::Run(Action::MoveTask(MoveTask::new(id, cell.clone()))),
            }
        }
        (DragKind::Task, DropTarget::Task(target)) => {
            if payload.id == target.as_str() {
                Dispatch::Noop
            } else {
                Dispatch::Run(Action::ReorderTask(ReorderTask::new(
                    payload.id.as_str(),
                    target,
                )))
            }
        }
        (DragKind::Column, DropTarget::ColumnHeader(target))
        | (DragKind::Column, DropTarget::Cell(Cell { column_id: target, .. })) => {
            if payload.id == target.as_str() {
                Dispatch::Noop
            } else {
                Dispatch::Run(Action::ReorderColumn(ReorderColumn::new(
                    payload.id.as_str(),
                    target,
                )))
            }
        }
        (DragKind::Row, DropTarget::RowHeader(target))
        | (DragKind::Row, DropTarget::Cell(Cell { row_id: Some(target), .. })) => {
            if payload.id == target.as_str() {
                Dispatch::Noop
            } else {
                Dispatch::Run(Action::ReorderRow(ReorderRow::new(payload.id.as_str(), target)))
            }
        }
        (DragKind::User, DropTarget::Task(task_id)) => {
            let user = UserId::from(payload.id.as_str());
            if model.task(task_id).is_some_and(|t| t.is_assigned(&user)) {
                Dispatch::Noop
            } else {
                Dispatch::Run(Action::AssignUser(AssignUser::new(task_id, user)))
            }
        }
        (kind, target) => {
            debug!(%kind, ?target, "payload does not apply to drop target");
            Dispatch::Ignored
        }
    }
}

/// Entry points for the grid UI, bound to one board context
#[derive(Debug, Clone)]
pub struct DropRouter {
    ctx: Arc<BoardContext>,
    processor: BoardOperationProcessor,
}

impl DropRouter {
    pub fn new(ctx: Arc<BoardContext>) -> Self {
        Self::with_processor(ctx, BoardOperationProcessor::new())
    }

    pub fn with_processor(ctx: Arc<BoardContext>, processor: BoardOperationProcessor) -> Self {
        Self { ctx, processor }
    }

    /// Router over the REST service, attributing activity to the configured actor
    pub fn connect(config: &BoardConfig) -> Result<Self> {
        let ctx = Arc::new(BoardContext::connect(config)?);
        let processor = match &config.actor {
            Some(actor) => BoardOperationProcessor::with_actor(actor.clone()),
            None => BoardOperationProcessor::new(),
        };
        Ok(Self::with_processor(ctx, processor))
    }

    pub fn context(&self) -> &Arc<BoardContext> {
        &self.ctx
    }

    pub async fn load(&self) -> Result<()> {
        self.ctx.load().await
    }

    // =========================================================================
    // Drag gesture
    // =========================================================================

    /// Start dragging `id`; the envelope is written into the event's channel
    pub async fn handle_drag_start<D: DataTransfer>(
        &self,
        event: &mut DragEvent<D>,
        id: impl Into<String>,
        kind: DragKind,
        source_column_id: Option<ColumnId>,
        source_row_id: Option<RowId>,
    ) -> Result<()> {
        let payload = DragPayload::new(id, kind).with_source(source_column_id, source_row_id);
        self.ctx.session().await.begin(event, &payload)
    }

    pub fn handle_drag_over<D: DataTransfer>(&self, event: &mut DragEvent<D>) {
        DragSession::drag_over(event);
    }

    /// Route a drop. The payload is read from the event, never from the
    /// session, so drops that started elsewhere are handled too.
    pub async fn handle_drop<D: DataTransfer>(
        &self,
        event: &mut DragEvent<D>,
        target: DropTarget,
    ) -> ActionOutcome {
        event.prevent_default();
        let payload = DragPayload::read_from(&event.data_transfer);
        self.ctx.session().await.mark_dropped();

        let Some(payload) = payload else {
            return ActionOutcome::Ignored;
        };
        debug!(id = %payload.id, kind = %payload.kind, ?target, "drop");

        let decision = {
            let model = self.ctx.model().await;
            dispatch(&model, &payload, &target)
        };
        match decision {
            Dispatch::Noop => ActionOutcome::Noop,
            Dispatch::Ignored => ActionOutcome::Ignored,
            Dispatch::Run(action) => self.run_action(action).await,
        }
    }

    /// Close the gesture; always leaves the session idle
    pub async fn handle_drag_end(&self) -> GestureEnd {
        self.ctx.session().await.end()
    }

    // =========================================================================
    // Direct actions
    // =========================================================================

    pub async fn handle_task_reorder(
        &self,
        dragged: impl Into<TaskId>,
        target: impl Into<TaskId>,
    ) -> ActionOutcome {
        let (dragged, target) = (dragged.into(), target.into());
        if dragged == target {
            return ActionOutcome::Noop;
        }
        self.run(ReorderTask::new(dragged, target)).await
    }

    pub async fn delete_row(&self, id: impl Into<RowId>) -> ActionOutcome {
        self.run(DeleteRow::new(id)).await
    }

    /// Delete a column; its tasks go to `reassign_to`, or the leftmost other column
    pub async fn delete_column(
        &self,
        id: impl Into<ColumnId>,
        reassign_to: Option<ColumnId>,
    ) -> ActionOutcome {
        let mut op = DeleteColumn::new(id);
        op.reassign_to = reassign_to;
        self.run(op).await
    }

    // =========================================================================
    // View models
    // =========================================================================

    pub async fn column_badges(&self) -> Vec<WipBadge> {
        self.ctx.model().await.column_badges()
    }

    pub async fn row_badges(&self) -> Vec<WipBadge> {
        self.ctx.model().await.row_badges()
    }

    pub async fn dismiss_notice(&self, id: &str) -> bool {
        self.ctx.dismiss_notice(id).await
    }

    async fn run_action(&self, action: Action) -> ActionOutcome {
        match action {
            Action::MoveTask(op) => self.run(op).await,
            Action::ReorderTask(op) => self.run(op).await,
            Action::AssignUser(op) => self.run(op).await,
            Action::ReorderColumn(op) => self.run(op).await,
            Action::ReorderRow(op) => self.run(op).await,
        }
    }

    async fn run<T>(&self, op: T) -> ActionOutcome
    where
        T: Execute<BoardContext, KanbanError> + Serialize + Send + Sync,
    {
        match self.processor.process(&op, &self.ctx).await {
            Ok(result) => ActionOutcome::Applied {
                op: op.op_string(),
                result,
            },
            Err(error) => self.refuse(&error).await,
        }
    }

    async fn refuse(&self, error: &KanbanError) -> ActionOutcome {
        let notice_id = self.ctx.notify(error).await;
        let message = error.to_string();
        match error.severity() {
            ErrorSeverity::Warning => {
                warn!(%message, "action refused");
                ActionOutcome::Rejected { notice_id, message }
            }
            ErrorSeverity::Error => {
                warn!(%message, "action failed");
                ActionOutcome::Failed { notice_id, message }
            }
        }
    }
}

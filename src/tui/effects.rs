//! Effect execution.
//!
//! Store and file work runs on tokio's blocking pool; the result is sent back
//! into the event loop as a [`Msg`]. Timer ticks are single-shot sleeps.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::db::TaskStore;
use crate::error::AppError;
use crate::task::POMODORO_MINUTES;
use crate::transfer::{export_tasks, import_tasks, resolve_path};
use crate::tui::state::{Effect, Msg};

/// Runs effects against a shared store and reports back over a channel.
#[derive(Clone)]
pub struct EffectRunner {
    store: Arc<dyn TaskStore>,
    tx: UnboundedSender<Msg>,
    tick: Duration,
}

impl EffectRunner {
    pub fn new(store: Arc<dyn TaskStore>, tx: UnboundedSender<Msg>) -> Self {
        Self {
            store,
            tx,
            tick: Duration::from_secs(1),
        }
    }

    #[cfg(test)]
    fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Start an effect without waiting for it. Must be called inside a tokio runtime.
    pub fn dispatch(&self, effect: Effect) {
        debug!(?effect, "dispatching effect");
        let tx = self.tx.clone();
        match effect {
            Effect::ScheduleTick { session } => {
                let tick = self.tick;
                tokio::spawn(async move {
                    tokio::time::sleep(tick).await;
                    if tx.send(Msg::Tick { session }).is_err() {
                        debug!("event loop closed before tick delivery");
                    }
                });
            },
            effect => {
                let store = Arc::clone(&self.store);
                tokio::task::spawn_blocking(move || {
                    let msg = perform(store.as_ref(), effect);
                    if tx.send(msg).is_err() {
                        debug!("event loop closed before effect result delivery");
                    }
                });
            },
        }
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Execute an effect synchronously and describe the outcome as a message.
pub fn perform(store: &dyn TaskStore, effect: Effect) -> Msg {
    match effect {
        Effect::LoadTasks(filter) => {
            let result = match filter.status() {
                Some(status) => store.list_by_status(status),
                None => store.list(),
            };
            Msg::TasksLoaded(result)
        },
        Effect::CreateTask(task) => finished(store.create(task).map(|id| format!("Task #{id} added"))),
        Effect::UpdateTask(edit) => finished(store.get(edit.id).and_then(|mut task| {
            edit.apply_to(&mut task);
            store.update(&task)?;
            Ok(format!("Task #{} updated", edit.id))
        })),
        Effect::DeleteTask(id) => finished(store.delete(id).map(|_| format!("Deleted task #{id}"))),
        Effect::CompleteTask(id) => {
            finished(store.complete(id).map(|_| format!("Marked task #{id} as completed")))
        },
        Effect::RecordWork { task_id, minutes } => finished(
            store
                .add_work_duration(task_id, minutes)
                .map(|_| format!("Pomodoro stopped. {minutes} minutes recorded for task #{task_id}")),
        ),
        Effect::CompletePomodoro { session, task_id } => {
            let result = match task_id {
                Some(id) => store.add_work_duration(id, POMODORO_MINUTES),
                None => Ok(()),
            };
            Msg::PomodoroFinished { session, task_id, result }
        },
        Effect::ScheduleTick { session } => Msg::Tick { session },
        Effect::Export(path) => {
            let path = resolve_path(&path);
            finished(
                export_tasks(store, &path)
                    .map(|n| format!("Exported {n} task{} to {}", plural(n), path.display())),
            )
        },
        Effect::Import(path) => {
            let path = resolve_path(&path);
            finished(
                import_tasks(store, &path)
                    .map(|n| format!("Imported {n} task{} from {}", plural(n), path.display())),
            )
        },
    }
}

fn finished<E: Into<AppError>>(result: Result<String, E>) -> Msg {
    let result = result.map_err(Into::into);
    if let Err(e) = &result {
        warn!(error = %e, "command failed");
    }
    Msg::CommandFinished(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    use crate::db::SqliteStore;
    use crate::error::StoreError;
    use crate::fields::{Priority, Status, StatusFilter};
    use crate::task::{NewTask, TaskEdit};

    fn store_with(titles: &[&str]) -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        for title in titles {
            store.create(NewTask::new(*title, "", Priority::Medium)).unwrap();
        }
        store
    }

    fn message(msg: Msg) -> Result<String, AppError> {
        match msg {
            Msg::CommandFinished(result) => result,
            other => panic!("unexpected message {other:?}"),
        }
    }

    #[test]
    fn test_create_reports_id() {
        let store = store_with(&[]);
        let msg = perform(&store, Effect::CreateTask(NewTask::new("Buy milk", "", Priority::Medium)));
        assert_eq!(message(msg).unwrap(), "Task #1 added");
        let task = store.get(1).unwrap();
        assert_eq!((task.status, task.priority, task.work_duration), (Status::Pending, Priority::Medium, 0));
    }

    #[test]
    fn test_update_keeps_other_fields() {
        let store = store_with(&["draft"]);
        store.add_work_duration(1, 30).unwrap();
        let edit = TaskEdit { id: 1, title: "final".into(), description: "done soon".into(), priority: Priority::Low };
        assert_eq!(message(perform(&store, Effect::UpdateTask(edit))).unwrap(), "Task #1 updated");
        let task = store.get(1).unwrap();
        assert_eq!(task.title, "final");
        assert_eq!(task.work_duration, 30);
    }

    #[test]
    fn test_missing_task_is_reported() {
        let store = store_with(&[]);
        let err = message(perform(&store, Effect::DeleteTask(4))).unwrap_err();
        assert_eq!(err, AppError::Store(StoreError::NotFound(4)));
    }

    #[test]
    fn test_load_respects_filter() {
        let store = store_with(&["a", "b"]);
        store.complete(1).unwrap();
        match perform(&store, Effect::LoadTasks(StatusFilter::Pending)) {
            Msg::TasksLoaded(Ok(tasks)) => {
                assert_eq!(tasks.len(), 1);
                assert_eq!(tasks[0].title, "b");
            },
            other => panic!("unexpected message {other:?}"),
        }
    }

    #[test]
    fn test_complete_pomodoro_records_full_session() {
        let store = store_with(&["focus"]);
        match perform(&store, Effect::CompletePomodoro { session: 3, task_id: Some(1) }) {
            Msg::PomodoroFinished { session: 3, task_id: Some(1), result: Ok(()) } => {},
            other => panic!("unexpected message {other:?}"),
        }
        assert_eq!(store.get(1).unwrap().work_duration, 25);

        match perform(&store, Effect::CompletePomodoro { session: 4, task_id: None }) {
            Msg::PomodoroFinished { session: 4, task_id: None, result: Ok(()) } => {},
            other => panic!("unexpected message {other:?}"),
        }
        assert_eq!(store.get(1).unwrap().work_duration, 25);
    }

    #[test]
    fn test_record_partial_work() {
        let store = store_with(&["focus"]);
        let msg = perform(&store, Effect::RecordWork { task_id: 1, minutes: 12 });
        assert_eq!(message(msg).unwrap(), "Pomodoro stopped. 12 minutes recorded for task #1");
        assert_eq!(store.get(1).unwrap().work_duration, 12);
    }

    #[test]
    fn test_export_and_import_messages() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        let source = store_with(&["one", "two"]);
        let msg = message(perform(&source, Effect::Export(path.clone()))).unwrap();
        assert_eq!(msg, format!("Exported 2 tasks to {}", path.display()));

        let target = store_with(&[]);
        let msg = message(perform(&target, Effect::Import(path.clone()))).unwrap();
        assert_eq!(msg, format!("Imported 2 tasks from {}", path.display()));
        assert_eq!(target.list().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_dispatch_sends_result() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let runner = EffectRunner::new(Arc::new(store_with(&["a"])), tx);
        runner.dispatch(Effect::LoadTasks(StatusFilter::All));
        match rx.recv().await {
            Some(Msg::TasksLoaded(Ok(tasks))) => assert_eq!(tasks.len(), 1),
            other => panic!("unexpected message {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_schedule_tick_delivers_once() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let runner = EffectRunner::new(Arc::new(store_with(&[])), tx).with_tick(Duration::from_millis(5));
        runner.dispatch(Effect::ScheduleTick { session: 7 });
        match rx.recv().await {
            Some(Msg::Tick { session }) => assert_eq!(session, 7),
            other => panic!("unexpected message {other:?}"),
        }
        drop(runner);
        assert!(rx.recv().await.is_none());
    }
}

//! Task operations on top of the record store.

use crate::error::StoreResult;
use crate::store::{Limit, RecordStore};
use crate::types::{Task, TaskStatus};
use chrono::{DateTime, TimeDelta, Utc};

/// Task-level conveniences. Holds a store handle and no state of its own.
#[derive(Clone)]
pub struct TaskService {
    store: RecordStore<Task>,
}

impl TaskService {
    pub fn new(store: RecordStore<Task>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &RecordStore<Task> {
        &self.store
    }

    /// Every task, in creation order.
    pub fn list_all(&self) -> StoreResult<Vec<Task>> {
        self.store.find_many(|_| true, Limit::Unbounded)
    }

    /// Tasks whose status equals `status` exactly.
    pub fn list_by_status(&self, status: &str) -> StoreResult<Vec<Task>> {
        self.store
            .find_many(|task| task.status == status, Limit::Unbounded)
    }

    pub fn get(&self, id: u64) -> StoreResult<Option<Task>> {
        self.store.find_one(|task| task.id == id)
    }

    /// Create a `todo` task and return its id.
    pub fn add(&self, description: &str) -> StoreResult<u64> {
        let task = self.store.upsert(0, |mut task| {
            let now = Utc::now();
            task.description = description.to_string();
            task.status = TaskStatus::Todo.as_str().to_string();
            task.created_at = now;
            task.updated_at = now;
            task
        })?;
        Ok(task.id)
    }

    pub fn set_description(&self, id: u64, description: &str) -> StoreResult<Task> {
        self.store.upsert(id, |mut task| {
            task.description = description.to_string();
            task.updated_at = touch(task.updated_at);
            task
        })
    }

    pub fn set_status(&self, id: u64, status: &str) -> StoreResult<Task> {
        self.store.upsert(id, |mut task| {
            task.status = status.to_string();
            task.updated_at = touch(task.updated_at);
            task
        })
    }

    /// Returns whether a task was deleted.
    pub fn remove(&self, id: u64) -> StoreResult<bool> {
        self.store.remove(id)
    }
}

/// Current time, pushed past `previous` when the clock has not moved.
fn touch(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + TimeDelta::microseconds(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touch_advances_past_future_timestamp() {
        let future = Utc::now() + TimeDelta::hours(1);
        assert_eq!(touch(future), future + TimeDelta::microseconds(1));
    }

    #[test]
    fn test_touch_uses_now_for_past_timestamp() {
        let past = Utc::now() - TimeDelta::hours(1);
        let touched = touch(past);
        assert!(touched > past + TimeDelta::minutes(59));
    }
}

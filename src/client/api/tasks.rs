//! Task API trait

use async_trait::async_trait;

use crate::client::models::{NewTask, Task, TaskStatus, TaskUpdate};
use crate::error::Result;

#[async_trait]
pub trait TaskApi: Send + Sync {
    async fn list_tasks(&self) -> Result<Vec<Task>>;

    async fn get_task(&self, id: &str) -> Result<Task>;

    async fn create_task(&self, task: &NewTask) -> Result<Task>;

    async fn update_task(&self, id: &str, update: &TaskUpdate) -> Result<Task>;

    async fn delete_task(&self, id: &str) -> Result<()>;

    /// Move a task to another board column
    async fn move_task(&self, id: &str, status: TaskStatus) -> Result<Task> {
        let update = TaskUpdate {
            status: Some(status),
            ..Default::default()
        };
        self.update_task(id, &update).await
    }
}

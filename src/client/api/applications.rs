//! Job application API trait

use async_trait::async_trait;

use crate::client::models::{Application, ApplicationUpdate, NewApplication};
use crate::error::Result;

#[async_trait]
pub trait ApplicationApi: Send + Sync {
    /// List applications, optionally restricted to one status
    async fn list_applications(&self, status: Option<&str>) -> Result<Vec<Application>>;

    async fn get_application(&self, id: &str) -> Result<Application>;

    async fn create_application(&self, app: &NewApplication) -> Result<Application>;

    async fn update_application(
        &self,
        id: &str,
        update: &ApplicationUpdate,
    ) -> Result<Application>;

    async fn delete_application(&self, id: &str) -> Result<()>;

    /// Move an application to another pipeline status
    async fn move_application(&self, id: &str, status: &str) -> Result<Application> {
        let update = ApplicationUpdate {
            status: Some(status.to_string()),
            ..Default::default()
        };
        self.update_application(id, &update).await
    }

    /// Append a note. The notes list is replaced as a whole on the server.
    async fn add_note(&self, id: &str, note: &str) -> Result<Application> {
        let current = self.get_application(id).await?;
        let mut notes = current.notes;
        notes.push(note.to_string());

        let update = ApplicationUpdate {
            notes: Some(notes),
            ..Default::default()
        };
        self.update_application(id, &update).await
    }

    async fn set_archived(&self, id: &str, archived: bool) -> Result<Application> {
        let update = ApplicationUpdate {
            archived: Some(archived),
            ..Default::default()
        };
        self.update_application(id, &update).await
    }
}

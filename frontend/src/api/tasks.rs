use super::CrmApi;
use crate::error::ApiResult;
use crate::request::HttpClient;
use crate::session::KeyValueStore;
use crmdesk_shared::protocol::MessageResponse;
use crmdesk_shared::protocol::tasks::{DeleteTask, ListTasks, UpdateTask};
use crmdesk_shared::{ListQuery, NewTask, Paged, Task, TaskPatch};

impl<H: HttpClient, S: KeyValueStore> CrmApi<H, S> {
    pub async fn list_tasks(&self, query: ListQuery) -> ApiResult<Paged<Task>> {
        self.send(&ListTasks { query }).await
    }

    pub async fn create_task(&self, task: &NewTask) -> ApiResult<Task> {
        self.send(task).await
    }

    pub async fn update_task(&self, id: &str, patch: TaskPatch) -> ApiResult<Task> {
        self.send(&UpdateTask {
            id: id.to_string(),
            patch,
        })
        .await
    }

    pub async fn delete_task(&self, id: &str) -> ApiResult<MessageResponse> {
        self.send(&DeleteTask { id: id.to_string() }).await
    }
}

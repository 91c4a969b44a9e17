use super::{ApiRequest, HttpMethod, MessageResponse, json_body};
use crate::page::{ListQuery, Paged};
use crate::task::{NewTask, Task, TaskPatch};
use validator::{Validate, ValidationErrors};

/// Task list filtered by `{page, limit, status, priority, clientId}`.
#[derive(Debug, Clone, Default)]
pub struct ListTasks {
    pub query: ListQuery,
}

impl ApiRequest for ListTasks {
    type Response = Paged<Task>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/tasks".to_string()
    }

    fn query(&self) -> Option<String> {
        self.query.encode()
    }
}

#[derive(Debug, Clone)]
pub struct GetTask {
    pub id: String,
}

impl ApiRequest for GetTask {
    type Response = Task;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!("/tasks/{}", self.id)
    }
}

impl ApiRequest for NewTask {
    type Response = Task;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        "/tasks".to_string()
    }

    fn body(&self) -> Result<Option<String>, serde_json::Error> {
        json_body(self)
    }

    fn check_input(&self) -> Result<(), ValidationErrors> {
        self.validate()
    }
}

#[derive(Debug, Clone)]
pub struct UpdateTask {
    pub id: String,
    pub patch: TaskPatch,
}

impl ApiRequest for UpdateTask {
    type Response = Task;
    const METHOD: HttpMethod = HttpMethod::Put;

    fn path(&self) -> String {
        format!("/tasks/{}", self.id)
    }

    fn body(&self) -> Result<Option<String>, serde_json::Error> {
        json_body(&self.patch)
    }

    fn check_input(&self) -> Result<(), ValidationErrors> {
        self.patch.validate()
    }
}

#[derive(Debug, Clone)]
pub struct DeleteTask {
    pub id: String,
}

impl ApiRequest for DeleteTask {
    type Response = MessageResponse;
    const METHOD: HttpMethod = HttpMethod::Delete;

    fn path(&self) -> String {
        format!("/tasks/{}", self.id)
    }
}

use crmdesk_shared::form::first_message;
use crmdesk_shared::{ListQuery, NewTask, Task, TaskPriority, TaskStatus};
use validator::Validate;

/// 任务列表的过滤条件，独立于列表本身保存
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskFilters {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
}

impl TaskFilters {
    pub fn matches(&self, task: &Task) -> bool {
        self.status.is_none_or(|s| task.status == s) && self.priority.is_none_or(|p| task.priority == p)
    }

    /// 过滤条件对应的列表查询
    pub fn query(&self, limit: u32) -> ListQuery {
        let mut query = ListQuery::page(1, limit);
        if let Some(status) = self.status {
            query = query.with_status(status.as_str());
        }
        if let Some(priority) = self.priority {
            query = query.with_priority(priority.as_str());
        }
        query
    }
}

/// 任务列表：过滤、乐观更新与回滚
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskBoard {
    tasks: Vec<Task>,
    filters: TaskFilters,
}

impl TaskBoard {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            ..Default::default()
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// 提交前校验草稿，返回第一条错误文案
    pub fn validate_draft(draft: &NewTask) -> Result<(), String> {
        draft.validate().map_err(|errors| first_message(&errors))
    }

    /// 乐观更新状态，返回原状态用于请求失败后的回滚
    pub fn set_status(&mut self, id: &str, status: TaskStatus) -> Option<TaskStatus> {
        let task = self.tasks.iter_mut().find(|t| t.id == id)?;
        Some(std::mem::replace(&mut task.status, status))
    }

    /// 用服务端返回的副本替换本地记录
    pub fn reconcile(&mut self, task: Task) {
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(slot) => *slot = task,
            None => self.tasks.insert(0, task),
        }
    }

    /// 新建的任务排在最前
    pub fn insert(&mut self, task: Task) {
        self.tasks.retain(|t| t.id != task.id);
        self.tasks.insert(0, task);
    }

    pub fn remove(&mut self, id: &str) -> Option<Task> {
        let index = self.tasks.iter().position(|t| t.id == id)?;
        Some(self.tasks.remove(index))
    }

    pub fn with_filters(mut self, filters: TaskFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn set_filters(&mut self, filters: TaskFilters) {
        self.filters = filters;
    }

    pub fn visible(&self) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|t| self.filters.matches(t))
            .cloned()
            .collect()
    }

    pub fn count(&self, status: TaskStatus) -> usize {
        self.tasks.iter().filter(|t| t.status == status).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, status: TaskStatus, priority: TaskPriority) -> Task {
        Task {
            id: id.into(),
            title: format!("Task {id}"),
            status,
            priority,
            ..Default::default()
        }
    }

    fn board() -> TaskBoard {
        TaskBoard::new(vec![
            task("t1", TaskStatus::Pending, TaskPriority::High),
            task("t2", TaskStatus::InProgress, TaskPriority::Low),
            task("t3", TaskStatus::Completed, TaskPriority::High),
        ])
    }

    #[test]
    fn test_empty_title_is_rejected() {
        let draft = NewTask {
            title: "   ".into(),
            ..Default::default()
        };
        assert_eq!(
            TaskBoard::validate_draft(&draft),
            Err("Please enter a task title".to_string())
        );

        let ok = NewTask {
            title: "Call back".into(),
            ..Default::default()
        };
        assert!(TaskBoard::validate_draft(&ok).is_ok());
    }

    #[test]
    fn test_status_change_is_visible_immediately() {
        let mut board = board();
        let previous = board.set_status("t1", TaskStatus::Completed);
        assert_eq!(previous, Some(TaskStatus::Pending));
        assert_eq!(board.tasks()[0].status, TaskStatus::Completed);
        assert_eq!(board.count(TaskStatus::Completed), 2);

        // 请求失败后回滚
        board.set_status("t1", TaskStatus::Pending);
        assert_eq!(board.tasks()[0].status, TaskStatus::Pending);
        assert_eq!(board.set_status("missing", TaskStatus::Overdue), None);
    }

    #[test]
    fn test_reconcile_replaces_server_copy() {
        let mut board = board();
        let mut server = task("t2", TaskStatus::Completed, TaskPriority::Low);
        server.title = "Renamed".into();
        board.reconcile(server);
        assert_eq!(board.tasks().len(), 3);
        assert_eq!(board.tasks()[1].title, "Renamed");
    }

    #[test]
    fn test_insert_and_remove() {
        let mut board = board();
        board.insert(task("t9", TaskStatus::Pending, TaskPriority::Medium));
        assert_eq!(board.tasks()[0].id, "t9");
        assert_eq!(board.remove("t2").map(|t| t.id), Some("t2".to_string()));
        assert_eq!(board.tasks().len(), 3);
        assert!(board.remove("t2").is_none());
    }

    #[test]
    fn test_filters_combine() {
        let mut filters = TaskFilters {
            priority: Some(TaskPriority::High),
            ..Default::default()
        };
        let mut board = board();
        board.set_filters(filters);
        assert_eq!(board.visible().len(), 2);

        filters.status = Some(TaskStatus::Completed);
        board.set_filters(filters);
        let visible = board.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, "t3");
    }

    #[test]
    fn test_filters_query_without_loaded_board() {
        let filters = TaskFilters {
            status: Some(TaskStatus::Completed),
            priority: Some(TaskPriority::High),
        };
        let query = filters.query(1000);
        assert_eq!(query.status.as_deref(), Some("completed"));
        assert_eq!(query.priority.as_deref(), Some("high"));
        assert_eq!(TaskFilters::default().query(1000).status, None);

        // 新加载的列表沿用已选择的过滤条件
        let reloaded = TaskBoard::new(board().tasks().to_vec()).with_filters(filters);
        assert_eq!(reloaded.visible().len(), 1);
    }
}

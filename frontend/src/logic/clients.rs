use crmdesk_shared::{Client, LeadStatus};

pub const CLIENT_PAGE_SIZE: usize = 10;

/// 客户表格：搜索、状态过滤与本地分页
#[derive(Debug, Clone, PartialEq)]
pub struct ClientTable {
    clients: Vec<Client>,
    search: String,
    status: Option<LeadStatus>,
    /// 从 1 开始
    page: usize,
    page_size: usize,
}

impl Default for ClientTable {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl ClientTable {
    pub fn new(clients: Vec<Client>) -> Self {
        Self {
            clients,
            search: String::new(),
            status: None,
            page: 1,
            page_size: CLIENT_PAGE_SIZE,
        }
    }

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn status_filter(&self) -> Option<LeadStatus> {
        self.status
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// 条件变化后回到第一页
    pub fn set_search(&mut self, search: &str) {
        self.search = search.trim().to_lowercase();
        self.page = 1;
    }

    pub fn set_status_filter(&mut self, status: Option<LeadStatus>) {
        self.status = status;
        self.page = 1;
    }

    fn matches(&self, client: &Client) -> bool {
        if self.status.is_some_and(|s| client.status != s) {
            return false;
        }
        if self.search.is_empty() {
            return true;
        }
        [
            client.full_name(),
            client.email.clone(),
            client.phone.clone(),
            client.client_id.clone(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&self.search))
    }

    pub fn filtered(&self) -> Vec<&Client> {
        self.clients.iter().filter(|c| self.matches(c)).collect()
    }

    pub fn page_count(&self) -> usize {
        self.filtered().len().div_ceil(self.page_size).max(1)
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.clamp(1, self.page_count());
    }

    pub fn has_prev_page(&self) -> bool {
        self.page > 1
    }

    pub fn has_next_page(&self) -> bool {
        self.page < self.page_count()
    }

    pub fn page_items(&self) -> Vec<Client> {
        self.filtered()
            .into_iter()
            .skip((self.page - 1) * self.page_size)
            .take(self.page_size)
            .cloned()
            .collect()
    }

    /// `Showing a to b of n results`
    pub fn summary(&self) -> String {
        let total = self.filtered().len();
        if total == 0 {
            return "Showing 0 to 0 of 0 results".to_string();
        }
        let start = (self.page - 1) * self.page_size + 1;
        let end = (start + self.page_size - 1).min(total);
        format!("Showing {start} to {end} of {total} results")
    }

    /// 删除后当前页可能变空，页码随之收缩
    pub fn remove(&mut self, id: &str) -> Option<Client> {
        let index = self.clients.iter().position(|c| c.id == id)?;
        let removed = self.clients.remove(index);
        self.page = self.page.min(self.page_count());
        Some(removed)
    }

    /// 新建的客户排在最前，保留当前的搜索与过滤条件
    pub fn insert(&mut self, client: Client) {
        self.clients.retain(|c| c.id != client.id);
        self.clients.insert(0, client);
    }

    pub fn replace(&mut self, client: Client) {
        if let Some(slot) = self.clients.iter_mut().find(|c| c.id == client.id) {
            *slot = client;
        }
    }

    /// 每个线索状态的客户数，按状态的固定顺序
    pub fn status_counts(&self) -> Vec<(LeadStatus, usize)> {
        LeadStatus::ALL
            .into_iter()
            .map(|status| {
                let n = self.clients.iter().filter(|c| c.status == status).count();
                (status, n)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(n: usize, status: LeadStatus) -> Client {
        Client {
            id: format!("id{n}"),
            client_id: format!("C-{n:03}"),
            first_name: format!("First{n}"),
            last_name: "Lee".into(),
            email: format!("user{n}@mail.com"),
            phone: format!("+1 555 {n:04}"),
            status,
            ..Default::default()
        }
    }

    fn table(n: usize) -> ClientTable {
        ClientTable::new(
            (1..=n)
                .map(|i| {
                    let status = if i % 3 == 0 { LeadStatus::Ftd } else { LeadStatus::NewLead };
                    client(i, status)
                })
                .collect(),
        )
    }

    #[test]
    fn test_summary_and_paging() {
        let mut t = table(23);
        assert_eq!(t.page_count(), 3);
        assert_eq!(t.summary(), "Showing 1 to 10 of 23 results");

        t.set_page(3);
        assert_eq!(t.page_items().len(), 3);
        assert_eq!(t.summary(), "Showing 21 to 23 of 23 results");
        assert!(!t.has_next_page());

        t.set_page(99);
        assert_eq!(t.page(), 3);
    }

    #[test]
    fn test_search_is_case_insensitive_across_fields() {
        let mut t = table(12);
        t.set_search("FIRST1");
        // First1, First10, First11, First12
        assert_eq!(t.filtered().len(), 4);

        t.set_search("c-007");
        assert_eq!(t.filtered()[0].id, "id7");

        t.set_search("user3@");
        assert_eq!(t.filtered().len(), 1);

        t.set_search("nobody");
        assert_eq!(t.summary(), "Showing 0 to 0 of 0 results");
    }

    #[test]
    fn test_status_filter_resets_page() {
        let mut t = table(30);
        t.set_page(2);
        t.set_status_filter(Some(LeadStatus::Ftd));
        assert_eq!(t.page(), 1);
        assert_eq!(t.filtered().len(), 10);
        assert!(t.filtered().iter().all(|c| c.status == LeadStatus::Ftd));
    }

    #[test]
    fn test_remove_shrinks_last_page() {
        let mut t = table(11);
        t.set_page(2);
        assert!(t.remove("id11").is_some());
        assert_eq!(t.page(), 1);
        assert!(t.remove("id11").is_none());
    }

    #[test]
    fn test_status_counts_cover_every_status() {
        let t = table(6);
        let counts = t.status_counts();
        assert_eq!(counts.len(), LeadStatus::ALL.len());
        assert!(counts.contains(&(LeadStatus::Ftd, 2)));
        assert!(counts.contains(&(LeadStatus::NewLead, 4)));
    }

    #[test]
    fn test_insert_keeps_filters() {
        let mut t = table(3);
        t.set_search("first");
        t.insert(client(9, LeadStatus::NewLead));
        assert_eq!(t.search(), "first");
        assert_eq!(t.clients()[0].id, "id9");
        assert_eq!(t.filtered().len(), 4);
    }

    #[test]
    fn test_replace_updates_in_place() {
        let mut t = table(3);
        let mut updated = t.clients()[1].clone();
        updated.status = LeadStatus::NotInterested;
        t.replace(updated);
        assert_eq!(t.clients()[1].status, LeadStatus::NotInterested);
    }
}

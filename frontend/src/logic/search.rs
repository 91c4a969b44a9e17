use crmdesk_shared::Client;

/// 少于这个长度的输入不发起搜索
const MIN_QUERY_LEN: usize = 2;

/// 页头的客户搜索
///
/// 每次输入都会生成新的请求序号，只接受最新序号的结果，
/// 先发后到的旧响应会被丢弃。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderSearch {
    query: String,
    results: Vec<Client>,
    searching: bool,
    generation: u64,
}

impl HeaderSearch {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[Client] {
        &self.results
    }

    pub fn is_searching(&self) -> bool {
        self.searching
    }

    /// 更新输入，需要发起搜索时返回 `(序号, 查询词)`
    pub fn set_query(&mut self, query: &str) -> Option<(u64, String)> {
        self.query = query.to_string();
        self.generation += 1;

        let trimmed = query.trim();
        if trimmed.chars().count() < MIN_QUERY_LEN {
            self.results.clear();
            self.searching = false;
            return None;
        }
        self.searching = true;
        Some((self.generation, trimmed.to_string()))
    }

    /// 写入搜索结果，过期的结果返回 `false` 且不生效
    pub fn finish(&mut self, generation: u64, results: Vec<Client>) -> bool {
        if generation != self.generation {
            return false;
        }
        self.results = results;
        self.searching = false;
        true
    }

    pub fn clear(&mut self) {
        self.query.clear();
        self.results.clear();
        self.searching = false;
        self.generation += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(id: &str) -> Client {
        Client {
            id: id.into(),
            first_name: "Hit".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_short_query_does_not_search() {
        let mut search = HeaderSearch::default();
        assert!(search.set_query("a").is_none());
        assert!(!search.is_searching());
    }

    #[test]
    fn test_only_latest_results_apply() {
        let mut search = HeaderSearch::default();
        let (first, _) = search.set_query("mar").unwrap();
        let (second, q) = search.set_query("maria").unwrap();
        assert_eq!(q, "maria");
        assert!(search.is_searching());

        assert!(search.finish(second, vec![hit("new")]));
        assert!(!search.finish(first, vec![hit("old")]));
        assert_eq!(search.results()[0].id, "new");
        assert!(!search.is_searching());
    }

    #[test]
    fn test_clear_discards_in_flight() {
        let mut search = HeaderSearch::default();
        let (ticket, _) = search.set_query("lee").unwrap();
        search.clear();
        assert!(!search.finish(ticket, vec![hit("x")]));
        assert!(search.results().is_empty());
        assert_eq!(search.query(), "");
    }
}

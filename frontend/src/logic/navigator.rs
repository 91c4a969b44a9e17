/// 详情页中的上一条 / 下一条
///
/// 列表只拉取一次（上限 1000 条），之后完全在本地按下标移动。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordNavigator {
    ids: Vec<String>,
    index: Option<usize>,
}

impl RecordNavigator {
    pub fn new(ids: Vec<String>, current: &str) -> Self {
        let index = ids.iter().position(|id| id == current);
        Self { ids, index }
    }

    pub fn has_prev(&self) -> bool {
        self.index.is_some_and(|i| i > 0)
    }

    pub fn has_next(&self) -> bool {
        self.index.is_some_and(|i| i + 1 < self.ids.len())
    }

    pub fn prev_id(&self) -> Option<&str> {
        let i = self.index.filter(|_| self.has_prev())?;
        self.ids.get(i - 1).map(String::as_str)
    }

    pub fn next_id(&self) -> Option<&str> {
        let i = self.index.filter(|_| self.has_next())?;
        self.ids.get(i + 1).map(String::as_str)
    }

    /// 例如 `3 of 5`；当前记录不在列表中时为空
    pub fn position_label(&self) -> Option<String> {
        self.index.map(|i| format!("{} of {}", i + 1, self.ids.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> Vec<String> {
        ["c0", "c1", "c2", "c3", "c4"].map(String::from).to_vec()
    }

    #[test]
    fn test_middle_of_list() {
        let nav = RecordNavigator::new(ids(), "c2");
        assert!(nav.has_prev() && nav.has_next());
        assert_eq!(nav.next_id(), Some("c3"));
        assert_eq!(nav.prev_id(), Some("c1"));
        assert_eq!(nav.position_label().as_deref(), Some("3 of 5"));
    }

    #[test]
    fn test_ends_are_disabled() {
        let last = RecordNavigator::new(ids(), "c4");
        assert!(!last.has_next());
        assert_eq!(last.next_id(), None);
        assert!(last.has_prev());

        let first = RecordNavigator::new(ids(), "c0");
        assert!(!first.has_prev());
        assert_eq!(first.prev_id(), None);
    }

    #[test]
    fn test_unknown_record_disables_both() {
        let nav = RecordNavigator::new(ids(), "zz");
        assert!(!nav.has_prev() && !nav.has_next());
        assert_eq!(nav.position_label(), None);
    }
}

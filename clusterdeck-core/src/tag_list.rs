//! Tag overflow: show the first few tags and collapse the rest

/// Placeholder rendered for an empty tag list
pub const EMPTY_PLACEHOLDER: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagList<'a> {
    visible: &'a [String],
    overflow: &'a [String],
}

impl<'a> TagList<'a> {
    /// Split `tags` into at most `max_len` visible tags and the remainder
    pub fn new(tags: &'a [String], max_len: usize) -> Self {
        let split = max_len.min(tags.len());
        let (visible, overflow) = tags.split_at(split);
        Self { visible, overflow }
    }

    pub fn visible(&self) -> &'a [String] {
        self.visible
    }

    pub fn overflow(&self) -> &'a [String] {
        self.overflow
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty() && self.overflow.is_empty()
    }

    /// Badge for the collapsed tags, e.g. `+2`
    pub fn overflow_badge(&self) -> Option<String> {
        if self.overflow.is_empty() {
            None
        } else {
            Some(format!("+{}", self.overflow.len()))
        }
    }

    /// One-line rendering: `[a] [b] +3`, or `-` when there are no tags
    pub fn render_inline(&self) -> String {
        if self.is_empty() {
            return EMPTY_PLACEHOLDER.to_string();
        }
        let mut parts: Vec<String> = self.visible.iter().map(|t| format!("[{}]", t)).collect();
        if let Some(badge) = self.overflow_badge() {
            parts.push(badge);
        }
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("t{}", i)).collect()
    }

    #[test]
    fn test_empty_renders_placeholder() {
        let empty: Vec<String> = Vec::new();
        assert_eq!(TagList::new(&empty, 3).render_inline(), "-");
    }

    #[test]
    fn test_within_limit_has_no_badge() {
        let all = tags(2);
        let list = TagList::new(&all, 3);
        assert_eq!(list.visible().len(), 2);
        assert_eq!(list.overflow_badge(), None);
        assert_eq!(list.render_inline(), "[t0] [t1]");
    }

    #[test]
    fn test_overflow_counts_hidden_tags() {
        let all = tags(5);
        let list = TagList::new(&all, 2);
        assert_eq!(list.visible(), &all[..2]);
        assert_eq!(list.overflow(), &all[2..]);
        assert_eq!(list.render_inline(), "[t0] [t1] +3");
    }
}

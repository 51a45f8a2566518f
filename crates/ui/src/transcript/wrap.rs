use super::bubble::MessageBubble;

use std::cell::RefCell;
use std::rc::Rc;

/// Wrapped body text of one bubble at one width
#[derive(Debug, Clone)]
struct WrappedBody {
    width: usize,
    lines: Rc<[String]>,
}

/// Per-bubble cache of wrapped body lines
///
/// Rendering borrows the transcript immutably, so entries are filled through
/// a `RefCell`. An entry is rebuilt when the width changes or the bubble's
/// text is invalidated.
#[derive(Debug, Clone, Default)]
pub(crate) struct WrapCache {
    entries: RefCell<Vec<Option<WrappedBody>>>,
}

impl WrapCache {
    /// Body lines of the bubble at `index`; an empty string is a bare accent row
    pub(crate) fn body(&self, index: usize, bubble: &MessageBubble, width: usize) -> Rc<[String]> {
        let mut entries = self.entries.borrow_mut();
        if entries.len() <= index {
            entries.resize(index + 1, None);
        }

        if let Some(cached) = &entries[index]
            && cached.width == width
        {
            return Rc::clone(&cached.lines);
        }

        let lines: Rc<[String]> = wrap_body(&bubble.content, width).into();
        entries[index] = Some(WrappedBody { width, lines: Rc::clone(&lines) });
        lines
    }

    pub(crate) fn invalidate(&self, index: usize) {
        if let Some(entry) = self.entries.borrow_mut().get_mut(index) {
            *entry = None;
        }
    }

    #[cfg(test)]
    pub(crate) fn cached_width(&self, index: usize) -> Option<usize> {
        self.entries.borrow().get(index).and_then(|e| e.as_ref().map(|w| w.width))
    }
}

impl PartialEq for WrapCache {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

fn wrap_body(content: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for source_line in content.lines() {
        if source_line.trim().is_empty() {
            lines.push(String::new());
            continue;
        }
        lines.extend(textwrap::wrap(source_line, width).into_iter().map(|w| w.into_owned()));
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::Sender;

    #[test]
    fn test_wrap_body_keeps_blank_rows() {
        assert_eq!(wrap_body("a\n\nb", 10), vec!["a", "", "b"]);
        assert_eq!(wrap_body("", 10), vec![""]);
    }

    #[test]
    fn test_cache_rewraps_on_width_change() {
        let cache = WrapCache::default();
        let bubble = MessageBubble::new(Sender::Assistant, "one two three");

        assert_eq!(cache.body(0, &bubble, 40).len(), 1);
        assert_eq!(cache.cached_width(0), Some(40));

        assert!(cache.body(0, &bubble, 5).len() > 1);
        assert_eq!(cache.cached_width(0), Some(5));
    }

    #[test]
    fn test_invalidate_drops_entry() {
        let cache = WrapCache::default();
        let bubble = MessageBubble::new(Sender::User, "hi");
        cache.body(2, &bubble, 20);

        cache.invalidate(2);
        assert_eq!(cache.cached_width(2), None);
        assert_eq!(cache.cached_width(0), None);
    }
}

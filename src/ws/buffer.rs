use crate::models::{Identity, Segment};

/// Ordered room content as a list of authored runs.
///
/// The buffer has a single logical caret at its tail: backspace always
/// edits the most recent segment, whoever issued it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentBuffer {
    segments: Vec<Segment>,
}

impl SegmentBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// Extend the last segment when `identity` wrote it, otherwise start a
    /// new one. `text` is not validated here.
    pub fn append(&mut self, identity: &Identity, text: &str) {
        match self.segments.last_mut() {
            Some(last) if last.name == identity.name => last.text.push_str(text),
            _ => self.segments.push(Segment::authored_by(identity, text)),
        }
    }

    /// Remove one char from the tail. Returns `false` on an empty buffer.
    pub fn backspace(&mut self) -> bool {
        let Some(last) = self.segments.last_mut() else {
            return false;
        };

        if last.char_len() > 1 {
            last.text.pop();
        } else {
            self.segments.pop();
        }
        true
    }

    pub fn clear(&mut self) {
        self.segments.clear();
    }

    pub fn snapshot(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Concatenated text of every segment.
    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    pub fn char_count(&self) -> usize {
        self.segments.iter().map(Segment::char_len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steve() -> Identity {
        Identity::new("Steve", "#ff6b6b")
    }

    fn dina() -> Identity {
        Identity::new("Dina", "#4ecdc4")
    }

    #[test]
    fn same_author_appends_merge() {
        let mut buffer = SegmentBuffer::new();
        for ch in ["h", "e", "l", "l", "o", "\n"] {
            buffer.append(&steve(), ch);
        }
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.snapshot()[0], Segment::authored_by(&steve(), "hello\n"));
    }

    #[test]
    fn interleaved_authors_do_not_merge() {
        let mut buffer = SegmentBuffer::new();
        buffer.append(&steve(), "a");
        buffer.append(&dina(), "b");
        buffer.append(&steve(), "c");

        let names: Vec<&str> = buffer.snapshot().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Steve", "Dina", "Steve"]);
        assert_eq!(buffer.text(), "abc");
    }

    #[test]
    fn backspace_on_empty_is_noop() {
        let mut buffer = SegmentBuffer::new();
        assert!(!buffer.backspace());
        assert!(buffer.is_empty());
    }

    #[test]
    fn backspace_consumes_last_segment_then_previous() {
        let mut buffer = SegmentBuffer::new();
        buffer.append(&steve(), "abc");
        buffer.append(&dina(), "xy");

        assert!(buffer.backspace());
        assert!(buffer.backspace());
        assert_eq!(buffer.snapshot(), &[Segment::authored_by(&steve(), "abc")]);

        assert!(buffer.backspace());
        assert_eq!(buffer.snapshot(), &[Segment::authored_by(&steve(), "ab")]);
    }

    #[test]
    fn backspace_removes_whole_chars() {
        let mut buffer = SegmentBuffer::new();
        buffer.append(&steve(), "né🙂");
        buffer.backspace();
        assert_eq!(buffer.text(), "né");
        buffer.backspace();
        assert_eq!(buffer.text(), "n");
        assert_eq!(buffer.char_count(), 1);
    }

    #[test]
    fn empty_append_still_starts_a_segment() {
        let mut buffer = SegmentBuffer::new();
        buffer.append(&steve(), "");
        assert_eq!(buffer.len(), 1);
        assert!(buffer.backspace());
        assert!(buffer.is_empty());
    }

    #[test]
    fn clear_is_idempotent() {
        let mut buffer = SegmentBuffer::new();
        buffer.append(&steve(), "text");
        buffer.clear();
        let once = buffer.clone();
        buffer.clear();
        assert_eq!(buffer, once);
        assert!(buffer.is_empty());
    }
}

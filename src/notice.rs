use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Error,
    Info,
}

/// A message shown to the user in a modal window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
}

/// Pending notices, shown one at a time in arrival order.
#[derive(Debug, Default)]
pub struct Notices {
    queue: VecDeque<Notice>,
}

impl Notices {
    pub fn error(&mut self, message: impl Into<String>) {
        self.push(NoticeKind::Error, "Error", message);
    }

    pub fn info(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.push(NoticeKind::Info, title, message);
    }

    fn push(&mut self, kind: NoticeKind, title: impl Into<String>, message: impl Into<String>) {
        let notice = Notice {
            kind,
            title: title.into(),
            message: message.into(),
        };
        self.queue.push_back(notice);
        tracing::debug!(pending = self.len(), "queued notice");
    }

    /// The notice currently on screen, if any.
    pub fn current(&self) -> Option<&Notice> {
        self.queue.front()
    }

    /// Closes the notice currently on screen.
    pub fn dismiss(&mut self) {
        self.queue.pop_front();
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

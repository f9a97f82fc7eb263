use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

use client_core::{Notice, NoticeLevel};

const MAX_VISIBLE_TOASTS: usize = 4;

#[derive(Debug, Clone)]
pub struct Toast {
    pub notice: Notice,
    pub expires_at: Instant,
}

impl Toast {
    pub fn is_error(&self) -> bool {
        self.notice.level == NoticeLevel::Error
    }
}

/// Transient notifications, newest last. Oldest toasts are evicted first.
#[derive(Debug)]
pub struct ToastQueue {
    toasts: VecDeque<Toast>,
    duration: Duration,
}

impl ToastQueue {
    pub fn new(duration: Duration) -> Self {
        Self {
            toasts: VecDeque::new(),
            duration,
        }
    }

    pub fn push(&mut self, notice: Notice, now: Instant) {
        self.toasts.push_back(Toast {
            notice,
            expires_at: now + self.duration,
        });
        while self.toasts.len() > MAX_VISIBLE_TOASTS {
            self.toasts.pop_front();
        }
    }

    pub fn expire(&mut self, now: Instant) {
        self.toasts.retain(|toast| toast.expires_at > now);
    }

    pub fn dismiss(&mut self, index: usize) {
        self.toasts.remove(index);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toasts_expire_after_their_duration() {
        let start = Instant::now();
        let mut queue = ToastQueue::new(Duration::from_secs(5));
        queue.push(Notice::success("Product removed from cart"), start);
        queue.push(Notice::error("Network Error"), start + Duration::from_secs(3));

        queue.expire(start + Duration::from_secs(4));
        assert_eq!(queue.len(), 2);

        queue.expire(start + Duration::from_secs(5));
        assert_eq!(queue.len(), 1);
        assert!(queue.iter().all(Toast::is_error));

        queue.expire(start + Duration::from_secs(9));
        assert!(queue.is_empty());
    }

    #[test]
    fn keeps_only_the_newest_toasts() {
        let now = Instant::now();
        let mut queue = ToastQueue::new(Duration::from_secs(5));
        for n in 0..6 {
            queue.push(Notice::error(format!("failure {n}")), now);
        }

        let messages: Vec<_> = queue.iter().map(|toast| toast.notice.message.as_str()).collect();
        assert_eq!(messages, vec!["failure 2", "failure 3", "failure 4", "failure 5"]);
    }

    #[test]
    fn dismiss_removes_a_single_toast() {
        let now = Instant::now();
        let mut queue = ToastQueue::new(Duration::from_secs(5));
        queue.push(Notice::success("a"), now);
        queue.push(Notice::success("b"), now);

        queue.dismiss(0);
        queue.dismiss(7);

        let messages: Vec<_> = queue.iter().map(|toast| toast.notice.message.as_str()).collect();
        assert_eq!(messages, vec!["b"]);
    }
}

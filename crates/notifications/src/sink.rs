use chrono::{DateTime, Utc};

/// Write-only side of the notification feed.
pub trait NotificationSink {
    fn notify(&mut self, title: &str, message: &str, at: DateTime<Utc>);
}

impl<S: NotificationSink + ?Sized> NotificationSink for &mut S {
    fn notify(&mut self, title: &str, message: &str, at: DateTime<Utc>) {
        (**self).notify(title, message, at);
    }
}

/// Collects `(title, message)` pairs. Handy where nobody reads the feed.
impl NotificationSink for Vec<(String, String)> {
    fn notify(&mut self, title: &str, message: &str, _at: DateTime<Utc>) {
        self.push((title.to_string(), message.to_string()));
    }
}

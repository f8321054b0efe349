use chrono::{DateTime, Utc};

/// Human-readable age of an entry relative to `now`.
///
/// Entries without a timestamp are "Recently"; timestamps in the future
/// count as "Just now".
pub fn time_ago(published: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(published) = published else {
        return "Recently".to_string();
    };

    let diff = now.signed_duration_since(published);
    if diff.num_seconds() < 0 {
        return "Just now".to_string();
    }

    match diff.num_days() {
        0 => match diff.num_hours() {
            0 => "Just now".to_string(),
            1 => "1 hour ago".to_string(),
            hours => format!("{} hours ago", hours),
        },
        1 => "1 day ago".to_string(),
        days => format!("{} days ago", days),
    }
}

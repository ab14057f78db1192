use crate::models::{QueueEntry, QueueStatus};
use time::OffsetDateTime;

/// Queue figures shown above the queue board.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueueAnalytics {
    /// Waiting plus in progress.
    pub total_in_queue: usize,
    pub currently_waiting: usize,
    pub served_today: usize,
    /// Mean minutes from check-in to completion over today's completions.
    pub average_wait_minutes: f64,
    pub no_show_today: usize,
    pub total_entries: usize,
}

fn same_day(at: OffsetDateTime, now: OffsetDateTime) -> bool {
    at.to_offset(now.offset()).date() == now.date()
}

/// Computes the figures from the full queue collection. `now` decides what
/// "today" means, in its own offset.
pub fn summarize(entries: &[QueueEntry], now: OffsetDateTime) -> QueueAnalytics {
    let served: Vec<&QueueEntry> = entries
        .iter()
        .filter(|e| e.status == QueueStatus::Completed)
        .filter(|e| e.completed_at.is_some_and(|at| same_day(at, now)))
        .collect();

    let waits: Vec<f64> = served
        .iter()
        .filter_map(|e| e.completed_at.map(|done| done - e.check_in_time))
        .map(|wait| wait.abs().whole_seconds() as f64 / 60.0)
        .collect();
    let average_wait_minutes = if waits.is_empty() {
        0.0
    } else {
        waits.iter().sum::<f64>() / waits.len() as f64
    };

    QueueAnalytics {
        total_in_queue: entries
            .iter()
            .filter(|e| matches!(e.status, QueueStatus::Waiting | QueueStatus::InProgress))
            .count(),
        currently_waiting: entries
            .iter()
            .filter(|e| e.status == QueueStatus::Waiting)
            .count(),
        served_today: served.len(),
        average_wait_minutes,
        no_show_today: entries
            .iter()
            .filter(|e| e.status == QueueStatus::NoShow)
            .filter(|e| same_day(e.updated_at.unwrap_or(e.check_in_time), now))
            .count(),
        total_entries: entries.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn entry(status: QueueStatus, check_in: OffsetDateTime) -> QueueEntry {
        QueueEntry {
            id: 0,
            patient_id: 1,
            department_id: 1,
            ticket_number: "Q000001".into(),
            position: 1,
            status,
            check_in_time: check_in,
            completed_at: None,
            updated_at: None,
            notes: String::new(),
        }
    }

    fn completed(check_in: OffsetDateTime, done: OffsetDateTime) -> QueueEntry {
        QueueEntry {
            completed_at: Some(done),
            updated_at: Some(done),
            ..entry(QueueStatus::Completed, check_in)
        }
    }

    const NOW: OffsetDateTime = datetime!(2024-06-03 15:00 UTC);

    #[test]
    fn empty_queue_has_zero_average() {
        let stats = summarize(&[], NOW);
        assert_eq!(stats, QueueAnalytics::default());
    }

    #[test]
    fn average_covers_only_todays_completions() {
        let entries = vec![
            completed(datetime!(2024-06-03 08:00 UTC), datetime!(2024-06-03 08:30 UTC)),
            completed(datetime!(2024-06-03 09:00 UTC), datetime!(2024-06-03 10:00 UTC)),
            completed(datetime!(2024-06-02 09:00 UTC), datetime!(2024-06-02 13:00 UTC)),
            entry(QueueStatus::Waiting, datetime!(2024-06-03 14:00 UTC)),
            entry(QueueStatus::InProgress, datetime!(2024-06-03 13:00 UTC)),
        ];
        let stats = summarize(&entries, NOW);
        assert_eq!(stats.served_today, 2);
        assert_eq!(stats.average_wait_minutes, 45.0);
        assert_eq!(stats.total_in_queue, 2);
        assert_eq!(stats.currently_waiting, 1);
        assert_eq!(stats.total_entries, 5);
    }

    #[test]
    fn nothing_completed_today_means_zero_average() {
        let entries = vec![completed(
            datetime!(2024-06-02 09:00 UTC),
            datetime!(2024-06-02 09:40 UTC),
        )];
        let stats = summarize(&entries, NOW);
        assert_eq!(stats.served_today, 0);
        assert_eq!(stats.average_wait_minutes, 0.0);
    }

    #[test]
    fn today_is_judged_in_the_local_offset() {
        let now = datetime!(2024-06-03 09:00 -05:00);
        // 02:00 UTC on the 4th is still the evening of the 3rd at -05:00.
        let late = completed(datetime!(2024-06-04 01:00 UTC), datetime!(2024-06-04 02:00 UTC));
        assert_eq!(summarize(&[late], now).served_today, 1);
    }

    #[test]
    fn no_shows_count_by_last_status_change() {
        let mut today = entry(QueueStatus::NoShow, datetime!(2024-06-02 23:00 UTC));
        today.updated_at = Some(datetime!(2024-06-03 07:00 UTC));
        let yesterday = entry(QueueStatus::NoShow, datetime!(2024-06-02 08:00 UTC));
        assert_eq!(summarize(&[today, yesterday], NOW).no_show_today, 1);
    }
}

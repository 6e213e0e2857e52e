use chrono::Utc;
use contracts::shared::logger::LogEntry;
use once_cell::sync::Lazy;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Сколько последних записей хранится в памяти
const CAPACITY: usize = 1000;

struct LogBuffer {
    next_id: i64,
    entries: VecDeque<LogEntry>,
}

static LOG: Lazy<Mutex<LogBuffer>> = Lazy::new(|| {
    Mutex::new(LogBuffer {
        next_id: 1,
        entries: VecDeque::with_capacity(CAPACITY),
    })
});

/// Добавить запись в лог (внутренняя функция)
pub fn log_event_internal(source: &str, category: &str, message: &str) {
    match category {
        "pricing" => tracing::warn!(target: "event_log", "[{category}] {message}"),
        _ => tracing::info!(target: "event_log", "[{category}] {message}"),
    }
    log_event(source, category, message);
}

/// Добавить запись в лог; самые старые записи вытесняются
pub fn log_event(source: &str, category: &str, message: &str) -> i64 {
    let now = Utc::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string();
    let mut log = LOG.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

    let id = log.next_id;
    log.next_id += 1;
    if log.entries.len() == CAPACITY {
        log.entries.pop_front();
    }
    log.entries.push_back(LogEntry {
        id,
        timestamp: now,
        source: source.to_string(),
        category: category.to_string(),
        message: message.to_string(),
    });
    id
}

/// Получить все записи лога (новые сверху)
pub fn get_all_logs() -> Vec<LogEntry> {
    let log = LOG.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    log.entries.iter().rev().cloned().collect()
}

/// Очистить все записи лога
pub fn clear_all_logs() {
    let mut log = LOG.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    log.entries.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event_is_listed_newest_first() {
        let first = log_event("client", "test_listing", "uno");
        let second = log_event("client", "test_listing", "dos");
        assert!(second > first);

        let ours: Vec<_> = get_all_logs()
            .into_iter()
            .filter(|e| e.category == "test_listing")
            .collect();
        assert_eq!(ours[0].message, "dos");
        assert_eq!(ours[1].message, "uno");
    }
}

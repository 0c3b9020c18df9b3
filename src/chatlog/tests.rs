use super::*;
use tempfile::TempDir;

fn entry(role: &str, content: &str, timestamp: i64) -> LogEntry {
    LogEntry {
        user_id: "user-1".to_string(),
        chat_id: "chat-1".to_string(),
        client_ip: "203.0.113.7".to_string(),
        timestamp,
        model: None,
        completed: None,
        role: role.to_string(),
        content: content.to_string(),
    }
}

fn pair() -> Vec<LogEntry> {
    vec![
        entry("user", "hello", 1_700_000_000),
        LogEntry {
            model: Some("qwen".to_string()),
            completed: Some(true),
            ..entry("assistant", "hi there", 1_700_000_005)
        },
    ]
}

#[test]
fn test_append_and_read_back() {
    let log = ChatLog::open_in_memory().unwrap();
    log.append(&pair()).unwrap();

    let entries = log.entries_for_chat("user-1", "chat-1").unwrap();
    assert_eq!(entries, pair());
    assert_eq!(log.len().unwrap(), 2);
}

#[test]
fn test_append_rejects_wrong_count() {
    let log = ChatLog::open_in_memory().unwrap();

    let one = vec![entry("user", "hello", 1)];
    assert!(matches!(
        log.append(&one),
        Err(LogError::WrongPairCount { got: 1 })
    ));

    let mut three = pair();
    three.push(entry("user", "again", 2));
    assert!(matches!(
        log.append(&three),
        Err(LogError::WrongPairCount { got: 3 })
    ));

    assert!(log.append(&[]).is_err());
    assert!(log.is_empty().unwrap());
}

#[test]
fn test_append_validates_before_writing() {
    let log = ChatLog::open_in_memory().unwrap();

    let mut entries = pair();
    entries[1].role = String::new();

    let err = log.append(&entries).unwrap_err();
    assert!(matches!(err, LogError::MissingField { field: "role" }));
    assert!(err.is_client_error());
    assert!(log.is_empty().unwrap());
}

#[test]
fn test_entries_scoped_to_chat() {
    let log = ChatLog::open_in_memory().unwrap();
    log.append(&pair()).unwrap();

    let other: Vec<LogEntry> = pair()
        .into_iter()
        .map(|e| LogEntry {
            chat_id: "chat-2".to_string(),
            ..e
        })
        .collect();
    log.append(&other).unwrap();

    assert_eq!(log.entries_for_chat("user-1", "chat-1").unwrap().len(), 2);
    assert_eq!(log.entries_for_chat("user-1", "chat-2").unwrap().len(), 2);
    assert!(log.entries_for_chat("user-2", "chat-1").unwrap().is_empty());
    assert_eq!(log.len().unwrap(), 4);
}

#[test]
fn test_open_persists_across_handles() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("db.sqlite3");

    {
        let log = ChatLog::open(&path).unwrap();
        log.append(&pair()).unwrap();
    }

    let reopened = ChatLog::open(&path).unwrap();
    assert_eq!(reopened.entries_for_chat("user-1", "chat-1").unwrap(), pair());
}

#[test]
fn test_open_directory_fails() {
    let dir = TempDir::new().unwrap();
    assert!(ChatLog::open(dir.path()).is_err());
}

#[tokio::test]
async fn test_append_async() {
    let log = ChatLog::open_in_memory().unwrap();
    log.append_async(pair()).await.unwrap();
    assert_eq!(log.len().unwrap(), 2);

    let err = log.append_async(vec![]).await.unwrap_err();
    assert!(err.is_client_error());
}

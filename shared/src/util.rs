use chrono::{DateTime, Utc};

/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Current instant, the timestamp type every model carries
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Random UUID v4 string, used for locally assigned record ids
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Keep only ASCII digits (phone numbers for wa.me links)
pub fn digits_only(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_are_distinct() {
        assert_ne!(new_id(), new_id());
    }

    #[test]
    fn digits_only_strips_formatting() {
        assert_eq!(digits_only("+91 98765-43210"), "919876543210");
        assert_eq!(digits_only("n/a"), "");
    }
}

use chrono::{DateTime, Utc};

pub const REPORT_PREFIX: &str = "lineCountsByDateByVersion";

pub fn report_file_name(timestamp: &DateTime<Utc>) -> String {
    format!("{REPORT_PREFIX}_{}.json", timestamp.format("%Y-%m-%d_%H-%M-%S"))
}

pub fn short_id(commit_id: &str) -> String {
    commit_id.chars().take(8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn report_name_embeds_timestamp() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        assert_eq!(report_file_name(&ts), "lineCountsByDateByVersion_2024-05-06_07-08-09.json");
    }

    #[test]
    fn short_id_truncates() {
        assert_eq!(short_id("0123456789abcdef"), "01234567");
        assert_eq!(short_id("abc"), "abc");
    }
}

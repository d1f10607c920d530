use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};

/// RFC 3339 in UTC with millisecond precision, the format every response uses.
pub fn datetime_to_string(datetime: DateTime<FixedOffset>) -> String {
    datetime
        .with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Trims and drops empty entries from a submitted URL list.
pub fn clean_urls(urls: Option<Vec<String>>) -> Vec<String> {
    urls.unwrap_or_default()
        .into_iter()
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

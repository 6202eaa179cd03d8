use crate::error::Error;
use crate::line;
use crate::models::booking::{Booking, UNKNOWN};
use crate::models::line::PushMessage;
use crate::models::State;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

/// Japan Standard Time, no daylight saving.
const JST_OFFSET_SECS: i32 = 9 * 3600;
const WEEKDAYS: [&str; 7] = ["月", "火", "水", "木", "金", "土", "日"];
/// Epoch values at or above this are taken as milliseconds.
const EPOCH_MILLIS_FROM: i64 = 100_000_000_000;
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Pushes a notification about the booking in `payload` to the admin.
///
/// Only a missing access token is reported as an error. A missing recipient
/// skips the push, and a failed push is logged and swallowed: the webhook
/// sender must not retry because of our own delivery problems.
pub async fn notify(state: State, payload: Value) -> Result<(), Error> {
    let booking = Booking::from_payload(&payload);
    let text = format_booking_notification(&booking);

    let token = state
        .config
        .channel_access_token
        .as_deref()
        .ok_or(Error::MissingConfig("LINE_CHANNEL_ACCESS_TOKEN"))?;
    let client = line::Client::new(
        state.http.clone(),
        state.config.api_base.clone(),
        token,
    );

    let to = match &state.config.admin_user_id {
        Some(to) => to,
        None => {
            log::warn!(
                "LINE_ADMIN_USER_ID not set, dropping notification: {:?}",
                text
            );
            return Ok(());
        }
    };

    let msg_out = PushMessage::text(to.clone(), text);
    log::debug!("push: {:?}", msg_out);
    match client.push_message(&msg_out).await {
        Ok(()) => log::info!("notified {} about booking of {}", to, booking.name),
        Err(e) => log::error!("failed to notify {} due to: {}", to, e),
    }
    Ok(())
}

pub fn format_booking_notification(booking: &Booking) -> String {
    format!(
        "📅 新しい予約が入りました\n\
         \n\
         👤 お名前: {name} 様\n\
         🕐 日時: {time}\n\
         📧 メール: {email}\n\
         📝 メッセージ:\n\
         {notes}",
        name = booking.name,
        time = format_time_range(booking.start.as_deref(), &booking.end),
        email = booking.email,
        notes = booking.notes,
    )
}

/// `start〜end` in JST, or the raw strings if any of them is not a timestamp.
fn format_time_range(start: Option<&str>, end: &str) -> String {
    let start = match start {
        Some(start) => start,
        None => return UNKNOWN.to_string(),
    };

    let formatted = if end.is_empty() {
        format_jst(start)
    } else {
        format_jst(start)
            .zip(format_jst(end))
            .map(|(start, end)| format!("{}〜{}", start, end))
    };

    formatted.unwrap_or_else(|| {
        if end.is_empty() {
            start.to_string()
        } else {
            format!("{}〜{}", start, end)
        }
    })
}

fn format_jst(s: &str) -> Option<String> {
    let jst = FixedOffset::east_opt(JST_OFFSET_SECS)?;
    let dt = parse_timestamp(s, &jst)?.with_timezone(&jst);
    let weekday = WEEKDAYS[dt.weekday().num_days_from_monday() as usize];
    Some(format!(
        "{}({}), {}",
        dt.format("%Y/%m/%d"),
        weekday,
        dt.format("%H:%M")
    ))
}

/// RFC 3339, a naive date-time taken as UTC, a bare date at midnight in
/// `local`, or epoch seconds/milliseconds.
fn parse_timestamp(s: &str, local: &FixedOffset) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(Utc.from_utc_datetime(&naive));
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        let midnight = local.from_local_datetime(&date.and_hms_opt(0, 0, 0)?);
        return midnight.single().map(|dt| dt.with_timezone(&Utc));
    }
    let epoch: i64 = s.parse().ok()?;
    if epoch >= EPOCH_MILLIS_FROM {
        DateTime::from_timestamp_millis(epoch)
    } else {
        DateTime::from_timestamp(epoch, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::booking::{NO_NAME, NO_NOTES};

    fn booking(start: Option<&str>, end: &str) -> Booking {
        Booking {
            name: "山田太郎".to_string(),
            email: "taro@example.com".to_string(),
            start: start.map(str::to_string),
            end: end.to_string(),
            notes: "よろしくお願いします".to_string(),
        }
    }

    #[test]
    fn test_format_jst() {
        assert_eq!(
            format_jst("2024-05-01T01:00:00Z").as_deref(),
            Some("2024/05/01(水), 10:00")
        );
        assert_eq!(
            format_jst("2024-05-01T10:30:00+09:00").as_deref(),
            Some("2024/05/01(水), 10:30")
        );
        assert_eq!(
            format_jst("2024-05-05 15:00").as_deref(),
            Some("2024/05/06(月), 00:00")
        );
        assert_eq!(format_jst("tomorrow at noon"), None);
    }

    #[test]
    fn test_format_jst_date_and_epoch() {
        assert_eq!(
            format_jst("2024-05-01").as_deref(),
            Some("2024/05/01(水), 00:00")
        );
        assert_eq!(
            format_jst("1714525200").as_deref(),
            Some("2024/05/01(水), 10:00")
        );
        assert_eq!(
            format_jst("1714525200000").as_deref(),
            Some("2024/05/01(水), 10:00")
        );
        assert_eq!(format_jst("2024-13-01"), None);
    }

    #[test]
    fn test_format_time_range() {
        assert_eq!(format_time_range(None, ""), UNKNOWN);
        assert_eq!(
            format_time_range(
                Some("2024-05-01T10:00:00+09:00"),
                "2024-05-01T11:00:00+09:00"
            ),
            "2024/05/01(水), 10:00〜2024/05/01(水), 11:00"
        );
        assert_eq!(
            format_time_range(Some("2024-05-01T10:00:00+09:00"), ""),
            "2024/05/01(水), 10:00"
        );
        assert_eq!(format_time_range(Some("来週の月曜"), ""), "来週の月曜");
        assert_eq!(
            format_time_range(Some("来週の月曜"), "2024-05-01T11:00:00+09:00"),
            "来週の月曜〜2024-05-01T11:00:00+09:00"
        );
        assert_eq!(
            format_time_range(Some("2024-05-01T10:00:00+09:00"), "11時"),
            "2024-05-01T10:00:00+09:00〜11時"
        );
    }

    #[test]
    fn test_format_booking_notification() {
        let text = format_booking_notification(&booking(
            Some("2024-05-01T10:00:00+09:00"),
            "2024-05-01T11:00:00+09:00",
        ));
        assert_eq!(
            text,
            "📅 新しい予約が入りました\n\
             \n\
             👤 お名前: 山田太郎 様\n\
             🕐 日時: 2024/05/01(水), 10:00〜2024/05/01(水), 11:00\n\
             📧 メール: taro@example.com\n\
             📝 メッセージ:\n\
             よろしくお願いします"
        );
    }

    #[test]
    fn test_format_placeholders() {
        let text = format_booking_notification(&Booking::from_payload(&serde_json::json!({})));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[2], format!("👤 お名前: {} 様", NO_NAME));
        assert_eq!(lines[3], "🕐 日時: unknown");
        assert_eq!(lines[4], "📧 メール: unknown");
        assert_eq!(lines[6], NO_NOTES);
    }
}

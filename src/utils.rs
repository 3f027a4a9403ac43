#[macro_export]
macro_rules! post_funcs {
    ( $( ( $func_name:ident, $url:expr, $request:ty, $response:ty ) ),+ $(,)? ) => {
        $(
            paste::paste! {
                #[post($url)]
                async fn $func_name(
                    state: web::Data<$crate::AppState>,
                    info: web::Json<$request>
                ) -> impl Responder {
                    let response = match [<$func_name _impl>](state, info).await {
                        Ok(response) => response,
                        Err(err) => {
                            tracing::warn!(endpoint = $url, "{:#}", err);
                            $response::err(err.to_string())
                        }
                    };
                    HttpResponse::Ok().json(response)
                }
            }
        )+
    };
}

use anyhow::{anyhow, bail, Context};
use blake2::{Blake2b, Digest};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use pbkdf2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Pbkdf2,
};
use rand::Rng;

const DEFAULT_PAGE_LIMIT: i64 = 30;

pub fn parse_time_str<S: AsRef<str>>(s: S) -> anyhow::Result<NaiveDateTime> {
    const TIME_FMT: &str = "%Y-%m-%dT%H:%M:%S%.f%:z";
    const TIME_FMT_SPECIAL: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

    let s = s.as_ref();
    if let Some('Z') = s.chars().last() {
        NaiveDateTime::parse_from_str(s, TIME_FMT_SPECIAL).context("Invalid time format")
    } else {
        DateTime::parse_from_str(s, TIME_FMT)
            .context("Invalid time format")
            .map(|t| t.naive_utc())
    }
}

pub fn parse_time_pair_str_opt<S1: AsRef<str>, S2: AsRef<str>>(
    start_time: Option<S1>,
    end_time: Option<S2>,
) -> anyhow::Result<(NaiveDateTime, NaiveDateTime)> {
    let time_min = parse_time_str("1901-01-01T00:00:00.0000Z")?;
    let time_max = parse_time_str("2901-01-01T00:00:00.0000Z")?;
    let start_time = start_time.map_or(Ok(time_min), |t| {
        parse_time_str(t).context("Invalid format on 'start_time'")
    })?;
    let end_time = end_time.map_or(Ok(time_max), |t| {
        parse_time_str(t).context("Invalid format on 'end_time'")
    })?;
    if start_time > end_time {
        bail!("Invalid time interval");
    }
    Ok((start_time, end_time))
}

/// Accepts `YYYY-MM-DD` or a full timestamp, which is taken as its UTC date.
pub fn parse_date_str<S: AsRef<str>>(s: S) -> anyhow::Result<NaiveDate> {
    let s = s.as_ref().trim();
    if s.len() > 10 {
        return parse_time_str(s)
            .map(|t| t.date())
            .context("Invalid date format");
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").context("Invalid date format")
}

/// First and last instant of a calendar day.
pub fn day_bounds(date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = date.and_time(NaiveTime::from_hms(0, 0, 0));
    let end = date.and_time(NaiveTime::from_hms_milli(23, 59, 59, 999));
    (start, end)
}

pub fn format_time_str(time: &NaiveDateTime) -> String {
    const TIME_FMT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    format!("{}+00:00", time.format(TIME_FMT))
}

pub fn get_str_pattern<S: AsRef<str>>(s: S) -> String {
    format!("%{}%", s.as_ref())
}

pub fn get_str_pattern_opt<S: AsRef<str>>(s: Option<S>) -> String {
    match s {
        Some(s) => get_str_pattern(s),
        None => "%".to_string(),
    }
}

pub fn get_page(first_index: Option<i64>, limit: Option<i64>) -> (i64, i64) {
    (
        first_index.unwrap_or(0).max(0),
        limit.unwrap_or(DEFAULT_PAGE_LIMIT).max(0),
    )
}

/// PBKDF2 hash in PHC string form, with a fresh random salt.
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let mut salt = [0u8; 16];
    rand::thread_rng().fill(&mut salt);
    let salt = SaltString::encode_b64(&salt).map_err(|e| anyhow!("Salt encoding: {}", e))?;
    let hash = Pbkdf2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("Password hashing: {}", e))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Pbkdf2.verify_password(password.as_bytes(), &parsed).is_ok(),
        Err(_) => false,
    }
}

pub fn generate_login_token(user_id: u64, role: &str, login_time: &NaiveDateTime) -> String {
    let mut nonce = [0u8; 32];
    rand::thread_rng().fill(&mut nonce);

    let mut hasher = Blake2b::new();
    hasher.update(format!("{}:{}:{}:", user_id, role, login_time.timestamp_nanos()).as_bytes());
    hasher.update(&nonce);
    format!("{:x}", hasher.finalize())
}

pub fn assert_email_str(email: &str) -> anyhow::Result<()> {
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");
    if local.is_empty() || !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.')
    {
        bail!("Invalid email format");
    }
    if email.chars().any(char::is_whitespace) {
        bail!("Invalid email format");
    }
    Ok(())
}

/// Trims an optional text field, turning blanks into `None`.
pub fn trim_opt(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_utc_and_offset_timestamps() {
        let utc = parse_time_str("2026-10-20T09:00:00.000Z").unwrap();
        assert_eq!(utc.hour(), 9);

        let offset = parse_time_str("2026-10-20T16:00:00+07:00").unwrap();
        assert_eq!(offset, utc);

        assert!(parse_time_str("20/10/2026").is_err());
    }

    #[test]
    fn time_pair_defaults_cover_everything() {
        let (start, end) = parse_time_pair_str_opt::<&str, &str>(None, None).unwrap();
        assert_eq!(start.year(), 1901);
        assert_eq!(end.year(), 2901);

        let reversed =
            parse_time_pair_str_opt(Some("2026-10-21T00:00:00Z"), Some("2026-10-20T00:00:00Z"));
        assert!(reversed.is_err());
    }

    #[test]
    fn date_accepts_plain_and_full_forms() {
        let plain = parse_date_str("2026-10-20").unwrap();
        let full = parse_date_str("2026-10-20T17:00:00.000Z").unwrap();
        assert_eq!(plain, full);
        assert!(parse_date_str("tomorrow").is_err());
        assert!(parse_date_str("2026-10-20 junk").is_err());
    }

    #[test]
    fn offset_timestamp_maps_to_utc_date() {
        let date = parse_date_str("2026-10-20T00:00:00+07:00").unwrap();
        assert_eq!(date, NaiveDate::from_ymd(2026, 10, 19));
    }

    #[test]
    fn day_bounds_span_whole_day() {
        let (start, end) = day_bounds(NaiveDate::from_ymd(2026, 10, 20));
        assert_eq!(start.hour(), 0);
        assert_eq!(end.hour(), 23);
        assert_eq!(end.date(), start.date());
    }

    #[test]
    fn password_hash_verifies_and_uses_fresh_salt() {
        let a = hash_password("secret").unwrap();
        let b = hash_password("secret").unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("$pbkdf2-sha256$"));
        assert!(verify_password("secret", &a));
        assert!(verify_password("secret", &b));
        assert!(!verify_password("Secret", &a));
        assert!(!verify_password("secret", "not-a-phc-string"));
    }

    #[test]
    fn login_tokens_differ_for_same_login() {
        let t = NaiveDate::from_ymd(2026, 10, 20).and_hms(9, 0, 0);
        let a = generate_login_token(1, "admin", &t);
        let b = generate_login_token(1, "admin", &t);
        assert_ne!(a, b);
        assert_eq!(a.len(), 128);
    }

    #[test]
    fn email_validation() {
        assert!(assert_email_str("jane@example.com").is_ok());
        assert!(assert_email_str("jane@example").is_err());
        assert!(assert_email_str("@example.com").is_err());
        assert!(assert_email_str("jane doe@example.com").is_err());
    }

    #[test]
    fn page_is_clamped() {
        assert_eq!(get_page(None, None), (0, 30));
        assert_eq!(get_page(Some(-5), Some(-1)), (0, 0));
    }
}

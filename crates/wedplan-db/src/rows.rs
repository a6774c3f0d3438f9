//! Conversions shared by the row structs of every repository.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::DbError;

pub(crate) fn parse_uuid(field: &str, raw: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(raw).map_err(|e| DbError::Decode(format!("invalid {field} UUID: {e}")))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, DbError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| DbError::Decode(format!("invalid wedding date {raw}: {e}")))
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub(crate) fn parse_enum<T: std::str::FromStr<Err = String>>(raw: &str) -> Result<T, DbError> {
    raw.parse().map_err(DbError::Decode)
}

const DATE_FORMAT: &str = "%Y-%m-%d";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_are_stored_as_iso_strings() {
        let date = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        assert_eq!(format_date(date), "2025-12-01");
        assert_eq!(parse_date("2025-12-01").unwrap(), date);
    }

    #[test]
    fn malformed_uuid_is_a_decode_error() {
        assert!(matches!(
            parse_uuid("order", "nope"),
            Err(DbError::Decode(_))
        ));
    }
}

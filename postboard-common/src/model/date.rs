use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{Error, Unexpected},
};
use thiserror::Error;
use time::{
    Date, OffsetDateTime, PrimitiveDateTime, UtcDateTime,
    format_description::{BorrowedFormatItem, well_known::Rfc3339},
    macros::format_description,
};

const NAIVE_DATE_TIME: &[BorrowedFormatItem<'_>] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute][optional [:[second][optional [.[subsecond]]]]]"
);
const OFFSET_DATE_TIME: &[BorrowedFormatItem<'_>] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute][optional [:[second][optional [.[subsecond]]]]][offset_hour sign:mandatory][optional [[optional [:]][offset_minute]]]"
);
const DATE_ONLY: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// A post's publication timestamp.
///
/// The source text is kept so responses echo the date exactly as it was loaded.
/// Naive timestamps (no offset) are read as UTC, not as the server's local
/// time, so availability does not depend on the host's time zone.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct PublicationDate {
    raw: String,
    instant: UtcDateTime,
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The publication date is not an ISO-8601 timestamp: {0}")]
pub struct InvalidPublicationDateError(String);

impl PublicationDate {
    pub fn parse(raw: String) -> Result<Self, InvalidPublicationDateError> {
        match parse_instant(&raw) {
            Some(instant) => Ok(Self { raw, instant }),
            None => Err(InvalidPublicationDateError(raw)),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn instant(&self) -> UtcDateTime {
        self.instant
    }
}

fn parse_instant(raw: &str) -> Option<UtcDateTime> {
    let mut normalized = raw.trim().replacen(' ', "T", 1);
    if normalized.ends_with(['Z', 'z']) {
        normalized.pop();
        normalized.push_str("+00:00");
    }

    if let Ok(date_time) = OffsetDateTime::parse(&normalized, &Rfc3339) {
        return Some(date_time.to_utc());
    }
    if let Ok(date_time) = OffsetDateTime::parse(&normalized, OFFSET_DATE_TIME) {
        return Some(date_time.to_utc());
    }
    if let Ok(date_time) = PrimitiveDateTime::parse(&normalized, NAIVE_DATE_TIME) {
        return Some(date_time.as_utc());
    }

    Date::parse(&normalized, DATE_ONLY)
        .ok()
        .map(|date| date.midnight().as_utc())
}

impl TryFrom<String> for PublicationDate {
    type Error = InvalidPublicationDateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl Serialize for PublicationDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for PublicationDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = String::deserialize(deserializer)?;
        PublicationDate::parse(inner)
            .map_err(|err| Error::invalid_value(Unexpected::Str(&err.0), &"ISO-8601 timestamp"))
    }
}

//! Calendar date utilities.

#[cfg(feature = "postgres")]
use std::error::Error as StdError;
use std::{fmt, str::FromStr};

use derive_more::{Display, Error};
#[cfg(feature = "postgres")]
use postgres_types::{
    accepts, private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql, Type,
};
use time::macros::format_description;

/// Calendar date (without time and offset).
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Date(time::Date);

impl Date {
    /// Returns the current [`Date`] in UTC.
    #[must_use]
    pub fn today() -> Self {
        Self(time::OffsetDateTime::now_utc().date())
    }

    /// Creates a new [`Date`] out of the provided calendar components.
    ///
    /// [`None`] is returned if the components don't form a valid date.
    #[must_use]
    pub fn from_calendar(year: i32, month: u8, day: u8) -> Option<Self> {
        let month = time::Month::try_from(month).ok()?;
        time::Date::from_calendar_date(year, month, day)
            .ok()
            .map(Self)
    }

    /// Parses a [`Date`] in a `dd/MM/yyyy` format.
    ///
    /// Day and month may omit the leading zero (`4/12/2017`), while year
    /// must always have 4 digits.
    ///
    /// # Errors
    ///
    /// If the `input` doesn't match the format or describes a non-existent
    /// date.
    pub fn parse_dmy(input: &str) -> Result<Self, ParseError> {
        time::Date::parse(
            input,
            format_description!(
                "[day padding:none]/[month padding:none]/[year]"
            ),
        )
        .map(Self)
        .map_err(Into::into)
    }

    /// Parses a [`Date`] in an ISO 8601 `yyyy-MM-dd` format.
    ///
    /// # Errors
    ///
    /// If the `input` doesn't match the format or describes a non-existent
    /// date.
    pub fn parse_iso(input: &str) -> Result<Self, ParseError> {
        time::Date::parse(input, format_description!("[year]-[month]-[day]"))
            .map(Self)
            .map_err(Into::into)
    }

    /// Returns the year of this [`Date`].
    #[must_use]
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Returns the month of this [`Date`] (`1..=12`).
    #[must_use]
    pub fn month(&self) -> u8 {
        self.0.month().into()
    }

    /// Returns the day of month of this [`Date`] (`1..=31`).
    #[must_use]
    pub fn day(&self) -> u8 {
        self.0.day()
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year(), self.month(), self.day())
    }
}

impl FromStr for Date {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_iso(s)
    }
}

impl From<time::Date> for Date {
    fn from(date: time::Date) -> Self {
        Self(date)
    }
}

impl From<Date> for time::Date {
    fn from(date: Date) -> Self {
        date.0
    }
}

/// Error of parsing a [`Date`] from a string.
#[derive(Clone, Copy, Debug, Display, Eq, Error, PartialEq)]
pub enum ParseError {
    /// Input doesn't match the expected format, or one of its components
    /// lies outside of its range (like month `13`).
    #[display("invalid date format")]
    Format,

    /// Input matches the format, but describes a non-existent date (like
    /// `31/02/2020`).
    #[display("date is out of range")]
    OutOfRange,
}

impl From<time::error::Parse> for ParseError {
    fn from(e: time::error::Parse) -> Self {
        match e {
            time::error::Parse::TryFromParsed(_) => Self::OutOfRange,
            _ => Self::Format,
        }
    }
}

#[cfg(feature = "postgres")]
impl FromSql<'_> for Date {
    accepts!(DATE);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        time::Date::from_sql(ty, raw).map(Self)
    }
}

#[cfg(feature = "postgres")]
impl ToSql for Date {
    accepts!(DATE);
    to_sql_checked!();

    fn to_sql(
        &self,
        ty: &Type,
        w: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        self.0.to_sql(ty, w)
    }
}

#[cfg(feature = "serde")]
mod serde {
    //! Module providing integration with [`serde`] crate.

    use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

    use super::Date;

    impl Serialize for Date {
        fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
            s.collect_str(self)
        }
    }

    impl<'de> Deserialize<'de> for Date {
        fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
            let s = String::deserialize(d)?;
            Self::parse_iso(&s).map_err(D::Error::custom)
        }
    }
}

#[cfg(test)]
mod spec {
    use super::{Date, ParseError};

    #[test]
    fn parses_dmy_with_short_components() {
        let date = Date::parse_dmy("4/12/2017").unwrap();
        assert_eq!(date, Date::from_calendar(2017, 12, 4).unwrap());

        let date = Date::parse_dmy("04/02/2030").unwrap();
        assert_eq!(date, Date::from_calendar(2030, 2, 4).unwrap());
    }

    #[test]
    fn rejects_malformed_dmy() {
        for input in [
            "4-12-2017",
            "2017/12/04",
            "4/12/17",
            "4/12/2017/1",
            "004/12/2017",
            "a/12/2017",
            "0/1/2020",
            "1/13/2020",
            "32/1/2020",
            "4/12/",
            "",
        ] {
            assert_eq!(
                Date::parse_dmy(input),
                Err(ParseError::Format),
                "input: {input}",
            );
        }
    }

    #[test]
    fn rejects_non_existent_dmy() {
        assert_eq!(Date::parse_dmy("31/02/2020"), Err(ParseError::OutOfRange));
        assert_eq!(Date::parse_dmy("29/2/2021"), Err(ParseError::OutOfRange));
        assert_eq!(
            Date::parse_iso("2021-04-31"),
            Err(ParseError::OutOfRange),
        );
    }

    #[test]
    fn formats_as_iso() {
        let date = Date::from_calendar(2017, 12, 4).unwrap();
        assert_eq!(date.to_string(), "2017-12-04");
        assert_eq!("2017-12-04".parse::<Date>().unwrap(), date);
        assert!("2017-12-4".parse::<Date>().is_err());
    }

    #[test]
    fn today_is_before_tomorrow() {
        let today = Date::today();
        let tomorrow: Date = time::Date::from(today)
            .next_day()
            .unwrap()
            .into();
        assert!(tomorrow > today);
    }
}

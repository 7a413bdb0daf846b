//! Wire field readers and validation messages.

use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use jiff::{
    Timestamp, Unit,
    civil::{Date, DateTime},
    tz::TimeZone,
};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Number, Value};
use url::Url;

/// Key under which errors that do not belong to a single field are reported.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

pub(crate) const REQUIRED: &str = "This field is required.";
const NOT_NULL: &str = "This field may not be null.";
const BLANK: &str = "This field may not be blank.";
const INVALID_INTEGER: &str = "A valid integer is required.";
const INVALID_STRING: &str = "Not a valid string.";
const INVALID_BOOLEAN: &str = "Must be a valid boolean.";
const INVALID_NUMBER: &str = "A valid number is required.";
const INVALID_URL: &str = "Enter a valid URL.";
const INVALID_DATETIME: &str = "Datetime has wrong format. Use one of these formats instead: \
                                YYYY-MM-DDThh:mm[:ss[.uuuuuu]][+HH:MM|-HH:MM|Z].";

const PRICE_MAX_DIGITS: u32 = 8;
const PRICE_DECIMAL_PLACES: u32 = 2;
const URL_MAX_CHARS: usize = 200;

const TRUE_VALUES: [&str; 6] = ["true", "t", "yes", "y", "on", "1"];
const FALSE_VALUES: [&str; 6] = ["false", "f", "no", "n", "off", "0"];

/// Validation failures keyed by wire field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors describing a payload that is not a field map at all.
    #[must_use]
    pub fn non_field(message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(NON_FIELD_ERRORS, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages recorded for a field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// JSON object of field name to message list.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(field, messages)| {
                    (
                        field.clone(),
                        Value::Array(messages.iter().cloned().map(Value::String).collect()),
                    )
                })
                .collect(),
        )
    }
}

impl Display for FieldErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let rendered = self
            .0
            .iter()
            .map(|(field, messages)| format!("{field}: {}", messages.join(" ")))
            .collect::<Vec<_>>()
            .join("; ");

        f.write_str(&rendered)
    }
}

impl std::error::Error for FieldErrors {}

/// Reads fields out of one raw record, collecting every failure.
#[derive(Debug)]
pub(crate) struct Fields<'a> {
    raw: &'a Map<String, Value>,
    errors: FieldErrors,
}

impl<'a> Fields<'a> {
    pub(crate) fn new(raw: &'a Map<String, Value>) -> Self {
        Self {
            raw,
            errors: FieldErrors::new(),
        }
    }

    /// A field that must be present and non-null.
    pub(crate) fn required<T>(
        &mut self,
        field: &str,
        parse: impl FnOnce(&Value) -> Result<T, String>,
    ) -> Option<T> {
        match self.raw.get(field) {
            None => {
                self.errors.add(field, REQUIRED);
                None
            }
            Some(value) => self.present(field, value, parse),
        }
    }

    /// A field that may be omitted but not null.
    pub(crate) fn optional<T>(
        &mut self,
        field: &str,
        parse: impl FnOnce(&Value) -> Result<T, String>,
    ) -> Option<T> {
        let value = self.raw.get(field)?;

        self.present(field, value, parse)
    }

    /// A field that may be omitted or explicitly null.
    pub(crate) fn nullable<T>(
        &mut self,
        field: &str,
        parse: impl FnOnce(&Value) -> Result<T, String>,
    ) -> Option<Option<T>> {
        match self.raw.get(field)? {
            Value::Null => Some(None),
            value => self.check(field, parse(value)).map(Some),
        }
    }

    pub(crate) fn into_errors(self) -> FieldErrors {
        self.errors
    }

    fn present<T>(
        &mut self,
        field: &str,
        value: &Value,
        parse: impl FnOnce(&Value) -> Result<T, String>,
    ) -> Option<T> {
        if value.is_null() {
            self.errors.add(field, NOT_NULL);
            return None;
        }

        self.check(field, parse(value))
    }

    fn check<T>(&mut self, field: &str, result: Result<T, String>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(message) => {
                self.errors.add(field, message);
                None
            }
        }
    }
}

/// Name of a JSON value's type as integrators see it in messages.
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "NoneType",
        Value::Bool(_) => "bool",
        Value::Number(number) if number.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

pub(crate) fn integer(value: &Value) -> Result<i64, String> {
    match value {
        Value::Number(number) => whole_number(number),
        Value::String(text) => Decimal::from_str(text.trim()).ok().and_then(whole_decimal),
        _ => None,
    }
    .ok_or_else(|| INVALID_INTEGER.to_string())
}

/// `4` and `4.0` both read as 4; `4.5` does not.
fn whole_number(number: &Number) -> Option<i64> {
    number.as_i64().or_else(|| {
        number
            .as_f64()
            .and_then(|float| Decimal::try_from(float).ok())
            .and_then(whole_decimal)
    })
}

fn whole_decimal(decimal: Decimal) -> Option<i64> {
    if !decimal.fract().is_zero() {
        return None;
    }

    i64::try_from(decimal).ok()
}

/// Non-blank text of at most `max_chars` characters. Numbers are stringified.
pub(crate) fn text(max_chars: usize) -> impl Fn(&Value) -> Result<String, String> {
    move |value| {
        let text = blank_text(max_chars)(value)?;

        if text.is_empty() {
            return Err(BLANK.to_string());
        }

        Ok(text)
    }
}

/// Text that may be empty, for fields stored as `""` when omitted.
pub(crate) fn blank_text(max_chars: usize) -> impl Fn(&Value) -> Result<String, String> {
    move |value| {
        let text = match value {
            Value::String(text) => text.trim().to_string(),
            Value::Number(number) => number.to_string(),
            _ => return Err(INVALID_STRING.to_string()),
        };

        if text.chars().count() > max_chars {
            return Err(format!(
                "Ensure this field has no more than {max_chars} characters."
            ));
        }

        Ok(text)
    }
}

pub(crate) fn boolean(value: &Value) -> Result<bool, String> {
    let parsed = match value {
        Value::Bool(flag) => Some(*flag),
        Value::Number(number) => match number.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Value::String(text) => {
            let text = text.trim().to_ascii_lowercase();

            if TRUE_VALUES.contains(&text.as_str()) {
                Some(true)
            } else if FALSE_VALUES.contains(&text.as_str()) {
                Some(false)
            } else {
                None
            }
        }
        _ => None,
    };

    parsed.ok_or_else(|| INVALID_BOOLEAN.to_string())
}

/// Non-negative price with at most 8 digits, 2 of them decimal places.
pub(crate) fn price(value: &Value) -> Result<Decimal, String> {
    let raw = match value {
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.trim().to_string(),
        _ => return Err(INVALID_NUMBER.to_string()),
    };

    let mut parsed = Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .map_err(|_error| INVALID_NUMBER.to_string())?;

    let scale = parsed.scale();
    let digits = u32::try_from(parsed.mantissa().unsigned_abs().to_string().len())
        .map_err(|_error| INVALID_NUMBER.to_string())?;
    let (total, whole) = if digits > scale {
        (digits, digits - scale)
    } else {
        (scale, 0)
    };

    if total > PRICE_MAX_DIGITS {
        return Err(format!(
            "Ensure that there are no more than {PRICE_MAX_DIGITS} digits in total."
        ));
    }

    if scale > PRICE_DECIMAL_PLACES {
        return Err(format!(
            "Ensure that there are no more than {PRICE_DECIMAL_PLACES} decimal places."
        ));
    }

    if whole > PRICE_MAX_DIGITS - PRICE_DECIMAL_PLACES {
        return Err(format!(
            "Ensure that there are no more than {} digits before the decimal point.",
            PRICE_MAX_DIGITS - PRICE_DECIMAL_PLACES
        ));
    }

    if parsed.is_sign_negative() && !parsed.is_zero() {
        return Err("Ensure this value is greater than or equal to 0.".to_string());
    }

    parsed.rescale(PRICE_DECIMAL_PLACES);
    parsed.set_sign_positive(true);

    Ok(parsed)
}

/// Absolute http(s) or ftp(s) URL with a host.
pub(crate) fn url(value: &Value) -> Result<String, String> {
    let text = text(URL_MAX_CHARS)(value)?;

    let valid = Url::parse(&text).is_ok_and(|parsed| {
        matches!(parsed.scheme(), "http" | "https" | "ftp" | "ftps")
            && parsed.host_str().is_some_and(|host| !host.is_empty())
    });

    if valid {
        Ok(text)
    } else {
        Err(INVALID_URL.to_string())
    }
}

/// RFC 3339 timestamp; datetimes without an offset and bare dates are read as UTC.
pub(crate) fn timestamp(value: &Value) -> Result<Timestamp, String> {
    let Value::String(text) = value else {
        return Err(INVALID_DATETIME.to_string());
    };

    let text = text.trim();

    text.parse::<Timestamp>()
        .or_else(|_| {
            text.parse::<DateTime>()
                .and_then(|datetime| datetime.to_zoned(TimeZone::UTC))
                .map(|zoned| zoned.timestamp())
        })
        .or_else(|_| {
            text.parse::<Date>()
                .and_then(|date| date.to_zoned(TimeZone::UTC))
                .map(|zoned| zoned.timestamp())
        })
        .and_then(|timestamp| timestamp.round(Unit::Microsecond))
        .map_err(|_error| INVALID_DATETIME.to_string())
}

/// Primary key of a related record.
pub(crate) fn pk(value: &Value) -> Result<i64, String> {
    match value {
        Value::Number(number) => whole_number(number),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
    .ok_or_else(|| {
        format!(
            "Incorrect type. Expected pk value, received {}.",
            type_name(value)
        )
    })
}

/// List of related primary keys. An empty list is valid.
pub(crate) fn pk_list(value: &Value) -> Result<Vec<i64>, String> {
    let Value::Array(items) = value else {
        return Err(format!(
            "Expected a list of items but got type \"{}\".",
            type_name(value)
        ));
    };

    items.iter().map(pk).collect()
}

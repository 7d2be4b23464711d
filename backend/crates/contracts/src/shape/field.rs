//! Field-level shape descriptions and their checks.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde_json::{Number, Value};

use super::ObjectShape;
use super::issue::{Issue, IssueCode, PathSegment};

/// Integers above this magnitude lose precision as `f64`.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StringFormat {
    Email,
    Uuid,
    Url,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct StringRules {
    min_len: Option<usize>,
    max_len: Option<usize>,
    format: Option<StringFormat>,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct NumberRules {
    min: Option<f64>,
    max: Option<f64>,
    integer: bool,
    coerce: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum Kind {
    String(StringRules),
    Number(NumberRules),
    Boolean {
        coerce: bool,
    },
    Date {
        coerce: bool,
    },
    Enum(Vec<String>),
    Object(ObjectShape),
    Array {
        item: Box<FieldShape>,
        min_items: Option<usize>,
        max_items: Option<usize>,
    },
}

/// Declarative description of one field.
///
/// Kind-specific refinements (`min_len`, `int`, `coerce`, ...) only affect the
/// kinds they name and are ignored elsewhere.
///
/// # Examples
/// ```
/// use contracts::{FieldShape, ObjectShape};
/// use serde_json::json;
///
/// let shape = ObjectShape::new()
///     .field("message", FieldShape::string().min_len(1))
///     .field("count", FieldShape::number().coerce().int().optional());
/// let value = shape.validate(&json!({ "message": "hi", "count": "3" })).expect("valid");
/// assert_eq!(value, json!({ "message": "hi", "count": 3 }));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FieldShape {
    kind: Kind,
    optional: bool,
    nullable: bool,
    default: Option<Value>,
}

impl FieldShape {
    const fn of(kind: Kind) -> Self {
        Self {
            kind,
            optional: false,
            nullable: false,
            default: None,
        }
    }

    /// A JSON string.
    #[must_use]
    pub fn string() -> Self {
        Self::of(Kind::String(StringRules::default()))
    }

    /// A JSON number.
    #[must_use]
    pub fn number() -> Self {
        Self::of(Kind::Number(NumberRules::default()))
    }

    /// A JSON boolean.
    #[must_use]
    pub const fn boolean() -> Self {
        Self::of(Kind::Boolean { coerce: false })
    }

    /// A date given as an RFC 3339 timestamp or a `YYYY-MM-DD` string,
    /// normalized to an RFC 3339 UTC timestamp.
    #[must_use]
    pub const fn date() -> Self {
        Self::of(Kind::Date { coerce: false })
    }

    /// A string restricted to the given literals.
    #[must_use]
    pub fn one_of(values: &[&str]) -> Self {
        Self::of(Kind::Enum(values.iter().map(|v| (*v).to_owned()).collect()))
    }

    /// A nested object.
    #[must_use]
    pub const fn object(shape: ObjectShape) -> Self {
        Self::of(Kind::Object(shape))
    }

    /// An array whose items all match `item`.
    #[must_use]
    pub fn array(item: Self) -> Self {
        Self::of(Kind::Array {
            item: Box::new(item),
            min_items: None,
            max_items: None,
        })
    }

    /// The field may be absent.
    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// The field may be `null`.
    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Value substituted when the field is absent. The default is validated
    /// like client input.
    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Minimum string length (characters) or array length (items).
    #[must_use]
    pub fn min_len(mut self, len: usize) -> Self {
        match &mut self.kind {
            Kind::String(rules) => rules.min_len = Some(len),
            Kind::Array { min_items, .. } => *min_items = Some(len),
            _ => {}
        }
        self
    }

    /// Maximum string length (characters) or array length (items).
    #[must_use]
    pub fn max_len(mut self, len: usize) -> Self {
        match &mut self.kind {
            Kind::String(rules) => rules.max_len = Some(len),
            Kind::Array { max_items, .. } => *max_items = Some(len),
            _ => {}
        }
        self
    }

    /// Require an email address.
    #[must_use]
    pub fn email(self) -> Self {
        self.with_format(StringFormat::Email)
    }

    /// Require a UUID.
    #[must_use]
    pub fn uuid(self) -> Self {
        self.with_format(StringFormat::Uuid)
    }

    /// Require an absolute URL.
    #[must_use]
    pub fn url(self) -> Self {
        self.with_format(StringFormat::Url)
    }

    fn with_format(mut self, format: StringFormat) -> Self {
        if let Kind::String(rules) = &mut self.kind {
            rules.format = Some(format);
        }
        self
    }

    /// Inclusive numeric minimum.
    #[must_use]
    pub fn min(mut self, bound: f64) -> Self {
        if let Kind::Number(rules) = &mut self.kind {
            rules.min = Some(bound);
        }
        self
    }

    /// Inclusive numeric maximum.
    #[must_use]
    pub fn max(mut self, bound: f64) -> Self {
        if let Kind::Number(rules) = &mut self.kind {
            rules.max = Some(bound);
        }
        self
    }

    /// Reject numbers with a fractional part.
    #[must_use]
    pub fn int(mut self) -> Self {
        if let Kind::Number(rules) = &mut self.kind {
            rules.integer = true;
        }
        self
    }

    /// Accept string forms: numeric strings for numbers, `"true"`/`"false"`
    /// for booleans, and epoch milliseconds for dates.
    #[must_use]
    pub fn coerce(mut self) -> Self {
        match &mut self.kind {
            Kind::Number(rules) => rules.coerce = true,
            Kind::Boolean { coerce } | Kind::Date { coerce } => *coerce = true,
            _ => {}
        }
        self
    }

    pub(super) const fn mark_optional(&mut self) {
        self.optional = true;
    }

    /// Resolve a possibly-absent field value. `None` means the field is left
    /// out of the normalized output; any violation has been pushed to `issues`.
    pub(super) fn resolve(
        &self,
        value: Option<&Value>,
        path: &[PathSegment],
        issues: &mut Vec<Issue>,
    ) -> Option<Value> {
        match value {
            None => match &self.default {
                Some(default) => self.check(default, path, issues),
                None if self.optional => None,
                None => {
                    issues.push(Issue::new(path, IssueCode::Required, "Required"));
                    None
                }
            },
            Some(Value::Null) if self.nullable => Some(Value::Null),
            Some(present) => self.check(present, path, issues),
        }
    }

    fn check(&self, value: &Value, path: &[PathSegment], issues: &mut Vec<Issue>) -> Option<Value> {
        match &self.kind {
            Kind::String(rules) => check_string(rules, value, path, issues),
            Kind::Number(rules) => check_number(rules, value, path, issues),
            Kind::Boolean { coerce } => check_boolean(*coerce, value, path, issues),
            Kind::Date { coerce } => check_date(*coerce, value, path, issues),
            Kind::Enum(allowed) => check_enum(allowed, value, path, issues),
            Kind::Object(shape) => shape.check(value, path, issues),
            Kind::Array {
                item,
                min_items,
                max_items,
            } => check_array(item, (*min_items, *max_items), value, path, issues),
        }
    }
}

pub(super) const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub(super) fn invalid_type(expected: &str, value: &Value, path: &[PathSegment]) -> Issue {
    Issue::new(
        path,
        IssueCode::InvalidType,
        format!("Expected {expected}, received {}", type_name(value)),
    )
}

fn check_string(
    rules: &StringRules,
    value: &Value,
    path: &[PathSegment],
    issues: &mut Vec<Issue>,
) -> Option<Value> {
    let Value::String(text) = value else {
        issues.push(invalid_type("string", value, path));
        return None;
    };
    let before = issues.len();
    let len = text.chars().count();
    if let Some(min) = rules.min_len.filter(|min| len < *min) {
        issues.push(Issue::new(
            path,
            IssueCode::TooSmall,
            format!("String must contain at least {min} character(s)"),
        ));
    }
    if let Some(max) = rules.max_len.filter(|max| len > *max) {
        issues.push(Issue::new(
            path,
            IssueCode::TooBig,
            format!("String must contain at most {max} character(s)"),
        ));
    }
    if let Some(format) = rules.format {
        let (valid, label) = match format {
            StringFormat::Email => (is_email(text), "email"),
            StringFormat::Uuid => (uuid::Uuid::parse_str(text).is_ok(), "uuid"),
            StringFormat::Url => (url::Url::parse(text).is_ok(), "url"),
        };
        if !valid {
            issues.push(Issue::new(
                path,
                IssueCode::InvalidString,
                format!("Invalid {label}"),
            ));
        }
    }
    (issues.len() == before).then(|| value.clone())
}

fn is_email(text: &str) -> bool {
    let mut parts = text.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && !text.chars().any(char::is_whitespace)
                && domain.contains('.')
                && domain.split('.').all(|label| !label.is_empty())
        }
        _ => false,
    }
}

fn check_number(
    rules: &NumberRules,
    value: &Value,
    path: &[PathSegment],
    issues: &mut Vec<Issue>,
) -> Option<Value> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) if rules.coerce => {
            text.trim().parse::<f64>().ok().filter(|n| n.is_finite())
        }
        _ => None,
    };
    let Some(number) = parsed else {
        issues.push(invalid_type("number", value, path));
        return None;
    };
    let before = issues.len();
    if rules.integer && number.fract() != 0.0 {
        issues.push(Issue::new(
            path,
            IssueCode::NotInteger,
            "Expected integer, received float",
        ));
    }
    if let Some(min) = rules.min.filter(|min| number < *min) {
        issues.push(Issue::new(
            path,
            IssueCode::TooSmall,
            format!("Number must be greater than or equal to {min}"),
        ));
    }
    if let Some(max) = rules.max.filter(|max| number > *max) {
        issues.push(Issue::new(
            path,
            IssueCode::TooBig,
            format!("Number must be less than or equal to {max}"),
        ));
    }
    if issues.len() != before {
        return None;
    }
    Some(normalize_number(value, number))
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "guarded by the integral and safe-range checks"
)]
fn normalize_number(original: &Value, number: f64) -> Value {
    if matches!(original, Value::Number(existing) if existing.is_i64() || existing.is_u64()) {
        return original.clone();
    }
    if number.fract() == 0.0 && number.abs() <= MAX_SAFE_INTEGER {
        return Value::Number(Number::from(number as i64));
    }
    Number::from_f64(number).map_or(Value::Null, Value::Number)
}

fn check_boolean(
    coerce: bool,
    value: &Value,
    path: &[PathSegment],
    issues: &mut Vec<Issue>,
) -> Option<Value> {
    match value {
        Value::Bool(_) => Some(value.clone()),
        Value::String(text) if coerce => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(Value::Bool(true)),
            "false" | "0" => Some(Value::Bool(false)),
            _ => {
                issues.push(invalid_type("boolean", value, path));
                None
            }
        },
        _ => {
            issues.push(invalid_type("boolean", value, path));
            None
        }
    }
}

fn check_date(
    coerce: bool,
    value: &Value,
    path: &[PathSegment],
    issues: &mut Vec<Issue>,
) -> Option<Value> {
    let parsed = match value {
        Value::String(text) => parse_date(text.trim()),
        Value::Number(number) if coerce => {
            number.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis)
        }
        _ => {
            issues.push(invalid_type("date", value, path));
            return None;
        }
    };
    if let Some(instant) = parsed {
        Some(Value::String(
            instant.to_rfc3339_opts(SecondsFormat::Millis, true),
        ))
    } else {
        issues.push(Issue::new(path, IssueCode::InvalidDate, "Invalid date"));
        None
    }
}

fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|stamp| stamp.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|day| day.and_hms_opt(0, 0, 0))
                .map(|midnight| midnight.and_utc())
        })
}

fn check_enum(
    allowed: &[String],
    value: &Value,
    path: &[PathSegment],
    issues: &mut Vec<Issue>,
) -> Option<Value> {
    let Value::String(text) = value else {
        issues.push(invalid_type("string", value, path));
        return None;
    };
    if allowed.iter().any(|candidate| candidate == text) {
        return Some(value.clone());
    }
    let expected = allowed
        .iter()
        .map(|candidate| format!("'{candidate}'"))
        .collect::<Vec<_>>()
        .join(" | ");
    issues.push(Issue::new(
        path,
        IssueCode::InvalidEnumValue,
        format!("Invalid enum value. Expected {expected}, received '{text}'"),
    ));
    None
}

fn check_array(
    item: &FieldShape,
    (min_items, max_items): (Option<usize>, Option<usize>),
    value: &Value,
    path: &[PathSegment],
    issues: &mut Vec<Issue>,
) -> Option<Value> {
    let Value::Array(items) = value else {
        issues.push(invalid_type("array", value, path));
        return None;
    };
    let before = issues.len();
    if let Some(min) = min_items.filter(|min| items.len() < *min) {
        issues.push(Issue::new(
            path,
            IssueCode::TooSmall,
            format!("Array must contain at least {min} element(s)"),
        ));
    }
    if let Some(max) = max_items.filter(|max| items.len() > *max) {
        issues.push(Issue::new(
            path,
            IssueCode::TooBig,
            format!("Array must contain at most {max} element(s)"),
        ));
    }
    let normalized: Vec<Value> = items
        .iter()
        .enumerate()
        .filter_map(|(index, element)| {
            let item_path = super::child(path, PathSegment::Index(index));
            item.resolve(Some(element), &item_path, issues)
        })
        .collect();
    (issues.len() == before).then_some(Value::Array(normalized))
}

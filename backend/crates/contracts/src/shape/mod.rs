//! Declarative input validation.
//!
//! An [`ObjectShape`] describes the fields an untrusted JSON object must
//! carry. Validation is a pure function from input to either a normalized
//! value (coercions and defaults applied, undeclared keys dropped) or a
//! [`ValidationFailure`] listing every violated constraint. Shapes hold no
//! executable hooks, so every failure can be enumerated in one pass.

mod field;
mod issue;

pub use field::FieldShape;
pub use issue::{Issue, IssueCode, PathSegment, ValidationFailure};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

fn child(path: &[PathSegment], segment: PathSegment) -> Vec<PathSegment> {
    let mut extended = Vec::with_capacity(path.len() + 1);
    extended.extend_from_slice(path);
    extended.push(segment);
    extended
}

/// Shape of a JSON object.
///
/// Objects are open by default: undeclared keys are accepted and dropped from
/// the normalized output. [`ObjectShape::closed`] turns them into violations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectShape {
    fields: Vec<(String, FieldShape)>,
    closed: bool,
}

impl ObjectShape {
    /// Empty, open object shape.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a field, replacing any previous declaration with the same name.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, shape: FieldShape) -> Self {
        let key: String = name.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = shape,
            None => self.fields.push((key, shape)),
        }
        self
    }

    /// Reject undeclared keys.
    #[must_use]
    pub const fn closed(mut self) -> Self {
        self.closed = true;
        self
    }

    /// Make every declared field optional.
    #[must_use]
    pub fn partial(mut self) -> Self {
        for (_, field) in &mut self.fields {
            field.mark_optional();
        }
        self
    }

    /// Drop the named fields from the shape.
    #[must_use]
    pub fn omit(mut self, names: &[&str]) -> Self {
        self.fields
            .retain(|(name, _)| !names.iter().any(|omitted| omitted == name));
        self
    }

    /// Declared field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Validate `input` and return the normalized value.
    ///
    /// # Errors
    /// Returns a [`ValidationFailure`] carrying every violation found.
    ///
    /// # Examples
    /// ```
    /// use contracts::{FieldShape, IssueCode, ObjectShape};
    /// use serde_json::json;
    ///
    /// let shape = ObjectShape::new()
    ///     .field("email", FieldShape::string().email())
    ///     .field("age", FieldShape::number().int().min(0.0));
    /// let failure = shape
    ///     .validate(&json!({ "email": "nope", "age": -1 }))
    ///     .expect_err("both fields are invalid");
    /// assert_eq!(failure.issues.len(), 2);
    /// assert_eq!(failure.issues[0].code, IssueCode::InvalidString);
    /// ```
    pub fn validate(&self, input: &Value) -> Result<Value, ValidationFailure> {
        let mut issues = Vec::new();
        let normalized = self.check(input, &[], &mut issues);
        match normalized {
            Some(value) if issues.is_empty() => Ok(value),
            _ => Err(ValidationFailure::new(issues)),
        }
    }

    /// Validate `input` and deserialize the normalized value into `T`.
    ///
    /// # Errors
    /// Returns a [`ValidationFailure`] when validation fails, or a single
    /// root-level `invalid_type` issue when the normalized value does not fit
    /// `T`.
    pub fn validate_into<T: DeserializeOwned>(&self, input: &Value) -> Result<T, ValidationFailure> {
        let normalized = self.validate(input)?;
        serde_json::from_value(normalized)
            .map_err(|err| ValidationFailure::single(IssueCode::InvalidType, err.to_string()))
    }

    fn check(&self, value: &Value, path: &[PathSegment], issues: &mut Vec<Issue>) -> Option<Value> {
        let Value::Object(input) = value else {
            issues.push(field::invalid_type("object", value, path));
            return None;
        };
        let before = issues.len();
        let mut output = Map::new();
        for (name, field) in &self.fields {
            let field_path = child(path, PathSegment::Key(name.clone()));
            if let Some(normalized) = field.resolve(input.get(name), &field_path, issues) {
                output.insert(name.clone(), normalized);
            }
        }
        if self.closed {
            let unknown: Vec<String> = input
                .keys()
                .filter(|key| !self.fields.iter().any(|(name, _)| name == *key))
                .map(|key| format!("'{key}'"))
                .collect();
            if !unknown.is_empty() {
                issues.push(Issue::new(
                    path,
                    IssueCode::UnrecognizedKeys,
                    format!("Unrecognized key(s) in object: {}", unknown.join(", ")),
                ));
            }
        }
        (issues.len() == before).then_some(Value::Object(output))
    }
}

/// Types whose wire form is described by an [`ObjectShape`].
pub trait Shaped: DeserializeOwned {
    /// Shape the raw input must satisfy.
    fn shape() -> ObjectShape;

    /// Validate raw input and build the typed value.
    ///
    /// # Errors
    /// Returns every violation found in `input`.
    fn parse(input: &Value) -> Result<Self, ValidationFailure> {
        Self::shape().validate_into(input)
    }
}

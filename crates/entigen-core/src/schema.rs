//! Declarative configuration schemas.
//!
//! A [`Schema`] is an ordered list of keys, each either required or optional
//! and each checked by a [`Validator`]. Validation walks the whole document and
//! collects every problem instead of stopping at the first one.
//!
//! ```rust
//! use entigen_core::schema::{Schema, Validator};
//! use serde_json::json;
//!
//! let schema = Schema::new()
//!     .required("in_pin", Validator::Pin)
//!     .optional("data_type", Validator::one_of(["u16", "f88"]));
//!
//! let validated = schema.validate(&json!({"in_pin": "GPIO4", "data_type": "f88"})).unwrap();
//! assert_eq!(validated["in_pin"], 4);
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::validation::{ValidationError, ValidationErrorKind, ValidationErrors};

/// Validated key/value mapping.
pub type ConfigMap = Map<String, Value>;

static ICON_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\w\-]+:[\w\-]+$").expect("icon regex"));
static ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").expect("id regex"));
static PERIOD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+)\s*(ms|s|min|h)\s*$").expect("time period regex"));

/// Highest GPIO number accepted by [`Validator::Pin`].
pub const MAX_GPIO: i64 = 39;

/// Whether a key must be present.
#[derive(Debug, Clone, PartialEq)]
pub enum Presence {
    Required,
    /// Optional key. When a default is given it is inserted for absent keys;
    /// without one the key stays absent.
    Optional { default: Option<Value> },
}

/// One key of a schema.
#[derive(Debug, Clone)]
pub struct SchemaKey {
    pub name: String,
    pub presence: Presence,
    pub validator: Validator,
}

impl SchemaKey {
    pub fn is_required(&self) -> bool {
        matches!(self.presence, Presence::Required)
    }

    pub fn default_value(&self) -> Option<&Value> {
        match &self.presence {
            Presence::Optional { default } => default.as_ref(),
            Presence::Required => None,
        }
    }
}

/// Checks and coerces a single value.
#[derive(Debug, Clone)]
pub enum Validator {
    String,
    Boolean,
    /// Integer with optional inclusive bounds.
    Int { min: Option<i64>, max: Option<i64> },
    /// Closed string set.
    OneOf(Vec<String>),
    /// Icon in `prefix:name` form, e.g. `mdi:thermometer`.
    Icon,
    /// A C++ identifier declared by this entry.
    Id,
    /// Like [`Validator::Id`], but generated from the parent key when absent.
    GenerateId { suffix: String },
    /// Reference to an id declared elsewhere; resolved at code generation.
    UseId { type_name: String },
    /// GPIO pin, either a number or `GPIO<n>`.
    Pin,
    /// Duration such as `500ms`, `5s`, `1min`; stored as milliseconds.
    TimePeriod,
    Nested(Schema),
}

impl Validator {
    pub fn one_of<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::OneOf(options.into_iter().map(Into::into).collect())
    }

    pub fn int_range(min: i64, max: i64) -> Self {
        Self::Int {
            min: Some(min),
            max: Some(max),
        }
    }

    fn validate(
        &self,
        value: &Value,
        path: &[String],
        errors: &mut ValidationErrors,
    ) -> Option<Value> {
        let mut fail = |kind: ValidationErrorKind| -> Option<Value> {
            errors.push(ValidationError::new(path.to_vec(), kind));
            None
        };

        match self {
            Self::String => match value {
                Value::String(_) => Some(value.clone()),
                other => fail(mismatch("string", other)),
            },
            Self::Boolean => match value {
                Value::Bool(_) => Some(value.clone()),
                other => fail(mismatch("boolean", other)),
            },
            Self::Int { min, max } => {
                let lo = min.unwrap_or(i64::MIN);
                let hi = max.unwrap_or(i64::MAX);
                let Some(i) = value.as_i64() else {
                    if value.is_u64() {
                        return fail(ValidationErrorKind::OutOfRange {
                            value: i64::MAX,
                            min: lo,
                            max: hi,
                        });
                    }
                    return fail(mismatch("integer", value));
                };
                if i < lo || i > hi {
                    return fail(ValidationErrorKind::OutOfRange {
                        value: i,
                        min: lo,
                        max: hi,
                    });
                }
                Some(Value::from(i))
            }
            Self::OneOf(options) => {
                let Some(s) = value.as_str() else {
                    return fail(mismatch("string", value));
                };
                if options.iter().any(|o| o == s) {
                    Some(value.clone())
                } else {
                    fail(ValidationErrorKind::InvalidOption {
                        value: s.to_string(),
                        options: options.clone(),
                    })
                }
            }
            Self::Icon => match_format(
                value,
                &ICON_RE,
                "icons should be formatted like 'mdi:home-assistant'",
                &mut fail,
            ),
            Self::Id | Self::GenerateId { .. } | Self::UseId { .. } => match_format(
                value,
                &ID_RE,
                concat!(
                    "ids must start with a letter or underscore ",
                    "and contain only letters, digits and underscores"
                ),
                &mut fail,
            ),
            Self::Pin => {
                let number = match value {
                    Value::Number(_) => value.as_i64(),
                    Value::String(s) => {
                        let trimmed = s.trim();
                        let digits = trimmed
                            .strip_prefix("GPIO")
                            .or_else(|| trimmed.strip_prefix("gpio"))
                            .unwrap_or(trimmed);
                        match digits.parse::<i64>() {
                            Ok(n) => Some(n),
                            Err(_) => {
                                return fail(ValidationErrorKind::InvalidFormat {
                                    value: s.clone(),
                                    reason: "pins are a number or 'GPIO<number>'".to_string(),
                                })
                            }
                        }
                    }
                    other => return fail(mismatch("pin", other)),
                };
                match number {
                    Some(n) if (0..=MAX_GPIO).contains(&n) => Some(Value::from(n)),
                    Some(n) => fail(ValidationErrorKind::OutOfRange {
                        value: n,
                        min: 0,
                        max: MAX_GPIO,
                    }),
                    None => fail(mismatch("pin", value)),
                }
            }
            Self::TimePeriod => match value {
                Value::Number(_) => match value.as_u64() {
                    Some(ms) => Some(Value::from(ms)),
                    None => fail(mismatch("time period", value)),
                },
                Value::String(s) => match parse_time_period_ms(s) {
                    Some(ms) => Some(Value::from(ms)),
                    None => fail(ValidationErrorKind::InvalidFormat {
                        value: s.clone(),
                        reason: "expected a time period like '500ms', '5s', '1min' or '1h'"
                            .to_string(),
                    }),
                },
                other => fail(mismatch("time period", other)),
            },
            Self::Nested(schema) => {
                let mut nested_path = path.to_vec();
                schema
                    .validate_at(value, &mut nested_path, errors)
                    .map(Value::Object)
            }
        }
    }
}

fn match_format(
    value: &Value,
    re: &Regex,
    reason: &str,
    fail: &mut impl FnMut(ValidationErrorKind) -> Option<Value>,
) -> Option<Value> {
    match value.as_str() {
        Some(s) if re.is_match(s) => Some(value.clone()),
        Some(s) => fail(ValidationErrorKind::InvalidFormat {
            value: s.to_string(),
            reason: reason.to_string(),
        }),
        None => fail(mismatch("string", value)),
    }
}

fn mismatch(expected: &'static str, found: &Value) -> ValidationErrorKind {
    ValidationErrorKind::TypeMismatch {
        expected,
        found: value_type_name(found),
    }
}

/// Parse `500ms`, `5s`, `2min` or `1h` into milliseconds.
pub fn parse_time_period_ms(s: &str) -> Option<u64> {
    let caps = PERIOD_RE.captures(s)?;
    let amount: u64 = caps[1].parse().ok()?;
    let factor = match &caps[2] {
        "ms" => 1,
        "s" => 1_000,
        "min" => 60_000,
        "h" => 3_600_000,
        _ => return None,
    };
    amount.checked_mul(factor)
}

/// Human-readable name of a JSON value's type.
pub fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "float",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}

/// An ordered set of keys accepted in a mapping.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    keys: Vec<SchemaKey>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required key.
    pub fn required(self, name: impl Into<String>, validator: Validator) -> Self {
        self.with_key(SchemaKey {
            name: name.into(),
            presence: Presence::Required,
            validator,
        })
    }

    /// Add an optional key without a default.
    pub fn optional(self, name: impl Into<String>, validator: Validator) -> Self {
        self.with_key(SchemaKey {
            name: name.into(),
            presence: Presence::Optional { default: None },
            validator,
        })
    }

    /// Add an optional key that takes `default` when absent.
    pub fn optional_with_default(
        self,
        name: impl Into<String>,
        validator: Validator,
        default: impl Into<Value>,
    ) -> Self {
        self.with_key(SchemaKey {
            name: name.into(),
            presence: Presence::Optional {
                default: Some(default.into()),
            },
            validator,
        })
    }

    /// Add an `id` key generated as `<parent key>_<suffix>` when absent.
    pub fn generate_id(self, suffix: impl Into<String>) -> Self {
        self.optional(
            crate::entity::CONF_ID,
            Validator::GenerateId {
                suffix: suffix.into(),
            },
        )
    }

    /// Insert a key, replacing any existing key of the same name in place.
    pub fn with_key(mut self, key: SchemaKey) -> Self {
        match self.keys.iter_mut().find(|k| k.name == key.name) {
            Some(existing) => *existing = key,
            None => self.keys.push(key),
        }
        self
    }

    /// Merge another schema into this one; keys of `other` win.
    pub fn extend(self, other: Schema) -> Self {
        other.keys.into_iter().fold(self, Schema::with_key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &SchemaKey> {
        self.keys.iter()
    }

    pub fn key(&self, name: &str) -> Option<&SchemaKey> {
        self.keys.iter().find(|k| k.name == name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.key(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Validate a document against this schema.
    pub fn validate(&self, value: &Value) -> Result<ConfigMap, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let mut path = Vec::new();
        let validated = self.validate_at(value, &mut path, &mut errors);
        match validated {
            Some(map) if errors.is_empty() => Ok(map),
            _ => Err(errors),
        }
    }

    fn validate_at(
        &self,
        value: &Value,
        path: &mut Vec<String>,
        errors: &mut ValidationErrors,
    ) -> Option<ConfigMap> {
        let Some(input) = value.as_object() else {
            errors.push(ValidationError::new(path.clone(), mismatch("mapping", value)));
            return None;
        };

        let before = errors.len();
        let mut output = ConfigMap::new();

        for name in input.keys() {
            if !self.contains_key(name) {
                path.push(name.clone());
                errors.push(ValidationError::new(path.clone(), ValidationErrorKind::UnknownKey));
                path.pop();
            }
        }

        for key in &self.keys {
            path.push(key.name.clone());
            match input.get(&key.name) {
                Some(raw) => {
                    if let Some(v) = key.validator.validate(raw, path, errors) {
                        output.insert(key.name.clone(), v);
                    }
                }
                None => match (&key.presence, &key.validator) {
                    (Presence::Required, _) => {
                        errors.push(ValidationError::new(
                            path.clone(),
                            ValidationErrorKind::MissingRequired,
                        ));
                    }
                    (Presence::Optional { default: Some(d) }, _) => {
                        output.insert(key.name.clone(), d.clone());
                    }
                    (Presence::Optional { default: None }, Validator::GenerateId { suffix }) => {
                        output.insert(key.name.clone(), Value::from(generated_id(path, suffix)));
                    }
                    (Presence::Optional { default: None }, _) => {}
                },
            }
            path.pop();
        }

        (errors.len() == before).then_some(output)
    }
}

/// `path` ends with the id key itself; the entry's own key sits just before it.
fn generated_id(path: &[String], suffix: &str) -> String {
    let owner = path.len().checked_sub(2).and_then(|i| path.get(i));
    match owner {
        Some(owner) => format!("{}_{}", sanitize_id(owner), suffix),
        None => suffix.to_string(),
    }
}

/// Map arbitrary text onto the id character set.
pub fn sanitize_id(raw: &str) -> String {
    let mut id: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if id.starts_with(|c: char| c.is_ascii_digit()) {
        id.insert(0, '_');
    }
    id
}

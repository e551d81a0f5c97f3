//! Schema validation for request input slots.
//!
//! A [`RuleSet`] is a small constraint tree; [`validate`] walks it against a
//! raw JSON map and either returns the normalised map (defaults filled,
//! coercions applied, unknown fields dropped) or every violation found. The
//! walk is pure and never stops at the first failure.

mod rule;

pub use rule::{
    ArrayRule, Constraint, InputSlot, IntegerRule, NumberRule, Presence, Rule, RuleSet,
    StringRule,
};

use serde::Serialize;
use serde_json::{Map, Number, Value, json};

use super::Error;

/// Machine-readable violation category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationCode {
    MissingField,
    InvalidType,
    TooShort,
    TooLong,
    PatternMismatch,
    NotAllowed,
    BelowMinimum,
    AboveMaximum,
    TooFewItems,
    TooManyItems,
}

/// One field-level failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    slot: &'static str,
    field: String,
    code: ViolationCode,
    message: String,
}

impl Violation {
    fn new(slot: InputSlot, field: &str, code: ViolationCode, message: String) -> Self {
        Self {
            slot: slot.as_str(),
            field: field.to_owned(),
            code,
            message,
        }
    }

    /// Dotted/indexed path of the failing field, e.g. `tags[1]`.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Violation category.
    #[must_use]
    pub fn code(&self) -> ViolationCode {
        self.code
    }

    /// Human readable explanation.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Ordered list of violations from one or more slots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationFailure {
    violations: Vec<Violation>,
}

impl ValidationFailure {
    /// Violations in discovery order.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Distinct violating field paths, in discovery order.
    #[must_use]
    pub fn fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = Vec::with_capacity(self.violations.len());
        for violation in &self.violations {
            if !fields.contains(&violation.field.as_str()) {
                fields.push(violation.field.as_str());
            }
        }
        fields
    }

    /// Append another slot's failures.
    pub fn merge(&mut self, other: Self) {
        self.violations.extend(other.violations);
    }

    /// Whether no violations were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }
}

impl From<ValidationFailure> for Error {
    fn from(value: ValidationFailure) -> Self {
        let mut message = String::from("validation failed for: ");
        message.push_str(&value.fields().join(", "));
        Error::validation(message).with_details(json!({ "violations": value.violations }))
    }
}

/// All-or-nothing result of validating one slot.
pub type ValidationOutcome = Result<Map<String, Value>, ValidationFailure>;

/// Validate `input` against `rules` for the given slot.
///
/// # Examples
/// ```
/// use serde_json::{Map, Value, json};
/// use storefront::domain::validation::{InputSlot, IntegerRule, Rule, RuleSet, validate};
///
/// let rules = RuleSet::new().field("page", Rule::with_default(IntegerRule::new().min(1), 1));
/// let mut input = Map::new();
/// input.insert("page".into(), Value::from("3"));
/// let normalised = validate(&rules, &input, InputSlot::Query).unwrap();
/// assert_eq!(normalised.get("page"), Some(&json!(3)));
/// ```
pub fn validate(rules: &RuleSet, input: &Map<String, Value>, slot: InputSlot) -> ValidationOutcome {
    let mut violations = Vec::new();
    let normalised = validate_object(rules, input, slot, "", &mut violations);
    if violations.is_empty() {
        Ok(normalised)
    } else {
        Err(ValidationFailure { violations })
    }
}

fn field_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_owned()
    } else {
        format!("{prefix}.{name}")
    }
}

fn validate_object(
    rules: &RuleSet,
    input: &Map<String, Value>,
    slot: InputSlot,
    prefix: &str,
    violations: &mut Vec<Violation>,
) -> Map<String, Value> {
    let mut normalised = Map::new();
    for (name, rule) in rules.iter() {
        let path = field_path(prefix, name);
        match (input.get(name), &rule.presence) {
            (Some(value), _) => {
                if let Some(value) = check(&rule.constraint, value, slot, &path, violations) {
                    normalised.insert(name.to_owned(), value);
                }
            }
            (None, Presence::Required) => violations.push(Violation::new(
                slot,
                &path,
                ViolationCode::MissingField,
                format!("{path} is required"),
            )),
            (None, Presence::Optional) => {}
            (None, Presence::Default(default)) => {
                normalised.insert(name.to_owned(), default.clone());
            }
        }
    }
    normalised
}

/// Check one value; returns the normalised value when it produced no new
/// violations.
fn check(
    constraint: &Constraint,
    value: &Value,
    slot: InputSlot,
    path: &str,
    violations: &mut Vec<Violation>,
) -> Option<Value> {
    let before = violations.len();
    let normalised = match constraint {
        Constraint::String(rule) => check_string(rule, value, slot, path, violations),
        Constraint::Integer(rule) => check_integer(rule, value, slot, path, violations),
        Constraint::Number(rule) => check_number(rule, value, slot, path, violations),
        Constraint::Boolean => check_boolean(value, slot, path, violations),
        Constraint::Object(rules) => match value {
            Value::Object(map) => Some(Value::Object(validate_object(
                rules, map, slot, path, violations,
            ))),
            _ => type_mismatch(slot, path, "an object", violations),
        },
        Constraint::Array(rule) => check_array(rule, value, slot, path, violations),
    };
    if violations.len() == before {
        normalised
    } else {
        None
    }
}

fn type_mismatch(
    slot: InputSlot,
    path: &str,
    expected: &str,
    violations: &mut Vec<Violation>,
) -> Option<Value> {
    violations.push(Violation::new(
        slot,
        path,
        ViolationCode::InvalidType,
        format!("{path} must be {expected}"),
    ));
    None
}

fn check_string(
    rule: &StringRule,
    value: &Value,
    slot: InputSlot,
    path: &str,
    violations: &mut Vec<Violation>,
) -> Option<Value> {
    let Value::String(text) = value else {
        return type_mismatch(slot, path, "a string", violations);
    };
    let length = text.chars().count();
    if let Some(min) = rule.min_len.filter(|&min| length < min) {
        violations.push(Violation::new(
            slot,
            path,
            ViolationCode::TooShort,
            format!("{path} must be at least {min} characters"),
        ));
    }
    if let Some(max) = rule.max_len.filter(|&max| length > max) {
        violations.push(Violation::new(
            slot,
            path,
            ViolationCode::TooLong,
            format!("{path} must be at most {max} characters"),
        ));
    }
    if rule
        .pattern
        .as_ref()
        .is_some_and(|pattern| !pattern.is_match(text))
    {
        violations.push(Violation::new(
            slot,
            path,
            ViolationCode::PatternMismatch,
            format!("{path} has an invalid format"),
        ));
    }
    if let Some(allowed) = rule
        .one_of
        .as_ref()
        .filter(|allowed| !allowed.iter().any(|candidate| candidate == text))
    {
        violations.push(Violation::new(
            slot,
            path,
            ViolationCode::NotAllowed,
            format!("{path} must be one of: {}", allowed.join(", ")),
        ));
    }
    Some(value.clone())
}

fn as_integer(value: &Value, slot: InputSlot) -> Option<i64> {
    match value {
        // Float literals such as `2.0` are not integers, even when whole.
        Value::Number(number) => number.as_i64(),
        Value::String(text) if slot.allows_coercion() => text.trim().parse().ok(),
        _ => None,
    }
}

fn check_integer(
    rule: &IntegerRule,
    value: &Value,
    slot: InputSlot,
    path: &str,
    violations: &mut Vec<Violation>,
) -> Option<Value> {
    let Some(number) = as_integer(value, slot) else {
        return type_mismatch(slot, path, "an integer", violations);
    };
    if let Some(min) = rule.min.filter(|&min| number < min) {
        violations.push(Violation::new(
            slot,
            path,
            ViolationCode::BelowMinimum,
            format!("{path} must be at least {min}"),
        ));
    }
    if let Some(max) = rule.max.filter(|&max| number > max) {
        violations.push(Violation::new(
            slot,
            path,
            ViolationCode::AboveMaximum,
            format!("{path} must be at most {max}"),
        ));
    }
    Some(Value::from(number))
}

fn as_number(value: &Value, slot: InputSlot) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) if slot.allows_coercion() => {
            text.trim().parse::<f64>().ok().filter(|raw| raw.is_finite())
        }
        _ => None,
    }
}

fn check_number(
    rule: &NumberRule,
    value: &Value,
    slot: InputSlot,
    path: &str,
    violations: &mut Vec<Violation>,
) -> Option<Value> {
    let Some(number) = as_number(value, slot) else {
        return type_mismatch(slot, path, "a number", violations);
    };
    if let Some(min) = rule.min.filter(|&min| number < min) {
        violations.push(Violation::new(
            slot,
            path,
            ViolationCode::BelowMinimum,
            format!("{path} must be at least {min}"),
        ));
    }
    if let Some(max) = rule.max.filter(|&max| number > max) {
        violations.push(Violation::new(
            slot,
            path,
            ViolationCode::AboveMaximum,
            format!("{path} must be at most {max}"),
        ));
    }
    match value {
        Value::Number(_) => Some(value.clone()),
        _ => Number::from_f64(number).map(Value::Number),
    }
}

fn check_boolean(
    value: &Value,
    slot: InputSlot,
    path: &str,
    violations: &mut Vec<Violation>,
) -> Option<Value> {
    match value {
        Value::Bool(_) => Some(value.clone()),
        Value::String(text) if slot.allows_coercion() => match text.trim() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => type_mismatch(slot, path, "a boolean", violations),
        },
        _ => type_mismatch(slot, path, "a boolean", violations),
    }
}

fn check_array(
    rule: &ArrayRule,
    value: &Value,
    slot: InputSlot,
    path: &str,
    violations: &mut Vec<Violation>,
) -> Option<Value> {
    let Value::Array(items) = value else {
        return type_mismatch(slot, path, "an array", violations);
    };
    if let Some(min) = rule.min_items.filter(|&min| items.len() < min) {
        violations.push(Violation::new(
            slot,
            path,
            ViolationCode::TooFewItems,
            format!("{path} must contain at least {min} items"),
        ));
    }
    if let Some(max) = rule.max_items.filter(|&max| items.len() > max) {
        violations.push(Violation::new(
            slot,
            path,
            ViolationCode::TooManyItems,
            format!("{path} must contain at most {max} items"),
        ));
    }
    let normalised: Vec<Value> = items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            check(
                &rule.items,
                item,
                slot,
                &format!("{path}[{index}]"),
                violations,
            )
        })
        .collect();
    Some(Value::Array(normalised))
}

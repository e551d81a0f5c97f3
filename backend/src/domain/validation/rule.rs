//! Declarative constraint tree interpreted by [`super::validate`].

use regex::Regex;
use serde_json::Value;

/// Input slot a rule set is attached to.
///
/// Query strings and path segments only ever carry text, so those slots may
/// coerce numeric and boolean strings. Bodies are typed JSON and must match
/// exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputSlot {
    /// JSON request body.
    Body,
    /// URL query string.
    Query,
    /// Path parameters.
    Params,
}

impl InputSlot {
    /// Whether string values may be coerced to the declared scalar type.
    #[must_use]
    pub const fn allows_coercion(self) -> bool {
        matches!(self, Self::Query | Self::Params)
    }

    /// Lowercase slot name used in violation details.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Body => "body",
            Self::Query => "query",
            Self::Params => "params",
        }
    }
}

/// Constraints for string fields.
#[derive(Debug, Clone, Default)]
pub struct StringRule {
    pub(super) min_len: Option<usize>,
    pub(super) max_len: Option<usize>,
    pub(super) pattern: Option<Regex>,
    pub(super) one_of: Option<Vec<String>>,
}

impl StringRule {
    /// Unconstrained string.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Minimum length in characters.
    #[must_use]
    pub fn min_len(mut self, min: usize) -> Self {
        self.min_len = Some(min);
        self
    }

    /// Maximum length in characters.
    #[must_use]
    pub fn max_len(mut self, max: usize) -> Self {
        self.max_len = Some(max);
        self
    }

    /// Require the whole value to match `pattern`.
    #[must_use]
    pub fn pattern(mut self, pattern: Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Restrict the value to an enumerated set.
    #[must_use]
    pub fn one_of<I, S>(mut self, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.one_of = Some(allowed.into_iter().map(Into::into).collect());
        self
    }
}

/// Constraints for integer-only numeric fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntegerRule {
    pub(super) min: Option<i64>,
    pub(super) max: Option<i64>,
}

impl IntegerRule {
    /// Unbounded integer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inclusive lower bound.
    #[must_use]
    pub fn min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    /// Inclusive upper bound.
    #[must_use]
    pub fn max(mut self, max: i64) -> Self {
        self.max = Some(max);
        self
    }
}

/// Constraints for fractional numeric fields.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NumberRule {
    pub(super) min: Option<f64>,
    pub(super) max: Option<f64>,
}

impl NumberRule {
    /// Unbounded finite number.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inclusive lower bound.
    #[must_use]
    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// Inclusive upper bound.
    #[must_use]
    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }
}

/// Constraints for arrays; every element is checked against `items`.
#[derive(Debug, Clone)]
pub struct ArrayRule {
    pub(super) items: Box<Constraint>,
    pub(super) min_items: Option<usize>,
    pub(super) max_items: Option<usize>,
}

impl ArrayRule {
    /// Array whose elements satisfy `items`.
    #[must_use]
    pub fn of(items: impl Into<Constraint>) -> Self {
        Self {
            items: Box::new(items.into()),
            min_items: None,
            max_items: None,
        }
    }

    /// Minimum number of elements.
    #[must_use]
    pub fn min_items(mut self, min: usize) -> Self {
        self.min_items = Some(min);
        self
    }

    /// Maximum number of elements.
    #[must_use]
    pub fn max_items(mut self, max: usize) -> Self {
        self.max_items = Some(max);
        self
    }
}

/// Tagged constraint tree node.
#[derive(Debug, Clone)]
pub enum Constraint {
    String(StringRule),
    Integer(IntegerRule),
    Number(NumberRule),
    Boolean,
    Object(RuleSet),
    Array(ArrayRule),
}

impl From<StringRule> for Constraint {
    fn from(value: StringRule) -> Self {
        Self::String(value)
    }
}

impl From<IntegerRule> for Constraint {
    fn from(value: IntegerRule) -> Self {
        Self::Integer(value)
    }
}

impl From<NumberRule> for Constraint {
    fn from(value: NumberRule) -> Self {
        Self::Number(value)
    }
}

impl From<RuleSet> for Constraint {
    fn from(value: RuleSet) -> Self {
        Self::Object(value)
    }
}

impl From<ArrayRule> for Constraint {
    fn from(value: ArrayRule) -> Self {
        Self::Array(value)
    }
}

/// Whether a field must be supplied, and what fills it when it is not.
#[derive(Debug, Clone, PartialEq)]
pub enum Presence {
    Required,
    Optional,
    Default(Value),
}

/// One field's constraint plus its presence policy.
#[derive(Debug, Clone)]
pub struct Rule {
    pub(super) constraint: Constraint,
    pub(super) presence: Presence,
}

impl Rule {
    /// The field must be present.
    pub fn required(constraint: impl Into<Constraint>) -> Self {
        Self {
            constraint: constraint.into(),
            presence: Presence::Required,
        }
    }

    /// The field may be omitted and is then absent from the outcome.
    pub fn optional(constraint: impl Into<Constraint>) -> Self {
        Self {
            constraint: constraint.into(),
            presence: Presence::Optional,
        }
    }

    /// The field may be omitted and is then filled with `default`.
    ///
    /// The default is inserted verbatim; it is not itself validated.
    pub fn with_default(constraint: impl Into<Constraint>, default: impl Into<Value>) -> Self {
        Self {
            constraint: constraint.into(),
            presence: Presence::Default(default.into()),
        }
    }
}

/// Ordered mapping from field name to [`Rule`].
///
/// Built once at start-up and shared read-only between requests.
///
/// # Examples
/// ```
/// use storefront::domain::validation::{IntegerRule, Rule, RuleSet, StringRule};
///
/// let pagination = RuleSet::new()
///     .field("page", Rule::with_default(IntegerRule::new().min(1), 1))
///     .field(
///         "order",
///         Rule::with_default(StringRule::new().one_of(["asc", "desc"]), "desc"),
///     );
/// assert_eq!(pagination.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    fields: Vec<(String, Rule)>,
}

impl RuleSet {
    /// Empty rule set; every input field is dropped.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a field. Redeclaring a name replaces the earlier rule in place.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, rule: Rule) -> Self {
        let name = name.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = rule,
            None => self.fields.push((name, rule)),
        }
        self
    }

    /// Declared fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Rule)> {
        self.fields.iter().map(|(name, rule)| (name.as_str(), rule))
    }

    /// Number of declared fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no fields are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

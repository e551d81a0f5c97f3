//! Rule sets shared by the storefront endpoints.

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::validation::{ArrayRule, Constraint, IntegerRule, NumberRule, Rule, RuleSet, StringRule};

/// Largest page a listing will return.
pub const MAX_PAGE_LIMIT: i64 = 100;
/// Page size used when `limit` is omitted.
pub const DEFAULT_PAGE_LIMIT: i64 = 10;
/// Highest page number accepted; keeps `page` within [`PageRequest`]'s range.
///
/// [`PageRequest`]: crate::domain::PageRequest
pub const MAX_PAGE: i64 = 1_000_000;

const NAME_MAX_LEN: usize = 120;
const DESCRIPTION_MAX_LEN: usize = 2_000;
const TAG_MAX_LEN: usize = 40;
const MAX_TAGS: usize = 20;

static UUID_RE: OnceLock<Regex> = OnceLock::new();

fn uuid_rule() -> StringRule {
    let pattern = UUID_RE.get_or_init(|| {
        let pattern =
            r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$";
        Regex::new(pattern).unwrap_or_else(|error| panic!("uuid regex failed to compile: {error}"))
    });
    StringRule::new().pattern(pattern.clone())
}

/// `page`, `limit` and `order` with their defaults.
#[must_use]
pub fn pagination() -> RuleSet {
    RuleSet::new()
        .field(
            "page",
            Rule::with_default(IntegerRule::new().min(1).max(MAX_PAGE), 1),
        )
        .field(
            "limit",
            Rule::with_default(
                IntegerRule::new().min(1).max(MAX_PAGE_LIMIT),
                DEFAULT_PAGE_LIMIT,
            ),
        )
        .field(
            "order",
            Rule::with_default(StringRule::new().one_of(["asc", "desc"]), "desc"),
        )
}

/// `{id}` path parameter holding a UUID.
#[must_use]
pub fn id_param() -> RuleSet {
    RuleSet::new().field("id", Rule::required(uuid_rule()))
}

/// Body for creating or renaming a category.
#[must_use]
pub fn category_body() -> RuleSet {
    RuleSet::new()
        .field(
            "name",
            Rule::required(StringRule::new().min_len(1).max_len(NAME_MAX_LEN)),
        )
        .field(
            "description",
            Rule::optional(StringRule::new().max_len(DESCRIPTION_MAX_LEN)),
        )
}

/// Body for creating a product.
#[must_use]
pub fn product_body() -> RuleSet {
    RuleSet::new()
        .field(
            "name",
            Rule::required(StringRule::new().min_len(1).max_len(NAME_MAX_LEN)),
        )
        .field(
            "description",
            Rule::optional(StringRule::new().max_len(DESCRIPTION_MAX_LEN)),
        )
        .field("price", Rule::required(NumberRule::new().min(0.0)))
        .field("categoryId", Rule::required(uuid_rule()))
        .field("available", Rule::with_default(Constraint::Boolean, true))
        .field(
            "tags",
            Rule::with_default(
                ArrayRule::of(StringRule::new().min_len(1).max_len(TAG_MAX_LEN))
                    .max_items(MAX_TAGS),
                serde_json::json!([]),
            ),
        )
}

/// Product listing query: pagination plus an optional category filter.
#[must_use]
pub fn product_query() -> RuleSet {
    pagination().field("categoryId", Rule::optional(uuid_rule()))
}

/// Login body. Credentials are compared verbatim, so no length caps beyond
/// non-empty.
#[must_use]
pub fn login_body() -> RuleSet {
    RuleSet::new()
        .field("username", Rule::required(StringRule::new().min_len(1)))
        .field("password", Rule::required(StringRule::new().min_len(1)))
}

#[cfg(test)]
mod tests {
    use serde_json::{Map, Value, json};
    use rstest::rstest;

    use super::*;
    use crate::domain::validation::{InputSlot, validate};

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[rstest]
    fn pagination_fills_every_default() {
        let normalised =
            validate(&pagination(), &Map::new(), InputSlot::Query).expect("defaults");
        assert_eq!(
            Value::Object(normalised),
            json!({ "page": 1, "limit": 10, "order": "desc" })
        );
    }

    #[rstest]
    #[case(json!({ "page": "0" }), "page")]
    #[case(json!({ "page": "1000001" }), "page")]
    #[case(json!({ "page": "5000000000" }), "page")]
    #[case(json!({ "limit": "101" }), "limit")]
    #[case(json!({ "order": "sideways" }), "order")]
    fn pagination_rejects_out_of_range_values(#[case] input: Value, #[case] field: &str) {
        let failure =
            validate(&pagination(), &object(input), InputSlot::Query).expect_err("invalid");
        assert_eq!(failure.fields(), vec![field]);
    }

    #[rstest]
    fn the_largest_page_decodes_into_a_page_request() {
        let input = object(json!({ "page": MAX_PAGE.to_string() }));
        let normalised = validate(&pagination(), &input, InputSlot::Query).expect("in range");
        let page: crate::domain::PageRequest =
            serde_json::from_value(Value::Object(normalised)).expect("fits u32");
        assert_eq!(i64::from(page.page), MAX_PAGE);
    }

    #[rstest]
    #[case("b7f0e0c4-9e55-4c1b-8a8f-3c2d1e0f9a7b", true)]
    #[case("not-a-uuid", false)]
    #[case("", false)]
    fn id_param_requires_a_uuid(#[case] id: &str, #[case] valid: bool) {
        let input = object(json!({ "id": id }));
        assert_eq!(validate(&id_param(), &input, InputSlot::Params).is_ok(), valid);
    }

    #[rstest]
    fn product_body_applies_defaults_and_omits_absent_optionals() {
        let input = object(json!({
            "name": "Rye",
            "price": 4.5,
            "categoryId": "b7f0e0c4-9e55-4c1b-8a8f-3c2d1e0f9a7b",
        }));
        let normalised = validate(&product_body(), &input, InputSlot::Body).expect("valid");
        assert_eq!(normalised.get("available"), Some(&json!(true)));
        assert_eq!(normalised.get("tags"), Some(&json!([])));
        assert!(!normalised.contains_key("description"));
    }

    #[rstest]
    fn category_body_reports_a_missing_name() {
        let failure = validate(&category_body(), &Map::new(), InputSlot::Body)
            .expect_err("name is required");
        assert_eq!(failure.fields(), vec!["name"]);
    }
}

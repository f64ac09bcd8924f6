//! # Keyword Validators
//!
//! One function per keyword. [`evaluate`] is the dispatch table: an
//! exhaustive match, so a keyword without a validator (`then`, `default`,
//! annotations, ...) is visibly listed as such. `then`/`else` are read by
//! `if`, `minContains`/`maxContains` by `contains`, and `prefixItems` is
//! consulted by `items` to skip the covered positions.
//!
//! Every validator returns the errors it found; an empty list means the
//! keyword passed. Validators only fail for values of the type they
//! constrain: `minLength` ignores numbers, `required` ignores arrays.

use std::collections::HashSet;

use serde_json::{Map, Value};

use jsonv_core::{string_length, CanonicalForm, InstanceType, PathSegment, SchemaError};

use crate::node::{Keyword, Pattern, SchemaId, SchemaKind, SchemaNode};
use crate::validate::{ErrorDetail, Evaluator, Location};

type Outcome = Result<Vec<ErrorDetail>, SchemaError>;

fn pass() -> Outcome {
    Ok(Vec::new())
}

fn fail(at: &Location, keyword: &str, message: String, data: &Value) -> Outcome {
    Ok(vec![at.error(keyword, message, Some(data.clone()))])
}

/// Evaluate one keyword of `node` against a present value.
pub(crate) fn evaluate(
    ev: &Evaluator<'_>,
    node: &SchemaNode,
    keyword: &Keyword,
    value: &Value,
    at: &Location,
    depth: usize,
) -> Outcome {
    match keyword {
        Keyword::Type(types) => type_(types, value, at),
        Keyword::Const(expected) => const_(expected, value, at),
        Keyword::Enum(options) => enum_(options, value, at),

        Keyword::AllOf(ids) => all_of(ev, ids, value, at, depth),
        Keyword::AnyOf(ids) => any_of(ev, ids, value, at, depth),
        Keyword::OneOf(ids) => one_of(ev, ids, value, at, depth),
        Keyword::Not(id) => not(ev, *id, value, at, depth),
        Keyword::If(id) => if_(ev, node, *id, value, at, depth),

        Keyword::MinLength(n) => min_length(*n, value, at),
        Keyword::MaxLength(n) => max_length(*n, value, at),
        Keyword::Pattern(p) => pattern(p, value, at),
        Keyword::Format(name) => format(ev, name, value, at),

        Keyword::Minimum(n) => bound(value, at, "minimum", |x| x >= *n, "greater than or equal to", *n),
        Keyword::Maximum(n) => bound(value, at, "maximum", |x| x <= *n, "less than or equal to", *n),
        Keyword::ExclusiveMinimum(n) => bound(value, at, "exclusiveMinimum", |x| x > *n, "greater than", *n),
        Keyword::ExclusiveMaximum(n) => bound(value, at, "exclusiveMaximum", |x| x < *n, "less than", *n),
        Keyword::MultipleOf(n) => multiple_of(*n, value, at),

        Keyword::Properties(entries) => properties(ev, entries, value, at, depth),
        Keyword::Required(keys) => required(keys, value, at),
        Keyword::AdditionalProperties(id) => additional_properties(ev, node, *id, value, at, depth),
        Keyword::PatternProperties(entries) => pattern_properties(ev, entries, value, at, depth),
        Keyword::PropertyNames(id) => property_names(ev, *id, value, at, depth),
        Keyword::MinProperties(n) => min_properties(*n, value, at),
        Keyword::MaxProperties(n) => max_properties(*n, value, at),
        Keyword::DependentRequired(entries) => dependent_required(entries, value, at),
        Keyword::DependentSchemas(entries) => dependent_schemas(ev, entries, value, at, depth),

        Keyword::Items(id) => items(ev, node, *id, value, at, depth),
        Keyword::PrefixItems(ids) => prefix_items(ev, ids, value, at, depth),
        Keyword::MinItems(n) => min_items(*n, value, at),
        Keyword::MaxItems(n) => max_items(*n, value, at),
        Keyword::UniqueItems(unique) => unique_items(*unique, value, at),
        Keyword::Contains(id) => contains(ev, node, *id, value, at, depth),

        Keyword::Then(_)
        | Keyword::Else(_)
        | Keyword::MinContains(_)
        | Keyword::MaxContains(_)
        | Keyword::Default(_)
        | Keyword::Ref(_)
        | Keyword::Id(_)
        | Keyword::Defs(_)
        | Keyword::Annotation(..) => pass(),
    }
}

/// Render a number the way JSON would: integral values without a fraction.
pub(crate) fn display_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

// -- Generic ---------------------------------------------------------------

fn type_(types: &[InstanceType], value: &Value, at: &Location) -> Outcome {
    if types.iter().any(|t| t.matches(value)) {
        return pass();
    }
    let message = match types {
        [single] => format!("Expected {single}"),
        many => format!(
            "Expected one of: {}",
            many.iter().map(InstanceType::as_str).collect::<Vec<_>>().join(", ")
        ),
    };
    fail(at, "type", message, value)
}

fn const_(expected: &Value, value: &Value, at: &Location) -> Outcome {
    let expected = CanonicalForm::new(expected);
    if CanonicalForm::new(value) == expected {
        return pass();
    }
    fail(at, "const", format!("Expected const: {expected}"), value)
}

fn enum_(options: &[Value], value: &Value, at: &Location) -> Outcome {
    let actual = CanonicalForm::new(value);
    if options.iter().any(|o| CanonicalForm::new(o) == actual) {
        return pass();
    }
    let listed = CanonicalForm::new(&Value::Array(options.to_vec()));
    fail(at, "enum", format!("Expected enum: {listed}"), value)
}

// -- Composition -------------------------------------------------------------

fn count_matches(ev: &Evaluator<'_>, ids: &[SchemaId], value: &Value, at: &Location, depth: usize) -> Result<usize, SchemaError> {
    let mut count = 0;
    for id in ids {
        if ev.accepts(*id, value, at, depth)? {
            count += 1;
        }
    }
    Ok(count)
}

fn all_of(ev: &Evaluator<'_>, ids: &[SchemaId], value: &Value, at: &Location, depth: usize) -> Outcome {
    if count_matches(ev, ids, value, at, depth)? == ids.len() {
        return pass();
    }
    fail(at, "allOf", "Expected all to match".to_string(), value)
}

fn any_of(ev: &Evaluator<'_>, ids: &[SchemaId], value: &Value, at: &Location, depth: usize) -> Outcome {
    for id in ids {
        if ev.accepts(*id, value, at, depth)? {
            return pass();
        }
    }
    fail(at, "anyOf", "Expected at least one to match".to_string(), value)
}

fn one_of(ev: &Evaluator<'_>, ids: &[SchemaId], value: &Value, at: &Location, depth: usize) -> Outcome {
    if count_matches(ev, ids, value, at, depth)? == 1 {
        return pass();
    }
    fail(at, "oneOf", "Expected exactly one to match".to_string(), value)
}

fn not(ev: &Evaluator<'_>, id: SchemaId, value: &Value, at: &Location, depth: usize) -> Outcome {
    if !ev.accepts(id, value, &at.descend(&[PathSegment::from("not")], None), depth)? {
        return pass();
    }
    fail(at, "not", "Expected not to match".to_string(), value)
}

fn if_(ev: &Evaluator<'_>, node: &SchemaNode, id: SchemaId, value: &Value, at: &Location, depth: usize) -> Outcome {
    let has_branch = node
        .keywords()
        .iter()
        .any(|k| matches!(k, Keyword::Then(_) | Keyword::Else(_)));
    if !has_branch {
        return pass();
    }
    let matched = ev.accepts(id, value, at, depth)?;
    let branch = node.keywords().iter().find_map(|k| match (k, matched) {
        (Keyword::Then(then), true) => Some(("then", *then)),
        (Keyword::Else(otherwise), false) => Some(("else", *otherwise)),
        _ => None,
    });
    match branch {
        Some((name, branch)) => ev.validate(branch, Some(value), &at.descend(&[PathSegment::from(name)], None), depth),
        None => pass(),
    }
}

// -- Strings -------------------------------------------------------------------

fn min_length(n: u64, value: &Value, at: &Location) -> Outcome {
    match value {
        Value::String(s) if (string_length(s) as u64) < n => {
            fail(at, "minLength", format!("Expected string with minimum length of {n}"), value)
        }
        _ => pass(),
    }
}

fn max_length(n: u64, value: &Value, at: &Location) -> Outcome {
    match value {
        Value::String(s) if (string_length(s) as u64) > n => {
            fail(at, "maxLength", format!("Expected string with maximum length of {n}"), value)
        }
        _ => pass(),
    }
}

fn pattern(p: &Pattern, value: &Value, at: &Location) -> Outcome {
    match value {
        Value::String(s) if !p.is_match(s) => fail(
            at,
            "pattern",
            format!("Expected string matching pattern {}", p.as_str()),
            value,
        ),
        _ => pass(),
    }
}

fn format(ev: &Evaluator<'_>, name: &str, value: &Value, at: &Location) -> Outcome {
    match value {
        Value::String(s) if !ev.formats.check(name, s) => {
            fail(at, "format", format!("Expected string matching format {name}"), value)
        }
        _ => pass(),
    }
}

// -- Numbers -----------------------------------------------------------------

fn bound(value: &Value, at: &Location, keyword: &str, ok: impl Fn(f64) -> bool, relation: &str, n: f64) -> Outcome {
    match value.as_f64() {
        Some(x) if !ok(x) => fail(
            at,
            keyword,
            format!("Expected number {relation} {}", display_number(n)),
            value,
        ),
        _ => pass(),
    }
}

/// Accepts when `value / multiple_of` is within a magnitude-scaled epsilon
/// of an integer, so `0.3` is a multiple of `0.1`.
fn multiple_of(multiple_of: f64, value: &Value, at: &Location) -> Outcome {
    let Some(x) = value.as_f64() else {
        return pass();
    };
    if !(multiple_of > 0.0 && multiple_of.is_finite() && x.is_finite()) {
        return Err(SchemaError::InvalidMultipleOf { multiple_of, value: x });
    }
    let quotient = x / multiple_of;
    let epsilon = f64::EPSILON * quotient.abs().max(1.0);
    if (quotient - quotient.round()).abs() <= epsilon {
        return pass();
    }
    fail(
        at,
        "multipleOf",
        format!("Expected number being a multiple of {}", display_number(multiple_of)),
        value,
    )
}

// -- Objects -----------------------------------------------------------------

fn properties(
    ev: &Evaluator<'_>,
    entries: &[(String, SchemaId)],
    value: &Value,
    at: &Location,
    depth: usize,
) -> Outcome {
    let Value::Object(map) = value else {
        return pass();
    };
    for (key, v) in map {
        let Some((_, id)) = entries.iter().find(|(k, _)| k == key) else {
            continue;
        };
        let found = ev.validate(
            *id,
            Some(v),
            &at.descend(&["properties".into(), key.as_str().into()], Some(key.as_str().into())),
            depth,
        )?;
        if !found.is_empty() {
            return Ok(found);
        }
    }
    pass()
}

fn required(keys: &[String], value: &Value, at: &Location) -> Outcome {
    let Value::Object(map) = value else {
        return pass();
    };
    if keys.iter().all(|k| map.contains_key(k)) {
        return pass();
    }
    fail(
        at,
        "required",
        format!("Expected object with required properties {}", keys.join(", ")),
        value,
    )
}

fn additional_properties(
    ev: &Evaluator<'_>,
    node: &SchemaNode,
    id: SchemaId,
    value: &Value,
    at: &Location,
    depth: usize,
) -> Outcome {
    let Value::Object(map) = value else {
        return pass();
    };
    let declared = node.properties();
    let patterns: Vec<&Pattern> = node
        .keywords()
        .iter()
        .filter_map(|k| match k {
            Keyword::PatternProperties(entries) => Some(entries.iter().map(|(p, _)| p)),
            _ => None,
        })
        .flatten()
        .collect();

    let extra: Map<String, Value> = map
        .iter()
        .filter(|(key, _)| !declared.iter().any(|(k, _)| k == *key))
        .filter(|(key, _)| !patterns.iter().any(|p| p.is_match(key)))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    if extra.is_empty() {
        return pass();
    }

    let mut ref_depth = depth;
    let target = ev.schema.follow(id, &mut ref_depth)?;
    match ev.schema.node(target).kind() {
        SchemaKind::Bool(true) => pass(),
        SchemaKind::Bool(false) => fail(
            at,
            "additionalProperties",
            "Additional properties are not allowed".to_string(),
            &Value::Object(extra),
        ),
        _ => {
            for (key, v) in &extra {
                let found = ev.validate(
                    id,
                    Some(v),
                    &at.descend(&["additionalProperties".into()], Some(key.as_str().into())),
                    depth,
                )?;
                if !found.is_empty() {
                    return Ok(found);
                }
            }
            pass()
        }
    }
}

fn pattern_properties(
    ev: &Evaluator<'_>,
    entries: &[(Pattern, SchemaId)],
    value: &Value,
    at: &Location,
    depth: usize,
) -> Outcome {
    let Value::Object(map) = value else {
        return pass();
    };
    for (key, v) in map {
        for (pattern, id) in entries {
            if !pattern.is_match(key) {
                continue;
            }
            let found = ev.validate(
                *id,
                Some(v),
                &at.descend(
                    &["patternProperties".into(), pattern.as_str().into()],
                    Some(key.as_str().into()),
                ),
                depth,
            )?;
            if !found.is_empty() {
                return Ok(found);
            }
        }
    }
    pass()
}

fn property_names(ev: &Evaluator<'_>, id: SchemaId, value: &Value, at: &Location, depth: usize) -> Outcome {
    let Value::Object(map) = value else {
        return pass();
    };
    for key in map.keys() {
        let found = ev.validate(
            id,
            Some(&Value::String(key.clone())),
            &at.descend(&["propertyNames".into()], Some(key.as_str().into())),
            depth,
        )?;
        if !found.is_empty() {
            return Ok(found);
        }
    }
    pass()
}

fn min_properties(n: u64, value: &Value, at: &Location) -> Outcome {
    match value {
        Value::Object(map) if (map.len() as u64) < n => fail(
            at,
            "minProperties",
            format!("Expected object with at least {n} properties"),
            value,
        ),
        _ => pass(),
    }
}

fn max_properties(n: u64, value: &Value, at: &Location) -> Outcome {
    match value {
        Value::Object(map) if (map.len() as u64) > n => fail(
            at,
            "maxProperties",
            format!("Expected object with at most {n} properties"),
            value,
        ),
        _ => pass(),
    }
}

fn dependent_required(entries: &[(String, Vec<String>)], value: &Value, at: &Location) -> Outcome {
    let Value::Object(map) = value else {
        return pass();
    };
    for (key, deps) in entries {
        if !map.contains_key(key) {
            continue;
        }
        if let Some(missing) = deps.iter().find(|d| !map.contains_key(d.as_str())) {
            return fail(
                at,
                "dependentRequired",
                format!("Expected dependent required property {missing}"),
                value,
            );
        }
    }
    pass()
}

fn dependent_schemas(
    ev: &Evaluator<'_>,
    entries: &[(String, SchemaId)],
    value: &Value,
    at: &Location,
    depth: usize,
) -> Outcome {
    let Value::Object(map) = value else {
        return pass();
    };
    for (key, id) in entries {
        if !map.contains_key(key) {
            continue;
        }
        let found = ev.validate(
            *id,
            Some(value),
            &at.descend(&["dependentSchemas".into(), key.as_str().into()], None),
            depth,
        )?;
        if !found.is_empty() {
            return Ok(found);
        }
    }
    pass()
}

// -- Arrays ------------------------------------------------------------------

fn items(ev: &Evaluator<'_>, node: &SchemaNode, id: SchemaId, value: &Value, at: &Location, depth: usize) -> Outcome {
    let Value::Array(elements) = value else {
        return pass();
    };
    let skip = node.prefix_items().len();
    for (i, element) in elements.iter().enumerate().skip(skip) {
        let found = ev.validate(id, Some(element), &at.descend(&["items".into()], Some(i.into())), depth)?;
        if !found.is_empty() {
            return Ok(found);
        }
    }
    pass()
}

fn prefix_items(ev: &Evaluator<'_>, ids: &[SchemaId], value: &Value, at: &Location, depth: usize) -> Outcome {
    let Value::Array(elements) = value else {
        return pass();
    };
    for (i, (id, element)) in ids.iter().zip(elements).enumerate() {
        let found = ev.validate(
            *id,
            Some(element),
            &at.descend(&["prefixItems".into(), i.into()], Some(i.into())),
            depth,
        )?;
        if !found.is_empty() {
            return Ok(found);
        }
    }
    pass()
}

fn min_items(n: u64, value: &Value, at: &Location) -> Outcome {
    match value {
        Value::Array(items) if (items.len() as u64) < n => {
            fail(at, "minItems", format!("Expected array with at least {n} items"), value)
        }
        _ => pass(),
    }
}

fn max_items(n: u64, value: &Value, at: &Location) -> Outcome {
    match value {
        Value::Array(items) if (items.len() as u64) > n => {
            fail(at, "maxItems", format!("Expected array with at most {n} items"), value)
        }
        _ => pass(),
    }
}

fn unique_items(unique: bool, value: &Value, at: &Location) -> Outcome {
    let Value::Array(elements) = value else {
        return pass();
    };
    if !unique {
        return pass();
    }
    let mut seen = HashSet::with_capacity(elements.len());
    if elements.iter().all(|e| seen.insert(CanonicalForm::new(e))) {
        return pass();
    }
    fail(at, "uniqueItems", "Expected array with unique items".to_string(), value)
}

fn contains(ev: &Evaluator<'_>, node: &SchemaNode, id: SchemaId, value: &Value, at: &Location, depth: usize) -> Outcome {
    let Value::Array(elements) = value else {
        return pass();
    };
    let explicit_min = node.keywords().iter().find_map(|k| match k {
        Keyword::MinContains(n) => Some(*n),
        _ => None,
    });
    let max = node.keywords().iter().find_map(|k| match k {
        Keyword::MaxContains(n) => Some(*n),
        _ => None,
    });

    let inner = at.descend(&["contains".into()], None);
    let mut occurrences: u64 = 0;
    for element in elements {
        if ev.accepts(id, element, &inner, depth)? {
            occurrences += 1;
        }
    }

    let min = explicit_min.unwrap_or(1);
    if occurrences < min {
        let keyword = if explicit_min.is_some() { "minContains" } else { "contains" };
        return fail(
            at,
            keyword,
            format!("Expected array to contain at least {min}, but found {occurrences}"),
            value,
        );
    }
    if let Some(max) = max {
        if occurrences > max {
            return fail(
                at,
                "maxContains",
                format!("Expected array to contain at most {max}, but found {occurrences}"),
                value,
            );
        }
    }
    pass()
}

#[cfg(test)]
mod tests {
    use crate::Schema;
    use jsonv_core::SchemaError;
    use serde_json::{json, Value};

    fn errors(schema: &Schema, value: Value) -> Vec<(String, String)> {
        schema
            .validate(&value)
            .unwrap()
            .errors
            .into_iter()
            .map(|e| (e.keyword_location, e.error))
            .collect()
    }

    fn first_error(schema: &Schema, value: Value) -> String {
        errors(schema, value).remove(0).1
    }

    #[test]
    fn test_type_messages() {
        assert_eq!(first_error(&Schema::string(), json!(1)), "Expected string");
        let multi = Schema::from_json(&json!({"type": ["string", "null"]})).unwrap();
        assert_eq!(first_error(&multi, json!(1)), "Expected one of: string, null");
        assert!(multi.validate(&json!(null)).unwrap().valid);
    }

    #[test]
    fn test_integer_type() {
        assert!(Schema::integer().validate(&json!(2.0)).unwrap().valid);
        assert!(!Schema::integer().validate(&json!(2.5)).unwrap().valid);
    }

    #[test]
    fn test_const_uses_canonical_equality() {
        let schema = Schema::literal(json!({"a": 1, "b": [1, 2]}));
        assert!(schema.validate(&json!({"b": [1, 2], "a": 1.0})).unwrap().valid);
        assert_eq!(
            first_error(&schema, json!({"a": 1, "b": [2, 1]})),
            r#"Expected const: {"a":1,"b":[1,2]}"#
        );
    }

    #[test]
    fn test_enum() {
        let schema = Schema::string().enum_values(vec![json!("red"), json!("green")]);
        assert!(schema.validate(&json!("red")).unwrap().valid);
        assert_eq!(first_error(&schema, json!("blue")), r#"Expected enum: ["red","green"]"#);
    }

    #[test]
    fn test_enum_compares_nfc() {
        let schema = Schema::any().enum_values(vec![json!("caf\u{00e9}")]);
        assert!(schema.validate(&json!("cafe\u{0301}")).unwrap().valid);
    }

    #[test]
    fn test_any_of_and_one_of() {
        let any = Schema::any_of(vec![Schema::string(), Schema::always()]);
        let one = Schema::one_of(vec![Schema::string(), Schema::always()]);
        assert!(any.validate(&json!("x")).unwrap().valid);
        assert_eq!(first_error(&one, json!("x")), "Expected exactly one to match");
        assert!(one.validate(&json!(1)).unwrap().valid);
        assert_eq!(
            first_error(&Schema::any_of(vec![Schema::string(), Schema::number()]), json!(true)),
            "Expected at least one to match"
        );
    }

    #[test]
    fn test_all_of() {
        let schema = Schema::all_of(vec![Schema::string(), Schema::any().min_length(2)]);
        assert!(schema.validate(&json!("ab")).unwrap().valid);
        assert_eq!(first_error(&schema, json!("a")), "Expected all to match");
    }

    #[test]
    fn test_not() {
        let schema = Schema::not(Schema::string());
        assert!(schema.validate(&json!(1)).unwrap().valid);
        assert_eq!(errors(&schema, json!("x")), vec![("/not".into(), "Expected not to match".into())]);
    }

    #[test]
    fn test_if_then_else() {
        let schema = Schema::any().if_then_else(
            Schema::string(),
            Some(Schema::any().min_length(3)),
            Some(Schema::number().minimum(0.0)),
        );
        assert!(schema.validate(&json!("abc")).unwrap().valid);
        assert_eq!(
            errors(&schema, json!("ab")),
            vec![("/then/minLength".into(), "Expected string with minimum length of 3".into())]
        );
        assert!(schema.validate(&json!(5)).unwrap().valid);
        assert_eq!(errors(&schema, json!(-1))[0].0, "/else/minimum");

        let only_then = Schema::any().if_then_else(Schema::string(), Some(Schema::any().min_length(3)), None);
        assert!(only_then.validate(&json!(-1)).unwrap().valid);
    }

    #[test]
    fn test_if_without_branches_is_not_evaluated() {
        let schema = Schema::from_json(&json!({"if": {"multipleOf": 0}})).unwrap();
        assert!(schema.validate(&json!(3)).unwrap().valid);

        let with_then = Schema::from_json(&json!({"if": {"multipleOf": 0}, "then": true})).unwrap();
        assert!(matches!(
            with_then.validate(&json!(3)),
            Err(SchemaError::InvalidMultipleOf { .. })
        ));
    }

    #[test]
    fn test_string_lengths() {
        let schema = Schema::string().min_length(2).max_length(3);
        assert_eq!(first_error(&schema, json!("a")), "Expected string with minimum length of 2");
        assert_eq!(first_error(&schema, json!("abcd")), "Expected string with maximum length of 3");
        assert!(schema.validate(&json!("e\u{0301}\u{00e9}")).unwrap().valid);
        assert!(Schema::any().min_length(5).validate(&json!(1)).unwrap().valid);
    }

    #[test]
    fn test_pattern() {
        let schema = Schema::string().pattern("^[a-z]+$").unwrap();
        assert!(schema.validate(&json!("abc")).unwrap().valid);
        assert_eq!(first_error(&schema, json!("ABC")), "Expected string matching pattern ^[a-z]+$");
    }

    #[test]
    fn test_format_known_and_unknown() {
        let schema = Schema::string().format("email");
        assert!(schema.validate(&json!("joe.bloggs@example.com")).unwrap().valid);
        assert_eq!(first_error(&schema, json!("2962")), "Expected string matching format email");
        assert!(Schema::string().format("no-such-format").validate(&json!("x")).unwrap().valid);
        assert!(Schema::any().format("email").validate(&json!(12)).unwrap().valid);
    }

    #[test]
    fn test_numeric_bounds() {
        let schema = Schema::number().minimum(1.0).maximum(10.0);
        assert_eq!(first_error(&schema, json!(0)), "Expected number greater than or equal to 1");
        assert_eq!(first_error(&schema, json!(11)), "Expected number less than or equal to 10");
        assert!(schema.validate(&json!(10)).unwrap().valid);

        let exclusive = Schema::number().exclusive_minimum(1.0).exclusive_maximum(2.5);
        assert_eq!(first_error(&exclusive, json!(1)), "Expected number greater than 1");
        assert_eq!(first_error(&exclusive, json!(2.5)), "Expected number less than 2.5");
    }

    #[test]
    fn test_multiple_of_epsilon() {
        let schema = Schema::number().multiple_of(0.1);
        assert!(schema.validate(&json!(0.3)).unwrap().valid);
        assert!(schema.validate(&json!(1.7)).unwrap().valid);
        assert!(!schema.validate(&json!(0.35)).unwrap().valid);
        assert_eq!(
            first_error(&Schema::number().multiple_of(2.0), json!(7)),
            "Expected number being a multiple of 2"
        );
    }

    #[test]
    fn test_multiple_of_invalid_divisor_is_an_error() {
        let schema = Schema::number().multiple_of(0.0);
        assert!(matches!(
            schema.validate(&json!(1)),
            Err(SchemaError::InvalidMultipleOf { .. })
        ));
        assert!(Schema::number().multiple_of(-2.0).validate(&json!(4)).is_err());
    }

    #[test]
    fn test_properties_reports_nested_location() {
        let schema = Schema::object([("name", Schema::string()), ("age", Schema::number())]);
        let found = schema.validate(&json!({"name": "John", "age": "30"})).unwrap();
        assert_eq!(found.errors[0].keyword_location, "/properties/age/type");
        assert_eq!(found.errors[0].instance_location, "/age");
        assert_eq!(found.errors[0].error, "Expected number");
    }

    #[test]
    fn test_additional_properties_false_reports_extras() {
        let schema = Schema::object([("a", Schema::number())]).strict().unwrap();
        let found = schema.validate(&json!({"a": 1, "b": 2})).unwrap();
        assert_eq!(found.errors.len(), 1);
        assert_eq!(found.errors[0].keyword_location, "/additionalProperties");
        assert_eq!(found.errors[0].error, "Additional properties are not allowed");
        assert_eq!(found.errors[0].data, Some(json!({"b": 2})));
    }

    #[test]
    fn test_additional_properties_schema() {
        let schema = Schema::object([("a", Schema::number())]).additional_properties(Schema::boolean());
        assert!(schema.validate(&json!({"a": 1, "flag": true})).unwrap().valid);
        let found = schema.validate(&json!({"a": 1, "flag": "yes"})).unwrap();
        assert_eq!(found.errors[0].keyword_location, "/additionalProperties/type");
        assert_eq!(found.errors[0].instance_location, "/flag");
        assert_eq!(found.errors[0].error, "Expected boolean");
    }

    #[test]
    fn test_additional_properties_respects_pattern_properties() {
        let schema = Schema::object(Vec::<(&str, Schema)>::new())
            .pattern_properties([("^x-", Schema::string())])
            .unwrap()
            .additional_properties(Schema::never());
        assert!(schema.validate(&json!({"x-a": "ok"})).unwrap().valid);
        assert_eq!(
            errors(&schema, json!({"x-a": 1}))[0],
            ("/patternProperties/^x-/type".into(), "Expected string".into())
        );
        assert!(!schema.validate(&json!({"y": "no"})).unwrap().valid);
    }

    #[test]
    fn test_property_names() {
        let schema = Schema::object(Vec::<(&str, Schema)>::new())
            .property_names(Schema::string().max_length(3));
        assert!(schema.validate(&json!({"abc": 1})).unwrap().valid);
        let found = schema.validate(&json!({"abcd": 1})).unwrap();
        assert_eq!(found.errors[0].keyword_location, "/propertyNames/maxLength");
        assert_eq!(found.errors[0].instance_location, "/abcd");
    }

    #[test]
    fn test_property_counts() {
        let schema = Schema::any().min_properties(1).max_properties(2);
        assert_eq!(first_error(&schema, json!({})), "Expected object with at least 1 properties");
        assert_eq!(
            first_error(&schema, json!({"a": 1, "b": 2, "c": 3})),
            "Expected object with at most 2 properties"
        );
        assert!(schema.validate(&json!([])).unwrap().valid);
    }

    #[test]
    fn test_dependent_required() {
        let schema = Schema::any().dependent_required([("card", vec!["billing"])]);
        assert!(schema.validate(&json!({"name": "x"})).unwrap().valid);
        assert!(schema.validate(&json!({"card": 1, "billing": 2})).unwrap().valid);
        assert_eq!(
            first_error(&schema, json!({"card": 1})),
            "Expected dependent required property billing"
        );
    }

    #[test]
    fn test_dependent_schemas() {
        let schema = Schema::any().dependent_schemas([(
            "card",
            Schema::object([("billing", Schema::string())]),
        )]);
        assert!(schema.validate(&json!({"name": 1})).unwrap().valid);
        let found = schema.validate(&json!({"card": 1})).unwrap();
        assert_eq!(found.errors[0].keyword_location, "/dependentSchemas/card/required");
    }

    #[test]
    fn test_items_after_prefix() {
        let schema = Schema::array(Schema::string()).prefix_items(vec![Schema::number()]);
        assert!(schema.validate(&json!([1, "a", "b"])).unwrap().valid);
        let found = schema.validate(&json!([1, "a", 3])).unwrap();
        assert_eq!(found.errors[0].keyword_location, "/items/type");
        assert_eq!(found.errors[0].instance_location, "/2");
        let found = schema.validate(&json!(["x"])).unwrap();
        assert_eq!(found.errors[0].keyword_location, "/prefixItems/0/type");
    }

    #[test]
    fn test_item_counts() {
        let schema = Schema::array(Schema::any()).min_items(1).max_items(2);
        assert_eq!(first_error(&schema, json!([])), "Expected array with at least 1 items");
        assert_eq!(first_error(&schema, json!([1, 2, 3])), "Expected array with at most 2 items");
    }

    #[test]
    fn test_unique_items_is_order_sensitive_for_nested_arrays() {
        let schema = Schema::array(Schema::any()).unique_items(true);
        assert_eq!(first_error(&schema, json!([1, 2, 1.0])), "Expected array with unique items");
        assert!(schema.validate(&json!([[1, 2], [2, 1]])).unwrap().valid);
        assert!(!schema.validate(&json!([{"a": 1, "b": 2}, {"b": 2, "a": 1}])).unwrap().valid);
        assert!(Schema::array(Schema::any()).unique_items(false).validate(&json!([1, 1])).unwrap().valid);
    }

    #[test]
    fn test_contains_labels() {
        let generic = Schema::array(Schema::any()).contains(Schema::number());
        assert_eq!(
            errors(&generic, json!(["a"])),
            vec![("/contains".into(), "Expected array to contain at least 1, but found 0".into())]
        );

        let explicit = Schema::array(Schema::any()).contains(Schema::number()).min_contains(2).max_contains(3);
        assert_eq!(errors(&explicit, json!([1, "a"]))[0].0, "/minContains");
        assert!(explicit.validate(&json!([1, 2, "a"])).unwrap().valid);
        assert_eq!(
            errors(&explicit, json!([1, 2, 3, 4])),
            vec![("/maxContains".into(), "Expected array to contain at most 3, but found 4".into())]
        );

        let zero = Schema::array(Schema::any()).contains(Schema::number()).min_contains(0);
        assert!(zero.validate(&json!([])).unwrap().valid);
    }

    #[test]
    fn test_aggregates_across_keywords() {
        let schema = Schema::object([("a", Schema::string())]).min_properties(3);
        let found = errors(&schema, json!({"a": 1}));
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].0, "/properties/a/type");
        assert_eq!(found[1].0, "/minProperties");
    }
}

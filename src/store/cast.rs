use serde_json::Value;

use super::{StoreError, StoreResult};

/// Cast a submitted value to an integer field.
///
/// Accepts integers, floats with no fractional part, and strings holding
/// either (surrounding whitespace ignored). Anything else is a
/// [`StoreError::Cast`].
pub fn cast_integer(field: &'static str, value: &Value) -> StoreResult<i64> {
    let cast_error = || StoreError::Cast {
        field,
        value: match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        },
    };

    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().and_then(float_to_integer))
            .ok_or_else(cast_error),
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().and_then(float_to_integer))
                .ok_or_else(cast_error)
        }
        _ => Err(cast_error()),
    }
}

fn float_to_integer(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn casts_numbers_and_numeric_strings() {
        assert_eq!(cast_integer("beds", &json!(3)).unwrap(), 3);
        assert_eq!(cast_integer("beds", &json!(4.0)).unwrap(), 4);
        assert_eq!(cast_integer("beds", &json!("5")).unwrap(), 5);
        assert_eq!(cast_integer("beds", &json!(" 6 ")).unwrap(), 6);
        assert_eq!(cast_integer("beds", &json!("7.0")).unwrap(), 7);
    }

    #[test]
    fn rejects_non_numeric_values() {
        let err = cast_integer("bedsOwned", &json!("lots")).unwrap_err();
        assert!(matches!(err, StoreError::Cast { field: "bedsOwned", .. }));
        assert!(err.to_string().contains("bedsOwned"));
        assert!(cast_integer("age", &json!(2.5)).is_err());
        assert!(cast_integer("age", &json!([1])).is_err());
        assert!(cast_integer("age", &json!(true)).is_err());
    }
}

//! The `util` function namespace
//!
//! A fixed library of pure utility functions callable from any
//! expression as `util.fn(args)`. This is the only namespace bound into
//! evaluation; none of these functions can reach host-process state
//! beyond the clock and the random generator.
//!
//! Null handling follows the engine contract: transforms return null on
//! null input, predicates return false, and the numeric coercions fall
//! back to zero.

use chrono::{Local, NaiveDateTime, Utc};
use rand::Rng;
use ruleflow_domain::{Error, Result, Value};
use uuid::Uuid;

/// Dispatch a `util.fn(args)` call
pub fn call(source: &str, name: &str, args: &[Value]) -> Result<Value> {
    let f = Call { source, name, args };
    match name {
        // Date/time
        "now" => f.nullary(|| Value::Timestamp(Utc::now())),
        "today" => f.nullary(|| Value::Date(Local::now().date_naive())),
        "currentDateTime" => f.nullary(|| Value::DateTime(Local::now().naive_local())),
        "currentTimeMillis" => f.nullary(|| Value::Int(Utc::now().timestamp_millis())),
        "formatDate" => f.format_date(),
        // Math
        "abs" => f.abs(),
        "round" => f.round(),
        "ceil" => f.float_unary(f64::ceil),
        "floor" => f.float_unary(f64::floor),
        "max" => f.max_min(true),
        "min" => f.max_min(false),
        "pow" => f.pow(),
        "sqrt" => f.float_unary(f64::sqrt),
        "roundTo" => f.round_to(),
        // Collection math
        "sumItems" => f.sum_items(),
        "sumField" => f.sum_field(),
        "avgField" => f.avg_field(),
        "countItems" => f.count_items(),
        // JSON
        "toJson" => f.to_json(false),
        "toPrettyJson" => f.to_json(true),
        "fromJson" => f.from_json(),
        // Strings and collections
        "isEmpty" => f.is_empty(false),
        "isNotEmpty" => f.is_empty(true),
        "isBlank" => f.is_blank(),
        "lower" => f.string_transform(|s| s.to_lowercase()),
        "upper" => f.string_transform(|s| s.to_uppercase()),
        "trim" => f.string_transform(|s| s.trim().to_string()),
        "contains" => f.contains(),
        "startsWith" => f.string_predicate(|s, p| s.starts_with(p)),
        "endsWith" => f.string_predicate(|s, p| s.ends_with(p)),
        "substring" => f.substring(),
        "replace" => f.replace(),
        "size" => f.size(),
        "first" => f.first_last(true),
        "last" => f.first_last(false),
        // Type / coercion
        "isNull" => f.is_null(false),
        "isNotNull" => f.is_null(true),
        "defaultIfNull" => f.default_if_null(),
        "toDouble" => f.to_double(),
        "toInt" => f.to_int(),
        // Misc
        "uuid" => f.nullary(|| Value::String(Uuid::new_v4().to_string())),
        "randomInt" => f.random_int(),
        "join" => f.join(),
        "split" => f.split(),
        "coalesce" => f.coalesce(),
        _ => Err(Error::expression(
            source,
            format!("unknown util function 'util.{name}'"),
        )),
    }
}

struct Call<'a> {
    source: &'a str,
    name: &'a str,
    args: &'a [Value],
}

impl Call<'_> {
    fn error(&self, message: String) -> Error {
        Error::expression(self.source, format!("util.{}: {message}", self.name))
    }

    fn arity(&self, expected: usize) -> Result<()> {
        if self.args.len() == expected {
            Ok(())
        } else {
            Err(self.error(format!(
                "expects {expected} argument(s), got {}",
                self.args.len()
            )))
        }
    }

    fn arg(&self, i: usize) -> &Value {
        self.args.get(i).unwrap_or(&Value::Null)
    }

    fn number(&self, i: usize) -> Result<f64> {
        self.arg(i)
            .as_f64()
            .ok_or_else(|| self.error(format!("argument {} must be a number", i + 1)))
    }

    fn integer(&self, i: usize) -> Result<i64> {
        self.arg(i)
            .as_i64()
            .ok_or_else(|| self.error(format!("argument {} must be an integer", i + 1)))
    }

    fn string(&self, i: usize) -> Result<&str> {
        self.arg(i)
            .as_str()
            .ok_or_else(|| self.error(format!("argument {} must be a string", i + 1)))
    }

    fn nullary(&self, produce: impl FnOnce() -> Value) -> Result<Value> {
        self.arity(0)?;
        Ok(produce())
    }

    // ---- date/time -------------------------------------------------

    fn format_date(&self) -> Result<Value> {
        self.arity(2)?;
        let pattern = self.string(1)?;
        let naive: NaiveDateTime = match self.arg(0) {
            Value::Null => return Ok(Value::Null),
            Value::Timestamp(ts) => ts.naive_utc(),
            Value::DateTime(dt) => *dt,
            Value::Date(d) => d
                .and_hms_opt(0, 0, 0)
                .ok_or_else(|| self.error("invalid date".into()))?,
            other => return Ok(Value::String(other.to_string())),
        };
        let chrono_pattern = java_pattern_to_chrono(pattern);
        Ok(Value::String(naive.format(&chrono_pattern).to_string()))
    }

    // ---- math ------------------------------------------------------

    fn abs(&self) -> Result<Value> {
        self.arity(1)?;
        match self.arg(0) {
            Value::Int(i) => Ok(Value::Int(i.abs())),
            Value::Float(f) => Ok(Value::Float(f.abs())),
            other => Err(self.error(format!("expects a number, got {}", other.type_name()))),
        }
    }

    fn round(&self) -> Result<Value> {
        self.arity(1)?;
        // f64::round is half-away-from-zero, i.e. HALF_UP
        Ok(Value::Int(self.number(0)?.round() as i64))
    }

    fn float_unary(&self, op: impl FnOnce(f64) -> f64) -> Result<Value> {
        self.arity(1)?;
        Ok(Value::Float(op(self.number(0)?)))
    }

    fn max_min(&self, want_max: bool) -> Result<Value> {
        self.arity(2)?;
        if let (Value::Int(a), Value::Int(b)) = (self.arg(0), self.arg(1)) {
            let result = if want_max { *a.max(b) } else { *a.min(b) };
            return Ok(Value::Int(result));
        }
        let (a, b) = (self.number(0)?, self.number(1)?);
        Ok(Value::Float(if want_max { a.max(b) } else { a.min(b) }))
    }

    fn pow(&self) -> Result<Value> {
        self.arity(2)?;
        Ok(Value::Float(self.number(0)?.powf(self.number(1)?)))
    }

    fn round_to(&self) -> Result<Value> {
        self.arity(2)?;
        let value = self.number(0)?;
        let decimals = self.integer(1)?;
        if decimals < 0 {
            return Err(self.error("decimals must be >= 0".into()));
        }
        let factor = 10f64.powi(decimals as i32);
        Ok(Value::Float((value * factor).round() / factor))
    }

    // ---- collection math -------------------------------------------

    fn sum_items(&self) -> Result<Value> {
        self.arity(1)?;
        let Some(items) = self.arg(0).as_list() else {
            return Ok(Value::Float(0.0));
        };
        let mut sum = 0.0;
        for item in items {
            let Some(map) = item.as_map() else { continue };
            let price = map.get("price").and_then(loose_double);
            let quantity = map.get("quantity").and_then(loose_double);
            if let (Some(price), Some(quantity)) = (price, quantity) {
                sum += price * quantity;
            }
        }
        Ok(Value::Float(sum))
    }

    fn sum_field(&self) -> Result<Value> {
        self.arity(2)?;
        let field = self.string(1)?;
        let Some(items) = self.arg(0).as_list() else {
            return Ok(Value::Float(0.0));
        };
        let sum: f64 = items
            .iter()
            .filter_map(Value::as_map)
            .map(|map| map.get(field).map_or(0.0, coerce_double))
            .sum();
        Ok(Value::Float(sum))
    }

    fn avg_field(&self) -> Result<Value> {
        self.arity(2)?;
        let size = self.arg(0).as_list().map_or(0, <[Value]>::len);
        if size == 0 {
            return Ok(Value::Float(0.0));
        }
        let Value::Float(sum) = self.sum_field()? else {
            return Ok(Value::Float(0.0));
        };
        Ok(Value::Float(sum / size as f64))
    }

    fn count_items(&self) -> Result<Value> {
        self.arity(1)?;
        let count = match self.arg(0) {
            Value::List(items) => items.len(),
            Value::Map(map) => map.len(),
            Value::String(s) => s.chars().count(),
            _ => 0,
        };
        Ok(Value::Int(count as i64))
    }

    // ---- json ------------------------------------------------------

    fn to_json(&self, pretty: bool) -> Result<Value> {
        self.arity(1)?;
        let json = self.arg(0).to_json();
        let encoded = if pretty {
            serde_json::to_string_pretty(&json)
        } else {
            serde_json::to_string(&json)
        };
        Ok(Value::String(encoded.unwrap_or_else(|e| {
            format!("{{\"error\": \"{e}\"}}")
        })))
    }

    fn from_json(&self) -> Result<Value> {
        self.arity(1)?;
        let Some(text) = self.arg(0).as_str() else {
            return Ok(Value::Null);
        };
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str::<serde_json::Value>(text)
            .map(|json| Value::from_json(&json))
            .unwrap_or(Value::Null))
    }

    // ---- strings and collections -----------------------------------

    fn is_empty(&self, negate: bool) -> Result<Value> {
        self.arity(1)?;
        let empty = match self.arg(0) {
            // Predicates are false on null input, for either polarity
            Value::Null => return Ok(Value::Bool(false)),
            Value::String(s) => s.is_empty(),
            Value::List(items) => items.is_empty(),
            Value::Map(map) => map.is_empty(),
            other => {
                return Err(self.error(format!(
                    "expects a string or collection, got {}",
                    other.type_name()
                )));
            }
        };
        Ok(Value::Bool(empty != negate))
    }

    fn is_blank(&self) -> Result<Value> {
        self.arity(1)?;
        match self.arg(0) {
            Value::Null => Ok(Value::Bool(false)),
            Value::String(s) => Ok(Value::Bool(s.trim().is_empty())),
            other => Err(self.error(format!("expects a string, got {}", other.type_name()))),
        }
    }

    fn string_transform(&self, op: impl FnOnce(&str) -> String) -> Result<Value> {
        self.arity(1)?;
        match self.arg(0) {
            Value::Null => Ok(Value::Null),
            Value::String(s) => Ok(Value::String(op(s))),
            other => Err(self.error(format!("expects a string, got {}", other.type_name()))),
        }
    }

    fn string_predicate(&self, op: impl FnOnce(&str, &str) -> bool) -> Result<Value> {
        self.arity(2)?;
        match self.arg(0) {
            Value::Null => Ok(Value::Bool(false)),
            Value::String(s) => Ok(Value::Bool(op(s, self.string(1)?))),
            other => Err(self.error(format!("expects a string, got {}", other.type_name()))),
        }
    }

    fn contains(&self) -> Result<Value> {
        self.arity(2)?;
        let found = match self.arg(0) {
            Value::Null => return Ok(Value::Bool(false)),
            Value::String(s) => s.contains(self.string(1)?),
            Value::List(items) => items.contains(self.arg(1)),
            Value::Map(map) => {
                let key = self.string(1)?;
                map.contains_key(key)
            }
            other => {
                return Err(self.error(format!(
                    "expects a string or collection, got {}",
                    other.type_name()
                )));
            }
        };
        Ok(Value::Bool(found))
    }

    fn substring(&self) -> Result<Value> {
        self.arity(3)?;
        match self.arg(0) {
            Value::Null => Ok(Value::Null),
            Value::String(s) => {
                let chars: Vec<char> = s.chars().collect();
                let start = (self.integer(1)?.max(0) as usize).min(chars.len());
                let end = (self.integer(2)?.max(0) as usize).clamp(start, chars.len());
                Ok(Value::String(chars[start..end].iter().collect()))
            }
            other => Err(self.error(format!("expects a string, got {}", other.type_name()))),
        }
    }

    fn replace(&self) -> Result<Value> {
        self.arity(3)?;
        match self.arg(0) {
            Value::Null => Ok(Value::Null),
            Value::String(s) => Ok(Value::String(
                s.replace(self.string(1)?, self.string(2)?),
            )),
            other => Err(self.error(format!("expects a string, got {}", other.type_name()))),
        }
    }

    fn size(&self) -> Result<Value> {
        self.arity(1)?;
        let size = match self.arg(0) {
            Value::Null => 0,
            Value::String(s) => s.chars().count(),
            Value::List(items) => items.len(),
            Value::Map(map) => map.len(),
            other => {
                return Err(self.error(format!(
                    "expects a string or collection, got {}",
                    other.type_name()
                )));
            }
        };
        Ok(Value::Int(size as i64))
    }

    fn first_last(&self, want_first: bool) -> Result<Value> {
        self.arity(1)?;
        match self.arg(0) {
            Value::Null => Ok(Value::Null),
            Value::List(items) => {
                let item = if want_first {
                    items.first()
                } else {
                    items.last()
                };
                Ok(item.cloned().unwrap_or(Value::Null))
            }
            Value::String(s) => {
                let c = if want_first {
                    s.chars().next()
                } else {
                    s.chars().last()
                };
                Ok(c.map(|c| Value::String(c.to_string())).unwrap_or(Value::Null))
            }
            other => Err(self.error(format!(
                "expects a list or string, got {}",
                other.type_name()
            ))),
        }
    }

    // ---- type / coercion -------------------------------------------

    fn is_null(&self, negate: bool) -> Result<Value> {
        self.arity(1)?;
        Ok(Value::Bool(self.arg(0).is_null() != negate))
    }

    fn default_if_null(&self) -> Result<Value> {
        self.arity(2)?;
        if self.arg(0).is_null() {
            Ok(self.arg(1).clone())
        } else {
            Ok(self.arg(0).clone())
        }
    }

    fn to_double(&self) -> Result<Value> {
        self.arity(1)?;
        Ok(Value::Float(coerce_double(self.arg(0))))
    }

    fn to_int(&self) -> Result<Value> {
        self.arity(1)?;
        let value = match self.arg(0) {
            Value::Int(i) => *i,
            Value::Float(f) => *f as i64,
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .ok()
                .or_else(|| s.trim().parse::<f64>().ok().map(|f| f as i64))
                .unwrap_or(0),
            _ => 0,
        };
        Ok(Value::Int(value))
    }

    // ---- misc ------------------------------------------------------

    fn random_int(&self) -> Result<Value> {
        self.arity(2)?;
        let min = self.integer(0)?;
        let max = self.integer(1)?;
        if min > max {
            return Err(self.error(format!("min {min} is greater than max {max}")));
        }
        Ok(Value::Int(rand::rng().random_range(min..=max)))
    }

    fn join(&self) -> Result<Value> {
        self.arity(2)?;
        match self.arg(0) {
            Value::Null => Ok(Value::Null),
            Value::List(items) => {
                let delim = self.string(1)?;
                let joined = items
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(delim);
                Ok(Value::String(joined))
            }
            other => Err(self.error(format!("expects a list, got {}", other.type_name()))),
        }
    }

    fn split(&self) -> Result<Value> {
        self.arity(2)?;
        match self.arg(0) {
            Value::Null => Ok(Value::Null),
            Value::String(s) => {
                let delim = self.string(1)?;
                Ok(Value::List(
                    s.split(delim)
                        .map(|part| Value::String(part.to_string()))
                        .collect(),
                ))
            }
            other => Err(self.error(format!("expects a string, got {}", other.type_name()))),
        }
    }

    fn coalesce(&self) -> Result<Value> {
        Ok(self
            .args
            .iter()
            .find(|value| !value.is_null())
            .cloned()
            .unwrap_or(Value::Null))
    }
}

/// `toDouble` coercion: numeric pass-through, string parse, zero
/// fallback
fn coerce_double(value: &Value) -> f64 {
    match value {
        Value::Int(i) => *i as f64,
        Value::Float(f) => *f,
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Lenient numeric view used by `sumItems`: numbers and numeric
/// strings convert, everything else is skipped by the caller
fn loose_double(value: &Value) -> Option<f64> {
    match value {
        Value::Int(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Translate a Java-style date pattern (yyyy-MM-dd HH:mm:ss) to a
/// chrono format string
fn java_pattern_to_chrono(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_ascii_alphabetic() {
            let mut run = 1;
            while i + run < chars.len() && chars[i + run] == c {
                run += 1;
            }
            match c {
                'y' => out.push_str(if run >= 4 { "%Y" } else { "%y" }),
                'M' => out.push_str("%m"),
                'd' => out.push_str("%d"),
                'H' => out.push_str("%H"),
                'h' => out.push_str("%I"),
                'm' => out.push_str("%M"),
                's' => out.push_str("%S"),
                'S' => out.push_str("%3f"),
                'a' => out.push_str("%p"),
                'E' => out.push_str("%a"),
                _ => {
                    for _ in 0..run {
                        out.push(c);
                    }
                }
            }
            i += run;
        } else if c == '%' {
            out.push_str("%%");
            i += 1;
        } else if c == '\'' {
            // Java quoted literal section
            i += 1;
            while i < chars.len() && chars[i] != '\'' {
                if chars[i] == '%' {
                    out.push_str("%%");
                } else {
                    out.push(chars[i]);
                }
                i += 1;
            }
            i += 1;
        } else {
            out.push(c);
            i += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call_fn(name: &str, args: &[Value]) -> Result<Value> {
        call("test", name, args)
    }

    #[test]
    fn test_round_to_half_up_and_idempotent() {
        let once = call_fn("roundTo", &[Value::Float(148.50000000000003), Value::Int(2)])
            .expect("roundTo");
        assert_eq!(once, Value::Float(148.5));
        let twice = call_fn("roundTo", &[once.clone(), Value::Int(2)]).expect("roundTo");
        assert_eq!(once, twice);

        assert_eq!(
            call_fn("roundTo", &[Value::Float(2.675), Value::Int(0)]).expect("roundTo"),
            Value::Float(3.0)
        );
        assert!(call_fn("roundTo", &[Value::Float(1.0), Value::Int(-1)]).is_err());
    }

    #[test]
    fn test_math_group() {
        assert_eq!(call_fn("abs", &[Value::Int(-4)]).unwrap(), Value::Int(4));
        assert_eq!(
            call_fn("round", &[Value::Float(2.5)]).unwrap(),
            Value::Int(3)
        );
        assert_eq!(
            call_fn("max", &[Value::Int(2), Value::Int(9)]).unwrap(),
            Value::Int(9)
        );
        assert_eq!(
            call_fn("min", &[Value::Float(2.5), Value::Int(9)]).unwrap(),
            Value::Float(2.5)
        );
        assert_eq!(
            call_fn("pow", &[Value::Int(2), Value::Int(10)]).unwrap(),
            Value::Float(1024.0)
        );
    }

    #[test]
    fn test_sum_items_skips_incomplete_entries() {
        let item = |price: Option<Value>, quantity: Option<Value>| {
            let mut map = std::collections::BTreeMap::new();
            if let Some(p) = price {
                map.insert("price".to_string(), p);
            }
            if let Some(q) = quantity {
                map.insert("quantity".to_string(), q);
            }
            Value::Map(map)
        };
        let list = Value::List(vec![
            item(Some(Value::Float(2.5)), Some(Value::Int(4))),
            item(Some(Value::Null), Some(Value::Int(2))),
            item(None, Some(Value::Int(2))),
            item(Some(Value::String("3".into())), Some(Value::Int(1))),
        ]);
        assert_eq!(
            call_fn("sumItems", &[list]).unwrap(),
            Value::Float(13.0)
        );
        assert_eq!(
            call_fn("sumItems", &[Value::Null]).unwrap(),
            Value::Float(0.0)
        );
    }

    #[test]
    fn test_field_aggregates() {
        let row = |v: Value| {
            let mut map = std::collections::BTreeMap::new();
            map.insert("score".to_string(), v);
            Value::Map(map)
        };
        let list = Value::List(vec![
            row(Value::Int(10)),
            row(Value::Float(20.0)),
            row(Value::String("oops".into())),
        ]);
        assert_eq!(
            call_fn("sumField", &[list.clone(), Value::String("score".into())]).unwrap(),
            Value::Float(30.0)
        );
        assert_eq!(
            call_fn("avgField", &[list, Value::String("score".into())]).unwrap(),
            Value::Float(10.0)
        );
        assert_eq!(
            call_fn("avgField", &[Value::List(vec![]), Value::String("x".into())]).unwrap(),
            Value::Float(0.0)
        );
    }

    #[test]
    fn test_json_functions() {
        let mut map = std::collections::BTreeMap::new();
        map.insert("b".to_string(), Value::Int(2));
        map.insert("a".to_string(), Value::Int(1));
        let encoded = call_fn("toJson", &[Value::Map(map.clone())]).unwrap();
        // BTreeMap keys give a stable encoding
        assert_eq!(encoded, Value::String("{\"a\":1,\"b\":2}".into()));

        let decoded = call_fn("fromJson", &[encoded]).unwrap();
        assert_eq!(decoded, Value::Map(map));

        assert_eq!(
            call_fn("fromJson", &[Value::String("  ".into())]).unwrap(),
            Value::Null
        );
        assert_eq!(
            call_fn("fromJson", &[Value::String("not json".into())]).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_null_safe_strings() {
        assert_eq!(call_fn("lower", &[Value::Null]).unwrap(), Value::Null);
        assert_eq!(
            call_fn("isEmpty", &[Value::Null]).unwrap(),
            Value::Bool(false)
        );
        assert_eq!(
            call_fn("startsWith", &[Value::Null, Value::String("a".into())]).unwrap(),
            Value::Bool(false)
        );
        assert_eq!(
            call_fn("upper", &[Value::String("abc".into())]).unwrap(),
            Value::String("ABC".into())
        );
        assert_eq!(
            call_fn(
                "replace",
                &[
                    Value::String("a-b".into()),
                    Value::String("-".into()),
                    Value::String("+".into())
                ]
            )
            .unwrap(),
            Value::String("a+b".into())
        );
    }

    #[test]
    fn test_collection_overloads() {
        let list = Value::List(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(call_fn("size", &[list.clone()]).unwrap(), Value::Int(2));
        assert_eq!(call_fn("size", &[Value::Null]).unwrap(), Value::Int(0));
        assert_eq!(
            call_fn("contains", &[list.clone(), Value::Int(2)]).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            call_fn(
                "contains",
                &[Value::String("workflow".into()), Value::String("flow".into())]
            )
            .unwrap(),
            Value::Bool(true)
        );
        assert_eq!(call_fn("first", &[list.clone()]).unwrap(), Value::Int(1));
        assert_eq!(call_fn("last", &[list]).unwrap(), Value::Int(2));
        assert_eq!(
            call_fn("first", &[Value::List(vec![])]).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_coercions() {
        assert_eq!(
            call_fn("toDouble", &[Value::String("2.5".into())]).unwrap(),
            Value::Float(2.5)
        );
        assert_eq!(
            call_fn("toDouble", &[Value::String("junk".into())]).unwrap(),
            Value::Float(0.0)
        );
        assert_eq!(call_fn("toDouble", &[Value::Null]).unwrap(), Value::Float(0.0));
        assert_eq!(
            call_fn("toInt", &[Value::Float(3.9)]).unwrap(),
            Value::Int(3)
        );
        assert_eq!(
            call_fn("toInt", &[Value::String("42".into())]).unwrap(),
            Value::Int(42)
        );
        assert_eq!(
            call_fn(
                "defaultIfNull",
                &[Value::Null, Value::String("fallback".into())]
            )
            .unwrap(),
            Value::String("fallback".into())
        );
    }

    #[test]
    fn test_misc_group() {
        let id = call_fn("uuid", &[]).unwrap();
        let Value::String(id) = id else {
            panic!("uuid must be a string")
        };
        assert_eq!(id.len(), 36);
        assert_eq!(id, id.to_lowercase());

        for _ in 0..50 {
            let n = call_fn("randomInt", &[Value::Int(1), Value::Int(3)]).unwrap();
            let Value::Int(n) = n else { panic!("int expected") };
            assert!((1..=3).contains(&n));
        }
        assert!(call_fn("randomInt", &[Value::Int(5), Value::Int(1)]).is_err());

        assert_eq!(
            call_fn(
                "join",
                &[
                    Value::List(vec![Value::Int(1), Value::Int(2)]),
                    Value::String(",".into())
                ]
            )
            .unwrap(),
            Value::String("1,2".into())
        );
        assert_eq!(
            call_fn(
                "split",
                &[Value::String("a,b".into()), Value::String(",".into())]
            )
            .unwrap(),
            Value::List(vec![Value::String("a".into()), Value::String("b".into())])
        );
        assert_eq!(
            call_fn("coalesce", &[Value::Null, Value::Null, Value::Int(7)]).unwrap(),
            Value::Int(7)
        );
        assert_eq!(call_fn("coalesce", &[]).unwrap(), Value::Null);
    }

    #[test]
    fn test_format_date_java_patterns() {
        let date = Value::Date(chrono::NaiveDate::from_ymd_opt(2024, 3, 9).expect("date"));
        assert_eq!(
            call_fn("formatDate", &[date, Value::String("yyyy-MM-dd".into())]).unwrap(),
            Value::String("2024-03-09".into())
        );
        let dt = Value::DateTime(
            chrono::NaiveDate::from_ymd_opt(2024, 3, 9)
                .expect("date")
                .and_hms_opt(14, 5, 6)
                .expect("time"),
        );
        assert_eq!(
            call_fn(
                "formatDate",
                &[dt, Value::String("dd/MM/yyyy HH:mm:ss".into())]
            )
            .unwrap(),
            Value::String("09/03/2024 14:05:06".into())
        );
        // Non-temporal input falls back to its display form
        assert_eq!(
            call_fn(
                "formatDate",
                &[Value::Int(5), Value::String("yyyy".into())]
            )
            .unwrap(),
            Value::String("5".into())
        );
        assert_eq!(
            call_fn("formatDate", &[Value::Null, Value::String("yyyy".into())]).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_unknown_function() {
        assert!(call_fn("launchMissiles", &[]).is_err());
    }
}

//! value representation
//!
//! The builder accepts and produces the following data types
//! - boolean (true/false)
//! - integer (signed, i64)
//! - decimal (f64, no rounding policy of our own)
//! - string (utf-8, always a literal)
//! - array ("list" of values)
//! - object (order-preserving "map"/"dictionary", where the key is of type string)
//! - raw (an expression written out as-is: references, function calls, conditionals, ...)
//!
//! Conversions into the document go through [hcl::Expression], conversions out of it through
//! [hcl::Value] (static evaluation) or [Value::from_expression] (lossless, keeps references as [Value::Raw]).
//!
//! Objects are rendered with their keys sorted so that the order in which nested keys were merged
//! never shows up in the output.
use crate::path::is_identifier;
use hcl::eval::{Context, Evaluate};
use serde::{
    ser::{SerializeMap, SerializeSeq},
    Serializer,
};

/// Object representation used by [Value::Object]
pub type Map = indexmap::IndexMap<String, Value>;

/// All possible value types
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    Decimal(f64),
    String(String),
    Array(Vec<Value>),
    Object(Map),
    /// Expression text that is not a literal, e.g. `aws_instance.web.id` or `timestamp()`
    Raw(String),
}

impl Value {
    /// Creates a [Value::Raw]
    pub fn raw(expression: impl Into<String>) -> Self {
        Value::Raw(expression.into())
    }

    /// Interprets `text` as an hcl expression.
    ///
    /// - statically evaluable text becomes the evaluated value (`["*"]`, `true`, `{ a = 1 }`)
    /// - text that parses but references something unknown becomes [Value::Raw]
    ///   (`aws_instance.web.id`, `data.x.ids[0]`, `timestamp()`, `var.env == "prod" ? 1 : 2`)
    /// - everything else, including a lone identifier such as `Mesh`, is a literal [Value::String]
    pub fn infer(text: &str) -> Self {
        let Some(expression) = parse_expression(text) else {
            return Value::String(text.to_owned());
        };

        if let Some(value) = evaluate(&expression) {
            return value;
        }

        if matches!(expression, hcl::Expression::Variable(_)) {
            return Value::String(text.to_owned());
        }

        Value::Raw(text.trim().to_owned())
    }

    /// Converts an attribute expression back into a [Value].
    ///
    /// Arrays and objects are walked element by element. Leaves that cannot be evaluated statically
    /// are kept as [Value::Raw] so that nothing gets lost when the value is merged and written back.
    ///
    /// Returns `None` only if such a leaf cannot be formatted.
    pub fn from_expression(expression: &hcl::Expression) -> Option<Self> {
        match expression {
            hcl::Expression::Array(items) => items
                .iter()
                .map(Value::from_expression)
                .collect::<Option<Vec<_>>>()
                .map(Value::Array),
            hcl::Expression::Object(object) => object
                .iter()
                .map(|(key, value)| Some((object_key_name(key)?, Value::from_expression(value)?)))
                .collect::<Option<Map>>()
                .map(Value::Object)
                .or_else(|| raw_from_expression(expression)),
            _ => evaluate(expression).or_else(|| raw_from_expression(expression)),
        }
    }

    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Raw(s) => Some(s),
            _ => None,
        }
    }
}

/// Parses `text` as an hcl expression and evaluates it without any variables or functions in scope.
///
/// Syntax errors and evaluation errors both yield `None`; callers treat the text as a literal then.
pub fn parse_as_expression(text: &str) -> Option<Value> {
    parse_expression(text).and_then(|expression| evaluate(&expression))
}

/// Parses `text` as an hcl expression without evaluating it
pub fn parse_expression(text: &str) -> Option<hcl::Expression> {
    match text.parse::<hcl_edit::expr::Expression>() {
        Ok(expression) => Some(expression.into()),
        Err(error) => {
            tracing::trace!(%error, text, "not an hcl expression");
            None
        }
    }
}

fn evaluate(expression: &hcl::Expression) -> Option<Value> {
    match expression.evaluate(&Context::new()) {
        Ok(value) => Some(value.into()),
        Err(errors) => {
            tracing::trace!(%errors, "expression is not statically evaluable");
            None
        }
    }
}

fn raw_from_expression(expression: &hcl::Expression) -> Option<Value> {
    match hcl::format::to_string(expression) {
        Ok(text) => Some(Value::Raw(text)),
        Err(error) => {
            tracing::warn!(%error, "unable to format expression");
            None
        }
    }
}

fn object_key_name(key: &hcl::ObjectKey) -> Option<String> {
    match key {
        hcl::ObjectKey::Identifier(ident) => Some(ident.to_string()),
        hcl::ObjectKey::Expression(hcl::Expression::String(s)) => Some(s.clone()),
        hcl::ObjectKey::Expression(expression) => match evaluate(expression)? {
            Value::String(s) => Some(s),
            _ => None,
        },
        _ => None,
    }
}

/// Whole numbers beyond the i64 range are written as u64 where possible,
/// [hcl::Number::from_f64] would saturate them to [i64::MAX]
fn decimal_number(float: f64) -> Option<hcl::Number> {
    if float.fract() == 0.0 && float >= I64_END && float < U64_END {
        return Some(hcl::Number::from(float as u64));
    }
    hcl::Number::from_f64(float)
}

/// 2^63, the first whole float above [i64::MAX]
const I64_END: f64 = 9_223_372_036_854_775_808.0;
/// 2^64, the first whole float above [u64::MAX]
const U64_END: f64 = 18_446_744_073_709_551_616.0;

fn object_key(key: String) -> hcl::ObjectKey {
    if is_identifier(&key) {
        hcl::ObjectKey::Identifier(hcl::Identifier::unchecked(key))
    } else {
        hcl::ObjectKey::Expression(hcl::Expression::String(key))
    }
}

impl From<Value> for hcl::Expression {
    fn from(value: Value) -> Self {
        match value {
            Value::Boolean(b) => hcl::Expression::Bool(b),
            Value::Integer(int) => hcl::Expression::Number(int.into()),
            Value::Decimal(float) => match decimal_number(float) {
                Some(num) => hcl::Expression::Number(num),
                None => {
                    // NaN and infinities have no hcl literal
                    tracing::debug!(float, "non-finite number written as string");
                    hcl::Expression::String(float.to_string())
                }
            },
            Value::String(s) => hcl::Expression::String(s),
            Value::Array(items) => {
                hcl::Expression::Array(items.into_iter().map(Into::into).collect())
            }
            Value::Object(map) => {
                let mut entries: Vec<_> = map.into_iter().collect();
                entries.sort_by(|(a, _), (b, _)| a.cmp(b));
                hcl::Expression::Object(
                    entries
                        .into_iter()
                        .map(|(key, value)| (object_key(key), value.into()))
                        .collect(),
                )
            }
            Value::Raw(text) => match parse_expression(&text) {
                Some(expression) => expression,
                None => {
                    tracing::warn!(%text, "raw value is not an hcl expression, writing it as string");
                    hcl::Expression::String(text)
                }
            },
        }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Decimal(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::Array(value.into_iter().map(Into::into).collect())
    }
}

impl<K: ToString, V: Into<Value>> From<hcl::value::Map<K, V>> for Value {
    fn from(value: hcl::value::Map<K, V>) -> Self {
        Value::Object(
            value
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.into()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Value::Object(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<hcl::Number> for Value {
    fn from(value: hcl::Number) -> Self {
        if let Some(int) = value.as_i64() {
            return Value::Integer(int);
        }

        match value.as_f64() {
            // whole floats within i64 range are integers
            Some(float) if float.fract() == 0.0 && float >= -I64_END && float < I64_END => {
                Value::Integer(float as i64)
            }
            Some(float) => Value::Decimal(float),
            None => Value::String(value.to_string()),
        }
    }
}

impl From<hcl::Value> for Value {
    fn from(value: hcl::Value) -> Value {
        match value {
            hcl::Value::Bool(b) => b.into(),
            hcl::Value::Number(n) => n.into(),
            hcl::Value::String(s) => s.into(),
            hcl::Value::Array(a) => a.into(),
            hcl::Value::Object(o) => o.into(),
            hcl::Value::Null => Value::Raw("null".to_owned()),
        }
    }
}

impl serde::ser::Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Boolean(value) => serializer.serialize_bool(*value),
            Value::Integer(value) => serializer.serialize_i64(*value),
            Value::Decimal(value) => serializer.serialize_f64(*value),
            Value::String(value) | Value::Raw(value) => serializer.serialize_str(value),
            Value::Array(value) => {
                let mut ser = serializer.serialize_seq(Some(value.len()))?;
                for element in value {
                    ser.serialize_element(element)?;
                }
                ser.end()
            }
            Value::Object(value) => {
                let mut ser = serializer.serialize_map(Some(value.len()))?;
                for (element_key, element_value) in value {
                    ser.serialize_entry(element_key, element_value)?;
                }
                ser.end()
            }
        }
    }
}

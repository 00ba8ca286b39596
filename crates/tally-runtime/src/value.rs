//! Runtime value representation
//!
//! Dynamic values flowing through assertions.
//! - Undefined, Null, Bool, Number: immediate values
//! - Strings: reference-counted (Arc<String>), immutable
//! - Arrays, Objects: reference-counted; identity is the allocation
//! - Functions: named Rust closures that receive the assertion library
//!
//! Two equality relations are exposed and deliberately kept apart:
//! [`Value::loose_eq`] coerces between numbers, strings and booleans, while
//! [`Value::strict_eq`] requires the same type and, for containers, the same
//! allocation.

use crate::assert::Assertions;
use crate::error::TestError;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Shared array storage. Cloning a `ValueArray` aliases the same allocation.
#[derive(Clone, Debug, Default)]
pub struct ValueArray(Arc<Vec<Value>>);

impl ValueArray {
    pub fn from_vec(v: Vec<Value>) -> Self {
        ValueArray(Arc::new(v))
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }

    /// True when both handles point at the same allocation.
    pub fn same_ref(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl FromIterator<Value> for ValueArray {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        ValueArray(Arc::new(iter.into_iter().collect()))
    }
}

/// Shared string-keyed map. Keys are kept sorted so rendering is stable.
#[derive(Clone, Debug, Default)]
pub struct ValueMap(Arc<BTreeMap<String, Value>>);

impl ValueMap {
    pub fn from_map(m: BTreeMap<String, Value>) -> Self {
        ValueMap(Arc::new(m))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::collections::btree_map::Iter<'_, String, Value> {
        self.0.iter()
    }

    pub fn keys(&self) -> std::collections::btree_map::Keys<'_, String, Value> {
        self.0.keys()
    }

    pub fn same_ref(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Body of a callable value. Receives the assertion library explicitly.
pub type NativeFn = Arc<dyn Fn(&mut Assertions) -> Result<Value, TestError> + Send + Sync>;

/// A named callable. The name doubles as the test label.
#[derive(Clone)]
pub struct FunctionRef {
    pub name: Arc<str>,
    pub body: NativeFn,
}

impl FunctionRef {
    /// Label used in reports; anonymous functions get a placeholder.
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            "<anonymous>"
        } else {
            &self.name
        }
    }

    pub fn call(&self, asserts: &mut Assertions) -> Result<Value, TestError> {
        (self.body)(asserts)
    }
}

impl fmt::Debug for FunctionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FunctionRef({})", self.label())
    }
}

/// Runtime value type
#[derive(Clone, Default)]
pub enum Value {
    /// Absent value (never assigned)
    #[default]
    Undefined,
    /// Explicit null
    Null,
    /// Boolean value
    Bool(bool),
    /// Numeric value (IEEE 754 double-precision)
    Number(f64),
    /// String value
    String(Arc<String>),
    /// Ordered sequence
    Array(ValueArray),
    /// String-keyed record
    Object(ValueMap),
    /// Callable
    Function(FunctionRef),
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(Arc::new(s.into()))
    }

    pub fn array(values: Vec<Value>) -> Self {
        Value::Array(ValueArray::from_vec(values))
    }

    /// Build an object from key/value pairs. Later duplicates win.
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let map = entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Value::Object(ValueMap::from_map(map))
    }

    /// Wrap a closure as a named callable.
    pub fn function<F>(name: &str, body: F) -> Self
    where
        F: Fn(&mut Assertions) -> Result<Value, TestError> + Send + Sync + 'static,
    {
        Value::Function(FunctionRef {
            name: Arc::from(name),
            body: Arc::new(body),
        })
    }

    /// Runtime type tag, following `typeof` conventions.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null | Value::Array(_) | Value::Object(_) => "object",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Function(_) => "function",
        }
    }

    /// Descriptive type name for messages; unlike `type_tag` it separates
    /// null and arrays from plain objects.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Array(_) => "array",
            other => other.type_tag(),
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_nan(&self) -> bool {
        matches!(self, Value::Number(n) if n.is_nan())
    }

    /// false, 0, NaN, "", null and undefined are falsy; everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) | Value::Function(_) => true,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ValueArray> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionRef> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Numeric coercion. Strings are trimmed; the empty string is 0 and
    /// anything unparsable is NaN.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Undefined => f64::NAN,
            Value::Null => 0.0,
            Value::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Number(n) => *n,
            Value::String(s) => parse_numeric(s),
            Value::Array(_) | Value::Object(_) | Value::Function(_) => {
                parse_numeric(&self.to_primitive_string())
            }
        }
    }

    /// String form used when a container is compared against a primitive:
    /// arrays join their elements with commas, objects collapse to a tag.
    fn to_primitive_string(&self) -> String {
        match self {
            Value::Undefined | Value::Null => String::new(),
            Value::Array(arr) => arr
                .iter()
                .map(|v| v.to_primitive_string())
                .collect::<Vec<_>>()
                .join(","),
            Value::Object(_) => "[object Object]".to_string(),
            Value::Function(f) => format!("function {}", f.label()),
            other => other.to_string(),
        }
    }

    /// Strict equality: same type and value. Containers and functions compare
    /// by identity; NaN is never equal to anything.
    pub fn strict_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a.same_ref(b),
            (Value::Object(a), Value::Object(b)) => a.same_ref(b),
            (Value::Function(a), Value::Function(b)) => Arc::ptr_eq(&a.body, &b.body),
            _ => false,
        }
    }

    /// Coercive equality over the primitive types.
    ///
    /// - same type: strict equality
    /// - null and undefined equal each other and nothing else
    /// - booleans become numbers, then comparison continues
    /// - number vs string: the string is coerced to a number
    /// - container vs primitive: the container is reduced to its string form
    pub fn loose_eq(&self, other: &Value) -> bool {
        if self.type_name() == other.type_name() {
            return self.strict_eq(other);
        }
        match (self, other) {
            (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => true,
            (Value::Undefined | Value::Null, _) | (_, Value::Undefined | Value::Null) => false,
            (Value::Bool(_), _) => Value::Number(self.to_number()).loose_eq(other),
            (_, Value::Bool(_)) => self.loose_eq(&Value::Number(other.to_number())),
            (Value::Number(n), Value::String(_)) => *n == other.to_number(),
            (Value::String(_), Value::Number(n)) => self.to_number() == *n,
            (Value::Array(_) | Value::Object(_) | Value::Function(_), Value::Number(_) | Value::String(_)) => {
                Value::string(self.to_primitive_string()).loose_eq(other)
            }
            (Value::Number(_) | Value::String(_), Value::Array(_) | Value::Object(_) | Value::Function(_)) => {
                self.loose_eq(&Value::string(other.to_primitive_string()))
            }
            _ => false,
        }
    }
}

fn parse_numeric(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        // Rust accepts "inf"/"nan" spellings that are not numeric literals here.
        t if t.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') => f64::NAN,
        t => t.parse::<f64>().unwrap_or(f64::NAN),
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Arc::new(s))
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::array(v)
    }
}

impl From<&Value> for Value {
    fn from(v: &Value) -> Self {
        v.clone()
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => {
                if n.is_nan() {
                    write!(f, "NaN")
                } else if n.is_infinite() {
                    write!(f, "{}Infinity", if *n < 0.0 { "-" } else { "" })
                } else if n.fract() == 0.0 && n.abs() < 1e21 {
                    write!(f, "{:.0}", n)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::String(s) => write!(f, "{}", s.as_ref()),
            Value::Array(arr) => {
                let items: Vec<String> = arr.iter().map(nested).collect();
                write!(f, "[{}]", items.join(", "))
            }
            Value::Object(map) => {
                let items: Vec<String> = map
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k, nested(v)))
                    .collect();
                write!(f, "{{{}}}", items.join(", "))
            }
            Value::Function(func) => write!(f, "<fn {}>", func.label()),
        }
    }
}

/// Strings nested inside containers are quoted so `["1"]` and `[1]` render differently.
fn nested(v: &Value) -> String {
    match v {
        Value::String(s) => format!("{:?}", s.as_str()),
        other => other.to_string(),
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "Undefined"),
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Number(n) => write!(f, "Number({})", n),
            Value::String(s) => write!(f, "String({:?})", s),
            Value::Array(arr) => write!(f, "Array({:?})", arr.as_slice()),
            Value::Object(map) => write!(f, "Object({:?})", map.0),
            Value::Function(func) => write!(f, "{:?}", func),
        }
    }
}

/// Structural equality for Rust-side comparisons (tests, snapshots).
/// Containers compare by content; functions by identity. NaN equals NaN here so
/// that a failure carrying NaN can be compared against its expectation.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Array(a), Value::Array(b)) => a.as_slice() == b.as_slice(),
            (Value::Object(a), Value::Object(b)) => a.0 == b.0,
            _ => self.strict_eq(other),
        }
    }
}

//! Policy Conditions
//!
//! The Condition element of a statement restricts when the statement applies. It is built
//! from condition operators (equals, less than, ...) that compare a condition key, an attribute
//! of the incoming request, against one or more values.
//!
//! ```text
//! "Condition": {
//!     "IpAddress": {
//!         "AWS:SourceIp": ["192.168.0.0/16", "10.0.0.0/8"]
//!     },
//!     "DateLessThan": {
//!         "AWS:CurrentTime": "2010-01-01T12:00:00Z"
//!     }
//! }
//! ```
//!
//! The keys available across all services are listed in [`KEYS`]. Operators are grouped in
//! families: string, numeric, date, boolean and ip address.

use crate::{AplError, Result};
use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Condition keys available across all services
pub const KEYS: &[&str] = &[
    "AWS:CurrentTime",
    "AWS:SecureTransport",
    "AWS:SourceIp",
    "AWS:UserAgent",
];

/// String comparison operators
pub const STRING_CONDITIONS: &[&str] = &[
    "StringEquals",
    "StringNotEquals",
    "StringEqualsIgnoreCase",
    "StringNotEqualsIgnoreCase",
    "StringLike",
    "StringNotLike",
];

/// Numeric comparison operators
pub const NUMERIC_CONDITIONS: &[&str] = &[
    "NumericEquals",
    "NumericNotEquals",
    "NumericLessThan",
    "NumericLessThanEquals",
    "NumericGreaterThan",
    "NumericGreaterThanEquals",
];

/// Date comparison operators
pub const DATE_CONDITIONS: &[&str] = &[
    "DateEquals",
    "DateNotEquals",
    "DateLessThan",
    "DateLessThanEquals",
    "DateGreaterThan",
    "DateGreaterThanEquals",
];

/// Boolean operators
pub const BOOLEAN_CONDITIONS: &[&str] = &["Bool"];

/// IP address operators
pub const IP_ADDRESS_CONDITIONS: &[&str] = &["IpAddress", "NotIpAddress"];

/// Check whether `key` is a recognized condition key
pub fn is_valid_key(key: &str) -> bool {
    KEYS.contains(&key)
}

/// The family an operator belongs to
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum OperatorFamily {
    /// String comparisons
    String,
    /// Integer or decimal comparisons
    Numeric,
    /// Date/time comparisons
    Date,
    /// `true`/`false` comparison
    Boolean,
    /// IP address or CIDR range matching
    IpAddress,
}

// Declares the Operator enum along with its name table. Variant names are the serialized names.
macro_rules! operators {
    ( $( $(#[$doc:meta])* $variant:ident => $family:ident ),* $(,)? ) => {
        /// A condition operator
        #[derive(Serialize, Deserialize, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Copy, Clone)]
        pub enum Operator {
            $( $(#[$doc])* $variant, )*
        }

        impl Operator {
            /// Every operator name, grouped by family
            pub const NAMES: &'static [&'static str] = &[ $( stringify!($variant), )* ];

            /// The serialized name of the operator
            pub fn as_str(&self) -> &'static str {
                match *self {
                    $( Operator::$variant => stringify!($variant), )*
                }
            }

            /// The family this operator belongs to
            pub fn family(&self) -> OperatorFamily {
                match *self {
                    $( Operator::$variant => OperatorFamily::$family, )*
                }
            }
        }

        impl FromStr for Operator {
            type Err = AplError;

            fn from_str(s: &str) -> Result<Operator> {
                match s {
                    $( stringify!($variant) => Ok(Operator::$variant), )*
                    _ => Err(AplError::invalid_value("Condition operator", s, Operator::NAMES)),
                }
            }
        }
    };
}

operators! {
    /// Exact match, case sensitive
    StringEquals => String,
    /// Negated exact match
    StringNotEquals => String,
    /// Exact match, ignoring case
    StringEqualsIgnoreCase => String,
    /// Negated exact match, ignoring case
    StringNotEqualsIgnoreCase => String,
    /// Case sensitive match with `*` and `?` wildcards
    StringLike => String,
    /// Negated wildcard match
    StringNotLike => String,
    /// Numeric equality
    NumericEquals => Numeric,
    /// Numeric inequality
    NumericNotEquals => Numeric,
    /// Numeric "less than"
    NumericLessThan => Numeric,
    /// Numeric "less than or equals"
    NumericLessThanEquals => Numeric,
    /// Numeric "greater than"
    NumericGreaterThan => Numeric,
    /// Numeric "greater than or equals"
    NumericGreaterThanEquals => Numeric,
    /// Date equality
    DateEquals => Date,
    /// Date inequality
    DateNotEquals => Date,
    /// Earlier than the given date
    DateLessThan => Date,
    /// At or earlier than the given date
    DateLessThanEquals => Date,
    /// Later than the given date
    DateGreaterThan => Date,
    /// At or later than the given date
    DateGreaterThanEquals => Date,
    /// Boolean match
    Bool => Boolean,
    /// Matches the IP address or range
    IpAddress => IpAddress,
    /// Matches all IP addresses except the address or range
    NotIpAddress => IpAddress,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Type `ScalarOrSeq` holds either a single value or a vector of values.
// Used internally to deserialize either JSON type easily (via untagged). Seq is listed first
// so an array is never swallowed whole as a single Value.
#[derive(Deserialize, Debug, PartialEq, Clone)]
#[serde(untagged)]
enum ScalarOrSeq {
    Seq(Vec<Value>),
    Scalar(Value),
}

// Condition Body
//
// The keys compared by a single operator, each mapped to one or more values.
//
// {
//     "StringEquals":                      <-- operator
//     {                                    <-- body start
//         "key1": "value1",
//         "key2": ["value2", "value3"]
//     }                                    <-- body end
// }
#[derive(Debug, PartialEq, Clone, Default)]
struct Body(BTreeMap<String, Vec<Value>>);

impl Body {
    // Values for an existing key are appended to its list of acceptable values
    fn insert<I>(&mut self, k: String, values: I)
    where
        I: IntoIterator<Item = Value>,
    {
        self.0.entry(k).or_insert_with(Vec::new).extend(values);
    }
}

impl Serialize for Body {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in self.0.iter() {
            // a lone array value stays wrapped, otherwise it would read back as several values
            if v.len() == 1 && !v[0].is_array() {
                map.serialize_entry(&k, &v[0])?;
            } else {
                map.serialize_entry(&k, &v)?;
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Body {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // deserialize through ScalarOrSeq which handles both cases then map to our target type
        let v = BTreeMap::<String, ScalarOrSeq>::deserialize(deserializer)?;
        let body = v
            .into_iter()
            .map(|(k, v)| match v {
                ScalarOrSeq::Scalar(sc) => (k, vec![sc]),
                ScalarOrSeq::Seq(seq) => (k, seq),
            })
            .collect();
        Ok(Body(body))
    }
}

/// ConditionBlock holds every condition of a statement, grouped by operator
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
pub struct ConditionBlock(BTreeMap<Operator, Body>);

impl ConditionBlock {
    /// Create an empty condition block
    pub fn new() -> Self {
        ConditionBlock(BTreeMap::new())
    }

    /// Add values for `key` under `operator`. If the key is already present for that
    /// operator the values are appended to the ones already allowed. An empty `values`
    /// records the key with no values, written as `"key": []`.
    pub fn insert<K, I, V>(&mut self, operator: Operator, key: K, values: I)
    where
        K: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.0
            .entry(operator)
            .or_insert_with(Body::default)
            .insert(key.into(), values.into_iter().map(Into::into));
    }

    /// The values recorded for `key` under `operator`
    pub fn get(&self, operator: Operator, key: &str) -> Option<&[Value]> {
        self.0
            .get(&operator)
            .and_then(|body| body.0.get(key))
            .map(|v| v.as_slice())
    }

    /// The operators present in this block
    pub fn operators(&self) -> impl Iterator<Item = Operator> + '_ {
        self.0.keys().copied()
    }

    /// True if no condition has been added
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

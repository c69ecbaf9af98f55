//! Value Operators
//!
//! Per-type conversions between shell tokens and typed values. Each type
//! knows how to parse itself out of a token run (`from_tokens`) and how to
//! write itself back (`to_tokens`), so transformers and wrappers can rewrite
//! the tape in the transformed form.
//!
//! Integers and floats accept `_` grouping, but only when the whole token
//! matches the grouped shape; anything else goes to the stdlib parser
//! unchanged so its error text is preserved verbatim.

use lazy_static::lazy_static;
use regex_lite::Regex;

use crate::error::CmdError;
use crate::value::types::Value;

lazy_static! {
    static ref INT_GROUPED: Regex = Regex::new(r"^-?[0-9](_?[0-9])*$").unwrap();
    static ref FLOAT_GROUPED: Regex =
        Regex::new(r"^-?[0-9](_?[0-9])*(\.[0-9](_?[0-9])*)?$").unwrap();
}

/// A token-run parse failure, carrying which token failed so the tape can
/// be repositioned at it.
#[derive(Debug)]
pub struct ParseFailure {
    pub index: usize,
    pub error: CmdError,
}

impl ParseFailure {
    fn at(index: usize, error: CmdError) -> Self {
        Self { index, error }
    }
}

/// A type usable as an argument or flag value.
pub trait ArgValue: Clone + Sized + Send + Sync + 'static {
    fn type_name() -> &'static str;
    fn from_tokens(tokens: &[String]) -> Result<Self, ParseFailure>;
    fn to_tokens(&self) -> Vec<String>;
    fn into_value(self) -> Value;
    fn from_value(value: &Value) -> Option<Self>;
}

fn parse_int(token: &str) -> Result<i64, CmdError> {
    let cleaned;
    let digits = if INT_GROUPED.is_match(token) {
        cleaned = token.replace('_', "");
        cleaned.as_str()
    } else {
        token
    };
    digits.parse::<i64>().map_err(|e| CmdError::Parse {
        token: token.to_string(),
        message: e.to_string(),
    })
}

fn parse_float(token: &str) -> Result<f64, CmdError> {
    let cleaned;
    let digits = if FLOAT_GROUPED.is_match(token) {
        cleaned = token.replace('_', "");
        cleaned.as_str()
    } else {
        token
    };
    digits.parse::<f64>().map_err(|e| CmdError::Parse {
        token: token.to_string(),
        message: e.to_string(),
    })
}

fn parse_bool(token: &str) -> Result<bool, CmdError> {
    match token {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        _ => Err(CmdError::Parse {
            token: token.to_string(),
            message: "invalid boolean value".to_string(),
        }),
    }
}

fn single(tokens: &[String]) -> Result<&str, ParseFailure> {
    match tokens.first() {
        Some(t) if tokens.len() == 1 => Ok(t),
        _ => Err(ParseFailure::at(
            0,
            CmdError::Parse {
                token: tokens.join(" "),
                message: "expected exactly one token".to_string(),
            },
        )),
    }
}

impl ArgValue for String {
    fn type_name() -> &'static str {
        "string"
    }

    fn from_tokens(tokens: &[String]) -> Result<Self, ParseFailure> {
        single(tokens).map(|t| t.to_string())
    }

    fn to_tokens(&self) -> Vec<String> {
        vec![self.clone()]
    }

    fn into_value(self) -> Value {
        Value::String(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl ArgValue for i64 {
    fn type_name() -> &'static str {
        "int"
    }

    fn from_tokens(tokens: &[String]) -> Result<Self, ParseFailure> {
        let token = single(tokens)?;
        parse_int(token).map_err(|e| ParseFailure::at(0, e))
    }

    fn to_tokens(&self) -> Vec<String> {
        vec![self.to_string()]
    }

    fn into_value(self) -> Value {
        Value::Int(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl ArgValue for f64 {
    fn type_name() -> &'static str {
        "float"
    }

    fn from_tokens(tokens: &[String]) -> Result<Self, ParseFailure> {
        let token = single(tokens)?;
        parse_float(token).map_err(|e| ParseFailure::at(0, e))
    }

    fn to_tokens(&self) -> Vec<String> {
        vec![self.to_string()]
    }

    fn into_value(self) -> Value {
        Value::Float(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl ArgValue for bool {
    fn type_name() -> &'static str {
        "bool"
    }

    fn from_tokens(tokens: &[String]) -> Result<Self, ParseFailure> {
        let token = single(tokens)?;
        parse_bool(token).map_err(|e| ParseFailure::at(0, e))
    }

    fn to_tokens(&self) -> Vec<String> {
        vec![self.to_string()]
    }

    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl ArgValue for Vec<String> {
    fn type_name() -> &'static str {
        "string list"
    }

    fn from_tokens(tokens: &[String]) -> Result<Self, ParseFailure> {
        Ok(tokens.to_vec())
    }

    fn to_tokens(&self) -> Vec<String> {
        self.clone()
    }

    fn into_value(self) -> Value {
        Value::StringList(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::StringList(l) => Some(l.clone()),
            _ => None,
        }
    }
}

impl ArgValue for Vec<i64> {
    fn type_name() -> &'static str {
        "int list"
    }

    fn from_tokens(tokens: &[String]) -> Result<Self, ParseFailure> {
        tokens
            .iter()
            .enumerate()
            .map(|(i, t)| parse_int(t).map_err(|e| ParseFailure::at(i, e)))
            .collect()
    }

    fn to_tokens(&self) -> Vec<String> {
        self.iter().map(|i| i.to_string()).collect()
    }

    fn into_value(self) -> Value {
        Value::IntList(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::IntList(l) => Some(l.clone()),
            _ => None,
        }
    }
}

impl ArgValue for Vec<f64> {
    fn type_name() -> &'static str {
        "float list"
    }

    fn from_tokens(tokens: &[String]) -> Result<Self, ParseFailure> {
        tokens
            .iter()
            .enumerate()
            .map(|(i, t)| parse_float(t).map_err(|e| ParseFailure::at(i, e)))
            .collect()
    }

    fn to_tokens(&self) -> Vec<String> {
        self.iter().map(|f| f.to_string()).collect()
    }

    fn into_value(self) -> Value {
        Value::FloatList(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::FloatList(l) => Some(l.clone()),
            _ => None,
        }
    }
}

//! Stock Validators
//!
//! Constructors for the common validation predicates. The kind string of
//! each validator appears in its failure message.

use regex_lite::Regex;

use crate::args::argument::Validator;

pub fn non_empty() -> Validator<String> {
    Validator::new("NonEmpty", |v: &String| {
        if v.is_empty() {
            Err("value must not be empty".to_string())
        } else {
            Ok(())
        }
    })
}

pub fn min_length(n: usize) -> Validator<String> {
    Validator::new("MinLength", move |v: &String| {
        if v.chars().count() < n {
            Err(format!("value must be at least {n} characters"))
        } else {
            Ok(())
        }
    })
}

pub fn matches_regex(pattern: &str) -> Validator<String> {
    let re = Regex::new(pattern).expect("validator regex must compile");
    let pattern = pattern.to_string();
    Validator::new("MatchesRegex", move |v: &String| {
        if re.is_match(v) {
            Ok(())
        } else {
            Err(format!("value does not match {pattern}"))
        }
    })
}

pub fn int_eq(n: i64) -> Validator<i64> {
    Validator::new("IntEq", move |v: &i64| {
        if *v == n {
            Ok(())
        } else {
            Err(format!("value must equal {n}"))
        }
    })
}

pub fn int_ne(n: i64) -> Validator<i64> {
    Validator::new("IntNe", move |v: &i64| {
        if *v != n {
            Ok(())
        } else {
            Err(format!("value must not equal {n}"))
        }
    })
}

pub fn int_positive() -> Validator<i64> {
    Validator::new("IntPositive", |v: &i64| {
        if *v > 0 {
            Ok(())
        } else {
            Err("value must be positive".to_string())
        }
    })
}

pub fn int_non_negative() -> Validator<i64> {
    Validator::new("IntNonNegative", |v: &i64| {
        if *v >= 0 {
            Ok(())
        } else {
            Err("value must not be negative".to_string())
        }
    })
}

pub fn int_between(lo: i64, hi: i64) -> Validator<i64> {
    Validator::new("IntBetween", move |v: &i64| {
        if (lo..=hi).contains(v) {
            Ok(())
        } else {
            Err(format!("value must be between {lo} and {hi}"))
        }
    })
}

pub fn float_positive() -> Validator<f64> {
    Validator::new("FloatPositive", |v: &f64| {
        if *v > 0.0 {
            Ok(())
        } else {
            Err("value must be positive".to_string())
        }
    })
}

pub fn float_between(lo: f64, hi: f64) -> Validator<f64> {
    Validator::new("FloatBetween", move |v: &f64| {
        if *v >= lo && *v <= hi {
            Ok(())
        } else {
            Err(format!("value must be between {lo} and {hi}"))
        }
    })
}

pub fn list_len_between(lo: usize, hi: usize) -> Validator<Vec<String>> {
    Validator::new("ListLenBetween", move |v: &Vec<String>| {
        if (lo..=hi).contains(&v.len()) {
            Ok(())
        } else {
            Err(format!("list must have between {lo} and {hi} elements"))
        }
    })
}

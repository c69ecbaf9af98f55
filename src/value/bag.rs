//! Data Bag
//!
//! Name-to-value map shared across processors for one invocation. Writes
//! are last-write-wins. Typed getters assert on the declared type: asking
//! for the wrong type is a programming error in the graph, not user input,
//! so it panics with the tag mismatch.

use indexmap::IndexMap;

use crate::value::types::Value;

#[derive(Debug, Default, Clone)]
pub struct DataBag {
    values: IndexMap<String, Value>,
}

macro_rules! typed_getter {
    ($fn_name:ident, $variant:ident, $ret:ty, $expected:literal) => {
        pub fn $fn_name(&self, name: &str) -> Option<$ret> {
            match self.values.get(name) {
                None => None,
                Some(Value::$variant(v)) => Some(v.clone()),
                Some(other) => panic!(
                    "data entry \"{}\" is {}, not {}",
                    name,
                    other.type_name(),
                    $expected
                ),
            }
        }
    };
}

impl DataBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub fn has(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    typed_getter!(string, String, String, "string");
    typed_getter!(int, Int, i64, "int");
    typed_getter!(float, Float, f64, "float");
    typed_getter!(boolean, Bool, bool, "bool");
    typed_getter!(string_list, StringList, Vec<String>, "string list");
    typed_getter!(int_list, IntList, Vec<i64>, "int list");
    typed_getter!(float_list, FloatList, Vec<f64>, "float list");
    typed_getter!(string_list_list, StringListList, Vec<Vec<String>>, "string list list");
}

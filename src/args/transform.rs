//! Stock Transformers
//!
//! Constructors for common value rewrites. Transformers run after parsing
//! and before validation, and each success rewrites the consumed tokens on
//! the tape so wrappers capture the transformed form.

use std::sync::Arc;

use crate::args::argument::Transformer;
use crate::fsys::FileSystem;

pub fn to_upper() -> Transformer<String> {
    Transformer::new(|v: String, _| Ok(v.to_uppercase()))
}

pub fn to_lower() -> Transformer<String> {
    Transformer::new(|v: String, _| Ok(v.to_lowercase()))
}

pub fn trim() -> Transformer<String> {
    Transformer::new(|v: String, _| Ok(v.trim().to_string()))
}

/// Resolve the value to an absolute path through the filesystem seam.
/// Runs in complete mode too, so path completers see resolved prefixes.
pub fn abs_path(fsys: Arc<dyn FileSystem>) -> Transformer<String> {
    Transformer::new(move |v: String, _| fsys.abs_path(&v).map_err(|e| e.to_string()))
        .for_complete()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::Arg;
    use crate::fsys::MemFs;
    use crate::graph::Processor;
    use crate::input::InputTape;
    use crate::output::{OutputSink, ScriptBuffer};
    use crate::value::DataBag;

    fn run(arg: &Arg<String>, token: &str, data: &mut DataBag) {
        let mut input = InputTape::new(&[token.to_string()]);
        let mut out = OutputSink::new();
        let mut script = ScriptBuffer::new();
        arg.execute(&mut input, data, &mut out, &mut script).unwrap();
    }

    #[test]
    fn test_case_transformers() {
        let mut data = DataBag::new();
        run(&Arg::<String>::new("u").transform(to_upper()), "hi", &mut data);
        run(&Arg::<String>::new("l").transform(to_lower()), "HI", &mut data);
        assert_eq!(data.string("u"), Some("HI".to_string()));
        assert_eq!(data.string("l"), Some("hi".to_string()));
    }

    #[test]
    fn test_trim() {
        let mut data = DataBag::new();
        run(&Arg::<String>::new("t").transform(trim()), "  x  ", &mut data);
        assert_eq!(data.string("t"), Some("x".to_string()));
    }

    #[test]
    fn test_abs_path() {
        let mut data = DataBag::new();
        let arg = Arg::<String>::new("p").transform(abs_path(Arc::new(MemFs::new())));
        run(&arg, "some/dir", &mut data);
        assert_eq!(data.string("p"), Some("/some/dir".to_string()));
    }
}

//! jq pre-filter for example documents, backed by jaq.
//!
//! A filter may emit any number of outputs per input; each one is an
//! example document of its own.
use anyhow::{anyhow, Context, Result};
use jaq_core::{load, Compiler, Ctx, RcIter};
use jaq_json::Val;
use serde_json::Value;

pub fn run_jaq(filter_src: &str, input: &Value) -> Result<Vec<Value>> {
    let arena = load::Arena::default();
    let modules = load::Loader::new(jaq_std::defs().chain(jaq_json::defs()))
        .load(&arena, load::File { code: filter_src, path: () })
        .map_err(|errs| {
            let reasons: Vec<String> = errs.iter().map(|(_, err)| format!("{err:?}")).collect();
            anyhow!("cannot parse jq filter `{filter_src}`: {}", reasons.join("; "))
        })?;
    let filter = Compiler::default()
        .with_funs(jaq_std::funs().chain(jaq_json::funs()))
        .compile(modules)
        .map_err(|errs| {
            let names: Vec<&str> = errs
                .iter()
                .flat_map(|(_, undefined)| undefined.iter().map(|(name, _)| *name))
                .collect();
            anyhow!("jq filter `{filter_src}` uses undefined {}", names.join(", "))
        })?;

    let no_inputs = RcIter::new(core::iter::empty());
    let outputs = filter.run((Ctx::new([], &no_inputs), Val::from(input.clone())));
    outputs
        .enumerate()
        .map(|(ix, output)| -> Result<Value> {
            let output = output.map_err(|err| anyhow!("jq output #{ix}: {err:?}"))?;
            serde_json::from_str(&output.to_string())
                .with_context(|| format!("jq output #{ix} is not a JSON value"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn outputs_parse_back_into_values() {
        let out = run_jaq("{id: .a}, .b", &json!({"a": 1, "b": [true]})).unwrap();
        assert_eq!(out, vec![json!({"id": 1}), json!([true])]);
    }

    #[test]
    fn empty_output_means_no_documents() {
        assert_eq!(run_jaq("empty", &json!({"a": 1})).unwrap(), Vec::<Value>::new());
    }

    #[test]
    fn syntax_errors_are_reported() {
        let err = run_jaq(".[", &json!(null)).unwrap_err();
        assert!(err.to_string().starts_with("cannot parse jq filter"));
    }

    #[test]
    fn undefined_functions_are_named() {
        let err = run_jaq("nosuchfn", &json!(null)).unwrap_err();
        assert!(err.to_string().contains("nosuchfn"), "{err}");
    }
}

//! Canonical definition names derived from an example's runtime type.
use crate::example::Example;

pub trait ModelNamer: Send + Sync {
    fn name(&self, value: &dyn Example) -> String;
}

impl<F> ModelNamer for F
where
    F: Fn(&dyn Example) -> String + Send + Sync,
{
    fn name(&self, value: &dyn Example) -> String {
        self(value)
    }
}

/// Bare type name: `my_app::dto::MeasureDto` → `MeasureDto`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Simple;

impl ModelNamer for Simple {
    fn name(&self, value: &dyn Example) -> String {
        simple_name(value.naming_path()).to_owned()
    }
}

/// Module-qualified name with `::` folded to `_`: `dto_MeasureDto`.
/// Useful when two modules declare types with the same name.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullPath;

impl ModelNamer for FullPath {
    fn name(&self, value: &dyn Example) -> String {
        let path = strip_generics(value.naming_path());
        let mut segments: Vec<&str> = path.split("::").collect();
        // drop the crate segment
        if segments.len() > 1 {
            segments.remove(0);
        }
        segments.join("_")
    }
}

/// Last path segment of a type path, without generic arguments.
pub fn simple_name(type_path: &str) -> &str {
    let path = strip_generics(type_path);
    path.rsplit("::").next().unwrap_or(path)
}

fn strip_generics(type_path: &str) -> &str {
    match type_path.find('<') {
        Some(i) => &type_path[..i],
        None => type_path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::example::Shape;
    use std::collections::HashMap;

    #[derive(serde::Serialize)]
    struct Local;

    impl Example for Local {
        fn shape(&self) -> Shape<'_> { Shape::Record(Vec::new()) }
    }

    #[test]
    fn simple_name_strips_path_and_generics() {
        assert_eq!(simple_name("my_app::dto::MeasureDto"), "MeasureDto");
        assert_eq!(simple_name("std::collections::hash::map::HashMap<alloc::string::String, f64>"), "HashMap");
        assert_eq!(simple_name("Local"), "Local");
    }

    #[test]
    fn namers_apply_to_runtime_values() {
        let map: HashMap<String, f64> = HashMap::new();
        assert_eq!(Simple.name(&map), "HashMap");
        assert_eq!(FullPath.name(&Local), "namer_tests_Local");
        assert_eq!(Simple.name(&Some(Local)), "Local");

        let custom = |_: &dyn Example| "Fixed".to_owned();
        assert_eq!(custom.name(&map), "Fixed");
    }
}

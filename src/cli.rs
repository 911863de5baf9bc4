//! Minimal CLI: JSON example documents → schema + definitions
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use serde_json::Value;

use example_schema::{JsonSchema, SchemaConfig, SchemaGenerator};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// derive JSON Schema documents from example JSON values
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// derive one schema per example document
    Schema(SchemaOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat input as newline-delimited JSON (NDJSON)
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// JSON Pointer to select a subnode in each document (e.g. /data/items/0/payload)
    #[arg(long)]
    json_pointer: Option<String>,

    /// JQ pre-process filter for each document.
    #[arg(long)]
    jq_expr: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct SchemaOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// top-level definition name (defaults to the example's type name)
    #[arg(long)]
    name: Option<String>,

    /// prefix for every definition name
    #[arg(long)]
    prefix: Option<String>,

    /// generator settings (.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    /// Every example document across all inputs, after pointer and jq selection.
    fn load_documents(&self) -> Result<Vec<Value>> {
        let source_paths = resolve_file_path_patterns(&self.input)?;
        let mut documents = Vec::new();
        for source_path in source_paths {
            let source = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read source file {}", source_path.display()))?;
            for json_value in parse_source(&source, self.ndjson, &source_path)? {
                documents.extend(self.select(json_value, &source_path)?);
            }
        }
        Ok(documents)
    }

    fn select(&self, json_value: Value, source_path: &Path) -> Result<Vec<Value>> {
        let json_value = match self.json_pointer.as_deref() {
            None => json_value,
            Some(pointer) => match json_value.pointer(pointer) {
                Some(found) => found.clone(),
                None => {
                    let path = source_path.display();
                    tracing::warn!(pointer, %path, "pointer matched nothing");
                    return Ok(Vec::new());
                }
            },
        };
        match self.jq_expr.as_deref() {
            None => Ok(vec![json_value]),
            Some(jq_expr) => {
                crate::jq_exec::run_jaq(jq_expr, &json_value).with_context(|| {
                    format!("failed to apply jq expression to {}", source_path.display())
                })
            }
        }
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Schema(target) => target.run(),
        }
    }
}

impl SchemaOut {
    fn run(&self) -> Result<()> {
        let config = match self.config.as_ref() {
            Some(path) => {
                let src = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config file {}", path.display()))?;
                SchemaConfig::from_json_str(&src)
                    .with_context(|| format!("in config file {}", path.display()))?
            }
            None => SchemaConfig::default(),
        };
        let generator = SchemaGenerator::new(config);
        let documents = self.input_settings.load_documents()?;
        if documents.is_empty() {
            bail!("no example documents found");
        }
        tracing::info!(documents = documents.len(), "deriving schemas");

        let schemas = documents
            .par_iter()
            .enumerate()
            .map(|(ix, doc)| {
                generator
                    .to_schema(doc, self.name.as_deref(), self.prefix.as_deref())
                    .with_context(|| format!("example document #{ix}"))
            })
            .collect::<Result<Vec<JsonSchema>>>()?;

        let schema_src = match schemas.as_slice() {
            [single] => serde_json::to_string_pretty(single)?,
            many => serde_json::to_string_pretty(many)?,
        };
        if let Some(out) = self.out.as_ref() {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(out, &schema_src)
                .with_context(|| format!("failed to write {}", out.display()))?;
        } else {
            println!("{schema_src}");
        }
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn parse_source(source: &str, ndjson: bool, source_path: &Path) -> Result<Vec<Value>> {
    let parse = |text: &str| {
        serde_json::from_str::<Value>(text)
            .with_context(|| format!("failed to parse JSON source file {}", source_path.display()))
    };
    if !ndjson {
        return Ok(vec![parse(source)?]);
    }
    source
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse)
        .collect()
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{' ))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ndjson_skips_blank_lines() {
        let docs = parse_source("{\"a\":1}\n\n[2]\n", true, Path::new("x.ndjson")).unwrap();
        assert_eq!(docs, vec![serde_json::json!({"a": 1}), serde_json::json!([2])]);
    }

    #[test]
    fn literal_paths_pass_through() {
        let paths = resolve_file_path_patterns(["a.json", "b.json"]).unwrap();
        assert_eq!(paths, vec![PathBuf::from("a.json"), PathBuf::from("b.json")]);
    }

    #[test]
    fn pointer_selects_a_subdocument() {
        let settings = InputSettings {
            ndjson: false,
            json_pointer: Some("/data/0".into()),
            jq_expr: None,
            input: Vec::new(),
        };
        let doc = serde_json::json!({"data": [{"id": 1}]});
        let selected = settings.select(doc, Path::new("x.json")).unwrap();
        assert_eq!(selected, vec![serde_json::json!({"id": 1})]);
    }

    #[test]
    fn jq_filters_expand_documents() {
        let settings = InputSettings {
            ndjson: false,
            json_pointer: None,
            jq_expr: Some(".items[]".into()),
            input: Vec::new(),
        };
        let doc = serde_json::json!({"items": [1, 2]});
        let selected = settings.select(doc, Path::new("x.json")).unwrap();
        assert_eq!(selected, vec![serde_json::json!(1), serde_json::json!(2)]);
    }
}

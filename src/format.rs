//! File format parsers and output rendering.
//!
//! Input formats are selected by file extension through a [`FormatRegistry`].
//! JSON, YAML and TOML are registered out of the box; more can be added by
//! registering an extension with a parse function.

use crate::error::BoxError;
use crate::tree::ConfigTree;
use serde_json::Value;
use std::path::Path;

/// Parse file content into a tree.
pub type ParseFn = fn(&str) -> Result<ConfigTree, BoxError>;

pub fn parse_json(content: &str) -> Result<ConfigTree, BoxError> {
    Ok(serde_json::from_str(content)?)
}

pub fn parse_yaml(content: &str) -> Result<ConfigTree, BoxError> {
    Ok(serde_yaml::from_str(content)?)
}

pub fn parse_toml(content: &str) -> Result<ConfigTree, BoxError> {
    Ok(toml::from_str(content)?)
}

/// Extension → parser table. Lookups ignore extension case.
#[derive(Debug, Clone)]
pub struct FormatRegistry {
    formats: Vec<(String, ParseFn)>,
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::empty()
            .with("json", parse_json)
            .with("yaml", parse_yaml)
            .with("yml", parse_yaml)
            .with("toml", parse_toml)
    }
}

impl FormatRegistry {
    /// A registry with no formats.
    pub fn empty() -> Self {
        Self {
            formats: Vec::new(),
        }
    }

    /// Register (or replace) the parser for `extension`.
    pub fn with(mut self, extension: &str, parser: ParseFn) -> Self {
        self.register(extension, parser);
        self
    }

    pub fn register(&mut self, extension: &str, parser: ParseFn) {
        let extension = extension.trim_start_matches('.').to_ascii_lowercase();
        match self.formats.iter_mut().find(|(ext, _)| *ext == extension) {
            Some(entry) => entry.1 = parser,
            None => self.formats.push((extension, parser)),
        }
    }

    pub fn get(&self, extension: &str) -> Option<ParseFn> {
        self.formats
            .iter()
            .find(|(ext, _)| ext.eq_ignore_ascii_case(extension))
            .map(|(_, parser)| *parser)
    }

    /// Registered extensions in registration order.
    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.formats.iter().map(|(ext, _)| ext.as_str())
    }

    /// Parse `content` read from `path`.
    ///
    /// Blank content is an empty tree. A known extension selects its parser;
    /// otherwise every registered parser is tried in order and the first one
    /// that yields a mapping wins.
    pub fn parse(&self, path: &Path, content: &str) -> Result<ConfigTree, BoxError> {
        if content.trim().is_empty() {
            return Ok(Value::Null);
        }
        if let Some(parser) = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.get(ext))
        {
            return parser(content);
        }

        let mut tried = Vec::new();
        let mut seen: Vec<ParseFn> = Vec::new();
        for (ext, parser) in &self.formats {
            if seen.iter().any(|p| std::ptr::fn_addr_eq(*p, *parser)) {
                continue;
            }
            seen.push(*parser);
            match parser(content) {
                Ok(tree @ Value::Object(_)) => return Ok(tree),
                Ok(_) => tried.push(format!("{ext}: not a mapping")),
                Err(e) => tried.push(format!("{ext}: {e}")),
            }
        }
        Err(format!("unrecognized configuration format ({})", tried.join("; ")).into())
    }
}

/// Output format for rendered trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            _ => Err(format!("Invalid format '{}'. Valid options: json, yaml", s)),
        }
    }
}

impl OutputFormat {
    /// Render a tree in this format.
    pub fn render(self, tree: &ConfigTree) -> Result<String, BoxError> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(tree)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(tree)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_by_extension() {
        let registry = FormatRegistry::default();
        let yaml = registry
            .parse(Path::new("app.YML"), "db:\n  port: 3306\n")
            .unwrap();
        assert_eq!(yaml, json!({"db": {"port": 3306}}));

        let json = registry
            .parse(Path::new("app.json"), r#"{"db": {"port": 3306}}"#)
            .unwrap();
        assert_eq!(json, yaml);

        let toml = registry
            .parse(Path::new("app.toml"), "[db]\nport = 3306\n")
            .unwrap();
        assert_eq!(toml, yaml);
    }

    #[test]
    fn test_malformed_content_is_an_error() {
        let registry = FormatRegistry::default();
        assert!(registry.parse(Path::new("app.json"), "{not json").is_err());
        assert!(registry.parse(Path::new("app.yaml"), "a: [1, 2").is_err());
    }

    #[test]
    fn test_unknown_extension_tries_each_parser() {
        let registry = FormatRegistry::default();
        let from_json = registry
            .parse(Path::new("/tmp/configor123"), r#"{"app_name": "x"}"#)
            .unwrap();
        assert_eq!(from_json, json!({"app_name": "x"}));

        let from_toml = registry
            .parse(Path::new("settings.conf"), "app_name = \"x\"\n")
            .unwrap();
        assert_eq!(from_toml, json!({"app_name": "x"}));

        assert!(registry.parse(Path::new("notes.txt"), "just words").is_err());
    }

    #[test]
    fn test_blank_content_is_empty_tree() {
        let registry = FormatRegistry::default();
        assert_eq!(registry.parse(Path::new("app.json"), "  \n").unwrap(), Value::Null);
    }

    #[test]
    fn test_register_custom_format() {
        fn parse_kv(content: &str) -> Result<ConfigTree, BoxError> {
            let mut map = serde_json::Map::new();
            for line in content.lines() {
                let (k, v) = line.split_once('=').ok_or("expected key=value")?;
                map.insert(k.trim().to_string(), Value::String(v.trim().to_string()));
            }
            Ok(Value::Object(map))
        }

        let registry = FormatRegistry::default().with(".KV", parse_kv);
        assert!(registry.extensions().any(|ext| ext == "kv"));
        let tree = registry.parse(Path::new("app.kv"), "name = x\n").unwrap();
        assert_eq!(tree, json!({"name": "x"}));
    }

    #[test]
    fn test_output_format() {
        assert_eq!("YAML".parse::<OutputFormat>(), Ok(OutputFormat::Yaml));
        assert!("md".parse::<OutputFormat>().is_err());
        let rendered = OutputFormat::Json.render(&json!({"a": 1})).unwrap();
        assert_eq!(rendered, "{\n  \"a\": 1\n}");
    }
}

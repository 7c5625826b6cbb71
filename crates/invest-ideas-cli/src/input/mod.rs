pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Resolve a command's input: `--input` file first, then piped stdin.
/// `None` means the caller should build the input from flags.
pub fn read_input<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return Ok(Some(file::read_document(path)?));
    }
    stdin::read_stdin()
}

/// Scenario document encodings accepted on every input channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    /// Deserialize `text`; `source` names the file or stream in errors.
    pub fn parse<T: DeserializeOwned>(
        self,
        text: &str,
        source: &str,
    ) -> Result<T, Box<dyn std::error::Error>> {
        let parsed = match self {
            Format::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
            Format::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
        };
        parsed.map_err(|e| format!("Failed to parse {self:?} from {source}: {e}").into())
    }
}

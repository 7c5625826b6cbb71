use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

use super::Format;

/// Read a scenario file into a typed struct. `.yaml`/`.yml` files are YAML,
/// anything else JSON.
pub fn read_document<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
    format_of(&canonical).parse(&contents, &format!("'{}'", canonical.display()))
}

fn format_of(path: &Path) -> Format {
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => Format::Yaml,
        _ => Format::Json,
    }
}

fn resolve_path(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let canonical = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !canonical.exists() {
        return Err(format!("File not found: {}", canonical.display()).into());
    }

    if !canonical.is_file() {
        return Err(format!("Not a file: {}", canonical.display()).into());
    }

    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_chosen_by_extension() {
        assert_eq!(format_of(Path::new("scenario.yaml")), Format::Yaml);
        assert_eq!(format_of(Path::new("scenario.yml")), Format::Yaml);
        assert_eq!(format_of(Path::new("scenario.json")), Format::Json);
        assert_eq!(format_of(Path::new("scenario")), Format::Json);
    }
}

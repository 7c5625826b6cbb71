use serde::de::DeserializeOwned;
use std::io::{self, Read};

use super::Format;

/// A scenario piped on stdin, parsed straight into `T`.
///
/// Returns `None` for an interactive terminal or a blank pipe so the command
/// falls back to its flags.
pub fn read_stdin<T: DeserializeOwned>() -> Result<Option<T>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }
    let mut piped = String::new();
    io::stdin().lock().read_to_string(&mut piped)?;
    parse_piped(&piped)
}

fn parse_piped<T: DeserializeOwned>(piped: &str) -> Result<Option<T>, Box<dyn std::error::Error>> {
    let body = piped.trim_start_matches('\u{feff}').trim();
    if body.is_empty() {
        return Ok(None);
    }
    sniff(body).parse(body, "stdin").map(Some)
}

/// Pipes carry no extension: JSON documents open with a brace or bracket,
/// everything else is read as YAML.
fn sniff(body: &str) -> Format {
    match body.as_bytes().first() {
        Some(b'{') | Some(b'[') => Format::Json,
        _ => Format::Yaml,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Scenario {
        name: String,
        horizon_years: u32,
    }

    #[test]
    fn test_blank_pipe_falls_back_to_flags() {
        assert_eq!(parse_piped::<Scenario>("").unwrap(), None);
        assert_eq!(parse_piped::<Scenario>(" \n\t\n").unwrap(), None);
    }

    #[test]
    fn test_json_and_yaml_pipes() {
        let expected = Scenario {
            name: "flat".into(),
            horizon_years: 10,
        };
        let json = parse_piped::<Scenario>("\u{feff}{\"name\": \"flat\", \"horizon_years\": 10}\n");
        assert_eq!(json.unwrap(), Some(expected));
        let yaml = parse_piped::<Scenario>("name: flat\nhorizon_years: 10\n").unwrap();
        assert_eq!(yaml.map(|s| s.horizon_years), Some(10));
    }

    #[test]
    fn test_malformed_pipe_names_the_stream() {
        let err = parse_piped::<Scenario>("{\"name\": ").unwrap_err();
        assert!(err.to_string().contains("from stdin"), "{err}");
        assert!(parse_piped::<Scenario>("name: flat\n").is_err());
    }
}

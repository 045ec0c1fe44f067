use serde::{Deserialize, Serialize};

use crate::params::CompressorParams;

pub mod manager;

pub use manager::Manager;

/// A named compressor setting saved as one JSON file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Preset {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub params: CompressorParams,
}

impl Preset {
    pub fn new(name: impl Into<String>, params: CompressorParams) -> Self {
        Self {
            name: name.into(),
            description: None,
            author: None,
            params,
        }
    }

    pub fn with_description(self, description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..self
        }
    }

    pub fn with_author(self, author: impl Into<String>) -> Self {
        Self {
            author: Some(author.into()),
            ..self
        }
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.params)?;
        if let Some(author) = &self.author {
            write!(f, " (by {author})")?;
        }
        if let Some(description) = &self.description {
            write!(f, "\n  {description}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_fields_are_omitted_from_json() {
        let preset = Preset::new("Bus Glue", CompressorParams::default());
        let json = serde_json::to_string(&preset).unwrap();
        assert!(!json.contains("author"));
        assert!(!json.contains("description"));

        let back: Preset = serde_json::from_str(&json).unwrap();
        assert_eq!(back, preset);
    }

    #[test]
    fn display_lists_author_and_description() {
        let preset = Preset::new("Bus Glue", CompressorParams::default())
            .with_author("mix")
            .with_description("Gentle 2:1 on the mix bus");
        let text = preset.to_string();
        assert!(text.starts_with("Bus Glue: "));
        assert!(text.contains("(by mix)"));
        assert!(text.ends_with("\n  Gentle 2:1 on the mix bus"));
    }
}

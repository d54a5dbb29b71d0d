//! Artifact naming.

use std::collections::HashSet;

use regex::Regex;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::media::MediaRecord;

/// Names the artifacts a media record produces.
///
/// `needs_detailed` lets the discovery engine decide whether a summary
/// record must be refetched in its detailed form before naming is possible.
pub trait NameGenerator: Send + Sync {
    /// Whether naming this record requires its detailed form.
    fn needs_detailed(&self, record: &MediaRecord) -> bool;

    /// Base name of the record's artifact, without extension.
    fn base_name(&self, record: &MediaRecord) -> Result<String>;

    /// Full artifact filename, with extension.
    fn file(&self, record: &MediaRecord) -> Result<String> {
        Ok(format!(
            "{}.{}",
            self.base_name(record)?,
            extension_for(record)
        ))
    }
}

/// Template keys every summary record can satisfy.
const SUMMARY_KEYS: [&str; 4] = ["id", "code", "datetime", "date"];

/// `{key}`-style template namer.
///
/// Known keys: `id`, `code` (the post shortcode), `datetime`, `date`.
/// Any other key is looked up in the record's raw fields, which forces a
/// detailed refetch during discovery.
pub struct TemplateNamer {
    template: String,
    keys: Vec<String>,
}

impl TemplateNamer {
    pub fn new(template: &str) -> Result<Self> {
        if template.trim().is_empty() {
            return Err(Error::ConfigValidation {
                field: "template".into(),
                message: "template cannot be empty".into(),
            });
        }

        let key_re = Regex::new(r"\{([a-z_]+)\}").expect("static regex");
        let keys = key_re
            .captures_iter(template)
            .map(|cap| cap[1].to_string())
            .collect::<Vec<_>>();
        if keys.is_empty() {
            return Err(Error::ConfigValidation {
                field: "template".into(),
                message: format!("template '{}' has no substitution keys", template),
            });
        }

        Ok(Self {
            template: template.to_string(),
            keys,
        })
    }

    fn substitute(&self, record: &MediaRecord, key: &str) -> Result<String> {
        match key {
            "id" => Ok(record.id.clone()),
            "code" => Ok(record.shortcode.clone()),
            "datetime" => record
                .taken_at
                .map(|dt| dt.format("%Y-%m-%d %Hh%Mm%Ss").to_string())
                .ok_or_else(|| missing_key(key, record)),
            "date" => record
                .taken_at
                .map(|dt| dt.format("%Y-%m-%d").to_string())
                .ok_or_else(|| missing_key(key, record)),
            _ => match record.raw.get(key) {
                Some(Value::String(s)) => Ok(s.clone()),
                Some(Value::Number(n)) => Ok(n.to_string()),
                Some(Value::Bool(b)) => Ok(b.to_string()),
                _ => Err(missing_key(key, record)),
            },
        }
    }
}

impl NameGenerator for TemplateNamer {
    fn needs_detailed(&self, record: &MediaRecord) -> bool {
        let summary: HashSet<&str> = SUMMARY_KEYS.into_iter().collect();
        self.keys.iter().any(|key| {
            !summary.contains(key.as_str()) && record.raw.get(key.as_str()).is_none()
        })
    }

    fn base_name(&self, record: &MediaRecord) -> Result<String> {
        let mut name = self.template.clone();
        for key in &self.keys {
            let value = self.substitute(record, key)?;
            name = name.replace(&format!("{{{}}}", key), &value);
        }
        sanitize_filename(&name)
    }
}

fn missing_key(key: &str, record: &MediaRecord) -> Error {
    Error::Media(format!(
        "record '{}' lacks template key '{}'",
        record.id, key
    ))
}

/// File extension for a record's payload, derived from its URL with a
/// kind-based fallback.
fn extension_for(record: &MediaRecord) -> String {
    if let Some(ext) = record.payload_url().and_then(url_extension) {
        return ext;
    }
    if record.is_video() { "mp4" } else { "jpg" }.to_string()
}

fn url_extension(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next()?;
    let filename = path.rsplit('/').next()?;
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || ext.len() > 10 {
        return None;
    }
    ext.chars()
        .all(|c| c.is_ascii_alphanumeric())
        .then(|| ext.to_ascii_lowercase())
}

/// Validate and sanitize a filename.
///
/// Path traversal, separators and null bytes are rejected; remaining
/// problematic characters are replaced with underscores.
pub fn sanitize_filename(name: &str) -> Result<String> {
    if name.contains("..") {
        return Err(Error::InvalidFilename(format!(
            "Path traversal detected: '{}'",
            name
        )));
    }

    if name.contains('/') || name.contains('\\') {
        return Err(Error::InvalidFilename(format!(
            "Path separators not allowed in filename: '{}'",
            name
        )));
    }

    if name.contains('\0') {
        return Err(Error::InvalidFilename(format!(
            "Null bytes not allowed in filename: '{}'",
            name
        )));
    }

    let sanitized: String = name
        .chars()
        .map(|c| match c {
            ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.trim().is_empty() {
        return Err(Error::InvalidFilename(
            "Filename cannot be empty or whitespace-only".to_string(),
        ));
    }

    Ok(sanitized)
}

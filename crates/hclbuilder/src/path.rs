//! dot-separated addresses
//!
//! | kind          | format                                | minimum segments |
//! |---------------|---------------------------------------|------------------|
//! | [BlockPath]     | `type.label1…labelN`                  | 2                |
//! | [AttributePath] | `type.label1…labelN.attribute`        | 3                |
//! | [KeyPath]       | `attribute.key1…keyN` (within a block) | 1                |
//!
//! Splitting is purely syntactic. How an [AttributePath] maps onto (possibly nested) blocks is decided
//! during navigation, see [crate::body::Body::resolve].

/// Address of a top level block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockPath {
    pub ident: String,
    pub labels: Vec<String>,
}

impl BlockPath {
    pub fn parse(path: &str) -> Result<Self, PathError> {
        let mut segments = split(path, 2)?.into_iter();
        let ident = identifier(segments.next())?;

        Ok(Self {
            ident,
            labels: segments.collect(),
        })
    }
}

impl std::fmt::Display for BlockPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.ident)?;
        for label in &self.labels {
            write!(f, ".{label}")?;
        }
        Ok(())
    }
}

/// Address of an attribute inside a block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributePath {
    /// All segments leading to the block, starting with the outermost block type
    pub block: Vec<String>,
    pub name: String,
}

impl AttributePath {
    pub fn parse(path: &str) -> Result<Self, PathError> {
        let mut block = split(path, 3)?;
        let name = identifier(block.pop())?;

        // block type of the outermost block
        identifier(block.first().cloned())?;

        Ok(Self { block, name })
    }
}

/// Dotted key within a single block: the attribute name followed by nested object keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPath {
    pub root: String,
    pub nested: Vec<String>,
}

impl KeyPath {
    pub fn parse(path: &str) -> Result<Self, PathError> {
        let mut segments = split(path, 1)?.into_iter();
        let root = identifier(segments.next())?;

        Ok(Self {
            root,
            nested: segments.collect(),
        })
    }
}

/// A path that can not be used for the requested operation
///
/// Document operations treat these as a no-op. They never leave a document half-modified.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("path `{path}` has {found} segment(s), at least {required} required")]
    TooShort {
        path: String,
        found: usize,
        required: usize,
    },
    #[error("path `{0}` contains an empty segment")]
    EmptySegment(String),
    #[error("`{0}` is not a valid identifier")]
    InvalidIdentifier(String),
}

fn split(path: &str, required: usize) -> Result<Vec<String>, PathError> {
    let segments: Vec<String> = path.split('.').map(str::to_owned).collect();

    if segments.len() < required {
        return Err(PathError::TooShort {
            path: path.to_owned(),
            found: segments.len(),
            required,
        });
    }

    if segments.iter().any(String::is_empty) {
        return Err(PathError::EmptySegment(path.to_owned()));
    }

    Ok(segments)
}

fn identifier(segment: Option<String>) -> Result<String, PathError> {
    let segment = segment.unwrap_or_default();
    if is_identifier(&segment) {
        Ok(segment)
    } else {
        Err(PathError::InvalidIdentifier(segment))
    }
}

/// hcl identifier: a letter or `_`, followed by letters, digits, `_` or `-`
pub(crate) fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    (first.is_alphabetic() || first == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

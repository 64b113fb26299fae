//! owned hcl tree ([Body], [Block], [Structure])
//!
//! Mirrors [hcl::Body] but keeps its structures in a plain vector so that blocks can be found,
//! created, replaced and removed in place. Attributes are stored as [hcl::Attribute], i.e. as
//! unevaluated expressions.
//!
//! Invariants maintained by the mutators:
//! - attribute keys are unique within a body (setting an existing key replaces it in place)
//! - blocks are never merged: two blocks with the same identity only exist if they were appended
use crate::path::is_identifier;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Body {
    structures: Vec<Structure>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Structure {
    Attribute(hcl::Attribute),
    Block(Block),
}

/// A block: type identifier, labels and a nested body
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub ident: hcl::Identifier,
    pub labels: Vec<hcl::BlockLabel>,
    pub body: Body,
}

impl Block {
    /// Creates an empty block. `ident` must be a valid identifier.
    pub(crate) fn new<S: AsRef<str>>(ident: &str, labels: &[S]) -> Self {
        Self {
            ident: hcl::Identifier::unchecked(ident),
            labels: labels
                .iter()
                .map(|label| hcl::BlockLabel::String(label.as_ref().to_owned()))
                .collect(),
            body: Body::default(),
        }
    }

    /// Structural identity: same type and the same label sequence
    pub fn matches<S: AsRef<str>>(&self, ident: &str, labels: &[S]) -> bool {
        self.ident.as_str() == ident
            && self.labels.len() == labels.len()
            && self
                .labels
                .iter()
                .zip(labels)
                .all(|(label, expected)| label.as_str() == expected.as_ref())
    }

    pub fn label_strs(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(hcl::BlockLabel::as_str)
    }
}

impl Body {
    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.structures.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Structure> {
        self.structures.iter()
    }

    pub fn push(&mut self, structure: impl Into<Structure>) {
        self.structures.push(structure.into());
    }

    pub(crate) fn remove(&mut self, index: usize) -> Structure {
        self.structures.remove(index)
    }

    pub fn attributes(&self) -> impl Iterator<Item = &hcl::Attribute> {
        self.structures.iter().filter_map(|structure| match structure {
            Structure::Attribute(attribute) => Some(attribute),
            Structure::Block(_) => None,
        })
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.structures.iter().filter_map(|structure| match structure {
            Structure::Block(block) => Some(block),
            Structure::Attribute(_) => None,
        })
    }

    pub fn attribute(&self, key: &str) -> Option<&hcl::Attribute> {
        self.attributes()
            .find(|attribute| attribute.key.as_str() == key)
    }

    /// Sets an attribute, replacing an existing one with the same key in place
    pub fn set_attribute(&mut self, key: &str, expr: hcl::Expression) {
        let existing = self.structures.iter_mut().find_map(|structure| match structure {
            Structure::Attribute(attribute) if attribute.key.as_str() == key => Some(attribute),
            _ => None,
        });

        match existing {
            Some(attribute) => attribute.expr = expr,
            None => self
                .structures
                .push(Structure::Attribute(hcl::Attribute::new(
                    hcl::Identifier::unchecked(key),
                    expr,
                ))),
        }
    }

    pub fn remove_attribute(&mut self, key: &str) -> Option<hcl::Attribute> {
        let index = self.structures.iter().position(|structure| {
            matches!(structure, Structure::Attribute(attribute) if attribute.key.as_str() == key)
        })?;

        match self.structures.remove(index) {
            Structure::Attribute(attribute) => Some(attribute),
            Structure::Block(_) => None,
        }
    }

    /// Appends a structure coming from another body
    ///
    /// Attributes replace a same-named attribute in place, blocks are always appended.
    pub fn merge_structure(&mut self, structure: Structure) {
        match structure {
            Structure::Attribute(attribute) => {
                self.set_attribute(attribute.key.as_str(), attribute.expr)
            }
            Structure::Block(block) => self.structures.push(Structure::Block(block)),
        }
    }

    pub fn first_block(&self) -> Option<&Block> {
        self.blocks().next()
    }

    pub fn first_block_mut(&mut self) -> Option<&mut Block> {
        self.structures.iter_mut().find_map(|structure| match structure {
            Structure::Block(block) => Some(block),
            Structure::Attribute(_) => None,
        })
    }

    pub(crate) fn position_block<S: AsRef<str>>(&self, ident: &str, labels: &[S]) -> Option<usize> {
        self.structures.iter().position(
            |structure| matches!(structure, Structure::Block(block) if block.matches(ident, labels)),
        )
    }

    pub fn find_block<S: AsRef<str>>(&self, ident: &str, labels: &[S]) -> Option<&Block> {
        self.blocks().find(|block| block.matches(ident, labels))
    }

    pub fn find_block_mut<S: AsRef<str>>(&mut self, ident: &str, labels: &[S]) -> Option<&mut Block> {
        let index = self.position_block(ident, labels)?;
        self.block_at_mut(index)
    }

    fn block_at_mut(&mut self, index: usize) -> Option<&mut Block> {
        match self.structures.get_mut(index) {
            Some(Structure::Block(block)) => Some(block),
            _ => None,
        }
    }

    /// Replaces the block with the same identity in place, or appends it
    pub fn replace_block(&mut self, block: Block) {
        let labels: Vec<&str> = block.label_strs().collect();
        match self.position_block(block.ident.as_str(), &labels) {
            Some(index) => self.structures[index] = Structure::Block(block),
            None => self.structures.push(Structure::Block(block)),
        }
    }

    /// Finds the block addressed by `segments` (type first, then labels or nested pairs)
    ///
    /// At each level:
    /// 1. a block whose type is the first segment and whose labels are all remaining segments
    /// 2. otherwise a block matching the first two segments as `(type, label)`, continuing in its body
    pub fn resolve<S: AsRef<str>>(&self, segments: &[S]) -> Option<&Block> {
        let (ident, labels) = segments.split_first()?;
        let ident = ident.as_ref();

        if let Some(block) = self.find_block(ident, labels) {
            return Some(block);
        }

        if labels.len() > 1 {
            let (label, rest) = labels.split_at(1);
            return self.find_block(ident, label)?.body.resolve(rest);
        }

        None
    }

    /// Like [Body::resolve], but creates what is missing
    ///
    /// An even number of segments is read as `(type, label)` pairs and creates one nested block per
    /// pair (`outer.a.inner.b` becomes `outer "a" { inner "b" {} }`). Otherwise a single block is
    /// created with the first segment as type and all remaining segments as labels
    /// (`resource.widget.default`).
    ///
    /// Returns `None` only if a block type to be created is not a valid identifier.
    pub fn resolve_or_create<S: AsRef<str>>(&mut self, segments: &[S]) -> Option<&mut Block> {
        let (ident, labels) = segments.split_first()?;
        let ident = ident.as_ref();

        if let Some(index) = self.position_block(ident, labels) {
            return self.block_at_mut(index);
        }

        if labels.len() > 1 {
            let (label, rest) = labels.split_at(1);
            if let Some(index) = self.position_block(ident, label) {
                return self.block_at_mut(index)?.body.resolve_or_create(rest);
            }
        }

        if !is_identifier(ident) {
            tracing::warn!(ident, "refusing to create block with invalid type");
            return None;
        }

        if segments.len() > 2 && segments.len() % 2 == 0 {
            let (label, rest) = labels.split_at(1);
            tracing::debug!(ident, "creating nested block");
            self.structures.push(Structure::Block(Block::new(ident, label)));
            return self
                .block_at_mut(self.structures.len() - 1)?
                .body
                .resolve_or_create(rest);
        }

        tracing::debug!(ident, labels = labels.len(), "creating block");
        self.structures.push(Structure::Block(Block::new(ident, labels)));
        self.block_at_mut(self.structures.len() - 1)
    }
}

impl From<hcl::Attribute> for Structure {
    fn from(value: hcl::Attribute) -> Self {
        Structure::Attribute(value)
    }
}

impl From<Block> for Structure {
    fn from(value: Block) -> Self {
        Structure::Block(value)
    }
}

impl FromIterator<Structure> for Body {
    fn from_iter<I: IntoIterator<Item = Structure>>(iter: I) -> Self {
        Self {
            structures: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Body {
    type Item = Structure;
    type IntoIter = std::vec::IntoIter<Structure>;

    fn into_iter(self) -> Self::IntoIter {
        self.structures.into_iter()
    }
}

impl From<hcl::Body> for Body {
    fn from(value: hcl::Body) -> Self {
        value.into_iter().map(Structure::from).collect()
    }
}

impl From<hcl::Structure> for Structure {
    fn from(value: hcl::Structure) -> Self {
        match value {
            hcl::Structure::Attribute(attribute) => Structure::Attribute(attribute),
            hcl::Structure::Block(block) => Structure::Block(Block {
                ident: block.identifier,
                labels: block.labels,
                body: block.body.into(),
            }),
        }
    }
}

impl From<Body> for hcl::Body {
    fn from(value: Body) -> Self {
        value.into_iter().map(hcl::Structure::from).collect()
    }
}

impl From<Structure> for hcl::Structure {
    fn from(value: Structure) -> Self {
        match value {
            Structure::Attribute(attribute) => hcl::Structure::Attribute(attribute),
            Structure::Block(block) => hcl::Structure::Block(block.into()),
        }
    }
}

impl From<Block> for hcl::Block {
    fn from(value: Block) -> Self {
        let mut block = hcl::Block::new(value.ident);
        block.labels = value.labels;
        block.body = value.body.into();
        block
    }
}

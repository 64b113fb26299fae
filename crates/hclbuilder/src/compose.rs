//! embedding documents into other documents
//!
//! [Document::add] does not copy anything. The parent keeps a handle to the child's content and
//! splices it in whenever the parent is rendered, so later changes to the child show up without
//! adding it again:
//!
//! ```
//! # use hclbuilder::Document;
//! let mut child = Document::new();
//! child.set_attribute("resource.widget.default.name", "w1");
//!
//! let mut parent = Document::new();
//! parent.add(&child);
//! child.set_attribute("resource.widget.default.name", "w2");
//!
//! assert!(parent.render().unwrap().contains(r#"name = "w2""#));
//! ```
//!
//! Embedding is tracked per [crate::DocumentId]: adding the same child twice is a no-op, adding two
//! different documents with identical content embeds both.
//!
//! Readers of the parent ([Document::get_attribute], [Document::has_block], the `resource_*`
//! accessors) see the composed content. [Document::remove_block] hides a block that came from a
//! child for this parent only; the child keeps it and everything else it holds stays live.
use crate::body::{Body, Structure};
use crate::document::{Content, Document, DocumentId, Embedded};
use crate::path::BlockPath;
use crate::value::Value;

impl Document {
    /// Embeds `child` at the current end of this document
    ///
    /// Top level blocks of the child are appended (never merged with same-named blocks), top level
    /// attributes of the child replace same-named attributes.
    pub fn add(&mut self, child: &Document) {
        if self.id() == child.id() || child.content.borrow().embeds(self.id()) {
            tracing::warn!(parent=%self.id(), child=%child.id(), "refusing to embed, would create a cycle");
            return;
        }

        let mut content = self.content.borrow_mut();
        if content.embedded.contains_key(&child.id()) {
            tracing::debug!(parent=%self.id(), child=%child.id(), "already embedded");
            return;
        }

        tracing::debug!(parent=%self.id(), child=%child.id(), "embedding");
        let position = content.body.len();
        content
            .embedded
            .insert(child.id(), Embedded::new(position, child.content.clone()));
    }

    /// Makes the first block depend on `other` by adding its resource path to `depends_on`
    ///
    /// An existing list is extended, references already present are not repeated. Nothing happens if
    /// either document has no suitable resource block.
    pub fn depends_on(&mut self, other: &Document) {
        let reference = other.resource_path();
        if reference.is_empty() {
            tracing::debug!(other=%other.id(), "no resource to depend on");
            return;
        }

        let mut content = self.content.borrow_mut();
        let Some(block) = content.body.first_block_mut() else {
            return;
        };

        let mut references = match block
            .body
            .attribute("depends_on")
            .and_then(|attribute| Value::from_expression(&attribute.expr))
        {
            Some(Value::Array(references)) => references,
            _ => Vec::new(),
        };

        if references.iter().any(|existing| existing.as_str() == Some(reference.as_str())) {
            return;
        }

        tracing::debug!(%reference, "adding dependency");
        references.push(Value::Raw(reference));
        block
            .body
            .set_attribute("depends_on", Value::Array(references).into());
    }
}

/// Where a top level block of the composed content comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Origin {
    /// index into the own body
    Own(usize),
    Embedded(DocumentId),
}

impl Content {
    /// Own body with all embedded content spliced in, recursively
    pub(crate) fn composed(&self) -> Body {
        let mut embedded = self.sorted_embeds().into_iter().peekable();

        let mut body = Body::default();
        for (index, structure) in self.body.iter().enumerate() {
            while let Some((_, child)) = embedded.next_if(|(_, child)| child.position <= index) {
                splice(&mut body, child);
            }
            push_own(&mut body, structure.clone());
        }
        for (_, child) in embedded {
            splice(&mut body, child);
        }

        body
    }

    /// Origin of the first top level block matching `path`, in rendering order
    pub(crate) fn locate_block(&self, path: &BlockPath) -> Option<Origin> {
        let shows = |child: &Embedded| {
            child
                .visible()
                .find_block(&path.ident, &path.labels)
                .is_some()
        };

        let mut embedded = self.sorted_embeds().into_iter().peekable();
        for (index, structure) in self.body.iter().enumerate() {
            while let Some((id, child)) = embedded.next_if(|(_, child)| child.position <= index) {
                if shows(child) {
                    return Some(Origin::Embedded(id));
                }
            }
            if let Structure::Block(block) = structure {
                if block.matches(&path.ident, &path.labels) {
                    return Some(Origin::Own(index));
                }
            }
        }

        embedded
            .find(|(_, child)| shows(*child))
            .map(|(id, _)| Origin::Embedded(id))
    }

    fn sorted_embeds(&self) -> Vec<(DocumentId, &Embedded)> {
        let mut embedded: Vec<_> = self
            .embedded
            .iter()
            .map(|(id, embedded)| (*id, embedded))
            .collect();
        embedded.sort_by_key(|(_, embedded)| embedded.position);
        embedded
    }

    /// `true` if `id` is embedded here, directly or transitively
    pub(crate) fn embeds(&self, id: DocumentId) -> bool {
        self.embedded.iter().any(|(embedded_id, embedded)| {
            *embedded_id == id || embedded.content.borrow().embeds(id)
        })
    }
}

impl Embedded {
    /// Composed content of the child minus the blocks this parent removed
    pub(crate) fn visible(&self) -> Body {
        let mut body = self.content.borrow().composed();
        for path in &self.hidden {
            if let Some(index) = body.position_block(&path.ident, &path.labels) {
                body.remove(index);
            }
        }
        body
    }
}

fn splice(body: &mut Body, child: &Embedded) {
    for structure in child.visible() {
        body.merge_structure(structure);
    }
}

/// Own attributes never override an attribute an embedded document already set
fn push_own(body: &mut Body, structure: Structure) {
    if let Structure::Attribute(attribute) = &structure {
        if body.attribute(attribute.key.as_str()).is_some() {
            return;
        }
    }
    body.push(structure);
}

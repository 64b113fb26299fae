//! [Document]: path-addressed reads and writes over an hcl body
use crate::body::{Block, Body};
use crate::compose::Origin;
use crate::merge::{merge, nest, remove_nested};
use crate::path::{AttributePath, BlockPath, KeyPath, PathError};
use crate::provider::Provider;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Creation-order identity of a [Document]
///
/// Composition tracks embedded documents by this id, never by content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(u64);

impl DocumentId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An hcl document under construction
///
/// Mutators take a path, see [crate::path] for the formats. A path that is too short or otherwise
/// malformed is logged and ignored; the document stays untouched.
///
/// Readers and [Document::remove_block] see the composed content, including documents embedded
/// with [Document::add]. All other mutators only change the document's own content.
#[derive(Debug)]
pub struct Document {
    id: DocumentId,
    pub(crate) content: Rc<RefCell<Content>>,
    pub(crate) provider: Option<Provider>,
    pub(crate) resource_provider: Option<Provider>,
}

/// Body plus the documents embedded into it
#[derive(Debug, Default)]
pub(crate) struct Content {
    pub(crate) body: Body,
    /// keyed by the embedded document, in embedding order
    pub(crate) embedded: indexmap::IndexMap<DocumentId, Embedded>,
}

#[derive(Debug, derive_new::new)]
pub(crate) struct Embedded {
    /// number of own top level structures preceding the embedded content
    pub(crate) position: usize,
    pub(crate) content: Rc<RefCell<Content>>,
    /// blocks removed through the embedding document
    #[new(default)]
    pub(crate) hidden: Vec<BlockPath>,
}

impl Content {
    /// Removes a top level structure and keeps embedding positions stable
    fn remove_structure(&mut self, index: usize) {
        self.body.remove(index);
        for embedded in self.embedded.values_mut() {
            if embedded.position > index {
                embedded.position -= 1;
            }
        }
    }
}

/// Selects the block a dotted key operation works on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BlockSelector {
    /// The first top level block. Most documents built for a single resource hold exactly one.
    #[default]
    First,
    /// A top level block by [BlockPath] (`type.label1…labelN`)
    Path(String),
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO error")]
    Io(#[from] std::io::Error),
    #[error("Unable to parse hcl: {0}")]
    Parse(#[from] hcl_edit::parser::Error),
    #[error("Unable to format hcl")]
    Format(#[from] hcl::Error),
}

impl Error {
    /// Line and column of a parse error
    pub fn location(&self) -> Option<(usize, usize)> {
        match self {
            Error::Parse(error) => Some((error.location().line(), error.location().column())),
            _ => None,
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::from_body(Body::default())
    }
}

impl Document {
    /// Creates an empty document
    pub fn new() -> Self {
        Self::default()
    }

    fn from_body(body: Body) -> Self {
        Self {
            id: DocumentId::next(),
            content: Rc::new(RefCell::new(Content {
                body,
                embedded: Default::default(),
            })),
            provider: None,
            resource_provider: None,
        }
    }

    pub fn from_text(content: &str) -> Result<Self, Error> {
        let body: hcl::Body = hcl_edit::parser::parse_body(content)?.into();
        Ok(Self::from_body(body.into()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        tracing::info!(path=%path.display(), "loading file");

        let file_contents = std::fs::read_to_string(path)?;
        Self::from_text(&file_contents)
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// `true` if there is nothing to render
    pub fn is_empty(&self) -> bool {
        self.content.borrow().composed().is_empty()
    }

    /// Renders the document, including embedded documents, as canonically formatted hcl
    ///
    /// Output is stable for a given tree. An empty document renders as an empty string.
    pub fn render(&self) -> Result<String, Error> {
        let body = self.content.borrow().composed();
        if body.is_empty() {
            return Ok(String::new());
        }

        let body: hcl::Body = body.into();
        Ok(hcl::format::to_string(&body)?)
    }

    /// Writes [Document::render] to `path`. New files are only accessible by the owner.
    pub fn write_file(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        write_file(path.as_ref(), &self.render()?)
    }

    /// Sets `type.label1…labelN.attribute`, creating the block if needed
    pub fn set_attribute(&mut self, path: &str, value: impl Into<Value>) {
        let path = match AttributePath::parse(path) {
            Ok(path) => path,
            Err(err) => return ignore_path(&err),
        };

        let mut content = self.content.borrow_mut();
        let Some(block) = content.body.resolve_or_create(&path.block) else {
            return;
        };

        let value: Value = value.into();
        tracing::debug!(attribute = %path.name, "set attribute");
        block.body.set_attribute(&path.name, value.into());
    }

    /// Reads `type.label1…labelN.attribute`. Unevaluable parts are returned as [Value::Raw].
    pub fn get_attribute(&self, path: &str) -> Option<Value> {
        let path = AttributePath::parse(path).ok()?;
        let body = self.content.borrow().composed();
        let attribute = body.resolve(&path.block)?.body.attribute(&path.name)?;
        Value::from_expression(&attribute.expr)
    }

    /// Removes `type.label1…labelN.attribute`. The block stays, even if it ends up empty.
    pub fn remove_attribute(&mut self, path: &str) {
        let path = match AttributePath::parse(path) {
            Ok(path) => path,
            Err(err) => return ignore_path(&err),
        };

        let mut content = self.content.borrow_mut();
        let Some(block) = resolve_mut(&mut content.body, &path.block) else {
            tracing::debug!(block = %path.block.join("."), "no such block");
            return;
        };

        if block.body.remove_attribute(&path.name).is_some() {
            tracing::debug!(attribute = %path.name, "removed attribute");
        }
    }

    /// Replaces the block at `type.label1…labelN` with a fresh block holding `attributes`
    ///
    /// Attributes are written sorted by key. Object values become object attributes, not nested blocks.
    pub fn set_block<I, K, V>(&mut self, path: &str, attributes: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let path = match BlockPath::parse(path) {
            Ok(path) => path,
            Err(err) => return ignore_path(&err),
        };

        let sorted: BTreeMap<String, Value> = attributes
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();

        let mut block = Block::new(&path.ident, &path.labels);
        for (key, value) in sorted {
            if !crate::path::is_identifier(&key) {
                ignore_path(&PathError::InvalidIdentifier(key));
                continue;
            }
            block.body.set_attribute(&key, value.into());
        }

        tracing::debug!(%path, "set block");
        self.content.borrow_mut().body.replace_block(block);
    }

    pub fn has_block(&self, path: &str) -> bool {
        BlockPath::parse(path).is_ok_and(|path| {
            self.content
                .borrow()
                .locate_block(&path)
                .is_some()
        })
    }

    /// Removes the first top level block at `type.label1…labelN`, in rendering order
    ///
    /// A block that comes from an embedded document is hidden from this document only.
    pub fn remove_block(&mut self, path: &str) {
        let path = match BlockPath::parse(path) {
            Ok(path) => path,
            Err(err) => return ignore_path(&err),
        };

        let mut content = self.content.borrow_mut();
        match content.locate_block(&path) {
            Some(Origin::Own(index)) => {
                tracing::debug!(%path, "remove block");
                content.remove_structure(index);
            }
            Some(Origin::Embedded(child)) => {
                if let Some(embedded) = content.embedded.get_mut(&child) {
                    tracing::debug!(%path, %child, "hiding embedded block");
                    embedded.hidden.push(path);
                }
            }
            None => tracing::debug!(%path, "no such block"),
        }
    }

    /// [Document::add_attribute_value] on the first block
    pub fn add_attribute(&mut self, key: &str, value: impl Into<Value>) {
        self.add_attribute_value(&BlockSelector::First, key, value.into());
    }

    /// [Document::add_attribute] with `text` interpreted by [Value::infer]
    ///
    /// `["*"]` becomes a list, `true` a boolean, `konnect_mesh.default.name` a reference and
    /// `This is just text` a string.
    pub fn add_attribute_hcl(&mut self, key: &str, text: &str) {
        self.add_attribute(key, Value::infer(text));
    }

    /// Adds or updates an attribute of the selected block by dotted key
    ///
    /// `routing.enabled` with `true` writes `routing = { enabled = true }`. If `routing` already holds
    /// an object, the new structure is deep merged into it (see [crate::merge::merge]) and all other
    /// keys are kept. Repeated calls accumulate.
    pub fn add_attribute_value(&mut self, selector: &BlockSelector, key: &str, value: Value) {
        let key = match KeyPath::parse(key) {
            Ok(key) => key,
            Err(err) => return ignore_path(&err),
        };

        let mut content = self.content.borrow_mut();
        let Some(block) = select_block(&mut content.body, selector) else {
            return;
        };

        let value = if key.nested.is_empty() {
            value
        } else {
            let existing = block
                .body
                .attribute(&key.root)
                .and_then(|attribute| Value::from_expression(&attribute.expr));

            match (existing, nest(&key.nested, value)) {
                (Some(Value::Object(existing)), Value::Object(incoming)) => {
                    Value::Object(merge(existing, incoming))
                }
                (_, nested) => nested,
            }
        };

        tracing::debug!(attribute = %key.root, "add attribute");
        block.body.set_attribute(&key.root, value.into());
    }

    /// Removes an attribute of the selected block by dotted key
    ///
    /// A single segment removes the whole attribute. Longer keys only remove the nested key and
    /// leave its siblings in place.
    pub fn remove_attribute_value(&mut self, selector: &BlockSelector, key: &str) {
        let key = match KeyPath::parse(key) {
            Ok(key) => key,
            Err(err) => return ignore_path(&err),
        };

        let mut content = self.content.borrow_mut();
        let Some(block) = select_block(&mut content.body, selector) else {
            return;
        };

        if key.nested.is_empty() {
            block.body.remove_attribute(&key.root);
            return;
        }

        let existing = block
            .body
            .attribute(&key.root)
            .and_then(|attribute| Value::from_expression(&attribute.expr));
        let Some(Value::Object(mut map)) = existing else {
            tracing::debug!(attribute = %key.root, "not an object, nothing to remove");
            return;
        };

        if remove_nested(&mut map, &key.nested) {
            block.body.set_attribute(&key.root, Value::Object(map).into());
        }
    }

    /// `type.label1…labelN` of the first block, e.g. `resource.widget.default`
    pub fn resource_address(&self) -> String {
        self.with_first_block(|block| {
            std::iter::once(block.ident.as_str())
                .chain(block.label_strs())
                .collect::<Vec<_>>()
                .join(".")
        })
    }

    /// Name label of the first block: the second label, or the only one
    pub fn resource_name(&self) -> String {
        self.with_first_block(|block| {
            let mut labels = block.label_strs();
            let first = labels.next();
            labels.next().or(first).unwrap_or_default().to_owned()
        })
    }

    /// `<type>.<name>` if the first block is a `resource` block with at least two labels
    pub fn resource_path(&self) -> String {
        self.with_first_block(|block| {
            let labels: Vec<_> = block.label_strs().collect();
            match labels.as_slice() {
                [kind, name, ..] if block.ident.as_str() == "resource" => format!("{kind}.{name}"),
                _ => String::new(),
            }
        })
    }

    fn with_first_block(&self, f: impl FnOnce(&Block) -> String) -> String {
        self.content
            .borrow()
            .composed()
            .first_block()
            .map(f)
            .unwrap_or_default()
    }
}

impl std::str::FromStr for Document {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_text(s)
    }
}

fn ignore_path(err: &PathError) {
    tracing::warn!(%err, "ignoring operation");
}

/// [Body::resolve], but mutable and without creating anything
fn resolve_mut<'b, S: AsRef<str>>(body: &'b mut Body, segments: &[S]) -> Option<&'b mut Block> {
    let (ident, labels) = segments.split_first()?;
    let ident = ident.as_ref();

    if body.position_block(ident, labels).is_some() {
        return body.find_block_mut(ident, labels);
    }

    if labels.len() > 1 {
        let (label, rest) = labels.split_at(1);
        return resolve_mut(&mut body.find_block_mut(ident, label)?.body, rest);
    }

    None
}

fn select_block<'b>(body: &'b mut Body, selector: &BlockSelector) -> Option<&'b mut Block> {
    let block = match selector {
        BlockSelector::First => body.first_block_mut(),
        BlockSelector::Path(path) => match BlockPath::parse(path) {
            Ok(path) => body.find_block_mut(&path.ident, &path.labels),
            Err(err) => {
                ignore_path(&err);
                return None;
            }
        },
    };

    if block.is_none() {
        tracing::debug!(?selector, "no block selected");
    }
    block
}

fn write_file(path: &Path, content: &str) -> Result<(), Error> {
    use std::io::Write;

    tracing::info!(path=%path.display(), "writing file");

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn render(document: &Document) -> String {
        document.render().expect("must render")
    }

    fn object<const N: usize>(entries: [(&str, Value); N]) -> Value {
        entries.into_iter().collect()
    }

    fn reparsed(document: &Document) -> Document {
        Document::from_text(&render(document)).expect("rendered output must parse")
    }

    #[test]
    fn empty_document_renders_empty() {
        let document = Document::new();
        assert!(document.is_empty());
        assert_eq!(render(&document), "");
    }

    #[test]
    fn set_block() {
        let mut document = Document::new();
        document.set_block("resource.widget.default", [("name", "w1")]);

        let rendered = render(&document);
        assert!(rendered.contains(r#"resource "widget" "default" {"#), "{rendered}");
        assert!(rendered.contains(r#"name = "w1""#), "{rendered}");
    }

    #[test]
    fn set_block_sorts_attributes() {
        let mut document = Document::new();
        document.set_block(
            "resource.widget.default",
            [("type", "Widget"), ("name", "w1"), ("description", "d")],
        );

        let rendered = render(&document);
        let position = |needle: &str| rendered.find(needle).expect(needle);
        assert!(position("description =") < position("name ="));
        assert!(position("name =") < position("type ="));
    }

    #[test]
    fn set_block_is_idempotent() {
        let mut once = Document::new();
        once.set_block("resource.widget.default", [("name", "w1"), ("size", "xl")]);

        let mut twice = Document::new();
        twice.set_block("resource.widget.default", [("name", "w1"), ("size", "xl")]);
        twice.set_block("resource.widget.default", [("name", "w1"), ("size", "xl")]);

        assert_eq!(render(&once), render(&twice));
    }

    #[test]
    fn set_block_replaces_existing_block() {
        let mut document = Document::new();
        document.set_block("resource.widget.default", [("name", "w1")]);
        document.set_block("resource.widget.default", [("size", "xl")]);

        assert_eq!(document.get_attribute("resource.widget.default.name"), None);
        assert_eq!(
            document.get_attribute("resource.widget.default.size"),
            Some("xl".into())
        );
    }

    #[test]
    fn set_block_with_nested_values() {
        let mut document = Document::new();
        let target_ref = object([("kind", "Mesh".into())]);
        let spec = object([(
            "from",
            Value::Array(vec![object([("target_ref", target_ref)])]),
        )]);
        document.set_block(
            "resource.mesh_traffic_permission.allow_all",
            [("name", Value::from("allow-all")), ("spec", spec.clone())],
        );

        let document = reparsed(&document);
        assert_eq!(
            document.get_attribute("resource.mesh_traffic_permission.allow_all.spec"),
            Some(spec)
        );
    }

    #[test]
    fn set_block_numeric_values() {
        let mut document = Document::new();
        document.set_block(
            "resource.test.numeric",
            [
                ("int_value", Value::from(42)),
                ("int64_value", Value::from(i64::MAX)),
                ("float_value", Value::from(2.75)),
                ("bool_value", Value::from(true)),
            ],
        );

        let document = reparsed(&document);
        let get = |name: &str| document.get_attribute(&format!("resource.test.numeric.{name}"));
        assert_eq!(get("int_value"), Some(Value::Integer(42)));
        assert_eq!(get("int64_value"), Some(Value::Integer(i64::MAX)));
        assert_eq!(get("float_value"), Some(Value::Decimal(2.75)));
        assert_eq!(get("bool_value"), Some(Value::Boolean(true)));
    }

    #[test]
    fn set_attribute_creates_block() {
        let mut document = Document::new();
        document.set_attribute("variable.region.default", "us-west-2");

        let rendered = render(&document);
        assert_eq!(rendered.matches("variable").count(), 1, "{rendered}");
        assert!(rendered.contains(r#"variable "region" {"#), "{rendered}");
        assert!(rendered.contains(r#"default = "us-west-2""#), "{rendered}");
    }

    #[test]
    fn set_attribute_on_multi_label_block() {
        let mut document = Document::new();
        document.set_attribute("resource.kong-mesh_mesh.default.name", "mesh-1");
        document.set_attribute("resource.kong-mesh_mesh.default.type", "Mesh");

        let rendered = render(&document);
        assert_eq!(rendered.matches("resource").count(), 1, "{rendered}");
        assert!(rendered.contains(r#"resource "kong-mesh_mesh" "default" {"#));
        assert_eq!(
            document.get_attribute("resource.kong-mesh_mesh.default.type"),
            Some("Mesh".into())
        );
    }

    #[test]
    fn set_attribute_string_stays_literal() {
        let mut document = Document::new();
        document.set_attribute("resource.policy.allow.mesh", "kong-mesh_mesh.default.name");

        assert!(render(&document).contains(r#"mesh = "kong-mesh_mesh.default.name""#));
    }

    #[test]
    fn set_attribute_raw_expression() {
        let mut document = Document::new();
        document.set_attribute(
            "resource.policy.allow.mesh",
            Value::raw("kong-mesh_mesh.default.name"),
        );

        assert!(render(&document).contains("mesh = kong-mesh_mesh.default.name"));
    }

    #[test]
    fn short_path_is_noop() {
        let mut document = Document::new();
        document.set_block("resource.widget.default", [("name", "w1")]);
        let before = render(&document);

        document.set_attribute("too.short", "v");
        document.remove_attribute("too.short");
        document.set_block("short", [("name", "v")]);
        document.remove_block("short");
        document.add_attribute("", "v");

        assert_eq!(render(&document), before);
    }

    #[test]
    fn remove_attribute_keeps_empty_block() {
        let mut document = Document::new();
        document.set_block("resource.widget.default", [("name", "w1")]);
        document.remove_attribute("resource.widget.default.name");

        assert!(document.has_block("resource.widget.default"));
        assert_eq!(document.get_attribute("resource.widget.default.name"), None);
        assert!(!render(&document).contains("name"));
    }

    #[test]
    fn remove_missing_is_noop() {
        let mut document = Document::new();
        document.set_block("resource.widget.default", [("name", "w1")]);
        let before = render(&document);

        document.remove_attribute("resource.widget.other.name");
        document.remove_attribute("resource.widget.default.missing");
        document.remove_block("resource.widget.other");

        assert_eq!(render(&document), before);
        assert_eq!(Document::new().render().ok(), Some(String::new()));
    }

    #[test]
    fn remove_block() {
        let mut document = Document::new();
        document.set_block("resource.mesh.default", [("name", "mesh-1")]);
        document.set_block("resource.policy.old_policy", [("name", "old-policy")]);
        document.remove_block("resource.policy.old_policy");

        assert!(document.has_block("resource.mesh.default"));
        assert!(!document.has_block("resource.policy.old_policy"));
        assert!(!render(&document).contains("old-policy"));
    }

    #[test]
    fn round_trip() {
        let mut document = Document::new();
        document.set_attribute("variable.region.default", "us-west-2");
        document.set_block(
            "resource.widget.default",
            [
                ("name", Value::from("w1")),
                ("tags", vec!["a", "b"].into()),
                ("count", 3.into()),
                ("ref", Value::raw("var.region")),
            ],
        );
        document.add_attribute("settings.nested.enabled", true);

        let rendered = render(&document);
        assert_eq!(render(&reparsed(&document)), rendered);
    }

    #[test]
    fn loaded_text_keeps_source_order() {
        let document = Document::from_text(
            r#"
resource "kong-mesh_mesh" "default" {
  type = "Mesh"
  name = "mesh-1"
}
"#,
        )
        .expect("valid hcl");

        let rendered = render(&document);
        let position = |needle: &str| rendered.find(needle).expect(needle);
        assert!(position("type =") < position("name ="));
    }

    #[test]
    fn parse_error_has_location() {
        let err = Document::from_text("resource \"foo\" {").expect_err("must fail");
        assert!(matches!(err, Error::Parse(_)));
        assert!(err.location().is_some());
        assert!(err.to_string().starts_with("Unable to parse hcl"));
    }

    #[test]
    fn from_file_missing() {
        let err = Document::from_file("/nonexistent/main.tf").expect_err("must fail");
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn write_file() {
        let mut document = Document::new();
        document.set_attribute("variable.test.default", "value");

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("output.tf");
        document.write_file(&path).expect("written");

        let written = std::fs::read_to_string(&path).expect("readable");
        assert_eq!(written, render(&document));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).expect("metadata").permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }

        let loaded = Document::from_file(&path).expect("loadable");
        assert_eq!(
            loaded.get_attribute("variable.test.default"),
            Some("value".into())
        );
    }

    #[test]
    fn nested_block_paths() {
        let mut document = Document::from_text(
            r#"
resource "widget" "default" {
  lifecycle {
    prevent_destroy = false
  }
}
"#,
        )
        .expect("valid hcl");

        document.set_attribute("resource.widget.default.name", "w1");
        document.set_attribute("outer.a.inner.b.value", 1);
        document.set_attribute("outer.a.inner.b.value", 2);

        assert_eq!(
            document.get_attribute("resource.widget.default.name"),
            Some("w1".into())
        );
        assert_eq!(
            document.get_attribute("outer.a.inner.b.value"),
            Some(Value::Integer(2))
        );

        let content = document.content.borrow();
        let outer = content.body.find_block("outer", &["a"]).expect("outer block");
        assert!(outer.body.find_block("inner", &["b"]).is_some());
        assert!(content.body.find_block("outer", &["a", "inner", "b"]).is_none());

        let rendered = render(&document);
        assert!(
            rendered.contains("outer \"a\" {\n  inner \"b\" {\n    value = 2\n  }\n}"),
            "{rendered}"
        );
    }

    #[test]
    fn large_integers_survive_merges() {
        let mut document = Document::from_text(
            r#"
resource "widget" "default" {
  obj = { n = 9223372036854775808 }
}
"#,
        )
        .expect("valid hcl");

        document.add_attribute("obj.x", 1);

        let rendered = render(&document);
        assert!(rendered.contains("n = 9223372036854775808"), "{rendered}");
        assert!(!rendered.contains("9223372036854775807"), "{rendered}");
        assert!(rendered.contains("x = 1"), "{rendered}");
    }

    #[test]
    fn add_attribute_simple() {
        let mut document = Document::from_text(
            r#"
resource "kong-mesh_mesh" "default" {
  type = "Mesh"
  name = "default"
}
"#,
        )
        .expect("valid hcl");

        document.add_attribute("skip_creating_initial_policies", vec!["*"]);

        assert_eq!(
            document.get_attribute("resource.kong-mesh_mesh.default.skip_creating_initial_policies"),
            Some(Value::Array(vec!["*".into()]))
        );
    }

    #[test]
    fn add_attribute_without_blocks_is_noop() {
        let mut document = Document::from_text("top = 1").expect("valid hcl");
        let before = render(&document);
        document.add_attribute("name", "value");
        assert_eq!(render(&document), before);
    }

    #[test]
    fn add_attribute_merges_with_existing_object() {
        let mut document = Document::from_text(
            r#"
resource "kong-mesh_mesh" "default" {
  name = "default"
  constraints = {
    dataplane_proxy = {
      requirements = [{ tags = { key = "a" } }]
    }
  }
}
"#,
        )
        .expect("valid hcl");

        document.add_attribute("constraints.dataplane_proxy.restrictions", vec!["r1"]);

        let rendered = render(&document);
        assert_eq!(rendered.matches("constraints").count(), 1, "{rendered}");

        let constraints = document
            .get_attribute("resource.kong-mesh_mesh.default.constraints")
            .expect("constraints");
        let proxy = constraints
            .as_object()
            .and_then(|c| c.get("dataplane_proxy"))
            .and_then(Value::as_object)
            .expect("dataplane_proxy");
        assert!(proxy.contains_key("requirements"));
        assert_eq!(
            proxy.get("restrictions"),
            Some(&Value::Array(vec!["r1".into()]))
        );
    }

    #[test]
    fn add_attribute_order_does_not_matter() {
        let text = r#"resource "widget" "default" {}"#;

        let mut one = Document::from_text(text).expect("valid hcl");
        one.add_attribute("a.b.c", "x");
        one.add_attribute("a.b.d", "y");

        let mut other = Document::from_text(text).expect("valid hcl");
        other.add_attribute("a.b.d", "y");
        other.add_attribute("a.b.c", "x");

        assert_eq!(render(&one), render(&other));
    }

    #[test]
    fn add_attribute_replaces_non_object() {
        let mut document =
            Document::from_text("resource \"widget\" \"default\" {\n  a = [1]\n}").expect("valid");
        document.add_attribute("a.b", 1);

        assert_eq!(
            document.get_attribute("resource.widget.default.a"),
            Some(object([("b", 1.into())]))
        );
    }

    #[test]
    fn add_attribute_keeps_references_in_merged_object() {
        let mut document = Document::from_text(
            r#"
resource "widget" "default" {
  config = {
    mesh = konnect_mesh.default.name
  }
}
"#,
        )
        .expect("valid hcl");

        document.add_attribute("config.enabled", true);

        let rendered = render(&document);
        assert!(rendered.contains("konnect_mesh.default.name"), "{rendered}");
        assert!(!rendered.contains(r#""konnect_mesh.default.name""#), "{rendered}");

        let config = document
            .get_attribute("resource.widget.default.config")
            .expect("config");
        assert_eq!(
            config,
            object([
                ("enabled", true.into()),
                ("mesh", Value::raw("konnect_mesh.default.name")),
            ])
        );
    }

    #[test]
    fn add_attribute_hcl() {
        let mut document =
            Document::from_text(r#"resource "widget" "default" {}"#).expect("valid hcl");

        document.add_attribute_hcl("skip_creating_initial_policies", r#"["*"]"#);
        document.add_attribute_hcl("routing.default_forbid_mesh_external_service_access", "true");
        document.add_attribute_hcl("constraints.dataplane_proxy.restrictions", "[]");
        document.add_attribute_hcl("cp_id", "konnect_mesh_control_plane.my_cp.id");
        document.add_attribute_hcl("timestamp", "timestamp()");
        document.add_attribute_hcl("description", "This is just text");

        let rendered = render(&document);
        assert!(rendered.contains("cp_id = konnect_mesh_control_plane.my_cp.id"), "{rendered}");
        assert!(rendered.contains("timestamp = timestamp()"), "{rendered}");
        assert!(rendered.contains(r#"description = "This is just text""#), "{rendered}");

        let get = |name: &str| document.get_attribute(&format!("resource.widget.default.{name}"));
        assert_eq!(
            get("skip_creating_initial_policies"),
            Some(Value::Array(vec!["*".into()]))
        );
        assert_eq!(
            get("routing"),
            Some(object([(
                "default_forbid_mesh_external_service_access",
                true.into()
            )]))
        );
        assert_eq!(
            get("constraints"),
            Some(object([(
                "dataplane_proxy",
                object([("restrictions", Value::Array(vec![]))])
            )]))
        );
    }

    #[test]
    fn add_attribute_by_path_selector() {
        let mut document = Document::new();
        document.set_block("resource.first.one", [("name", "1")]);
        document.set_block("resource.second.two", [("name", "2")]);

        document.add_attribute_value(
            &BlockSelector::Path("resource.second.two".to_owned()),
            "extra",
            true.into(),
        );

        assert_eq!(document.get_attribute("resource.first.one.extra"), None);
        assert_eq!(
            document.get_attribute("resource.second.two.extra"),
            Some(Value::Boolean(true))
        );
    }

    #[test]
    fn remove_attribute_value_nested() {
        let mut document = Document::from_text(
            r#"
resource "kong-mesh_mesh" "default" {
  skip_creating_initial_policies = ["*"]
  routing = {
    default_forbid_mesh_external_service_access = true
    locality_aware_load_balancing = false
  }
}
"#,
        )
        .expect("valid hcl");

        document.remove_attribute_value(
            &BlockSelector::First,
            "routing.default_forbid_mesh_external_service_access",
        );
        document.remove_attribute_value(&BlockSelector::First, "skip_creating_initial_policies");

        let rendered = render(&document);
        assert!(!rendered.contains("skip_creating_initial_policies"), "{rendered}");
        assert!(!rendered.contains("default_forbid"), "{rendered}");
        assert!(rendered.contains("locality_aware_load_balancing = false"), "{rendered}");
    }

    #[test]
    fn naming_accessors() {
        let document = Document::from_text(
            r#"
resource "konnect_mesh_control_plane" "my_meshcontrolplane" {
  name = "cp"
}
"#,
        )
        .expect("valid hcl");

        assert_eq!(document.resource_name(), "my_meshcontrolplane");
        assert_eq!(
            document.resource_path(),
            "konnect_mesh_control_plane.my_meshcontrolplane"
        );
        assert_eq!(
            document.resource_address(),
            "resource.konnect_mesh_control_plane.my_meshcontrolplane"
        );
    }

    #[test]
    fn naming_accessors_non_resource() {
        let document =
            Document::from_text("variable \"region\" {\n  default = \"x\"\n}").expect("valid");

        assert_eq!(document.resource_name(), "region");
        assert_eq!(document.resource_path(), "");
        assert_eq!(document.resource_address(), "variable.region");
    }

    #[test]
    fn naming_accessors_empty() {
        let document = Document::new();
        assert_eq!(document.resource_name(), "");
        assert_eq!(document.resource_path(), "");
        assert_eq!(document.resource_address(), "");
    }

    #[test]
    fn ids_are_unique() {
        let a = Document::new();
        let b = Document::new();
        assert_ne!(a.id(), b.id());
        assert!(a.id() < b.id());
    }
}

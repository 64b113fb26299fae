//! # hclbuilder - build hcl documents by path
//!
//! ## Introduction for developers
//!
//! Read this to understand how `hclbuilder` works internally.
//!
//! ### HCL Terms
//!
//! In hcl terms...
//! - a file gets parsed as a `body`
//! - ...which is just a list of `structures`
//! - ...where there are two kinds:
//!   - `attribute`: a "key = value" pair
//!   - or `block`:
//!     - 1 `identifier`
//!     - followed by 0 or more `labels`
//!     - and a `body` enclosed in `{` and `}`
//!
//! ```hcl
//! variable "region" {
//!   default = "us-west-2"
//! }
//!
//! resource "kong-mesh_mesh" "default" {
//!   name    = "mesh-1"
//!   routing = { default_forbid_mesh_external_service_access = true }
//! }
//! ```
//!
//! ### Loading
//!
//! Text is parsed with [hcl_edit::parser::parse_body] and converted into our own [body::Body]. Unlike
//! [hcl::Body] it lets us find, create, replace and remove blocks in place. Attribute values stay
//! [hcl::Expression]s, so references like `var.region` survive untouched.
//!
//! ### Addressing
//!
//! Everything is addressed by dot-separated paths ([path]):
//!
//! | **operation**             | **path**                          |
//! |---------------------------|-----------------------------------|
//! | [Document::set_attribute] | `variable.region.default`         |
//! | [Document::set_block]     | `resource.kong-mesh_mesh.default` |
//! | [Document::add_attribute] | `routing.enabled` (in first block) |
//!
//! Missing blocks are created on the way ([body::Body::resolve_or_create]). Paths that are too short
//! or malformed are logged and ignored.
//!
//! ### Values
//!
//! [value::Value] is what callers hand in and get back. Strings are always literals, expressions go
//! into [value::Value::Raw]. [value::Value::infer] is the opt-in way of guessing from text.
//!
//! Adding a dotted key builds a nested object (`a.b.c = v` becomes `a = { b = { c = v } }`) and deep
//! merges it into the existing attribute ([merge::merge]), so repeated calls accumulate.
//!
//! ### Composition
//!
//! [Document::add] embeds another document by reference, see [compose]. Readers and
//! [Document::remove_block] work on the composed content.
//!
//! ### Providers
//!
//! [provider] names Kong Mesh and Konnect resources after the provider (`kong-mesh_mesh`) and
//! writes the `provider` block.
//!
//! ### Output
//!
//! [Document::render] converts the tree back into [hcl::Body] and runs the canonical
//! [hcl::format] formatter. The output is stable for a given tree.
pub mod body;
pub mod compose;
pub mod document;
pub mod merge;
pub mod path;
pub mod provider;
pub mod value;

pub use document::{BlockSelector, Document, DocumentId, Error};
pub use path::PathError;
pub use provider::Provider;
pub use value::Value;

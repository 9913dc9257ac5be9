//! Field-path tree of a resource and the decomposition of conditional
//! subtrees into per-condition blocks.
//!
//! Every assignment of a [`Resource`] becomes a leaf at its path. A struct
//! subtree whose leaves are all guarded, and whose children all see the same
//! set of conditions, is rendered once per condition with each leaf reduced
//! to its value under that condition:
//!
//! ```cue
//! if parameter["cpu"] != _|_ {
//!     resources: {
//!         limits: {
//!             cpu: parameter.cpu
//!         }
//!         requests: {
//!             cpu: parameter.cpu
//!         }
//!     }
//! }
//! if parameter["memory"] != _|_ {
//!     resources: {
//!         limits: {
//!             memory: parameter.memory
//!         }
//!         requests: {
//!             memory: parameter.memory
//!         }
//!     }
//! }
//! ```
//!
//! Any other subtree renders as a plain struct with per-leaf guards.

use std::collections::BTreeSet;

use defkit_core::resource::ordered_directives;
use defkit_core::{Condition, Directive, Resource, Segment, Value};
use indexmap::IndexMap;

use crate::expr::{label, quote, Renderer};
use crate::writer::{Doc, Item};

#[derive(Debug, Clone, Default)]
struct Node<'r> {
    /// `(condition id, value)`; `None` is unconditional.
    values: Vec<(Option<usize>, &'r Value)>,
    children: IndexMap<Segment, Node<'r>>,
    directives: Vec<&'r Directive>,
}

impl<'r> Node<'r> {
    fn descend(&mut self, segments: &[Segment]) -> &mut Node<'r> {
        let mut node = self;
        for segment in segments {
            node = node.children.entry(segment.clone()).or_default();
        }
        node
    }

    fn find_mut(&mut self, segments: &[Segment]) -> Option<&mut Node<'r>> {
        let mut node = self;
        for segment in segments {
            node = node.children.get_mut(segment)?;
        }
        Some(node)
    }

    fn is_list(&self) -> bool {
        self.children.keys().any(Segment::is_index)
    }

    fn has_list(&self) -> bool {
        self.is_list() || self.children.values().any(Node::has_list)
    }

    /// Every condition id recorded anywhere in the subtree.
    fn condition_set(&self) -> BTreeSet<Option<usize>> {
        let mut set: BTreeSet<Option<usize>> = self.values.iter().map(|(id, _)| *id).collect();
        for child in self.children.values() {
            set.extend(child.condition_set());
        }
        set
    }

    /// The condition ids this subtree decomposes into, in first-seen order.
    ///
    /// The subtree must be fully conditional and free of lists, and every
    /// child must carry the same condition set as the node itself.
    fn decomposition(&self) -> Option<Vec<usize>> {
        if self.children.is_empty() || !self.values.is_empty() || self.has_list() {
            return None;
        }
        let set = self.condition_set();
        if set.is_empty() || set.contains(&None) {
            return None;
        }
        if self.children.values().any(|child| child.condition_set() != set) {
            return None;
        }
        Some(set.into_iter().flatten().collect())
    }

    fn has_conditional(&self) -> bool {
        self.values.iter().any(|(id, _)| id.is_some())
            || self.children.values().any(Node::has_conditional)
    }

    /// The subtree as seen under condition `id`: each leaf keeps the value
    /// recorded for exactly that condition, unguarded. Leaves without such a
    /// value are dropped, and so are children left empty.
    fn project(&self, id: usize) -> Option<Node<'r>> {
        let values: Vec<_> = self
            .values
            .iter()
            .filter(|(cond, _)| *cond == Some(id))
            .map(|(_, value)| (None, *value))
            .collect();
        let children: IndexMap<Segment, Node<'r>> = self
            .children
            .iter()
            .filter_map(|(segment, child)| Some((segment.clone(), child.project(id)?)))
            .collect();
        if values.is_empty() && children.is_empty() {
            return None;
        }
        Some(Node {
            values,
            children,
            directives: self.directives.clone(),
        })
    }
}

/// The path tree of one resource plus its condition table.
pub(crate) struct FieldTree<'r> {
    root: Node<'r>,
    /// Distinct conditions; the index is the condition id.
    conditions: Vec<&'r Condition>,
}

impl<'r> FieldTree<'r> {
    pub(crate) fn build(resource: &'r Resource) -> Self {
        let mut root = Node::default();
        let mut conditions: Vec<&'r Condition> = Vec::new();

        for (path, values) in resource.fields() {
            let node = root.descend(path.segments());
            for cv in values {
                let id = cv.cond.as_ref().map(|cond| {
                    match conditions.iter().position(|known| *known == cond) {
                        Some(id) => id,
                        None => {
                            conditions.push(cond);
                            conditions.len() - 1
                        }
                    }
                });
                node.values.push((id, &cv.value));
            }
        }

        for (path, directives) in resource.directives() {
            match root.find_mut(path.segments()) {
                Some(node) => node.directives.extend(ordered_directives(directives)),
                None => tracing::debug!(path = %path, "dropping directives of a path without values"),
            }
        }

        FieldTree { root, conditions }
    }

    pub(crate) fn items(&self, r: &mut Renderer<'_>) -> Vec<Item> {
        self.struct_items(&self.root, r)
    }

    fn struct_items(&self, node: &Node<'r>, r: &mut Renderer<'_>) -> Vec<Item> {
        let mut items = Vec::new();
        for (segment, child) in &node.children {
            match segment {
                Segment::Field(name) => self.field(name, child, r, &mut items),
                Segment::Index(index) => {
                    panic!("list index [{}] mixed with named fields", index)
                }
            }
        }
        items
    }

    fn field(&self, name: &str, node: &Node<'r>, r: &mut Renderer<'_>, items: &mut Vec<Item>) {
        items.extend(node.directives.iter().map(|d| Item::Comment(d.text())));

        if let Some(ids) = node.decomposition() {
            tracing::debug!(field = name, blocks = ids.len(), "decomposing conditional subtree");
            for id in ids {
                let Some(projected) = node.project(id) else {
                    continue;
                };
                let body = Item::field(label(name), Doc::block(self.struct_items(&projected, r)));
                match r.cond(self.conditions[id]) {
                    Some(cond) => items.push(Item::guarded(&cond, vec![body])),
                    None => items.push(body),
                }
            }
            return;
        }
        if !node.children.is_empty() && node.has_conditional() {
            tracing::trace!(field = name, "conditional subtree kept as a plain struct");
        }

        for (id, value) in &node.values {
            let item = Item::Field {
                label: label(name),
                value: r.value(value),
                align: matches!(value, Value::Literal(_)) && node.children.is_empty(),
            };
            match id.and_then(|id| r.cond(self.conditions[id])) {
                Some(cond) => items.push(Item::guarded(&cond, vec![item])),
                None => items.push(item),
            }
        }

        if !node.children.is_empty() {
            let value = if node.is_list() {
                self.list(name, node, r)
            } else {
                Doc::block(self.struct_items(node, r))
            };
            items.push(Item::field(label(name), value));
        }
    }

    /// # Panics
    ///
    /// Panics on index gaps and on lists mixing index and field segments.
    fn list(&self, name: &str, node: &Node<'r>, r: &mut Renderer<'_>) -> Doc {
        let mut indexed: Vec<(usize, &Node<'r>)> = node
            .children
            .iter()
            .map(|(segment, child)| match segment {
                Segment::Index(index) => (*index, child),
                Segment::Field(field) => panic!(
                    "'{}' is used both as a list and as a struct with field '{}'",
                    name, field
                ),
            })
            .collect();
        indexed.sort_by_key(|(index, _)| *index);

        for (expected, (index, _)) in indexed.iter().enumerate() {
            if *index != expected {
                panic!("list '{}' has no element at index {}", name, expected);
            }
        }

        // A single struct element hugs the brackets: `[{ ... }]`.
        if let [(_, only)] = indexed.as_slice() {
            if only.values.is_empty() && !only.is_list() {
                return Doc::Block {
                    open: "[{".to_owned(),
                    items: self.struct_items(only, r),
                    close: "}]".to_owned(),
                };
            }
        }

        let items = indexed
            .iter()
            .map(|(index, element)| Item::Element(self.element(name, *index, element, r)))
            .collect();
        Doc::Block {
            open: "[".to_owned(),
            items,
            close: "]".to_owned(),
        }
    }

    fn element(&self, name: &str, index: usize, node: &Node<'r>, r: &mut Renderer<'_>) -> Doc {
        if node.values.iter().any(|(id, _)| id.is_some()) {
            panic!("list element {}[{}] cannot hold conditional values", name, index);
        }
        match node.values.last() {
            Some(_) if !node.children.is_empty() => {
                panic!("list element {}[{}] has both a value and fields", name, index)
            }
            Some((_, value)) => r.value(value),
            None if node.is_list() => self.list(name, node, r),
            None => Doc::block(self.struct_items(node, r)),
        }
    }
}

/// The `apiVersion`/`kind` header followed by the field tree.
pub(crate) fn resource_items(resource: &Resource, r: &mut Renderer<'_>) -> Vec<Item> {
    let mut items = Vec::new();
    if let Some(api_version) = resource.api_version() {
        items.push(Item::aligned("apiVersion", Doc::Inline(quote(api_version))));
    }
    if let Some(kind) = resource.kind() {
        items.push(Item::aligned("kind", Doc::Inline(quote(kind))));
    }
    items.extend(FieldTree::build(resource).items(r));
    items
}

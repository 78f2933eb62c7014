//! Category tree editing and validation.
//!
//! A category is a node with an ordered, unbounded list of same-shaped
//! children. The form edits one tree at a time: rows are appended and removed
//! by path, and the whole tree is validated before it is sent.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{FieldError, TreeError, ValidationErrors};

/// Wire name of the children list.
pub const CHILDREN_KEY: &str = "sub_category";

/// One category and its subcategories.
///
/// `id` is `0` until the server has persisted the node; `parent_id` is `None`
/// for a root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryNode {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub business_id: i64,
    #[serde(
        default,
        rename = "sub_category",
        deserialize_with = "null_as_empty"
    )]
    pub children: Vec<CategoryNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<CategoryNode>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<CategoryNode>>::deserialize(deserializer)?.unwrap_or_default())
}

impl CategoryNode {
    /// The form default for a new category: blank name and a single blank
    /// subcategory row.
    #[must_use]
    pub fn new_root(business_id: i64) -> Self {
        let mut root = Self::blank(None, business_id);
        append(&mut root);
        root
    }

    fn blank(parent_id: Option<i64>, business_id: i64) -> Self {
        Self {
            id: 0,
            name: String::new(),
            parent_id,
            business_id,
            children: Vec::new(),
            created_by: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[must_use]
    pub fn is_persisted(&self) -> bool {
        self.id != 0
    }

    /// Longest root-to-leaf chain, counting the root as 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(self, 1usize)];
        while let Some((node, depth)) = stack.pop() {
            max = max.max(depth);
            stack.extend(node.children.iter().map(|c| (c, depth + 1)));
        }
        max
    }

    /// Total number of nodes including the root.
    #[must_use]
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }

    /// Returns the node addressed by `path` (child indexes from the root).
    #[must_use]
    pub fn node_at(&self, path: &[usize]) -> Option<&CategoryNode> {
        path.iter()
            .try_fold(self, |node, &index| node.children.get(index))
    }

    pub fn node_at_mut(&mut self, path: &[usize]) -> Option<&mut CategoryNode> {
        path.iter()
            .try_fold(self, |node, &index| node.children.get_mut(index))
    }
}

/// Validates every node of the tree.
///
/// A node is valid iff its name is non-blank; all blank names are reported
/// together. Traversal is iterative so depth is bounded only by memory.
///
/// # Errors
///
/// - [`TreeError::Cycle`] if a persisted id repeats along a root-to-leaf path.
/// - [`TreeError::Invalid`] listing every blank name by dotted path.
pub fn validate(node: &CategoryNode) -> Result<(), TreeError> {
    let mut errors = Vec::new();
    let mut path_ids: Vec<Option<i64>> = Vec::new();
    let mut on_path: HashSet<i64> = HashSet::new();
    let mut stack = vec![(node, String::new(), 0usize)];

    while let Some((current, prefix, depth)) = stack.pop() {
        for id in path_ids.drain(depth..).flatten() {
            on_path.remove(&id);
        }

        if current.is_persisted() {
            if !on_path.insert(current.id) {
                return Err(TreeError::Cycle {
                    id: current.id,
                    path: field_path(&prefix, "id"),
                });
            }
            path_ids.push(Some(current.id));
        } else {
            path_ids.push(None);
        }

        if current.name.trim().is_empty() {
            errors.push(FieldError::new(
                field_path(&prefix, "name"),
                "Name is required.",
            ));
        }

        for (index, child) in current.children.iter().enumerate().rev() {
            let child_prefix = field_path(&prefix, &format!("{CHILDREN_KEY}.{index}"));
            stack.push((child, child_prefix, depth + 1));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(TreeError::Invalid(ValidationErrors(errors)))
    }
}

fn field_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{prefix}.{field}")
    }
}

/// Appends a blank child row to `node`.
pub fn append(node: &mut CategoryNode) {
    let parent_id = node.is_persisted().then_some(node.id);
    node.children
        .push(CategoryNode::blank(parent_id, node.business_id));
}

/// Removes the child at `index` from the form's top-level row list.
///
/// Row 0 is never removed so the form always keeps one editable row.
/// Returns the removed node, or `None` when nothing changed.
pub fn remove(node: &mut CategoryNode, index: usize) -> Option<CategoryNode> {
    if index == 0 || index >= node.children.len() {
        return None;
    }
    Some(node.children.remove(index))
}

/// Appends a blank child under the node addressed by `path`.
///
/// Returns `false` when the path does not resolve.
pub fn append_at(root: &mut CategoryNode, path: &[usize]) -> bool {
    match root.node_at_mut(path) {
        Some(node) => {
            append(node);
            true
        }
        None => false,
    }
}

/// Removes child `index` of the node addressed by `path`.
///
/// The empty path applies the top-level rule of [`remove`]; nested lists may
/// be emptied entirely.
pub fn remove_at(root: &mut CategoryNode, path: &[usize], index: usize) -> Option<CategoryNode> {
    if path.is_empty() {
        return remove(root, index);
    }
    let node = root.node_at_mut(path)?;
    (index < node.children.len()).then(|| node.children.remove(index))
}

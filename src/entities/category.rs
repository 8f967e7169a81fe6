// 🏷️ Category Entity - Hierarchical categories
//
// Structure comes from parent_id (self-referential):
// - Utilities
//   - Electricity
//   - Internet
//
// The schema declares the parent reference but does not check it on insert,
// so a tree built from stored rows must tolerate missing parents and cycles.

use crate::db::{nullable, Assignments, Store};
use crate::error::Result;
use rusqlite::types::Value;
use rusqlite::{params, Row};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// ============================================================================
// CATEGORY ROW
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    /// Root categories have no parent
    pub parent_id: Option<i64>,
}

impl Category {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Category {
            id: row.get(0)?,
            name: row.get(1)?,
            parent_id: row.get(2)?,
        })
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Partial update. `parent_id: Some(None)` moves the category to the root.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub parent_id: Option<Option<i64>>,
}

impl CategoryPatch {
    fn assignments(&self) -> Assignments {
        let mut set = Assignments::new();
        set.set("name", self.name.clone().map(Value::from))
            .set("parent_id", self.parent_id.map(nullable));
        set
    }
}

// ============================================================================
// STORE OPERATIONS
// ============================================================================

impl Store {
    pub fn create_category(&self, name: &str, parent_id: Option<i64>) -> Result<i64> {
        let id = self.insert(
            "INSERT INTO categories (name, parent_id) VALUES (?1, ?2)",
            params![name, parent_id],
        )?;
        log::debug!("categories: created id {} ('{}', parent {:?})", id, name, parent_id);
        Ok(id)
    }

    pub fn list_categories(&self) -> Result<Vec<Category>> {
        self.query(
            "SELECT id, name, parent_id FROM categories ORDER BY id",
            [],
            Category::from_row,
        )
    }

    pub fn get_category(&self, id: i64) -> Result<Option<Category>> {
        self.query_one(
            "SELECT id, name, parent_id FROM categories WHERE id = ?1",
            params![id],
            Category::from_row,
        )
    }

    pub fn update_category(&self, id: i64, patch: &CategoryPatch) -> Result<usize> {
        self.update_columns("categories", id, patch.assignments())
    }

    pub fn delete_category(&self, id: i64) -> Result<usize> {
        self.delete_row(
            "category",
            "categories",
            id,
            &[
                ("categories", "parent_id"),
                ("transactions", "category_id"),
                ("recurring", "category_id"),
            ],
        )
    }

    /// Snapshot of the current hierarchy
    pub fn category_tree(&self) -> Result<CategoryTree> {
        Ok(CategoryTree::from_categories(self.list_categories()?))
    }
}

// ============================================================================
// CATEGORY TREE
// ============================================================================

/// In-memory view of the category hierarchy, rebuilt on demand from rows
#[derive(Debug, Clone, Default)]
pub struct CategoryTree {
    categories: Vec<Category>,
    by_id: HashMap<i64, usize>,
}

impl CategoryTree {
    pub fn from_categories(categories: Vec<Category>) -> Self {
        let by_id = categories
            .iter()
            .enumerate()
            .map(|(idx, c)| (c.id, idx))
            .collect();
        CategoryTree { categories, by_id }
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&Category> {
        self.by_id.get(&id).map(|&idx| &self.categories[idx])
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Categories without a parent
    pub fn roots(&self) -> Vec<&Category> {
        self.categories.iter().filter(|c| c.is_root()).collect()
    }

    pub fn children(&self, parent_id: i64) -> Vec<&Category> {
        self.categories
            .iter()
            .filter(|c| c.parent_id == Some(parent_id))
            .collect()
    }

    /// Parent row, or None for roots and for dangling parent ids
    pub fn parent(&self, category: &Category) -> Option<&Category> {
        category.parent_id.and_then(|pid| self.get(pid))
    }

    /// Chain from the outermost reachable ancestor down to `id`.
    /// Stops at a missing parent or when a cycle is detected.
    pub fn ancestry(&self, id: i64) -> Vec<&Category> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = self.get(id);

        while let Some(category) = current {
            if !seen.insert(category.id) {
                break;
            }
            chain.push(category);
            current = self.parent(category);
        }

        chain.reverse();
        chain
    }

    pub fn path(&self, id: i64) -> Vec<String> {
        self.ancestry(id).into_iter().map(|c| c.name.clone()).collect()
    }

    /// e.g. "Utilities > Internet"
    pub fn path_string(&self, id: i64) -> String {
        self.path(id).join(" > ")
    }

    /// Outermost reachable ancestor (the category itself for roots)
    pub fn root_of(&self, id: i64) -> Option<&Category> {
        self.ancestry(id).into_iter().next()
    }

    /// Number of ancestors above `id` (0 for a root)
    pub fn depth(&self, id: i64) -> usize {
        self.ancestry(id).len().saturating_sub(1)
    }

    /// Every category below `id`, breadth first
    pub fn descendants(&self, id: i64) -> Vec<&Category> {
        let mut found = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut queue = vec![id];

        while let Some(parent) = queue.pop() {
            for child in self.children(parent) {
                if seen.insert(child.id) {
                    found.push(child);
                    queue.insert(0, child.id);
                }
            }
        }

        found
    }

    pub fn is_ancestor(&self, ancestor_id: i64, descendant_id: i64) -> bool {
        ancestor_id != descendant_id
            && self
                .ancestry(descendant_id)
                .iter()
                .any(|c| c.id == ancestor_id)
    }
}

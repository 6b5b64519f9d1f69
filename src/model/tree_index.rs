//! 行/父索引寻址：把 (row, parent) 映射到影子树节点，供树形控件懒加载使用
//!
//! 索引不单独存储，全部由 parent/children 关系即时推导。

use crate::model::shadow_tree::{NodeId, ShadowTree};

/// 树形控件使用的模型索引；`ModelIndex::invalid()` 代表顶层（根的父级）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ModelIndex {
    row: usize,
    node: Option<NodeId>,
    generation: u64,
}

impl ModelIndex {
    pub const fn invalid() -> Self {
        Self {
            row: 0,
            node: None,
            generation: 0,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.node.is_some()
    }

    pub fn row(&self) -> usize {
        self.row
    }

    /// 单列树
    pub fn column(&self) -> usize {
        0
    }

    pub fn node(&self) -> Option<NodeId> {
        self.node
    }
}

impl ShadowTree {
    fn create_index(&self, row: usize, node: NodeId) -> ModelIndex {
        ModelIndex {
            row,
            node: Some(node),
            generation: self.generation(),
        }
    }

    /// 解析索引；清空之前创建的索引不再解析
    pub fn resolve(&self, index: &ModelIndex) -> Option<NodeId> {
        let node = index.node?;
        if index.generation != self.generation() {
            return None;
        }
        self.get(node).map(|_| node)
    }

    /// 按 (row, column, parent) 取子索引，越界返回 invalid
    pub fn index(&self, row: usize, column: usize, parent: &ModelIndex) -> ModelIndex {
        if column != 0 {
            return ModelIndex::invalid();
        }
        if !parent.is_valid() {
            return match self.root() {
                Some(root) if row == 0 => self.create_index(0, root),
                _ => ModelIndex::invalid(),
            };
        }
        self.resolve(parent)
            .and_then(|p| self.children(p).get(row).copied())
            .map(|child| self.create_index(row, child))
            .unwrap_or_default()
    }

    /// 子索引的父索引；行号按父节点在祖父 children 中的实际位置推导
    pub fn parent_index(&self, child: &ModelIndex) -> ModelIndex {
        self.resolve(child)
            .and_then(|node| self.parent(node))
            .map(|parent| self.index_of(parent))
            .unwrap_or_default()
    }

    /// 节点自身的索引
    pub fn index_of(&self, node: NodeId) -> ModelIndex {
        match self.position_in_parent(node) {
            Some(row) => self.create_index(row, node),
            None => ModelIndex::invalid(),
        }
    }

    pub fn root_index(&self) -> ModelIndex {
        self.index(0, 0, &ModelIndex::invalid())
    }

    pub fn row_count(&self, parent: &ModelIndex) -> usize {
        if !parent.is_valid() {
            return usize::from(self.root().is_some());
        }
        self.resolve(parent)
            .map(|p| self.children(p).len())
            .unwrap_or(0)
    }

    pub fn column_count(&self) -> usize {
        1
    }

    pub fn has_children(&self, parent: &ModelIndex) -> bool {
        self.row_count(parent) > 0
    }

    /// 显示文本
    pub fn data(&self, index: &ModelIndex) -> Option<&str> {
        let node = self.resolve(index)?;
        self.get(node).map(|n| n.label.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::shadow_tree::NodeKind;

    fn build() -> ShadowTree {
        let mut tree = ShadowTree::new();
        let root = tree.create_root("array [3]", NodeKind::Array);
        tree.append_child(root, "0 : 1", NodeKind::Number, Some("0".into()))
            .unwrap();
        let nested = tree
            .append_child(root, "1 [1]", NodeKind::Array, Some("1".into()))
            .unwrap();
        tree.append_child(nested, "0 : true", NodeKind::Bool, Some("0".into()))
            .unwrap();
        tree.append_child(root, "2 : null", NodeKind::Null, Some("2".into()))
            .unwrap();
        tree
    }

    #[test]
    fn test_top_level_only_row_zero() {
        let tree = build();
        let top = ModelIndex::invalid();

        assert_eq!(tree.row_count(&top), 1);
        assert!(tree.index(0, 0, &top).is_valid());
        assert!(!tree.index(1, 0, &top).is_valid());
        assert!(!tree.index(0, 1, &top).is_valid(), "只有第0列");
    }

    #[test]
    fn test_child_lookup_and_out_of_range() {
        let tree = build();
        let root = tree.root_index();

        assert_eq!(tree.row_count(&root), 3);
        assert_eq!(tree.data(&tree.index(2, 0, &root)), Some("2 : null"));
        assert_eq!(tree.index(3, 0, &root), ModelIndex::invalid());
        assert_eq!(tree.data(&ModelIndex::invalid()), None);
    }

    #[test]
    fn test_parent_row_is_actual_position() {
        let tree = build();
        let root = tree.root_index();
        let nested = tree.index(1, 0, &root);
        let leaf = tree.index(0, 0, &nested);

        let parent = tree.parent_index(&leaf);
        assert_eq!(parent, nested);
        assert_eq!(parent.row(), 1, "父行号应为其在祖父中的实际位置");

        let top = tree.parent_index(&nested);
        assert_eq!(top, root);
        assert_eq!(top.row(), 0);

        assert!(!tree.parent_index(&root).is_valid(), "根节点的父级为顶层");
    }

    #[test]
    fn test_stale_index_after_clear() {
        let mut tree = build();
        let root = tree.root_index();
        tree.clear();
        tree.create_root("object {0}", NodeKind::Object);

        assert_eq!(tree.resolve(&root), None);
        assert_eq!(tree.row_count(&root), 0);
        assert_eq!(tree.data(&root), None);
    }

    #[test]
    fn test_empty_tree_counts() {
        let tree = ShadowTree::new();

        assert_eq!(tree.row_count(&ModelIndex::invalid()), 0);
        assert!(!tree.root_index().is_valid());
        assert_eq!(tree.column_count(), 1);
    }
}

//! 展开/折叠状态：属于 UI 协作方的视图状态，只通过 row_count/index 遍历模型
//!
//! 所有遍历都使用显式栈，深层文档不受调用栈限制。

use std::collections::HashSet;

use crate::model::data_core::JsonModel;
use crate::model::shadow_tree::NodeId;
use crate::model::tree_index::ModelIndex;

/// 当前可见的一行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleRow {
    pub index: ModelIndex,
    pub depth: usize,
    pub label: String,
    pub has_children: bool,
    pub expanded: bool,
}

#[derive(Debug, Default, Clone)]
pub struct ExpansionState {
    expanded: HashSet<NodeId>,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 重新加载文档后调用，旧节点 id 全部作废
    pub fn reset(&mut self) {
        self.expanded.clear();
    }

    pub fn expanded_count(&self) -> usize {
        self.expanded.len()
    }

    pub fn is_expanded(&self, model: &JsonModel, index: &ModelIndex) -> bool {
        model
            .node_of(index)
            .is_some_and(|node| self.expanded.contains(&node))
    }

    /// 展开单个节点；叶子节点无可展开内容，返回 false
    pub fn expand(&mut self, model: &JsonModel, index: &ModelIndex) -> bool {
        match model.node_of(index) {
            Some(node) if model.has_children(index) => self.expanded.insert(node),
            _ => false,
        }
    }

    pub fn collapse(&mut self, model: &JsonModel, index: &ModelIndex) -> bool {
        model
            .node_of(index)
            .is_some_and(|node| self.expanded.remove(&node))
    }

    /// 切换展开状态，返回切换后的状态
    pub fn toggle(&mut self, model: &JsonModel, index: &ModelIndex) -> bool {
        if self.is_expanded(model, index) {
            self.collapse(model, index);
            false
        } else {
            self.expand(model, index)
        }
    }

    pub fn expand_all(&mut self, model: &JsonModel, index: &ModelIndex) {
        for idx in subtree(model, index) {
            self.expand(model, &idx);
        }
    }

    pub fn collapse_all(&mut self, model: &JsonModel, index: &ModelIndex) {
        for idx in subtree(model, index) {
            self.collapse(model, &idx);
        }
    }

    /// 子树中所有带子节点的节点都已展开（叶子视为已展开）
    pub fn is_tree_expanded(&self, model: &JsonModel, index: &ModelIndex) -> bool {
        subtree(model, index)
            .into_iter()
            .filter(|idx| model.has_children(idx))
            .all(|idx| self.is_expanded(model, &idx))
    }

    /// 节点本身未展开，或子树中还有带子节点的节点未展开
    pub fn is_tree_collapsed(&self, model: &JsonModel, index: &ModelIndex) -> bool {
        if !self.is_expanded(model, index) {
            return true;
        }
        subtree(model, index)
            .into_iter()
            .skip(1)
            .filter(|idx| model.has_children(idx))
            .any(|idx| !self.is_expanded(model, &idx))
    }

    /// 先序列出所有祖先均已展开的行（根节点总是可见）
    pub fn visible_rows(&self, model: &JsonModel) -> Vec<VisibleRow> {
        let mut rows = Vec::new();
        let root = model.root_index();
        if !root.is_valid() {
            return rows;
        }

        let mut pending = vec![(root, 0usize)];
        while let Some((idx, depth)) = pending.pop() {
            let expanded = self.is_expanded(model, &idx);
            rows.push(VisibleRow {
                index: idx,
                depth,
                label: model.data(&idx).unwrap_or_default().to_string(),
                has_children: model.has_children(&idx),
                expanded,
            });
            if expanded {
                for row in (0..model.row_count(&idx)).rev() {
                    pending.push((model.index(row, 0, &idx), depth + 1));
                }
            }
        }
        rows
    }
}

/// 先序收集 index 及其全部后代
fn subtree(model: &JsonModel, index: &ModelIndex) -> Vec<ModelIndex> {
    let mut out = Vec::new();
    if !index.is_valid() {
        return out;
    }
    let mut pending = vec![*index];
    while let Some(idx) = pending.pop() {
        for row in (0..model.row_count(&idx)).rev() {
            pending.push(model.index(row, 0, &idx));
        }
        out.push(idx);
    }
    out
}

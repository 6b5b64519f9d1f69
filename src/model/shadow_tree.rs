//! 影子树（Shadow Tree）：节点竞技场（arena），保存标签与父子关系
//!
//! 节点按 `NodeId` 寻址，父节点持有有序的子节点 id 列表，子节点只记录父 id。
//! 清空时整体释放并递增 generation，旧的索引不会再解析到新树上的节点。

use serde::Serialize;

use crate::model::data_core::ViewerError;

/// 节点在竞技场中的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// JSON 节点类型（与 UI 展示解耦）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeKind {
    Object,
    Array,
    String,
    Number,
    Bool,
    Null,
    /// 值位置上没有识别出任何记号（宽松解析的产物）
    Unknown,
}

impl NodeKind {
    pub fn is_container(self) -> bool {
        matches!(self, NodeKind::Object | NodeKind::Array)
    }
}

#[derive(Debug, Clone)]
pub struct TreeNode {
    /// 展示文本；容器节点在闭合后改写一次
    pub label: String,
    /// 节点在父级中的键名或数组下标；顶层值与空键为 None
    pub key: Option<String>,
    /// 按 JSON 规则解码后的对象键，生成 JSONPath 时优先使用
    pub member_name: Option<String>,
    /// 节点类型
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    /// 文档顺序
    pub children: Vec<NodeId>,
    /// 节点深度（根为 0）
    pub depth: u32,
}

#[derive(Debug, Default)]
pub struct ShadowTree {
    nodes: Vec<TreeNode>,
    root: Option<NodeId>,
    generation: u64,
}

impl ShadowTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建根节点；已有根时先整体清空（静默替换）
    pub fn create_root(&mut self, label: impl Into<String>, kind: NodeKind) -> NodeId {
        if self.root.is_some() {
            tracing::warn!("根节点已存在，旧树将被替换");
            self.clear();
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(TreeNode {
            label: label.into(),
            key: None,
            member_name: None,
            kind,
            parent: None,
            children: Vec::new(),
            depth: 0,
        });
        self.root = Some(id);
        id
    }

    /// 在 parent 的子节点末尾追加新节点
    pub fn append_child(
        &mut self,
        parent: NodeId,
        label: impl Into<String>,
        kind: NodeKind,
        key: Option<String>,
    ) -> Result<NodeId, ViewerError> {
        let id = NodeId(self.nodes.len());
        let parent_node = self.get_mut(parent)?;
        parent_node.children.push(id);
        let depth = parent_node.depth + 1;
        self.nodes.push(TreeNode {
            label: label.into(),
            key,
            member_name: None,
            kind,
            parent: Some(parent),
            children: Vec::new(),
            depth,
        });
        Ok(id)
    }

    /// 原地改写标签（仅用于容器闭合后写入子元素数量）
    pub fn relabel(&mut self, node: NodeId, label: impl Into<String>) -> Result<(), ViewerError> {
        self.get_mut(node)?.label = label.into();
        Ok(())
    }

    pub fn set_member_name(&mut self, node: NodeId, name: String) -> Result<(), ViewerError> {
        self.get_mut(node)?.member_name = Some(name);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn get(&self, node: NodeId) -> Option<&TreeNode> {
        self.nodes.get(node.0)
    }

    fn get_mut(&mut self, node: NodeId) -> Result<&mut TreeNode, ViewerError> {
        self.nodes
            .get_mut(node.0)
            .ok_or(ViewerError::NodeNotFound(node.0))
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.get(node).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.get(node).and_then(|n| n.parent)
    }

    /// 节点在其父级 children 中的实际位置；根节点位于唯一的顶层行 0
    pub fn position_in_parent(&self, node: NodeId) -> Option<usize> {
        let entry = self.get(node)?;
        match entry.parent {
            None => (self.root == Some(node)).then_some(0),
            Some(parent) => self.children(parent).iter().position(|&c| c == node),
        }
    }

    /// 为节点生成 JSONPath（用于精确寻址与子树提取）
    pub fn json_path(&self, node: NodeId) -> Option<String> {
        let mut segments = Vec::new();
        let mut current = node;
        loop {
            let entry = self.get(current)?;
            let Some(parent) = entry.parent else { break };
            let parent_kind = self.get(parent)?.kind;
            let segment = if parent_kind == NodeKind::Array {
                format!("[{}]", entry.key.as_deref().unwrap_or(""))
            } else {
                let name = entry
                    .member_name
                    .as_deref()
                    .or(entry.key.as_deref())
                    .unwrap_or("");
                name_segment(name)
            };
            segments.push(segment);
            current = parent;
        }
        let mut path = String::from("$");
        for segment in segments.iter().rev() {
            path.push_str(segment);
        }
        Some(path)
    }
}

/// 成员名可用 `.name` 简写时直接拼接，否则写成单引号 bracket-notation
fn name_segment(name: &str) -> String {
    let mut chars = name.chars();
    let shorthand = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if shorthand {
        return format!(".{}", name);
    }

    let mut segment = String::with_capacity(name.len() + 4);
    segment.push_str("['");
    for c in name.chars() {
        match c {
            '\'' => segment.push_str("\\'"),
            '\\' => segment.push_str("\\\\"),
            '\u{0008}' => segment.push_str("\\b"),
            '\u{000C}' => segment.push_str("\\f"),
            '\n' => segment.push_str("\\n"),
            '\r' => segment.push_str("\\r"),
            '\t' => segment.push_str("\\t"),
            c if c < '\u{0020}' => segment.push_str(&format!("\\u{:04x}", c as u32)),
            c => segment.push(c),
        }
    }
    segment.push_str("']");
    segment
}

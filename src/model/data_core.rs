//! JsonModel：树模型门面（加载、查询、清空）与严格模式下的 JSONPath 提取

use std::path::{Path, PathBuf};

use jsonpath_rust::JsonPath;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::model::observer::{NoopObserver, TreeObserver};
use crate::model::parser::{LenientParser, ParserConfig};
use crate::model::shadow_tree::{NodeId, NodeKind, ShadowTree};
use crate::model::tree_index::ModelIndex;
use crate::utils::fs::read_document;

#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("IO失败: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON解析失败: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("JSONPath错误: {0}")]
    JsonPath(String),
    #[error("状态错误: {0}")]
    State(String),
    #[error("文档为空或只包含空白字符")]
    EmptyDocument,
    #[error("嵌套层数超过上限 {max}")]
    DepthExceeded { max: usize },
    #[error("节点不存在: {0}")]
    NodeNotFound(usize),
}

/// 节点快照（与 UI 展示解耦，可序列化输出）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeSnapshot {
    pub label: String,
    pub key: Option<String>,
    /// RFC 9535 JSONPath
    pub path: String,
    pub kind: NodeKind,
    pub children: u32,
    pub depth: u32,
}

pub struct JsonModel {
    tree: ShadowTree,
    config: ParserConfig,
    /// 严格模式加载时保留的 DOM，用于子树提取
    dom: Option<Value>,
    source_path: Option<PathBuf>,
    observer: Box<dyn TreeObserver>,
}

impl Default for JsonModel {
    fn default() -> Self {
        Self::with_config(ParserConfig::default())
    }
}

impl JsonModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            tree: ShadowTree::new(),
            config,
            dom: None,
            source_path: None,
            observer: Box::new(NoopObserver),
        }
    }

    /// 替换观察者，返回旧的观察者
    pub fn set_observer(&mut self, observer: Box<dyn TreeObserver>) -> Box<dyn TreeObserver> {
        std::mem::replace(&mut self.observer, observer)
    }

    pub fn take_observer(&mut self) -> Box<dyn TreeObserver> {
        self.set_observer(Box::new(NoopObserver))
    }

    /// 宽松加载；只有空文档（或超过嵌套上限）时返回 false
    pub fn load_json(&mut self, bytes: &[u8]) -> bool {
        self.try_load_json(bytes).is_ok()
    }

    /// 宽松加载，失败时给出具体原因
    pub fn try_load_json(&mut self, bytes: &[u8]) -> Result<(), ViewerError> {
        self.clear();
        let text = String::from_utf8_lossy(bytes);
        if text.trim_start().is_empty() {
            tracing::warn!("文档为空，跳过加载");
            return Err(ViewerError::EmptyDocument);
        }

        self.observer.model_reset_begin();
        let result =
            LenientParser::new(&text, &mut self.tree, &mut *self.observer, self.config).parse();
        self.observer.model_reset_end();

        match result {
            Ok(_) => {
                tracing::info!("JSON加载完成: {} 个节点，{} 字节", self.tree.len(), bytes.len());
                Ok(())
            }
            Err(e) => {
                tracing::error!("JSON加载失败: {}", e);
                self.clear();
                Err(e)
            }
        }
    }

    /// 严格加载：先用 serde_json 校验，不合法时保持当前树不变
    pub fn load_json_strict(&mut self, bytes: &[u8]) -> Result<(), ViewerError> {
        let dom = parse_dom(bytes).map_err(|e| {
            tracing::warn!("JSON格式不正确，保持当前树: {}", e);
            e
        })?;
        self.try_load_json(bytes)?;
        self.dom = Some(dom);
        Ok(())
    }

    /// 从文件宽松加载
    pub fn load_file(&mut self, p: &Path) -> Result<(), ViewerError> {
        let bytes = read_document(p)?;
        self.try_load_json(&bytes)?;
        self.source_path = Some(p.to_path_buf());
        Ok(())
    }

    /// 从文件严格加载
    pub fn load_file_strict(&mut self, p: &Path) -> Result<(), ViewerError> {
        let bytes = read_document(p)?;
        self.load_json_strict(&bytes)?;
        self.source_path = Some(p.to_path_buf());
        Ok(())
    }

    pub fn clear(&mut self) {
        self.observer.model_reset_begin();
        self.tree.clear();
        self.dom = None;
        self.source_path = None;
        self.observer.model_reset_end();
    }

    /// 线性查找直接子节点中是否有完全相同的标签
    pub fn has_element(&self, parent: &ModelIndex, text: &str) -> bool {
        (0..self.row_count(parent))
            .map(|row| self.index(row, 0, parent))
            .any(|idx| self.data(&idx) == Some(text))
    }

    pub fn index(&self, row: usize, column: usize, parent: &ModelIndex) -> ModelIndex {
        self.tree.index(row, column, parent)
    }

    pub fn parent(&self, child: &ModelIndex) -> ModelIndex {
        self.tree.parent_index(child)
    }

    pub fn row_count(&self, parent: &ModelIndex) -> usize {
        self.tree.row_count(parent)
    }

    pub fn column_count(&self) -> usize {
        self.tree.column_count()
    }

    pub fn has_children(&self, parent: &ModelIndex) -> bool {
        self.tree.has_children(parent)
    }

    pub fn data(&self, index: &ModelIndex) -> Option<&str> {
        self.tree.data(index)
    }

    pub fn root_index(&self) -> ModelIndex {
        self.tree.root_index()
    }

    pub fn node_of(&self, index: &ModelIndex) -> Option<NodeId> {
        self.tree.resolve(index)
    }

    pub fn tree(&self) -> &ShadowTree {
        &self.tree
    }

    pub fn node_count(&self) -> usize {
        self.tree.len()
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    pub fn is_strict(&self) -> bool {
        self.dom.is_some()
    }

    pub fn snapshot(&self, index: &ModelIndex) -> Option<NodeSnapshot> {
        let node = self.tree.resolve(index)?;
        let entry = self.tree.get(node)?;
        Some(NodeSnapshot {
            label: entry.label.clone(),
            key: entry.key.clone(),
            path: self.tree.json_path(node)?,
            kind: entry.kind,
            children: entry.children.len() as u32,
            depth: entry.depth,
        })
    }

    /// 按文档顺序（先序）导出全部节点快照
    pub fn snapshots(&self) -> Vec<NodeSnapshot> {
        let mut out = Vec::with_capacity(self.tree.len());
        let mut pending: Vec<ModelIndex> = vec![self.root_index()];
        while let Some(idx) = pending.pop() {
            let Some(snapshot) = self.snapshot(&idx) else { continue };
            out.push(snapshot);
            for row in (0..self.row_count(&idx)).rev() {
                pending.push(self.index(row, 0, &idx));
            }
        }
        out
    }

    /// 按节点的 JSONPath 提取严格 DOM 中对应子树的 pretty 字符串
    pub fn extract_subtree_pretty(&self, index: &ModelIndex) -> Result<String, ViewerError> {
        let dom = self
            .dom
            .as_ref()
            .ok_or_else(|| ViewerError::State("DOM尚未加载（需要严格模式）".into()))?;
        let node = self
            .tree
            .resolve(index)
            .ok_or_else(|| ViewerError::State("索引无效".into()))?;
        let json_path = self
            .tree
            .json_path(node)
            .ok_or(ViewerError::NodeNotFound(node.index()))?;

        let hits: Vec<&Value> = dom
            .query(&json_path)
            .map_err(|e| ViewerError::JsonPath(e.to_string()))?;
        let first = hits
            .into_iter()
            .next()
            .ok_or_else(|| ViewerError::JsonPath(format!("未匹配到任何节点: {}", json_path)))?;
        Ok(serde_json::to_string_pretty(first)?)
    }
}

/// 严格解析为 DOM：不设 serde_json 的递归上限，深层嵌套由 serde_stacker 按需扩栈
fn parse_dom(bytes: &[u8]) -> Result<Value, serde_json::Error> {
    let mut de = serde_json::Deserializer::from_slice(bytes);
    de.disable_recursion_limit();
    let dom = Value::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(dom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::observer::{ObserverEvent, RecordingObserver};
    use std::cell::RefCell;
    use std::io::Write;
    use std::rc::Rc;
    use tempfile::NamedTempFile;

    /// 创建临时JSON文件用于测试
    fn create_test_json_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("创建临时文件失败");
        file.write_all(content.as_bytes()).expect("写入临时文件失败");
        file
    }

    #[test]
    fn test_load_simple_json_file() {
        let temp_file = create_test_json_file(r#"{"name": "test", "value": 42}"#);

        let mut model = JsonModel::new();
        let result = model.load_file(temp_file.path());

        assert!(result.is_ok(), "加载简单JSON应该成功");
        assert_eq!(model.node_count(), 3, "应该有3个节点：根、name、value");
        assert_eq!(model.source_path(), Some(temp_file.path()));
        assert!(!model.is_strict());
    }

    #[test]
    fn test_load_empty_file_fails() {
        let temp_file = create_test_json_file("  \n\t ");

        let mut model = JsonModel::new();
        let result = model.load_file(temp_file.path());

        assert!(matches!(result, Err(ViewerError::EmptyDocument)));
        assert_eq!(model.row_count(&ModelIndex::invalid()), 0);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let mut model = JsonModel::new();
        let result = model.load_file(Path::new("/nonexistent/dir/doc.json"));
        assert!(matches!(result, Err(ViewerError::Io(_))));
    }

    #[test]
    fn test_has_element_exact_match() {
        let mut model = JsonModel::new();
        assert!(model.load_json(br#"{"name":"John Doe","age":30}"#));

        let top = ModelIndex::invalid();
        let root = model.root_index();
        assert!(model.has_element(&top, "object {2}"));
        assert!(model.has_element(&root, "age : 30"));
        assert!(!model.has_element(&root, "age : 3"), "必须完全匹配");
        assert!(!model.has_element(&root, "object {2}"), "只查找直接子节点");
    }

    #[test]
    fn test_reload_replaces_tree() {
        let mut model = JsonModel::new();
        assert!(model.load_json(br#"{"a":1,"b":2}"#));
        let old_root = model.root_index();

        assert!(model.load_json(br#"["x"]"#));
        assert_eq!(model.node_count(), 2);
        assert!(model.has_element(&ModelIndex::invalid(), "array [1]"));
        assert_eq!(model.data(&old_root), None, "旧索引不应解析到新树");
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut model = JsonModel::new();
        model.clear();
        assert_eq!(model.row_count(&ModelIndex::invalid()), 0);

        assert!(model.load_json(b"[1,2,3]"));
        model.clear();
        model.clear();
        assert_eq!(model.row_count(&ModelIndex::invalid()), 0);
        assert_eq!(model.node_count(), 0);
    }

    #[test]
    fn test_failed_load_leaves_empty_tree() {
        let mut model = JsonModel::new();
        assert!(model.load_json(b"[1]"));

        assert!(!model.load_json(b"   "));
        assert_eq!(model.row_count(&ModelIndex::invalid()), 0);
    }

    #[test]
    fn test_depth_exceeded_reports_false() {
        let mut model = JsonModel::with_config(ParserConfig { max_depth: 4 });

        let result = model.try_load_json(b"[[[[[1]]]]]");
        assert!(matches!(result, Err(ViewerError::DepthExceeded { max: 4 })));
        assert_eq!(model.node_count(), 0, "失败后树应被清空");
        assert!(!model.load_json(b"[[[[[1]]]]]"));
        assert!(model.load_json(b"[[[[1]]]]"));
    }

    #[test]
    fn test_strict_rejects_invalid_and_keeps_tree() {
        let mut model = JsonModel::new();
        model
            .load_json_strict(r#"{"user": {"name": "张三"}}"#.as_bytes())
            .expect("合法JSON应该加载成功");
        assert!(model.is_strict());

        let result = model.load_json_strict(br#"{"invalid": json content}"#);
        assert!(matches!(result, Err(ViewerError::Parse(_))));
        assert!(model.has_element(&ModelIndex::invalid(), "object {1}"), "原树应保持不变");
        assert!(model.is_strict());
    }

    #[test]
    fn test_lenient_load_accepts_what_strict_rejects() {
        let mut model = JsonModel::new();
        assert!(model.load_json(br#"{"invalid": json content}"#));
        assert_eq!(model.row_count(&ModelIndex::invalid()), 1);
    }

    #[test]
    fn test_extract_subtree() {
        let temp_file = create_test_json_file(r#"{"user": {"name": "张三", "tags": ["a", "b"]}}"#);

        let mut model = JsonModel::new();
        model.load_file_strict(temp_file.path()).expect("加载文件失败");

        let root = model.root_index();
        let whole = model.extract_subtree_pretty(&root).unwrap();
        assert!(whole.contains("张三"));

        let user = model.index(0, 0, &root);
        let name = model.index(0, 0, &user);
        let name_json = model.extract_subtree_pretty(&name).unwrap();
        assert_eq!(name_json, "\"张三\"");

        let tags = model.index(1, 0, &user);
        let second = model.index(1, 0, &tags);
        assert_eq!(model.extract_subtree_pretty(&second).unwrap(), "\"b\"");
    }

    #[test]
    fn test_extract_subtree_with_escaped_keys() {
        let mut model = JsonModel::new();
        model
            .load_json_strict(br#"{"1":"x","a\\b":3,"x\ny":4,"it's":[5]}"#)
            .expect("合法JSON应该加载成功");

        let root = model.root_index();
        let extracted: Vec<String> = (0..model.row_count(&root))
            .map(|row| model.extract_subtree_pretty(&model.index(row, 0, &root)).unwrap())
            .collect();
        assert_eq!(extracted, vec!["\"x\"", "3", "4", "[\n  5\n]"]);

        let labels: Vec<&str> = (0..model.row_count(&root))
            .map(|row| model.data(&model.index(row, 0, &root)).unwrap())
            .collect();
        assert_eq!(labels, vec!["1 : \"x\"", "a\\b : 3", "xny : 4", "it's [1]"]);
    }

    #[test]
    fn test_strict_accepts_deep_nesting() {
        let depth = 1000;
        let text = format!("{}{}", "[".repeat(depth), "]".repeat(depth));

        let mut model = JsonModel::new();
        model
            .load_json_strict(text.as_bytes())
            .expect("1000层嵌套应在上限之内");
        assert_eq!(model.node_count(), depth);
        assert!(model.is_strict());
    }

    #[test]
    fn test_strict_rejects_trailing_content() {
        let mut model = JsonModel::new();
        let result = model.load_json_strict(br#"{"a":1} {"b":2}"#);
        assert!(matches!(result, Err(ViewerError::Parse(_))));
        assert_eq!(model.node_count(), 0);
    }

    #[test]
    fn test_extract_requires_strict_mode() {
        let mut model = JsonModel::new();
        assert!(model.load_json(br#"{"a":1}"#));

        let result = model.extract_subtree_pretty(&model.root_index());
        assert!(matches!(result, Err(ViewerError::State(_))));
    }

    #[test]
    fn test_snapshots_in_document_order() {
        let mut model = JsonModel::new();
        assert!(model.load_json(br#"{"user":{"name":"x"},"items":[1,true]}"#));

        let paths: Vec<String> = model.snapshots().into_iter().map(|s| s.path).collect();
        assert_eq!(
            paths,
            vec!["$", "$.user", "$.user.name", "$.items", "$.items[0]", "$.items[1]"]
        );

        let items = model.snapshot(&model.index(1, 0, &model.root_index())).unwrap();
        assert_eq!(items.label, "items [2]");
        assert_eq!(items.kind, NodeKind::Array);
        assert_eq!(items.children, 2);
        assert_eq!(items.depth, 1);
        assert_eq!(items.key.as_deref(), Some("items"));
    }

    #[test]
    fn test_notification_order() {
        let recorder = Rc::new(RefCell::new(RecordingObserver::default()));
        let mut model = JsonModel::new();
        model.set_observer(Box::new(recorder.clone()));

        assert!(model.load_json(br#"{"a":1}"#));
        let root = model.root_index();

        let events = recorder.borrow().events.clone();
        assert_eq!(
            events,
            vec![
                ObserverEvent::ResetBegin,
                ObserverEvent::ResetEnd,
                ObserverEvent::ResetBegin,
                ObserverEvent::RowsInserted {
                    parent: ModelIndex::invalid(),
                    first: 0,
                    last: 0
                },
                ObserverEvent::DataChanged(root),
                ObserverEvent::RowsInserted {
                    parent: root,
                    first: 0,
                    last: 0
                },
                ObserverEvent::DataChanged(root),
                ObserverEvent::DataChanged(root),
                ObserverEvent::ResetEnd,
            ]
        );
    }
}

//! 宽松 JSON 解析器：单遍、只前进的游标，边扫描边把节点写入影子树
//!
//! 不做语法校验：缺失的分隔符、未闭合的字符串/容器、非标准数字都按尽力而为处理。
//! 转义序列不解码，`\` 之后的字符原样保留。
//! 容器嵌套用显式栈维护，深层文档不会耗尽调用栈。

use crate::model::data_core::ViewerError;
use crate::model::observer::TreeObserver;
use crate::model::shadow_tree::{NodeId, NodeKind, ShadowTree};
use crate::model::tree_index::ModelIndex;

/// 默认最大嵌套层数
pub const DEFAULT_MAX_DEPTH: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// 允许同时打开的容器数量上限
    pub max_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// 已创建、尚未闭合的容器
#[derive(Debug)]
struct OpenContainer {
    node: NodeId,
    /// 容器只追加子节点，打开期间行号不变
    index: ModelIndex,
    kind: NodeKind,
    header: String,
}

pub struct LenientParser<'a> {
    text: &'a str,
    pos: usize,
    config: ParserConfig,
    tree: &'a mut ShadowTree,
    observer: &'a mut dyn TreeObserver,
    stack: Vec<OpenContainer>,
}

impl<'a> LenientParser<'a> {
    pub fn new(
        text: &'a str,
        tree: &'a mut ShadowTree,
        observer: &'a mut dyn TreeObserver,
        config: ParserConfig,
    ) -> Self {
        Self {
            text,
            pos: 0,
            config,
            tree,
            observer,
            stack: Vec::new(),
        }
    }

    /// 解析整个文档，返回根节点；空白输入返回 None
    pub fn parse(mut self) -> Result<Option<NodeId>, ViewerError> {
        self.skip_whitespace();
        if self.at_end() {
            return Ok(None);
        }

        self.begin_value(None, None, None)?;
        while let Some((node, index, kind)) = self.stack.last().map(|c| (c.node, c.index, c.kind)) {
            self.step(node, index, kind)?;
        }

        tracing::debug!("宽松解析完成: {} 个节点，消耗 {} 字节", self.tree.len(), self.pos);
        Ok(self.tree.root())
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    /// 从开引号读到下一个未转义的引号；不是引号开头时返回空串且不前进
    fn parse_string(&mut self) -> String {
        self.parse_string_raw().0
    }

    /// 同 parse_string，另外返回引号之间的原文；字符串未闭合时原文为 None
    fn parse_string_raw(&mut self) -> (String, Option<&'a str>) {
        let text = self.text;
        let mut res = String::new();
        if self.peek() != Some('"') {
            return (res, None);
        }
        self.pos += 1;
        let body_start = self.pos;

        while let Some(c) = self.peek() {
            self.pos += c.len_utf8();
            match c {
                '"' => return (res, Some(&text[body_start..self.pos - 1])),
                '\\' => match self.peek() {
                    Some(escaped) => {
                        res.push(escaped);
                        self.pos += escaped.len_utf8();
                    }
                    None => break,
                },
                _ => res.push(c),
            }
        }
        (res, None)
    }

    /// 贪婪读取 [0-9.+-eE]，不校验数字语法
    fn parse_number(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E')) {
                break;
            }
            self.pos += 1;
        }
        self.text[start..self.pos].to_string()
    }

    /// 前缀匹配 true/false/null，不检查单词边界
    fn parse_bool_null(&mut self) -> Option<(&'static str, NodeKind)> {
        const LITERALS: [(&str, NodeKind); 3] = [
            ("true", NodeKind::Bool),
            ("false", NodeKind::Bool),
            ("null", NodeKind::Null),
        ];
        let rest = &self.text[self.pos..];
        let (literal, kind) = LITERALS
            .into_iter()
            .find(|(literal, _)| rest.starts_with(literal))?;
        self.pos += literal.len();
        Some((literal, kind))
    }

    fn scan_scalar(&mut self) -> (String, NodeKind) {
        match self.peek() {
            Some('"') => (format!("\"{}\"", self.parse_string()), NodeKind::String),
            Some(c) if c.is_ascii_digit() || c == '-' => (self.parse_number(), NodeKind::Number),
            _ => match self.parse_bool_null() {
                Some((literal, kind)) => (literal.to_string(), kind),
                None => (String::new(), NodeKind::Unknown),
            },
        }
    }

    /// 在当前位置开始一个值：容器入栈，标量直接落盘
    fn begin_value(
        &mut self,
        parent: Option<(NodeId, ModelIndex)>,
        key: Option<String>,
        member_name: Option<String>,
    ) -> Result<(), ViewerError> {
        self.skip_whitespace();
        let Some(c) = self.peek() else {
            return Ok(());
        };

        match c {
            '{' | '[' => {
                if self.stack.len() >= self.config.max_depth {
                    tracing::warn!("嵌套层数超过上限 {}，位置 {}", self.config.max_depth, self.pos);
                    return Err(ViewerError::DepthExceeded {
                        max: self.config.max_depth,
                    });
                }
                let kind = if c == '{' { NodeKind::Object } else { NodeKind::Array };
                let header = match &key {
                    Some(k) => k.clone(),
                    None if kind == NodeKind::Object => "object".to_string(),
                    None => "array".to_string(),
                };
                let (node, index) = self.emit(parent, header.clone(), kind, key, member_name)?;
                self.pos += 1;
                self.stack.push(OpenContainer {
                    node,
                    index,
                    kind,
                    header,
                });
            }
            _ => {
                let (value, kind) = self.scan_scalar();
                let label = match &key {
                    Some(k) => format!("{} : {}", k, value),
                    None => value,
                };
                self.emit(parent, label, kind, key, member_name)?;
            }
        }
        Ok(())
    }

    /// 处理栈顶容器的一个条目（或闭合它）
    fn step(
        &mut self,
        container: NodeId,
        index: ModelIndex,
        kind: NodeKind,
    ) -> Result<(), ViewerError> {
        self.skip_whitespace();
        let start = self.pos;

        let close = if kind == NodeKind::Object { '}' } else { ']' };
        match self.peek() {
            None => return self.close_top(),
            Some(c) if c == close => {
                self.pos += 1;
                return self.close_top();
            }
            Some(_) => {}
        }

        let count = self.tree.children(container).len();
        if count > 0 {
            if self.peek() == Some(',') {
                self.pos += 1;
            }
            self.skip_whitespace();
        }

        let (key, member_name) = if kind == NodeKind::Object {
            let (key, raw) = self.parse_string_raw();
            self.skip_whitespace();
            if self.peek() == Some(':') {
                self.pos += 1;
            }
            (Some(key).filter(|k| !k.is_empty()), raw.and_then(decode_member_name))
        } else {
            (Some(count.to_string()), None)
        };

        self.begin_value(Some((container, index)), key, member_name)?;

        // 第一个条目之后仍未消耗任何输入时跳过当前字符，保证游标前进；
        // 第一个条目不跳过，下一轮的逗号分支会接着处理当前字符
        if count > 0 && self.pos == start {
            self.bump();
        }
        Ok(())
    }

    fn close_top(&mut self) -> Result<(), ViewerError> {
        let Some(open) = self.stack.pop() else {
            return Ok(());
        };
        let count = self.tree.children(open.node).len();
        let label = match open.kind {
            NodeKind::Object => format!("{} {{{}}}", open.header, count),
            _ => format!("{} [{}]", open.header, count),
        };
        self.tree.relabel(open.node, label)?;
        self.observer.data_changed(open.index);
        Ok(())
    }

    /// 写入节点并发出插入通知，返回节点及其索引
    fn emit(
        &mut self,
        parent: Option<(NodeId, ModelIndex)>,
        label: String,
        kind: NodeKind,
        key: Option<String>,
        member_name: Option<String>,
    ) -> Result<(NodeId, ModelIndex), ViewerError> {
        match parent {
            None => {
                let root = self.tree.create_root(label, kind);
                self.observer.rows_inserted(ModelIndex::invalid(), 0, 0);
                let index = self.tree.root_index();
                self.observer.data_changed(index);
                Ok((root, index))
            }
            Some((parent, parent_index)) => {
                let node = self.tree.append_child(parent, label, kind, key)?;
                if let Some(name) = member_name {
                    self.tree.set_member_name(node, name)?;
                }
                let row = self.tree.children(parent).len() - 1;
                self.observer.rows_inserted(parent_index, row, row);
                self.observer.data_changed(parent_index);
                Ok((node, self.tree.index(row, 0, &parent_index)))
            }
        }
    }
}

/// 按 JSON 字符串规则解码对象键原文；含非法转义时返回 None
fn decode_member_name(raw: &str) -> Option<String> {
    if !raw.contains('\\') {
        return Some(raw.to_string());
    }
    serde_json::from_str::<String>(&format!("\"{}\"", raw)).ok()
}

/// 便捷入口：用默认观察者解析文本
pub fn parse_into(
    text: &str,
    tree: &mut ShadowTree,
    config: ParserConfig,
) -> Result<Option<NodeId>, ViewerError> {
    let mut observer = crate::model::observer::NoopObserver;
    LenientParser::new(text, tree, &mut observer, config).parse()
}

//! VM桥接层：把模型与展开状态转换为可直接展示的文本
//!
//! 窗口与控件不在本库范围内，这里只提供状态常量、"全部展开/全部折叠"按钮的切换逻辑和纯文本渲染。

use crate::model::data_core::JsonModel;
use crate::model::expansion::ExpansionState;

// === 常量定义（消除魔法值） ===
pub const STATUS_READY: &str = "就绪";
pub const STATUS_LOADING: &str = "正在加载文件...";
pub const STATUS_LOADED: &str = "文件加载完成";
pub const STATUS_EMPTY_TREE: &str = "树中没有数据";
pub const STATUS_ERROR_PREFIX: &str = "错误: ";

/// "全部展开/全部折叠" 按钮当前提供的动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleAction {
    ExpandAll,
    CollapseAll,
}

impl ToggleAction {
    pub fn label(self) -> &'static str {
        match self {
            ToggleAction::ExpandAll => "全部展开",
            ToggleAction::CollapseAll => "全部折叠",
        }
    }

    /// 执行动作；树为空时返回 None
    pub fn apply(self, model: &JsonModel, state: &mut ExpansionState) -> Option<ToggleAction> {
        let root = model.root_index();
        if !root.is_valid() {
            return None;
        }
        match self {
            ToggleAction::ExpandAll => state.expand_all(model, &root),
            ToggleAction::CollapseAll => state.collapse_all(model, &root),
        }
        Some(toggle_action_after(model, state))
    }
}

/// 展开/折叠之后按钮应提供的动作：整棵树展开后提供折叠，否则提供展开
pub fn toggle_action_after(model: &JsonModel, state: &ExpansionState) -> ToggleAction {
    let root = model.root_index();
    if root.is_valid() && state.is_tree_expanded(model, &root) && model.has_children(&root) {
        ToggleAction::CollapseAll
    } else {
        ToggleAction::ExpandAll
    }
}

/// 按可见行渲染缩进文本，容器前缀 `+`（折叠）/ `-`（展开）
pub fn render_rows(model: &JsonModel, state: &ExpansionState) -> String {
    let mut out = String::new();
    for row in state.visible_rows(model) {
        let marker = match (row.has_children, row.expanded) {
            (false, _) => ' ',
            (true, true) => '-',
            (true, false) => '+',
        };
        out.push_str(&"  ".repeat(row.depth));
        out.push(marker);
        out.push(' ');
        out.push_str(&row.label);
        out.push('\n');
    }
    out
}

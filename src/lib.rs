//! JSON树形查看器核心库
//!
//! 提供宽松JSON解析、影子树构建、行/父索引寻址与展开状态管理
//! 遵循MVVM架构模式，UI层只通过索引契约访问模型

pub mod model;
pub mod utils;
pub mod vm;

// 重新导出主要类型
pub use model::data_core::{JsonModel, NodeSnapshot, ViewerError};
pub use model::expansion::{ExpansionState, VisibleRow};
pub use model::observer::{ObserverEvent, RecordingObserver, TreeObserver};
pub use model::parser::{LenientParser, ParserConfig, DEFAULT_MAX_DEPTH};
pub use model::shadow_tree::{NodeId, NodeKind, ShadowTree, TreeNode};
pub use model::tree_index::ModelIndex;

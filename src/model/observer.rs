//! 模型变更通知：供 UI 层（或测试）观察行插入与标签变化

use crate::model::tree_index::ModelIndex;

/// 树模型观察者，所有方法默认为空实现
pub trait TreeObserver {
    fn model_reset_begin(&mut self) {}

    fn model_reset_end(&mut self) {}

    /// 父级下插入了 [first, last] 行
    fn rows_inserted(&mut self, _parent: ModelIndex, _first: usize, _last: usize) {}

    /// 节点显示数据发生变化（插入子节点后的父级、闭合后的容器标签）
    fn data_changed(&mut self, _index: ModelIndex) {}
}

/// 不关心通知时使用
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl TreeObserver for NoopObserver {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObserverEvent {
    ResetBegin,
    ResetEnd,
    RowsInserted {
        parent: ModelIndex,
        first: usize,
        last: usize,
    },
    DataChanged(ModelIndex),
}

/// 记录全部通知，便于断言顺序
#[derive(Debug, Default, Clone)]
pub struct RecordingObserver {
    pub events: Vec<ObserverEvent>,
}

impl TreeObserver for RecordingObserver {
    fn model_reset_begin(&mut self) {
        self.events.push(ObserverEvent::ResetBegin);
    }

    fn model_reset_end(&mut self) {
        self.events.push(ObserverEvent::ResetEnd);
    }

    fn rows_inserted(&mut self, parent: ModelIndex, first: usize, last: usize) {
        self.events.push(ObserverEvent::RowsInserted {
            parent,
            first,
            last,
        });
    }

    fn data_changed(&mut self, index: ModelIndex) {
        self.events.push(ObserverEvent::DataChanged(index));
    }
}

/// 共享记录器：模型持有一份，测试或调用方持有另一份读取事件
impl TreeObserver for std::rc::Rc<std::cell::RefCell<RecordingObserver>> {
    fn model_reset_begin(&mut self) {
        self.borrow_mut().model_reset_begin();
    }

    fn model_reset_end(&mut self) {
        self.borrow_mut().model_reset_end();
    }

    fn rows_inserted(&mut self, parent: ModelIndex, first: usize, last: usize) {
        self.borrow_mut().rows_inserted(parent, first, last);
    }

    fn data_changed(&mut self, index: ModelIndex) {
        self.borrow_mut().data_changed(index);
    }
}

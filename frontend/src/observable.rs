//! 显式订阅的状态容器
//!
//! 每次修改都会产生新的快照 (`Rc<T>`)，随后同步通知所有订阅者。
//! 旧快照保持不变，持有者可以安全地继续读取。

use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// 订阅句柄，用于取消订阅
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription(u64);

type Subscriber<T> = Rc<dyn Fn(&T)>;

pub struct Observable<T> {
    value: RefCell<Rc<T>>,
    subscribers: RefCell<Vec<(Subscription, Subscriber<T>)>>,
    next_id: Cell<u64>,
}

impl<T: Clone> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: RefCell::new(Rc::new(value)),
            subscribers: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }

    /// 当前快照
    pub fn snapshot(&self) -> Rc<T> {
        self.value.borrow().clone()
    }

    /// 读取当前值
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let snapshot = self.snapshot();
        f(&snapshot)
    }

    /// 写时复制地修改状态，然后通知订阅者
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut next = self.snapshot();
        let result = f(Rc::make_mut(&mut next));
        *self.value.borrow_mut() = next;
        self.notify();
        result
    }

    pub fn subscribe(&self, f: impl Fn(&T) + 'static) -> Subscription {
        let id = Subscription(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.subscribers.borrow_mut().push((id, Rc::new(f)));
        id
    }

    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut subs = self.subscribers.borrow_mut();
        let before = subs.len();
        subs.retain(|(id, _)| *id != subscription);
        subs.len() != before
    }

    #[cfg(test)]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    fn notify(&self) {
        // 先复制订阅者列表，回调里可以再订阅或修改状态
        let subscribers: Vec<Subscriber<T>> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(_, f)| f.clone())
            .collect();
        let snapshot = self.snapshot();
        for subscriber in subscribers {
            subscriber(&snapshot);
        }
    }
}

impl<T: Clone + Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

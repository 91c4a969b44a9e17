use crmdesk_shared::Timestamp;
use futures::future::LocalBoxFuture;
use std::rc::Rc;
use std::time::Duration;

#[cfg(test)]
use std::cell::{Cell, RefCell};
#[cfg(test)]
use std::sync::atomic::{AtomicI64, Ordering};

/// 在 UI 线程上执行的任务
pub type LocalTask = LocalBoxFuture<'static, ()>;

/// 会话管理器需要的定时器与事件监听
///
/// 同一时间只保留一个待执行的刷新任务：`schedule` 覆盖之前的任务。
pub trait SessionRuntime {
    fn schedule(&self, delay: Duration, task: LocalTask);
    fn cancel(&self);
    /// 其他标签页修改令牌时回调
    fn watch_tokens(&self, on_change: Box<dyn Fn()>);
}

impl<T: SessionRuntime + ?Sized> SessionRuntime for Rc<T> {
    fn schedule(&self, delay: Duration, task: LocalTask) {
        (**self).schedule(delay, task)
    }

    fn cancel(&self) {
        (**self).cancel()
    }

    fn watch_tokens(&self, on_change: Box<dyn Fn()>) {
        (**self).watch_tokens(on_change)
    }
}

pub trait Clock {
    fn now(&self) -> Timestamp;
}

// =========================================================
// 测试工具
// =========================================================

/// 手动驱动的运行时：任务不会自动执行，由测试调用 `fire` 触发
#[cfg(test)]
#[derive(Default)]
pub struct ManualRuntime {
    pending: RefCell<Option<(Duration, LocalTask)>>,
    watchers: RefCell<Vec<Box<dyn Fn()>>>,
    cancels: Cell<usize>,
}

#[cfg(test)]
impl ManualRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending_delay(&self) -> Option<Duration> {
        self.pending.borrow().as_ref().map(|(d, _)| *d)
    }

    /// 执行当前待执行的任务，没有任务时返回 `false`
    pub async fn fire(&self) -> bool {
        let task = self.pending.borrow_mut().take();
        match task {
            Some((_, task)) => {
                task.await;
                true
            }
            None => false,
        }
    }

    pub fn notify_token_change(&self) {
        for watcher in self.watchers.borrow().iter() {
            watcher();
        }
    }

    pub fn watcher_count(&self) -> usize {
        self.watchers.borrow().len()
    }

    pub fn cancel_count(&self) -> usize {
        self.cancels.get()
    }
}

#[cfg(test)]
impl SessionRuntime for ManualRuntime {
    fn schedule(&self, delay: Duration, task: LocalTask) {
        *self.pending.borrow_mut() = Some((delay, task));
    }

    fn cancel(&self) {
        self.cancels.set(self.cancels.get() + 1);
        self.pending.borrow_mut().take();
    }

    fn watch_tokens(&self, on_change: Box<dyn Fn()>) {
        self.watchers.borrow_mut().push(on_change);
    }
}

#[cfg(test)]
#[derive(Debug, Default)]
pub struct ManualClock(AtomicI64);

#[cfg(test)]
impl ManualClock {
    pub fn at(now: Timestamp) -> Self {
        Self(AtomicI64::new(now.as_millis()))
    }

    pub fn advance(&self, by: Duration) {
        self.0.fetch_add(by.as_millis() as i64, Ordering::SeqCst);
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::new(self.0.load(Ordering::SeqCst))
    }
}

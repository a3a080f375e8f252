//! Frame publication
//!
//! The latest frame lives in an [`ArcSwap`] so renderer threads read it without
//! locking while the coordinator replaces it. Each swap replaces the whole frame
//! at once. Observers are notified synchronously after the swap.

use arc_swap::ArcSwap;
use std::sync::Arc;

use crate::types::AggregationFrame;

/// Notified with every newly published frame.
pub trait FrameObserver: Send + Sync {
    fn on_frame(&self, frame: &Arc<AggregationFrame>);

    /// Name used in log lines.
    fn name(&self) -> &str {
        "observer"
    }
}

/// Closures can observe frames directly.
impl<F> FrameObserver for F
where
    F: Fn(&Arc<AggregationFrame>) + Send + Sync,
{
    fn on_frame(&self, frame: &Arc<AggregationFrame>) {
        self(frame)
    }
}

/// Cloneable, cross-thread read handle to the latest frame.
#[derive(Clone)]
pub struct FrameHandle {
    current: Arc<ArcSwap<AggregationFrame>>,
}

impl FrameHandle {
    pub fn latest(&self) -> Arc<AggregationFrame> {
        self.current.load_full()
    }
}

impl std::fmt::Debug for FrameHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameHandle")
            .field("sequence", &self.current.load().sequence)
            .finish()
    }
}

/// Owns the latest frame and the observer list.
pub struct FramePublisher {
    current: Arc<ArcSwap<AggregationFrame>>,
    observers: Vec<Box<dyn FrameObserver>>,
}

impl FramePublisher {
    pub fn new(initial: AggregationFrame) -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(initial)),
            observers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, observer: Box<dyn FrameObserver>) {
        tracing::debug!(observer = observer.name(), "Frame observer subscribed");
        self.observers.push(observer);
    }

    /// Replace the latest frame and notify observers.
    pub fn publish(&self, frame: AggregationFrame) -> Arc<AggregationFrame> {
        let frame = Arc::new(frame);
        self.current.store(Arc::clone(&frame));
        for observer in &self.observers {
            observer.on_frame(&frame);
        }
        frame
    }

    pub fn latest(&self) -> Arc<AggregationFrame> {
        self.current.load_full()
    }

    pub fn handle(&self) -> FrameHandle {
        FrameHandle {
            current: Arc::clone(&self.current),
        }
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}

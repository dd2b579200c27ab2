//! Viewport-intersection trigger for infinite scroll.
//!
//! A subscription pairs a sentinel region with a callback. Each time the
//! owner reports the current viewport through [`ScrollTrigger::observe`],
//! every sentinel that has just become visible (intersection ratio at or
//! above the threshold, not visible at the previous observation) fires its
//! callback once. The callback receives the owner's context by `&mut` at call
//! time, so it always acts on current state rather than on a captured copy.

use std::collections::BTreeMap;

/// Fraction of the sentinel that must be inside the viewport to count as visible.
pub const DEFAULT_THRESHOLD: f32 = 0.1;

/// A one-dimensional region in content rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub offset: u32,
    pub extent: u32,
}

impl Span {
    pub fn new(offset: u32, extent: u32) -> Self {
        Self { offset, extent }
    }

    pub fn end(&self) -> u32 {
        self.offset.saturating_add(self.extent)
    }

    pub fn contains(&self, row: u32) -> bool {
        self.offset <= row && row < self.end()
    }

    /// Fraction of `self` that lies inside `viewport`, in `0.0..=1.0`.
    ///
    /// A zero-extent span is either fully inside or fully outside.
    pub fn intersection_ratio(&self, viewport: Span) -> f32 {
        if self.extent == 0 {
            return if viewport.contains(self.offset) { 1.0 } else { 0.0 };
        }

        let start = self.offset.max(viewport.offset);
        let end = self.end().min(viewport.end());
        if end <= start {
            return 0.0;
        }
        (end - start) as f32 / self.extent as f32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionHandle(u64);

type Callback<C> = Box<dyn FnMut(&mut C)>;

struct Subscription<C> {
    sentinel: Option<Span>,
    visible: bool,
    on_visible: Callback<C>,
}

pub struct ScrollTrigger<C> {
    threshold: f32,
    next_id: u64,
    subscriptions: BTreeMap<SubscriptionHandle, Subscription<C>>,
}

impl<C> Default for ScrollTrigger<C> {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl<C> ScrollTrigger<C> {
    /// `threshold` is clamped into `(0, 1]`; NaN falls back to the default.
    pub fn new(threshold: f32) -> Self {
        let threshold = if threshold.is_nan() {
            DEFAULT_THRESHOLD
        } else {
            threshold.clamp(f32::EPSILON, 1.0)
        };

        Self {
            threshold,
            next_id: 0,
            subscriptions: BTreeMap::new(),
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Begin watching `sentinel`. It may be attached later with [`attach`](Self::attach).
    pub fn start(
        &mut self,
        sentinel: Option<Span>,
        on_visible: impl FnMut(&mut C) + 'static,
    ) -> SubscriptionHandle {
        let handle = SubscriptionHandle(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.subscriptions.insert(
            handle,
            Subscription {
                sentinel,
                visible: false,
                on_visible: Box::new(on_visible),
            },
        );
        handle
    }

    /// Stop watching. Safe on unknown or already-stopped handles.
    pub fn stop(&mut self, handle: SubscriptionHandle) -> bool {
        self.subscriptions.remove(&handle).is_some()
    }

    pub fn stop_all(&mut self) {
        self.subscriptions.clear();
    }

    /// Point the subscription at a (possibly moved) sentinel.
    pub fn attach(&mut self, handle: SubscriptionHandle, sentinel: Span) -> bool {
        match self.subscriptions.get_mut(&handle) {
            Some(sub) => {
                sub.sentinel = Some(sentinel);
                true
            }
            None => false,
        }
    }

    /// The sentinel left the layout. Its next appearance counts as a new transition.
    pub fn detach(&mut self, handle: SubscriptionHandle) -> bool {
        match self.subscriptions.get_mut(&handle) {
            Some(sub) => {
                sub.sentinel = None;
                sub.visible = false;
                true
            }
            None => false,
        }
    }

    /// Re-establish the subscription with a new callback.
    ///
    /// Visibility is forgotten, so a sentinel already in view fires again on
    /// the next observation.
    pub fn rebind(
        &mut self,
        handle: SubscriptionHandle,
        on_visible: impl FnMut(&mut C) + 'static,
    ) -> bool {
        match self.subscriptions.get_mut(&handle) {
            Some(sub) => {
                sub.on_visible = Box::new(on_visible);
                sub.visible = false;
                true
            }
            None => false,
        }
    }

    /// Report the current viewport; fires callbacks for sentinels that just
    /// came into view and returns how many fired.
    pub fn observe(&mut self, viewport: Span, ctx: &mut C) -> usize {
        let threshold = self.threshold;
        let mut fired = 0;

        for (handle, sub) in self.subscriptions.iter_mut() {
            let visible = sub
                .sentinel
                .is_some_and(|s| s.intersection_ratio(viewport) >= threshold);

            if visible && !sub.visible {
                tracing::trace!(?handle, ?viewport, "Sentinel entered viewport");
                (sub.on_visible)(ctx);
                fired += 1;
            }
            sub.visible = visible;
        }

        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counting_trigger() -> (ScrollTrigger<u32>, SubscriptionHandle) {
        let mut trigger = ScrollTrigger::default();
        let handle = trigger.start(Some(Span::new(50, 10)), |count: &mut u32| *count += 1);
        (trigger, handle)
    }

    #[test]
    fn test_intersection_ratio() {
        let sentinel = Span::new(10, 10);
        assert_eq!(sentinel.intersection_ratio(Span::new(0, 10)), 0.0);
        assert_eq!(sentinel.intersection_ratio(Span::new(0, 11)), 0.1);
        assert_eq!(sentinel.intersection_ratio(Span::new(0, 15)), 0.5);
        assert_eq!(sentinel.intersection_ratio(Span::new(0, 100)), 1.0);
        assert_eq!(sentinel.intersection_ratio(Span::new(19, 5)), 0.1);
        assert_eq!(sentinel.intersection_ratio(Span::new(20, 5)), 0.0);
    }

    #[test]
    fn test_zero_extent_sentinel() {
        let sentinel = Span::new(5, 0);
        assert_eq!(sentinel.intersection_ratio(Span::new(0, 6)), 1.0);
        assert_eq!(sentinel.intersection_ratio(Span::new(0, 5)), 0.0);
    }

    #[test]
    fn test_fires_once_per_transition() {
        let (mut trigger, _handle) = counting_trigger();
        let mut count = 0;

        assert_eq!(trigger.observe(Span::new(0, 20), &mut count), 0);
        assert_eq!(trigger.observe(Span::new(41, 10), &mut count), 1);
        assert_eq!(trigger.observe(Span::new(45, 10), &mut count), 0);
        assert_eq!(count, 1);

        // Scroll away and back
        trigger.observe(Span::new(0, 20), &mut count);
        trigger.observe(Span::new(50, 20), &mut count);
        assert_eq!(count, 2);
    }

    #[test]
    fn test_below_threshold_does_not_fire() {
        let mut trigger = ScrollTrigger::new(0.5);
        trigger.start(Some(Span::new(10, 10)), |count: &mut u32| *count += 1);
        let mut count = 0;

        trigger.observe(Span::new(0, 14), &mut count);
        assert_eq!(count, 0);
        trigger.observe(Span::new(0, 15), &mut count);
        assert_eq!(count, 1);
    }

    #[test]
    fn test_detach_then_attach_fires_again() {
        let (mut trigger, handle) = counting_trigger();
        let mut count = 0;
        let viewport = Span::new(40, 30);

        trigger.observe(viewport, &mut count);
        assert_eq!(count, 1);

        assert!(trigger.detach(handle));
        trigger.observe(viewport, &mut count);
        assert_eq!(count, 1);

        assert!(trigger.attach(handle, Span::new(60, 1)));
        trigger.observe(viewport, &mut count);
        assert_eq!(count, 2);
    }

    #[test]
    fn test_rebind_while_visible_fires_with_new_callback() {
        let (mut trigger, handle) = counting_trigger();
        let mut count = 0;
        let viewport = Span::new(40, 30);

        trigger.observe(viewport, &mut count);
        assert!(trigger.rebind(handle, |count: &mut u32| *count += 100));
        trigger.observe(viewport, &mut count);
        assert_eq!(count, 101);
    }

    #[test]
    fn test_never_attached_sentinel_is_inert() {
        let mut trigger: ScrollTrigger<u32> = ScrollTrigger::default();
        let handle = trigger.start(None, |count| *count += 1);
        let mut count = 0;

        trigger.observe(Span::new(0, u32::MAX), &mut count);
        assert_eq!(count, 0);
        assert!(trigger.stop(handle));
    }

    #[test]
    fn test_stop_is_safe_on_unknown_handles() {
        let (mut trigger, handle) = counting_trigger();
        assert!(trigger.stop(handle));
        assert!(!trigger.stop(handle));
        assert!(!trigger.attach(handle, Span::new(0, 1)));
        assert!(!trigger.detach(handle));
        assert!(trigger.is_empty());

        let mut count = 0;
        assert_eq!(trigger.observe(Span::new(0, 100), &mut count), 0);
    }

    #[test]
    fn test_threshold_is_clamped() {
        assert_eq!(ScrollTrigger::<()>::new(2.0).threshold(), 1.0);
        assert!(ScrollTrigger::<()>::new(-1.0).threshold() > 0.0);
        assert_eq!(ScrollTrigger::<()>::new(f32::NAN).threshold(), DEFAULT_THRESHOLD);
    }
}

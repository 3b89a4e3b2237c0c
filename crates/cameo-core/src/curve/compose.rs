//! Pointwise composition of two optional channel functions.

/// A unary channel function. `None` means "undefined at this input".
pub type ChannelFn<'a> = &'a dyn Fn(f64) -> Option<f64>;

/// `outer ∘ inner`, where at most one side may be missing.
#[derive(Clone, Copy)]
pub struct Composite<'a> {
    outer: Option<ChannelFn<'a>>,
    inner: Option<ChannelFn<'a>>,
}

impl Composite<'_> {
    /// `outer(inner(x))`, or whichever side is present.
    pub fn eval(&self, x: f64) -> Option<f64> {
        match (self.outer, self.inner) {
            (Some(outer), Some(inner)) => inner(x).and_then(outer),
            (Some(f), None) | (None, Some(f)) => f(x),
            (None, None) => Some(x),
        }
    }
}

impl std::fmt::Debug for Composite<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Composite")
            .field("outer", &self.outer.is_some())
            .field("inner", &self.inner.is_some())
            .finish()
    }
}

/// Chain `outer` after `inner`.
///
/// Returns `None` when both are absent, otherwise a function equal to
/// `outer(inner(x))`, `outer(x)` or `inner(x)` depending on which are present.
pub fn compose<'a>(outer: Option<ChannelFn<'a>>, inner: Option<ChannelFn<'a>>) -> Option<Composite<'a>> {
    if outer.is_none() && inner.is_none() {
        return None;
    }
    Some(Composite { outer, inner })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_applies_inner_first() {
        let double: ChannelFn = &|x| Some(x * 2.0);
        let add_one: ChannelFn = &|x| Some(x + 1.0);
        let composite = compose(Some(double), Some(add_one)).expect("both present");
        assert_eq!(composite.eval(3.0), Some(8.0));
    }

    #[test]
    fn test_compose_with_one_side_missing() {
        let double: ChannelFn = &|x| Some(x * 2.0);
        assert_eq!(compose(Some(double), None).expect("outer").eval(3.0), Some(6.0));
        assert_eq!(compose(None, Some(double)).expect("inner").eval(3.0), Some(6.0));
    }

    #[test]
    fn test_compose_both_missing_is_absent() {
        assert!(compose(None, None).is_none());
    }

    #[test]
    fn test_undefined_inner_propagates() {
        let undefined: ChannelFn = &|_| None;
        let double: ChannelFn = &|x| Some(x * 2.0);
        let composite = compose(Some(double), Some(undefined)).expect("both present");
        assert_eq!(composite.eval(1.0), None);
    }
}

//! Success-or-safe-default results for collaborator-facing steps.

/// Result of a step that never fails outright.
///
/// `Complete` means the collaborator answered normally. `Degraded` carries the
/// safe default that was substituted and the reason, so callers can flag it
/// instead of inferring it from log output.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Complete(T),
    Degraded { value: T, reason: String },
}

impl<T> Outcome<T> {
    #[must_use]
    pub fn degraded(value: T, reason: impl Into<String>) -> Self {
        Self::Degraded {
            value,
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    #[must_use]
    pub fn value(&self) -> &T {
        match self {
            Self::Complete(value) | Self::Degraded { value, .. } => value,
        }
    }

    #[must_use]
    pub fn into_value(self) -> T {
        match self {
            Self::Complete(value) | Self::Degraded { value, .. } => value,
        }
    }

    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Complete(_) => None,
            Self::Degraded { reason, .. } => Some(reason),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Self::Complete(value) => Outcome::Complete(f(value)),
            Self::Degraded { value, reason } => Outcome::Degraded {
                value: f(value),
                reason,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_has_no_reason() {
        let o = Outcome::Complete(3);
        assert!(!o.is_degraded());
        assert_eq!(o.reason(), None);
        assert_eq!(*o.value(), 3);
    }

    #[test]
    fn degraded_keeps_value_and_reason() {
        let o = Outcome::degraded(vec![1], "timeout");
        assert!(o.is_degraded());
        assert_eq!(o.reason(), Some("timeout"));
        assert_eq!(o.into_value(), vec![1]);
    }

    #[test]
    fn map_preserves_degradation() {
        let o = Outcome::degraded(2, "fallback").map(|v| v * 10);
        assert_eq!(o.reason(), Some("fallback"));
        assert_eq!(*o.value(), 20);
    }
}

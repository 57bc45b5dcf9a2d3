//! Lifecycle status of an action.

use std::fmt;

/// Where an action is in its request lifecycle.
///
/// `Idle` is only observed before the first dispatch (or after
/// [`Action::reset`](crate::Action::reset)); `Success` and `Error` are
/// left again by the next dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AsyncStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

impl AsyncStatus {
    pub fn is_loading(self) -> bool {
        self == Self::Loading
    }

    pub fn is_success(self) -> bool {
        self == Self::Success
    }

    pub fn is_error(self) -> bool {
        self == Self::Error
    }

    /// `Success` or `Error`.
    pub fn is_settled(self) -> bool {
        matches!(self, Self::Success | Self::Error)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for AsyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [AsyncStatus; 4] = [
        AsyncStatus::Idle,
        AsyncStatus::Loading,
        AsyncStatus::Success,
        AsyncStatus::Error,
    ];

    #[test]
    fn default_is_idle() {
        assert_eq!(AsyncStatus::default(), AsyncStatus::Idle);
    }

    #[test]
    fn at_most_one_flag_per_status() {
        for status in ALL {
            let flags = [status.is_loading(), status.is_success(), status.is_error()];
            assert!(flags.iter().filter(|f| **f).count() <= 1, "{status}");
        }
    }

    #[test]
    fn settled_statuses() {
        let settled: Vec<_> = ALL.into_iter().filter(|s| s.is_settled()).collect();
        assert_eq!(settled, vec![AsyncStatus::Success, AsyncStatus::Error]);
    }

    #[test]
    fn display_is_lowercase() {
        let names: Vec<String> = ALL.iter().map(ToString::to_string).collect();
        assert_eq!(names, ["idle", "loading", "success", "error"]);
    }
}

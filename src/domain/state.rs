use std::sync::Arc;

/// Orchestrator state machine.
///
/// `Loaded` and `Failed` are resting states until the next trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

impl Phase {
    pub fn is_resting(&self) -> bool {
        !matches!(self, Phase::Loading)
    }
}

/// Read-only projection published to presentation.
#[derive(Debug, Clone)]
pub struct FetchState<T> {
    pub items: Arc<[T]>,
    pub is_loading: bool,
    pub error_message: Option<String>,
    pub phase: Phase,
}

impl<T> FetchState<T> {
    pub fn new() -> Self {
        Self {
            items: Arc::from(Vec::new()),
            is_loading: false,
            error_message: None,
            phase: Phase::Idle,
        }
    }

    pub(crate) fn project(items: Arc<[T]>, phase: Phase) -> Self {
        let error_message = match &phase {
            Phase::Failed(message) => Some(message.clone()),
            _ => None,
        };

        Self {
            items,
            is_loading: !phase.is_resting(),
            error_message,
            phase,
        }
    }

    /// Failed before anything was ever shown
    pub fn is_blank_failure(&self) -> bool {
        self.error_message.is_some() && self.items.is_empty()
    }
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self::new()
    }
}

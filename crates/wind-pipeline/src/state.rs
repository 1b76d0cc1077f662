//! Retry and degradation as a pure state machine.
//!
//! The orchestrator drives these transitions with explicit events; the
//! machine itself never sleeps, fetches, or touches the cache, which keeps
//! the degradation ladder directly testable.

/// Resolution shrink rule applied on provider pushback.
#[derive(Debug, Clone, Copy)]
pub struct Degradation {
    pub factor: f64,
    pub floor: usize,
}

impl Default for Degradation {
    fn default() -> Self {
        Self {
            factor: 0.7,
            floor: 4,
        }
    }
}

impl Degradation {
    /// Shrink one dimension: floor(n * factor), never below the floor.
    pub fn shrink(&self, n: usize) -> usize {
        ((n as f64 * self.factor).floor() as usize).max(self.floor)
    }
}

/// Classification of one provider attempt's outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseClass {
    /// 2xx with a usable body.
    Success,
    /// 429, 414, or a transport failure: shrink and retry.
    Degradable,
    /// Any other failure: abort the acquisition.
    Terminal,
}

/// Events driving the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchEvent {
    Start { nx: usize, ny: usize },
    Response(ResponseClass),
    TimerElapsed,
}

/// Acquisition progress. `Fetching` carries the resolution of the in-flight
/// attempt; `Backoff` carries the already-shrunk resolution of the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    Idle,
    Fetching { attempt: u32, nx: usize, ny: usize },
    Backoff { attempt: u32, nx: usize, ny: usize },
    Succeeded { nx: usize, ny: usize },
    Failed,
}

impl FetchState {
    /// Apply one event. Unexpected (state, event) pairs leave the state
    /// unchanged.
    pub fn apply(self, event: FetchEvent, degradation: Degradation, max_attempts: u32) -> Self {
        match (self, event) {
            (FetchState::Idle, FetchEvent::Start { nx, ny }) => FetchState::Fetching {
                attempt: 1,
                nx,
                ny,
            },
            (FetchState::Fetching { nx, ny, .. }, FetchEvent::Response(ResponseClass::Success)) => {
                FetchState::Succeeded { nx, ny }
            }
            (
                FetchState::Fetching { attempt, nx, ny },
                FetchEvent::Response(ResponseClass::Degradable),
            ) => {
                if attempt >= max_attempts {
                    FetchState::Failed
                } else {
                    FetchState::Backoff {
                        attempt,
                        nx: degradation.shrink(nx),
                        ny: degradation.shrink(ny),
                    }
                }
            }
            (FetchState::Fetching { .. }, FetchEvent::Response(ResponseClass::Terminal)) => {
                FetchState::Failed
            }
            (FetchState::Backoff { attempt, nx, ny }, FetchEvent::TimerElapsed) => {
                FetchState::Fetching {
                    attempt: attempt + 1,
                    nx,
                    ny,
                }
            }
            (state, _) => state,
        }
    }
}

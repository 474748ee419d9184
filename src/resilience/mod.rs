//! 弹性模式模块：为外部推理调用提供带抖动的指数退避重试。
//!
//! # Resilience Module
//!
//! Generative-AI backends answer with capacity errors under load. Retrying at
//! once makes the overload worse, and surfacing a raw 429 to an emergency UI is a
//! dead end. This module waits such failures out and fails fast on everything else.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`backoff`] | `base * 2^n` delays with additive `[0, 30%)` jitter |
//! | [`retry`] | Bounded, cancellable retry loop and the retry/fail decision |
//!
//! With the defaults (5 attempts, 2 s base) the nominal waits are 2 s, 4 s, 8 s
//! and 16 s before the fifth and final attempt.
//!
//! ```rust
//! use lifeguard_ai::resilience::{RetryConfig, RetryExecutor};
//! use std::time::Duration;
//!
//! let executor = RetryExecutor::new(&RetryConfig::default());
//! assert_eq!(executor.max_attempts(), 5);
//! assert_eq!(executor.backoff().nominal(3), Duration::from_secs(16));
//! ```

pub mod backoff;
pub mod retry;

pub use backoff::Backoff;
pub use retry::{Decision, RetryConfig, RetryExecutor};

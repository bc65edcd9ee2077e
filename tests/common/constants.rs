//! Shared constants for end-to-end tests
//!
//! When test credentials or timeouts change, update only this file.

/// Editor test user, holds the `edit_posts` capability.
pub const EDITOR_USER: &str = "editor";

/// Application-password secret for the editor user.
pub const EDITOR_SECRET: &str = "editor-secret-abc123";

/// Viewer test user, lacks the `edit_posts` capability.
pub const VIEWER_USER: &str = "viewer";

/// Application-password secret for the viewer user.
pub const VIEWER_SECRET: &str = "viewer-secret-xyz789";

/// Maximum time to wait for the server to become ready (milliseconds).
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Polling interval when waiting for server ready (milliseconds).
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;

/// Timeout for individual HTTP requests (seconds).
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

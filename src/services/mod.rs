/// Turn-ownership capability checks.
pub mod access;
/// Leaderboards and the available-questions read model.
pub mod board_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Completion rollup into durable player statistics.
pub mod rollup_service;
/// Difficulty-based score magnitudes.
pub mod scoring;
/// Session lifecycle, turns, grading, and lifelines.
pub mod session_service;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// Session store connection supervisor.
pub mod storage_supervisor;

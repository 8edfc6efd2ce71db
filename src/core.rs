//! # Core Module / 核心模块
//!
//! This module contains the core functionality of the batch tester,
//! including data models, configuration, score extraction, the report
//! store and the sequential run orchestrator.
//!
//! 此模块包含批量测试器的核心功能，
//! 包括数据模型、配置、评分提取、报告存储和顺序运行编排器。

pub mod config;
pub mod execution;
pub mod harness;
pub mod models;
pub mod report;
pub mod score;

// Re-exports
pub use config::ModuleSpec;
pub use models::ScoreRecord;
pub use report::ReportStore;
pub use score::extract_score;

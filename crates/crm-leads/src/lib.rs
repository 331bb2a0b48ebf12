//! Lead qualification and conversion scoring for the CRM.
//!
//! The engine under [`workflows::leads`] is a set of pure evaluators (data quality, factor
//! scoring, evidence tone, threshold resolution, conversion gating) plus a duplicate guard and
//! a service facade that threads tenant settings and external collaborators through them.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;

//! Sprint board: stories, sprint dates, derived views, and metrics.
//!
//! The sprint module turns the reconciled task records into what the UI
//! shows: a filtered, grouped board with counts, plus sprint progress
//! figures. It also hosts [`services::SprintBoardService`], the surface the
//! UI layer drives.

pub mod domain;
pub mod services;

//! Application services for the sprint board.

mod board;
mod board_view;
mod metrics;

pub use board::{
    PushOutcome, SprintBoardError, SprintBoardParams, SprintBoardResult, SprintBoardService,
};
pub use board_view::{
    BoardContents, BoardFilter, BoardView, GroupBy, GroupKey, StatusCounts, TaskGroup,
    task_count_label,
};
pub use metrics::{SprintMetrics, completion_percentage, days_remaining, task_progress};

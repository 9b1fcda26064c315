pub mod init;
pub mod replay;
pub mod summary;
pub mod validate;

use comfy_table::{Cell, Table};
use supervision_core::model::Rubric;
use supervision_core::status::RubricStatus;

/// Render rubric statuses as a console table.
pub fn status_table(rubrics: &[Rubric], statuses: &[RubricStatus]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Rubric", "Kind", "Evaluated", "Met", "Score", "Complete"]);

    for (rubric, status) in rubrics.iter().zip(statuses) {
        table.add_row(vec![
            Cell::new(&rubric.name),
            Cell::new(rubric.kind),
            Cell::new(format!("{}/{}", status.evaluated_count, status.total_criteria)),
            Cell::new(status.met_count),
            Cell::new(format!("{}%", status.percentage)),
            Cell::new(if status.is_complete { "yes" } else { "no" }),
        ]);
    }

    table
}

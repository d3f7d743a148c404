pub mod column;
pub mod plan;

pub use column::{ColumnDirective, ColumnRef};
pub use plan::{AddColumns, DeleteRows, FileSpec, Plan};

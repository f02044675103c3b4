pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{digest, dim, error, header, info, path, section, success, summary_row, warn};
pub use table::{columns_table, objects_table};
pub use theme::{theme, Theme};

pub mod icons;
pub mod output;
pub mod table;

pub use icons::Icons;
pub use output::{error, header, info, section, success};
pub use table::{contacts_table, stats_table, templates_table};

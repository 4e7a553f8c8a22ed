pub mod day_detail;
pub mod header;
pub mod month;
pub mod next_prayer;
pub mod prayers;
pub mod statusbar;

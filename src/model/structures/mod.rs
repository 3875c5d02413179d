pub mod contest_type;
pub mod contestant;
pub mod rating_change_result;

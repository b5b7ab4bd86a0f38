pub mod apply_same;
pub mod roles;

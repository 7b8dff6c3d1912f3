mod check_integrity;

pub use check_integrity::CheckIntegrity;

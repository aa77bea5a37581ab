pub mod errors;
pub mod numeric;

// Serializable views of check results.

pub mod dto;

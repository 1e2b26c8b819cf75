pub mod aggregate;
pub mod error;
pub mod forge;
pub mod harvest;
pub mod lister;
pub mod model;
pub mod pagination;
pub mod pipeline;
pub mod since;
pub mod summarize;

#[cfg(test)]
mod testing;

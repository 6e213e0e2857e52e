pub mod aggregator;
pub mod bom_graph;
pub mod executor;
pub mod labor;
pub mod material_resolver;
pub mod pricing;

pub use executor::PriceItemExecutor;
pub use pricing::PricedItem;

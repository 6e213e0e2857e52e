pub mod request;
pub mod response;

pub use request::PriceItemRequest;
pub use response::PriceItemResponse;

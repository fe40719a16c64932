//! Data Transfer Objects for REST request/response serialization.

pub mod common_dto;
pub mod mark_dto;
pub mod ranking_dto;
pub mod shop_dto;
pub mod user_dto;

pub use common_dto::*;
pub use mark_dto::*;
pub use ranking_dto::*;
pub use shop_dto::*;
pub use user_dto::*;

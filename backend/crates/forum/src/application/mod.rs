//! Application Layer - Use Cases
//!
//! This layer orchestrates domain logic and infrastructure.

pub mod categories;
pub mod config;
pub mod posts;
pub mod react;
pub mod replies;

pub use categories::{CreateCategoryInput, CreateCategoryUseCase, ListCategoriesUseCase};
pub use config::ForumConfig;
pub use posts::{
    CreatePostInput, CreatePostUseCase, GetPostUseCase, ListPostsOutput, ListPostsUseCase,
    ManagePostUseCase, PostDetail, ReplyView,
};
pub use react::{ReactOutput, ReactUseCase};
pub use replies::ReplyUseCase;

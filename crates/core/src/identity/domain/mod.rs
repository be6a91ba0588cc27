pub mod embedding_gallery;
pub mod identity_error;
pub mod identity_matcher;
pub mod identity_resolver;

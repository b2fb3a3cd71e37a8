//! Request extractors: the authenticated user and multipart form submissions.

mod current_user;
mod form;

pub use current_user::CurrentUser;
pub use form::FormSubmission;

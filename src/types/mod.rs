pub mod response;
pub mod route;

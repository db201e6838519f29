pub mod health;
pub mod outcome;
pub mod request;
pub mod response;

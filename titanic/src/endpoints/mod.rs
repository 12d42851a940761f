pub mod close;
pub mod reply;
pub mod request;

/// Service names the three endpoints register under.
pub const REQUEST_SERVICE: &str = "titanic.request";
pub const REPLY_SERVICE: &str = "titanic.reply";
pub const CLOSE_SERVICE: &str = "titanic.close";

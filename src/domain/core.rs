mod admission;
mod booking;
mod clock;
mod conflict;
mod rules;
mod service;
mod slot;
mod status;

pub use self::admission::*;
pub use self::booking::*;
pub use self::clock::*;
pub use self::conflict::*;
pub use self::rules::*;
pub use self::service::*;
pub use self::slot::*;
pub use self::status::*;

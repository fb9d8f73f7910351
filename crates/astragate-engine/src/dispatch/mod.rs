pub mod dispatcher;

pub use dispatcher::{Dispatch, Dispatcher};

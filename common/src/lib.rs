pub mod log_setup;
pub mod shared_fn;

pub use shared_fn::SharedFn;

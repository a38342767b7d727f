mod spec;
pub use spec::CommandSpec;

mod output;

mod runner;
pub use runner::run_with_timeout;

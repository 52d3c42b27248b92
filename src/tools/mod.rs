pub mod call;
pub mod executor;
pub mod schema;

pub use call::ToolInvocation;
pub use executor::ToolExecutor;
pub use schema::tool_specs;

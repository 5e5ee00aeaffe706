//! Tool call supports.

mod error;
mod object;
mod registry;

use serde::de::DeserializeOwned;
use serde_json::Value;

pub use error::{Error, ErrorKind};
pub(crate) use registry::ToolRegistry;

/// The result of a tool call, serialized back to the model.
pub type ToolResult = Result<Value, Error>;

/// Describes a tool to the model.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolDescriptor {
    /// The name the model uses to call the tool.
    pub name: String,
    /// What the tool does and when to use it.
    pub description: String,
    /// JSON schema of the arguments object.
    pub parameters: Value,
    /// JSON schema of the returned value, if known.
    pub response: Option<Value>,
}

/// A tool that can be called by the model.
///
/// Implementations of this trait should be stateless. Any context the tool
/// needs should be captured when it is constructed and copied into the
/// future returned by [`execute`](Tool::execute).
pub trait Tool: Send + Sync + 'static {
    /// The type of input that the tool accepts.
    type Input: DeserializeOwned;

    /// Returns the descriptor of the tool.
    fn descriptor(&self) -> &ToolDescriptor;

    /// Executes the tool with the given input.
    ///
    /// This method must return a future that is fully independent of `self`,
    /// and the future should be cancellation safe.
    fn execute(
        &self,
        input: Self::Input,
    ) -> impl Future<Output = ToolResult> + Send + 'static;
}

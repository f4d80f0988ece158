mod anthropic;
mod deepseek;
mod google;
mod openai;
mod openai_like;
mod xai;

pub use anthropic::AnthropicProvider;
pub use google::GoogleProvider;
pub use openai_like::{OpenAiLikeProvider, ToolCallStyle};

pub use deepseek::build as build_deepseek;
pub use openai::build as build_openai;
pub use xai::build as build_xai;

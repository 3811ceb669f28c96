//! Host platform capabilities
//!
//! The orchestrator never talks to the OS directly. The host supplies three
//! capabilities behind these traits:
//! - Grant status queries ([`GrantChecker`])
//! - The native permission prompt ([`PromptRequester`])
//! - Settings navigation ([`SettingsNavigator`])

mod checker;
mod navigator;
mod prompter;

pub use checker::GrantChecker;
pub use navigator::SettingsNavigator;
pub use prompter::{PromptRequester, PromptResponse};

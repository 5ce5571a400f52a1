pub mod autofill;
pub mod binder;
pub mod browser;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod form;
pub mod page;
pub mod ui;

pub use autofill::{FieldValue, Scenario};
pub use binder::{FormBinder, Route};
pub use browser::ConsoleBrowser;
pub use config::{ConsoleBuilder, ConsoleConfig};
pub use dispatch::{Outcome, RequestDispatcher};
pub use error::{Error, Result};
pub use form::{Form, FormField, FormKind, Payload};
pub use page::LivePage;
pub use ui::{AlertLevel, MemoryUi, ResultStatus, TerminalUi, UiPort};

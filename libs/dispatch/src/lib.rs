//! Provider dispatch: try carriers in priority order, stop on the first
//! acceptance, and hand back the full attempt trail when everything fails.

mod dispatcher;
mod resolver;

pub use dispatcher::Dispatcher;
pub use resolver::CredentialResolver;

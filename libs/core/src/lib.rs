//! Shared contract for the SMS notification stack: the value types that cross
//! the adapter boundary, the [`SmsSender`] trait every carrier integration
//! implements, and the credential store the dispatcher consults before
//! attempting a send.

pub mod credentials;
pub mod message;
pub mod outcome;
pub mod phone;
pub mod sender;

pub use credentials::{CredentialStore, EnvCredentials, StaticCredentials};
pub use message::{ProviderReceipt, SendError, SendRequest, SendResult};
pub use outcome::{Attempt, Delivery, DispatchOutcome, Disposition};
pub use phone::{normalize_destination, DEFAULT_COUNTRY_CODE};
pub use sender::SmsSender;

pub mod config;
pub mod deeplink;
mod http;
pub mod profile;
pub mod session;
pub mod submission;
pub mod wallet_auth;

pub use config::ZappleConfig;
pub use deeplink::wallet_nwa_link;
pub use profile::ProfileAdapter;
pub use session::WalletAuthSession;
pub use submission::SubmissionAdapter;
pub use wallet_auth::WalletAuthAdapter;

use std::fmt;
use std::str::FromStr;

use nostr::nips::nip19::{FromBech32, ToBech32};
use nostr::PublicKey;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

pub const NWA_SCHEME: &str = "nostr+walletauth";
pub const NWC_SCHEME: &str = "nostr+walletconnect";

/// Sender used for autozaps when the user does not provide their own npub.
pub const ZAPPLE_PAY_NPUB: &str = "npub1wxl6njlcgygduct7jkgzrvyvd9fylj4pqvll6p32h59wyetm5fxqjchcan";
pub const DAMUS_DONATION_PUBKEY: &str =
    "32e1827635450ebb3c5a7d12c1f8e7b2b514439ac10a67eef3d9fd9c5c68e245";
pub const OPENSATS_DONATION_PUBKEY: &str =
    "787338757fc25d65cd929394d5e7713cf43638e8d259e8dcf5c73b834eb851f2";
pub const DEFAULT_EMOJI: &str = "🤙";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid amount or time_period: both must be given together")]
    IncompleteBudget,
    #[error("invalid time period: {0} (expected day, week or month)")]
    TimePeriod(String),
    #[error("Please enter a valid npub: {0}")]
    PublicKey(String),
    #[error("Please enter a valid amount")]
    Amount,
    #[error("Please enter a valid emoji")]
    Emoji,
    #[error("Please enter a NWC string")]
    EmptyNwc,
    #[error("invalid wallet connect string: expected a nostr+walletconnect:// uri")]
    Nwc,
    #[error("invalid wallet auth uri: {0}")]
    NwaUri(String),
    #[error("authorization id is empty")]
    EmptyAuthorizationId,
    #[error("You must connect a wallet")]
    NoWallet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimePeriod {
    Day,
    Week,
    Month,
}

impl TimePeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimePeriod::Day => "day",
            TimePeriod::Week => "week",
            TimePeriod::Month => "month",
        }
    }
}

impl fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimePeriod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(TimePeriod::Day),
            "week" => Ok(TimePeriod::Week),
            "month" => Ok(TimePeriod::Month),
            other => Err(ValidationError::TimePeriod(other.to_owned())),
        }
    }
}

/// Recurring spend limit attached to a wallet authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budget {
    pub amount_sats: u64,
    pub time_period: TimePeriod,
}

/// Parameters for a new wallet authorization.
///
/// A budget is all-or-nothing: [`AuthorizationParams::from_parts`] rejects an
/// amount without a period (and the reverse).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorizationParams {
    pub budget: Option<Budget>,
    pub identity: Option<PublicKey>,
}

impl AuthorizationParams {
    /// Grant with no spend limit and no identity scope.
    pub fn unrestricted() -> Self {
        Self::default()
    }

    pub fn from_parts(
        amount_sats: Option<u64>,
        time_period: Option<TimePeriod>,
        identity: Option<PublicKey>,
    ) -> Result<Self, ValidationError> {
        let budget = match (amount_sats, time_period) {
            (Some(amount_sats), Some(time_period)) => Some(Budget {
                amount_sats,
                time_period,
            }),
            (None, None) => None,
            _ => return Err(ValidationError::IncompleteBudget),
        };
        Ok(Self { budget, identity })
    }

    /// Query string pairs for `GET /wallet-auth`, in wire order.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(3);
        if let Some(budget) = &self.budget {
            pairs.push(("amount", budget.amount_sats.to_string()));
            pairs.push(("time_period", budget.time_period.as_str().to_owned()));
        }
        if let Some(identity) = &self.identity {
            pairs.push(("identity", identity.to_hex()));
        }
        pairs
    }
}

/// A pending wallet authorization issued by the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    pub id: String,
    pub uri: String,
    pub budget: Option<Budget>,
    pub identity: Option<PublicKey>,
}

impl AuthorizationRequest {
    pub fn new(
        id: impl Into<String>,
        uri: impl Into<String>,
        params: &AuthorizationParams,
    ) -> Result<Self, ValidationError> {
        let id = id.into();
        let uri = uri.into();
        if id.trim().is_empty() {
            return Err(ValidationError::EmptyAuthorizationId);
        }
        if !has_scheme(&uri, NWA_SCHEME) {
            return Err(ValidationError::NwaUri(uri));
        }
        Ok(Self {
            id,
            uri,
            budget: params.budget,
            identity: params.identity,
        })
    }

    pub fn token(&self) -> AuthToken {
        AuthToken(self.id.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    Connected,
    NotConnected,
}

impl AuthorizationStatus {
    /// The status endpoint's body is read with JS truthiness:
    /// `false`, `null`, `0` and `""` mean not connected, anything else connected.
    pub fn from_json(value: &Value) -> Self {
        let connected = match value {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0 && !f.is_nan()),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        };
        Self::from(connected)
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, AuthorizationStatus::Connected)
    }
}

impl From<bool> for AuthorizationStatus {
    fn from(connected: bool) -> Self {
        if connected {
            AuthorizationStatus::Connected
        } else {
            AuthorizationStatus::NotConnected
        }
    }
}

/// Id of an approved authorization, attached to submissions as `auth_id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw Nostr Wallet Connect string pasted by the user.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NwcUri(String);

impl NwcUri {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ValidationError::EmptyNwc);
        }
        if !has_scheme(input, NWC_SCHEME) {
            return Err(ValidationError::Nwc);
        }
        Ok(Self(input.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Connection strings carry a wallet secret.
impl fmt::Debug for NwcUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NwcUri(<redacted>)")
    }
}

/// How the backend reaches the paying wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum WalletConnection {
    #[serde(rename = "auth_id")]
    Authorized(AuthToken),
    #[serde(rename = "nwc")]
    Manual(NwcUri),
}

impl WalletConnection {
    /// An approved authorization wins over a manual string.
    pub fn resolve(
        token: Option<AuthToken>,
        manual: Option<NwcUri>,
    ) -> Result<Self, ValidationError> {
        match (token, manual) {
            (Some(token), _) => Ok(WalletConnection::Authorized(token)),
            (None, Some(nwc)) => Ok(WalletConnection::Manual(nwc)),
            (None, None) => Err(ValidationError::NoWallet),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            WalletConnection::Authorized(_) => "auth_id",
            WalletConnection::Manual(_) => "nwc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Donation {
    pub amount_sats: u64,
    #[serde(serialize_with = "serialize_hex")]
    pub npub: PublicKey,
}

/// Body of `POST /set-user`: zap on reaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReactionSubscription {
    #[serde(serialize_with = "serialize_hex")]
    pub npub: PublicKey,
    pub amount_sats: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    pub donations: Vec<Donation>,
    #[serde(flatten)]
    pub wallet: WalletConnection,
}

/// Body of `POST /create-subscription`: recurring autozap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecurringSubscription {
    #[serde(serialize_with = "serialize_hex")]
    pub npub: PublicKey,
    #[serde(serialize_with = "serialize_hex")]
    pub to_npub: PublicKey,
    pub amount_sats: u64,
    pub time_period: TimePeriod,
    #[serde(flatten)]
    pub wallet: WalletConnection,
}

/// Kind-0 metadata of a Nostr user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub about: Option<String>,
    #[serde(default)]
    pub nip05: Option<String>,
    #[serde(default)]
    pub lud16: Option<String>,
}

impl Profile {
    pub fn label(&self) -> Option<&str> {
        self.display_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.name.as_deref().filter(|s| !s.is_empty()))
    }
}

/// Accepts an `npub1...` string or, failing the prefix, a hex pubkey.
pub fn parse_public_key(input: &str) -> Result<PublicKey, ValidationError> {
    let input = input.trim();
    let parsed = if input.starts_with("npub") {
        PublicKey::from_bech32(input).map_err(|e| e.to_string())
    } else {
        PublicKey::from_hex(input).map_err(|e| e.to_string())
    };
    parsed.map_err(|e| ValidationError::PublicKey(format!("{input}: {e}")))
}

pub fn display_npub(pk: &PublicKey) -> String {
    pk.to_bech32().unwrap_or_else(|_| pk.to_hex())
}

fn has_scheme(uri: &str, scheme: &str) -> bool {
    uri.strip_prefix(scheme)
        .map_or(false, |rest| rest.starts_with("://") || rest.starts_with(':'))
}

fn serialize_hex<S: Serializer>(pk: &PublicKey, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&pk.to_hex())
}

//! Form validation for the reaction and autozap flows.
//!
//! Everything here runs before any network call so a bad field never starts a
//! wallet authorization.

use zapple_pay_core::domain::{
    DAMUS_DONATION_PUBKEY, DEFAULT_EMOJI, OPENSATS_DONATION_PUBKEY, ZAPPLE_PAY_NPUB,
};
use zapple_pay_core::{
    parse_public_key, AuthToken, AuthorizationParams, Budget, Donation, NwcUri, PublicKey,
    ReactionSubscription, RecurringSubscription, TimePeriod, ValidationError, WalletConnection,
};

/// Digits only, and more than zero.
pub fn parse_amount(input: &str) -> Result<u64, ValidationError> {
    let input = input.trim();
    if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::Amount);
    }
    match input.parse::<u64>() {
        Ok(sats) if sats > 0 => Ok(sats),
        _ => Err(ValidationError::Amount),
    }
}

pub fn parse_emoji(input: Option<&str>) -> Result<String, ValidationError> {
    match input.map(str::trim) {
        None => Ok(DEFAULT_EMOJI.to_owned()),
        Some(emoji) if is_single_emoji(emoji) => Ok(emoji.to_owned()),
        Some(_) => Err(ValidationError::Emoji),
    }
}

/// `None` means "authorize a wallet instead"; an empty string is an error.
pub fn parse_manual_nwc(input: Option<&str>) -> Result<Option<NwcUri>, ValidationError> {
    input.map(NwcUri::parse).transpose()
}

const ZWJ: char = '\u{200D}';

fn is_emoji_base(c: char) -> bool {
    matches!(c,
        '\u{00A9}' | '\u{00AE}' | '\u{203C}' | '\u{2049}' | '\u{2122}' | '\u{2139}'
        | '\u{2194}'..='\u{21AA}'
        | '\u{231A}'..='\u{2BFF}'
        | '\u{3030}' | '\u{303D}' | '\u{3297}' | '\u{3299}'
        | '\u{1F000}'..='\u{1FAFF}')
}

fn is_emoji_modifier(c: char) -> bool {
    matches!(c, '\u{FE0E}' | '\u{FE0F}' | '\u{20E3}' | '\u{E0020}'..='\u{E007F}')
}

fn is_regional_indicator(c: char) -> bool {
    ('\u{1F1E6}'..='\u{1F1FF}').contains(&c)
}

// One pictograph, a ZWJ sequence, or a flag (pair of regional indicators).
fn is_single_emoji(s: &str) -> bool {
    let mut bases = 0usize;
    let mut joiners = 0usize;
    let mut flags = 0usize;
    for c in s.chars() {
        if c == ZWJ {
            joiners += 1;
        } else if is_regional_indicator(c) {
            flags += 1;
        } else if is_emoji_base(c) {
            // Skin tones sit in the pictograph block but modify the previous base.
            if !('\u{1F3FB}'..='\u{1F3FF}').contains(&c) {
                bases += 1;
            }
        } else if !is_emoji_modifier(c) {
            return false;
        }
    }
    match (bases, flags) {
        (0, 2) => joiners == 0,
        (n, 0) if n > 0 => n == joiners + 1,
        _ => false,
    }
}

/// Raw reaction form input.
#[derive(Debug, Clone, Default)]
pub struct ReactionForm {
    pub npub: String,
    pub amount: String,
    pub emoji: Option<String>,
    pub donate_damus: bool,
    pub donate_opensats: bool,
    pub nwc: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidReaction {
    pub npub: PublicKey,
    pub amount_sats: u64,
    pub emoji: String,
    pub donations: Vec<Donation>,
    pub manual_nwc: Option<NwcUri>,
}

impl ReactionForm {
    pub fn validate(&self) -> Result<ValidReaction, ValidationError> {
        let npub = parse_public_key(&self.npub)?;
        let amount_sats = parse_amount(&self.amount)?;
        let emoji = parse_emoji(self.emoji.as_deref())?;
        let manual_nwc = parse_manual_nwc(self.nwc.as_deref())?;

        let mut donations = Vec::new();
        for (wanted, pubkey) in [
            (self.donate_damus, DAMUS_DONATION_PUBKEY),
            (self.donate_opensats, OPENSATS_DONATION_PUBKEY),
        ] {
            if wanted {
                donations.push(Donation {
                    amount_sats,
                    npub: parse_public_key(pubkey)?,
                });
            }
        }

        Ok(ValidReaction {
            npub,
            amount_sats,
            emoji,
            donations,
            manual_nwc,
        })
    }
}

impl ValidReaction {
    /// Reaction zaps ask for an unrestricted grant.
    pub fn authorization_params(&self) -> AuthorizationParams {
        AuthorizationParams::unrestricted()
    }

    pub fn into_subscription(
        self,
        token: Option<AuthToken>,
    ) -> Result<ReactionSubscription, ValidationError> {
        Ok(ReactionSubscription {
            npub: self.npub,
            amount_sats: self.amount_sats,
            emoji: Some(self.emoji),
            donations: self.donations,
            wallet: WalletConnection::resolve(token, self.manual_nwc)?,
        })
    }
}

/// Raw autozap form input.
#[derive(Debug, Clone)]
pub struct AutozapForm {
    pub to_npub: String,
    pub amount: String,
    pub interval: TimePeriod,
    pub from_npub: Option<String>,
    pub nwc: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidAutozap {
    pub from: PublicKey,
    pub to: PublicKey,
    pub amount_sats: u64,
    pub interval: TimePeriod,
    pub manual_nwc: Option<NwcUri>,
}

impl AutozapForm {
    pub fn validate(&self) -> Result<ValidAutozap, ValidationError> {
        let to = parse_public_key(&self.to_npub)?;
        let amount_sats = parse_amount(&self.amount)?;
        let from = match self.from_npub.as_deref().map(str::trim) {
            Some(npub) if !npub.is_empty() => parse_public_key(npub)?,
            _ => parse_public_key(ZAPPLE_PAY_NPUB)?,
        };
        Ok(ValidAutozap {
            from,
            to,
            amount_sats,
            interval: self.interval,
            manual_nwc: parse_manual_nwc(self.nwc.as_deref())?,
        })
    }
}

impl ValidAutozap {
    /// The grant is capped at one zap per interval and scoped to the recipient.
    pub fn authorization_params(&self) -> AuthorizationParams {
        AuthorizationParams {
            budget: Some(Budget {
                amount_sats: self.amount_sats,
                time_period: self.interval,
            }),
            identity: Some(self.to),
        }
    }

    pub fn into_subscription(
        self,
        token: Option<AuthToken>,
    ) -> Result<RecurringSubscription, ValidationError> {
        Ok(RecurringSubscription {
            npub: self.from,
            to_npub: self.to,
            amount_sats: self.amount_sats,
            time_period: self.interval,
            wallet: WalletConnection::resolve(token, self.manual_nwc)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECIPIENT: &str = "32e1827635450ebb3c5a7d12c1f8e7b2b514439ac10a67eef3d9fd9c5c68e245";
    const NWC: &str = "nostr+walletconnect://b889ff5b?relay=wss%3A%2F%2Frelay.example&secret=71a8";

    fn reaction() -> ReactionForm {
        ReactionForm {
            npub: RECIPIENT.to_owned(),
            amount: "21".to_owned(),
            ..ReactionForm::default()
        }
    }

    #[test]
    fn amount_must_be_positive_digits() {
        assert_eq!(parse_amount("1000"), Ok(1000));
        assert_eq!(parse_amount(" 21 "), Ok(21));
        for bad in ["", "0", "-5", "1.5", "1e3", "abc", "99999999999999999999999"] {
            assert_eq!(parse_amount(bad), Err(ValidationError::Amount), "{bad}");
        }
    }

    #[test]
    fn emoji_accepts_single_pictographs_only() {
        assert_eq!(parse_emoji(None), Ok("🤙".to_owned()));
        for ok in ["⚡️", "🤙", "❤️", "🫂", "👍🏽", "👨‍👩‍👧", "🇺🇸"] {
            assert!(parse_emoji(Some(ok)).is_ok(), "{ok}");
        }
        for bad in ["", "a", "🤙🤙", "⚡ ⚡", ":zap:", "🇺"] {
            assert_eq!(parse_emoji(Some(bad)), Err(ValidationError::Emoji), "{bad}");
        }
    }

    #[test]
    fn manual_nwc_is_optional_but_never_empty() {
        assert_eq!(parse_manual_nwc(None), Ok(None));
        assert_eq!(parse_manual_nwc(Some("  ")), Err(ValidationError::EmptyNwc));
        assert_eq!(
            parse_manual_nwc(Some("https://wallet.example")),
            Err(ValidationError::Nwc)
        );
        assert!(parse_manual_nwc(Some(NWC)).expect("valid").is_some());
    }

    #[test]
    fn reaction_donations_match_the_zap_amount() {
        let form = ReactionForm {
            donate_damus: true,
            donate_opensats: true,
            ..reaction()
        };
        let valid = form.validate().expect("valid");
        assert_eq!(valid.donations.len(), 2);
        assert!(valid.donations.iter().all(|d| d.amount_sats == 21));
        assert_eq!(valid.donations[0].npub.to_hex(), DAMUS_DONATION_PUBKEY);
        assert_eq!(valid.donations[1].npub.to_hex(), OPENSATS_DONATION_PUBKEY);
        assert_eq!(valid.authorization_params(), AuthorizationParams::unrestricted());
    }

    #[test]
    fn reaction_prefers_the_authorization_token() {
        let form = ReactionForm {
            nwc: Some(NWC.to_owned()),
            ..reaction()
        };
        let sub = form
            .validate()
            .expect("valid")
            .into_subscription(Some(AuthToken::new("abc")))
            .expect("wallet");
        assert_eq!(sub.wallet, WalletConnection::Authorized(AuthToken::new("abc")));
        assert_eq!(sub.emoji.as_deref(), Some("🤙"));
    }

    #[test]
    fn reaction_without_any_wallet_fails_locally() {
        let err = reaction()
            .validate()
            .expect("valid")
            .into_subscription(None)
            .expect_err("no wallet");
        assert_eq!(err, ValidationError::NoWallet);
        assert_eq!(err.to_string(), "You must connect a wallet");
    }

    #[test]
    fn bad_npub_is_rejected_before_anything_else() {
        let form = ReactionForm {
            npub: "npub1nope".to_owned(),
            amount: "zero".to_owned(),
            ..ReactionForm::default()
        };
        assert!(matches!(form.validate(), Err(ValidationError::PublicKey(_))));
    }

    #[test]
    fn autozap_defaults_sender_and_scopes_the_grant() {
        let form = AutozapForm {
            to_npub: RECIPIENT.to_owned(),
            amount: "1000".to_owned(),
            interval: TimePeriod::Week,
            from_npub: None,
            nwc: None,
        };
        let valid = form.validate().expect("valid");
        assert_eq!(valid.from, parse_public_key(ZAPPLE_PAY_NPUB).expect("npub"));

        let params = valid.authorization_params();
        assert_eq!(
            params.budget,
            Some(Budget {
                amount_sats: 1000,
                time_period: TimePeriod::Week,
            })
        );
        assert_eq!(params.identity, Some(valid.to));
        assert_eq!(
            params.query_pairs(),
            vec![
                ("amount", "1000".to_owned()),
                ("time_period", "week".to_owned()),
                ("identity", valid.to.to_hex()),
            ]
        );

        let sub = valid
            .into_subscription(Some(AuthToken::new("abc")))
            .expect("wallet");
        assert_eq!(sub.time_period, TimePeriod::Week);
        assert_eq!(sub.amount_sats, 1000);
    }

    #[test]
    fn autozap_uses_given_sender() {
        let form = AutozapForm {
            to_npub: ZAPPLE_PAY_NPUB.to_owned(),
            amount: "5".to_owned(),
            interval: TimePeriod::Month,
            from_npub: Some(RECIPIENT.to_owned()),
            nwc: Some(NWC.to_owned()),
        };
        let valid = form.validate().expect("valid");
        assert_eq!(valid.from, parse_public_key(RECIPIENT).expect("npub"));
        let sub = valid.into_subscription(None).expect("manual wallet");
        assert_eq!(sub.wallet.kind(), "nwc");
    }
}

//! `{{LIBRECHAT_USER_*}}` placeholders backed by an allow-listed user record.

use serde::{Deserialize, Deserializer, Serialize};

/// Replaced only when it is the entire value.
pub const USER_ID_PLACEHOLDER: &str = "{{LIBRECHAT_USER_ID}}";

/// The user fields that may appear in config values.
///
/// Built by the caller from the authenticated user. Anything not listed here
/// (password hashes, tokens, ...) is dropped when deserializing and can never
/// reach a placeholder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TemplateUser {
    #[serde(deserialize_with = "id_from_scalar")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub provider: Option<String>,
    pub role: Option<String>,
    pub google_id: Option<String>,
    pub facebook_id: Option<String>,
    pub openid_id: Option<String>,
    pub saml_id: Option<String>,
    pub ldap_id: Option<String>,
    pub github_id: Option<String>,
    pub discord_id: Option<String>,
    pub apple_id: Option<String>,
    pub email_verified: Option<bool>,
    pub two_factor_enabled: Option<bool>,
    pub terms_accepted: Option<bool>,
}

/// Accepts `"abc"`, `42` or `null` for the user id.
fn id_from_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "user id must be a string or number, got {other}"
        ))),
    }
}

/// An allow-listed user field, in substitution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserField {
    Name,
    Username,
    Email,
    Provider,
    Role,
    GoogleId,
    FacebookId,
    OpenidId,
    SamlId,
    LdapId,
    GithubId,
    DiscordId,
    AppleId,
    EmailVerified,
    TwoFactorEnabled,
    TermsAccepted,
}

impl UserField {
    pub const ALL: [UserField; 16] = [
        UserField::Name,
        UserField::Username,
        UserField::Email,
        UserField::Provider,
        UserField::Role,
        UserField::GoogleId,
        UserField::FacebookId,
        UserField::OpenidId,
        UserField::SamlId,
        UserField::LdapId,
        UserField::GithubId,
        UserField::DiscordId,
        UserField::AppleId,
        UserField::EmailVerified,
        UserField::TwoFactorEnabled,
        UserField::TermsAccepted,
    ];

    /// The camelCase key used on user documents.
    pub fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Username => "username",
            Self::Email => "email",
            Self::Provider => "provider",
            Self::Role => "role",
            Self::GoogleId => "googleId",
            Self::FacebookId => "facebookId",
            Self::OpenidId => "openidId",
            Self::SamlId => "samlId",
            Self::LdapId => "ldapId",
            Self::GithubId => "githubId",
            Self::DiscordId => "discordId",
            Self::AppleId => "appleId",
            Self::EmailVerified => "emailVerified",
            Self::TwoFactorEnabled => "twoFactorEnabled",
            Self::TermsAccepted => "termsAccepted",
        }
    }

    /// `{{LIBRECHAT_USER_<KEY>}}` with the key uppercased, e.g.
    /// `{{LIBRECHAT_USER_GOOGLEID}}`.
    pub fn placeholder(self) -> String {
        format!("{{{{LIBRECHAT_USER_{}}}}}", self.key().to_uppercase())
    }
}

impl TemplateUser {
    /// String form of a field, if it is set.
    pub fn field(&self, field: UserField) -> Option<String> {
        let flag = |b: Option<bool>| b.map(|b| b.to_string());
        match field {
            UserField::Name => self.name.clone(),
            UserField::Username => self.username.clone(),
            UserField::Email => self.email.clone(),
            UserField::Provider => self.provider.clone(),
            UserField::Role => self.role.clone(),
            UserField::GoogleId => self.google_id.clone(),
            UserField::FacebookId => self.facebook_id.clone(),
            UserField::OpenidId => self.openid_id.clone(),
            UserField::SamlId => self.saml_id.clone(),
            UserField::LdapId => self.ldap_id.clone(),
            UserField::GithubId => self.github_id.clone(),
            UserField::DiscordId => self.discord_id.clone(),
            UserField::AppleId => self.apple_id.clone(),
            UserField::EmailVerified => flag(self.email_verified),
            UserField::TwoFactorEnabled => flag(self.two_factor_enabled),
            UserField::TermsAccepted => flag(self.terms_accepted),
        }
    }
}

/// Replace `{{LIBRECHAT_USER_*}}` placeholders in `value`.
///
/// Without a user the value is returned unchanged. `{{LIBRECHAT_USER_ID}}`
/// is only replaced when it is the whole value and the user has an id. Every
/// allow-listed field placeholder is replaced wherever it occurs; unset
/// fields become the empty string.
pub fn substitute_user_placeholders(value: &str, user: Option<&TemplateUser>) -> String {
    let Some(user) = user else {
        return value.to_string();
    };

    if value == USER_ID_PLACEHOLDER
        && let Some(id) = &user.id
    {
        return id.clone();
    }

    let mut value = value.to_string();
    for field in UserField::ALL {
        let placeholder = field.placeholder();
        if value.contains(&placeholder) {
            let replacement = user.field(field).unwrap_or_default();
            value = value.replace(&placeholder, &replacement);
        }
    }
    value
}

mod metadata;
mod request;
mod response;

use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

pub use self::metadata::*;
pub use self::request::*;
pub use self::response::*;

/// Open string enumerations: known values get a variant, anything else is
/// kept verbatim in `Other` so decoding never fails on a value we have not
/// seen before.
macro_rules! open_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $wire:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "SmolStr", into = "SmolStr")]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
            /// A value this crate does not know about
            Other(SmolStr),
        }

        impl $name {
            /// Wire representation.
            pub fn as_str(&self) -> &str {
                match self {
                    $($name::$variant => $wire,)+
                    $name::Other(value) => value.as_str(),
                }
            }
        }

        impl From<SmolStr> for $name {
            fn from(value: SmolStr) -> Self {
                match value.as_str() {
                    $($wire => $name::$variant,)+
                    _ => $name::Other(value),
                }
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                SmolStr::new(value).into()
            }
        }

        impl From<$name> for SmolStr {
            fn from(value: $name) -> Self {
                match value {
                    $name::Other(value) => value,
                    known => SmolStr::new(known.as_str()),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

open_enum! {
    /// `response_type` values.
    pub enum ResponseType {
        Code => "code",
        IdToken => "id_token",
        Token => "token",
    }
}

impl Default for ResponseType {
    fn default() -> Self {
        ResponseType::Code
    }
}

open_enum! {
    /// Client authentication methods for the introspection and revocation
    /// endpoints.
    pub enum TokenAuthMethod {
        None => "none",
        ClientSecretPost => "client_secret_post",
        ClientSecretBasic => "client_secret_basic",
        ClientSecretJwt => "client_secret_jwt",
        PrivateKeyJwt => "private_key_jwt",
        TlsClientAuth => "tls_client_auth",
        SelfSignedTlsClientAuth => "self_signed_tls_client_auth",
    }
}

open_enum! {
    /// PKCE code challenge methods.
    pub enum CodeChallengeMethod {
        Plain => "plain",
        S256 => "S256",
    }
}

open_enum! {
    /// OAuth grant types.
    pub enum GrantType {
        AuthorizationCode => "authorization_code",
        Implicit => "implicit",
        Password => "password",
        ClientCredentials => "client_credentials",
        RefreshToken => "refresh_token",
        JwtBearer => "urn:ietf:params:oauth:grant-type:jwt-bearer",
        Saml2Bearer => "urn:ietf:params:oauth:grant-type:saml2-bearer",
    }
}

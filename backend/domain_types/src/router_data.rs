use base64::Engine;
use common_utils::consts::BASE64_ENGINE;
use hyperswitch_masking::{ExposeInterface, PeekInterface, Secret};

/// Client id and secret exchanged for a bearer token.
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    pub client_id: Secret<String>,
    pub client_secret: Secret<String>,
}

impl ClientCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: Secret::new(client_id.into()),
            client_secret: Secret::new(client_secret.into()),
        }
    }

    /// `Basic base64(id:secret)`
    pub fn generate_authorization_value(&self) -> Secret<String> {
        let credentials = format!("{}:{}", self.client_id.peek(), self.client_secret.peek());
        format!("Basic {}", BASE64_ENGINE.encode(credentials)).into()
    }
}

#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: Secret<String>,
}

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Secret::new(token.into()),
        }
    }

    pub fn authorization_value(&self) -> Secret<String> {
        format!("Bearer {}", self.token.peek()).into()
    }

    pub fn expose(self) -> String {
        self.token.expose()
    }
}

impl PartialEq for AccessToken {
    fn eq(&self, other: &Self) -> bool {
        self.token.peek() == other.token.peek()
    }
}

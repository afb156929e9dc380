//! Meeting: RTC room management and room access tokens

use http::Method;
use pili_core::{ApiContext, ArgumentError};
use url::Url;

use crate::client::Client;
use crate::error::ClientError;
use crate::types::{CreateRoomArgs, CreateRoomReturn, RoomAccessPolicy, RoomStatusReturn};

#[derive(Debug, Clone)]
pub struct Meeting {
    client: Client,
    owner_id: String,
}

impl Meeting {
    pub(crate) const fn new(client: Client, owner_id: String) -> Self {
        Self { client, owner_id }
    }

    #[must_use]
    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    fn room_url(&self, room_name: &str) -> Result<Url, ClientError> {
        if room_name.is_empty() {
            return Err(ArgumentError::Empty("room name").into());
        }
        self.client.rtc_url(&format!("/rooms/{room_name}"))
    }

    /// Create a room owned by this meeting's owner. An empty `room_name`
    /// lets the server pick one; the chosen name is returned.
    pub async fn room_create(&self, room_name: &str, user_max: i64) -> Result<String, ClientError> {
        if self.owner_id.is_empty() {
            return Err(ArgumentError::Empty("owner id").into());
        }
        let url = self.client.rtc_url("/rooms")?;
        let args = CreateRoomArgs {
            owner_id: self.owner_id.clone(),
            room_name: room_name.to_string(),
            user_max,
        };
        let resp: CreateRoomReturn = self
            .client
            .call(ApiContext::General, Method::POST, url, Some(&args))
            .await?;
        Ok(resp.room_name)
    }

    pub async fn room_status(&self, room_name: &str) -> Result<RoomStatusReturn, ClientError> {
        let url = self.room_url(room_name)?;
        self.client
            .call::<_, ()>(ApiContext::General, Method::GET, url, None)
            .await
    }

    pub async fn room_delete(&self, room_name: &str) -> Result<(), ClientError> {
        let url = self.room_url(room_name)?;
        self.client
            .call_no_content::<()>(ApiContext::General, Method::DELETE, url, None)
            .await
    }

    /// Sign a room access token for `policy`. Purely local.
    pub fn create_token(&self, policy: &RoomAccessPolicy) -> Result<String, ClientError> {
        if policy.room_name.is_empty() {
            return Err(ArgumentError::Empty("room name").into());
        }
        let payload = serde_json::to_vec(policy)?;
        Ok(self.client.mac().sign_with_data(&payload))
    }
}
